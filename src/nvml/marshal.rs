//! Turning native results into owned values
//!
//! Every facade operation goes through one of these helpers, so status
//! checking, text decoding and the count-then-fetch protocol behave the same
//! for every entry point.

use crate::error::NvmlError;
use crate::ffi::types::nvmlReturn_t;
use crate::schema::status;

use std::os::raw::{c_char, c_uint};
use std::ptr;

/// Turn a native status into `Ok(())` or the matching error.
pub fn check(code: nvmlReturn_t) -> Result<(), NvmlError> {
    match NvmlError::from_status(code) {
        None => Ok(()),
        Some(err) => Err(err),
    }
}

/// Decode a fixed-capacity text buffer.
///
/// Every NUL is removed, not only the trailing run, so interior padding never
/// leaks into the result. Invalid UTF-8 is replaced rather than rejected. A
/// buffer without any NUL means the callee overran its contract.
pub fn decode_text(bytes: &[u8]) -> Result<String, NvmlError> {
    if !bytes.contains(&0) {
        return Err(NvmlError::Unterminated {
            capacity: bytes.len(),
        });
    }
    let text = String::from_utf8_lossy(bytes);
    Ok(text.chars().filter(|&c| c != '\0').collect())
}

fn decode_c_chars(buf: &[c_char]) -> Result<String, NvmlError> {
    let bytes: Vec<u8> = buf.iter().map(|&c| c as u8).collect();
    decode_text(&bytes)
}

/// Decode a fixed-size `char[N]` field of a native record.
pub(crate) fn field_text(buf: &[c_char]) -> Result<String, NvmlError> {
    decode_c_chars(buf)
}

/// Allocate `capacity` bytes, let `call` fill them, decode the result.
pub(crate) fn read_text(
    capacity: u32,
    call: impl FnOnce(*mut c_char, c_uint) -> Result<nvmlReturn_t, NvmlError>,
) -> Result<String, NvmlError> {
    let mut buf: Vec<c_char> = vec![0; capacity as usize];
    check(call(buf.as_mut_ptr(), capacity)?)?;
    decode_c_chars(&buf)
}

/// Run a call with one out-parameter and return it.
pub(crate) fn out<T: Default>(
    call: impl FnOnce(&mut T) -> Result<nvmlReturn_t, NvmlError>,
) -> Result<T, NvmlError> {
    let mut value = T::default();
    check(call(&mut value)?)?;
    Ok(value)
}

/// Run a call with two out-parameters and return both.
pub(crate) fn out2<A: Default, B: Default>(
    call: impl FnOnce(&mut A, &mut B) -> Result<nvmlReturn_t, NvmlError>,
) -> Result<(A, B), NvmlError> {
    let mut first = A::default();
    let mut second = B::default();
    check(call(&mut first, &mut second)?)?;
    Ok((first, second))
}

/// Fetch a variable-length list with NVML's count-then-fill protocol.
///
/// The first call passes a count of 0 and no destination. If it reports zero
/// entries the result is empty and no second call is made. Otherwise exactly
/// that many elements are allocated and the call is repeated. A second count
/// that differs from the first, or an `INSUFFICIENT_SIZE` on the second
/// call, is reported as [`NvmlError::InconsistentCount`].
pub(crate) fn fetch_list<T: Clone + Default>(
    mut call: impl FnMut(&mut c_uint, *mut T) -> Result<nvmlReturn_t, NvmlError>,
) -> Result<Vec<T>, NvmlError> {
    let mut count: c_uint = 0;
    match call(&mut count, ptr::null_mut())? {
        status::SUCCESS | status::INSUFFICIENT_SIZE => {}
        other => return check(other).map(|_| Vec::new()),
    }

    if count == 0 {
        return Ok(Vec::new());
    }

    let expected = count;
    let mut items = vec![T::default(); expected as usize];
    let code = call(&mut count, items.as_mut_ptr())?;
    if code == status::INSUFFICIENT_SIZE || (code == status::SUCCESS && count != expected) {
        return Err(NvmlError::InconsistentCount {
            expected,
            actual: count,
        });
    }
    check(code)?;

    Ok(items)
}
