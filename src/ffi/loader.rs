//! Locating and loading the NVML image
//!
//! The image name depends on the platform. Candidates are tried in order and
//! the first one that loads wins; an explicit path replaces the list.

use crate::error::NvmlError;
use crate::ffi::symbols::NativeSymbols;

use libloading::Library;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Serializes every native call in the process. NVML keeps global state per
/// loaded image and the binding makes no reentrancy assumptions about it.
static NATIVE_CALLS: Mutex<()> = Mutex::new(());

/// Library names to try on this platform, most specific first.
pub fn library_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    if cfg!(windows) {
        candidates.push(PathBuf::from("nvml.dll"));
        if let Some(program_files) = std::env::var_os("ProgramW6432") {
            candidates.push(
                PathBuf::from(program_files)
                    .join("NVIDIA Corporation")
                    .join("NVSMI")
                    .join("nvml.dll"),
            );
        }
    } else {
        // Linux and every other Unix-like target use the versioned soname first.
        candidates.push(PathBuf::from("libnvidia-ml.so.1"));
        candidates.push(PathBuf::from("libnvidia-ml.so"));
    }

    candidates
}

/// A loaded NVML image and its resolved entry points.
pub struct NativeLibrary {
    symbols: NativeSymbols,
    origin: String,
    // Keeps the image mapped for as long as the function pointers live.
    _image: Option<Library>,
}

impl NativeLibrary {
    /// Load NVML from the platform's default candidates.
    pub fn open() -> Result<Self, NvmlError> {
        Self::open_first(&library_candidates())
    }

    /// Load NVML from an explicit path.
    pub fn open_path(path: impl AsRef<Path>) -> Result<Self, NvmlError> {
        Self::open_first(&[path.as_ref().to_path_buf()])
    }

    /// Load the first candidate that succeeds.
    pub fn open_first(candidates: &[PathBuf]) -> Result<Self, NvmlError> {
        let mut last_error = String::from("no candidates");

        for candidate in candidates {
            // SAFETY: loading NVML runs its library constructors, which have
            // no preconditions.
            match unsafe { Library::new(candidate) } {
                Ok(image) => {
                    let symbols = NativeSymbols::resolve(&image);
                    log::info!(
                        "Loaded NVML from {} ({} entry points)",
                        candidate.display(),
                        symbols.available().len()
                    );
                    return Ok(Self {
                        symbols,
                        origin: candidate.display().to_string(),
                        _image: Some(image),
                    });
                }
                Err(e) => {
                    log::debug!("Could not load {}: {}", candidate.display(), e);
                    last_error = e.to_string();
                }
            }
        }

        Err(NvmlError::LibraryLoad {
            tried: candidates
                .iter()
                .map(|c| c.display().to_string())
                .collect::<Vec<_>>()
                .join(", "),
            reason: last_error,
        })
    }

    /// Wrap an already populated symbol table, e.g. a test double.
    pub fn from_symbols(symbols: NativeSymbols, origin: impl Into<String>) -> Self {
        Self {
            symbols,
            origin: origin.into(),
            _image: None,
        }
    }

    /// Where the symbols came from.
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Run `f` with the process-wide native call lock held.
    ///
    /// The lock is not reentrant: `f` must not call back into the session
    /// or a device.
    pub(crate) fn with<R>(&self, f: impl FnOnce(&NativeSymbols) -> R) -> R {
        let _guard = lock_native_calls();
        f(&self.symbols)
    }
}

impl fmt::Debug for NativeLibrary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeLibrary")
            .field("origin", &self.origin)
            .field("symbols", &self.symbols.available().len())
            .finish()
    }
}

fn lock_native_calls() -> MutexGuard<'static, ()> {
    // A panic in a test double must not wedge every later call.
    NATIVE_CALLS.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::TryLockError;

    #[test]
    fn test_candidates_not_empty() {
        let candidates = library_candidates();
        assert!(!candidates.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_unix_prefers_versioned_soname() {
        let candidates = library_candidates();
        assert_eq!(candidates[0], PathBuf::from("libnvidia-ml.so.1"));
        assert_eq!(candidates[1], PathBuf::from("libnvidia-ml.so"));
    }

    #[test]
    fn test_missing_library_reports_every_candidate() {
        let candidates = vec![
            PathBuf::from("/nonexistent/libnvidia-ml.so.1"),
            PathBuf::from("/nonexistent/libnvidia-ml.so"),
        ];
        let err = NativeLibrary::open_first(&candidates).unwrap_err();
        match err {
            NvmlError::LibraryLoad { tried, .. } => {
                assert!(tried.contains("/nonexistent/libnvidia-ml.so.1"));
                assert!(tried.contains("/nonexistent/libnvidia-ml.so"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_from_symbols_has_no_entry_points() {
        let lib = NativeLibrary::from_symbols(NativeSymbols::default(), "empty");
        assert_eq!(lib.origin(), "empty");
        let count = lib.with(|sym| sym.available().len());
        assert_eq!(count, 0);
    }

    #[test]
    fn test_with_holds_native_call_lock() {
        let lib = NativeLibrary::from_symbols(NativeSymbols::default(), "empty");
        let held = lib.with(|_| matches!(NATIVE_CALLS.try_lock(), Err(TryLockError::WouldBlock)));
        assert!(held);
    }
}
