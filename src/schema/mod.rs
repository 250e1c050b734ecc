//! Native constants and enumerations
//!
//! Everything the binding needs to know about NVML's numeric vocabulary lives
//! here: the status table, fixed buffer capacities, init flags and the closed
//! enumerations used by device properties.
//!
//! Enumerations are generated by [`native_enum!`]. Each one carries an
//! `Unknown(u32)` variant so that a code added by a newer driver survives a
//! `from_raw`/`as_raw` round trip untouched.

/// Declare a native enumeration with lossless unknown-code handling.
macro_rules! native_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $(
                $(#[$vmeta:meta])*
                $variant:ident = $value:literal => $label:literal,
            )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $(
                $(#[$vmeta])*
                $variant,
            )+
            /// A code this binding does not recognize, kept as returned.
            Unknown(u32),
        }

        impl $name {
            /// Decode a raw native value.
            pub const fn from_raw(raw: u32) -> Self {
                match raw {
                    $( $value => Self::$variant, )+
                    other => Self::Unknown(other),
                }
            }

            /// The raw native value.
            pub const fn as_raw(self) -> u32 {
                match self {
                    $( Self::$variant => $value, )+
                    Self::Unknown(raw) => raw,
                }
            }

            /// Every named variant, in declaration order.
            pub const ALL: &'static [Self] = &[$( Self::$variant, )+];
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                match self {
                    $( Self::$variant => f.write_str($label), )+
                    Self::Unknown(raw) => write!(f, "unknown ({})", raw),
                }
            }
        }

        impl ::serde::Serialize for $name {
            fn serialize<S: ::serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }
    };
}

pub mod buffers;
pub mod enums;
pub mod flags;
pub mod status;

pub use enums::*;
pub use flags::{EventTypes, InitFlags, ThrottleReasons};
