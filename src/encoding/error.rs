use std::fmt;

/// An error that can occur when percent encoding a value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EncodeError {
    /// A surrogate code unit that is not part of a valid high/low pair.
    InvalidUtf16 {
        /// Index of the offending code unit.
        position: usize,
        /// The offending code unit.
        unit: u16,
    },
    /// A code point that cannot be represented in UTF-8.
    InvalidScalar(u32),
}

impl std::error::Error for EncodeError { }

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidUtf16 { position, unit } => {
                write!(f, "invalid UTF-16 value: unpaired surrogate {unit:#06x} at {position}")
            }
            Self::InvalidScalar(code) => write!(f, "invalid character for UTF-8: {code:#x}"),
        }
    }
}
