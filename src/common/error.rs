//! Error handling for the PrismPack compression layer

use thiserror::Error;

/// Main error type for PrismPack operations
#[derive(Error, Debug)]
pub enum PrismPackError {
    /// A value does not fit the bit width computed for its column.
    ///
    /// Only reported by explicit checks; the encode hot path relies on
    /// `debug_assert!` and does not validate values in release builds.
    #[error("Domain violation: value {value} at index {index} needs more than {bit_width} bits")]
    DomainViolation {
        index: usize,
        value: u32,
        bit_width: u8,
    },

    #[error("Allocation failure: cannot allocate {requested} bytes from pool '{pool}'")]
    AllocationFailure { requested: usize, pool: String },

    #[error("Codec mismatch: data was encoded with {found}, decoder expects {expected}")]
    CodecMismatch { expected: String, found: String },

    #[error("Verification failed at index {index}: expected {expected}, decoded {actual}")]
    VerificationFailed {
        index: usize,
        expected: u32,
        actual: u32,
    },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid layout: {0}")]
    InvalidLayout(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, PrismPackError>;

/// Result type alias for PrismPack operations (alias for Result)
pub type PrismPackResult<T> = std::result::Result<T, PrismPackError>;

/// Macro for creating invalid argument errors
#[macro_export]
macro_rules! invalid_argument {
    ($msg:expr) => {
        $crate::common::error::PrismPackError::InvalidArgument($msg.to_string())
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::common::error::PrismPackError::InvalidArgument(format!($fmt, $($arg)*))
    };
}

/// Macro for creating invalid layout errors
#[macro_export]
macro_rules! invalid_layout {
    ($msg:expr) => {
        $crate::common::error::PrismPackError::InvalidLayout($msg.to_string())
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::common::error::PrismPackError::InvalidLayout(format!($fmt, $($arg)*))
    };
}
