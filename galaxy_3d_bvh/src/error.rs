//! Error types for the Galaxy3D scene BVH
//!
//! Only the non-hot surfaces return these: configuration, the scene manager
//! and tree validation. The per-tick maintenance paths use debug assertions.

use std::fmt;

/// Result type for Galaxy3D BVH operations
pub type Result<T> = std::result::Result<T, Error>;

/// Galaxy3D BVH errors
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// A configuration value is out of range
    InvalidConfig(String),

    /// A scene object key is unknown or stale
    InvalidObject(String),

    /// Initialization failed (scene manager, subsystems)
    InitializationFailed(String),

    /// A tree invariant does not hold
    CorruptedTree(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidConfig(msg) => write!(f, "Invalid config: {}", msg),
            Error::InvalidObject(msg) => write!(f, "Invalid object: {}", msg),
            Error::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
            Error::CorruptedTree(msg) => write!(f, "Corrupted tree: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

/// Log an ERROR entry and build the matching [`Error`].
///
/// ```ignore
/// return Err(engine_err!(InvalidConfig, "galaxy3d::BvhConfig", "margin {} < 0", m));
/// ```
#[macro_export]
macro_rules! engine_err {
    ($variant:ident, $source:expr, $($arg:tt)*) => {{
        let message = format!($($arg)*);
        $crate::engine_error!($source, "{}", message);
        $crate::galaxy3d::Error::$variant(message)
    }};
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
