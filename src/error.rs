//! Configuration error taxonomy.
//!
//! Generation itself is pure computation and cannot fail partway; the only
//! failure mode is an invalid configuration, which aborts the whole call
//! before any drawing happens.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The grid type string did not match any known variant.
    #[error("unrecognized grid type: {0:?}")]
    UnknownGridType(String),

    /// A color string could not be resolved to RGB.
    #[error("unresolvable color: {0:?}")]
    UnknownColor(String),

    /// An overlay position keyword matched no edge or corner.
    #[error("no matching edge or corner keyword: {0:?}")]
    UnknownPosition(String),

    /// A numeric parameter fell outside its documented range.
    #[error("{field} = {value} is out of range [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },

    /// A float pixel buffer did not match the declared dimensions.
    #[error("pixel buffer has {actual} values, expected {expected}")]
    BufferShape { expected: usize, actual: usize },
}
