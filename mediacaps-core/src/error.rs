//! Error types for the mediacaps library.

use thiserror::Error;

/// Result type for mediacaps operations.
pub type Result<T> = std::result::Result<T, CapsError>;

/// Error type for capability construction and queries.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CapsError {
    /// Range construction with a lower bound above the upper bound.
    #[error("Invalid range: lower bound {lower} exceeds upper bound {upper}")]
    InvalidRange {
        /// Lower bound, rendered as text.
        lower: String,
        /// Upper bound, rendered as text.
        upper: String,
    },

    /// Intersection of two disjoint ranges.
    #[error("Ranges [{a}] and [{b}] do not intersect")]
    EmptyIntersection {
        /// First range, rendered as text.
        a: String,
        /// Second range, rendered as text.
        b: String,
    },

    /// Invalid argument passed to an operation.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Malformed value for a recognized attribute or format key.
    #[error("Invalid value '{value}' for key '{key}': {reason}")]
    InvalidValue {
        /// The key the value belongs to.
        key: String,
        /// The offending value.
        value: String,
        /// The reason the value is invalid.
        reason: String,
    },

    /// Requested media type is not present in a codec's capability map.
    #[error("No capabilities for media type: {0}")]
    NotFound(String),
}
