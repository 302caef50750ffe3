//! Crate‑wide error type.

use thiserror::Error;

/// Broad classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The component was constructed with invalid parameters.
    Configuration,
    /// A dictionary could not be converted into a live component.
    Serialization,
    /// An operation was called out of order or with an invalid argument.
    Usage,
}

/// Errors produced while building, serializing or iterating scans.
#[derive(Debug, Error)]
pub enum Error {
    /// The same axis name appears more than once.
    #[error("duplicate axis name `{0}`")]
    DuplicateAxis(String),
    /// Parallel parameter lists disagree in length.
    #[error("dimension mismatch: {0}")]
    DimensionMismatch(String),
    /// A size, count or extent that must be positive was not.
    #[error("{field} must be positive, got {value}")]
    NonPositive {
        /// Name of the offending parameter.
        field: &'static str,
        /// Value that was supplied.
        value: f64,
    },
    /// A parameter holds a value outside its domain.
    #[error("invalid {field}: {reason}")]
    InvalidParameter {
        /// Name of the offending parameter.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
    /// An excluder or mutator references an axis no generator owns.
    #[error("axis `{0}` is not owned by any generator")]
    UnknownAxis(String),
    /// A compound scan was built without generators.
    #[error("a compound scan needs at least one generator")]
    NoGenerators,
    /// The dictionary carries a type tag with no registered constructor.
    #[error("unregistered type `{0}`")]
    UnregisteredType(String),
    /// A serialized component was not a mapping.
    #[error("expected a mapping, found {0}")]
    NotADict(&'static str),
    /// The type tag names a component of a different family.
    #[error("expected a {expected}, found `{typeid}`")]
    WrongFamily {
        /// Family that was requested.
        expected: &'static str,
        /// Type tag that was found.
        typeid: String,
    },
    /// The dictionary lacks a required entry.
    #[error("missing field `{0}`")]
    MissingField(&'static str),
    /// The dictionary could not be decoded into the tagged variant.
    #[error("invalid `{typeid}` payload: {source}")]
    Payload {
        /// Type tag that was being decoded.
        typeid: String,
        /// Underlying decoding failure.
        #[source]
        source: serde_json::Error,
    },
    /// An operation needs state that a prepare step has not produced yet.
    #[error("{operation} requires {step}() to be called first")]
    NotPrepared {
        /// Operation that was attempted.
        operation: &'static str,
        /// Prepare step that must run first.
        step: &'static str,
    },
    /// A dense index beyond the end of the scan was requested.
    #[error("index {index} out of range for scan of {size} points")]
    IndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Number of points in the scan.
        size: usize,
    },
}

impl Error {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::DuplicateAxis(_)
            | Self::DimensionMismatch(_)
            | Self::NonPositive { .. }
            | Self::InvalidParameter { .. }
            | Self::UnknownAxis(_)
            | Self::NoGenerators => ErrorKind::Configuration,
            Self::UnregisteredType(_)
            | Self::NotADict(_)
            | Self::WrongFamily { .. }
            | Self::MissingField(_)
            | Self::Payload { .. } => ErrorKind::Serialization,
            Self::NotPrepared { .. } | Self::IndexOutOfRange { .. } => ErrorKind::Usage,
        }
    }
}

/// Convenience result alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Reject `value` unless it is finite and strictly positive.
pub(crate) fn require_positive(field: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(Error::NonPositive { field, value })
    }
}
