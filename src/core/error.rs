//! Failure taxonomy shared by adapters, the aggregator and callers.

use thiserror::Error;

/// The only two failure kinds an upstream fetch can end in.
///
/// Adapters classify every transport, status and parse problem into one of
/// these before returning, so nothing `reqwest`- or `serde`-shaped ever
/// reaches a caller of [`crate::core::Aggregator::fetch`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Upstream answered, but has no data for the requested resource.
    #[error("{0}")]
    NotFound(String),

    /// Network failure, timeout, non-success status or an unparsable body.
    #[error("upstream unavailable: {0}")]
    Unavailable(String),
}

impl FetchError {
    pub fn not_found(detail: impl Into<String>) -> Self {
        FetchError::NotFound(detail.into())
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        FetchError::Unavailable(reason.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, FetchError::NotFound(_))
    }
}

/// Caller-supplied parameter failed local validation.
///
/// Raised while building a [`crate::core::Query`] or a carbon input, i.e.
/// before the aggregator is ever involved.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InputError {
    #[error("missing required parameter '{0}'")]
    Missing(&'static str),

    #[error("invalid value for '{field}': {reason}")]
    Invalid { field: &'static str, reason: String },

    #[error("'{0}' must not be negative")]
    Negative(&'static str),

    #[error("unknown parameter '{0}'")]
    Unknown(String),

    #[error("parameters '{0}' and '{1}' name the same value")]
    Conflict(String, String),
}

impl InputError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        InputError::Invalid {
            field,
            reason: reason.into(),
        }
    }
}
