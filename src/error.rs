//! Unified error type.

use thiserror::Error;

/// The error type returned by manifold's fallible operations.
///
/// Every variant is a wiring-time failure: it surfaces from
/// [`bind`](crate::bind) before a single request is served, and retrying will
/// not help. The host decides whether to abort startup or report it.
#[derive(Debug, Error)]
pub enum Error {
    /// The annotation does not match `METHOD /path` or the middleware literal.
    #[error("`{0}`: invalid route annotation, expected `METHOD /path` or `*`")]
    TagFormat(String),

    /// The annotation names a verb outside the supported set.
    #[error("{0}: unsupported HTTP method")]
    UnsupportedMethod(String),

    /// Neither an `<action>_func` registration nor an assigned field value exists.
    #[error("{0}: action not found")]
    ActionNotFound(String),

    /// The resolved callable does not fit the field's declared type.
    #[error("{0}: type mismatch")]
    TypeMismatch(String),

    /// The controller value has no fields to bind.
    #[error("controllers must be record types, `{0}` is not")]
    ControllerShape(&'static str),

    /// The router rejected a path (conflict or malformed parameter).
    #[error("invalid route `{path}`: {source}")]
    InvalidRoute {
        path: String,
        #[source]
        source: matchit::InsertError,
    },
}
