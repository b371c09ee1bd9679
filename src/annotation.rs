//! Route annotation grammar.
//!
//! An annotation is the literal string attached to a controller field:
//!
//! | Annotation | Meaning |
//! |---|---|
//! | `""` | not a route, the field is plain data |
//! | `"*"` | middleware, registered with `use` on the controller's group |
//! | `"GET /:id"` | handler for `GET` at `/:id`, relative to the group |
//!
//! Exactly one space separates method and path. The path loses any trailing
//! slashes, except that an all-slash path is kept as the root `/`.

use crate::error::Error;
use crate::handler::Shape;
use crate::method::Method;

/// The reserved literal marking a middleware field.
pub const MIDDLEWARE: &str = "*";

/// A parsed field annotation.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Annotation {
    Middleware,
    Handler { method: Method, path: String },
}

impl Annotation {
    /// Parses one raw annotation.
    ///
    /// Returns `Ok(None)` for the empty string: the field is not a route.
    pub fn parse(raw: &str) -> Result<Option<Self>, Error> {
        if raw.is_empty() {
            return Ok(None);
        }
        if raw == MIDDLEWARE {
            return Ok(Some(Self::Middleware));
        }

        let mut parts = raw.split(' ');
        let (Some(method), Some(path), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(Error::TagFormat(raw.to_owned()));
        };
        if method.is_empty() || path.is_empty() {
            return Err(Error::TagFormat(raw.to_owned()));
        }

        let method = method.parse::<Method>()?;
        Ok(Some(Self::Handler { method, path: trim_path(path).to_owned() }))
    }

    /// The callable shape this annotation expects to bind.
    pub fn shape(&self) -> Shape {
        match self {
            Self::Middleware => Shape::Middleware,
            Self::Handler { .. } => Shape::Handler,
        }
    }

    pub fn is_middleware(&self) -> bool {
        matches!(self, Self::Middleware)
    }
}

/// Strips trailing `/` characters, keeping the root as `/`.
pub fn trim_path(path: &str) -> &str {
    match path.trim_end_matches('/') {
        "" if path.starts_with('/') => "/",
        trimmed => trimmed,
    }
}
