//! Incoming HTTP request type and its request-scoped metadata.

use std::collections::HashMap;

use crate::method::Method;

/// Metadata key holding the type name of the controller that served the request.
pub const CONTROLLER_KEY: &str = "controller_name";

/// Metadata key holding the action (field) name that served the request.
pub const ACTION_KEY: &str = "action_name";

/// An incoming HTTP request.
///
/// Besides the wire data it carries a string map of request-scoped metadata.
/// Handlers bound from a controller find [`CONTROLLER_KEY`] and [`ACTION_KEY`]
/// already set when they run.
#[derive(Debug)]
pub struct Request {
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) body: Vec<u8>,
    pub(crate) params: HashMap<String, String>,
    pub(crate) meta: HashMap<String, String>,
}

impl Request {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: Vec::new(),
            body: Vec::new(),
            params: HashMap::new(),
            meta: HashMap::new(),
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_owned(), value.to_owned()));
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    pub fn method(&self) -> Method { self.method }
    pub fn path(&self) -> &str { &self.path }
    pub fn headers(&self) -> &[(String, String)] { &self.headers }
    pub fn body(&self) -> &[u8] { &self.body }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Returns a named path parameter.
    ///
    /// For a route `/posts/:id`, `req.param("id")` on `/posts/42` returns `Some("42")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Records a request-scoped metadata value, replacing any previous one.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.meta.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.meta.get(key).map(String::as_str)
    }

    /// The controller type that served this request, if it came through one.
    pub fn controller_name(&self) -> Option<&str> {
        self.get(CONTROLLER_KEY)
    }

    pub fn action_name(&self) -> Option<&str> {
        self.get(ACTION_KEY)
    }
}
