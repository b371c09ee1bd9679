//! The controller contract.

use crate::reflect::Reflect;

/// A value whose annotated fields describe a group of routes.
///
/// The only capability required is the base path the group is opened at.
pub trait Controller {
    /// The namespace routes are grouped under, eg `/posts`.
    fn base_path(&self) -> &str;
}

/// A plain base-path holder for controllers to compose.
///
/// ```rust
/// use manifold::{Controller, Namespace};
///
/// struct Posts { ns: Namespace }
///
/// impl Controller for Posts {
///     fn base_path(&self) -> &str { self.ns.path() }
/// }
///
/// assert_eq!(Posts { ns: Namespace::new("/posts") }.base_path(), "/posts");
/// assert_eq!(Namespace::default().path(), "/");
/// ```
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Namespace(String);

impl Namespace {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// The base path; empty normalizes to the router root `/`.
    pub fn path(&self) -> &str {
        if self.0.is_empty() { "/" } else { &self.0 }
    }
}

impl From<&str> for Namespace {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

impl Controller for Namespace {
    fn base_path(&self) -> &str {
        self.path()
    }
}

/// A bare namespace has no fields, so binding one is a shape error.
impl Reflect for Namespace {}
