//! The router a manifest is applied to.
//!
//! Any router can receive controller bindings by implementing these two
//! traits. [`Router`](crate::Router) is the in-crate implementation.

use crate::error::Error;
use crate::handler::BoxedHandler;
use crate::method::Method;
use crate::middleware::BoxedMiddleware;

/// A router that can open a group of routes under a base path.
pub trait RouteTarget {
    type Scope<'a>: RouteScope
    where
        Self: 'a;

    fn group(&mut self, base_path: &str) -> Self::Scope<'_>;
}

/// A routing group. Paths are relative to the group's base path.
///
/// Only [`route`](RouteScope::route) and
/// [`use_middleware`](RouteScope::use_middleware) are required; the verb
/// methods forward to `route` unless a router needs them to differ.
pub trait RouteScope {
    /// Registers middleware on the group. Applied in call order.
    fn use_middleware(&mut self, middleware: BoxedMiddleware);

    fn route(&mut self, method: Method, path: &str, handler: BoxedHandler) -> Result<(), Error>;

    fn get(&mut self, path: &str, handler: BoxedHandler) -> Result<(), Error> {
        self.route(Method::Get, path, handler)
    }

    fn post(&mut self, path: &str, handler: BoxedHandler) -> Result<(), Error> {
        self.route(Method::Post, path, handler)
    }

    fn put(&mut self, path: &str, handler: BoxedHandler) -> Result<(), Error> {
        self.route(Method::Put, path, handler)
    }

    fn patch(&mut self, path: &str, handler: BoxedHandler) -> Result<(), Error> {
        self.route(Method::Patch, path, handler)
    }

    fn delete(&mut self, path: &str, handler: BoxedHandler) -> Result<(), Error> {
        self.route(Method::Delete, path, handler)
    }

    fn head(&mut self, path: &str, handler: BoxedHandler) -> Result<(), Error> {
        self.route(Method::Head, path, handler)
    }

    fn options(&mut self, path: &str, handler: BoxedHandler) -> Result<(), Error> {
        self.route(Method::Options, path, handler)
    }

    fn connect(&mut self, path: &str, handler: BoxedHandler) -> Result<(), Error> {
        self.route(Method::Connect, path, handler)
    }

    fn trace(&mut self, path: &str, handler: BoxedHandler) -> Result<(), Error> {
        self.route(Method::Trace, path, handler)
    }
}

/// A scope's registration operation for one verb.
pub type Registrar = fn(&mut dyn RouteScope, &str, BoxedHandler) -> Result<(), Error>;

/// Maps a verb to the scope operation that registers it.
pub fn registrar(method: Method) -> Registrar {
    match method {
        Method::Get     => |s, p, h| s.get(p, h),
        Method::Post    => |s, p, h| s.post(p, h),
        Method::Put     => |s, p, h| s.put(p, h),
        Method::Patch   => |s, p, h| s.patch(p, h),
        Method::Delete  => |s, p, h| s.delete(p, h),
        Method::Head    => |s, p, h| s.head(p, h),
        Method::Options => |s, p, h| s.options(p, h),
        Method::Connect => |s, p, h| s.connect(p, h),
        Method::Trace   => |s, p, h| s.trace(p, h),
    }
}
