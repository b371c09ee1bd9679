//! Radix-tree request router.
//!
//! One tree per HTTP method, O(path-length) lookup. Routes are registered
//! directly with [`Router::on`] or through groups, which is how controllers
//! arrive: [`Router::mount`] opens a group at the controller's base path and
//! applies its manifest.

use std::collections::HashMap;
use std::sync::Arc;

use http::StatusCode;
use matchit::Router as MatchitRouter;

use crate::contract::Controller;
use crate::error::Error;
use crate::handler::{BoxedHandler, Handler};
use crate::manifest;
use crate::method::Method;
use crate::middleware::{BoxedMiddleware, Next};
use crate::reflect::Reflect;
use crate::request::Request;
use crate::response::Response;
use crate::target::{RouteScope, RouteTarget};

/// A registered route: its handler and the middleware wrapping it.
#[derive(Clone)]
struct Endpoint {
    handler: BoxedHandler,
    chain: Arc<[BoxedMiddleware]>,
}

/// The application router.
///
/// Build it once at startup, then feed it requests with [`Router::handle`].
pub struct Router {
    routes: HashMap<Method, MatchitRouter<Endpoint>>,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: HashMap::new() }
    }

    /// Registers a handler for a method + path pair. Returns `self` for chaining.
    ///
    /// Paths use `:name` parameters and a trailing `*name` catch-all:
    ///
    /// ```rust
    /// # use manifold::{Method, Request, Router};
    /// # async fn show(_: Request) -> &'static str { "" }
    /// let router = Router::new().on(Method::Get, "/posts/:id", show)?;
    /// # Ok::<(), manifold::Error>(())
    /// ```
    pub fn on(mut self, method: Method, path: &str, handler: impl Handler) -> Result<Self, Error> {
        self.insert(method, path, handler.into_boxed_handler(), Arc::from(Vec::new()))?;
        Ok(self)
    }

    /// Binds a controller's annotated fields under its base path.
    pub fn mount<C: Controller + Reflect>(mut self, controller: C) -> Result<Self, Error> {
        manifest::bind(&Arc::new(controller), &mut self)?;
        Ok(self)
    }

    /// Dispatches one request through the matching route's middleware chain.
    ///
    /// Unmatched requests get `404 Not Found`.
    pub async fn handle(&self, mut req: Request) -> Response {
        match self.lookup(req.method, &req.path) {
            Some((endpoint, params)) => {
                req.params = params;
                Next::new(endpoint.chain, endpoint.handler).run(req).await
            }
            None => Response::status(StatusCode::NOT_FOUND),
        }
    }

    fn insert(
        &mut self,
        method: Method,
        path: &str,
        handler: BoxedHandler,
        chain: Arc<[BoxedMiddleware]>,
    ) -> Result<(), Error> {
        self.routes
            .entry(method)
            .or_default()
            .insert(to_matchit(path), Endpoint { handler, chain })
            .map_err(|source| Error::InvalidRoute { path: path.to_owned(), source })
    }

    fn lookup(&self, method: Method, path: &str) -> Option<(Endpoint, HashMap<String, String>)> {
        let tree = self.routes.get(&method)?;
        let matched = tree.at(path).ok()?;
        let endpoint = matched.value.clone();
        let params = matched.params.iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect();
        Some((endpoint, params))
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}

// ── Groups ────────────────────────────────────────────────────────────────────

/// Routes sharing a path prefix and a middleware stack.
pub struct Group<'r> {
    router: &'r mut Router,
    prefix: String,
    middleware: Vec<BoxedMiddleware>,
}

impl Router {
    /// Opens a group at `prefix`. Empty means the root.
    pub fn group(&mut self, prefix: &str) -> Group<'_> {
        let prefix = prefix.trim_end_matches('/').to_owned();
        Group { router: self, prefix, middleware: Vec::new() }
    }
}

impl RouteTarget for Router {
    type Scope<'a> = Group<'a>;

    fn group(&mut self, base_path: &str) -> Group<'_> {
        Router::group(self, base_path)
    }
}

impl RouteScope for Group<'_> {
    fn use_middleware(&mut self, middleware: BoxedMiddleware) {
        self.middleware.push(middleware);
    }

    fn route(&mut self, method: Method, path: &str, handler: BoxedHandler) -> Result<(), Error> {
        let full = join(&self.prefix, path);
        let chain: Arc<[BoxedMiddleware]> = self.middleware.clone().into();
        self.router.insert(method, &full, handler, chain)
    }
}

/// Joins a group prefix (no trailing `/`) and a route path.
///
/// The route `/` addresses the group itself: `/posts` + `/` is `/posts`.
fn join(prefix: &str, path: &str) -> String {
    let path = path.trim_start_matches('/');
    match (prefix.is_empty(), path.is_empty()) {
        (true, true) => "/".to_owned(),
        (false, true) => prefix.to_owned(),
        _ => format!("{prefix}/{path}"),
    }
}

/// Rewrites `:name` and `*name` segments into the radix tree's `{name}` and
/// `{*name}`. Braces anywhere else are escaped and match literally.
fn to_matchit(path: &str) -> String {
    path.split('/')
        .map(|segment| match segment.as_bytes().first() {
            Some(b':') => format!("{{{}}}", &segment[1..]),
            Some(b'*') => format!("{{*{}}}", &segment[1..]),
            _ => segment.replace('{', "{{").replace('}', "}}"),
        })
        .collect::<Vec<_>>()
        .join("/")
}
