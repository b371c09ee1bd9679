//! Middleware layer.
//!
//! A middleware receives the request and a [`Next`] continuation. It may
//! inspect or rewrite the request, call `next.run(req).await` to continue
//! down the chain, and post-process the response on the way back out.
//!
//! ```rust
//! use manifold::{MiddlewareFunc, Next, Request, Response};
//!
//! async fn log(req: Request, next: Next) -> Response {
//!     tracing::info!(path = req.path(), "request in");
//!     let res = next.run(req).await;
//!     tracing::info!(status = %res.status_code(), "request out");
//!     res
//! }
//!
//! let log = Some(MiddlewareFunc::new(log));
//! # let _ = log;
//! ```
//!
//! Middleware used on a group wraps the routes registered on that group
//! after it, outermost first.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use crate::handler::{BoxFuture, BoxedHandler};
use crate::request::Request;
use crate::response::IntoResponse;

#[doc(hidden)]
pub trait ErasedMiddleware {
    fn call(&self, req: Request, next: Next) -> BoxFuture;
}

/// A type-erased middleware shared across concurrent requests.
pub type BoxedMiddleware = Arc<dyn ErasedMiddleware + Send + Sync + 'static>;

/// Implemented for every valid middleware function.
///
/// Satisfied automatically by `Fn(Request, Next) -> impl Future<Output = impl IntoResponse>`.
pub trait Middleware: private::Sealed + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_middleware(self) -> BoxedMiddleware;
}

mod private {
    pub trait Sealed {}
}

impl<F, Fut, R> private::Sealed for F
where
    F: Fn(Request, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
}

impl<F, Fut, R> Middleware for F
where
    F: Fn(Request, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn into_boxed_middleware(self) -> BoxedMiddleware {
        Arc::new(FnMiddleware(self))
    }
}

struct FnMiddleware<F>(F);

impl<F, Fut, R> ErasedMiddleware for FnMiddleware<F>
where
    F: Fn(Request, Next) -> Fut + Send + Sync,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn call(&self, req: Request, next: Next) -> BoxFuture {
        let fut = (self.0)(req, next);
        Box::pin(async move { fut.await.into_response() })
    }
}

/// The declared type of a middleware field: `log: Option<MiddlewareFunc>`.
#[derive(Clone)]
pub struct MiddlewareFunc(pub(crate) BoxedMiddleware);

impl MiddlewareFunc {
    pub fn new(middleware: impl Middleware) -> Self {
        Self(middleware.into_boxed_middleware())
    }
}

impl fmt::Debug for MiddlewareFunc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MiddlewareFunc(..)")
    }
}

// ── Next ──────────────────────────────────────────────────────────────────────

/// The rest of the chain: remaining middleware, then the route handler.
pub struct Next {
    chain: Arc<[BoxedMiddleware]>,
    index: usize,
    endpoint: BoxedHandler,
}

impl Next {
    pub(crate) fn new(chain: Arc<[BoxedMiddleware]>, endpoint: BoxedHandler) -> Self {
        Self { chain, index: 0, endpoint }
    }

    /// Runs the remainder of the chain.
    pub fn run(mut self, req: Request) -> BoxFuture {
        match self.chain.get(self.index).cloned() {
            Some(middleware) => {
                self.index += 1;
                middleware.call(req, self)
            }
            None => self.endpoint.call(req),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::Handler;
    use crate::method::Method;
    use crate::response::Response;

    fn tag(label: &'static str) -> BoxedMiddleware {
        (move |req: Request, next: Next| async move {
            let inner = next.run(req).await;
            Response::text(format!("{label}({})", inner.body_str()))
        })
        .into_boxed_middleware()
    }

    #[tokio::test]
    async fn chain_runs_outermost_first() {
        let endpoint = (|_req: Request| async { "handler" }).into_boxed_handler();
        let chain: Arc<[BoxedMiddleware]> = vec![tag("a"), tag("b")].into();

        let res = Next::new(chain, endpoint).run(Request::new(Method::Get, "/")).await;
        assert_eq!(res.body_str(), "a(b(handler))");
    }

    #[tokio::test]
    async fn empty_chain_calls_endpoint() {
        let endpoint = (|req: Request| async move { req.path().to_owned() }).into_boxed_handler();
        let res = Next::new(Arc::from(Vec::new()), endpoint).run(Request::new(Method::Get, "/x")).await;
        assert_eq!(res.body_str(), "/x");
    }
}
