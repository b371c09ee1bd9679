//! Handler trait, type erasure, and the callable shapes a field can bind.
//!
//! # How handlers are stored
//!
//! A controller mixes handlers of different concrete types, and the router
//! holds all of them in one radix tree per method. Each handler is therefore
//! erased behind [`ErasedHandler`] and shared as a [`BoxedHandler`]:
//!
//! ```text
//! async fn show(self: Arc<Self>, req: Request) -> Response { … }   ← controller method
//!        ↓ actions.handler("show_func", Self::show_func)
//! move |req| show(Arc::clone(&ctrl), req)                         ← bound to the controller
//!        ↓ into_boxed_handler()
//! Arc<dyn ErasedHandler>                                          ← BoxedHandler
//! ```
//!
//! Per request that costs one `Arc` clone and one virtual call.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::middleware::BoxedMiddleware;
use crate::request::Request;
use crate::response::{IntoResponse, Response};

// ── Erased types ──────────────────────────────────────────────────────────────

/// A heap-allocated, type-erased future that resolves to a [`Response`].
pub type BoxFuture = Pin<Box<dyn Future<Output = Response> + Send + 'static>>;

/// Internal dispatch interface.
///
/// `#[doc(hidden)] pub` because it appears in the public [`BoxedHandler`]
/// alias and in [`Handler::into_boxed_handler`].
#[doc(hidden)]
pub trait ErasedHandler {
    fn call(&self, req: Request) -> BoxFuture;
}

/// A type-erased handler shared across concurrent requests.
pub type BoxedHandler = Arc<dyn ErasedHandler + Send + Sync + 'static>;

// ── Public Handler trait ──────────────────────────────────────────────────────

/// Implemented for every valid route handler.
///
/// Satisfied automatically by any function or closure with the signature
///
/// ```text
/// Fn(Request) -> impl Future<Output = impl IntoResponse>
/// ```
///
/// Sealed: only the blanket impl below can satisfy it.
pub trait Handler: private::Sealed + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_handler(self) -> BoxedHandler;
}

mod private {
    pub trait Sealed {}
}

impl<F, Fut, R> private::Sealed for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
}

impl<F, Fut, R> Handler for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn into_boxed_handler(self) -> BoxedHandler {
        Arc::new(FnHandler(self))
    }
}

struct FnHandler<F>(F);

impl<F, Fut, R> ErasedHandler for FnHandler<F>
where
    F: Fn(Request) -> Fut + Send + Sync,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn call(&self, req: Request) -> BoxFuture {
        let fut = (self.0)(req);
        Box::pin(async move { fut.await.into_response() })
    }
}

// ── Field types ───────────────────────────────────────────────────────────────

/// The declared type of a handler field: `index: Option<HandlerFunc>`.
///
/// Leave it `None` to bind the controller's `<field>_func` method, or assign
/// a handler at construction time:
///
/// ```rust
/// use manifold::{HandlerFunc, Request};
///
/// async fn index(_req: Request) -> &'static str { "all posts" }
///
/// let index = Some(HandlerFunc::new(index));
/// # let _ = index;
/// ```
#[derive(Clone)]
pub struct HandlerFunc(pub(crate) BoxedHandler);

impl HandlerFunc {
    pub fn new(handler: impl Handler) -> Self {
        Self(handler.into_boxed_handler())
    }
}

impl fmt::Debug for HandlerFunc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("HandlerFunc(..)")
    }
}

// ── Shapes ────────────────────────────────────────────────────────────────────

/// The calling convention of a bindable callable.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Shape {
    /// `Fn(Request) -> impl Future<Output = impl IntoResponse>`
    Handler,
    /// `Fn(Request, Next) -> impl Future<Output = impl IntoResponse>`
    Middleware,
}

impl Shape {
    /// Whether a callable of shape `other` can be stored in a field declared `self`.
    pub fn accepts(self, other: Shape) -> bool {
        self == other
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Handler => f.write_str("handler"),
            Self::Middleware => f.write_str("middleware"),
        }
    }
}

/// A located callable, before it is checked against its field.
#[derive(Clone)]
pub enum Callable {
    Handler(BoxedHandler),
    Middleware(BoxedMiddleware),
}

impl Callable {
    pub fn shape(&self) -> Shape {
        match self {
            Self::Handler(_) => Shape::Handler,
            Self::Middleware(_) => Shape::Middleware,
        }
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Callable::{:?}(..)", self.shape())
    }
}
