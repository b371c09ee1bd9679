//! # manifold
//!
//! Declarative route binding. A controller is a struct whose fields carry
//! route annotations; manifold compiles those fields, once, at startup, into
//! an ordered list of router registrations and applies it.
//!
//! ## The pipeline
//!
//! For every field, in declaration order:
//!
//! 1. **Parse** its annotation: `""` (plain data, skipped), `"*"` (middleware)
//!    or `"METHOD /path"` (handler).
//! 2. **Describe** the binding. The action name is the field name.
//! 3. **Resolve** the callable: the controller's `<field>_func` method if it
//!    registered one, else the handler assigned to the field. It must fit the
//!    field's declared type.
//! 4. **Apply** it to the controller's router group: `use` for middleware, the
//!    verb's registration for handlers. Handlers are wrapped so every request
//!    records which controller and action served it.
//!
//! The first failure stops the walk and is returned from [`bind`]. Nothing is
//! rolled back: the router keeps whatever was registered before it.
//!
//! ## Quick start
//!
//! ```rust
//! use std::sync::Arc;
//! use manifold::{controller, Controller, HandlerFunc, Method, Namespace, Request, Router};
//!
//! controller! {
//!     #[derive(Default)]
//!     pub struct Posts {
//!         ns: Namespace,
//!         #[route = "GET /"]
//!         index: Option<HandlerFunc>,
//!         #[route = "GET /:id"]
//!         show: Option<HandlerFunc>,
//!     }
//!     actions {
//!         handler show_func;
//!     }
//! }
//!
//! impl Posts {
//!     async fn show_func(self: Arc<Self>, req: Request) -> String {
//!         let action = req.action_name().unwrap_or_default();
//!         format!("{action} {}", req.param("id").unwrap_or("?"))
//!     }
//! }
//!
//! impl Controller for Posts {
//!     fn base_path(&self) -> &str { self.ns.path() }
//! }
//!
//! async fn index(_req: Request) -> &'static str { "all posts" }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), manifold::Error> {
//!     let posts = Posts {
//!         ns: Namespace::new("/posts"),
//!         index: Some(HandlerFunc::new(index)),
//!         ..Posts::default()
//!     };
//!
//!     let app = Router::new().mount(posts)?;
//!     let res = app.handle(Request::new(Method::Get, "/posts/7")).await;
//!     assert_eq!(res.body_str(), "show 7");
//!     Ok(())
//! }
//! ```

mod annotation;
mod binding;
mod contract;
mod error;
mod handler;
mod manifest;
mod method;
mod reflect;
mod request;
mod response;
mod router;
mod target;

pub mod middleware;

pub use annotation::{Annotation, MIDDLEWARE, trim_path};
pub use binding::{FUNC_SUFFIX, FieldBinding, ResolvedBinding, Route, resolve_callable};
pub use contract::{Controller, Namespace};
pub use error::Error;
pub use handler::{BoxFuture, BoxedHandler, Callable, Handler, HandlerFunc, Shape};
#[doc(hidden)]
pub use handler::ErasedHandler;
pub use manifest::{Manifest, bind};
pub use method::Method;
pub use middleware::{BoxedMiddleware, Middleware, MiddlewareFunc, Next};
pub use reflect::{Actions, Field, Layout, Reflect, Slot};
pub use request::{ACTION_KEY, CONTROLLER_KEY, Request};
pub use response::{IntoResponse, Response, ResponseBuilder};
pub use router::{Group, Router};
pub use target::{Registrar, RouteScope, RouteTarget, registrar};
