//! Field bindings: from a parsed annotation to a callable ready for the router.

use std::fmt;
use std::sync::Arc;

use tracing::trace;

use crate::annotation::Annotation;
use crate::error::Error;
use crate::handler::{BoxFuture, BoxedHandler, Callable, ErasedHandler, Shape};
use crate::method::Method;
use crate::middleware::BoxedMiddleware;
use crate::reflect::Actions;
use crate::request::{ACTION_KEY, CONTROLLER_KEY, Request};

/// Suffix of the convention method bound to a field: `show` → `show_func`.
pub const FUNC_SUFFIX: &str = "_func";

/// Everything known about one annotated field before its callable is found.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FieldBinding {
    pub field_name: &'static str,
    /// The name the callable is searched under. Always the field name.
    pub action_name: &'static str,
    pub declared: Shape,
    pub annotation: Annotation,
}

impl FieldBinding {
    pub fn new(field_name: &'static str, declared: Shape, annotation: Annotation) -> Self {
        Self { field_name, action_name: field_name, declared, annotation }
    }

    /// The convention method name, eg `index_func`.
    pub fn method_name(&self) -> String {
        format!("{}{FUNC_SUFFIX}", self.action_name)
    }
}

/// Finds the callable for `binding` on `controller`.
///
/// The registered `<action>_func` method wins; otherwise the value assigned to
/// the field is used. Whichever is selected must fit the field's declared shape.
pub fn resolve_callable<C: Send + Sync + 'static>(
    actions: &Actions<C>,
    controller: &Arc<C>,
    binding: &FieldBinding,
    assigned: Option<Callable>,
) -> Result<Callable, Error> {
    let method_name = binding.method_name();
    let callable = match actions.bind(&method_name, controller) {
        Some(callable) => {
            trace!(action = binding.action_name, method = %method_name, "resolved convention method");
            callable
        }
        None => match assigned {
            Some(callable) => {
                trace!(action = binding.action_name, "resolved assigned field value");
                callable
            }
            None => return Err(Error::ActionNotFound(binding.action_name.to_owned())),
        },
    };

    if !binding.declared.accepts(callable.shape()) {
        return Err(Error::TypeMismatch(binding.action_name.to_owned()));
    }
    Ok(callable)
}

// ── ResolvedBinding ───────────────────────────────────────────────────────────

/// What a resolved binding registers on the router.
#[derive(Clone)]
pub enum Route {
    Middleware(BoxedMiddleware),
    Handler { method: Method, path: String, handler: BoxedHandler },
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Middleware(_) => f.write_str("Use(..)"),
            Self::Handler { method, path, .. } => write!(f, "{method} {path}"),
        }
    }
}

/// A field binding paired with its callable.
#[derive(Clone, Debug)]
pub struct ResolvedBinding {
    pub binding: FieldBinding,
    pub controller_name: &'static str,
    pub route: Route,
}

impl ResolvedBinding {
    /// Pairs `binding` with `callable`.
    ///
    /// Fails with [`Error::TypeMismatch`] if the callable does not fit the
    /// declared shape or the annotation kind. Handlers are wrapped so each
    /// request records the controller and action names before it runs.
    pub fn new(
        binding: FieldBinding,
        callable: Callable,
        controller_name: &'static str,
    ) -> Result<Self, Error> {
        let mismatch = || Error::TypeMismatch(binding.action_name.to_owned());
        if !binding.declared.accepts(callable.shape()) {
            return Err(mismatch());
        }

        let route = match (&binding.annotation, callable) {
            (Annotation::Middleware, Callable::Middleware(middleware)) => Route::Middleware(middleware),
            (Annotation::Handler { method, path }, Callable::Handler(handler)) => Route::Handler {
                method: *method,
                path: path.clone(),
                handler: Arc::new(ActionHandler {
                    controller: controller_name,
                    action: binding.action_name,
                    inner: handler,
                }),
            },
            _ => return Err(mismatch()),
        };

        Ok(Self { binding, controller_name, route })
    }
}

/// A handler that stamps route metadata on the request, then delegates.
struct ActionHandler {
    controller: &'static str,
    action: &'static str,
    inner: BoxedHandler,
}

impl ErasedHandler for ActionHandler {
    fn call(&self, mut req: Request) -> BoxFuture {
        req.set(CONTROLLER_KEY, self.controller);
        req.set(ACTION_KEY, self.action);
        self.inner.call(req)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::Handler;
    use crate::middleware::{Middleware, Next};
    use crate::response::Response;

    struct Ctrl {
        greeting: &'static str,
    }

    fn handler_callable(body: &'static str) -> Callable {
        Callable::Handler((move |_req: Request| async move { body }).into_boxed_handler())
    }

    fn middleware_callable() -> Callable {
        Callable::Middleware((|req: Request, next: Next| next.run(req)).into_boxed_middleware())
    }

    fn actions() -> Actions<Ctrl> {
        let mut actions = Actions::new();
        actions
            .handler("index_func", |ctrl: Arc<Ctrl>, _req: Request| async move { ctrl.greeting })
            .middleware("wrong_func", |_ctrl: Arc<Ctrl>, req: Request, next: Next| next.run(req));
        actions
    }

    fn get(path: &str) -> Annotation {
        Annotation::Handler { method: Method::Get, path: path.to_owned() }
    }

    async fn body_of(callable: Callable) -> String {
        let Callable::Handler(handler) = callable else {
            panic!("expected a handler");
        };
        let res: Response = handler.call(Request::new(Method::Get, "/")).await;
        res.body_str().into_owned()
    }

    #[test]
    fn action_name_defaults_to_field_name() {
        let binding = FieldBinding::new("show", Shape::Handler, get("/:id"));
        assert_eq!(binding.action_name, "show");
        assert_eq!(binding.method_name(), "show_func");
    }

    #[tokio::test]
    async fn convention_method_wins_over_assigned_value() {
        let ctrl = Arc::new(Ctrl { greeting: "from method" });
        let binding = FieldBinding::new("index", Shape::Handler, get("/"));

        let callable = resolve_callable(&actions(), &ctrl, &binding, Some(handler_callable("from field"))).unwrap();
        assert_eq!(body_of(callable).await, "from method");
    }

    #[tokio::test]
    async fn falls_back_to_assigned_value() {
        let ctrl = Arc::new(Ctrl { greeting: "unused" });
        let binding = FieldBinding::new("create", Shape::Handler, get("/"));

        let callable = resolve_callable(&actions(), &ctrl, &binding, Some(handler_callable("from field"))).unwrap();
        assert_eq!(body_of(callable).await, "from field");
    }

    #[test]
    fn missing_action_is_reported_by_name() {
        let ctrl = Arc::new(Ctrl { greeting: "" });
        let binding = FieldBinding::new("create", Shape::Handler, get("/"));

        match resolve_callable(&actions(), &ctrl, &binding, None) {
            Err(Error::ActionNotFound(name)) => assert_eq!(name, "create"),
            other => panic!("expected ActionNotFound, got {other:?}"),
        }
    }

    #[test]
    fn wrongly_shaped_method_is_a_type_mismatch() {
        let ctrl = Arc::new(Ctrl { greeting: "" });
        let binding = FieldBinding::new("wrong", Shape::Handler, get("/"));

        match resolve_callable(&actions(), &ctrl, &binding, None) {
            Err(Error::TypeMismatch(name)) => assert_eq!(name, "wrong"),
            other => panic!("expected TypeMismatch, got {other:?}"),
        }
    }

    #[test]
    fn middleware_annotation_on_handler_field_is_a_type_mismatch() {
        let binding = FieldBinding::new("index", Shape::Handler, Annotation::Middleware);
        match ResolvedBinding::new(binding, handler_callable(""), "Ctrl") {
            Err(Error::TypeMismatch(name)) => assert_eq!(name, "index"),
            other => panic!("expected TypeMismatch, got {other:?}"),
        }

        let binding = FieldBinding::new("log", Shape::Middleware, get("/"));
        assert!(matches!(
            ResolvedBinding::new(binding, middleware_callable(), "Ctrl"),
            Err(Error::TypeMismatch(_))
        ));
    }

    #[tokio::test]
    async fn wrapped_handler_records_route_metadata() {
        let inner = |req: Request| async move {
            format!("{}#{}", req.controller_name().unwrap_or("-"), req.action_name().unwrap_or("-"))
        };
        let binding = FieldBinding::new("show", Shape::Handler, get("/:id"));
        let resolved = ResolvedBinding::new(binding, Callable::Handler(inner.into_boxed_handler()), "Posts").unwrap();

        let Route::Handler { method, path, handler } = resolved.route else {
            panic!("expected a handler route");
        };
        assert_eq!((method, path.as_str()), (Method::Get, "/:id"));

        let res = handler.call(Request::new(Method::Get, "/posts/1")).await;
        assert_eq!(res.body_str(), "Posts#show");
    }
}
