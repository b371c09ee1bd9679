//! Applying controllers to a recording route target.

use std::sync::Arc;

use manifold::{
    BoxedHandler, BoxedMiddleware, Controller, Error, ErasedHandler, HandlerFunc, Manifest, Method,
    MiddlewareFunc, Namespace, Next, Request, Response, RouteScope, RouteTarget, bind, controller,
};

// ── Recording target ──────────────────────────────────────────────────────────

enum Call {
    Group(String),
    Use(BoxedMiddleware),
    Route(Method, String, BoxedHandler),
}

impl Call {
    fn describe(&self) -> String {
        match self {
            Call::Group(path) => format!("group {path}"),
            Call::Use(_) => "use".to_owned(),
            Call::Route(method, path, _) => format!("{method} {path}"),
        }
    }
}

#[derive(Default)]
struct Recorder {
    calls: Vec<Call>,
}

impl Recorder {
    fn described(&self) -> Vec<String> {
        self.calls.iter().map(Call::describe).collect()
    }

    fn handler(&self, index: usize) -> BoxedHandler {
        match &self.calls[index] {
            Call::Route(_, _, handler) => Arc::clone(handler),
            _ => panic!("call {index} is not a route"),
        }
    }
}

struct RecordingScope<'a> {
    calls: &'a mut Vec<Call>,
}

impl RouteTarget for Recorder {
    type Scope<'a> = RecordingScope<'a>;

    fn group(&mut self, base_path: &str) -> RecordingScope<'_> {
        self.calls.push(Call::Group(base_path.to_owned()));
        RecordingScope { calls: &mut self.calls }
    }
}

impl RouteScope for RecordingScope<'_> {
    fn use_middleware(&mut self, middleware: BoxedMiddleware) {
        self.calls.push(Call::Use(middleware));
    }

    fn route(&mut self, method: Method, path: &str, handler: BoxedHandler) -> Result<(), Error> {
        self.calls.push(Call::Route(method, path.to_owned(), handler));
        Ok(())
    }
}

// ── Controllers ───────────────────────────────────────────────────────────────

controller! {
    #[derive(Default)]
    struct Logged {
        ns: Namespace,
        #[route = "*"]
        log: Option<MiddlewareFunc>,
        #[route = "GET /"]
        index: Option<HandlerFunc>,
    }
    actions {
        middleware log_func;
        handler index_func;
    }
}

impl Logged {
    async fn log_func(self: Arc<Self>, req: Request, next: Next) -> Response {
        next.run(req).await
    }

    async fn index_func(self: Arc<Self>, _req: Request) -> &'static str {
        "index"
    }
}

impl Controller for Logged {
    fn base_path(&self) -> &str { self.ns.path() }
}

controller! {
    #[derive(Default)]
    struct Posts {
        ns: Namespace,
        #[route = "GET /:id"]
        show: Option<HandlerFunc>,
    }
    actions {
        handler show_func;
    }
}

impl Posts {
    async fn show_func(self: Arc<Self>, req: Request) -> String {
        format!(
            "{}#{} {}",
            req.controller_name().unwrap_or("-"),
            req.action_name().unwrap_or("-"),
            req.param("id").unwrap_or("-"),
        )
    }
}

impl Controller for Posts {
    fn base_path(&self) -> &str { self.ns.path() }
}

controller! {
    #[derive(Default)]
    struct Unbacked {
        ns: Namespace,
        #[route = "GET /"]
        index: Option<HandlerFunc>,
    }
}

impl Controller for Unbacked {
    fn base_path(&self) -> &str { self.ns.path() }
}

controller! {
    #[derive(Default)]
    struct Misshapen {
        ns: Namespace,
        #[route = "GET /"]
        index: Option<HandlerFunc>,
    }
    actions {
        middleware index_func;
    }
}

impl Misshapen {
    async fn index_func(self: Arc<Self>, req: Request, next: Next) -> Response {
        next.run(req).await
    }
}

impl Controller for Misshapen {
    fn base_path(&self) -> &str { self.ns.path() }
}

controller! {
    #[derive(Default)]
    struct HalfBroken {
        ns: Namespace,
        #[route = "GET /"]
        index: Option<HandlerFunc>,
        #[route = "GET /:id"]
        show: Option<HandlerFunc>,
        #[route = "POST /"]
        create: Option<HandlerFunc>,
    }
    actions {
        handler index_func;
        handler create_func;
    }
}

impl HalfBroken {
    async fn index_func(self: Arc<Self>, _req: Request) -> &'static str { "index" }
    async fn create_func(self: Arc<Self>, _req: Request) -> &'static str { "create" }
}

impl Controller for HalfBroken {
    fn base_path(&self) -> &str { self.ns.path() }
}

controller! {
    #[derive(Default)]
    struct BadTag {
        ns: Namespace,
        #[route = "FETCH /"]
        index: Option<HandlerFunc>,
    }
}

impl Controller for BadTag {
    fn base_path(&self) -> &str { self.ns.path() }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn middleware_then_handler_in_field_order() {
    let mut target = Recorder::default();
    bind(&Arc::new(Logged::default()), &mut target).unwrap();

    assert_eq!(target.described(), ["group /", "use", "GET /"]);
    let res = target.handler(2).call(Request::new(Method::Get, "/")).await;
    assert_eq!(res.body_str(), "index");
}

#[tokio::test]
async fn handler_runs_with_route_metadata() {
    let mut target = Recorder::default();
    let posts = Posts { ns: Namespace::new("/posts"), ..Posts::default() };
    bind(&Arc::new(posts), &mut target).unwrap();

    assert_eq!(target.described(), ["group /posts", "GET /:id"]);

    let res = target.handler(1).call(Request::new(Method::Get, "/posts/42")).await;
    assert_eq!(res.body_str(), "Posts#show -");
}

#[test]
fn missing_action_names_the_field() {
    let mut target = Recorder::default();
    match bind(&Arc::new(Unbacked::default()), &mut target) {
        Err(Error::ActionNotFound(name)) => assert_eq!(name, "index"),
        other => panic!("expected ActionNotFound, got {other:?}"),
    }
}

#[test]
fn assigned_field_value_satisfies_the_binding() {
    let mut target = Recorder::default();
    let ctrl = Unbacked {
        index: Some(HandlerFunc::new(|_req: Request| async { "assigned" })),
        ..Unbacked::default()
    };
    bind(&Arc::new(ctrl), &mut target).unwrap();
    assert_eq!(target.described(), ["group /", "GET /"]);
}

#[test]
fn wrongly_shaped_method_is_a_type_mismatch() {
    let mut target = Recorder::default();
    match bind(&Arc::new(Misshapen::default()), &mut target) {
        Err(Error::TypeMismatch(name)) => assert_eq!(name, "index"),
        other => panic!("expected TypeMismatch, got {other:?}"),
    }
}

#[test]
fn non_record_controller_fails_before_any_router_call() {
    let mut target = Recorder::default();
    match bind(&Arc::new(Namespace::new("/posts")), &mut target) {
        Err(Error::ControllerShape(name)) => assert_eq!(name, "Namespace"),
        other => panic!("expected ControllerShape, got {other:?}"),
    }
    assert!(target.calls.is_empty());
}

#[test]
fn first_failure_stops_without_rollback() {
    let mut target = Recorder::default();
    let result = bind(&Arc::new(HalfBroken::default()), &mut target);

    assert!(matches!(result, Err(Error::ActionNotFound(ref name)) if name == "show"));
    assert_eq!(target.described(), ["group /", "GET /"]);
}

#[test]
fn annotation_errors_propagate_from_bind() {
    let mut target = Recorder::default();
    match bind(&Arc::new(BadTag::default()), &mut target) {
        Err(Error::UnsupportedMethod(method)) => assert_eq!(method, "FETCH"),
        other => panic!("expected UnsupportedMethod, got {other:?}"),
    }
}

#[test]
fn compile_resolves_without_a_router() {
    let bindings = Manifest::compile(&Arc::new(Logged::default())).unwrap();
    let fields: Vec<_> = bindings.iter().map(|b| b.binding.field_name).collect();
    assert_eq!(fields, ["log", "index"]);
    assert!(bindings.iter().all(|b| b.controller_name == "Logged"));

    assert!(Manifest::compile(&Arc::new(HalfBroken::default())).is_err());
}
