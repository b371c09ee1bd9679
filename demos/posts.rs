//! A posts controller bound from field annotations, driven in-process.
//!
//! Run with:
//!   RUST_LOG=debug cargo run --example posts
//!
//! Prints the compiled manifest, then sends a few requests through the router.

use std::sync::Arc;

use http::StatusCode;
use manifold::{
    Controller, HandlerFunc, Manifest, Method, MiddlewareFunc, Namespace, Next, Request, Response,
    Router, controller,
};

controller! {
    #[derive(Clone, Default)]
    pub struct Posts {
        ns: Namespace,
        store: String,
        #[route = "*"]
        log: Option<MiddlewareFunc>,
        #[route = "GET /"]
        index: Option<HandlerFunc>,
        #[route = "POST /"]
        create: Option<HandlerFunc>,
        #[route = "GET /:id"]
        show: Option<HandlerFunc>,
        #[route = "DELETE /:id"]
        del: Option<HandlerFunc>,
    }
    actions {
        middleware log_func;
        handler index_func;
        handler show_func;
        handler del_func;
    }
}

impl Posts {
    async fn log_func(self: Arc<Self>, req: Request, next: Next) -> Response {
        let (method, path) = (req.method(), req.path().to_owned());
        let res = next.run(req).await;
        tracing::info!(%method, path = %path, status = %res.status_code(), "served");
        res
    }

    async fn index_func(self: Arc<Self>, _req: Request) -> Response {
        Response::json(format!(r#"[{{"id":"1","store":"{}"}}]"#, self.store).into_bytes())
    }

    async fn show_func(self: Arc<Self>, req: Request) -> Response {
        let id = req.param("id").unwrap_or("unknown");
        let served_by = format!(
            "{}#{}",
            req.controller_name().unwrap_or("-"),
            req.action_name().unwrap_or("-"),
        );
        Response::builder()
            .header("x-served-by", &served_by)
            .json(format!(r#"{{"id":"{id}"}}"#).into_bytes())
    }

    async fn del_func(self: Arc<Self>, _req: Request) -> StatusCode {
        StatusCode::NO_CONTENT
    }
}

impl Controller for Posts {
    fn base_path(&self) -> &str { self.ns.path() }
}

// Assigned on the field instead of defined as `create_func`.
async fn create(req: Request) -> Response {
    if req.body().is_empty() {
        return Response::status(StatusCode::BAD_REQUEST);
    }
    Response::builder()
        .status(StatusCode::CREATED)
        .header("location", "/posts/99")
        .json(br#"{"id":"99"}"#.to_vec())
}

#[tokio::main]
async fn main() -> Result<(), manifold::Error> {
    tracing_subscriber::fmt::init();

    let posts = Posts {
        ns: Namespace::new("/posts"),
        store: "memory".into(),
        create: Some(HandlerFunc::new(create)),
        ..Posts::default()
    };

    for binding in Manifest::compile(&Arc::new(posts.clone()))? {
        tracing::info!(field = binding.binding.field_name, route = ?binding.route, "manifest");
    }

    let app = Router::new().mount(posts)?;

    let requests = [
        Request::new(Method::Get, "/posts"),
        Request::new(Method::Get, "/posts/42"),
        Request::new(Method::Post, "/posts").with_body(r#"{"title":"hello"}"#),
        Request::new(Method::Post, "/posts"),
        Request::new(Method::Delete, "/posts/42"),
        Request::new(Method::Get, "/comments"),
    ];
    for req in requests {
        let line = format!("{} {}", req.method(), req.path());
        let res = app.handle(req).await;
        println!(
            "{line} -> {} {} {}",
            res.status_code(),
            res.header("x-served-by").unwrap_or("-"),
            res.body_str(),
        );
    }
    Ok(())
}
