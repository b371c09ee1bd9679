//! Load-time introspection over controller types.
//!
//! Rust has no runtime reflection, so a controller describes itself:
//!
//! - [`Reflect::layout`] lists its fields in declaration order, each with its
//!   raw annotation, declared [`Shape`] and any value assigned to it.
//! - [`Reflect::actions`] fills an [`Actions`] registry with the convention
//!   methods (`<field>_func`) the resolver may bind.
//!
//! The [`controller!`](crate::controller!) macro writes both from a struct
//! definition, so most code never implements this trait by hand.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use crate::handler::{Callable, Handler, HandlerFunc, Shape};
use crate::middleware::{Middleware, MiddlewareFunc, Next};
use crate::request::Request;
use crate::response::IntoResponse;

/// Self-description of a controller type.
pub trait Reflect: Send + Sync + Sized + 'static {
    /// The controller's type name, recorded on every request it serves.
    fn type_name(&self) -> &'static str {
        let full = std::any::type_name::<Self>();
        let path = full.split('<').next().unwrap_or(full);
        path.rsplit("::").next().unwrap_or(path)
    }

    /// The value's fields, or [`Layout::Opaque`] if it has none to bind.
    fn layout(&self) -> Layout {
        Layout::Opaque
    }

    /// Registers the controller's convention methods.
    fn actions(actions: &mut Actions<Self>) {
        let _ = actions;
    }
}

/// The decomposition of a controller value.
#[derive(Debug)]
pub enum Layout {
    /// A record type, fields in declaration order.
    Record(Vec<Field>),
    /// A scalar or otherwise non-decomposable value.
    Opaque,
}

/// One field of a record controller.
#[derive(Debug)]
pub struct Field {
    pub name: &'static str,
    /// The raw annotation, empty for plain data fields.
    pub annotation: &'static str,
    /// `None` for plain data fields, whose type is not a [`Slot`].
    pub declared: Option<Shape>,
    pub assigned: Option<Callable>,
}

impl Field {
    pub fn plain(name: &'static str) -> Self {
        Self { name, annotation: "", declared: None, assigned: None }
    }

    pub fn routed(
        name: &'static str,
        annotation: &'static str,
        declared: Shape,
        assigned: Option<Callable>,
    ) -> Self {
        Self { name, annotation, declared: Some(declared), assigned }
    }
}

// ── Slots ─────────────────────────────────────────────────────────────────────

/// A field type that can hold a bindable callable.
pub trait Slot {
    /// The shape a callable must have to be stored here.
    const SHAPE: Shape;

    /// The callable assigned at construction time, if any.
    fn assigned(&self) -> Option<Callable>;
}

impl Slot for Option<HandlerFunc> {
    const SHAPE: Shape = Shape::Handler;

    fn assigned(&self) -> Option<Callable> {
        self.as_ref().map(|h| Callable::Handler(Arc::clone(&h.0)))
    }
}

impl Slot for Option<MiddlewareFunc> {
    const SHAPE: Shape = Shape::Middleware;

    fn assigned(&self) -> Option<Callable> {
        self.as_ref().map(|m| Callable::Middleware(Arc::clone(&m.0)))
    }
}

// ── Actions ───────────────────────────────────────────────────────────────────

type Binder<C> = Box<dyn Fn(&Arc<C>) -> Callable + Send + Sync>;

/// Named convention methods of controller type `C`.
///
/// Each entry binds to a shared controller instance on lookup, so the method
/// can read the controller's fields through `self: Arc<Self>`.
pub struct Actions<C> {
    entries: HashMap<&'static str, Binder<C>>,
}

impl<C: Send + Sync + 'static> Actions<C> {
    pub fn new() -> Self {
        Self { entries: HashMap::new() }
    }

    /// Registers a handler method, eg `actions.handler("show_func", Self::show_func)`.
    pub fn handler<F, Fut, R>(&mut self, name: &'static str, method: F) -> &mut Self
    where
        F: Fn(Arc<C>, Request) -> Fut + Clone + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoResponse + Send + 'static,
    {
        let bind = move |ctrl: &Arc<C>| {
            let ctrl = Arc::clone(ctrl);
            let method = method.clone();
            let handler = move |req: Request| method(Arc::clone(&ctrl), req);
            Callable::Handler(handler.into_boxed_handler())
        };
        self.entries.insert(name, Box::new(bind));
        self
    }

    /// Registers a middleware method, eg `actions.middleware("log_func", Self::log_func)`.
    pub fn middleware<F, Fut, R>(&mut self, name: &'static str, method: F) -> &mut Self
    where
        F: Fn(Arc<C>, Request, Next) -> Fut + Clone + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoResponse + Send + 'static,
    {
        let bind = move |ctrl: &Arc<C>| {
            let ctrl = Arc::clone(ctrl);
            let method = method.clone();
            let middleware = move |req: Request, next: Next| method(Arc::clone(&ctrl), req, next);
            Callable::Middleware(middleware.into_boxed_middleware())
        };
        self.entries.insert(name, Box::new(bind));
        self
    }

    /// Looks up `name` and binds it to `controller`.
    pub fn bind(&self, name: &str, controller: &Arc<C>) -> Option<Callable> {
        self.entries.get(name).map(|bind| bind(controller))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }
}

impl<C: Reflect> Actions<C> {
    /// Builds the registry declared by `C`.
    pub fn of() -> Self {
        let mut actions = Self::new();
        C::actions(&mut actions);
        actions
    }
}

impl<C: Send + Sync + 'static> Default for Actions<C> {
    fn default() -> Self { Self::new() }
}

impl<C> fmt::Debug for Actions<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.entries.keys()).finish()
    }
}

// ── Macro ─────────────────────────────────────────────────────────────────────

/// Declares a controller struct and derives its [`Reflect`] implementation.
///
/// Route fields carry a `#[route = "..."]` attribute and are typed
/// `Option<HandlerFunc>` or `Option<MiddlewareFunc>`. Fields without it are
/// plain data. Any other field attributes, doc comments included, pass through
/// to the struct in any order around `#[route]`. The optional `actions` block
/// registers the convention methods, each as `handler` or `middleware`.
///
/// ```rust
/// use std::sync::Arc;
/// use manifold::{controller, Controller, HandlerFunc, MiddlewareFunc, Namespace, Next, Request, Response};
///
/// controller! {
///     #[derive(Default)]
///     pub struct Posts {
///         ns: Namespace,
///         #[route = "*"]
///         log: Option<MiddlewareFunc>,
///         /// Single post.
///         #[route = "GET /:id"]
///         show: Option<HandlerFunc>,
///     }
///     actions {
///         middleware log_func;
///         handler show_func;
///     }
/// }
///
/// impl Posts {
///     async fn log_func(self: Arc<Self>, req: Request, next: Next) -> Response {
///         next.run(req).await
///     }
///
///     async fn show_func(self: Arc<Self>, req: Request) -> String {
///         format!("post {}", req.param("id").unwrap_or("?"))
///     }
/// }
///
/// impl Controller for Posts {
///     fn base_path(&self) -> &str { self.ns.path() }
/// }
/// ```
#[macro_export]
macro_rules! controller {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident { $($body:tt)* }
        $(
            actions {
                $($kind:ident $func:ident;)*
            }
        )?
    ) => {
        $crate::__controller! {
            @head [$(#[$meta])* $vis struct $name]
            @name $name
            @actions [$($($kind $func;)*)?]
            @fields []
            @layout []
            @attrs []
            @tag []
            @rest [$($body)*]
        }
    };
}

/// Walks a controller body one attribute or field at a time.
#[doc(hidden)]
#[macro_export]
macro_rules! __controller {
    // Body exhausted: emit the struct and its `Reflect` impl.
    (
        @head [$($head:tt)*]
        @name $name:ident
        @actions [$($kind:ident $func:ident;)*]
        @fields [$($field:tt)*]
        @layout [$(($lname:ident, $lty:ty, $ltag:tt))*]
        @attrs []
        @tag []
        @rest []
    ) => {
        $($head)* {
            $($field)*
        }

        impl $crate::Reflect for $name {
            fn type_name(&self) -> &'static str {
                stringify!($name)
            }

            fn layout(&self) -> $crate::Layout {
                $crate::Layout::Record(vec![
                    $($crate::__field!(self, $lname, $lty, $ltag),)*
                ])
            }

            fn actions(actions: &mut $crate::Actions<Self>) {
                let _ = &actions;
                $(actions.$kind(stringify!($func), Self::$func);)*
            }
        }
    };

    // `#[route = "..."]` is consumed, not emitted.
    (
        @head $head:tt @name $name:ident @actions $actions:tt
        @fields $fields:tt @layout $layout:tt @attrs $attrs:tt @tag $old:tt
        @rest [#[route = $tag:literal] $($rest:tt)*]
    ) => {
        $crate::__controller! {
            @head $head @name $name @actions $actions
            @fields $fields @layout $layout @attrs $attrs @tag [$tag]
            @rest [$($rest)*]
        }
    };

    (
        @head $head:tt @name $name:ident @actions $actions:tt
        @fields $fields:tt @layout $layout:tt @attrs [$($attr:tt)*] @tag $tag:tt
        @rest [#[$($meta:tt)*] $($rest:tt)*]
    ) => {
        $crate::__controller! {
            @head $head @name $name @actions $actions
            @fields $fields @layout $layout @attrs [$($attr)* #[$($meta)*]] @tag $tag
            @rest [$($rest)*]
        }
    };

    (
        @head $head:tt @name $name:ident @actions $actions:tt
        @fields [$($field:tt)*] @layout [$($entry:tt)*] @attrs [$($attr:tt)*] @tag [$($tag:tt)*]
        @rest [$fvis:vis $fname:ident : $fty:ty $(, $($rest:tt)*)?]
    ) => {
        $crate::__controller! {
            @head $head @name $name @actions $actions
            @fields [$($field)* $($attr)* $fvis $fname: $fty,]
            @layout [$($entry)* ($fname, $fty, [$($tag)*])]
            @attrs [] @tag []
            @rest [$($($rest)*)?]
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __field {
    ($this:ident, $field:ident, $ty:ty, []) => {
        $crate::Field::plain(stringify!($field))
    };
    ($this:ident, $field:ident, $ty:ty, [$tag:literal]) => {
        $crate::Field::routed(
            stringify!($field),
            $tag,
            <$ty as $crate::Slot>::SHAPE,
            $crate::Slot::assigned(&$this.$field),
        )
    };
}
