//! Building a controller's manifest and applying it to a router.
//!
//! The manifest is the controller's annotated fields, resolved in declaration
//! order. Field order is registration order: middleware declared above a
//! handler wraps it, middleware declared below does not.

use std::sync::Arc;

use tracing::{debug, info, trace};

use crate::annotation::Annotation;
use crate::binding::{FieldBinding, ResolvedBinding, Route, resolve_callable};
use crate::contract::Controller;
use crate::error::Error;
use crate::reflect::{Actions, Field, Layout, Reflect};
use crate::target::{RouteScope, RouteTarget, registrar};

/// The resolved bindings of one controller, produced lazily in field order.
///
/// Iteration stops being useful at the first `Err`: [`bind`] bails there.
pub struct Manifest<C> {
    controller: Arc<C>,
    controller_name: &'static str,
    actions: Actions<C>,
    fields: std::vec::IntoIter<Field>,
}

impl<C: Reflect> Manifest<C> {
    /// Starts a manifest for `controller`.
    ///
    /// Fails with [`Error::ControllerShape`] unless the controller is a record.
    pub fn new(controller: &Arc<C>) -> Result<Self, Error> {
        let controller_name = controller.type_name();
        let Layout::Record(fields) = controller.layout() else {
            return Err(Error::ControllerShape(controller_name));
        };

        Ok(Self {
            controller: Arc::clone(controller),
            controller_name,
            actions: Actions::of(),
            fields: fields.into_iter(),
        })
    }

    /// Resolves every binding up front, without touching a router.
    pub fn compile(controller: &Arc<C>) -> Result<Vec<ResolvedBinding>, Error> {
        Self::new(controller)?.collect()
    }

    fn resolve(&self, field: Field) -> Result<Option<ResolvedBinding>, Error> {
        let Some(annotation) = Annotation::parse(field.annotation)? else {
            trace!(controller = self.controller_name, field = field.name, "skipping plain field");
            return Ok(None);
        };
        // Hand-written layouts may leave `declared` unset.
        let declared = field.declared.unwrap_or(annotation.shape());

        let binding = FieldBinding::new(field.name, declared, annotation);
        let callable = resolve_callable(&self.actions, &self.controller, &binding, field.assigned)?;
        ResolvedBinding::new(binding, callable, self.controller_name).map(Some)
    }
}

impl<C: Reflect> Iterator for Manifest<C> {
    type Item = Result<ResolvedBinding, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let field = self.fields.next()?;
            match self.resolve(field) {
                Ok(Some(binding)) => return Some(Ok(binding)),
                Ok(None) => continue,
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

impl ResolvedBinding {
    /// Registers this binding on `scope`.
    pub fn apply(self, scope: &mut dyn RouteScope) -> Result<(), Error> {
        match self.route {
            Route::Middleware(middleware) => {
                debug!(
                    controller = self.controller_name,
                    field = self.binding.field_name,
                    "use middleware"
                );
                scope.use_middleware(middleware);
                Ok(())
            }
            Route::Handler { method, path, handler } => {
                debug!(
                    controller = self.controller_name,
                    action = self.binding.action_name,
                    %method,
                    path = %path,
                    "route"
                );
                registrar(method)(scope, &path, handler)
            }
        }
    }
}

/// Applies `controller` to `target`, one binding at a time.
///
/// Opens a group at the controller's base path, then walks the fields in
/// declaration order, registering each binding as soon as it resolves. The
/// first failure aborts the walk; bindings already registered stay on the
/// router.
pub fn bind<C, T>(controller: &Arc<C>, target: &mut T) -> Result<(), Error>
where
    C: Controller + Reflect,
    T: RouteTarget + ?Sized,
{
    let manifest = Manifest::new(controller)?;
    let controller_name = manifest.controller_name;
    let base_path = controller.base_path();

    let mut scope = target.group(base_path);
    let (mut routes, mut middleware) = (0usize, 0usize);
    for resolved in manifest {
        let resolved = resolved?;
        if resolved.binding.annotation.is_middleware() {
            middleware += 1;
        } else {
            routes += 1;
        }
        resolved.apply(&mut scope)?;
    }

    info!(controller = controller_name, base_path, routes, middleware, "controller bound");
    Ok(())
}
