//! Everything a patcher needs to reconcile against one surface.

use std::cell::RefCell;
use std::rc::Rc;

use crate::component::{ComponentRegistry, LifecycleTracker};
use crate::directive::DirectiveRegistry;
use crate::surface::Surface;

/// The shared environment of a mounted tree.
///
/// Cloning is cheap; clones share the surface, both registries and the
/// lifecycle tracker.
#[derive(Debug, Clone)]
pub struct Context {
    pub surface: Surface,
    pub components: ComponentRegistry,
    pub directives: DirectiveRegistry,
    pub lifecycle: Rc<RefCell<LifecycleTracker>>,
}

impl Context {
    pub fn new(
        surface: Surface,
        components: ComponentRegistry,
        directives: DirectiveRegistry,
    ) -> Self {
        Self {
            surface,
            components,
            directives,
            lifecycle: Rc::default(),
        }
    }

    /// Same surface, directives and tracker, different component registry.
    pub fn with_components(&self, components: ComponentRegistry) -> Self {
        Self {
            components,
            ..self.clone()
        }
    }
}
