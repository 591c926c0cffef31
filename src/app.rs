//! App struct: one surface, its registries, and the components mounted on it.
//!
//! [`App`] owns the [`Context`] every mounted component shares. Components are
//! mounted as direct children of the document root.

use std::collections::BTreeSet;

use tracing::info;

use crate::component::{Component, ComponentHandle, ComponentRegistry, LifecycleEvent};
use crate::context::Context;
use crate::directive::attribute::BOOLEAN_ATTRIBUTES;
use crate::directive::{Directive, DirectiveRegistry};
use crate::patch::PatchError;
use crate::surface::{Surface, SurfaceId};

// ---------------------------------------------------------------------------
// AppConfig
// ---------------------------------------------------------------------------

/// Configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Tag of the document root components are mounted under.
    pub root_tag: String,
    /// Record every surface mutation for later inspection.
    pub record_mutations: bool,
    /// Attributes rendered by presence rather than value.
    pub boolean_attributes: BTreeSet<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            root_tag: "body".to_owned(),
            record_mutations: false,
            boolean_attributes: BOOLEAN_ATTRIBUTES.iter().map(|s| (*s).to_owned()).collect(),
        }
    }
}

impl AppConfig {
    /// Create a new default config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the root tag (builder).
    pub fn with_root_tag(mut self, tag: impl Into<String>) -> Self {
        self.root_tag = tag.into();
        self
    }

    /// Enable or disable mutation recording (builder).
    pub fn with_record_mutations(mut self, on: bool) -> Self {
        self.record_mutations = on;
        self
    }

    /// Treat `name` as a boolean attribute (builder).
    pub fn with_boolean_attribute(mut self, name: impl Into<String>) -> Self {
        self.boolean_attributes.insert(name.into());
        self
    }
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

/// The main application struct.
///
/// Registries are shared with every mounted component, so registrations made
/// after mount affect later patches.
#[derive(Debug)]
pub struct App {
    cx: Context,
    body: SurfaceId,
    config: AppConfig,
}

impl App {
    pub fn new(config: AppConfig) -> Self {
        let surface = Surface::new();
        let body = surface.create_root(&config.root_tag);
        surface.record_mutations(config.record_mutations);
        let cx = Context::new(
            surface,
            ComponentRegistry::new(),
            DirectiveRegistry::with_builtins(&config.boolean_attributes),
        );
        Self { cx, body, config }
    }

    /// Register a component under tag `name`.
    pub fn register<C: Component + 'static>(
        &self,
        name: impl Into<String>,
        make: impl Fn() -> C + 'static,
    ) {
        self.cx.components.register(name, make);
    }

    pub fn unregister(&self, name: &str) -> bool {
        self.cx.components.unregister(name)
    }

    /// Register a directive kind. Bindings of that kind are bound from the next patch on.
    pub fn register_directive(
        &self,
        kind: impl Into<String>,
        make: impl Fn() -> Box<dyn Directive> + 'static,
    ) {
        self.cx.directives.register(kind, make);
    }

    /// Append `component` to the document root and mount it.
    pub fn mount(
        &self,
        name: &str,
        component: impl Component + 'static,
    ) -> Result<ComponentHandle, PatchError> {
        let handle = ComponentHandle::new(name, Box::new(component), &self.cx);
        self.attach(handle)
    }

    /// Mount a fresh instance of the component registered as `name`.
    pub fn mount_registered(&self, name: &str) -> Result<ComponentHandle, PatchError> {
        let factory = self
            .cx
            .components
            .resolve(name)
            .ok_or_else(|| PatchError::UnknownComponent(name.to_owned()))?;
        let handle = ComponentHandle::new(name, factory(), &self.cx);
        self.attach(handle)
    }

    fn attach(&self, handle: ComponentHandle) -> Result<ComponentHandle, PatchError> {
        let anchor = self.cx.surface.create_element(handle.name());
        self.cx.surface.append_child(self.body, anchor)?;
        let root = handle.mount(anchor)?;
        info!(component = %handle.id(), name = handle.name(), root = ?root, "component mounted");
        Ok(handle)
    }

    /// Markup of the whole document.
    pub fn markup(&self) -> String {
        self.cx.surface.to_markup(self.body)
    }

    pub fn surface(&self) -> &Surface {
        &self.cx.surface
    }

    pub fn context(&self) -> &Context {
        &self.cx
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// The document root.
    pub fn body(&self) -> SurfaceId {
        self.body
    }

    /// Drain lifecycle events recorded since the last call.
    pub fn lifecycle_events(&self) -> Vec<LifecycleEvent> {
        self.cx.lifecycle.borrow_mut().pending_events()
    }
}

// ===========================================================================
// Tests
// ===========================================================================
