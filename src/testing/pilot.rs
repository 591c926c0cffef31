//! Pilot: programmatic interaction with a mounted component.
//!
//! The `Pilot` mounts a root component into a fresh [`App`] and provides
//! methods to simulate user events on surface elements and to inspect the
//! resulting document.

use crate::app::{App, AppConfig};
use crate::component::{Component, ComponentHandle};
use crate::patch::PatchError;
use crate::surface::{SurfaceEvent, SurfaceId};

// ---------------------------------------------------------------------------
// Pilot
// ---------------------------------------------------------------------------

/// A headless driver for testing one root component.
///
/// # Examples
///
/// ```ignore
/// use veneer::testing::Pilot;
///
/// let pilot = Pilot::new("counter", Counter)?;
/// let button = pilot.first("button").unwrap();
/// pilot.click(button)?;
/// assert!(pilot.markup().contains("1"));
/// ```
#[derive(Debug)]
pub struct Pilot {
    app: App,
    root: ComponentHandle,
}

impl Pilot {
    /// Mount `component` as `name` in an app with the default config.
    pub fn new(name: &str, component: impl Component + 'static) -> Result<Self, PatchError> {
        Self::with_config(AppConfig::default(), name, component)
    }

    /// Mount `component` as `name` in an app built from `config`.
    pub fn with_config(
        config: AppConfig,
        name: &str,
        component: impl Component + 'static,
    ) -> Result<Self, PatchError> {
        Self::with_app(App::new(config), name, component)
    }

    /// Mount into an existing app, e.g. one with components already registered.
    pub fn with_app(
        app: App,
        name: &str,
        component: impl Component + 'static,
    ) -> Result<Self, PatchError> {
        let root = app.mount(name, component)?;
        Ok(Self { app, root })
    }

    // ── Input simulation ─────────────────────────────────────────────

    /// Dispatch `click` on `target`.
    pub fn click(&self, target: SurfaceId) -> Result<usize, PatchError> {
        self.dispatch(&SurfaceEvent::new("click", target))
    }

    /// Dispatch `input` on `target` carrying `value`.
    pub fn input(&self, target: SurfaceId, value: &str) -> Result<usize, PatchError> {
        self.dispatch(&SurfaceEvent::new("input", target).with_value(value))
    }

    /// Dispatch `event`, then surface any error from the re-renders it caused.
    ///
    /// Returns the number of listeners that ran.
    pub fn dispatch(&self, event: &SurfaceEvent) -> Result<usize, PatchError> {
        let delivered = self.app.surface().dispatch(event)?;
        self.root.take_error()?;
        Ok(delivered)
    }

    // ── Query ────────────────────────────────────────────────────────

    /// Markup of the root component.
    pub fn markup(&self) -> String {
        self.root
            .root()
            .map(|root| self.app.surface().to_markup(root))
            .unwrap_or_default()
    }

    /// All elements with tag `tag`, in document order.
    pub fn query(&self, tag: &str) -> Vec<SurfaceId> {
        self.app.surface().query_by_tag(tag)
    }

    pub fn first(&self, tag: &str) -> Option<SurfaceId> {
        self.app.surface().query_first(tag)
    }

    /// All elements whose attribute `name` equals `value`.
    pub fn by_attribute(&self, name: &str, value: &str) -> Vec<SurfaceId> {
        self.app.surface().query_by_attribute(name, value)
    }

    /// Concatenated text content of `id`'s subtree.
    pub fn text_of(&self, id: SurfaceId) -> String {
        let surface = self.app.surface();
        surface
            .walk_depth_first(id)
            .into_iter()
            .filter_map(|node| surface.text(node))
            .collect()
    }

    /// Borrow the underlying app.
    pub fn app(&self) -> &App {
        &self.app
    }

    /// The mounted root component.
    pub fn root(&self) -> &ComponentHandle {
        &self.root
    }
}

// ===========================================================================
// Tests
// ===========================================================================
