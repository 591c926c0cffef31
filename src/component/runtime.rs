//! Component runtime: one mounted instance with its stores and patcher.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, error, trace};

use super::{Component, RenderContext};
use crate::context::Context;
use crate::patch::{PatchError, Patcher};
use crate::reactive::{Listener, ObservedMap, Value};
use crate::surface::SurfaceId;
use crate::vnode::Node;

static NEXT_COMPONENT: AtomicU64 = AtomicU64::new(1);

/// Unique identity of a component instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId(u64);

impl ComponentId {
    pub(crate) fn next() -> Self {
        Self(NEXT_COMPONENT.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

struct Runtime {
    component: Box<dyn Component>,
    patcher: Option<Patcher>,
}

struct Shared {
    id: ComponentId,
    name: String,
    state: ObservedMap,
    props: ObservedMap,
    cx: Context,
    root: Cell<Option<SurfaceId>>,
    detached: Cell<bool>,
    error: RefCell<Option<PatchError>>,
    runtime: RefCell<Runtime>,
}

/// A live component instance.
///
/// Clones refer to the same instance. Any write to the instance's state or
/// props (including nested containers read from them) re-renders it and
/// patches its subtree in place.
#[derive(Clone)]
pub struct ComponentHandle(Rc<Shared>);

impl fmt::Debug for ComponentHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentHandle")
            .field("id", &self.0.id)
            .field("name", &self.0.name)
            .field("root", &self.0.root.get())
            .field("detached", &self.0.detached.get())
            .finish()
    }
}

impl ComponentHandle {
    /// Wrap `component` in a fresh, unmounted instance.
    ///
    /// If the component declares its own sub-components they are layered on
    /// top of `cx.components` for this instance's tree only.
    pub fn new(name: impl Into<String>, component: Box<dyn Component>, cx: &Context) -> Self {
        let own = component.components();
        let cx = if own.is_empty() {
            cx.clone()
        } else {
            cx.with_components(cx.components.extend_with(own))
        };
        let shared = Rc::new(Shared {
            id: ComponentId::next(),
            name: name.into(),
            state: component.state(),
            props: ObservedMap::new(),
            cx,
            root: Cell::new(None),
            detached: Cell::new(false),
            error: RefCell::new(None),
            runtime: RefCell::new(Runtime {
                component,
                patcher: None,
            }),
        });

        let weak: Weak<Shared> = Rc::downgrade(&shared);
        let alive = weak.clone();
        let listener = Listener::new(move || {
            if let Some(shared) = weak.upgrade() {
                ComponentHandle(shared).on_change();
            }
        })
        .with_liveness(move || alive.upgrade().is_some_and(|shared| !shared.detached.get()));
        shared.state.subscribe(listener.clone());
        shared.props.subscribe(listener);
        Self(shared)
    }

    pub fn id(&self) -> ComponentId {
        self.0.id
    }

    /// The tag this instance was created for.
    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn state(&self) -> ObservedMap {
        self.0.state.clone()
    }

    pub fn props(&self) -> ObservedMap {
        self.0.props.clone()
    }

    /// Current root surface node. `None` before mount and after detach.
    ///
    /// Read through the live tree, so a nested component that swapped its
    /// root is seen here too. While this instance is rendering, the root
    /// recorded at its last mount or update is returned instead.
    pub fn root(&self) -> Option<SurfaceId> {
        if self.0.detached.get() {
            return None;
        }
        match self.0.runtime.try_borrow() {
            Ok(runtime) => runtime.patcher.as_ref().and_then(Patcher::root),
            Err(_) => self.0.root.get(),
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.root().is_some()
    }

    pub fn is_detached(&self) -> bool {
        self.0.detached.get()
    }

    pub fn ptr_eq(&self, other: &ComponentHandle) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub fn context(&self) -> &Context {
        &self.0.cx
    }

    /// Render for the first time and put the result where `anchor` is.
    ///
    /// An attached anchor is replaced by the new root; a detached one is
    /// removed. Mounting an already-mounted instance returns its root.
    pub fn mount(&self, anchor: SurfaceId) -> Result<SurfaceId, PatchError> {
        if self.0.detached.get() {
            return Err(PatchError::ReconciliationImpossible(format!(
                "component `{}` ({}) is detached",
                self.0.name, self.0.id
            )));
        }
        let mut runtime = self.0.runtime.try_borrow_mut().map_err(|_| {
            PatchError::ReconciliationImpossible(format!(
                "component `{}` ({}) is already rendering",
                self.0.name, self.0.id
            ))
        })?;
        if let Some(root) = runtime.patcher.as_ref().and_then(Patcher::root) {
            return Ok(root);
        }

        let tree = self.render(&*runtime.component);
        let mut patcher = Patcher::new(self.0.cx.clone());
        let root = patcher.mount(tree)?;

        let surface = &self.0.cx.surface;
        if surface.parent(anchor).is_some() {
            surface.replace(anchor, root)?;
        } else if surface.contains(anchor) {
            let was_root = surface.root() == Some(anchor);
            surface.remove(anchor)?;
            if was_root {
                surface.set_root(root)?;
            }
        }

        runtime.patcher = Some(patcher);
        self.0.root.set(Some(root));
        self.0.cx.lifecycle.borrow_mut().on_mount(self.0.id, &self.0.name);
        debug!(component = %self.0.id, name = %self.0.name, "mounted");
        Ok(root)
    }

    /// Re-render and patch against the last tree.
    ///
    /// A no-op before mount, after detach, or while this instance is already
    /// rendering (a write from inside its own render or patch).
    pub fn update(&self) -> Result<(), PatchError> {
        self.patch_with(|component| self.render(component))
    }

    /// Patch against an explicitly supplied tree instead of calling render.
    pub fn update_with(&self, tree: Node) -> Result<(), PatchError> {
        self.patch_with(move |_| tree)
    }

    fn patch_with(&self, next: impl FnOnce(&dyn Component) -> Node) -> Result<(), PatchError> {
        if self.0.detached.get() {
            return Ok(());
        }
        let Ok(mut runtime) = self.0.runtime.try_borrow_mut() else {
            trace!(component = %self.0.id, "update skipped: already rendering");
            return Ok(());
        };
        let Runtime { component, patcher } = &mut *runtime;
        let Some(patcher) = patcher.as_mut() else {
            return Ok(());
        };
        let tree = next(&**component);
        patcher.update(tree)?;
        self.0.root.set(patcher.root());
        self.0.cx.lifecycle.borrow_mut().on_update(self.0.id);
        trace!(component = %self.0.id, name = %self.0.name, "updated");
        Ok(())
    }

    /// Merge `partial` into the props as one write, then surface any error
    /// from the re-render it caused.
    pub fn set_props(&self, partial: impl IntoIterator<Item = (String, Value)>) -> Result<(), PatchError> {
        self.0.props.assign(partial);
        self.take_error()
    }

    /// The error from the last listener-driven re-render, if it failed.
    pub fn take_error(&self) -> Result<(), PatchError> {
        match self.0.error.borrow_mut().take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Stop rendering for good and detach every nested component.
    ///
    /// The surface nodes are left to whoever removed this instance's root.
    pub fn detach(&self) {
        if self.0.detached.replace(true) {
            return;
        }
        self.0.root.set(None);
        let patcher = match self.0.runtime.try_borrow_mut() {
            Ok(mut runtime) => runtime.patcher.take(),
            Err(_) => None,
        };
        if let Some(tree) = patcher.and_then(Patcher::into_tree) {
            tree.detach_components();
        }
        self.0.cx.lifecycle.borrow_mut().on_detach(self.0.id);
        debug!(component = %self.0.id, name = %self.0.name, "detached");
    }

    fn render(&self, component: &dyn Component) -> Node {
        component.render(&RenderContext {
            state: &self.0.state,
            props: &self.0.props,
        })
    }

    fn on_change(&self) {
        if let Err(err) = self.update() {
            error!(component = %self.0.id, name = %self.0.name, error = %err, "re-render failed");
            *self.0.error.borrow_mut() = Some(err);
        }
    }
}
