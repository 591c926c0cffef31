//! Components: render functions bound to reactive state.
//!
//! A [`Component`] describes how to turn state and props into a tree. The
//! runtime ([`ComponentHandle`]) owns the instance together with its store,
//! its props and the patcher holding its last rendered tree, and re-renders on
//! every write to either store.

pub mod lifecycle;
pub mod registry;
pub mod runtime;

pub use lifecycle::{LifecycleEvent, LifecycleTracker};
pub use registry::{factory, ComponentFactory, ComponentRegistry, TagKind};
pub use runtime::{ComponentHandle, ComponentId};

use crate::reactive::ObservedMap;
use crate::vnode::Node;

/// What render gets to read.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    pub state: &'a ObservedMap,
    pub props: &'a ObservedMap,
}

/// A user-defined component.
pub trait Component {
    /// Initial reactive state. Called once per instance.
    fn state(&self) -> ObservedMap {
        ObservedMap::new()
    }

    /// Sub-components visible only inside this component's tree, on top of the
    /// registry it was mounted with.
    fn components(&self) -> Vec<(String, ComponentFactory)> {
        Vec::new()
    }

    /// Describe the current tree. Must not write to `cx.state` or `cx.props`.
    fn render(&self, cx: &RenderContext<'_>) -> Node;
}

impl<F> Component for F
where
    F: Fn(&RenderContext<'_>) -> Node,
{
    fn render(&self, cx: &RenderContext<'_>) -> Node {
        self(cx)
    }
}
