//! Surface events and listener callbacks.

use std::rc::Rc;

use super::node::SurfaceId;

/// Callback invoked when a matching event is dispatched on an element.
pub type Callback = Rc<dyn Fn(&SurfaceEvent)>;

/// Handle returned by [`Surface::add_listener`](super::Surface::add_listener).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub(crate) u64);

/// An event delivered to a surface element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceEvent {
    /// Event name (e.g. "click", "input").
    pub name: String,
    /// The element the event is dispatched on.
    pub target: SurfaceId,
    /// Payload for value-carrying events such as "input".
    pub value: Option<String>,
}

impl SurfaceEvent {
    pub fn new(name: impl Into<String>, target: SurfaceId) -> Self {
        Self {
            name: name.into(),
            target,
            value: None,
        }
    }

    /// Attach a value payload (builder).
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }
}
