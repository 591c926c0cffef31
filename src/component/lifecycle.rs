//! Component lifecycle: mount, update, detach.
//!
//! The `LifecycleTracker` records which component instances are currently
//! mounted and accumulates lifecycle events (`Mount`, `Update`, `Detach`) that
//! can be drained by the embedding application or by tests.

use std::collections::HashSet;

use super::runtime::ComponentId;

// ---------------------------------------------------------------------------
// LifecycleEvent
// ---------------------------------------------------------------------------

/// Events that occur during a component's lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// A component instance rendered for the first time and was attached.
    Mount { component: ComponentId, name: String },
    /// A mounted component re-rendered and patched its tree.
    Update { component: ComponentId },
    /// A component instance was dropped from the live tree; it will not render again.
    Detach { component: ComponentId },
}

// ---------------------------------------------------------------------------
// LifecycleTracker
// ---------------------------------------------------------------------------

/// Tracks which components are mounted and accumulates lifecycle events.
#[derive(Debug, Default)]
pub struct LifecycleTracker {
    mounted: HashSet<ComponentId>,
    pending: Vec<LifecycleEvent>,
}

impl LifecycleTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that a component has been mounted.
    ///
    /// If it was already mounted, this is a no-op (no duplicate event).
    pub fn on_mount(&mut self, id: ComponentId, name: &str) {
        if self.mounted.insert(id) {
            self.pending.push(LifecycleEvent::Mount {
                component: id,
                name: name.to_owned(),
            });
        }
    }

    /// Record that a mounted component re-rendered. No-op if not mounted.
    pub fn on_update(&mut self, id: ComponentId) {
        if self.mounted.contains(&id) {
            self.pending.push(LifecycleEvent::Update { component: id });
        }
    }

    /// Record that a component was detached. No-op if not mounted.
    pub fn on_detach(&mut self, id: ComponentId) {
        if self.mounted.remove(&id) {
            self.pending.push(LifecycleEvent::Detach { component: id });
        }
    }

    pub fn is_mounted(&self, id: ComponentId) -> bool {
        self.mounted.contains(&id)
    }

    /// The number of currently mounted components.
    pub fn mounted_count(&self) -> usize {
        self.mounted.len()
    }

    /// Drain and return all pending lifecycle events.
    pub fn pending_events(&mut self) -> Vec<LifecycleEvent> {
        std::mem::take(&mut self.pending)
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }
}

// ===========================================================================
// Tests
// ===========================================================================
