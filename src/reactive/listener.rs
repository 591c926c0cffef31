//! Listener sets and batched notification.
//!
//! Listeners are identified callbacks. A [`Listeners`] set deduplicates by id,
//! so merging the same listener in twice (a parent and a child component
//! observing the same data) still fires it once per write.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_LISTENER: AtomicU64 = AtomicU64::new(1);

/// Identifies a listener across every set it has been merged into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerKey(u64);

/// A callback invoked after every write to an observed container.
///
/// A listener may carry a liveness check. Once it reports `false` the
/// listener is dropped from every set it is found in.
#[derive(Clone)]
pub struct Listener {
    key: ListenerKey,
    callback: Rc<dyn Fn()>,
    alive: Option<Rc<dyn Fn() -> bool>>,
}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Listener").field(&self.key.0).finish()
    }
}

impl Listener {
    pub fn new(callback: impl Fn() + 'static) -> Self {
        Self {
            key: ListenerKey(NEXT_LISTENER.fetch_add(1, Ordering::Relaxed)),
            callback: Rc::new(callback),
            alive: None,
        }
    }

    /// Attach a liveness check (builder).
    pub fn with_liveness(mut self, alive: impl Fn() -> bool + 'static) -> Self {
        self.alive = Some(Rc::new(alive));
        self
    }

    pub fn key(&self) -> ListenerKey {
        self.key
    }

    pub fn is_alive(&self) -> bool {
        self.alive.as_ref().map_or(true, |alive| alive())
    }

    fn fire(&self) {
        (self.callback)();
    }
}

/// An ordered set of listeners, deduplicated by [`ListenerKey`].
#[derive(Debug, Clone, Default)]
pub struct Listeners {
    entries: Vec<Listener>,
}

impl From<Listener> for Listeners {
    fn from(listener: Listener) -> Self {
        Self {
            entries: vec![listener],
        }
    }
}

impl Listeners {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a listener. Returns `false` if it was already present or is dead.
    pub fn insert(&mut self, listener: Listener) -> bool {
        if self.contains(listener.key) || !listener.is_alive() {
            return false;
        }
        self.entries.push(listener);
        true
    }

    /// Union `other` into this set, dropping dead listeners from both.
    pub fn merge(&mut self, other: &Listeners) {
        self.prune();
        for listener in &other.entries {
            self.insert(listener.clone());
        }
    }

    /// Drop every listener whose liveness check fails.
    pub fn prune(&mut self) {
        self.entries.retain(Listener::is_alive);
    }

    pub fn contains(&self, key: ListenerKey) -> bool {
        self.entries.iter().any(|l| l.key == key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Notification
// ---------------------------------------------------------------------------

#[derive(Default)]
struct BatchState {
    /// When > 0 we are inside a `batch()` call and listeners are deferred.
    depth: usize,
    pending: Listeners,
}

thread_local! {
    static BATCH: RefCell<BatchState> = RefCell::new(BatchState::default());
}

/// Fire every listener in `listeners`, or defer them if a batch is open.
///
/// No borrow is held while callbacks run, so a listener may write to observed
/// data again.
pub(crate) fn notify(listeners: Listeners) {
    if listeners.is_empty() {
        return;
    }
    let deferred = BATCH.with(|state| {
        let mut state = state.borrow_mut();
        if state.depth > 0 {
            state.pending.merge(&listeners);
            true
        } else {
            false
        }
    });
    if !deferred {
        for listener in &listeners.entries {
            listener.fire();
        }
    }
}

/// Run `f` with notifications deferred until the outermost batch ends.
///
/// Each listener fires at most once for the whole batch, no matter how many
/// writes reached it.
///
/// ```ignore
/// batch(|| {
///     state.set("a", 1);
///     state.set("b", 2);
/// });
/// // Listeners on `state` run once here.
/// ```
pub fn batch<R>(f: impl FnOnce() -> R) -> R {
    BATCH.with(|state| state.borrow_mut().depth += 1);

    let result = f();

    let pending = BATCH.with(|state| {
        let mut state = state.borrow_mut();
        state.depth -= 1;
        if state.depth == 0 {
            std::mem::take(&mut state.pending)
        } else {
            Listeners::new()
        }
    });
    notify(pending);
    result
}
