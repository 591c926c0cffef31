//! Directive registry: directive kind -> constructor.

use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::rc::Rc;

use super::{Attribute, Directive, Event};

/// Builds a fresh directive instance for one binding slot.
pub type DirectiveFactory = Rc<dyn Fn() -> Box<dyn Directive>>;

/// Shared, mutable map from directive kind to constructor.
///
/// Clones share the same map, so a registration made through any clone is seen
/// by every patcher holding the registry from then on.
#[derive(Clone, Default)]
pub struct DirectiveRegistry {
    entries: Rc<RefCell<HashMap<String, DirectiveFactory>>>,
}

impl fmt::Debug for DirectiveRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut kinds = self.kinds();
        kinds.sort();
        f.debug_struct("DirectiveRegistry")
            .field("kinds", &kinds)
            .finish()
    }
}

impl DirectiveRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with the built-in `attr` and `on` directives.
    pub fn with_builtins(boolean_attributes: &BTreeSet<String>) -> Self {
        let registry = Self::new();
        let booleans = Rc::new(boolean_attributes.clone());
        registry.register("attr", move || Box::new(Attribute::new(Rc::clone(&booleans))));
        registry.register("on", || Box::new(Event::new()));
        registry
    }

    /// Register (or replace) the constructor for `kind`.
    pub fn register(&self, kind: impl Into<String>, factory: impl Fn() -> Box<dyn Directive> + 'static) {
        self.entries
            .borrow_mut()
            .insert(kind.into(), Rc::new(factory));
    }

    /// Remove `kind`. Returns whether it was registered.
    pub fn unregister(&self, kind: &str) -> bool {
        self.entries.borrow_mut().remove(kind).is_some()
    }

    pub fn resolve(&self, kind: &str) -> Option<DirectiveFactory> {
        self.entries.borrow().get(kind).cloned()
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.entries.borrow().contains_key(kind)
    }

    /// Registered kinds, unordered.
    pub fn kinds(&self) -> Vec<String> {
        self.entries.borrow().keys().cloned().collect()
    }
}
