//! Component registry: tag name -> component constructor.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use super::Component;

/// Builds a fresh component instance.
pub type ComponentFactory = Rc<dyn Fn() -> Box<dyn Component>>;

/// Wrap a constructor closure as a [`ComponentFactory`].
pub fn factory<C: Component + 'static>(make: impl Fn() -> C + 'static) -> ComponentFactory {
    Rc::new(move || Box::new(make()))
}

/// How a tag is treated during reconciliation.
#[derive(Clone)]
pub enum TagKind {
    /// A plain surface element. Unknown tags land here; there is no unknown-tag error.
    Native,
    Component(ComponentFactory),
}

impl fmt::Debug for TagKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagKind::Native => f.write_str("Native"),
            TagKind::Component(_) => f.write_str("Component(..)"),
        }
    }
}

/// Shared, mutable map from tag name to component constructor.
///
/// Clones share the same map. [`ComponentRegistry::extend_with`] instead
/// produces an independent registry, used for components that bring their own
/// sub-component registrations.
#[derive(Clone, Default)]
pub struct ComponentRegistry {
    entries: Rc<RefCell<HashMap<String, ComponentFactory>>>,
}

impl fmt::Debug for ComponentRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names = self.names();
        names.sort();
        f.debug_struct("ComponentRegistry")
            .field("names", &names)
            .finish()
    }
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the constructor for tag `name`.
    pub fn register<C: Component + 'static>(
        &self,
        name: impl Into<String>,
        make: impl Fn() -> C + 'static,
    ) {
        self.register_factory(name, factory(make));
    }

    pub fn register_factory(&self, name: impl Into<String>, factory: ComponentFactory) {
        self.entries.borrow_mut().insert(name.into(), factory);
    }

    /// Remove `name`. Already-mounted instances are unaffected.
    pub fn unregister(&self, name: &str) -> bool {
        self.entries.borrow_mut().remove(name).is_some()
    }

    pub fn resolve(&self, name: &str) -> Option<ComponentFactory> {
        self.entries.borrow().get(name).cloned()
    }

    /// Decide once whether `tag` is a component or a plain element.
    pub fn resolve_tag(&self, tag: &str) -> TagKind {
        self.resolve(tag).map_or(TagKind::Native, TagKind::Component)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.borrow().contains_key(name)
    }

    /// Registered names, unordered.
    pub fn names(&self) -> Vec<String> {
        self.entries.borrow().keys().cloned().collect()
    }

    /// A new, independent registry holding this registry's entries plus `own`.
    /// Entries in `own` win on conflict.
    pub fn extend_with(&self, own: impl IntoIterator<Item = (String, ComponentFactory)>) -> Self {
        let mut entries = self.entries.borrow().clone();
        entries.extend(own);
        Self {
            entries: Rc::new(RefCell::new(entries)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::RenderContext;
    use crate::vnode::{element, Node};

    struct Leaf(&'static str);

    impl Component for Leaf {
        fn render(&self, _cx: &RenderContext<'_>) -> Node {
            element(self.0).into()
        }
    }

    #[test]
    fn resolve_tag_distinguishes_components() {
        let registry = ComponentRegistry::new();
        registry.register("todo-item", || Leaf("li"));
        assert!(matches!(registry.resolve_tag("todo-item"), TagKind::Component(_)));
        assert!(matches!(registry.resolve_tag("div"), TagKind::Native));
    }

    #[test]
    fn unregister_removes() {
        let registry = ComponentRegistry::new();
        registry.register("x", || Leaf("p"));
        assert!(registry.unregister("x"));
        assert!(!registry.contains("x"));
        assert!(!registry.unregister("x"));
    }

    #[test]
    fn extend_with_is_independent_union() {
        let parent = ComponentRegistry::new();
        parent.register("shared", || Leaf("p"));
        let child = parent.extend_with([("own".to_owned(), factory(|| Leaf("span")))]);

        assert!(child.contains("shared"));
        assert!(child.contains("own"));
        assert!(!parent.contains("own"));

        parent.register("later", || Leaf("b"));
        assert!(!child.contains("later"));
    }

    #[test]
    fn factory_builds_fresh_instances() {
        let make = factory(|| Leaf("em"));
        let a = make();
        let b = make();
        let cx_state = crate::reactive::ObservedMap::new();
        let cx = RenderContext {
            state: &cx_state,
            props: &cx_state,
        };
        assert_eq!(a.render(&cx).tag(), Some("em"));
        assert_eq!(b.render(&cx).tag(), Some("em"));
    }
}
