//! Node options: key, directive bindings, component props.

use std::collections::BTreeMap;
use std::fmt;

use super::node::Key;
use crate::directive::{Directive, Handler};
use crate::reactive::Value;

/// What a directive binding carries: plain data or an event handler.
#[derive(Debug, Clone)]
pub enum DirectiveValue {
    Value(Value),
    Handler(Handler),
}

impl DirectiveValue {
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            DirectiveValue::Value(v) => Some(v),
            DirectiveValue::Handler(_) => None,
        }
    }

    pub fn as_handler(&self) -> Option<&Handler> {
        match self {
            DirectiveValue::Handler(h) => Some(h),
            DirectiveValue::Value(_) => None,
        }
    }
}

/// One directive attached to a node.
///
/// `instance` is `None` until the binding has been bound to a surface element;
/// afterwards the same instance is carried over on every patch of that slot
/// until the slot disappears and the instance is unbound.
pub struct DirectiveBinding {
    /// Directive kind, resolved through the directive registry (e.g. "attr", "on").
    pub kind: String,
    /// Name the directive acts on (attribute or event name).
    pub name: String,
    pub value: DirectiveValue,
    pub instance: Option<Box<dyn Directive>>,
}

impl fmt::Debug for DirectiveBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DirectiveBinding")
            .field("kind", &self.kind)
            .field("name", &self.name)
            .field("value", &self.value)
            .field("bound", &self.instance.is_some())
            .finish()
    }
}

impl DirectiveBinding {
    pub fn new(kind: impl Into<String>, name: impl Into<String>, value: DirectiveValue) -> Self {
        Self {
            kind: kind.into(),
            name: name.into(),
            value,
            instance: None,
        }
    }

    /// The options slot this binding occupies: `"{kind}:{name}"`.
    pub fn slot(&self) -> String {
        format!("{}:{}", self.kind, self.name)
    }

    pub fn is_bound(&self) -> bool {
        self.instance.is_some()
    }
}

/// Per-node options supplied by render.
#[derive(Debug, Default)]
pub struct Options {
    pub key: Option<Key>,
    /// Bindings by slot (see [`DirectiveBinding::slot`]).
    pub directives: BTreeMap<String, DirectiveBinding>,
    pub props: BTreeMap<String, Value>,
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a binding under its slot, returning any binding it displaced.
    pub fn insert_directive(&mut self, binding: DirectiveBinding) -> Option<DirectiveBinding> {
        self.directives.insert(binding.slot(), binding)
    }
}
