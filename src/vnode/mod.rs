//! Tree node model and the helpers render functions build trees with.
//!
//! ```ignore
//! use veneer::vnode::{element, text};
//!
//! let tree = element("ul").children(
//!     items.iter().enumerate().map(|(i, item)| element("li").key(i).child(text(item))),
//! );
//! ```

pub mod node;
pub mod options;

pub use node::{Element, FullKey, Key, Node, NodeKind, Text};
pub use options::{DirectiveBinding, DirectiveValue, Options};

use crate::directive::Handler;
use crate::reactive::Value;
use crate::surface::SurfaceEvent;

/// Start an element node.
pub fn element(tag: impl Into<String>) -> Element {
    Element::new(tag)
}

/// A text leaf.
pub fn text(content: impl Into<String>) -> Node {
    Node::Text(Text::new(content))
}

/// Attribute binding: keeps surface attribute `name` in sync with `value`.
pub fn attr(name: &str, value: impl Into<Value>) -> DirectiveBinding {
    DirectiveBinding::new("attr", name, DirectiveValue::Value(value.into()))
}

/// Event binding: runs `handler` whenever event `name` fires on the element.
pub fn event(name: &str, handler: impl Fn(&SurfaceEvent) + 'static) -> DirectiveBinding {
    DirectiveBinding::new("on", name, DirectiveValue::Handler(Handler::new(handler)))
}
