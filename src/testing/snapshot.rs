//! Snapshot rendering helpers.
//!
//! Functions for turning rendered trees and mounted components into plain-text
//! strings suitable for snapshot testing and assertions.

use crate::app::{App, AppConfig};
use crate::component::Component;
use crate::patch::PatchError;
use crate::vnode::{DirectiveValue, Node};

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Mount `component` into a fresh app and return the markup of its root.
///
/// # Examples
///
/// ```ignore
/// use veneer::testing::render_to_markup;
/// use veneer::vnode::{element, text};
///
/// let markup = render_to_markup(|_: &_| element("p").child(text("hi")).into()).unwrap();
/// assert_eq!(markup, "<p>hi</p>");
/// ```
pub fn render_to_markup(component: impl Component + 'static) -> Result<String, PatchError> {
    let app = App::new(AppConfig::default());
    let handle = app.mount("root", component)?;
    Ok(handle
        .root()
        .map(|root| app.surface().to_markup(root))
        .unwrap_or_default())
}

/// Render a tree (mounted or not) as an indented outline, one node per line.
///
/// Elements print as `<tag>` followed by the key and directive bindings in
/// slot order; handlers print as `<handler>`. Text nodes print quoted.
pub fn tree_to_string(node: &Node) -> String {
    let mut out = String::new();
    write_node(&mut out, node, 0);
    out
}

fn write_node(out: &mut String, node: &Node, depth: usize) {
    if !out.is_empty() {
        out.push('\n');
    }
    out.push_str(&"  ".repeat(depth));
    match node {
        Node::Text(t) => {
            out.push_str(&format!("{:?}", t.content));
        }
        Node::Element(e) => {
            out.push('<');
            out.push_str(&e.tag);
            out.push('>');
            if let Some(key) = &e.options.key {
                out.push_str(&format!(" key={key}"));
            }
            for (slot, binding) in &e.options.directives {
                match &binding.value {
                    DirectiveValue::Value(value) => out.push_str(&format!(" {slot}={value:?}")),
                    DirectiveValue::Handler(_) => out.push_str(&format!(" {slot}=<handler>")),
                }
            }
            for (name, value) in &e.options.props {
                out.push_str(&format!(" .{name}={value}"));
            }
            for child in &e.children {
                write_node(out, child, depth + 1);
            }
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================
