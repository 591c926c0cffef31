//! Tree nodes: the description of elements and text that render produces.

use std::fmt;

use super::options::{DirectiveBinding, Options};
use crate::component::ComponentHandle;
use crate::reactive::Value;
use crate::surface::SurfaceId;

/// Author-supplied identity that survives re-renders.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Key {
    Str(String),
    Int(i64),
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Str(s) => f.write_str(s),
            Key::Int(n) => write!(f, "{n}"),
        }
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Key::Str(s.to_owned())
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Key::Str(s)
    }
}

impl From<i64> for Key {
    fn from(n: i64) -> Self {
        Key::Int(n)
    }
}

impl From<i32> for Key {
    fn from(n: i32) -> Self {
        Key::Int(i64::from(n))
    }
}

impl From<usize> for Key {
    fn from(n: usize) -> Self {
        Key::Int(n as i64)
    }
}

/// Tag plus key: the identity under which a child is indexed during a list diff.
///
/// Component nodes without an explicit key use their tag alone (`key: None`),
/// so unkeyed siblings of the same component type are reused in order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FullKey {
    pub tag: String,
    pub key: Option<Key>,
}

impl fmt::Display for FullKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.key {
            Some(key) => write!(f, "{}.{key}", self.tag),
            None => f.write_str(&self.tag),
        }
    }
}

/// The fundamental kind of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Element,
    Text,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Element => f.write_str("element"),
            NodeKind::Text => f.write_str("text"),
        }
    }
}

/// An element node.
#[derive(Debug)]
pub struct Element {
    pub tag: String,
    pub options: Options,
    pub children: Vec<Node>,
    /// The mounted surface element. `None` until reconciled.
    pub surface: Option<SurfaceId>,
    /// The component instance owned by this node, if its tag is a component.
    pub component: Option<ComponentHandle>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            options: Options::default(),
            children: Vec::new(),
            surface: None,
            component: None,
        }
    }

    /// Set the identity key (builder).
    pub fn key(mut self, key: impl Into<Key>) -> Self {
        self.options.key = Some(key.into());
        self
    }

    /// Attach a directive binding (builder). A binding for the same slot replaces the earlier one.
    pub fn directive(mut self, binding: DirectiveBinding) -> Self {
        self.options.insert_directive(binding);
        self
    }

    /// Bind an attribute (builder).
    pub fn attr(self, name: &str, value: impl Into<Value>) -> Self {
        self.directive(super::attr(name, value))
    }

    /// Bind an event handler (builder).
    pub fn on(self, event: &str, handler: impl Fn(&crate::surface::SurfaceEvent) + 'static) -> Self {
        self.directive(super::event(event, handler))
    }

    /// Set a prop passed to a component (builder).
    pub fn prop(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.options.props.insert(name.into(), value.into());
        self
    }

    /// Append a child (builder).
    pub fn child(mut self, child: impl Into<Node>) -> Self {
        self.children.push(child.into());
        self
    }

    /// Append several children (builder).
    pub fn children<N: Into<Node>>(mut self, children: impl IntoIterator<Item = N>) -> Self {
        self.children.extend(children.into_iter().map(Into::into));
        self
    }
}

/// A text leaf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Text {
    pub content: String,
    pub surface: Option<SurfaceId>,
}

impl Text {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            surface: None,
        }
    }
}

/// A rendered tree node: element or text.
#[derive(Debug)]
pub enum Node {
    Element(Element),
    Text(Text),
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Node::Element(element)
    }
}

impl From<Text> for Node {
    fn from(text: Text) -> Self {
        Node::Text(text)
    }
}

impl From<&str> for Node {
    fn from(content: &str) -> Self {
        Node::Text(Text::new(content))
    }
}

impl From<String> for Node {
    fn from(content: String) -> Self {
        Node::Text(Text::new(content))
    }
}

impl Node {
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Element(_) => NodeKind::Element,
            Node::Text(_) => NodeKind::Text,
        }
    }

    /// Tag name, `None` for text.
    pub fn tag(&self) -> Option<&str> {
        match self {
            Node::Element(e) => Some(&e.tag),
            Node::Text(_) => None,
        }
    }

    /// Explicit key, if any.
    pub fn key(&self) -> Option<&Key> {
        match self {
            Node::Element(e) => e.options.key.as_ref(),
            Node::Text(_) => None,
        }
    }

    pub fn children(&self) -> &[Node] {
        match self {
            Node::Element(e) => &e.children,
            Node::Text(_) => &[],
        }
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(e) => Some(e),
            Node::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&Text> {
        match self {
            Node::Text(t) => Some(t),
            Node::Element(_) => None,
        }
    }

    /// The component instance owned by this node.
    pub fn component(&self) -> Option<&ComponentHandle> {
        self.as_element().and_then(|e| e.component.as_ref())
    }

    /// The live surface handle.
    ///
    /// For a component node this is the component's current root, which may
    /// differ from the handle recorded at the last parent patch.
    pub fn surface(&self) -> Option<SurfaceId> {
        match self {
            Node::Element(e) => e
                .component
                .as_ref()
                .and_then(ComponentHandle::root)
                .or(e.surface),
            Node::Text(t) => t.surface,
        }
    }

    /// Identity under which this node is indexed, given whether it is a component.
    pub fn full_key(&self, is_component: bool) -> Option<FullKey> {
        let element = self.as_element()?;
        if element.options.key.is_none() && !is_component {
            return None;
        }
        Some(FullKey {
            tag: element.tag.clone(),
            key: element.options.key.clone(),
        })
    }

    /// Whether two nodes may share a surface handle in place: same kind and, for
    /// elements, the same tag.
    pub fn same_type(&self, other: &Node) -> bool {
        match (self, other) {
            (Node::Text(_), Node::Text(_)) => true,
            (Node::Element(a), Node::Element(b)) => a.tag == b.tag,
            _ => false,
        }
    }

    /// A bare live node standing for freshly created surface `handle`: same
    /// kind, tag and text as `self`, no directives or children.
    pub fn shell(&self, handle: SurfaceId) -> Node {
        match self {
            Node::Element(e) => Node::Element(Element {
                surface: Some(handle),
                ..Element::new(e.tag.clone())
            }),
            Node::Text(t) => Node::Text(Text {
                content: t.content.clone(),
                surface: Some(handle),
            }),
        }
    }

    /// Detach every component instance in this subtree.
    pub fn detach_components(&self) {
        if let Node::Element(e) = self {
            if let Some(component) = &e.component {
                component.detach();
            }
            for child in &e.children {
                child.detach_components();
            }
        }
    }
}
