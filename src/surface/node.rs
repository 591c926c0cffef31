//! Surface node types: SurfaceId, SurfaceData.

use std::collections::BTreeMap;

use slotmap::new_key_type;

new_key_type! {
    /// Unique identifier for a live surface node. Copy, lightweight (u64).
    pub struct SurfaceId;
}

/// What a surface node is: an element carrying attributes, or a text leaf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceKind {
    Element {
        /// Tag name (e.g. "div", "li").
        tag: String,
        /// Attributes, kept sorted so serialization is deterministic.
        attributes: BTreeMap<String, String>,
    },
    Text(String),
}

/// Data associated with a single surface node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceData {
    pub kind: SurfaceKind,
}

impl SurfaceData {
    /// Create element data with no attributes.
    pub fn element(tag: impl Into<String>) -> Self {
        Self {
            kind: SurfaceKind::Element {
                tag: tag.into(),
                attributes: BTreeMap::new(),
            },
        }
    }

    /// Create text data.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            kind: SurfaceKind::Text(content.into()),
        }
    }

    /// Set an attribute (builder). No-op on text nodes.
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        if let SurfaceKind::Element { attributes, .. } = &mut self.kind {
            attributes.insert(name.into(), value.into());
        }
        self
    }

    /// The tag name, or `None` for text nodes.
    pub fn tag(&self) -> Option<&str> {
        match &self.kind {
            SurfaceKind::Element { tag, .. } => Some(tag),
            SurfaceKind::Text(_) => None,
        }
    }

    /// The text content, or `None` for elements.
    pub fn text_content(&self) -> Option<&str> {
        match &self.kind {
            SurfaceKind::Text(content) => Some(content),
            SurfaceKind::Element { .. } => None,
        }
    }

    /// Whether this node is an element.
    pub fn is_element(&self) -> bool {
        matches!(self.kind, SurfaceKind::Element { .. })
    }

    /// Look up an attribute value.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        match &self.kind {
            SurfaceKind::Element { attributes, .. } => attributes.get(name).map(String::as_str),
            SurfaceKind::Text(_) => None,
        }
    }

    /// Whether the attribute is present.
    pub fn has_attribute(&self, name: &str) -> bool {
        self.attribute(name).is_some()
    }

    pub(crate) fn attributes_mut(&mut self) -> Option<&mut BTreeMap<String, String>> {
        match &mut self.kind {
            SurfaceKind::Element { attributes, .. } => Some(attributes),
            SurfaceKind::Text(_) => None,
        }
    }
}
