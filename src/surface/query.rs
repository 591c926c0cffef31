//! Surface queries and markup serialization.

use super::node::{SurfaceData, SurfaceId, SurfaceKind};
use super::tree::Surface;

impl Surface {
    /// Serialize the subtree at `id` as compact markup.
    ///
    /// Attributes are emitted in sorted order. Returns an empty string if the
    /// node does not exist.
    pub fn to_markup(&self, id: SurfaceId) -> String {
        let mut out = String::new();
        self.write_markup(id, &mut out);
        out
    }

    fn write_markup(&self, id: SurfaceId, out: &mut String) {
        let Some(kind) = self.with_data(id, |data| data.kind.clone()) else {
            return;
        };
        match kind {
            SurfaceKind::Text(content) => push_escaped(out, &content, false),
            SurfaceKind::Element { tag, attributes } => {
                out.push('<');
                out.push_str(&tag);
                for (name, value) in &attributes {
                    out.push(' ');
                    out.push_str(name);
                    if !value.is_empty() {
                        out.push_str("=\"");
                        push_escaped(out, value, true);
                        out.push('"');
                    }
                }
                out.push('>');
                for child in self.children(id) {
                    self.write_markup(child, out);
                }
                out.push_str("</");
                out.push_str(&tag);
                out.push('>');
            }
        }
    }

    /// All elements under the root (document order) with the given tag.
    pub fn query_by_tag(&self, tag: &str) -> Vec<SurfaceId> {
        self.query_all(|data| data.tag() == Some(tag))
    }

    /// All elements under the root whose attribute `name` equals `value`.
    pub fn query_by_attribute(&self, name: &str, value: &str) -> Vec<SurfaceId> {
        self.query_all(|data| data.attribute(name) == Some(value))
    }

    /// The first element under the root with the given tag.
    pub fn query_first(&self, tag: &str) -> Option<SurfaceId> {
        self.query_by_tag(tag).into_iter().next()
    }

    /// All nodes under the root matching an arbitrary predicate, in document order.
    pub fn query_all(&self, predicate: impl Fn(&SurfaceData) -> bool) -> Vec<SurfaceId> {
        let Some(root) = self.root() else {
            return Vec::new();
        };
        self.walk_depth_first(root)
            .into_iter()
            .filter(|&id| self.with_data(id, &predicate).unwrap_or(false))
            .collect()
    }
}

fn push_escaped(out: &mut String, raw: &str, attribute: bool) {
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::surface::tree::Surface;

    /// Build a test document:
    /// ```text
    ///   body
    ///   ├── ul #list
    ///   │   ├── li .done "a"
    ///   │   └── li "b & c"
    ///   └── input [disabled]
    /// ```
    fn build_document() -> Surface {
        let surface = Surface::new();
        let body = surface.create_element("body");
        surface.set_root(body).unwrap();
        let ul = surface.create_element("ul");
        surface.set_attribute(ul, "id", "list").unwrap();
        surface.append_child(body, ul).unwrap();
        for (content, class) in [("a", Some("done")), ("b & c", None)] {
            let li = surface.create_element("li");
            if let Some(class) = class {
                surface.set_attribute(li, "class", class).unwrap();
            }
            let text = surface.create_text(content);
            surface.append_child(li, text).unwrap();
            surface.append_child(ul, li).unwrap();
        }
        let input = surface.create_element("input");
        surface.set_attribute(input, "disabled", "").unwrap();
        surface.append_child(body, input).unwrap();
        surface
    }

    #[test]
    fn markup_of_document() {
        let surface = build_document();
        let root = surface.root().unwrap();
        insta::assert_snapshot!(
            surface.to_markup(root),
            @r#"<body><ul id="list"><li class="done">a</li><li>b &amp; c</li></ul><input disabled></input></body>"#
        );
    }

    #[test]
    fn markup_of_missing_node_is_empty() {
        let surface = build_document();
        let root = surface.root().unwrap();
        surface.remove(root).unwrap();
        assert_eq!(surface.to_markup(root), "");
    }

    #[test]
    fn query_by_tag_in_document_order() {
        let surface = build_document();
        let items = surface.query_by_tag("li");
        assert_eq!(items.len(), 2);
        assert_eq!(surface.attribute(items[0], "class").as_deref(), Some("done"));
        assert!(surface.query_by_tag("table").is_empty());
    }

    #[test]
    fn query_by_attribute() {
        let surface = build_document();
        let found = surface.query_by_attribute("id", "list");
        assert_eq!(found.len(), 1);
        assert_eq!(surface.tag(found[0]).as_deref(), Some("ul"));
    }

    #[test]
    fn query_on_rootless_surface() {
        let surface = Surface::new();
        surface.create_element("orphan");
        assert!(surface.query_by_tag("orphan").is_empty());
        assert!(surface.query_first("orphan").is_none());
    }
}
