//! Document arena and the `Surface` handle: insert, move, remove, mutate.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

use slotmap::{SecondaryMap, SlotMap};

use super::event::{Callback, ListenerId, SurfaceEvent};
use super::node::{SurfaceData, SurfaceId, SurfaceKind};

/// Empty slice constant for returning when a node has no children.
const EMPTY_CHILDREN: &[SurfaceId] = &[];

/// Errors raised by surface operations on missing or mismatched nodes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SurfaceError {
    #[error("surface node {0:?} does not exist")]
    MissingNode(SurfaceId),
    #[error("surface node {0:?} is not an element")]
    NotAnElement(SurfaceId),
    #[error("surface node {0:?} is not a text node")]
    NotText(SurfaceId),
    #[error("surface node {0:?} has no parent")]
    NotAttached(SurfaceId),
}

/// One recorded change to the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    Create { node: SurfaceId },
    Insert { parent: SurfaceId, node: SurfaceId, index: usize },
    Replace { old: SurfaceId, new: SurfaceId },
    Remove { node: SurfaceId },
    SetText { node: SurfaceId, content: String },
    SetAttribute { node: SurfaceId, name: String, value: String },
    RemoveAttribute { node: SurfaceId, name: String },
    AddListener { node: SurfaceId, event: String },
    RemoveListener { node: SurfaceId, event: String },
}

struct ListenerEntry {
    id: ListenerId,
    event: String,
    callback: Callback,
}

/// The document itself, backed by a slotmap arena.
///
/// All nodes live in a single `SlotMap`. Parent/child relationships and event
/// listeners are stored in secondary maps so that removal is O(subtree size).
struct Document {
    nodes: SlotMap<SurfaceId, SurfaceData>,
    children: SecondaryMap<SurfaceId, Vec<SurfaceId>>,
    parent: SecondaryMap<SurfaceId, SurfaceId>,
    listeners: SecondaryMap<SurfaceId, Vec<ListenerEntry>>,
    root: Option<SurfaceId>,
    next_listener: u64,
    recording: bool,
    mutations: Vec<Mutation>,
}

impl Document {
    fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
            children: SecondaryMap::new(),
            parent: SecondaryMap::new(),
            listeners: SecondaryMap::new(),
            root: None,
            next_listener: 0,
            recording: false,
            mutations: Vec::new(),
        }
    }

    fn record(&mut self, mutation: Mutation) {
        if self.recording {
            self.mutations.push(mutation);
        }
    }

    fn ensure(&self, id: SurfaceId) -> Result<(), SurfaceError> {
        if self.nodes.contains_key(id) {
            Ok(())
        } else {
            Err(SurfaceError::MissingNode(id))
        }
    }

    fn create(&mut self, data: SurfaceData) -> SurfaceId {
        let id = self.nodes.insert(data);
        self.children.insert(id, Vec::new());
        self.record(Mutation::Create { node: id });
        id
    }

    /// Unlink `id` from its parent's children list. The subtree stays alive.
    fn detach(&mut self, id: SurfaceId) {
        if let Some(parent) = self.parent.remove(id) {
            if let Some(siblings) = self.children.get_mut(parent) {
                siblings.retain(|&child| child != id);
            }
        }
    }

    fn insert_at(&mut self, parent: SurfaceId, index: usize, node: SurfaceId) {
        self.detach(node);
        let siblings = self.children.entry(parent).map(|e| e.or_default());
        let index = match siblings {
            Some(siblings) => {
                let index = index.min(siblings.len());
                siblings.insert(index, node);
                index
            }
            None => return,
        };
        self.parent.insert(node, parent);
        self.record(Mutation::Insert { parent, node, index });
    }

    /// Free `id` and all its descendants from the arena.
    fn destroy(&mut self, id: SurfaceId) {
        if self.root == Some(id) {
            self.root = None;
        }
        let mut to_remove = VecDeque::new();
        to_remove.push_back(id);
        while let Some(current) = to_remove.pop_front() {
            if let Some(kids) = self.children.remove(current) {
                to_remove.extend(kids);
            }
            self.parent.remove(current);
            self.listeners.remove(current);
            self.nodes.remove(current);
        }
    }

    fn position(&self, id: SurfaceId) -> Result<(SurfaceId, usize), SurfaceError> {
        let parent = self
            .parent
            .get(id)
            .copied()
            .ok_or(SurfaceError::NotAttached(id))?;
        let index = self
            .children
            .get(parent)
            .and_then(|siblings| siblings.iter().position(|&c| c == id))
            .ok_or(SurfaceError::NotAttached(id))?;
        Ok((parent, index))
    }
}

/// Cheap-clone handle to a shared document.
///
/// Every method borrows the document only for its own duration, so event
/// callbacks invoked by [`Surface::dispatch`] may freely call back into the
/// surface (for example to re-render a component).
#[derive(Clone)]
pub struct Surface {
    doc: Rc<RefCell<Document>>,
}

impl fmt::Debug for Surface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let doc = self.doc.borrow();
        f.debug_struct("Surface")
            .field("nodes", &doc.nodes.len())
            .field("root", &doc.root)
            .finish()
    }
}

impl Default for Surface {
    fn default() -> Self {
        Self::new()
    }
}

impl Surface {
    /// Create an empty surface.
    pub fn new() -> Self {
        Self {
            doc: Rc::new(RefCell::new(Document::new())),
        }
    }

    /// Whether two handles refer to the same document.
    pub fn ptr_eq(&self, other: &Surface) -> bool {
        Rc::ptr_eq(&self.doc, &other.doc)
    }

    // -- mutation log -------------------------------------------------------

    /// Turn mutation recording on or off.
    pub fn record_mutations(&self, on: bool) {
        self.doc.borrow_mut().recording = on;
    }

    /// Drain and return all recorded mutations.
    pub fn take_mutations(&self) -> Vec<Mutation> {
        std::mem::take(&mut self.doc.borrow_mut().mutations)
    }

    // -- creation -----------------------------------------------------------

    /// Create a detached element.
    pub fn create_element(&self, tag: &str) -> SurfaceId {
        self.doc.borrow_mut().create(SurfaceData::element(tag))
    }

    /// Create a detached text node.
    pub fn create_text(&self, content: &str) -> SurfaceId {
        self.doc.borrow_mut().create(SurfaceData::text(content))
    }

    /// Create an element and make it the document root.
    pub fn create_root(&self, tag: &str) -> SurfaceId {
        let mut doc = self.doc.borrow_mut();
        let id = doc.create(SurfaceData::element(tag));
        doc.root = Some(id);
        id
    }

    /// The document root, if set.
    pub fn root(&self) -> Option<SurfaceId> {
        self.doc.borrow().root
    }

    /// Explicitly set the root node.
    pub fn set_root(&self, id: SurfaceId) -> Result<(), SurfaceError> {
        let mut doc = self.doc.borrow_mut();
        doc.ensure(id)?;
        doc.root = Some(id);
        Ok(())
    }

    // -- structure ----------------------------------------------------------

    /// Move `child` to the end of `parent`'s children.
    pub fn append_child(&self, parent: SurfaceId, child: SurfaceId) -> Result<(), SurfaceError> {
        let mut doc = self.doc.borrow_mut();
        doc.ensure(child)?;
        let len = doc
            .children
            .get(parent)
            .map(Vec::len)
            .ok_or(SurfaceError::MissingNode(parent))?;
        // Appending a node that is already the last child is a no-op move.
        let len = if doc.parent.get(child) == Some(&parent) { len - 1 } else { len };
        doc.insert_at(parent, len, child);
        Ok(())
    }

    /// Move `child` to the front of `parent`'s children.
    pub fn prepend_child(&self, parent: SurfaceId, child: SurfaceId) -> Result<(), SurfaceError> {
        let mut doc = self.doc.borrow_mut();
        doc.ensure(child)?;
        doc.ensure(parent)?;
        doc.insert_at(parent, 0, child);
        Ok(())
    }

    /// Move `node` so that it directly follows `reference` under the same parent.
    pub fn insert_after(&self, reference: SurfaceId, node: SurfaceId) -> Result<(), SurfaceError> {
        if reference == node {
            return Ok(());
        }
        let mut doc = self.doc.borrow_mut();
        doc.ensure(node)?;
        doc.detach(node);
        let (parent, index) = doc.position(reference)?;
        doc.insert_at(parent, index + 1, node);
        Ok(())
    }

    /// Put `new` in `old`'s place and free `old`'s subtree.
    pub fn replace(&self, old: SurfaceId, new: SurfaceId) -> Result<(), SurfaceError> {
        if old == new {
            return Ok(());
        }
        let mut doc = self.doc.borrow_mut();
        doc.ensure(new)?;
        doc.ensure(old)?;
        doc.detach(new);
        let (parent, index) = doc.position(old)?;
        if let Some(siblings) = doc.children.get_mut(parent) {
            siblings[index] = new;
        }
        doc.parent.remove(old);
        doc.parent.insert(new, parent);
        if doc.root == Some(old) {
            doc.root = Some(new);
        }
        doc.destroy(old);
        doc.record(Mutation::Replace { old, new });
        Ok(())
    }

    /// Detach `id` from its parent and free it together with all descendants.
    pub fn remove(&self, id: SurfaceId) -> Result<(), SurfaceError> {
        let mut doc = self.doc.borrow_mut();
        doc.ensure(id)?;
        doc.detach(id);
        doc.destroy(id);
        doc.record(Mutation::Remove { node: id });
        Ok(())
    }

    // -- content ------------------------------------------------------------

    /// Replace the content of a text node.
    pub fn set_text(&self, id: SurfaceId, content: &str) -> Result<(), SurfaceError> {
        let mut doc = self.doc.borrow_mut();
        match doc.nodes.get_mut(id).map(|data| &mut data.kind) {
            Some(SurfaceKind::Text(current)) => {
                current.clear();
                current.push_str(content);
            }
            Some(SurfaceKind::Element { .. }) => return Err(SurfaceError::NotText(id)),
            None => return Err(SurfaceError::MissingNode(id)),
        }
        doc.record(Mutation::SetText {
            node: id,
            content: content.to_owned(),
        });
        Ok(())
    }

    /// Set (or overwrite) an attribute on an element.
    pub fn set_attribute(&self, id: SurfaceId, name: &str, value: &str) -> Result<(), SurfaceError> {
        let mut doc = self.doc.borrow_mut();
        let attributes = doc
            .nodes
            .get_mut(id)
            .ok_or(SurfaceError::MissingNode(id))?
            .attributes_mut()
            .ok_or(SurfaceError::NotAnElement(id))?;
        attributes.insert(name.to_owned(), value.to_owned());
        doc.record(Mutation::SetAttribute {
            node: id,
            name: name.to_owned(),
            value: value.to_owned(),
        });
        Ok(())
    }

    /// Remove an attribute from an element. Removing an absent attribute is a no-op.
    pub fn remove_attribute(&self, id: SurfaceId, name: &str) -> Result<(), SurfaceError> {
        let mut doc = self.doc.borrow_mut();
        let attributes = doc
            .nodes
            .get_mut(id)
            .ok_or(SurfaceError::MissingNode(id))?
            .attributes_mut()
            .ok_or(SurfaceError::NotAnElement(id))?;
        if attributes.remove(name).is_some() {
            doc.record(Mutation::RemoveAttribute {
                node: id,
                name: name.to_owned(),
            });
        }
        Ok(())
    }

    // -- events -------------------------------------------------------------

    /// Register a callback for `event` on element `id`.
    pub fn add_listener(
        &self,
        id: SurfaceId,
        event: &str,
        callback: Callback,
    ) -> Result<ListenerId, SurfaceError> {
        let mut doc = self.doc.borrow_mut();
        if !doc.nodes.get(id).ok_or(SurfaceError::MissingNode(id))?.is_element() {
            return Err(SurfaceError::NotAnElement(id));
        }
        let listener = ListenerId(doc.next_listener);
        doc.next_listener += 1;
        if let Some(entries) = doc.listeners.entry(id).map(|e| e.or_default()) {
            entries.push(ListenerEntry {
                id: listener,
                event: event.to_owned(),
                callback,
            });
        }
        doc.record(Mutation::AddListener {
            node: id,
            event: event.to_owned(),
        });
        Ok(listener)
    }

    /// Unregister a callback. Unknown listener ids are ignored.
    pub fn remove_listener(&self, id: SurfaceId, listener: ListenerId) -> Result<(), SurfaceError> {
        let mut doc = self.doc.borrow_mut();
        doc.ensure(id)?;
        let removed = doc.listeners.get_mut(id).and_then(|entries| {
            let pos = entries.iter().position(|e| e.id == listener)?;
            Some(entries.remove(pos))
        });
        if let Some(entry) = removed {
            doc.record(Mutation::RemoveListener {
                node: id,
                event: entry.event,
            });
        }
        Ok(())
    }

    /// Number of listeners registered on `id` for `event`.
    pub fn listener_count(&self, id: SurfaceId, event: &str) -> usize {
        self.doc
            .borrow()
            .listeners
            .get(id)
            .map(|entries| entries.iter().filter(|e| e.event == event).count())
            .unwrap_or(0)
    }

    /// Deliver `event` to the listeners on its target.
    ///
    /// An event carrying a value first stores it into the target's `value`
    /// attribute. Returns the number of callbacks invoked.
    pub fn dispatch(&self, event: &SurfaceEvent) -> Result<usize, SurfaceError> {
        if let Some(value) = &event.value {
            self.set_attribute(event.target, "value", value)?;
        }
        let callbacks: Vec<Callback> = {
            let doc = self.doc.borrow();
            doc.ensure(event.target)?;
            doc.listeners
                .get(event.target)
                .map(|entries| {
                    entries
                        .iter()
                        .filter(|e| e.event == event.name)
                        .map(|e| Rc::clone(&e.callback))
                        .collect()
                })
                .unwrap_or_default()
        };
        for callback in &callbacks {
            callback(event);
        }
        Ok(callbacks.len())
    }

    // -- reads --------------------------------------------------------------

    /// Run `f` against a node's data.
    pub fn with_data<R>(&self, id: SurfaceId, f: impl FnOnce(&SurfaceData) -> R) -> Option<R> {
        self.doc.borrow().nodes.get(id).map(f)
    }

    /// Whether the surface contains a node with the given id.
    pub fn contains(&self, id: SurfaceId) -> bool {
        self.doc.borrow().nodes.contains_key(id)
    }

    /// The parent of a node, if attached.
    pub fn parent(&self, id: SurfaceId) -> Option<SurfaceId> {
        self.doc.borrow().parent.get(id).copied()
    }

    /// A snapshot of a node's children, in order.
    pub fn children(&self, id: SurfaceId) -> Vec<SurfaceId> {
        self.doc
            .borrow()
            .children
            .get(id)
            .map(Vec::as_slice)
            .unwrap_or(EMPTY_CHILDREN)
            .to_vec()
    }

    /// The first child of `id`.
    pub fn first_child(&self, id: SurfaceId) -> Option<SurfaceId> {
        self.doc
            .borrow()
            .children
            .get(id)
            .and_then(|kids| kids.first().copied())
    }

    /// The sibling directly after `id`.
    pub fn next_sibling(&self, id: SurfaceId) -> Option<SurfaceId> {
        let doc = self.doc.borrow();
        let (parent, index) = doc.position(id).ok()?;
        doc.children.get(parent)?.get(index + 1).copied()
    }

    /// Tag name of an element.
    pub fn tag(&self, id: SurfaceId) -> Option<String> {
        self.with_data(id, |data| data.tag().map(str::to_owned)).flatten()
    }

    /// Content of a text node.
    pub fn text(&self, id: SurfaceId) -> Option<String> {
        self.with_data(id, |data| data.text_content().map(str::to_owned))
            .flatten()
    }

    /// An attribute value of an element.
    pub fn attribute(&self, id: SurfaceId, name: &str) -> Option<String> {
        self.with_data(id, |data| data.attribute(name).map(str::to_owned))
            .flatten()
    }

    /// Number of live nodes, attached or not.
    pub fn len(&self) -> usize {
        self.doc.borrow().nodes.len()
    }

    /// Whether the surface holds no nodes.
    pub fn is_empty(&self) -> bool {
        self.doc.borrow().nodes.is_empty()
    }

    /// Pre-order depth-first traversal starting from `start`.
    pub fn walk_depth_first(&self, start: SurfaceId) -> Vec<SurfaceId> {
        let doc = self.doc.borrow();
        let mut result = Vec::new();
        let mut stack = vec![start];
        while let Some(current) = stack.pop() {
            if !doc.nodes.contains_key(current) {
                continue;
            }
            result.push(current);
            if let Some(kids) = doc.children.get(current) {
                stack.extend(kids.iter().rev().copied());
            }
        }
        result
    }
}
