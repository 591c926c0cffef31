//! Tree reconciliation against a live surface.

use std::collections::BTreeMap;

use tracing::{debug, trace, warn};

use super::{KeyedIndex, PatchError};
use crate::component::{ComponentFactory, ComponentHandle, TagKind};
use crate::context::Context;
use crate::surface::SurfaceId;
use crate::vnode::{DirectiveBinding, Element, FullKey, Node, Text};

/// Owns the live tree of one mounted root and patches it forward.
///
/// Every node of the held tree carries its surface handle and, for directive
/// bindings and component tags, the instances created for it. Each patch
/// consumes the previous live tree and the freshly rendered one and produces
/// the next live tree.
#[derive(Debug)]
pub struct Patcher {
    cx: Context,
    tree: Option<Node>,
}

impl Patcher {
    pub fn new(cx: Context) -> Self {
        Self { cx, tree: None }
    }

    pub fn context(&self) -> &Context {
        &self.cx
    }

    /// The last reconciled tree.
    pub fn tree(&self) -> Option<&Node> {
        self.tree.as_ref()
    }

    pub fn into_tree(self) -> Option<Node> {
        self.tree
    }

    /// Surface handle of the current root.
    pub fn root(&self) -> Option<SurfaceId> {
        self.tree.as_ref().and_then(Node::surface)
    }

    /// Materialize `tree` into fresh, unattached surface nodes and remember it.
    ///
    /// Returns the root handle; attaching it is the caller's job.
    pub fn mount(&mut self, tree: Node) -> Result<SurfaceId, PatchError> {
        let handle = self.create(&tree);
        let shell = tree.shell(handle);
        let live = self.patch(shell, tree)?;
        let root = live
            .surface()
            .ok_or_else(|| PatchError::ReconciliationImpossible(not_mounted(&live)))?;
        if let Some(previous) = self.tree.replace(live) {
            previous.detach_components();
        }
        debug!(root = ?root, "tree mounted");
        Ok(root)
    }

    /// Patch the remembered tree into `tree`.
    ///
    /// A root of a different kind or tag is rebuilt and swapped in where the
    /// old root was.
    pub fn update(&mut self, tree: Node) -> Result<(), PatchError> {
        let previous = self.tree.take().ok_or_else(|| {
            PatchError::ReconciliationImpossible("nothing has been mounted yet".to_owned())
        })?;

        let live = if previous.same_type(&tree) {
            self.patch(previous, tree)?
        } else {
            let old = previous
                .surface()
                .ok_or_else(|| PatchError::ReconciliationImpossible(not_mounted(&previous)))?;
            let handle = self.create(&tree);
            self.swap(old, handle)?;
            previous.detach_components();
            debug!(old = ?old, new = ?handle, "root replaced");
            let shell = tree.shell(handle);
            self.patch(shell, tree)?
        };
        self.tree = Some(live);
        Ok(())
    }

    /// Reconcile live node `a` into target `b` and return the new live node.
    pub fn patch(&self, a: Node, b: Node) -> Result<Node, PatchError> {
        match (a, b) {
            (Node::Text(a), Node::Text(b)) => self.patch_text(a, b).map(Node::Text),
            (Node::Element(a), Node::Element(b)) => {
                if a.tag != b.tag {
                    return Err(PatchError::ReconciliationImpossible(format!(
                        "could not reconcile <{}> into <{}>",
                        a.tag, b.tag
                    )));
                }
                match self.cx.components.resolve_tag(&b.tag) {
                    TagKind::Native => self.patch_element(a, b).map(Node::Element),
                    TagKind::Component(factory) => {
                        self.patch_component(a, b, factory).map(Node::Element)
                    }
                }
            }
            (a, b) => Err(PatchError::KindMismatch {
                expected: a.kind(),
                found: b.kind(),
            }),
        }
    }

    fn patch_text(&self, a: Text, b: Text) -> Result<Text, PatchError> {
        let handle = a
            .surface
            .ok_or_else(|| PatchError::ReconciliationImpossible("text node is not mounted".to_owned()))?;
        if a.content != b.content {
            self.cx.surface.set_text(handle, &b.content)?;
        }
        Ok(Text {
            content: b.content,
            surface: Some(handle),
        })
    }

    fn patch_element(&self, a: Element, mut b: Element) -> Result<Element, PatchError> {
        let a = if a.component.is_some() { self.demote(a)? } else { a };
        let handle = a.surface.ok_or_else(|| {
            PatchError::ReconciliationImpossible(format!("<{}> is not mounted", a.tag))
        })?;
        self.patch_directives(handle, a.options.directives, &mut b.options.directives)?;
        let children = self.patch_children(handle, a.children, b.children)?;
        Ok(Element {
            tag: b.tag,
            options: b.options,
            children,
            surface: Some(handle),
            component: None,
        })
    }

    /// Replace a component node whose tag no longer names a component with a
    /// fresh, bare element in the same place. The instance is detached.
    fn demote(&self, mut a: Element) -> Result<Element, PatchError> {
        let component = a.component.take();
        let stale = component
            .as_ref()
            .and_then(ComponentHandle::root)
            .or(a.surface)
            .ok_or_else(|| PatchError::ReconciliationImpossible(format!("<{}> is not mounted", a.tag)))?;
        if let Some(bound) = a.surface {
            self.release_directives(bound, &mut a.options.directives)?;
        }
        let handle = self.cx.surface.create_element(&a.tag);
        self.swap(stale, handle)?;
        if let Some(component) = component {
            component.detach();
        }
        debug!(tag = %a.tag, old = ?stale, new = ?handle, "component rebuilt as element");
        Ok(Element {
            surface: Some(handle),
            ..Element::new(a.tag)
        })
    }

    /// Push props into the instance, mounting it on first sight. Its own
    /// subtree is left to its own patcher.
    ///
    /// The node's surface handle records the element its directives were
    /// bound to. When the component has since moved to another root they are
    /// released from the old one and bound afresh on the new one.
    fn patch_component(
        &self,
        a: Element,
        mut b: Element,
        factory: ComponentFactory,
    ) -> Result<Element, PatchError> {
        let component = match a.component {
            Some(component) => component,
            None => ComponentHandle::new(b.tag.clone(), factory(), &self.cx),
        };
        component.set_props(std::mem::take(&mut b.options.props))?;

        let root = match component.root() {
            Some(root) if component.is_mounted() => root,
            _ => {
                let anchor = a.surface.ok_or_else(|| {
                    PatchError::ReconciliationImpossible(format!("<{}> has no anchor", a.tag))
                })?;
                for child in &a.children {
                    child.detach_components();
                }
                component.mount(anchor)?
            }
        };
        let mut old = a.options.directives;
        if let Some(stale) = a.surface.filter(|el| *el != root) {
            self.release_directives(stale, &mut old)?;
        }
        self.patch_directives(root, old, &mut b.options.directives)?;

        Ok(Element {
            tag: b.tag,
            options: b.options,
            children: Vec::new(),
            surface: Some(root),
            component: Some(component),
        })
    }

    /// Unbind slots that disappeared, update the ones that stayed, bind the new ones.
    fn patch_directives(
        &self,
        el: SurfaceId,
        mut old: BTreeMap<String, DirectiveBinding>,
        new: &mut BTreeMap<String, DirectiveBinding>,
    ) -> Result<(), PatchError> {
        let surface = &self.cx.surface;

        let removed: Vec<String> = old
            .keys()
            .filter(|slot| !new.contains_key(*slot))
            .cloned()
            .collect();
        for slot in removed {
            if let Some(mut binding) = old.remove(&slot) {
                if let Some(mut instance) = binding.instance.take() {
                    trace!(slot = %slot, "directive unbound");
                    instance.unbind(surface, el, &binding)?;
                }
            }
        }

        for (slot, binding) in new.iter_mut() {
            let kept = old
                .remove(slot)
                .and_then(|mut prev| prev.instance.take().map(|instance| (instance, prev)));
            match kept {
                Some((mut instance, prev)) => {
                    instance.update(surface, el, binding, &prev)?;
                    binding.instance = Some(instance);
                }
                None => match self.cx.directives.resolve(&binding.kind) {
                    Some(factory) => {
                        let mut instance = factory();
                        trace!(slot = %slot, "directive bound");
                        instance.bind(surface, el, binding)?;
                        binding.instance = Some(instance);
                    }
                    None => {
                        warn!(kind = %binding.kind, name = %binding.name, "unknown directive kind, binding ignored");
                    }
                },
            }
        }
        Ok(())
    }

    /// Unbind every bound directive from `el`. Instances bound to an element
    /// that no longer exists are dropped without an unbind.
    fn release_directives(
        &self,
        el: SurfaceId,
        bindings: &mut BTreeMap<String, DirectiveBinding>,
    ) -> Result<(), PatchError> {
        let surface = &self.cx.surface;
        let present = surface.contains(el);
        for (slot, binding) in bindings.iter_mut() {
            if let Some(mut instance) = binding.instance.take() {
                if present {
                    instance.unbind(surface, el, binding)?;
                }
                trace!(slot = %slot, el = ?el, present, "directive released");
            }
        }
        Ok(())
    }

    /// Reconcile the children of surface node `parent`.
    ///
    /// Keyed targets (explicit key, or component tag) claim the oldest source
    /// with the same tag and key. The rest match unkeyed sources by position
    /// when kind and tag agree; anything else is created fresh. Sources nobody
    /// claimed are removed and their components detached.
    fn patch_children(
        &self,
        parent: SurfaceId,
        old: Vec<Node>,
        new: Vec<Node>,
    ) -> Result<Vec<Node>, PatchError> {
        let surface = &self.cx.surface;

        let mut index: KeyedIndex<FullKey, usize> = KeyedIndex::new();
        let mut keyed = Vec::with_capacity(old.len());
        for (i, node) in old.iter().enumerate() {
            match node.full_key(node.component().is_some()) {
                Some(key) => {
                    index.queue(key, i);
                    keyed.push(true);
                }
                None => keyed.push(false),
            }
        }
        let mut slots: Vec<Option<Node>> = old.into_iter().map(Some).collect();

        let mut cursor = 0;
        let mut previous: Option<SurfaceId> = None;
        let mut live = Vec::with_capacity(new.len());
        let (mut moved, mut created) = (0usize, 0usize);

        for target in new {
            let key = target.full_key(self.is_component(&target));
            let claimed = key
                .as_ref()
                .and_then(|key| index.dequeue(key))
                .and_then(|i| slots[i].take());

            let source = match claimed {
                Some(node) => node,
                None => {
                    while cursor < slots.len() && (keyed[cursor] || slots[cursor].is_none()) {
                        cursor += 1;
                    }
                    let candidate = match slots.get_mut(cursor) {
                        Some(slot) => {
                            cursor += 1;
                            if slot.as_ref().is_some_and(|node| node.same_type(&target)) {
                                slot.take()
                            } else {
                                None
                            }
                        }
                        None => None,
                    };
                    match candidate {
                        Some(node) => node,
                        None => {
                            created += 1;
                            let handle = self.create(&target);
                            target.shell(handle)
                        }
                    }
                }
            };

            let handle = source
                .surface()
                .ok_or_else(|| PatchError::ReconciliationImpossible(not_mounted(&source)))?;
            let in_place = match previous {
                None => surface.first_child(parent) == Some(handle),
                Some(previous) => surface.next_sibling(previous) == Some(handle),
            };
            if !in_place {
                match previous {
                    None => surface.prepend_child(parent, handle)?,
                    Some(previous) => surface.insert_after(previous, handle)?,
                }
                moved += 1;
            }

            let patched = self.patch(source, target)?;
            previous = patched.surface();
            live.push(patched);
        }

        let mut removed = 0usize;
        for node in slots.into_iter().flatten() {
            if let Some(handle) = node.surface() {
                if surface.contains(handle) {
                    surface.remove(handle)?;
                }
            }
            node.detach_components();
            removed += 1;
        }

        trace!(parent = ?parent, children = live.len(), moved, created, removed, "children reconciled");
        Ok(live)
    }

    fn is_component(&self, node: &Node) -> bool {
        node.tag().is_some_and(|tag| self.cx.components.contains(tag))
    }

    fn create(&self, node: &Node) -> SurfaceId {
        match node {
            Node::Element(e) => self.cx.surface.create_element(&e.tag),
            Node::Text(t) => self.cx.surface.create_text(&t.content),
        }
    }

    /// Put `new` where `old` is, freeing `old`.
    fn swap(&self, old: SurfaceId, new: SurfaceId) -> Result<(), PatchError> {
        let surface = &self.cx.surface;
        if surface.parent(old).is_some() {
            surface.replace(old, new)?;
        } else if surface.contains(old) {
            let was_root = surface.root() == Some(old);
            surface.remove(old)?;
            if was_root {
                surface.set_root(new)?;
            }
        }
        Ok(())
    }
}

fn not_mounted(node: &Node) -> String {
    match node.tag() {
        Some(tag) => format!("could not reconcile <{tag}>: no surface node"),
        None => "could not reconcile text: no surface node".to_owned(),
    }
}
