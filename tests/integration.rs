//! Integration tests for veneer.
//!
//! These tests exercise the public API from outside the crate: reconciliation
//! against a recorded surface, directive and component lifecycles, reactive
//! fan-out, and a small todo app driven through the pilot.

use std::cell::{Cell, RefCell};
use std::collections::BTreeSet;
use std::rc::Rc;

use pretty_assertions::assert_eq;

use veneer::component::{ComponentRegistry, LifecycleEvent};
use veneer::directive::{Directive, DirectiveError, DirectiveRegistry};
use veneer::patch::KeyedIndex;
use veneer::reactive::{batch, Listener, ObservedList, ObservedMap, Value};
use veneer::surface::{Mutation, Surface, SurfaceEvent, SurfaceId};
use veneer::testing::Pilot;
use veneer::vnode::{DirectiveBinding, DirectiveValue, NodeKind};
use veneer::{element, text, App, AppConfig, Component, Context, Node, PatchError, Patcher, RenderContext};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn context() -> Context {
    Context::new(
        Surface::new(),
        ComponentRegistry::new(),
        DirectiveRegistry::with_builtins(&BTreeSet::new()),
    )
}

fn keyed_list(keys: &[i64]) -> Node {
    element("ul")
        .children(
            keys.iter()
                .map(|&k| element("li").key(k).attr("id", format!("item-{k}")).child(text(k.to_string()))),
        )
        .into()
}

/// Surface handles of a live tree, depth first.
fn handles(node: &Node) -> Vec<SurfaceId> {
    let mut out = Vec::new();
    collect(node, &mut out);
    out
}

fn collect(node: &Node, out: &mut Vec<SurfaceId>) {
    out.extend(node.surface());
    for child in node.children() {
        collect(child, out);
    }
}

fn child_handles(patcher: &Patcher) -> Vec<SurfaceId> {
    patcher
        .tree()
        .map(|tree| tree.children().iter().filter_map(Node::surface).collect())
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Reconciliation
// ---------------------------------------------------------------------------

#[test]
fn test_noop_patch_is_idempotent() {
    let mut patcher = Patcher::new(context());
    let render = || -> Node {
        element("div")
            .attr("class", "app")
            .child(element("h1").child(text("title")))
            .child(keyed_list(&[1, 2, 3]))
            .child(element("button").on("click", |_| {}).child(text("go")))
            .into()
    };
    patcher.mount(render()).unwrap();
    let before = handles(patcher.tree().unwrap());

    let surface = patcher.context().surface.clone();
    surface.record_mutations(true);
    patcher.update(render()).unwrap();

    assert_eq!(surface.take_mutations(), Vec::<Mutation>::new());
    assert_eq!(handles(patcher.tree().unwrap()), before);
}

#[test]
fn test_keyed_shuffle_preserves_handles() {
    let mut patcher = Patcher::new(context());
    let root = patcher.mount(keyed_list(&[1, 2, 3])).unwrap();
    let [e1, e2, e3]: [SurfaceId; 3] = child_handles(&patcher).try_into().unwrap();

    let surface = patcher.context().surface.clone();
    surface.record_mutations(true);
    patcher.update(keyed_list(&[2, 3, 1])).unwrap();

    assert_eq!(child_handles(&patcher), vec![e2, e3, e1]);
    assert_eq!(surface.children(root), vec![e2, e3, e1]);
    assert!(!surface
        .take_mutations()
        .iter()
        .any(|m| matches!(m, Mutation::Create { .. } | Mutation::Remove { .. })));
    assert_eq!(
        surface.to_markup(root),
        r#"<ul><li id="item-2">2</li><li id="item-3">3</li><li id="item-1">1</li></ul>"#
    );
}

#[test]
fn test_unkeyed_insert_before_keyed_nodes() {
    let mut patcher = Patcher::new(context());
    let root = patcher.mount(keyed_list(&[1, 2, 3])).unwrap();
    let before = child_handles(&patcher);

    let target: Node = element("ul")
        .child(element("li").child(text("new")))
        .children([1i64, 2, 3].map(|k| element("li").key(k).attr("id", format!("item-{k}")).child(text(k.to_string()))))
        .into();
    patcher.update(target).unwrap();

    let after = child_handles(&patcher);
    assert_eq!(after.len(), 4);
    assert!(!before.contains(&after[0]));
    assert_eq!(&after[1..], &before[..]);
    assert_eq!(patcher.context().surface.children(root), after);
}

#[test]
fn test_duplicate_keys_create_extra_nodes() {
    let mut patcher = Patcher::new(context());
    patcher.mount(keyed_list(&[1])).unwrap();
    let [original]: [SurfaceId; 1] = child_handles(&patcher).try_into().unwrap();

    patcher.update(keyed_list(&[1, 1])).unwrap();
    let after = child_handles(&patcher);
    assert_eq!(after[0], original);
    assert_ne!(after[1], original);
}

#[test]
fn test_patch_element_with_text_is_kind_mismatch() {
    let mut patcher = Patcher::new(context());
    patcher.mount(element("div").into()).unwrap();
    let other = Patcher::new(patcher.context().clone());
    let live = patcher.into_tree().unwrap();

    let err = other.patch(live, text("x")).unwrap_err();
    assert!(matches!(
        err,
        PatchError::KindMismatch {
            expected: NodeKind::Element,
            found: NodeKind::Text
        }
    ));
}

#[test]
fn test_text_replaced_by_element_in_child_list() {
    let mut patcher = Patcher::new(context());
    let root = patcher.mount(element("p").child(text("plain")).into()).unwrap();
    patcher
        .update(element("p").child(element("b").child(text("bold"))).into())
        .unwrap();
    assert_eq!(patcher.context().surface.to_markup(root), "<p><b>bold</b></p>");
}

// ---------------------------------------------------------------------------
// Keyed index
// ---------------------------------------------------------------------------

#[test]
fn test_keyed_index_fifo() {
    let mut index = KeyedIndex::new();
    index.queue('a', 1);
    index.queue('a', 2);
    assert_eq!(index.dequeue(&'a'), Some(1));
    assert_eq!(index.dequeue(&'a'), Some(2));
    assert_eq!(index.dequeue(&'a'), None);
    assert!(index.is_empty());
}

// ---------------------------------------------------------------------------
// Directives
// ---------------------------------------------------------------------------

struct Probe {
    log: Rc<RefCell<Vec<&'static str>>>,
}

impl Directive for Probe {
    fn bind(&mut self, _: &Surface, _: SurfaceId, _: &DirectiveBinding) -> Result<(), DirectiveError> {
        self.log.borrow_mut().push("bind");
        Ok(())
    }

    fn update(
        &mut self,
        _: &Surface,
        _: SurfaceId,
        _: &DirectiveBinding,
        _: &DirectiveBinding,
    ) -> Result<(), DirectiveError> {
        self.log.borrow_mut().push("update");
        Ok(())
    }

    fn unbind(&mut self, _: &Surface, _: SurfaceId, _: &DirectiveBinding) -> Result<(), DirectiveError> {
        self.log.borrow_mut().push("unbind");
        Ok(())
    }
}

#[test]
fn test_directive_lifecycle_counts() {
    let cx = context();
    let log = Rc::new(RefCell::new(Vec::new()));
    let shared = Rc::clone(&log);
    cx.directives.register("probe", move || {
        Box::new(Probe {
            log: Rc::clone(&shared),
        })
    });

    let probed = |n: i32| -> Node {
        element("div")
            .directive(DirectiveBinding::new("probe", "x", DirectiveValue::Value(n.into())))
            .into()
    };
    let mut patcher = Patcher::new(cx);
    patcher.mount(probed(0)).unwrap();
    patcher.update(probed(1)).unwrap();
    patcher.update(probed(2)).unwrap();
    patcher.update(element("div").into()).unwrap();
    patcher.update(element("div").into()).unwrap();

    assert_eq!(*log.borrow(), vec!["bind", "update", "update", "unbind"]);
}

#[test]
fn test_failing_directive_aborts_patch() {
    struct Broken;
    impl Directive for Broken {
        fn bind(&mut self, _: &Surface, _: SurfaceId, b: &DirectiveBinding) -> Result<(), DirectiveError> {
            Err(DirectiveError::Failed {
                kind: b.kind.clone(),
                name: b.name.clone(),
                message: "nope".into(),
            })
        }
    }

    let cx = context();
    cx.directives.register("broken", || Box::new(Broken));
    let mut patcher = Patcher::new(cx);
    let err = patcher
        .mount(
            element("div")
                .directive(DirectiveBinding::new("broken", "x", DirectiveValue::Value(Value::Null)))
                .into(),
        )
        .unwrap_err();
    assert_eq!(err.to_string(), "directive broken:x failed: nope");
}

// ---------------------------------------------------------------------------
// Reactivity
// ---------------------------------------------------------------------------

#[test]
fn test_reactive_fan_out() {
    let shared = ObservedMap::new();
    let parent = ObservedMap::from_pairs([("a", shared.clone())]);
    let item = ObservedMap::from_pairs([("a", shared)]);

    let parent_hits = Rc::new(Cell::new(0));
    let item_hits = Rc::new(Cell::new(0));
    let hits = Rc::clone(&parent_hits);
    parent.subscribe(Listener::new(move || hits.set(hits.get() + 1)));
    let hits = Rc::clone(&item_hits);
    item.subscribe(Listener::new(move || hits.set(hits.get() + 1)));

    // Reads attach each root's listeners to the shared object.
    let _ = item.get("a");
    parent.get("a").as_map().unwrap().set("b", 1);

    assert_eq!(parent_hits.get(), 1);
    assert_eq!(item_hits.get(), 1);
}

#[test]
fn test_reads_never_notify() {
    let state = ObservedMap::from_pairs([("list", ObservedList::from_values(vec![Value::from(1)]))]);
    let hits = Rc::new(Cell::new(0));
    let counter = Rc::clone(&hits);
    state.subscribe(Listener::new(move || counter.set(counter.get() + 1)));

    let list = state.get("list");
    let _ = list.as_list().unwrap().values();
    let _ = state.entries();
    assert_eq!(hits.get(), 0);
}

// ---------------------------------------------------------------------------
// Components
// ---------------------------------------------------------------------------

struct Row;

impl Component for Row {
    fn render(&self, cx: &RenderContext<'_>) -> Node {
        element("li").child(text(cx.props.get("label").to_string())).into()
    }
}

fn rows(keys: &[i64]) -> Node {
    element("ul")
        .children(keys.iter().map(|&k| element("row").key(k).prop("label", format!("row {k}"))))
        .into()
}

#[test]
fn test_component_persists_across_reorder() {
    let cx = context();
    cx.components.register("row", || Row);
    let mut patcher = Patcher::new(cx);
    let root = patcher.mount(rows(&[0, 1])).unwrap();

    let instances = |patcher: &Patcher| -> Vec<_> {
        patcher
            .tree()
            .unwrap()
            .children()
            .iter()
            .map(|child| child.component().cloned().unwrap())
            .collect()
    };
    let first = instances(&patcher);

    patcher.update(rows(&[0, 1])).unwrap();
    let second = instances(&patcher);
    assert!(first[0].ptr_eq(&second[0]));
    assert!(first[1].ptr_eq(&second[1]));

    patcher.update(rows(&[1, 0])).unwrap();
    let third = instances(&patcher);
    assert!(third[0].ptr_eq(&first[1]));
    assert!(third[1].ptr_eq(&first[0]));

    let surface = &patcher.context().surface;
    assert_eq!(
        surface.children(root),
        vec![first[1].root().unwrap(), first[0].root().unwrap()]
    );
    assert_eq!(surface.to_markup(root), "<ul><li>row 1</li><li>row 0</li></ul>");
}

/// Renders `<p>` until it receives a `toggle` event, then `<section>`.
struct Swapper;

impl Component for Swapper {
    fn state(&self) -> ObservedMap {
        ObservedMap::from_pairs([("wide", false)])
    }

    fn render(&self, cx: &RenderContext<'_>) -> Node {
        let state = cx.state.clone();
        let tag = if cx.state.get("wide").is_truthy() { "section" } else { "p" };
        element(tag)
            .on("toggle", move |_| state.set("wide", true))
            .child(text("x"))
            .into()
    }
}

struct Wrapper;

impl Component for Wrapper {
    fn render(&self, _: &RenderContext<'_>) -> Node {
        element("swapper").into()
    }
}

fn toggle(surface: &Surface, target: SurfaceId) {
    surface.dispatch(&SurfaceEvent::new("toggle", target)).unwrap();
}

#[test]
fn test_nested_component_root_swap_keeps_parent_valid() {
    let cx = context();
    cx.components.register("swapper", || Swapper);
    cx.components.register("wrapper", || Wrapper);
    let surface = cx.surface.clone();
    let render = || -> Node {
        element("div")
            .child(element("wrapper"))
            .child(element("span"))
            .into()
    };
    let mut patcher = Patcher::new(cx);
    let root = patcher.mount(render()).unwrap();
    let wrapper = patcher.tree().unwrap().children()[0].component().cloned().unwrap();
    let before = wrapper.root().unwrap();
    assert_eq!(surface.to_markup(root), "<div><p>x</p><span></span></div>");

    toggle(&surface, before);
    let after = wrapper.root().unwrap();
    assert_ne!(after, before);
    assert!(!surface.contains(before));
    assert_eq!(surface.children(root)[0], after);

    patcher.update(render()).unwrap();
    assert_eq!(surface.to_markup(root), "<div><section>x</section><span></span></div>");
    assert_eq!(child_handles(&patcher)[0], after);
    assert!(wrapper.is_mounted());
}

#[test]
fn test_component_node_directives_follow_root_swap() {
    let cx = context();
    cx.components.register("swapper", || Swapper);
    let surface = cx.surface.clone();
    let hits = Rc::new(Cell::new(0));
    let render = || -> Node {
        let hits = Rc::clone(&hits);
        element("div")
            .child(
                element("swapper")
                    .attr("title", "a")
                    .on("click", move |_| hits.set(hits.get() + 1)),
            )
            .into()
    };
    let mut patcher = Patcher::new(cx);
    let root = patcher.mount(render()).unwrap();
    let before = surface.first_child(root).unwrap();
    assert_eq!(surface.attribute(before, "title").as_deref(), Some("a"));

    toggle(&surface, before);
    patcher.update(render()).unwrap();

    let after = surface.first_child(root).unwrap();
    assert_ne!(after, before);
    assert_eq!(surface.tag(after).as_deref(), Some("section"));
    assert_eq!(surface.attribute(after, "title").as_deref(), Some("a"));
    assert_eq!(surface.dispatch(&SurfaceEvent::new("click", after)).unwrap(), 1);
    assert_eq!(hits.get(), 1);
}

struct Tally;

impl Component for Tally {
    fn render(&self, cx: &RenderContext<'_>) -> Node {
        let count = cx.props.get("items").as_list().map_or(0, ObservedList::len);
        element("li").child(text(count.to_string())).into()
    }
}

#[test]
fn test_detached_components_stop_listening_to_shared_data() {
    let cx = context();
    cx.components.register("tally", || Tally);
    let shared = ObservedList::new();
    let render = |k: usize| -> Node {
        element("ul")
            .child(element("tally").key(k).prop("items", shared.clone()))
            .into()
    };
    let mut patcher = Patcher::new(cx);
    let root = patcher.mount(render(0)).unwrap();
    for k in 1..50 {
        patcher.update(render(k)).unwrap();
    }
    assert_eq!(shared.listeners().len(), 1);

    shared.push("milk");
    assert_eq!(patcher.context().surface.to_markup(root), "<ul><li>1</li></ul>");
}

#[test]
fn test_unkeyed_components_reused_in_order() {
    let cx = context();
    cx.components.register("row", || Row);
    let mut patcher = Patcher::new(cx);
    let unkeyed = |n: usize| -> Node {
        element("ul")
            .children((0..n).map(|i| element("row").prop("label", i)))
            .into()
    };
    patcher.mount(unkeyed(2)).unwrap();
    let first: Vec<_> = patcher
        .tree()
        .unwrap()
        .children()
        .iter()
        .filter_map(|c| c.component().cloned())
        .collect();

    patcher.update(unkeyed(1)).unwrap();
    let kept = patcher.tree().unwrap().children()[0].component().cloned().unwrap();
    assert!(kept.ptr_eq(&first[0]));
    assert!(first[1].is_detached());
}

#[test]
fn test_removed_component_is_detached() {
    let app = App::new(AppConfig::new());
    app.register("row", || Row);
    let cx = app.context().clone();
    let mut patcher = Patcher::new(cx);
    patcher.mount(rows(&[0, 1])).unwrap();
    let gone = patcher.tree().unwrap().children()[1].component().cloned().unwrap();
    app.lifecycle_events();

    patcher.update(rows(&[0])).unwrap();
    assert!(gone.is_detached());
    assert!(app
        .lifecycle_events()
        .contains(&LifecycleEvent::Detach { component: gone.id() }));

    // Writes to a detached instance never re-render it.
    gone.props().set("label", "ghost");
    assert!(gone.root().is_none());
    assert!(!app.lifecycle_events().contains(&LifecycleEvent::Update { component: gone.id() }));
}

#[test]
fn test_component_rerender_is_noop_when_unchanged() {
    let app = App::new(AppConfig::new().with_record_mutations(true));
    let handle = app.mount("row", Row).unwrap();
    app.surface().take_mutations();

    handle.update().unwrap();
    assert!(app.surface().take_mutations().is_empty());
}

#[test]
fn test_component_local_registry() {
    struct Shell;
    impl Component for Shell {
        fn components(&self) -> Vec<(String, veneer::component::ComponentFactory)> {
            vec![("row".to_owned(), veneer::component::factory(|| Row))]
        }
        fn render(&self, _: &RenderContext<'_>) -> Node {
            element("ul").child(element("row").prop("label", "inner")).into()
        }
    }

    let app = App::new(AppConfig::new());
    app.mount("shell", Shell).unwrap();
    assert_eq!(app.markup(), "<body><ul><li>inner</li></ul></body>");
    assert!(!app.context().components.contains("row"));
}

// ---------------------------------------------------------------------------
// Todo app through the pilot
// ---------------------------------------------------------------------------

struct TodoApp;

impl Component for TodoApp {
    fn state(&self) -> ObservedMap {
        ObservedMap::from_pairs([
            ("draft", Value::from("")),
            ("items", Value::from(ObservedList::new())),
        ])
    }

    fn components(&self) -> Vec<(String, veneer::component::ComponentFactory)> {
        vec![("todo-item".to_owned(), veneer::component::factory(|| TodoItem))]
    }

    fn render(&self, cx: &RenderContext<'_>) -> Node {
        let items = cx.state.get("items");
        let labels = items.as_list().map(ObservedList::values).unwrap_or_default();

        let typing = cx.state.clone();
        let adding = cx.state.clone();
        element("section")
            .child(
                element("input")
                    .attr("value", cx.state.get("draft"))
                    .on("input", move |event| {
                        typing.set("draft", event.value.clone().unwrap_or_default());
                    }),
            )
            .child(
                element("button")
                    .on("click", move |_| {
                        let draft = adding.get("draft").to_string();
                        if draft.is_empty() {
                            return;
                        }
                        batch(|| {
                            if let Some(items) = adding.get("items").as_list() {
                                items.push(draft);
                            }
                            adding.set("draft", "");
                        });
                    })
                    .child(text("add")),
            )
            .child(element("ul").children(
                labels
                    .into_iter()
                    .enumerate()
                    .map(|(i, label)| element("todo-item").key(i).prop("label", label)),
            ))
            .into()
    }
}

struct TodoItem;

impl Component for TodoItem {
    fn state(&self) -> ObservedMap {
        ObservedMap::from_pairs([("done", false)])
    }

    fn render(&self, cx: &RenderContext<'_>) -> Node {
        let state = cx.state.clone();
        let done = cx.state.get("done").is_truthy();
        let mut li = element("li").on("click", move |_| {
            let done = state.get("done").is_truthy();
            state.set("done", !done);
        });
        if done {
            li = li.attr("class", "done");
        }
        li.child(text(cx.props.get("label").to_string())).into()
    }
}

fn add(pilot: &Pilot, label: &str) {
    let field = pilot.first("input").unwrap();
    pilot.input(field, label).unwrap();
    let button = pilot.first("button").unwrap();
    pilot.click(button).unwrap();
}

#[test]
fn test_pilot_todo_flow() {
    let pilot = Pilot::new("todo-app", TodoApp).unwrap();
    add(&pilot, "milk");
    add(&pilot, "eggs");
    assert_eq!(pilot.query("li").len(), 2);

    let milk = pilot.query("li")[0];
    pilot.click(milk).unwrap();
    insta::assert_snapshot!(pilot.markup(), @r###"<section><input value></input><button>add</button><ul><li class="done">milk</li><li>eggs</li></ul></section>"###);

    // Toggling back removes the attribute binding entirely.
    pilot.click(milk).unwrap();
    assert_eq!(pilot.by_attribute("class", "done"), Vec::<SurfaceId>::new());
}

#[test]
fn test_pilot_empty_draft_adds_nothing() {
    let pilot = Pilot::new("todo-app", TodoApp).unwrap();
    let button = pilot.first("button").unwrap();
    assert_eq!(pilot.click(button).unwrap(), 1);
    assert!(pilot.query("li").is_empty());
}

#[test]
fn test_pilot_items_keep_state_by_key() {
    let pilot = Pilot::new("todo-app", TodoApp).unwrap();
    add(&pilot, "milk");
    add(&pilot, "eggs");
    let first = pilot.query("li")[0];
    pilot.click(first).unwrap();

    // Removing the first label re-keys by index: key 0 survives with the
    // next label, key 1 is dropped.
    pilot
        .root()
        .state()
        .get("items")
        .as_list()
        .unwrap()
        .remove(0);
    assert_eq!(pilot.query("li"), vec![first]);
    assert_eq!(pilot.markup(), r#"<section><input value></input><button>add</button><ul><li class="done">eggs</li></ul></section>"#);
}
