//! # veneer
//!
//! A minimal reactive UI runtime: components render trees of elements and
//! text, and a keyed reconciler patches those trees into a retained document.
//!
//! veneer keeps the document (the *surface*) as a slotmap arena, wraps
//! component state in observed containers that re-render on every write, and
//! reuses existing surface nodes by key and position so re-renders touch only
//! what changed.
//!
//! ## Core Systems
//!
//! - **[`surface`]** — Slotmap-backed document arena with mutation log, events and markup
//! - **[`reactive`]** — Observed maps and lists with merged listener sets and batching
//! - **[`vnode`]** — Rendered tree nodes, keys and directive bindings
//! - **[`directive`]** — Attribute and event directives plus the directive registry
//! - **[`patch`]** — The reconciler and its keyed index
//! - **[`component`]** — Component trait, runtime handles, registry and lifecycle tracking
//! - **[`app`]** — Application struct tying a surface to its registries
//! - **[`testing`]** — Headless pilot and snapshot helpers

// Foundation
pub mod surface;
pub mod reactive;

// Trees and reconciliation
pub mod context;
pub mod directive;
pub mod patch;
pub mod vnode;

// Components
pub mod component;

// Application
pub mod app;
pub mod testing;

pub use app::{App, AppConfig};
pub use component::{Component, ComponentHandle, RenderContext};
pub use context::Context;
pub use patch::{PatchError, Patcher};
pub use vnode::{attr, element, event, text, Node};
