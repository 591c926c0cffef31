//! Surface: the live document that reconciliation mutates.
//!
//! A slotmap-backed arena of element and text nodes with attributes, event
//! listeners, an optional mutation log, and markup serialization.

pub mod event;
pub mod node;
pub mod query;
pub mod tree;

pub use event::{Callback, ListenerId, SurfaceEvent};
pub use node::{SurfaceData, SurfaceId, SurfaceKind};
pub use tree::{Mutation, Surface, SurfaceError};
