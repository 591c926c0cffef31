//! Headless testing helpers: Pilot, snapshot helpers.
//!
//! Use the [`Pilot`] to mount a component and drive it with surface events.
//! Use [`render_to_markup`] and [`tree_to_string`] to capture output as plain
//! text for snapshot-style assertions.

pub mod pilot;
pub mod snapshot;

pub use pilot::Pilot;
pub use snapshot::{render_to_markup, tree_to_string};
