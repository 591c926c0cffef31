//! Reconciliation: diffing rendered trees into the live surface.

mod error;
pub mod index;
pub mod patcher;

pub use error::PatchError;
pub use index::KeyedIndex;
pub use patcher::Patcher;
