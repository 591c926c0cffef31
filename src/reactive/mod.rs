//! Reactive state: observed maps and lists that notify listeners on write.
//!
//! - [`ObservedMap`] / [`ObservedList`]: shared containers; every write
//!   notifies, reads never do.
//! - [`observe`]: attach a listener set to a value, merging with any set
//!   already attached.
//! - [`batch`]: coalesce multiple writes into one notification pass.

pub mod listener;
pub mod store;
pub mod value;

pub use listener::{batch, Listener, ListenerKey, Listeners};
pub use store::{observe, Observed, ObservedList, ObservedMap};
pub use value::Value;
