//! Observed containers: maps and lists that notify listeners on every write.
//!
//! Wrapping is lazy. A nested container is observed with its parent's
//! listeners the moment it is read through the parent, so a write reached by
//! any path notifies everything watching the root. Observing a container that
//! is already observed merges the listener sets and hands back the same
//! handle; there is never a wrapper around a wrapper.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use super::listener::{notify, Listener, Listeners};
use super::value::Value;

struct Inner<D> {
    data: RefCell<D>,
    listeners: RefCell<Listeners>,
}

/// Shared handle to observed data. Cloning copies the handle, not the data.
pub struct Observed<D> {
    inner: Rc<Inner<D>>,
}

/// Observed string-keyed map (the shape of component state and props).
pub type ObservedMap = Observed<BTreeMap<String, Value>>;

/// Observed ordered list.
pub type ObservedList = Observed<Vec<Value>>;

impl<D> Clone for Observed<D> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<D: fmt::Debug> fmt::Debug for Observed<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.data.try_borrow() {
            Ok(data) => data.fmt(f),
            Err(_) => f.write_str("<borrowed>"),
        }
    }
}

impl<D: Default> Default for Observed<D> {
    fn default() -> Self {
        Self::with_data(D::default())
    }
}

impl<D> Observed<D> {
    fn with_data(data: D) -> Self {
        Self {
            inner: Rc::new(Inner {
                data: RefCell::new(data),
                listeners: RefCell::new(Listeners::new()),
            }),
        }
    }

    /// Merge `listeners` into this container's set and return the same handle.
    pub fn observe(&self, listeners: &Listeners) -> Self {
        self.inner.listeners.borrow_mut().merge(listeners);
        self.clone()
    }

    /// Attach a single listener.
    pub fn subscribe(&self, listener: Listener) {
        self.inner.listeners.borrow_mut().insert(listener);
    }

    /// A snapshot of the live listener set. Dead listeners are dropped first.
    pub fn listeners(&self) -> Listeners {
        let mut listeners = self.inner.listeners.borrow_mut();
        listeners.prune();
        listeners.clone()
    }

    /// Whether any listener is attached.
    pub fn is_observed(&self) -> bool {
        !self.listeners().is_empty()
    }

    /// Whether both handles refer to the same container.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    fn read<R>(&self, f: impl FnOnce(&D) -> R) -> R {
        f(&self.inner.data.borrow())
    }

    /// Mutate, release the borrow, then notify.
    fn write<R>(&self, f: impl FnOnce(&mut D) -> R) -> R {
        let result = f(&mut self.inner.data.borrow_mut());
        notify(self.listeners());
        result
    }

    /// Observe a value read out of this container with this container's listeners.
    fn wrap(&self, value: Value) -> Value {
        observe(value, &self.listeners())
    }
}

/// Observe `value` with `listeners`.
///
/// Scalars are returned unchanged. Containers merge the listener set and are
/// returned as the same handle.
pub fn observe(value: Value, listeners: &Listeners) -> Value {
    match value {
        Value::Map(map) => Value::Map(map.observe(listeners)),
        Value::List(list) => Value::List(list.observe(listeners)),
        scalar => scalar,
    }
}

// ---------------------------------------------------------------------------
// ObservedMap
// ---------------------------------------------------------------------------

impl Observed<BTreeMap<String, Value>> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a map from `(key, value)` pairs without notifying anyone.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        Self::with_data(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Read a field. Absent fields read as [`Value::Null`]; containers come
    /// back observed with this map's listeners.
    pub fn get(&self, key: &str) -> Value {
        let value = self.read(|data| data.get(key).cloned().unwrap_or_default());
        self.wrap(value)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.read(|data| data.contains_key(key))
    }

    pub fn keys(&self) -> Vec<String> {
        self.read(|data| data.keys().cloned().collect())
    }

    /// All entries in key order, containers observed.
    pub fn entries(&self) -> Vec<(String, Value)> {
        let raw: Vec<(String, Value)> =
            self.read(|data| data.iter().map(|(k, v)| (k.clone(), v.clone())).collect());
        raw.into_iter().map(|(k, v)| (k, self.wrap(v))).collect()
    }

    pub fn len(&self) -> usize {
        self.read(BTreeMap::len)
    }

    pub fn is_empty(&self) -> bool {
        self.read(BTreeMap::is_empty)
    }

    /// Store `value` verbatim under `key` and notify once.
    pub fn set(&self, key: impl Into<String>, value: impl Into<Value>) {
        let (key, value) = (key.into(), value.into());
        self.write(|data| {
            data.insert(key, value);
        });
    }

    /// Remove a field, notifying once if it was present.
    pub fn remove(&self, key: &str) -> Option<Value> {
        if !self.contains_key(key) {
            return None;
        }
        self.write(|data| data.remove(key))
    }

    /// Field-wise merge of `partial` into this map, notifying once.
    pub fn assign(&self, partial: impl IntoIterator<Item = (String, Value)>) {
        let partial: Vec<(String, Value)> = partial.into_iter().collect();
        if partial.is_empty() {
            return;
        }
        self.write(|data| data.extend(partial));
    }
}

// ---------------------------------------------------------------------------
// ObservedList
// ---------------------------------------------------------------------------

impl Observed<Vec<Value>> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a list without notifying anyone.
    pub fn from_values(values: Vec<Value>) -> Self {
        Self::with_data(values)
    }

    /// Read an element. Out-of-range reads as [`Value::Null`].
    pub fn get(&self, index: usize) -> Value {
        let value = self.read(|data| data.get(index).cloned().unwrap_or_default());
        self.wrap(value)
    }

    /// All elements, containers observed.
    pub fn values(&self) -> Vec<Value> {
        let raw = self.read(|data| data.clone());
        raw.into_iter().map(|v| self.wrap(v)).collect()
    }

    pub fn len(&self) -> usize {
        self.read(Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.read(Vec::is_empty)
    }

    pub fn push(&self, value: impl Into<Value>) {
        let value = value.into();
        self.write(|data| data.push(value));
    }

    pub fn pop(&self) -> Option<Value> {
        if self.is_empty() {
            return None;
        }
        self.write(Vec::pop)
    }

    /// Insert at `index`, clamped to the list length.
    pub fn insert(&self, index: usize, value: impl Into<Value>) {
        let value = value.into();
        self.write(|data| {
            let index = index.min(data.len());
            data.insert(index, value);
        });
    }

    /// Remove the element at `index`, notifying once if it existed.
    pub fn remove(&self, index: usize) -> Option<Value> {
        if index >= self.len() {
            return None;
        }
        self.write(|data| Some(data.remove(index)))
    }

    /// Overwrite the element at `index`. Returns `false` if out of range.
    pub fn set(&self, index: usize, value: impl Into<Value>) -> bool {
        if index >= self.len() {
            return false;
        }
        let value = value.into();
        self.write(|data| data[index] = value);
        true
    }

    pub fn clear(&self) {
        self.write(Vec::clear);
    }
}
