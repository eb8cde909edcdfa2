//! Context values exposed to templates.
//!
//! A [`ContextCollection`] is the ordered key/value container a renderer owns
//! and merges per-call context into. Every value handed to a template during
//! rendering passes through it.
//!
//! # Keys
//!
//! Keys are either positional ([`ContextKey::Index`]) or named
//! ([`ContextKey::Name`]). Named keys are what templates usually see; indexed
//! keys come from list-style operations like [`ContextCollection::push`].
//!
//! # Integer key policy
//!
//! The collection remembers the next free index, one past the greatest
//! integer key it has assigned so far.
//!
//! - [`push`](ContextCollection::push) always appends under the next free
//!   index, so it never overwrites an entry.
//! - [`set`](ContextCollection::set) with an integer key always wins: it
//!   overwrites in place or appends, and moves the next free index past it.
//! - [`pop`](ContextCollection::pop) of the highest index gives that index
//!   back.
//! - [`shift`](ContextCollection::shift) and
//!   [`unshift`](ContextCollection::unshift) renumber integer keys from zero
//!   in iteration order. Named keys keep their names and positions.
//! - `push` never assigns `i64::MAX`. Once the next free index reaches it
//!   (for example after `set(i64::MAX, ..)`), pushes are dropped with a
//!   warning.
//!
//! Templates see every key as a string. `Index(0)` and `Name("0")` both
//! become `"0"` in [`to_template_value`], and the entry that comes later in
//! iteration order wins.
//!
//! # Example
//!
//! ```rust
//! use template_renderer::{ContextCollection, ContextKey};
//! use minijinja::Value;
//!
//! let mut collection = ContextCollection::new();
//! collection
//!     .set("title", Value::from("Report"))
//!     .push(Value::from(1))
//!     .push(Value::from(2));
//!
//! assert_eq!(collection.count(), 3);
//! assert_eq!(collection.pop(), Some(Value::from(2)));
//! assert_eq!(collection.get(ContextKey::Index(0)), Some(&Value::from(1)));
//! ```

use std::fmt;

use indexmap::IndexMap;
use minijinja::Value;
use serde::Serialize;

/// A key in a [`ContextCollection`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ContextKey {
    /// Positional key, assigned by `push`/`unshift` or set explicitly.
    Index(i64),
    /// Named key, bound as a variable in templates.
    Name(String),
}

impl ContextKey {
    /// Returns the name if this is a named key.
    pub fn as_name(&self) -> Option<&str> {
        match self {
            ContextKey::Name(name) => Some(name),
            ContextKey::Index(_) => None,
        }
    }

    /// Returns the index if this is a positional key.
    pub fn as_index(&self) -> Option<i64> {
        match self {
            ContextKey::Index(index) => Some(*index),
            ContextKey::Name(_) => None,
        }
    }

    /// Whether this key can be bound as a template variable.
    ///
    /// Only names that look like identifiers qualify: a leading letter or
    /// underscore followed by letters, digits or underscores.
    pub fn is_identifier(&self) -> bool {
        self.as_name().is_some_and(crate::util::is_identifier)
    }
}

impl fmt::Display for ContextKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContextKey::Index(index) => write!(f, "{}", index),
            ContextKey::Name(name) => f.write_str(name),
        }
    }
}

impl From<&str> for ContextKey {
    fn from(name: &str) -> Self {
        ContextKey::Name(name.to_string())
    }
}

impl From<String> for ContextKey {
    fn from(name: String) -> Self {
        ContextKey::Name(name)
    }
}

impl From<&String> for ContextKey {
    fn from(name: &String) -> Self {
        ContextKey::Name(name.clone())
    }
}

impl From<i32> for ContextKey {
    fn from(index: i32) -> Self {
        ContextKey::Index(i64::from(index))
    }
}

impl From<i64> for ContextKey {
    fn from(index: i64) -> Self {
        ContextKey::Index(index)
    }
}

impl From<usize> for ContextKey {
    fn from(index: usize) -> Self {
        ContextKey::Index(i64::try_from(index).unwrap_or(i64::MAX))
    }
}

/// An ordered key/value map, used for per-call context and for snapshots of
/// a collection.
pub type ContextMap = IndexMap<ContextKey, Value>;

/// Builds a [`ContextMap`] from `(key, value)` pairs.
///
/// ```rust
/// use template_renderer::context::context_map;
///
/// let context = context_map([("name", "World"), ("greeting", "Hello")]);
/// assert_eq!(context.len(), 2);
/// ```
pub fn context_map<K, V, I>(pairs: I) -> ContextMap
where
    K: Into<ContextKey>,
    V: Into<Value>,
    I: IntoIterator<Item = (K, V)>,
{
    pairs
        .into_iter()
        .map(|(key, value)| (key.into(), value.into()))
        .collect()
}

/// Converts a context snapshot into a MiniJinja map value.
///
/// Every key becomes a string key, so positional entries show up as `"0"`,
/// `"1"`, ... next to the named ones.
pub fn to_template_value(map: &ContextMap) -> Value {
    Value::from_iter(
        map.iter()
            .map(|(key, value)| (key.to_string(), value.clone())),
    )
}

/// A collection of values passed to templates as context.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContextCollection {
    data: ContextMap,
    next_index: i64,
}

impl ContextCollection {
    /// Creates an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value at `key`, if present.
    pub fn get(&self, key: impl Into<ContextKey>) -> Option<&Value> {
        self.data.get(&key.into())
    }

    /// Returns the value at `key`, or `default` if it is absent.
    pub fn get_or(&self, key: impl Into<ContextKey>, default: Value) -> Value {
        self.get(key).cloned().unwrap_or(default)
    }

    /// Inserts or overwrites the value at `key`.
    pub fn set(&mut self, key: impl Into<ContextKey>, value: impl Into<Value>) -> &mut Self {
        let key = key.into();
        if let ContextKey::Index(index) = key {
            if index >= self.next_index {
                self.next_index = index.saturating_add(1);
            }
        }
        self.data.insert(key, value.into());
        self
    }

    /// Serializes `value` and stores it at `key`.
    ///
    /// Structs and other serializable types become MiniJinja maps or
    /// sequences, reachable from templates with dotted lookups.
    pub fn set_serialized<T: Serialize>(
        &mut self,
        key: impl Into<ContextKey>,
        value: &T,
    ) -> &mut Self {
        self.set(key, Value::from_serialize(value))
    }

    /// Appends `value` under the next free integer key.
    ///
    /// `push` never assigns `i64::MAX`. Once the next free index reaches it,
    /// the value is dropped with a warning and the collection is left
    /// unchanged.
    pub fn push(&mut self, value: impl Into<Value>) -> &mut Self {
        let index = self.next_index;
        let Some(next) = index.checked_add(1) else {
            tracing::warn!(index, "integer key space exhausted, value not pushed");
            return self;
        };
        self.next_index = next;
        self.data.insert(ContextKey::Index(index), value.into());
        self
    }

    /// Removes and returns the last value, or `None` if the collection is
    /// empty.
    pub fn pop(&mut self) -> Option<Value> {
        let (key, value) = self.data.pop()?;
        if self.next_index > 0 && key == ContextKey::Index(self.next_index - 1) {
            self.next_index -= 1;
        }
        Some(value)
    }

    /// Removes and returns the first value, or `None` if the collection is
    /// empty. Remaining integer keys are renumbered from zero.
    pub fn shift(&mut self) -> Option<Value> {
        let (_, value) = self.data.shift_remove_index(0)?;
        self.renumber(std::iter::empty());
        Some(value)
    }

    /// Prepends `value` under index zero, renumbering the other integer keys.
    pub fn unshift(&mut self, value: impl Into<Value>) -> &mut Self {
        self.renumber(std::iter::once(value.into()));
        self
    }

    /// Removes the entry at `key`. Absent keys are ignored.
    pub fn remove(&mut self, key: impl Into<ContextKey>) -> &mut Self {
        self.data.shift_remove(&key.into());
        self
    }

    /// Whether `key` is present, even if it holds a none value.
    pub fn exists(&self, key: impl Into<ContextKey>) -> bool {
        self.data.contains_key(&key.into())
    }

    /// Returns a snapshot of every entry, in order.
    pub fn all(&self) -> ContextMap {
        self.data.clone()
    }

    /// Removes every entry.
    pub fn clear(&mut self) -> &mut Self {
        self.data.clear();
        self.next_index = 0;
        self
    }

    /// Whether the collection has no entries.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Number of entries.
    pub fn count(&self) -> usize {
        self.data.len()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.count()
    }

    /// Iterates over entries in order.
    pub fn iter(&self) -> indexmap::map::Iter<'_, ContextKey, Value> {
        self.data.iter()
    }

    /// Converts the whole collection into a MiniJinja map value.
    pub fn to_value(&self) -> Value {
        to_template_value(&self.data)
    }

    /// Rebuilds the map with `head` in front and integer keys renumbered
    /// from zero. Named keys keep their relative positions.
    fn renumber(&mut self, head: impl Iterator<Item = Value>) {
        let old = std::mem::take(&mut self.data);
        let mut next = 0i64;
        let mut data = ContextMap::with_capacity(old.len() + 1);

        for value in head {
            data.insert(ContextKey::Index(next), value);
            next += 1;
        }
        for (key, value) in old {
            match key {
                ContextKey::Index(_) => {
                    data.insert(ContextKey::Index(next), value);
                    next += 1;
                }
                name @ ContextKey::Name(_) => {
                    data.insert(name, value);
                }
            }
        }

        self.data = data;
        self.next_index = next;
    }
}

impl<'a> IntoIterator for &'a ContextCollection {
    type Item = (&'a ContextKey, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, ContextKey, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.iter()
    }
}

impl<K: Into<ContextKey>, V: Into<Value>> Extend<(K, V)> for ContextCollection {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.set(key, value);
        }
    }
}

impl<K: Into<ContextKey>, V: Into<Value>> FromIterator<(K, V)> for ContextCollection {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut collection = ContextCollection::new();
        collection.extend(iter);
        collection
    }
}

impl From<ContextMap> for ContextCollection {
    fn from(map: ContextMap) -> Self {
        map.into_iter().collect()
    }
}
