//! Collection values.
//!
//! - [`ScriptCollection`]: a host `Vec<T>`, addressed by index.
//! - [`ScriptMap`]: a host map from names to `V`, addressed by name.
//! - [`ScriptCustomCollection`]: built by expressions, positional and named
//!   parts kept apart.
//! - [`ScriptConcatCollection`]: two collections seen as one, without copying.
//!
//! Host-backed collections hold a [`SharedRef`] and read the storage on
//! every access, so changes the host makes between two lookups are seen.
//!
//! # Identity
//!
//! Collections compare by identity, never by content. Wrappers over the
//! same host storage are equal; runtime-built collections are only equal
//! to themselves.

use std::borrow::Cow;
use std::cell::Cell;
use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

use quill_stack::ensure_sufficient_stack;

use super::iterator::{collect_items, index_to_int, IndexIterator};
use super::{CompareAs, IterItem, ScriptIterator, ScriptValue, Value, ValueKind};
use crate::convert::ToValue;
use crate::dependency::Dependency;
use crate::errors::{no_such_member, EvalResult};
use crate::shared::SharedRef;

/// Address of a runtime-built collection, its identity.
fn address_of<T>(value: &T) -> usize {
    std::ptr::from_ref(value).cast::<()>() as usize
}

/// Unwrap a host read, turning failures into a delayed error.
fn or_delay(read: EvalResult<Value>) -> Value {
    read.unwrap_or_else(Value::delayed_error)
}

/// Render the items of an iterator as `[a, b, name: c]`.
fn collection_code(iter: EvalResult<Value>) -> String {
    ensure_sufficient_stack(|| {
        let Ok(items) = iter.and_then(|iter| collect_items(&iter)) else {
            return "[...]".to_string();
        };
        let parts: Vec<String> = items
            .iter()
            .map(|item| match &item.key {
                Some(key) if key.kind() == ValueKind::String => format!(
                    "{}: {}",
                    key.to_string_value().unwrap_or_default(),
                    item.value.to_code()
                ),
                _ => item.value.to_code(),
            })
            .collect();
        format!("[{}]", parts.join(", "))
    })
}

// Index-addressed

/// A host sequence exposed by index.
pub struct ScriptCollection<T> {
    items: SharedRef<Vec<T>>,
}

impl<T: ToValue + 'static> ScriptCollection<T> {
    pub fn new(items: SharedRef<Vec<T>>) -> Self {
        ScriptCollection { items }
    }

    fn iterate(&self) -> Value {
        let items = self.items.clone();
        let type_name = self.type_name();
        Value::iterator(IndexIterator::new(move |i| {
            items.read(&type_name, |v| {
                v.get(i).map(|item| IterItem::indexed(i, item.to_value()))
            })
        }))
    }
}

impl<T: ToValue + 'static> ScriptValue for ScriptCollection<T> {
    fn kind(&self) -> ValueKind {
        ValueKind::Collection
    }

    fn type_name(&self) -> Cow<'static, str> {
        Cow::Owned(format!("collection of {}", T::type_name()))
    }

    fn to_code(&self) -> String {
        collection_code(Ok(self.iterate()))
    }

    fn compare_as(&self) -> EvalResult<CompareAs> {
        Ok(CompareAs::Identity(self.items.address()))
    }

    fn get_index(&self, index: i64) -> Value {
        let type_name = self.type_name();
        let item = self.items.read(&type_name, |v| {
            usize::try_from(index)
                .ok()
                .and_then(|i| v.get(i))
                .map(ToValue::to_value)
        });
        or_delay(item.and_then(|item| {
            item.ok_or_else(|| no_such_member(&type_name, &index.to_string()))
        }))
    }

    fn item_count(&self) -> EvalResult<Option<usize>> {
        self.items.read(&self.type_name(), Vec::len).map(Some)
    }

    fn make_iterator(&self, _this: &Value) -> EvalResult<Value> {
        Ok(self.iterate())
    }
}

// Key-addressed

/// A host map that can be exposed by name.
pub trait MapLike: 'static {
    type Item: ToValue;

    fn lookup(&self, key: &str) -> Option<&Self::Item>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Keys in iteration order.
    fn keys(&self) -> Vec<String>;

    /// Register `dep` with the entry under `key`.
    fn mark_dependency_member(&self, key: &str, dep: &Dependency) {
        if let Some(item) = self.lookup(key) {
            item.mark_dependency(dep);
        }
    }
}

impl<V: ToValue + 'static> MapLike for BTreeMap<String, V> {
    type Item = V;

    fn lookup(&self, key: &str) -> Option<&V> {
        self.get(key)
    }

    fn len(&self) -> usize {
        BTreeMap::len(self)
    }

    fn keys(&self) -> Vec<String> {
        BTreeMap::keys(self).cloned().collect()
    }
}

/// Hash maps iterate in sorted key order so expressions see a stable order.
impl<V: ToValue + 'static, S: BuildHasher + 'static> MapLike for HashMap<String, V, S> {
    type Item = V;

    fn lookup(&self, key: &str) -> Option<&V> {
        self.get(key)
    }

    fn len(&self) -> usize {
        HashMap::len(self)
    }

    fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = HashMap::keys(self).cloned().collect();
        keys.sort_unstable();
        keys
    }
}

/// A host map exposed by name.
pub struct ScriptMap<M> {
    map: SharedRef<M>,
}

impl<M: MapLike> ScriptMap<M> {
    pub fn new(map: SharedRef<M>) -> Self {
        ScriptMap { map }
    }

    fn iterate(&self) -> EvalResult<Value> {
        let type_name = self.type_name();
        let keys = self.map.read(&type_name, MapLike::keys)?;
        let map = self.map.clone();
        Ok(Value::iterator(IndexIterator::new(move |i| {
            let Some(key) = keys.get(i) else {
                return Ok(None);
            };
            let value = map.read(&type_name, |m| m.lookup(key).map(ToValue::to_value))?;
            let value = value.unwrap_or_else(|| {
                Value::delayed_error(no_such_member(&type_name, key))
            });
            Ok(Some(IterItem::keyed(Value::string(key.as_str()), value)))
        })))
    }
}

impl<M: MapLike> ScriptValue for ScriptMap<M> {
    fn kind(&self) -> ValueKind {
        ValueKind::Collection
    }

    fn type_name(&self) -> Cow<'static, str> {
        Cow::Owned(format!(
            "collection of {}",
            <M::Item as ToValue>::type_name()
        ))
    }

    fn to_code(&self) -> String {
        collection_code(self.iterate())
    }

    fn compare_as(&self) -> EvalResult<CompareAs> {
        Ok(CompareAs::Identity(self.map.address()))
    }

    fn get_member(&self, name: &str) -> Value {
        let type_name = self.type_name();
        let item = self
            .map
            .read(&type_name, |m| m.lookup(name).map(ToValue::to_value));
        or_delay(item.and_then(|item| item.ok_or_else(|| no_such_member(&type_name, name))))
    }

    fn item_count(&self) -> EvalResult<Option<usize>> {
        self.map.read(&self.type_name(), MapLike::len).map(Some)
    }

    fn make_iterator(&self, _this: &Value) -> EvalResult<Value> {
        self.iterate()
    }

    fn dependency_member(&self, name: &str, dep: &Dependency) -> Value {
        let marked = self
            .map
            .read(&self.type_name(), |m| m.mark_dependency_member(name, dep));
        match marked {
            Ok(()) => self.get_member(name),
            Err(err) => Value::delayed_error(err),
        }
    }
}

// Runtime-built

/// A collection built by expressions.
///
/// Items pushed without a name are positional, items inserted with a name
/// are named; the two parts never see each other.
#[derive(Clone, Debug, Default)]
pub struct ScriptCustomCollection {
    items: Vec<Value>,
    named: BTreeMap<String, Value>,
}

impl ScriptCustomCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, value: Value) {
        self.items.push(value);
    }

    /// Add a named item, replacing an earlier item of the same name.
    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.named.insert(name.into(), value);
    }

    #[must_use]
    pub fn with_item(mut self, value: Value) -> Self {
        self.push(value);
        self
    }

    #[must_use]
    pub fn with_named(mut self, name: impl Into<String>, value: Value) -> Self {
        self.insert(name, value);
        self
    }

    /// Positional items, then named items in name order.
    fn entries(&self) -> Vec<IterItem> {
        let positional = self
            .items
            .iter()
            .enumerate()
            .map(|(i, value)| IterItem::indexed(i, value.clone()));
        let named = self
            .named
            .iter()
            .map(|(name, value)| IterItem::keyed(Value::string(name.as_str()), value.clone()));
        positional.chain(named).collect()
    }

    // Contents never change once the collection is a value, so iterating
    // a snapshot is the same as iterating in place.
    fn iterate(&self) -> Value {
        let entries = self.entries();
        Value::iterator(IndexIterator::new(move |i| Ok(entries.get(i).cloned())))
    }
}

impl ScriptValue for ScriptCustomCollection {
    fn kind(&self) -> ValueKind {
        ValueKind::Collection
    }

    fn type_name(&self) -> Cow<'static, str> {
        Cow::Borrowed("collection")
    }

    fn to_code(&self) -> String {
        collection_code(Ok(self.iterate()))
    }

    fn compare_as(&self) -> EvalResult<CompareAs> {
        Ok(CompareAs::Identity(address_of(self)))
    }

    /// Named items first; numeric names then index the positional part.
    fn get_member(&self, name: &str) -> Value {
        if let Some(value) = self.named.get(name) {
            return value.clone();
        }
        match name.parse::<i64>() {
            Ok(index) => self.get_index(index),
            Err(_) => Value::delayed_error(no_such_member("collection", name)),
        }
    }

    fn get_index(&self, index: i64) -> Value {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.items.get(i))
            .cloned()
            .unwrap_or_else(|| {
                Value::delayed_error(no_such_member("collection", &index.to_string()))
            })
    }

    fn item_count(&self) -> EvalResult<Option<usize>> {
        Ok(Some(self.items.len()))
    }

    fn make_iterator(&self, _this: &Value) -> EvalResult<Value> {
        Ok(self.iterate())
    }
}

// Concatenation

/// Two collections presented as one: `a`'s items, then `b`'s.
#[derive(Clone, Debug)]
pub struct ScriptConcatCollection {
    a: Value,
    b: Value,
}

impl ScriptConcatCollection {
    pub fn new(a: Value, b: Value) -> Self {
        ScriptConcatCollection { a, b }
    }

    fn iterate(&self) -> EvalResult<Value> {
        let a = self.a.iter()?;
        let b = self.b.iter()?;
        Ok(Value::iterator(ConcatIterator::new(a, b)))
    }
}

impl ScriptValue for ScriptConcatCollection {
    fn kind(&self) -> ValueKind {
        ValueKind::Collection
    }

    fn type_name(&self) -> Cow<'static, str> {
        Cow::Borrowed("collection")
    }

    fn to_code(&self) -> String {
        collection_code(self.iterate())
    }

    fn compare_as(&self) -> EvalResult<CompareAs> {
        Ok(CompareAs::Identity(address_of(self)))
    }

    /// Numeric names index the combined sequence; other names are looked
    /// up in `a`, then in `b`.
    fn get_member(&self, name: &str) -> Value {
        if let Ok(index) = name.parse::<i64>() {
            return self.get_index(index);
        }
        ensure_sufficient_stack(|| {
            let found = self.a.get_member(name);
            if found.is_error() {
                self.b.get_member(name)
            } else {
                found
            }
        })
    }

    fn get_index(&self, index: i64) -> Value {
        ensure_sufficient_stack(|| match self.a.item_count() {
            Ok(Some(len)) => {
                let len = index_to_int(len);
                if index < len {
                    self.a.get_index(index)
                } else {
                    self.b.get_index(index - len)
                }
            }
            Ok(None) => Value::delayed_error(no_such_member("collection", &index.to_string())),
            Err(err) => Value::delayed_error(err),
        })
    }

    fn item_count(&self) -> EvalResult<Option<usize>> {
        ensure_sufficient_stack(|| {
            let a = self.a.item_count()?;
            let b = self.b.item_count()?;
            Ok(a.zip(b).map(|(a, b)| a + b))
        })
    }

    fn make_iterator(&self, _this: &Value) -> EvalResult<Value> {
        self.iterate()
    }

    fn dependency_this(&self, dep: &Dependency) -> EvalResult<()> {
        self.a.dependency_this(dep)?;
        self.b.dependency_this(dep)
    }
}

/// Drains `a`, then `b` with integer keys shifted past `a`'s items.
struct ConcatIterator {
    a: Value,
    b: Value,
    in_b: Cell<bool>,
    from_a: Cell<i64>,
}

impl ConcatIterator {
    fn new(a: Value, b: Value) -> Self {
        ConcatIterator {
            a,
            b,
            in_b: Cell::new(false),
            from_a: Cell::new(0),
        }
    }
}

impl ScriptIterator for ConcatIterator {
    fn next(&self) -> EvalResult<Option<IterItem>> {
        ensure_sufficient_stack(|| {
            if !self.in_b.get() {
                if let Some(item) = self.a.next()? {
                    self.from_a.set(self.from_a.get() + 1);
                    return Ok(Some(item));
                }
                self.in_b.set(true);
            }
            let Some(mut item) = self.b.next()? else {
                return Ok(None);
            };
            let shifted = match &item.key {
                Some(key) if key.kind() == ValueKind::Int => Some(key.to_int()? + self.from_a.get()),
                _ => None,
            };
            if let Some(key) = shifted {
                item.key = Some(Value::int(key));
            }
            Ok(Some(item))
        })
    }
}
