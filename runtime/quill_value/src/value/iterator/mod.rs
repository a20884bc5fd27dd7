//! Iterator values.
//!
//! An iterator is a value whose `next()` yields items until it is
//! exhausted. Iterators are single-pass: the cursor lives inside the
//! iterator (in a `Cell`, since values are shared through `Rc`), and every
//! handle to the same iterator sees the same cursor. Restarting means
//! asking the source collection for a fresh iterator.

use std::borrow::Cow;
use std::cell::Cell;
use std::rc::Rc;

use super::{CompareAs, ScriptValue, Value, ValueKind};
use crate::errors::EvalResult;

/// One step of an iteration: the element and, for keyed iteration, its
/// key (an index or a name).
#[derive(Clone, Debug, PartialEq)]
pub struct IterItem {
    pub value: Value,
    pub key: Option<Value>,
}

impl IterItem {
    #[inline]
    pub fn new(value: Value) -> Self {
        IterItem { value, key: None }
    }

    #[inline]
    pub fn keyed(key: Value, value: Value) -> Self {
        IterItem {
            value,
            key: Some(key),
        }
    }

    /// Item keyed by its position.
    #[inline]
    pub fn indexed(index: usize, value: Value) -> Self {
        IterItem::keyed(Value::int(index_to_int(index)), value)
    }
}

/// A source of items with an internal cursor.
pub trait ScriptIterator {
    /// The next item, or `None` once exhausted. Calling again after
    /// exhaustion keeps returning `None`.
    fn next(&self) -> EvalResult<Option<IterItem>>;
}

/// Adapts a [`ScriptIterator`] into a value.
#[derive(Clone)]
pub struct IteratorValue {
    inner: Rc<dyn ScriptIterator>,
}

impl IteratorValue {
    pub fn new(iter: impl ScriptIterator + 'static) -> Self {
        IteratorValue {
            inner: Rc::new(iter),
        }
    }
}

impl ScriptValue for IteratorValue {
    fn kind(&self) -> ValueKind {
        ValueKind::Iterator
    }

    fn type_name(&self) -> Cow<'static, str> {
        Cow::Borrowed("iterator")
    }

    fn compare_as(&self) -> EvalResult<CompareAs> {
        Ok(CompareAs::Incomparable)
    }

    /// Iterating an iterator continues from its current position.
    fn make_iterator(&self, this: &Value) -> EvalResult<Value> {
        Ok(this.clone())
    }

    fn next(&self) -> EvalResult<Option<IterItem>> {
        self.inner.next()
    }
}

// Range

/// The integers in `[start, end)`, ascending, keyed by position.
#[derive(Debug)]
pub struct RangeIterator {
    start: i64,
    end: i64,
    pos: Cell<i64>,
}

impl RangeIterator {
    pub fn new(start: i64, end: i64) -> Self {
        RangeIterator {
            start,
            end,
            pos: Cell::new(start),
        }
    }
}

impl ScriptIterator for RangeIterator {
    fn next(&self) -> EvalResult<Option<IterItem>> {
        let pos = self.pos.get();
        if pos >= self.end {
            return Ok(None);
        }
        self.pos.set(pos + 1);
        let key = Value::int(pos.wrapping_sub(self.start));
        Ok(Some(IterItem::keyed(key, Value::int(pos))))
    }
}

// Positional

/// Steps an index through a source that is read live at each step.
///
/// `step(i)` returns the item at position `i`, or `None` past the end.
pub(crate) struct IndexIterator<F> {
    pos: Cell<usize>,
    step: F,
}

impl<F> IndexIterator<F>
where
    F: Fn(usize) -> EvalResult<Option<IterItem>>,
{
    pub(crate) fn new(step: F) -> Self {
        IndexIterator {
            pos: Cell::new(0),
            step,
        }
    }
}

impl<F> ScriptIterator for IndexIterator<F>
where
    F: Fn(usize) -> EvalResult<Option<IterItem>>,
{
    fn next(&self) -> EvalResult<Option<IterItem>> {
        let pos = self.pos.get();
        let item = (self.step)(pos)?;
        if item.is_some() {
            self.pos.set(pos + 1);
        }
        Ok(item)
    }
}

/// Drain an iterator value into a vector.
pub(crate) fn collect_items(iter: &Value) -> EvalResult<Vec<IterItem>> {
    let mut items = Vec::new();
    while let Some(item) = iter.next()? {
        items.push(item);
    }
    Ok(items)
}

pub(crate) fn index_to_int(index: usize) -> i64 {
    i64::try_from(index).unwrap_or(i64::MAX)
}
