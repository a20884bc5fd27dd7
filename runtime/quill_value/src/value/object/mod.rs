//! Host records as values.
//!
//! A host type becomes visible to expressions by implementing [`Record`]:
//! it lists its fields to a [`MemberVisitor`] and may name one of them as
//! its *default member*, the value the record stands for when it is used
//! as a scalar (a card field record coerces like its text, for instance).
//!
//! [`ScriptObject`] wraps an `Rc` to the record and answers every
//! capability from the record's fields, its hooks, or its default member,
//! in that order.

use std::borrow::Cow;
use std::rc::Rc;

use chrono::NaiveDateTime;

use super::{Color, CompareAs, GeneratedImage, ScriptValue, Value, ValueKind};
use crate::convert::ToValue;
use crate::dependency::Dependency;
use crate::errors::{no_such_member, not_iterable, type_mismatch, EvalResult};

/// A host type that expressions can read.
pub trait Record: 'static {
    /// Name reported in diagnostics and by `type_name`.
    const TYPE_NAME: &'static str;

    /// Describe the readable fields to `visitor`.
    fn reflect(&self, visitor: &mut dyn MemberVisitor);

    /// Item count for records that are themselves lists.
    fn item_count(&self) -> Option<usize> {
        None
    }

    /// Iterator for records that are themselves lists.
    fn make_iterator(&self) -> EvalResult<Option<Value>> {
        Ok(None)
    }

    /// Register `dep` with the storage behind field `name`.
    fn mark_dependency_member(&self, _name: &str, _dep: &Dependency) {}

    /// Register `dep` with the record as a whole.
    fn mark_dependency(&self, _dep: &Dependency) {}

    /// Program text for the record, when it has a better one than its
    /// default member's.
    fn to_code(&self) -> Option<String> {
        None
    }
}

/// Receives the fields a record reports from [`Record::reflect`].
pub trait MemberVisitor {
    fn field(&mut self, name: &str, value: &dyn ToValue);

    /// The field the record stands for in scalar contexts.
    fn default_member(&mut self, _value: &dyn ToValue) {}
}

/// Resolves one field by name.
pub struct GetMember<'a> {
    name: &'a str,
    found: Option<Value>,
}

impl<'a> GetMember<'a> {
    pub fn new(name: &'a str) -> Self {
        GetMember { name, found: None }
    }

    pub fn into_value(self) -> Option<Value> {
        self.found
    }
}

impl MemberVisitor for GetMember<'_> {
    fn field(&mut self, name: &str, value: &dyn ToValue) {
        if self.found.is_none() && name == self.name {
            self.found = Some(value.to_value());
        }
    }
}

/// Resolves the default member.
#[derive(Default)]
pub struct GetDefaultMember {
    found: Option<Value>,
}

impl GetDefaultMember {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_value(self) -> Option<Value> {
        self.found
    }
}

impl MemberVisitor for GetDefaultMember {
    fn field(&mut self, _name: &str, _value: &dyn ToValue) {}

    fn default_member(&mut self, value: &dyn ToValue) {
        if self.found.is_none() {
            self.found = Some(value.to_value());
        }
    }
}

/// A host record exposed as a value.
pub struct ScriptObject<T> {
    record: Rc<T>,
}

impl<T: Record> ScriptObject<T> {
    pub fn new(record: Rc<T>) -> Self {
        ScriptObject { record }
    }

    pub fn record(&self) -> &Rc<T> {
        &self.record
    }

    fn default_member(&self) -> Option<Value> {
        let mut visitor = GetDefaultMember::new();
        self.record.reflect(&mut visitor);
        visitor.into_value()
    }

    /// Answer through the default member, or fail as a plain record would.
    fn delegate<R>(&self, target: &str, f: impl FnOnce(&Value) -> EvalResult<R>) -> EvalResult<R> {
        match self.default_member() {
            Some(member) => f(&member),
            None => Err(type_mismatch(T::TYPE_NAME, target)),
        }
    }
}

impl<T: Record> ScriptValue for ScriptObject<T> {
    fn kind(&self) -> ValueKind {
        self.default_member()
            .map_or(ValueKind::Object, |member| member.kind())
    }

    fn type_name(&self) -> Cow<'static, str> {
        Cow::Borrowed(T::TYPE_NAME)
    }

    fn to_string_value(&self) -> EvalResult<String> {
        self.delegate("string", |m| m.to_string_value())
    }

    fn to_double(&self) -> EvalResult<f64> {
        self.delegate("number", |m| m.to_double())
    }

    fn to_int(&self) -> EvalResult<i64> {
        self.delegate("integer", |m| m.to_int())
    }

    fn to_bool(&self) -> EvalResult<bool> {
        self.delegate("boolean", |m| m.to_bool())
    }

    fn to_color(&self) -> EvalResult<Color> {
        self.delegate("color", |m| m.to_color())
    }

    fn to_date_time(&self) -> EvalResult<NaiveDateTime> {
        self.delegate("date", |m| m.to_date_time())
    }

    fn to_image(&self) -> EvalResult<GeneratedImage> {
        self.delegate("image", |m| m.to_image())
    }

    fn to_code(&self) -> String {
        if let Some(code) = self.record.to_code() {
            return code;
        }
        self.default_member()
            .map_or_else(|| format!("<{}>", T::TYPE_NAME), |member| member.to_code())
    }

    fn compare_as(&self) -> EvalResult<CompareAs> {
        match self.default_member() {
            Some(member) => member.compare_as(),
            None => Ok(CompareAs::Identity(
                Rc::as_ptr(&self.record).cast::<()>() as usize,
            )),
        }
    }

    fn get_member(&self, name: &str) -> Value {
        #[cfg(feature = "profiling")]
        let _span = tracing::trace_span!("get_member", record = T::TYPE_NAME, member = name).entered();

        let mut visitor = GetMember::new(name);
        self.record.reflect(&mut visitor);
        if let Some(found) = visitor.into_value() {
            return found;
        }
        match self.default_member() {
            Some(member) => {
                tracing::trace!(record = T::TYPE_NAME, member = name, "falling back to default member");
                member.get_member(name)
            }
            None => Value::delayed_error(no_such_member(T::TYPE_NAME, name)),
        }
    }

    fn get_index(&self, index: i64) -> Value {
        match self.default_member() {
            Some(member) => member.get_index(index),
            None => Value::delayed_error(no_such_member(T::TYPE_NAME, &index.to_string())),
        }
    }

    fn item_count(&self) -> EvalResult<Option<usize>> {
        if let Some(count) = self.record.item_count() {
            return Ok(Some(count));
        }
        match self.default_member() {
            Some(member) => member.item_count(),
            None => Ok(None),
        }
    }

    fn make_iterator(&self, _this: &Value) -> EvalResult<Value> {
        if let Some(iter) = self.record.make_iterator()? {
            return Ok(iter);
        }
        match self.default_member() {
            Some(member) => member.iter(),
            None => Err(not_iterable(T::TYPE_NAME)),
        }
    }

    fn dependency_member(&self, name: &str, dep: &Dependency) -> Value {
        self.record.mark_dependency_member(name, dep);
        self.get_member(name)
    }

    fn dependency_this(&self, dep: &Dependency) -> EvalResult<()> {
        self.record.mark_dependency(dep);
        Ok(())
    }
}
