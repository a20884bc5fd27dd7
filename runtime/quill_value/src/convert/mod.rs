//! Conversion between host data and values.
//!
//! [`ToValue`] turns host data into values: scalars become scalar values,
//! `Shared` sequences and maps become collections reading the host's
//! storage, and `Rc`'d records become objects. [`FromValue`] goes the
//! other way, by coercion for scalars and by downcasting for records.

use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;
use std::rc::Rc;

use chrono::NaiveDateTime;

use crate::dependency::Dependency;
use crate::errors::{conversion_mismatch, EvalResult};
use crate::shared::Shared;
use crate::value::{
    Color, GeneratedImage, Record, ScriptCollection, ScriptMap, ScriptObject, Value,
};

/// Host data that can be seen as a value.
pub trait ToValue {
    fn to_value(&self) -> Value;

    /// Name of the values this type converts to, for diagnostics.
    fn type_name() -> Cow<'static, str>
    where
        Self: Sized,
    {
        Cow::Borrowed("object")
    }

    /// Register `dep` with the storage behind this datum. Only records
    /// have storage to register with.
    fn mark_dependency(&self, _dep: &Dependency) {}
}

/// Convert `value` to a runtime value.
#[inline]
pub fn to_value<T: ToValue + ?Sized>(value: &T) -> Value {
    value.to_value()
}

macro_rules! scalar_to_value {
    ($($ty:ty => $name:literal, |$v:ident| $make:expr;)*) => {
        $(
            impl ToValue for $ty {
                fn to_value(&self) -> Value {
                    let $v = self;
                    $make
                }

                fn type_name() -> Cow<'static, str> {
                    Cow::Borrowed($name)
                }
            }
        )*
    };
}

scalar_to_value! {
    i32 => "integer", |v| Value::int(i64::from(*v));
    u32 => "integer", |v| Value::int(i64::from(*v));
    i64 => "integer", |v| Value::int(*v);
    usize => "integer", |v| Value::int(i64::try_from(*v).unwrap_or(i64::MAX));
    f64 => "double", |v| Value::double(*v);
    bool => "boolean", |v| Value::bool(*v);
    String => "string", |v| Value::string(v.as_str());
    Color => "color", |v| Value::color(*v);
    NaiveDateTime => "date", |v| Value::date_time(*v);
    GeneratedImage => "image", |v| Value::image(v.clone());
}

impl ToValue for str {
    fn to_value(&self) -> Value {
        Value::string(self)
    }
}

impl ToValue for &str {
    fn to_value(&self) -> Value {
        Value::string(*self)
    }

    fn type_name() -> Cow<'static, str> {
        Cow::Borrowed("string")
    }
}

impl ToValue for Value {
    fn to_value(&self) -> Value {
        self.clone()
    }

    fn type_name() -> Cow<'static, str> {
        Cow::Borrowed("value")
    }

    fn mark_dependency(&self, dep: &Dependency) {
        // Plain values have nowhere to store the token; objects do.
        if let Err(err) = self.dependency_this(dep) {
            tracing::debug!(error = %err, "dependency not recorded");
        }
    }
}

impl<T: Record> ToValue for Rc<T> {
    fn to_value(&self) -> Value {
        Value::new(ScriptObject::new(Rc::clone(self)))
    }

    fn type_name() -> Cow<'static, str> {
        Cow::Borrowed(T::TYPE_NAME)
    }

    fn mark_dependency(&self, dep: &Dependency) {
        Record::mark_dependency(&**self, dep);
    }
}

impl<T: ToValue + 'static> ToValue for Shared<Vec<T>> {
    fn to_value(&self) -> Value {
        Value::new(ScriptCollection::new(self.handle()))
    }

    fn type_name() -> Cow<'static, str> {
        Cow::Owned(format!("collection of {}", T::type_name()))
    }
}

impl<V: ToValue + 'static> ToValue for Shared<BTreeMap<String, V>> {
    fn to_value(&self) -> Value {
        Value::new(ScriptMap::new(self.handle()))
    }

    fn type_name() -> Cow<'static, str> {
        Cow::Owned(format!("collection of {}", V::type_name()))
    }
}

impl<V: ToValue + 'static, S: BuildHasher + 'static> ToValue for Shared<HashMap<String, V, S>> {
    fn to_value(&self) -> Value {
        Value::new(ScriptMap::new(self.handle()))
    }

    fn type_name() -> Cow<'static, str> {
        Cow::Owned(format!("collection of {}", V::type_name()))
    }
}

/// Absent values are nil.
impl<T: ToValue> ToValue for Option<T> {
    fn to_value(&self) -> Value {
        self.as_ref().map_or_else(Value::nil, ToValue::to_value)
    }

    fn type_name() -> Cow<'static, str> {
        T::type_name()
    }

    fn mark_dependency(&self, dep: &Dependency) {
        if let Some(value) = self {
            value.mark_dependency(dep);
        }
    }
}

/// A host field that may still hold its default.
///
/// Converts like the value it holds either way; `is_default` is for the
/// host, which writes defaults differently.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Defaultable<T> {
    value: T,
    is_default: bool,
}

impl<T> Defaultable<T> {
    /// A value still equal to the default.
    pub fn default_value(value: T) -> Self {
        Defaultable {
            value,
            is_default: true,
        }
    }

    /// A value set explicitly.
    pub fn set(value: T) -> Self {
        Defaultable {
            value,
            is_default: false,
        }
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    pub fn is_default(&self) -> bool {
        self.is_default
    }
}

impl<T: ToValue> ToValue for Defaultable<T> {
    fn to_value(&self) -> Value {
        self.value.to_value()
    }

    fn type_name() -> Cow<'static, str> {
        T::type_name()
    }

    fn mark_dependency(&self, dep: &Dependency) {
        self.value.mark_dependency(dep);
    }
}

// Values to host data

/// Host data that can be read back from a value.
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> EvalResult<Self>;
}

/// Convert `value` to `T`.
#[inline]
pub fn from_value<T: FromValue>(value: &Value) -> EvalResult<T> {
    T::from_value(value)
}

impl FromValue for Value {
    fn from_value(value: &Value) -> EvalResult<Self> {
        Ok(value.clone())
    }
}

/// Records are recovered by downcasting; a delayed error reports its own
/// failure rather than a mismatch.
impl<T: Record> FromValue for Rc<T> {
    fn from_value(value: &Value) -> EvalResult<Self> {
        if let Some(err) = value.as_delayed_error() {
            return Err(err.clone());
        }
        value
            .downcast_ref::<ScriptObject<T>>()
            .map(|object| Rc::clone(object.record()))
            .ok_or_else(|| conversion_mismatch(&value.type_name(), T::TYPE_NAME))
    }
}

macro_rules! scalar_from_value {
    ($($ty:ty => |$v:ident| $coerce:expr;)*) => {
        $(
            impl FromValue for $ty {
                fn from_value($v: &Value) -> EvalResult<Self> {
                    $coerce
                }
            }
        )*
    };
}

scalar_from_value! {
    String => |v| v.to_string_value();
    i64 => |v| v.to_int();
    i32 => |v| {
        let n = v.to_int()?;
        i32::try_from(n).map_err(|_| conversion_mismatch(&n.to_string(), "32-bit integer"))
    };
    f64 => |v| v.to_double();
    bool => |v| v.to_bool();
    Color => |v| v.to_color();
    NaiveDateTime => |v| v.to_date_time();
    GeneratedImage => |v| v.to_image();
}
