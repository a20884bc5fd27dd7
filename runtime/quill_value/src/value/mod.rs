//! Runtime values for the Quill expression language.
//!
//! # Capability Trait
//!
//! Every value implements [`ScriptValue`]. The trait gives each capability
//! a safe default (coercions fail with a type mismatch, lookups yield a
//! delayed no-such-member error, values are not iterable, dependency
//! marking does nothing), so a variant only overrides what is meaningful
//! for it.
//!
//! # Value Handle
//!
//! [`Value`] is a reference-counted handle to a `dyn ScriptValue`. Values
//! are never mutated after construction; composite values share their
//! parts. The evaluator only ever talks to values through this handle and
//! the trait, never through concrete types (except for the downcasts the
//! conversion bridge performs).
//!
//! ```text
//! let s = Value::string("hello");
//! let n = Value::int(3);
//! assert_eq!(s.get_index(1).to_string_value()?, "e");
//! ```

mod closure;
mod collection;
mod color;
mod error_value;
mod image;
mod iterator;
mod object;
mod scalar;

use std::any::Any;
use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;
use std::ops::Deref;
use std::rc::Rc;

use chrono::NaiveDateTime;
use quill_ir::{Name, SharedInterner};

use crate::context::Context;
use crate::dependency::Dependency;
use crate::errors::{
    no_such_member, not_comparable, not_iterable, type_mismatch, EvalError, EvalResult,
};

pub use closure::{BuiltinFn, BuiltinFunction, ScriptClosure, ScriptRule};
pub use collection::{
    MapLike, ScriptCollection, ScriptConcatCollection, ScriptCustomCollection, ScriptMap,
};
pub use color::Color;
pub use error_value::DelayedError;
pub use image::GeneratedImage;
pub use iterator::{IterItem, IteratorValue, RangeIterator, ScriptIterator};
pub use object::{GetDefaultMember, GetMember, MemberVisitor, Record, ScriptObject};
pub use scalar::{
    ScriptBool, ScriptColor, ScriptDateTime, ScriptDouble, ScriptImage, ScriptInt, ScriptNil,
    ScriptString,
};

/// Coarse-grained discriminant of a value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Nil,
    Int,
    Double,
    Bool,
    String,
    Color,
    DateTime,
    Image,
    Function,
    Object,
    Collection,
    Iterator,
    Error,
}

impl ValueKind {
    /// Whether values of this kind coerce losslessly to a number.
    #[inline]
    pub fn is_numeric(self) -> bool {
        matches!(self, ValueKind::Int | ValueKind::Double)
    }
}

/// How a value takes part in comparisons.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CompareAs {
    /// Never equal to anything but the same handle.
    Incomparable,
    /// Equal to values reporting the same identity (an address).
    Identity(usize),
    /// Compared and ordered through this text.
    Projection(String),
}

/// Blanket access to `Any` for downcasting trait objects.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any> AsAny for T {
    #[inline]
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// The capability contract every runtime value implements.
pub trait ScriptValue: AsAny {
    /// Coarse-grained discriminant.
    fn kind(&self) -> ValueKind;

    /// Human-readable type name used in diagnostics.
    fn type_name(&self) -> Cow<'static, str>;

    // Coercions

    fn to_string_value(&self) -> EvalResult<String> {
        Err(type_mismatch(&self.type_name(), "string"))
    }

    fn to_double(&self) -> EvalResult<f64> {
        Err(type_mismatch(&self.type_name(), "number"))
    }

    fn to_int(&self) -> EvalResult<i64> {
        Err(type_mismatch(&self.type_name(), "integer"))
    }

    fn to_bool(&self) -> EvalResult<bool> {
        Err(type_mismatch(&self.type_name(), "boolean"))
    }

    fn to_color(&self) -> EvalResult<Color> {
        Err(type_mismatch(&self.type_name(), "color"))
    }

    fn to_date_time(&self) -> EvalResult<NaiveDateTime> {
        Err(type_mismatch(&self.type_name(), "date"))
    }

    /// Describe the image this value renders as.
    fn to_image(&self) -> EvalResult<GeneratedImage> {
        Err(type_mismatch(&self.type_name(), "image"))
    }

    /// Best-effort program text, for error messages only.
    fn to_code(&self) -> String {
        format!("<{}>", self.type_name())
    }

    fn compare_as(&self) -> EvalResult<CompareAs> {
        Ok(CompareAs::Incomparable)
    }

    // Lookup

    /// Member access by name (`x.name`).
    ///
    /// Names that read as integers are routed to [`get_index`](Self::get_index)
    /// so `list.0` and `list[0]` agree.
    fn get_member(&self, name: &str) -> Value {
        if let Ok(index) = name.parse::<i64>() {
            tracing::trace!(name, "numeric member name routed to index lookup");
            return self.get_index(index);
        }
        Value::delayed_error(no_such_member(&self.type_name(), name))
    }

    /// Sequence access by position (`x[i]`).
    fn get_index(&self, index: i64) -> Value {
        Value::delayed_error(no_such_member(&self.type_name(), &index.to_string()))
    }

    /// Number of items, or `None` for values that are not collections.
    fn item_count(&self) -> EvalResult<Option<usize>> {
        Ok(None)
    }

    /// A fresh iterator over this value. `this` is the handle this value
    /// lives in.
    fn make_iterator(&self, _this: &Value) -> EvalResult<Value> {
        Err(not_iterable(&self.type_name()))
    }

    /// Advance an iterator value.
    fn next(&self) -> EvalResult<Option<IterItem>> {
        Err(not_iterable(&self.type_name()))
    }

    // Dependency propagation

    /// Member lookup during dependency analysis: registers `dep` with the
    /// storage behind `name`, then resolves the member.
    fn dependency_member(&self, name: &str, _dep: &Dependency) -> Value {
        self.get_member(name)
    }

    /// Registers `dep` with the storage behind the whole value.
    fn dependency_this(&self, _dep: &Dependency) -> EvalResult<()> {
        Ok(())
    }

    /// Dependency analysis counterpart of evaluation: the value a call
    /// would have while only dependencies are being recorded.
    fn dependencies(&self, _ctx: &mut Context, _dep: &Dependency) -> EvalResult<Value> {
        Ok(Value::nil())
    }

    // Evaluation

    /// Self-evaluation hook. `this` is the handle this value lives in.
    ///
    /// A plain value evaluates to itself; callables override this.
    fn do_eval(&self, this: &Value, _ctx: &mut Context, _open_scope: bool) -> EvalResult<Value> {
        Ok(this.clone())
    }

    /// Parameter names a callable reads from its evaluation scope.
    fn parameters(&self) -> &[Name] {
        &[]
    }

    /// Fold a closure around this callable whose parameters are all bound.
    ///
    /// The default evaluates the closure once and returns the result, which
    /// assumes the callable reads nothing but its declared parameters.
    /// Callables that must run every time return `None`.
    fn simplify_closure(
        &self,
        closure: &ScriptClosure,
        interner: &SharedInterner,
    ) -> Option<Value> {
        closure.fold(interner)
    }
}

/// Reference-counted handle to a runtime value.
#[derive(Clone)]
pub struct Value(Rc<dyn ScriptValue>);

// Factory Methods

impl Value {
    /// Wrap a concrete value.
    #[inline]
    pub fn new(value: impl ScriptValue) -> Self {
        Value(Rc::new(value))
    }

    #[inline]
    pub fn nil() -> Self {
        Value::new(ScriptNil)
    }

    #[inline]
    pub fn int(n: i64) -> Self {
        Value::new(ScriptInt(n))
    }

    #[inline]
    pub fn double(d: f64) -> Self {
        Value::new(ScriptDouble(d))
    }

    #[inline]
    pub fn bool(b: bool) -> Self {
        Value::new(ScriptBool(b))
    }

    #[inline]
    pub fn string(s: impl Into<String>) -> Self {
        Value::new(ScriptString(s.into()))
    }

    #[inline]
    pub fn color(c: Color) -> Self {
        Value::new(ScriptColor(c))
    }

    #[inline]
    pub fn date_time(d: NaiveDateTime) -> Self {
        Value::new(ScriptDateTime(d))
    }

    #[inline]
    pub fn image(image: GeneratedImage) -> Self {
        Value::new(ScriptImage(image))
    }

    /// An error that is only raised when the value is used.
    #[inline]
    pub fn delayed_error(error: EvalError) -> Self {
        tracing::debug!(error = %error, "delaying error");
        Value::new(DelayedError::new(error))
    }

    /// Integers in `[start, end)`, produced lazily.
    #[inline]
    pub fn range(start: i64, end: i64) -> Self {
        Value::iterator(RangeIterator::new(start, end))
    }

    /// Wrap an iterator implementation as a value.
    #[inline]
    pub fn iterator(iter: impl ScriptIterator + 'static) -> Self {
        Value::new(IteratorValue::new(iter))
    }
}

// Value Methods

impl Value {
    /// A fresh iterator over this value.
    pub fn iter(&self) -> EvalResult<Value> {
        self.0.make_iterator(self)
    }

    /// Evaluate this value in `ctx`, opening a scope for callables.
    pub fn eval(&self, ctx: &mut Context) -> EvalResult<Value> {
        self.0.do_eval(self, ctx, true)
    }

    /// Evaluate without opening a scope; the caller already did.
    pub fn eval_in_scope(&self, ctx: &mut Context) -> EvalResult<Value> {
        self.0.do_eval(self, ctx, false)
    }

    /// Turn a delayed error into an `Err`, pass any other value through.
    ///
    /// This is the point where a consumer decides that a lookup result is
    /// actually needed.
    pub fn force(self) -> EvalResult<Value> {
        match self.as_delayed_error() {
            Some(err) => Err(err.clone()),
            None => Ok(self),
        }
    }

    /// The stored error if this is a delayed error.
    pub fn as_delayed_error(&self) -> Option<&EvalError> {
        self.downcast_ref::<DelayedError>().map(DelayedError::error)
    }

    #[inline]
    pub fn is_error(&self) -> bool {
        self.0.kind() == ValueKind::Error
    }

    /// Whether both handles point at the same value.
    #[inline]
    pub fn same_as(&self, other: &Value) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Address of the value, used as identity by collections.
    #[inline]
    pub fn address(&self) -> usize {
        Rc::as_ptr(&self.0).cast::<()>() as usize
    }

    /// The concrete value, if it is a `T`.
    pub fn downcast_ref<T: ScriptValue>(&self) -> Option<&T> {
        self.0.as_any().downcast_ref::<T>()
    }
}

impl Deref for Value {
    type Target = dyn ScriptValue;

    #[inline]
    fn deref(&self) -> &Self::Target {
        &*self.0
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Value({}: {})", self.type_name(), self.to_code())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_code())
    }
}

/// Values are equal under [`equal`]; failures count as unequal.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        matches!(equal(self, other), Ok(true))
    }
}

/// Wrap `error` as a value that raises it when used.
#[inline]
pub fn delay_error(error: EvalError) -> Value {
    Value::delayed_error(error)
}

// Comparison

/// Equality as expressions see it.
///
/// Integers compare exactly, mixed numbers as doubles. Everything else
/// goes through [`ScriptValue::compare_as`]: projections compare as text,
/// identities by address. Collections and records without a default
/// member are therefore only equal to themselves, never to a structurally
/// identical copy.
pub fn equal(a: &Value, b: &Value) -> EvalResult<bool> {
    // A delayed error raises its error even against itself.
    if a.same_as(b) && !a.is_error() {
        return Ok(true);
    }
    let (ak, bk) = (a.kind(), b.kind());
    if ak == ValueKind::Int && bk == ValueKind::Int {
        return Ok(a.to_int()? == b.to_int()?);
    }
    if ak.is_numeric() && bk.is_numeric() {
        #[allow(clippy::float_cmp, reason = "expression equality is exact")]
        return Ok(a.to_double()? == b.to_double()?);
    }
    Ok(match (a.compare_as()?, b.compare_as()?) {
        (CompareAs::Projection(x), CompareAs::Projection(y)) => x == y,
        (CompareAs::Identity(x), CompareAs::Identity(y)) => x == y,
        _ => false,
    })
}

/// Ordering as expressions see it (used by sorting).
pub fn compare(a: &Value, b: &Value) -> EvalResult<Ordering> {
    let (ak, bk) = (a.kind(), b.kind());
    if ak == ValueKind::Int && bk == ValueKind::Int {
        return Ok(a.to_int()?.cmp(&b.to_int()?));
    }
    if ak.is_numeric() && bk.is_numeric() {
        return Ok(a.to_double()?.total_cmp(&b.to_double()?));
    }
    match (a.compare_as()?, b.compare_as()?) {
        (CompareAs::Projection(x), CompareAs::Projection(y)) => Ok(x.cmp(&y)),
        (CompareAs::Identity(x), CompareAs::Identity(y)) if x == y => Ok(Ordering::Equal),
        _ => Err(not_comparable(&a.type_name(), &b.type_name())),
    }
}

#[cfg(test)]
mod tests;
