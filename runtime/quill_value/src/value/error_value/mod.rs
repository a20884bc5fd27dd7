//! Delayed errors.
//!
//! A failed lookup does not fail the expression immediately: it produces a
//! `DelayedError` value instead. The error is raised only when something
//! uses the value (coerces it, iterates it, evaluates it), which lets an
//! `or else` construct in the evaluator replace the value before that
//! happens.
//!
//! Lookups on a delayed error produce the same error again, so
//! `missing.a.b.c` still reports the failure of `missing`.

use std::borrow::Cow;

use chrono::NaiveDateTime;

use super::{Color, CompareAs, GeneratedImage, IterItem, ScriptValue, Value, ValueKind};
use crate::context::Context;
use crate::dependency::Dependency;
use crate::errors::{EvalError, EvalResult};

/// A value that raises the stored error when used.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DelayedError {
    error: EvalError,
}

impl DelayedError {
    #[inline]
    pub fn new(error: EvalError) -> Self {
        DelayedError { error }
    }

    #[inline]
    pub fn error(&self) -> &EvalError {
        &self.error
    }

    fn raise<T>(&self) -> EvalResult<T> {
        Err(self.error.clone())
    }

    fn propagate(&self) -> Value {
        Value::new(self.clone())
    }
}

impl ScriptValue for DelayedError {
    fn kind(&self) -> ValueKind {
        ValueKind::Error
    }

    fn type_name(&self) -> Cow<'static, str> {
        Cow::Borrowed("error")
    }

    fn to_string_value(&self) -> EvalResult<String> {
        self.raise()
    }

    fn to_double(&self) -> EvalResult<f64> {
        self.raise()
    }

    fn to_int(&self) -> EvalResult<i64> {
        self.raise()
    }

    fn to_bool(&self) -> EvalResult<bool> {
        self.raise()
    }

    fn to_color(&self) -> EvalResult<Color> {
        self.raise()
    }

    fn to_date_time(&self) -> EvalResult<NaiveDateTime> {
        self.raise()
    }

    fn to_image(&self) -> EvalResult<GeneratedImage> {
        self.raise()
    }

    fn to_code(&self) -> String {
        format!("<error: {}>", self.error)
    }

    fn compare_as(&self) -> EvalResult<CompareAs> {
        self.raise()
    }

    fn get_member(&self, _name: &str) -> Value {
        self.propagate()
    }

    fn get_index(&self, _index: i64) -> Value {
        self.propagate()
    }

    fn item_count(&self) -> EvalResult<Option<usize>> {
        self.raise()
    }

    fn make_iterator(&self, _this: &Value) -> EvalResult<Value> {
        self.raise()
    }

    fn next(&self) -> EvalResult<Option<IterItem>> {
        self.raise()
    }

    fn dependency_member(&self, _name: &str, _dep: &Dependency) -> Value {
        self.propagate()
    }

    fn dependency_this(&self, _dep: &Dependency) -> EvalResult<()> {
        self.raise()
    }

    fn dependencies(&self, _ctx: &mut Context, _dep: &Dependency) -> EvalResult<Value> {
        self.raise()
    }

    fn do_eval(&self, _this: &Value, _ctx: &mut Context, _open_scope: bool) -> EvalResult<Value> {
        self.raise()
    }
}
