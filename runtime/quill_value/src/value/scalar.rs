//! Scalar values: nil, numbers, booleans, strings, colors, dates and images.
//!
//! Scalars coerce between each other where the conversion has an obvious
//! meaning, compare through a text projection, and are not collections
//! (except strings, which can be indexed character by character).

use std::borrow::Cow;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use super::{Color, CompareAs, GeneratedImage, ScriptValue, Value, ValueKind};
use crate::errors::{no_such_member, type_mismatch, EvalError, EvalResult};

/// Text form used for dates, both when printing and parsing.
const DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const DATE_FORMAT: &str = "%Y-%m-%d";

// Nil

/// The absent value. Coerces to the zero of every kind.
#[derive(Clone, Copy, Debug, Default)]
pub struct ScriptNil;

impl ScriptValue for ScriptNil {
    fn kind(&self) -> ValueKind {
        ValueKind::Nil
    }

    fn type_name(&self) -> Cow<'static, str> {
        Cow::Borrowed("nil")
    }

    fn to_string_value(&self) -> EvalResult<String> {
        Ok(String::new())
    }

    fn to_double(&self) -> EvalResult<f64> {
        Ok(0.0)
    }

    fn to_int(&self) -> EvalResult<i64> {
        Ok(0)
    }

    fn to_bool(&self) -> EvalResult<bool> {
        Ok(false)
    }

    fn to_color(&self) -> EvalResult<Color> {
        Ok(Color::TRANSPARENT)
    }

    fn to_image(&self) -> EvalResult<GeneratedImage> {
        Ok(GeneratedImage::Blank)
    }

    fn to_code(&self) -> String {
        "nil".to_string()
    }

    fn compare_as(&self) -> EvalResult<CompareAs> {
        Ok(CompareAs::Projection(String::new()))
    }
}

// Numbers

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScriptInt(pub i64);

impl ScriptValue for ScriptInt {
    fn kind(&self) -> ValueKind {
        ValueKind::Int
    }

    fn type_name(&self) -> Cow<'static, str> {
        Cow::Borrowed("integer")
    }

    fn to_string_value(&self) -> EvalResult<String> {
        Ok(self.0.to_string())
    }

    #[expect(
        clippy::cast_precision_loss,
        reason = "expression numbers above 2^53 are not exact"
    )]
    fn to_double(&self) -> EvalResult<f64> {
        Ok(self.0 as f64)
    }

    fn to_int(&self) -> EvalResult<i64> {
        Ok(self.0)
    }

    fn to_bool(&self) -> EvalResult<bool> {
        Ok(self.0 != 0)
    }

    fn to_code(&self) -> String {
        self.0.to_string()
    }

    fn compare_as(&self) -> EvalResult<CompareAs> {
        Ok(CompareAs::Projection(self.0.to_string()))
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScriptDouble(pub f64);

impl ScriptValue for ScriptDouble {
    fn kind(&self) -> ValueKind {
        ValueKind::Double
    }

    fn type_name(&self) -> Cow<'static, str> {
        Cow::Borrowed("double")
    }

    fn to_string_value(&self) -> EvalResult<String> {
        Ok(self.0.to_string())
    }

    fn to_double(&self) -> EvalResult<f64> {
        Ok(self.0)
    }

    /// Truncates toward zero, saturating at the bounds of `i64`.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "truncation is the documented coercion"
    )]
    fn to_int(&self) -> EvalResult<i64> {
        Ok(self.0 as i64)
    }

    fn to_bool(&self) -> EvalResult<bool> {
        Ok(self.0 != 0.0)
    }

    fn to_code(&self) -> String {
        self.0.to_string()
    }

    fn compare_as(&self) -> EvalResult<CompareAs> {
        Ok(CompareAs::Projection(self.0.to_string()))
    }
}

// Booleans

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScriptBool(pub bool);

impl ScriptValue for ScriptBool {
    fn kind(&self) -> ValueKind {
        ValueKind::Bool
    }

    fn type_name(&self) -> Cow<'static, str> {
        Cow::Borrowed("boolean")
    }

    fn to_string_value(&self) -> EvalResult<String> {
        Ok(self.0.to_string())
    }

    fn to_double(&self) -> EvalResult<f64> {
        Ok(if self.0 { 1.0 } else { 0.0 })
    }

    fn to_int(&self) -> EvalResult<i64> {
        Ok(i64::from(self.0))
    }

    fn to_bool(&self) -> EvalResult<bool> {
        Ok(self.0)
    }

    fn to_code(&self) -> String {
        self.0.to_string()
    }

    fn compare_as(&self) -> EvalResult<CompareAs> {
        Ok(CompareAs::Projection(self.0.to_string()))
    }
}

// Strings

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScriptString(pub String);

impl ScriptString {
    fn mismatch(&self, target: &str) -> EvalError {
        type_mismatch(&format!("string {}", quote(&self.0)), target)
    }
}

impl ScriptValue for ScriptString {
    fn kind(&self) -> ValueKind {
        ValueKind::String
    }

    fn type_name(&self) -> Cow<'static, str> {
        Cow::Borrowed("string")
    }

    fn to_string_value(&self) -> EvalResult<String> {
        Ok(self.0.clone())
    }

    fn to_double(&self) -> EvalResult<f64> {
        self.0.trim().parse().map_err(|_| self.mismatch("number"))
    }

    fn to_int(&self) -> EvalResult<i64> {
        let text = self.0.trim();
        if let Ok(n) = text.parse::<i64>() {
            return Ok(n);
        }
        ScriptDouble(text.parse().map_err(|_| self.mismatch("integer"))?).to_int()
    }

    fn to_bool(&self) -> EvalResult<bool> {
        match self.0.as_str() {
            "yes" | "true" => Ok(true),
            "no" | "false" | "" => Ok(false),
            _ => Err(self.mismatch("boolean")),
        }
    }

    fn to_color(&self) -> EvalResult<Color> {
        Color::parse(&self.0).ok_or_else(|| self.mismatch("color"))
    }

    fn to_date_time(&self) -> EvalResult<NaiveDateTime> {
        let text = self.0.trim();
        NaiveDateTime::parse_from_str(text, DATE_TIME_FORMAT)
            .or_else(|_| {
                NaiveDate::parse_from_str(text, DATE_FORMAT).map(|d| d.and_time(NaiveTime::MIN))
            })
            .map_err(|_| self.mismatch("date"))
    }

    fn to_image(&self) -> EvalResult<GeneratedImage> {
        Ok(GeneratedImage::from_name(&self.0))
    }

    fn to_code(&self) -> String {
        quote(&self.0)
    }

    fn compare_as(&self) -> EvalResult<CompareAs> {
        Ok(CompareAs::Projection(self.0.clone()))
    }

    fn get_index(&self, index: i64) -> Value {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.0.chars().nth(i))
            .map_or_else(
                || Value::delayed_error(no_such_member("string", &index.to_string())),
                Value::string,
            )
    }

    fn item_count(&self) -> EvalResult<Option<usize>> {
        Ok(Some(self.0.chars().count()))
    }
}

/// Quote and escape `text` as a string literal.
fn quote(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

// Colors, dates, images

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScriptColor(pub Color);

impl ScriptValue for ScriptColor {
    fn kind(&self) -> ValueKind {
        ValueKind::Color
    }

    fn type_name(&self) -> Cow<'static, str> {
        Cow::Borrowed("color")
    }

    fn to_string_value(&self) -> EvalResult<String> {
        Ok(self.0.to_string())
    }

    fn to_color(&self) -> EvalResult<Color> {
        Ok(self.0)
    }

    fn to_code(&self) -> String {
        self.0.to_string()
    }

    fn compare_as(&self) -> EvalResult<CompareAs> {
        Ok(CompareAs::Projection(self.0.to_string()))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScriptDateTime(pub NaiveDateTime);

impl ScriptDateTime {
    fn text(&self) -> String {
        self.0.format(DATE_TIME_FORMAT).to_string()
    }
}

impl ScriptValue for ScriptDateTime {
    fn kind(&self) -> ValueKind {
        ValueKind::DateTime
    }

    fn type_name(&self) -> Cow<'static, str> {
        Cow::Borrowed("date")
    }

    fn to_string_value(&self) -> EvalResult<String> {
        Ok(self.text())
    }

    fn to_date_time(&self) -> EvalResult<NaiveDateTime> {
        Ok(self.0)
    }

    fn to_code(&self) -> String {
        quote(&self.text())
    }

    // The fixed-width format sorts chronologically as text.
    fn compare_as(&self) -> EvalResult<CompareAs> {
        Ok(CompareAs::Projection(self.text()))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScriptImage(pub GeneratedImage);

impl ScriptValue for ScriptImage {
    fn kind(&self) -> ValueKind {
        ValueKind::Image
    }

    fn type_name(&self) -> Cow<'static, str> {
        Cow::Borrowed("image")
    }

    fn to_image(&self) -> EvalResult<GeneratedImage> {
        Ok(self.0.clone())
    }

    fn to_code(&self) -> String {
        self.0.to_code()
    }

    fn compare_as(&self) -> EvalResult<CompareAs> {
        Ok(CompareAs::Projection(self.0.to_code()))
    }
}

#[cfg(test)]
mod tests;
