//! Error types for value operations.
//!
//! Every failure the runtime reports is an [`EvalError`]. The structured
//! [`EvalErrorKind`] carries the data needed to match on the failure
//! programmatically; `message` is the rendered text shown to expression
//! authors.
//!
//! Factory functions (e.g. [`type_mismatch`]) are the public way to build
//! errors. They are `#[cold]` since every call site is a failure path.

use std::fmt;

use thiserror::Error;

use crate::value::Value;

/// Result of a value operation.
pub type EvalResult<T = Value> = Result<T, EvalError>;

/// Typed error category.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum EvalErrorKind {
    /// A coercion asked for a kind the value cannot provide.
    #[error("cannot convert {type_name} to {target}")]
    TypeMismatch { type_name: String, target: String },

    /// Named or indexed lookup failed.
    #[error("{type_name} has no member '{member}'")]
    NoSuchMember { type_name: String, member: String },

    #[error("{type_name} is not iterable")]
    NotIterable { type_name: String },

    #[error("cannot compare {left} with {right}")]
    NotComparable { left: String, right: String },

    /// `from_value` found a different dynamic variant than requested.
    #[error("conversion error: expected {expected}, got {got}")]
    ConversionMismatch { got: String, expected: String },

    /// The caller-owned storage behind a collection wrapper was dropped.
    #[error("{type_name} is no longer available")]
    DanglingRecord { type_name: String },

    /// The caller-owned storage is mutably borrowed by the host.
    #[error("{type_name} is being modified")]
    RecordBusy { type_name: String },

    #[error("undefined variable: {name}")]
    UndefinedVariable { name: String },

    /// Catch-all for errors raised by host functions.
    #[error("{message}")]
    Custom { message: String },
}

/// Evaluation error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EvalError {
    /// Structured error category.
    pub kind: EvalErrorKind,
    /// Human-readable error message; equals `kind.to_string()` for
    /// factory-created errors.
    pub message: String,
}

impl EvalError {
    /// Create an error with just a message.
    ///
    /// Uses the `Custom` kind. Prefer a factory function when a structured
    /// kind fits.
    pub fn new(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            kind: EvalErrorKind::Custom {
                message: message.clone(),
            },
            message,
        }
    }

    fn from_kind(kind: EvalErrorKind) -> Self {
        let message = kind.to_string();
        Self { kind, message }
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for EvalError {}

// Coercion errors

/// A coercion to `target` is not supported by a value of `type_name`.
#[cold]
pub fn type_mismatch(type_name: &str, target: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::TypeMismatch {
        type_name: type_name.to_string(),
        target: target.to_string(),
    })
}

/// Downcast in `from_value` found the wrong native type.
#[cold]
pub fn conversion_mismatch(got: &str, expected: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::ConversionMismatch {
        got: got.to_string(),
        expected: expected.to_string(),
    })
}

// Lookup errors

/// Named or indexed member does not exist.
#[cold]
pub fn no_such_member(type_name: &str, member: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NoSuchMember {
        type_name: type_name.to_string(),
        member: member.to_string(),
    })
}

#[cold]
pub fn undefined_variable(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UndefinedVariable {
        name: name.to_string(),
    })
}

// Collection errors

#[cold]
pub fn not_iterable(type_name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NotIterable {
        type_name: type_name.to_string(),
    })
}

#[cold]
pub fn not_comparable(left: &str, right: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NotComparable {
        left: left.to_string(),
        right: right.to_string(),
    })
}

// Host storage errors

#[cold]
pub fn dangling_record(type_name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::DanglingRecord {
        type_name: type_name.to_string(),
    })
}

#[cold]
pub fn record_busy(type_name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::RecordBusy {
        type_name: type_name.to_string(),
    })
}

#[cfg(test)]
mod tests;
