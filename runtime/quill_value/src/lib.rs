//! Quill Value - the value runtime of the Quill expression language.
//!
//! This crate provides:
//! - The value model: the `ScriptValue` capability trait and the `Value`
//!   handle, with scalars, collections, iterators, records and callables
//! - Delayed errors, which fail only when used
//! - Dependency tokens, which records collect so the host can recompute
//!   only what a change affects
//! - The evaluation `Context` (variable scopes)
//! - The `ToValue` / `FromValue` bridge between host data and values
//!
//! # Architecture
//!
//! Every value answers every capability: the trait gives each one a
//! default (fail, or answer "nothing here") and each value type overrides
//! the ones that mean something for it. Host types join the value model
//! by implementing `Record` for structures, or by living in a `Shared`
//! sequence or map.

mod context;
mod convert;
mod dependency;
mod errors;
mod shared;
mod value;

use std::sync::Once;

pub use context::Context;
pub use convert::{from_value, to_value, Defaultable, FromValue, ToValue};
pub use dependency::{Dependency, DependencyKind, Dependents};
pub use errors::{
    conversion_mismatch, dangling_record, no_such_member, not_comparable, not_iterable,
    record_busy, type_mismatch, undefined_variable, EvalError, EvalErrorKind, EvalResult,
};
pub use shared::{Shared, SharedRef};
pub use value::{
    compare, delay_error, equal, AsAny, BuiltinFn, BuiltinFunction, Color, CompareAs,
    DelayedError, GeneratedImage, GetDefaultMember, GetMember, IterItem, IteratorValue, MapLike,
    MemberVisitor, RangeIterator, Record, ScriptBool, ScriptClosure, ScriptCollection,
    ScriptColor, ScriptConcatCollection, ScriptCustomCollection, ScriptDateTime, ScriptDouble,
    ScriptImage, ScriptInt, ScriptIterator, ScriptMap, ScriptNil, ScriptObject, ScriptRule,
    ScriptString, ScriptValue, Value, ValueKind,
};

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debug output.
///
/// Call this once at startup. Safe to call multiple times.
/// Enable with `QUILL_LOG=quill_value=debug` (or `RUST_LOG`). Does nothing
/// when neither is set or when the host installed a subscriber already.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        let filter =
            EnvFilter::try_from_env("QUILL_LOG").or_else(|_| EnvFilter::try_from_default_env());
        if let Ok(filter) = filter {
            let installed = tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .try_init();
            if installed.is_err() {
                tracing::debug!("keeping the existing tracing subscriber");
            }
        }
    });
}
