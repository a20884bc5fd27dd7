//! Quill IR - identifiers shared across the Quill runtime.
//!
//! Expression variables and closure parameters are identified by interned
//! [`Name`]s rather than strings, so binding lookups in the evaluation
//! context compare a single `u32`.

mod interner;
mod name;

pub use interner::{SharedInterner, StringInterner, StringLookup};
pub use name::Name;
