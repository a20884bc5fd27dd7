//! Dependency tokens for selective recomputation.
//!
//! When an expression reads `card.rarity`, the evaluator runs the lookup
//! through `dependency_member` with a [`Dependency`] naming the computation
//! being analysed (for example "the text of field 3 on every card"). The
//! record behind `card` stores that token with its `rarity` field, and when
//! `rarity` later changes the host recomputes only the computations whose
//! tokens were stored there.
//!
//! The runtime never interprets a token; it only carries it from the
//! evaluator to the record hooks.

use std::cell::RefCell;

/// What kind of downstream computation a [`Dependency`] refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DependencyKind {
    /// A card field's computed value, recomputed per card.
    CardField,
    /// A card field that depends on another card field of the same card.
    CardCopy,
    /// A field of the set (shared by all cards).
    SetField,
    /// A style property of a field.
    StyleField,
    /// An extra card field supplied by the stylesheet.
    ExtraCardField,
    /// A value computed for export templates.
    CardExport,
}

/// Opaque token describing a tracked downstream computation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Dependency {
    kind: DependencyKind,
    /// Index of the computation within its kind (e.g. the field index).
    index: usize,
}

impl Dependency {
    #[inline]
    pub const fn new(kind: DependencyKind, index: usize) -> Self {
        Dependency { kind, index }
    }

    #[inline]
    pub const fn kind(self) -> DependencyKind {
        self.kind
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.index
    }

    /// The same computation, reached through another card.
    ///
    /// A card field that reads a different card's field must be recomputed
    /// when that card changes, not only its own card.
    #[must_use]
    pub const fn as_card_copy(self) -> Self {
        match self.kind {
            DependencyKind::CardField => Dependency::new(DependencyKind::CardCopy, self.index),
            _ => self,
        }
    }
}

/// Dependency tokens registered on one stored field.
///
/// Records embed one `Dependents` per field that expressions can read, and
/// add to it from `Record::mark_dependency_member`. Interior mutability is
/// required because marking happens through shared references to records
/// that are otherwise read-only during evaluation.
#[derive(Debug, Default)]
pub struct Dependents {
    tokens: RefCell<Vec<Dependency>>,
}

impl Dependents {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a token; registering the same token twice is a no-op.
    pub fn add(&self, dep: Dependency) {
        let mut tokens = self.tokens.borrow_mut();
        if !tokens.contains(&dep) {
            tokens.push(dep);
        }
    }

    pub fn contains(&self, dep: Dependency) -> bool {
        self.tokens.borrow().contains(&dep)
    }

    /// Snapshot of the registered tokens, in registration order.
    pub fn tokens(&self) -> Vec<Dependency> {
        self.tokens.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.tokens.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.borrow().is_empty()
    }

    /// Remove and return every registered token.
    pub fn take(&self) -> Vec<Dependency> {
        std::mem::take(&mut *self.tokens.borrow_mut())
    }
}
