//! Evaluation context: the variables an expression can see.
//!
//! Uses a scope stack (not cloning) for cheap scope management. The
//! bottom scope holds the globals and is never popped.

use rustc_hash::FxHashMap;

use quill_ir::{Name, SharedInterner, StringLookup};

use crate::errors::undefined_variable;
use crate::value::{ScriptClosure, Value};

type Scope = FxHashMap<Name, Value>;

/// Variables visible to an evaluation, plus the interner their names
/// come from.
pub struct Context {
    /// Stack of scopes, innermost last. Never empty.
    scopes: Vec<Scope>,
    interner: SharedInterner,
}

impl Context {
    /// A context with its own interner.
    pub fn new() -> Self {
        Self::with_interner(SharedInterner::new())
    }

    /// A context that resolves names through `interner`, shared with the
    /// host that builds closures and records.
    pub fn with_interner(interner: SharedInterner) -> Self {
        Context {
            scopes: vec![Scope::default()],
            interner,
        }
    }

    pub fn interner(&self) -> &SharedInterner {
        &self.interner
    }

    /// Intern `name` in this context's interner.
    #[inline]
    pub fn intern(&self, name: &str) -> Name {
        self.interner.intern(name)
    }

    /// Number of open scopes, the global scope included.
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    #[inline]
    pub fn push_scope(&mut self) {
        self.scopes.push(Scope::default());
    }

    /// Pop the innermost scope. The global scope stays.
    #[inline]
    pub fn pop_scope(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    /// Run `f` in a fresh scope that is popped afterwards, also when `f`
    /// fails.
    pub fn with_scope<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        self.push_scope();
        let result = f(self);
        self.pop_scope();
        result
    }

    /// Bind `name` in the innermost scope.
    #[inline]
    pub fn set_variable(&mut self, name: Name, value: Value) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name, value);
        }
    }

    /// Innermost binding of `name`.
    pub fn get_variable(&self, name: Name) -> Option<Value> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(&name))
            .cloned()
    }

    /// Binding of `name`, or a delayed undefined-variable error.
    pub fn variable_or_error(&self, name: Name) -> Value {
        self.get_variable(name).unwrap_or_else(|| {
            Value::delayed_error(undefined_variable(self.lookup(name)))
        })
    }

    /// Whether `name` is bound in the innermost scope itself.
    pub fn is_bound_in_current_scope(&self, name: Name) -> bool {
        self.scopes
            .last()
            .is_some_and(|scope| scope.contains_key(&name))
    }

    /// Close `fun` over the innermost scope's bindings.
    ///
    /// Bindings are ordered by name so equal scopes give equal closures.
    pub fn make_closure(&self, fun: Value) -> Value {
        let mut closure = ScriptClosure::new(fun);
        if let Some(scope) = self.scopes.last() {
            let mut bindings: Vec<_> = scope.iter().collect();
            bindings.sort_unstable_by_key(|(name, _)| **name);
            for (name, value) in bindings {
                closure.add_binding(*name, value.clone());
            }
        }
        Value::new(closure)
    }
}

impl StringLookup for Context {
    fn lookup(&self, name: Name) -> &str {
        self.interner.lookup(name)
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}
