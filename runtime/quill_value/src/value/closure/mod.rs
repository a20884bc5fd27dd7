//! Callables: closures, rules and builtin functions.
//!
//! A closure pairs a callable with default arguments. Evaluating it binds
//! each default that the caller did not supply, then evaluates the
//! callable in that same scope.
//!
//! A rule is a closure waiting to happen: evaluating it does not call
//! anything, it captures the current arguments into a closure that can be
//! applied later.

use std::borrow::Cow;

use smallvec::SmallVec;

use quill_ir::{Name, SharedInterner};
use quill_stack::ensure_sufficient_stack;

use super::{ScriptValue, Value, ValueKind};
use crate::context::Context;
use crate::dependency::Dependency;
use crate::errors::EvalResult;

/// A callable with bound default arguments.
#[derive(Clone, Debug)]
pub struct ScriptClosure {
    fun: Value,
    bindings: SmallVec<[(Name, Value); 4]>,
}

impl ScriptClosure {
    pub fn new(fun: Value) -> Self {
        ScriptClosure {
            fun,
            bindings: SmallVec::new(),
        }
    }

    /// The wrapped callable.
    pub fn fun(&self) -> &Value {
        &self.fun
    }

    /// Bind `name` to `value`, replacing an earlier binding of `name`.
    pub fn add_binding(&mut self, name: Name, value: Value) {
        match self.bindings.iter_mut().find(|(bound, _)| *bound == name) {
            Some(slot) => slot.1 = value,
            None => self.bindings.push((name, value)),
        }
    }

    #[must_use]
    pub fn with_binding(mut self, name: Name, value: Value) -> Self {
        self.add_binding(name, value);
        self
    }

    pub fn get_binding(&self, name: Name) -> Option<Value> {
        self.bindings
            .iter()
            .find(|(bound, _)| *bound == name)
            .map(|(_, value)| value.clone())
    }

    pub fn bindings(&self) -> &[(Name, Value)] {
        &self.bindings
    }

    /// Parameters of the callable that have no binding.
    pub fn free_parameters(&self) -> impl Iterator<Item = Name> + '_ {
        self.fun
            .parameters()
            .iter()
            .copied()
            .filter(|name| self.get_binding(*name).is_none())
    }

    /// Reduce the closure to a plain value when nothing is left to bind.
    ///
    /// `interner` must be the one the bindings' names came from. Returns
    /// `None` while parameters are free, or when the callable refuses to be
    /// folded.
    pub fn simplify(&self, interner: &SharedInterner) -> Option<Value> {
        if self.free_parameters().next().is_some() {
            return None;
        }
        self.fun.simplify_closure(self, interner)
    }

    /// Evaluate once in a fresh context over `interner` and keep the
    /// result.
    ///
    /// A result that is itself callable would behave differently from the
    /// closure when evaluated, so it is not folded. Failures fold into a
    /// delayed error.
    pub fn fold(&self, interner: &SharedInterner) -> Option<Value> {
        let mut ctx = Context::with_interner(interner.clone());
        match self.call(&mut ctx) {
            Ok(value) if value.kind() == ValueKind::Function => None,
            Ok(value) => Some(value),
            Err(err) => Some(Value::delayed_error(err)),
        }
    }

    /// Defaults only fill parameters the caller left unbound.
    fn apply_bindings(&self, ctx: &mut Context) {
        for (name, value) in &self.bindings {
            if !ctx.is_bound_in_current_scope(*name) {
                ctx.set_variable(*name, value.clone());
            }
        }
    }

    fn call(&self, ctx: &mut Context) -> EvalResult<Value> {
        ctx.with_scope(|ctx| {
            self.apply_bindings(ctx);
            self.fun.eval_in_scope(ctx)
        })
    }
}

impl ScriptValue for ScriptClosure {
    fn kind(&self) -> ValueKind {
        ValueKind::Function
    }

    fn type_name(&self) -> Cow<'static, str> {
        Cow::Borrowed("closure")
    }

    fn to_code(&self) -> String {
        let args: Vec<String> = self
            .bindings
            .iter()
            .map(|(name, value)| format!("{name:?}: {}", value.to_code()))
            .collect();
        format!("{}({})", self.fun.to_code(), args.join(", "))
    }

    fn parameters(&self) -> &[Name] {
        self.fun.parameters()
    }

    fn do_eval(&self, _this: &Value, ctx: &mut Context, open_scope: bool) -> EvalResult<Value> {
        ensure_sufficient_stack(|| {
            if open_scope {
                self.call(ctx)
            } else {
                self.apply_bindings(ctx);
                self.fun.eval_in_scope(ctx)
            }
        })
    }

    fn dependencies(&self, ctx: &mut Context, dep: &Dependency) -> EvalResult<Value> {
        ctx.with_scope(|ctx| {
            self.apply_bindings(ctx);
            self.fun.dependencies(ctx, dep)
        })
    }
}

/// A callable that is closed over the current scope instead of called.
#[derive(Clone, Debug)]
pub struct ScriptRule {
    fun: Value,
}

impl ScriptRule {
    pub fn new(fun: Value) -> Self {
        ScriptRule { fun }
    }
}

impl ScriptValue for ScriptRule {
    fn kind(&self) -> ValueKind {
        ValueKind::Function
    }

    fn type_name(&self) -> Cow<'static, str> {
        Cow::Borrowed("rule")
    }

    fn to_code(&self) -> String {
        format!("rule({})", self.fun.to_code())
    }

    fn do_eval(&self, _this: &Value, ctx: &mut Context, _open_scope: bool) -> EvalResult<Value> {
        Ok(ctx.make_closure(self.fun.clone()))
    }
}

/// Signature of native callables. Arguments are read from the context.
pub type BuiltinFn = fn(&mut Context) -> EvalResult<Value>;

/// A native function exposed to expressions.
#[derive(Clone)]
pub struct BuiltinFunction {
    name: &'static str,
    params: Vec<Name>,
    func: BuiltinFn,
}

impl BuiltinFunction {
    pub fn new(name: &'static str, params: Vec<Name>, func: BuiltinFn) -> Self {
        BuiltinFunction { name, params, func }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl ScriptValue for BuiltinFunction {
    fn kind(&self) -> ValueKind {
        ValueKind::Function
    }

    fn type_name(&self) -> Cow<'static, str> {
        Cow::Borrowed("function")
    }

    fn to_code(&self) -> String {
        self.name.to_string()
    }

    fn parameters(&self) -> &[Name] {
        &self.params
    }

    fn do_eval(&self, _this: &Value, ctx: &mut Context, open_scope: bool) -> EvalResult<Value> {
        if open_scope {
            ctx.with_scope(self.func)
        } else {
            (self.func)(ctx)
        }
    }
}

#[cfg(test)]
mod tests;
