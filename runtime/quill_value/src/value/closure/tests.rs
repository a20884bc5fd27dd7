#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]

use super::*;
use crate::dependency::DependencyKind;
use crate::errors::{EvalError, EvalErrorKind};
use pretty_assertions::assert_eq;
use std::cell::Cell;

const X: Name = Name::from_raw(100);
const Y: Name = Name::from_raw(101);

fn arg(ctx: &Context, name: Name) -> EvalResult<i64> {
    ctx.variable_or_error(name).to_int()
}

fn add(ctx: &mut Context) -> EvalResult<Value> {
    Ok(Value::int(arg(ctx, X)? + arg(ctx, Y)?))
}

fn fail(_ctx: &mut Context) -> EvalResult<Value> {
    Err(EvalError::new("bad argument"))
}

fn make_rule(_ctx: &mut Context) -> EvalResult<Value> {
    Ok(Value::new(ScriptRule::new(adder())))
}

thread_local! {
    static CALLS: Cell<usize> = const { Cell::new(0) };
}

fn counted(ctx: &mut Context) -> EvalResult<Value> {
    CALLS.with(|calls| calls.set(calls.get() + 1));
    add(ctx)
}

fn adder() -> Value {
    Value::new(BuiltinFunction::new("add", vec![X, Y], add))
}

#[test]
fn bindings_are_looked_up_by_name() {
    let closure = ScriptClosure::new(adder())
        .with_binding(X, Value::int(1))
        .with_binding(Y, Value::int(2));
    assert_eq!(closure.get_binding(Y).map(|v| v.to_int()), Some(Ok(2)));
    assert!(closure.get_binding(Name::from_raw(7)).is_none());
}

#[test]
fn add_binding_replaces_same_name() {
    let mut closure = ScriptClosure::new(adder());
    closure.add_binding(X, Value::int(1));
    closure.add_binding(X, Value::int(5));
    assert_eq!(closure.bindings().len(), 1);
    assert_eq!(closure.get_binding(X).map(|v| v.to_int()), Some(Ok(5)));
}

#[test]
fn evaluation_applies_bindings() {
    let closure = Value::new(
        ScriptClosure::new(adder())
            .with_binding(X, Value::int(1))
            .with_binding(Y, Value::int(2)),
    );
    let mut ctx = Context::new();
    assert_eq!(closure.kind(), ValueKind::Function);
    assert_eq!(closure.eval(&mut ctx).and_then(|v| v.to_int()), Ok(3));
    assert_eq!(ctx.depth(), 1);
}

#[test]
fn caller_arguments_override_bindings() {
    let closure = Value::new(
        ScriptClosure::new(adder())
            .with_binding(X, Value::int(1))
            .with_binding(Y, Value::int(2)),
    );
    let mut ctx = Context::new();
    let result = ctx.with_scope(|ctx| {
        ctx.set_variable(X, Value::int(10));
        closure.eval_in_scope(ctx)
    });
    assert_eq!(result.and_then(|v| v.to_int()), Ok(12));
}

#[test]
fn free_parameters_block_simplification() {
    let closure = ScriptClosure::new(adder()).with_binding(X, Value::int(1));
    assert_eq!(closure.free_parameters().collect::<Vec<_>>(), vec![Y]);
    assert!(closure.simplify(&SharedInterner::new()).is_none());
}

#[test]
fn simplified_closure_evaluates_like_the_closure() {
    let closure = ScriptClosure::new(adder())
        .with_binding(X, Value::int(1))
        .with_binding(Y, Value::int(2));
    let simplified = closure.simplify(&SharedInterner::new()).unwrap();
    let closure = Value::new(closure);

    let mut ctx = Context::new();
    assert_eq!(
        simplified.eval(&mut ctx).and_then(|v| v.to_int()),
        closure.eval(&mut ctx).and_then(|v| v.to_int())
    );
}

fn double_amount(ctx: &mut Context) -> EvalResult<Value> {
    let amount = ctx.intern("amount");
    Ok(Value::int(ctx.variable_or_error(amount).to_int()? * 2))
}

#[test]
fn simplification_resolves_names_through_the_host_interner() {
    let interner = SharedInterner::new();
    // Push "amount" past the names every interner starts with.
    interner.intern("first");
    interner.intern("second");
    let amount = interner.intern("amount");

    let fun = Value::new(BuiltinFunction::new("double", vec![amount], double_amount));
    let closure = ScriptClosure::new(fun).with_binding(amount, Value::int(21));
    let simplified = closure.simplify(&interner).unwrap();

    let mut ctx = Context::with_interner(interner.clone());
    assert_eq!(Value::new(closure).eval(&mut ctx).and_then(|v| v.to_int()), Ok(42));
    assert_eq!(simplified.to_int(), Ok(42));
}

#[test]
fn failing_simplification_delays_the_error() {
    let closure = ScriptClosure::new(Value::new(BuiltinFunction::new("fail", vec![], fail)));
    let simplified = closure.simplify(&SharedInterner::new()).unwrap();
    assert_eq!(
        simplified.as_delayed_error().map(|e| e.message.as_str()),
        Some("bad argument")
    );
}

#[test]
fn callable_results_are_not_folded() {
    let closure = ScriptClosure::new(Value::new(BuiltinFunction::new("rule", vec![], make_rule)));
    assert!(closure.simplify(&SharedInterner::new()).is_none());
}

#[test]
fn rule_evaluation_does_not_call() {
    CALLS.with(|calls| calls.set(0));
    let rule = Value::new(ScriptRule::new(Value::new(BuiltinFunction::new(
        "counted",
        vec![X, Y],
        counted,
    ))));

    let mut ctx = Context::new();
    let closure = ctx.with_scope(|ctx| {
        ctx.set_variable(X, Value::int(4));
        ctx.set_variable(Y, Value::int(5));
        rule.eval_in_scope(ctx)
    });
    let closure = closure.unwrap();
    assert_eq!(CALLS.with(Cell::get), 0);
    assert_eq!(closure.type_name(), "closure");

    // The captured variables travel with the closure.
    assert_eq!(closure.eval(&mut ctx).and_then(|v| v.to_int()), Ok(9));
    assert_eq!(CALLS.with(Cell::get), 1);
}

#[test]
fn missing_argument_is_undefined_variable() {
    let mut ctx = Context::new();
    let err = adder().eval(&mut ctx).unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::UndefinedVariable { .. }));
}

#[test]
fn dependencies_see_bindings() {
    fn probe(ctx: &mut Context) -> EvalResult<Value> {
        Ok(ctx.variable_or_error(X))
    }

    struct Probe;
    impl ScriptValue for Probe {
        fn kind(&self) -> ValueKind {
            ValueKind::Function
        }
        fn type_name(&self) -> Cow<'static, str> {
            Cow::Borrowed("probe")
        }
        fn dependencies(&self, ctx: &mut Context, _dep: &Dependency) -> EvalResult<Value> {
            probe(ctx)
        }
    }

    let closure = Value::new(ScriptClosure::new(Value::new(Probe)).with_binding(X, Value::int(8)));
    let mut ctx = Context::new();
    let dep = Dependency::new(DependencyKind::StyleField, 0);
    assert_eq!(closure.dependencies(&mut ctx, &dep).and_then(|v| v.to_int()), Ok(8));
    assert!(ctx.get_variable(X).is_none());
}
