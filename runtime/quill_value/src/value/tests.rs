#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]

use super::*;
use crate::dependency::DependencyKind;
use crate::errors::EvalErrorKind;
use pretty_assertions::assert_eq;

/// A value that overrides nothing but the required methods.
struct Bare;

impl ScriptValue for Bare {
    fn kind(&self) -> ValueKind {
        ValueKind::Object
    }

    fn type_name(&self) -> Cow<'static, str> {
        Cow::Borrowed("bare")
    }
}

#[test]
fn defaults_fail_coercions_with_type_mismatch() {
    let bare = Value::new(Bare);
    let err = bare.to_double().unwrap_err();
    assert_eq!(
        err.kind,
        EvalErrorKind::TypeMismatch {
            type_name: "bare".into(),
            target: "number".into()
        }
    );
    assert!(bare.to_string_value().is_err());
    assert!(bare.to_int().is_err());
    assert!(bare.to_bool().is_err());
    assert!(bare.to_color().is_err());
    assert!(bare.to_date_time().is_err());
    assert!(bare.to_image().is_err());
    assert_eq!(bare.to_code(), "<bare>");
}

#[test]
fn defaults_for_lookup_and_iteration() {
    let bare = Value::new(Bare);
    assert!(bare.get_member("x").is_error());
    assert!(bare.get_index(0).is_error());
    assert_eq!(bare.item_count(), Ok(None));
    assert!(matches!(
        bare.iter().unwrap_err().kind,
        EvalErrorKind::NotIterable { .. }
    ));
    assert!(bare.next().is_err());
    assert_eq!(bare.compare_as(), Ok(CompareAs::Incomparable));
}

#[test]
fn numeric_member_names_route_to_index() {
    let bare = Value::new(Bare);
    let err = bare.get_member("3").force().unwrap_err();
    assert_eq!(
        err.kind,
        EvalErrorKind::NoSuchMember {
            type_name: "bare".into(),
            member: "3".into()
        }
    );
}

#[test]
fn defaults_for_dependencies_and_eval() {
    let bare = Value::new(Bare);
    let dep = Dependency::new(DependencyKind::CardField, 0);
    let mut ctx = Context::new();

    assert_eq!(bare.dependency_this(&dep), Ok(()));
    assert!(bare.dependency_member("x", &dep).is_error());
    assert_eq!(
        bare.dependencies(&mut ctx, &dep).map(|v| v.kind()),
        Ok(ValueKind::Nil)
    );
    assert!(bare.eval(&mut ctx).unwrap().same_as(&bare));
    assert!(bare.parameters().is_empty());
}

#[test]
fn downcast_recovers_concrete_type() {
    let n = Value::int(4);
    assert_eq!(n.downcast_ref::<ScriptInt>(), Some(&ScriptInt(4)));
    assert!(n.downcast_ref::<ScriptString>().is_none());
}

#[test]
fn equality_of_numbers() {
    assert_eq!(equal(&Value::int(3), &Value::int(3)), Ok(true));
    assert_eq!(equal(&Value::int(3), &Value::double(3.0)), Ok(true));
    assert_eq!(equal(&Value::double(0.5), &Value::int(0)), Ok(false));
}

#[test]
fn equality_through_projections() {
    assert_eq!(equal(&Value::string("a"), &Value::string("a")), Ok(true));
    assert_eq!(equal(&Value::string("1"), &Value::int(1)), Ok(true));
    assert_eq!(equal(&Value::nil(), &Value::string("")), Ok(true));
    assert_eq!(equal(&Value::bool(true), &Value::string("true")), Ok(true));
    assert_eq!(equal(&Value::new(Bare), &Value::new(Bare)), Ok(false));
}

#[test]
fn same_handle_is_always_equal() {
    let bare = Value::new(Bare);
    assert_eq!(equal(&bare, &bare.clone()), Ok(true));
}

#[test]
fn equality_with_delayed_error_fails() {
    let err = Value::delayed_error(EvalError::new("nope"));
    assert!(equal(&err, &Value::int(1)).is_err());
    assert_ne!(err, Value::int(1));
}

#[test]
fn delayed_error_is_not_equal_to_itself() {
    let err = Value::delayed_error(EvalError::new("nope"));
    assert_eq!(
        equal(&err, &err.clone()).map_err(|e| e.message),
        Err("nope".to_string())
    );
    assert_ne!(err, err.clone());
}

#[test]
fn ordering() {
    use std::cmp::Ordering;

    assert_eq!(compare(&Value::int(1), &Value::int(2)), Ok(Ordering::Less));
    assert_eq!(compare(&Value::double(2.5), &Value::int(2)), Ok(Ordering::Greater));
    assert_eq!(compare(&Value::string("b"), &Value::string("a")), Ok(Ordering::Greater));

    let err = compare(&Value::new(Bare), &Value::int(1)).unwrap_err();
    assert_eq!(err.message, "cannot compare bare with integer");
}

#[test]
fn debug_and_display_use_code() {
    assert_eq!(format!("{:?}", Value::string("x")), "Value(string: \"x\")");
    assert_eq!(Value::int(12).to_string(), "12");
}

#[test]
fn delay_error_wraps() {
    let v = delay_error(EvalError::new("later"));
    assert_eq!(v.force().unwrap_err().message, "later");
}
