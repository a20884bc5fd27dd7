use super::*;
use pretty_assertions::assert_eq;

#[test]
fn factory_message_matches_kind_display() {
    let err = type_mismatch("collection of card", "string");
    assert_eq!(err.message, "cannot convert collection of card to string");
    assert_eq!(err.message, err.kind.to_string());
    assert_eq!(err.to_string(), err.message);
}

#[test]
fn no_such_member_names_type() {
    let err = no_such_member("collection of field", "rarity");
    assert_eq!(
        err.kind,
        EvalErrorKind::NoSuchMember {
            type_name: "collection of field".into(),
            member: "rarity".into(),
        }
    );
    assert_eq!(err.message, "collection of field has no member 'rarity'");
}

#[test]
fn conversion_mismatch_names_both_types() {
    let err = conversion_mismatch("string", "card");
    assert_eq!(err.message, "conversion error: expected card, got string");
}

#[test]
fn custom_error_keeps_message() {
    let err = EvalError::new("regex failed to compile");
    assert_eq!(
        err.kind,
        EvalErrorKind::Custom {
            message: "regex failed to compile".into()
        }
    );
    assert_eq!(err.to_string(), "regex failed to compile");
}

#[test]
fn host_storage_errors() {
    assert_eq!(
        dangling_record("collection of int").message,
        "collection of int is no longer available"
    );
    assert_eq!(
        record_busy("collection of int").message,
        "collection of int is being modified"
    );
}

#[test]
fn remaining_factories() {
    assert_eq!(not_iterable("int").message, "int is not iterable");
    assert_eq!(
        not_comparable("card", "int").message,
        "cannot compare card with int"
    );
    assert_eq!(undefined_variable("input").message, "undefined variable: input");
}
