#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]

use super::*;
use crate::errors::EvalErrorKind;
use pretty_assertions::assert_eq;

#[test]
fn read_sees_live_contents() {
    let storage = Shared::new(vec![1, 2, 3]);
    let handle = storage.handle();

    assert_eq!(handle.read("list", Vec::len), Ok(3));
    storage.borrow_mut().push(4);
    assert_eq!(handle.read("list", Vec::len), Ok(4));
}

#[test]
fn handles_share_identity() {
    let storage = Shared::new(String::from("a"));
    let other = Shared::new(String::from("a"));

    assert_eq!(storage.handle().address(), storage.clone().handle().address());
    assert_ne!(storage.handle().address(), other.handle().address());
}

#[test]
fn dropped_storage_is_reported() {
    let handle = {
        let storage = Shared::new(vec![1]);
        storage.handle()
    };

    assert!(!handle.is_alive());
    let err = handle.read("collection of int", Vec::len).unwrap_err();
    assert_eq!(
        err.kind,
        EvalErrorKind::DanglingRecord {
            type_name: "collection of int".into()
        }
    );
}

#[test]
fn mutably_borrowed_storage_is_reported() {
    let storage = Shared::new(vec![1]);
    let handle = storage.handle();

    let guard = storage.borrow_mut();
    let err = handle.read("collection of int", Vec::len).unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::RecordBusy { .. }));
    drop(guard);

    assert_eq!(handle.read("collection of int", Vec::len), Ok(1));
}
