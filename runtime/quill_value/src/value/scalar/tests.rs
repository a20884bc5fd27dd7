#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]

use super::*;
use crate::errors::EvalErrorKind;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn date(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .and_then(|day| day.and_hms_opt(h, min, s))
        .unwrap()
}

#[test]
fn nil_coerces_to_zero_of_every_kind() {
    let nil = Value::nil();
    assert_eq!(nil.kind(), ValueKind::Nil);
    assert_eq!(nil.to_string_value(), Ok(String::new()));
    assert_eq!(nil.to_int(), Ok(0));
    assert_eq!(nil.to_double(), Ok(0.0));
    assert_eq!(nil.to_bool(), Ok(false));
    assert_eq!(nil.to_color(), Ok(Color::TRANSPARENT));
    assert_eq!(nil.to_image(), Ok(GeneratedImage::Blank));
    assert_eq!(nil.to_code(), "nil");
    assert!(nil.to_date_time().is_err());
}

#[test]
fn int_coercions() {
    let n = Value::int(-7);
    assert_eq!(n.to_string_value(), Ok("-7".to_string()));
    assert_eq!(n.to_double(), Ok(-7.0));
    assert_eq!(n.to_bool(), Ok(true));
    assert_eq!(Value::int(0).to_bool(), Ok(false));

    let err = n.to_color().unwrap_err();
    assert_eq!(
        err.kind,
        EvalErrorKind::TypeMismatch {
            type_name: "integer".into(),
            target: "color".into()
        }
    );
    assert_eq!(err.message, "cannot convert integer to color");
}

#[test]
fn double_coercions() {
    assert_eq!(Value::double(2.5).to_string_value(), Ok("2.5".to_string()));
    assert_eq!(Value::double(2.9).to_int(), Ok(2));
    assert_eq!(Value::double(-2.9).to_int(), Ok(-2));
    assert_eq!(Value::double(0.0).to_bool(), Ok(false));
    assert_eq!(Value::double(0.1).to_bool(), Ok(true));
}

#[test]
fn bool_coercions() {
    assert_eq!(Value::bool(true).to_string_value(), Ok("true".to_string()));
    assert_eq!(Value::bool(true).to_int(), Ok(1));
    assert_eq!(Value::bool(false).to_double(), Ok(0.0));
}

#[test]
fn string_to_number() {
    assert_eq!(Value::string(" 42 ").to_int(), Ok(42));
    assert_eq!(Value::string("4.75").to_int(), Ok(4));
    assert_eq!(Value::string("4.75").to_double(), Ok(4.75));

    let err = Value::string("forty").to_int().unwrap_err();
    assert_eq!(err.message, "cannot convert string \"forty\" to integer");
}

#[test]
fn string_to_bool() {
    for yes in ["yes", "true"] {
        assert_eq!(Value::string(yes).to_bool(), Ok(true));
    }
    for no in ["no", "false", ""] {
        assert_eq!(Value::string(no).to_bool(), Ok(false));
    }
    assert!(Value::string("maybe").to_bool().is_err());
}

#[test]
fn string_to_color_and_date() {
    assert_eq!(
        Value::string("#102030").to_color(),
        Ok(Color::rgb(16, 32, 48))
    );
    assert_eq!(
        Value::string("2009-06-01 12:30:00").to_date_time(),
        Ok(date(2009, 6, 1, 12, 30, 0))
    );
    assert_eq!(
        Value::string("2009-06-01").to_date_time(),
        Ok(date(2009, 6, 1, 0, 0, 0))
    );
    assert!(Value::string("june").to_date_time().is_err());
}

#[test]
fn string_to_image() {
    assert_eq!(Value::string("").to_image(), Ok(GeneratedImage::Blank));
    assert_eq!(
        Value::string("symbols/tap.png").to_image(),
        Ok(GeneratedImage::Packaged("symbols/tap.png".into()))
    );
}

#[test]
fn string_indexes_characters() {
    let s = Value::string("héllo");
    assert_eq!(s.item_count(), Ok(Some(5)));
    assert_eq!(s.get_index(1).to_string_value(), Ok("é".to_string()));
    assert_eq!(s.get_member("4").to_string_value(), Ok("o".to_string()));

    let missing = s.get_index(5);
    assert!(missing.is_error());
    assert!(s.get_index(-1).is_error());
}

#[test]
fn string_code_is_escaped() {
    assert_eq!(Value::string("say \"hi\"\n").to_code(), r#""say \"hi\"\n""#);
}

#[test]
fn date_text_round_trips() {
    let d = Value::date_time(date(2001, 2, 3, 4, 5, 6));
    let text = d.to_string_value().unwrap();
    assert_eq!(text, "2001-02-03 04:05:06");
    assert_eq!(Value::string(text).to_date_time(), d.to_date_time());
}

#[test]
fn image_reports_image_kind() {
    let img = Value::image(GeneratedImage::Packaged("a.png".into()));
    assert_eq!(img.kind(), ValueKind::Image);
    assert_eq!(img.to_image(), Ok(GeneratedImage::Packaged("a.png".into())));
    assert!(img.to_string_value().is_err());
}

fn scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<i64>().prop_map(Value::int),
        any::<f64>().prop_map(Value::double),
        any::<bool>().prop_map(Value::bool),
        ".*".prop_map(Value::string),
        (any::<u8>(), any::<u8>(), any::<u8>()).prop_map(|(r, g, b)| Value::color(Color::rgb(r, g, b))),
    ]
}

proptest! {
    #[test]
    fn coercion_is_deterministic(v in scalar()) {
        prop_assert_eq!(v.to_string_value(), v.to_string_value());
        prop_assert_eq!(v.to_int(), v.to_int());
        prop_assert_eq!(v.to_bool(), v.to_bool());
        prop_assert_eq!(v.to_color(), v.to_color());
        prop_assert_eq!(v.to_code(), v.to_code());
        // NaN is not equal to itself, so compare bit patterns.
        prop_assert_eq!(v.to_double().map(f64::to_bits), v.to_double().map(f64::to_bits));
    }

    #[test]
    fn string_coercion_is_idempotent(v in scalar()) {
        if let Ok(text) = v.to_string_value() {
            prop_assert_eq!(Value::string(text.clone()).to_string_value(), Ok(text));
        }
    }

    #[test]
    fn int_text_parses_back(n in any::<i64>()) {
        let text = Value::int(n).to_string_value().unwrap();
        prop_assert_eq!(Value::string(text).to_int(), Ok(n));
    }
}
