//! Loose, JavaScript flavoured operations on JSON values

use std::{borrow::Cow, cmp::Ordering};

use serde_json::{Number, Value};

/// Largest integer an `f64` holds exactly
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// Wraps a number, keeping whole numbers as integers
///
/// JSON has no NaN or infinities, so `1 / 0` or `'a' * 2` evaluate to `null`
/// and render as nothing.
pub(crate) fn number(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
        return Value::from(n as i64);
    }
    Number::from_f64(n).map_or(Value::Null, Value::Number)
}

/// Formats a finite number, whole numbers without a fraction
pub(crate) fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

pub(crate) fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// The text a value renders as, `null` renders as nothing
pub(crate) fn display(value: &Value) -> Cow<'_, str> {
    match value {
        Value::Null => Cow::Borrowed(""),
        Value::Bool(b) => Cow::Borrowed(if *b { "true" } else { "false" }),
        Value::Number(n) => match n.as_i64() {
            Some(i) => Cow::Owned(i.to_string()),
            None => Cow::Owned(format_number(n.as_f64().unwrap_or(f64::NAN))),
        },
        Value::String(s) => Cow::Borrowed(s),
        Value::Array(items) => Cow::Owned(
            items
                .iter()
                .map(|item| display(item))
                .collect::<Vec<_>>()
                .join(","),
        ),
        Value::Object(_) => Cow::Owned(value.to_string()),
    }
}

pub(crate) fn to_number(value: &Value) -> f64 {
    match value {
        Value::Null => 0.0,
        Value::Bool(b) => f64::from(u8::from(*b)),
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::String(s) => match s.trim() {
            "" => 0.0,
            s => s.parse().unwrap_or(f64::NAN),
        },
        Value::Array(_) | Value::Object(_) => f64::NAN,
    }
}

fn is_textual(value: &Value) -> bool {
    matches!(value, Value::String(_) | Value::Array(_) | Value::Object(_))
}

/// `+`: concatenation when either side is text, numeric addition otherwise
pub(crate) fn add(left: &Value, right: &Value) -> Value {
    if is_textual(left) || is_textual(right) {
        let mut text = display(left).into_owned();
        text.push_str(&display(right));
        return Value::String(text);
    }
    number(to_number(left) + to_number(right))
}

/// Strict equality, numbers compare by value
pub(crate) fn equals(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        _ => left == right,
    }
}

/// Ordering for `<`, `<=`, `>`, `>=`, `None` when incomparable
pub(crate) fn compare(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => to_number(left).partial_cmp(&to_number(right)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numbers_stay_whole() {
        assert_eq!(number(5.0), json!(5));
        assert_eq!(number(2.5), json!(2.5));
        assert_eq!(number(f64::NAN), Value::Null);
        assert_eq!(number(f64::INFINITY), Value::Null);
        assert_eq!(number(f64::NEG_INFINITY), Value::Null);
        assert_eq!(format_number(3.0), "3");
        assert_eq!(format_number(0.1 + 0.2), "0.30000000000000004");
    }

    #[test]
    fn truthiness() {
        for falsy in [json!(null), json!(false), json!(0), json!(""), json!(0.0)] {
            assert!(!truthy(&falsy), "{} should be falsy", falsy);
        }
        for value in [json!(true), json!(1), json!("0"), json!([]), json!({})] {
            assert!(truthy(&value), "{} should be truthy", value);
        }
    }

    #[test]
    fn display_values() {
        assert_eq!(display(&json!(null)), "");
        assert_eq!(display(&json!(7)), "7");
        assert_eq!(display(&json!(1.5)), "1.5");
        assert_eq!(display(&json!([1, "a", null])), "1,a,");
        assert_eq!(display(&json!({"a": 1})), r#"{"a":1}"#);
    }

    #[test]
    fn addition() {
        assert_eq!(add(&json!(1), &json!(2)), json!(3));
        assert_eq!(add(&json!("n="), &json!(2)), json!("n=2"));
        assert_eq!(add(&json!(1), &json!("2")), json!("12"));
        assert_eq!(add(&json!(true), &json!(1)), json!(2));
    }

    #[test]
    fn equality_and_order() {
        assert!(equals(&json!(5), &json!(5.0)));
        assert!(!equals(&json!(5), &json!("5")));
        assert_eq!(compare(&json!("a"), &json!("b")), Some(Ordering::Less));
        assert_eq!(compare(&json!(10), &json!("9")), Some(Ordering::Greater));
        assert_eq!(compare(&json!("x"), &json!(1)), None);
    }
}
