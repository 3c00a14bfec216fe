//! Field-by-field response assertions
//!
//! No I/O. Every comparison that fails is collected so one step reports
//! all of its mismatches together.

use serde_json::Value;

use crate::model::Booking;
use crate::verdict::Mismatch;

/// Wire paths of every booking leaf field, relative to the booking object.
pub const BOOKING_FIELDS: [&str; 7] = [
    "firstname",
    "lastname",
    "totalprice",
    "depositpaid",
    "bookingdates.checkin",
    "bookingdates.checkout",
    "additionalneeds",
];

/// Look up a dotted path (`booking.bookingdates.checkin`) in a JSON value.
/// Numeric segments index into arrays (`0.bookingid`).
#[must_use]
pub fn lookup<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    if path.is_empty() {
        return Some(root);
    }
    path.split('.').try_fold(root, |node, key| match node {
        Value::Array(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => node.get(key),
    })
}

fn join(prefix: Option<&str>, field: &str) -> String {
    match prefix {
        Some(p) if !p.is_empty() => format!("{p}.{field}"),
        _ => field.to_string(),
    }
}

/// Accumulates mismatches for one step.
#[derive(Debug, Default)]
pub struct FieldCheck {
    mismatches: Vec<Mismatch>,
}

impl FieldCheck {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Compare one field. An expected `null` also accepts an absent field.
    pub fn expect(&mut self, observed_root: &Value, path: &str, expected: &Value) {
        let observed = lookup(observed_root, path);
        let matches = match observed {
            Some(obs) => obs == expected,
            None => expected.is_null(),
        };
        if !matches {
            self.mismatches.push(Mismatch {
                field: path.to_string(),
                expected: expected.clone(),
                observed: observed.cloned(),
            });
        }
    }

    /// Compare every field of `expected` against the booking at `prefix`
    /// (`Some("booking")` for a create response, `None` for a read).
    pub fn booking(&mut self, observed_root: &Value, prefix: Option<&str>, expected: &Booking) {
        let expected_value = serde_json::to_value(expected).unwrap_or(Value::Null);
        for field in BOOKING_FIELDS {
            let want = lookup(&expected_value, field)
                .cloned()
                .unwrap_or(Value::Null);
            self.expect(observed_root, &join(prefix, field), &want);
        }
    }

    /// Require an integer at `path` (e.g. the `bookingid` of a create response).
    pub fn integer(&mut self, observed_root: &Value, path: &str) -> Option<i64> {
        let observed = lookup(observed_root, path);
        match observed.and_then(Value::as_i64) {
            Some(n) => Some(n),
            None => {
                self.mismatches.push(Mismatch {
                    field: path.to_string(),
                    expected: Value::String("<integer>".to_string()),
                    observed: observed.cloned(),
                });
                None
            }
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mismatches.is_empty()
    }

    #[must_use]
    pub fn into_mismatches(self) -> Vec<Mismatch> {
        self.mismatches
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn john() -> Booking {
        Booking::new(
            "John",
            "Doe",
            123,
            true,
            "2021-01-01",
            "2021-01-10",
            Some("Breakfast"),
        )
    }

    #[test]
    fn lookup_nested_paths() {
        let v = json!({"booking": {"bookingdates": {"checkin": "2021-01-01"}}});
        assert_eq!(
            lookup(&v, "booking.bookingdates.checkin"),
            Some(&json!("2021-01-01"))
        );
        assert_eq!(lookup(&v, "booking.missing"), None);
        assert_eq!(lookup(&v, ""), Some(&v));

        let list = json!([{"bookingid": 4}, {"bookingid": "7"}]);
        assert_eq!(lookup(&list, "1.bookingid"), Some(&json!("7")));
        assert_eq!(lookup(&list, "2.bookingid"), None);
        assert_eq!(lookup(&list, "first"), None);
    }

    #[test]
    fn identical_booking_has_no_mismatch() {
        let observed = serde_json::to_value(john()).unwrap();
        let mut check = FieldCheck::new();
        check.booking(&observed, None, &john());
        assert!(check.is_empty());
    }

    #[test]
    fn prefixed_booking_in_create_response() {
        let observed = json!({"bookingid": 9, "booking": serde_json::to_value(john()).unwrap()});
        let mut check = FieldCheck::new();
        check.booking(&observed, Some("booking"), &john());
        assert!(check.is_empty());
        assert_eq!(check.integer(&observed, "bookingid"), Some(9));
    }

    #[test]
    fn every_mismatch_is_reported() {
        let observed = json!({
            "firstname": "Jane",
            "lastname": "Doe",
            "totalprice": 150,
            "depositpaid": true,
            "bookingdates": {"checkin": "2021-01-01", "checkout": "2021-01-10"}
        });
        let mut check = FieldCheck::new();
        check.booking(&observed, None, &john());
        let fields: Vec<String> = check
            .into_mismatches()
            .into_iter()
            .map(|m| m.field)
            .collect();
        assert_eq!(fields, vec!["firstname", "totalprice", "additionalneeds"]);
    }

    #[test]
    fn absent_optional_field_matches_none() {
        let mut expected = john();
        expected.additionalneeds = None;
        let observed = serde_json::to_value(&expected).unwrap();
        let mut check = FieldCheck::new();
        check.booking(&observed, None, &expected);
        assert!(check.is_empty());
    }

    #[test]
    fn missing_integer_is_reported() {
        let mut check = FieldCheck::new();
        assert_eq!(check.integer(&json!({"bookingid": "x"}), "bookingid"), None);
        assert_eq!(check.into_mismatches()[0].observed, Some(json!("x")));
    }
}
