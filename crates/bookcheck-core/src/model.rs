//! Wire types exchanged with the booking service
//!
//! Field names match the service's JSON exactly (`firstname`, `totalprice`, ...).

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Check-in and check-out dates as `YYYY-MM-DD` strings.
///
/// Kept as text: negative scenarios deliberately send malformed dates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct BookingDates {
    pub checkin: String,
    pub checkout: String,
}

impl BookingDates {
    pub fn new(checkin: impl Into<String>, checkout: impl Into<String>) -> Self {
        Self {
            checkin: checkin.into(),
            checkout: checkout.into(),
        }
    }
}

/// A reservation record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct Booking {
    pub firstname: String,
    pub lastname: String,
    pub totalprice: i64,
    pub depositpaid: bool,
    pub bookingdates: BookingDates,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additionalneeds: Option<String>,
}

impl Booking {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        firstname: impl Into<String>,
        lastname: impl Into<String>,
        totalprice: i64,
        depositpaid: bool,
        checkin: impl Into<String>,
        checkout: impl Into<String>,
        additionalneeds: Option<&str>,
    ) -> Self {
        Self {
            firstname: firstname.into(),
            lastname: lastname.into(),
            totalprice,
            depositpaid,
            bookingdates: BookingDates::new(checkin, checkout),
            additionalneeds: additionalneeds.map(str::to_string),
        }
    }

    /// Apply a partial update the way the service should: submitted fields
    /// replace, everything else is kept.
    #[must_use]
    pub fn patched(&self, patch: &BookingPatch) -> Self {
        Self {
            firstname: patch
                .firstname
                .clone()
                .unwrap_or_else(|| self.firstname.clone()),
            lastname: patch
                .lastname
                .clone()
                .unwrap_or_else(|| self.lastname.clone()),
            totalprice: patch.totalprice.unwrap_or(self.totalprice),
            depositpaid: patch.depositpaid.unwrap_or(self.depositpaid),
            bookingdates: patch
                .bookingdates
                .clone()
                .unwrap_or_else(|| self.bookingdates.clone()),
            additionalneeds: patch
                .additionalneeds
                .clone()
                .or_else(|| self.additionalneeds.clone()),
        }
    }
}

/// Identifier assigned by the service on create.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(transparent)]
pub struct BookingId(pub i64);

impl std::fmt::Display for BookingId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One element of the `GET /booking` list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct BookingRef {
    pub bookingid: BookingId,
}

/// Body of `PATCH /booking/{id}`. Unset fields are left off the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct BookingPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub firstname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lastname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub totalprice: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depositpaid: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bookingdates: Option<BookingDates>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additionalneeds: Option<String>,
}

/// Failure body returned by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    /// Extract the error text from a response body.
    ///
    /// Accepts `{"error": "..."}` or a plain-text body. Returns `None` for
    /// an empty body or JSON without an `error` string.
    #[must_use]
    pub fn from_body(body: &str) -> Option<Self> {
        let trimmed = body.trim();
        if trimmed.is_empty() {
            return None;
        }
        match serde_json::from_str::<serde_json::Value>(trimmed) {
            Ok(serde_json::Value::Object(obj)) => obj
                .get("error")
                .and_then(|v| v.as_str())
                .map(|s| Self {
                    error: s.to_string(),
                }),
            Ok(serde_json::Value::String(s)) => Some(Self { error: s }),
            Ok(_) => None,
            Err(_) => Some(Self {
                error: trimmed.to_string(),
            }),
        }
    }
}

/// Login credentials for `POST /auth`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Default for Credentials {
    fn default() -> Self {
        Self {
            username: "admin".to_string(),
            password: "password123".to_string(),
        }
    }
}

/// Session token issued by `POST /auth`. Opaque and immutable.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken(String);

impl AuthToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `Cookie` header value carrying this token.
    #[must_use]
    pub fn cookie(&self) -> String {
        format!("token={}", self.0)
    }
}

impl std::fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AuthToken(***)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

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
    fn booking_serializes_with_wire_names() {
        let v = serde_json::to_value(john()).unwrap();
        assert_eq!(
            v,
            serde_json::json!({
                "firstname": "John",
                "lastname": "Doe",
                "totalprice": 123,
                "depositpaid": true,
                "bookingdates": {"checkin": "2021-01-01", "checkout": "2021-01-10"},
                "additionalneeds": "Breakfast"
            })
        );
    }

    #[test]
    fn booking_without_needs_omits_field() {
        let mut b = john();
        b.additionalneeds = None;
        let v = serde_json::to_value(&b).unwrap();
        assert!(v.get("additionalneeds").is_none());
    }

    #[test]
    fn patch_skips_unset_fields() {
        let patch = BookingPatch {
            firstname: Some("Jim".into()),
            lastname: Some("Beam".into()),
            ..Default::default()
        };
        let v = serde_json::to_value(&patch).unwrap();
        assert_eq!(v, serde_json::json!({"firstname": "Jim", "lastname": "Beam"}));
    }

    #[test]
    fn patched_keeps_unsubmitted_fields() {
        let patch = BookingPatch {
            firstname: Some("Jim".into()),
            totalprice: Some(200),
            ..Default::default()
        };
        let b = john().patched(&patch);
        assert_eq!(b.firstname, "Jim");
        assert_eq!(b.totalprice, 200);
        assert_eq!(b.lastname, "Doe");
        assert_eq!(b.bookingdates, BookingDates::new("2021-01-01", "2021-01-10"));
        assert_eq!(b.additionalneeds.as_deref(), Some("Breakfast"));
    }

    #[test]
    fn error_response_from_json() {
        let e = ErrorResponse::from_body(r#"{"error": "Invalid input"}"#).unwrap();
        assert_eq!(e.error, "Invalid input");
    }

    #[test]
    fn error_response_from_plain_text() {
        let e = ErrorResponse::from_body("Forbidden\n").unwrap();
        assert_eq!(e.error, "Forbidden");
    }

    #[test]
    fn error_response_absent() {
        assert!(ErrorResponse::from_body("").is_none());
        assert!(ErrorResponse::from_body(r#"{"reason": "x"}"#).is_none());
        assert!(ErrorResponse::from_body("[1, 2]").is_none());
    }

    #[test]
    fn token_debug_is_masked() {
        let t = AuthToken::new("abc123");
        assert_eq!(format!("{t:?}"), "AuthToken(***)");
        assert_eq!(t.cookie(), "token=abc123");
    }
}
