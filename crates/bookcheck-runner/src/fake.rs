//! In-memory booking service used by the runner tests
//!
//! Answers with the same status contract as the live service. Fault knobs
//! make it misbehave in one specific way each.

use std::collections::BTreeMap;
use std::sync::Mutex;

use serde_json::{Value, json};

use crate::http::{ApiRequest, ApiResponse, Method, Transport, TransportError};

#[derive(Default)]
struct State {
    next_id: i64,
    bookings: BTreeMap<i64, Value>,
    calls: Vec<String>,
}

pub struct FakeBooker {
    state: Mutex<State>,
    auth_status: Option<u16>,
    ping_status: u16,
    drop_needs_on_read: bool,
    patch_replaces: bool,
    patch_stale: bool,
    keep_deleted: bool,
    string_prices: bool,
    unreachable: bool,
}

impl Default for FakeBooker {
    fn default() -> Self {
        Self {
            state: Mutex::new(State {
                next_id: 1,
                ..State::default()
            }),
            auth_status: None,
            ping_status: 201,
            drop_needs_on_read: false,
            patch_replaces: false,
            patch_stale: false,
            keep_deleted: false,
            string_prices: false,
            unreachable: false,
        }
    }
}

impl FakeBooker {
    pub const TOKEN: &'static str = "abc123fake";

    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `POST /auth` with this status and an empty body.
    pub fn with_auth_status(mut self, status: u16) -> Self {
        self.auth_status = Some(status);
        self
    }

    pub fn with_ping_status(mut self, status: u16) -> Self {
        self.ping_status = status;
        self
    }

    /// Reads omit `additionalneeds`.
    pub fn dropping_needs_on_read(mut self) -> Self {
        self.drop_needs_on_read = true;
        self
    }

    /// PATCH stores the patch body as the whole booking.
    pub fn patch_replacing(mut self) -> Self {
        self.patch_replaces = true;
        self
    }

    /// PATCH answers with the merged booking but stores one whose
    /// unsubmitted fields changed.
    pub fn storing_stale_patch(mut self) -> Self {
        self.patch_stale = true;
        self
    }

    /// DELETE answers 201 but the booking stays readable.
    pub fn keeping_deleted(mut self) -> Self {
        self.keep_deleted = true;
        self
    }

    /// Create responses carry `totalprice` as a string.
    pub fn with_string_prices(mut self) -> Self {
        self.string_prices = true;
        self
    }

    /// Every call fails before a response.
    pub fn unreachable(mut self) -> Self {
        self.unreachable = true;
        self
    }

    /// How many calls carried this exact label, e.g. "POST /auth".
    pub fn calls_to(&self, label: &str) -> usize {
        self.lock().calls.iter().filter(|c| *c == label).count()
    }

    pub fn total_calls(&self) -> usize {
        self.lock().calls.len()
    }

    /// Bookings currently stored.
    pub fn stored(&self) -> usize {
        self.lock().bookings.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn handle(&self, request: &ApiRequest) -> (u16, Value) {
        let segments: Vec<&str> = request.path.trim_matches('/').split('/').collect();
        match (request.method, segments.as_slice()) {
            (Method::Post, ["auth"]) => self.auth(request.body.as_ref()),
            (Method::Get, ["ping"]) => (self.ping_status, Value::String("Created".into())),
            (Method::Post, ["booking"]) => self.create(request.body.as_ref()),
            (Method::Get, ["booking"]) => {
                let ids: Vec<Value> = self
                    .lock()
                    .bookings
                    .keys()
                    .map(|id| json!({"bookingid": id}))
                    .collect();
                (200, Value::Array(ids))
            }
            (method, ["booking", raw]) => match raw.parse::<i64>() {
                Ok(id) => self.by_id(method, id, request),
                Err(_) => not_found(),
            },
            _ => not_found(),
        }
    }

    fn auth(&self, body: Option<&Value>) -> (u16, Value) {
        if let Some(status) = self.auth_status {
            return (status, Value::String(String::new()));
        }
        let user = body.and_then(|b| b.get("username")).and_then(Value::as_str);
        let pass = body.and_then(|b| b.get("password")).and_then(Value::as_str);
        if user == Some("admin") && pass == Some("password123") {
            (200, json!({"token": Self::TOKEN}))
        } else {
            (200, json!({"reason": "Bad credentials"}))
        }
    }

    fn create(&self, body: Option<&Value>) -> (u16, Value) {
        let Some(body) = body else {
            return (400, json!({"error": "Missing required fields"}));
        };
        if let Some(err) = reject(body) {
            return err;
        }
        let mut state = self.lock();
        let id = state.next_id;
        state.next_id += 1;
        state.bookings.insert(id, body.clone());
        drop(state);

        let mut booking = body.clone();
        if self.string_prices {
            if let Some(price) = booking.get("totalprice").cloned() {
                booking["totalprice"] = Value::String(price.to_string());
            }
        }
        (200, json!({"bookingid": id, "booking": booking}))
    }

    fn by_id(&self, method: Method, id: i64, request: &ApiRequest) -> (u16, Value) {
        if method != Method::Get
            && request.token.as_ref().map(|t| t.as_str()) != Some(Self::TOKEN)
        {
            return (403, Value::String("Forbidden".into()));
        }

        let mut state = self.lock();
        let Some(stored) = state.bookings.get(&id).cloned() else {
            return match method {
                Method::Get => not_found(),
                _ => (405, Value::String("Method Not Allowed".into())),
            };
        };

        match method {
            Method::Get => {
                let mut booking = stored;
                if self.drop_needs_on_read {
                    if let Some(obj) = booking.as_object_mut() {
                        obj.remove("additionalneeds");
                    }
                }
                (200, booking)
            }
            Method::Put => {
                let body = request.body.clone().unwrap_or(Value::Null);
                if let Some(err) = reject(&body) {
                    return err;
                }
                state.bookings.insert(id, body.clone());
                (200, body)
            }
            Method::Patch => {
                let patch = request.body.clone().unwrap_or_else(|| json!({}));
                let merged = if self.patch_replaces {
                    patch
                } else {
                    let mut merged = stored;
                    if let (Some(target), Some(fields)) = (merged.as_object_mut(), patch.as_object())
                    {
                        for (k, v) in fields {
                            target.insert(k.clone(), v.clone());
                        }
                    }
                    merged
                };
                let mut kept = merged.clone();
                if self.patch_stale {
                    kept["totalprice"] = json!(1);
                    kept["bookingdates"] = json!({"checkin": "1999-01-01", "checkout": "1999-01-02"});
                }
                state.bookings.insert(id, kept);
                (200, merged)
            }
            Method::Delete => {
                if !self.keep_deleted {
                    state.bookings.remove(&id);
                }
                (201, Value::String("Created".into()))
            }
            Method::Post => not_found(),
        }
    }
}

fn not_found() -> (u16, Value) {
    (404, Value::String("Not Found".into()))
}

fn is_date(value: Option<&Value>) -> bool {
    value.and_then(Value::as_str).is_some_and(|s| {
        let b = s.as_bytes();
        b.len() == 10
            && b[4] == b'-'
            && b[7] == b'-'
            && b.iter()
                .enumerate()
                .all(|(i, c)| i == 4 || i == 7 || c.is_ascii_digit())
    })
}

/// Validation the live service applies to create and full-update bodies.
fn reject(body: &Value) -> Option<(u16, Value)> {
    let name_ok = |key: &str| {
        body.get(key)
            .and_then(Value::as_str)
            .is_some_and(|s| !s.trim().is_empty())
    };
    if !name_ok("firstname") || !name_ok("lastname") {
        return Some((400, json!({"error": "Missing required fields"})));
    }
    let price_ok = body
        .get("totalprice")
        .and_then(Value::as_i64)
        .is_some_and(|p| p >= 0);
    let dates = body.get("bookingdates");
    let dates_ok = is_date(dates.and_then(|d| d.get("checkin")))
        && is_date(dates.and_then(|d| d.get("checkout")));
    if !price_ok || !dates_ok {
        return Some((400, json!({"error": "Invalid input"})));
    }
    None
}

impl Transport for FakeBooker {
    fn send(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
        self.lock().calls.push(request.label());
        if self.unreachable {
            return Err(TransportError::Request("connection refused".into()));
        }
        let (status, body) = self.handle(request);
        let body = match body {
            Value::String(text) => text,
            other => other.to_string(),
        };
        Ok(ApiResponse {
            status,
            body,
            elapsed: 0.0,
        })
    }

    fn base_url(&self) -> &str {
        "https://booker.test"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api;
    use bookcheck_core::{AuthToken, Booking, BookingId};

    fn john() -> Booking {
        Booking::new("John", "Doe", 150, true, "2021-01-01", "2021-01-05", Some("Breakfast"))
    }

    #[test]
    fn create_read_delete_contract() {
        let fake = FakeBooker::default();
        let token = AuthToken::new(FakeBooker::TOKEN);

        let created = fake.send(&api::create(&john())).unwrap();
        assert_eq!(created.status, 200);
        assert_eq!(created.json().unwrap()["bookingid"], 1);

        assert_eq!(fake.send(&api::read(BookingId(1))).unwrap().status, 200);
        assert_eq!(fake.send(&api::delete(BookingId(1), &token)).unwrap().status, 201);
        let gone = fake.send(&api::read(BookingId(1))).unwrap();
        assert_eq!((gone.status, gone.body.as_str()), (404, "Not Found"));
    }

    #[test]
    fn rejects_bad_token_and_bad_input() {
        let fake = FakeBooker::new();
        let bad = AuthToken::new("invalidtoken");
        assert_eq!(fake.send(&api::delete(BookingId(1), &bad)).unwrap().status, 403);

        let mut invalid = john();
        invalid.totalprice = -100;
        assert_eq!(fake.send(&api::create(&invalid)).unwrap().status, 400);
        assert_eq!(fake.stored(), 0);
    }
}
