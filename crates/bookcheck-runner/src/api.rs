//! Request builders for the booking service endpoints

use bookcheck_core::{AuthToken, Booking, BookingId, BookingPatch, Credentials};

use crate::http::{ApiRequest, Method};

fn to_json<T: serde::Serialize>(value: &T) -> serde_json::Value {
    serde_json::to_value(value).unwrap_or(serde_json::Value::Null)
}

/// `POST /auth`
#[must_use]
pub fn auth(credentials: &Credentials) -> ApiRequest {
    ApiRequest::new(Method::Post, "/auth").with_body(to_json(credentials))
}

/// `POST /booking`
#[must_use]
pub fn create(booking: &Booking) -> ApiRequest {
    ApiRequest::new(Method::Post, "/booking").with_body(to_json(booking))
}

/// `GET /booking/{id}`
#[must_use]
pub fn read(id: BookingId) -> ApiRequest {
    ApiRequest::new(Method::Get, format!("/booking/{id}"))
}

/// `PUT /booking/{id}`
#[must_use]
pub fn update(id: BookingId, booking: &Booking, token: &AuthToken) -> ApiRequest {
    ApiRequest::new(Method::Put, format!("/booking/{id}"))
        .with_body(to_json(booking))
        .with_token(token.clone())
}

/// `PATCH /booking/{id}`
#[must_use]
pub fn partial_update(id: BookingId, patch: &BookingPatch, token: &AuthToken) -> ApiRequest {
    ApiRequest::new(Method::Patch, format!("/booking/{id}"))
        .with_body(to_json(patch))
        .with_token(token.clone())
}

/// `DELETE /booking/{id}`
#[must_use]
pub fn delete(id: BookingId, token: &AuthToken) -> ApiRequest {
    ApiRequest::new(Method::Delete, format!("/booking/{id}")).with_token(token.clone())
}

/// `GET /booking`
#[must_use]
pub fn list() -> ApiRequest {
    ApiRequest::new(Method::Get, "/booking")
}

/// `GET /ping`
#[must_use]
pub fn ping() -> ApiRequest {
    ApiRequest::new(Method::Get, "/ping")
}
