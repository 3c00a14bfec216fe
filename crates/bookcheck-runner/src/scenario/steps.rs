//! Scenario steps: one call each, asserted against the expectation context
//!
//! A step returns `Err` only for failures that end the scenario (unexpected
//! status, transport failure, missing context). Field, schema and error-text
//! mismatches are recorded on the session and the step returns `Ok`.

use bookcheck_core::{
    AuthToken, Booking, BookingId, BookingPatch, BookingRef, ExpectationContext, Failure,
    FieldCheck,
};

use super::session::Session;
use crate::api;
use crate::client::Exchange;
use crate::http::ApiRequest;

fn booking_id(ctx: &ExpectationContext, step: &str) -> Result<BookingId, Failure> {
    ctx.booking_id()
        .ok_or_else(|| Failure::missing_context(step, "booking id"))
}

fn expected_booking(ctx: &ExpectationContext, step: &str) -> Result<Booking, Failure> {
    ctx.expected_booking()
        .ok_or_else(|| Failure::missing_context(step, "expected booking"))
}

/// `POST /booking`, expect 200, capture the id and remember `booking`.
pub fn create(
    s: &mut Session<'_>,
    ctx: &mut ExpectationContext,
    booking: &Booking,
) -> Result<Exchange, Failure> {
    let exchange = s.api.expect(&api::create(booking), 200)?;
    let body = exchange.body();

    let mut check = FieldCheck::new();
    let id = check.integer(&body, "bookingid");
    check.booking(&body, Some("booking"), booking);
    s.settle(&exchange, check);

    if let Some(id) = id {
        ctx.set_booking_id(BookingId(id));
        tracing::debug!(booking_id = id, "booking created");
    }
    ctx.remember_booking(booking);
    Ok(exchange)
}

/// `GET /booking/{id}`, expect 200 and the remembered booking.
pub fn read(s: &mut Session<'_>, ctx: &mut ExpectationContext) -> Result<(), Failure> {
    let id = booking_id(ctx, "GET /booking/{id}")?;
    let expected = expected_booking(ctx, "GET /booking/{id}")?;

    let exchange = s.api.expect(&api::read(id), 200)?;
    let mut check = FieldCheck::new();
    check.booking(&exchange.body(), None, &expected);
    s.settle(&exchange, check);
    Ok(())
}

/// `PUT /booking/{id}` with the session token, expect 200 and the new state.
pub fn update(
    s: &mut Session<'_>,
    ctx: &mut ExpectationContext,
    booking: &Booking,
) -> Result<(), Failure> {
    let id = booking_id(ctx, "PUT /booking/{id}")?;

    let exchange = s.api.expect(&api::update(id, booking, s.api.token()), 200)?;
    let mut check = FieldCheck::new();
    check.booking(&exchange.body(), None, booking);
    s.settle(&exchange, check);

    ctx.remember_booking(booking);
    Ok(())
}

/// `PATCH /booking/{id}`: submitted fields change, every other field keeps
/// its remembered value.
pub fn partial_update(
    s: &mut Session<'_>,
    ctx: &mut ExpectationContext,
    patch: &BookingPatch,
) -> Result<(), Failure> {
    let id = booking_id(ctx, "PATCH /booking/{id}")?;
    let expected = expected_booking(ctx, "PATCH /booking/{id}")?.patched(patch);

    let exchange = s
        .api
        .expect(&api::partial_update(id, patch, s.api.token()), 200)?;
    let mut check = FieldCheck::new();
    check.booking(&exchange.body(), None, &expected);
    s.settle(&exchange, check);

    ctx.remember_booking(&expected);
    Ok(())
}

/// `DELETE /booking/{id}` with the session token, expect 201.
pub fn delete(s: &mut Session<'_>, ctx: &mut ExpectationContext) -> Result<(), Failure> {
    let id = booking_id(ctx, "DELETE /booking/{id}")?;
    s.api.expect(&api::delete(id, s.api.token()), 201)?;
    tracing::debug!(booking_id = %id, "booking deleted");
    Ok(())
}

/// `GET /booking/{id}` after delete, expect 404.
pub fn read_deleted(s: &mut Session<'_>, ctx: &mut ExpectationContext) -> Result<(), Failure> {
    let id = booking_id(ctx, "GET /booking/{id}")?;
    s.api.expect(&api::read(id), 404)?;
    Ok(())
}

/// `GET /booking`, expect 200 and an array of `{bookingid}` objects.
///
/// Returns the entries that parsed; each one that did not is a mismatch.
pub fn list_ids(s: &mut Session<'_>) -> Result<Vec<BookingRef>, Failure> {
    let exchange = s.api.expect(&api::list(), 200)?;
    let body = exchange.body();

    let mut check = FieldCheck::new();
    let mut refs = Vec::new();
    match body.as_array() {
        Some(items) => {
            for (i, item) in items.iter().enumerate() {
                match serde_json::from_value::<BookingRef>(item.clone()) {
                    Ok(entry) => refs.push(entry),
                    Err(_) => {
                        check.integer(&body, &format!("{i}.bookingid"));
                    }
                }
            }
        }
        None => check.expect(&body, "", &serde_json::json!([])),
    }
    s.settle(&exchange, check);
    tracing::debug!(count = refs.len(), "booking ids listed");
    Ok(refs)
}

/// `GET /ping`, expect 201.
pub fn ping(s: &mut Session<'_>) -> Result<(), Failure> {
    s.api.expect(&api::ping(), 201)?;
    Ok(())
}

/// Send a request the service must refuse with `status` and `error` text.
pub fn rejected(
    s: &mut Session<'_>,
    request: &ApiRequest,
    status: u16,
    error: &str,
) -> Result<(), Failure> {
    let exchange = s.api.expect(request, status)?;
    s.expect_error_text(&exchange, error);
    Ok(())
}

/// Token that the service never issued.
#[must_use]
pub fn invalid_token() -> AuthToken {
    AuthToken::new("invalidtoken")
}
