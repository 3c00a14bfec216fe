//! Booking API client that records every exchange of a scenario

use bookcheck_core::{AuthToken, Failure, RequestSnapshot, StepRecord};

use crate::http::{ApiRequest, ApiResponse, Transport};

/// One request and the response it got.
#[derive(Debug, Clone)]
pub struct Exchange {
    /// Operation label, e.g. "GET /booking/3"
    pub step: String,
    pub request: RequestSnapshot,
    pub response: ApiResponse,
}

impl Exchange {
    /// Parsed body, or `Null` when the body is not JSON.
    ///
    /// Field checks against `Null` report every expected field as absent.
    #[must_use]
    pub fn body(&self) -> serde_json::Value {
        self.response.json().unwrap_or(serde_json::Value::Null)
    }
}

/// Sends requests for one scenario and keeps a [`StepRecord`] per call.
pub struct BookingApi<'t> {
    transport: &'t dyn Transport,
    token: &'t AuthToken,
    steps: Vec<StepRecord>,
}

impl<'t> BookingApi<'t> {
    pub fn new(transport: &'t dyn Transport, token: &'t AuthToken) -> Self {
        Self {
            transport,
            token,
            steps: Vec::new(),
        }
    }

    #[must_use]
    pub fn token(&self) -> &'t AuthToken {
        self.token
    }

    /// Send `request` once.
    ///
    /// # Errors
    ///
    /// A call that produced no response is a transport failure.
    pub fn call(&mut self, request: &ApiRequest) -> Result<Exchange, Failure> {
        let step = request.label();
        let snapshot = request.snapshot(self.transport.base_url());

        match self.transport.send(request) {
            Ok(response) => {
                tracing::debug!(step = %step, status = response.status, "step answered");
                self.steps.push(StepRecord {
                    step: step.clone(),
                    request: snapshot.clone(),
                    status: Some(response.status),
                    elapsed: response.elapsed,
                });
                Ok(Exchange {
                    step,
                    request: snapshot,
                    response,
                })
            }
            Err(e) => {
                self.steps.push(StepRecord {
                    step: step.clone(),
                    request: snapshot.clone(),
                    status: None,
                    elapsed: 0.0,
                });
                Err(Failure::transport(step, e.to_string()).with_request(snapshot))
            }
        }
    }

    /// Send `request` and require `status`.
    ///
    /// # Errors
    ///
    /// Transport failure, or an unexpected status carrying the request.
    pub fn expect(&mut self, request: &ApiRequest, status: u16) -> Result<Exchange, Failure> {
        let exchange = self.call(request)?;
        if exchange.response.status == status {
            Ok(exchange)
        } else {
            Err(
                Failure::unexpected_status(exchange.step, status, exchange.response.status)
                    .with_request(exchange.request),
            )
        }
    }

    #[must_use]
    pub fn steps(&self) -> &[StepRecord] {
        &self.steps
    }

    #[must_use]
    pub fn into_steps(self) -> Vec<StepRecord> {
        self.steps
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api;
    use crate::fake::FakeBooker;
    use bookcheck_core::{BookingId, FailureKind};

    #[test]
    fn records_each_call() {
        let fake = FakeBooker::new();
        let token = AuthToken::new(FakeBooker::TOKEN);
        let mut client = BookingApi::new(&fake, &token);

        client.expect(&api::ping(), 201).unwrap();
        let err = client.expect(&api::read(BookingId(42)), 200).unwrap_err();

        assert_eq!(err.kind, FailureKind::UnexpectedStatus);
        assert_eq!(err.status_code, Some(404));
        assert_eq!(err.request.unwrap().url, "https://booker.test/booking/42");

        let steps = client.into_steps();
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[0].step, "GET /ping");
        assert_eq!(steps[1].status, Some(404));
    }

    #[test]
    fn transport_error_is_recorded_without_status() {
        let fake = FakeBooker::new().unreachable();
        let token = AuthToken::new(FakeBooker::TOKEN);
        let mut client = BookingApi::new(&fake, &token);

        let err = client.call(&api::list()).unwrap_err();
        assert_eq!(err.kind, FailureKind::Transport);
        assert!(err.kind.aborts_scenario());
        assert_eq!(client.steps()[0].status, None);
    }

    #[test]
    fn non_json_body_reads_as_null() {
        let fake = FakeBooker::new();
        let token = AuthToken::new(FakeBooker::TOKEN);
        let mut client = BookingApi::new(&fake, &token);
        let exchange = client.call(&api::read(BookingId(1))).unwrap();
        assert_eq!(exchange.response.body, "Not Found");
        assert!(exchange.body().is_null());
    }
}
