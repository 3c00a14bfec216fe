//! bookcheck-runner: contract scenarios against a live booking service

pub mod api;
pub mod auth;
pub mod client;
pub mod http;
pub mod runner;
pub mod scenario;
pub mod suite;
pub mod validate;

#[cfg(test)]
mod fake;

pub use auth::{SetupError, fetch_token};
pub use client::{BookingApi, Exchange};
pub use http::{ApiRequest, ApiResponse, HttpTransport, Method, Transport, TransportError};
pub use runner::{RunError, Runner};
pub use scenario::{Environment, Scenario, ScenarioKind, Tag};
pub use suite::Suite;
pub use validate::{SchemaError, SchemaValidator};
