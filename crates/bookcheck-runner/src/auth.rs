//! Session token issuance (`POST /auth`)
//!
//! Fetched once per run. There is no retry: any failure here aborts the run.

use bookcheck_core::{AuthToken, Credentials};

use crate::api;
use crate::http::{Transport, TransportError};

/// Exchange `credentials` for a session token.
///
/// # Errors
///
/// Returns [`SetupError`] on a non-200 status, a body without a `token`
/// string, or a transport failure.
pub fn fetch_token(
    transport: &dyn Transport,
    credentials: &Credentials,
) -> Result<AuthToken, SetupError> {
    let response = transport.send(&api::auth(credentials))?;

    if response.status != 200 {
        return Err(SetupError::AuthStatus(response.status));
    }

    let body: serde_json::Value =
        serde_json::from_str(&response.body).unwrap_or(serde_json::Value::Null);

    match body.get("token").and_then(|t| t.as_str()) {
        Some(token) if !token.is_empty() => {
            tracing::info!(user = %credentials.username, "session token issued");
            Ok(AuthToken::new(token))
        }
        _ => {
            let reason = body
                .get("reason")
                .and_then(|r| r.as_str())
                .unwrap_or("no token field in response")
                .to_string();
            Err(SetupError::MissingToken(reason))
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    #[error("auth endpoint returned status {0}, expected 200")]
    AuthStatus(u16),
    #[error("auth response carried no token: {0}")]
    MissingToken(String),
    #[error("auth call failed: {0}")]
    Transport(#[from] TransportError),
}
