//! Shared blocking HTTP plumbing for providers.

use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::error::{PandoroError, Result};

const USER_AGENT: &str = concat!("pandoro/", env!("CARGO_PKG_VERSION"));

pub(crate) fn agent() -> ureq::Agent {
    ureq::AgentBuilder::new()
        .timeout_connect(Duration::from_secs(10))
        .timeout_read(Duration::from_secs(30))
        .timeout_write(Duration::from_secs(30))
        .user_agent(USER_AGENT)
        .build()
}

/// Converts a ureq failure into a provider error, keeping the HTTP status
/// and response body when the server answered.
pub(crate) fn request_error(context: &str, err: ureq::Error) -> PandoroError {
    match err {
        ureq::Error::Status(status, response) => {
            let body = response
                .into_string()
                .unwrap_or_else(|e| format!("<unreadable body: {}>", e));
            tracing::warn!(context, status, "Provider returned error status");
            PandoroError::ProviderStatus {
                context: context.to_string(),
                status,
                body: body.trim().to_string(),
            }
        }
        ureq::Error::Transport(transport) => {
            tracing::warn!(context, error = %transport, "Provider request failed");
            PandoroError::ProviderTransport {
                context: context.to_string(),
                details: transport.to_string(),
            }
        }
    }
}

pub(crate) fn read_json<T: DeserializeOwned>(context: &str, response: ureq::Response) -> Result<T> {
    let body = response
        .into_string()
        .map_err(|e| PandoroError::ProviderResponse {
            context: context.to_string(),
            details: e.to_string(),
        })?;
    parse_json(context, &body)
}

pub(crate) fn parse_json<T: DeserializeOwned>(context: &str, body: &str) -> Result<T> {
    serde_json::from_str(body).map_err(|e| PandoroError::ProviderResponse {
        context: context.to_string(),
        details: e.to_string(),
    })
}
