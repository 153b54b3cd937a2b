//! Response error normalization.
//!
//! Every call goes through [`normalize_response`], which plays the part of a
//! response interceptor: successful responses pass through untouched, failures
//! that carry a server `detail` message become [`Error::Api`], and everything
//! else is returned as the original [`reqwest::Error`].

use ragchat_core::{Error, Result};
use reqwest::Response;
use serde_json::Value;
use tracing::debug;

/// Normalize the outcome of sending a request.
pub async fn normalize_response(outcome: reqwest::Result<Response>) -> Result<Response> {
    let response = outcome?;

    let status_error = response.error_for_status_ref().err();
    let Some(status_error) = status_error else {
        return Ok(response);
    };

    let body = match response.bytes().await {
        Ok(body) => body,
        Err(e) => {
            debug!(
                subsystem = "client",
                status = ?status_error.status(),
                error = %e,
                "Failed to read error body, keeping transport error"
            );
            Default::default()
        }
    };
    match extract_detail(&body) {
        Some(message) => Err(Error::Api(message)),
        None => Err(Error::Transport(status_error)),
    }
}

/// Pull the structured `detail` message out of an error body.
///
/// Strings are used verbatim. A validation error list contributes its `msg`
/// entries joined with `"; "`. Other values are rendered as compact JSON.
/// Missing, null, `false`, zero, and empty-string details yield `None`.
pub fn extract_detail(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;

    match value.get("detail")? {
        Value::Null | Value::Bool(false) => None,
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Array(items) => {
            let messages: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(Value::as_str))
                .collect();
            if messages.is_empty() {
                Some(Value::Array(items.clone()).to_string())
            } else {
                Some(messages.join("; "))
            }
        }
        other => Some(other.to_string()),
    }
}
