//! Response envelope helpers.
//!
//! Two cross-cutting behaviors wrap every remote call: status validation,
//! which runs before any body parsing, and optional JSON decoding for
//! endpoints that promise a JSON body.

use serde::de::DeserializeOwned;

use crate::error::{ProcmineError, Result};
use crate::transport::RawResponse;

/// Validate the HTTP status, passing the response through on 2xx.
///
/// Any other status becomes [`ProcmineError::Request`] carrying the status
/// code and body for diagnostics. Nothing is retried.
pub fn expect_success(response: RawResponse) -> Result<RawResponse> {
    if response.is_success() {
        Ok(response)
    } else {
        Err(ProcmineError::Request {
            status: response.status,
            body: response.text(),
        })
    }
}

/// Decode the body of an already-validated response as JSON.
///
/// A decode failure here means the remote violated its contract on a 2xx
/// response, which is [`ProcmineError::Protocol`], distinct from a
/// status-level [`ProcmineError::Request`].
pub fn decode_json<T: DeserializeOwned>(response: &RawResponse) -> Result<T> {
    serde_json::from_slice(&response.body).map_err(|e| ProcmineError::Protocol {
        message: format!("expected JSON body: {}", e),
    })
}
