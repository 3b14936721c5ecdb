//! Mock transport for testing.

use std::collections::VecDeque;
use std::sync::Mutex;

use serde_json::Value;

use crate::error::{ProcmineError, Result};

use super::{ApiRequest, RawResponse, Transport};

/// Mock transport that replays queued responses and records every request.
///
/// Responses are consumed in FIFO order, one per executed request.
/// Executing with an empty queue is an error so tests fail loudly instead
/// of silently observing a fabricated response.
#[derive(Default)]
pub struct MockTransport {
    responses: Mutex<VecDeque<RawResponse>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl MockTransport {
    /// Create an empty mock transport.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a raw response.
    pub fn push_response(&self, status: u16, body: impl Into<Vec<u8>>) {
        self.responses
            .lock()
            .unwrap()
            .push_back(RawResponse::new(status, body));
    }

    /// Queue a JSON response.
    pub fn push_json(&self, status: u16, body: &Value) {
        self.push_response(status, body.to_string());
    }

    /// All requests executed so far, in order.
    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// The number of requests executed so far.
    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

impl Transport for MockTransport {
    fn execute(&self, request: ApiRequest) -> Result<RawResponse> {
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| ProcmineError::Config("mock transport: no queued response".to_string()))
    }

    fn name(&self) -> &str {
        "mock"
    }
}
