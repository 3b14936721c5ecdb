//! Transport abstraction for remote API calls.
//!
//! Every operation in this crate funnels through the [`Transport`] trait,
//! which maps an abstract [`ApiRequest`] to a raw status-plus-body
//! response. [`HttpTransport`] is the production implementation over
//! `reqwest`; [`MockTransport`] replays canned responses for tests.

use std::time::Duration;

use indexmap::IndexMap;

use crate::error::Result;

mod http;
mod mock;

pub use http::HttpTransport;
pub use mock::MockTransport;

/// HTTP method of an API request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Delete,
}

/// One part of a multipart form body.
#[derive(Debug, Clone, PartialEq)]
pub struct FormPart {
    /// Field name, e.g. `eventCSVFile`.
    pub name: String,
    /// Text content of the part.
    pub value: String,
    /// File name, set only for file-style parts.
    pub file_name: Option<String>,
    /// MIME type, set only for file-style parts.
    pub content_type: Option<String>,
}

impl FormPart {
    /// A plain text field.
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            file_name: None,
            content_type: None,
        }
    }

    /// A CSV file attachment.
    pub fn csv_file(
        name: impl Into<String>,
        file_name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            file_name: Some(file_name.into()),
            content_type: Some("text/csv".to_string()),
        }
    }
}

/// Pass-through options forwarded opaquely to the transport layer.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Per-request timeout override.
    pub timeout: Option<Duration>,
    /// Extra headers, applied in insertion order.
    pub headers: IndexMap<String, String>,
}

impl RequestOptions {
    /// Create empty options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Add an extra header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

/// A single remote API call.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    /// Path relative to the base URL, e.g. `/api/logs`.
    pub path: String,
    /// Query parameters, appended URL-encoded.
    pub query: Vec<(String, String)>,
    /// Multipart form parts; an empty list means no body.
    pub parts: Vec<FormPart>,
    /// Pass-through transport options.
    pub options: RequestOptions,
}

impl ApiRequest {
    fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            parts: Vec::new(),
            options: RequestOptions::default(),
        }
    }

    /// A GET request.
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    /// A POST request.
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    /// A DELETE request.
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    /// Append a query parameter.
    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    /// Append a multipart form part.
    pub fn with_part(mut self, part: FormPart) -> Self {
        self.parts.push(part);
        self
    }

    /// Attach pass-through options.
    pub fn with_options(mut self, options: RequestOptions) -> Self {
        self.options = options;
        self
    }

    /// Look up a form part by field name.
    pub fn part(&self, name: &str) -> Option<&FormPart> {
        self.parts.iter().find(|p| p.name == name)
    }
}

/// Raw response from the transport: status code plus body bytes.
///
/// Status validation and body decoding are layered on top by the
/// envelope helpers in [`crate::response`].
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl RawResponse {
    /// Create a response from a status and a text body.
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Whether the status is in the 2xx success range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// The body as text, lossily decoded.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Trait for executing API requests.
///
/// Implementations must be thread-safe (Send + Sync) so a client can be
/// shared across threads; the trait itself imposes no locking since each
/// call is an independent round trip.
pub trait Transport: Send + Sync {
    /// Execute one request and return the raw response.
    ///
    /// Errors represent transport-level failures (connection refused,
    /// invalid configuration). A non-2xx HTTP status is not an error at
    /// this layer.
    fn execute(&self, request: ApiRequest) -> Result<RawResponse>;

    /// Name of this transport (for diagnostics).
    fn name(&self) -> &str;
}
