//! Production HTTP transport over `reqwest`.

use std::time::Duration;

use reqwest::blocking::multipart::{Form, Part};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};

use crate::client::ClientConfig;
use crate::error::{ProcmineError, Result};

use super::{ApiRequest, Method, RawResponse, Transport};

/// Default request timeout when the caller does not override it.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Blocking HTTP transport authenticated with the platform API token.
pub struct HttpTransport {
    client: Client,
    base_url: String,
    token: String,
}

impl HttpTransport {
    /// Build a transport from the client configuration.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .danger_accept_invalid_certs(!config.verify)
            .build()
            .map_err(|e| ProcmineError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url(),
            token: config.token.clone(),
        })
    }

    /// Build headers for one request.
    fn build_headers(&self, request: &ApiRequest) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("API-Key {}", self.token))
                .map_err(|e| ProcmineError::Config(format!("Invalid API token: {}", e)))?,
        );
        for (name, value) in &request.options.headers {
            let name: reqwest::header::HeaderName = name
                .parse()
                .map_err(|e| ProcmineError::Config(format!("Invalid header '{}': {}", name, e)))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| ProcmineError::Config(format!("Invalid header value: {}", e)))?;
            headers.insert(name, value);
        }
        Ok(headers)
    }
}

impl Transport for HttpTransport {
    fn execute(&self, request: ApiRequest) -> Result<RawResponse> {
        let url = format!("{}{}", self.base_url, request.path);

        let mut builder = match request.method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
            Method::Delete => self.client.delete(&url),
        };
        builder = builder.headers(self.build_headers(&request)?);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(timeout) = request.options.timeout {
            builder = builder.timeout(timeout);
        }
        if !request.parts.is_empty() {
            let mut form = Form::new();
            for part in request.parts {
                let mut item = Part::text(part.value);
                if let Some(file_name) = part.file_name {
                    item = item.file_name(file_name);
                }
                if let Some(content_type) = part.content_type {
                    item = item.mime_str(&content_type)?;
                }
                form = form.part(part.name, item);
            }
            builder = builder.multipart(form);
        }

        let response = builder.send()?;
        let status = response.status().as_u16();
        let body = response.bytes()?.to_vec();
        Ok(RawResponse { status, body })
    }

    fn name(&self) -> &str {
        "http"
    }
}
