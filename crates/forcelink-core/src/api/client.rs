//! HTTP transport for the session core.
//!
//! `ApiClient` wraps a shared `reqwest::Client` and is the single place
//! requests leave the process, so it is also where the trace hook fires.

use std::sync::Arc;

use reqwest::{header, Client, Method, RequestBuilder};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::trace::{TraceSink, Tracer};

use super::ApiError;

/// User-Agent sent with every request
const USER_AGENT: &str = concat!("forcelink/", env!("CARGO_PKG_VERSION"));

/// API client for the Force.com REST API.
/// The inner reqwest::Client is reference-counted, so connection pooling is
/// shared with anything cloned from it.
pub struct ApiClient {
    client: Client,
    tracer: Tracer,
}

impl ApiClient {
    /// Create a new API client
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            tracer: Tracer::new(),
        })
    }

    pub fn trace_on(&self, prefix: &str, sink: Arc<dyn TraceSink>) {
        self.tracer.enable(prefix, sink);
    }

    pub fn trace_off(&self) {
        self.tracer.disable();
    }

    pub fn is_tracing(&self) -> bool {
        self.tracer.is_enabled()
    }

    fn auth_headers(token: &str) -> Result<header::HeaderMap, ApiError> {
        let mut headers = header::HeaderMap::new();
        let value = header::HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|_| ApiError::InvalidResponse("access token is not a valid header value".to_string()))?;
        headers.insert(header::AUTHORIZATION, value);
        headers.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));
        Ok(headers)
    }

    /// Send a request and return the body text of a successful response.
    /// Request bodies are never traced. The response body is traced only when
    /// `trace_body` is set; token endpoint responses carry the access token.
    async fn execute(
        &self,
        request: RequestBuilder,
        method: &Method,
        url: &str,
        trace_body: bool,
    ) -> Result<String, ApiError> {
        self.tracer.trace("method", method);
        self.tracer.trace("url", &url);
        debug!(method = %method, url = url, "Sending request");

        let response = request.send().await.map_err(|e| {
            warn!(method = %method, url = url, error = %e, "Request failed to send");
            ApiError::NetworkError(e)
        })?;

        let status = response.status();
        let body = response.text().await?;
        self.tracer.trace("status", &status);
        if trace_body {
            self.tracer.trace("body", &body);
        }
        debug!(status = %status, url = url, bytes = body.len(), "Response received");

        if status.is_success() {
            Ok(body)
        } else {
            Err(ApiError::from_status(status, &body))
        }
    }

    fn parse<T: DeserializeOwned>(url: &str, body: &str) -> Result<T, ApiError> {
        // 204 and friends carry no body; let `()` and `Option<_>` decode from null
        let body = if body.trim().is_empty() { "null" } else { body };
        serde_json::from_str(body).map_err(|e| {
            ApiError::InvalidResponse(format!("Failed to parse JSON response from {}: {}", url, e))
        })
    }

    /// POST a form-encoded body without authentication (OAuth token endpoint).
    /// Neither the form nor the response body is traced.
    pub async fn post_form<T: DeserializeOwned, F: Serialize + ?Sized>(
        &self,
        url: &str,
        form: &F,
    ) -> Result<T, ApiError> {
        let request = self
            .client
            .post(url)
            .header(header::ACCEPT, "application/json")
            .form(form);

        let body = self.execute(request, &Method::POST, url, false).await?;
        Self::parse(url, &body)
    }

    /// Authenticated GET returning decoded JSON
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str, token: &str) -> Result<T, ApiError> {
        self.send_json(Method::GET, url, token, None::<&()>).await
    }

    /// Authenticated request with an optional JSON body
    pub async fn send_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: &str,
        token: &str,
        body: Option<&B>,
    ) -> Result<T, ApiError> {
        let mut request = self
            .client
            .request(method.clone(), url)
            .headers(Self::auth_headers(token)?);
        if let Some(body) = body {
            request = request.json(body);
        }

        let text = self.execute(request, &method, url, true).await?;
        Self::parse(url, &text)
    }
}
