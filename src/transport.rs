//! HTTP transport seam.
//!
//! The client hands fully built requests to a [`Transport`] and gets back the
//! status code and body text. [`ReqwestTransport`] is the default.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Method;
use reqwest::header::CONTENT_TYPE;

use crate::error::{Error, Result};

/// Content type of form-encoded query bodies.
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Content type of JSON update bodies.
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// A request body and its content type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Body {
    /// MIME type sent as `Content-Type`.
    pub content_type: &'static str,

    /// Encoded body.
    pub content: String,
}

/// An outgoing HTTP request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpRequest {
    /// HTTP method.
    pub method: Method,

    /// Absolute URL.
    pub url: String,

    /// Request body, if any.
    pub body: Option<Body>,

    /// Time allowed for the whole exchange.
    pub timeout: Duration,
}

impl HttpRequest {
    /// Creates a `GET` request.
    #[must_use]
    pub fn get(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            method: Method::GET,
            url: url.into(),
            body: None,
            timeout,
        }
    }

    /// Creates a `POST` request with a body.
    #[must_use]
    pub fn post(
        url: impl Into<String>,
        content_type: &'static str,
        content: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            method: Method::POST,
            url: url.into(),
            body: Some(Body {
                content_type,
                content: content.into(),
            }),
            timeout,
        }
    }
}

/// Status and body of an HTTP response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,

    /// Response body text.
    pub body: String,
}

/// Sends HTTP requests.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Performs the request and returns the response, whatever its status.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Timeout`] if the request's timeout elapses and
    /// [`Error::Transport`] for any other failure to obtain a response.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse>;
}

/// [`Transport`] backed by a shared [`reqwest::Client`].
#[derive(Clone, Debug)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Creates a transport with a default client.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`] if the HTTP client cannot be initialised,
    /// for example when no TLS backend is available.
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| Error::Transport(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client })
    }

    /// Wraps an existing client.
    #[must_use]
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let HttpRequest {
            method,
            url,
            body,
            timeout,
        } = request;

        let mut builder = self.client.request(method, &url).timeout(timeout);
        if let Some(body) = body {
            builder = builder
                .header(CONTENT_TYPE, body.content_type)
                .body(body.content);
        }

        let response = builder.send().await.map_err(|e| classify(&url, &e))?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| classify(&url, &e))?;

        Ok(HttpResponse { status, body })
    }
}

fn classify(url: &str, err: &reqwest::Error) -> Error {
    if err.is_timeout() {
        Error::Timeout(url.to_string())
    } else {
        Error::Transport(format!("{url}: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_has_no_body() {
        let request = HttpRequest::get("http://a/solr/c/update?commit=true", Duration::from_secs(30));

        assert_eq!(request.method, Method::GET);
        assert!(request.body.is_none());
        assert_eq!(request.timeout, Duration::from_secs(30));
    }

    #[test]
    fn post_carries_content_type() {
        let request = HttpRequest::post(
            "http://a/solr/c/update",
            JSON_CONTENT_TYPE,
            "[]",
            Duration::from_secs(10),
        );

        assert_eq!(request.method, Method::POST);
        assert_eq!(
            request.body,
            Some(Body {
                content_type: JSON_CONTENT_TYPE,
                content: "[]".to_string(),
            })
        );
    }

    #[test]
    fn classify_non_timeout_as_transport_error() {
        let err = reqwest::Client::builder()
            .build()
            .unwrap()
            .get("not a url")
            .build()
            .unwrap_err();

        let classified = classify("not a url", &err);
        assert!(matches!(classified, Error::Transport(ref msg) if msg.starts_with("not a url: ")));
    }
}
