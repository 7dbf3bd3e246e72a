//! HTTP transport abstraction.
//!
//! Every call the notes service accepts is a JSON `POST`, so the transport
//! only has to do one thing. [`ReqwestTransport`] is the production
//! implementation; tests substitute a scripted one.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use serde_json::Value;
use tracing::trace;

use crate::error::{NotesError, NotesResult};

/// A boxed future for the object-safe transport trait.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A JSON `POST` request.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    /// Absolute URL.
    pub url: String,
    /// Bearer token for the `Authorization` header, if any.
    pub bearer: Option<String>,
    /// Extra headers.
    pub headers: Vec<(String, String)>,
    /// JSON body.
    pub body: Value,
}

impl HttpRequest {
    /// Creates a request with no auth and no extra headers.
    pub fn post(url: impl Into<String>, body: Value) -> Self {
        Self {
            url: url.into(),
            bearer: None,
            headers: Vec::new(),
            body,
        }
    }

    /// Builder method to attach a bearer token.
    pub fn with_bearer(mut self, token: impl Into<String>) -> Self {
        self.bearer = Some(token.into());
        self
    }

    /// Builder method to add a header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// A raw HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// Status code.
    pub status: u16,
    /// Body text.
    pub body: String,
}

impl HttpResponse {
    /// Creates a response.
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Returns true for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Returns true for 401.
    pub fn is_unauthorized(&self) -> bool {
        self.status == 401
    }

    /// Parses the body as JSON.
    pub fn json(&self) -> NotesResult<Value> {
        serde_json::from_str(&self.body).map_err(|e| {
            NotesError::invalid_response(format!("failed to parse response: {}", e))
                .with_source(e)
        })
    }
}

/// Sends JSON requests somewhere.
///
/// Implementations report transport-level failures (DNS, connect, timeout)
/// as errors and return every HTTP status, including 4xx/5xx, as a
/// [`HttpResponse`].
pub trait HttpTransport: Send + Sync {
    /// Sends one request.
    fn send(&self, request: HttpRequest) -> BoxFuture<'_, NotesResult<HttpResponse>>;
}

/// [`HttpTransport`] backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http_client: reqwest::Client,
}

impl ReqwestTransport {
    /// Creates a transport with the given request timeout.
    pub fn new(timeout: Duration) -> NotesResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                NotesError::internal(format!("failed to create HTTP client: {}", e)).with_source(e)
            })?;

        Ok(Self { http_client })
    }
}

impl HttpTransport for ReqwestTransport {
    fn send(&self, request: HttpRequest) -> BoxFuture<'_, NotesResult<HttpResponse>> {
        Box::pin(async move {
            trace!(url = %request.url, "sending request");

            let body = serde_json::to_vec(&request.body).map_err(|e| {
                NotesError::internal(format!("failed to serialize request: {}", e))
            })?;

            let mut builder = self
                .http_client
                .post(&request.url)
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(body);

            if let Some(ref token) = request.bearer {
                builder = builder.bearer_auth(token);
            }

            for (name, value) in &request.headers {
                builder = builder.header(name.as_str(), value.as_str());
            }

            let response = builder.send().await.map_err(|e| {
                if e.is_timeout() {
                    NotesError::network("request timeout")
                } else if e.is_connect() {
                    NotesError::network(format!("connection failed: {}", e))
                } else {
                    NotesError::network(format!("request failed: {}", e))
                }
            })?;

            let status = response.status().as_u16();
            let body = response.text().await.map_err(|e| {
                NotesError::network(format!("failed to read response: {}", e))
            })?;

            Ok(HttpResponse { status, body })
        })
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted transport for unit tests.

    use std::collections::VecDeque;
    use std::sync::Mutex;

    use super::*;

    /// Returns queued responses in order and records every request.
    #[derive(Debug, Default)]
    pub struct ScriptedTransport {
        responses: Mutex<VecDeque<NotesResult<HttpResponse>>>,
        requests: Mutex<Vec<HttpRequest>>,
    }

    impl ScriptedTransport {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn respond(self, status: u16, body: impl Into<String>) -> Self {
            self.responses
                .lock()
                .unwrap()
                .push_back(Ok(HttpResponse::new(status, body)));
            self
        }

        pub fn respond_json(self, status: u16, body: Value) -> Self {
            self.respond(status, body.to_string())
        }

        pub fn fail(self, error: NotesError) -> Self {
            self.responses.lock().unwrap().push_back(Err(error));
            self
        }

        pub fn requests(&self) -> Vec<HttpRequest> {
            self.requests.lock().unwrap().clone()
        }

        pub fn urls(&self) -> Vec<String> {
            self.requests().into_iter().map(|r| r.url).collect()
        }

        pub fn remaining(&self) -> usize {
            self.responses.lock().unwrap().len()
        }
    }

    impl HttpTransport for ScriptedTransport {
        fn send(&self, request: HttpRequest) -> BoxFuture<'_, NotesResult<HttpResponse>> {
            self.requests.lock().unwrap().push(request);
            let next = self
                .responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(NotesError::internal("scripted transport exhausted")));
            Box::pin(async move { next })
        }
    }
}
