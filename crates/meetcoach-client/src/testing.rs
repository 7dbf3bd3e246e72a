//! In-memory transport for unit tests.
//!
//! Responses are queued per URL and clones share state, so one transport
//! can stand in for the notes, analysis, and email services at once.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use meetcoach_notes::{BoxFuture, HttpRequest, HttpResponse, HttpTransport, NotesError, NotesResult};
use serde_json::Value;

#[derive(Debug, Default)]
struct State {
    routes: HashMap<String, VecDeque<NotesResult<HttpResponse>>>,
    requests: Vec<HttpRequest>,
}

#[derive(Debug, Clone, Default)]
pub struct FakeTransport {
    state: Arc<Mutex<State>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, url: &str, status: u16, body: impl Into<String>) -> &Self {
        self.push(url, Ok(HttpResponse::new(status, body)))
    }

    pub fn respond_json(&self, url: &str, status: u16, body: Value) -> &Self {
        self.respond(url, status, body.to_string())
    }

    pub fn fail(&self, url: &str, error: NotesError) -> &Self {
        self.push(url, Err(error))
    }

    fn push(&self, url: &str, response: NotesResult<HttpResponse>) -> &Self {
        self.state
            .lock()
            .unwrap()
            .routes
            .entry(url.to_string())
            .or_default()
            .push_back(response);
        self
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn requests_to(&self, url: &str) -> Vec<HttpRequest> {
        self.requests().into_iter().filter(|r| r.url == url).collect()
    }
}

impl HttpTransport for FakeTransport {
    fn send(&self, request: HttpRequest) -> BoxFuture<'_, NotesResult<HttpResponse>> {
        let mut state = self.state.lock().unwrap();
        let next = state
            .routes
            .get_mut(&request.url)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| {
                Err(NotesError::internal(format!("no response queued for {}", request.url)))
            });
        state.requests.push(request);
        Box::pin(async move { next })
    }
}
