//! In-memory collaborators for unit tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::discovery::Coordinator;
use crate::error::{Error, Result};
use crate::transport::{HttpRequest, HttpResponse, Transport};

/// Coordinator returning a settable list of children.
pub(crate) struct FakeCoordinator {
    children: Mutex<std::result::Result<Vec<String>, String>>,
    paths: Mutex<Vec<String>>,
    calls: AtomicUsize,
    delay: Mutex<Option<Duration>>,
}

impl FakeCoordinator {
    pub(crate) fn new<I, S>(children: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            children: Mutex::new(Ok(children.into_iter().map(Into::into).collect())),
            paths: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
            delay: Mutex::new(None),
        }
    }

    pub(crate) fn with_delay(self, delay: Duration) -> Self {
        self.set_delay(delay);
        self
    }

    pub(crate) fn set_delay(&self, delay: Duration) {
        *self.delay.lock() = Some(delay);
    }

    pub(crate) fn set_nodes<I, S>(&self, children: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        *self.children.lock() = Ok(children.into_iter().map(Into::into).collect());
    }

    pub(crate) fn fail(&self, message: &str) {
        *self.children.lock() = Err(message.to_string());
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn paths(&self) -> Vec<String> {
        self.paths.lock().clone()
    }
}

#[async_trait]
impl Coordinator for FakeCoordinator {
    async fn list_children(&self, path: &str) -> Result<Vec<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.paths.lock().push(path.to_string());

        let delay = *self.delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let children = self.children.lock().clone();
        children.map_err(Error::Connection)
    }
}

/// Transport that records requests and replays queued responses.
///
/// When the queue is empty it answers `200 {}`.
#[derive(Default)]
pub(crate) struct FakeTransport {
    requests: Mutex<Vec<HttpRequest>>,
    responses: Mutex<VecDeque<Result<HttpResponse>>>,
}

impl FakeTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn respond(&self, status: u16, body: &str) {
        self.responses.lock().push_back(Ok(HttpResponse {
            status,
            body: body.to_string(),
        }));
    }

    pub(crate) fn fail_with(&self, err: Error) {
        self.responses.lock().push_back(Err(err));
    }

    pub(crate) fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().clone()
    }

    pub(crate) fn last_request(&self) -> HttpRequest {
        self.requests
            .lock()
            .last()
            .cloned()
            .expect("no request was sent")
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        self.requests.lock().push(request);

        self.responses.lock().pop_front().unwrap_or_else(|| {
            Ok(HttpResponse {
                status: 200,
                body: "{}".to_string(),
            })
        })
    }
}
