//! In-memory transport for scanner tests.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use addonscan_fetch::{ABSENT_BODY, FetchError, GitHubApi, Transport};
use async_trait::async_trait;

/// A scripted reply.
#[derive(Debug, Clone)]
pub(crate) enum Reply {
    Body(String),
    Timeout,
    QuotaExceeded,
}

/// Serves canned bodies keyed by exact URL. Unknown URLs get GitHub's
/// "not found" body, unknown probes fail.
#[derive(Debug, Default)]
pub(crate) struct FakeTransport {
    bodies: HashMap<String, String>,
    queued: Mutex<HashMap<String, VecDeque<Reply>>>,
    statuses: HashMap<String, u16>,
    fetched: Mutex<Vec<String>>,
    probed: Mutex<Vec<String>>,
}

impl FakeTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_body(mut self, url: impl Into<String>, body: impl Into<String>) -> Self {
        self.bodies.insert(url.into(), body.into());
        self
    }

    pub(crate) fn with_replies(self, url: impl Into<String>, replies: Vec<Reply>) -> Self {
        self.queued
            .lock()
            .unwrap()
            .insert(url.into(), replies.into_iter().collect());
        self
    }

    pub(crate) fn with_status(mut self, url: impl Into<String>, status: u16) -> Self {
        self.statuses.insert(url.into(), status);
        self
    }

    pub(crate) fn fetched(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }

    pub(crate) fn probed(&self) -> Vec<String> {
        self.probed.lock().unwrap().clone()
    }

    pub(crate) fn into_api(self) -> (Arc<Self>, GitHubApi) {
        let fake = Arc::new(self);
        let api = GitHubApi::new(fake.clone());
        (fake, api)
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        self.fetched.lock().unwrap().push(url.to_string());

        let queued = self
            .queued
            .lock()
            .unwrap()
            .get_mut(url)
            .and_then(VecDeque::pop_front);
        match queued {
            Some(Reply::Body(body)) => return Ok(body),
            Some(Reply::Timeout) => return Err(FetchError::Timeout(30)),
            Some(Reply::QuotaExceeded) => {
                return Err(FetchError::QuotaExceeded {
                    resource: addonscan_fetch::ResourceClass::Search,
                });
            }
            None => {}
        }

        Ok(self
            .bodies
            .get(url)
            .cloned()
            .unwrap_or_else(|| ABSENT_BODY.to_string()))
    }

    async fn probe(&self, url: &str) -> Result<u16, FetchError> {
        self.probed.lock().unwrap().push(url.to_string());
        self.statuses
            .get(url)
            .copied()
            .ok_or_else(|| FetchError::InvalidResponse(format!("unreachable: {url}")))
    }
}

/// Raw content URL on the public origin.
pub(crate) fn raw(id: &str, branch: &str, path: &str) -> String {
    format!("https://raw.githubusercontent.com/{id}/{branch}/{path}")
}

/// REST URL on the public origin.
pub(crate) fn api(path: &str) -> String {
    format!("https://api.github.com{path}")
}
