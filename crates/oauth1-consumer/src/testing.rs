//! Test doubles for consumer code.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

use crate::error::ConsumerError;
use crate::transport::{RequestDescription, Transport, TransportResponse};

/// [`Transport`] that records every request and replays canned responses.
///
/// Clones share the same log, so a test can keep one clone while a session
/// owns another. With no queued response it answers `200` with an empty
/// body.
#[derive(Debug, Clone, Default)]
pub struct RecordingTransport {
    inner: Arc<Mutex<Recorded>>,
}

#[derive(Debug, Default)]
struct Recorded {
    requests: Vec<RequestDescription>,
    responses: VecDeque<TransportResponse>,
}

impl RecordingTransport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response for the next request.
    #[must_use]
    pub fn with_response(self, status: u16, body: &str) -> Self {
        self.push_response(status, body);
        self
    }

    pub fn push_response(&self, status: u16, body: &str) {
        self.lock().responses.push_back(TransportResponse {
            status,
            body: body.to_owned(),
        });
    }

    /// Every request sent so far.
    pub fn requests(&self) -> Vec<RequestDescription> {
        self.lock().requests.clone()
    }

    /// The most recent request.
    pub fn last_request(&self) -> Option<RequestDescription> {
        self.lock().requests.last().cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Recorded> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Transport for RecordingTransport {
    fn execute(&self, request: &RequestDescription) -> Result<TransportResponse, ConsumerError> {
        let mut recorded = self.lock();
        recorded.requests.push(request.clone());
        Ok(recorded.responses.pop_front().unwrap_or(TransportResponse {
            status: 200,
            body: String::new(),
        }))
    }
}
