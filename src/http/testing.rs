//! In-memory transport for handler tests

use super::Transport;
use crate::error::{Error, Result};
use crate::types::{JsonValue, Method};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

#[derive(Debug, Clone)]
pub(crate) struct RecordedRequest {
    pub method: Method,
    pub endpoint: String,
    pub body: JsonValue,
}

#[derive(Debug, Clone)]
enum Reply {
    Json(JsonValue),
    Status(u16, String),
}

/// Scripted transport. Replies are queued per `(method, endpoint)`; the last
/// queued reply keeps answering once the others are consumed.
#[derive(Default)]
pub(crate) struct FakeTransport {
    routes: Mutex<HashMap<(Method, String), VecDeque<Reply>>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(self, method: Method, endpoint: &str, reply: JsonValue) -> Self {
        self.push(method, endpoint, Reply::Json(reply));
        self
    }

    pub fn fail(self, method: Method, endpoint: &str, status: u16, body: &str) -> Self {
        self.push(method, endpoint, Reply::Status(status, body.to_string()));
        self
    }

    fn push(&self, method: Method, endpoint: &str, reply: Reply) {
        self.routes
            .lock()
            .unwrap()
            .entry((method, endpoint.to_string()))
            .or_default()
            .push_back(reply);
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Bodies sent to one endpoint, in order
    pub fn bodies(&self, method: Method, endpoint: &str) -> Vec<JsonValue> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == method && r.endpoint == endpoint)
            .map(|r| r.body)
            .collect()
    }

    pub fn count(&self, method: Method, endpoint: &str) -> usize {
        self.bodies(method, endpoint).len()
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn api_request(
        &self,
        method: Method,
        endpoint: &str,
        body: JsonValue,
        _query: &[(String, String)],
    ) -> Result<JsonValue> {
        self.requests.lock().unwrap().push(RecordedRequest {
            method,
            endpoint: endpoint.to_string(),
            body,
        });

        let reply = {
            let mut routes = self.routes.lock().unwrap();
            let queue = routes.get_mut(&(method, endpoint.to_string()));
            match queue {
                Some(queue) if queue.len() > 1 => queue.pop_front(),
                Some(queue) => queue.front().cloned(),
                None => None,
            }
        };

        match reply {
            Some(Reply::Json(value)) => Ok(value),
            Some(Reply::Status(status, body)) => Err(Error::http_status(status, body)),
            None => Err(Error::http_status(
                404,
                format!("no scripted reply for {method:?} {endpoint}"),
            )),
        }
    }
}
