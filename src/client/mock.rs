#![allow(clippy::unwrap_used)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use super::{
    DaemonConfig, FmcdClient, HttpRequest, HttpResponse, RetryPolicy, Sleeper, Transport,
    TransportError,
};

pub type Reply = Result<HttpResponse, TransportError>;

pub fn json_reply(status: u16, body: Value) -> Reply {
    Ok(HttpResponse {
        status,
        body: body.to_string(),
    })
}

pub fn text_reply(status: u16, body: &str) -> Reply {
    Ok(HttpResponse {
        status,
        body: body.to_string(),
    })
}

/// Answers attempts in order from a fixed script
#[derive(Default)]
pub struct ScriptedTransport {
    replies: Mutex<VecDeque<Reply>>,
    pub requests: Mutex<Vec<(HttpRequest, Duration)>>,
}

impl ScriptedTransport {
    pub fn new(replies: Vec<Reply>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn attempts(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn timeouts(&self) -> Vec<Duration> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|(_, timeout)| *timeout)
            .collect()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: &HttpRequest, timeout: Duration) -> Reply {
        self.requests
            .lock()
            .unwrap()
            .push((request.clone(), timeout));
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Network("script exhausted".to_string())))
    }
}

/// Answers by endpoint path and the `federationId` of the request body
#[derive(Default)]
pub struct RoutedTransport {
    routes: Mutex<HashMap<(String, Option<String>), Reply>>,
    pub calls: Mutex<Vec<(String, Option<String>)>>,
}

impl RoutedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn route(&self, path: &str, federation_id: Option<&str>, reply: Reply) {
        self.routes.lock().unwrap().insert(
            (path.to_string(), federation_id.map(str::to_string)),
            reply,
        );
    }

    pub fn calls_to(&self, path: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(p, _)| p == path)
            .count()
    }
}

#[async_trait]
impl Transport for RoutedTransport {
    async fn send(&self, request: &HttpRequest, _timeout: Duration) -> Reply {
        let path = url::Url::parse(&request.url).unwrap().path().to_string();
        let federation_id = request
            .body
            .as_ref()
            .and_then(|body| body.get("federationId"))
            .and_then(Value::as_str)
            .map(str::to_string);

        self.calls
            .lock()
            .unwrap()
            .push((path.clone(), federation_id.clone()));

        let routes = self.routes.lock().unwrap();
        routes
            .get(&(path.clone(), federation_id))
            .or_else(|| routes.get(&(path, None)))
            .cloned()
            .unwrap_or_else(|| text_reply(404, "no route"))
    }
}

/// Records requested delays instead of sleeping
#[derive(Default)]
pub struct RecordingSleeper {
    pub delays: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn delays(&self) -> Vec<Duration> {
        self.delays.lock().unwrap().clone()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.delays.lock().unwrap().push(duration);
    }
}

pub fn test_auth() -> DaemonConfig {
    DaemonConfig::new("http://fmcd.test:7070/", "secret")
}

pub fn client_with(transport: Arc<dyn Transport>) -> FmcdClient {
    FmcdClient::with_transport(transport, RecordingSleeper::new(), RetryPolicy::default())
}
