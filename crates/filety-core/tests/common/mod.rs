//! Scripted transport shared by the integration tests

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use filety_core::api::{ApiRequest, HttpResponse, RequestBody, Transport};
use filety_core::{ApiClient, Error, Result};
use tokio::time::Instant;

type Responder = Box<dyn Fn(&ApiRequest, Option<&str>) -> HttpResponse + Send + Sync>;

enum Route {
    /// Answers in order; an exhausted queue answers 500
    Queue(VecDeque<Result<HttpResponse>>),
    /// Same answer every time
    Repeat(HttpResponse),
    /// Answer computed from the request
    Dynamic(Responder),
}

/// One request seen by the transport
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub path: String,
    pub bearer: Option<String>,
    pub request: ApiRequest,
    pub at: Instant,
}

#[derive(Default)]
pub struct ScriptedTransport {
    routes: Mutex<HashMap<String, Route>>,
    delays: Mutex<HashMap<String, Duration>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn queue(&self, path: &str, responses: Vec<Result<HttpResponse>>) {
        self.routes
            .lock()
            .unwrap()
            .insert(path.to_string(), Route::Queue(responses.into()));
    }

    pub fn queue_json(&self, path: &str, bodies: &[(u16, &str)]) {
        let responses = bodies
            .iter()
            .map(|(status, body)| Ok(HttpResponse::new(*status, *body)))
            .collect();
        self.queue(path, responses);
    }

    pub fn repeat(&self, path: &str, status: u16, body: &str) {
        self.routes
            .lock()
            .unwrap()
            .insert(path.to_string(), Route::Repeat(HttpResponse::new(status, body)));
    }

    pub fn dynamic<F>(&self, path: &str, responder: F)
    where
        F: Fn(&ApiRequest, Option<&str>) -> HttpResponse + Send + Sync + 'static,
    {
        self.routes
            .lock()
            .unwrap()
            .insert(path.to_string(), Route::Dynamic(Box::new(responder)));
    }

    /// Delay every answer on `path`
    pub fn delay(&self, path: &str, delay: Duration) {
        self.delays.lock().unwrap().insert(path.to_string(), delay);
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, path: &str) -> Vec<RecordedCall> {
        self.calls()
            .into_iter()
            .filter(|c| c.path == path)
            .collect()
    }

    pub fn count(&self, path: &str) -> usize {
        self.calls_to(path).len()
    }

    fn respond(&self, request: &ApiRequest, bearer: Option<&str>) -> Result<HttpResponse> {
        let mut routes = self.routes.lock().unwrap();
        match routes.get_mut(&request.path) {
            Some(Route::Queue(queue)) => queue
                .pop_front()
                .unwrap_or_else(|| Ok(HttpResponse::new(500, r#"{"detail":"unscripted"}"#))),
            Some(Route::Repeat(response)) => Ok(response.clone()),
            Some(Route::Dynamic(responder)) => Ok(responder(request, bearer)),
            None => Ok(HttpResponse::new(404, r#"{"detail":"Not Found"}"#)),
        }
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: &ApiRequest, bearer: Option<&str>) -> Result<HttpResponse> {
        self.calls.lock().unwrap().push(RecordedCall {
            path: request.path.clone(),
            bearer: bearer.map(str::to_string),
            request: request.clone(),
            at: Instant::now(),
        });

        let delay = self.delays.lock().unwrap().get(&request.path).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        self.respond(request, bearer)
    }
}

pub fn client_with(transport: &Arc<ScriptedTransport>) -> ApiClient {
    ApiClient::with_transport(transport.clone())
}

pub fn network_down() -> Result<HttpResponse> {
    Err(Error::transport("Connection failed"))
}

pub fn user_json(email: &str, plan: i64, used: i64) -> String {
    serde_json::json!({
        "id": 7,
        "email": email,
        "created_at": "2025-03-01T10:00:00",
        "tariff_plan": plan,
        "daily_used_time": used,
    })
    .to_string()
}

pub fn anon_json(id: &str, used: i64, limit: i64) -> String {
    serde_json::json!({
        "uuid": id,
        "created_at": "2025-03-01T10:00:00",
        "daily_used_time": used,
        "daily_limit_time": limit,
    })
    .to_string()
}

pub fn new_anon_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Text field of a recorded multipart request
pub fn multipart_field(call: &RecordedCall, name: &str) -> Option<String> {
    match &call.request.body {
        RequestBody::Multipart(body) => body.field(name).map(str::to_string),
        _ => None,
    }
}
