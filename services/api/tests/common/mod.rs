//! Shared fixtures for the API integration tests.

#![allow(dead_code)]

use api_lib::adapters::InMemoryContentStore;
use api_lib::web::{api_router, AppState};
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use mirror_core::{
    gateway::AnalysisGateway,
    ports::{PortError, PortResult, StructuredGenerationService},
    schema::ResponseSchema,
};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

pub const DNA_JSON: &str = r#"{
    "strengthScore": 78,
    "hookEffectiveness": 66,
    "retentionPrediction": 59.5,
    "audienceSensitivity": "Rewards vulnerability, skips slow intros.",
    "topTone": "Provocative",
    "bestDuration": 12.5
}"#;

pub const INSIGHTS_JSON: &str = r#"{
    "trends": [{"date": "2024-05-10", "views": 15200, "engagement": 15.1}],
    "suggestions": ["Lead with the conclusion in long-form videos."],
    "alerts": [{"severity": "high", "message": "Retention under 50% on long-form."}]
}"#;

pub const RECOMMENDATION_JSON: &str = r#"{
    "suggestedDuration": 10,
    "suggestedTone": "Educational",
    "suggestedHook": "Question",
    "predictedEngagement": 12.8,
    "reasoning": "Educational walkthroughs keep retention high."
}"#;

/// A backend whose answer per schema can be changed while the app is running.
#[derive(Default)]
pub struct SwitchableBackend {
    responses: Mutex<HashMap<&'static str, PortResult<String>>>,
    calls: Mutex<Vec<&'static str>>,
    stalled: AtomicBool,
}

impl SwitchableBackend {
    pub fn healthy() -> Arc<Self> {
        let backend = Arc::new(Self::default());
        backend.set("performance_dna", Ok(DNA_JSON.to_string()));
        backend.set("dashboard_insights", Ok(INSIGHTS_JSON.to_string()));
        backend.set("ai_recommendation", Ok(RECOMMENDATION_JSON.to_string()));
        backend
    }

    pub fn set(&self, schema: &'static str, response: PortResult<String>) {
        self.responses.lock().unwrap().insert(schema, response);
    }

    /// Makes every later call hang forever, like a backend that never answers.
    pub fn stall(&self) {
        self.stalled.store(true, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl StructuredGenerationService for SwitchableBackend {
    async fn generate_structured(
        &self,
        _prompt: &str,
        schema: &ResponseSchema,
    ) -> PortResult<String> {
        self.calls.lock().unwrap().push(schema.name);
        if self.stalled.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        self.responses
            .lock()
            .unwrap()
            .get(schema.name)
            .cloned()
            .unwrap_or_else(|| Err(PortError::Transport("backend unavailable".to_string())))
    }
}

pub struct TestApp {
    pub router: Router,
    pub state: Arc<AppState>,
    pub backend: Arc<SwitchableBackend>,
}

impl TestApp {
    pub fn new(backend: Arc<SwitchableBackend>) -> Self {
        let state = Arc::new(AppState::new(
            Arc::new(InMemoryContentStore::seeded()),
            AnalysisGateway::new(backend.clone()),
        ));
        Self {
            router: api_router(state.clone()),
            state,
            backend,
        }
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        self.send(request).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }
}
