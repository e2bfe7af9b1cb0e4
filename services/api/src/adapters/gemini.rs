//! services/api/src/adapters/gemini.rs
//!
//! This module contains the adapter for Google's Gemini `generateContent` endpoint.
//! It implements the `StructuredGenerationService` port from the `core` crate,
//! asking for `application/json` output constrained by a response schema.

use async_trait::async_trait;
use mirror_core::{
    ports::{PortError, PortResult, StructuredGenerationService},
    schema::{ObjectSchema, ResponseSchema, SchemaNode},
};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::{debug, warn};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `StructuredGenerationService` over the Gemini REST API.
#[derive(Clone)]
pub struct GeminiAnalysisAdapter {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl GeminiAnalysisAdapter {
    /// Creates a new `GeminiAnalysisAdapter`. The API key is sent on every request.
    pub fn new(http: reqwest::Client, base_url: String, api_key: String, model: String) -> Self {
        Self {
            http,
            base_url,
            api_key,
            model,
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

//=========================================================================================
// Wire Format
//=========================================================================================

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Deserialize)]
struct Part {
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
    status: Option<String>,
}

/// Renders a schema in Gemini's OpenAPI-subset dialect (upper-case type names).
pub fn render_schema(schema: &ResponseSchema) -> Value {
    render_object(&schema.root)
}

fn render_node(node: &SchemaNode) -> Value {
    match node {
        SchemaNode::String => json!({ "type": "STRING" }),
        SchemaNode::Number => json!({ "type": "NUMBER" }),
        SchemaNode::Enum(values) => json!({ "type": "STRING", "format": "enum", "enum": values }),
        SchemaNode::Array(items) => json!({ "type": "ARRAY", "items": render_node(items) }),
        SchemaNode::Object(object) => render_object(object),
    }
}

fn render_object(object: &ObjectSchema) -> Value {
    let properties: Map<String, Value> = object
        .properties
        .iter()
        .map(|(name, node)| (name.to_string(), render_node(node)))
        .collect();
    json!({
        "type": "OBJECT",
        "properties": properties,
        "required": object.required,
    })
}

pub fn build_request_body(prompt: &str, schema: &ResponseSchema) -> Value {
    json!({
        "contents": [{ "role": "user", "parts": [{ "text": prompt }] }],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": render_schema(schema),
        }
    })
}

/// Pulls the generated text out of a successful `generateContent` envelope.
fn extract_text(body: &str) -> PortResult<String> {
    let response: GenerateContentResponse = serde_json::from_str(body).map_err(|e| {
        PortError::MalformedResponse(format!("unreadable Gemini response envelope: {}", e))
    })?;

    let Some(candidate) = response.candidates.into_iter().next() else {
        let reason = response
            .prompt_feedback
            .and_then(|f| f.block_reason)
            .unwrap_or_else(|| "none given".to_string());
        return Err(PortError::MalformedResponse(format!(
            "Gemini returned no candidates (block reason: {})",
            reason
        )));
    };

    if let Some(reason) = candidate.finish_reason.as_deref() {
        if reason != "STOP" {
            warn!("Gemini candidate finished with reason {}.", reason);
        }
    }

    Ok(candidate
        .content
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect::<String>()
        })
        .unwrap_or_default())
}

fn describe_error(status: reqwest::StatusCode, body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => match envelope.error.status {
            Some(code) => format!("HTTP {} ({}): {}", status.as_u16(), code, envelope.error.message),
            None => format!("HTTP {}: {}", status.as_u16(), envelope.error.message),
        },
        Err(_) => format!("HTTP {}", status.as_u16()),
    }
}

//=========================================================================================
// `StructuredGenerationService` Trait Implementation
//=========================================================================================

#[async_trait]
impl StructuredGenerationService for GeminiAnalysisAdapter {
    async fn generate_structured(
        &self,
        prompt: &str,
        schema: &ResponseSchema,
    ) -> PortResult<String> {
        debug!(model = %self.model, schema = schema.name, "Calling Gemini generateContent.");

        let response = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&build_request_body(prompt, schema))
            .send()
            .await
            .map_err(|e| PortError::Transport(format!("request to Gemini failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| PortError::Transport(format!("failed to read Gemini response: {}", e)))?;

        if !status.is_success() {
            return Err(PortError::Transport(describe_error(status, &body)));
        }

        extract_text(&body)
    }
}
