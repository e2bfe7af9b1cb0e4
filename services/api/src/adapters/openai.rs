//! services/api/src/adapters/openai.rs
//!
//! This module contains the adapter for OpenAI-compatible chat completion models.
//! It implements the `StructuredGenerationService` port from the `core` crate
//! using a strict `json_schema` response format.

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs, ResponseFormat, ResponseFormatJsonSchema,
    },
    Client,
};
use async_trait::async_trait;
use mirror_core::{
    ports::{PortError, PortResult, StructuredGenerationService},
    schema::ResponseSchema,
};
use tracing::debug;

const SYSTEM_INSTRUCTIONS: &str = "You are a content performance analyst for a video creator. \
Answer with a single JSON object that matches the provided schema. Scores and percentages are numbers between 0 and 100; durations are in minutes.";

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `StructuredGenerationService` using an OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiAnalysisAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiAnalysisAdapter {
    /// Creates a new `OpenAiAnalysisAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }
}

/// Wraps a response schema in OpenAI's strict structured-output format.
pub fn response_format(schema: &ResponseSchema) -> ResponseFormat {
    ResponseFormat::JsonSchema {
        json_schema: ResponseFormatJsonSchema {
            description: None,
            name: schema.name.to_string(),
            schema: Some(schema.to_json_schema()),
            strict: Some(true),
        },
    }
}

//=========================================================================================
// `StructuredGenerationService` Trait Implementation
//=========================================================================================

#[async_trait]
impl StructuredGenerationService for OpenAiAnalysisAdapter {
    async fn generate_structured(
        &self,
        prompt: &str,
        schema: &ResponseSchema,
    ) -> PortResult<String> {
        debug!(model = %self.model, schema = schema.name, "Calling OpenAI chat completion.");

        let messages = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(SYSTEM_INSTRUCTIONS)
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(prompt)
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .response_format(response_format(schema))
            .n(1)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        // Every failure of the call itself is a transport problem from the gateway's view.
        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e: OpenAIError| PortError::Transport(e.to_string()))?;

        let choice = response.choices.into_iter().next().ok_or_else(|| {
            PortError::MalformedResponse("OpenAI returned no choices in its response.".to_string())
        })?;

        // Missing content is passed on as an empty body for the gateway to reject.
        Ok(choice.message.content.unwrap_or_default())
    }
}
