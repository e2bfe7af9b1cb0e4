//! crates/mirror_core/src/gateway.rs
//!
//! The Analysis Gateway: turns the content history into structured-output
//! requests and turns the backend's JSON back into validated domain entities.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::domain::{
    AIRecommendation, ContentEntry, DashboardInsights, DashboardSnapshot, PerformanceDNA,
};
use crate::ports::{PortError, PortResult, StructuredGenerationService};
use crate::prompts;
use crate::schema::{self, ResponseSchema};

//=========================================================================================
// The Gateway
//=========================================================================================

/// Issues analysis requests against a `StructuredGenerationService`.
///
/// Every operation performs exactly one backend call (two for `refresh_dashboard`),
/// never retries and never caches.
#[derive(Clone)]
pub struct AnalysisGateway {
    backend: Arc<dyn StructuredGenerationService>,
}

impl AnalysisGateway {
    pub fn new(backend: Arc<dyn StructuredGenerationService>) -> Self {
        Self { backend }
    }

    /// Builds a Performance DNA profile from the full history.
    pub async fn analyze_performance(&self, history: &[ContentEntry]) -> PortResult<PerformanceDNA> {
        let prompt = prompts::performance_dna_prompt(history)?;
        self.request("analyze_performance", &prompt, &schema::performance_dna_schema())
            .await
    }

    /// Recommends duration, tone and hook for a new piece of content about `topic`.
    ///
    /// An empty or whitespace-only topic is rejected before the backend is contacted.
    pub async fn get_recommendation(
        &self,
        topic: &str,
        history: &[ContentEntry],
    ) -> PortResult<AIRecommendation> {
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(PortError::InvalidInput(
                "A topic is required to request a recommendation.".to_string(),
            ));
        }

        let prompt = prompts::recommendation_prompt(topic, history)?;
        self.request("get_recommendation", &prompt, &schema::recommendation_schema())
            .await
    }

    pub async fn get_dashboard_insights(
        &self,
        history: &[ContentEntry],
    ) -> PortResult<DashboardInsights> {
        let prompt = prompts::dashboard_insights_prompt(history)?;
        self.request(
            "get_dashboard_insights",
            &prompt,
            &schema::dashboard_insights_schema(),
        )
        .await
    }

    /// Requests DNA and insights concurrently. Returns both or the first failure;
    /// a successful half is dropped when the other half fails.
    pub async fn refresh_dashboard(&self, history: &[ContentEntry]) -> PortResult<DashboardSnapshot> {
        let (dna, insights) = futures::try_join!(
            self.analyze_performance(history),
            self.get_dashboard_insights(history)
        )?;
        Ok(DashboardSnapshot { dna, insights })
    }

    async fn request<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        prompt: &str,
        schema: &ResponseSchema,
    ) -> PortResult<T> {
        info!(operation, schema = schema.name, "Sending analysis request.");
        debug!(operation, prompt_len = prompt.len(), "Prompt built.");

        let raw = self
            .backend
            .generate_structured(prompt, schema)
            .await
            .map_err(|e| {
                warn!(operation, error = %e, "Analysis backend call failed.");
                e
            })?;

        let decoded = decode(&raw).map_err(|e| {
            warn!(operation, error = %e, "Analysis response rejected.");
            e
        })?;
        info!(operation, "Analysis response decoded.");
        Ok(decoded)
    }
}

//=========================================================================================
// Decoding
//=========================================================================================

/// Converts a raw response body into a validated entity.
///
/// Empty or non-JSON bodies are `MalformedResponse`; JSON that does not fit the
/// entity (missing field, wrong type, unknown enum value) is `IncompleteResponse`.
pub fn decode<T: DeserializeOwned>(raw: &str) -> PortResult<T> {
    let body = strip_code_fence(raw.trim());
    if body.is_empty() {
        return Err(PortError::MalformedResponse(
            "response body was empty".to_string(),
        ));
    }

    let value: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| PortError::MalformedResponse(format!("response is not valid JSON: {}", e)))?;

    serde_json::from_value(value).map_err(|e| PortError::IncompleteResponse(e.to_string()))
}

/// Some models wrap JSON in a Markdown fence even in JSON mode.
fn strip_code_fence(body: &str) -> &str {
    let Some(rest) = body.strip_prefix("```") else {
        return body;
    };
    let Some(inner) = rest.strip_suffix("```") else {
        return body;
    };
    // Drop the info string ("json") on the opening line.
    match inner.find('\n') {
        Some(newline) => inner[newline + 1..].trim(),
        None => inner.trim(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AlertSeverity, ContentTone, HookStyle};
    use crate::seed::initial_content;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// A backend that answers per schema name and records every call it receives.
    #[derive(Default)]
    struct ScriptedBackend {
        responses: HashMap<&'static str, PortResult<String>>,
        calls: Mutex<Vec<(String, &'static str)>>,
    }

    impl ScriptedBackend {
        fn with(mut self, schema: &'static str, response: PortResult<String>) -> Self {
            self.responses.insert(schema, response);
            self
        }

        fn calls(&self) -> Vec<(String, &'static str)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl StructuredGenerationService for ScriptedBackend {
        async fn generate_structured(
            &self,
            prompt: &str,
            schema: &ResponseSchema,
        ) -> PortResult<String> {
            self.calls
                .lock()
                .unwrap()
                .push((prompt.to_string(), schema.name));
            self.responses
                .get(schema.name)
                .cloned()
                .unwrap_or_else(|| Err(PortError::Transport("no scripted response".to_string())))
        }
    }

    const DNA_JSON: &str = r#"{
        "strengthScore": 82,
        "hookEffectiveness": 74.5,
        "retentionPrediction": 61,
        "audienceSensitivity": "Responds strongly to candid, personal stories.",
        "topTone": "Provocative",
        "bestDuration": 12.5
    }"#;

    const RECOMMENDATION_JSON: &str = r#"{
        "suggestedDuration": 9.5,
        "suggestedTone": "Inspirational",
        "suggestedHook": "Visual Hook",
        "predictedEngagement": 13.4,
        "reasoning": "Workspace tours perform best when the first frame shows the finished result."
    }"#;

    const INSIGHTS_JSON: &str = r#"{
        "trends": [
            {"date": "2024-05-01", "views": 12500, "engagement": 8.5},
            {"date": "2024-05-04", "views": 45000.0, "engagement": 12.2}
        ],
        "suggestions": ["Open long-form videos with a story."],
        "alerts": [{"severity": "medium", "message": "Retention drops after minute 4."}]
    }"#;

    fn build_gateway(backend: ScriptedBackend) -> (AnalysisGateway, Arc<ScriptedBackend>) {
        let backend = Arc::new(backend);
        (AnalysisGateway::new(backend.clone()), backend)
    }

    #[tokio::test]
    async fn analyze_performance_returns_decoded_dna() {
        let history = initial_content(Utc::now());
        let (gateway, backend) =
            build_gateway(ScriptedBackend::default().with("performance_dna", Ok(DNA_JSON.to_string())));

        let dna = gateway.analyze_performance(&history).await.unwrap();

        assert_eq!(dna.top_tone, ContentTone::Provocative);
        assert!(ContentTone::ALL.contains(&dna.top_tone));
        assert!(history.iter().any(|e| e.duration == dna.best_duration));
        assert_eq!(dna.strength_score, 82.0);

        let calls = backend.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].1, "performance_dna");
        assert!(calls[0].0.contains("Daily Morning Routine 2024"));
    }

    #[tokio::test]
    async fn recommendation_for_topic_has_valid_members() {
        let history = initial_content(Utc::now());
        let (gateway, backend) = build_gateway(
            ScriptedBackend::default()
                .with("ai_recommendation", Ok(RECOMMENDATION_JSON.to_string())),
        );

        let recommendation = gateway
            .get_recommendation("  Designing a futuristic workspace...  ", &history)
            .await
            .unwrap();

        assert_eq!(recommendation.suggested_tone, ContentTone::Inspirational);
        assert_eq!(recommendation.suggested_hook, HookStyle::VisualHook);
        assert!((0.0..=100.0).contains(&recommendation.predicted_engagement));

        let calls = backend.calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].0.ends_with("about: Designing a futuristic workspace..."));
    }

    #[tokio::test]
    async fn blank_topic_is_rejected_without_a_backend_call() {
        let (gateway, backend) = build_gateway(
            ScriptedBackend::default()
                .with("ai_recommendation", Ok(RECOMMENDATION_JSON.to_string())),
        );

        for topic in ["", "   ", "\n\t"] {
            let err = gateway.get_recommendation(topic, &[]).await.unwrap_err();
            assert!(matches!(err, PortError::InvalidInput(_)));
        }
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn insights_decode_nested_sequences() {
        let (gateway, _) = build_gateway(
            ScriptedBackend::default().with("dashboard_insights", Ok(INSIGHTS_JSON.to_string())),
        );

        let insights = gateway.get_dashboard_insights(&[]).await.unwrap();

        assert_eq!(insights.trends.len(), 2);
        assert_eq!(insights.trends[1].views, 45_000);
        assert_eq!(insights.suggestions, vec!["Open long-form videos with a story."]);
        assert_eq!(insights.alerts[0].severity, AlertSeverity::Medium);
    }

    #[tokio::test]
    async fn empty_or_non_json_bodies_are_malformed_for_every_operation() {
        for body in ["", "   ", "not json at all", "{\"strengthScore\": "] {
            let (gateway, _) = build_gateway(
                ScriptedBackend::default()
                    .with("performance_dna", Ok(body.to_string()))
                    .with("ai_recommendation", Ok(body.to_string()))
                    .with("dashboard_insights", Ok(body.to_string())),
            );

            let dna = gateway.analyze_performance(&[]).await.unwrap_err();
            let rec = gateway.get_recommendation("cooking", &[]).await.unwrap_err();
            let insights = gateway.get_dashboard_insights(&[]).await.unwrap_err();

            assert!(matches!(dna, PortError::MalformedResponse(_)), "{body:?}: {dna:?}");
            assert!(matches!(rec, PortError::MalformedResponse(_)), "{body:?}: {rec:?}");
            assert!(
                matches!(insights, PortError::MalformedResponse(_)),
                "{body:?}: {insights:?}"
            );
        }
    }

    #[tokio::test]
    async fn missing_fields_are_incomplete_not_partially_populated() {
        let partial = r#"{"strengthScore": 82, "topTone": "Relaxed"}"#;
        let (gateway, _) = build_gateway(
            ScriptedBackend::default()
                .with("performance_dna", Ok(partial.to_string()))
                .with("dashboard_insights", Ok("{}".to_string())),
        );

        let err = gateway.analyze_performance(&[]).await.unwrap_err();
        assert!(matches!(err, PortError::IncompleteResponse(_)));

        let err = gateway.get_dashboard_insights(&[]).await.unwrap_err();
        assert!(matches!(err, PortError::IncompleteResponse(_)));
    }

    #[tokio::test]
    async fn out_of_enum_values_are_incomplete() {
        let bad_tone = RECOMMENDATION_JSON.replace("Inspirational", "Whimsical");
        let (gateway, _) =
            build_gateway(ScriptedBackend::default().with("ai_recommendation", Ok(bad_tone)));

        let err = gateway.get_recommendation("cooking", &[]).await.unwrap_err();
        assert!(matches!(err, PortError::IncompleteResponse(_)));
    }

    #[tokio::test]
    async fn transport_failures_propagate_unchanged() {
        let (gateway, _) = build_gateway(ScriptedBackend::default().with(
            "performance_dna",
            Err(PortError::Transport("HTTP 401: API key not valid".to_string())),
        ));

        let err = gateway.analyze_performance(&[]).await.unwrap_err();
        assert_eq!(
            err,
            PortError::Transport("HTTP 401: API key not valid".to_string())
        );
    }

    #[tokio::test]
    async fn refresh_returns_both_halves_on_success() {
        let history = initial_content(Utc::now());
        let (gateway, backend) = build_gateway(
            ScriptedBackend::default()
                .with("performance_dna", Ok(DNA_JSON.to_string()))
                .with("dashboard_insights", Ok(INSIGHTS_JSON.to_string())),
        );

        let snapshot = gateway.refresh_dashboard(&history).await.unwrap();

        assert_eq!(snapshot.dna.top_tone, ContentTone::Provocative);
        assert_eq!(snapshot.insights.alerts.len(), 1);
        let mut schemas: Vec<_> = backend.calls().into_iter().map(|(_, s)| s).collect();
        schemas.sort();
        assert_eq!(schemas, vec!["dashboard_insights", "performance_dna"]);
    }

    #[tokio::test]
    async fn refresh_fails_when_either_half_fails() {
        let (gateway, _) = build_gateway(
            ScriptedBackend::default()
                .with("performance_dna", Ok(DNA_JSON.to_string()))
                .with("dashboard_insights", Ok("".to_string())),
        );
        let err = gateway.refresh_dashboard(&[]).await.unwrap_err();
        assert!(matches!(err, PortError::MalformedResponse(_)));

        let (gateway, _) = build_gateway(
            ScriptedBackend::default()
                .with("performance_dna", Err(PortError::Transport("timed out".to_string())))
                .with("dashboard_insights", Ok(INSIGHTS_JSON.to_string())),
        );
        let err = gateway.refresh_dashboard(&[]).await.unwrap_err();
        assert!(matches!(err, PortError::Transport(_)));
    }

    #[test]
    fn decode_accepts_fenced_json() {
        let fenced = format!("```json\n{}\n```", RECOMMENDATION_JSON);
        let recommendation: AIRecommendation = decode(&fenced).unwrap();
        assert_eq!(recommendation.suggested_duration, 9.5);
    }

    #[test]
    fn decode_treats_wrong_top_level_type_as_incomplete() {
        let err = decode::<PerformanceDNA>("[1, 2, 3]").unwrap_err();
        assert!(matches!(err, PortError::IncompleteResponse(_)));
    }
}
