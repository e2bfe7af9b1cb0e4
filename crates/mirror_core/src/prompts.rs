//! crates/mirror_core/src/prompts.rs
//!
//! Prompt templates for the three analysis requests. The content history is
//! embedded as compact JSON in the same shape the backend answers in.

use crate::domain::ContentEntry;
use crate::ports::{PortError, PortResult};

/// Serializes the ordered history to compact JSON.
pub fn serialize_history(history: &[ContentEntry]) -> PortResult<String> {
    serde_json::to_string(history)
        .map_err(|e| PortError::Unexpected(format!("Failed to serialize content history: {}", e)))
}

pub fn performance_dna_prompt(history: &[ContentEntry]) -> PortResult<String> {
    Ok(format!(
        "Analyze this content history and provide a Performance DNA profile in JSON format: {}",
        serialize_history(history)?
    ))
}

/// `topic` is inserted as given; callers trim and validate it first.
pub fn recommendation_prompt(topic: &str, history: &[ContentEntry]) -> PortResult<String> {
    Ok(format!(
        "Based on the content history: {}, give me an optimized recommendation for a new video about: {}",
        serialize_history(history)?,
        topic
    ))
}

pub fn dashboard_insights_prompt(history: &[ContentEntry]) -> PortResult<String> {
    Ok(format!(
        "Generate dashboard insights (trends, improvement suggestions, risk alerts) based on: {}",
        serialize_history(history)?
    ))
}
