//! crates/mirror_core/src/domain.rs
//!
//! Defines the core data structures for the application: the historical
//! content records and the three entities derived from them by the analysis
//! backend. Field names serialize in camelCase because the same JSON shape is
//! embedded in prompts and returned by the backend.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

//=========================================================================================
// Enumerations
//=========================================================================================

/// The format a piece of content was published in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum ContentType {
    #[serde(rename = "Short Video", alias = "short-video", alias = "short_video")]
    ShortVideo,
    #[serde(rename = "Long Form", alias = "long-form", alias = "long_form")]
    LongForm,
    #[serde(rename = "Livestream", alias = "livestream")]
    Livestream,
    #[serde(rename = "Podcast", alias = "podcast")]
    Podcast,
}

/// The overall tone of a piece of content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum ContentTone {
    #[serde(alias = "educational")]
    Educational,
    #[serde(alias = "entertaining")]
    Entertaining,
    #[serde(alias = "inspirational")]
    Inspirational,
    #[serde(alias = "provocative")]
    Provocative,
    #[serde(alias = "relaxed")]
    Relaxed,
}

impl ContentTone {
    pub const ALL: [ContentTone; 5] = [
        ContentTone::Educational,
        ContentTone::Entertaining,
        ContentTone::Inspirational,
        ContentTone::Provocative,
        ContentTone::Relaxed,
    ];

    /// The wire name, as used in prompts and response schemas.
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentTone::Educational => "Educational",
            ContentTone::Entertaining => "Entertaining",
            ContentTone::Inspirational => "Inspirational",
            ContentTone::Provocative => "Provocative",
            ContentTone::Relaxed => "Relaxed",
        }
    }
}

/// How the opening seconds of a piece of content grab attention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum HookStyle {
    #[serde(alias = "question")]
    Question,
    #[serde(rename = "Bold Statement", alias = "bold-statement", alias = "bold_statement")]
    BoldStatement,
    #[serde(rename = "Visual Hook", alias = "visual-hook", alias = "visual_hook")]
    VisualHook,
    #[serde(rename = "Story Start", alias = "story-start", alias = "story_start")]
    StoryStart,
    #[serde(alias = "controversial")]
    Controversial,
}

impl HookStyle {
    pub const ALL: [HookStyle; 5] = [
        HookStyle::Question,
        HookStyle::BoldStatement,
        HookStyle::VisualHook,
        HookStyle::StoryStart,
        HookStyle::Controversial,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HookStyle::Question => "Question",
            HookStyle::BoldStatement => "Bold Statement",
            HookStyle::VisualHook => "Visual Hook",
            HookStyle::StoryStart => "Story Start",
            HookStyle::Controversial => "Controversial",
        }
    }
}

/// Severity of a dashboard alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    #[serde(alias = "Low", alias = "LOW")]
    Low,
    #[serde(alias = "Medium", alias = "MEDIUM")]
    Medium,
    #[serde(alias = "High", alias = "HIGH")]
    High,
}

impl AlertSeverity {
    pub const ALL: [AlertSeverity; 3] = [AlertSeverity::Low, AlertSeverity::Medium, AlertSeverity::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            AlertSeverity::Low => "low",
            AlertSeverity::Medium => "medium",
            AlertSeverity::High => "high",
        }
    }
}

//=========================================================================================
// Content Records
//=========================================================================================

/// A historical record of one published piece of content and its measured outcomes.
///
/// Records are immutable once created; the store only ever appends them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ContentEntry {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub content_type: ContentType,
    /// Length in minutes.
    pub duration: f64,
    pub tone: ContentTone,
    pub hook_style: HookStyle,
    pub publish_time: DateTime<Utc>,
    pub views: u64,
    /// Percentage, 0-100.
    pub engagement_rate: f64,
    /// Percentage, 0-100.
    pub retention_rate: f64,
    pub topic: String,
}

/// The caller-supplied part of a new `ContentEntry`; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct NewContentEntry {
    pub title: String,
    #[serde(rename = "type")]
    pub content_type: ContentType,
    pub duration: f64,
    pub tone: ContentTone,
    pub hook_style: HookStyle,
    pub publish_time: DateTime<Utc>,
    pub views: u64,
    pub engagement_rate: f64,
    pub retention_rate: f64,
    pub topic: String,
}

impl NewContentEntry {
    /// Attaches an identifier, producing the stored record.
    pub fn into_entry(self, id: String) -> ContentEntry {
        ContentEntry {
            id,
            title: self.title,
            content_type: self.content_type,
            duration: self.duration,
            tone: self.tone,
            hook_style: self.hook_style,
            publish_time: self.publish_time,
            views: self.views,
            engagement_rate: self.engagement_rate,
            retention_rate: self.retention_rate,
            topic: self.topic,
        }
    }
}

//=========================================================================================
// Derived Entities
//=========================================================================================

/// An AI-produced profile summarizing patterns across the whole content history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct PerformanceDNA {
    pub strength_score: f64,
    pub hook_effectiveness: f64,
    pub retention_prediction: f64,
    pub audience_sensitivity: String,
    pub top_tone: ContentTone,
    pub best_duration: f64,
}

/// An AI-produced suggestion for one proposed content topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct AIRecommendation {
    pub suggested_duration: f64,
    pub suggested_tone: ContentTone,
    pub suggested_hook: HookStyle,
    pub predicted_engagement: f64,
    pub reasoning: String,
}

/// One point of the views/engagement trend chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct TrendPoint {
    pub date: String,
    #[serde(deserialize_with = "deserialize_count")]
    pub views: u64,
    pub engagement: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Alert {
    pub severity: AlertSeverity,
    pub message: String,
}

/// Trends, improvement suggestions and risk alerts derived from the history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct DashboardInsights {
    pub trends: Vec<TrendPoint>,
    pub suggestions: Vec<String>,
    pub alerts: Vec<Alert>,
}

/// The result of one combined refresh: both halves succeeded together.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardSnapshot {
    pub dna: PerformanceDNA,
    pub insights: DashboardInsights,
}

/// Accepts any non-negative whole JSON number, so `12500` and `12500.0` both decode.
fn deserialize_count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = f64::deserialize(deserializer)?;
    if value.is_finite() && value >= 0.0 && value.fract() == 0.0 && value <= u64::MAX as f64 {
        Ok(value as u64)
    } else {
        Err(serde::de::Error::custom(format!(
            "expected a non-negative whole number, got {}",
            value
        )))
    }
}
