//! crates/mirror_core/src/seed.rs
//!
//! The fixed dataset the in-memory store starts from.

use chrono::{DateTime, Duration, Utc};

use crate::domain::{ContentEntry, ContentTone, ContentType, HookStyle};

/// Returns the four seed records, published 10, 7, 3 and 1 days before `now`.
pub fn initial_content(now: DateTime<Utc>) -> Vec<ContentEntry> {
    vec![
        ContentEntry {
            id: "1".to_string(),
            title: "5 Tips for Better Lighting".to_string(),
            content_type: ContentType::ShortVideo,
            duration: 0.8,
            tone: ContentTone::Educational,
            hook_style: HookStyle::Question,
            publish_time: now - Duration::days(10),
            views: 12_500,
            engagement_rate: 8.5,
            retention_rate: 72.0,
            topic: "Photography".to_string(),
        },
        ContentEntry {
            id: "2".to_string(),
            title: "Why I Switched to MirrorOS".to_string(),
            content_type: ContentType::LongForm,
            duration: 12.5,
            tone: ContentTone::Entertaining,
            hook_style: HookStyle::BoldStatement,
            publish_time: now - Duration::days(7),
            views: 45_000,
            engagement_rate: 12.2,
            retention_rate: 45.0,
            topic: "Technology".to_string(),
        },
        ContentEntry {
            id: "3".to_string(),
            title: "Daily Morning Routine 2024".to_string(),
            content_type: ContentType::ShortVideo,
            duration: 0.9,
            tone: ContentTone::Relaxed,
            hook_style: HookStyle::VisualHook,
            publish_time: now - Duration::days(3),
            views: 8_200,
            engagement_rate: 5.4,
            retention_rate: 68.0,
            topic: "Lifestyle".to_string(),
        },
        ContentEntry {
            id: "4".to_string(),
            title: "The Truth About Creator Burnout".to_string(),
            content_type: ContentType::LongForm,
            duration: 18.2,
            tone: ContentTone::Provocative,
            hook_style: HookStyle::StoryStart,
            publish_time: now - Duration::days(1),
            views: 15_200,
            engagement_rate: 15.1,
            retention_rate: 58.0,
            topic: "Psychology".to_string(),
        },
    ]
}
