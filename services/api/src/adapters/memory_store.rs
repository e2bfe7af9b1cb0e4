//! services/api/src/adapters/memory_store.rs
//!
//! The in-memory implementation of the `ContentStore` port. Records live for
//! the lifetime of the process and are only ever appended.

use async_trait::async_trait;
use chrono::Utc;
use mirror_core::{
    domain::{ContentEntry, NewContentEntry},
    ports::{ContentStore, PortError, PortResult},
    seed::initial_content,
};
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

/// A `ContentStore` backed by a vector behind an async read/write lock.
#[derive(Default)]
pub struct InMemoryContentStore {
    entries: RwLock<Vec<ContentEntry>>,
}

impl InMemoryContentStore {
    pub fn new(entries: Vec<ContentEntry>) -> Self {
        Self {
            entries: RwLock::new(entries),
        }
    }

    /// A store pre-filled with the four seed records, dated relative to now.
    pub fn seeded() -> Self {
        Self::new(initial_content(Utc::now()))
    }
}

fn validate(entry: &NewContentEntry) -> PortResult<()> {
    if entry.title.trim().is_empty() {
        return Err(PortError::InvalidInput("title must not be empty".to_string()));
    }
    if !entry.duration.is_finite() || entry.duration <= 0.0 {
        return Err(PortError::InvalidInput(format!(
            "duration must be a positive number of minutes, got {}",
            entry.duration
        )));
    }
    Ok(())
}

#[async_trait]
impl ContentStore for InMemoryContentStore {
    async fn list(&self) -> PortResult<Vec<ContentEntry>> {
        Ok(self.entries.read().await.clone())
    }

    async fn append(&self, entry: NewContentEntry) -> PortResult<ContentEntry> {
        validate(&entry)?;

        let stored = entry.into_entry(Uuid::new_v4().to_string());
        let mut entries = self.entries.write().await;
        entries.push(stored.clone());
        info!(id = %stored.id, total = entries.len(), "Content entry appended.");
        Ok(stored)
    }

    async fn get(&self, id: &str) -> PortResult<ContentEntry> {
        self.entries
            .read()
            .await
            .iter()
            .find(|entry| entry.id == id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("content entry {}", id)))
    }

    async fn count(&self) -> PortResult<usize> {
        Ok(self.entries.read().await.len())
    }
}
