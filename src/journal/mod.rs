//! Entry repository: the one ingestion path between the analysis service
//! and the derivation code. Every entry that flows through here gets its
//! emotion metadata canonicalized, so downstream aggregation can assume
//! well-formed input.

mod entry;

pub use entry::{EntryPatch, JournalEntry, ReflectionMetadata};

use async_trait::async_trait;
use serde_json::Value;
use uuid::Uuid;

use crate::api::{ApiClient, RawEntry};
use crate::emotion::{normalize_metadata, NEUTRAL_LABEL};
use crate::error::{EngineError, Result};

/// Upper bound on entry content, matching the service's own limit.
pub const MAX_CONTENT_CHARS: usize = 5000;

/// The slice of the service the repository needs. A seam so tests can run
/// the adapter against an in-memory fake.
#[async_trait]
pub trait EntryService: Send + Sync {
    async fn create_entry(&self, content: &str, is_voice: bool) -> Result<RawEntry>;
    async fn list_entries(&self, limit: usize) -> Result<Vec<RawEntry>>;
    async fn fetch_entry(&self, id: &str) -> Result<RawEntry>;
}

#[async_trait]
impl EntryService for ApiClient {
    async fn create_entry(&self, content: &str, is_voice: bool) -> Result<RawEntry> {
        ApiClient::create_entry(self, content, is_voice).await
    }

    async fn list_entries(&self, limit: usize) -> Result<Vec<RawEntry>> {
        ApiClient::list_entries(self, limit).await
    }

    async fn fetch_entry(&self, id: &str) -> Result<RawEntry> {
        ApiClient::fetch_entry(self, id).await
    }
}

/// In-memory view of the journal for one session. The cache is the sole
/// source of truth for derived statistics; overlapping refreshes may race
/// and the last completion wins; an accepted limitation at this layer.
pub struct JournalRepository<S: EntryService> {
    service: S,
    cache: Vec<JournalEntry>,
    session_author: String,
}

impl<S: EntryService> JournalRepository<S> {
    pub fn new(service: S) -> Self {
        Self {
            service,
            cache: Vec::new(),
            session_author: format!("viewer-{}", Uuid::new_v4()),
        }
    }

    /// Cached entries, newest first (service order, preserved).
    pub fn entries(&self) -> &[JournalEntry] {
        &self.cache
    }

    /// The service exposes no durable delete or update. Local mutations
    /// are cache-only and a later [`list`](Self::list) can resurrect
    /// anything removed here, so callers render accordingly.
    pub fn supports_remote_mutation(&self) -> bool {
        false
    }

    /// Submit new content; the service classifies it and generates the
    /// reflection server-side. The created entry is prepended to the cache.
    pub async fn create(&mut self, content: &str, is_voice: bool) -> Result<JournalEntry> {
        validate_content(content)?;
        let raw = self.service.create_entry(content, is_voice).await?;
        let entry = self.entry_from_raw(raw);
        self.cache.insert(0, entry.clone());
        Ok(entry)
    }

    /// Fetch up to `limit` most recent entries and replace the cache.
    pub async fn list(&mut self, limit: usize) -> Result<&[JournalEntry]> {
        let raw = self.service.list_entries(limit).await?;
        self.cache = raw.into_iter().map(|r| self.entry_from_raw(r)).collect();
        Ok(&self.cache)
    }

    /// By-id fetch straight through the service.
    pub async fn fetch(&self, id: &str) -> Result<JournalEntry> {
        let raw = self.service.fetch_entry(id).await?;
        Ok(self.entry_from_raw(raw))
    }

    /// Remove an entry from the cache only; returns the remaining entries.
    pub fn delete_local(&mut self, id: &str) -> Result<&[JournalEntry]> {
        let index = self
            .cache
            .iter()
            .position(|entry| entry.id == id)
            .ok_or_else(|| EngineError::NotFound(format!("no cached entry with id {}", id)))?;
        self.cache.remove(index);
        tracing::info!(
            "removed entry {} from the local cache; a refresh can bring it back",
            id
        );
        Ok(&self.cache)
    }

    /// Merge a patch into a cached entry; same non-durable caveat as
    /// [`delete_local`](Self::delete_local).
    pub fn update_local(&mut self, id: &str, patch: EntryPatch) -> Result<JournalEntry> {
        let entry = self
            .cache
            .iter_mut()
            .find(|entry| entry.id == id)
            .ok_or_else(|| EngineError::NotFound(format!("no cached entry with id {}", id)))?;
        if let Some(content) = patch.content {
            entry.content = content;
        }
        if let Some(reflection) = patch.reflection {
            entry.reflection = Some(reflection);
        }
        Ok(entry.clone())
    }

    fn entry_from_raw(&self, raw: RawEntry) -> JournalEntry {
        let emotion_metadata =
            normalize_metadata(raw.emotion_metadata.as_ref(), raw.emotion_scores.as_ref());
        JournalEntry {
            id: raw.id,
            author_id: raw.author_id.unwrap_or_else(|| self.session_author.clone()),
            content: raw.content,
            created_at: raw.created_at,
            is_voice: raw.is_voice,
            emotion: raw.emotion.unwrap_or_else(|| NEUTRAL_LABEL.to_string()),
            emotion_metadata,
            reflection: raw.reflection,
            reflection_metadata: parse_reflection(raw.reflection_metadata),
        }
    }
}

fn validate_content(content: &str) -> Result<()> {
    if content.trim().is_empty() {
        return Err(EngineError::Validation(
            "journal entry cannot be empty".to_string(),
        ));
    }
    if content.chars().count() > MAX_CONTENT_CHARS {
        return Err(EngineError::Validation(format!(
            "journal entry is too long (maximum {} characters)",
            MAX_CONTENT_CHARS
        )));
    }
    Ok(())
}

/// Reflection metadata also shows up both structured and serialized.
/// Malformed payloads are a logged data-quality warning, never an error.
fn parse_reflection(raw: Option<Value>) -> Option<ReflectionMetadata> {
    let value = match raw? {
        Value::String(text) => match serde_json::from_str(&text) {
            Ok(value) => value,
            Err(error) => {
                tracing::warn!("unparseable reflection metadata: {}", error);
                return None;
            }
        },
        other => other,
    };
    match serde_json::from_value(value) {
        Ok(parsed) => Some(parsed),
        Err(error) => {
            tracing::warn!("malformed reflection metadata: {}", error);
            None
        }
    }
}
