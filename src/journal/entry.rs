use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::emotion::EmotionMetadata;

/// One journal entry as the rest of the engine sees it: identifiers and
/// timestamps are typed, and the emotion metadata is already canonical.
/// Immutable once created, apart from the repository's local-cache edits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalEntry {
    pub id: String,
    pub author_id: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub is_voice: bool,
    /// Primary emotion label from the classifier's taxonomy, or
    /// "neutral"/"mixed".
    pub emotion: String,
    /// `None` means unclassified, which is distinct from an empty or
    /// neutral classification.
    pub emotion_metadata: Option<EmotionMetadata>,
    pub reflection: Option<String>,
    pub reflection_metadata: Option<ReflectionMetadata>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReflectionMetadata {
    #[serde(default)]
    pub suggestions: Vec<String>,
    #[serde(default)]
    pub tone: Option<String>,
    #[serde(default)]
    pub focus: Option<String>,
}

/// Fields a caller may change on a cached entry. Local-only: the service
/// has no durable update, so none of this survives a refresh.
#[derive(Debug, Clone, Default)]
pub struct EntryPatch {
    pub content: Option<String>,
    pub reflection: Option<String>,
}
