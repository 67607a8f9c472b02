//! HTTP client for the remote analysis service.
//!
//! The service owns classification, reflection generation, durable entry
//! storage, and transcription; this module owns the wire shapes and turns
//! transport failures into [`EngineError::Remote`] values that carry the
//! service-provided detail instead of raw transport errors.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::emotion::{normalize_metadata, EmotionMetadata, NEUTRAL_LABEL};
use crate::error::{EngineError, Result};

const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";

/// Raw entry exactly as the service ships it. Emotion information can
/// arrive as structured `emotion_metadata`, as the legacy serialized
/// `emotion_scores`, as both, or as neither; all four are legal.
#[derive(Debug, Clone, Deserialize)]
pub struct RawEntry {
    #[serde(with = "id_string")]
    pub id: String,
    pub content: String,
    #[serde(default)]
    pub emotion: Option<String>,
    #[serde(default)]
    pub emotion_metadata: Option<Value>,
    #[serde(default)]
    pub emotion_scores: Option<Value>,
    #[serde(default)]
    pub reflection: Option<String>,
    #[serde(default)]
    pub reflection_metadata: Option<Value>,
    #[serde(with = "flexible_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub is_voice: bool,
    #[serde(default, alias = "user_id")]
    pub author_id: Option<String>,
}

/// Pre-aggregated window statistics from the mood endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct MoodStats {
    pub total_entries: u64,
    #[serde(default)]
    pub emotion_distribution: serde_json::Map<String, Value>,
    #[serde(default)]
    pub weekly_trend: Vec<TrendPoint>,
}

impl MoodStats {
    /// Label/count pairs in source order, malformed values dropped.
    pub fn distribution_pairs(&self) -> Vec<(String, u64)> {
        self.emotion_distribution
            .iter()
            .filter_map(|(label, count)| count.as_u64().map(|count| (label.clone(), count)))
            .collect()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrendPoint {
    pub date: String,
    #[serde(default)]
    pub emotion: Option<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
}

/// Direct classification of a piece of text, already normalized.
#[derive(Debug, Clone)]
pub struct Classification {
    pub emotion: String,
    pub metadata: EmotionMetadata,
}

/// Reflection backend, a closed set. Unknown names never reach the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReflectionProvider {
    Gemini,
    OpenAi,
}

impl ReflectionProvider {
    pub const ALL: [ReflectionProvider; 2] =
        [ReflectionProvider::Gemini, ReflectionProvider::OpenAi];

    pub fn as_str(self) -> &'static str {
        match self {
            ReflectionProvider::Gemini => "gemini",
            ReflectionProvider::OpenAi => "openai",
        }
    }

    pub fn parse(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "gemini" => Ok(ReflectionProvider::Gemini),
            "openai" => Ok(ReflectionProvider::OpenAi),
            other => Err(EngineError::Validation(format!(
                "unknown reflection provider '{}'; expected one of: gemini, openai",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderStatus {
    pub current_provider: String,
    #[serde(default)]
    pub available_providers: Vec<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TranscriptBody {
    text: String,
}

#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    token: Option<String>,
    client: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: String, token: Option<String>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.filter(|t| !t.trim().is_empty()),
            client: reqwest::Client::new(),
        }
    }

    pub fn from_env() -> Self {
        let base_url = std::env::var("REVERIE_BACKEND_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string());
        let token = std::env::var("REVERIE_BACKEND_TOKEN").ok();
        Self::new(base_url, token)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn create_entry(&self, content: &str, is_voice: bool) -> Result<RawEntry> {
        let body = serde_json::json!({ "content": content, "is_voice": is_voice });
        let response = self
            .post("/journal/create")
            .json(&body)
            .send()
            .await
            .map_err(unreachable_service)?;
        let response = check_status(response).await?;
        decode_json(response).await
    }

    pub async fn list_entries(&self, limit: usize) -> Result<Vec<RawEntry>> {
        let response = self
            .get(&format!("/journal/history?limit={}", limit))
            .send()
            .await
            .map_err(unreachable_service)?;
        let response = check_status(response).await?;
        let raw: Vec<Value> = decode_json(response).await?;

        // Per-entry leniency: one undecodable row must not sink the batch.
        let mut entries = Vec::with_capacity(raw.len());
        for value in raw {
            match serde_json::from_value::<RawEntry>(value) {
                Ok(entry) => entries.push(entry),
                Err(error) => {
                    tracing::warn!("dropping undecodable journal entry: {}", error);
                }
            }
        }
        Ok(entries)
    }

    pub async fn fetch_entry(&self, id: &str) -> Result<RawEntry> {
        let response = self
            .get(&format!("/journal/{}", id))
            .send()
            .await
            .map_err(unreachable_service)?;
        let response = check_status(response).await?;
        decode_json(response).await
    }

    pub async fn mood_stats(&self, days: u32) -> Result<MoodStats> {
        let response = self
            .get(&format!("/mood/stats?days={}", days))
            .send()
            .await
            .map_err(unreachable_service)?;
        let response = check_status(response).await?;
        decode_json(response).await
    }

    /// Classify a piece of text without creating an entry. The response is
    /// the structured metadata shape, so it goes through the same
    /// normalizer as every other ingestion path.
    pub async fn classify_emotion(&self, text: &str) -> Result<Classification> {
        let body = serde_json::json!({ "text": text });
        let response = self
            .post("/analysis/emotion")
            .json(&body)
            .send()
            .await
            .map_err(unreachable_service)?;
        let response = check_status(response).await?;
        let payload: Value = decode_json(response).await?;

        let emotion = payload
            .get("emotion")
            .and_then(Value::as_str)
            .unwrap_or(NEUTRAL_LABEL)
            .to_string();
        let metadata =
            normalize_metadata(Some(&payload), None).unwrap_or_else(EmotionMetadata::empty);
        Ok(Classification { emotion, metadata })
    }

    /// Pass-through speech-to-text transcription.
    pub async fn transcribe_audio(
        &self,
        audio: Vec<u8>,
        file_name: &str,
        content_type: &str,
    ) -> Result<String> {
        let part = reqwest::multipart::Part::bytes(audio)
            .file_name(file_name.to_string())
            .mime_str(content_type)
            .map_err(|_| {
                EngineError::Validation(format!("invalid audio content type '{}'", content_type))
            })?;
        let form = reqwest::multipart::Form::new().part("audio", part);

        let response = self
            .post("/analysis/speech-to-text")
            .multipart(form)
            .send()
            .await
            .map_err(unreachable_service)?;
        let response = check_status(response).await?;
        let body: TranscriptBody = decode_json(response).await?;
        Ok(body.text)
    }

    pub async fn reflection_provider(&self) -> Result<ProviderStatus> {
        let response = self
            .get("/settings/provider")
            .send()
            .await
            .map_err(unreachable_service)?;
        let response = check_status(response).await?;
        decode_json(response).await
    }

    /// Switch the reflection backend. Idempotent on the service side;
    /// unknown names are unrepresentable here, so nothing invalid is sent.
    pub async fn set_reflection_provider(
        &self,
        provider: ReflectionProvider,
    ) -> Result<ProviderStatus> {
        let body = serde_json::json!({ "provider": provider.as_str() });
        let response = self
            .post("/settings/provider")
            .json(&body)
            .send()
            .await
            .map_err(unreachable_service)?;
        let response = check_status(response).await?;
        decode_json(response).await
    }

    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.with_auth(self.client.get(format!("{}{}", self.base_url, path)))
    }

    fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.with_auth(self.client.post(format!("{}{}", self.base_url, path)))
    }

    fn with_auth(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => builder.header("Authorization", format!("Bearer {}", token)),
            None => builder,
        }
    }
}

/// Transport-level failure: logged in full, surfaced generically.
fn unreachable_service(error: reqwest::Error) -> EngineError {
    tracing::debug!("transport failure talking to analysis service: {}", error);
    EngineError::Remote("analysis service is unreachable".to_string())
}

/// Map non-success statuses to errors, preferring the service's own
/// `detail` message over anything transport-shaped.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let detail = serde_json::from_str::<ErrorBody>(&body)
        .ok()
        .and_then(|b| b.detail)
        .filter(|d| !d.trim().is_empty());

    if status == reqwest::StatusCode::NOT_FOUND {
        return Err(EngineError::NotFound(
            detail.unwrap_or_else(|| "entry not found".to_string()),
        ));
    }
    Err(EngineError::Remote(detail.unwrap_or_else(|| {
        format!("analysis service returned status {}", status.as_u16())
    })))
}

async fn decode_json<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let body = response.text().await.map_err(unreachable_service)?;
    serde_json::from_str(&body).map_err(|error| {
        tracing::warn!("undecodable service response: {}", error);
        EngineError::Remote("analysis service returned an unexpected response".to_string())
    })
}

/// Service ids arrive as integers from older deployments and strings from
/// newer ones; the engine treats them as opaque strings either way.
mod id_string {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Value::deserialize(deserializer)? {
            Value::String(id) => Ok(id),
            Value::Number(id) => Ok(id.to_string()),
            other => Err(serde::de::Error::custom(format!(
                "entry id must be a string or number, got {}",
                other
            ))),
        }
    }
}

/// The service emits RFC 3339 timestamps from newer deployments and naive
/// `YYYY-MM-DDTHH:MM:SS` (implicitly UTC) from older ones.
mod flexible_datetime {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer};

    use super::parse_service_datetime;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse_service_datetime(&raw).ok_or_else(|| {
            serde::de::Error::custom(format!("unparseable entry timestamp '{}'", raw))
        })
    }
}

fn parse_service_datetime(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(stamp) = DateTime::parse_from_rfc3339(raw) {
        return Some(stamp.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}
