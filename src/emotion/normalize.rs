//! Reconciles the two historical emotion payload shapes into the canonical
//! [`EmotionMetadata`]:
//!
//! 1. Structured metadata (object, or a serialized JSON string) wins.
//! 2. The legacy flat label-to-score map (object or serialized string)
//!    is the fallback.
//! 3. Neither present: `None`, meaning "unclassified".
//!
//! This is the single normalization point for every ingestion path. It is
//! pure and never fails: malformed payloads degrade to an empty-but-valid
//! object and a logged data-quality warning.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

use super::{
    EmotionMetadata, EmotionalState, SignificantEmotion, CONFUSION_LABEL,
    SIGNIFICANCE_THRESHOLD,
};

/// Lenient mirror of the structured wire shape. Extra service fields
/// (mixed_type, complexity, valence, model, ...) are ignored.
#[derive(Debug, Default, Deserialize)]
struct RawStructured {
    #[serde(default)]
    confidence: Option<f64>,
    #[serde(default)]
    all_scores: Option<Value>,
    #[serde(default)]
    significant_emotions: Option<Vec<SignificantEmotion>>,
    #[serde(default)]
    is_mixed: Option<bool>,
    #[serde(default)]
    has_confusion: Option<bool>,
}

/// Normalize one raw entry payload of unknown shape.
///
/// `metadata_field` is the structured form, `scores_field` the legacy flat
/// score map; either may arrive as an object or as serialized JSON text.
/// Returns `None` only when no emotion information is present at all;
/// callers must treat that as "unclassified", distinct from an empty or
/// neutral classification.
pub fn normalize_metadata(
    metadata_field: Option<&Value>,
    scores_field: Option<&Value>,
) -> Option<EmotionMetadata> {
    if let Some(raw) = metadata_field {
        return Some(from_structured(raw));
    }
    if let Some(raw) = scores_field {
        return Some(from_flat_scores(raw));
    }
    None
}

fn from_structured(raw: &Value) -> EmotionMetadata {
    let value = match materialize(raw) {
        Some(value) => value,
        None => {
            tracing::warn!("unparseable structured emotion metadata; using empty metadata");
            return EmotionMetadata::empty();
        }
    };

    let parsed: RawStructured = match serde_json::from_value(value) {
        Ok(parsed) => parsed,
        Err(error) => {
            tracing::warn!(
                "malformed structured emotion metadata ({}); using empty metadata",
                error
            );
            return EmotionMetadata::empty();
        }
    };

    let all_scores = parsed
        .all_scores
        .as_ref()
        .map(numeric_scores)
        .unwrap_or_default();

    let mut significant = match parsed.significant_emotions {
        Some(significant) => significant,
        None => significant_from_scores(&all_scores),
    };
    sort_descending(&mut significant);

    let confidence = parsed
        .confidence
        .or_else(|| significant.first().map(|e| e.score))
        .unwrap_or(0.0);

    // Flags are reconciled with the canonical invariants: a mixed flag
    // needs at least two significant emotions behind it, and a confusion
    // flag needs an actual confusion entry in the significant list.
    let contains_confusion = significant.iter().any(|e| e.label == CONFUSION_LABEL);
    let is_mixed = parsed.is_mixed.unwrap_or(significant.len() >= 2) && significant.len() >= 2;
    let has_confusion = parsed.has_confusion.unwrap_or(true) && contains_confusion;

    EmotionMetadata {
        confidence,
        all_scores,
        significant_emotions: significant,
        is_mixed,
        has_confusion,
        emotional_state: EmotionalState::derive(is_mixed, has_confusion),
    }
}

fn from_flat_scores(raw: &Value) -> EmotionMetadata {
    let value = match materialize(raw) {
        Some(value) => value,
        None => {
            tracing::warn!("unparseable legacy emotion scores; using empty metadata");
            return EmotionMetadata::empty();
        }
    };

    let all_scores = numeric_scores(&value);
    let mut significant = significant_from_scores(&all_scores);
    sort_descending(&mut significant);

    let confidence = significant.first().map(|e| e.score).unwrap_or(0.0);
    let is_mixed = significant.len() >= 2;
    let has_confusion = significant.iter().any(|e| e.label == CONFUSION_LABEL);

    EmotionMetadata {
        confidence,
        all_scores,
        significant_emotions: significant,
        is_mixed,
        has_confusion,
        emotional_state: EmotionalState::derive(is_mixed, has_confusion),
    }
}

/// Accepts a payload that is either already JSON or a serialized string of
/// JSON. Returns `None` when the text does not parse.
fn materialize(raw: &Value) -> Option<Value> {
    match raw {
        Value::String(text) => serde_json::from_str(text).ok(),
        other => Some(other.clone()),
    }
}

/// Keeps numeric score entries, silently dropping anything malformed. This
/// is the consolidated defensive pass; downstream aggregation assumes
/// well-formed scores.
fn numeric_scores(value: &Value) -> BTreeMap<String, f64> {
    let mut scores = BTreeMap::new();
    if let Value::Object(map) = value {
        for (label, score) in map {
            if let Some(score) = score.as_f64() {
                scores.insert(label.clone(), score);
            }
        }
    }
    scores
}

fn significant_from_scores(all_scores: &BTreeMap<String, f64>) -> Vec<SignificantEmotion> {
    all_scores
        .iter()
        .filter(|(_, score)| **score > SIGNIFICANCE_THRESHOLD)
        .map(|(label, score)| SignificantEmotion {
            label: label.clone(),
            score: *score,
        })
        .collect()
}

fn sort_descending(significant: &mut [SignificantEmotion]) {
    significant.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
}
