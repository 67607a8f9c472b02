//! Emotion taxonomy and the canonical metadata shape every derivation
//! path operates on, regardless of which payload version it came from.

mod normalize;
mod presenter;

pub use normalize::normalize_metadata;
pub use presenter::{classify_entry, EntryBadge, SubBadge};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// GoEmotions 27 labels, in declaration order. Declaration order is the
/// tie-break for equal counts in distribution output.
pub const TAXONOMY: [&str; 27] = [
    "admiration",
    "amusement",
    "anger",
    "annoyance",
    "approval",
    "caring",
    "confusion",
    "curiosity",
    "desire",
    "disappointment",
    "disapproval",
    "disgust",
    "embarrassment",
    "excitement",
    "fear",
    "gratitude",
    "grief",
    "joy",
    "love",
    "nervousness",
    "optimism",
    "pride",
    "realization",
    "relief",
    "remorse",
    "sadness",
    "surprise",
];

pub const NEUTRAL_LABEL: &str = "neutral";
pub const MIXED_LABEL: &str = "mixed";
pub const CONFUSION_LABEL: &str = "confusion";

/// Minimum score for a label to qualify as a significant emotion.
pub const SIGNIFICANCE_THRESHOLD: f64 = 0.3;

// Valence groupings from the classifier's label set.
pub const POSITIVE_GROUP: [&str; 11] = [
    "admiration",
    "amusement",
    "approval",
    "caring",
    "excitement",
    "gratitude",
    "joy",
    "love",
    "optimism",
    "pride",
    "relief",
];

pub const NEGATIVE_GROUP: [&str; 11] = [
    "anger",
    "annoyance",
    "disappointment",
    "disapproval",
    "disgust",
    "embarrassment",
    "fear",
    "grief",
    "nervousness",
    "remorse",
    "sadness",
];

pub const NEUTRAL_GROUP: [&str; 5] = [
    "confusion",
    "curiosity",
    "desire",
    "realization",
    "surprise",
];

/// Position of a label in the taxonomy, `None` for labels outside it.
pub fn taxonomy_rank(label: &str) -> Option<usize> {
    TAXONOMY.iter().position(|known| *known == label)
}

/// One label scored above the significance threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignificantEmotion {
    pub label: String,
    #[serde(rename = "confidence")]
    pub score: f64,
}

/// Quick display-routing descriptor, always derived from the flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmotionalState {
    Clear,
    Mixed,
    Confused,
}

impl EmotionalState {
    pub fn derive(is_mixed: bool, has_confusion: bool) -> Self {
        if has_confusion {
            EmotionalState::Confused
        } else if is_mixed {
            EmotionalState::Mixed
        } else {
            EmotionalState::Clear
        }
    }
}

/// Canonical emotion metadata.
///
/// Invariants maintained by the normalizer:
/// - `is_mixed` implies `significant_emotions.len() >= 2`
/// - `has_confusion` implies a "confusion" entry among the significant
///   emotions (confusion does not have to be the primary label)
/// - `significant_emotions` is sorted descending by score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionMetadata {
    pub confidence: f64,
    pub all_scores: BTreeMap<String, f64>,
    pub significant_emotions: Vec<SignificantEmotion>,
    pub is_mixed: bool,
    pub has_confusion: bool,
    pub emotional_state: EmotionalState,
}

impl EmotionMetadata {
    /// Empty-but-valid metadata, the degraded result for malformed payloads.
    pub fn empty() -> Self {
        EmotionMetadata {
            confidence: 0.0,
            all_scores: BTreeMap::new(),
            significant_emotions: Vec::new(),
            is_mixed: false,
            has_confusion: false,
            emotional_state: EmotionalState::Clear,
        }
    }

    /// Normalized positive/negative/neutral leanings over `all_scores`.
    pub fn valence(&self) -> Valence {
        let sum_of = |group: &[&str]| -> f64 {
            group
                .iter()
                .filter_map(|label| self.all_scores.get(*label))
                .sum()
        };

        let positive = sum_of(&POSITIVE_GROUP);
        let negative = sum_of(&NEGATIVE_GROUP);
        let neutral = sum_of(&NEUTRAL_GROUP);
        let total = positive + negative + neutral;

        if total == 0.0 {
            return Valence {
                positive: 0.0,
                negative: 0.0,
                neutral: 1.0,
                overall: ValenceLeaning::Neutral,
            };
        }

        let positive = positive / total;
        let negative = negative / total;
        let neutral = neutral / total;

        let overall = if positive > 0.5 {
            ValenceLeaning::Positive
        } else if negative > 0.5 {
            ValenceLeaning::Negative
        } else {
            ValenceLeaning::Neutral
        };

        Valence {
            positive,
            negative,
            neutral,
            overall,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Valence {
    pub positive: f64,
    pub negative: f64,
    pub neutral: f64,
    pub overall: ValenceLeaning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValenceLeaning {
    Positive,
    Negative,
    Neutral,
}

/// Display configuration for one emotion label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmotionStyle {
    pub label: &'static str,
    pub color: &'static str,
    pub icon: &'static str,
}

const NEUTRAL_STYLE: EmotionStyle = EmotionStyle {
    label: "Neutral",
    color: "#6b7280",
    icon: "meh",
};

/// Display style for a label; unknown labels get the neutral style so
/// rendering never fails on unrecognized classifier output.
pub fn style_for(label: &str) -> EmotionStyle {
    match label {
        "admiration" => EmotionStyle { label: "Admiration", color: "#8b5cf6", icon: "thumbs-up" },
        "amusement" => EmotionStyle { label: "Amusement", color: "#f59e0b", icon: "smile" },
        "anger" => EmotionStyle { label: "Anger", color: "#ef4444", icon: "x-circle" },
        "annoyance" => EmotionStyle { label: "Annoyance", color: "#f97316", icon: "x-circle" },
        "approval" => EmotionStyle { label: "Approval", color: "#3b82f6", icon: "thumbs-up" },
        "caring" => EmotionStyle { label: "Caring", color: "#ec4899", icon: "heart" },
        "confusion" => EmotionStyle { label: "Confusion", color: "#f97316", icon: "help-circle" },
        "curiosity" => EmotionStyle { label: "Curiosity", color: "#3b82f6", icon: "help-circle" },
        "desire" => EmotionStyle { label: "Desire", color: "#ec4899", icon: "heart" },
        "disappointment" => EmotionStyle { label: "Disappointment", color: "#6b7280", icon: "frown" },
        "disapproval" => EmotionStyle { label: "Disapproval", color: "#ef4444", icon: "x-circle" },
        "disgust" => EmotionStyle { label: "Disgust", color: "#ef4444", icon: "x-circle" },
        "embarrassment" => EmotionStyle { label: "Embarrassment", color: "#ec4899", icon: "frown" },
        "excitement" => EmotionStyle { label: "Excitement", color: "#f59e0b", icon: "zap" },
        "fear" => EmotionStyle { label: "Fear", color: "#8b5cf6", icon: "alert-circle" },
        "gratitude" => EmotionStyle { label: "Gratitude", color: "#14b8a6", icon: "heart" },
        "grief" => EmotionStyle { label: "Grief", color: "#6b7280", icon: "frown" },
        "joy" => EmotionStyle { label: "Joy", color: "#10b981", icon: "smile" },
        "love" => EmotionStyle { label: "Love", color: "#ec4899", icon: "heart" },
        "nervousness" => EmotionStyle { label: "Nervousness", color: "#8b5cf6", icon: "alert-circle" },
        "optimism" => EmotionStyle { label: "Optimism", color: "#10b981", icon: "trending-up" },
        "pride" => EmotionStyle { label: "Pride", color: "#f97316", icon: "trending-up" },
        "realization" => EmotionStyle { label: "Realization", color: "#3b82f6", icon: "zap" },
        "relief" => EmotionStyle { label: "Relief", color: "#10b981", icon: "smile" },
        "remorse" => EmotionStyle { label: "Remorse", color: "#6b7280", icon: "frown" },
        "sadness" => EmotionStyle { label: "Sadness", color: "#3b82f6", icon: "frown" },
        "surprise" => EmotionStyle { label: "Surprise", color: "#f59e0b", icon: "zap" },
        "mixed" => EmotionStyle { label: "Mixed Feelings", color: "#8b5cf6", icon: "help-circle" },
        "neutral" => NEUTRAL_STYLE,
        _ => NEUTRAL_STYLE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn taxonomy_has_distinct_labels() {
        for (i, label) in TAXONOMY.iter().enumerate() {
            assert_eq!(taxonomy_rank(label), Some(i));
        }
        assert_eq!(taxonomy_rank("neutral"), None);
    }

    #[test]
    fn unknown_label_falls_back_to_neutral_style() {
        assert_eq!(style_for("bewilderment"), style_for("neutral"));
        assert_eq!(style_for("joy").icon, "smile");
    }

    #[test]
    fn valence_of_empty_scores_is_neutral() {
        let meta = EmotionMetadata::empty();
        let valence = meta.valence();
        assert_eq!(valence.overall, ValenceLeaning::Neutral);
        assert_eq!(valence.neutral, 1.0);
    }

    #[test]
    fn valence_normalizes_across_groups() {
        let mut meta = EmotionMetadata::empty();
        meta.all_scores.insert("joy".to_string(), 0.6);
        meta.all_scores.insert("sadness".to_string(), 0.2);
        let valence = meta.valence();
        assert_eq!(valence.overall, ValenceLeaning::Positive);
        assert!((valence.positive - 0.75).abs() < 1e-9);
    }
}
