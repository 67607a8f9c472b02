//! Per-entry render-state selection.
//!
//! Three terminal states: confused, mixed, single. Confusion outranks
//! mixed even when both flags are set. A pure function of the metadata
//! snapshot; nothing is retained between renders.

use super::{style_for, EmotionMetadata, EmotionStyle, CONFUSION_LABEL};

const MAX_CONFUSED_SECONDARIES: usize = 2;
const MAX_MIXED_SUB_BADGES: usize = 3;

/// A significant emotion rendered beneath a mixed-feelings headline.
#[derive(Debug, Clone, PartialEq)]
pub struct SubBadge {
    pub label: String,
    pub confidence_pct: u8,
    pub style: EmotionStyle,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EntryBadge {
    /// Confusion is significant for this entry. `primary` carries the
    /// primary emotion as a secondary annotation when it is not itself
    /// "confusion"; `others` lists up to two further significant emotions.
    Confused {
        style: EmotionStyle,
        primary: Option<String>,
        others: Vec<String>,
    },
    /// Genuinely mixed feelings: a generic headline plus sub-badges.
    Mixed { emotions: Vec<SubBadge> },
    /// The default: one primary emotion with its display style.
    Single { label: String, style: EmotionStyle },
}

/// Decide how one entry's classification is presented.
pub fn classify_entry(primary: &str, metadata: Option<&EmotionMetadata>) -> EntryBadge {
    let primary = primary.trim().to_ascii_lowercase();

    if let Some(meta) = metadata {
        if meta.has_confusion {
            let annotation = if primary.is_empty() || primary == CONFUSION_LABEL {
                None
            } else {
                Some(primary.clone())
            };
            let others = meta
                .significant_emotions
                .iter()
                .filter(|e| e.label != CONFUSION_LABEL && e.label != primary)
                .take(MAX_CONFUSED_SECONDARIES)
                .map(|e| e.label.clone())
                .collect();
            return EntryBadge::Confused {
                style: style_for(CONFUSION_LABEL),
                primary: annotation,
                others,
            };
        }

        // The flag alone is not enough: a mixed badge with one sub-emotion
        // would be indistinguishable from a single classification.
        if meta.is_mixed && meta.significant_emotions.len() > 1 {
            let emotions = meta
                .significant_emotions
                .iter()
                .take(MAX_MIXED_SUB_BADGES)
                .map(|e| SubBadge {
                    label: e.label.clone(),
                    confidence_pct: percentage(e.score),
                    style: style_for(&e.label),
                })
                .collect();
            return EntryBadge::Mixed { emotions };
        }
    }

    EntryBadge::Single {
        style: style_for(&primary),
        label: primary,
    }
}

fn percentage(score: f64) -> u8 {
    (score.clamp(0.0, 1.0) * 100.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emotion::{EmotionalState, SignificantEmotion};

    fn metadata(
        significant: Vec<(&str, f64)>,
        is_mixed: bool,
        has_confusion: bool,
    ) -> EmotionMetadata {
        let mut meta = EmotionMetadata::empty();
        meta.significant_emotions = significant
            .into_iter()
            .map(|(label, score)| SignificantEmotion {
                label: label.to_string(),
                score,
            })
            .collect();
        meta.is_mixed = is_mixed;
        meta.has_confusion = has_confusion;
        meta.emotional_state = EmotionalState::derive(is_mixed, has_confusion);
        meta
    }

    #[test]
    fn confusion_outranks_mixed() {
        let meta = metadata(
            vec![("confusion", 0.6), ("sadness", 0.5), ("joy", 0.4)],
            true,
            true,
        );
        match classify_entry("sadness", Some(&meta)) {
            EntryBadge::Confused { primary, others, .. } => {
                assert_eq!(primary.as_deref(), Some("sadness"));
                assert_eq!(others, vec!["joy".to_string()]);
            }
            other => panic!("expected confused badge, got {:?}", other),
        }
    }

    #[test]
    fn confused_primary_annotation_skipped_when_primary_is_confusion() {
        let meta = metadata(vec![("confusion", 0.7), ("fear", 0.4)], false, true);
        match classify_entry("confusion", Some(&meta)) {
            EntryBadge::Confused { primary, others, .. } => {
                assert_eq!(primary, None);
                assert_eq!(others, vec!["fear".to_string()]);
            }
            other => panic!("expected confused badge, got {:?}", other),
        }
    }

    #[test]
    fn mixed_flag_with_one_significant_emotion_falls_through_to_single() {
        // A lying is_mixed flag must not produce a mixed badge.
        let meta = metadata(vec![("joy", 0.9)], true, false);
        match classify_entry("joy", Some(&meta)) {
            EntryBadge::Single { label, .. } => assert_eq!(label, "joy"),
            other => panic!("expected single badge, got {:?}", other),
        }
    }

    #[test]
    fn mixed_renders_up_to_three_sub_badges_with_percentages() {
        let meta = metadata(
            vec![
                ("joy", 0.62),
                ("nervousness", 0.44),
                ("gratitude", 0.35),
                ("surprise", 0.31),
            ],
            true,
            false,
        );
        match classify_entry("joy", Some(&meta)) {
            EntryBadge::Mixed { emotions } => {
                assert_eq!(emotions.len(), 3);
                assert_eq!(emotions[0].label, "joy");
                assert_eq!(emotions[0].confidence_pct, 62);
                assert_eq!(emotions[1].confidence_pct, 44);
            }
            other => panic!("expected mixed badge, got {:?}", other),
        }
    }

    #[test]
    fn unrecognized_label_renders_with_neutral_style() {
        match classify_entry("Bewilderment", None) {
            EntryBadge::Single { label, style } => {
                assert_eq!(label, "bewilderment");
                assert_eq!(style.label, "Neutral");
            }
            other => panic!("expected single badge, got {:?}", other),
        }
    }
}
