//! Emotion distribution over a time window.
//!
//! Works from either a normalized entry set or the pre-aggregated
//! label/count mapping the mood-stats endpoint returns. Pure and
//! idempotent; a zero-total window degrades to the neutral sentinel
//! instead of failing.

use chrono::{DateTime, Duration, TimeZone, Utc};

use super::streak::current_streak;
use crate::emotion::{taxonomy_rank, NEUTRAL_LABEL, TAXONOMY};
use crate::journal::JournalEntry;

/// Primary labels counted toward the positive ratio. Everything else,
/// confusion and mixed and the GoEmotions negatives included, is
/// non-positive for this computation.
pub const POSITIVE_RATIO_LABELS: [&str; 5] =
    ["joy", "surprise", "love", "happiness", "excitement"];

/// Time-bounded view over the entry set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoodWindow {
    Days(u32),
    All,
}

impl MoodWindow {
    pub const WEEK: MoodWindow = MoodWindow::Days(7);
    pub const MONTH: MoodWindow = MoodWindow::Days(30);
    pub const YEAR: MoodWindow = MoodWindow::Days(365);

    fn contains(&self, instant: &DateTime<Utc>, now: &DateTime<Utc>) -> bool {
        match self {
            MoodWindow::All => true,
            MoodWindow::Days(days) => *instant >= *now - Duration::days(i64::from(*days)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmotionStat {
    pub emotion: String,
    pub count: u64,
    /// Rounded percentage against total entries in the window, never
    /// against the per-label sum (multi-label inputs may overshoot 100
    /// in aggregate).
    pub percentage: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistributionResult {
    pub total_entries: u64,
    /// Descending by count; ties broken by taxonomy declaration order,
    /// labels outside the taxonomy after it in first-seen order.
    pub stats: Vec<EmotionStat>,
    pub most_common: String,
    pub positive_ratio: u8,
    pub streak: u32,
}

impl DistributionResult {
    fn empty(streak: u32) -> Self {
        DistributionResult {
            total_entries: 0,
            stats: Vec::new(),
            most_common: NEUTRAL_LABEL.to_string(),
            positive_ratio: 0,
            streak,
        }
    }
}

/// Aggregate a window over normalized entries into render-ready statistics.
/// The streak is computed over the same window, independently of whether
/// the distribution has any data.
pub fn window_snapshot<Tz: TimeZone>(
    entries: &[JournalEntry],
    window: MoodWindow,
    now: &DateTime<Tz>,
) -> DistributionResult {
    let now_utc = now.with_timezone(&Utc);
    let in_window: Vec<&JournalEntry> = entries
        .iter()
        .filter(|entry| window.contains(&entry.created_at, &now_utc))
        .collect();

    let timestamps: Vec<DateTime<Utc>> = in_window.iter().map(|e| e.created_at).collect();
    let streak = current_streak(&timestamps, now);

    let mut counts: Vec<(String, u64)> = Vec::new();
    let mut total = 0;
    for entry in &in_window {
        let label = entry.emotion.trim().to_ascii_lowercase();
        if label.is_empty() {
            continue;
        }
        total += 1;
        match counts.iter_mut().find(|(seen, _)| *seen == label) {
            Some((_, count)) => *count += 1,
            None => counts.push((label, 1)),
        }
    }

    aggregate(counts, total, streak)
}

/// Aggregate a pre-counted label/count mapping (the mood-stats endpoint
/// shape). `pairs` must be in source order so unknown-label ties stay
/// deterministic; the streak is supplied by the caller since the mapping
/// carries no timestamps.
pub fn from_counts(pairs: &[(String, u64)], total: u64, streak: u32) -> DistributionResult {
    let counts = pairs
        .iter()
        .filter(|(label, count)| !label.trim().is_empty() && *count > 0)
        .map(|(label, count)| (label.trim().to_ascii_lowercase(), *count))
        .collect();
    aggregate(counts, total, streak)
}

fn aggregate(counts: Vec<(String, u64)>, total: u64, streak: u32) -> DistributionResult {
    if total == 0 {
        return DistributionResult::empty(streak);
    }

    let positive: u64 = counts
        .iter()
        .filter(|(label, _)| POSITIVE_RATIO_LABELS.contains(&label.as_str()))
        .map(|(_, count)| count)
        .sum();

    let mut ranked: Vec<(usize, String, u64)> = counts
        .into_iter()
        .enumerate()
        .map(|(seen, (label, count))| {
            let rank = taxonomy_rank(&label).unwrap_or(TAXONOMY.len() + seen);
            (rank, label, count)
        })
        .collect();
    ranked.sort_by(|a, b| b.2.cmp(&a.2).then(a.0.cmp(&b.0)));

    let stats: Vec<EmotionStat> = ranked
        .into_iter()
        .map(|(_, emotion, count)| EmotionStat {
            percentage: percentage(count, total),
            emotion,
            count,
        })
        .collect();

    let most_common = stats
        .first()
        .map(|stat| stat.emotion.clone())
        .unwrap_or_else(|| NEUTRAL_LABEL.to_string());

    DistributionResult {
        total_entries: total,
        stats,
        most_common,
        positive_ratio: percentage(positive, total),
        streak,
    }
}

fn percentage(count: u64, total: u64) -> u8 {
    ((count as f64 / total as f64) * 100.0).round().min(100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(raw: &[(&str, u64)]) -> Vec<(String, u64)> {
        raw.iter().map(|(l, c)| (l.to_string(), *c)).collect()
    }

    #[test]
    fn counts_become_sorted_stats_with_percentages() {
        let result = from_counts(&pairs(&[("sadness", 4), ("joy", 6)]), 10, 0);

        assert_eq!(result.total_entries, 10);
        assert_eq!(result.stats.len(), 2);
        assert_eq!(result.stats[0].emotion, "joy");
        assert_eq!(result.stats[0].percentage, 60);
        assert_eq!(result.stats[1].emotion, "sadness");
        assert_eq!(result.stats[1].percentage, 40);
        assert_eq!(result.most_common, "joy");
        assert_eq!(result.positive_ratio, 60);
    }

    #[test]
    fn zero_total_degrades_to_neutral_sentinel() {
        let result = from_counts(&[], 0, 4);
        assert!(result.stats.is_empty());
        assert_eq!(result.most_common, "neutral");
        assert_eq!(result.positive_ratio, 0);
        // Streak is not gated on the distribution having data.
        assert_eq!(result.streak, 4);
    }

    #[test]
    fn equal_counts_tie_break_by_taxonomy_order() {
        // "anger" precedes "sadness" in the taxonomy declaration.
        let result = from_counts(&pairs(&[("sadness", 3), ("anger", 3)]), 6, 0);
        assert_eq!(result.stats[0].emotion, "anger");
        assert_eq!(result.stats[1].emotion, "sadness");
        assert_eq!(result.most_common, "anger");
    }

    #[test]
    fn unknown_labels_rank_after_the_taxonomy() {
        let result = from_counts(&pairs(&[("zeal", 2), ("joy", 2)]), 4, 0);
        assert_eq!(result.stats[0].emotion, "joy");
        assert_eq!(result.stats[1].emotion, "zeal");
    }

    #[test]
    fn positive_ratio_ignores_non_positive_labels() {
        let result = from_counts(
            &pairs(&[("joy", 3), ("confusion", 3), ("sadness", 2), ("love", 2)]),
            10,
            0,
        );
        assert_eq!(result.positive_ratio, 50);
    }

    #[test]
    fn malformed_pairs_are_filtered_not_fatal() {
        let result = from_counts(&pairs(&[("", 5), ("joy", 2), ("fear", 0)]), 2, 0);
        assert_eq!(result.stats.len(), 1);
        assert_eq!(result.stats[0].emotion, "joy");
    }

    #[test]
    fn aggregation_is_idempotent() {
        let input = pairs(&[("joy", 6), ("sadness", 4)]);
        let first = from_counts(&input, 10, 2);
        let second = from_counts(&input, 10, 2);
        assert_eq!(first, second);
    }

    mod windows {
        use super::*;
        use chrono::TimeZone;

        fn entry(emotion: &str, days_ago: i64, now: &DateTime<Utc>) -> JournalEntry {
            JournalEntry {
                id: format!("{}-{}", emotion, days_ago),
                author_id: "viewer".to_string(),
                content: String::new(),
                created_at: *now - Duration::days(days_ago),
                is_voice: false,
                emotion: emotion.to_string(),
                emotion_metadata: None,
                reflection: None,
                reflection_metadata: None,
            }
        }

        #[test]
        fn week_window_excludes_older_entries() {
            let now = Utc.with_ymd_and_hms(2024, 3, 11, 12, 0, 0).unwrap();
            let entries = vec![
                entry("joy", 0, &now),
                entry("joy", 1, &now),
                entry("sadness", 2, &now),
                entry("anger", 20, &now),
            ];

            let week = window_snapshot(&entries, MoodWindow::WEEK, &now);
            assert_eq!(week.total_entries, 3);
            assert_eq!(week.most_common, "joy");
            assert_eq!(week.streak, 3);

            let all = window_snapshot(&entries, MoodWindow::All, &now);
            assert_eq!(all.total_entries, 4);
        }

        #[test]
        fn entries_without_a_label_are_skipped() {
            let now = Utc.with_ymd_and_hms(2024, 3, 11, 12, 0, 0).unwrap();
            let entries = vec![entry("joy", 0, &now), entry("  ", 0, &now)];

            let result = window_snapshot(&entries, MoodWindow::All, &now);
            assert_eq!(result.total_entries, 1);
            assert_eq!(result.stats.len(), 1);
            // The unlabeled entry still counts toward the streak.
            assert_eq!(result.streak, 1);
        }
    }
}
