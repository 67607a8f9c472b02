//! Derived statistics over the normalized entry set. Everything here is
//! synchronous, pure, and reentrant; safe to recompute on every render.

mod distribution;
mod streak;

pub use distribution::{
    from_counts, window_snapshot, DistributionResult, EmotionStat, MoodWindow,
    POSITIVE_RATIO_LABELS,
};
pub use streak::current_streak;
