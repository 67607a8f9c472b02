//! Consecutive-day journaling streak.
//!
//! Dates are bucketed by the viewer's wall clock, so the timezone rides in
//! on the `now` parameter instead of being read from ambient global state.

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};

/// Number of consecutive calendar days with at least one entry, counting
/// backward from the day of `now`. A streak is broken when today has no
/// entry: yesterday's run counts for nothing until today is covered.
/// Multiple entries on the same day count once; empty input is 0.
pub fn current_streak<Tz: TimeZone>(timestamps: &[DateTime<Utc>], now: &DateTime<Tz>) -> u32 {
    let tz = now.timezone();
    let dates: BTreeSet<NaiveDate> = timestamps
        .iter()
        .map(|ts| ts.with_timezone(&tz).date_naive())
        .collect();

    let today = now.date_naive();
    if !dates.contains(&today) {
        return 0;
    }

    let mut streak = 1;
    let mut cursor = today;
    while let Some(previous) = cursor.pred_opt() {
        if !dates.contains(&previous) {
            break;
        }
        streak += 1;
        cursor = previous;
    }
    streak
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, FixedOffset};

    fn day(offset_days: i64, now: &DateTime<Utc>) -> DateTime<Utc> {
        *now - Duration::days(offset_days)
    }

    fn noon_utc() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 11, 12, 0, 0).unwrap()
    }

    #[test]
    fn empty_input_is_zero() {
        assert_eq!(current_streak(&[], &noon_utc()), 0);
    }

    #[test]
    fn three_consecutive_days_ending_today() {
        let now = noon_utc();
        let stamps = vec![day(0, &now), day(1, &now), day(2, &now)];
        assert_eq!(current_streak(&stamps, &now), 3);
    }

    #[test]
    fn missing_today_breaks_the_streak() {
        let now = noon_utc();
        let stamps = vec![day(1, &now), day(2, &now)];
        assert_eq!(current_streak(&stamps, &now), 0);
    }

    #[test]
    fn gap_terminates_the_count() {
        let now = noon_utc();
        let stamps = vec![day(0, &now), day(1, &now), day(3, &now), day(4, &now)];
        assert_eq!(current_streak(&stamps, &now), 2);
    }

    #[test]
    fn duplicate_same_day_entries_count_once() {
        let now = noon_utc();
        let stamps = vec![day(0, &now), day(0, &now), day(1, &now)];
        assert_eq!(current_streak(&stamps, &now), 2);
    }

    #[test]
    fn viewer_timezone_decides_the_date_bucket() {
        // 22:00 UTC on March 10th is already March 11th at UTC+5.
        let entry = Utc.with_ymd_and_hms(2024, 3, 10, 22, 0, 0).unwrap();

        let kathmandu_ish = FixedOffset::east_opt(5 * 3600).unwrap();
        let now_east = kathmandu_ish.with_ymd_and_hms(2024, 3, 11, 10, 0, 0).unwrap();
        assert_eq!(current_streak(&[entry], &now_east), 1);

        let now_utc = Utc.with_ymd_and_hms(2024, 3, 11, 5, 0, 0).unwrap();
        assert_eq!(current_streak(&[entry], &now_utc), 0);
    }
}
