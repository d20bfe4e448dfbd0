use crate::series::NormalizedCalendar;
use crate::types::{AggregateStats, Consistency, RateStats};
use crate::utils::{round1, round2};

/// Compute streaks, totals, and the most productive day in a single pass
/// over the series.
///
/// `current_streak` is the run of non-zero days ending at the series' last
/// day. Ties for the highest contribution go to the earliest date. An empty
/// series yields all zeroes and no highest date; this is also what callers
/// fall back to when the payload was malformed.
pub fn aggregate(calendar: &NormalizedCalendar) -> AggregateStats {
    let series = &calendar.series;

    let mut current_streak: u32 = 0;
    let mut longest_streak: u32 = 0;
    let mut active_days: u32 = 0;
    let mut highest: u32 = 0;
    let mut highest_date = None;

    for day in series.days() {
        if day.count > 0 {
            current_streak += 1;
            longest_streak = longest_streak.max(current_streak);
            active_days += 1;
        } else {
            current_streak = 0;
        }

        // Strictly greater keeps the earliest date on ties.
        if day.count > highest {
            highest = day.count;
            highest_date = Some(day.date);
        }
    }

    let reported = calendar.public_contributions + calendar.private_contributions;
    let total_contributions = if reported > 0 {
        reported
    } else {
        // Payload carried no totals; fall back to summing the series.
        series.total()
    };

    AggregateStats {
        total_contributions,
        public_contributions: calendar.public_contributions,
        private_contributions: calendar.private_contributions,
        highest_contribution: highest,
        highest_contribution_date: highest_date,
        current_streak,
        longest_streak,
        active_days,
        total_days: series.len() as u32,
    }
}

/// Contribution rate and consistency classification for a window.
///
/// Zero `total_days` is a designed edge case, not a fault: the rate is 0.0
/// and the classification is `NoActivity`. The score is clamped to
/// `[0, 100]`, rounded to 1 decimal, and classified on the rounded value so
/// the label always matches the displayed number.
pub fn rates(total_contributions: u64, active_days: u32, total_days: u32) -> RateStats {
    if total_days == 0 {
        return RateStats {
            contribution_rate: 0.0,
            consistency_score: 0.0,
            consistency: Consistency::NoActivity,
        };
    }

    let contribution_rate = round2(total_contributions as f64 / total_days as f64);
    let raw_score = (active_days as f64 / total_days as f64) * 100.0;
    let consistency_score = round1(raw_score.clamp(0.0, 100.0));

    let consistency = if consistency_score >= 80.0 {
        Consistency::HighlyConsistent
    } else if consistency_score >= 50.0 {
        Consistency::Regular
    } else if consistency_score >= 25.0 {
        Consistency::Occasional
    } else {
        Consistency::Sporadic
    };

    RateStats {
        contribution_rate,
        consistency_score,
        consistency,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ContributionDay, ContributionSeries};
    use chrono::NaiveDate;

    fn aggregate_series(series: &ContributionSeries) -> AggregateStats {
        aggregate(&NormalizedCalendar {
            series: series.clone(),
            public_contributions: 0,
            private_contributions: 0,
        })
    }

    fn series(counts: &[u32]) -> ContributionSeries {
        let start = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let days = counts
            .iter()
            .enumerate()
            .map(|(i, &count)| ContributionDay {
                date: start + chrono::Days::new(i as u64),
                count,
            })
            .collect();
        ContributionSeries::from_days(days)
    }

    #[test]
    fn streaks_and_highest_day() {
        // 5 consecutive days: [0, 3, 0, 5, 2]
        let stats = aggregate_series(&series(&[0, 3, 0, 5, 2]));

        assert_eq!(stats.current_streak, 2);
        assert_eq!(stats.longest_streak, 2);
        assert_eq!(stats.highest_contribution, 5);
        assert_eq!(
            stats.highest_contribution_date,
            NaiveDate::from_ymd_opt(2025, 3, 4)
        );
        assert_eq!(stats.active_days, 3);
        assert_eq!(stats.total_days, 5);
        assert_eq!(stats.total_contributions, 10);
    }

    #[test]
    fn current_streak_is_trailing_run() {
        let stats = aggregate_series(&series(&[1, 1, 1, 0, 2, 4]));
        assert_eq!(stats.current_streak, 2);
        assert_eq!(stats.longest_streak, 3);

        // Trailing zero resets the current streak but not the longest.
        let stats = aggregate_series(&series(&[1, 1, 1, 0]));
        assert_eq!(stats.current_streak, 0);
        assert_eq!(stats.longest_streak, 3);
    }

    #[test]
    fn longest_streak_never_below_current() {
        for counts in [
            &[0u32, 0, 0][..],
            &[1, 2, 3],
            &[5],
            &[0, 1, 0, 1, 1],
            &[3, 0, 0, 7, 7, 7, 7],
        ] {
            let stats = aggregate_series(&series(counts));
            assert!(
                stats.longest_streak >= stats.current_streak,
                "violated for {counts:?}"
            );
        }
    }

    #[test]
    fn all_zero_series_has_no_streaks() {
        let stats = aggregate_series(&series(&[0, 0, 0, 0]));
        assert_eq!(stats.current_streak, 0);
        assert_eq!(stats.longest_streak, 0);
        assert_eq!(stats.active_days, 0);
        assert_eq!(stats.highest_contribution, 0);
        assert_eq!(stats.highest_contribution_date, None);
    }

    #[test]
    fn highest_contribution_tie_goes_to_earliest_date() {
        let stats = aggregate_series(&series(&[2, 5, 1, 5]));
        assert_eq!(stats.highest_contribution, 5);
        assert_eq!(
            stats.highest_contribution_date,
            NaiveDate::from_ymd_opt(2025, 3, 2)
        );
    }

    #[test]
    fn empty_series_yields_zeroes() {
        let stats = aggregate_series(&ContributionSeries::default());
        assert_eq!(stats.total_contributions, 0);
        assert_eq!(stats.total_days, 0);
        assert_eq!(stats.highest_contribution_date, None);
    }

    #[test]
    fn reported_totals_win_over_series_sum() {
        let calendar = NormalizedCalendar {
            series: series(&[1, 1]),
            public_contributions: 100,
            private_contributions: 25,
        };
        let stats = aggregate(&calendar);
        assert_eq!(stats.total_contributions, 125);
        assert_eq!(stats.public_contributions, 100);
        assert_eq!(stats.private_contributions, 25);
    }

    #[test]
    fn rate_and_consistency_for_regular_contributor() {
        // 200 active days over 365 → 54.8%, "regular".
        let rates = rates(1000, 200, 365);
        assert_eq!(rates.consistency_score, 54.8);
        assert_eq!(rates.consistency, Consistency::Regular);
        assert_eq!(rates.contribution_rate, 2.74);
    }

    #[test]
    fn zero_days_is_no_activity_not_an_error() {
        let rates = rates(0, 0, 0);
        assert_eq!(rates.contribution_rate, 0.0);
        assert_eq!(rates.consistency_score, 0.0);
        assert_eq!(rates.consistency, Consistency::NoActivity);
    }

    #[test]
    fn consistency_thresholds_closed_lower_bound() {
        assert_eq!(rates(0, 80, 100).consistency, Consistency::HighlyConsistent);
        assert_eq!(rates(0, 100, 100).consistency, Consistency::HighlyConsistent);
        assert_eq!(rates(0, 79, 100).consistency, Consistency::Regular);
        assert_eq!(rates(0, 50, 100).consistency, Consistency::Regular);
        assert_eq!(rates(0, 49, 100).consistency, Consistency::Occasional);
        assert_eq!(rates(0, 25, 100).consistency, Consistency::Occasional);
        assert_eq!(rates(0, 24, 100).consistency, Consistency::Sporadic);
        assert_eq!(rates(0, 0, 100).consistency, Consistency::Sporadic);
    }

    #[test]
    fn consistency_score_stays_in_bounds() {
        // active_days > total_days shouldn't happen, but the score still
        // clamps to 100.
        let rates = rates(10, 20, 10);
        assert_eq!(rates.consistency_score, 100.0);
    }
}
