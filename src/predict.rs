//! Activity trend heuristics.
//!
//! The burnout and longevity projections are deliberately simple linear
//! extrapolations of percent change, preserved as documented heuristics.
//! They are honest about what they are: dashboard copy, not forecasts.

use crate::types::{BurnoutTrend, Longevity, Trend, TrendSnapshot};
use crate::utils::{round1, round2};

/// Activity floor (active days per year) below which the longevity
/// projection considers the account dormant.
const LONGEVITY_FLOOR: f64 = 10.0;
/// Projection horizon in years.
const LONGEVITY_HORIZON: u32 = 10;

/// Compare the current-period contribution rate against the lifetime rate.
///
/// Returns `InsufficientData` with zeroed rates when either denominator is
/// zero: a brand-new or fully dormant account supports no conclusion. Both
/// rates are rounded to 2 decimals and the trend is decided on the rounded
/// values, keeping it consistent with what is displayed.
pub fn predict_long_term_activity(
    total_contributions: u64,
    total_days: i64,
    current_period_contributions: u64,
    active_days: u32,
) -> TrendSnapshot {
    if total_days == 0 || active_days == 0 {
        return TrendSnapshot {
            lifetime_rate: 0.0,
            current_rate: 0.0,
            trend: Trend::InsufficientData,
        };
    }

    let lifetime_rate = round2(total_contributions as f64 / total_days as f64);
    let current_rate = round2(current_period_contributions as f64 / active_days as f64);

    let trend = if current_rate > lifetime_rate {
        Trend::Increasing
    } else if current_rate == lifetime_rate {
        Trend::Stable
    } else {
        Trend::Decreasing
    };

    TrendSnapshot {
        lifetime_rate,
        current_rate,
        trend,
    }
}

/// Expected active days over the remaining period, extrapolated from the
/// historical active-day ratio. 0.0 when there is no history.
pub fn predict_future_active_days(active_days: u32, total_days: i64, remaining_days: i64) -> f64 {
    if total_days == 0 {
        return 0.0;
    }

    let activity_rate = active_days as f64 / total_days as f64;
    round1(activity_rate * remaining_days as f64)
}

/// Average percent change between consecutive periods of a most-recent-first
/// history. A zero previous period contributes a 0% change rather than a
/// division fault.
fn average_percent_change(history: &[u32]) -> Option<f64> {
    if history.len() < 2 {
        return None;
    }

    let changes: Vec<f64> = history
        .windows(2)
        .map(|pair| {
            let (curr, prev) = (pair[0] as f64, pair[1] as f64);
            if prev > 0.0 {
                (curr - prev) / prev * 100.0
            } else {
                0.0
            }
        })
        .collect();

    Some(changes.iter().sum::<f64>() / changes.len() as f64)
}

/// Classify the year-over-year activity trend from per-period active-day
/// counts, most recent first. Needs at least two periods.
pub fn predict_burnout(history: &[u32]) -> BurnoutTrend {
    let Some(avg_change) = average_percent_change(history) else {
        return BurnoutTrend::InsufficientData;
    };

    if avg_change < -20.0 {
        BurnoutTrend::BurnoutRisk
    } else if avg_change < -5.0 {
        BurnoutTrend::GradualDecrease
    } else if avg_change > 20.0 {
        BurnoutTrend::SignificantIncrease
    } else if avg_change > 5.0 {
        BurnoutTrend::GradualIncrease
    } else {
        BurnoutTrend::Stable
    }
}

/// Project how long the account stays active, compounding the average
/// fractional year-over-year decline against the most recent period until
/// the activity floor or the 10-year horizon is hit.
pub fn predict_account_longevity(history: &[u32]) -> Longevity {
    let Some(avg_change) = average_percent_change(history) else {
        return Longevity::InsufficientData;
    };
    let avg_change = avg_change / 100.0;

    if avg_change >= 0.0 {
        return Longevity::Sustained;
    }

    let mut projected = history[0] as f64;
    let mut years: u32 = 0;
    while projected > LONGEVITY_FLOOR && years < LONGEVITY_HORIZON {
        projected *= 1.0 + avg_change;
        years += 1;
    }

    if years >= LONGEVITY_HORIZON {
        Longevity::TenPlusYears
    } else {
        Longevity::YearsUntilInactive(years)
    }
}

/// Contribution rate weighted by activity frequency: sparse activity drags
/// the raw rate down. 0.0 on zero denominators.
pub fn predict_effective_rate(total_contributions: u64, active_days: u32, total_days: i64) -> f64 {
    if active_days == 0 || total_days == 0 {
        return 0.0;
    }

    let activity_frequency = active_days as f64 / total_days as f64;
    let raw_rate = total_contributions as f64 / total_days as f64;

    round2(raw_rate * activity_frequency)
}

/// Percent growth of the current rate over the prior-period rate, 0 when the
/// prior rate was 0.
pub fn rate_growth(current_rate: f64, prior_rate: f64) -> f64 {
    if prior_rate == 0.0 {
        return 0.0;
    }
    round2((current_rate - prior_rate) / prior_rate * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_term_trend_decreasing() {
        let snapshot = predict_long_term_activity(5000, 365, 115, 200);
        assert_eq!(snapshot.lifetime_rate, 13.7);
        // 115/200 = 0.575 is stored just below the half, so it rounds down.
        assert_eq!(snapshot.current_rate, 0.57);
        assert_eq!(snapshot.trend, Trend::Decreasing);
    }

    #[test]
    fn long_term_trend_increasing_and_stable() {
        let snapshot = predict_long_term_activity(365, 365, 500, 100);
        assert_eq!(snapshot.lifetime_rate, 1.0);
        assert_eq!(snapshot.current_rate, 5.0);
        assert_eq!(snapshot.trend, Trend::Increasing);

        let snapshot = predict_long_term_activity(365, 365, 100, 100);
        assert_eq!(snapshot.trend, Trend::Stable);
    }

    #[test]
    fn long_term_trend_compares_rounded_rates() {
        // 1.0/1 day vs 1.004/1.0: both round to 1.00, so the trend must be
        // stable even though the raw rates differ.
        let snapshot = predict_long_term_activity(1000, 1000, 251, 250);
        assert_eq!(snapshot.lifetime_rate, 1.0);
        assert_eq!(snapshot.current_rate, 1.0);
        assert_eq!(snapshot.trend, Trend::Stable);
    }

    #[test]
    fn long_term_insufficient_data_on_zero_denominators() {
        let snapshot = predict_long_term_activity(0, 0, 0, 0);
        assert_eq!(snapshot.trend, Trend::InsufficientData);
        assert_eq!(snapshot.lifetime_rate, 0.0);
        assert_eq!(snapshot.current_rate, 0.0);

        // Dormant account: days elapsed but never an active day.
        let snapshot = predict_long_term_activity(100, 365, 0, 0);
        assert_eq!(snapshot.trend, Trend::InsufficientData);
    }

    #[test]
    fn future_active_days_extrapolates() {
        assert_eq!(predict_future_active_days(200, 365, 100), 54.8);
        assert_eq!(predict_future_active_days(0, 0, 100), 0.0);
    }

    #[test]
    fn burnout_significant_increase() {
        // Changes: (150-100)/100 = 50%, (100-50)/50 = 100%; average 75%.
        assert_eq!(predict_burnout(&[150, 100, 50]), BurnoutTrend::SignificantIncrease);
    }

    #[test]
    fn burnout_classifications() {
        assert_eq!(predict_burnout(&[50, 100]), BurnoutTrend::BurnoutRisk); // -50%
        assert_eq!(predict_burnout(&[90, 100]), BurnoutTrend::GradualDecrease); // -10%
        assert_eq!(predict_burnout(&[100, 100]), BurnoutTrend::Stable);
        assert_eq!(predict_burnout(&[110, 100]), BurnoutTrend::GradualIncrease); // +10%
        assert_eq!(predict_burnout(&[150, 100]), BurnoutTrend::SignificantIncrease); // +50%
    }

    #[test]
    fn burnout_treats_zero_previous_period_as_flat() {
        // (5-0)/0 would fault; the heuristic counts it as 0% change.
        assert_eq!(predict_burnout(&[5, 0]), BurnoutTrend::Stable);
    }

    #[test]
    fn burnout_needs_two_periods() {
        assert_eq!(predict_burnout(&[]), BurnoutTrend::InsufficientData);
        assert_eq!(predict_burnout(&[150]), BurnoutTrend::InsufficientData);
    }

    #[test]
    fn longevity_sustained_on_growth() {
        assert_eq!(predict_account_longevity(&[150, 100, 50]), Longevity::Sustained);
        assert_eq!(predict_account_longevity(&[100, 100]), Longevity::Sustained);
    }

    #[test]
    fn longevity_projects_decay_years() {
        // Average change: ((50-100)/100 + (100-150)/150) / 2 = -41.67%.
        // 50 → 29.2 → 17.0 → 9.9: crosses the floor after 3 years.
        assert_eq!(
            predict_account_longevity(&[50, 100, 150]),
            Longevity::YearsUntilInactive(3)
        );
    }

    #[test]
    fn longevity_slow_decline_hits_horizon() {
        // ~-1% per year barely dents the activity in a decade.
        assert_eq!(predict_account_longevity(&[100, 101]), Longevity::TenPlusYears);
    }

    #[test]
    fn longevity_needs_two_periods() {
        assert_eq!(predict_account_longevity(&[42]), Longevity::InsufficientData);
    }

    #[test]
    fn effective_rate_penalizes_sparse_activity() {
        // raw 13.70 * frequency 0.548 = 7.51
        assert_eq!(predict_effective_rate(5000, 200, 365), 7.51);
        assert_eq!(predict_effective_rate(5000, 0, 365), 0.0);
        assert_eq!(predict_effective_rate(5000, 200, 0), 0.0);
    }

    #[test]
    fn growth_rate_guards_zero_prior() {
        assert_eq!(rate_growth(2.0, 1.0), 100.0);
        assert_eq!(rate_growth(1.0, 2.0), -50.0);
        assert_eq!(rate_growth(5.0, 0.0), 0.0);
    }
}
