use chrono::{Days, NaiveDate};

use crate::types::{ContributionSeries, MilestoneProjection};
use crate::utils::round1;

/// Milestone ladder shown by default.
pub const DEFAULT_MILESTONES: [u64; 6] = [100, 500, 1000, 2000, 5000, 10000];

/// Days needed to reach `target` from `current` at `rate` contributions/day.
///
/// Already-achieved milestones are 0 regardless of rate; a non-positive rate
/// makes any remaining milestone unreachable (`f64::INFINITY`), never an
/// error.
pub fn days_to_milestone(current: u64, target: u64, rate: f64) -> f64 {
    if target <= current {
        return 0.0;
    }
    if rate <= 0.0 {
        return f64::INFINITY;
    }

    round1((target - current) as f64 / rate)
}

/// Projected calendar date for a milestone.
///
/// When the series itself crosses the milestone, the answer is exact: the
/// cumulative daily counts are walked in date order and the first day the
/// running total reaches the target wins. Only when the series is exhausted
/// does this fall back to extrapolating `start + days_to_milestone` from the
/// average rate; `None` means unreachable (or no data to anchor a date to).
pub fn project_milestone_date(
    series: &ContributionSeries,
    current_total: u64,
    target: u64,
    rate: f64,
) -> Option<NaiveDate> {
    if series.is_empty() {
        return None;
    }

    let mut running: u64 = 0;
    for day in series.days() {
        running += day.count as u64;
        if running >= target {
            return Some(day.date);
        }
    }

    let days_required = days_to_milestone(current_total, target, rate);
    if days_required.is_infinite() {
        return None;
    }

    let start = series.first_date()?;
    start.checked_add_days(Days::new(days_required.ceil() as u64))
}

/// Build the full milestone ladder for a window.
pub fn project_milestones(
    milestones: &[u64],
    series: &ContributionSeries,
    current_total: u64,
    rate: f64,
) -> Vec<MilestoneProjection> {
    milestones
        .iter()
        .map(|&target| MilestoneProjection {
            target,
            days_required: days_to_milestone(current_total, target, rate),
            projected_date: project_milestone_date(series, current_total, target, rate),
        })
        .collect()
}
