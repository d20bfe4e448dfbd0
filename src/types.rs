use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One calendar day's contribution count as reported by GitHub.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributionDay {
    pub date: NaiveDate,
    pub count: u32,
}

/// An ordered, date-unique sequence of contribution days covering a fetched
/// window. The normalizer guarantees ascending date order; it does not
/// synthesize days the API never returned.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContributionSeries {
    days: Vec<ContributionDay>,
}

impl ContributionSeries {
    /// Build a series from raw days, sorting by date and dropping duplicate
    /// dates (first occurrence wins).
    pub fn from_days(mut days: Vec<ContributionDay>) -> Self {
        days.sort_by_key(|d| d.date);
        days.dedup_by_key(|d| d.date);
        Self { days }
    }

    pub fn days(&self) -> &[ContributionDay] {
        &self.days
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.days.first().map(|d| d.date)
    }

    /// Sum of all daily counts in the window.
    pub fn total(&self) -> u64 {
        self.days.iter().map(|d| d.count as u64).sum()
    }

    /// Contribution count for a specific date, 0 if the date isn't in the
    /// window.
    pub fn count_on(&self, date: NaiveDate) -> u32 {
        self.days
            .binary_search_by_key(&date, |d| d.date)
            .map(|i| self.days[i].count)
            .unwrap_or(0)
    }
}

/// Aggregates derived from a single contribution series.
///
/// `current_streak` is measured relative to the LAST day present in the
/// series, not necessarily "today". Callers that want a today-anchored
/// streak must fetch a window ending today.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AggregateStats {
    pub total_contributions: u64,
    pub public_contributions: u64,
    pub private_contributions: u64,
    pub highest_contribution: u32,
    pub highest_contribution_date: Option<NaiveDate>,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub active_days: u32,
    pub total_days: u32,
}

/// Contribution rate and consistency over a window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateStats {
    pub contribution_rate: f64,
    pub consistency_score: f64,
    pub consistency: Consistency,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Consistency {
    HighlyConsistent,
    Regular,
    Occasional,
    Sporadic,
    NoActivity,
}

impl Consistency {
    pub fn label(&self) -> &'static str {
        match self {
            Consistency::HighlyConsistent => "Highly consistent contributor",
            Consistency::Regular => "Regular contributor",
            Consistency::Occasional => "Occasional contributor",
            Consistency::Sporadic => "Sporadic contributor",
            Consistency::NoActivity => "No activity",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Increasing,
    Stable,
    Decreasing,
    InsufficientData,
}

/// Lifetime vs. current-period contribution rates and the trend between them.
/// Rates are rounded to 2 decimals and the trend is decided on the rounded
/// values so it always agrees with what gets displayed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendSnapshot {
    pub lifetime_rate: f64,
    pub current_rate: f64,
    pub trend: Trend,
}

/// Year-over-year activity classification from the burnout heuristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BurnoutTrend {
    BurnoutRisk,
    GradualDecrease,
    Stable,
    GradualIncrease,
    SignificantIncrease,
    InsufficientData,
}

impl BurnoutTrend {
    pub fn label(&self) -> &'static str {
        match self {
            BurnoutTrend::BurnoutRisk => {
                "Significant decrease in activity, potential burnout risk"
            }
            BurnoutTrend::GradualDecrease => "Activity is gradually decreasing",
            BurnoutTrend::Stable => "Activity is stable",
            BurnoutTrend::GradualIncrease => "Activity is gradually increasing",
            BurnoutTrend::SignificantIncrease => "Activity is significantly increasing",
            BurnoutTrend::InsufficientData => "Insufficient data for burnout prediction",
        }
    }
}

/// Account-longevity projection. A compounding-decay heuristic, not a
/// statistical forecast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Longevity {
    Sustained,
    TenPlusYears,
    YearsUntilInactive(u32),
    InsufficientData,
}

impl Longevity {
    pub fn label(&self) -> String {
        match self {
            Longevity::Sustained => "Account shows sustained or increasing activity".to_string(),
            Longevity::TenPlusYears => {
                "Account likely to remain active for 10+ years".to_string()
            }
            Longevity::YearsUntilInactive(years) => {
                format!("Account activity may cease in ~{years} years")
            }
            Longevity::InsufficientData => {
                "Insufficient data for longevity prediction".to_string()
            }
        }
    }
}

/// ETA for one cumulative-contribution milestone.
///
/// `days_required` uses `f64::INFINITY` as the unreachable sentinel; asking
/// about an unreachable milestone is never an error. The sentinel serializes
/// as JSON `null` (infinity is not representable in JSON).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MilestoneProjection {
    pub target: u64,
    #[serde(
        serialize_with = "serialize_days_required",
        deserialize_with = "deserialize_days_required"
    )]
    pub days_required: f64,
    pub projected_date: Option<NaiveDate>,
}

fn serialize_days_required<S>(days: &f64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    if days.is_finite() {
        serializer.serialize_some(days)
    } else {
        serializer.serialize_none()
    }
}

fn deserialize_days_required<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::INFINITY))
}

impl MilestoneProjection {
    pub fn is_unreachable(&self) -> bool {
        self.days_required.is_infinite()
    }

    pub fn is_achieved(&self) -> bool {
        self.days_required == 0.0
    }
}

/// Profile facts about the account itself, independent of any window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub username: String,
    pub name: String,
    pub bio: String,
    pub location: String,
    pub avatar_url: String,
    pub created_at: DateTime<Utc>,
    pub followers: u64,
    pub following: u64,
    pub repositories: u64,
    pub total_commits: u64,
    pub total_pull_requests: u64,
    pub total_issues: u64,
    /// Days elapsed since account creation.
    pub github_days: i64,
    pub joined_since: String,
    /// Accounts younger than two months get a caveat in the report; most of
    /// the rate math is noise at that age.
    pub young_account: bool,
}

/// Primary-language usage across owned, non-fork repositories.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LanguageStats {
    pub count: u32,
    pub color: String,
}

/// Detailed statistics for one repository.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryDetails {
    pub name: String,
    pub description: String,
    pub url: String,
    pub default_branch: String,
    pub branches: u64,
    pub stars: u64,
    pub forks: u64,
    pub watchers: u64,
    pub contributors: u64,
    pub open_pull_requests: u64,
    pub closed_pull_requests: u64,
    pub open_issues: u64,
    pub closed_issues: u64,
    /// Languages by byte size, largest first as GitHub orders them.
    pub languages: Vec<RepositoryLanguage>,
}

/// One language's share of a repository, by byte size.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryLanguage {
    pub name: String,
    pub color: String,
    pub size: u64,
}

/// Everything one analysis run produces, in presentation-ready form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityReport {
    pub user: Option<UserProfile>,
    pub aggregates: AggregateStats,
    pub rates: RateStats,
    pub today_contributions: u32,
    pub long_term: TrendSnapshot,
    pub burnout: BurnoutTrend,
    pub longevity: Longevity,
    pub effective_rate: f64,
    /// Growth in contribution rate vs. the prior year, in percent.
    pub rate_growth: f64,
    pub predicted_future_contributions: f64,
    pub predicted_future_active_days: f64,
    pub milestones: Vec<MilestoneProjection>,
    pub languages: BTreeMap<String, LanguageStats>,
}
