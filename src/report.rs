use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::milestone::project_milestones;
use crate::predict::{
    predict_account_longevity, predict_burnout, predict_effective_rate,
    predict_future_active_days, predict_long_term_activity, rate_growth,
};
use crate::series::NormalizedCalendar;
use crate::stats::{aggregate, rates};
use crate::types::{ActivityReport, LanguageStats, RepositoryDetails, Trend, UserProfile};
use crate::utils::{
    NumberFormatOptions, format_date_dmy, format_date_ordinal, format_number, round1,
};

/// Assemble the full analysis from normalized inputs. Pure: every input is
/// an explicit parameter and nothing is cached between calls.
///
/// `prior` and `current` are the prior-year and current-year calendar
/// windows; a caller with no prior-year access passes a default (empty)
/// calendar and the year-over-year sections degrade to "insufficient data".
pub fn build_report(
    user: Option<UserProfile>,
    languages: BTreeMap<String, LanguageStats>,
    prior: &NormalizedCalendar,
    current: &NormalizedCalendar,
    today: NaiveDate,
    milestones: &[u64],
) -> ActivityReport {
    let aggregates = aggregate(current);
    let prior_aggregates = aggregate(prior);

    let current_rates = rates(
        aggregates.total_contributions,
        aggregates.active_days,
        aggregates.total_days,
    );
    let prior_rates = rates(
        prior_aggregates.total_contributions,
        prior_aggregates.active_days,
        prior_aggregates.total_days,
    );

    // Lifetime here means "everything we fetched": both windows combined.
    let combined_total = aggregates.total_contributions + prior_aggregates.total_contributions;
    let combined_days = (aggregates.total_days + prior_aggregates.total_days) as i64;
    let combined_active = aggregates.active_days + prior_aggregates.active_days;

    let long_term = predict_long_term_activity(
        combined_total,
        combined_days,
        aggregates.total_contributions,
        aggregates.active_days,
    );

    // Most recent period first.
    let history = [aggregates.active_days, prior_aggregates.active_days];
    let burnout = predict_burnout(&history);
    let longevity = predict_account_longevity(&history);

    let effective_rate = predict_effective_rate(combined_total, combined_active, combined_days);

    let remaining_days = (365 - aggregates.total_days as i64).max(0);
    let predicted_future_contributions =
        round1(current_rates.contribution_rate * remaining_days as f64);
    let predicted_future_active_days = predict_future_active_days(
        aggregates.active_days,
        aggregates.total_days as i64,
        remaining_days,
    );

    let milestones = project_milestones(
        milestones,
        &current.series,
        aggregates.total_contributions,
        current_rates.contribution_rate,
    );

    ActivityReport {
        user,
        today_contributions: current.series.count_on(today),
        rate_growth: rate_growth(
            current_rates.contribution_rate,
            prior_rates.contribution_rate,
        ),
        aggregates,
        rates: current_rates,
        long_term,
        burnout,
        longevity,
        effective_rate,
        predicted_future_contributions,
        predicted_future_active_days,
        milestones,
        languages,
    }
}

fn trend_label(trend: Trend) -> &'static str {
    match trend {
        Trend::Increasing => "increasing",
        Trend::Stable => "stable",
        Trend::Decreasing => "decreasing",
        Trend::InsufficientData => "insufficient data",
    }
}

/// Print the report as a plain-text dashboard.
pub fn print_report(report: &ActivityReport, options: &NumberFormatOptions) {
    if let Some(user) = &report.user {
        println!("👤 {}", user.username);
        if !user.name.is_empty() {
            println!("   Name: {}", user.name);
        }
        if !user.location.is_empty() {
            println!("   Location: {}", user.location);
        }
        println!(
            "   Joined: {} ({} ago)",
            format_date_ordinal(user.created_at.date_naive()),
            user.joined_since
        );
        println!(
            "   Repos: {}  Followers: {}  Following: {}",
            format_number(user.repositories, options),
            format_number(user.followers, options),
            format_number(user.following, options)
        );
        println!(
            "   Commits: {}  PRs: {}  Issues: {}",
            format_number(user.total_commits, options),
            format_number(user.total_pull_requests, options),
            format_number(user.total_issues, options)
        );
        if user.young_account {
            println!("   ℹ️  Account is less than 2 months old; predictions will be noisy.");
        }
        println!();
    }

    let agg = &report.aggregates;
    println!("📊 Contributions");
    println!(
        "   Total: {} (public {}, private {})",
        format_number(agg.total_contributions, options),
        format_number(agg.public_contributions, options),
        format_number(agg.private_contributions, options)
    );
    println!("   Today: {}", format_number(report.today_contributions, options));
    match agg.highest_contribution_date {
        Some(date) => println!(
            "   Best day: {} on {}",
            format_number(agg.highest_contribution, options),
            format_date_dmy(date)
        ),
        None => println!("   Best day: no data"),
    }
    println!(
        "   Streak: {} days (longest {})",
        agg.current_streak, agg.longest_streak
    );
    println!(
        "   Active days: {} of {}",
        format_number(agg.active_days, options),
        format_number(agg.total_days, options)
    );
    println!();

    println!("📈 Trends");
    println!(
        "   Contribution rate: {:.2}/day ({:+.2}% vs last year)",
        report.rates.contribution_rate, report.rate_growth
    );
    println!(
        "   Consistency: {:.1}% - {}",
        report.rates.consistency_score,
        report.rates.consistency.label()
    );
    println!(
        "   Lifetime rate: {:.2}/day, current {:.2}/day ({})",
        report.long_term.lifetime_rate,
        report.long_term.current_rate,
        trend_label(report.long_term.trend)
    );
    println!("   Effective rate: {:.2}/day", report.effective_rate);
    println!("   {}", report.burnout.label());
    println!("   {}", report.longevity.label());
    println!(
        "   Predicted rest of year: {:.0} contributions over {:.0} active days",
        report.predicted_future_contributions, report.predicted_future_active_days
    );
    println!();

    println!("🏁 Milestones");
    for projection in &report.milestones {
        let target = format_number(projection.target, options);
        if projection.is_achieved() {
            match projection.projected_date {
                Some(date) => {
                    println!("   ✅ {} - reached {}", target, format_date_ordinal(date))
                }
                None => println!("   ✅ {target} - achieved"),
            }
        } else if projection.is_unreachable() {
            println!("   ⛔ {target} - not achievable at the current rate");
        } else {
            match projection.projected_date {
                Some(date) => println!(
                    "   ⏳ {} - ~{:.0} days ({})",
                    target,
                    projection.days_required,
                    format_date_ordinal(date)
                ),
                None => println!("   ⏳ {} - ~{:.0} days", target, projection.days_required),
            }
        }
    }

    if !report.languages.is_empty() {
        println!();
        println!("🗂  Languages");
        let mut languages: Vec<(&String, &LanguageStats)> = report.languages.iter().collect();
        languages.sort_by(|a, b| b.1.count.cmp(&a.1.count).then_with(|| a.0.cmp(b.0)));
        for (name, stats) in languages {
            println!(
                "   {} - {} repo{}",
                name,
                stats.count,
                if stats.count == 1 { "" } else { "s" }
            );
        }
    }
}

/// Print per-repository statistics as plain text.
pub fn print_repository(repo: &RepositoryDetails, options: &NumberFormatOptions) {
    println!("📦 {}", repo.name);
    if !repo.description.is_empty() {
        println!("   {}", repo.description);
    }
    if !repo.url.is_empty() {
        println!("   {}", repo.url);
    }
    if !repo.default_branch.is_empty() {
        println!(
            "   Default branch: {} ({} total)",
            repo.default_branch,
            format_number(repo.branches, options)
        );
    }
    println!(
        "   ⭐ Stars: {}  Forks: {}  Watchers: {}",
        format_number(repo.stars, options),
        format_number(repo.forks, options),
        format_number(repo.watchers, options)
    );
    println!(
        "   Contributors: {}",
        format_number(repo.contributors, options)
    );
    println!(
        "   PRs: {} open, {} closed  Issues: {} open, {} closed",
        format_number(repo.open_pull_requests, options),
        format_number(repo.closed_pull_requests, options),
        format_number(repo.open_issues, options),
        format_number(repo.closed_issues, options)
    );

    if !repo.languages.is_empty() {
        let total_bytes: u64 = repo.languages.iter().map(|l| l.size).sum();
        println!("   Languages:");
        for language in &repo.languages {
            let share = if total_bytes > 0 {
                language.size as f64 / total_bytes as f64 * 100.0
            } else {
                0.0
            };
            println!("      {} - {share:.1}%", language.name);
        }
    }
}
