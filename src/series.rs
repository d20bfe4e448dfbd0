use std::collections::BTreeMap;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};

use crate::fetch::{ContributionsCollection, CountNode, GraphQlEnvelope, RepositoryEnvelope};
use crate::types::{
    ContributionDay, ContributionSeries, LanguageStats, RepositoryDetails, RepositoryLanguage,
    UserProfile,
};
use crate::utils::{format_duration_since, is_less_than_two_months_old, warn_once};

/// Color used for languages GitHub reports without one.
const DEFAULT_LANGUAGE_COLOR: &str = "#808080";

/// A contribution calendar validated once at this boundary. Everything
/// downstream operates on this guaranteed shape instead of re-checking key
/// presence.
#[derive(Debug, Clone, Default)]
pub struct NormalizedCalendar {
    pub series: ContributionSeries,
    /// Calendar total as reported by the API (0 if absent).
    pub public_contributions: u64,
    /// Restricted (private) contribution count (0 if absent).
    pub private_contributions: u64,
}

fn contributions_collection(envelope: &GraphQlEnvelope) -> Result<&ContributionsCollection> {
    envelope
        .data
        .as_ref()
        .context("Malformed response: missing 'data'")?
        .user
        .as_ref()
        .context("Malformed response: missing 'user'")?
        .contributions_collection
        .as_ref()
        .context("Malformed response: missing 'contributionsCollection'")
}

/// Flatten a raw calendar envelope into an ordered, gap-free-by-construction
/// series plus the public/private totals.
///
/// Fails only when the expected nesting is absent entirely; a single mangled
/// day degrades to `count = 0` (missing count) or is skipped (missing date)
/// rather than failing the whole window.
pub fn normalize(envelope: &GraphQlEnvelope) -> Result<NormalizedCalendar> {
    let collection = contributions_collection(envelope)?;
    let calendar = collection
        .contribution_calendar
        .as_ref()
        .context("Malformed response: missing 'contributionCalendar'")?;

    let mut days = Vec::new();
    for week in &calendar.weeks {
        for raw in &week.contribution_days {
            let Some(date_str) = raw.date.as_deref() else {
                warn_once("Skipping contribution day without a date");
                continue;
            };
            let date = match NaiveDate::parse_from_str(date_str, "%Y-%m-%d") {
                Ok(date) => date,
                Err(_) => {
                    warn_once(format!("Skipping unparseable contribution date: {date_str}"));
                    continue;
                }
            };
            days.push(ContributionDay {
                date,
                count: raw.contribution_count.unwrap_or(0),
            });
        }
    }

    Ok(NormalizedCalendar {
        // Trust the upstream ordering, but re-sort defensively.
        series: ContributionSeries::from_days(days),
        public_contributions: calendar.total_contributions.unwrap_or(0),
        private_contributions: collection.restricted_contributions_count.unwrap_or(0),
    })
}

/// Extract the account profile from a profile-query envelope.
pub fn normalize_profile(
    envelope: &GraphQlEnvelope,
    username: &str,
    now: DateTime<Utc>,
) -> Result<UserProfile> {
    let user = envelope
        .data
        .as_ref()
        .context("Malformed response: missing 'data'")?
        .user
        .as_ref()
        .context("Malformed response: missing 'user'")?;

    let created_at_str = user
        .created_at
        .as_deref()
        .context("Malformed response: missing 'createdAt'")?;
    let created_at: DateTime<Utc> = DateTime::parse_from_rfc3339(created_at_str)
        .context("Unparseable 'createdAt' timestamp")?
        .into();

    let collection = user.contributions_collection.as_ref();
    let github_days = (now - created_at).num_days().max(0);

    Ok(UserProfile {
        username: username.to_string(),
        name: user.name.clone().unwrap_or_default(),
        bio: user.bio.clone().unwrap_or_default(),
        location: user.location.clone().unwrap_or_default(),
        avatar_url: user.avatar_url.clone().unwrap_or_default(),
        created_at,
        followers: user.followers.as_ref().map(|c| c.total_count).unwrap_or(0),
        following: user.following.as_ref().map(|c| c.total_count).unwrap_or(0),
        repositories: user
            .repositories
            .as_ref()
            .map(|r| r.total_count)
            .unwrap_or(0),
        total_commits: collection
            .and_then(|c| c.total_commit_contributions)
            .unwrap_or(0),
        total_pull_requests: collection
            .and_then(|c| c.total_pull_request_contributions)
            .unwrap_or(0),
        total_issues: collection
            .and_then(|c| c.total_issue_contributions)
            .unwrap_or(0),
        github_days,
        joined_since: format_duration_since(created_at, now),
        young_account: is_less_than_two_months_old(created_at, now),
    })
}

/// Count primary languages across the repositories in a repo-query envelope.
pub fn normalize_languages(envelope: &GraphQlEnvelope) -> Result<BTreeMap<String, LanguageStats>> {
    let repositories = envelope
        .data
        .as_ref()
        .context("Malformed response: missing 'data'")?
        .user
        .as_ref()
        .context("Malformed response: missing 'user'")?
        .repositories
        .as_ref()
        .context("Malformed response: missing 'repositories'")?;

    let mut languages: BTreeMap<String, LanguageStats> = BTreeMap::new();
    for edge in &repositories.edges {
        let Some(node) = &edge.node else { continue };
        let Some(language) = &node.primary_language else {
            continue;
        };
        let entry = languages
            .entry(language.name.clone())
            .or_insert_with(|| LanguageStats {
                count: 0,
                color: language
                    .color
                    .clone()
                    .unwrap_or_else(|| DEFAULT_LANGUAGE_COLOR.to_string()),
            });
        entry.count += 1;
    }

    Ok(languages)
}

fn count_of(node: &Option<CountNode>) -> u64 {
    node.as_ref().map(|c| c.total_count).unwrap_or(0)
}

/// Extract per-repository statistics from a repository-query envelope.
///
/// GitHub returns language names and byte sizes as parallel arrays; they are
/// zipped here, dropping any tail one side is missing.
pub fn normalize_repository(envelope: &RepositoryEnvelope) -> Result<RepositoryDetails> {
    let repo = envelope
        .data
        .as_ref()
        .context("Malformed response: missing 'data'")?
        .repository
        .as_ref()
        .context("Malformed response: missing 'repository'")?;

    let mut languages = Vec::new();
    if let Some(raw) = &repo.languages {
        for (node, edge) in raw.nodes.iter().zip(&raw.edges) {
            languages.push(RepositoryLanguage {
                name: node.name.clone(),
                color: node
                    .color
                    .clone()
                    .unwrap_or_else(|| DEFAULT_LANGUAGE_COLOR.to_string()),
                size: edge.size,
            });
        }
    }

    Ok(RepositoryDetails {
        name: repo.name.clone().unwrap_or_default(),
        description: repo.description.clone().unwrap_or_default(),
        url: repo.url.clone().unwrap_or_default(),
        default_branch: repo
            .default_branch_ref
            .as_ref()
            .map(|r| r.name.clone())
            .unwrap_or_default(),
        branches: count_of(&repo.refs),
        stars: count_of(&repo.stargazers),
        forks: count_of(&repo.forks),
        watchers: count_of(&repo.watchers),
        contributors: count_of(&repo.contributors),
        open_pull_requests: count_of(&repo.open_pull_requests),
        closed_pull_requests: count_of(&repo.closed_pull_requests),
        open_issues: count_of(&repo.open_issues),
        closed_issues: count_of(&repo.closed_issues),
        languages,
    })
}
