use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

const GITHUB_GRAPHQL_URL: &str = "https://api.github.com/graphql";
const USER_AGENT: &str = concat!("contrail/", env!("CARGO_PKG_VERSION"));

/// Raw GraphQL response envelope. Every nested level is optional: the
/// normalizer decides what "malformed" means, not the deserializer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphQlEnvelope {
    pub data: Option<ResponseData>,
    #[serde(default)]
    pub errors: Vec<GraphQlError>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphQlError {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResponseData {
    pub user: Option<UserNode>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserNode {
    pub name: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub avatar_url: Option<String>,
    pub created_at: Option<String>,
    pub followers: Option<CountNode>,
    pub following: Option<CountNode>,
    pub repositories: Option<RepositoriesNode>,
    pub contributions_collection: Option<ContributionsCollection>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountNode {
    #[serde(default)]
    pub total_count: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoriesNode {
    #[serde(default)]
    pub total_count: u64,
    #[serde(default)]
    pub edges: Vec<RepositoryEdge>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RepositoryEdge {
    pub node: Option<RepositoryNode>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryNode {
    #[serde(default)]
    pub name: String,
    pub primary_language: Option<LanguageNode>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LanguageNode {
    #[serde(default)]
    pub name: String,
    pub color: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributionsCollection {
    pub restricted_contributions_count: Option<u64>,
    pub total_commit_contributions: Option<u64>,
    pub total_pull_request_contributions: Option<u64>,
    pub total_issue_contributions: Option<u64>,
    pub contribution_calendar: Option<ContributionCalendar>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributionCalendar {
    pub total_contributions: Option<u64>,
    #[serde(default)]
    pub weeks: Vec<CalendarWeek>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarWeek {
    #[serde(default)]
    pub contribution_days: Vec<RawContributionDay>,
}

/// A single day as GitHub serializes it. Both fields are optional so one
/// mangled day degrades to `count = 0` instead of failing the whole fetch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawContributionDay {
    pub contribution_count: Option<u32>,
    pub date: Option<String>,
}

/// Envelope for the single-repository query, which nests under
/// `data.repository` instead of `data.user`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RepositoryEnvelope {
    pub data: Option<RepositoryData>,
    #[serde(default)]
    pub errors: Vec<GraphQlError>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RepositoryData {
    pub repository: Option<RepositoryDetailsNode>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryDetailsNode {
    pub name: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    pub default_branch_ref: Option<RefNode>,
    /// Branch refs; only the count is requested.
    pub refs: Option<CountNode>,
    pub forks: Option<CountNode>,
    pub watchers: Option<CountNode>,
    pub stargazers: Option<CountNode>,
    pub languages: Option<RepoLanguagesNode>,
    pub contributors: Option<CountNode>,
    #[serde(rename = "pullRequests")]
    pub open_pull_requests: Option<CountNode>,
    #[serde(rename = "closedPRs")]
    pub closed_pull_requests: Option<CountNode>,
    #[serde(rename = "openIssues")]
    pub open_issues: Option<CountNode>,
    #[serde(rename = "closedIssues")]
    pub closed_issues: Option<CountNode>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RefNode {
    #[serde(default)]
    pub name: String,
}

/// GitHub returns language names and byte sizes as parallel arrays.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RepoLanguagesNode {
    #[serde(default)]
    pub nodes: Vec<LanguageNode>,
    #[serde(default)]
    pub edges: Vec<LanguageSizeEdge>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LanguageSizeEdge {
    #[serde(default)]
    pub size: u64,
}

/// The data-acquisition seam. The analytics core only ever sees envelopes
/// handed over this trait, so tests can feed it canned payloads.
#[async_trait]
pub trait ContributionSource: Send + Sync {
    /// Contribution calendar for an inclusive `[from, to]` window.
    async fn contributions(
        &self,
        username: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<GraphQlEnvelope>;

    /// Profile facts (createdAt, followers, contribution totals).
    async fn profile(&self, username: &str) -> Result<GraphQlEnvelope>;

    /// Owned, non-fork repositories with their primary language.
    async fn repositories(&self, username: &str) -> Result<GraphQlEnvelope>;

    /// Detailed statistics for a single repository.
    async fn repository_details(&self, owner: &str, name: &str) -> Result<RepositoryEnvelope>;
}

#[derive(Serialize)]
struct QueryBody {
    query: String,
}

/// GitHub GraphQL client with bearer-token auth.
pub struct GitHubClient {
    client: reqwest::Client,
    token: String,
}

impl GitHubClient {
    pub fn new(token: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            token: token.into(),
        })
    }

    async fn post_raw(&self, query: String) -> Result<Vec<u8>> {
        let body =
            simd_json::to_vec(&QueryBody { query }).context("Failed to serialize query")?;

        let response = self
            .client
            .post(GITHUB_GRAPHQL_URL)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("User-Agent", USER_AGENT)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .context("GitHub API request failed")?;

        if !response.status().is_success() {
            anyhow::bail!("GitHub API returned {}", response.status());
        }

        Ok(response.bytes().await?.to_vec())
    }

    async fn post_query(&self, query: String) -> Result<GraphQlEnvelope> {
        let mut bytes = self.post_raw(query).await?;
        let envelope: GraphQlEnvelope =
            simd_json::from_slice(&mut bytes).context("Failed to parse GitHub API response")?;

        if let Some(error) = envelope.errors.first() {
            anyhow::bail!("GitHub API error: {}", error.message);
        }

        Ok(envelope)
    }

    async fn post_repository_query(&self, query: String) -> Result<RepositoryEnvelope> {
        let mut bytes = self.post_raw(query).await?;
        let envelope: RepositoryEnvelope =
            simd_json::from_slice(&mut bytes).context("Failed to parse GitHub API response")?;

        if let Some(error) = envelope.errors.first() {
            anyhow::bail!("GitHub API error: {}", error.message);
        }

        Ok(envelope)
    }
}

fn contributions_query(username: &str, from: NaiveDate, to: NaiveDate) -> String {
    format!(
        r#"{{
  user(login: "{username}") {{
    createdAt
    contributionsCollection(from: "{from}T00:00:00Z", to: "{to}T23:59:59Z") {{
      restrictedContributionsCount
      totalCommitContributions
      totalPullRequestContributions
      totalIssueContributions
      contributionCalendar {{
        totalContributions
        weeks {{
          contributionDays {{
            contributionCount
            date
          }}
        }}
      }}
    }}
  }}
}}"#
    )
}

fn profile_query(username: &str) -> String {
    format!(
        r#"{{
  user(login: "{username}") {{
    name
    bio
    location
    createdAt
    avatarUrl
    followers {{ totalCount }}
    following {{ totalCount }}
    repositories(ownerAffiliations: OWNER, isFork: false) {{ totalCount }}
    contributionsCollection {{
      totalCommitContributions
      totalPullRequestContributions
      totalIssueContributions
    }}
  }}
}}"#
    )
}

fn repositories_query(username: &str) -> String {
    format!(
        r#"{{
  user(login: "{username}") {{
    repositories(first: 100, ownerAffiliations: OWNER, isFork: false) {{
      totalCount
      edges {{
        node {{
          name
          primaryLanguage {{
            name
            color
          }}
        }}
      }}
    }}
  }}
}}"#
    )
}

fn repository_details_query(owner: &str, name: &str) -> String {
    format!(
        r#"{{
  repository(owner: "{owner}", name: "{name}") {{
    name
    description
    url
    defaultBranchRef {{ name }}
    refs(refPrefix: "refs/heads/", first: 100) {{ totalCount }}
    forks {{ totalCount }}
    watchers {{ totalCount }}
    stargazers {{ totalCount }}
    languages(first: 10, orderBy: {{field: SIZE, direction: DESC}}) {{
      nodes {{
        name
        color
      }}
      edges {{
        size
      }}
    }}
    contributors: mentionableUsers(first: 10) {{ totalCount }}
    pullRequests(states: [OPEN]) {{ totalCount }}
    closedPRs: pullRequests(states: [CLOSED, MERGED]) {{ totalCount }}
    openIssues: issues(states: [OPEN]) {{ totalCount }}
    closedIssues: issues(states: [CLOSED]) {{ totalCount }}
  }}
}}"#
    )
}

#[async_trait]
impl ContributionSource for GitHubClient {
    async fn contributions(
        &self,
        username: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<GraphQlEnvelope> {
        self.post_query(contributions_query(username, from, to))
            .await
    }

    async fn profile(&self, username: &str) -> Result<GraphQlEnvelope> {
        self.post_query(profile_query(username)).await
    }

    async fn repositories(&self, username: &str) -> Result<GraphQlEnvelope> {
        self.post_query(repositories_query(username)).await
    }

    async fn repository_details(&self, owner: &str, name: &str) -> Result<RepositoryEnvelope> {
        self.post_repository_query(repository_details_query(owner, name))
            .await
    }
}

/// Calendar windows for the prior and current year, fetched concurrently.
/// The two ranges are disjoint, so the results merge trivially once both
/// complete.
pub struct YearWindows {
    pub prior_year: GraphQlEnvelope,
    pub current_year: GraphQlEnvelope,
}

pub async fn fetch_year_windows(
    source: &dyn ContributionSource,
    username: &str,
    today: NaiveDate,
) -> Result<YearWindows> {
    use chrono::Datelike;

    let year = today.year();
    let current_jan1 = NaiveDate::from_ymd_opt(year, 1, 1)
        .context("Invalid current-year start date")?;
    let prior_jan1 = NaiveDate::from_ymd_opt(year - 1, 1, 1)
        .context("Invalid prior-year start date")?;
    let prior_dec31 = NaiveDate::from_ymd_opt(year - 1, 12, 31)
        .context("Invalid prior-year end date")?;

    let (prior_year, current_year) = futures::try_join!(
        source.contributions(username, prior_jan1, prior_dec31),
        source.contributions(username, current_jan1, today),
    )?;

    Ok(YearWindows {
        prior_year,
        current_year,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queries_embed_window_bounds() {
        let from = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let to = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
        let query = contributions_query("octocat", from, to);

        assert!(query.contains(r#"user(login: "octocat")"#));
        assert!(query.contains("from: \"2024-01-01T00:00:00Z\""));
        assert!(query.contains("to: \"2024-12-31T23:59:59Z\""));
        assert!(query.contains("restrictedContributionsCount"));
    }

    #[test]
    fn envelope_parses_partial_payloads() {
        let mut raw = br#"{
            "data": {
                "user": {
                    "contributionsCollection": {
                        "contributionCalendar": {
                            "totalContributions": 42,
                            "weeks": [
                                {"contributionDays": [
                                    {"contributionCount": 3, "date": "2025-01-06"},
                                    {"date": "2025-01-07"}
                                ]}
                            ]
                        }
                    }
                }
            }
        }"#
        .to_vec();

        let envelope: GraphQlEnvelope = simd_json::from_slice(&mut raw).expect("parse");
        let calendar = envelope
            .data
            .unwrap()
            .user
            .unwrap()
            .contributions_collection
            .unwrap()
            .contribution_calendar
            .unwrap();

        assert_eq!(calendar.total_contributions, Some(42));
        let days = &calendar.weeks[0].contribution_days;
        assert_eq!(days[0].contribution_count, Some(3));
        // Missing count deserializes as None, not an error.
        assert_eq!(days[1].contribution_count, None);
    }

    #[test]
    fn repository_query_embeds_owner_and_aliases() {
        let query = repository_details_query("octocat", "hello-world");

        assert!(query.contains(r#"repository(owner: "octocat", name: "hello-world")"#));
        assert!(query.contains("closedPRs: pullRequests(states: [CLOSED, MERGED])"));
        assert!(query.contains("contributors: mentionableUsers(first: 10)"));
        assert!(query.contains(r#"refs(refPrefix: "refs/heads/", first: 100)"#));
    }

    #[test]
    fn repository_envelope_parses_aliased_counts() {
        let mut raw = br##"{
            "data": {
                "repository": {
                    "name": "hello-world",
                    "defaultBranchRef": {"name": "main"},
                    "refs": {"totalCount": 3},
                    "stargazers": {"totalCount": 15},
                    "forks": {"totalCount": 5},
                    "watchers": {"totalCount": 10},
                    "contributors": {"totalCount": 3},
                    "pullRequests": {"totalCount": 5},
                    "closedPRs": {"totalCount": 15},
                    "openIssues": {"totalCount": 3},
                    "closedIssues": {"totalCount": 10},
                    "languages": {
                        "nodes": [{"name": "Rust", "color": "#dea584"}],
                        "edges": [{"size": 1000}]
                    }
                }
            }
        }"##
        .to_vec();

        let envelope: RepositoryEnvelope = simd_json::from_slice(&mut raw).expect("parse");
        let repo = envelope.data.unwrap().repository.unwrap();

        assert_eq!(repo.name.as_deref(), Some("hello-world"));
        assert_eq!(repo.default_branch_ref.unwrap().name, "main");
        assert_eq!(repo.open_pull_requests.unwrap().total_count, 5);
        assert_eq!(repo.closed_pull_requests.unwrap().total_count, 15);
        assert_eq!(repo.open_issues.unwrap().total_count, 3);
        assert_eq!(repo.closed_issues.unwrap().total_count, 10);
        let languages = repo.languages.unwrap();
        assert_eq!(languages.nodes[0].name, "Rust");
        assert_eq!(languages.edges[0].size, 1000);
    }

    #[test]
    fn envelope_surfaces_graphql_errors() {
        let mut raw = br#"{"data": null, "errors": [{"message": "Bad credentials"}]}"#.to_vec();
        let envelope: GraphQlEnvelope = simd_json::from_slice(&mut raw).expect("parse");
        assert!(envelope.data.is_none());
        assert_eq!(envelope.errors[0].message, "Bad credentials");
    }

    #[tokio::test]
    async fn year_windows_merge_disjoint_ranges() {
        struct CannedSource;

        #[async_trait]
        impl ContributionSource for CannedSource {
            async fn contributions(
                &self,
                _username: &str,
                from: NaiveDate,
                _to: NaiveDate,
            ) -> Result<GraphQlEnvelope> {
                // Tag each envelope with its window start so the test can
                // tell the two results apart.
                use chrono::Datelike;
                Ok(GraphQlEnvelope {
                    data: Some(ResponseData {
                        user: Some(UserNode {
                            created_at: Some(format!("{}", from.year())),
                            ..UserNode::default()
                        }),
                    }),
                    errors: Vec::new(),
                })
            }

            async fn profile(&self, _username: &str) -> Result<GraphQlEnvelope> {
                Ok(GraphQlEnvelope::default())
            }

            async fn repositories(&self, _username: &str) -> Result<GraphQlEnvelope> {
                Ok(GraphQlEnvelope::default())
            }

            async fn repository_details(
                &self,
                _owner: &str,
                _name: &str,
            ) -> Result<RepositoryEnvelope> {
                Ok(RepositoryEnvelope::default())
            }
        }

        let today = NaiveDate::from_ymd_opt(2025, 8, 23).unwrap();
        let windows = fetch_year_windows(&CannedSource, "octocat", today)
            .await
            .expect("fetch");

        let year_of = |env: &GraphQlEnvelope| {
            env.data
                .as_ref()
                .and_then(|d| d.user.as_ref())
                .and_then(|u| u.created_at.clone())
                .unwrap()
        };
        assert_eq!(year_of(&windows.prior_year), "2024");
        assert_eq!(year_of(&windows.current_year), "2025");
    }
}
