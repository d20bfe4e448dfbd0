use anyhow::Result;
use chrono::{Local, NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};

use fetch::{ContributionSource, GitHubClient};
use series::NormalizedCalendar;
use types::ActivityReport;

mod config;
mod fetch;
mod milestone;
mod predict;
mod report;
mod series;
mod stats;
mod types;
mod utils;

#[derive(Parser)]
#[command(name = "contrail")]
#[command(version)]
#[command(disable_help_subcommand = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// GitHub username (overrides the configured one)
    #[arg(short, long)]
    username: Option<String>,

    /// GitHub personal access token (overrides the configured one)
    #[arg(short, long)]
    token: Option<String>,

    /// Output the report as JSON instead of the text dashboard
    #[arg(long)]
    json: bool,

    /// Use comma-separated number formatting
    #[arg(long)]
    number_comma: bool,

    /// Use human-readable number formatting (k, m)
    #[arg(short = 'H', long)]
    number_human: bool,

    /// Locale for number formatting (en, de, fr, es, it, ja, ko, zh)
    #[arg(long)]
    locale: Option<String>,

    /// Number of decimal places for human-readable formatting
    #[arg(long)]
    decimal_places: Option<usize>,
}

#[derive(Subcommand)]
enum Commands {
    /// Output the activity report as JSON
    Stats(StatsArgs),
    /// Show detailed statistics for one repository
    Repo(RepoArgs),
    /// Manage configuration
    Config(ConfigArgs),
}

#[derive(Args)]
struct StatsArgs {
    /// Pretty-print JSON instead of a single line
    #[arg(long, default_value_t = false)]
    pretty: bool,
}

#[derive(Args)]
struct RepoArgs {
    /// Repository name (owned by the selected user)
    name: String,

    /// Output as JSON instead of text
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct ConfigArgs {
    #[command(subcommand)]
    subcommand: ConfigSubcommands,
}

#[derive(Subcommand)]
enum ConfigSubcommands {
    /// Create default configuration file
    Init {
        #[arg(long, default_value_t = false)]
        overwrite: bool,
    },
    /// Show current configuration
    Show,
    /// Set configuration value
    Set {
        /// Configuration key (username, token, show-private, milestones,
        /// number-comma, number-human, locale, decimal-places)
        key: String,
        /// Configuration value
        value: String,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Load config file to get defaults. A corrupt file is ignored (with a
    // warning), not fatal.
    let config = config::Config::load()
        .unwrap_or_else(|e| {
            utils::warn_once(format!("⚠️  Ignoring unreadable config file: {e:#}"));
            None
        })
        .unwrap_or_default();

    let format_options = merge_format_options(&cli, &config);

    let username = cli.username.unwrap_or_else(|| config.github.username.clone());
    let token = cli.token.unwrap_or_else(|| config.github.token.clone());

    match cli.command {
        None => {
            if let Err(e) = run_report(
                &username,
                &token,
                &config,
                cli.json,
                &format_options,
            )
            .await
            {
                eprintln!("Error generating report: {e:#}");
                std::process::exit(1);
            }
        }
        Some(Commands::Stats(args)) => {
            if let Err(e) = run_stats(&username, &token, &config, args).await {
                eprintln!("Error generating JSON stats: {e:#}");
                std::process::exit(1);
            }
        }
        Some(Commands::Repo(args)) => {
            if let Err(e) = run_repo(&username, &token, args, &format_options).await {
                eprintln!("Error fetching repository details: {e:#}");
                std::process::exit(1);
            }
        }
        Some(Commands::Config(config_args)) => {
            handle_config_subcommand(config_args);
        }
    }
}

/// Format options: config file defaults, CLI flags win.
fn merge_format_options(cli: &Cli, config: &config::Config) -> utils::NumberFormatOptions {
    utils::NumberFormatOptions {
        use_comma: cli.number_comma || config.formatting.number_comma,
        use_human: cli.number_human || config.formatting.number_human,
        locale: cli
            .locale
            .clone()
            .unwrap_or_else(|| config.formatting.locale.clone()),
        decimal_places: cli
            .decimal_places
            .unwrap_or(config.formatting.decimal_places),
    }
}

fn show_auth_help(username_missing: bool, token_missing: bool) {
    println!();
    let what = match (username_missing, token_missing) {
        (true, false) => "a GitHub username",
        (false, true) => "a personal access token",
        _ => "a GitHub username and a personal access token",
    };
    println!("contrail needs {what}:");
    println!("  1. Create a token at https://github.com/settings/tokens");
    println!("     (add the 'repo' scope to include private contributions)");
    println!("  2. Configure contrail:");
    println!("     contrail config set username YOUR_USERNAME");
    println!("     contrail config set token YOUR_TOKEN_HERE");
    println!();
    println!("Or pass them directly:");
    println!("  contrail --username YOUR_USERNAME --token YOUR_TOKEN");
}

/// Fetch everything and assemble the report. Profile and repository data are
/// best-effort: the contribution dashboard still renders without them. A
/// malformed calendar payload degrades to zeroed stats rather than failing.
async fn run_analysis(
    source: &dyn ContributionSource,
    username: &str,
    show_private: bool,
    milestones: &[u64],
    today: NaiveDate,
) -> Result<ActivityReport> {
    let (windows, profile_env, repos_env) = futures::join!(
        fetch::fetch_year_windows(source, username, today),
        source.profile(username),
        source.repositories(username),
    );
    // A failed calendar fetch renders as zeroed stats, not a crashed report.
    let windows = windows.unwrap_or_else(|e| {
        utils::warn_once(format!("⚠️  No contribution data available: {e:#}"));
        fetch::YearWindows {
            prior_year: Default::default(),
            current_year: Default::default(),
        }
    });

    let mut current = normalize_or_empty(&windows.current_year, "current-year");
    let mut prior = normalize_or_empty(&windows.prior_year, "prior-year");
    if !show_private {
        current.private_contributions = 0;
        prior.private_contributions = 0;
    }

    let user = match profile_env {
        Ok(envelope) => match series::normalize_profile(&envelope, username, Utc::now()) {
            Ok(profile) => Some(profile),
            Err(e) => {
                utils::warn_once(format!("⚠️  Skipping profile data: {e:#}"));
                None
            }
        },
        Err(e) => {
            utils::warn_once(format!("⚠️  Failed to fetch profile: {e:#}"));
            None
        }
    };

    let languages = match repos_env {
        Ok(envelope) => series::normalize_languages(&envelope).unwrap_or_default(),
        Err(e) => {
            utils::warn_once(format!("⚠️  Failed to fetch repositories: {e:#}"));
            Default::default()
        }
    };

    Ok(report::build_report(
        user, languages, &prior, &current, today, milestones,
    ))
}

fn normalize_or_empty(envelope: &fetch::GraphQlEnvelope, label: &str) -> NormalizedCalendar {
    match series::normalize(envelope) {
        Ok(calendar) => calendar,
        Err(e) => {
            utils::warn_once(format!("⚠️  No {label} contribution data: {e:#}"));
            NormalizedCalendar::default()
        }
    }
}

async fn build_live_report(
    username: &str,
    token: &str,
    config: &config::Config,
) -> Result<ActivityReport> {
    if username.is_empty() || token.is_empty() {
        show_auth_help(username.is_empty(), token.is_empty());
        anyhow::bail!("Missing GitHub credentials");
    }

    let client = GitHubClient::new(token)?;
    let today = Local::now().date_naive();
    run_analysis(
        &client,
        username,
        config.analysis.show_private,
        &config.analysis.milestones,
        today,
    )
    .await
}

async fn run_report(
    username: &str,
    token: &str,
    config: &config::Config,
    json: bool,
    format_options: &utils::NumberFormatOptions,
) -> Result<()> {
    let report = build_live_report(username, token, config).await?;

    if json {
        let json = simd_json::to_string_pretty(&report)?;
        println!("{json}");
    } else {
        report::print_report(&report, format_options);
    }

    Ok(())
}

async fn run_repo(
    username: &str,
    token: &str,
    args: RepoArgs,
    format_options: &utils::NumberFormatOptions,
) -> Result<()> {
    if username.is_empty() || token.is_empty() {
        show_auth_help(username.is_empty(), token.is_empty());
        anyhow::bail!("Missing GitHub credentials");
    }

    let client = GitHubClient::new(token)?;
    let envelope = client.repository_details(username, &args.name).await?;
    let details = series::normalize_repository(&envelope)?;

    if args.json {
        let json = simd_json::to_string_pretty(&details)?;
        println!("{json}");
    } else {
        report::print_repository(&details, format_options);
    }

    Ok(())
}

async fn run_stats(
    username: &str,
    token: &str,
    config: &config::Config,
    args: StatsArgs,
) -> Result<()> {
    let report = build_live_report(username, token, config).await?;

    if args.pretty {
        let json = simd_json::to_string_pretty(&report)?;
        println!("{json}");
    } else {
        let json = simd_json::to_string(&report)?;
        println!("{json}");
    }

    Ok(())
}

fn handle_config_subcommand(config_args: ConfigArgs) {
    match config_args.subcommand {
        ConfigSubcommands::Init { overwrite } => {
            if let Err(e) = config::create_default_config(overwrite) {
                eprintln!("Error creating config: {e}");
                std::process::exit(1);
            }
        }
        ConfigSubcommands::Show => {
            if let Err(e) = config::show_config() {
                eprintln!("Error showing config: {e}");
                std::process::exit(1);
            }
        }
        ConfigSubcommands::Set { key, value } => {
            if let Err(e) = config::set_config_value(&key, &value) {
                eprintln!("Error setting config: {e}");
                std::process::exit(1);
            }
        }
    }
}
