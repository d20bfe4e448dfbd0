use std::cell::RefCell;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::milestone::DEFAULT_MILESTONES;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    pub github: GitHubConfig,
    pub analysis: AnalysisConfig,
    pub formatting: FormattingConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GitHubConfig {
    pub username: String,
    /// Personal access token. The analytics core never inspects this; it
    /// only decides which windows the fetch layer may request.
    pub token: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AnalysisConfig {
    pub milestones: Vec<u64>,
    /// Include restricted (private) contributions; needs a token with the
    /// 'repo' scope.
    pub show_private: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct FormattingConfig {
    pub number_comma: bool,
    pub number_human: bool,
    pub locale: String,
    pub decimal_places: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            github: GitHubConfig {
                username: "".to_string(),
                token: "".to_string(),
            },
            analysis: AnalysisConfig {
                milestones: DEFAULT_MILESTONES.to_vec(),
                show_private: true,
            },
            formatting: FormattingConfig {
                number_comma: false,
                number_human: false,
                locale: "en".to_string(),
                decimal_places: 2,
            },
        }
    }
}

thread_local! {
    static TEST_CONFIG_PATH: RefCell<Option<PathBuf>> = const { RefCell::new(None) };
}

#[cfg(test)]
pub fn set_test_config_path(path: PathBuf) {
    TEST_CONFIG_PATH.with(|p| *p.borrow_mut() = Some(path));
}

impl Config {
    pub fn config_path() -> Result<PathBuf> {
        #[cfg(test)]
        {
            if let Some(path) = TEST_CONFIG_PATH.with(|p| p.borrow().clone()) {
                return Ok(path);
            }
        }

        Ok(dirs::home_dir()
            .context("Could not find home directory")?
            .join(".contrail.toml"))
    }

    pub fn load() -> Result<Option<Config>> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&config_path).context("Failed to read config file")?;

        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;

        Ok(Some(config))
    }

    pub fn save(&self, silent: bool) -> Result<()> {
        let config_path = Self::config_path()?;
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(&config_path, content).context("Failed to write config file")?;

        if !silent {
            println!("✅ Configuration saved to: {}", config_path.display());
        }

        Ok(())
    }

    pub fn is_configured(&self) -> bool {
        !self.github.username.is_empty() && !self.github.token.is_empty()
    }

    pub fn is_username_missing(&self) -> bool {
        self.github.username.is_empty()
    }

    pub fn is_token_missing(&self) -> bool {
        self.github.token.is_empty()
    }
}

// CLI helper functions
pub fn create_default_config(overwrite: bool) -> Result<()> {
    let config = Config::default();
    if !std::fs::exists(Config::config_path()?)? || overwrite {
        config.save(true)?;

        println!("📝 Created default configuration file.");
        println!("📍 Edit it with your GitHub username and personal access token:");
        println!("   contrail config set username ...");
        println!("   contrail config set token ...");
        println!("or");
        println!("   {}", Config::config_path()?.display());
    } else {
        println!("Configuration already exists.  Pass `--overwrite` to overwrite.");
    }

    Ok(())
}

pub fn show_config() -> Result<()> {
    match Config::load()? {
        Some(config) => {
            println!("🔧 Current configuration:");
            println!(
                "   Username: {}",
                if config.is_username_missing() {
                    "Not set"
                } else {
                    &config.github.username
                }
            );
            println!(
                "   Token: {}",
                if config.is_token_missing() { "Not set" } else { "Set" }
            );
            println!("   Show Private: {}", config.analysis.show_private);
            println!(
                "   Milestones: {}",
                config
                    .analysis
                    .milestones
                    .iter()
                    .map(|m| m.to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            );
            println!("   Number Comma: {}", config.formatting.number_comma);
            println!("   Number Human: {}", config.formatting.number_human);
            println!("   Locale: {}", config.formatting.locale);
            println!("   Decimal Places: {}", config.formatting.decimal_places);
            if !config.is_configured() {
                println!();
                println!("⚠️  Not fully configured; set the missing values with");
                println!("   'contrail config set username ...' / 'contrail config set token ...'");
            }
        }
        None => {
            println!("❌ No configuration file found.");
            println!("   Run 'contrail config init' to create one.");
        }
    }
    Ok(())
}

pub fn set_config_value(key: &str, value: &str) -> Result<()> {
    let mut config = Config::load()?.unwrap_or_default();

    match key {
        "username" => config.github.username = value.to_string(),
        "token" => config.github.token = value.to_string(),
        "show-private" => {
            let enabled = value
                .parse::<bool>()
                .context("Invalid boolean value. Use 'true' or 'false'")?;
            config.analysis.show_private = enabled;
        }
        "milestones" => {
            let milestones = value
                .split(',')
                .map(|m| m.trim().parse::<u64>())
                .collect::<Result<Vec<_>, _>>()
                .context("Invalid milestones. Use a comma-separated list of numbers")?;
            if milestones.is_empty() {
                anyhow::bail!("Milestone list cannot be empty");
            }
            config.analysis.milestones = milestones;
        }
        "number-comma" => {
            let enabled = value
                .parse::<bool>()
                .context("Invalid boolean value. Use 'true' or 'false'")?;
            config.formatting.number_comma = enabled;
        }
        "number-human" => {
            let enabled = value
                .parse::<bool>()
                .context("Invalid boolean value. Use 'true' or 'false'")?;
            config.formatting.number_human = enabled;
        }
        "locale" => {
            config.formatting.locale = value.to_string();
        }
        "decimal-places" => {
            let places = value.parse::<usize>().context("Invalid number value")?;
            config.formatting.decimal_places = places;
        }
        _ => anyhow::bail!("Unknown config key: {}", key),
    }

    config.save(false)?;
    Ok(())
}
