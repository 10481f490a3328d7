use colored::*;
use log::warn;
use regex::Regex;

use crate::error::{Error, Result};
use crate::types::StrategyKind;
use crate::GitChain;

/// Defaults read from the repository's local git config, e.g.
/// `git config rebase-chain.remote origin`.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub remote: Option<String>,
    pub strategy: StrategyKind,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            remote: None,
            strategy: StrategyKind::Ancestry,
        }
    }
}

impl Settings {
    pub fn load(git_chain: &GitChain) -> Result<Settings> {
        let key_regex = Regex::new(r"^rebase-chain\.(?P<setting>.+)$")
            .map_err(|e| Error::Usage(e.to_string()))?;

        let mut settings = Settings::default();

        for (key, value) in git_chain.get_git_configs_matching_key(&key_regex)? {
            let setting = match key_regex.captures(&key) {
                Some(captures) => captures["setting"].to_string(),
                None => continue,
            };

            match setting.as_str() {
                "remote" => settings.remote = Some(value),
                "strategy" => {
                    settings.strategy = StrategyKind::parse(&value).ok_or_else(|| {
                        Error::Usage(format!(
                            "Invalid value for {}: {} (expected ancestry or tracking)",
                            key.bold(),
                            value
                        ))
                    })?;
                }
                _ => warn!("Ignoring unknown setting {}", key),
            }
        }

        Ok(settings)
    }
}
