use anyhow::{anyhow, Context, Result};
use log::debug;
use serde::{Deserialize, Deserializer};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::auth::Token;

const CONFIG_STEM: &str = "sonarsweep";

/// Settings file structure for sonarsweep.
///
/// Holds the Bitbucket and SonarQube endpoints with their tokens, and the
/// branches whose merges trigger cleanup.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    /// Bitbucket Server connection, source of `pom.xml`
    #[serde(default)]
    pub bitbucket: ServiceConfig,

    /// SonarQube connection, target of project deletion
    #[serde(default)]
    pub sonarqube: ServiceConfig,

    /// Protected branch names, either `"master,develop"` or a list
    #[serde(default, deserialize_with = "deserialize_branch_list")]
    pub protected_branches: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ServiceConfig {
    /// Instance base URL, may include a context path
    pub base_url: Option<String>,

    /// Bearer token (personal or project access token)
    pub token: Option<String>,
}

/// Resolved, read-only settings passed to every merge handling.
#[derive(Debug, Clone, Default)]
pub struct CleanupConfig {
    pub bitbucket_base_url: String,
    pub bitbucket_token: Token,
    pub sonarqube_base_url: String,
    pub sonarqube_token: Token,
    /// Lower-cased branch names; empty disables cleanup entirely
    pub protected_branches: HashSet<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum BranchList {
    Joined(String),
    Items(Vec<String>),
}

fn deserialize_branch_list<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match BranchList::deserialize(deserializer)? {
        BranchList::Joined(joined) => joined.split(',').map(str::to_owned).collect(),
        BranchList::Items(items) => items,
    })
}

/// Normalizes configured branch names: trimmed, lower-cased, blanks dropped.
pub fn parse_protected_branches<I, S>(names: I) -> HashSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    names
        .into_iter()
        .map(|name| name.as_ref().trim().to_lowercase())
        .filter(|name| !name.is_empty())
        .collect()
}

impl Config {
    /// Load configuration from a file.
    ///
    /// Searches for configuration files in this order:
    /// 1. Specified path
    /// 2. ./sonarsweep.toml, ./sonarsweep.json, ./sonarsweep.yaml, ./sonarsweep.yml
    /// 3. `<user config dir>/sonarsweep/sonarsweep.toml`
    ///
    /// Returns an error when no file is found.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load_from_path(path);
        }

        Self::load_first(&candidate_paths())
    }

    fn load_first(candidates: &[PathBuf]) -> Result<Self> {
        let found = candidates.iter().find(|path| path.exists()).ok_or_else(|| {
            anyhow!(
                "No configuration file found (looked in: {})",
                candidates
                    .iter()
                    .map(|p| p.display().to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            )
        })?;

        Self::load_from_path(found)
    }

    /// Load configuration from a specific file path.
    fn load_from_path(path: &Path) -> Result<Self> {
        debug!("Loading configuration from {}", path.display());

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or("");

        match extension {
            "toml" => toml::from_str(&contents)
                .with_context(|| format!("Failed to parse TOML config: {}", path.display())),
            "json" => serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display())),
            "yaml" | "yml" => serde_yaml::from_str(&contents)
                .with_context(|| format!("Failed to parse YAML config: {}", path.display())),
            _ => toml::from_str(&contents)
                .or_else(|_| serde_json::from_str(&contents))
                .or_else(|_| serde_yaml::from_str(&contents))
                .with_context(|| format!("Failed to parse config file: {}", path.display())),
        }
    }

    /// Resolves the file settings into the value handed to the orchestrator.
    ///
    /// Tokens given on the command line or through the environment win over
    /// the ones in the file. Unset URLs and tokens stay empty; the requests
    /// built from them fail and are logged at call time.
    pub fn into_cleanup_config(
        self,
        bitbucket_token: Option<String>,
        sonarqube_token: Option<String>,
    ) -> CleanupConfig {
        CleanupConfig {
            bitbucket_base_url: self.bitbucket.base_url.unwrap_or_default(),
            bitbucket_token: bitbucket_token
                .or(self.bitbucket.token)
                .map(Token::from)
                .unwrap_or_default(),
            sonarqube_base_url: self.sonarqube.base_url.unwrap_or_default(),
            sonarqube_token: sonarqube_token
                .or(self.sonarqube.token)
                .map(Token::from)
                .unwrap_or_default(),
            protected_branches: parse_protected_branches(&self.protected_branches),
        }
    }
}

fn candidate_paths() -> Vec<PathBuf> {
    let mut candidates: Vec<PathBuf> = ["toml", "json", "yaml", "yml"]
        .iter()
        .map(|ext| PathBuf::from(format!("{CONFIG_STEM}.{ext}")))
        .collect();

    if let Some(config_dir) = dirs::config_dir() {
        candidates.push(config_dir.join(CONFIG_STEM).join(format!("{CONFIG_STEM}.toml")));
    }

    candidates
}
