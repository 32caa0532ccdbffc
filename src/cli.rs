use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::{error, info, warn};
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::cleanup::handle_merge;
use crate::config::{CleanupConfig, Config};
use crate::event::WebhookPayload;
use crate::project_key::build_project_key;
use crate::providers::{BitbucketClient, SonarQubeClient};

#[derive(Parser)]
#[command(name = "sonarsweep")]
#[command(author, version, about = "Deletes SonarQube branch projects after Bitbucket merges", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Settings file (TOML, JSON or YAML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Handle one Bitbucket webhook payload
    Handle {
        /// Payload file; read from stdin when omitted
        #[arg(short, long)]
        event: Option<PathBuf>,

        #[arg(long, env = "BITBUCKET_TOKEN", hide_env_values = true)]
        bitbucket_token: Option<String>,

        #[arg(long, env = "SONARQUBE_TOKEN", hide_env_values = true)]
        sonarqube_token: Option<String>,
    },
    /// Print the SonarQube project key derived for a pom.xml and branch
    Key {
        #[arg(short, long)]
        pom: PathBuf,

        #[arg(short, long)]
        branch: String,
    },
}

impl Cli {
    /// Loads the settings, degrading to "nothing is protected" when they are
    /// missing or unreadable.
    fn load_cleanup_config(
        &self,
        bitbucket_token: Option<String>,
        sonarqube_token: Option<String>,
    ) -> CleanupConfig {
        let config = Config::load(self.config.as_deref()).unwrap_or_else(|e| {
            error!("An error occurred while loading configuration: {e:#}");
            Config::default()
        });

        let config = config.into_cleanup_config(bitbucket_token, sonarqube_token);

        if config.protected_branches.is_empty() {
            warn!("No protected branches configured; merges will not trigger any cleanup");
        }
        if config.sonarqube_token.is_empty() {
            warn!("No SonarQube token configured");
        }

        config
    }

    async fn execute_handle(
        &self,
        event_path: Option<&Path>,
        bitbucket_token: Option<String>,
        sonarqube_token: Option<String>,
    ) -> Result<()> {
        let body = match event_path {
            Some(path) => std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read event payload: {}", path.display()))?,
            None => {
                let mut body = String::new();
                std::io::stdin()
                    .read_to_string(&mut body)
                    .context("Failed to read event payload from stdin")?;
                body
            }
        };

        let payload = WebhookPayload::from_json(&body).context("Invalid webhook payload")?;
        let event_key = payload.event_key.clone();

        let Some(event) = payload.into_merge_event() else {
            info!("Ignoring webhook event '{event_key}'");
            return Ok(());
        };

        let config = self.load_cleanup_config(bitbucket_token, sonarqube_token);

        let fetcher =
            BitbucketClient::new(&config.bitbucket_base_url, config.bitbucket_token.clone())?;
        let deleter =
            SonarQubeClient::new(&config.sonarqube_base_url, config.sonarqube_token.clone())?;

        let outcome = handle_merge(&event, &config, &fetcher, &deleter).await;
        info!("Finished handling merge for {}: {outcome}", event.repository_label());

        Ok(())
    }

    fn execute_key(pom: &Path, branch: &str) -> Result<()> {
        let descriptor = std::fs::read_to_string(pom)
            .with_context(|| format!("Failed to read pom file: {}", pom.display()))?;

        println!("{}", build_project_key(&descriptor, &branch.to_lowercase()));

        Ok(())
    }

    pub async fn execute(&self) -> Result<()> {
        match &self.command {
            Commands::Handle {
                event,
                bitbucket_token,
                sonarqube_token,
            } => {
                self.execute_handle(
                    event.as_deref(),
                    bitbucket_token.clone(),
                    sonarqube_token.clone(),
                )
                .await
            }
            Commands::Key { pom, branch } => Self::execute_key(pom, branch),
        }
    }
}
