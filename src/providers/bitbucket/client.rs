use log::{debug, error};
use reqwest::{Client, StatusCode};
use url::Url;

use crate::auth::Token;
use crate::cleanup::DescriptorFetcher;
use crate::error::Result;
use crate::providers::http::{self, HttpResponse};

/// Bitbucket Server REST client for reading a repository's `pom.xml`.
pub struct BitbucketClient {
    client: Client,
    base_url: String,
    token: Token,
}

impl BitbucketClient {
    /// Create a new Bitbucket client.
    ///
    /// The base URL is parsed per request, so a malformed one surfaces as a
    /// failed fetch rather than here.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(base_url: &str, token: Token) -> Result<Self> {
        Ok(Self {
            client: http::build_client()?,
            base_url: base_url.to_owned(),
            token,
        })
    }

    /// `{base}/rest/api/1.0/projects/{project}/repos/{repo}/browse/pom.xml`
    pub fn descriptor_url(&self, project_key: &str, repository_slug: &str) -> Result<Url> {
        http::endpoint(
            &self.base_url,
            &[
                "rest",
                "api",
                "1.0",
                "projects",
                project_key,
                "repos",
                repository_slug,
                "browse",
                "pom.xml",
            ],
        )
    }

    async fn get_descriptor(
        &self,
        project_key: &str,
        repository_slug: &str,
    ) -> Result<HttpResponse> {
        let url = self.descriptor_url(project_key, repository_slug)?;
        debug!("Fetching pom.xml from {url}");

        http::send(self.client.get(url), &self.token).await
    }
}

impl DescriptorFetcher for BitbucketClient {
    async fn fetch_descriptor(&self, project_key: &str, repository_slug: &str) -> String {
        match self.get_descriptor(project_key, repository_slug).await {
            Ok(response) if response.status == StatusCode::OK => response.body,
            Ok(response) => {
                error!(
                    "Failed to fetch pom.xml for {project_key}/{repository_slug}. HTTP status: {}, body: {}",
                    response.status, response.body
                );
                String::new()
            }
            Err(e) => {
                error!(
                    "An error occurred while fetching pom.xml for {project_key}/{repository_slug}: {e}"
                );
                String::new()
            }
        }
    }
}
