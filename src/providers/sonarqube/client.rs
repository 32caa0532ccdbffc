use log::debug;
use reqwest::{Client, StatusCode};
use url::Url;

use crate::auth::Token;
use crate::cleanup::{DeleteOutcome, ProjectDeleter};
use crate::error::Result;
use crate::project_key::ProjectKey;
use crate::providers::http::{self, HttpResponse};

/// SonarQube Web API client for deleting projects.
pub struct SonarQubeClient {
    client: Client,
    base_url: String,
    token: Token,
}

impl SonarQubeClient {
    /// Create a new SonarQube client.
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

    /// `{base}/api/projects/delete?project={key}` with the key URL-encoded.
    pub fn delete_url(&self, key: &ProjectKey) -> Result<Url> {
        let mut url = http::endpoint(&self.base_url, &["api", "projects", "delete"])?;
        url.query_pairs_mut().append_pair("project", key.as_str());
        Ok(url)
    }

    async fn post_delete(&self, key: &ProjectKey) -> Result<HttpResponse> {
        let url = self.delete_url(key)?;
        debug!("Deleting SonarQube project via {url}");

        http::send(self.client.post(url), &self.token).await
    }
}

impl ProjectDeleter for SonarQubeClient {
    async fn delete_project(&self, key: &ProjectKey) -> DeleteOutcome {
        match self.post_delete(key).await {
            Ok(response) if response.status == StatusCode::NO_CONTENT => DeleteOutcome::Deleted,
            Ok(response) => DeleteOutcome::Rejected {
                status: response.status.as_u16(),
                body: response.body,
            },
            Err(e) => DeleteOutcome::Failed(e.to_string()),
        }
    }
}
