use serde::Deserialize;

use crate::error::Result;

/// Webhook event key Bitbucket Server sends after a pull request merges.
pub const PR_MERGED_EVENT_KEY: &str = "pr:merged";

/// A completed pull-request merge, as seen by the cleanup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeEvent {
    /// Bitbucket project key, used to address the repository
    pub project_key: String,
    /// Human-readable project name, used in logs
    pub project_name: String,
    pub repository_name: String,
    pub repository_slug: String,
    pub target_branch: String,
    pub source_branch: String,
}

impl MergeEvent {
    /// `<project name>/<repository name>`, the context every log line carries.
    pub fn repository_label(&self) -> String {
        format!("{}/{}", self.project_name, self.repository_name)
    }
}

/// Bitbucket Server webhook body, trimmed to the fields the cleanup reads.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookPayload {
    pub event_key: String,
    pub pull_request: Option<PullRequest>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PullRequest {
    pub from_ref: PullRequestRef,
    pub to_ref: PullRequestRef,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PullRequestRef {
    pub display_id: String,
    pub repository: Repository,
}

#[derive(Debug, Deserialize)]
pub struct Repository {
    pub slug: String,
    pub name: String,
    pub project: Project,
}

#[derive(Debug, Deserialize)]
pub struct Project {
    pub key: String,
    pub name: String,
}

impl WebhookPayload {
    pub fn from_json(body: &str) -> Result<Self> {
        Ok(serde_json::from_str(body)?)
    }

    /// Converts a `pr:merged` payload into a [`MergeEvent`].
    ///
    /// Returns `None` for any other event key or when the pull request is
    /// missing. The repository is the merge target's, which is the repository
    /// the merge happened in.
    pub fn into_merge_event(self) -> Option<MergeEvent> {
        if self.event_key != PR_MERGED_EVENT_KEY {
            return None;
        }

        let pull_request = self.pull_request?;
        let repository = pull_request.to_ref.repository;

        Some(MergeEvent {
            project_key: repository.project.key,
            project_name: repository.project.name,
            repository_name: repository.name,
            repository_slug: repository.slug,
            target_branch: pull_request.to_ref.display_id,
            source_branch: pull_request.from_ref.display_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MERGED_PAYLOAD: &str = r#"{
  "eventKey": "pr:merged",
  "date": "2024-05-02T10:15:30+0000",
  "actor": { "name": "jdoe", "displayName": "J. Doe" },
  "pullRequest": {
    "id": 42,
    "title": "Login fix",
    "state": "MERGED",
    "fromRef": {
      "id": "refs/heads/feature/login fix",
      "displayId": "feature/login fix",
      "latestCommit": "d3adb33f",
      "repository": {
        "slug": "web-app",
        "name": "Web App",
        "project": { "key": "SHOP", "name": "Shop" }
      }
    },
    "toRef": {
      "id": "refs/heads/master",
      "displayId": "Master",
      "latestCommit": "c0ffee00",
      "repository": {
        "slug": "web-app",
        "name": "Web App",
        "project": { "key": "SHOP", "name": "Shop" }
      }
    }
  }
}"#;

    #[test]
    fn test_merged_payload_to_event() {
        let event = WebhookPayload::from_json(MERGED_PAYLOAD)
            .unwrap()
            .into_merge_event()
            .unwrap();

        assert_eq!(event.project_key, "SHOP");
        assert_eq!(event.project_name, "Shop");
        assert_eq!(event.repository_slug, "web-app");
        assert_eq!(event.repository_name, "Web App");
        assert_eq!(event.target_branch, "Master");
        assert_eq!(event.source_branch, "feature/login fix");
        assert_eq!(event.repository_label(), "Shop/Web App");
    }

    #[test]
    fn test_other_event_keys_are_ignored() {
        let payload = MERGED_PAYLOAD.replace("pr:merged", "pr:declined");
        let payload = WebhookPayload::from_json(&payload).unwrap();
        assert!(payload.into_merge_event().is_none());
    }

    #[test]
    fn test_payload_without_pull_request() {
        let payload = WebhookPayload::from_json(r#"{"eventKey": "pr:merged"}"#).unwrap();
        assert!(payload.into_merge_event().is_none());
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        assert!(WebhookPayload::from_json("not json").is_err());
    }
}
