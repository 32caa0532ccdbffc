use std::fmt;
use std::future::Future;

use log::{error, info, warn};

use crate::config::CleanupConfig;
use crate::event::MergeEvent;
use crate::policy::is_protected;
use crate::project_key::{build_project_key, ProjectKey};

/// Source of the `pom.xml` text for a repository.
///
/// Implementations never fail: any transport error or non-200 status is
/// logged and reported as an empty descriptor.
pub trait DescriptorFetcher {
    fn fetch_descriptor(
        &self,
        project_key: &str,
        repository_slug: &str,
    ) -> impl Future<Output = String> + Send;
}

/// Deletes an analysis project by key.
pub trait ProjectDeleter {
    fn delete_project(&self, key: &ProjectKey) -> impl Future<Output = DeleteOutcome> + Send;
}

/// Result of a single delete call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The service answered 204 No Content
    Deleted,
    /// The service answered with any other status
    Rejected { status: u16, body: String },
    /// The request never completed
    Failed(String),
}

/// Terminal state of one merge handling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CleanupOutcome {
    SkippedUnprotectedTarget,
    SkippedProtectedSource { key: ProjectKey },
    Deleted { key: ProjectKey },
    DeleteFailed { key: ProjectKey },
}

impl fmt::Display for CleanupOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SkippedUnprotectedTarget => f.write_str("skipped: unprotected target"),
            Self::SkippedProtectedSource { key } => write!(f, "skipped: protected source ({key})"),
            Self::Deleted { key } => write!(f, "deleted {key}"),
            Self::DeleteFailed { key } => write!(f, "delete failed for {key}"),
        }
    }
}

/// Runs the cleanup for one merged pull request.
///
/// Only merges into a protected branch are considered. The `pom.xml` is
/// fetched, the project key is derived from it and the source branch, and
/// the project is deleted unless the source branch is itself protected.
///
/// A failed descriptor fetch does not stop the run: the key is built with
/// empty group and artifact segments and the delete is still attempted.
/// Nothing is retried and nothing is returned as an error; the outcome is
/// logged and handed back for inspection.
pub async fn handle_merge<F, D>(
    event: &MergeEvent,
    config: &CleanupConfig,
    fetcher: &F,
    deleter: &D,
) -> CleanupOutcome
where
    F: DescriptorFetcher,
    D: ProjectDeleter,
{
    let repository = event.repository_label();

    let target_branch = event.target_branch.to_lowercase();
    if !is_protected(&target_branch, config) {
        info!(
            "Pull request target branch '{target_branch}' for the repo '{repository}' is not protected. No action taken."
        );
        return CleanupOutcome::SkippedUnprotectedTarget;
    }

    let descriptor = fetcher
        .fetch_descriptor(&event.project_key, &event.repository_slug)
        .await;
    if descriptor.is_empty() {
        warn!(
            "No pom.xml content for the repo '{repository}', project key will lack group and artifact"
        );
    }

    let source_branch = event.source_branch.to_lowercase();
    let key = build_project_key(&descriptor, &source_branch);

    if is_protected(&source_branch, config) {
        info!(
            "Source branch '{source_branch}' for the repo '{repository}' is protected. No deletion will be performed."
        );
        return CleanupOutcome::SkippedProtectedSource { key };
    }

    info!(
        "Attempting to delete branch '{source_branch}' for the repo '{repository}' from SonarQube as '{key}'."
    );

    match deleter.delete_project(&key).await {
        DeleteOutcome::Deleted => {
            info!("SonarQube project '{key}' deleted successfully.");
            CleanupOutcome::Deleted { key }
        }
        DeleteOutcome::Rejected { status, body } => {
            error!(
                "Failed to delete SonarQube project '{key}' for the repo '{repository}'. HTTP status: {status}, body: {body}"
            );
            CleanupOutcome::DeleteFailed { key }
        }
        DeleteOutcome::Failed(reason) => {
            error!(
                "An error occurred while deleting SonarQube project '{key}' for the repo '{repository}': {reason}"
            );
            CleanupOutcome::DeleteFailed { key }
        }
    }
}
