use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

static GROUP_ID_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<groupId>(.*?)</groupId>").expect("Invalid regex pattern"));
static ARTIFACT_ID_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<artifactId>(.*?)</artifactId>").expect("Invalid regex pattern"));

/// Key of a SonarQube project, `<groupId>:<artifactId>:<branch>`.
///
/// Any segment may be empty when the descriptor lacked the matching tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectKey(String);

impl ProjectKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Builds the SonarQube project key for a branch from `pom.xml` text.
///
/// Takes the first `<groupId>` and first `<artifactId>` in the document; a
/// missing tag yields an empty segment rather than an error. Tag text is
/// taken as is, whitespace included. Every `/` or ASCII whitespace character
/// in the branch becomes `-`.
///
/// # Examples
///
/// `("<groupId>com.example</groupId><artifactId>app</artifactId>", "feature/login fix")`
/// gives `com.example:app:feature-login-fix`.
pub fn build_project_key(descriptor: &str, branch_display_id: &str) -> ProjectKey {
    let group_id = first_tag_value(&GROUP_ID_REGEX, descriptor);
    let artifact_id = first_tag_value(&ARTIFACT_ID_REGEX, descriptor);
    let branch = normalize_branch(branch_display_id);

    ProjectKey(format!("{group_id}:{artifact_id}:{branch}"))
}

fn first_tag_value<'a>(regex: &Regex, text: &'a str) -> &'a str {
    regex
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map_or("", |m| m.as_str())
}

fn normalize_branch(branch: &str) -> String {
    branch
        .chars()
        .map(|c| if is_separator(c) { '-' } else { c })
        .collect()
}

/// `/` or ASCII whitespace, vertical tab included. Unicode spaces are kept.
fn is_separator(c: char) -> bool {
    c == '/' || c.is_ascii_whitespace() || c == '\u{000B}'
}
