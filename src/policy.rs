use crate::config::CleanupConfig;

/// Whether `branch` is one of the configured protected branches.
///
/// Matching is case-insensitive; unknown branches are simply unprotected.
pub fn is_protected(branch: &str, config: &CleanupConfig) -> bool {
    config.protected_branches.contains(&branch.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_protected_branches;

    fn config_with(branches: &[&str]) -> CleanupConfig {
        CleanupConfig {
            protected_branches: parse_protected_branches(branches),
            ..CleanupConfig::default()
        }
    }

    #[test]
    fn test_case_insensitive() {
        let config = config_with(&["master"]);
        assert!(is_protected("master", &config));
        assert!(is_protected("Master", &config));
        assert!(is_protected("MASTER", &config));
    }

    #[test]
    fn test_configured_case_does_not_matter() {
        let config = config_with(&["Develop"]);
        assert!(is_protected("develop", &config));
    }

    #[test]
    fn test_unknown_branch_is_unprotected() {
        let config = config_with(&["master", "develop"]);
        assert!(!is_protected("feature/login", &config));
        assert!(!is_protected("", &config));
    }

    #[test]
    fn test_empty_set_protects_nothing() {
        let config = CleanupConfig::default();
        assert!(!is_protected("master", &config));
    }
}
