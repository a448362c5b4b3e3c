//! GitHub token resolution.
//!
//! Order:
//! 1. Explicit `--repo-token` value
//! 2. GITHUB_TOKEN env var
//! 3. GH_TOKEN env var
//! 4. `gh auth token` (local runs)

use std::env;
use std::process::Command;

use crate::error::GitHubError;

/// Get a GitHub token, preferring an explicitly configured one.
pub fn get_github_token(explicit: Option<&str>) -> Result<String, GitHubError> {
    if let Some(token) = explicit.map(str::trim).filter(|t| !t.is_empty()) {
        return Ok(token.to_string());
    }

    for var in ["GITHUB_TOKEN", "GH_TOKEN"] {
        if let Ok(token) = env::var(var)
            && !token.is_empty()
        {
            return Ok(token);
        }
    }

    get_token_from_gh_cli().ok_or(GitHubError::AuthenticationFailed)
}

fn get_token_from_gh_cli() -> Option<String> {
    let output = Command::new("gh").args(["auth", "token"]).output().ok()?;

    if !output.status.success() {
        return None;
    }

    let token = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (!token.is_empty()).then_some(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_token_wins() {
        temp_env::with_var("GITHUB_TOKEN", Some("from-env"), || {
            assert_eq!(get_github_token(Some("explicit")).unwrap(), "explicit");
        });
    }

    #[test]
    fn test_blank_explicit_token_falls_back_to_env() {
        temp_env::with_var("GITHUB_TOKEN", Some("from-env"), || {
            assert_eq!(get_github_token(Some("  ")).unwrap(), "from-env");
        });
    }

    #[test]
    fn test_gh_token_fallback() {
        temp_env::with_vars(
            [("GITHUB_TOKEN", None), ("GH_TOKEN", Some("gh-env"))],
            || {
                assert_eq!(get_github_token(None).unwrap(), "gh-env");
            },
        );
    }
}
