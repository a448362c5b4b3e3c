//! Amend mode: replace the pushed commit's message and force-push it back.

use tracing::{debug, info, warn};

use crate::error::AmendError;

use super::executor::GitExecutor;

/// New commit message: the generated text followed by the original message.
pub fn combine_message(generated: &str, original: &str) -> String {
    let original = original.trim();
    if original.is_empty() {
        generated.to_string()
    } else {
        format!("{generated} (was: {original})")
    }
}

fn args(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

/// Amend HEAD with the generated message and force-push it to `remote/branch`.
///
/// Refuses to touch anything unless the checked-out HEAD is `sha`. The
/// original message comes from `original` when the caller already knows it,
/// otherwise from `git log`. Returns the sha of the rewritten commit.
pub fn amend_and_push(
    git: &dyn GitExecutor,
    sha: &str,
    generated: &str,
    original: Option<&str>,
    remote: &str,
    branch: &str,
) -> Result<String, AmendError> {
    let head = git.run("verify HEAD", &args(&["rev-parse", "HEAD"]))?;
    if head != sha {
        return Err(AmendError::HeadMismatch {
            expected: sha.to_string(),
            actual: head,
        });
    }

    let original = match original.filter(|m| !m.trim().is_empty()) {
        Some(message) => message.to_string(),
        None => git.run("read message", &args(&["log", "-1", "--format=%B"]))?,
    };
    let message = combine_message(generated, &original);
    debug!("Amending {sha} with message: {message}");

    git.run(
        "amend",
        &args(&["commit", "--amend", "--allow-empty", "-m", &message]),
    )?;
    let amended = git.run("resolve amended HEAD", &args(&["rev-parse", "HEAD"]))?;

    let refspec = format!("HEAD:{branch}");
    match git.run("push", &args(&["push", "--force", remote, &refspec])) {
        Ok(_) => {
            info!("Force-pushed {amended} to {remote}/{branch}");
            Ok(amended)
        }
        Err(e) => {
            warn!("Amended commit {amended} exists locally but was not pushed");
            Err(AmendError::PushFailed(e.to_string()))
        }
    }
}
