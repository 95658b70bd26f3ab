//! `publish` command: build, then force-push the output tree to a branch.
//!
//! The output directory becomes a throwaway repository with a single
//! commit, so the publish branch never accumulates history.

use std::path::Path;

use anyhow::{Context, Result};

use crate::config::{ConfigError, SiteConfig};
use crate::log;
use crate::pipeline::{BuildContext, build_all};
use crate::utils::exec::{Cmd, FilterRule, SILENT_FILTER};

/// Progress lines git prints while pushing.
const PUSH_FILTER: FilterRule = FilterRule::new(&[
    "Enumerating objects",
    "Counting objects",
    "Delta compression",
    "Compressing objects",
    "Writing objects",
    "Total ",
    "remote: ",
]);

pub fn publish_site(ctx: &BuildContext) -> Result<()> {
    let config = &ctx.config;
    let url = config
        .publish
        .git_url
        .as_deref()
        .filter(|url| !url.is_empty())
        .ok_or_else(|| ConfigError::Validation("publish.git_url is required".to_string()))?;

    build_all(ctx, false)?;

    let out = &config.build.output;
    commit_output(out, &config.publish.branch, &commit_message(config))?;

    log!("publish"; "pushing {} to {}", config.publish.branch, url);
    git(out, ["push", "--force", url, config.publish.branch.as_str()])
        .pty(true)
        .filter(&PUSH_FILTER)
        .run()
        .with_context(|| format!("failed to push to {url}"))?;

    match &config.publish.base_url {
        Some(base) => log!("publish"; "published to {}", base),
        None => log!("publish"; "done"),
    }
    Ok(())
}

fn commit_message(config: &SiteConfig) -> String {
    match config.publish.version.as_deref().or(config.site.version.as_deref()) {
        Some(version) => format!("Publish {version}"),
        None => "Publish".to_string(),
    }
}

/// Turn `out` into a repository whose `branch` holds exactly one commit.
fn commit_output(out: &Path, branch: &str, message: &str) -> Result<()> {
    git(out, ["init", "--quiet"]).run()?;
    git(out, ["checkout", "--quiet", "-B", branch]).run()?;
    git(out, ["add", "--all"]).run()?;
    git(out, ["commit", "--quiet", "--allow-empty", "-m", message])
        .run()
        .context("failed to commit the built site")?;
    Ok(())
}

fn git<const N: usize>(cwd: &Path, args: [&str; N]) -> Cmd {
    Cmd::new("git").args(args).cwd(cwd).filter(&SILENT_FILTER)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;

    #[test]
    fn test_commit_message_prefers_publish_version() {
        let config = test_parse_config(
            "[site]\nversion = \"2017\"\n[publish]\nversion = \"2017-2018\"",
        );
        assert_eq!(commit_message(&config), "Publish 2017-2018");

        let config = test_parse_config("[site]\nversion = \"2017\"");
        assert_eq!(commit_message(&config), "Publish 2017");

        assert_eq!(commit_message(&test_parse_config("")), "Publish");
    }

    #[test]
    fn test_missing_git_url_is_error() {
        let dir = tempfile::tempdir().unwrap();
        crate::config::test_site(dir.path());
        let ctx = BuildContext::new(crate::config::test_config(dir.path())).unwrap();
        let err = publish_site(&ctx).unwrap_err();
        assert!(err.to_string().contains("publish.git_url"));
        assert!(!ctx.config.build.output.exists());
    }
}
