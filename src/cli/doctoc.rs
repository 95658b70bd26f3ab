//! `doctoc` command: regenerate the tables of contents of the slide sources.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};

use crate::config::SiteConfig;
use crate::pipeline::BuildTarget;
use crate::render::update_toc;
use crate::utils::plural::plural_count;
use crate::{debug, log};

pub fn update_tocs(config: &SiteConfig) -> Result<()> {
    let sources = BuildTarget::Slides.selector(config)?.collect();
    let mut updated = 0;
    let mut failed = 0;

    for path in &sources {
        match update_file(path) {
            Ok(true) => {
                updated += 1;
                debug!("doctoc"; "{}", config.root_relative(path).display());
            }
            Ok(false) => {}
            Err(e) => {
                failed += 1;
                log!("error"; "{}: {e:#}", config.root_relative(path).display());
            }
        }
    }

    if failed > 0 {
        bail!("{} of {} failed", plural_count(failed, "file"), sources.len());
    }
    log!("doctoc"; "done, {} updated", plural_count(updated, "file"));
    Ok(())
}

/// Whether the file was rewritten.
fn update_file(path: &Path) -> Result<bool> {
    let markdown =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let Some(updated) = update_toc(&markdown) else {
        return Ok(false);
    };
    fs::write(path, updated).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{test_config, test_site};

    #[test]
    fn test_updates_slide_sources_only() {
        let dir = tempfile::tempdir().unwrap();
        test_site(dir.path());
        let deck = dir.path().join("subjects/js/README.md");
        fs::write(&deck, "# JavaScript\n\n## Types\n").unwrap();
        let readme_before = fs::read_to_string(dir.path().join("README.md")).unwrap();
        let config = test_config(dir.path());

        update_tocs(&config).unwrap();

        let deck_after = fs::read_to_string(&deck).unwrap();
        assert!(deck_after.starts_with("<!-- START doctoc"));
        assert!(deck_after.contains("- [JavaScript](#javascript)\n  - [Types](#types)\n"));
        assert_eq!(
            fs::read_to_string(dir.path().join("README.md")).unwrap(),
            readme_before
        );

        // A second run leaves the files alone.
        let mtime = fs::metadata(&deck).unwrap().modified().unwrap();
        update_tocs(&config).unwrap();
        assert_eq!(fs::metadata(&deck).unwrap().modified().unwrap(), mtime);
    }

    #[test]
    fn test_unreadable_source_fails_the_command() {
        let dir = tempfile::tempdir().unwrap();
        test_site(dir.path());
        fs::write(dir.path().join("subjects/js/BROKEN.md"), [0xff, 0xfe]).unwrap();
        let config = test_config(dir.path());

        let err = update_tocs(&config).unwrap_err();
        assert_eq!(err.to_string(), "1 file of 2 failed");
        assert!(
            fs::read_to_string(dir.path().join("subjects/js/README.md"))
                .unwrap()
                .contains("(#javascript)")
        );
    }
}
