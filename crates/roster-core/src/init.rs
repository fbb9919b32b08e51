use crate::config::Config;
use crate::error::Result;
use crate::paths;
use crate::vertical::{default_catalog, Vertical};
use serde::Serialize;
use std::path::Path;

#[derive(Debug, Default, Serialize)]
pub struct InitReport {
    pub created_config: bool,
    /// Default verticals written on this run; existing ones are left alone.
    pub seeded_verticals: Vec<String>,
}

/// Create the `.roster/` layout, a default config and the default vertical
/// catalog. Safe to run again: nothing existing is overwritten.
pub fn init(root: &Path, organization: &str) -> Result<InitReport> {
    for dir in paths::ALL_DIRS {
        crate::io::ensure_dir(&root.join(dir))?;
    }

    let mut report = InitReport::default();
    if !paths::config_path(root).exists() {
        Config::new(organization).save(root)?;
        report.created_config = true;
    }

    for vertical in default_catalog() {
        if !paths::vertical_manifest(root, &vertical.slug).exists() {
            vertical.save(root)?;
            report.seeded_verticals.push(vertical.slug);
        }
    }
    tracing::debug!(
        created_config = report.created_config,
        seeded = report.seeded_verticals.len(),
        "roster initialized"
    );
    Ok(report)
}

pub fn is_initialized(root: &Path) -> bool {
    paths::config_path(root).exists()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn init_is_idempotent() {
        let dir = TempDir::new().unwrap();
        assert!(!is_initialized(dir.path()));

        let first = init(dir.path(), "Riverside").unwrap();
        assert!(first.created_config);
        assert_eq!(first.seeded_verticals.len(), default_catalog().len());
        assert_eq!(Config::load(dir.path()).unwrap().organization.name, "Riverside");

        let mut v = Vertical::load(dir.path(), "health").unwrap();
        v.deactivate();
        v.save(dir.path()).unwrap();

        let second = init(dir.path(), "Other").unwrap();
        assert!(!second.created_config);
        assert!(second.seeded_verticals.is_empty());
        assert!(!Vertical::load(dir.path(), "health").unwrap().active);
        assert_eq!(Config::load(dir.path()).unwrap().organization.name, "Riverside");
    }
}
