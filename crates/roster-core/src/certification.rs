use crate::error::{Result, RosterError};
use crate::paths;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Certification {
    pub slug: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,
    /// Months an award stays valid; `None` never expires.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validity_months: Option<u32>,
    #[serde(default = "default_active")]
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_active() -> bool {
    true
}

impl Certification {
    pub fn create(root: &Path, slug: impl Into<String>, name: impl Into<String>) -> Result<Self> {
        let slug = slug.into();
        paths::validate_slug(&slug)?;
        if paths::certification_manifest(root, &slug).exists() {
            return Err(RosterError::CertificationExists(slug));
        }
        let name = name.into();
        if name.trim().is_empty() {
            return Err(RosterError::validation("name", "is required"));
        }
        let now = Utc::now();
        let cert = Self {
            slug,
            name,
            issuer: None,
            validity_months: None,
            active: true,
            created_at: now,
            updated_at: now,
        };
        cert.save(root)?;
        Ok(cert)
    }

    pub fn load(root: &Path, slug: &str) -> Result<Self> {
        paths::validate_slug(slug)
            .map_err(|_| RosterError::CertificationNotFound(slug.to_string()))?;
        crate::io::read_yaml(&paths::certification_manifest(root, slug))?
            .ok_or_else(|| RosterError::CertificationNotFound(slug.to_string()))
    }

    pub fn load_active(root: &Path, slug: &str) -> Result<Self> {
        let cert = Self::load(root, slug)?;
        if !cert.active {
            return Err(RosterError::CertificationNotFound(slug.to_string()));
        }
        Ok(cert)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        crate::io::write_yaml(&paths::certification_manifest(root, &self.slug), self)
    }

    pub fn list(root: &Path) -> Result<Vec<Self>> {
        crate::io::load_manifests(&root.join(paths::CERTIFICATIONS_DIR))
    }

    pub fn deactivate(&mut self) {
        self.active = false;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn create_load_and_deactivate() {
        let dir = TempDir::new().unwrap();
        let mut c = Certification::create(dir.path(), "trainer-l1", "Trainer level 1").unwrap();
        c.issuer = Some("National office".to_string());
        c.validity_months = Some(12);
        c.save(dir.path()).unwrap();

        let loaded = Certification::load(dir.path(), "trainer-l1").unwrap();
        assert_eq!(loaded.validity_months, Some(12));

        c.deactivate();
        c.save(dir.path()).unwrap();
        assert!(Certification::load_active(dir.path(), "trainer-l1").is_err());
        assert_eq!(Certification::list(dir.path()).unwrap().len(), 1);
    }

    #[test]
    fn missing_certification() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            Certification::load(dir.path(), "ghost"),
            Err(RosterError::CertificationNotFound(_))
        ));
    }
}
