use crate::error::{Result, RosterError};
use crate::paths;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Skill {
    pub slug: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default = "default_active")]
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_active() -> bool {
    true
}

impl Skill {
    pub fn create(root: &Path, slug: impl Into<String>, name: impl Into<String>) -> Result<Self> {
        let slug = slug.into();
        paths::validate_slug(&slug)?;
        if paths::skill_manifest(root, &slug).exists() {
            return Err(RosterError::SkillExists(slug));
        }
        let name = name.into();
        if name.trim().is_empty() {
            return Err(RosterError::validation("name", "is required"));
        }
        let now = Utc::now();
        let skill = Self {
            slug,
            name,
            category: None,
            description: None,
            active: true,
            created_at: now,
            updated_at: now,
        };
        skill.save(root)?;
        Ok(skill)
    }

    pub fn load(root: &Path, slug: &str) -> Result<Self> {
        paths::validate_slug(slug).map_err(|_| RosterError::SkillNotFound(slug.to_string()))?;
        crate::io::read_yaml(&paths::skill_manifest(root, slug))?
            .ok_or_else(|| RosterError::SkillNotFound(slug.to_string()))
    }

    /// Load and treat a deactivated skill as missing.
    pub fn load_active(root: &Path, slug: &str) -> Result<Self> {
        let skill = Self::load(root, slug)?;
        if !skill.active {
            return Err(RosterError::SkillNotFound(slug.to_string()));
        }
        Ok(skill)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        crate::io::write_yaml(&paths::skill_manifest(root, &self.slug), self)
    }

    pub fn list(root: &Path) -> Result<Vec<Self>> {
        crate::io::load_manifests(&root.join(paths::SKILLS_DIR))
    }

    pub fn deactivate(&mut self) {
        self.active = false;
        self.updated_at = Utc::now();
    }
}
