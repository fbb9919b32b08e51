use crate::error::{Result, RosterError};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const ROSTER_DIR: &str = ".roster";
pub const MEMBERS_DIR: &str = ".roster/members";
pub const SKILLS_DIR: &str = ".roster/skills";
pub const CERTIFICATIONS_DIR: &str = ".roster/certifications";
pub const TRAINERS_DIR: &str = ".roster/trainers";
pub const VERTICALS_DIR: &str = ".roster/verticals";
pub const ASSESSMENTS_DIR: &str = ".roster/assessments";
pub const SUCCESSION_DIR: &str = ".roster/succession";

pub const CONFIG_FILE: &str = ".roster/config.yaml";
pub const MANIFEST_FILE: &str = "manifest.yaml";
pub const ATTEMPTS_DIR: &str = "attempts";

pub const ALL_DIRS: &[&str] = &[
    ROSTER_DIR,
    MEMBERS_DIR,
    SKILLS_DIR,
    CERTIFICATIONS_DIR,
    TRAINERS_DIR,
    VERTICALS_DIR,
    ASSESSMENTS_DIR,
    SUCCESSION_DIR,
];

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

pub fn roster_dir(root: &Path) -> PathBuf {
    root.join(ROSTER_DIR)
}

pub fn member_manifest(root: &Path, id: &str) -> PathBuf {
    root.join(MEMBERS_DIR).join(id).join(MANIFEST_FILE)
}

pub fn skill_manifest(root: &Path, slug: &str) -> PathBuf {
    root.join(SKILLS_DIR).join(slug).join(MANIFEST_FILE)
}

pub fn certification_manifest(root: &Path, slug: &str) -> PathBuf {
    root.join(CERTIFICATIONS_DIR).join(slug).join(MANIFEST_FILE)
}

pub fn trainer_manifest(root: &Path, member_id: &str) -> PathBuf {
    root.join(TRAINERS_DIR).join(member_id).join(MANIFEST_FILE)
}

pub fn vertical_manifest(root: &Path, slug: &str) -> PathBuf {
    root.join(VERTICALS_DIR).join(slug).join(MANIFEST_FILE)
}

pub fn assessment_dir(root: &Path, member_id: &str) -> PathBuf {
    root.join(ASSESSMENTS_DIR).join(member_id)
}

pub fn assessment_manifest(root: &Path, member_id: &str) -> PathBuf {
    assessment_dir(root, member_id).join(MANIFEST_FILE)
}

pub fn assessment_attempt(root: &Path, member_id: &str, version: u32) -> PathBuf {
    assessment_dir(root, member_id)
        .join(ATTEMPTS_DIR)
        .join(format!("{version}.yaml"))
}

pub fn succession_manifest(root: &Path, slug: &str) -> PathBuf {
    root.join(SUCCESSION_DIR).join(slug).join(MANIFEST_FILE)
}

// ---------------------------------------------------------------------------
// Slug validation
// ---------------------------------------------------------------------------

static SLUG_RE: OnceLock<Regex> = OnceLock::new();

fn slug_re() -> &'static Regex {
    SLUG_RE.get_or_init(|| {
        Regex::new(r"^[a-z0-9][a-z0-9\-]*[a-z0-9]$|^[a-z0-9]$").expect("slug regex is valid")
    })
}

pub fn validate_slug(slug: &str) -> Result<()> {
    if slug.is_empty() || slug.len() > 64 || !slug_re().is_match(slug) {
        return Err(RosterError::InvalidSlug(slug.to_string()));
    }
    Ok(())
}

/// Record ids are either slugs or UUIDs; both are safe single path segments.
pub fn validate_id(id: &str) -> Result<()> {
    validate_slug(id)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
