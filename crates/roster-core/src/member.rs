use crate::certification::Certification;
use crate::error::{Result, RosterError};
use crate::paths;
use crate::skill::Skill;
use chrono::{DateTime, Months, NaiveDate, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// MemberStatus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberStatus {
    Active,
    Inactive,
}

impl fmt::Display for MemberStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MemberStatus::Active => "active",
            MemberStatus::Inactive => "inactive",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// MemberCertification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberCertification {
    pub certification: String,
    pub obtained_on: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_on: Option<NaiveDate>,
}

impl MemberCertification {
    pub fn is_expired(&self, today: NaiveDate) -> bool {
        self.expires_on.is_some_and(|d| d < today)
    }
}

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewMember {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub chapter: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
}

/// Partial update; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemberUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub chapter: Option<String>,
}

// ---------------------------------------------------------------------------
// Validation helpers
// ---------------------------------------------------------------------------

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_re() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email regex is valid")
    })
}

/// Trim and lowercase; reject anything that is not `local@domain.tld`.
pub fn normalize_email(raw: &str) -> Result<String> {
    let email = raw.trim().to_ascii_lowercase();
    if email.is_empty() {
        return Err(RosterError::validation("email", "is required"));
    }
    if !email_re().is_match(&email) {
        return Err(RosterError::validation(
            "email",
            format!("'{}' is not a valid address", raw.trim()),
        ));
    }
    Ok(email)
}

fn require_name(raw: &str) -> Result<String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(RosterError::validation("name", "is required"));
    }
    Ok(name.to_string())
}

fn non_blank(raw: Option<String>) -> Option<String> {
    raw.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

// ---------------------------------------------------------------------------
// Member
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chapter: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub certifications: Vec<MemberCertification>,
    pub status: MemberStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Member {
    // ---------------------------------------------------------------------------
    // Persistence
    // ---------------------------------------------------------------------------

    /// Validate and store a new member. Email must be unique across the store
    /// and every skill must exist.
    pub fn create(root: &Path, input: NewMember) -> Result<Self> {
        let member = Self::build(root, input)?;
        member.save(root)?;
        tracing::debug!(member = %member.id, "member created");
        Ok(member)
    }

    /// Validate a new member without writing it, for callers that add more
    /// (certifications) before the first save.
    pub fn build(root: &Path, input: NewMember) -> Result<Self> {
        let name = require_name(&input.name)?;
        let email = normalize_email(&input.email)?;
        if Self::find_by_email(root, &email)?.is_some() {
            return Err(RosterError::MemberExists(email));
        }
        let mut skills = Vec::new();
        for slug in input.skills {
            Skill::load_active(root, &slug)?;
            if !skills.contains(&slug) {
                skills.push(slug);
            }
        }

        let now = Utc::now();
        Ok(Self {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            email,
            phone: non_blank(input.phone),
            chapter: non_blank(input.chapter),
            skills,
            certifications: Vec::new(),
            status: MemberStatus::Active,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn load(root: &Path, id: &str) -> Result<Self> {
        paths::validate_id(id).map_err(|_| RosterError::MemberNotFound(id.to_string()))?;
        crate::io::read_yaml(&paths::member_manifest(root, id))?
            .ok_or_else(|| RosterError::MemberNotFound(id.to_string()))
    }

    pub fn load_active(root: &Path, id: &str) -> Result<Self> {
        let member = Self::load(root, id)?;
        if member.status != MemberStatus::Active {
            return Err(RosterError::MemberInactive(id.to_string()));
        }
        Ok(member)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        crate::io::write_yaml(&paths::member_manifest(root, &self.id), self)
    }

    /// All members ordered by name, then email.
    pub fn list(root: &Path) -> Result<Vec<Self>> {
        let mut members: Vec<Self> = crate::io::load_manifests(&root.join(paths::MEMBERS_DIR))?;
        members.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.email.cmp(&b.email)));
        Ok(members)
    }

    pub fn find_by_email(root: &Path, email: &str) -> Result<Option<Self>> {
        let needle = email.trim().to_ascii_lowercase();
        Ok(Self::list(root)?.into_iter().find(|m| m.email == needle))
    }

    // ---------------------------------------------------------------------------
    // Mutations
    // ---------------------------------------------------------------------------

    pub fn is_active(&self) -> bool {
        self.status == MemberStatus::Active
    }

    /// Apply a partial update. Changing the email re-checks uniqueness.
    pub fn update(&mut self, root: &Path, update: MemberUpdate) -> Result<()> {
        if let Some(name) = update.name {
            self.name = require_name(&name)?;
        }
        if let Some(raw) = update.email {
            let email = normalize_email(&raw)?;
            if email != self.email {
                if let Some(other) = Self::find_by_email(root, &email)? {
                    if other.id != self.id {
                        return Err(RosterError::MemberExists(email));
                    }
                }
                self.email = email;
            }
        }
        if update.phone.is_some() {
            self.phone = non_blank(update.phone);
        }
        if update.chapter.is_some() {
            self.chapter = non_blank(update.chapter);
        }
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn deactivate(&mut self) {
        self.status = MemberStatus::Inactive;
        self.updated_at = Utc::now();
    }

    pub fn reactivate(&mut self) {
        self.status = MemberStatus::Active;
        self.updated_at = Utc::now();
    }

    /// Add a skill. Returns `false` if the member already has it.
    pub fn add_skill(&mut self, root: &Path, slug: &str) -> Result<bool> {
        Skill::load_active(root, slug)?;
        if self.skills.iter().any(|s| s == slug) {
            return Ok(false);
        }
        self.skills.push(slug.to_string());
        self.updated_at = Utc::now();
        Ok(true)
    }

    /// Remove a skill. Returns `false` if the member did not have it.
    pub fn remove_skill(&mut self, slug: &str) -> bool {
        let before = self.skills.len();
        self.skills.retain(|s| s != slug);
        if self.skills.len() < before {
            self.updated_at = Utc::now();
            true
        } else {
            false
        }
    }

    /// Award (or re-award) a certification. Expiry follows the
    /// certification's validity period.
    pub fn award_certification(
        &mut self,
        root: &Path,
        slug: &str,
        obtained_on: NaiveDate,
    ) -> Result<&MemberCertification> {
        let cert = Certification::load_active(root, slug)?;
        let expires_on = cert
            .validity_months
            .and_then(|m| obtained_on.checked_add_months(Months::new(m)));
        let award = MemberCertification {
            certification: slug.to_string(),
            obtained_on,
            expires_on,
        };
        self.certifications.retain(|c| c.certification != slug);
        self.certifications.push(award);
        self.updated_at = Utc::now();
        let last = self.certifications.len() - 1;
        Ok(&self.certifications[last])
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn new_member(name: &str, email: &str) -> NewMember {
        NewMember {
            name: name.to_string(),
            email: email.to_string(),
            ..NewMember::default()
        }
    }

    #[test]
    fn create_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let m = Member::create(dir.path(), new_member("Asha Rao", " Asha@Example.org ")).unwrap();
        assert_eq!(m.email, "asha@example.org");
        assert_eq!(m.status, MemberStatus::Active);

        let loaded = Member::load(dir.path(), &m.id).unwrap();
        assert_eq!(loaded.name, "Asha Rao");
    }

    #[test]
    fn duplicate_email_is_case_insensitive() {
        let dir = TempDir::new().unwrap();
        Member::create(dir.path(), new_member("A", "a@example.org")).unwrap();
        assert!(matches!(
            Member::create(dir.path(), new_member("B", "A@EXAMPLE.org")),
            Err(RosterError::MemberExists(_))
        ));
    }

    #[test]
    fn invalid_input_rejected() {
        let dir = TempDir::new().unwrap();
        let err = Member::create(dir.path(), new_member(" ", "a@example.org")).unwrap_err();
        assert!(err.is_validation());
        let err = Member::create(dir.path(), new_member("A", "not-an-email")).unwrap_err();
        assert!(err.to_string().contains("email"));
    }

    #[test]
    fn unknown_skill_rejected() {
        let dir = TempDir::new().unwrap();
        let mut input = new_member("A", "a@example.org");
        input.skills = vec!["juggling".to_string()];
        assert!(matches!(
            Member::create(dir.path(), input),
            Err(RosterError::SkillNotFound(_))
        ));
    }

    #[test]
    fn load_rejects_path_traversal_ids() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            Member::load(dir.path(), "../config"),
            Err(RosterError::MemberNotFound(_))
        ));
    }

    #[test]
    fn update_checks_email_uniqueness() {
        let dir = TempDir::new().unwrap();
        Member::create(dir.path(), new_member("A", "a@example.org")).unwrap();
        let mut b = Member::create(dir.path(), new_member("B", "b@example.org")).unwrap();

        let err = b
            .update(
                dir.path(),
                MemberUpdate {
                    email: Some("a@example.org".to_string()),
                    ..MemberUpdate::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, RosterError::MemberExists(_)));

        b.update(
            dir.path(),
            MemberUpdate {
                phone: Some("98450 12345".to_string()),
                chapter: Some("".to_string()),
                ..MemberUpdate::default()
            },
        )
        .unwrap();
        assert_eq!(b.phone.as_deref(), Some("98450 12345"));
        assert!(b.chapter.is_none());
    }

    #[test]
    fn deactivated_member_fails_load_active() {
        let dir = TempDir::new().unwrap();
        let mut m = Member::create(dir.path(), new_member("A", "a@example.org")).unwrap();
        m.deactivate();
        m.save(dir.path()).unwrap();
        assert!(matches!(
            Member::load_active(dir.path(), &m.id),
            Err(RosterError::MemberInactive(_))
        ));
    }

    #[test]
    fn skills_are_idempotent() {
        let dir = TempDir::new().unwrap();
        Skill::create(dir.path(), "public-speaking", "Public speaking").unwrap();
        let mut m = Member::create(dir.path(), new_member("A", "a@example.org")).unwrap();
        assert!(m.add_skill(dir.path(), "public-speaking").unwrap());
        assert!(!m.add_skill(dir.path(), "public-speaking").unwrap());
        assert!(m.remove_skill("public-speaking"));
        assert!(!m.remove_skill("public-speaking"));
    }

    #[test]
    fn award_certification_sets_expiry() {
        let dir = TempDir::new().unwrap();
        let mut cert = Certification::create(dir.path(), "first-aid", "First aid").unwrap();
        cert.validity_months = Some(24);
        cert.save(dir.path()).unwrap();

        let mut m = Member::create(dir.path(), new_member("A", "a@example.org")).unwrap();
        let on = NaiveDate::from_ymd_opt(2025, 3, 31).unwrap();
        let award = m.award_certification(dir.path(), "first-aid", on).unwrap();
        assert_eq!(award.expires_on, NaiveDate::from_ymd_opt(2027, 3, 31));

        // Re-award replaces rather than duplicates.
        let later = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        m.award_certification(dir.path(), "first-aid", later).unwrap();
        assert_eq!(m.certifications.len(), 1);
        assert!(!m.certifications[0].is_expired(later));
    }
}
