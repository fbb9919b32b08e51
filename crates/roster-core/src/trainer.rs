use crate::error::{Result, RosterError};
use crate::member::{Member, MemberStatus};
use crate::paths;
use crate::skill::Skill;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const MAX_RATING: f64 = 5.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainerProfile {
    pub member_id: String,
    #[serde(default)]
    pub expertise: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default)]
    pub sessions_delivered: u32,
    /// Running average of session ratings, 0.0..=5.0.
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub rating_count: u32,
    pub status: MemberStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TrainerProfile {
    /// Register an active member as a trainer. Every expertise slug must be a
    /// known, active skill.
    pub fn create(root: &Path, member_id: &str, expertise: Vec<String>) -> Result<Self> {
        Member::load_active(root, member_id)?;
        if paths::trainer_manifest(root, member_id).exists() {
            return Err(RosterError::TrainerExists(member_id.to_string()));
        }
        for slug in &expertise {
            Skill::load_active(root, slug)?;
        }
        let now = Utc::now();
        let profile = Self {
            member_id: member_id.to_string(),
            expertise,
            bio: None,
            sessions_delivered: 0,
            rating: 0.0,
            rating_count: 0,
            status: MemberStatus::Active,
            created_at: now,
            updated_at: now,
        };
        profile.save(root)?;
        Ok(profile)
    }

    pub fn load(root: &Path, member_id: &str) -> Result<Self> {
        paths::validate_id(member_id)
            .map_err(|_| RosterError::TrainerNotFound(member_id.to_string()))?;
        crate::io::read_yaml(&paths::trainer_manifest(root, member_id))?
            .ok_or_else(|| RosterError::TrainerNotFound(member_id.to_string()))
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        crate::io::write_yaml(&paths::trainer_manifest(root, &self.member_id), self)
    }

    pub fn list(root: &Path) -> Result<Vec<Self>> {
        crate::io::load_manifests(&root.join(paths::TRAINERS_DIR))
    }

    /// Count a delivered session, folding `rating` into the running average.
    pub fn record_session(&mut self, rating: Option<f64>) -> Result<()> {
        if self.status != MemberStatus::Active {
            return Err(RosterError::InvalidTransition {
                from: self.status.to_string(),
                to: "session".to_string(),
                reason: "trainer is inactive".to_string(),
            });
        }
        if let Some(r) = rating {
            if !(0.0..=MAX_RATING).contains(&r) {
                return Err(RosterError::validation(
                    "rating",
                    format!("{r} is outside 0..={MAX_RATING}"),
                ));
            }
            let total = self.rating * f64::from(self.rating_count) + r;
            self.rating_count += 1;
            self.rating = total / f64::from(self.rating_count);
        }
        self.sessions_delivered += 1;
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn set_expertise(&mut self, root: &Path, expertise: Vec<String>) -> Result<()> {
        for slug in &expertise {
            Skill::load_active(root, slug)?;
        }
        self.expertise = expertise;
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn deactivate(&mut self) {
        self.status = MemberStatus::Inactive;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::member::NewMember;
    use tempfile::TempDir;

    fn member(root: &Path) -> Member {
        Member::create(
            root,
            NewMember {
                name: "Ravi".to_string(),
                email: "ravi@example.org".to_string(),
                ..NewMember::default()
            },
        )
        .unwrap()
    }

    #[test]
    fn create_requires_member_and_skills() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            TrainerProfile::create(dir.path(), "nobody", vec![]),
            Err(RosterError::MemberNotFound(_))
        ));

        let m = member(dir.path());
        assert!(matches!(
            TrainerProfile::create(dir.path(), &m.id, vec!["ghost".to_string()]),
            Err(RosterError::SkillNotFound(_))
        ));

        Skill::create(dir.path(), "facilitation", "Facilitation").unwrap();
        TrainerProfile::create(dir.path(), &m.id, vec!["facilitation".to_string()]).unwrap();
        assert!(matches!(
            TrainerProfile::create(dir.path(), &m.id, vec![]),
            Err(RosterError::TrainerExists(_))
        ));
    }

    #[test]
    fn rating_is_running_average() {
        let dir = TempDir::new().unwrap();
        let m = member(dir.path());
        let mut t = TrainerProfile::create(dir.path(), &m.id, vec![]).unwrap();
        t.record_session(Some(4.0)).unwrap();
        t.record_session(Some(5.0)).unwrap();
        t.record_session(None).unwrap();
        assert_eq!(t.sessions_delivered, 3);
        assert_eq!(t.rating_count, 2);
        assert!((t.rating - 4.5).abs() < f64::EPSILON);

        assert!(t.record_session(Some(5.5)).unwrap_err().is_validation());
        assert_eq!(t.sessions_delivered, 3);
    }

    #[test]
    fn inactive_trainer_cannot_log_sessions() {
        let dir = TempDir::new().unwrap();
        let m = member(dir.path());
        let mut t = TrainerProfile::create(dir.path(), &m.id, vec![]).unwrap();
        t.deactivate();
        assert!(t.record_session(None).is_err());
    }
}
