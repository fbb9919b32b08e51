//! Persisted skill-will assessments, one per member.
//!
//! The current attempt lives in `assessments/<member>/manifest.yaml`. A retake
//! archives it to `attempts/<version>.yaml` and starts `version + 1`, keeping
//! the roadmap so completed months carry over.

use crate::answers::{AnswerValue, Answers};
use crate::config::Config;
use crate::error::{Result, RosterError};
use crate::matcher::VerticalMatch;
use crate::member::Member;
use crate::paths;
use crate::roadmap::{self, RoadmapMilestone};
use crate::scoring::{self, Category};
use crate::vertical::Vertical;
use crate::wizard::{AssessmentOutcome, Wizard};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

// ---------------------------------------------------------------------------
// AssessmentStatus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentStatus {
    InProgress,
    Completed,
    Expired,
}

impl AssessmentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            AssessmentStatus::InProgress => "in_progress",
            AssessmentStatus::Completed => "completed",
            AssessmentStatus::Expired => "expired",
        }
    }
}

impl fmt::Display for AssessmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Assessment
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assessment {
    pub member_id: String,
    pub version: u32,
    pub status: AssessmentStatus,
    #[serde(default)]
    pub answers: Answers,
    #[serde(default)]
    pub skill_score: f64,
    #[serde(default)]
    pub will_score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommended_vertical: Option<String>,
    #[serde(default)]
    pub matches: Vec<VerticalMatch>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_vertical: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_mentor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub roadmap: Vec<RoadmapMilestone>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Assessment {
    fn fresh(member_id: &str, version: u32) -> Self {
        let now = Utc::now();
        Self {
            member_id: member_id.to_string(),
            version,
            status: AssessmentStatus::InProgress,
            answers: Answers::default(),
            skill_score: 0.0,
            will_score: 0.0,
            category: None,
            recommendation: None,
            recommended_vertical: None,
            matches: Vec::new(),
            assigned_vertical: None,
            assigned_mentor: None,
            assigned_at: None,
            roadmap: Vec::new(),
            created_at: now,
            updated_at: now,
            completed_at: None,
        }
    }

    // ---------------------------------------------------------------------------
    // Persistence
    // ---------------------------------------------------------------------------

    pub fn load(root: &Path, member_id: &str) -> Result<Self> {
        paths::validate_id(member_id)
            .map_err(|_| RosterError::AssessmentNotFound(member_id.to_string()))?;
        crate::io::read_yaml(&paths::assessment_manifest(root, member_id))?
            .ok_or_else(|| RosterError::AssessmentNotFound(member_id.to_string()))
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        crate::io::write_yaml(&paths::assessment_manifest(root, &self.member_id), self)
    }

    pub fn list(root: &Path) -> Result<Vec<Self>> {
        crate::io::load_manifests(&root.join(paths::ASSESSMENTS_DIR))
    }

    /// Archived attempts, oldest first.
    pub fn attempts(root: &Path, member_id: &str) -> Result<Vec<Self>> {
        let dir = paths::assessment_dir(root, member_id).join(paths::ATTEMPTS_DIR);
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut attempts = Vec::new();
        for entry in std::fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.extension().is_some_and(|e| e == "yaml") {
                if let Some(a) = crate::io::read_yaml::<Self>(&path)? {
                    attempts.push(a);
                }
            }
        }
        attempts.sort_by_key(|a| a.version);
        Ok(attempts)
    }

    // ---------------------------------------------------------------------------
    // Lifecycle
    // ---------------------------------------------------------------------------

    /// Begin (or resume) an attempt for an active member. A completed or
    /// expired assessment is archived and replaced by the next version, which
    /// keeps the previous roadmap and assignments.
    pub fn start(root: &Path, member_id: &str) -> Result<Self> {
        Member::load_active(root, member_id)?;
        let previous = match Self::load(root, member_id) {
            Ok(a) => Some(a),
            Err(RosterError::AssessmentNotFound(_)) => None,
            Err(e) => return Err(e),
        };

        let assessment = match previous {
            Some(a) if a.status == AssessmentStatus::InProgress => return Ok(a),
            Some(prev) => {
                crate::io::write_yaml(
                    &paths::assessment_attempt(root, member_id, prev.version),
                    &prev,
                )?;
                let mut next = Self::fresh(member_id, prev.version + 1);
                next.roadmap = prev.roadmap;
                next.assigned_vertical = prev.assigned_vertical;
                next.assigned_mentor = prev.assigned_mentor;
                next.assigned_at = prev.assigned_at;
                tracing::info!(member = member_id, version = next.version, "assessment retake");
                next
            }
            None => Self::fresh(member_id, 1),
        };
        assessment.save(root)?;
        Ok(assessment)
    }

    fn require_status(&self, expected: AssessmentStatus) -> Result<()> {
        if self.status != expected {
            return Err(RosterError::AssessmentState {
                member: self.member_id.clone(),
                status: self.status.to_string(),
                expected: expected.to_string(),
            });
        }
        Ok(())
    }

    /// Store one answer and refresh the partial scores. Answers may be given
    /// in any order and overwrite earlier ones until submission.
    pub fn record_answer(&mut self, value: AnswerValue, config: &Config) -> Result<()> {
        self.require_status(AssessmentStatus::InProgress)?;
        self.answers.set(value);
        let (scores, _) = scoring::evaluate(&self.answers, &config.scoring);
        self.skill_score = scores.skill();
        self.will_score = scores.will();
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Apply a wizard outcome: scores, category, matches and roadmap. Months
    /// already completed on the previous roadmap are kept.
    pub fn record_outcome(&mut self, outcome: &AssessmentOutcome) {
        let now = Utc::now();
        self.answers = outcome.answers.into();
        self.skill_score = outcome.skill_score;
        self.will_score = outcome.will_score;
        self.category = Some(outcome.category);
        self.recommendation = Some(outcome.recommendation.clone());
        self.recommended_vertical = outcome.recommended_vertical().map(str::to_string);
        self.matches = outcome.matches.clone();
        self.roadmap = roadmap::carry_over(&self.roadmap, outcome.roadmap.clone());
        self.status = AssessmentStatus::Completed;
        self.completed_at = Some(now);
        self.updated_at = now;
    }

    /// Score, categorize, match and persist the member's in-progress attempt.
    pub fn submit(root: &Path, member_id: &str, config: &Config) -> Result<Self> {
        let mut assessment = Self::load(root, member_id)?;
        assessment.require_status(AssessmentStatus::InProgress)?;
        let catalog = Vertical::list(root)?;

        let mut wizard = Wizard::resume(assessment.answers, config.scoring);
        wizard.submit(&catalog, |outcome| {
            assessment.record_outcome(outcome);
            assessment.save(root)
        })?;
        Ok(assessment)
    }

    pub fn assign_vertical(root: &Path, member_id: &str, vertical: &str) -> Result<Self> {
        Self::assign(root, member_id, Some(vertical), None)
    }

    pub fn assign_mentor(root: &Path, member_id: &str, mentor_id: &str) -> Result<Self> {
        Self::assign(root, member_id, None, Some(mentor_id))
    }

    /// Assign a vertical and/or a mentor. Everything is checked before the
    /// single save, so a rejected mentor leaves the vertical untouched too.
    /// A vertical needs a completed assessment; a mentor must be another
    /// active member.
    pub fn assign(
        root: &Path,
        member_id: &str,
        vertical: Option<&str>,
        mentor: Option<&str>,
    ) -> Result<Self> {
        if mentor == Some(member_id) {
            return Err(RosterError::validation(
                "mentor",
                "a member cannot mentor themselves",
            ));
        }
        let mut assessment = Self::load(root, member_id)?;
        if let Some(slug) = vertical {
            assessment.require_status(AssessmentStatus::Completed)?;
            Vertical::load_active(root, slug)?;
        }
        if let Some(id) = mentor {
            Member::load_active(root, id)?;
        }

        let now = Utc::now();
        if let Some(slug) = vertical {
            assessment.assigned_vertical = Some(slug.to_string());
        }
        if let Some(id) = mentor {
            assessment.assigned_mentor = Some(id.to_string());
        }
        assessment.assigned_at = Some(now);
        assessment.updated_at = now;
        assessment.save(root)?;
        tracing::info!(member = member_id, ?vertical, ?mentor, "assessment assigned");
        Ok(assessment)
    }

    /// Mark a roadmap month complete. Returns the assessment and whether the
    /// month changed.
    pub fn complete_milestone(root: &Path, member_id: &str, month: u8) -> Result<(Self, bool)> {
        let mut assessment = Self::load(root, member_id)?;
        assessment.require_status(AssessmentStatus::Completed)?;
        let changed = roadmap::complete_month(&mut assessment.roadmap, month)?;
        if changed {
            assessment.updated_at = Utc::now();
            assessment.save(root)?;
        }
        Ok((assessment, changed))
    }

    pub fn is_stale(&self, now: DateTime<Utc>, validity_days: u32) -> bool {
        self.status == AssessmentStatus::Completed
            && self
                .completed_at
                .is_some_and(|at| now - at > Duration::days(i64::from(validity_days)))
    }

    /// Expire completed assessments older than `validity_days`. Returns the
    /// member ids that changed.
    pub fn expire_stale(root: &Path, now: DateTime<Utc>, validity_days: u32) -> Result<Vec<String>> {
        let mut expired = Vec::new();
        for mut a in Self::list(root)? {
            if a.is_stale(now, validity_days) {
                a.status = AssessmentStatus::Expired;
                a.updated_at = now;
                a.save(root)?;
                expired.push(a.member_id);
            }
        }
        if !expired.is_empty() {
            tracing::info!(count = expired.len(), "assessments expired");
        }
        Ok(expired)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
