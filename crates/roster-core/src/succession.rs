//! Succession cycles: nominations, applications, selection meetings and votes.
//!
//! A cycle moves `open → voting → closed`. Nominations and applications are
//! accepted while open; votes only while voting. Entries are embedded in the
//! cycle manifest and get sequential ids (`N1`, `A1`, `M1`).

use crate::error::{Result, RosterError};
use crate::member::Member;
use crate::paths;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

macro_rules! status_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $s),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = RosterError;

            fn from_str(s: &str) -> Result<Self> {
                match s {
                    $($s => Ok($name::$variant),)+
                    other => Err(RosterError::validation("status", format!("unknown status '{other}'"))),
                }
            }
        }
    };
}

status_enum!(CycleStatus {
    Open => "open",
    Voting => "voting",
    Closed => "closed",
});

status_enum!(NominationStatus {
    Pending => "pending",
    Accepted => "accepted",
    Declined => "declined",
    Withdrawn => "withdrawn",
});

status_enum!(ApplicationStatus {
    Submitted => "submitted",
    Shortlisted => "shortlisted",
    Rejected => "rejected",
    Selected => "selected",
});

status_enum!(MeetingStatus {
    Scheduled => "scheduled",
    Held => "held",
    Cancelled => "cancelled",
});

impl NominationStatus {
    fn can_become(self, next: NominationStatus) -> bool {
        use NominationStatus::*;
        matches!(
            (self, next),
            (Pending, Accepted) | (Pending, Declined) | (Pending, Withdrawn) | (Accepted, Withdrawn)
        )
    }
}

impl ApplicationStatus {
    fn can_become(self, next: ApplicationStatus) -> bool {
        use ApplicationStatus::*;
        matches!(
            (self, next),
            (Submitted, Shortlisted)
                | (Submitted, Rejected)
                | (Shortlisted, Selected)
                | (Shortlisted, Rejected)
        )
    }
}

impl MeetingStatus {
    fn can_become(self, next: MeetingStatus) -> bool {
        matches!(
            (self, next),
            (MeetingStatus::Scheduled, MeetingStatus::Held)
                | (MeetingStatus::Scheduled, MeetingStatus::Cancelled)
        )
    }
}

fn transition_error(from: impl fmt::Display, to: impl fmt::Display, reason: &str) -> RosterError {
    RosterError::InvalidTransition {
        from: from.to_string(),
        to: to.to_string(),
        reason: reason.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Entries
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Nomination {
    pub id: String,
    pub position: String,
    pub nominee: String,
    pub nominated_by: String,
    pub status: NominationStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Application {
    pub id: String,
    pub position: String,
    pub applicant: String,
    #[serde(default)]
    pub statement: String,
    pub status: ApplicationStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Meeting {
    pub id: String,
    pub position: String,
    pub scheduled_for: DateTime<Utc>,
    pub status: MeetingStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vote {
    pub meeting: String,
    pub voter: String,
    pub candidate: String,
    pub cast_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TallyEntry {
    pub candidate: String,
    pub votes: u32,
}

// ---------------------------------------------------------------------------
// SuccessionCycle
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuccessionCycle {
    pub slug: String,
    pub title: String,
    pub positions: Vec<String>,
    #[serde(default)]
    pub nominations: Vec<Nomination>,
    #[serde(default)]
    pub applications: Vec<Application>,
    #[serde(default)]
    pub meetings: Vec<Meeting>,
    #[serde(default)]
    pub votes: Vec<Vote>,
    pub status: CycleStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SuccessionCycle {
    pub fn create(
        root: &Path,
        slug: impl Into<String>,
        title: impl Into<String>,
        positions: Vec<String>,
    ) -> Result<Self> {
        let slug = slug.into();
        paths::validate_slug(&slug)?;
        if paths::succession_manifest(root, &slug).exists() {
            return Err(RosterError::SuccessionExists(slug));
        }
        let positions: Vec<String> = positions
            .into_iter()
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .collect();
        if positions.is_empty() {
            return Err(RosterError::validation("positions", "at least one is required"));
        }
        let now = Utc::now();
        let cycle = Self {
            slug,
            title: title.into(),
            positions,
            nominations: Vec::new(),
            applications: Vec::new(),
            meetings: Vec::new(),
            votes: Vec::new(),
            status: CycleStatus::Open,
            created_at: now,
            updated_at: now,
        };
        cycle.save(root)?;
        Ok(cycle)
    }

    pub fn load(root: &Path, slug: &str) -> Result<Self> {
        paths::validate_slug(slug).map_err(|_| RosterError::SuccessionNotFound(slug.to_string()))?;
        crate::io::read_yaml(&paths::succession_manifest(root, slug))?
            .ok_or_else(|| RosterError::SuccessionNotFound(slug.to_string()))
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        crate::io::write_yaml(&paths::succession_manifest(root, &self.slug), self)
    }

    pub fn list(root: &Path) -> Result<Vec<Self>> {
        crate::io::load_manifests(&root.join(paths::SUCCESSION_DIR))
    }

    // ---------------------------------------------------------------------------
    // Guards
    // ---------------------------------------------------------------------------

    fn require_status(&self, expected: CycleStatus, action: &str) -> Result<()> {
        if self.status != expected {
            return Err(transition_error(
                self.status,
                action,
                &format!("cycle must be {expected}"),
            ));
        }
        Ok(())
    }

    fn require_position(&self, position: &str) -> Result<()> {
        if !self.positions.iter().any(|p| p == position) {
            return Err(RosterError::validation(
                "position",
                format!("'{position}' is not part of cycle '{}'", self.slug),
            ));
        }
        Ok(())
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    // ---------------------------------------------------------------------------
    // Cycle transitions
    // ---------------------------------------------------------------------------

    pub fn open_voting(&mut self) -> Result<()> {
        self.require_status(CycleStatus::Open, "voting")?;
        self.status = CycleStatus::Voting;
        self.touch();
        Ok(())
    }

    pub fn close(&mut self) -> Result<()> {
        self.require_status(CycleStatus::Voting, "closed")?;
        self.status = CycleStatus::Closed;
        self.touch();
        Ok(())
    }

    // ---------------------------------------------------------------------------
    // Nominations
    // ---------------------------------------------------------------------------

    pub fn nominate(
        &mut self,
        root: &Path,
        position: &str,
        nominee: &str,
        nominated_by: &str,
    ) -> Result<&Nomination> {
        self.require_status(CycleStatus::Open, "nomination")?;
        self.require_position(position)?;
        Member::load_active(root, nominee)?;
        Member::load_active(root, nominated_by)?;
        let duplicate = self.nominations.iter().any(|n| {
            n.position == position
                && n.nominee == nominee
                && matches!(n.status, NominationStatus::Pending | NominationStatus::Accepted)
        });
        if duplicate {
            return Err(RosterError::validation(
                "nominee",
                format!("already nominated for '{position}'"),
            ));
        }
        let id = format!("N{}", self.nominations.len() + 1);
        self.nominations.push(Nomination {
            id,
            position: position.to_string(),
            nominee: nominee.to_string(),
            nominated_by: nominated_by.to_string(),
            status: NominationStatus::Pending,
            created_at: Utc::now(),
        });
        self.touch();
        let last = self.nominations.len() - 1;
        Ok(&self.nominations[last])
    }

    pub fn set_nomination_status(&mut self, id: &str, status: NominationStatus) -> Result<()> {
        let nomination = self
            .nominations
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or_else(|| RosterError::SuccessionEntryNotFound(id.to_string()))?;
        if !nomination.status.can_become(status) {
            return Err(transition_error(nomination.status, status, "not allowed"));
        }
        nomination.status = status;
        self.touch();
        Ok(())
    }

    // ---------------------------------------------------------------------------
    // Applications
    // ---------------------------------------------------------------------------

    pub fn apply(
        &mut self,
        root: &Path,
        position: &str,
        applicant: &str,
        statement: impl Into<String>,
    ) -> Result<&Application> {
        self.require_status(CycleStatus::Open, "application")?;
        self.require_position(position)?;
        Member::load_active(root, applicant)?;
        let duplicate = self.applications.iter().any(|a| {
            a.position == position && a.applicant == applicant && a.status != ApplicationStatus::Rejected
        });
        if duplicate {
            return Err(RosterError::validation(
                "applicant",
                format!("already applied for '{position}'"),
            ));
        }
        let id = format!("A{}", self.applications.len() + 1);
        self.applications.push(Application {
            id,
            position: position.to_string(),
            applicant: applicant.to_string(),
            statement: statement.into(),
            status: ApplicationStatus::Submitted,
            created_at: Utc::now(),
        });
        self.touch();
        let last = self.applications.len() - 1;
        Ok(&self.applications[last])
    }

    pub fn set_application_status(&mut self, id: &str, status: ApplicationStatus) -> Result<()> {
        let application = self
            .applications
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| RosterError::SuccessionEntryNotFound(id.to_string()))?;
        if !application.status.can_become(status) {
            return Err(transition_error(application.status, status, "not allowed"));
        }
        application.status = status;
        self.touch();
        Ok(())
    }

    // ---------------------------------------------------------------------------
    // Meetings and votes
    // ---------------------------------------------------------------------------

    pub fn schedule_meeting(&mut self, position: &str, when: DateTime<Utc>) -> Result<&Meeting> {
        if self.status == CycleStatus::Closed {
            return Err(transition_error(self.status, "meeting", "cycle is closed"));
        }
        self.require_position(position)?;
        let id = format!("M{}", self.meetings.len() + 1);
        self.meetings.push(Meeting {
            id,
            position: position.to_string(),
            scheduled_for: when,
            status: MeetingStatus::Scheduled,
        });
        self.touch();
        let last = self.meetings.len() - 1;
        Ok(&self.meetings[last])
    }

    pub fn set_meeting_status(&mut self, id: &str, status: MeetingStatus) -> Result<()> {
        let meeting = self
            .meetings
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or_else(|| RosterError::SuccessionEntryNotFound(id.to_string()))?;
        if !meeting.status.can_become(status) {
            return Err(transition_error(meeting.status, status, "not allowed"));
        }
        meeting.status = status;
        self.touch();
        Ok(())
    }

    pub fn meeting(&self, id: &str) -> Result<&Meeting> {
        self.meetings
            .iter()
            .find(|m| m.id == id)
            .ok_or_else(|| RosterError::SuccessionEntryNotFound(id.to_string()))
    }

    /// Member ids eligible for `position`: accepted nominees and shortlisted
    /// or selected applicants, deduplicated and sorted.
    pub fn candidates(&self, position: &str) -> Vec<String> {
        let nominees = self
            .nominations
            .iter()
            .filter(|n| n.position == position && n.status == NominationStatus::Accepted)
            .map(|n| n.nominee.clone());
        let applicants = self
            .applications
            .iter()
            .filter(|a| {
                a.position == position
                    && matches!(a.status, ApplicationStatus::Shortlisted | ApplicationStatus::Selected)
            })
            .map(|a| a.applicant.clone());
        let mut all: Vec<String> = nominees.chain(applicants).collect();
        all.sort();
        all.dedup();
        all
    }

    /// Cast (or replace) `voter`'s vote in a meeting.
    pub fn cast_vote(&mut self, root: &Path, meeting_id: &str, voter: &str, candidate: &str) -> Result<()> {
        self.require_status(CycleStatus::Voting, "vote")?;
        let meeting = self.meeting(meeting_id)?;
        if meeting.status == MeetingStatus::Cancelled {
            return Err(transition_error(meeting.status, "vote", "meeting was cancelled"));
        }
        if !self.candidates(&meeting.position).iter().any(|c| c == candidate) {
            return Err(RosterError::validation(
                "candidate",
                format!("'{candidate}' is not a candidate for '{}'", meeting.position),
            ));
        }
        Member::load_active(root, voter)?;

        self.votes
            .retain(|v| !(v.meeting == meeting_id && v.voter == voter));
        self.votes.push(Vote {
            meeting: meeting_id.to_string(),
            voter: voter.to_string(),
            candidate: candidate.to_string(),
            cast_at: Utc::now(),
        });
        self.touch();
        Ok(())
    }

    /// Vote counts for a meeting, highest first, ties by candidate id.
    pub fn tally(&self, meeting_id: &str) -> Result<Vec<TallyEntry>> {
        self.meeting(meeting_id)?;
        let mut counts: HashMap<&str, u32> = HashMap::new();
        for v in self.votes.iter().filter(|v| v.meeting == meeting_id) {
            *counts.entry(v.candidate.as_str()).or_default() += 1;
        }
        let mut tally: Vec<TallyEntry> = counts
            .into_iter()
            .map(|(candidate, votes)| TallyEntry {
                candidate: candidate.to_string(),
                votes,
            })
            .collect();
        tally.sort_by(|a, b| b.votes.cmp(&a.votes).then_with(|| a.candidate.cmp(&b.candidate)));
        Ok(tally)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
