use crate::error::{Result, RosterError};
use crate::scoring::Category;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const ROADMAP_MONTHS: u8 = 6;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoadmapMilestone {
    /// 1..=6
    pub month: u8,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub tasks: Vec<String>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

struct MonthTemplate {
    title: &'static str,
    description: &'static str,
    tasks: &'static [&'static str],
}

const fn m(
    title: &'static str,
    description: &'static str,
    tasks: &'static [&'static str],
) -> MonthTemplate {
    MonthTemplate {
        title,
        description,
        tasks,
    }
}

static STAR: [MonthTemplate; 6] = [
    m("Take ownership", "Agree a vertical project you will lead this half-year", &["Meet the vertical chair", "Draft a project charter"]),
    m("Build the team", "Recruit and brief volunteers for your project", &["Recruit three volunteers", "Run a kickoff session"]),
    m("First delivery", "Run the first project event end to end", &["Deliver the first event", "Collect participant feedback"]),
    m("Mentor", "Take on a newer member as a mentee", &["Hold two mentoring sessions", "Agree mentee goals"]),
    m("Scale", "Repeat the event in a second location or school", &["Deliver the second event", "Report KPIs to the vertical"]),
    m("Hand over", "Document the playbook and present outcomes", &["Write the project playbook", "Present at the chapter meeting"]),
];

static ENTHUSIAST: [MonthTemplate; 6] = [
    m("Orientation", "Learn how the chapter and its verticals run", &["Attend orientation", "Meet your assigned mentor"]),
    m("Foundation training", "Complete the core facilitation course", &["Finish foundation training", "Shadow one field event"]),
    m("Assist", "Support a mentor-led project on the ground", &["Assist at two events", "Log volunteer hours"]),
    m("Co-facilitate", "Run a segment of an event with your mentor present", &["Co-facilitate one session", "Debrief with mentor"]),
    m("Certification", "Earn a vertical certification", &["Pass the certification assessment"]),
    m("Lead a session", "Facilitate a full session independently", &["Lead one session", "Review progress with mentor"]),
];

static CYNIC: [MonthTemplate; 6] = [
    m("Reconnect", "Discuss interests and constraints with the vertical chair", &["One-to-one with the chair"]),
    m("Advisory role", "Pick a bounded advisory task that fits your time", &["Agree the advisory scope"]),
    m("Expert input", "Review a project plan or training module", &["Deliver written feedback"]),
    m("Guest session", "Run one expert talk for members or beneficiaries", &["Deliver one talk"]),
    m("Recognition", "Share outcomes of your contributions with the chapter", &["Present a short update"]),
    m("Re-assess", "Review engagement and choose the next commitment", &["Retake the skill-will assessment"]),
];

static DEAD_WOOD: [MonthTemplate; 6] = [
    m("Check in", "Talk through what would make membership worthwhile", &["One-to-one with a chapter officer"]),
    m("Try one activity", "Attend a single low-commitment event", &["Attend one event"]),
    m("Basic training", "Complete the introductory online module", &["Finish the introductory module"]),
    m("Buddy up", "Pair with an active member for one activity", &["Join a buddy activity"]),
    m("Small contribution", "Take one small task on a project", &["Complete one assigned task"]),
    m("Review", "Decide on continued involvement", &["Retake the skill-will assessment", "Agree next steps"]),
];

fn template(category: Category) -> &'static [MonthTemplate; 6] {
    match category {
        Category::Star => &STAR,
        Category::Enthusiast => &ENTHUSIAST,
        Category::Cynic => &CYNIC,
        Category::DeadWood => &DEAD_WOOD,
    }
}

/// The six-month roadmap for a category, nothing completed.
pub fn generate(category: Category) -> Vec<RoadmapMilestone> {
    template(category)
        .iter()
        .enumerate()
        .map(|(i, t)| RoadmapMilestone {
            month: i as u8 + 1,
            title: t.title.to_string(),
            description: t.description.to_string(),
            tasks: t.tasks.iter().map(|s| s.to_string()).collect(),
            completed: false,
            completed_at: None,
        })
        .collect()
}

/// Merge a freshly generated roadmap with a previous one: any month already
/// completed keeps its previous milestone untouched.
pub fn carry_over(previous: &[RoadmapMilestone], fresh: Vec<RoadmapMilestone>) -> Vec<RoadmapMilestone> {
    fresh
        .into_iter()
        .map(|new| {
            previous
                .iter()
                .find(|p| p.month == new.month && p.completed)
                .cloned()
                .unwrap_or(new)
        })
        .collect()
}

/// Mark `month` complete. Returns `false` if it already was.
pub fn complete_month(roadmap: &mut [RoadmapMilestone], month: u8) -> Result<bool> {
    let milestone = roadmap
        .iter_mut()
        .find(|m| m.month == month)
        .ok_or(RosterError::RoadmapMonthNotFound(month))?;
    if milestone.completed {
        return Ok(false);
    }
    milestone.completed = true;
    milestone.completed_at = Some(Utc::now());
    Ok(true)
}

/// "2/6 months complete"
pub fn summarize(roadmap: &[RoadmapMilestone]) -> String {
    let done = roadmap.iter().filter(|m| m.completed).count();
    format!("{done}/{} months complete", roadmap.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_category_gets_six_ordered_months() {
        for c in Category::all() {
            let r = generate(*c);
            assert_eq!(r.len(), ROADMAP_MONTHS as usize);
            let months: Vec<u8> = r.iter().map(|m| m.month).collect();
            assert_eq!(months, vec![1, 2, 3, 4, 5, 6]);
            assert!(r.iter().all(|m| !m.completed && !m.tasks.is_empty()));
        }
    }

    #[test]
    fn templates_differ_by_category() {
        assert_ne!(generate(Category::Star)[0].title, generate(Category::DeadWood)[0].title);
    }

    #[test]
    fn complete_month_is_idempotent() {
        let mut r = generate(Category::Star);
        assert!(complete_month(&mut r, 2).unwrap());
        let first_stamp = r[1].completed_at;
        assert!(!complete_month(&mut r, 2).unwrap());
        assert_eq!(r[1].completed_at, first_stamp);
        assert_eq!(summarize(&r), "1/6 months complete");
    }

    #[test]
    fn complete_unknown_month_fails() {
        let mut r = generate(Category::Cynic);
        assert!(matches!(
            complete_month(&mut r, 7),
            Err(RosterError::RoadmapMonthNotFound(7))
        ));
    }

    #[test]
    fn carry_over_keeps_completed_months() {
        let mut old = generate(Category::Enthusiast);
        complete_month(&mut old, 1).unwrap();
        let merged = carry_over(&old, generate(Category::Star));
        assert!(merged[0].completed);
        assert_eq!(merged[0].title, old[0].title);
        assert!(!merged[1].completed);
        assert_eq!(merged[1].title, generate(Category::Star)[1].title);
    }
}
