//! Skill-will scoring and quadrant categorization.
//!
//! Every answer maps to a percent factor on the skill axis, the will axis, or
//! both. Each axis is a weighted sum in basis points (0..=10_000); weights on
//! an axis sum to 100 so a perfect set of answers scores exactly 10_000.
//! Unanswered questions contribute nothing.

use crate::answers::{
    AgeGroup, Answers, EnergyFocus, SkillLevel, TimeCommitment, TravelWillingness,
};
use crate::config::ScoringConfig;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const MAX_BASIS_POINTS: u32 = 10_000;

// Axis weights (percent). Skill: 60 + 25 + 15. Will: 45 + 35 + 20.
const SKILL_W_LEVEL: u32 = 60;
const SKILL_W_ENERGY: u32 = 25;
const SKILL_W_AGE: u32 = 15;
const WILL_W_TIME: u32 = 45;
const WILL_W_TRAVEL: u32 = 35;
const WILL_W_ENERGY: u32 = 20;

fn skill_level_factor(v: SkillLevel) -> u32 {
    match v {
        SkillLevel::Beginner => 10,
        SkillLevel::Intermediate => 50,
        SkillLevel::Advanced => 85,
        SkillLevel::Expert => 100,
    }
}

/// (skill factor, will factor)
fn energy_factors(v: EnergyFocus) -> (u32, u32) {
    match v {
        EnergyFocus::HighEnergyFieldWork => (70, 100),
        EnergyFocus::TeachingMentoring => (90, 70),
        EnergyFocus::CreativeContent => (80, 60),
        EnergyFocus::PolicyAdvocacy => (100, 50),
        EnergyFocus::BehindTheScenes => (60, 40),
    }
}

fn age_group_factor(v: AgeGroup) -> u32 {
    match v {
        AgeGroup::Children => 60,
        AgeGroup::Teens => 80,
        AgeGroup::YoungAdults => 80,
        AgeGroup::Adults => 90,
        AgeGroup::AllAges => 100,
    }
}

fn time_factor(v: TimeCommitment) -> u32 {
    match v {
        TimeCommitment::Low => 20,
        TimeCommitment::Medium => 60,
        TimeCommitment::High => 100,
    }
}

fn travel_factor(v: TravelWillingness) -> u32 {
    match v {
        TravelWillingness::Low => 10,
        TravelWillingness::Medium => 50,
        TravelWillingness::High => 100,
    }
}

// ---------------------------------------------------------------------------
// Scores
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scores {
    pub skill_bp: u32,
    pub will_bp: u32,
}

impl Scores {
    pub fn skill(self) -> f64 {
        f64::from(self.skill_bp) / f64::from(MAX_BASIS_POINTS)
    }

    pub fn will(self) -> f64 {
        f64::from(self.will_bp) / f64::from(MAX_BASIS_POINTS)
    }
}

/// Score whatever answers are present. Missing answers contribute zero.
pub fn score(answers: &Answers) -> Scores {
    let mut skill = 0;
    let mut will = 0;

    if let Some(level) = answers.skill_level {
        skill += SKILL_W_LEVEL * skill_level_factor(level);
    }
    if let Some(energy) = answers.energy_focus {
        let (s, w) = energy_factors(energy);
        skill += SKILL_W_ENERGY * s;
        will += WILL_W_ENERGY * w;
    }
    if let Some(age) = answers.age_group {
        skill += SKILL_W_AGE * age_group_factor(age);
    }
    if let Some(time) = answers.time_commitment {
        will += WILL_W_TIME * time_factor(time);
    }
    if let Some(travel) = answers.travel_willingness {
        will += WILL_W_TRAVEL * travel_factor(travel);
    }

    Scores {
        skill_bp: skill.min(MAX_BASIS_POINTS),
        will_bp: will.min(MAX_BASIS_POINTS),
    }
}

// ---------------------------------------------------------------------------
// Category
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// High skill, high will.
    Star,
    /// Low skill, high will.
    Enthusiast,
    /// High skill, low will.
    Cynic,
    /// Low skill, low will.
    DeadWood,
}

/// Display and guidance text attached to each category.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct CategoryInfo {
    pub label: &'static str,
    pub description: &'static str,
    pub recommendation: &'static str,
}

impl Category {
    pub fn all() -> &'static [Category] {
        &[
            Category::Star,
            Category::Enthusiast,
            Category::Cynic,
            Category::DeadWood,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Star => "star",
            Category::Enthusiast => "enthusiast",
            Category::Cynic => "cynic",
            Category::DeadWood => "dead_wood",
        }
    }

    pub fn info(self) -> CategoryInfo {
        match self {
            Category::Star => CategoryInfo {
                label: "Star",
                description: "Skilled and motivated; ready to lead",
                recommendation: "Give ownership of a vertical project and pair with a junior member to mentor.",
            },
            Category::Enthusiast => CategoryInfo {
                label: "Enthusiast",
                description: "Highly motivated, still building skills",
                recommendation: "Enrol in foundation training and attach to an experienced mentor on field projects.",
            },
            Category::Cynic => CategoryInfo {
                label: "Cynic",
                description: "Capable but not currently engaged",
                recommendation: "Offer a short, high-impact advisory role that fits the member's available time.",
            },
            Category::DeadWood => CategoryInfo {
                label: "Dead Wood",
                description: "Low engagement and early in skill development",
                recommendation: "Start with a single low-commitment activity and review interest after one quarter.",
            },
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = crate::error::RosterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "star" => Ok(Category::Star),
            "enthusiast" => Ok(Category::Enthusiast),
            "cynic" => Ok(Category::Cynic),
            "dead_wood" | "deadwood" => Ok(Category::DeadWood),
            _ => Err(crate::error::RosterError::validation(
                "category",
                format!("unknown category '{s}'"),
            )),
        }
    }
}

fn threshold_bp(threshold: f64) -> u32 {
    let clamped = threshold.clamp(0.0, 1.0);
    (clamped * f64::from(MAX_BASIS_POINTS)).round() as u32
}

/// Assign the quadrant for a pair of scores. Thresholds are inclusive.
pub fn categorize(scores: Scores, thresholds: &ScoringConfig) -> Category {
    let high_skill = scores.skill_bp >= threshold_bp(thresholds.skill_threshold);
    let high_will = scores.will_bp >= threshold_bp(thresholds.will_threshold);
    match (high_skill, high_will) {
        (true, true) => Category::Star,
        (false, true) => Category::Enthusiast,
        (true, false) => Category::Cynic,
        (false, false) => Category::DeadWood,
    }
}

/// Scores plus category once all five answers are in; `None` category otherwise.
pub fn evaluate(answers: &Answers, thresholds: &ScoringConfig) -> (Scores, Option<Category>) {
    let scores = score(answers);
    let category = answers
        .complete()
        .map(|_| categorize(scores, thresholds));
    (scores, category)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
