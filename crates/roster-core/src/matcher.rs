//! Ranks verticals against a completed assessment.

use crate::answers::CompleteAnswers;
use crate::scoring::Category;
use crate::vertical::{Vertical, VerticalProfile};
use serde::{Deserialize, Serialize};

const W_ENERGY: u32 = 30;
const W_AGE: u32 = 20;
const W_SKILL: u32 = 20;
const W_TIME: u32 = 10;
const W_TRAVEL: u32 = 10;
const W_CATEGORY: u32 = 10;
const W_TOTAL: u32 = W_ENERGY + W_AGE + W_SKILL + W_TIME + W_TRAVEL + W_CATEGORY;

/// Number of matches kept on an assessment.
pub const TOP_MATCHES: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerticalMatch {
    pub vertical: String,
    pub name: String,
    /// 0..=100
    pub percentage: u32,
}

/// Similarity in halves: 2 = match, 1 = one step away, 0 = otherwise.
fn ordinal_halves(actual: usize, wanted: usize) -> u32 {
    match actual.abs_diff(wanted) {
        0 => 2,
        1 => 1,
        _ => 0,
    }
}

/// Best similarity of `actual` against any preferred ordinal. An empty
/// preference list accepts everything.
fn preferred_halves(actual: usize, preferred: &[usize]) -> u32 {
    if preferred.is_empty() {
        return 2;
    }
    preferred
        .iter()
        .map(|&p| ordinal_halves(actual, p))
        .max()
        .unwrap_or(0)
}

/// Percentage similarity between an assessment and one vertical profile.
pub fn similarity(
    answers: &CompleteAnswers,
    category: Category,
    profile: &VerticalProfile,
) -> u32 {
    let energy: Vec<usize> = profile.energy_focus.iter().map(|e| e.ordinal()).collect();
    let ages: Vec<usize> = profile.age_groups.iter().map(|a| a.ordinal()).collect();

    // Energy focus is categorical, so only exact membership counts.
    let energy_halves = if energy.is_empty() || energy.contains(&answers.energy_focus.ordinal()) {
        2
    } else {
        0
    };
    let age_halves = preferred_halves(answers.age_group.ordinal(), &ages);
    let skill_halves = {
        let have = answers.skill_level.ordinal();
        let need = profile.min_skill_level.ordinal();
        if have >= need {
            2
        } else if have + 1 == need {
            1
        } else {
            0
        }
    };
    let time_halves = ordinal_halves(
        answers.time_commitment.ordinal(),
        profile.time_commitment.ordinal(),
    );
    let travel_halves = ordinal_halves(
        answers.travel_willingness.ordinal(),
        profile.travel.ordinal(),
    );
    let category_halves = if profile.categories.is_empty() || profile.categories.contains(&category)
    {
        2
    } else {
        0
    };

    let weighted_halves = W_ENERGY * energy_halves
        + W_AGE * age_halves
        + W_SKILL * skill_halves
        + W_TIME * time_halves
        + W_TRAVEL * travel_halves
        + W_CATEGORY * category_halves;

    // weighted_halves / (2 * W_TOTAL) * 100, rounded half up.
    (weighted_halves * 100 + W_TOTAL) / (2 * W_TOTAL)
}

/// Rank active verticals that carry a profile. Highest percentage first; ties
/// keep display order, then slug.
pub fn rank(
    answers: &CompleteAnswers,
    category: Category,
    catalog: &[Vertical],
) -> Vec<VerticalMatch> {
    let mut scored: Vec<(u32, u32, &str, &str)> = catalog
        .iter()
        .filter(|v| v.active)
        .filter_map(|v| {
            v.profile.as_ref().map(|p| {
                (
                    similarity(answers, category, p),
                    v.display_order,
                    v.slug.as_str(),
                    v.name.as_str(),
                )
            })
        })
        .collect();

    scored.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)).then(a.2.cmp(b.2)));

    scored
        .into_iter()
        .map(|(percentage, _, slug, name)| VerticalMatch {
            vertical: slug.to_string(),
            name: name.to_string(),
            percentage,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
