use crate::error::RosterError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Generates `all()`, `as_str()`, `label()`, `ordinal()`, `Display` and
/// `FromStr` for a questionnaire answer enum. `FromStr` accepts the snake_case
/// wire form and its hyphenated spelling.
macro_rules! answer_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $question:expr, {
            $($variant:ident => ($wire:expr, $label:expr)),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn all() -> &'static [$name] {
                &[$($name::$variant),+]
            }

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $wire),+
                }
            }

            pub fn label(self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }

            /// Position in `all()`, used for "one step away" similarity.
            pub fn ordinal(self) -> usize {
                self as usize
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = RosterError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
                $name::all()
                    .iter()
                    .copied()
                    .find(|v| v.as_str() == normalized)
                    .ok_or_else(|| RosterError::InvalidAnswer {
                        question: $question.to_string(),
                        reason: format!(
                            "'{}' is not one of: {}",
                            s,
                            $name::all()
                                .iter()
                                .map(|v| v.as_str())
                                .collect::<Vec<_>>()
                                .join(", ")
                        ),
                    })
            }
        }
    };
}

answer_enum!(
    /// Kind of work the member is drawn to.
    EnergyFocus, "energy_focus", {
        HighEnergyFieldWork => ("high_energy_field_work", "High-energy field work"),
        TeachingMentoring => ("teaching_mentoring", "Teaching and mentoring"),
        CreativeContent => ("creative_content", "Creative content and communication"),
        PolicyAdvocacy => ("policy_advocacy", "Policy and advocacy"),
        BehindTheScenes => ("behind_the_scenes", "Behind-the-scenes coordination"),
    }
);

answer_enum!(
    /// Audience the member prefers to work with.
    AgeGroup, "age_group", {
        Children => ("children", "Children"),
        Teens => ("teens", "Teenagers"),
        YoungAdults => ("young_adults", "Young adults"),
        Adults => ("adults", "Adults"),
        AllAges => ("all_ages", "All ages"),
    }
);

answer_enum!(
    SkillLevel, "skill_level", {
        Beginner => ("beginner", "Beginner"),
        Intermediate => ("intermediate", "Intermediate"),
        Advanced => ("advanced", "Advanced"),
        Expert => ("expert", "Expert"),
    }
);

answer_enum!(
    /// Hours per month the member can give.
    TimeCommitment, "time_commitment", {
        Low => ("low", "Under 5 hours a month"),
        Medium => ("medium", "5 to 15 hours a month"),
        High => ("high", "More than 15 hours a month"),
    }
);

answer_enum!(
    TravelWillingness, "travel_willingness", {
        Low => ("low", "Within the city only"),
        Medium => ("medium", "Within the region"),
        High => ("high", "Anywhere, including overnight travel"),
    }
);

// ---------------------------------------------------------------------------
// Question
// ---------------------------------------------------------------------------

/// The five wizard questions, in the order they are asked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Question {
    EnergyFocus,
    AgeGroup,
    SkillLevel,
    TimeCommitment,
    TravelWillingness,
}

impl Question {
    pub const COUNT: usize = 5;

    pub fn all() -> &'static [Question] {
        &[
            Question::EnergyFocus,
            Question::AgeGroup,
            Question::SkillLevel,
            Question::TimeCommitment,
            Question::TravelWillingness,
        ]
    }

    pub fn at(step: usize) -> Option<Question> {
        Question::all().get(step).copied()
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Question::EnergyFocus => "energy_focus",
            Question::AgeGroup => "age_group",
            Question::SkillLevel => "skill_level",
            Question::TimeCommitment => "time_commitment",
            Question::TravelWillingness => "travel_willingness",
        }
    }

    pub fn prompt(self) -> &'static str {
        match self {
            Question::EnergyFocus => "What kind of work gives you energy?",
            Question::AgeGroup => "Which age group do you most enjoy working with?",
            Question::SkillLevel => "How would you rate your facilitation skills?",
            Question::TimeCommitment => "How much time can you commit each month?",
            Question::TravelWillingness => "How far are you willing to travel?",
        }
    }

    /// `(wire value, label)` pairs offered for this question.
    pub fn options(self) -> Vec<(&'static str, &'static str)> {
        fn pairs<T: Copy>(all: &[T], f: impl Fn(T) -> (&'static str, &'static str)) -> Vec<(&'static str, &'static str)> {
            all.iter().copied().map(f).collect()
        }
        match self {
            Question::EnergyFocus => pairs(EnergyFocus::all(), |v| (v.as_str(), v.label())),
            Question::AgeGroup => pairs(AgeGroup::all(), |v| (v.as_str(), v.label())),
            Question::SkillLevel => pairs(SkillLevel::all(), |v| (v.as_str(), v.label())),
            Question::TimeCommitment => pairs(TimeCommitment::all(), |v| (v.as_str(), v.label())),
            Question::TravelWillingness => {
                pairs(TravelWillingness::all(), |v| (v.as_str(), v.label()))
            }
        }
    }

    /// Parse a raw option string into the typed answer for this question.
    pub fn parse(self, raw: &str) -> Result<AnswerValue, RosterError> {
        Ok(match self {
            Question::EnergyFocus => AnswerValue::EnergyFocus(raw.parse()?),
            Question::AgeGroup => AnswerValue::AgeGroup(raw.parse()?),
            Question::SkillLevel => AnswerValue::SkillLevel(raw.parse()?),
            Question::TimeCommitment => AnswerValue::TimeCommitment(raw.parse()?),
            Question::TravelWillingness => AnswerValue::TravelWillingness(raw.parse()?),
        })
    }
}

impl fmt::Display for Question {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Question {
    type Err = RosterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        Question::all()
            .iter()
            .copied()
            .find(|q| q.as_str() == normalized)
            .ok_or_else(|| RosterError::validation("question", format!("unknown question '{s}'")))
    }
}

// ---------------------------------------------------------------------------
// AnswerValue
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "question", content = "value", rename_all = "snake_case")]
pub enum AnswerValue {
    EnergyFocus(EnergyFocus),
    AgeGroup(AgeGroup),
    SkillLevel(SkillLevel),
    TimeCommitment(TimeCommitment),
    TravelWillingness(TravelWillingness),
}

impl AnswerValue {
    pub fn question(self) -> Question {
        match self {
            AnswerValue::EnergyFocus(_) => Question::EnergyFocus,
            AnswerValue::AgeGroup(_) => Question::AgeGroup,
            AnswerValue::SkillLevel(_) => Question::SkillLevel,
            AnswerValue::TimeCommitment(_) => Question::TimeCommitment,
            AnswerValue::TravelWillingness(_) => Question::TravelWillingness,
        }
    }
}

// ---------------------------------------------------------------------------
// Answers
// ---------------------------------------------------------------------------

/// The five answers of one attempt. Unanswered questions are `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answers {
    #[serde(default)]
    pub energy_focus: Option<EnergyFocus>,
    #[serde(default)]
    pub age_group: Option<AgeGroup>,
    #[serde(default)]
    pub skill_level: Option<SkillLevel>,
    #[serde(default)]
    pub time_commitment: Option<TimeCommitment>,
    #[serde(default)]
    pub travel_willingness: Option<TravelWillingness>,
}

/// All five answers present. Produced by [`Answers::complete`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompleteAnswers {
    pub energy_focus: EnergyFocus,
    pub age_group: AgeGroup,
    pub skill_level: SkillLevel,
    pub time_commitment: TimeCommitment,
    pub travel_willingness: TravelWillingness,
}

impl Answers {
    pub fn set(&mut self, value: AnswerValue) {
        match value {
            AnswerValue::EnergyFocus(v) => self.energy_focus = Some(v),
            AnswerValue::AgeGroup(v) => self.age_group = Some(v),
            AnswerValue::SkillLevel(v) => self.skill_level = Some(v),
            AnswerValue::TimeCommitment(v) => self.time_commitment = Some(v),
            AnswerValue::TravelWillingness(v) => self.travel_willingness = Some(v),
        }
    }

    pub fn is_answered(&self, question: Question) -> bool {
        match question {
            Question::EnergyFocus => self.energy_focus.is_some(),
            Question::AgeGroup => self.age_group.is_some(),
            Question::SkillLevel => self.skill_level.is_some(),
            Question::TimeCommitment => self.time_commitment.is_some(),
            Question::TravelWillingness => self.travel_willingness.is_some(),
        }
    }

    pub fn value(&self, question: Question) -> Option<AnswerValue> {
        match question {
            Question::EnergyFocus => self.energy_focus.map(AnswerValue::EnergyFocus),
            Question::AgeGroup => self.age_group.map(AnswerValue::AgeGroup),
            Question::SkillLevel => self.skill_level.map(AnswerValue::SkillLevel),
            Question::TimeCommitment => self.time_commitment.map(AnswerValue::TimeCommitment),
            Question::TravelWillingness => {
                self.travel_willingness.map(AnswerValue::TravelWillingness)
            }
        }
    }

    pub fn answered_count(&self) -> usize {
        Question::all()
            .iter()
            .filter(|q| self.is_answered(**q))
            .count()
    }

    /// First unanswered question, in wizard order.
    pub fn first_missing(&self) -> Option<Question> {
        Question::all().iter().copied().find(|q| !self.is_answered(*q))
    }

    pub fn complete(&self) -> Option<CompleteAnswers> {
        Some(CompleteAnswers {
            energy_focus: self.energy_focus?,
            age_group: self.age_group?,
            skill_level: self.skill_level?,
            time_commitment: self.time_commitment?,
            travel_willingness: self.travel_willingness?,
        })
    }
}

impl From<CompleteAnswers> for Answers {
    fn from(c: CompleteAnswers) -> Self {
        Answers {
            energy_focus: Some(c.energy_focus),
            age_group: Some(c.age_group),
            skill_level: Some(c.skill_level),
            time_commitment: Some(c.time_commitment),
            travel_willingness: Some(c.travel_willingness),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
