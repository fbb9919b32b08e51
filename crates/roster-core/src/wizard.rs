//! The five-step assessment wizard.
//!
//! ```text
//! answering(0) ⇄ answering(1) ⇄ … ⇄ answering(4) ── submit ──▶ submitting
//!                                       ▲                         │
//!                                       └──── failed(4) ◀── err ──┤
//!                                                                 └── ok ──▶ completed
//! ```
//!
//! The wizard owns its state; callers hold a `Wizard` value for the length of
//! a session. Submission is retried only by calling `submit` again.

use crate::answers::{AnswerValue, Answers, CompleteAnswers, Question};
use crate::config::ScoringConfig;
use crate::error::{Result, RosterError};
use crate::matcher::{self, VerticalMatch, TOP_MATCHES};
use crate::roadmap::{self, RoadmapMilestone};
use crate::scoring::{self, Category, Scores};
use crate::vertical::Vertical;
use serde::{Deserialize, Serialize};
use std::fmt;

const LAST_STEP: usize = Question::COUNT - 1;

// ---------------------------------------------------------------------------
// WizardState
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum WizardState {
    Answering { step: usize },
    Submitting,
    Completed,
    /// Persisting failed; the wizard sits on `step` with the error shown.
    Failed { step: usize, message: String },
}

impl fmt::Display for WizardState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WizardState::Answering { step } => write!(f, "answering({step})"),
            WizardState::Submitting => f.write_str("submitting"),
            WizardState::Completed => f.write_str("completed"),
            WizardState::Failed { step, .. } => write!(f, "failed({step})"),
        }
    }
}

// ---------------------------------------------------------------------------
// AssessmentOutcome
// ---------------------------------------------------------------------------

/// Everything derived from a full set of answers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentOutcome {
    pub answers: CompleteAnswers,
    pub skill_score: f64,
    pub will_score: f64,
    pub category: Category,
    pub recommendation: String,
    pub matches: Vec<VerticalMatch>,
    pub roadmap: Vec<RoadmapMilestone>,
}

impl AssessmentOutcome {
    /// Run scorer, categorizer, matcher and roadmap generator.
    pub fn compute(
        answers: CompleteAnswers,
        thresholds: &ScoringConfig,
        catalog: &[Vertical],
    ) -> Self {
        let scores: Scores = scoring::score(&answers.into());
        let category = scoring::categorize(scores, thresholds);
        let mut matches = matcher::rank(&answers, category, catalog);
        matches.truncate(TOP_MATCHES);
        AssessmentOutcome {
            answers,
            skill_score: scores.skill(),
            will_score: scores.will(),
            category,
            recommendation: category.info().recommendation.to_string(),
            matches,
            roadmap: roadmap::generate(category),
        }
    }

    pub fn recommended_vertical(&self) -> Option<&str> {
        self.matches.first().map(|m| m.vertical.as_str())
    }
}

// ---------------------------------------------------------------------------
// Wizard
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Wizard {
    answers: Answers,
    state: WizardState,
    thresholds: ScoringConfig,
    outcome: Option<AssessmentOutcome>,
}

impl Wizard {
    pub fn new(thresholds: ScoringConfig) -> Self {
        Self {
            answers: Answers::default(),
            state: WizardState::Answering { step: 0 },
            thresholds,
            outcome: None,
        }
    }

    /// Resume from saved answers, positioned on the first unanswered question
    /// (or the last one if all are answered).
    pub fn resume(answers: Answers, thresholds: ScoringConfig) -> Self {
        let step = answers
            .first_missing()
            .map(|q| q.index())
            .unwrap_or(LAST_STEP);
        Self {
            answers,
            state: WizardState::Answering { step },
            thresholds,
            outcome: None,
        }
    }

    pub fn state(&self) -> &WizardState {
        &self.state
    }

    pub fn answers(&self) -> &Answers {
        &self.answers
    }

    pub fn outcome(&self) -> Option<&AssessmentOutcome> {
        self.outcome.as_ref()
    }

    /// Step the wizard is on, for states that accept answers.
    fn answering_step(&self) -> Option<usize> {
        match &self.state {
            WizardState::Answering { step } | WizardState::Failed { step, .. } => Some(*step),
            WizardState::Submitting | WizardState::Completed => None,
        }
    }

    pub fn current_question(&self) -> Option<Question> {
        self.answering_step().and_then(Question::at)
    }

    fn not_answering(&self, to: &str) -> RosterError {
        RosterError::InvalidTransition {
            from: self.state.to_string(),
            to: to.to_string(),
            reason: "the wizard is not accepting answers".to_string(),
        }
    }

    /// Record the answer for the current question and move forward one step.
    pub fn answer(&mut self, value: AnswerValue) -> Result<()> {
        let step = self
            .answering_step()
            .ok_or_else(|| self.not_answering("answering"))?;
        let expected = Question::at(step).ok_or_else(|| self.not_answering("answering"))?;
        if value.question() != expected {
            return Err(RosterError::InvalidAnswer {
                question: expected.to_string(),
                reason: format!("received an answer for {}", value.question()),
            });
        }
        self.answers.set(value);
        self.state = WizardState::Answering {
            step: (step + 1).min(LAST_STEP),
        };
        Ok(())
    }

    /// Parse `raw` for the current question, then [`Wizard::answer`] it.
    pub fn answer_raw(&mut self, raw: &str) -> Result<()> {
        let question = self
            .current_question()
            .ok_or_else(|| self.not_answering("answering"))?;
        self.answer(question.parse(raw)?)
    }

    pub fn back(&mut self) -> Result<()> {
        let step = self
            .answering_step()
            .ok_or_else(|| self.not_answering("answering"))?;
        self.state = WizardState::Answering {
            step: step.saturating_sub(1),
        };
        Ok(())
    }

    /// Compute the outcome and hand it to `persist`. On success the wizard is
    /// completed; on failure it returns to the last step carrying the message.
    pub fn submit<F>(&mut self, catalog: &[Vertical], persist: F) -> Result<&AssessmentOutcome>
    where
        F: FnOnce(&AssessmentOutcome) -> Result<()>,
    {
        if self.answering_step().is_none() {
            return Err(self.not_answering("submitting"));
        }
        let complete = self.answers.complete().ok_or_else(|| {
            let missing = self
                .answers
                .first_missing()
                .map(|q| q.as_str())
                .unwrap_or("answers");
            RosterError::InvalidAnswer {
                question: missing.to_string(),
                reason: "not answered yet".to_string(),
            }
        })?;

        let outcome = AssessmentOutcome::compute(complete, &self.thresholds, catalog);
        self.state = WizardState::Submitting;

        match persist(&outcome) {
            Ok(()) => {
                tracing::info!(category = %outcome.category, "assessment submitted");
                self.state = WizardState::Completed;
                Ok(self.outcome.insert(outcome))
            }
            Err(e) => {
                tracing::warn!(error = %e, "assessment submit failed");
                self.state = WizardState::Failed {
                    step: LAST_STEP,
                    message: e.to_string(),
                };
                Err(e)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vertical::default_catalog;

    fn answer_all(w: &mut Wizard) {
        for raw in ["high-energy-field-work", "teens", "advanced", "high", "high"] {
            w.answer_raw(raw).unwrap();
        }
    }

    #[test]
    fn answers_advance_one_step_at_a_time() {
        let mut w = Wizard::new(ScoringConfig::default());
        assert_eq!(w.current_question(), Some(Question::EnergyFocus));
        w.answer_raw("creative_content").unwrap();
        assert_eq!(w.state(), &WizardState::Answering { step: 1 });
        assert_eq!(w.current_question(), Some(Question::AgeGroup));
    }

    #[test]
    fn wrong_question_is_rejected_without_moving() {
        let mut w = Wizard::new(ScoringConfig::default());
        let err = w
            .answer(AnswerValue::SkillLevel(crate::answers::SkillLevel::Expert))
            .unwrap_err();
        assert!(matches!(err, RosterError::InvalidAnswer { .. }));
        assert_eq!(w.state(), &WizardState::Answering { step: 0 });
    }

    #[test]
    fn invalid_option_is_rejected_without_moving() {
        let mut w = Wizard::new(ScoringConfig::default());
        assert!(w.answer_raw("sometimes").is_err());
        assert_eq!(w.state(), &WizardState::Answering { step: 0 });
    }

    #[test]
    fn back_moves_backwards_and_stops_at_zero() {
        let mut w = Wizard::new(ScoringConfig::default());
        w.answer_raw("policy_advocacy").unwrap();
        w.back().unwrap();
        assert_eq!(w.state(), &WizardState::Answering { step: 0 });
        w.back().unwrap();
        assert_eq!(w.state(), &WizardState::Answering { step: 0 });
        // Answer kept after going back.
        assert!(w.answers().energy_focus.is_some());
    }

    #[test]
    fn submit_requires_all_answers() {
        let mut w = Wizard::new(ScoringConfig::default());
        w.answer_raw("policy_advocacy").unwrap();
        let err = w.submit(&default_catalog(), |_| Ok(())).unwrap_err();
        assert!(err.to_string().contains("age_group"));
        assert_eq!(w.state(), &WizardState::Answering { step: 1 });
    }

    #[test]
    fn successful_submit_completes() {
        let mut w = Wizard::new(ScoringConfig::default());
        answer_all(&mut w);
        let mut persisted = None;
        let outcome = w
            .submit(&default_catalog(), |o| {
                persisted = Some(o.category);
                Ok(())
            })
            .unwrap();
        assert_eq!(outcome.category, Category::Star);
        assert!(outcome.matches.len() <= TOP_MATCHES);
        assert_eq!(outcome.roadmap.len(), 6);
        assert_eq!(persisted, Some(Category::Star));
        assert_eq!(w.state(), &WizardState::Completed);
        assert!(w.answer_raw("low").is_err());
    }

    #[test]
    fn failed_submit_returns_to_last_step_with_message() {
        let mut w = Wizard::new(ScoringConfig::default());
        answer_all(&mut w);
        let err = w
            .submit(&default_catalog(), |_| {
                Err(RosterError::MemberNotFound("m1".to_string()))
            })
            .unwrap_err();
        assert!(matches!(err, RosterError::MemberNotFound(_)));
        assert_eq!(
            w.state(),
            &WizardState::Failed {
                step: 4,
                message: "member not found: m1".to_string()
            }
        );
        assert!(w.outcome().is_none());

        // Operator can go back or resubmit; no automatic retry happened.
        let outcome = w.submit(&default_catalog(), |_| Ok(())).unwrap();
        assert_eq!(outcome.category, Category::Star);
    }

    #[test]
    fn resume_positions_on_first_missing() {
        let mut a = Answers::default();
        a.set(Question::EnergyFocus.parse("teaching_mentoring").unwrap());
        let w = Wizard::resume(a, ScoringConfig::default());
        assert_eq!(w.current_question(), Some(Question::AgeGroup));
    }
}
