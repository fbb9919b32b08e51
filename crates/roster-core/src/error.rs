use thiserror::Error;

#[derive(Debug, Error)]
pub enum RosterError {
    #[error("not initialized: run 'roster init'")]
    NotInitialized,

    #[error("member not found: {0}")]
    MemberNotFound(String),

    #[error("member with email '{0}' already exists")]
    MemberExists(String),

    #[error("member is inactive: {0}")]
    MemberInactive(String),

    #[error("skill not found: {0}")]
    SkillNotFound(String),

    #[error("skill already exists: {0}")]
    SkillExists(String),

    #[error("certification not found: {0}")]
    CertificationNotFound(String),

    #[error("certification already exists: {0}")]
    CertificationExists(String),

    #[error("trainer profile not found for member: {0}")]
    TrainerNotFound(String),

    #[error("trainer profile already exists for member: {0}")]
    TrainerExists(String),

    #[error("vertical not found: {0}")]
    VerticalNotFound(String),

    #[error("vertical already exists: {0}")]
    VerticalExists(String),

    #[error("vertical is inactive: {0}")]
    VerticalInactive(String),

    #[error("kpi not found: {0}")]
    KpiNotFound(String),

    #[error("kpi already exists: {0}")]
    KpiExists(String),

    #[error("assessment not found for member: {0}")]
    AssessmentNotFound(String),

    #[error("assessment for member '{member}' is {status}, expected {expected}")]
    AssessmentState {
        member: String,
        status: String,
        expected: String,
    },

    #[error("roadmap milestone not found: month {0}")]
    RoadmapMonthNotFound(u8),

    #[error("succession cycle not found: {0}")]
    SuccessionNotFound(String),

    #[error("succession cycle already exists: {0}")]
    SuccessionExists(String),

    #[error("succession entry not found: {0}")]
    SuccessionEntryNotFound(String),

    #[error("invalid slug '{0}': must be lowercase alphanumeric with hyphens")]
    InvalidSlug(String),

    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("invalid answer for {question}: {reason}")]
    InvalidAnswer { question: String, reason: String },

    #[error("invalid transition from {from} to {to}: {reason}")]
    InvalidTransition {
        from: String,
        to: String,
        reason: String,
    },

    #[error("invalid phone number: {0}")]
    InvalidPhone(String),

    #[error("messaging is not configured: {0}")]
    MessagingNotConfigured(String),

    #[error("message delivery failed: {0}")]
    Delivery(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

impl RosterError {
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        RosterError::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// True for errors caused by caller input rather than the store or the network.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            RosterError::InvalidSlug(_)
                | RosterError::Validation { .. }
                | RosterError::InvalidAnswer { .. }
                | RosterError::InvalidPhone(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, RosterError>;
