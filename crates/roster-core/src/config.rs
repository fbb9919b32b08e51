use crate::error::{Result, RosterError};
use crate::paths;
use serde::{Deserialize, Serialize};
use std::path::Path;

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// ScoringConfig
// ---------------------------------------------------------------------------

/// Quadrant thresholds for the skill-will categorizer. Both are inclusive:
/// a score equal to the threshold counts as "high".
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    #[serde(default = "default_threshold")]
    pub skill_threshold: f64,
    #[serde(default = "default_threshold")]
    pub will_threshold: f64,
}

fn default_threshold() -> f64 {
    0.5
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            skill_threshold: default_threshold(),
            will_threshold: default_threshold(),
        }
    }
}

// ---------------------------------------------------------------------------
// AssessmentConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessmentConfig {
    /// Days a completed assessment stays valid before `expire_stale` marks it expired.
    #[serde(default = "default_validity_days")]
    pub validity_days: u32,
}

fn default_validity_days() -> u32 {
    365
}

impl Default for AssessmentConfig {
    fn default() -> Self {
        Self {
            validity_days: default_validity_days(),
        }
    }
}

// ---------------------------------------------------------------------------
// MessagingConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessagingConfig {
    pub api_url: String,
    /// Name of the environment variable holding the bearer token.
    #[serde(default = "default_token_env")]
    pub token_env: String,
    #[serde(default = "default_country_code")]
    pub default_country_code: String,
}

fn default_token_env() -> String {
    "ROSTER_WHATSAPP_TOKEN".to_string()
}

pub(crate) fn default_country_code() -> String {
    "91".to_string()
}

// ---------------------------------------------------------------------------
// ImportConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportConfig {
    /// Chapter assigned to imported rows that leave the column blank.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_chapter: Option<String>,
}

// ---------------------------------------------------------------------------
// OrganizationConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrganizationConfig {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chapter: Option<String>,
}

// ---------------------------------------------------------------------------
// Config (top-level)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,
    pub organization: OrganizationConfig,
    #[serde(default)]
    pub scoring: ScoringConfig,
    #[serde(default)]
    pub assessment: AssessmentConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub messaging: Option<MessagingConfig>,
    #[serde(default)]
    pub import: ImportConfig,
}

fn default_version() -> u32 {
    1
}

impl Config {
    pub fn new(organization: impl Into<String>) -> Self {
        Self {
            version: 1,
            organization: OrganizationConfig {
                name: organization.into(),
                chapter: None,
            },
            scoring: ScoringConfig::default(),
            assessment: AssessmentConfig::default(),
            messaging: None,
            import: ImportConfig::default(),
        }
    }

    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Err(RosterError::NotInitialized);
        }
        let data = std::fs::read_to_string(&path)?;
        let cfg: Config = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    /// Country code used when normalising ten-digit phone numbers.
    pub fn country_code(&self) -> String {
        self.messaging
            .as_ref()
            .map(|m| m.default_country_code.clone())
            .unwrap_or_else(default_country_code)
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if self.organization.name.trim().is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "organization.name is empty".to_string(),
            });
        }

        for (name, value) in [
            ("scoring.skill_threshold", self.scoring.skill_threshold),
            ("scoring.will_threshold", self.scoring.will_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Error,
                    message: format!("{name}={value} is outside [0, 1]"),
                });
            } else if value == 0.0 || value == 1.0 {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Warning,
                    message: format!(
                        "{name}={value} collapses the quadrant; every member lands on one side"
                    ),
                });
            }
        }

        if self.assessment.validity_days == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "assessment.validity_days is 0; completed assessments expire immediately"
                    .to_string(),
            });
        }

        if let Some(m) = &self.messaging {
            if m.api_url.trim().is_empty() {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Error,
                    message: "messaging.api_url is empty".to_string(),
                });
            }
            if m.token_env.trim().is_empty() {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Error,
                    message: "messaging.token_env is empty".to_string(),
                });
            }
            if m.default_country_code.is_empty()
                || !m.default_country_code.chars().all(|c| c.is_ascii_digit())
            {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Warning,
                    message: format!(
                        "messaging.default_country_code '{}' is not numeric",
                        m.default_country_code
                    ),
                });
            }
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::new("Chapter North");
        let yaml = serde_yaml::to_string(&cfg).unwrap();
        let parsed: Config = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed.organization.name, "Chapter North");
        assert_eq!(parsed.version, 1);
        assert_eq!(parsed.scoring, ScoringConfig::default());
        assert_eq!(parsed.assessment.validity_days, 365);
    }

    #[test]
    fn minimal_yaml_fills_defaults() {
        let parsed: Config = serde_yaml::from_str("organization:\n  name: x\n").unwrap();
        assert_eq!(parsed.scoring.skill_threshold, 0.5);
        assert!(parsed.messaging.is_none());
        assert_eq!(parsed.country_code(), "91");
    }

    #[test]
    fn load_without_init_fails() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            Config::load(dir.path()),
            Err(RosterError::NotInitialized)
        ));
    }

    #[test]
    fn save_then_load() {
        let dir = TempDir::new().unwrap();
        let mut cfg = Config::new("x");
        cfg.assessment.validity_days = 90;
        cfg.save(dir.path()).unwrap();
        assert_eq!(Config::load(dir.path()).unwrap().assessment.validity_days, 90);
    }

    #[test]
    fn default_config_is_clean() {
        assert!(Config::new("x").validate().is_empty());
    }

    #[test]
    fn out_of_range_threshold_is_error() {
        let mut cfg = Config::new("x");
        cfg.scoring.will_threshold = 1.5;
        let warnings = cfg.validate();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].level, WarnLevel::Error);
        assert!(warnings[0].message.contains("scoring.will_threshold"));
    }

    #[test]
    fn empty_messaging_url_is_error() {
        let mut cfg = Config::new("x");
        cfg.messaging = Some(MessagingConfig {
            api_url: " ".to_string(),
            token_env: default_token_env(),
            default_country_code: "44".to_string(),
        });
        let warnings = cfg.validate();
        assert!(warnings
            .iter()
            .any(|w| w.level == WarnLevel::Error && w.message.contains("api_url")));
        assert_eq!(cfg.country_code(), "44");
    }
}
