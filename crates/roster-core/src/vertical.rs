use crate::answers::{AgeGroup, EnergyFocus, SkillLevel, TimeCommitment, TravelWillingness};
use crate::error::{Result, RosterError};
use crate::paths;
use crate::scoring::Category;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

// ---------------------------------------------------------------------------
// VerticalProfile
// ---------------------------------------------------------------------------

/// The member profile a vertical looks for. Compared against assessment
/// answers by the matcher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerticalProfile {
    #[serde(default)]
    pub energy_focus: Vec<EnergyFocus>,
    #[serde(default)]
    pub age_groups: Vec<AgeGroup>,
    pub min_skill_level: SkillLevel,
    pub time_commitment: TimeCommitment,
    pub travel: TravelWillingness,
    #[serde(default)]
    pub categories: Vec<Category>,
}

// ---------------------------------------------------------------------------
// Kpi
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KpiActual {
    /// Reporting period label, e.g. `2026-q3` or `2026-10`.
    pub period: String,
    pub value: f64,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Kpi {
    pub slug: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    pub target: f64,
    #[serde(default = "default_weight")]
    pub weight: u32,
    #[serde(default)]
    pub actuals: Vec<KpiActual>,
}

fn default_weight() -> u32 {
    1
}

impl Kpi {
    pub fn new(slug: impl Into<String>, name: impl Into<String>, target: f64) -> Self {
        Self {
            slug: slug.into(),
            name: name.into(),
            unit: None,
            target,
            weight: default_weight(),
            actuals: Vec::new(),
        }
    }

    /// Sum of actuals, optionally restricted to one period.
    pub fn total(&self, period: Option<&str>) -> f64 {
        self.actuals
            .iter()
            .filter(|a| period.is_none_or(|p| a.period == p))
            .map(|a| a.value)
            .sum()
    }

    /// Percent of target achieved, capped at 100. Zero or negative targets score 0.
    pub fn achievement_rate(&self, period: Option<&str>) -> f64 {
        if self.target <= 0.0 {
            return 0.0;
        }
        (self.total(period) / self.target * 100.0).clamp(0.0, 100.0)
    }
}

// ---------------------------------------------------------------------------
// Performance
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PerformanceBand {
    Exceeding,
    OnTrack,
    AtRisk,
    OffTrack,
}

impl PerformanceBand {
    pub fn for_score(score: f64) -> Self {
        if score >= 90.0 {
            PerformanceBand::Exceeding
        } else if score >= 70.0 {
            PerformanceBand::OnTrack
        } else if score >= 40.0 {
            PerformanceBand::AtRisk
        } else {
            PerformanceBand::OffTrack
        }
    }
}

impl fmt::Display for PerformanceBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PerformanceBand::Exceeding => "exceeding",
            PerformanceBand::OnTrack => "on_track",
            PerformanceBand::AtRisk => "at_risk",
            PerformanceBand::OffTrack => "off_track",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KpiPerformance {
    pub kpi: String,
    pub name: String,
    pub target: f64,
    pub actual: f64,
    pub weight: u32,
    pub achievement_rate: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerticalPerformance {
    pub vertical: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period: Option<String>,
    pub kpis: Vec<KpiPerformance>,
    /// Weight-averaged achievement rate across KPIs, 0..=100.
    pub score: f64,
    pub band: PerformanceBand,
}

// ---------------------------------------------------------------------------
// Vertical
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vertical {
    pub slug: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub display_order: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<VerticalProfile>,
    #[serde(default)]
    pub kpis: Vec<Kpi>,
    #[serde(default = "default_active")]
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_active() -> bool {
    true
}

impl Vertical {
    pub fn new(slug: impl Into<String>, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            slug: slug.into(),
            name: name.into(),
            description: None,
            display_order: 0,
            profile: None,
            kpis: Vec::new(),
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    // ---------------------------------------------------------------------------
    // Persistence
    // ---------------------------------------------------------------------------

    pub fn create(root: &Path, slug: impl Into<String>, name: impl Into<String>) -> Result<Self> {
        let slug = slug.into();
        paths::validate_slug(&slug)?;
        if paths::vertical_manifest(root, &slug).exists() {
            return Err(RosterError::VerticalExists(slug));
        }
        let mut vertical = Self::new(slug, name);
        vertical.display_order = Self::list(root)?
            .iter()
            .map(|v| v.display_order + 1)
            .max()
            .unwrap_or(0);
        vertical.save(root)?;
        Ok(vertical)
    }

    pub fn load(root: &Path, slug: &str) -> Result<Self> {
        paths::validate_slug(slug)?;
        crate::io::read_yaml(&paths::vertical_manifest(root, slug))?
            .ok_or_else(|| RosterError::VerticalNotFound(slug.to_string()))
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        crate::io::write_yaml(&paths::vertical_manifest(root, &self.slug), self)
    }

    /// All verticals in display order.
    pub fn list(root: &Path) -> Result<Vec<Self>> {
        let mut verticals: Vec<Self> =
            crate::io::load_manifests(&root.join(paths::VERTICALS_DIR))?;
        verticals.sort_by(|a, b| {
            a.display_order
                .cmp(&b.display_order)
                .then_with(|| a.slug.cmp(&b.slug))
        });
        Ok(verticals)
    }

    /// Load and require the vertical to be active.
    pub fn load_active(root: &Path, slug: &str) -> Result<Self> {
        let v = Self::load(root, slug)?;
        if !v.active {
            return Err(RosterError::VerticalInactive(slug.to_string()));
        }
        Ok(v)
    }

    // ---------------------------------------------------------------------------
    // Mutations
    // ---------------------------------------------------------------------------

    pub fn deactivate(&mut self) {
        self.active = false;
        self.updated_at = Utc::now();
    }

    pub fn set_profile(&mut self, profile: VerticalProfile) {
        self.profile = Some(profile);
        self.updated_at = Utc::now();
    }

    pub fn add_kpi(&mut self, kpi: Kpi) -> Result<()> {
        paths::validate_slug(&kpi.slug)?;
        if !kpi.target.is_finite() || kpi.target <= 0.0 {
            return Err(RosterError::validation(
                "target",
                format!("must be a positive number, got {}", kpi.target),
            ));
        }
        if self.kpis.iter().any(|k| k.slug == kpi.slug) {
            return Err(RosterError::KpiExists(kpi.slug));
        }
        self.kpis.push(kpi);
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn kpi(&self, slug: &str) -> Option<&Kpi> {
        self.kpis.iter().find(|k| k.slug == slug)
    }

    /// Record the actual value for `period`. A second value for the same
    /// period replaces the first.
    pub fn record_actual(&mut self, kpi_slug: &str, period: &str, value: f64) -> Result<()> {
        if period.trim().is_empty() {
            return Err(RosterError::validation("period", "must not be empty"));
        }
        if !value.is_finite() || value < 0.0 {
            return Err(RosterError::validation(
                "value",
                format!("must be a non-negative number, got {value}"),
            ));
        }
        let kpi = self
            .kpis
            .iter_mut()
            .find(|k| k.slug == kpi_slug)
            .ok_or_else(|| RosterError::KpiNotFound(kpi_slug.to_string()))?;
        let actual = KpiActual {
            period: period.to_string(),
            value,
            recorded_at: Utc::now(),
        };
        match kpi.actuals.iter_mut().find(|a| a.period == period) {
            Some(existing) => *existing = actual,
            None => kpi.actuals.push(actual),
        }
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn performance(&self, period: Option<&str>) -> VerticalPerformance {
        let kpis: Vec<KpiPerformance> = self
            .kpis
            .iter()
            .map(|k| KpiPerformance {
                kpi: k.slug.clone(),
                name: k.name.clone(),
                target: k.target,
                actual: k.total(period),
                weight: k.weight,
                achievement_rate: k.achievement_rate(period),
            })
            .collect();

        // Summed in f64: user-supplied u32 weights can total more than u32::MAX.
        let total_weight: f64 = kpis.iter().map(|k| f64::from(k.weight)).sum();
        let score = if total_weight == 0.0 {
            0.0
        } else {
            kpis.iter()
                .map(|k| k.achievement_rate * f64::from(k.weight))
                .sum::<f64>()
                / total_weight
        };

        VerticalPerformance {
            vertical: self.slug.clone(),
            period: period.map(str::to_string),
            kpis,
            score,
            band: PerformanceBand::for_score(score),
        }
    }
}

// ---------------------------------------------------------------------------
// Default catalog
// ---------------------------------------------------------------------------

/// Verticals seeded by `roster init`, in display order.
pub fn default_catalog() -> Vec<Vertical> {
    use AgeGroup as A;
    use Category as C;
    use EnergyFocus as E;

    let entries: Vec<(&str, &str, &str, VerticalProfile)> = vec![
        (
            "masoom",
            "Masoom",
            "Child safety awareness in schools",
            VerticalProfile {
                energy_focus: vec![E::TeachingMentoring, E::HighEnergyFieldWork],
                age_groups: vec![A::Children],
                min_skill_level: SkillLevel::Intermediate,
                time_commitment: TimeCommitment::Medium,
                travel: TravelWillingness::Medium,
                categories: vec![C::Star, C::Enthusiast],
            },
        ),
        (
            "road-safety",
            "Road Safety",
            "Campaigns and workshops on safe road use",
            VerticalProfile {
                energy_focus: vec![E::HighEnergyFieldWork, E::CreativeContent],
                age_groups: vec![A::Teens, A::YoungAdults],
                min_skill_level: SkillLevel::Beginner,
                time_commitment: TimeCommitment::Medium,
                travel: TravelWillingness::High,
                categories: vec![C::Enthusiast, C::Star],
            },
        ),
        (
            "climate-change",
            "Climate Change",
            "Plantation drives, waste and water projects",
            VerticalProfile {
                energy_focus: vec![E::HighEnergyFieldWork, E::PolicyAdvocacy],
                age_groups: vec![A::AllAges, A::YoungAdults],
                min_skill_level: SkillLevel::Beginner,
                time_commitment: TimeCommitment::High,
                travel: TravelWillingness::High,
                categories: vec![C::Enthusiast, C::Star],
            },
        ),
        (
            "health",
            "Health",
            "Health camps and wellness awareness",
            VerticalProfile {
                energy_focus: vec![E::BehindTheScenes, E::HighEnergyFieldWork],
                age_groups: vec![A::Adults, A::AllAges],
                min_skill_level: SkillLevel::Intermediate,
                time_commitment: TimeCommitment::Medium,
                travel: TravelWillingness::Medium,
                categories: vec![C::Star, C::Cynic],
            },
        ),
        (
            "accessibility",
            "Accessibility",
            "Inclusion for people with disabilities",
            VerticalProfile {
                energy_focus: vec![E::PolicyAdvocacy, E::BehindTheScenes],
                age_groups: vec![A::AllAges],
                min_skill_level: SkillLevel::Advanced,
                time_commitment: TimeCommitment::Low,
                travel: TravelWillingness::Low,
                categories: vec![C::Cynic, C::Star],
            },
        ),
        (
            "entrepreneurship",
            "Entrepreneurship",
            "Mentoring student founders and start-up clinics",
            VerticalProfile {
                energy_focus: vec![E::TeachingMentoring, E::PolicyAdvocacy],
                age_groups: vec![A::YoungAdults, A::Adults],
                min_skill_level: SkillLevel::Advanced,
                time_commitment: TimeCommitment::Low,
                travel: TravelWillingness::Low,
                categories: vec![C::Star, C::Cynic],
            },
        ),
        (
            "learning",
            "Learning",
            "Workshops, skilling and exposure visits",
            VerticalProfile {
                energy_focus: vec![E::TeachingMentoring, E::CreativeContent],
                age_groups: vec![A::Teens, A::YoungAdults],
                min_skill_level: SkillLevel::Intermediate,
                time_commitment: TimeCommitment::Medium,
                travel: TravelWillingness::Low,
                categories: vec![C::Star, C::Enthusiast],
            },
        ),
        (
            "rural-initiatives",
            "Rural Initiatives",
            "Village adoption and livelihood programs",
            VerticalProfile {
                energy_focus: vec![E::HighEnergyFieldWork, E::BehindTheScenes],
                age_groups: vec![A::AllAges, A::Adults],
                min_skill_level: SkillLevel::Beginner,
                time_commitment: TimeCommitment::High,
                travel: TravelWillingness::High,
                categories: vec![C::Enthusiast, C::DeadWood],
            },
        ),
    ];

    entries
        .into_iter()
        .enumerate()
        .map(|(i, (slug, name, description, profile))| {
            let mut v = Vertical::new(slug, name);
            v.description = Some(description.to_string());
            v.display_order = i as u32;
            v.profile = Some(profile);
            v
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
