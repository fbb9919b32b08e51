use super::load_config;
use crate::output::print_json;
use anyhow::Context;
use clap::Subcommand;
use roster_core::config::{MessagingConfig, WarnLevel};
use std::path::Path;

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Print the current config
    Show,

    /// Validate the config for common mistakes
    Validate,

    /// Set the skill/will category thresholds (0.0 to 1.0, inclusive)
    SetThresholds {
        #[arg(long)]
        skill: Option<f64>,
        #[arg(long)]
        will: Option<f64>,
    },

    /// Configure the WhatsApp messaging endpoint
    SetMessaging {
        #[arg(long)]
        api_url: String,
        /// Environment variable that holds the bearer token
        #[arg(long)]
        token_env: Option<String>,
        #[arg(long)]
        country_code: Option<String>,
    },

    /// Days a completed assessment stays valid
    SetValidity { days: u32 },
}

pub fn run(root: &Path, subcmd: ConfigSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        ConfigSubcommand::Show => show(root, json),
        ConfigSubcommand::Validate => validate(root, json),
        ConfigSubcommand::SetThresholds { skill, will } => set_thresholds(root, skill, will, json),
        ConfigSubcommand::SetMessaging {
            api_url,
            token_env,
            country_code,
        } => set_messaging(root, api_url, token_env, country_code, json),
        ConfigSubcommand::SetValidity { days } => set_validity(root, days, json),
    }
}

fn show(root: &Path, json: bool) -> anyhow::Result<()> {
    let config = load_config(root)?;
    if json {
        return print_json(&config);
    }
    println!("Organization:     {}", config.organization.name);
    if let Some(chapter) = &config.organization.chapter {
        println!("Chapter:          {chapter}");
    }
    println!(
        "Thresholds:       skill >= {}, will >= {}",
        config.scoring.skill_threshold, config.scoring.will_threshold
    );
    println!("Validity (days):  {}", config.assessment.validity_days);
    match &config.messaging {
        Some(m) => println!("Messaging:        {} (token from ${})", m.api_url, m.token_env),
        None => println!("Messaging:        not configured"),
    }
    Ok(())
}

fn validate(root: &Path, json: bool) -> anyhow::Result<()> {
    let config = load_config(root)?;
    let warnings = config.validate();

    if json {
        print_json(&serde_json::json!({ "warnings": warnings }))?;
    } else if warnings.is_empty() {
        println!("Config is valid. No warnings.");
    } else {
        for w in &warnings {
            let prefix = match w.level {
                WarnLevel::Warning => "warning",
                WarnLevel::Error => "error",
            };
            println!("[{prefix}] {}", w.message);
        }
    }

    if warnings.iter().any(|w| w.level == WarnLevel::Error) {
        anyhow::bail!("config validation found errors");
    }
    Ok(())
}

fn set_thresholds(root: &Path, skill: Option<f64>, will: Option<f64>, json: bool) -> anyhow::Result<()> {
    let mut config = load_config(root)?;
    for value in [skill, will].into_iter().flatten() {
        if !(0.0..=1.0).contains(&value) {
            anyhow::bail!("threshold {value} is outside [0, 1]");
        }
    }
    if let Some(s) = skill {
        config.scoring.skill_threshold = s;
    }
    if let Some(w) = will {
        config.scoring.will_threshold = w;
    }
    config.save(root).context("failed to save config")?;

    if json {
        print_json(&config.scoring)?;
    } else {
        println!(
            "Thresholds: skill >= {}, will >= {}",
            config.scoring.skill_threshold, config.scoring.will_threshold
        );
    }
    Ok(())
}

fn set_messaging(
    root: &Path,
    api_url: String,
    token_env: Option<String>,
    country_code: Option<String>,
    json: bool,
) -> anyhow::Result<()> {
    let mut config = load_config(root)?;
    let previous = config.messaging.take();
    let messaging = MessagingConfig {
        api_url,
        token_env: token_env
            .or_else(|| previous.as_ref().map(|m| m.token_env.clone()))
            .unwrap_or_else(|| "ROSTER_WHATSAPP_TOKEN".to_string()),
        default_country_code: country_code
            .or_else(|| previous.map(|m| m.default_country_code))
            .unwrap_or_else(|| "91".to_string()),
    };
    config.messaging = Some(messaging);
    config.save(root).context("failed to save config")?;

    if json {
        print_json(&config.messaging)?;
    } else {
        println!("Messaging configured.");
    }
    Ok(())
}

fn set_validity(root: &Path, days: u32, json: bool) -> anyhow::Result<()> {
    let mut config = load_config(root)?;
    config.assessment.validity_days = days;
    config.save(root).context("failed to save config")?;
    if json {
        print_json(&config.assessment)?;
    } else {
        println!("Assessments stay valid for {days} days.");
    }
    Ok(())
}
