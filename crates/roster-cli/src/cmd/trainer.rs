use super::member::resolve_member;
use crate::output::{print_json, print_table};
use anyhow::Context;
use clap::Subcommand;
use roster_core::member::Member;
use roster_core::trainer::TrainerProfile;
use std::path::Path;

#[derive(Subcommand)]
pub enum TrainerSubcommand {
    /// Register a member as a trainer
    Create {
        member: String,
        /// Skill slugs (repeatable)
        #[arg(long = "expertise")]
        expertise: Vec<String>,
        #[arg(long)]
        bio: Option<String>,
    },
    List,
    Show { member: String },
    /// Log a delivered session, optionally with a 0-5 rating
    Session {
        member: String,
        #[arg(long)]
        rating: Option<f64>,
    },
    Deactivate { member: String },
}

pub fn run(root: &Path, subcmd: TrainerSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        TrainerSubcommand::Create {
            member,
            expertise,
            bio,
        } => {
            let m = resolve_member(root, &member)?;
            let mut profile = TrainerProfile::create(root, &m.id, expertise)
                .context("failed to create trainer profile")?;
            if bio.is_some() {
                profile.bio = bio;
                profile.save(root).context("failed to save trainer profile")?;
            }
            if json {
                print_json(&profile)?;
            } else {
                println!("Registered '{}' as a trainer.", m.name);
            }
            Ok(())
        }
        TrainerSubcommand::List => list(root, json),
        TrainerSubcommand::Show { member } => {
            let m = resolve_member(root, &member)?;
            let p = TrainerProfile::load(root, &m.id).context("failed to load trainer profile")?;
            if json {
                return print_json(&p);
            }
            println!("Trainer:   {} ({})", m.name, p.status);
            println!("Expertise: {}", p.expertise.join(", "));
            println!("Sessions:  {}", p.sessions_delivered);
            println!("Rating:    {:.2} ({} ratings)", p.rating, p.rating_count);
            if let Some(bio) = &p.bio {
                println!("\n{bio}");
            }
            Ok(())
        }
        TrainerSubcommand::Session { member, rating } => {
            let m = resolve_member(root, &member)?;
            let mut p =
                TrainerProfile::load(root, &m.id).context("failed to load trainer profile")?;
            p.record_session(rating).context("failed to record session")?;
            p.save(root).context("failed to save trainer profile")?;
            if json {
                print_json(&p)?;
            } else {
                println!(
                    "Recorded session for '{}': {} sessions, rating {:.2}.",
                    m.name, p.sessions_delivered, p.rating
                );
            }
            Ok(())
        }
        TrainerSubcommand::Deactivate { member } => {
            let m = resolve_member(root, &member)?;
            let mut p =
                TrainerProfile::load(root, &m.id).context("failed to load trainer profile")?;
            p.deactivate();
            p.save(root).context("failed to save trainer profile")?;
            if json {
                print_json(&p)?;
            } else {
                println!("Deactivated trainer '{}'.", m.name);
            }
            Ok(())
        }
    }
}

fn list(root: &Path, json: bool) -> anyhow::Result<()> {
    let profiles = TrainerProfile::list(root).context("failed to list trainers")?;
    if json {
        return print_json(&profiles);
    }
    if profiles.is_empty() {
        println!("No trainers.");
        return Ok(());
    }
    let rows = profiles
        .iter()
        .map(|p| {
            let name = Member::load(root, &p.member_id)
                .map(|m| m.name)
                .unwrap_or_else(|_| p.member_id.clone());
            vec![
                name,
                p.expertise.join(", "),
                p.sessions_delivered.to_string(),
                format!("{:.2}", p.rating),
                p.status.to_string(),
            ]
        })
        .collect();
    print_table(&["TRAINER", "EXPERTISE", "SESSIONS", "RATING", "STATUS"], rows);
    Ok(())
}
