use crate::output::{or_dash, print_json, print_table};
use anyhow::Context;
use clap::Subcommand;
use roster_core::skill::Skill;
use std::path::Path;

#[derive(Subcommand)]
pub enum SkillSubcommand {
    /// Add a skill to the catalog
    Create {
        slug: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    List,
    /// Hide a skill from new assignments
    Deactivate { slug: String },
}

pub fn run(root: &Path, subcmd: SkillSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        SkillSubcommand::Create {
            slug,
            name,
            category,
            description,
        } => {
            let mut skill = Skill::create(root, &slug, name)
                .with_context(|| format!("failed to create skill '{slug}'"))?;
            if category.is_some() || description.is_some() {
                skill.category = category;
                skill.description = description;
                skill.save(root).context("failed to save skill")?;
            }
            if json {
                print_json(&skill)?;
            } else {
                println!("Created skill '{slug}'.");
            }
            Ok(())
        }
        SkillSubcommand::List => {
            let skills = Skill::list(root).context("failed to list skills")?;
            if json {
                return print_json(&skills);
            }
            if skills.is_empty() {
                println!("No skills.");
                return Ok(());
            }
            let rows = skills
                .iter()
                .map(|s| {
                    vec![
                        s.slug.clone(),
                        s.name.clone(),
                        or_dash(s.category.as_deref()),
                        if s.active { "active" } else { "inactive" }.to_string(),
                    ]
                })
                .collect();
            print_table(&["SLUG", "NAME", "CATEGORY", "STATUS"], rows);
            Ok(())
        }
        SkillSubcommand::Deactivate { slug } => {
            let mut skill = Skill::load(root, &slug).with_context(|| format!("skill '{slug}' not found"))?;
            skill.deactivate();
            skill.save(root).context("failed to save skill")?;
            if json {
                print_json(&skill)?;
            } else {
                println!("Deactivated skill '{slug}'.");
            }
            Ok(())
        }
    }
}
