use crate::output::{print_json, print_table};
use anyhow::Context;
use clap::Subcommand;
use roster_core::answers::{AgeGroup, EnergyFocus, SkillLevel, TimeCommitment, TravelWillingness};
use roster_core::scoring::Category;
use roster_core::vertical::{Kpi, Vertical, VerticalProfile};
use std::path::Path;

#[derive(Subcommand)]
pub enum VerticalSubcommand {
    /// Add a vertical
    Create {
        slug: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: Option<String>,
    },
    List,
    Show { slug: String },
    /// Remove a vertical from matching and assignment
    Deactivate { slug: String },
    /// Set the member profile the matcher compares assessments against
    SetProfile {
        slug: String,
        #[arg(long = "energy")]
        energy_focus: Vec<EnergyFocus>,
        #[arg(long = "age")]
        age_groups: Vec<AgeGroup>,
        #[arg(long)]
        min_skill: SkillLevel,
        #[arg(long)]
        time: TimeCommitment,
        #[arg(long)]
        travel: TravelWillingness,
        #[arg(long = "category")]
        categories: Vec<Category>,
    },
    /// Add a KPI with a target
    AddKpi {
        slug: String,
        kpi: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        target: f64,
        #[arg(long)]
        unit: Option<String>,
        #[arg(long, default_value = "1")]
        weight: u32,
    },
    /// Record a KPI actual for a period (replaces an earlier value)
    Record {
        slug: String,
        kpi: String,
        #[arg(long)]
        period: String,
        #[arg(long)]
        value: f64,
    },
    /// Achievement rates and overall band
    Performance {
        slug: String,
        #[arg(long)]
        period: Option<String>,
    },
}

pub fn run(root: &Path, subcmd: VerticalSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        VerticalSubcommand::Create {
            slug,
            name,
            description,
        } => {
            let mut v = Vertical::create(root, &slug, name)
                .with_context(|| format!("failed to create vertical '{slug}'"))?;
            if description.is_some() {
                v.description = description;
                v.save(root).context("failed to save vertical")?;
            }
            if json {
                print_json(&v)?;
            } else {
                println!("Created vertical '{slug}'.");
            }
            Ok(())
        }
        VerticalSubcommand::List => list(root, json),
        VerticalSubcommand::Show { slug } => show(root, &slug, json),
        VerticalSubcommand::Deactivate { slug } => {
            let mut v = load(root, &slug)?;
            v.deactivate();
            v.save(root).context("failed to save vertical")?;
            if json {
                print_json(&v)?;
            } else {
                println!("Deactivated vertical '{slug}'.");
            }
            Ok(())
        }
        VerticalSubcommand::SetProfile {
            slug,
            energy_focus,
            age_groups,
            min_skill,
            time,
            travel,
            categories,
        } => {
            let mut v = load(root, &slug)?;
            v.set_profile(VerticalProfile {
                energy_focus,
                age_groups,
                min_skill_level: min_skill,
                time_commitment: time,
                travel,
                categories,
            });
            v.save(root).context("failed to save vertical")?;
            if json {
                print_json(&v.profile)?;
            } else {
                println!("Updated profile for '{slug}'.");
            }
            Ok(())
        }
        VerticalSubcommand::AddKpi {
            slug,
            kpi,
            name,
            target,
            unit,
            weight,
        } => {
            let mut v = load(root, &slug)?;
            let mut k = Kpi::new(&kpi, name, target);
            k.unit = unit;
            k.weight = weight;
            v.add_kpi(k).with_context(|| format!("failed to add kpi '{kpi}'"))?;
            v.save(root).context("failed to save vertical")?;
            if json {
                print_json(&v.kpi(&kpi))?;
            } else {
                println!("Added KPI '{kpi}' to '{slug}'.");
            }
            Ok(())
        }
        VerticalSubcommand::Record {
            slug,
            kpi,
            period,
            value,
        } => {
            let mut v = load(root, &slug)?;
            v.record_actual(&kpi, &period, value)
                .with_context(|| format!("failed to record '{kpi}'"))?;
            v.save(root).context("failed to save vertical")?;
            if json {
                print_json(&v.kpi(&kpi))?;
            } else {
                println!("Recorded {value} for '{kpi}' in {period}.");
            }
            Ok(())
        }
        VerticalSubcommand::Performance { slug, period } => {
            let v = load(root, &slug)?;
            let perf = v.performance(period.as_deref());
            if json {
                return print_json(&perf);
            }
            let rows = perf
                .kpis
                .iter()
                .map(|k| {
                    vec![
                        k.kpi.clone(),
                        format!("{}", k.actual),
                        format!("{}", k.target),
                        k.weight.to_string(),
                        format!("{:.1}%", k.achievement_rate),
                    ]
                })
                .collect();
            print_table(&["KPI", "ACTUAL", "TARGET", "WEIGHT", "ACHIEVED"], rows);
            println!("\nScore: {:.1} ({})", perf.score, perf.band);
            Ok(())
        }
    }
}

fn load(root: &Path, slug: &str) -> anyhow::Result<Vertical> {
    Vertical::load(root, slug).with_context(|| format!("vertical '{slug}' not found"))
}

fn list(root: &Path, json: bool) -> anyhow::Result<()> {
    let verticals = Vertical::list(root).context("failed to list verticals")?;
    if json {
        return print_json(&verticals);
    }
    if verticals.is_empty() {
        println!("No verticals.");
        return Ok(());
    }
    let rows = verticals
        .iter()
        .map(|v| {
            vec![
                v.display_order.to_string(),
                v.slug.clone(),
                v.name.clone(),
                v.kpis.len().to_string(),
                if v.active { "active" } else { "inactive" }.to_string(),
            ]
        })
        .collect();
    print_table(&["#", "SLUG", "NAME", "KPIS", "STATUS"], rows);
    Ok(())
}

fn show(root: &Path, slug: &str, json: bool) -> anyhow::Result<()> {
    let v = load(root, slug)?;
    if json {
        return print_json(&v);
    }
    println!("Vertical: {} ({})", v.name, v.slug);
    if let Some(d) = &v.description {
        println!("  {d}");
    }
    println!("Status:   {}", if v.active { "active" } else { "inactive" });
    match &v.profile {
        Some(p) => {
            let join = |items: Vec<&str>| {
                if items.is_empty() {
                    "any".to_string()
                } else {
                    items.join(", ")
                }
            };
            println!("Profile:");
            println!("  energy:     {}", join(p.energy_focus.iter().map(|e| e.as_str()).collect()));
            println!("  ages:       {}", join(p.age_groups.iter().map(|a| a.as_str()).collect()));
            println!("  min skill:  {}", p.min_skill_level);
            println!("  time:       {}", p.time_commitment);
            println!("  travel:     {}", p.travel);
            println!("  categories: {}", join(p.categories.iter().map(|c| c.as_str()).collect()));
        }
        None => println!("Profile:  none (not matched)"),
    }
    for k in &v.kpis {
        println!(
            "  kpi {}: target {}{} (weight {})",
            k.slug,
            k.target,
            k.unit.as_deref().map(|u| format!(" {u}")).unwrap_or_default(),
            k.weight
        );
    }
    Ok(())
}
