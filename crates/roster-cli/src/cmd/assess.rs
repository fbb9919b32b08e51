use super::load_config;
use super::member::resolve_member;
use crate::output::{or_dash, print_json, print_table};
use anyhow::Context;
use clap::Subcommand;
use roster_core::answers::Question;
use roster_core::assessment::Assessment;
use roster_core::member::Member;
use roster_core::roadmap;
use roster_core::vertical::Vertical;
use roster_core::wizard::{Wizard, WizardState};
use std::io::{BufRead, Write};
use std::path::Path;

#[derive(Subcommand)]
pub enum AssessSubcommand {
    /// List the five questions and their options
    Questions,
    /// Start (or resume) an assessment; retakes a completed one
    Start { member: String },
    /// Record one answer on an in-progress assessment
    Answer {
        member: String,
        question: Question,
        value: String,
    },
    /// Score and categorize an in-progress assessment
    Submit { member: String },
    /// Walk through the questions on stdin and submit
    Take { member: String },
    Show { member: String },
    List,
    /// Archived attempts for a member
    History { member: String },
    AssignVertical { member: String, vertical: String },
    AssignMentor { member: String, mentor: String },
    /// Mark a roadmap month complete
    Complete { member: String, month: u8 },
    /// Expire completed assessments past their validity period
    Expire {
        /// Override assessment.validity_days
        #[arg(long)]
        days: Option<u32>,
    },
}

pub fn run(root: &Path, subcmd: AssessSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        AssessSubcommand::Questions => questions(json),
        AssessSubcommand::Start { member } => start(root, &member, json),
        AssessSubcommand::Answer {
            member,
            question,
            value,
        } => answer(root, &member, question, &value, json),
        AssessSubcommand::Submit { member } => submit(root, &member, json),
        AssessSubcommand::Take { member } => take(root, &member, json),
        AssessSubcommand::Show { member } => show(root, &member, json),
        AssessSubcommand::List => list(root, json),
        AssessSubcommand::History { member } => history(root, &member, json),
        AssessSubcommand::AssignVertical { member, vertical } => {
            let m = resolve_member(root, &member)?;
            let a = Assessment::assign_vertical(root, &m.id, &vertical)
                .context("failed to assign vertical")?;
            if json {
                print_json(&a)?;
            } else {
                println!("Assigned '{}' to vertical '{vertical}'.", m.name);
            }
            Ok(())
        }
        AssessSubcommand::AssignMentor { member, mentor } => {
            let m = resolve_member(root, &member)?;
            let mentor = resolve_member(root, &mentor)?;
            let a = Assessment::assign_mentor(root, &m.id, &mentor.id)
                .context("failed to assign mentor")?;
            if json {
                print_json(&a)?;
            } else {
                println!("Assigned mentor '{}' to '{}'.", mentor.name, m.name);
            }
            Ok(())
        }
        AssessSubcommand::Complete { member, month } => {
            let m = resolve_member(root, &member)?;
            let (a, changed) = Assessment::complete_milestone(root, &m.id, month)
                .context("failed to complete milestone")?;
            if json {
                print_json(&serde_json::json!({ "changed": changed, "assessment": a }))?;
            } else if changed {
                println!("Month {month} complete ({}).", roadmap::summarize(&a.roadmap));
            } else {
                println!("Month {month} was already complete.");
            }
            Ok(())
        }
        AssessSubcommand::Expire { days } => {
            let config = load_config(root)?;
            let days = days.unwrap_or(config.assessment.validity_days);
            let expired = Assessment::expire_stale(root, chrono::Utc::now(), days)
                .context("failed to expire assessments")?;
            if json {
                print_json(&serde_json::json!({ "expired": expired }))?;
            } else {
                println!("Expired {} assessment(s).", expired.len());
            }
            Ok(())
        }
    }
}

fn questions(json: bool) -> anyhow::Result<()> {
    if json {
        let items: Vec<serde_json::Value> = Question::all()
            .iter()
            .map(|q| {
                serde_json::json!({
                    "question": q.as_str(),
                    "prompt": q.prompt(),
                    "options": q.options().into_iter()
                        .map(|(value, label)| serde_json::json!({ "value": value, "label": label }))
                        .collect::<Vec<_>>(),
                })
            })
            .collect();
        return print_json(&items);
    }
    for (i, q) in Question::all().iter().enumerate() {
        println!("{}. {} [{}]", i + 1, q.prompt(), q.as_str());
        for (value, label) in q.options() {
            println!("     {value:<24} {label}");
        }
    }
    Ok(())
}

fn start(root: &Path, reference: &str, json: bool) -> anyhow::Result<()> {
    let m = resolve_member(root, reference)?;
    let a = Assessment::start(root, &m.id).context("failed to start assessment")?;
    if json {
        return print_json(&a);
    }
    println!(
        "Assessment v{} for '{}' is {} ({}/{} answered).",
        a.version,
        m.name,
        a.status,
        a.answers.answered_count(),
        Question::COUNT
    );
    Ok(())
}

fn answer(root: &Path, reference: &str, question: Question, raw: &str, json: bool) -> anyhow::Result<()> {
    let config = load_config(root)?;
    let m = resolve_member(root, reference)?;
    let mut a = Assessment::load(root, &m.id).context("no assessment; run 'roster assess start' first")?;
    let value = question.parse(raw)?;
    a.record_answer(value, &config).context("failed to record answer")?;
    a.save(root).context("failed to save assessment")?;
    if json {
        return print_json(&a);
    }
    println!(
        "Recorded {question} = {raw} ({}/{} answered).",
        a.answers.answered_count(),
        Question::COUNT
    );
    Ok(())
}

fn submit(root: &Path, reference: &str, json: bool) -> anyhow::Result<()> {
    let config = load_config(root)?;
    let m = resolve_member(root, reference)?;
    let a = Assessment::submit(root, &m.id, &config).context("failed to submit assessment")?;
    if json {
        return print_json(&a);
    }
    print_result(&m, &a);
    Ok(())
}

/// Interactive wizard. Each line answers the current question; `back` steps
/// back one question. If saving fails the answers are kept: an empty line
/// retries, `back` or a new answer revises them first.
fn take(root: &Path, reference: &str, json: bool) -> anyhow::Result<()> {
    let config = load_config(root)?;
    let m = resolve_member(root, reference)?;
    let mut assessment = Assessment::start(root, &m.id).context("failed to start assessment")?;
    let catalog = Vertical::list(root).context("failed to load verticals")?;
    let mut wizard = Wizard::new(config.scoring);

    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();
    let mut stdout = std::io::stdout();

    loop {
        let Some(question) = wizard.current_question() else {
            break;
        };
        if !json {
            println!("\n{}", question.prompt());
            for (value, label) in question.options() {
                println!("  {value:<24} {label}");
            }
            print!("> ");
            stdout.flush()?;
        }
        let Some(line) = lines.next().transpose()? else {
            if matches!(wizard.state(), WizardState::Failed { .. }) {
                anyhow::bail!("input ended before the assessment was saved");
            }
            anyhow::bail!("input ended before all questions were answered");
        };
        let line = line.trim();
        let retry = line.is_empty() && matches!(wizard.state(), WizardState::Failed { .. });
        if !retry {
            if line.eq_ignore_ascii_case("back") {
                wizard.back()?;
                continue;
            }
            let was_last = question.index() == Question::COUNT - 1;
            match wizard.answer_raw(line) {
                Ok(()) if was_last && wizard.answers().complete().is_some() => {}
                Ok(()) => continue,
                Err(e) => {
                    eprintln!("{e}");
                    continue;
                }
            }
        }

        let submitted = wizard.submit(&catalog, |outcome| {
            assessment.record_outcome(outcome);
            assessment.save(root)
        });
        match submitted {
            Ok(_) => break,
            Err(e) => {
                eprintln!("error: could not save assessment: {e}");
                eprintln!("press enter to retry, or type 'back' to change an answer");
            }
        }
    }

    if json {
        return print_json(&assessment);
    }
    print_result(&m, &assessment);
    Ok(())
}

fn print_result(m: &Member, a: &Assessment) {
    let category = a.category.map(|c| c.info());
    println!();
    println!("Assessment for {}", m.name);
    println!("  skill: {:.2}  will: {:.2}", a.skill_score, a.will_score);
    if let Some(info) = category {
        println!("  category: {}: {}", info.label, info.description);
    }
    if let Some(r) = &a.recommendation {
        println!("  {r}");
    }
    if !a.matches.is_empty() {
        println!("\nTop matches:");
        for mt in &a.matches {
            println!("  {:>3}%  {}", mt.percentage, mt.name);
        }
    }
    if !a.roadmap.is_empty() {
        println!("\nRoadmap ({}):", roadmap::summarize(&a.roadmap));
        for ms in &a.roadmap {
            let mark = if ms.completed { "x" } else { " " };
            println!("  [{mark}] Month {}: {}", ms.month, ms.title);
        }
    }
}

fn show(root: &Path, reference: &str, json: bool) -> anyhow::Result<()> {
    let m = resolve_member(root, reference)?;
    let a = Assessment::load(root, &m.id).context("failed to load assessment")?;
    if json {
        return print_json(&a);
    }
    println!("Version {} ({})", a.version, a.status);
    print_result(&m, &a);
    if let Some(v) = &a.assigned_vertical {
        println!("\nAssigned vertical: {v}");
    }
    if let Some(mentor) = &a.assigned_mentor {
        let name = Member::load(root, mentor).map(|m| m.name).unwrap_or_else(|_| mentor.clone());
        println!("Mentor: {name}");
    }
    Ok(())
}

fn list(root: &Path, json: bool) -> anyhow::Result<()> {
    let assessments = Assessment::list(root).context("failed to list assessments")?;
    if json {
        return print_json(&assessments);
    }
    if assessments.is_empty() {
        println!("No assessments.");
        return Ok(());
    }
    let rows = assessments
        .iter()
        .map(|a| {
            let name = Member::load(root, &a.member_id)
                .map(|m| m.name)
                .unwrap_or_else(|_| a.member_id.clone());
            vec![
                name,
                a.version.to_string(),
                a.status.to_string(),
                a.category.map(|c| c.to_string()).unwrap_or_else(|| "-".to_string()),
                or_dash(a.assigned_vertical.as_deref()),
                roadmap::summarize(&a.roadmap),
            ]
        })
        .collect();
    print_table(&["MEMBER", "V", "STATUS", "CATEGORY", "VERTICAL", "ROADMAP"], rows);
    Ok(())
}

fn history(root: &Path, reference: &str, json: bool) -> anyhow::Result<()> {
    let m = resolve_member(root, reference)?;
    let attempts = Assessment::attempts(root, &m.id).context("failed to load attempts")?;
    if json {
        return print_json(&attempts);
    }
    if attempts.is_empty() {
        println!("No archived attempts.");
        return Ok(());
    }
    let rows = attempts
        .iter()
        .map(|a| {
            vec![
                a.version.to_string(),
                a.status.to_string(),
                a.category.map(|c| c.to_string()).unwrap_or_else(|| "-".to_string()),
                a.completed_at
                    .map(|t| t.format("%Y-%m-%d").to_string())
                    .unwrap_or_else(|| "-".to_string()),
            ]
        })
        .collect();
    print_table(&["V", "STATUS", "CATEGORY", "COMPLETED"], rows);
    Ok(())
}
