use super::member::resolve_member;
use crate::output::{print_json, print_table};
use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::Subcommand;
use roster_core::member::Member;
use roster_core::succession::{
    ApplicationStatus, MeetingStatus, NominationStatus, SuccessionCycle,
};
use std::path::Path;

#[derive(Subcommand)]
pub enum SuccessionSubcommand {
    /// Open a succession cycle
    Create {
        slug: String,
        #[arg(long)]
        title: String,
        /// Positions to fill (repeatable)
        #[arg(long = "position", required = true)]
        positions: Vec<String>,
    },
    List,
    Show { slug: String },
    Nominate {
        slug: String,
        #[arg(long)]
        position: String,
        #[arg(long)]
        nominee: String,
        #[arg(long = "by")]
        nominated_by: String,
    },
    /// Accept, decline or withdraw a nomination
    Nomination {
        slug: String,
        id: String,
        status: NominationStatus,
    },
    Apply {
        slug: String,
        #[arg(long)]
        position: String,
        #[arg(long)]
        applicant: String,
        #[arg(long, default_value = "")]
        statement: String,
    },
    /// Shortlist, reject or select an application
    Application {
        slug: String,
        id: String,
        status: ApplicationStatus,
    },
    /// Schedule a selection meeting (RFC 3339 time)
    Schedule {
        slug: String,
        #[arg(long)]
        position: String,
        #[arg(long)]
        at: DateTime<Utc>,
    },
    /// Mark a meeting held or cancelled
    Meeting {
        slug: String,
        id: String,
        status: MeetingStatus,
    },
    OpenVoting { slug: String },
    Vote {
        slug: String,
        meeting: String,
        #[arg(long)]
        voter: String,
        #[arg(long)]
        candidate: String,
    },
    Tally { slug: String, meeting: String },
    Close { slug: String },
}

pub fn run(root: &Path, subcmd: SuccessionSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        SuccessionSubcommand::Create {
            slug,
            title,
            positions,
        } => {
            let c = SuccessionCycle::create(root, &slug, title, positions)
                .with_context(|| format!("failed to create cycle '{slug}'"))?;
            if json {
                print_json(&c)?;
            } else {
                println!("Opened succession cycle '{slug}' for {}.", c.positions.join(", "));
            }
            Ok(())
        }
        SuccessionSubcommand::List => list(root, json),
        SuccessionSubcommand::Show { slug } => show(root, &slug, json),
        SuccessionSubcommand::Nominate {
            slug,
            position,
            nominee,
            nominated_by,
        } => {
            let nominee = resolve_member(root, &nominee)?;
            let by = resolve_member(root, &nominated_by)?;
            mutate(root, &slug, json, |c| {
                let n = c.nominate(root, &position, &nominee.id, &by.id)?;
                Ok(format!("Nominated '{}' for {position} ({}).", nominee.name, n.id))
            })
        }
        SuccessionSubcommand::Nomination { slug, id, status } => mutate(root, &slug, json, |c| {
            c.set_nomination_status(&id, status)?;
            Ok(format!("Nomination {id} is now {status}."))
        }),
        SuccessionSubcommand::Apply {
            slug,
            position,
            applicant,
            statement,
        } => {
            let applicant = resolve_member(root, &applicant)?;
            mutate(root, &slug, json, |c| {
                let a = c.apply(root, &position, &applicant.id, statement)?;
                Ok(format!("Recorded application {} from '{}'.", a.id, applicant.name))
            })
        }
        SuccessionSubcommand::Application { slug, id, status } => mutate(root, &slug, json, |c| {
            c.set_application_status(&id, status)?;
            Ok(format!("Application {id} is now {status}."))
        }),
        SuccessionSubcommand::Schedule { slug, position, at } => mutate(root, &slug, json, |c| {
            let m = c.schedule_meeting(&position, at)?;
            Ok(format!("Scheduled meeting {} for {position} at {at}.", m.id))
        }),
        SuccessionSubcommand::Meeting { slug, id, status } => mutate(root, &slug, json, |c| {
            c.set_meeting_status(&id, status)?;
            Ok(format!("Meeting {id} is now {status}."))
        }),
        SuccessionSubcommand::OpenVoting { slug } => mutate(root, &slug, json, |c| {
            c.open_voting()?;
            Ok(format!("Voting is open for '{slug}'."))
        }),
        SuccessionSubcommand::Vote {
            slug,
            meeting,
            voter,
            candidate,
        } => {
            let voter = resolve_member(root, &voter)?;
            let candidate = resolve_member(root, &candidate)?;
            mutate(root, &slug, json, |c| {
                c.cast_vote(root, &meeting, &voter.id, &candidate.id)?;
                Ok(format!("Recorded vote by '{}' in {meeting}.", voter.name))
            })
        }
        SuccessionSubcommand::Tally { slug, meeting } => tally(root, &slug, &meeting, json),
        SuccessionSubcommand::Close { slug } => mutate(root, &slug, json, |c| {
            c.close()?;
            Ok(format!("Closed '{slug}'."))
        }),
    }
}

/// Load a cycle, apply `f`, save, and report.
fn mutate<F>(root: &Path, slug: &str, json: bool, f: F) -> anyhow::Result<()>
where
    F: FnOnce(&mut SuccessionCycle) -> roster_core::Result<String>,
{
    let mut cycle =
        SuccessionCycle::load(root, slug).with_context(|| format!("cycle '{slug}' not found"))?;
    let message = f(&mut cycle)?;
    cycle.save(root).context("failed to save cycle")?;
    if json {
        print_json(&cycle)?;
    } else {
        println!("{message}");
    }
    Ok(())
}

fn member_name(root: &Path, id: &str) -> String {
    Member::load(root, id)
        .map(|m| m.name)
        .unwrap_or_else(|_| id.to_string())
}

fn list(root: &Path, json: bool) -> anyhow::Result<()> {
    let cycles = SuccessionCycle::list(root).context("failed to list cycles")?;
    if json {
        return print_json(&cycles);
    }
    if cycles.is_empty() {
        println!("No succession cycles.");
        return Ok(());
    }
    let rows = cycles
        .iter()
        .map(|c| {
            vec![
                c.slug.clone(),
                c.title.clone(),
                c.status.to_string(),
                c.positions.join(", "),
                c.nominations.len().to_string(),
                c.applications.len().to_string(),
            ]
        })
        .collect();
    print_table(
        &["SLUG", "TITLE", "STATUS", "POSITIONS", "NOMINATIONS", "APPLICATIONS"],
        rows,
    );
    Ok(())
}

fn show(root: &Path, slug: &str, json: bool) -> anyhow::Result<()> {
    let c = SuccessionCycle::load(root, slug).with_context(|| format!("cycle '{slug}' not found"))?;
    if json {
        return print_json(&c);
    }
    println!("{} ({}) [{}]", c.title, c.slug, c.status);
    for position in &c.positions {
        println!("\n{position}");
        for n in c.nominations.iter().filter(|n| &n.position == position) {
            println!(
                "  {} nominee {} by {} [{}]",
                n.id,
                member_name(root, &n.nominee),
                member_name(root, &n.nominated_by),
                n.status
            );
        }
        for a in c.applications.iter().filter(|a| &a.position == position) {
            println!("  {} applicant {} [{}]", a.id, member_name(root, &a.applicant), a.status);
        }
        for m in c.meetings.iter().filter(|m| &m.position == position) {
            println!("  {} meeting {} [{}]", m.id, m.scheduled_for.format("%Y-%m-%d %H:%M"), m.status);
        }
    }
    Ok(())
}

fn tally(root: &Path, slug: &str, meeting: &str, json: bool) -> anyhow::Result<()> {
    let c = SuccessionCycle::load(root, slug).with_context(|| format!("cycle '{slug}' not found"))?;
    let tally = c.tally(meeting).context("failed to tally votes")?;
    if json {
        return print_json(&tally);
    }
    if tally.is_empty() {
        println!("No votes cast in {meeting}.");
        return Ok(());
    }
    let rows = tally
        .iter()
        .map(|t| vec![member_name(root, &t.candidate), t.votes.to_string()])
        .collect();
    print_table(&["CANDIDATE", "VOTES"], rows);
    Ok(())
}
