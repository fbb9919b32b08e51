use super::load_config;
use crate::output::{or_dash, print_json, print_table};
use anyhow::Context;
use chrono::NaiveDate;
use clap::Subcommand;
use roster_core::import::{self, ImportOptions, RowStatus};
use roster_core::member::{Member, MemberStatus, MemberUpdate, NewMember};
use std::path::{Path, PathBuf};

#[derive(Subcommand)]
pub enum MemberSubcommand {
    /// Add a member
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        chapter: Option<String>,
        /// Skill slugs (repeatable: --skill design --skill teaching)
        #[arg(long = "skill")]
        skills: Vec<String>,
    },
    /// List members
    List {
        #[arg(long)]
        chapter: Option<String>,
        /// Include inactive members
        #[arg(long)]
        all: bool,
    },
    /// Show one member (by id or email)
    Show { member: String },
    /// Update member details
    Update {
        member: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        chapter: Option<String>,
    },
    Deactivate { member: String },
    Reactivate { member: String },
    AddSkill { member: String, skill: String },
    RemoveSkill { member: String, skill: String },
    /// Award a certification; expiry follows its validity period
    AwardCert {
        member: String,
        certification: String,
        /// Date obtained (YYYY-MM-DD), defaults to today
        #[arg(long)]
        on: Option<NaiveDate>,
    },
    /// Bulk upload members from a CSV file
    Import {
        file: PathBuf,
        /// Leave members whose email already exists untouched
        #[arg(long)]
        skip_existing: bool,
        /// Merge rows into members whose email already exists
        #[arg(long, conflicts_with = "skip_existing")]
        update_existing: bool,
        /// Validate and report without writing
        #[arg(long)]
        dry_run: bool,
        /// Write the annotated CSV report here
        #[arg(long)]
        report: Option<PathBuf>,
    },
}

pub fn run(root: &Path, subcmd: MemberSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        MemberSubcommand::Create {
            name,
            email,
            phone,
            chapter,
            skills,
        } => create(
            root,
            NewMember {
                name,
                email,
                phone,
                chapter,
                skills,
            },
            json,
        ),
        MemberSubcommand::List { chapter, all } => list(root, chapter.as_deref(), all, json),
        MemberSubcommand::Show { member } => show(root, &member, json),
        MemberSubcommand::Update {
            member,
            name,
            email,
            phone,
            chapter,
        } => update(
            root,
            &member,
            MemberUpdate {
                name,
                email,
                phone,
                chapter,
            },
            json,
        ),
        MemberSubcommand::Deactivate { member } => set_active(root, &member, false, json),
        MemberSubcommand::Reactivate { member } => set_active(root, &member, true, json),
        MemberSubcommand::AddSkill { member, skill } => add_skill(root, &member, &skill, json),
        MemberSubcommand::RemoveSkill { member, skill } => remove_skill(root, &member, &skill, json),
        MemberSubcommand::AwardCert {
            member,
            certification,
            on,
        } => award_cert(root, &member, &certification, on, json),
        MemberSubcommand::Import {
            file,
            skip_existing,
            update_existing,
            dry_run,
            report,
        } => import_csv(
            root,
            &file,
            ImportOptions {
                skip_existing,
                update_existing,
                dry_run,
            },
            report.as_deref(),
            json,
        ),
    }
}

/// Look a member up by id, or by email when the reference contains `@`.
pub(crate) fn resolve_member(root: &Path, reference: &str) -> anyhow::Result<Member> {
    if reference.contains('@') {
        Member::find_by_email(root, reference)?
            .with_context(|| format!("no member with email '{reference}'"))
    } else {
        Member::load(root, reference).with_context(|| format!("member '{reference}' not found"))
    }
}

fn create(root: &Path, input: NewMember, json: bool) -> anyhow::Result<()> {
    let member = Member::create(root, input).context("failed to create member")?;
    if json {
        print_json(&member)?;
    } else {
        println!("Created member '{}' ({}).", member.name, member.id);
    }
    Ok(())
}

fn list(root: &Path, chapter: Option<&str>, all: bool, json: bool) -> anyhow::Result<()> {
    let members: Vec<Member> = Member::list(root)
        .context("failed to list members")?
        .into_iter()
        .filter(|m| all || m.status == MemberStatus::Active)
        .filter(|m| chapter.is_none() || m.chapter.as_deref() == chapter)
        .collect();

    if json {
        return print_json(&members);
    }
    if members.is_empty() {
        println!("No members.");
        return Ok(());
    }
    let rows = members
        .iter()
        .map(|m| {
            vec![
                m.id.clone(),
                m.name.clone(),
                m.email.clone(),
                or_dash(m.chapter.as_deref()),
                m.status.to_string(),
            ]
        })
        .collect();
    print_table(&["ID", "NAME", "EMAIL", "CHAPTER", "STATUS"], rows);
    Ok(())
}

fn show(root: &Path, reference: &str, json: bool) -> anyhow::Result<()> {
    let m = resolve_member(root, reference)?;
    if json {
        return print_json(&m);
    }
    println!("Member: {} ({})", m.name, m.id);
    println!("Email:   {}", m.email);
    println!("Phone:   {}", or_dash(m.phone.as_deref()));
    println!("Chapter: {}", or_dash(m.chapter.as_deref()));
    println!("Status:  {}", m.status);
    if !m.skills.is_empty() {
        println!("Skills:  {}", m.skills.join(", "));
    }
    let today = chrono::Utc::now().date_naive();
    for c in &m.certifications {
        let expiry = match c.expires_on {
            Some(d) if c.is_expired(today) => format!("expired {d}"),
            Some(d) => format!("until {d}"),
            None => "no expiry".to_string(),
        };
        println!("  cert {} (obtained {}, {expiry})", c.certification, c.obtained_on);
    }
    Ok(())
}

fn update(root: &Path, reference: &str, changes: MemberUpdate, json: bool) -> anyhow::Result<()> {
    let mut m = resolve_member(root, reference)?;
    m.update(root, changes).context("failed to update member")?;
    m.save(root).context("failed to save member")?;
    if json {
        print_json(&m)?;
    } else {
        println!("Updated member '{}'.", m.name);
    }
    Ok(())
}

fn set_active(root: &Path, reference: &str, active: bool, json: bool) -> anyhow::Result<()> {
    let mut m = resolve_member(root, reference)?;
    if active {
        m.reactivate();
    } else {
        m.deactivate();
    }
    m.save(root).context("failed to save member")?;
    if json {
        print_json(&m)?;
    } else {
        println!("Member '{}' is now {}.", m.name, m.status);
    }
    Ok(())
}

fn add_skill(root: &Path, reference: &str, skill: &str, json: bool) -> anyhow::Result<()> {
    let mut m = resolve_member(root, reference)?;
    let added = m.add_skill(root, skill).context("failed to add skill")?;
    if added {
        m.save(root).context("failed to save member")?;
    }
    if json {
        print_json(&serde_json::json!({ "member": m.id, "skill": skill, "added": added }))?;
    } else if added {
        println!("Added skill '{skill}' to '{}'.", m.name);
    } else {
        println!("'{}' already has skill '{skill}'.", m.name);
    }
    Ok(())
}

fn remove_skill(root: &Path, reference: &str, skill: &str, json: bool) -> anyhow::Result<()> {
    let mut m = resolve_member(root, reference)?;
    let removed = m.remove_skill(skill);
    if removed {
        m.save(root).context("failed to save member")?;
    }
    if json {
        print_json(&serde_json::json!({ "member": m.id, "skill": skill, "removed": removed }))?;
    } else if removed {
        println!("Removed skill '{skill}' from '{}'.", m.name);
    } else {
        println!("'{}' does not have skill '{skill}'.", m.name);
    }
    Ok(())
}

fn award_cert(
    root: &Path,
    reference: &str,
    certification: &str,
    on: Option<NaiveDate>,
    json: bool,
) -> anyhow::Result<()> {
    let mut m = resolve_member(root, reference)?;
    let on = on.unwrap_or_else(|| chrono::Utc::now().date_naive());
    let award = m
        .award_certification(root, certification, on)
        .context("failed to award certification")?
        .clone();
    m.save(root).context("failed to save member")?;
    if json {
        print_json(&award)?;
    } else {
        match award.expires_on {
            Some(d) => println!("Awarded '{certification}' to '{}', valid until {d}.", m.name),
            None => println!("Awarded '{certification}' to '{}'.", m.name),
        }
    }
    Ok(())
}

fn import_csv(
    root: &Path,
    file: &Path,
    options: ImportOptions,
    report_path: Option<&Path>,
    json: bool,
) -> anyhow::Result<()> {
    let config = load_config(root)?;
    let text = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    let report = import::import(root, &text, options, &config).context("import failed")?;

    if let Some(path) = report_path {
        let csv = report.to_csv().context("failed to render report")?;
        std::fs::write(path, csv).with_context(|| format!("failed to write {}", path.display()))?;
    }

    if json {
        return print_json(&report);
    }

    let rows = report
        .rows
        .iter()
        .map(|r| {
            vec![
                r.row.to_string(),
                r.email.clone(),
                r.status.as_str().to_string(),
                r.messages.join("; "),
            ]
        })
        .collect();
    print_table(&["ROW", "EMAIL", "STATUS", "MESSAGES"], rows);
    let s = &report.summary;
    println!(
        "\n{}{} rows: {} created, {} updated, {} skipped, {} errors ({} with warnings)",
        if report.dry_run { "[dry run] " } else { "" },
        s.total,
        s.created,
        s.updated,
        s.skipped,
        s.errors,
        s.warnings
    );
    if report.rows.iter().any(|r| r.status == RowStatus::Error) {
        tracing::warn!(errors = s.errors, "some rows were not imported");
    }
    Ok(())
}
