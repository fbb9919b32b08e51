use super::load_config;
use super::member::resolve_member;
use crate::output::{print_json, print_table};
use anyhow::Context;
use clap::{Args, Subcommand};
use roster_core::messaging::{self, Audience, WhatsAppClient};
use std::path::Path;

#[derive(Subcommand)]
pub enum MessageSubcommand {
    /// Send a text to one member
    Send {
        member: String,
        #[arg(long)]
        text: String,
    },
    /// Send a text to a vertical, a chapter or everyone
    Broadcast {
        #[command(flatten)]
        target: Target,
        #[arg(long)]
        text: String,
        /// List recipients and numbers without sending
        #[arg(long)]
        dry_run: bool,
    },
}

#[derive(Args)]
#[group(required = true, multiple = false)]
pub struct Target {
    #[arg(long)]
    vertical: Option<String>,
    #[arg(long)]
    chapter: Option<String>,
    #[arg(long)]
    all: bool,
}

impl Target {
    fn audience(self) -> Audience {
        match (self.vertical, self.chapter, self.all) {
            (Some(v), _, _) => Audience::Vertical(v),
            (None, Some(c), _) => Audience::Chapter(c),
            (None, None, _) => Audience::All,
        }
    }
}

pub fn run(root: &Path, subcmd: MessageSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        MessageSubcommand::Send { member, text } => {
            let m = resolve_member(root, &member)?;
            deliver(root, Audience::Member(m.id), &text, false, json)
        }
        MessageSubcommand::Broadcast {
            target,
            text,
            dry_run,
        } => deliver(root, target.audience(), &text, dry_run, json),
    }
}

fn deliver(root: &Path, audience: Audience, text: &str, dry_run: bool, json: bool) -> anyhow::Result<()> {
    let config = load_config(root)?;
    let recipients =
        messaging::recipients(root, &audience).context("failed to resolve recipients")?;
    let country_code = config.country_code();

    if dry_run {
        let preview: Vec<serde_json::Value> = recipients
            .iter()
            .map(|m| {
                let phone = m
                    .phone
                    .as_deref()
                    .and_then(|p| messaging::normalize_phone(p, &country_code).ok());
                serde_json::json!({ "member_id": m.id, "name": m.name, "phone": phone })
            })
            .collect();
        if json {
            return print_json(&preview);
        }
        let rows = preview
            .iter()
            .map(|p| {
                vec![
                    p["name"].as_str().unwrap_or_default().to_string(),
                    p["phone"].as_str().unwrap_or("(skipped)").to_string(),
                ]
            })
            .collect();
        print_table(&["MEMBER", "PHONE"], rows);
        println!("\n[dry run] {} recipient(s); nothing sent.", preview.len());
        return Ok(());
    }

    let messaging_config = config
        .messaging
        .as_ref()
        .context("messaging is not configured; run 'roster config set-messaging'")?;
    let client = WhatsAppClient::from_config(messaging_config)?;
    let report = messaging::broadcast(&client, &recipients, text, &country_code);

    if json {
        return print_json(&report);
    }
    let rows = report
        .deliveries
        .iter()
        .map(|d| {
            vec![
                d.name.clone(),
                d.phone.clone().unwrap_or_else(|| "-".to_string()),
                d.status.as_str().to_string(),
                d.error.clone().unwrap_or_default(),
            ]
        })
        .collect();
    print_table(&["MEMBER", "PHONE", "STATUS", "ERROR"], rows);
    println!(
        "\n{} sent, {} failed, {} skipped.",
        report.sent, report.failed, report.skipped
    );
    Ok(())
}
