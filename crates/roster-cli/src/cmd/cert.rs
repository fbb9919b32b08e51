use crate::output::{or_dash, print_json, print_table};
use anyhow::Context;
use clap::Subcommand;
use roster_core::certification::Certification;
use std::path::Path;

#[derive(Subcommand)]
pub enum CertSubcommand {
    /// Add a certification to the catalog
    Create {
        slug: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        issuer: Option<String>,
        /// Months an award stays valid; omit for no expiry
        #[arg(long)]
        validity_months: Option<u32>,
    },
    List,
    Deactivate { slug: String },
}

pub fn run(root: &Path, subcmd: CertSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        CertSubcommand::Create {
            slug,
            name,
            issuer,
            validity_months,
        } => {
            let mut cert = Certification::create(root, &slug, name)
                .with_context(|| format!("failed to create certification '{slug}'"))?;
            if issuer.is_some() || validity_months.is_some() {
                cert.issuer = issuer;
                cert.validity_months = validity_months;
                cert.save(root).context("failed to save certification")?;
            }
            if json {
                print_json(&cert)?;
            } else {
                println!("Created certification '{slug}'.");
            }
            Ok(())
        }
        CertSubcommand::List => {
            let certs = Certification::list(root).context("failed to list certifications")?;
            if json {
                return print_json(&certs);
            }
            if certs.is_empty() {
                println!("No certifications.");
                return Ok(());
            }
            let rows = certs
                .iter()
                .map(|c| {
                    vec![
                        c.slug.clone(),
                        c.name.clone(),
                        or_dash(c.issuer.as_deref()),
                        c.validity_months
                            .map(|m| format!("{m} months"))
                            .unwrap_or_else(|| "-".to_string()),
                        if c.active { "active" } else { "inactive" }.to_string(),
                    ]
                })
                .collect();
            print_table(&["SLUG", "NAME", "ISSUER", "VALIDITY", "STATUS"], rows);
            Ok(())
        }
        CertSubcommand::Deactivate { slug } => {
            let mut cert = Certification::load(root, &slug)
                .with_context(|| format!("certification '{slug}' not found"))?;
            cert.deactivate();
            cert.save(root).context("failed to save certification")?;
            if json {
                print_json(&cert)?;
            } else {
                println!("Deactivated certification '{slug}'.");
            }
            Ok(())
        }
    }
}
