use crate::output::print_json;
use anyhow::Context;
use roster_core::init;
use std::path::Path;

pub fn run(root: &Path, organization: Option<&str>, json: bool) -> anyhow::Result<()> {
    let name = organization.map(str::to_string).unwrap_or_else(|| {
        root.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "roster".to_string())
    });

    let report = init::init(root, &name)
        .with_context(|| format!("failed to initialize {}", root.display()))?;

    if json {
        return print_json(&report);
    }

    println!("Initializing roster in: {}", root.display());
    if report.created_config {
        println!("  created: .roster/config.yaml");
    } else {
        println!("  exists:  .roster/config.yaml");
    }
    for slug in &report.seeded_verticals {
        println!("  seeded:  vertical '{slug}'");
    }
    println!("\nNext: roster member create --name \"...\" --email ...");
    Ok(())
}
