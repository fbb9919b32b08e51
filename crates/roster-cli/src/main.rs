mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::{
    assess::AssessSubcommand, cert::CertSubcommand, config::ConfigSubcommand,
    member::MemberSubcommand, message::MessageSubcommand, skill::SkillSubcommand,
    succession::SuccessionSubcommand, trainer::TrainerSubcommand, vertical::VerticalSubcommand,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "roster",
    about = "Membership administration with skill-will assessments",
    version,
    propagate_version = true
)]
struct Cli {
    #[arg(long, global = true, env = "ROSTER_ROOT")]
    root: Option<PathBuf>,

    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create .roster/ with a default config and vertical catalog
    Init {
        /// Organization name (defaults to the directory name)
        #[arg(long)]
        organization: Option<String>,
    },

    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },

    Member {
        #[command(subcommand)]
        subcommand: MemberSubcommand,
    },

    Skill {
        #[command(subcommand)]
        subcommand: SkillSubcommand,
    },

    Cert {
        #[command(subcommand)]
        subcommand: CertSubcommand,
    },

    Trainer {
        #[command(subcommand)]
        subcommand: TrainerSubcommand,
    },

    Vertical {
        #[command(subcommand)]
        subcommand: VerticalSubcommand,
    },

    /// Skill-will assessments
    Assess {
        #[command(subcommand)]
        subcommand: AssessSubcommand,
    },

    Succession {
        #[command(subcommand)]
        subcommand: SuccessionSubcommand,
    },

    /// WhatsApp messages to members
    Message {
        #[command(subcommand)]
        subcommand: MessageSubcommand,
    },

    /// Run the HTTP API
    Serve {
        #[arg(long, default_value = "3141")]
        port: u16,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Serve { .. } => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = match cli.command {
        Commands::Init { organization } => cmd::init::run(&root, organization.as_deref(), cli.json),
        Commands::Config { subcommand } => cmd::config::run(&root, subcommand, cli.json),
        Commands::Member { subcommand } => cmd::member::run(&root, subcommand, cli.json),
        Commands::Skill { subcommand } => cmd::skill::run(&root, subcommand, cli.json),
        Commands::Cert { subcommand } => cmd::cert::run(&root, subcommand, cli.json),
        Commands::Trainer { subcommand } => cmd::trainer::run(&root, subcommand, cli.json),
        Commands::Vertical { subcommand } => cmd::vertical::run(&root, subcommand, cli.json),
        Commands::Assess { subcommand } => cmd::assess::run(&root, subcommand, cli.json),
        Commands::Succession { subcommand } => cmd::succession::run(&root, subcommand, cli.json),
        Commands::Message { subcommand } => cmd::message::run(&root, subcommand, cli.json),
        Commands::Serve { port } => cmd::serve::run(&root, port),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
