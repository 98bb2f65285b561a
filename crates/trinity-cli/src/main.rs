use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use trinity_core::agent::AgentId;

mod backend;
mod commands;

#[derive(Parser)]
#[command(name = "trinity")]
#[command(about = "Trinity - life, money and tech coaching agents", long_about = None)]
struct Cli {
    /// Where accounts and documents live
    #[arg(long, value_enum, default_value_t = BackendKind::Memory, global = true)]
    backend: BackendKind,

    /// Configuration directory (defaults to ~/.config/trinity)
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    #[command(flatten)]
    credentials: Credentials,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BackendKind {
    /// Process-local store, discarded on exit
    Memory,
    /// Hosted identity service and document database
    Firebase,
}

#[derive(clap::Args, Clone)]
pub struct Credentials {
    /// Account email
    #[arg(long, global = true)]
    email: Option<String>,

    /// Account password
    #[arg(long, global = true)]
    password: Option<String>,

    /// Display name; creates the account instead of signing in
    #[arg(long, global = true)]
    name: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// List the three agents
    Agents,
    /// List the 30 pillars
    Pillars {
        /// Only one category (life, money, tech)
        #[arg(long)]
        category: Option<String>,
    },
    /// Chat with an agent interactively
    Chat {
        /// PILLAR, COME-UP or CODEX
        #[arg(long, default_value = "PILLAR")]
        agent: String,
        /// Continue an existing thread instead of starting a new one
        #[arg(long)]
        thread: Option<String>,
    },
    /// Write or read journal entries
    Journal {
        #[command(subcommand)]
        action: JournalAction,
    },
    /// Track completed pillars
    Progress {
        #[command(subcommand)]
        action: ProgressAction,
    },
}

#[derive(Subcommand)]
enum JournalAction {
    /// Store a new entry
    Add { text: String },
    /// Show the latest entries
    List,
}

#[derive(Subcommand)]
enum ProgressAction {
    /// Mark a pillar done, or undo it
    Toggle { pillar_id: String },
    /// Show completion per category
    Show,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = backend::load_config(cli.config_dir.as_deref())?;
    trinity_infrastructure::logging::init(&config.app.logging.level);

    match cli.command {
        Commands::Agents => commands::catalog::agents(),
        Commands::Pillars { category } => commands::catalog::pillars(category.as_deref())?,
        Commands::Chat { agent, thread } => {
            let agent_id: AgentId = agent.parse()?;
            let context = backend::connect(cli.backend, &cli.credentials, config).await?;
            commands::chat::run(context, agent_id, thread.as_deref()).await?
        }
        Commands::Journal { action } => {
            let context = backend::connect(cli.backend, &cli.credentials, config).await?;
            match action {
                JournalAction::Add { text } => commands::journal::add(context, &text).await?,
                JournalAction::List => commands::journal::list(context).await?,
            }
        }
        Commands::Progress { action } => {
            let context = backend::connect(cli.backend, &cli.credentials, config).await?;
            match action {
                ProgressAction::Toggle { pillar_id } => {
                    commands::progress::toggle(context, &pillar_id).await?
                }
                ProgressAction::Show => commands::progress::show(context).await?,
            }
        }
    }

    Ok(())
}
