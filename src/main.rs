mod cli;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use cli::export::ExportFormat;
use cli::show::ShowFormat;
use cogcommit::commit::search::DEFAULT_SEARCH_LIMIT;
use cogcommit::config::CogCommitConfig;
use cogcommit::parser::ImportSource;

#[derive(Parser)]
#[command(
    name = "cogcommit",
    version,
    about = "Cognitive commits: browse, search, and export AI coding conversations"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Import Claude Code session logs or a JSON export
    Import {
        /// File or directory (defaults to ~/.claude/projects)
        path: Option<PathBuf>,
        /// Parser to use: claude_code or json
        #[arg(long)]
        source: Option<ImportSource>,
    },
    /// List commits, newest first
    List {
        #[arg(short, long)]
        project: Option<String>,
        #[arg(long, default_value_t = 20)]
        limit: usize,
        /// Include hidden, empty, and warmup commits
        #[arg(long)]
        all: bool,
    },
    /// Show one commit's conversation
    Show {
        /// Commit id or unambiguous prefix
        id: String,
        #[arg(short, long, value_enum, default_value_t = ShowFormat::Text)]
        format: ShowFormat,
    },
    /// Search turn content
    Search {
        query: String,
        #[arg(short, long)]
        project: Option<String>,
        #[arg(long, default_value_t = DEFAULT_SEARCH_LIMIT)]
        limit: usize,
    },
    /// Show commit statistics
    Stats {
        #[arg(short, long)]
        project: Option<String>,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Export commits as JSON or Markdown
    Export {
        #[arg(short, long, value_enum, default_value_t = ExportFormat::Json)]
        format: ExportFormat,
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(short, long)]
        project: Option<String>,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Delete old commits
    Prune {
        /// Cutoff: relative (30d, 2w, 3m) or a date (2024-01-01)
        #[arg(long)]
        before: String,
        #[arg(short, long)]
        project: Option<String>,
        /// Show what would be deleted without deleting
        #[arg(short = 'n', long)]
        dry_run: bool,
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Run the local studio API
    Studio {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
    },
    /// Sync with the hosted dashboard
    Sync {
        #[command(subcommand)]
        action: SyncAction,
    },
    /// Check database health
    Doctor,
}

#[derive(Subcommand)]
enum SyncAction {
    /// Upload local commits that changed since the last push
    Push {
        #[arg(short, long)]
        project: Option<String>,
    },
    /// Download commits from the hosted dashboard
    Pull {
        #[arg(short, long)]
        project: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = CogCommitConfig::load()?;

    // Log to stderr so stdout stays clean for export and --json output.
    let filter = EnvFilter::try_new(&config.general.log_level)
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Import { path, source } => {
            cli::import::import(&config, path.as_deref(), source)?;
        }
        Command::List { project, limit, all } => {
            cli::list::list(&config, project.as_deref(), limit, all)?;
        }
        Command::Show { id, format } => {
            cli::show::show(&config, &id, format)?;
        }
        Command::Search {
            query,
            project,
            limit,
        } => {
            cli::search::search(&config, &query, project.as_deref(), limit)?;
        }
        Command::Stats { project, json } => {
            cli::stats::stats(&config, project.as_deref(), json)?;
        }
        Command::Export {
            format,
            output,
            project,
            limit,
        } => {
            cli::export::export(
                &config,
                format,
                output.as_deref(),
                project.as_deref(),
                limit,
            )?;
        }
        Command::Prune {
            before,
            project,
            dry_run,
            yes,
        } => {
            cli::prune::prune(&config, &before, project.as_deref(), dry_run, yes)?;
        }
        Command::Studio { host, port } => {
            let host = host.unwrap_or_else(|| config.studio.host.clone());
            let port = port.unwrap_or(config.studio.port);
            cogcommit::studio::serve(&config, &host, port).await?;
        }
        Command::Sync { action } => match action {
            SyncAction::Push { project } => {
                cli::sync::push(&config, project.as_deref()).await?;
            }
            SyncAction::Pull { project } => {
                cli::sync::pull(&config, project.as_deref()).await?;
            }
        },
        Command::Doctor => {
            cli::doctor::doctor(&config)?;
        }
    }

    Ok(())
}
