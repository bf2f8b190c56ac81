use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use unified_debug::capability::CapabilityKind;
use unified_debug::config::AppConfig;
use unified_debug::server::{create_router, AppState};
use unified_debug::shutdown::{graceful_shutdown, wait_for_shutdown};

#[derive(Parser)]
#[command(
    name = "unified-debug",
    about = "Locate, fix, review and patch bugs from a free-text report"
)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the HTTP API (default)
    Serve,
    /// Run one debug workflow and print the record as JSON
    Debug {
        /// Bug report text
        report: String,
        /// Repository to search
        #[arg(long)]
        repo: Option<String>,
        /// Apply fixes without waiting for human review
        #[arg(long, conflicts_with = "review")]
        auto_edit: bool,
        /// Require human review even when the config enables auto-edit
        #[arg(long)]
        review: bool,
    },
    /// Index a repository for bug localization
    Index {
        /// Path to the repository checkout
        path: String,
        /// Collection name for the repository
        name: String,
    },
}

/// `--auto-edit` and `--review` override the configured default.
fn resolve_auto_edit(auto_edit: bool, review: bool, configured: bool) -> bool {
    match (auto_edit, review) {
        (true, _) => true,
        (_, true) => false,
        _ => configured,
    }
}

/// Collaborators a command will call, checked before it starts.
fn required_capabilities(command: &Command, auto_edit_mode: bool) -> Vec<CapabilityKind> {
    match command {
        Command::Serve => CapabilityKind::ALL.to_vec(),
        Command::Debug { .. } => {
            let mut kinds = vec![
                CapabilityKind::BugLocator,
                CapabilityKind::FixGenerator,
                CapabilityKind::PatchApplier,
            ];
            if !auto_edit_mode {
                kinds.push(CapabilityKind::HumanReview);
            }
            kinds
        }
        Command::Index { .. } => vec![CapabilityKind::RepoIndexer],
    }
}

fn init_tracing(json_logs: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    // Logs go to stderr so one-shot commands keep stdout clean for JSON.
    if json_logs {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    let config = AppConfig::load(cli.config.as_deref())?;
    let command = cli.command.unwrap_or(Command::Serve);

    let auto_edit_mode = match &command {
        Command::Debug {
            auto_edit, review, ..
        } => resolve_auto_edit(*auto_edit, *review, config.solver.auto_edit_mode),
        _ => config.solver.auto_edit_mode,
    };
    config
        .capabilities
        .require(&required_capabilities(&command, auto_edit_mode))?;

    let state = Arc::new(AppState::new(config.clone()));

    match command {
        Command::Serve => serve(state, &config).await?,
        Command::Debug { report, repo, .. } => {
            let output = state
                .solver
                .debug_repository_issue(&report, repo.as_deref(), auto_edit_mode)
                .await;
            println!("{output}");
        }
        Command::Index { path, name } => {
            let output = state.solver.index_repository(&path, &name).await;
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}

async fn serve(state: Arc<AppState>, config: &AppConfig) -> anyhow::Result<()> {
    tracing::info!(
        host = %config.server.host,
        port = %config.server.port,
        "Starting unified debug server"
    );

    let app = create_router(Arc::clone(&state));

    let listener = tokio::net::TcpListener::bind(format!(
        "{}:{}",
        config.server.host, config.server.port
    ))
    .await?;

    tracing::info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(wait_for_shutdown())
        .await?;

    graceful_shutdown(&state).await;

    Ok(())
}
