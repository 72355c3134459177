use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use isolator_app_core::SessionConfig;
use isolator_cli::{commands, connect, prompt::PromptResponder};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Manage isolated browser profiles")]
struct Cli {
    /// Backend origin serving /api/profiles
    #[arg(long, env = "ISOLATOR_URL", default_value = isolator_config::DEFAULT_BASE_URL, global = true)]
    url: String,
    /// Poll period for `watch` (clamped to the allowed range)
    #[arg(long, default_value_t = isolator_config::DEFAULT_POLL_INTERVAL_MS, global = true)]
    poll_ms: u64,
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show every profile with its status
    List,
    Status {
        name: String,
    },
    Create {
        name: String,
        /// Directory to create the profile in (backend default otherwise)
        #[arg(short, long)]
        location: Option<String>,
    },
    Start {
        name: String,
    },
    Stop {
        name: String,
    },
    Delete {
        name: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Download a profile archive
    Export {
        name: String,
        #[arg(short, long, default_value = ".")]
        output: Utf8PathBuf,
    },
    /// Upload a profile archive
    Import {
        file: Utf8PathBuf,
    },
    /// Keep polling and reprint the dashboard on every change
    Watch,
}

fn init_logging(verbose: bool) -> anyhow::Result<()> {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install log subscriber: {e}"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    let export_dir = match &cli.command {
        Commands::Export { output, .. } => output.clone(),
        _ => Utf8PathBuf::from("."),
    };
    let config = SessionConfig::default().with_poll_interval_ms(cli.poll_ms);
    let session = connect(&cli.url, config, export_dir)?;

    match cli.command {
        Commands::List => commands::cmd_list(&session).await?,
        Commands::Status { name } => {
            commands::cmd_status(&session, &name).await?;
        }
        Commands::Create { name, location } => {
            commands::cmd_create(&session, &name, location.as_deref()).await?
        }
        Commands::Start { name } => commands::cmd_start(&session, &name).await?,
        Commands::Stop { name } => commands::cmd_stop(&session, &name).await?,
        Commands::Delete { name, yes } => {
            let _responder = if yes {
                PromptResponder::assume_yes(session.confirmation())
            } else {
                PromptResponder::interactive(session.confirmation())
            };
            commands::cmd_delete(&session, &name).await?;
        }
        Commands::Export { name, .. } => {
            commands::cmd_export(&session, &name).await?;
        }
        Commands::Import { file } => {
            commands::cmd_import(&session, &file).await?;
        }
        Commands::Watch => {
            commands::cmd_watch(&session, async {
                let _ = tokio::signal::ctrl_c().await;
            })
            .await?
        }
    }

    Ok(())
}
