//! ChitChat - terminal direct-messaging client
//!
//! Main entry point for the ChitChat client application.

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use chitchat::cli::{Cli, Commands};
use chitchat::commands::{self, App};
use chitchat::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    init_tracing(cli.verbose);

    let config = Config::load(&cli.config, cli.server.as_deref())?;
    config.validate()?;

    let app = App::new(&config)?;

    match cli.command {
        Commands::Login { username, password } => {
            commands::handle_login(&app, &username, password).await?;
        }
        Commands::Register { username, password } => {
            commands::handle_register(&app, &username, password).await?;
        }
        Commands::Logout => {
            commands::handle_logout(&app);
        }
        Commands::Whoami => {
            commands::handle_whoami(&app);
        }
        Commands::Chats => {
            commands::handle_chats(&app).await?;
        }
        Commands::Chat { id, with } => {
            commands::handle_chat(&app, id, with).await?;
        }
    }

    Ok(())
}

/// Initialize the tracing subscriber.
///
/// Respects `RUST_LOG`; `--verbose` lowers the default to debug for this
/// crate. Logs go to stderr so they never interleave with chat output.
fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "chitchat=debug" } else { "chitchat=warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
