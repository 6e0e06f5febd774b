use clap::{CommandFactory, Parser, Subcommand};
use tracing::info;

use chatbridge::config::{masked, Config};
use chatbridge::db::Database;
use chatbridge::{logging, runtime};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Parser)]
#[command(
    name = "chatbridge",
    version = VERSION,
    about = "Telegram front-end for OpenAI-compatible chat completions"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<MainCommand>,
}

#[derive(Debug, Subcommand)]
enum MainCommand {
    /// Start the bot
    Start,
    /// Show version
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Some(MainCommand::Start) => {}
        Some(MainCommand::Version) => {
            println!("chatbridge {VERSION}");
            return Ok(());
        }
        None => {
            let mut cmd = Cli::command();
            cmd.print_help()?;
            println!();
            return Ok(());
        }
    }

    logging::init_console_logging();

    let config = Config::load()?;
    info!(
        "Starting chatbridge (model {}, bot token {}, api key {})",
        config.model,
        masked(&config.telegram_bot_token),
        masked(&config.api_key)
    );

    let db = Database::new(&config.data_dir)?;
    info!("Database initialized");

    runtime::run(config, db).await
}
