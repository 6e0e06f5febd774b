use std::sync::Arc;

use teloxide::Bot;
use tokio::sync::mpsc;
use tracing::{info, warn};

use chatbridge_storage::db::{Database, PreferenceStore};

use crate::config::Config;
use crate::llm::{ChatCompletionClient, CompletionProvider};
use crate::tasks::UserStateStore;
use crate::transport::{MessageTransport, TelegramTransport};

/// Capacity of the channel between the Telegram dispatcher and the dispatch
/// loop; backpressure kicks in only under a sustained update burst.
const INBOX_CAPACITY: usize = 64;

/// Everything the dispatch loop and command handlers share.
pub struct AppState {
    pub config: Config,
    pub transport: Arc<dyn MessageTransport>,
    pub provider: Arc<dyn CompletionProvider>,
    pub prefs: Arc<dyn PreferenceStore>,
    pub users: UserStateStore,
}

/// Wires the transport, gateway, and stores together, spawns the dispatch
/// loop, and runs the Telegram dispatcher until ctrl-c.
pub async fn run(config: Config, db: Database) -> anyhow::Result<()> {
    let bot = Bot::new(&config.telegram_bot_token);
    let transport: Arc<dyn MessageTransport> = Arc::new(TelegramTransport::new(bot.clone()));
    let provider: Arc<dyn CompletionProvider> = Arc::new(ChatCompletionClient::new(&config)?);
    let prefs: Arc<dyn PreferenceStore> = Arc::new(db);

    preflight(provider.as_ref()).await;

    let state = Arc::new(AppState {
        config,
        transport,
        provider,
        prefs,
        users: UserStateStore::new(),
    });

    let (inbound_tx, inbound_rx) = mpsc::channel(INBOX_CAPACITY);
    tokio::spawn(crate::dispatch::run_dispatch_loop(state, inbound_rx));

    crate::telegram::run_bot(bot, inbound_tx).await
}

/// One small completion call at startup to confirm the provider is
/// reachable. A failure is logged and the bot starts anyway.
async fn preflight(provider: &dyn CompletionProvider) {
    match provider
        .complete("You are a helpful assistant.", "Hi! Reply with one word.")
        .await
    {
        Ok(answer) => info!("Provider preflight succeeded: {answer}"),
        Err(e) => warn!("Provider preflight failed: {e}; starting anyway"),
    }
}
