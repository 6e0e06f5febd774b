use teloxide::prelude::*;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::transport::InboundMessage;

/// Runs the Telegram long-poll dispatcher until ctrl-c, converting each text
/// message into an [`InboundMessage`] and forwarding it to the dispatch
/// loop's channel. Non-text updates are ignored.
pub async fn run_bot(bot: Bot, inbound_tx: mpsc::Sender<InboundMessage>) -> anyhow::Result<()> {
    info!("Listening for Telegram updates...");

    let handler = Update::filter_message().endpoint(forward_message);

    Dispatcher::builder(bot, handler)
        .default_handler(|_| async {})
        .dependencies(dptree::deps![inbound_tx])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}

async fn forward_message(
    msg: teloxide::types::Message,
    inbound_tx: mpsc::Sender<InboundMessage>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let Some(text) = msg.text() else {
        return Ok(());
    };
    let Some(from) = msg.from.as_ref() else {
        return Ok(());
    };
    let user_name = from
        .username
        .clone()
        .unwrap_or_else(|| from.first_name.clone());

    let inbound = InboundMessage {
        chat_id: msg.chat.id.0,
        user_id: from.id.0 as i64,
        user_name,
        text: text.to_string(),
    };
    if inbound_tx.send(inbound).await.is_err() {
        warn!(
            "Dispatch loop is gone; dropping update from chat {}",
            msg.chat.id.0
        );
    }
    Ok(())
}
