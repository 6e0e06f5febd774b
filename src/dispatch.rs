use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::commands;
use crate::error::ChatBridgeError;
use crate::runtime::AppState;
use crate::styles;
use crate::text::{split_message, MAX_MESSAGE_LEN};
use crate::transport::{InboundMessage, MessageTransport};

/// Pause between consecutive chunks of one multi-chunk answer.
pub const CHUNK_DELAY: Duration = Duration::from_millis(100);
/// Transient placeholder shown while the completion call is in flight.
pub const PLACEHOLDER_TEXT: &str = "🤔 Working on your request...";
/// Last-resort plain notice when the answer itself could not be delivered.
pub const DELIVERY_FAILED_TEXT: &str = "❌ Failed to deliver the answer.";

/// Which send mode ultimately carried a chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryMode {
    Formatted,
    Plain,
}

/// Consumes inbound messages until the channel closes. Commands are handled
/// inline, so they never interleave with each other; each freeform message
/// runs its completion pipeline on its own spawned task.
pub async fn run_dispatch_loop(state: Arc<AppState>, mut inbox: mpsc::Receiver<InboundMessage>) {
    while let Some(msg) = inbox.recv().await {
        debug!(
            "Inbound from {} (user {}, chat {}): {}",
            msg.user_name, msg.user_id, msg.chat_id, msg.text
        );
        if commands::is_command(&msg.text) {
            handle_command(&state, &msg).await;
        } else {
            let state = state.clone();
            tokio::spawn(async move {
                handle_freeform(state, msg).await;
            });
        }
    }
    info!("Inbound channel closed; dispatch loop exiting");
}

async fn handle_command(state: &AppState, msg: &InboundMessage) {
    let Some(command) = commands::parse(&msg.text) else {
        return;
    };
    let reply = match commands::execute(state, msg, command).await {
        Ok(text) => text,
        Err(err) => command_failure_text(&err),
    };
    if let Err(e) = deliver(state.transport.as_ref(), msg.chat_id, &reply).await {
        error!("Failed to deliver command reply to chat {}: {e}", msg.chat_id);
    }
}

/// The freeform pipeline: counter, typing, placeholder, completion,
/// placeholder cleanup, chunked delivery. Typing, placeholder send/delete,
/// and the final failure notice are all best-effort.
async fn handle_freeform(state: Arc<AppState>, msg: InboundMessage) {
    let chat_id = msg.chat_id;
    let count = state.users.record_message(msg.user_id);
    debug!("User {} message count: {count}", msg.user_id);

    if let Err(e) = state.transport.send_typing(chat_id).await {
        warn!("Failed to send typing action to chat {chat_id}: {e}");
    }

    let placeholder_id = match state
        .transport
        .send_message(chat_id, PLACEHOLDER_TEXT, false)
        .await
    {
        Ok(id) => Some(id),
        Err(e) => {
            warn!("Failed to send placeholder to chat {chat_id}: {e}");
            None
        }
    };

    let style = styles::resolve_style(state.prefs.clone(), msg.user_id).await;
    let started = std::time::Instant::now();
    let reply = match state
        .provider
        .complete(style.system_prompt(), &msg.text)
        .await
    {
        Ok(answer) => {
            info!(
                "Completion for chat {chat_id} succeeded in {}ms ({} bytes)",
                started.elapsed().as_millis(),
                answer.len()
            );
            answer
        }
        Err(err) => {
            error!(
                "Completion for chat {chat_id} failed after {}ms: {err}",
                started.elapsed().as_millis()
            );
            completion_failure_text(&err)
        }
    };

    if let Some(message_id) = placeholder_id {
        if let Err(e) = state.transport.delete_message(chat_id, message_id).await {
            warn!("Failed to delete placeholder {message_id} in chat {chat_id}: {e}");
        }
    }

    if let Err(e) = deliver(state.transport.as_ref(), chat_id, &reply).await {
        error!("Failed to deliver answer to chat {chat_id}: {e}");
        if let Err(e) = state
            .transport
            .send_message(chat_id, DELIVERY_FAILED_TEXT, false)
            .await
        {
            error!("Failed to send delivery-failure notice to chat {chat_id}: {e}");
        }
    }
}

/// Splits `text` at the platform ceiling and sends the chunks strictly in
/// order: chunk i+1 goes out only after chunk i's send returned, with
/// `CHUNK_DELAY` between consecutive chunks.
pub async fn deliver(
    transport: &dyn MessageTransport,
    chat_id: i64,
    text: &str,
) -> Result<(), ChatBridgeError> {
    let chunks = split_message(text, MAX_MESSAGE_LEN);
    let total = chunks.len();
    if total > 1 {
        debug!("Splitting answer for chat {chat_id} into {total} chunks");
    }
    for (index, chunk) in chunks.iter().enumerate() {
        if index > 0 {
            tokio::time::sleep(CHUNK_DELAY).await;
        }
        let mode = send_with_fallback(transport, chat_id, chunk).await?;
        debug!("Chunk {}/{total} sent to chat {chat_id} ({mode:?})", index + 1);
    }
    Ok(())
}

/// Tries a formatted send, falling back exactly once to plain text. The
/// fallback covers provider answers whose markup the platform refuses to
/// parse; it is not a reliability retry.
pub async fn send_with_fallback(
    transport: &dyn MessageTransport,
    chat_id: i64,
    text: &str,
) -> Result<DeliveryMode, ChatBridgeError> {
    match transport.send_message(chat_id, text, true).await {
        Ok(_) => Ok(DeliveryMode::Formatted),
        Err(e) => {
            warn!("Formatted send to chat {chat_id} failed, retrying plain: {e}");
            transport.send_message(chat_id, text, false).await?;
            Ok(DeliveryMode::Plain)
        }
    }
}

/// User-facing rendering of a failed completion. Provider rejections carry
/// the provider's own words; network-level failures get a generic
/// retry-later text.
pub fn completion_failure_text(err: &ChatBridgeError) -> String {
    match err {
        ChatBridgeError::ProviderUnavailable(_) => {
            "❌ The AI service is unreachable right now.\n\nPlease try again later.".to_string()
        }
        other => format!("❌ The AI service returned an error:\n\n`{other}`\n\nPlease try again later."),
    }
}

/// Inline rendering of a command-argument problem.
pub fn command_failure_text(err: &ChatBridgeError) -> String {
    format!("⚠️ {err}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_failure_embeds_rejection_body() {
        let err = ChatBridgeError::ProviderRejected {
            status: 402,
            body: "Insufficient Balance".into(),
        };
        let text = completion_failure_text(&err);
        assert!(text.starts_with("❌"));
        assert!(text.contains("Insufficient Balance"));
        assert!(text.contains("status 402"));
    }

    #[test]
    fn test_command_failure_text_is_inline_warning() {
        let err = ChatBridgeError::NotFound("no task with id 3".into());
        assert_eq!(command_failure_text(&err), "⚠️ Not found: no task with id 3");
    }
}
