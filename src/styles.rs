use std::sync::Arc;

use chatbridge_storage::db::{call_blocking, PreferenceStore};
use tracing::warn;

/// Persisted per-user answer persona. Selects the system prompt sent with
/// every freeform completion.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ResponseStyle {
    #[default]
    Friendly,
    Official,
    Meme,
}

impl ResponseStyle {
    pub const ALL: [ResponseStyle; 3] = [
        ResponseStyle::Friendly,
        ResponseStyle::Official,
        ResponseStyle::Meme,
    ];

    pub fn from_key(key: &str) -> Option<Self> {
        match key.trim().to_lowercase().as_str() {
            "friendly" => Some(ResponseStyle::Friendly),
            "official" => Some(ResponseStyle::Official),
            "meme" => Some(ResponseStyle::Meme),
            _ => None,
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            ResponseStyle::Friendly => "friendly",
            ResponseStyle::Official => "official",
            ResponseStyle::Meme => "meme",
        }
    }

    pub fn system_prompt(self) -> &'static str {
        match self {
            ResponseStyle::Friendly => {
                "You are a friendly, upbeat assistant. Respond in the same language as the \
                 user's message. Be warm and conversational, and keep answers concise but \
                 informative."
            }
            ResponseStyle::Official => {
                "You are a formal assistant. Respond in the same language as the user's \
                 message. Keep a strictly professional tone with precise wording; no slang, \
                 no emoji."
            }
            ResponseStyle::Meme => {
                "You are a witty assistant fluent in internet meme culture. Respond in the \
                 same language as the user's message. Joke around, but still answer the \
                 question accurately."
            }
        }
    }
}

/// Looks up the user's stored style. Unset, unrecognized, or unreadable
/// values all resolve to the friendly default so a broken preference row
/// never blocks an answer.
pub async fn resolve_style(prefs: Arc<dyn PreferenceStore>, user_id: i64) -> ResponseStyle {
    match call_blocking(prefs, move |store| store.get_style(user_id)).await {
        Ok(Some(stored)) => ResponseStyle::from_key(&stored).unwrap_or_default(),
        Ok(None) => ResponseStyle::default(),
        Err(e) => {
            warn!("Failed to read style for user {user_id}: {e}");
            ResponseStyle::default()
        }
    }
}
