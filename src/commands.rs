use chatbridge_storage::db::call_blocking;

use crate::error::ChatBridgeError;
use crate::runtime::AppState;
use crate::styles::ResponseStyle;
use crate::transport::InboundMessage;

pub const UNKNOWN_COMMAND_TEXT: &str =
    "❓ Unknown command. Use /help for the list of commands.";

const HELP_TEXT: &str = "🤖 *AI Assistant*\n\n\
*What I can do:*\n\
• 💻 Programming and code review\n\
• 🧮 Math and calculations\n\
• 🌐 Translations\n\
• 📝 Writing and editing text\n\
• 🤔 Answering general questions\n\n\
*Commands:*\n\
/start - start the bot\n\
/help - show this help\n\
/style - show or change the answer style\n\
/stats - your usage statistics\n\
/add <text> - add a task\n\
/remove <id> - remove a task\n\
/toggle <id> - mark a task done or not done\n\
/list - show your task list\n\n\
Just type your question!";

/// One recognized slash command with its argument tail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    Style(Option<String>),
    Stats,
    Add(String),
    Remove(String),
    Toggle(String),
    List,
    Unknown(String),
}

pub fn is_command(text: &str) -> bool {
    text.trim_start().starts_with('/')
}

/// Parses a command message: the first token names the command (an
/// `@botname` suffix is stripped), the rest is the argument tail, kept
/// verbatim apart from outer trimming. Returns `None` for freeform text.
pub fn parse(text: &str) -> Option<Command> {
    let trimmed = text.trim();
    if !trimmed.starts_with('/') {
        return None;
    }

    let (token, tail) = match trimmed.split_once(char::is_whitespace) {
        Some((token, tail)) => (token, tail.trim()),
        None => (trimmed, ""),
    };
    let name = token
        .split_once('@')
        .map(|(name, _)| name)
        .unwrap_or(token)
        .to_lowercase();

    let command = match name.as_str() {
        "/start" => Command::Start,
        "/help" => Command::Help,
        "/style" => Command::Style(if tail.is_empty() {
            None
        } else {
            Some(tail.to_string())
        }),
        "/stats" => Command::Stats,
        "/add" => Command::Add(tail.to_string()),
        "/remove" => Command::Remove(tail.to_string()),
        "/toggle" => Command::Toggle(tail.to_string()),
        "/list" => Command::List,
        _ => Command::Unknown(name),
    };
    Some(command)
}

fn parse_task_id(raw: &str) -> Result<u32, ChatBridgeError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ChatBridgeError::MalformedInput(
            "a task id is required, e.g. /remove 2".into(),
        ));
    }
    raw.parse::<u32>().map_err(|_| {
        ChatBridgeError::MalformedInput(format!("task id must be a number, got \"{raw}\""))
    })
}

/// Runs one command against the stores and returns the reply text.
/// Malformed arguments and missing task ids come back as taxonomy errors;
/// an unknown command is a successful fixed reply, not an error.
pub async fn execute(
    state: &AppState,
    msg: &InboundMessage,
    command: Command,
) -> Result<String, ChatBridgeError> {
    let user_id = msg.user_id;
    match command {
        Command::Start => Ok(format!(
            "🤖 *Welcome!*\n\nHi, {}! I am an AI assistant.\n\
             Just send me any message and I will answer!\n\n\
             Use /help for more information.",
            msg.user_name
        )),

        Command::Help => Ok(HELP_TEXT.to_string()),

        Command::Style(None) => {
            let current = crate::styles::resolve_style(state.prefs.clone(), user_id).await;
            let all = ResponseStyle::ALL
                .iter()
                .map(|s| s.key())
                .collect::<Vec<_>>()
                .join(", ");
            Ok(format!(
                "🎨 Your answer style is *{}*.\nAvailable styles: {all}.\n\
                 Switch with /style <name>.",
                current.key()
            ))
        }

        Command::Style(Some(requested)) => {
            let style = ResponseStyle::from_key(&requested).ok_or_else(|| {
                ChatBridgeError::MalformedInput(format!(
                    "unknown style \"{}\"; pick one of friendly, official, meme",
                    requested.trim()
                ))
            })?;
            call_blocking(state.prefs.clone(), move |store| {
                store.set_style(user_id, style.key())
            })
            .await?;
            Ok(format!("🎨 Answer style set to *{}*.", style.key()))
        }

        Command::Stats => {
            let count = state.users.messages_sent(user_id);
            Ok(format!(
                "📊 *Your statistics:*\n\nMessages sent: {count}\nUser ID: {user_id}\n\n\
                 Thanks for using the bot! 🚀"
            ))
        }

        Command::Add(text) => {
            if text.is_empty() {
                return Err(ChatBridgeError::MalformedInput(
                    "task text is required, e.g. /add Buy milk".into(),
                ));
            }
            let item = state.users.add_item(user_id, &text);
            Ok(format!("✅ Added task {}: {}", item.id, item.text))
        }

        Command::Remove(raw) => {
            let id = parse_task_id(&raw)?;
            if state.users.remove_item(user_id, id) {
                Ok(format!("🗑️ Task {id} removed."))
            } else {
                Err(ChatBridgeError::NotFound(format!("no task with id {id}")))
            }
        }

        Command::Toggle(raw) => {
            let id = parse_task_id(&raw)?;
            if state.users.toggle_item(user_id, id) {
                Ok(format!("🔄 Task {id} toggled."))
            } else {
                Err(ChatBridgeError::NotFound(format!("no task with id {id}")))
            }
        }

        Command::List => Ok(state.users.list_items(user_id)),

        Command::Unknown(_) => Ok(UNKNOWN_COMMAND_TEXT.to_string()),
    }
}
