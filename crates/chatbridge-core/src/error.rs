use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChatBridgeError {
    #[error("Completion provider unreachable: {0}")]
    ProviderUnavailable(#[from] reqwest::Error),

    #[error("Completion provider rejected the request (status {status}): {body}")]
    ProviderRejected { status: u16, body: String },

    #[error("Malformed input: {0}")]
    MalformedInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Message delivery failed: {0}")]
    Delivery(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}
