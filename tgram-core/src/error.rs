use thiserror::Error;

#[derive(Error, Debug)]
pub enum TgramError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("HTTP status {status}: {description}")]
    Status { status: u16, description: String },

    #[error("API error: {description}")]
    Api {
        description: String,
        error_code: Option<i64>,
    },

    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Handler error: {0}")]
    Handler(#[from] HandlerError),

    #[error("Invalid pattern: {0}")]
    Pattern(String),

    #[error("Config error: {0}")]
    Config(String),
}

impl TgramError {
    /// True for errors raised by the remote side or the transport (the retryable class).
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            TgramError::Transport(_)
                | TgramError::Status { .. }
                | TgramError::Api { .. }
                | TgramError::Decode(_)
        )
    }
}

#[derive(Error, Debug)]
pub enum HandlerError {
    #[error("No chat id available for this event")]
    NoChat,

    #[error("No message available for this event")]
    NoMessage,

    #[error("No callback query available for this event")]
    NoCallbackQuery,

    #[error("Invalid command: {0}")]
    InvalidCommand(String),

    #[error("Handler failed: {0}")]
    Failed(String),
}

pub type Result<T> = std::result::Result<T, TgramError>;
