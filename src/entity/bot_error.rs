#[derive(Debug, thiserror::Error)]
pub enum BotError {
    #[error("Swap queue is full, please try again")]
    QueueFull,

    #[error("Swap pipeline is stopped")]
    PipelineStopped,

    #[error("Backend swap submit failed: {0}")]
    BackendSubmit(String),

    #[error("Could not resolve chain for the trade wallet")]
    ChainUnresolved,

    #[error("Telegram API error: {0}")]
    TelegramApi(#[from] teloxide::RequestError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid amount")]
    InvalidAmount,

    #[error("Insufficient balance")]
    InsufficientBalance,
}
