use thiserror::Error;

use crate::telegram::TelegramError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config error: {0}")]
    Config(String),
    #[error("telegram error: {0}")]
    Telegram(#[from] TelegramError),
    #[error("server error: {0}")]
    Server(String),
}
