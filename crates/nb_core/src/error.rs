use thiserror::Error;

/// Shown when the relay could not be reached or answered with an error status.
pub const TRANSPORT_MESSAGE: &str = "뉴스 정보를 가져오는데 실패했습니다.";
/// Shown when the relay answered but no usable payload could be read.
pub const MALFORMED_MESSAGE: &str = "데이터 형식이 올바르지 않습니다. 다시 시도해주세요.";
/// Shown when the payload was well formed but carried no news items.
pub const NO_RESULTS_MESSAGE: &str = "관련된 최신 뉴스를 찾을 수 없습니다.";

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("No results found")]
    NoResults,

    #[error("Persistence read error: {0}")]
    PersistenceRead(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Speech error: {0}")]
    Speech(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("External error: {0}")]
    External(#[from] anyhow::Error),
}

impl Error {
    /// The localized message a user sees for this failure.
    pub fn user_message(&self) -> &'static str {
        match self {
            Error::MalformedResponse(_) | Error::Serialization(_) => MALFORMED_MESSAGE,
            Error::NoResults => NO_RESULTS_MESSAGE,
            _ => TRANSPORT_MESSAGE,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
