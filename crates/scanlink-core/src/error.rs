use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Invalid scanner ID: {0}")]
    InvalidScannerId(String),

    #[error("Invalid connection type: {0}")]
    InvalidConnectionType(String),

    #[error("Invalid communication protocol: {0}")]
    InvalidProtocol(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
