use std::{fmt::Display, io, result::Result};

pub type HubResult<T> = Result<T, HubError>;

#[derive(Debug)]
pub enum HubError {
    DaemonRunning,
    NoDaemon,
    JsonError(serde_json::Error),
    AuditError(sqlx::Error),
    IoError(io::Error),
    IpcError,
    ParseError,
    UnknownRecipient,
    DeliveryError,
    LoggerError,
    InvalidMessage,
    InvalidResponse,
}

impl From<io::Error> for HubError {
    fn from(value: io::Error) -> Self {
        HubError::IoError(value)
    }
}

impl From<serde_json::Error> for HubError {
    fn from(value: serde_json::Error) -> Self {
        HubError::JsonError(value)
    }
}

impl From<sqlx::Error> for HubError {
    fn from(value: sqlx::Error) -> Self {
        HubError::AuditError(value)
    }
}

impl From<fern::InitError> for HubError {
    fn from(_: fern::InitError) -> Self {
        HubError::LoggerError
    }
}

impl Display for HubError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HubError::DaemonRunning => write!(f, "Daemon is already running"),
            HubError::NoDaemon => write!(f, "No daemon found"),
            HubError::JsonError(err) => write!(f, "Serde json error: {}", err),
            HubError::AuditError(err) => write!(f, "Audit sink error: {}", err),
            HubError::IoError(err) => write!(f, "IO error: {}", err),
            HubError::IpcError => write!(f, "Inter-processes communication error"),
            HubError::ParseError => write!(f, "Parse error"),
            HubError::UnknownRecipient => write!(f, "Unknown recipient"),
            HubError::DeliveryError => write!(f, "Failed to deliver message"),
            HubError::LoggerError => write!(f, "Cannot init logger"),
            HubError::InvalidMessage => write!(f, "Invalid message"),
            HubError::InvalidResponse => write!(f, "Invalid response"),
        }
    }
}
