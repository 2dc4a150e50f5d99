use shared::error::ErrorState;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    /// The request never produced a response (connect failure, reset, bad TLS).
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },
    /// The service answered with a non-success status.
    #[error("device service returned {status} {status_text}: {body}")]
    Service {
        status: u16,
        status_text: String,
        body: String,
    },
    #[error("unexpected response body (status {status}): {message}")]
    Decode { status: u16, message: String },
    #[error("invalid device service url '{url}': {message}")]
    InvalidUrl { url: String, message: String },
    #[error("{0}")]
    Unavailable(String),
}

impl ServiceError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Service { status, .. } | Self::Decode { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<&ServiceError> for ErrorState {
    fn from(value: &ServiceError) -> Self {
        match value {
            ServiceError::Service {
                status,
                status_text,
                body,
            } => ErrorState::http(*status, status_text.clone(), body.clone()),
            ServiceError::Decode { status, message } => ErrorState {
                status: Some(*status),
                status_text: None,
                message: message.clone(),
            },
            ServiceError::Transport { .. }
            | ServiceError::InvalidUrl { .. }
            | ServiceError::Unavailable(_) => ErrorState::transport(value.to_string()),
        }
    }
}

impl From<ServiceError> for ErrorState {
    fn from(value: ServiceError) -> Self {
        ErrorState::from(&value)
    }
}
