use serde::{Deserialize, Serialize};

/// Details of the last failed network operation, as shown in the error panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorState {
    /// HTTP status, absent when the request never completed.
    pub status: Option<u16>,
    pub status_text: Option<String>,
    pub message: String,
}

impl ErrorState {
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            status: None,
            status_text: None,
            message: message.into(),
        }
    }

    pub fn http(status: u16, status_text: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            status_text: Some(status_text.into()),
            message: message.into(),
        }
    }

    /// One-line summary, e.g. `503 Service Unavailable: maintenance`.
    pub fn summary(&self) -> String {
        match (self.status, self.status_text.as_deref()) {
            (Some(status), Some(text)) if !text.is_empty() => {
                format!("{status} {text}: {}", self.message)
            }
            (Some(status), _) => format!("{status}: {}", self.message),
            (None, _) => self.message.clone(),
        }
    }
}

impl std::fmt::Display for ErrorState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.summary())
    }
}
