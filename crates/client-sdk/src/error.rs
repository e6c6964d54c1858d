use common::ApiErrorBody;
use console_core::Notification;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The console answered with a non-success status.
    #[error("console API error ({status}): {message}")]
    Api {
        status: u16,
        message: String,
        detailed: String,
    },
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("websocket failure: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
    #[error("login failed: {0}")]
    Login(String),
}

impl ClientError {
    pub(crate) fn from_response(status: reqwest::StatusCode, body: &str) -> Self {
        let parsed: ApiErrorBody = serde_json::from_str(body).unwrap_or_default();
        let message = [parsed.message.as_str(), parsed.detailed_message.as_str()]
            .into_iter()
            .find(|text| !text.trim().is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("unexpected response")
                    .to_string()
            });

        Self::Api {
            status: status.as_u16(),
            message,
            detailed: parsed.detailed_message,
        }
    }

    /// Snackbar payload for this failure.
    pub fn notification(&self) -> Notification {
        match self {
            Self::Api {
                message, detailed, ..
            } => {
                let detailed = if detailed == message {
                    String::new()
                } else {
                    detailed.clone()
                };
                Notification::error(message.clone(), detailed)
            }
            other => Notification::error(other.to_string(), ""),
        }
    }
}
