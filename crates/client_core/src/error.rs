use shared::domain::EventId;
use thiserror::Error;

pub type ClientResult<T> = std::result::Result<T, ClientError>;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("server rejected request ({status}): {message}")]
    Server { status: u16, message: String },
    #[error("unexpected response body: {0}")]
    Decode(String),
    #[error("invalid service url: {0}")]
    Url(#[from] url::ParseError),
    #[error("no identity registered")]
    NotRegistered,
    #[error("event {0} is not in the current listing")]
    UnknownEvent(EventId),
    #[error("event {0} is full")]
    EventFull(EventId),
    #[error("invalid event draft: {0}")]
    InvalidDraft(String),
    #[error("nothing awaiting confirmation")]
    NoPendingAction,
}

impl ClientError {
    pub fn server(status: u16, message: impl Into<String>) -> Self {
        Self::Server {
            status,
            message: message.into(),
        }
    }

    /// Server-reported message, verbatim, when the failure came from the service.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Server { message, .. } => Some(message),
            _ => None,
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Decode(_) | Self::Url(_))
    }

    /// Text shown to the visitor in a banner or alert.
    pub fn user_message(&self) -> String {
        match self {
            Self::Server { message, .. } => format!("Error: {message}"),
            Self::NotRegistered => "Please register first before enrolling in events".to_string(),
            Self::UnknownEvent(_) => "That event is no longer listed".to_string(),
            Self::EventFull(_) => "This event is full".to_string(),
            Self::InvalidDraft(reason) => reason.clone(),
            Self::NoPendingAction => "Nothing to confirm".to_string(),
            Self::Transport(_) | Self::Decode(_) | Self::Url(_) => {
                "Request failed. Please try again.".to_string()
            }
        }
    }
}
