#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    #[error("authentication failed: {0}")]
    Auth(String),
    #[error("request timed out: {0}")]
    Timeout(String),
    #[error("connection error: {0}")]
    Connection(String),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("remote returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("unexpected response: {0}")]
    Decode(String),
    #[error("invalid url: {0}")]
    InvalidUrl(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteErrorKind {
    Auth,
    Timeout,
    Network,
    NotFound,
    Forbidden,
    Throttled,
    Server,
    Client,
    Protocol,
}

impl RemoteError {
    pub fn kind(&self) -> RemoteErrorKind {
        match self {
            RemoteError::Auth(_) => RemoteErrorKind::Auth,
            RemoteError::Timeout(_) => RemoteErrorKind::Timeout,
            RemoteError::Connection(_) | RemoteError::Transport(_) => RemoteErrorKind::Network,
            RemoteError::Status { status, .. } => match *status {
                401 => RemoteErrorKind::Auth,
                403 => RemoteErrorKind::Forbidden,
                404 => RemoteErrorKind::NotFound,
                429 => RemoteErrorKind::Throttled,
                500..=599 => RemoteErrorKind::Server,
                _ => RemoteErrorKind::Client,
            },
            RemoteError::Decode(_) | RemoteError::InvalidUrl(_) => RemoteErrorKind::Protocol,
        }
    }

    /// Timeouts, dropped connections, throttling and server errors are worth
    /// another attempt; everything else will fail the same way again.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.kind(),
            RemoteErrorKind::Timeout
                | RemoteErrorKind::Network
                | RemoteErrorKind::Throttled
                | RemoteErrorKind::Server
        )
    }
}

impl From<reqwest::Error> for RemoteError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            RemoteError::Timeout(e.to_string())
        } else if e.is_connect() {
            RemoteError::Connection(e.to_string())
        } else if e.is_decode() {
            RemoteError::Decode(e.to_string())
        } else if let Some(status) = e.status() {
            RemoteError::Status {
                status: status.as_u16(),
                body: e.to_string(),
            }
        } else {
            RemoteError::Transport(e.to_string())
        }
    }
}
