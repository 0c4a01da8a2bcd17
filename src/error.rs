use thiserror::Error;

/// ClientError
///
/// The single error type surfaced by every client call. Resource clients convert
/// transport, decode and status failures into one of these variants with a
/// human-readable message; page controllers turn them into toasts.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The server answered 401. The session has already been cleared and the
    /// user redirected to the login page by the time a caller sees this.
    #[error("Authentication required")]
    AuthenticationRequired,

    /// The server answered 403. A notification has already been shown.
    #[error("Permission denied")]
    PermissionDenied,

    /// A client-side pre-check rejected the input before any network call.
    #[error("{0}")]
    ValidationFailed(String),

    /// Any other non-2xx answer.
    #[error("{message}")]
    RequestFailed { status: u16, message: String },

    #[error("{0}")]
    LoginFailed(String),

    #[error("{0}")]
    RegistrationFailed(String),

    /// The request never produced an HTTP response (DNS, connection reset, ...).
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Invalid response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Session storage error: {0}")]
    Storage(#[from] std::io::Error),
}

impl ClientError {
    /// Only an expired or missing session ends the current flow outright.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ClientError::AuthenticationRequired)
    }

    pub fn request_failed(status: u16, message: impl Into<String>) -> Self {
        ClientError::RequestFailed {
            status,
            message: message.into(),
        }
    }
}

pub type ClientResult<T> = Result<T, ClientError>;
