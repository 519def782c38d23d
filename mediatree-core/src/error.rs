use mediatree_providers::EmbyError;
use thiserror::Error;

/// Failure of a fetch against the item source.
///
/// Cloneable so a single failed load can be handed to every coalesced
/// caller and stored in the node's `Failed` state at the same time.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Network unavailable: {0}")]
    NetworkUnavailable(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Decode failure: {0}")]
    DecodeFailure(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

/// Fieldless view of [`Error`], for callers that only branch on the kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NetworkUnavailable,
    Unauthorized,
    NotFound,
    DecodeFailure,
    Unknown,
}

impl Error {
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NetworkUnavailable(_) => ErrorKind::NetworkUnavailable,
            Self::Unauthorized(_) => ErrorKind::Unauthorized,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::DecodeFailure(_) => ErrorKind::DecodeFailure,
            Self::Unknown(_) => ErrorKind::Unknown,
        }
    }

    /// Whether the UI should send the user back through login.
    #[must_use]
    pub const fn requires_reauthentication(&self) -> bool {
        matches!(self, Self::Unauthorized(_))
    }
}

impl From<EmbyError> for Error {
    fn from(err: EmbyError) -> Self {
        if err.is_unauthorized() {
            return Self::Unauthorized(err.to_string());
        }
        match err {
            EmbyError::Network(msg) => Self::NetworkUnavailable(msg),
            EmbyError::NotFound(id) => Self::NotFound(id),
            EmbyError::Http { status, url } if status == reqwest::StatusCode::NOT_FOUND => {
                Self::NotFound(url)
            }
            EmbyError::Parse(msg) => Self::DecodeFailure(msg),
            other => Self::Unknown(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
