use crate::http::TransportError;

/// HTTP codes of service errors that may succeed when the call is repeated.
pub const RETRYABLE_CODES: [u16; 2] = [500, 503];

/// Message the service uses for transient internal failures, whatever the code.
pub const INTERNAL_ERROR_MESSAGE: &str = "InternalError";

/// Code given to failures that never produced a structured service response.
pub const UNKNOWN_CODE: u16 = 0;

/// A failed remote call, classified for an outer retry policy.
#[derive(thiserror::Error, Debug)]
#[error("{code}: {message}")]
pub struct ServiceError {
    code: u16,
    message: String,
    retryable: bool,
    #[source]
    source: Option<TransportError>,
}

impl ServiceError {
    pub fn new(code: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            code,
            retryable: is_retryable(code, &message),
            message,
            source: None,
        }
    }

    /// The HTTP status reported by the service, or `0` when there was no service response.
    pub fn code(&self) -> u16 {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_retryable(&self) -> bool {
        self.retryable
    }

    /// The underlying failure.
    pub fn cause(&self) -> Option<&TransportError> {
        self.source.as_ref()
    }
}

pub fn is_retryable(code: u16, message: &str) -> bool {
    RETRYABLE_CODES.contains(&code) || message == INTERNAL_ERROR_MESSAGE
}

/// Classifies a transport failure.
pub fn translate(failure: TransportError) -> ServiceError {
    let (code, message, retryable) = match failure.details() {
        Some((code, message)) => (code, message.to_string(), is_retryable(code, message)),
        None => (UNKNOWN_CODE, failure.to_string(), false),
    };
    tracing::trace!(code, retryable, "storage call failed: {message}");
    ServiceError {
        code,
        message,
        retryable,
        source: Some(failure),
    }
}

/// Errors surfaced by this crate.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The remote call failed.
    #[error(transparent)]
    Service(#[from] ServiceError),
    /// The call was rejected before anything was sent.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// A resumable upload was finalized while the service had persisted fewer bytes than written.
    #[error("upload incomplete: persisted={persisted:?} total={total}")]
    IncompleteUpload { persisted: Option<u64>, total: u64 },
}

impl Error {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Error::InvalidArgument(message.into())
    }

    /// The service error code, if this is a service error.
    pub fn code(&self) -> Option<u16> {
        match self {
            Error::Service(e) => Some(e.code()),
            _ => None,
        }
    }

    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Service(e) => e.is_retryable(),
            _ => false,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.code() == Some(404)
    }
}

impl From<TransportError> for Error {
    fn from(e: TransportError) -> Self {
        Error::Service(translate(e))
    }
}
