use std::error::Error;
use std::fmt;

/// The `error` member of a failed JSON API response.
///
/// <https://cloud.google.com/storage/docs/json_api/v1/status-codes>
#[derive(Clone, Debug, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    /// HTTP status of the failure.
    pub code: u16,

    #[serde(default)]
    pub errors: Vec<ErrorResponseItem>,

    /// `"InternalError"` marks a retryable failure whatever the code.
    #[serde(default)]
    pub message: String,
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.message.fmt(f)
    }
}

impl Error for ErrorResponse {}

#[derive(Clone, Debug, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponseItem {
    /// `global`, `push`, ...
    #[serde(default)]
    pub domain: String,
    pub location: Option<String>,
    pub location_type: Option<String>,
    #[serde(default)]
    pub message: String,
    /// `notFound`, `conditionNotMet`, `invalid`, ...
    #[serde(default)]
    pub reason: String,
}

impl fmt::Display for ErrorResponseItem {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.message.fmt(f)
    }
}

/// `{"error": {...}}`
#[derive(serde::Deserialize, serde::Serialize)]
pub(crate) struct ErrorWrapper {
    pub(crate) error: ErrorResponse,
}
