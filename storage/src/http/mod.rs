use std::fmt::Display;
use std::str::FromStr;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{de, Deserialize, Deserializer};
use serde_json::Value;

use crate::http::transport::HttpResponse;

pub mod access_controls;
pub mod buckets;
pub mod error;
pub mod objects;
pub mod resumable_upload_client;
pub mod storage_client;
pub mod transport;

/// Projection requested when the caller does not choose one.
pub const DEFAULT_PROJECTION: &str = "full";

/// A failure of a single request/response exchange, before classification.
#[derive(thiserror::Error, Debug)]
pub enum TransportError {
    /// An error returned from the Google Cloud Storage service.
    #[error(transparent)]
    Response(#[from] error::ErrorResponse),

    /// An error from the underlying HTTP client.
    #[error(transparent)]
    HttpClient(#[from] reqwest::Error),

    /// An error from one of the middleware used.
    #[error(transparent)]
    HttpMiddleware(anyhow::Error),

    /// An error from a token source.
    #[error("token source failed: {0}")]
    TokenSource(Box<dyn std::error::Error + Send + Sync>),

    /// A successful response whose body could not be decoded.
    #[error("invalid response body: {0}")]
    Deserialize(#[from] serde_json::Error),
}

impl TransportError {
    /// Returns the `(code, message)` pair of a structured service error, if any.
    pub fn details(&self) -> Option<(u16, &str)> {
        match self {
            TransportError::Response(e) => Some((e.code, e.message.as_str())),
            _ => None,
        }
    }
}

impl From<reqwest_middleware::Error> for TransportError {
    fn from(error: reqwest_middleware::Error) -> Self {
        match error {
            reqwest_middleware::Error::Middleware(err) => TransportError::HttpMiddleware(err),
            reqwest_middleware::Error::Reqwest(err) => TransportError::HttpClient(err),
        }
    }
}

/// Checks whether an HTTP response is successful and returns it, or returns an error.
pub(crate) fn check_response_status(response: HttpResponse) -> Result<HttpResponse, TransportError> {
    if response.is_success() {
        return Ok(response);
    }

    // try to extract a response error, falling back to the bare status if it can not be parsed.
    let error = match serde_json::from_slice::<error::ErrorWrapper>(&response.body) {
        Ok(wrapper) => wrapper.error,
        Err(_) => {
            let text = String::from_utf8_lossy(&response.body).trim().to_string();
            let message = if text.is_empty() {
                reqwest::StatusCode::from_u16(response.status)
                    .ok()
                    .and_then(|s| s.canonical_reason())
                    .unwrap_or_default()
                    .to_string()
            } else {
                text
            };
            error::ErrorResponse {
                code: response.status,
                errors: vec![],
                message,
            }
        }
    };
    Err(TransportError::Response(error))
}

pub(crate) trait Escape {
    fn escape(&self) -> String;
}

impl Escape for str {
    fn escape(&self) -> String {
        utf8_percent_encode(self, ENCODE_SET).to_string()
    }
}

impl Escape for String {
    fn escape(&self) -> String {
        self.as_str().escape()
    }
}

const ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC.remove(b'*').remove(b'-').remove(b'.').remove(b'_');

pub(crate) fn from_str_option<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: FromStr,
    T::Err: Display,
    D: Deserializer<'de>,
{
    let s: Result<Value, _> = Deserialize::deserialize(deserializer);
    match s {
        Ok(Value::String(s)) => T::from_str(&s).map_err(de::Error::custom).map(Some),
        Ok(Value::Number(num)) => T::from_str(&num.to_string()).map_err(de::Error::custom).map(Some),
        Ok(Value::Null) => Ok(None),
        Ok(_) => Err(de::Error::custom("Incorrect type")),
        Err(_) => Ok(None),
    }
}
