use std::sync::Arc;

use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, USER_AGENT};
use reqwest::Request;
use reqwest_middleware::ClientWithMiddleware as Client;
use serde::de::DeserializeOwned;
use token_source::TokenSource;

use crate::http::TransportError;

/// A fully buffered HTTP response.
#[derive(Clone, Debug)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, TransportError> {
        Ok(serde_json::from_slice(&self.body)?)
    }
}

/// Executes one assembled request against the storage service.
///
/// Implementations own timeouts, connection reuse and authentication. Any HTTP status is a
/// successful exchange at this level; only failures without a response are errors.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: Request) -> Result<HttpResponse, TransportError>;
}

/// [`Transport`] backed by `reqwest-middleware`.
#[derive(Clone)]
pub struct HttpTransport {
    http: Client,
    ts: Option<Arc<dyn TokenSource>>,
}

impl HttpTransport {
    pub fn new(http: Client, ts: Option<Arc<dyn TokenSource>>) -> Self {
        Self { http, ts }
    }

    async fn with_headers(&self, mut request: Request) -> Result<Request, TransportError> {
        let headers = request.headers_mut();
        headers.insert("X-Goog-Api-Client", HeaderValue::from_static("rust"));
        headers.insert(USER_AGENT, HeaderValue::from_static("gcloud-storage-rpc"));
        if let Some(ts) = &self.ts {
            let token = ts.token().await.map_err(TransportError::TokenSource)?;
            let value = HeaderValue::from_str(&token).map_err(|e| TransportError::TokenSource(Box::new(e)))?;
            request.headers_mut().insert(AUTHORIZATION, value);
        }
        Ok(request)
    }
}

#[async_trait::async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, request: Request) -> Result<HttpResponse, TransportError> {
        let request = self.with_headers(request).await?;
        let response = self.http.execute(request).await?;
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.bytes().await?;
        Ok(HttpResponse { status, headers, body })
    }
}
