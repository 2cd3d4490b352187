use std::ops::Deref;
use std::sync::Arc;

use token_source::TokenSourceProvider;

use crate::channel::{DEFAULT_READ_CHUNK_SIZE, DEFAULT_WRITE_CHUNK_SIZE};
use crate::http::storage_client::StorageClient;
use crate::http::transport::{HttpTransport, Transport};

pub const DEFAULT_STORAGE_ENDPOINT: &str = "https://storage.googleapis.com";

#[derive(Debug)]
pub struct ClientConfig {
    /// HTTP client used to send requests. Timeouts, pooling and middleware such as
    /// retries are configured here.
    pub http: Option<reqwest_middleware::ClientWithMiddleware>,
    pub storage_endpoint: String,
    /// Project new buckets are created in and buckets are listed from.
    pub project_id: Option<String>,
    pub token_source_provider: Option<Box<dyn TokenSourceProvider>>,
    pub read_chunk_size: usize,
    /// Rounded up to a multiple of 256 KiB.
    pub write_chunk_size: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            http: None,
            storage_endpoint: DEFAULT_STORAGE_ENDPOINT.to_string(),
            project_id: None,
            token_source_provider: None,
            read_chunk_size: DEFAULT_READ_CHUNK_SIZE,
            write_chunk_size: DEFAULT_WRITE_CHUNK_SIZE,
        }
    }
}

impl ClientConfig {
    /// Sends requests without an `Authorization` header.
    pub fn anonymous(mut self) -> Self {
        self.token_source_provider = None;
        self
    }

    pub fn with_project_id(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = Some(project_id.into());
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.storage_endpoint = endpoint.into();
        self
    }

    pub fn with_token_source_provider(mut self, provider: Box<dyn TokenSourceProvider>) -> Self {
        self.token_source_provider = Some(provider);
        self
    }

    pub fn with_http_client(mut self, http: reqwest_middleware::ClientWithMiddleware) -> Self {
        self.http = Some(http);
        self
    }
}

#[derive(Clone)]
pub struct Client {
    storage_client: StorageClient,
}

impl Deref for Client {
    type Target = StorageClient;

    fn deref(&self) -> &Self::Target {
        &self.storage_client
    }
}

impl Default for Client {
    fn default() -> Self {
        Self::new(ClientConfig::default())
    }
}

impl Client {
    /// New client
    pub fn new(config: ClientConfig) -> Self {
        let ts = match &config.token_source_provider {
            Some(tsp) => Some(tsp.token_source()),
            None => {
                tracing::trace!("Use anonymous access due to lack of token");
                None
            }
        };
        let http = config
            .http
            .clone()
            .unwrap_or_else(|| reqwest_middleware::ClientBuilder::new(reqwest::Client::default()).build());
        let transport = HttpTransport::new(http, ts);
        Self::with_transport(config, Arc::new(transport))
    }

    /// New client sending every request through `transport`.
    ///
    /// The token source of `config` is not used; authentication is up to the transport.
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Self {
        let http = config
            .http
            .unwrap_or_else(|| reqwest_middleware::ClientBuilder::new(reqwest::Client::default()).build());
        let storage_client = StorageClient::new(
            transport,
            http,
            config.storage_endpoint.trim_end_matches('/'),
            config.project_id,
            config.read_chunk_size,
            config.write_chunk_size,
        );
        Self { storage_client }
    }
}
