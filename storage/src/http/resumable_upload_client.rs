use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use reqwest::header::{CONTENT_LENGTH, CONTENT_RANGE};
use reqwest_middleware::ClientWithMiddleware as Client;

use crate::http::objects::Object;
use crate::http::transport::{HttpResponse, Transport};
use crate::http::{check_response_status, TransportError};

/// Status the service uses to acknowledge a chunk of an unfinished upload.
pub const RESUME_INCOMPLETE: u16 = 308;

/// Status the service answers to a cancelled session.
pub const CLIENT_CLOSED: u16 = 499;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ChunkError {
    #[error("invalid range: first={0} last={1}")]
    InvalidRange(u64, u64),
    #[error("total object size must not be zero")]
    ZeroTotalObjectSize,
    #[error("last byte must be less than total object size: last={0} total={1}")]
    InvalidLastBytes(u64, u64),
}

#[derive(PartialEq, Debug)]
pub enum UploadStatus {
    Ok(Object),
    /// The session is still open. Carries the number of bytes the service has persisted,
    /// if it reported any.
    ResumeIncomplete(Option<u64>),
}

/// The `Content-Range` of one chunk.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct ChunkSize {
    range: Option<(u64, u64)>,
    total_object_size: Option<u64>,
}

impl fmt::Display for ChunkSize {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.range {
            Some((first, last)) => write!(f, "bytes {first}-{last}/")?,
            None => write!(f, "bytes */")?,
        }
        match self.total_object_size {
            Some(total_object_size) => write!(f, "{total_object_size}"),
            None => write!(f, "*"),
        }
    }
}

impl ChunkSize {
    /// Bytes `first..=last` of an object whose total size may not be known yet.
    pub fn new(first_byte: u64, last_byte: u64, total_object_size: Option<u64>) -> Result<ChunkSize, ChunkError> {
        if first_byte > last_byte {
            return Err(ChunkError::InvalidRange(first_byte, last_byte));
        }
        if let Some(total) = total_object_size {
            if total == 0 {
                return Err(ChunkError::ZeroTotalObjectSize);
            }
            if last_byte >= total {
                return Err(ChunkError::InvalidLastBytes(last_byte, total));
            }
        }
        Ok(Self {
            range: Some((first_byte, last_byte)),
            total_object_size,
        })
    }

    /// A chunk without content, used to finalize an upload whose bytes were all sent.
    pub fn empty(total_object_size: Option<u64>) -> ChunkSize {
        Self {
            range: None,
            total_object_size,
        }
    }

    pub fn size(&self) -> u64 {
        match self.range {
            Some((first, last)) => last - first + 1,
            None => 0,
        }
    }
}

/// A client bound to one resumable upload session.
#[derive(Clone)]
pub struct ResumableUploadClient {
    session_url: String,
    http: Client,
    transport: Arc<dyn Transport>,
}

impl ResumableUploadClient {
    pub fn url(&self) -> &str {
        self.session_url.as_str()
    }

    pub fn new(session_url: String, http: Client, transport: Arc<dyn Transport>) -> Self {
        Self {
            session_url,
            http,
            transport,
        }
    }

    /// https://cloud.google.com/storage/docs/performing-resumable-uploads#chunked-upload
    /// https://cloud.google.com/storage/docs/performing-resumable-uploads#resume-upload
    pub async fn upload_multiple_chunk(&self, data: Bytes, size: &ChunkSize) -> Result<UploadStatus, TransportError> {
        let request = self
            .http
            .put(&self.session_url)
            .header(CONTENT_RANGE, size.to_string())
            .header(CONTENT_LENGTH, size.size())
            .body(data)
            .build()?;
        let response = self.transport.execute(request).await?;
        Self::map_resume_response(response)
    }

    /// https://cloud.google.com/storage/docs/performing-resumable-uploads#cancel-upload
    pub async fn cancel(self) -> Result<(), TransportError> {
        let request = self
            .http
            .delete(&self.session_url)
            .header(CONTENT_LENGTH, 0)
            .build()?;
        let response = self.transport.execute(request).await?;
        if response.status == CLIENT_CLOSED {
            Ok(())
        } else {
            check_response_status(response)?;
            Ok(())
        }
    }

    fn map_resume_response(response: HttpResponse) -> Result<UploadStatus, TransportError> {
        if response.status == RESUME_INCOMPLETE {
            Ok(UploadStatus::ResumeIncomplete(persisted(&response)))
        } else {
            check_response_status(response)?.json::<Object>().map(UploadStatus::Ok)
        }
    }
}

/// Reads `Range: bytes=0-{last}` of a 308 response as a byte count.
fn persisted(response: &HttpResponse) -> Option<u64> {
    let range = response.header("range")?;
    let last = range.strip_prefix("bytes=")?.split_once('-')?.1;
    last.trim().parse::<u64>().ok().map(|last| last + 1)
}
