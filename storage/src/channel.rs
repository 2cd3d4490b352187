//! Chunked access to object content.
//!
//! [`BlobReadChannel`] issues one ranged download per chunk. [`BlobWriteChannel`] feeds a
//! resumable upload session and only makes the object visible on [`BlobWriteChannel::close`].

use bytes::Bytes;

use crate::blob::Blob;
use crate::error::Error;
use crate::http::check_response_status;
use crate::http::objects::download::Range;
use crate::http::objects::get::GetObjectRequest;
use crate::http::resumable_upload_client::{ChunkSize, ResumableUploadClient, UploadStatus};
use crate::http::storage_client::StorageClient;

/// Resumable upload chunks must be a multiple of this size.
pub const CHUNK_SIZE_MULTIPLE: usize = 256 * 1024;

pub const DEFAULT_READ_CHUNK_SIZE: usize = 2 * 1024 * 1024;

pub const DEFAULT_WRITE_CHUNK_SIZE: usize = 8 * CHUNK_SIZE_MULTIPLE;

const RANGE_NOT_SATISFIABLE: u16 = 416;

const GENERATION_HEADER: &str = "x-goog-generation";

/// Reads an object in chunks of `chunk_size` bytes.
///
/// The generation served by the first chunk is pinned, so a concurrent overwrite never
/// mixes the content of two generations.
pub struct BlobReadChannel {
    client: StorageClient,
    request: GetObjectRequest,
    position: u64,
    chunk_size: usize,
    end_of_data: bool,
    open: bool,
}

impl BlobReadChannel {
    pub(crate) fn new(client: StorageClient, request: GetObjectRequest, chunk_size: usize) -> Self {
        Self {
            client,
            request,
            position: 0,
            chunk_size: chunk_size.max(1),
            end_of_data: false,
            open: true,
        }
    }

    /// Returns the next chunk, or `None` once the end of the object is reached.
    pub async fn read(&mut self) -> Result<Option<Bytes>, Error> {
        if !self.open {
            return Err(Error::invalid("read channel is closed"));
        }
        if self.end_of_data {
            return Ok(None);
        }
        // no object extends past u64::MAX
        let Some(last) = self.position.checked_add(self.chunk_size as u64 - 1) else {
            self.end_of_data = true;
            return Ok(None);
        };
        let response = self
            .client
            .download(&self.request, &Range(Some(self.position), Some(last)))
            .await?;
        if response.status == RANGE_NOT_SATISFIABLE {
            self.end_of_data = true;
            return Ok(None);
        }
        let response = check_response_status(response)?;
        if self.request.generation.is_none() {
            self.request.generation = response.header(GENERATION_HEADER).and_then(|g| g.parse().ok());
        }
        // 200 means the whole remaining content was served at once
        if response.status != 206 || response.body.len() < self.chunk_size {
            self.end_of_data = true;
        }
        if response.body.is_empty() {
            return Ok(None);
        }
        self.position += response.body.len() as u64;
        Ok(Some(response.body))
    }

    /// Reads every remaining chunk.
    pub async fn read_to_end(&mut self) -> Result<Vec<u8>, Error> {
        let mut data = Vec::new();
        while let Some(chunk) = self.read().await? {
            data.extend_from_slice(&chunk);
        }
        Ok(data)
    }

    /// Moves the next read to `position`.
    pub fn seek(&mut self, position: u64) {
        self.position = position;
        self.end_of_data = false;
    }

    pub fn position(&self) -> u64 {
        self.position
    }

    /// The generation being read, once known.
    pub fn generation(&self) -> Option<i64> {
        self.request.generation
    }

    pub fn set_chunk_size(&mut self, chunk_size: usize) {
        self.chunk_size = chunk_size.max(1);
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn close(&mut self) {
        self.open = false;
    }
}

/// Writes an object through a resumable upload session.
///
/// Data is buffered and sent whenever a full chunk is available. The object is created
/// by [`close`](BlobWriteChannel::close).
pub struct BlobWriteChannel {
    session: ResumableUploadClient,
    buffer: Vec<u8>,
    // bytes persisted by the service; `buffer` starts at this offset
    position: u64,
    chunk_size: usize,
    open: bool,
}

impl BlobWriteChannel {
    pub(crate) fn new(session: ResumableUploadClient, chunk_size: usize) -> Self {
        Self {
            session,
            buffer: Vec::new(),
            position: 0,
            chunk_size: round_chunk_size(chunk_size),
            open: true,
        }
    }

    /// The session URL, which can be used to resume the upload from another process.
    pub fn url(&self) -> &str {
        self.session.url()
    }

    /// Sets the chunk size, rounded up to a multiple of 256 KiB.
    pub fn set_chunk_size(&mut self, chunk_size: usize) {
        self.chunk_size = round_chunk_size(chunk_size);
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub async fn write(&mut self, data: &[u8]) -> Result<usize, Error> {
        if !self.open {
            return Err(Error::invalid("write channel is closed"));
        }
        self.buffer.extend_from_slice(data);
        while self.buffer.len() >= self.chunk_size {
            self.flush_chunk().await?;
        }
        Ok(data.len())
    }

    async fn flush_chunk(&mut self) -> Result<(), Error> {
        let sent = self.chunk_size as u64;
        let size = ChunkSize::new(self.position, self.position + sent - 1, None)
            .map_err(|e| Error::invalid(e.to_string()))?;
        let chunk = Bytes::copy_from_slice(&self.buffer[..self.chunk_size]);
        match self.session.upload_multiple_chunk(chunk, &size).await? {
            UploadStatus::ResumeIncomplete(persisted) => {
                let persisted = persisted.unwrap_or(0);
                if persisted <= self.position {
                    return Err(Error::IncompleteUpload {
                        persisted: Some(persisted),
                        total: self.position + sent,
                    });
                }
                // the service may keep less than a full chunk; the rest is sent again
                let accepted = (persisted - self.position).min(sent) as usize;
                self.buffer.drain(..accepted);
                self.position += accepted as u64;
                Ok(())
            }
            UploadStatus::Ok(_) => {
                self.open = false;
                Err(Error::invalid("upload was finalized before the channel was closed"))
            }
        }
    }

    /// Sends the buffered tail with the total size and returns the created object.
    pub async fn close(&mut self) -> Result<Blob, Error> {
        if !self.open {
            return Err(Error::invalid("write channel is closed"));
        }
        self.open = false;
        let total = self.position + self.buffer.len() as u64;
        let size = if self.buffer.is_empty() {
            ChunkSize::empty(Some(total))
        } else {
            ChunkSize::new(self.position, total - 1, Some(total)).map_err(|e| Error::invalid(e.to_string()))?
        };
        let tail = Bytes::from(std::mem::take(&mut self.buffer));
        match self.session.upload_multiple_chunk(tail, &size).await? {
            UploadStatus::Ok(object) => {
                tracing::debug!("resumable upload finished: {total} bytes");
                Ok(Blob::from(object))
            }
            UploadStatus::ResumeIncomplete(persisted) => Err(Error::IncompleteUpload { persisted, total }),
        }
    }

    /// Cancels the session. Nothing written so far becomes visible.
    pub async fn abort(mut self) -> Result<(), Error> {
        self.open = false;
        self.buffer.clear();
        self.session.cancel().await?;
        Ok(())
    }
}

fn round_chunk_size(chunk_size: usize) -> usize {
    chunk_size.max(1).div_ceil(CHUNK_SIZE_MULTIPLE) * CHUNK_SIZE_MULTIPLE
}
