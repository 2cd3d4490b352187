use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use reqwest_middleware::{ClientWithMiddleware as Client, RequestBuilder};
use time::OffsetDateTime;

use crate::http::objects::ObjectCreationConfig;
use crate::http::{Escape, TransportError};

/// Content type used when the object metadata does not name one.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

#[derive(Clone, Copy, PartialEq, Eq, serde::Deserialize, serde::Serialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub enum UploadType {
    /// Metadata and media in one `multipart/related` request.
    #[default]
    Multipart,
    /// Opens a session that accepts the media in chunks.
    Resumable,
}

/// Request message for InsertObject.
#[derive(Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct UploadObjectRequest {
    /// Required. Name of the bucket in which to store the new object.
    #[serde(skip_serializing)]
    pub bucket: String,
    pub upload_type: UploadType,
    /// Makes the operation conditional on whether the object's current generation
    /// matches the given value. Setting to 0 makes the operation succeed only if
    /// there are no live versions of the object.
    pub if_generation_match: Option<i64>,
    /// Makes the operation conditional on whether the object's current generation
    /// does not match the given value.
    pub if_generation_not_match: Option<i64>,
    /// Makes the operation conditional on whether the object's current
    /// metageneration matches the given value.
    pub if_metageneration_match: Option<i64>,
    /// Makes the operation conditional on whether the object's current
    /// metageneration does not match the given value.
    pub if_metageneration_not_match: Option<i64>,
    /// Apply a predefined set of access controls to this object.
    pub predefined_acl: Option<String>,
    /// Set of properties to return. Defaults to `noAcl`.
    pub projection: Option<String>,
    /// Selector specifying which fields to include in a partial response.
    pub fields: Option<String>,
}

/// Builds a `multipart/related` upload carrying the metadata and the whole media.
///
/// The body is held in memory, so the request can be replayed by a retrying middleware.
pub(crate) fn build_multipart(
    base_url: &str,
    client: &Client,
    req: &UploadObjectRequest,
    metadata: &ObjectCreationConfig,
    content_type: &str,
    content: &[u8],
) -> Result<RequestBuilder, TransportError> {
    let url = format!("{}/b/{}/o", base_url, req.bucket.escape());
    let boundary = format!("gcloud_storage_rpc_{:x}", OffsetDateTime::now_utc().unix_timestamp_nanos());
    let json = serde_json::to_vec(metadata)?;

    let mut body = Vec::with_capacity(json.len() + content.len() + 256);
    body.extend_from_slice(format!("--{boundary}\r\nContent-Type: application/json; charset=UTF-8\r\n\r\n").as_bytes());
    body.extend_from_slice(&json);
    body.extend_from_slice(format!("\r\n--{boundary}\r\nContent-Type: {content_type}\r\n\r\n").as_bytes());
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    Ok(client
        .post(url)
        .query(&req)
        .header(CONTENT_TYPE, format!("multipart/related; boundary={boundary}"))
        .header(CONTENT_LENGTH, body.len())
        .body(body))
}

/// Builds the request that opens a resumable upload session.
///
/// See <https://cloud.google.com/storage/docs/performing-resumable-uploads#initiate-session>
pub(crate) fn build_resumable(
    base_url: &str,
    client: &Client,
    req: &UploadObjectRequest,
    metadata: &ObjectCreationConfig,
    content_type: &str,
) -> RequestBuilder {
    let url = format!("{}/b/{}/o", base_url, req.bucket.escape());
    client
        .post(url)
        .query(&req)
        .header("X-Upload-Content-Type", content_type)
        .json(metadata)
}
