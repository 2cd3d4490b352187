use std::collections::HashMap;

use time::OffsetDateTime;

use crate::http::access_controls::{AccessControl, Owner};

pub mod compose;
pub mod copy;
pub mod delete;
pub mod download;
pub mod get;
pub mod list;
pub mod patch;
pub mod upload;

/// Object metadata as sent and returned by the JSON API.
///
/// int64 fields are accepted both as JSON strings and numbers.
#[derive(Clone, PartialEq, Eq, Default, serde::Deserialize, serde::Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Object {
    /// `{bucket}/{name}/{generation}`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub self_link: Option<String>,
    /// Download URL of this generation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_link: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub bucket: String,
    /// Changes whenever the content is replaced.
    #[serde(default, deserialize_with = "crate::http::from_str_option")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation: Option<i64>,
    /// Changes whenever the metadata of the current generation is updated.
    #[serde(default, deserialize_with = "crate::http::from_str_option")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metageneration: Option<i64>,
    /// Served as `application/octet-stream` when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_control: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_disposition: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_encoding: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_language: Option<String>,
    #[serde(default, deserialize_with = "crate::http::from_str_option")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    /// Base64, big-endian.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crc32c: Option<String>,
    /// Base64.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub md5_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_created: Option<OffsetDateTime>,
    /// Last metadata change.
    #[serde(default, with = "time::serde::rfc3339::option")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated: Option<OffsetDateTime>,
    /// Only set on noncurrent generations.
    #[serde(default, with = "time::serde::rfc3339::option")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_deleted: Option<OffsetDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_class: Option<String>,
    /// The uploader.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<Owner>,
    /// Only returned with `projection=full`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acl: Option<Vec<AccessControl>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<HashMap<String, String>>,
    /// Set on objects created by compose.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component_count: Option<i32>,
}

/// The writable subset of an object. Only the fields that are set are sent.
#[derive(Clone, PartialEq, Eq, Default, serde::Deserialize, serde::Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ObjectPatchConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acl: Option<Vec<AccessControl>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_control: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_disposition: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_encoding: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<HashMap<String, String>>,
}

/// Metadata of an object being written: its name, the writable fields and the
/// checksums the service validates the content against.
#[derive(Clone, PartialEq, Eq, Default, serde::Deserialize, serde::Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ObjectCreationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub patch: ObjectPatchConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crc32c: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub md5_hash: Option<String>,
}

/// One source of a compose request.
#[derive(Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct SourceObjects {
    /// Resolved in the bucket of the destination.
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation: Option<i64>,
}
