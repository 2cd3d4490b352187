use std::collections::HashMap;

use time::OffsetDateTime;

use crate::http::access_controls::{AccessControl, Owner};

pub mod delete;
pub mod get;
pub mod insert;
pub mod list;
pub mod patch;

/// A bucket.
#[derive(Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize, Default, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Bucket {
    /// The ID of the bucket. For buckets, the `id` and `name` properties are the
    /// same.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// The name of the bucket.
    #[serde(default)]
    pub name: String,
    /// The URI of this bucket.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub self_link: Option<String>,
    /// The project number of the project the bucket belongs to.
    #[serde(default, deserialize_with = "crate::http::from_str_option")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_number: Option<u64>,
    /// The metadata generation of this bucket.
    #[serde(default, deserialize_with = "crate::http::from_str_option")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metageneration: Option<i64>,
    /// HTTP 1.1 Entity tag for the bucket.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
    /// The creation time of the bucket in RFC 3339 format.
    #[serde(default, with = "time::serde::rfc3339::option")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_created: Option<OffsetDateTime>,
    /// The location of the bucket. Object data for objects in the bucket resides
    /// in physical storage within this region.  Defaults to `US`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// The bucket's default storage class, used whenever no storageClass is
    /// specified for a newly-created object.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_class: Option<String>,
    /// The bucket's versioning configuration.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub versioning: Option<Versioning>,
    /// The owner of the bucket. This is always the project team's owner group.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<Owner>,
    /// Access controls on the bucket.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acl: Option<Vec<AccessControl>>,
    /// Default access controls to apply to new objects when no ACL is provided.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_object_acl: Option<Vec<AccessControl>>,
    /// User-provided labels, in key/value pairs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<HashMap<String, String>>,
}

/// Properties of a bucket related to versioning.
#[derive(Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize, Default, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Versioning {
    /// While set to true, versioning is fully enabled for this bucket.
    #[serde(default)]
    pub enabled: bool,
}

/// The writable subset of a bucket that can be changed after creation.
#[derive(Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize, Default, Debug)]
#[serde(rename_all = "camelCase")]
pub struct BucketPatchConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acl: Option<Vec<AccessControl>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_object_acl: Option<Vec<AccessControl>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_class: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<HashMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub versioning: Option<Versioning>,
}

/// The document sent when a bucket is created.
#[derive(Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize, Default, Debug)]
#[serde(rename_all = "camelCase")]
pub struct BucketCreationConfig {
    pub name: String,
    /// The location of the bucket. Defaults to "US" on the service side.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(flatten)]
    pub patch: BucketPatchConfig,
}
