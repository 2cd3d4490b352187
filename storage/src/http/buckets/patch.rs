use reqwest_middleware::{ClientWithMiddleware as Client, RequestBuilder};

use crate::http::buckets::BucketPatchConfig;
use crate::http::Escape;

/// Request for PatchBucket method.
#[derive(Clone, PartialEq, Eq, Default, serde::Deserialize, serde::Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct PatchBucketRequest {
    /// Required. Name of a bucket.
    #[serde(skip_serializing)]
    pub bucket: String,
    /// If set, only patches the bucket if its metageneration matches this value.
    pub if_metageneration_match: Option<i64>,
    /// If set, only patches the bucket if its metageneration does not match this
    /// value.
    pub if_metageneration_not_match: Option<i64>,
    /// Apply a predefined set of access controls to this bucket.
    pub predefined_acl: Option<String>,
    /// Apply a predefined set of default object access controls to this bucket.
    pub predefined_default_object_acl: Option<String>,
    /// Set of properties to return. Defaults to `full`.
    pub projection: Option<String>,
    /// Selector specifying which fields to include in a partial response.
    pub fields: Option<String>,
    /// The Bucket metadata for updating.
    #[serde(skip_serializing)]
    pub metadata: BucketPatchConfig,
}

pub(crate) fn build(base_url: &str, client: &Client, req: &PatchBucketRequest) -> RequestBuilder {
    let url = format!("{}/b/{}", base_url, req.bucket.escape());
    client.patch(url).query(&req).json(&req.metadata)
}
