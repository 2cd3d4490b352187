use reqwest_middleware::{ClientWithMiddleware as Client, RequestBuilder};

use crate::http::buckets::BucketCreationConfig;

/// Query parameters of InsertBucket.
#[derive(Clone, PartialEq, Eq, Default, serde::Deserialize, serde::Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct InsertBucketParam {
    /// Required. A valid API project identifier.
    pub project: String,
    /// Apply a predefined set of access controls to this bucket.
    pub predefined_acl: Option<String>,
    /// Apply a predefined set of default object access controls to this bucket.
    pub predefined_default_object_acl: Option<String>,
    /// Set of properties to return. Defaults to `noAcl`.
    pub projection: Option<String>,
    /// Selector specifying which fields to include in a partial response.
    pub fields: Option<String>,
}

/// Request message for InsertBucket.
#[derive(Clone, PartialEq, Eq, Default, serde::Deserialize, serde::Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct InsertBucketRequest {
    #[serde(skip_serializing)]
    pub param: InsertBucketParam,
    #[serde(flatten)]
    pub bucket: BucketCreationConfig,
}

pub(crate) fn build(base_url: &str, client: &Client, req: &InsertBucketRequest) -> RequestBuilder {
    let url = format!("{base_url}/b");
    client.post(url).query(&req.param).json(&req.bucket)
}
