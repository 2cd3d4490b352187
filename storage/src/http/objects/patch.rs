use reqwest_middleware::{ClientWithMiddleware as Client, RequestBuilder};

use crate::http::objects::ObjectPatchConfig;
use crate::http::Escape;

/// `PATCH /b/{bucket}/o/{object}` with the fields to change as the body.
#[derive(Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct PatchObjectRequest {
    #[serde(skip_serializing)]
    pub bucket: String,
    #[serde(skip_serializing)]
    pub object: String,
    pub if_generation_match: Option<i64>,
    pub if_generation_not_match: Option<i64>,
    pub if_metageneration_match: Option<i64>,
    pub if_metageneration_not_match: Option<i64>,
    /// Replaces the ACL with a canned one, e.g. `publicRead`.
    pub predefined_acl: Option<String>,
    pub projection: Option<String>,
    pub fields: Option<String>,
    #[serde(skip_serializing)]
    pub metadata: ObjectPatchConfig,
}

pub(crate) fn build(base_url: &str, client: &Client, req: &PatchObjectRequest) -> RequestBuilder {
    let url = format!("{}/b/{}/o/{}", base_url, req.bucket.escape(), req.object.escape());
    client.patch(url).query(&req).json(&req.metadata)
}
