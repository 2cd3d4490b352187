use reqwest_middleware::{ClientWithMiddleware as Client, RequestBuilder};

use crate::http::objects::ObjectCreationConfig;
use crate::http::Escape;

/// `POST /b/{source_bucket}/o/{source_object}/copyTo/b/{destination_bucket}/o/{destination_object}`
///
/// `if_source_*` apply to the source, the other preconditions to the destination.
#[derive(Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct CopyObjectRequest {
    #[serde(skip_serializing)]
    pub source_bucket: String,
    #[serde(skip_serializing)]
    pub source_object: String,
    #[serde(skip_serializing)]
    pub destination_bucket: String,
    #[serde(skip_serializing)]
    pub destination_object: String,
    /// Copies this generation of the source instead of the live one.
    pub source_generation: Option<i64>,
    pub destination_predefined_acl: Option<String>,
    pub if_generation_match: Option<i64>,
    pub if_generation_not_match: Option<i64>,
    pub if_metageneration_match: Option<i64>,
    pub if_metageneration_not_match: Option<i64>,
    pub if_source_generation_match: Option<i64>,
    pub if_source_generation_not_match: Option<i64>,
    pub if_source_metageneration_match: Option<i64>,
    pub if_source_metageneration_not_match: Option<i64>,
    pub projection: Option<String>,
    pub fields: Option<String>,
    /// Overrides the metadata copied from the source.
    #[serde(skip_serializing)]
    pub metadata: ObjectCreationConfig,
}

pub(crate) fn build(base_url: &str, client: &Client, req: &CopyObjectRequest) -> RequestBuilder {
    let url = format!(
        "{}/b/{}/o/{}/copyTo/b/{}/o/{}",
        base_url,
        req.source_bucket.escape(),
        req.source_object.escape(),
        req.destination_bucket.escape(),
        req.destination_object.escape()
    );
    client.post(url).query(&req).json(&req.metadata)
}
