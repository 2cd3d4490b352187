use reqwest_middleware::{ClientWithMiddleware as Client, RequestBuilder};

use crate::http::objects::{ObjectCreationConfig, SourceObjects};
use crate::http::Escape;

/// Maximum number of source objects accepted by a single compose request.
pub const MAX_COMPOSE_SOURCES: usize = 32;

/// `POST /b/{bucket}/o/{destination_object}/compose`
///
/// The service only accepts equality preconditions on the destination.
#[derive(Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct ComposeObjectRequest {
    /// Holds the sources and the destination.
    #[serde(skip_serializing)]
    pub bucket: String,
    #[serde(skip_serializing)]
    pub destination_object: String,
    pub destination_predefined_acl: Option<String>,
    pub if_generation_match: Option<i64>,
    pub if_metageneration_match: Option<i64>,
    pub fields: Option<String>,
    #[serde(skip_serializing)]
    pub composing_targets: ComposingTargets,
}

/// Body of a compose request.
#[derive(Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct ComposingTargets {
    pub destination: ObjectCreationConfig,
    /// Concatenated in this order.
    pub source_objects: Vec<SourceObjects>,
}

pub(crate) fn build(base_url: &str, client: &Client, req: &ComposeObjectRequest) -> RequestBuilder {
    let bucket = req.bucket.escape();
    let object = req.destination_object.escape();
    client
        .post(format!("{base_url}/b/{bucket}/o/{object}/compose"))
        .query(&req)
        .json(&req.composing_targets)
}
