use reqwest_middleware::{ClientWithMiddleware as Client, RequestBuilder};

use crate::http::buckets::Bucket;

/// Query of `GET /b`.
#[derive(Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct ListBucketsRequest {
    pub project: String,
    /// Page size, capped at 1000 by the service.
    pub max_results: Option<i64>,
    pub page_token: Option<String>,
    pub prefix: Option<String>,
    pub projection: Option<String>,
    pub fields: Option<String>,
}

#[derive(Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct ListBucketsResponse {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<Bucket>,
    /// Absent on the last page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
}

pub(crate) fn build(base_url: &str, client: &Client, req: &ListBucketsRequest) -> RequestBuilder {
    let url = format!("{base_url}/b");
    client.get(url).query(&req)
}
