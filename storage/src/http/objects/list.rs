use reqwest_middleware::{ClientWithMiddleware as Client, RequestBuilder};

use crate::http::objects::Object;
use crate::http::Escape;

/// Query of `GET /b/{bucket}/o`.
#[derive(Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct ListObjectsRequest {
    #[serde(skip_serializing)]
    pub bucket: String,
    /// Names containing the delimiter after `prefix` are folded into `prefixes`.
    pub delimiter: Option<String>,
    /// Upper bound on items and prefixes together. A page may hold fewer.
    pub max_results: Option<i64>,
    pub page_token: Option<String>,
    pub prefix: Option<String>,
    pub projection: Option<String>,
    /// Include noncurrent generations.
    pub versions: Option<bool>,
    pub fields: Option<String>,
}

#[derive(Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct ListObjectsResponse {
    /// Folded names, each ending with the delimiter.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub prefixes: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<Object>,
    /// Absent on the last page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
}

pub(crate) fn build(base_url: &str, client: &Client, req: &ListObjectsRequest) -> RequestBuilder {
    let url = format!("{}/b/{}/o", base_url, req.bucket.escape());
    client.get(url).query(&req)
}
