use reqwest::header::RANGE;
use reqwest_middleware::{ClientWithMiddleware as Client, RequestBuilder};

use crate::http::objects::get::GetObjectRequest;
use crate::http::Escape;

/// Byte range of a media download, both ends inclusive.
///
/// `Range(Some(a), None)` reads from `a` to the end and `Range(None, Some(n))` the last
/// `n` bytes. The default reads everything.
#[derive(Default, Clone, Copy, PartialEq, Eq, Debug)]
pub struct Range(pub Option<u64>, pub Option<u64>);

impl Range {
    fn header_value(&self) -> Option<String> {
        match (self.0, self.1) {
            (Some(first), Some(last)) => Some(format!("bytes={first}-{last}")),
            (Some(first), None) => Some(format!("bytes={first}-")),
            (None, Some(suffix)) => Some(format!("bytes=-{suffix}")),
            (None, None) => None,
        }
    }
}

pub(crate) fn build(base_url: &str, client: &Client, req: &GetObjectRequest, range: &Range) -> RequestBuilder {
    let url = format!("{}/b/{}/o/{}?alt=media", base_url, req.bucket.escape(), req.object.escape());
    let builder = client.get(url).query(&req);
    match range.header_value() {
        Some(value) => builder.header(RANGE, value),
        None => builder,
    }
}
