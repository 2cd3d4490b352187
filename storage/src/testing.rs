//! In-memory storage service for tests.
//!
//! Buckets keep every object generation, so older generations stay readable and can be
//! listed with `versions=true`.

use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use percent_encoding::percent_decode_str;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::Request;
use time::OffsetDateTime;

use crate::bucket::Bucket;
use crate::channel::{DEFAULT_READ_CHUNK_SIZE, DEFAULT_WRITE_CHUNK_SIZE};
use crate::client::{Client, ClientConfig};
use crate::http::buckets::{Bucket as BucketResource, BucketPatchConfig};
use crate::http::objects::compose::ComposingTargets;
use crate::http::objects::{Object, ObjectCreationConfig, ObjectPatchConfig};
use crate::http::transport::{HttpResponse, Transport};
use crate::http::TransportError;
use crate::option::Options;

pub(crate) const ENDPOINT: &str = "https://fake.test";

pub(crate) const PROJECT: &str = "project";

pub(crate) fn client(fake: &FakeStorage) -> Client {
    client_with_chunk_sizes(fake, DEFAULT_READ_CHUNK_SIZE, DEFAULT_WRITE_CHUNK_SIZE)
}

pub(crate) fn client_with_chunk_sizes(fake: &FakeStorage, read: usize, write: usize) -> Client {
    let mut config = ClientConfig::default().with_endpoint(ENDPOINT).with_project_id(PROJECT);
    config.read_chunk_size = read;
    config.write_chunk_size = write;
    Client::with_transport(config, Arc::new(fake.clone()))
}

pub(crate) fn client_without_project(fake: &FakeStorage) -> Client {
    Client::with_transport(ClientConfig::default().with_endpoint(ENDPOINT), Arc::new(fake.clone()))
}

pub(crate) async fn bucket(fake: &FakeStorage, name: &str) -> Bucket {
    client(fake)
        .create_bucket(&Bucket::of(name), &Options::new())
        .await
        .unwrap()
}

#[derive(Clone, Debug)]
pub(crate) struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl RecordedRequest {
    fn from_request(request: &Request) -> Self {
        Self {
            method: request.method().as_str().to_string(),
            path: request.url().path().to_string(),
            query: request
                .url()
                .query_pairs()
                .map(|(k, v)| (k.into_owned(), v.into_owned()))
                .collect(),
            headers: request.headers().clone(),
            body: request
                .body()
                .and_then(|b| b.as_bytes())
                .map(Bytes::copy_from_slice)
                .unwrap_or_default(),
        }
    }

    pub fn query(&self, key: &str) -> Option<String> {
        self.query.iter().find(|(k, _)| k == key).map(|(_, v)| v.clone())
    }

    pub fn header(&self, name: &str) -> Option<String> {
        self.headers.get(name).and_then(|v| v.to_str().ok()).map(str::to_string)
    }

    fn int(&self, key: &str) -> Option<i64> {
        self.query(key).and_then(|v| v.parse().ok())
    }

    fn segments(&self) -> Vec<String> {
        self.path
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| percent_decode_str(s).decode_utf8_lossy().into_owned())
            .collect()
    }
}

enum Injected {
    Status(u16, String),
    Disconnect,
}

struct Version {
    meta: Object,
    data: Vec<u8>,
    live: bool,
}

struct Session {
    bucket: String,
    meta: ObjectCreationConfig,
    content_type: Option<String>,
    data: Vec<u8>,
}

#[derive(Default)]
struct State {
    requests: Vec<RecordedRequest>,
    buckets: BTreeMap<String, BucketResource>,
    objects: BTreeMap<(String, String), Vec<Version>>,
    sessions: HashMap<String, Session>,
    generation: i64,
    session_id: u64,
    injected: VecDeque<Injected>,
    persist_limit: Option<u64>,
}

#[derive(Clone, Default)]
pub(crate) struct FakeStorage {
    state: Arc<Mutex<State>>,
}

impl FakeStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    /// Answers the next request with `status` and `body`.
    pub fn fail_next(&self, status: u16, body: &str) {
        self.state
            .lock()
            .unwrap()
            .injected
            .push_back(Injected::Status(status, body.to_string()));
    }

    /// Fails the next request without a response.
    pub fn disconnect_next(&self) {
        self.state.lock().unwrap().injected.push_back(Injected::Disconnect);
    }

    /// The next upload chunk only persists its first `bytes` bytes.
    pub fn persist_at_most_next(&self, bytes: u64) {
        self.state.lock().unwrap().persist_limit = Some(bytes);
    }
}

#[async_trait::async_trait]
impl Transport for FakeStorage {
    async fn execute(&self, request: Request) -> Result<HttpResponse, TransportError> {
        let request = RecordedRequest::from_request(&request);
        let mut state = self.state.lock().unwrap();
        state.requests.push(request.clone());
        match state.injected.pop_front() {
            Some(Injected::Disconnect) => Err(TransportError::HttpMiddleware(anyhow::anyhow!("connection refused"))),
            Some(Injected::Status(status, body)) => Ok(response(status, Bytes::from(body))),
            None => Ok(state.handle(&request)),
        }
    }
}

fn response(status: u16, body: Bytes) -> HttpResponse {
    HttpResponse {
        status,
        headers: HeaderMap::new(),
        body,
    }
}

fn json<T: serde::Serialize>(status: u16, value: &T) -> HttpResponse {
    response(status, Bytes::from(serde_json::to_vec(value).unwrap()))
}

fn error(code: u16, reason: &str, message: &str) -> HttpResponse {
    json(
        code,
        &serde_json::json!({
            "error": {
                "code": code,
                "message": message,
                "errors": [{"domain": "global", "reason": reason, "message": message}]
            }
        }),
    )
}

fn not_found(what: &str) -> HttpResponse {
    error(404, "notFound", &format!("No such object: {what}"))
}

fn precondition_failed() -> HttpResponse {
    error(412, "conditionNotMet", "At least one of the pre-conditions you specified did not hold.")
}

fn with_header(mut response: HttpResponse, name: &'static str, value: &str) -> HttpResponse {
    if let Ok(value) = HeaderValue::from_str(value) {
        response.headers.insert(name, value);
    }
    response
}

/// Checks `if{prefix}Generation*` and `if{prefix}Metageneration*` against `current`.
fn preconditions_hold(req: &RecordedRequest, prefix: &str, current: Option<&Object>) -> bool {
    let generation = current.and_then(|o| o.generation);
    let metageneration = current.and_then(|o| o.metageneration);
    if let Some(g) = req.int(&format!("if{prefix}GenerationMatch")) {
        if generation.unwrap_or(0) != g {
            return false;
        }
    }
    if let Some(g) = req.int(&format!("if{prefix}GenerationNotMatch")) {
        if generation == Some(g) {
            return false;
        }
    }
    if let Some(m) = req.int(&format!("if{prefix}MetagenerationMatch")) {
        if metageneration != Some(m) {
            return false;
        }
    }
    if let Some(m) = req.int(&format!("if{prefix}MetagenerationNotMatch")) {
        if metageneration == Some(m) {
            return false;
        }
    }
    true
}

fn apply_patch(meta: &mut Object, patch: ObjectPatchConfig) {
    if patch.acl.is_some() {
        meta.acl = patch.acl;
    }
    if patch.cache_control.is_some() {
        meta.cache_control = patch.cache_control;
    }
    if patch.content_disposition.is_some() {
        meta.content_disposition = patch.content_disposition;
    }
    if patch.content_encoding.is_some() {
        meta.content_encoding = patch.content_encoding;
    }
    if patch.content_language.is_some() {
        meta.content_language = patch.content_language;
    }
    if patch.content_type.is_some() {
        meta.content_type = patch.content_type;
    }
    if patch.metadata.is_some() {
        meta.metadata = patch.metadata;
    }
}

fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Splits a `multipart/related` body into `(content type, content)` parts.
fn multipart(req: &RecordedRequest) -> Vec<(String, Vec<u8>)> {
    let Some(boundary) = req
        .header("content-type")
        .and_then(|ct| ct.split_once("boundary=").map(|(_, b)| b.to_string()))
    else {
        return vec![];
    };
    let delimiter = format!("--{boundary}");
    let mut rest: &[u8] = &req.body;
    let mut parts = vec![];
    while let Some(start) = find_subslice(rest, delimiter.as_bytes()) {
        rest = &rest[start + delimiter.len()..];
        if rest.starts_with(b"--") {
            break;
        }
        let Some(end) = find_subslice(rest, delimiter.as_bytes()) else {
            break;
        };
        let part = &rest[..end];
        let part = part.strip_prefix(b"\r\n").unwrap_or(part);
        let part = part.strip_suffix(b"\r\n").unwrap_or(part);
        if let Some(split) = find_subslice(part, b"\r\n\r\n") {
            let headers = String::from_utf8_lossy(&part[..split]);
            let content_type = headers
                .lines()
                .find_map(|l| l.strip_prefix("Content-Type: "))
                .unwrap_or_default()
                .to_string();
            parts.push((content_type, part[split + 4..].to_vec()));
        }
    }
    parts
}

impl State {
    fn handle(&mut self, req: &RecordedRequest) -> HttpResponse {
        let segments = req.segments();
        let s: Vec<&str> = segments.iter().map(String::as_str).collect();
        match (req.method.as_str(), s.as_slice()) {
            ("POST", ["storage", "v1", "b"]) => self.insert_bucket(req),
            ("GET", ["storage", "v1", "b"]) => self.list_buckets(req),
            ("GET", ["storage", "v1", "b", b]) => self.get_bucket(req, b),
            ("PATCH", ["storage", "v1", "b", b]) => self.patch_bucket(req, b),
            ("DELETE", ["storage", "v1", "b", b]) => self.delete_bucket(req, b),
            ("GET", ["storage", "v1", "b", b, "o"]) => self.list_objects(req, b),
            ("GET", ["storage", "v1", "b", b, "o", o]) => {
                if req.query("alt").as_deref() == Some("media") {
                    self.download(req, b, o)
                } else {
                    self.get_object(req, b, o)
                }
            }
            ("PATCH", ["storage", "v1", "b", b, "o", o]) => self.patch_object(req, b, o),
            ("DELETE", ["storage", "v1", "b", b, "o", o]) => self.delete_object(req, b, o),
            ("POST", ["storage", "v1", "b", b, "o", o, "compose"]) => self.compose(req, b, o),
            ("POST", ["storage", "v1", "b", sb, "o", so, "copyTo", "b", db, "o", dobj]) => {
                self.copy(req, sb, so, db, dobj)
            }
            ("POST", ["upload", "storage", "v1", "b", b, "o"]) => match req.query("uploadType").as_deref() {
                Some("multipart") => self.upload_multipart(req, b),
                Some("resumable") => self.start_session(req, b),
                _ => error(400, "invalid", "unsupported upload type"),
            },
            ("PUT", ["upload", "session", id]) => self.upload_chunk(req, id),
            ("DELETE", ["upload", "session", id]) => {
                self.sessions.remove(*id);
                response(499, Bytes::new())
            }
            _ => error(404, "notFound", "Not Found"),
        }
    }

    fn insert_bucket(&mut self, req: &RecordedRequest) -> HttpResponse {
        let Ok(mut bucket) = serde_json::from_slice::<BucketResource>(&req.body) else {
            return error(400, "invalid", "invalid bucket");
        };
        if self.buckets.contains_key(&bucket.name) {
            return error(409, "conflict", "You already own this bucket. Please select another name.");
        }
        bucket.id = Some(bucket.name.clone());
        bucket.self_link = Some(format!("{ENDPOINT}/storage/v1/b/{}", bucket.name));
        bucket.project_number = Some(123456789);
        bucket.metageneration = Some(1);
        bucket.etag = Some("CAE=".to_string());
        bucket.time_created = Some(OffsetDateTime::now_utc());
        bucket.location = bucket.location.or_else(|| Some("US".to_string()));
        bucket.storage_class = bucket.storage_class.or_else(|| Some("STANDARD".to_string()));
        self.buckets.insert(bucket.name.clone(), bucket.clone());
        json(200, &bucket)
    }

    fn list_buckets(&mut self, req: &RecordedRequest) -> HttpResponse {
        let prefix = req.query("prefix").unwrap_or_default();
        let matched: Vec<&BucketResource> = self.buckets.values().filter(|b| b.name.starts_with(&prefix)).collect();
        let (items, next_page_token) = page(req, &matched);
        json(
            200,
            &serde_json::json!({
                "kind": "storage#buckets",
                "items": items,
                "nextPageToken": next_page_token,
            }),
        )
    }

    fn bucket_condition(req: &RecordedRequest, bucket: &BucketResource) -> bool {
        let meta = Object {
            metageneration: bucket.metageneration,
            ..Default::default()
        };
        preconditions_hold(req, "", Some(&meta))
    }

    fn get_bucket(&mut self, req: &RecordedRequest, name: &str) -> HttpResponse {
        match self.buckets.get(name) {
            None => not_found(name),
            Some(b) if !Self::bucket_condition(req, b) => precondition_failed(),
            Some(b) => json(200, b),
        }
    }

    fn patch_bucket(&mut self, req: &RecordedRequest, name: &str) -> HttpResponse {
        let Ok(patch) = serde_json::from_slice::<BucketPatchConfig>(&req.body) else {
            return error(400, "invalid", "invalid bucket patch");
        };
        let Some(bucket) = self.buckets.get_mut(name) else {
            return not_found(name);
        };
        if !Self::bucket_condition(req, bucket) {
            return precondition_failed();
        }
        if patch.acl.is_some() {
            bucket.acl = patch.acl;
        }
        if patch.default_object_acl.is_some() {
            bucket.default_object_acl = patch.default_object_acl;
        }
        if patch.storage_class.is_some() {
            bucket.storage_class = patch.storage_class;
        }
        if patch.labels.is_some() {
            bucket.labels = patch.labels;
        }
        if patch.versioning.is_some() {
            bucket.versioning = patch.versioning;
        }
        bucket.metageneration = bucket.metageneration.map(|m| m + 1);
        json(200, bucket)
    }

    fn delete_bucket(&mut self, req: &RecordedRequest, name: &str) -> HttpResponse {
        let Some(bucket) = self.buckets.get(name) else {
            return not_found(name);
        };
        if !Self::bucket_condition(req, bucket) {
            return precondition_failed();
        }
        let in_use = self
            .objects
            .iter()
            .any(|((b, _), versions)| b == name && versions.iter().any(|v| v.live));
        if in_use {
            return error(409, "conflict", "The bucket you tried to delete is not empty.");
        }
        self.buckets.remove(name);
        response(204, Bytes::new())
    }

    fn live(&self, bucket: &str, name: &str) -> Option<&Version> {
        self.objects
            .get(&(bucket.to_string(), name.to_string()))
            .and_then(|versions| versions.iter().find(|v| v.live))
    }

    fn selected(&self, req: &RecordedRequest, bucket: &str, name: &str, key: &str) -> Option<&Version> {
        match req.int(key) {
            Some(generation) => self
                .objects
                .get(&(bucket.to_string(), name.to_string()))
                .and_then(|versions| versions.iter().find(|v| v.meta.generation == Some(generation))),
            None => self.live(bucket, name),
        }
    }

    fn get_object(&mut self, req: &RecordedRequest, bucket: &str, name: &str) -> HttpResponse {
        match self.selected(req, bucket, name, "generation") {
            None => not_found(&format!("{bucket}/{name}")),
            Some(v) if !preconditions_hold(req, "", Some(&v.meta)) => precondition_failed(),
            Some(v) => json(200, &v.meta),
        }
    }

    fn download(&mut self, req: &RecordedRequest, bucket: &str, name: &str) -> HttpResponse {
        let Some(v) = self.selected(req, bucket, name, "generation") else {
            return not_found(&format!("{bucket}/{name}"));
        };
        if !preconditions_hold(req, "", Some(&v.meta)) {
            return precondition_failed();
        }
        let generation = v.meta.generation.unwrap_or_default().to_string();
        let len = v.data.len() as u64;
        let range = req
            .header("range")
            .and_then(|r| r.strip_prefix("bytes=").map(str::to_string))
            .and_then(|r| {
                let (first, last) = r.split_once('-')?;
                Some((first.parse::<u64>().ok()?, last.parse::<u64>().ok()))
            });
        let served = match range {
            None => response(200, Bytes::from(v.data.clone())),
            Some((first, _)) if first >= len => {
                error(416, "requestedRangeNotSatisfiable", "Requested range not satisfiable")
            }
            Some((first, last)) => {
                let last = last.unwrap_or(len - 1).min(len - 1);
                response(206, Bytes::copy_from_slice(&v.data[first as usize..=last as usize]))
            }
        };
        with_header(served, "x-goog-generation", &generation)
    }

    fn patch_object(&mut self, req: &RecordedRequest, bucket: &str, name: &str) -> HttpResponse {
        let Ok(patch) = serde_json::from_slice::<ObjectPatchConfig>(&req.body) else {
            return error(400, "invalid", "invalid object patch");
        };
        let Some(v) = self
            .objects
            .get_mut(&(bucket.to_string(), name.to_string()))
            .and_then(|versions| versions.iter_mut().find(|v| v.live))
        else {
            return not_found(&format!("{bucket}/{name}"));
        };
        if !preconditions_hold(req, "", Some(&v.meta)) {
            return precondition_failed();
        }
        apply_patch(&mut v.meta, patch);
        v.meta.metageneration = v.meta.metageneration.map(|m| m + 1);
        v.meta.updated = Some(OffsetDateTime::now_utc());
        json(200, &v.meta)
    }

    fn delete_object(&mut self, req: &RecordedRequest, bucket: &str, name: &str) -> HttpResponse {
        let Some(v) = self
            .objects
            .get_mut(&(bucket.to_string(), name.to_string()))
            .and_then(|versions| versions.iter_mut().find(|v| v.live))
        else {
            return not_found(&format!("{bucket}/{name}"));
        };
        if !preconditions_hold(req, "", Some(&v.meta)) {
            return precondition_failed();
        }
        v.live = false;
        v.meta.time_deleted = Some(OffsetDateTime::now_utc());
        response(204, Bytes::new())
    }

    fn list_objects(&mut self, req: &RecordedRequest, bucket: &str) -> HttpResponse {
        if !self.buckets.contains_key(bucket) {
            return not_found(bucket);
        }
        let prefix = req.query("prefix").unwrap_or_default();
        let delimiter = req.query("delimiter");
        let versions = req.query("versions").as_deref() == Some("true");

        // names and prefixes are listed in one ordered sequence
        let mut entries: BTreeMap<(String, i64), serde_json::Value> = BTreeMap::new();
        let mut prefixes = BTreeSet::new();
        for ((b, name), stored) in &self.objects {
            if b != bucket || !name.starts_with(&prefix) {
                continue;
            }
            if let Some(d) = &delimiter {
                if let Some(pos) = name[prefix.len()..].find(d.as_str()) {
                    let p = name[..prefix.len() + pos + d.len()].to_string();
                    if stored.iter().any(|v| v.live || versions) && prefixes.insert(p.clone()) {
                        entries.insert((p.clone(), 0), serde_json::Value::String(p));
                    }
                    continue;
                }
            }
            for v in stored.iter().filter(|v| v.live || versions) {
                let key = (name.clone(), v.meta.generation.unwrap_or_default());
                entries.insert(key, serde_json::to_value(&v.meta).unwrap());
            }
        }
        let entries: Vec<serde_json::Value> = entries.into_values().collect();
        let (page_entries, next_page_token) = page(req, &entries);
        let mut items = vec![];
        let mut page_prefixes = vec![];
        for entry in page_entries {
            match entry {
                serde_json::Value::String(p) => page_prefixes.push(p),
                item => items.push(item),
            }
        }
        json(
            200,
            &serde_json::json!({
                "kind": "storage#objects",
                "items": items,
                "prefixes": page_prefixes,
                "nextPageToken": next_page_token,
            }),
        )
    }

    fn store(&mut self, bucket: &str, name: &str, mut meta: Object, data: Vec<u8>) -> Object {
        self.generation += 1;
        let generation = 1_700_000_000_000_000 + self.generation;
        let now = OffsetDateTime::now_utc();
        meta.name = name.to_string();
        meta.bucket = bucket.to_string();
        meta.id = Some(format!("{bucket}/{name}/{generation}"));
        meta.self_link = Some(format!("{ENDPOINT}/storage/v1/b/{bucket}/o/{name}"));
        meta.media_link = Some(format!(
            "{ENDPOINT}/download/storage/v1/b/{bucket}/o/{name}?generation={generation}&alt=media"
        ));
        meta.generation = Some(generation);
        meta.metageneration = Some(1);
        meta.size = Some(data.len() as u64);
        meta.etag = Some(format!("CL{generation}"));
        meta.time_created = Some(now);
        meta.updated = Some(now);
        meta.storage_class = Some("STANDARD".to_string());
        let versions = self.objects.entry((bucket.to_string(), name.to_string())).or_default();
        for v in versions.iter_mut() {
            v.live = false;
        }
        versions.push(Version {
            meta: meta.clone(),
            data,
            live: true,
        });
        meta
    }

    fn creation_meta(config: ObjectCreationConfig, content_type: Option<String>) -> Object {
        let mut meta = Object {
            crc32c: config.crc32c,
            md5_hash: config.md5_hash,
            ..Default::default()
        };
        apply_patch(&mut meta, config.patch);
        if meta.content_type.is_none() {
            meta.content_type = content_type;
        }
        meta
    }

    fn upload_multipart(&mut self, req: &RecordedRequest, bucket: &str) -> HttpResponse {
        if !self.buckets.contains_key(bucket) {
            return not_found(bucket);
        }
        let mut parts = multipart(req).into_iter();
        let (Some((_, metadata)), Some((content_type, data))) = (parts.next(), parts.next()) else {
            return error(400, "invalid", "multipart body must have two parts");
        };
        let Ok(config) = serde_json::from_slice::<ObjectCreationConfig>(&metadata) else {
            return error(400, "invalid", "invalid object metadata");
        };
        let Some(name) = config.name.clone() else {
            return error(400, "required", "object name is required");
        };
        if !preconditions_hold(req, "", self.live(bucket, &name).map(|v| &v.meta)) {
            return precondition_failed();
        }
        let meta = Self::creation_meta(config, Some(content_type));
        let stored = self.store(bucket, &name, meta, data);
        json(200, &stored)
    }

    fn compose(&mut self, req: &RecordedRequest, bucket: &str, name: &str) -> HttpResponse {
        let Ok(targets) = serde_json::from_slice::<ComposingTargets>(&req.body) else {
            return error(400, "invalid", "invalid compose request");
        };
        let mut data = vec![];
        for source in &targets.source_objects {
            let found = self
                .objects
                .get(&(bucket.to_string(), source.name.clone()))
                .and_then(|versions| match source.generation {
                    Some(g) => versions.iter().find(|v| v.meta.generation == Some(g)),
                    None => versions.iter().find(|v| v.live),
                });
            match found {
                Some(v) => data.extend_from_slice(&v.data),
                None => return not_found(&format!("{bucket}/{}", source.name)),
            }
        }
        if !preconditions_hold(req, "", self.live(bucket, name).map(|v| &v.meta)) {
            return precondition_failed();
        }
        let mut meta = Self::creation_meta(targets.destination, None);
        meta.component_count = Some(targets.source_objects.len() as i32);
        let stored = self.store(bucket, name, meta, data);
        json(200, &stored)
    }

    fn copy(&mut self, req: &RecordedRequest, sb: &str, so: &str, db: &str, dobj: &str) -> HttpResponse {
        let Some(source) = self.selected(req, sb, so, "sourceGeneration") else {
            return not_found(&format!("{sb}/{so}"));
        };
        if !preconditions_hold(req, "Source", Some(&source.meta)) {
            return precondition_failed();
        }
        let source_content_type = source.meta.content_type.clone();
        let data = source.data.clone();
        if !self.buckets.contains_key(db) {
            return not_found(db);
        }
        if !preconditions_hold(req, "", self.live(db, dobj).map(|v| &v.meta)) {
            return precondition_failed();
        }
        let config = serde_json::from_slice::<ObjectCreationConfig>(&req.body).unwrap_or_default();
        let meta = Self::creation_meta(config, source_content_type);
        let stored = self.store(db, dobj, meta, data);
        json(200, &stored)
    }

    fn start_session(&mut self, req: &RecordedRequest, bucket: &str) -> HttpResponse {
        if !self.buckets.contains_key(bucket) {
            return not_found(bucket);
        }
        let Ok(meta) = serde_json::from_slice::<ObjectCreationConfig>(&req.body) else {
            return error(400, "invalid", "invalid object metadata");
        };
        let Some(name) = meta.name.clone() else {
            return error(400, "required", "object name is required");
        };
        if !preconditions_hold(req, "", self.live(bucket, &name).map(|v| &v.meta)) {
            return precondition_failed();
        }
        self.session_id += 1;
        let id = self.session_id.to_string();
        self.sessions.insert(
            id.clone(),
            Session {
                bucket: bucket.to_string(),
                meta,
                content_type: req.header("x-upload-content-type"),
                data: vec![],
            },
        );
        with_header(response(200, Bytes::new()), "location", &format!("{ENDPOINT}/upload/session/{id}"))
    }

    fn upload_chunk(&mut self, req: &RecordedRequest, id: &str) -> HttpResponse {
        let Some(content_range) = req.header("content-range") else {
            return error(400, "invalid", "Content-Range is required");
        };
        let Some((range, total)) = content_range
            .strip_prefix("bytes ")
            .and_then(|r| r.split_once('/'))
            .map(|(r, t)| (r.to_string(), t.parse::<u64>().ok()))
        else {
            return error(400, "invalid", "invalid Content-Range");
        };
        let limit = self.persist_limit.take();
        let Some(session) = self.sessions.get_mut(id) else {
            return error(404, "notFound", "No such upload session");
        };
        if range != "*" {
            let Some(first) = range.split_once('-').and_then(|(f, _)| f.parse::<u64>().ok()) else {
                return error(400, "invalid", "invalid Content-Range");
            };
            let persisted = session.data.len() as u64;
            if first > persisted {
                return error(400, "invalid", "chunk does not continue the upload");
            }
            let skip = (persisted - first) as usize;
            let mut chunk = req.body.get(skip..).unwrap_or_default();
            if let Some(limit) = limit {
                chunk = &chunk[..chunk.len().min(limit as usize)];
            }
            session.data.extend_from_slice(chunk);
        }
        let persisted = session.data.len() as u64;
        if total == Some(persisted) {
            let Some(session) = self.sessions.remove(id) else {
                return error(404, "notFound", "No such upload session");
            };
            let Some(name) = session.meta.name.clone() else {
                return error(400, "required", "object name is required");
            };
            let meta = Self::creation_meta(session.meta, session.content_type);
            let stored = self.store(&session.bucket, &name, meta, session.data);
            return json(200, &stored);
        }
        let incomplete = response(308, Bytes::new());
        if persisted == 0 {
            incomplete
        } else {
            with_header(incomplete, "range", &format!("bytes=0-{}", persisted - 1))
        }
    }
}

/// Pages `entries` with the numeric `pageToken` and `maxResults` of the request.
fn page<T: Clone>(req: &RecordedRequest, entries: &[T]) -> (Vec<T>, Option<String>) {
    let start = req
        .query("pageToken")
        .and_then(|t| t.parse::<usize>().ok())
        .unwrap_or(0)
        .min(entries.len());
    let max = req
        .int("maxResults")
        .map(|m| m.max(1) as usize)
        .unwrap_or(1000);
    let end = (start + max).min(entries.len());
    let next = (end < entries.len()).then(|| end.to_string());
    (entries[start..end].to_vec(), next)
}
