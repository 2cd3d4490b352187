use std::sync::Arc;

use futures_util::{stream, Stream, TryStreamExt};
use reqwest_middleware::{ClientWithMiddleware as Client, RequestBuilder};
use serde::de::DeserializeOwned;

use crate::blob::Blob;
use crate::bucket::Bucket;
use crate::channel::{BlobReadChannel, BlobWriteChannel};
use crate::error::{Error, ServiceError, UNKNOWN_CODE};
use crate::http::buckets::delete::{DeleteBucketParam, DeleteBucketRequest};
use crate::http::buckets::get::GetBucketRequest;
use crate::http::buckets::insert::{InsertBucketParam, InsertBucketRequest};
use crate::http::buckets::list::{ListBucketsRequest, ListBucketsResponse};
use crate::http::buckets::patch::PatchBucketRequest;
use crate::http::buckets::{Bucket as BucketResource, BucketCreationConfig, BucketPatchConfig};
use crate::http::objects::compose::{ComposeObjectRequest, ComposingTargets, MAX_COMPOSE_SOURCES};
use crate::http::objects::copy::CopyObjectRequest;
use crate::http::objects::delete::DeleteObjectRequest;
use crate::http::objects::download::Range;
use crate::http::objects::get::GetObjectRequest;
use crate::http::objects::list::{ListObjectsRequest, ListObjectsResponse};
use crate::http::objects::patch::PatchObjectRequest;
use crate::http::objects::upload::{UploadObjectRequest, UploadType, DEFAULT_CONTENT_TYPE};
use crate::http::objects::{Object, ObjectCreationConfig, ObjectPatchConfig, SourceObjects};
use crate::http::resumable_upload_client::ResumableUploadClient;
use crate::http::transport::{HttpResponse, Transport};
use crate::http::{buckets, check_response_status, objects, TransportError};
use crate::option::{Options, StorageOption};

/// One page of an object listing.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct ObjectPage {
    pub blobs: Vec<Blob>,
    /// Names truncated at the delimiter, when one was requested.
    pub prefixes: Vec<String>,
    /// Pass as [`StorageOption::PageToken`] to fetch the next page.
    pub next_page_token: Option<String>,
}

#[derive(Clone)]
pub struct StorageClient {
    transport: Arc<dyn Transport>,
    http: Client,
    v1_endpoint: String,
    v1_upload_endpoint: String,
    project_id: Option<String>,
    read_chunk_size: usize,
    write_chunk_size: usize,
}

impl StorageClient {
    pub(crate) fn new(
        transport: Arc<dyn Transport>,
        http: Client,
        endpoint: &str,
        project_id: Option<String>,
        read_chunk_size: usize,
        write_chunk_size: usize,
    ) -> Self {
        Self {
            transport,
            http,
            v1_endpoint: format!("{endpoint}/storage/v1"),
            v1_upload_endpoint: format!("{endpoint}/upload/storage/v1"),
            project_id,
            read_chunk_size,
            write_chunk_size,
        }
    }

    pub fn project_id(&self) -> Option<&str> {
        self.project_id.as_deref()
    }

    fn project(&self) -> Result<String, Error> {
        self.project_id
            .clone()
            .ok_or_else(|| Error::invalid("project id is required"))
    }

    /// Creates a new bucket in the configured project.
    ///
    /// ```
    /// use gcloud_storage_rpc::bucket::Bucket;
    /// use gcloud_storage_rpc::client::Client;
    /// use gcloud_storage_rpc::option::{Options, StorageOption};
    ///
    /// async fn run(client: Client) {
    ///     let bucket = Bucket::builder("bucket").location("ASIA-NORTHEAST1").build().unwrap();
    ///     let options = Options::new().with(StorageOption::PredefinedAcl, "projectPrivate");
    ///     let result = client.create_bucket(&bucket, &options).await;
    /// }
    /// ```
    #[cfg_attr(feature = "trace", tracing::instrument(skip_all))]
    pub async fn create_bucket(&self, bucket: &Bucket, options: &Options) -> Result<Bucket, Error> {
        let req = InsertBucketRequest {
            param: InsertBucketParam {
                project: self.project()?,
                predefined_acl: options.string(StorageOption::PredefinedAcl)?,
                predefined_default_object_acl: options.string(StorageOption::PredefinedDefaultObjectAcl)?,
                projection: options.projection()?,
                fields: options.fields(&["name"])?,
            },
            bucket: BucketCreationConfig::from(bucket),
        };
        let builder = buckets::insert::build(self.v1_endpoint.as_str(), &self.http, &req);
        self.send::<BucketResource>(builder).await.map(Bucket::from)
    }

    /// Uploads an object with its metadata in a single request.
    ///
    /// ```
    /// use gcloud_storage_rpc::blob::Blob;
    /// use gcloud_storage_rpc::client::Client;
    /// use gcloud_storage_rpc::option::Options;
    ///
    /// async fn run(client: Client) {
    ///     let blob = Blob::builder("bucket", "file.png").content_type("image/png").build().unwrap();
    ///     let result = client.create_object(&blob, &[0x89, 0x50, 0x4e, 0x47], &Options::new()).await;
    /// }
    /// ```
    #[cfg_attr(feature = "trace", tracing::instrument(skip_all))]
    pub async fn create_object(&self, blob: &Blob, content: &[u8], options: &Options) -> Result<Blob, Error> {
        let req = self.upload_request(blob, UploadType::Multipart, options)?;
        let content_type = blob.content_type().unwrap_or(DEFAULT_CONTENT_TYPE);
        let builder = objects::upload::build_multipart(
            self.v1_upload_endpoint.as_str(),
            &self.http,
            &req,
            &ObjectCreationConfig::from(blob),
            content_type,
            content,
        )?;
        self.send::<Object>(builder).await.map(Blob::from)
    }

    /// Lists the buckets of the configured project, following page tokens until the
    /// listing is exhausted. Pages are fetched as the stream is polled.
    ///
    /// ```
    /// use futures_util::TryStreamExt;
    /// use gcloud_storage_rpc::client::Client;
    /// use gcloud_storage_rpc::option::{Options, StorageOption};
    ///
    /// async fn run(client: Client) {
    ///     let options = Options::new().with(StorageOption::Prefix, "logs-");
    ///     let buckets: Vec<_> = client.list_buckets(&options).unwrap().try_collect().await.unwrap();
    /// }
    /// ```
    #[cfg_attr(feature = "trace", tracing::instrument(skip_all))]
    pub fn list_buckets(
        &self,
        options: &Options,
    ) -> Result<impl Stream<Item = Result<Bucket, Error>> + Send + '_, Error> {
        let first = ListBucketsRequest {
            project: self.project()?,
            max_results: options.long(StorageOption::MaxResults)?,
            page_token: options.string(StorageOption::PageToken)?,
            prefix: options.string(StorageOption::Prefix)?,
            projection: options.projection()?,
            fields: options.string(StorageOption::Fields)?,
        };
        let pages = stream::try_unfold(Some(first), move |state: Option<ListBucketsRequest>| async move {
            let Some(req) = state else {
                return Ok::<_, Error>(None);
            };
            let builder = buckets::list::build(self.v1_endpoint.as_str(), &self.http, &req);
            let page = self.send::<ListBucketsResponse>(builder).await?;
            let next = page.next_page_token.map(|token| ListBucketsRequest {
                page_token: Some(token),
                ..req
            });
            let items = stream::iter(page.items.into_iter().map(|b| Ok::<_, Error>(Bucket::from(b))));
            Ok(Some((items, next)))
        });
        Ok(pages.try_flatten())
    }

    /// Lists one page of the objects of a bucket.
    ///
    /// ```
    /// use gcloud_storage_rpc::client::Client;
    /// use gcloud_storage_rpc::option::{Options, StorageOption};
    ///
    /// async fn run(client: Client) {
    ///     let options = Options::new()
    ///         .with(StorageOption::Prefix, "photos/")
    ///         .with(StorageOption::Delimiter, "/");
    ///     let page = client.list_objects("bucket", &options).await.unwrap();
    ///     for prefix in page.prefixes {
    ///         println!("{prefix}");
    ///     }
    /// }
    /// ```
    #[cfg_attr(feature = "trace", tracing::instrument(skip_all))]
    pub async fn list_objects(&self, bucket: &str, options: &Options) -> Result<ObjectPage, Error> {
        let req = ListObjectsRequest {
            bucket: bucket.to_string(),
            delimiter: options.string(StorageOption::Delimiter)?,
            max_results: options.long(StorageOption::MaxResults)?,
            page_token: options.string(StorageOption::PageToken)?,
            prefix: options.string(StorageOption::Prefix)?,
            projection: options.projection()?,
            versions: options.boolean(StorageOption::Versions)?,
            fields: options.string(StorageOption::Fields)?,
        };
        let builder = objects::list::build(self.v1_endpoint.as_str(), &self.http, &req);
        let page = self.send::<ListObjectsResponse>(builder).await?;
        Ok(ObjectPage {
            blobs: page.items.into_iter().map(Blob::from).collect(),
            prefixes: page.prefixes,
            next_page_token: page.next_page_token,
        })
    }

    /// Gets the bucket. Only `IfMetagenerationMatch` applies.
    #[cfg_attr(feature = "trace", tracing::instrument(skip_all))]
    pub async fn get_bucket(&self, bucket: &Bucket, options: &Options) -> Result<Bucket, Error> {
        let (if_metageneration_match, if_metageneration_not_match) =
            options.metageneration_conditions(bucket.metageneration())?;
        let req = GetBucketRequest {
            bucket: bucket.name().to_string(),
            if_metageneration_match,
            if_metageneration_not_match,
            projection: options.projection()?,
            fields: options.fields(&["name"])?,
        };
        let builder = buckets::get::build(self.v1_endpoint.as_str(), &self.http, &req);
        self.send::<BucketResource>(builder).await.map(Bucket::from)
    }

    /// Gets the current metadata of the object.
    #[cfg_attr(feature = "trace", tracing::instrument(skip_all))]
    pub async fn get_object(&self, blob: &Blob, options: &Options) -> Result<Blob, Error> {
        let req = self.get_request(blob, options)?;
        let builder = objects::get::build(self.v1_endpoint.as_str(), &self.http, &req);
        self.send::<Object>(builder).await.map(Blob::from)
    }

    /// Updates the writable fields set on `bucket`.
    #[cfg_attr(feature = "trace", tracing::instrument(skip_all))]
    pub async fn patch_bucket(&self, bucket: &Bucket, options: &Options) -> Result<Bucket, Error> {
        let (if_metageneration_match, if_metageneration_not_match) =
            options.metageneration_conditions(bucket.metageneration())?;
        let req = PatchBucketRequest {
            bucket: bucket.name().to_string(),
            if_metageneration_match,
            if_metageneration_not_match,
            predefined_acl: options.string(StorageOption::PredefinedAcl)?,
            predefined_default_object_acl: options.string(StorageOption::PredefinedDefaultObjectAcl)?,
            projection: options.projection()?,
            fields: options.fields(&["name"])?,
            metadata: BucketPatchConfig::from(bucket),
        };
        let builder = buckets::patch::build(self.v1_endpoint.as_str(), &self.http, &req);
        self.send::<BucketResource>(builder).await.map(Bucket::from)
    }

    /// Updates the writable fields set on `blob`.
    ///
    /// ```
    /// use gcloud_storage_rpc::blob::Blob;
    /// use gcloud_storage_rpc::client::Client;
    /// use gcloud_storage_rpc::option::{Options, StorageOption};
    ///
    /// async fn run(client: Client, blob: Blob) {
    ///     let changed = blob.to_builder().content_type("application/json").build().unwrap();
    ///     let options = Options::new().with(StorageOption::IfMetagenerationMatch, true);
    ///     let result = client.patch_object(&changed, &options).await;
    /// }
    /// ```
    #[cfg_attr(feature = "trace", tracing::instrument(skip_all))]
    pub async fn patch_object(&self, blob: &Blob, options: &Options) -> Result<Blob, Error> {
        let c = options.conditions(blob.generation(), blob.metageneration())?;
        let req = PatchObjectRequest {
            bucket: blob.bucket().to_string(),
            object: blob.name().to_string(),
            if_generation_match: c.if_generation_match,
            if_generation_not_match: c.if_generation_not_match,
            if_metageneration_match: c.if_metageneration_match,
            if_metageneration_not_match: c.if_metageneration_not_match,
            predefined_acl: options.string(StorageOption::PredefinedAcl)?,
            projection: options.projection()?,
            fields: options.fields(&["bucket", "name"])?,
            metadata: ObjectPatchConfig::from(blob),
        };
        let builder = objects::patch::build(self.v1_endpoint.as_str(), &self.http, &req);
        self.send::<Object>(builder).await.map(Blob::from)
    }

    /// Deletes the bucket. Only `IfMetagenerationMatch` applies.
    #[cfg_attr(feature = "trace", tracing::instrument(skip_all))]
    pub async fn delete_bucket(&self, bucket: &Bucket, options: &Options) -> Result<(), Error> {
        let (if_metageneration_match, if_metageneration_not_match) =
            options.metageneration_conditions(bucket.metageneration())?;
        let req = DeleteBucketRequest {
            bucket: bucket.name().to_string(),
            param: DeleteBucketParam {
                if_metageneration_match,
                if_metageneration_not_match,
            },
        };
        let builder = buckets::delete::build(self.v1_endpoint.as_str(), &self.http, &req);
        self.send_get_empty(builder).await
    }

    /// Deletes the live version of the object.
    #[cfg_attr(feature = "trace", tracing::instrument(skip_all))]
    pub async fn delete_object(&self, blob: &Blob, options: &Options) -> Result<(), Error> {
        let c = options.conditions(blob.generation(), blob.metageneration())?;
        let req = DeleteObjectRequest {
            bucket: blob.bucket().to_string(),
            object: blob.name().to_string(),
            generation: None,
            if_generation_match: c.if_generation_match,
            if_generation_not_match: c.if_generation_not_match,
            if_metageneration_match: c.if_metageneration_match,
            if_metageneration_not_match: c.if_metageneration_not_match,
        };
        let builder = objects::delete::build(self.v1_endpoint.as_str(), &self.http, &req);
        self.send_get_empty(builder).await
    }

    /// Concatenates `sources` into `target`.
    ///
    /// All sources must live in the target's bucket. Known source generations are pinned.
    /// The service only supports equality preconditions here, so a `false` match option
    /// that applies is rejected.
    #[cfg_attr(feature = "trace", tracing::instrument(skip_all))]
    pub async fn compose_object(
        &self,
        sources: &[Blob],
        target: &Blob,
        target_options: &Options,
    ) -> Result<Blob, Error> {
        if sources.is_empty() {
            return Err(Error::invalid("compose requires at least one source"));
        }
        if sources.len() > MAX_COMPOSE_SOURCES {
            return Err(Error::invalid(format!(
                "compose accepts at most {MAX_COMPOSE_SOURCES} sources, got {}",
                sources.len()
            )));
        }
        if let Some(other) = sources.iter().find(|s| s.bucket() != target.bucket()) {
            return Err(Error::invalid(format!(
                "compose source {}/{} is not in bucket {}",
                other.bucket(),
                other.name(),
                target.bucket()
            )));
        }
        let c = target_options.conditions(target.generation(), target.metageneration())?;
        if c.if_generation_not_match.is_some() || c.if_metageneration_not_match.is_some() {
            return Err(Error::invalid("compose does not support not-match preconditions"));
        }
        let req = ComposeObjectRequest {
            bucket: target.bucket().to_string(),
            destination_object: target.name().to_string(),
            destination_predefined_acl: target_options.string(StorageOption::PredefinedAcl)?,
            if_generation_match: c.if_generation_match,
            if_metageneration_match: c.if_metageneration_match,
            fields: target_options.fields(&["bucket", "name"])?,
            composing_targets: ComposingTargets {
                destination: ObjectCreationConfig::from(target),
                source_objects: sources
                    .iter()
                    .map(|s| SourceObjects {
                        name: s.name().to_string(),
                        generation: s.generation(),
                    })
                    .collect(),
            },
        };
        let builder = objects::compose::build(self.v1_endpoint.as_str(), &self.http, &req);
        self.send::<Object>(builder).await.map(Blob::from)
    }

    /// Copies `source` to `target`, which may be in another bucket.
    ///
    /// `source_options` are checked against the source object and `target_options` against
    /// the destination.
    #[cfg_attr(feature = "trace", tracing::instrument(skip_all))]
    pub async fn copy_object(
        &self,
        source: &Blob,
        source_options: &Options,
        target: &Blob,
        target_options: &Options,
    ) -> Result<Blob, Error> {
        let s = source_options.conditions(source.generation(), source.metageneration())?;
        let t = target_options.conditions(target.generation(), target.metageneration())?;
        let req = CopyObjectRequest {
            source_bucket: source.bucket().to_string(),
            source_object: source.name().to_string(),
            destination_bucket: target.bucket().to_string(),
            destination_object: target.name().to_string(),
            source_generation: source.generation(),
            destination_predefined_acl: target_options.string(StorageOption::PredefinedAcl)?,
            if_generation_match: t.if_generation_match,
            if_generation_not_match: t.if_generation_not_match,
            if_metageneration_match: t.if_metageneration_match,
            if_metageneration_not_match: t.if_metageneration_not_match,
            if_source_generation_match: s.if_generation_match,
            if_source_generation_not_match: s.if_generation_not_match,
            if_source_metageneration_match: s.if_metageneration_match,
            if_source_metageneration_not_match: s.if_metageneration_not_match,
            projection: target_options.projection()?,
            fields: target_options.fields(&["bucket", "name"])?,
            metadata: ObjectCreationConfig::from(target),
        };
        let builder = objects::copy::build(self.v1_endpoint.as_str(), &self.http, &req);
        self.send::<Object>(builder).await.map(Blob::from)
    }

    /// Downloads the whole content of the object into memory.
    #[cfg_attr(feature = "trace", tracing::instrument(skip_all))]
    pub async fn load(&self, blob: &Blob, options: &Options) -> Result<Vec<u8>, Error> {
        let req = self.get_request(blob, options)?;
        let builder = objects::download::build(self.v1_endpoint.as_str(), &self.http, &req, &Range::default());
        let response = self.execute(builder).await?;
        Ok(response.body.to_vec())
    }

    /// Opens a channel that reads the object in ranged chunks.
    ///
    /// Nothing is sent until the first read.
    #[cfg_attr(feature = "trace", tracing::instrument(skip_all))]
    pub async fn reader(&self, blob: &Blob, options: &Options) -> Result<BlobReadChannel, Error> {
        let req = self.get_request(blob, options)?;
        Ok(BlobReadChannel::new(self.clone(), req, self.read_chunk_size))
    }

    /// Opens a resumable upload session for `blob` and returns a channel writing into it.
    ///
    /// ```
    /// use gcloud_storage_rpc::blob::Blob;
    /// use gcloud_storage_rpc::client::Client;
    /// use gcloud_storage_rpc::error::Error;
    /// use gcloud_storage_rpc::option::Options;
    ///
    /// async fn run(client: Client) -> Result<Blob, Error> {
    ///     let blob = Blob::builder("bucket", "large.bin").build()?;
    ///     let mut writer = client.writer(&blob, &Options::new()).await?;
    ///     writer.write(&[0u8; 1024]).await?;
    ///     writer.close().await
    /// }
    /// ```
    #[cfg_attr(feature = "trace", tracing::instrument(skip_all))]
    pub async fn writer(&self, blob: &Blob, options: &Options) -> Result<BlobWriteChannel, Error> {
        let req = self.upload_request(blob, UploadType::Resumable, options)?;
        let content_type = blob.content_type().unwrap_or(DEFAULT_CONTENT_TYPE);
        let builder = objects::upload::build_resumable(
            self.v1_upload_endpoint.as_str(),
            &self.http,
            &req,
            &ObjectCreationConfig::from(blob),
            content_type,
        );
        let response = self.execute(builder).await?;
        let Some(session_url) = response.header("location").map(str::to_string) else {
            let message = "resumable upload response has no Location header";
            return Err(ServiceError::new(UNKNOWN_CODE, message).into());
        };
        tracing::debug!("resumable upload session started for {}/{}", blob.bucket(), blob.name());
        let session = ResumableUploadClient::new(session_url, self.http.clone(), self.transport.clone());
        Ok(BlobWriteChannel::new(session, self.write_chunk_size))
    }

    fn get_request(&self, blob: &Blob, options: &Options) -> Result<GetObjectRequest, Error> {
        let c = options.conditions(blob.generation(), blob.metageneration())?;
        Ok(GetObjectRequest {
            bucket: blob.bucket().to_string(),
            object: blob.name().to_string(),
            generation: None,
            if_generation_match: c.if_generation_match,
            if_generation_not_match: c.if_generation_not_match,
            if_metageneration_match: c.if_metageneration_match,
            if_metageneration_not_match: c.if_metageneration_not_match,
            projection: options.projection()?,
            fields: options.fields(&["bucket", "name"])?,
        })
    }

    fn upload_request(
        &self,
        blob: &Blob,
        upload_type: UploadType,
        options: &Options,
    ) -> Result<UploadObjectRequest, Error> {
        let c = options.conditions(blob.generation(), blob.metageneration())?;
        Ok(UploadObjectRequest {
            bucket: blob.bucket().to_string(),
            upload_type,
            if_generation_match: c.if_generation_match,
            if_generation_not_match: c.if_generation_not_match,
            if_metageneration_match: c.if_metageneration_match,
            if_metageneration_not_match: c.if_metageneration_not_match,
            predefined_acl: options.string(StorageOption::PredefinedAcl)?,
            projection: options.projection()?,
            fields: options.fields(&["bucket", "name"])?,
        })
    }

    /// Sends a ranged media request without checking the status, which the read channel
    /// interprets itself.
    pub(crate) async fn download(&self, req: &GetObjectRequest, range: &Range) -> Result<HttpResponse, Error> {
        let builder = objects::download::build(self.v1_endpoint.as_str(), &self.http, req, range);
        let request = builder.build().map_err(TransportError::from)?;
        Ok(self.transport.execute(request).await?)
    }

    async fn execute(&self, builder: RequestBuilder) -> Result<HttpResponse, Error> {
        let request = builder.build().map_err(TransportError::from)?;
        let response = self.transport.execute(request).await?;
        Ok(check_response_status(response)?)
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, Error> {
        let response = self.execute(builder).await?;
        Ok(response.json::<T>()?)
    }

    async fn send_get_empty(&self, builder: RequestBuilder) -> Result<(), Error> {
        self.execute(builder).await?;
        Ok(())
    }
}
