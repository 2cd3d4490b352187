use std::collections::HashMap;

use time::OffsetDateTime;

use crate::acl::{self, Acl, Entity};
use crate::error::Error;
use crate::http::access_controls::Owner;
use crate::http::objects::{Object, ObjectCreationConfig, ObjectPatchConfig};

/// An immutable snapshot of an object's metadata.
///
/// The identity of a stored object is `(bucket, name, generation)`. Generation and
/// metageneration are assigned by the service.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Blob {
    bucket: String,
    name: String,
    generation: Option<i64>,
    metageneration: Option<i64>,
    id: Option<String>,
    self_link: Option<String>,
    media_link: Option<String>,
    content_type: Option<String>,
    cache_control: Option<String>,
    content_disposition: Option<String>,
    content_encoding: Option<String>,
    content_language: Option<String>,
    size: Option<u64>,
    crc32c: Option<String>,
    md5: Option<String>,
    etag: Option<String>,
    create_time: Option<OffsetDateTime>,
    update_time: Option<OffsetDateTime>,
    delete_time: Option<OffsetDateTime>,
    owner: Option<Entity>,
    acl: Option<Vec<Acl>>,
    metadata: Option<HashMap<String, String>>,
    component_count: Option<i32>,
}

impl Blob {
    fn empty(bucket: String, name: String) -> Self {
        Self {
            bucket,
            name,
            generation: None,
            metageneration: None,
            id: None,
            self_link: None,
            media_link: None,
            content_type: None,
            cache_control: None,
            content_disposition: None,
            content_encoding: None,
            content_language: None,
            size: None,
            crc32c: None,
            md5: None,
            etag: None,
            create_time: None,
            update_time: None,
            delete_time: None,
            owner: None,
            acl: None,
            metadata: None,
            component_count: None,
        }
    }

    /// A blob carrying only its identity.
    pub fn of(bucket: impl Into<String>, name: impl Into<String>) -> Self {
        Self::empty(bucket.into(), name.into())
    }

    pub fn builder(bucket: impl Into<String>, name: impl Into<String>) -> BlobBuilder {
        BlobBuilder {
            blob: Self::of(bucket, name),
        }
    }

    pub fn to_builder(&self) -> BlobBuilder {
        BlobBuilder { blob: self.clone() }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn generation(&self) -> Option<i64> {
        self.generation
    }

    pub fn metageneration(&self) -> Option<i64> {
        self.metageneration
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn self_link(&self) -> Option<&str> {
        self.self_link.as_deref()
    }

    pub fn media_link(&self) -> Option<&str> {
        self.media_link.as_deref()
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn cache_control(&self) -> Option<&str> {
        self.cache_control.as_deref()
    }

    pub fn content_disposition(&self) -> Option<&str> {
        self.content_disposition.as_deref()
    }

    pub fn content_encoding(&self) -> Option<&str> {
        self.content_encoding.as_deref()
    }

    pub fn content_language(&self) -> Option<&str> {
        self.content_language.as_deref()
    }

    pub fn size(&self) -> Option<u64> {
        self.size
    }

    /// CRC32C checksum, base64 in big-endian byte order.
    pub fn crc32c(&self) -> Option<&str> {
        self.crc32c.as_deref()
    }

    /// MD5 hash, base64.
    pub fn md5(&self) -> Option<&str> {
        self.md5.as_deref()
    }

    pub fn etag(&self) -> Option<&str> {
        self.etag.as_deref()
    }

    pub fn create_time(&self) -> Option<OffsetDateTime> {
        self.create_time
    }

    pub fn update_time(&self) -> Option<OffsetDateTime> {
        self.update_time
    }

    pub fn delete_time(&self) -> Option<OffsetDateTime> {
        self.delete_time
    }

    pub fn owner(&self) -> Option<&Entity> {
        self.owner.as_ref()
    }

    pub fn acl(&self) -> Option<&[Acl]> {
        self.acl.as_deref()
    }

    pub fn metadata(&self) -> Option<&HashMap<String, String>> {
        self.metadata.as_ref()
    }

    pub fn component_count(&self) -> Option<i32> {
        self.component_count
    }
}

/// Staging area for a [`Blob`].
#[derive(Clone, Debug)]
pub struct BlobBuilder {
    blob: Blob,
}

impl BlobBuilder {
    pub fn bucket(mut self, bucket: impl Into<String>) -> Self {
        self.blob.bucket = bucket.into();
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.blob.name = name.into();
        self
    }

    pub fn generation(mut self, generation: i64) -> Self {
        self.blob.generation = Some(generation);
        self
    }

    pub fn metageneration(mut self, metageneration: i64) -> Self {
        self.blob.metageneration = Some(metageneration);
        self
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.blob.id = Some(id.into());
        self
    }

    pub fn self_link(mut self, self_link: impl Into<String>) -> Self {
        self.blob.self_link = Some(self_link.into());
        self
    }

    pub fn media_link(mut self, media_link: impl Into<String>) -> Self {
        self.blob.media_link = Some(media_link.into());
        self
    }

    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.blob.content_type = Some(content_type.into());
        self
    }

    pub fn cache_control(mut self, cache_control: impl Into<String>) -> Self {
        self.blob.cache_control = Some(cache_control.into());
        self
    }

    pub fn content_disposition(mut self, content_disposition: impl Into<String>) -> Self {
        self.blob.content_disposition = Some(content_disposition.into());
        self
    }

    pub fn content_encoding(mut self, content_encoding: impl Into<String>) -> Self {
        self.blob.content_encoding = Some(content_encoding.into());
        self
    }

    pub fn content_language(mut self, content_language: impl Into<String>) -> Self {
        self.blob.content_language = Some(content_language.into());
        self
    }

    pub fn size(mut self, size: u64) -> Self {
        self.blob.size = Some(size);
        self
    }

    pub fn crc32c(mut self, crc32c: impl Into<String>) -> Self {
        self.blob.crc32c = Some(crc32c.into());
        self
    }

    pub fn md5(mut self, md5: impl Into<String>) -> Self {
        self.blob.md5 = Some(md5.into());
        self
    }

    pub fn etag(mut self, etag: impl Into<String>) -> Self {
        self.blob.etag = Some(etag.into());
        self
    }

    pub fn create_time(mut self, time: OffsetDateTime) -> Self {
        self.blob.create_time = Some(time);
        self
    }

    pub fn update_time(mut self, time: OffsetDateTime) -> Self {
        self.blob.update_time = Some(time);
        self
    }

    pub fn delete_time(mut self, time: OffsetDateTime) -> Self {
        self.blob.delete_time = Some(time);
        self
    }

    pub fn owner(mut self, owner: Entity) -> Self {
        self.blob.owner = Some(owner);
        self
    }

    pub fn acl(mut self, acl: Vec<Acl>) -> Self {
        self.blob.acl = Some(acl);
        self
    }

    pub fn metadata(mut self, metadata: HashMap<String, String>) -> Self {
        self.blob.metadata = Some(metadata);
        self
    }

    pub fn component_count(mut self, component_count: i32) -> Self {
        self.blob.component_count = Some(component_count);
        self
    }

    pub fn build(self) -> Result<Blob, Error> {
        if self.blob.bucket.is_empty() {
            return Err(Error::invalid("blob bucket must not be empty"));
        }
        if self.blob.name.is_empty() {
            return Err(Error::invalid("blob name must not be empty"));
        }
        Ok(self.blob)
    }
}

impl From<&Blob> for Object {
    fn from(b: &Blob) -> Self {
        Object {
            id: b.id.clone(),
            self_link: b.self_link.clone(),
            media_link: b.media_link.clone(),
            name: b.name.clone(),
            bucket: b.bucket.clone(),
            generation: b.generation,
            metageneration: b.metageneration,
            content_type: b.content_type.clone(),
            cache_control: b.cache_control.clone(),
            content_disposition: b.content_disposition.clone(),
            content_encoding: b.content_encoding.clone(),
            content_language: b.content_language.clone(),
            size: b.size,
            crc32c: b.crc32c.clone(),
            md5_hash: b.md5.clone(),
            etag: b.etag.clone(),
            time_created: b.create_time,
            updated: b.update_time,
            time_deleted: b.delete_time,
            storage_class: None,
            owner: b.owner.as_ref().map(|e| Owner {
                entity: e.to_string(),
                entity_id: None,
            }),
            acl: acl::to_wire(&b.acl),
            metadata: b.metadata.clone(),
            component_count: b.component_count,
        }
    }
}

/// Fields absent from the document stay unset. A document without `bucket` or `name` yields an
/// empty identity; client calls request both whenever `StorageOption::Fields` narrows a response.
impl From<Object> for Blob {
    fn from(o: Object) -> Self {
        Blob {
            bucket: o.bucket,
            name: o.name,
            generation: o.generation,
            metageneration: o.metageneration,
            id: o.id,
            self_link: o.self_link,
            media_link: o.media_link,
            content_type: o.content_type,
            cache_control: o.cache_control,
            content_disposition: o.content_disposition,
            content_encoding: o.content_encoding,
            content_language: o.content_language,
            size: o.size,
            crc32c: o.crc32c,
            md5: o.md5_hash,
            etag: o.etag,
            create_time: o.time_created,
            update_time: o.updated,
            delete_time: o.time_deleted,
            owner: o.owner.map(|owner| Entity::from(owner.entity.as_str())),
            acl: acl::from_wire(o.acl),
            metadata: o.metadata,
            component_count: o.component_count,
        }
    }
}

impl From<&Blob> for ObjectPatchConfig {
    fn from(b: &Blob) -> Self {
        ObjectPatchConfig {
            acl: acl::to_wire(&b.acl),
            cache_control: b.cache_control.clone(),
            content_disposition: b.content_disposition.clone(),
            content_encoding: b.content_encoding.clone(),
            content_language: b.content_language.clone(),
            content_type: b.content_type.clone(),
            metadata: b.metadata.clone(),
        }
    }
}

impl From<&Blob> for ObjectCreationConfig {
    fn from(b: &Blob) -> Self {
        ObjectCreationConfig {
            name: Some(b.name.clone()),
            patch: ObjectPatchConfig::from(b),
            crc32c: b.crc32c.clone(),
            md5_hash: b.md5.clone(),
        }
    }
}
