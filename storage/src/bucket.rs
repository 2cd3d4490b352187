use std::collections::HashMap;

use time::OffsetDateTime;

use crate::acl::{self, Acl, Entity};
use crate::error::Error;
use crate::http::access_controls::Owner;
use crate::http::buckets::{Bucket as BucketResource, BucketCreationConfig, BucketPatchConfig, Versioning};

/// An immutable snapshot of a bucket's metadata.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Bucket {
    name: String,
    id: Option<String>,
    self_link: Option<String>,
    project_number: Option<u64>,
    owner: Option<Entity>,
    metageneration: Option<i64>,
    etag: Option<String>,
    create_time: Option<OffsetDateTime>,
    location: Option<String>,
    storage_class: Option<String>,
    versioning_enabled: Option<bool>,
    acl: Option<Vec<Acl>>,
    default_acl: Option<Vec<Acl>>,
    labels: Option<HashMap<String, String>>,
}

impl Bucket {
    /// A bucket carrying only its name.
    pub fn of(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: None,
            self_link: None,
            project_number: None,
            owner: None,
            metageneration: None,
            etag: None,
            create_time: None,
            location: None,
            storage_class: None,
            versioning_enabled: None,
            acl: None,
            default_acl: None,
            labels: None,
        }
    }

    pub fn builder(name: impl Into<String>) -> BucketBuilder {
        BucketBuilder { bucket: Self::of(name) }
    }

    pub fn to_builder(&self) -> BucketBuilder {
        BucketBuilder { bucket: self.clone() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn self_link(&self) -> Option<&str> {
        self.self_link.as_deref()
    }

    pub fn project_number(&self) -> Option<u64> {
        self.project_number
    }

    pub fn owner(&self) -> Option<&Entity> {
        self.owner.as_ref()
    }

    pub fn metageneration(&self) -> Option<i64> {
        self.metageneration
    }

    pub fn etag(&self) -> Option<&str> {
        self.etag.as_deref()
    }

    pub fn create_time(&self) -> Option<OffsetDateTime> {
        self.create_time
    }

    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    pub fn storage_class(&self) -> Option<&str> {
        self.storage_class.as_deref()
    }

    pub fn versioning_enabled(&self) -> Option<bool> {
        self.versioning_enabled
    }

    pub fn acl(&self) -> Option<&[Acl]> {
        self.acl.as_deref()
    }

    /// Access controls applied to new objects that are created without an ACL.
    pub fn default_acl(&self) -> Option<&[Acl]> {
        self.default_acl.as_deref()
    }

    pub fn labels(&self) -> Option<&HashMap<String, String>> {
        self.labels.as_ref()
    }
}

/// Staging area for a [`Bucket`].
#[derive(Clone, Debug)]
pub struct BucketBuilder {
    bucket: Bucket,
}

impl BucketBuilder {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.bucket.name = name.into();
        self
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.bucket.id = Some(id.into());
        self
    }

    pub fn self_link(mut self, self_link: impl Into<String>) -> Self {
        self.bucket.self_link = Some(self_link.into());
        self
    }

    pub fn project_number(mut self, project_number: u64) -> Self {
        self.bucket.project_number = Some(project_number);
        self
    }

    pub fn owner(mut self, owner: Entity) -> Self {
        self.bucket.owner = Some(owner);
        self
    }

    pub fn metageneration(mut self, metageneration: i64) -> Self {
        self.bucket.metageneration = Some(metageneration);
        self
    }

    pub fn etag(mut self, etag: impl Into<String>) -> Self {
        self.bucket.etag = Some(etag.into());
        self
    }

    pub fn create_time(mut self, time: OffsetDateTime) -> Self {
        self.bucket.create_time = Some(time);
        self
    }

    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.bucket.location = Some(location.into());
        self
    }

    pub fn storage_class(mut self, storage_class: impl Into<String>) -> Self {
        self.bucket.storage_class = Some(storage_class.into());
        self
    }

    pub fn versioning_enabled(mut self, enabled: bool) -> Self {
        self.bucket.versioning_enabled = Some(enabled);
        self
    }

    pub fn acl(mut self, acl: Vec<Acl>) -> Self {
        self.bucket.acl = Some(acl);
        self
    }

    pub fn default_acl(mut self, acl: Vec<Acl>) -> Self {
        self.bucket.default_acl = Some(acl);
        self
    }

    pub fn labels(mut self, labels: HashMap<String, String>) -> Self {
        self.bucket.labels = Some(labels);
        self
    }

    pub fn build(self) -> Result<Bucket, Error> {
        if self.bucket.name.is_empty() {
            return Err(Error::invalid("bucket name must not be empty"));
        }
        Ok(self.bucket)
    }
}

impl From<&Bucket> for BucketResource {
    fn from(b: &Bucket) -> Self {
        BucketResource {
            id: b.id.clone(),
            name: b.name.clone(),
            self_link: b.self_link.clone(),
            project_number: b.project_number,
            metageneration: b.metageneration,
            etag: b.etag.clone(),
            time_created: b.create_time,
            location: b.location.clone(),
            storage_class: b.storage_class.clone(),
            versioning: b.versioning_enabled.map(|enabled| Versioning { enabled }),
            owner: b.owner.as_ref().map(|e| Owner {
                entity: e.to_string(),
                entity_id: None,
            }),
            acl: acl::to_wire(&b.acl),
            default_object_acl: acl::to_wire(&b.default_acl),
            labels: b.labels.clone(),
        }
    }
}

impl From<BucketResource> for Bucket {
    fn from(r: BucketResource) -> Self {
        Bucket {
            name: r.name,
            id: r.id,
            self_link: r.self_link,
            project_number: r.project_number,
            owner: r.owner.map(|owner| Entity::from(owner.entity.as_str())),
            metageneration: r.metageneration,
            etag: r.etag,
            create_time: r.time_created,
            location: r.location,
            storage_class: r.storage_class,
            versioning_enabled: r.versioning.map(|v| v.enabled),
            acl: acl::from_wire(r.acl),
            default_acl: acl::from_wire(r.default_object_acl),
            labels: r.labels,
        }
    }
}

impl From<&Bucket> for BucketPatchConfig {
    fn from(b: &Bucket) -> Self {
        BucketPatchConfig {
            acl: acl::to_wire(&b.acl),
            default_object_acl: acl::to_wire(&b.default_acl),
            storage_class: b.storage_class.clone(),
            labels: b.labels.clone(),
            versioning: b.versioning_enabled.map(|enabled| Versioning { enabled }),
        }
    }
}

impl From<&Bucket> for BucketCreationConfig {
    fn from(b: &Bucket) -> Self {
        BucketCreationConfig {
            name: b.name.clone(),
            location: b.location.clone(),
            patch: BucketPatchConfig::from(b),
        }
    }
}
