#![allow(clippy::result_large_err)]
//! # gcloud-storage-rpc
//!
//! RPC layer for the Google Cloud Storage JSON API.
//!
//! * [About Cloud Storage](https://cloud.google.com/storage/)
//! * [JSON API Documentation](https://cloud.google.com/storage/docs/json_api/v1)
//!
//! The crate turns calls on immutable [`Bucket`](bucket::Bucket) and [`Blob`](blob::Blob)
//! values into JSON API requests, applies conditional [`Options`](option::Options) such as
//! `IfGenerationMatch` as request preconditions, and classifies every failure into a
//! [`ServiceError`](error::ServiceError) whose `retryable` flag tells an outer retry policy
//! whether the call may be repeated. This layer never retries by itself.
//!
//! ## Quick Start
//!
//! ### Authentication
//!
//! Any [`token_source::TokenSourceProvider`] can be plugged into the configuration.
//!
//! ```
//! use std::sync::Arc;
//! use gcloud_storage_rpc::client::{ClientConfig, Client};
//!
//! fn run(provider: Box<dyn token_source::TokenSourceProvider>) {
//!     let config = ClientConfig::default()
//!         .with_project_id("my-project")
//!         .with_token_source_provider(provider);
//!     let client = Client::new(config);
//! }
//! ```
//!
//! ### Anonymous Access
//!
//! ```
//! use gcloud_storage_rpc::client::{ClientConfig, Client};
//!
//! fn run() {
//!     let config = ClientConfig::default().anonymous();
//!     let client = Client::new(config);
//! }
//! ```
//!
//! ### Usage
//!
//! ```
//! use gcloud_storage_rpc::blob::Blob;
//! use gcloud_storage_rpc::bucket::Bucket;
//! use gcloud_storage_rpc::client::Client;
//! use gcloud_storage_rpc::error::Error;
//! use gcloud_storage_rpc::option::{Options, StorageOption};
//!
//! async fn run(client: Client) -> Result<(), Error> {
//!     client.create_bucket(&Bucket::of("bucket"), &Options::new()).await?;
//!
//!     let blob = Blob::builder("bucket", "file.txt").content_type("text/plain").build()?;
//!     let stored = client.create_object(&blob, b"hello world", &Options::new()).await?;
//!
//!     // Only succeeds while the stored generation is still the current one.
//!     let options = Options::new().with(StorageOption::IfGenerationMatch, true);
//!     let data = client.load(&stored, &options).await?;
//!     assert_eq!(data, b"hello world");
//!
//!     match client.delete_object(&stored, &Options::new()).await {
//!         Err(e) if e.is_retryable() => { /* let the caller's retry policy decide */ }
//!         other => other?,
//!     }
//!     Ok(())
//! }
//! ```

pub mod acl;
pub mod blob;
pub mod bucket;
pub mod channel;
pub mod client;
pub mod error;
pub mod http;
pub mod option;

#[cfg(test)]
pub(crate) mod testing;
