//! Binary object store holding uploaded document bytes.
//!
//! The store assigns the identifier of every object it accepts; that
//! identifier becomes the id of the file record written afterwards.

pub mod http;
#[cfg(any(test, feature = "test-utils"))]
pub mod memory;

use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::Stream;
use thiserror::Error;
use uuid::Uuid;

pub use http::ObjectStorageClient;
#[cfg(any(test, feature = "test-utils"))]
pub use memory::MemoryBlobStore;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
    #[error("Storage operation failed: {0}")]
    OperationFailed(String),
}

pub type BlobStream = Pin<Box<dyn Stream<Item = Result<Bytes, StorageError>> + Send>>;

/// An object read back from the store
pub struct StoredBlob {
    pub content_type: Option<String>,
    pub content_length: Option<u64>,
    pub body: BlobStream,
}

#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `data` and return the identifier assigned to it
    async fn put(&self, data: Bytes, content_type: &str) -> Result<Uuid, StorageError>;

    /// `None` when the store holds no object under `id`
    async fn get(&self, id: Uuid) -> Result<Option<StoredBlob>, StorageError>;
}
