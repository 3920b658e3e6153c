use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::stream;
use uuid::Uuid;

use super::{BlobStore, StorageError, StoredBlob};

/// Blob store kept in process memory
#[derive(Default)]
pub struct MemoryBlobStore {
    objects: Mutex<HashMap<Uuid, (String, Bytes)>>,
    /// Writes still allowed before the store starts failing; `None` is unlimited
    write_budget: Mutex<Option<usize>>,
}

impl MemoryBlobStore {
    /// Make every following `put` fail, to exercise storage outages
    pub fn fail_writes(&self, fail: bool) {
        self.set_budget(fail.then_some(0));
    }

    /// Accept `writes` more puts, then fail the rest
    pub fn fail_writes_after(&self, writes: usize) {
        self.set_budget(Some(writes));
    }

    fn set_budget(&self, budget: Option<usize>) {
        if let Ok(mut current) = self.write_budget.lock() {
            *current = budget;
        }
    }

    pub fn len(&self) -> usize {
        self.objects.lock().map(|o| o.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(&self, data: Bytes, content_type: &str) -> Result<Uuid, StorageError> {
        {
            let mut budget = self
                .write_budget
                .lock()
                .map_err(|e| StorageError::OperationFailed(e.to_string()))?;
            match budget.as_mut() {
                Some(0) => {
                    return Err(StorageError::OperationFailed("store unavailable".to_string()))
                }
                Some(left) => *left -= 1,
                None => {}
            }
        }
        let id = Uuid::new_v4();
        self.objects
            .lock()
            .map_err(|e| StorageError::OperationFailed(e.to_string()))?
            .insert(id, (content_type.to_string(), data));
        Ok(id)
    }

    async fn get(&self, id: Uuid) -> Result<Option<StoredBlob>, StorageError> {
        let objects = self
            .objects
            .lock()
            .map_err(|e| StorageError::OperationFailed(e.to_string()))?;

        Ok(objects.get(&id).cloned().map(|(content_type, data)| StoredBlob {
            content_type: Some(content_type),
            content_length: Some(data.len() as u64),
            body: Box::pin(stream::once(async move { Ok::<_, StorageError>(data) })),
        }))
    }
}
