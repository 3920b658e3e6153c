use async_trait::async_trait;
use bytes::Bytes;
use futures_util::TryStreamExt;
use reqwest::{header, Client, StatusCode};
use tracing::debug;
use uuid::Uuid;

use super::{BlobStore, StorageError, StoredBlob};

/// Client for an HTTP object store exposing
/// `PUT/GET {base_url}/buckets/{bucket}/objects/{key}`
#[derive(Clone)]
pub struct ObjectStorageClient {
    client: Client,
    base_url: String,
    bucket: String,
}

impl ObjectStorageClient {
    pub fn new(base_url: String, bucket: String) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            bucket,
        }
    }

    fn object_url(&self, id: Uuid) -> String {
        format!("{}/buckets/{}/objects/{}", self.base_url, self.bucket, id)
    }
}

#[async_trait]
impl BlobStore for ObjectStorageClient {
    async fn put(&self, data: Bytes, content_type: &str) -> Result<Uuid, StorageError> {
        let id = Uuid::new_v4();
        let size = data.len();

        let response = self
            .client
            .put(self.object_url(id))
            .header(header::CONTENT_TYPE, content_type)
            .body(data)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(StorageError::OperationFailed(format!(
                "Upload failed with status: {}",
                response.status()
            )));
        }

        debug!("Stored object {} ({} bytes)", id, size);
        Ok(id)
    }

    async fn get(&self, id: Uuid) -> Result<Option<StoredBlob>, StorageError> {
        let response = self.client.get(self.object_url(id)).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(StorageError::OperationFailed(format!(
                "Download failed with status: {}",
                response.status()
            )));
        }

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let content_length = response.content_length();
        let body = response.bytes_stream().map_err(StorageError::from);

        Ok(Some(StoredBlob {
            content_type,
            content_length,
            body: Box::pin(body),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    const OBJECT_PATH: &str = r"^/buckets/test-bucket/objects/[0-9a-f-]{36}$";

    async fn collect(blob: StoredBlob) -> Vec<u8> {
        blob.body
            .try_fold(Vec::new(), |mut acc, chunk| async move {
                acc.extend_from_slice(&chunk);
                Ok(acc)
            })
            .await
            .unwrap()
    }

    #[actix_web::test]
    async fn test_put_sends_content_type_and_returns_id() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("PUT", Matcher::Regex(OBJECT_PATH.to_string()))
            .match_header("Content-Type", "application/pdf")
            .match_body("%PDF-1.4")
            .with_status(200)
            .create_async()
            .await;

        let client = ObjectStorageClient::new(server.url(), "test-bucket".to_string());
        let result = client.put(Bytes::from("%PDF-1.4"), "application/pdf").await;

        mock.assert_async().await;
        assert!(result.is_ok());
    }

    #[actix_web::test]
    async fn test_put_failure() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("PUT", Matcher::Regex(OBJECT_PATH.to_string()))
            .with_status(500)
            .create_async()
            .await;

        let client = ObjectStorageClient::new(server.url(), "test-bucket".to_string());
        let result = client.put(Bytes::from("data"), "text/plain").await;

        mock.assert_async().await;
        assert!(matches!(result, Err(StorageError::OperationFailed(_))));
    }

    #[actix_web::test]
    async fn test_get_streams_body() {
        let id = Uuid::new_v4();
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", format!("/buckets/test-bucket/objects/{}", id).as_str())
            .with_status(200)
            .with_header("Content-Type", "image/png")
            .with_body("png bytes")
            .create_async()
            .await;

        let client = ObjectStorageClient::new(format!("{}/", server.url()), "test-bucket".to_string());
        let blob = client.get(id).await.unwrap().expect("object should exist");

        mock.assert_async().await;
        assert_eq!(blob.content_type.as_deref(), Some("image/png"));
        assert_eq!(collect(blob).await, b"png bytes");
    }

    #[actix_web::test]
    async fn test_get_not_found_is_none() {
        let id = Uuid::new_v4();
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", format!("/buckets/test-bucket/objects/{}", id).as_str())
            .with_status(404)
            .create_async()
            .await;

        let client = ObjectStorageClient::new(server.url(), "test-bucket".to_string());
        let result = client.get(id).await;

        mock.assert_async().await;
        assert!(matches!(result, Ok(None)));
    }

    #[actix_web::test]
    async fn test_get_server_error() {
        let id = Uuid::new_v4();
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", format!("/buckets/test-bucket/objects/{}", id).as_str())
            .with_status(503)
            .create_async()
            .await;

        let client = ObjectStorageClient::new(server.url(), "test-bucket".to_string());
        assert!(client.get(id).await.is_err());
    }
}
