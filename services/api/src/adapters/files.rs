//! services/api/src/adapters/files.rs
//!
//! An ephemeral implementation of the `FileTransferService` port. Uploaded bytes
//! are held in process memory behind a generated `blob:` URL and are gone after
//! a restart. Every transfer waits a fixed delay standing in for network latency.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use portal_core::domain::{FileBlob, FileDescriptor, UploadedFile};
use portal_core::ports::{FileTransferService, PortError, PortResult};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

struct StoredFile {
    content_type: String,
    bytes: Bytes,
}

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

pub struct InMemoryFileTransfer {
    files: RwLock<HashMap<String, StoredFile>>,
    delay: Duration,
}

impl InMemoryFileTransfer {
    pub fn new(delay: Duration) -> Self {
        Self {
            files: RwLock::new(HashMap::new()),
            delay,
        }
    }
}

//=========================================================================================
// `FileTransferService` Trait Implementation
//=========================================================================================

#[async_trait]
impl FileTransferService for InMemoryFileTransfer {
    async fn upload(&self, file: UploadedFile) -> PortResult<FileDescriptor> {
        tokio::time::sleep(self.delay).await;

        let file_url = format!("blob:portal/{}", Uuid::new_v4());
        let descriptor = FileDescriptor {
            file_name: file.name,
            file_size: file.bytes.len() as u64,
            file_type: file.content_type.clone(),
            file_url: file_url.clone(),
            uploaded_at: Utc::now(),
        };

        self.files.write().await.insert(
            file_url,
            StoredFile {
                content_type: file.content_type,
                bytes: Bytes::from(file.bytes),
            },
        );
        info!(
            "Stored upload {} ({} bytes)",
            descriptor.file_name, descriptor.file_size
        );
        Ok(descriptor)
    }

    async fn download(&self, file_url: &str, file_name: &str) -> PortResult<FileBlob> {
        tokio::time::sleep(self.delay).await;

        let (content_type, bytes) = {
            let files = self.files.read().await;
            let stored = files.get(file_url).ok_or_else(|| {
                PortError::NotFound(format!("File {} is no longer available", file_name))
            })?;
            (stored.content_type.clone(), stored.bytes.clone())
        };
        Ok(FileBlob {
            file_name: file_name.to_string(),
            content_type,
            bytes: bytes.to_vec(),
        })
    }

    async fn discard(&self, file_url: &str) -> PortResult<()> {
        if self.files.write().await.remove(file_url).is_some() {
            info!("Discarded upload {}", file_url);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn uploaded_bytes_come_back_under_the_requested_name() {
        let transfer = InMemoryFileTransfer::new(Duration::ZERO);
        let descriptor = transfer
            .upload(UploadedFile {
                name: "essay.pdf".to_string(),
                content_type: "application/pdf".to_string(),
                bytes: b"%PDF-1.7".to_vec(),
            })
            .await
            .unwrap();
        assert_eq!(descriptor.file_size, 8);
        assert!(descriptor.file_url.starts_with("blob:portal/"));

        let blob = transfer
            .download(&descriptor.file_url, "renamed.pdf")
            .await
            .unwrap();
        assert_eq!(blob.file_name, "renamed.pdf");
        assert_eq!(blob.bytes, b"%PDF-1.7".to_vec());
    }

    #[tokio::test]
    async fn discarded_upload_is_gone() {
        let transfer = InMemoryFileTransfer::new(Duration::ZERO);
        let descriptor = transfer
            .upload(UploadedFile {
                name: "draft.pdf".to_string(),
                content_type: "application/pdf".to_string(),
                bytes: b"draft".to_vec(),
            })
            .await
            .unwrap();

        transfer.discard(&descriptor.file_url).await.unwrap();
        assert!(transfer.files.read().await.is_empty());
        let err = transfer
            .download(&descriptor.file_url, "draft.pdf")
            .await
            .unwrap_err();
        assert!(matches!(err, PortError::NotFound(_)));

        // Discarding twice is harmless
        transfer.discard(&descriptor.file_url).await.unwrap();
    }

    #[tokio::test]
    async fn unknown_url_is_not_found() {
        let transfer = InMemoryFileTransfer::new(Duration::ZERO);
        let err = transfer
            .download("blob:portal/missing", "x.pdf")
            .await
            .unwrap_err();
        assert!(matches!(err, PortError::NotFound(_)));
    }
}
