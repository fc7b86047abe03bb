use properease_api::storage::{
    LocalDiskStorage, MockStorageService, S3StorageClient, StorageService, image_filename,
};
use std::path::PathBuf;
use uuid::Uuid;

fn scratch_dir() -> PathBuf {
    std::env::temp_dir().join(format!("properease-storage-{}", Uuid::new_v4()))
}

#[cfg(test)]
mod mock_tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_success() {
        let mock = MockStorageService::new();
        let stored = mock
            .store("room.jpg", "image/jpeg", vec![1, 2, 3])
            .await
            .unwrap();

        assert_eq!(stored.filename, "room.jpg");
        assert_eq!(stored.size, 3);
        assert!(stored.url.contains("room.jpg"));
        assert_eq!(mock.stored_files(), vec!["room.jpg".to_string()]);

        mock.delete("room.jpg").await.unwrap();
        assert!(mock.stored_files().is_empty());
    }

    #[tokio::test]
    async fn test_mock_failure() {
        let mock = MockStorageService::new_failing();
        let result = mock.store("room.jpg", "image/jpeg", vec![1]).await;
        assert!(result.is_err());
        assert!(mock.stored_files().is_empty());
    }

    #[tokio::test]
    async fn test_mock_sanitization() {
        let mock = MockStorageService::new();
        let stored = mock
            .store("../../etc/passwd", "image/png", vec![0])
            .await
            .unwrap();
        assert!(!stored.url.contains(".."));
        assert!(!stored.filename.contains('/'));
    }
}

#[cfg(test)]
mod disk_tests {
    use super::*;

    #[tokio::test]
    async fn test_disk_store_and_delete() {
        let dir = scratch_dir();
        let storage = LocalDiskStorage::new(dir.clone(), "http://localhost:3001/");
        storage.ensure_ready().await.unwrap();

        let name = image_filename("image/png").unwrap();
        let stored = storage
            .store(&name, "image/png", vec![9; 32])
            .await
            .unwrap();

        assert_eq!(
            stored.url,
            format!("http://localhost:3001/uploads/properties/{name}")
        );
        assert_eq!(stored.size, 32);
        let on_disk = dir.join("properties").join(&name);
        assert_eq!(tokio::fs::read(&on_disk).await.unwrap().len(), 32);

        storage.delete(&name).await.unwrap();
        assert!(!on_disk.exists());

        // Deleting twice is not an error.
        storage.delete(&name).await.unwrap();

        tokio::fs::remove_dir_all(&dir).await.ok();
    }

    #[tokio::test]
    async fn test_disk_store_stays_inside_the_upload_dir() {
        let dir = scratch_dir();
        let storage = LocalDiskStorage::new(dir.clone(), "http://localhost:3001");

        let stored = storage
            .store("../escape.png", "image/png", vec![1])
            .await
            .unwrap();
        assert!(dir.join("properties").join(&stored.filename).exists());
        assert!(!dir.join("escape.png").exists());

        tokio::fs::remove_dir_all(&dir).await.ok();
    }
}

#[cfg(test)]
mod s3_tests {
    use super::*;

    #[tokio::test]
    async fn test_s3_client_creation() {
        // Construction is offline; no request is sent until the first operation.
        let _client = S3StorageClient::new(
            "http://localhost:9000",
            "us-east-1",
            "testkey",
            "testsecret",
            "testbucket",
            "http://localhost:9000",
        )
        .await;
    }
}
