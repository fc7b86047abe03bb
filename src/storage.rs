use async_trait::async_trait;
use aws_sdk_s3 as s3;
use s3::primitives::ByteStream;
use std::{
    collections::HashMap,
    path::PathBuf,
    sync::{Arc, Mutex},
};
use thiserror::Error;
use uuid::Uuid;

use crate::config::StorageConfig;

/// Sub-directory (or key prefix) holding listing images.
const PROPERTY_PREFIX: &str = "properties";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("object store error: {0}")]
    Backend(String),
}

/// StoredObject
///
/// What a backend reports back after persisting a file.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredObject {
    pub url: String,
    pub filename: String,
    pub size: i64,
}

// 1. StorageService Contract
/// StorageService
///
/// The only capability the property service needs from file storage. Backends
/// are swapped through configuration without touching service logic.
#[async_trait]
pub trait StorageService: Send + Sync {
    /// Prepares the backend (creates the directory or bucket). Safe to call repeatedly.
    async fn ensure_ready(&self) -> Result<(), StorageError>;

    /// Persists `bytes` under `filename` and returns its stable public URL.
    async fn store(
        &self,
        filename: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<StoredObject, StorageError>;

    /// Removes a previously stored file. Missing files are not an error.
    async fn delete(&self, filename: &str) -> Result<(), StorageError>;
}

/// StorageState
///
/// The concrete type used to share the storage service across the application state.
pub type StorageState = Arc<dyn StorageService>;

/// Builds the backend selected by configuration.
pub async fn from_config(config: &StorageConfig, public_base_url: &str) -> StorageState {
    match config {
        StorageConfig::Disk { upload_dir } => {
            Arc::new(LocalDiskStorage::new(upload_dir.clone(), public_base_url))
        }
        StorageConfig::S3 {
            endpoint,
            region,
            access_key,
            secret_key,
            bucket,
            public_url,
        } => Arc::new(
            S3StorageClient::new(endpoint, region, access_key, secret_key, bucket, public_url)
                .await,
        ),
    }
}

/// sanitize_key
///
/// Removes directory navigation components (`..`, `.`, empty segments) and
/// flattens what is left into a single file name.
pub fn sanitize_key(key: &str) -> String {
    key.split(['/', '\\'])
        .filter(|segment| !segment.is_empty() && *segment != ".." && *segment != ".")
        .collect::<Vec<_>>()
        .join("-")
}

/// The image types accepted for upload and the extension each is stored under.
const IMAGE_TYPES: [(&str, &str); 4] = [
    ("image/jpeg", "jpg"),
    ("image/png", "png"),
    ("image/webp", "webp"),
    ("image/gif", "gif"),
];

/// Maps a declared MIME type onto a stored extension. Parameters such as
/// `; charset=...` are ignored. Anything outside the allow-list is `None`.
pub fn image_extension(content_type: &str) -> Option<&'static str> {
    let essence = content_type.split(';').next()?.trim().to_ascii_lowercase();
    IMAGE_TYPES
        .iter()
        .find(|(mime, _)| *mime == essence)
        .map(|(_, ext)| *ext)
}

/// Generates the stored name of an uploaded image: `property-<uuid>.<ext>`.
/// The client's file name never contributes to it.
pub fn image_filename(content_type: &str) -> Option<String> {
    image_extension(content_type).map(|ext| format!("property-{}.{}", Uuid::new_v4(), ext))
}

// 2. Local Disk Implementation
/// LocalDiskStorage
///
/// Writes images under `<upload_dir>/properties/`. The router serves
/// `<upload_dir>` at `/uploads`, so URLs are `<base>/uploads/properties/<name>`.
#[derive(Clone)]
pub struct LocalDiskStorage {
    root: PathBuf,
    public_base_url: String,
}

impl LocalDiskStorage {
    pub fn new(upload_dir: PathBuf, public_base_url: &str) -> Self {
        Self {
            root: upload_dir.join(PROPERTY_PREFIX),
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl StorageService for LocalDiskStorage {
    async fn ensure_ready(&self) -> Result<(), StorageError> {
        tokio::fs::create_dir_all(&self.root).await?;
        tracing::info!(path = %self.root.display(), "upload directory ready");
        Ok(())
    }

    async fn store(
        &self,
        filename: &str,
        _content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<StoredObject, StorageError> {
        let filename = sanitize_key(filename);
        let size = bytes.len() as i64;
        tokio::fs::create_dir_all(&self.root).await?;
        tokio::fs::write(self.root.join(&filename), bytes).await?;

        Ok(StoredObject {
            url: format!(
                "{}/uploads/{}/{}",
                self.public_base_url, PROPERTY_PREFIX, filename
            ),
            filename,
            size,
        })
    }

    async fn delete(&self, filename: &str) -> Result<(), StorageError> {
        match tokio::fs::remove_file(self.root.join(sanitize_key(filename))).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

// 3. The S3-compatible Implementation (AWS/MinIO/Supabase)
/// S3StorageClient
///
/// Stores images as objects under the `properties/` prefix.
/// `force_path_style(true)` keeps MinIO and Supabase gateways working.
#[derive(Clone)]
pub struct S3StorageClient {
    client: s3::Client,
    bucket_name: String,
    public_url: String,
}

impl S3StorageClient {
    pub async fn new(
        endpoint: &str,
        region: &str,
        access_key: &str,
        secret_key: &str,
        bucket: &str,
        public_url: &str,
    ) -> Self {
        let credentials =
            s3::config::Credentials::new(access_key, secret_key, None, None, "static");

        let config = s3::Config::builder()
            .credentials_provider(credentials)
            .endpoint_url(endpoint)
            .region(s3::config::Region::new(region.to_string()))
            .behavior_version_latest()
            .force_path_style(true)
            .build();

        Self {
            client: s3::Client::from_conf(config),
            bucket_name: bucket.to_string(),
            public_url: public_url.trim_end_matches('/').to_string(),
        }
    }

    fn object_key(filename: &str) -> String {
        format!("{}/{}", PROPERTY_PREFIX, sanitize_key(filename))
    }
}

#[async_trait]
impl StorageService for S3StorageClient {
    /// CreateBucket is idempotent for the owner; an "already exists" answer is fine.
    async fn ensure_ready(&self) -> Result<(), StorageError> {
        if let Err(e) = self
            .client
            .create_bucket()
            .bucket(&self.bucket_name)
            .send()
            .await
        {
            tracing::debug!(bucket = %self.bucket_name, error = %e, "create_bucket skipped");
        }
        Ok(())
    }

    async fn store(
        &self,
        filename: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<StoredObject, StorageError> {
        let key = Self::object_key(filename);
        let size = bytes.len() as i64;

        self.client
            .put_object()
            .bucket(&self.bucket_name)
            .key(&key)
            .content_type(content_type)
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        Ok(StoredObject {
            url: format!("{}/{}/{}", self.public_url, self.bucket_name, key),
            filename: sanitize_key(filename),
            size,
        })
    }

    async fn delete(&self, filename: &str) -> Result<(), StorageError> {
        self.client
            .delete_object()
            .bucket(&self.bucket_name)
            .key(Self::object_key(filename))
            .send()
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;
        Ok(())
    }
}

// 4. The Mock Implementation (For Tests)
/// MockStorageService
///
/// Keeps files in memory so handler and service tests can inspect what was
/// stored and removed without touching disk or network.
#[derive(Clone, Default)]
pub struct MockStorageService {
    /// When true, every `store` call fails.
    pub should_fail: bool,
    files: Arc<Mutex<HashMap<String, usize>>>,
}

impl MockStorageService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_failing() -> Self {
        Self {
            should_fail: true,
            ..Self::default()
        }
    }

    /// Names of the files currently held.
    pub fn stored_files(&self) -> Vec<String> {
        let files = self.files.lock().unwrap_or_else(|e| e.into_inner());
        let mut names: Vec<String> = files.keys().cloned().collect();
        names.sort();
        names
    }
}

#[async_trait]
impl StorageService for MockStorageService {
    async fn ensure_ready(&self) -> Result<(), StorageError> {
        Ok(())
    }

    async fn store(
        &self,
        filename: &str,
        _content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<StoredObject, StorageError> {
        if self.should_fail {
            return Err(StorageError::Backend(
                "Mock Storage Error: Simulation requested".to_string(),
            ));
        }

        let filename = sanitize_key(filename);
        let size = bytes.len();
        self.files
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(filename.clone(), size);

        Ok(StoredObject {
            url: format!("http://localhost:9000/mock-bucket/{PROPERTY_PREFIX}/{filename}"),
            filename,
            size: size as i64,
        })
    }

    async fn delete(&self, filename: &str) -> Result<(), StorageError> {
        self.files
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&sanitize_key(filename));
        Ok(())
    }
}
