use actix_multipart::Multipart;
use chrono::Utc;
use futures::{StreamExt, TryStreamExt};
use std::path::{Path, PathBuf};
use uuid::Uuid;

pub const ALLOWED_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];
const FILE_FIELD: &str = "file";

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("No file part in the request")]
    NoFile,
    #[error("No file selected")]
    EmptyFilename,
    #[error("Invalid file type. Allowed types: png, jpg, jpeg")]
    InvalidFormat(String),
    #[error("File too large (limit is {limit} bytes)")]
    FileTooLarge { limit: usize },
    #[error("Malformed upload: {0}")]
    Multipart(String),
    #[error("Failed to store upload: {0}")]
    Io(#[from] std::io::Error),
}

/// An accepted image upload held in memory until it is written to disk.
#[derive(Debug)]
pub struct ImageUpload {
    pub original_name: String,
    pub extension: String,
    pub data: Vec<u8>,
}

/// Writes validated uploads into the public uploads directory.
#[derive(Clone, Debug)]
pub struct UploadService {
    upload_dir: PathBuf,
    max_bytes: usize,
}

/// Lower-cased extension of `filename` when it is on the allow-list.
pub fn allowed_extension(filename: &str) -> Option<String> {
    let (_, ext) = filename.rsplit_once('.')?;
    let ext = ext.to_ascii_lowercase();
    ALLOWED_EXTENSIONS.contains(&ext.as_str()).then_some(ext)
}

pub fn allowed_file(filename: &str) -> bool {
    allowed_extension(filename).is_some()
}

impl UploadService {
    pub fn new(upload_dir: PathBuf, max_bytes: usize) -> Self {
        Self {
            upload_dir,
            max_bytes,
        }
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// `<timestamp>_<uuid>.<ext>`; the client's filename never reaches the disk.
    pub fn unique_filename(extension: &str) -> String {
        format!(
            "{}_{}.{}",
            Utc::now().format("%Y%m%dT%H%M%S"),
            Uuid::new_v4().simple(),
            extension
        )
    }

    pub fn validate_image_size(&self, len: usize) -> Result<(), UploadError> {
        if len > self.max_bytes {
            return Err(UploadError::FileTooLarge {
                limit: self.max_bytes,
            });
        }
        Ok(())
    }

    pub fn validate_filename(filename: &str) -> Result<String, UploadError> {
        if filename.trim().is_empty() {
            return Err(UploadError::EmptyFilename);
        }
        allowed_extension(filename).ok_or_else(|| UploadError::InvalidFormat(filename.to_string()))
    }

    /// Pulls the `file` part out of a multipart body, enforcing the allow-list
    /// and the byte ceiling while streaming. Other parts are drained.
    pub async fn read_image_field(&self, mut payload: Multipart) -> Result<ImageUpload, UploadError> {
        let mut upload = None;

        while let Some(mut field) = payload
            .try_next()
            .await
            .map_err(|e| UploadError::Multipart(e.to_string()))?
        {
            if upload.is_some() || field.name() != Some(FILE_FIELD) {
                while let Some(chunk) = field.next().await {
                    chunk.map_err(|e| UploadError::Multipart(e.to_string()))?;
                }
                continue;
            }

            let filename = field
                .content_disposition()
                .and_then(|cd| cd.get_filename())
                .unwrap_or_default()
                .to_string();
            let extension = Self::validate_filename(&filename)?;

            let mut data = Vec::new();
            while let Some(chunk) = field.next().await {
                let chunk = chunk.map_err(|e| UploadError::Multipart(e.to_string()))?;
                self.validate_image_size(data.len() + chunk.len())?;
                data.extend_from_slice(&chunk);
            }
            if data.is_empty() {
                return Err(UploadError::EmptyFilename);
            }

            upload = Some(ImageUpload {
                original_name: filename,
                extension,
                data,
            });
        }

        upload.ok_or(UploadError::NoFile)
    }

    /// Writes the upload under a fresh name and returns that name.
    pub async fn save(&self, upload: &ImageUpload) -> Result<String, UploadError> {
        tokio::fs::create_dir_all(&self.upload_dir).await?;
        let filename = Self::unique_filename(&upload.extension);
        let path = self.upload_dir.join(&filename);
        tokio::fs::write(&path, &upload.data).await?;
        log::info!(
            "Saved upload {:?} ({} bytes) as {}",
            upload.original_name,
            upload.data.len(),
            path.display()
        );
        Ok(filename)
    }

    pub fn path_for(&self, filename: &str) -> PathBuf {
        self.upload_dir.join(filename)
    }

    pub fn public_url(filename: &str) -> String {
        format!("/static/uploads/{}", filename)
    }
}
