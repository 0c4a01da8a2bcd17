use std::{io, path::Path, sync::Arc};

use crate::{
    clients::encode_segment,
    error::{ClientError, ClientResult},
    fetch::{ApiRequest, AuthenticatedFetch, MultipartPart, PartContent},
    models::MediaResponse,
    render::format_file_size,
    ui::notify::ToastLevel,
};

/// UploadFile
///
/// A file the user picked, held in memory until it is uploaded.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadFile {
    pub name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    /// Reads a file from disk, guessing its content type from the extension.
    pub async fn from_path(path: &Path) -> io::Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("upload.bin")
            .to_string();
        let content_type = guess_content_type(&name).to_string();
        Ok(Self {
            name,
            content_type,
            bytes,
        })
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Lower-cased extension including the leading dot; the whole name when it
    /// has no dot.
    pub fn extension(&self) -> String {
        let last = self.name.rsplit('.').next().unwrap_or_default();
        format!(".{}", last.to_lowercase())
    }
}

pub fn guess_content_type(name: &str) -> &'static str {
    let ext = name.rsplit('.').next().unwrap_or_default().to_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "mp4" => "video/mp4",
        "mov" => "video/quicktime",
        "pdf" => "application/pdf",
        _ => "application/octet-stream",
    }
}

/// UploadLimits
///
/// Client-side pre-checks applied before any upload. The server enforces its own
/// limits independently.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadLimits {
    pub max_files: usize,
    pub max_file_size: u64,
    pub allowed_extensions: Vec<String>,
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self {
            max_files: 10,
            max_file_size: 10 * 1024 * 1024,
            allowed_extensions: [".jpg", ".jpeg", ".png", ".gif", ".mp4", ".mov", ".pdf"]
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
        }
    }
}

impl UploadLimits {
    /// validate_file
    ///
    /// Size first, then extension; the message names the offending file.
    pub fn validate_file(&self, file: &UploadFile) -> ClientResult<()> {
        if file.size() > self.max_file_size {
            return Err(ClientError::ValidationFailed(format!(
                "{} is too large (max {})",
                file.name,
                format_file_size(self.max_file_size)
            )));
        }
        let ext = file.extension();
        if !self.allowed_extensions.iter().any(|allowed| *allowed == ext) {
            return Err(ClientError::ValidationFailed(format!(
                "{} is not a supported file type",
                file.name
            )));
        }
        Ok(())
    }

    pub fn too_many_files_message(&self) -> String {
        format!("Maximum {} files allowed", self.max_files)
    }

    /// Count check followed by per-file checks.
    pub fn validate_selection(&self, files: &[UploadFile]) -> ClientResult<()> {
        if files.is_empty() {
            return Err(ClientError::ValidationFailed("No files selected".to_string()));
        }
        if files.len() > self.max_files {
            return Err(ClientError::ValidationFailed(self.too_many_files_message()));
        }
        files.iter().try_for_each(|file| self.validate_file(file))
    }
}

/// MediaClient
///
/// Standalone media uploads and lookups under `/media`.
pub struct MediaClient {
    fetch: Arc<AuthenticatedFetch>,
    limits: UploadLimits,
}

impl MediaClient {
    pub fn new(fetch: Arc<AuthenticatedFetch>) -> Self {
        Self::with_limits(fetch, UploadLimits::default())
    }

    pub fn with_limits(fetch: Arc<AuthenticatedFetch>, limits: UploadLimits) -> Self {
        Self { fetch, limits }
    }

    pub fn limits(&self) -> &UploadLimits {
        &self.limits
    }

    pub fn validate_file(&self, file: &UploadFile) -> ClientResult<()> {
        self.limits.validate_file(file)
    }

    /// upload
    ///
    /// Every file is checked before the request is built; a single violation
    /// rejects the whole batch without contacting the server.
    pub async fn upload(&self, files: &[UploadFile]) -> ClientResult<Vec<MediaResponse>> {
        self.limits.validate_selection(files)?;

        let parts = files
            .iter()
            .map(|file| MultipartPart {
                name: "files".to_string(),
                content: PartContent::File {
                    file_name: file.name.clone(),
                    content_type: file.content_type.clone(),
                    bytes: file.bytes.clone(),
                },
            })
            .collect();

        let response = self
            .fetch
            .expect_success(ApiRequest::post("/media/upload").multipart(parts), "Upload failed")
            .await?;
        let uploaded = response.json_list::<MediaResponse>()?;

        self.fetch.notifier().notify(
            &format!("{} file(s) uploaded successfully", files.len()),
            ToastLevel::Success,
        );
        Ok(uploaded)
    }

    pub async fn delete_media(&self, file_url: &str) -> ClientResult<bool> {
        self.fetch
            .expect_success(
                ApiRequest::delete(format!("/media/{}", encode_segment(file_url))),
                "Delete failed",
            )
            .await?;
        self.fetch
            .notifier()
            .notify("Media deleted successfully", ToastLevel::Success);
        Ok(true)
    }

    pub async fn media_info(&self, file_url: &str) -> ClientResult<MediaResponse> {
        let response = self
            .fetch
            .send(ApiRequest::get(format!(
                "/media/info/{}",
                encode_segment(file_url)
            )))
            .await?;
        if !response.is_success() {
            return Err(response.into_error("Failed to get media info"));
        }
        response.json()
    }
}
