//! Image-analysis domain service

use common::config::ClientConfig;
use common::error::{ApiError, ApiResult};
use common::pipeline::{ApiClient, ApiRequest, classify_transport, error_for_status};
use common::validation::{image_mime_type, validate_image_file};
use reqwest::multipart::{Form, Part};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{debug, error, info, warn};

use crate::identity::user_id_from_token;
use crate::models::{AnalysisRecord, AnalysisResult, HistoryResponse, PredictionResponse};

const HISTORY_TIMEOUT_MESSAGE: &str =
    "Loading your analysis history took too long. Please try again.";
const ANALYSIS_FORMAT_MESSAGE: &str =
    "The analysis service returned an unexpected response. Please try again.";
const UPLOADED_MESSAGE: &str = "Image uploaded successfully";
const MAX_DOWNLOAD_COPIES: u32 = 1000;

/// An eye image held in memory, ready for upload
#[derive(Debug, Clone)]
pub struct EyeImage {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl EyeImage {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let content_type = image_mime_type(&file_name).map(String::from);
        Self {
            file_name,
            content_type,
            bytes,
        }
    }

    /// Read an image from disk
    pub async fn from_path(path: impl AsRef<Path>) -> ApiResult<Self> {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("image")
            .to_string();

        let bytes = tokio::fs::read(path).await.map_err(|e| {
            ApiError::validation("file", format!("Could not read {}: {}", path.display(), e))
        })?;

        Ok(Self::new(file_name, bytes))
    }

    fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    fn to_part(&self) -> ApiResult<Part> {
        let part = Part::bytes(self.bytes.clone()).file_name(self.file_name.clone());
        match &self.content_type {
            Some(mime) => part
                .mime_str(mime)
                .map_err(|e| ApiError::validation("file", e.to_string())),
            None => Ok(part),
        }
    }
}

/// Settings of the analysis service
#[derive(Debug, Clone)]
pub struct AnalysisSettings {
    pub inference_base_url: String,
    pub max_upload_bytes: u64,
    pub history_timeout: Duration,
    pub download_dir: PathBuf,
}

impl AnalysisSettings {
    pub fn from_config(config: &ClientConfig) -> Self {
        Self {
            inference_base_url: config.inference_base_url.clone(),
            max_upload_bytes: config.max_upload_bytes,
            history_timeout: config.history_timeout(),
            download_dir: config.download_dir.clone(),
        }
    }
}

/// Analysis service
#[derive(Clone)]
pub struct AnalysisService {
    client: ApiClient,
    inference_base_url: Arc<str>,
    settings: Arc<AnalysisSettings>,
}

impl AnalysisService {
    pub fn new(client: ApiClient, settings: AnalysisSettings) -> Self {
        Self {
            client,
            inference_base_url: Arc::from(settings.inference_base_url.trim_end_matches('/')),
            settings: Arc::new(settings),
        }
    }

    /// Check an image against the accepted types and size limit
    pub fn validate(&self, image: &EyeImage) -> ApiResult<()> {
        let result = validate_image_file(
            &image.file_name,
            image.content_type.as_deref(),
            image.size(),
            Some(self.settings.max_upload_bytes),
        );

        if result.is_valid {
            Ok(())
        } else {
            Err(ApiError::validation("file", result.message))
        }
    }

    /// Classify an eye image
    ///
    /// The inference endpoint is public, so the request bypasses the
    /// authenticated pipeline.
    #[tracing::instrument(
        skip(self, image),
        fields(file = %image.file_name, size = image.bytes.len())
    )]
    pub async fn analyze_eye_image(&self, image: &EyeImage) -> ApiResult<AnalysisResult> {
        self.validate(image)?;

        let form = Form::new().part("file", image.to_part()?);
        let url = format!("{}/predict/", self.inference_base_url);

        let response = self
            .client
            .http()
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(classify_transport)?;

        let status = response.status();
        let text = response.text().await.map_err(classify_transport)?;

        if !status.is_success() {
            error!("Inference service answered {}", status);
            return Err(error_for_status(status, &text));
        }

        let prediction: PredictionResponse = serde_json::from_str(&text).map_err(|e| {
            error!("Unexpected inference response: {}", e);
            ApiError::Format(ANALYSIS_FORMAT_MESSAGE.to_string())
        })?;

        let result = AnalysisResult::from(prediction);
        info!(
            "Analysis complete: {} ({:.1}%)",
            result.diagnosis, result.confidence
        );
        Ok(result)
    }

    /// Previous analyses of the logged-in user
    pub async fn user_analysis_history(&self) -> ApiResult<Vec<AnalysisRecord>> {
        let user_id = self.current_user_id()?;
        let request = ApiRequest::get(format!("/files/{}", encode_segment(&user_id)));

        let limit = self.settings.history_timeout;

        let response = tokio::time::timeout(limit, self.client.send(request))
            .await
            .map_err(|_| {
                warn!("History request exceeded {:?}", limit);
                ApiError::Timeout(HISTORY_TIMEOUT_MESSAGE.to_string())
            })??
            .into_result()?;

        if response.is_empty() {
            debug!("Empty history response");
            return Ok(Vec::new());
        }

        let history: HistoryResponse = response.json()?;
        Ok(history.into())
    }

    /// Save an image to the logged-in user's files
    pub async fn upload_eye_image(&self, image: &EyeImage) -> ApiResult<String> {
        self.validate(image)?;

        let user_id = self.current_user_id()?;
        let form = Form::new().part("file", image.to_part()?);
        let response = self
            .client
            .send(ApiRequest::post(format!("/files/{}", encode_segment(&user_id))).multipart(form))
            .await?
            .into_result()?;

        info!("Uploaded {}", image.file_name);
        Ok(response
            .message()
            .filter(|message| !message.starts_with('{'))
            .unwrap_or_else(|| UPLOADED_MESSAGE.to_string()))
    }

    /// Download a stored image into the download directory
    ///
    /// Existing files are kept; a taken name gets a ` (1)`, ` (2)`, ...
    /// suffix. Returns the path of the written file.
    pub async fn download_eye_image(&self, path: &str) -> ApiResult<PathBuf> {
        if path.trim().is_empty() {
            return Err(ApiError::validation("path", "No file selected"));
        }

        let bytes = self
            .client
            .send_bytes(ApiRequest::get(format!(
                "/files/filePath/{}",
                encode_segment(path)
            )))
            .await?;

        let dir = &self.settings.download_dir;
        tokio::fs::create_dir_all(dir).await.map_err(|e| {
            ApiError::Storage(format!("Failed to create download directory: {}", e))
        })?;

        let (target, mut file) = create_unique(dir, &download_file_name(path)).await?;
        file.write_all(&bytes)
            .await
            .map_err(|e| ApiError::Storage(format!("Failed to save {}: {}", target.display(), e)))?;
        file.flush()
            .await
            .map_err(|e| ApiError::Storage(format!("Failed to save {}: {}", target.display(), e)))?;

        info!("Saved {} bytes to {}", bytes.len(), target.display());
        Ok(target)
    }

    fn current_user_id(&self) -> ApiResult<String> {
        let token = self
            .client
            .session()
            .token()?
            .ok_or(ApiError::Unauthenticated)?;
        user_id_from_token(&token)
    }
}

/// Percent-encode `segment` as a single URL path segment
fn encode_segment(segment: &str) -> String {
    let mut url = reqwest::Url::parse("http://localhost/").expect("static URL is valid");
    url.path_segments_mut()
        .expect("http URLs have path segments")
        .pop_if_empty()
        .push(segment);
    url.path().trim_start_matches('/').to_string()
}

/// Create a file in `dir` that did not exist before, numbering the name
/// while it is taken
async fn create_unique(dir: &Path, file_name: &str) -> ApiResult<(PathBuf, File)> {
    for copy in 0..MAX_DOWNLOAD_COPIES {
        let target = dir.join(numbered_name(file_name, copy));
        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&target)
            .await
        {
            Ok(file) => return Ok((target, file)),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
            Err(e) => {
                return Err(ApiError::Storage(format!(
                    "Failed to save {}: {}",
                    target.display(),
                    e
                )));
            }
        }
    }

    Err(ApiError::Storage(format!(
        "Too many copies of {} in {}",
        file_name,
        dir.display()
    )))
}

/// `eye.jpg` becomes `eye (2).jpg` for `copy == 2`
fn numbered_name(file_name: &str, copy: u32) -> String {
    if copy == 0 {
        return file_name.to_string();
    }

    let name = Path::new(file_name);
    let stem = name
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or(file_name);
    match name.extension().and_then(|ext| ext.to_str()) {
        Some(ext) => format!("{} ({}).{}", stem, copy, ext),
        None => format!("{} ({})", stem, copy),
    }
}

fn download_file_name(path: &str) -> String {
    path.rsplit(['/', '\\'])
        .find(|part| !part.is_empty() && *part != "." && *part != "..")
        .map(String::from)
        .unwrap_or_else(|| "eye-image".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_segment() {
        assert_eq!(encode_segment("42"), "42");
        assert_eq!(encode_segment("uploads/eye 1.jpg"), "uploads%2Feye%201.jpg");
    }

    #[test]
    fn test_numbered_name() {
        assert_eq!(numbered_name("eye.jpg", 0), "eye.jpg");
        assert_eq!(numbered_name("eye.jpg", 2), "eye (2).jpg");
        assert_eq!(numbered_name("scan.left.png", 1), "scan.left (1).png");
        assert_eq!(numbered_name("eye-image", 1), "eye-image (1)");
    }

    #[test]
    fn test_download_file_name() {
        assert_eq!(download_file_name("uploads/42/eye.jpg"), "eye.jpg");
        assert_eq!(download_file_name("C:\\scans\\left.png"), "left.png");
        assert_eq!(download_file_name("../"), "eye-image");
    }

    #[test]
    fn test_eye_image_infers_type() {
        let image = EyeImage::new("scan.JPEG", vec![1, 2, 3]);
        assert_eq!(image.content_type.as_deref(), Some("image/jpeg"));
        assert_eq!(image.size(), 3);
    }
}
