use super::models::{ApiInfo, ExportFormat, HealthResponse, UploadOptions, UploadResponse};
use super::upload::validate_media_file;
use crate::channel::TaskHandle;
use crate::config::ClientConfig;
use crate::error::{ApiError, ApiResult};
use bytes::Bytes;
use reqwest::{multipart, Body, Client, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio_util::io::ReaderStream;

const API_KEY_HEADER: &str = "X-API-Key";
// Tunneled deployments otherwise answer with an HTML interstitial
const NGROK_SKIP_HEADER: &str = "ngrok-skip-browser-warning";

/// HTTP client for the transcription backend
pub struct ApiClient {
    client: Client,
    config: ClientConfig,
}

impl ApiClient {
    pub fn new(config: ClientConfig) -> ApiResult<Self> {
        let client = Client::builder().timeout(config.upload_timeout).build()?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Connectivity probe
    pub async fn health(&self) -> ApiResult<HealthResponse> {
        let url = self.config.api_url(&["health"])?;
        let response = self
            .authorized(self.client.get(url), &self.config.api_key)
            .timeout(self.config.request_timeout)
            .send()
            .await?;

        decode(response).await
    }

    pub async fn api_info(&self) -> ApiResult<ApiInfo> {
        let url = self.config.api_url(&["api", "info"])?;
        let response = self
            .authorized(self.client.get(url), &self.config.api_key)
            .timeout(self.config.request_timeout)
            .send()
            .await?;

        decode(response).await
    }

    /// Upload a media file and start a job. Returns the backend-assigned task id.
    pub async fn upload(&self, path: &Path, options: &UploadOptions) -> ApiResult<UploadResponse> {
        let size = validate_media_file(path, &self.config)?;

        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| ApiError::InvalidFile("Invalid file path".to_string()))?;

        // Streamed from disk; files may be hundreds of megabytes
        let file = tokio::fs::File::open(path).await?;
        let body = Body::wrap_stream(ReaderStream::new(file));

        log::info!(
            "Uploading {} ({:.2} MB)",
            file_name,
            size as f64 / (1024.0 * 1024.0)
        );

        let mut form = multipart::Form::new().part(
            "file",
            multipart::Part::stream_with_length(body, size)
                .file_name(file_name.to_string())
                .mime_str("application/octet-stream")?,
        );
        for (name, value) in options.form_fields() {
            form = form.text(name, value);
        }
        log::debug!("Upload options: {:?}", options);

        let url = self.config.api_url(&["upload"])?;
        let response = self
            .authorized(self.client.post(url), &self.config.api_key)
            .multipart(form)
            .send()
            .await?;

        let upload: UploadResponse = decode(response).await?;
        if upload.task_id.trim().is_empty() {
            return Err(ApiError::Decode(
                "Upload response did not contain a task_id".to_string(),
            ));
        }

        log::info!("Upload successful, task ID: {}", upload.task_id);
        Ok(upload)
    }

    /// Raw status document for a task, using the configured credential
    pub async fn status(&self, task_id: &str) -> ApiResult<Value> {
        self.task_status(&TaskHandle::new(task_id, self.config.api_key.clone()))
            .await
    }

    /// Raw status document for a task, using the handle's credential
    pub async fn task_status(&self, handle: &TaskHandle) -> ApiResult<Value> {
        let url = self.config.api_url(&["status", handle.task_id()])?;
        let response = self
            .authorized(self.client.get(url), handle.credential())
            .timeout(self.config.request_timeout)
            .send()
            .await?;

        decode(response).await
    }

    /// Shareable download link; the credential travels in the query string
    pub fn download_url(&self, task_id: &str, format: ExportFormat) -> ApiResult<Url> {
        let mut url = self
            .config
            .api_url(&["download", task_id, format.extension()])?;
        url.query_pairs_mut()
            .append_pair("api_key", &self.config.api_key);
        Ok(url)
    }

    pub async fn download(&self, task_id: &str, format: ExportFormat) -> ApiResult<Bytes> {
        let url = self
            .config
            .api_url(&["download", task_id, format.extension()])?;
        let response = self
            .authorized(self.client.get(url), &self.config.api_key)
            .send()
            .await?;

        let response = check_status(response).await?;
        Ok(response.bytes().await?)
    }

    /// Download an export into `dir` as `transcription_<task_id>.<ext>`
    pub async fn download_to(
        &self,
        task_id: &str,
        format: ExportFormat,
        dir: &Path,
    ) -> ApiResult<PathBuf> {
        let bytes = self.download(task_id, format).await?;

        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(format.file_name(task_id));
        tokio::fs::write(&path, &bytes).await?;

        log::info!("Saved {} ({} bytes)", path.display(), bytes.len());
        Ok(path)
    }

    fn authorized(&self, builder: RequestBuilder, api_key: &str) -> RequestBuilder {
        builder
            .header(API_KEY_HEADER, api_key)
            .header(NGROK_SKIP_HEADER, "true")
    }
}

async fn check_status(response: Response) -> ApiResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    match status.as_u16() {
        401 => Err(ApiError::Unauthorized),
        403 => Err(ApiError::Forbidden),
        code => {
            let fallback = status.canonical_reason().unwrap_or("Unknown").to_string();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::Http {
                status: code,
                message: error_message(&body, fallback),
            })
        }
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> ApiResult<T> {
    let response = check_status(response).await?;
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()))
}

/// Pick the most useful error text: JSON `detail`/`message`, then the raw body, then the status text
fn error_message(body: &str, fallback: String) -> String {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) {
        for key in ["detail", "message"] {
            match map.get(key) {
                Some(Value::String(s)) => return s.clone(),
                Some(Value::Null) | None => {}
                Some(other) => return other.to_string(),
            }
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        fallback
    } else {
        trimmed.to_string()
    }
}
