// Backend HTTP API: upload, status, download, health and server info

mod client;
pub mod languages;
pub mod models;
mod upload;

pub use client::ApiClient;
pub use languages::{is_supported_language, language_name, SUPPORTED_LANGUAGES};
pub use models::{
    format_timestamp, ApiInfo, ExportFormat, HealthResponse, ResultMetadata, Segment,
    SummaryLength, Transcription, TranscriptionResult, UploadOptions, UploadResponse,
};
pub use upload::validate_media_file;
