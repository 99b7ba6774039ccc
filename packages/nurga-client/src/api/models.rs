use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Summary length choice sent with the upload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SummaryLength {
    Short,
    #[default]
    Medium,
    Long,
    Detailed,
}

impl SummaryLength {
    pub const ALL: [SummaryLength; 4] = [
        SummaryLength::Short,
        SummaryLength::Medium,
        SummaryLength::Long,
        SummaryLength::Detailed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SummaryLength::Short => "short",
            SummaryLength::Medium => "medium",
            SummaryLength::Long => "long",
            SummaryLength::Detailed => "detailed",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            SummaryLength::Short => "Short (1-2 sentences)",
            SummaryLength::Medium => "Medium (1 paragraph)",
            SummaryLength::Long => "Long (2-3 paragraphs)",
            SummaryLength::Detailed => "Detailed (multiple paragraphs)",
        }
    }
}

impl fmt::Display for SummaryLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SummaryLength {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SummaryLength::ALL
            .into_iter()
            .find(|len| len.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                format!(
                    "Unknown summary length '{}'. Expected one of: short, medium, long, detailed",
                    s
                )
            })
    }
}

/// Export format offered by `/download/{task_id}/{format}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    Txt,
    Md,
    Pdf,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Txt => "txt",
            ExportFormat::Md => "md",
            ExportFormat::Pdf => "pdf",
        }
    }

    pub fn file_name(&self, task_id: &str) -> String {
        format!("transcription_{}.{}", task_id, self.extension())
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "txt" => Ok(ExportFormat::Txt),
            "md" => Ok(ExportFormat::Md),
            "pdf" => Ok(ExportFormat::Pdf),
            other => Err(format!(
                "Unsupported format '{}'. Expected one of: txt, md, pdf",
                other
            )),
        }
    }
}

/// Job options sent alongside the media file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadOptions {
    pub language: String,
    pub summary_length: SummaryLength,
    pub enable_summary: bool,
    pub enable_diarization: bool,
    pub min_speakers: u32,
    pub max_speakers: u32,
}

impl Default for UploadOptions {
    fn default() -> Self {
        Self {
            language: "auto".to_string(),
            summary_length: SummaryLength::Medium,
            enable_summary: true,
            enable_diarization: false,
            min_speakers: 1,
            max_speakers: 10,
        }
    }
}

impl UploadOptions {
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_summary(mut self, enabled: bool, length: SummaryLength) -> Self {
        self.enable_summary = enabled;
        self.summary_length = length;
        self
    }

    pub fn with_diarization(mut self, min_speakers: u32, max_speakers: u32) -> Self {
        self.enable_diarization = true;
        self.min_speakers = min_speakers;
        self.max_speakers = max_speakers.max(min_speakers);
        self
    }

    /// Text fields of the multipart form (the file part is added by the client)
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("language", self.language.clone()),
            ("summary_length", self.summary_length.as_str().to_string()),
            ("enable_summary", self.enable_summary.to_string()),
            ("enable_diarization", self.enable_diarization.to_string()),
            ("min_speakers", self.min_speakers.to_string()),
            ("max_speakers", self.max_speakers.to_string()),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadResponse {
    pub task_id: String,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    #[serde(default)]
    pub service: Option<String>,
}

impl HealthResponse {
    pub fn is_healthy(&self) -> bool {
        self.status.eq_ignore_ascii_case("healthy") || self.status.eq_ignore_ascii_case("ok")
    }
}

/// Server capabilities from `/api/info`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiInfo {
    pub whisper_model: Option<String>,
    pub llm_model_name: Option<String>,
    pub llm_model_description: Option<String>,
    pub max_file_size_mb: Option<u64>,
    pub supported_languages: Vec<String>,
    pub summary_lengths: Vec<String>,
    pub allowed_extensions: Vec<String>,
    pub diarization_enabled: bool,
    pub diarization_min_speakers: Option<u32>,
    pub diarization_max_speakers: Option<u32>,
}

/// Typed view of a finished job's payload (`ProgressEvent::Success.result`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptionResult {
    pub summary: Option<String>,
    pub transcription: Transcription,
    pub metadata: ResultMetadata,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Transcription {
    pub text: String,
    pub segments: Vec<Segment>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Segment {
    pub start: f64,
    pub end: f64,
    pub text: String,
    pub speaker: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResultMetadata {
    pub file_name: Option<String>,
    pub language: Option<String>,
    pub duration: Option<f64>,
    pub summary_enabled: Option<bool>,
    pub summary_length: Option<String>,
    pub summary_requested: Option<bool>,
    pub auto_disabled_reason: Option<String>,
}

impl TranscriptionResult {
    /// Decode leniently; unknown fields are ignored and missing ones defaulted
    pub fn from_value(value: &serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value.clone())
    }

    /// Text shown in place of the summary, mirroring the server's reasons for skipping it
    pub fn summary_text(&self) -> String {
        if self.metadata.summary_enabled == Some(false) {
            if let Some(reason) = &self.metadata.auto_disabled_reason {
                return format!("Summary was automatically disabled: {}", reason);
            }
            if self.metadata.summary_requested == Some(true) {
                return "Summary was requested but could not be generated.".to_string();
            }
            return "Summary generation was disabled for this transcription.".to_string();
        }

        match &self.summary {
            Some(summary) if !summary.trim().is_empty() => summary.clone(),
            _ => "No summary available.".to_string(),
        }
    }
}

/// Format seconds as m:ss
pub fn format_timestamp(seconds: f64) -> String {
    let total = seconds.max(0.0).floor() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}
