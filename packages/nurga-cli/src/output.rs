use anyhow::Context;
use nurga_client::api::{format_timestamp, TranscriptionResult};
use std::io::Write;
use std::path::Path;

/// Write a string to stdout or a file.
pub fn write_output(text: &str, output_path: Option<&Path>) -> anyhow::Result<()> {
    match output_path {
        Some(path) => std::fs::write(path, text)
            .with_context(|| format!("Failed to write output file '{}'", path.display())),
        None => {
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            handle
                .write_all(text.as_bytes())
                .and_then(|_| handle.write_all(b"\n"))
                .context("Failed to write to stdout")
        }
    }
}

/// Serialize a value to JSON (pretty or compact).
pub fn to_json<T: serde::Serialize>(value: &T, compact: bool) -> Result<String, String> {
    if compact {
        serde_json::to_string(value).map_err(|e| format!("JSON serialization failed: {}", e))
    } else {
        serde_json::to_string_pretty(value)
            .map_err(|e| format!("JSON serialization failed: {}", e))
    }
}

/// Human-readable rendering of a finished job
pub fn render_result(result: &TranscriptionResult) -> String {
    let mut out = String::new();
    let meta = &result.metadata;

    if let Some(name) = &meta.file_name {
        out.push_str(&format!("File: {}\n", name));
    }
    if let Some(language) = &meta.language {
        out.push_str(&format!("Language: {}\n", language));
    }
    if let Some(duration) = meta.duration {
        out.push_str(&format!("Duration: {}\n", format_timestamp(duration)));
    }
    if !out.is_empty() {
        out.push('\n');
    }

    out.push_str("Summary\n-------\n");
    out.push_str(&result.summary_text());
    out.push_str("\n\nTranscription\n-------------\n");

    let segments = &result.transcription.segments;
    if segments.is_empty() {
        out.push_str(result.transcription.text.trim());
    } else {
        let lines: Vec<String> = segments
            .iter()
            .map(|seg| {
                let speaker = seg
                    .speaker
                    .as_deref()
                    .map(|s| format!("{}: ", s))
                    .unwrap_or_default();
                format!(
                    "[{} - {}] {}{}",
                    format_timestamp(seg.start),
                    format_timestamp(seg.end),
                    speaker,
                    seg.text.trim()
                )
            })
            .collect();
        out.push_str(&lines.join("\n"));
    }

    out
}
