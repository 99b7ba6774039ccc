// Local checks run before a file is sent to /upload

use crate::config::ClientConfig;
use crate::error::{ApiError, ApiResult};
use std::path::Path;

/// Validate a media file against the configured size and extension limits.
/// Returns the file size in bytes.
pub fn validate_media_file(path: &Path, config: &ClientConfig) -> ApiResult<u64> {
    let metadata = std::fs::metadata(path)
        .map_err(|_| ApiError::InvalidFile(format!("File not found: {}", path.display())))?;

    if !metadata.is_file() {
        return Err(ApiError::InvalidFile(format!(
            "Not a regular file: {}",
            path.display()
        )));
    }

    let size = metadata.len();
    if size == 0 {
        return Err(ApiError::InvalidFile("Please select a non-empty file".to_string()));
    }

    if size > config.max_file_size_bytes() {
        return Err(ApiError::InvalidFile(format!(
            "File size ({:.1} MB) exceeds the maximum allowed size of {} MB",
            size as f64 / (1024.0 * 1024.0),
            config.max_file_size_mb
        )));
    }

    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
        .unwrap_or_default();

    if !config
        .allowed_extensions
        .iter()
        .any(|allowed| allowed.eq_ignore_ascii_case(&extension))
    {
        return Err(ApiError::InvalidFile(format!(
            "Unsupported file format. Allowed: {}",
            config.allowed_extensions.join(", ")
        )));
    }

    Ok(size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn media_file(suffix: &str, bytes: &[u8]) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(bytes).unwrap();
        file
    }

    #[test]
    fn test_accepts_supported_file() {
        let file = media_file(".MP3", b"ID3 fake audio");
        let size = validate_media_file(file.path(), &ClientConfig::default()).unwrap();
        assert_eq!(size, 14);
    }

    #[test]
    fn test_rejects_missing_and_empty_files() {
        let config = ClientConfig::default();
        let err = validate_media_file(Path::new("/nonexistent/audio.wav"), &config).unwrap_err();
        assert!(err.to_string().contains("File not found"));

        let empty = media_file(".wav", b"");
        let err = validate_media_file(empty.path(), &config).unwrap_err();
        assert!(err.to_string().contains("non-empty"));
    }

    #[test]
    fn test_rejects_unsupported_extension() {
        let file = media_file(".txt", b"not audio");
        let err = validate_media_file(file.path(), &ClientConfig::default()).unwrap_err();
        assert!(err.to_string().contains("Unsupported file format"));
    }

    #[test]
    fn test_rejects_oversized_file() {
        let config = ClientConfig::default().with_max_file_size_mb(0);
        let file = media_file(".wav", b"RIFF");
        let err = validate_media_file(file.path(), &config).unwrap_err();
        assert!(err.to_string().contains("exceeds the maximum"));
    }
}
