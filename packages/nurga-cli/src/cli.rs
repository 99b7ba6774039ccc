use clap::{Args, Parser, Subcommand};
use nurga_client::api::{ExportFormat, SummaryLength};
use nurga_client::error::ConfigResult;
use nurga_client::ClientConfig;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "nurgavoice",
    version,
    about = "NurgaVoice transcription and summarization client",
    long_about = "Upload audio or video to a NurgaVoice server, follow the job live and fetch the results.\n\
                  Progress arrives over a WebSocket, with automatic fallback to status polling.\n\
                  Set $NURGAVOICE_API_URL and $NURGAVOICE_API_KEY or pass --api-url/--api-key."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Backend base URL
    #[arg(long, env = "NURGAVOICE_API_URL", global = true)]
    pub api_url: Option<String>,

    /// API key sent with every request
    #[arg(long, env = "NURGAVOICE_API_KEY", hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

impl Cli {
    /// Environment (and .env) first, then explicit flags on top
    pub fn client_config(&self) -> ConfigResult<ClientConfig> {
        let mut config = ClientConfig::from_env()?;
        if let Some(url) = &self.api_url {
            config = config.with_api_base_url(url.clone());
        }
        if let Some(key) = &self.api_key {
            config = config.with_api_key(key.clone());
        }
        Ok(config)
    }
}

#[derive(Subcommand)]
pub enum Command {
    /// Upload a media file, follow the job and print the result
    Transcribe(TranscribeArgs),
    /// Follow an already running task until it finishes
    Watch(WatchArgs),
    /// Print the current status document of a task
    Status(StatusArgs),
    /// Download a finished transcription export
    Download(DownloadArgs),
    /// Check that the server is reachable
    Health(HealthArgs),
    /// Show the server's models and limits
    Info(InfoArgs),
    /// List supported languages and summary lengths
    Languages(LanguagesArgs),
}

#[derive(Args)]
pub struct TranscribeArgs {
    /// Audio or video file to transcribe
    #[arg(long)]
    pub file: PathBuf,

    /// Spoken language code, or "auto" to detect
    #[arg(long, default_value = "auto")]
    pub language: String,

    /// Summary length (short, medium, long, detailed)
    #[arg(long, default_value_t = SummaryLength::Medium)]
    pub summary_length: SummaryLength,

    /// Skip summary generation
    #[arg(long, default_value_t = false)]
    pub no_summary: bool,

    /// Label speakers in the transcript
    #[arg(long, default_value_t = false)]
    pub diarize: bool,

    /// Minimum expected number of speakers (with --diarize)
    #[arg(long, default_value_t = 1, requires = "diarize")]
    pub min_speakers: u32,

    /// Maximum expected number of speakers (with --diarize)
    #[arg(long, default_value_t = 10, requires = "diarize")]
    pub max_speakers: u32,

    /// Export formats to download once finished (txt, md, pdf)
    #[arg(long, num_args = 1..)]
    pub download: Vec<ExportFormat>,

    /// Directory for downloaded exports
    #[arg(long, default_value = ".")]
    pub output_dir: PathBuf,

    /// Print the raw result as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,

    /// Write the result to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Suppress progress messages on stderr
    #[arg(long, default_value_t = false)]
    pub quiet: bool,
}

#[derive(Args)]
pub struct WatchArgs {
    /// Task id returned by the upload
    #[arg(long)]
    pub task_id: String,

    /// Print the raw result as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,

    /// Write the result to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Suppress progress messages on stderr
    #[arg(long, default_value_t = false)]
    pub quiet: bool,
}

#[derive(Args)]
pub struct StatusArgs {
    /// Task id returned by the upload
    #[arg(long)]
    pub task_id: String,

    /// Compact JSON output (no indentation)
    #[arg(long, default_value_t = false)]
    pub compact: bool,

    /// Output file (default: stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Args)]
pub struct DownloadArgs {
    /// Task id returned by the upload
    #[arg(long)]
    pub task_id: String,

    /// Export format (txt, md, pdf)
    #[arg(long, default_value_t = ExportFormat::Txt)]
    pub format: ExportFormat,

    /// Directory to save into
    #[arg(long, default_value = ".")]
    pub output_dir: PathBuf,
}

#[derive(Args)]
pub struct HealthArgs {
    /// Output as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Args)]
pub struct InfoArgs {
    /// Output as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Args)]
pub struct LanguagesArgs {
    /// Output as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_transcribe_defaults() {
        let cli = Cli::try_parse_from(["nurgavoice", "transcribe", "--file", "talk.mp3"]).unwrap();
        match cli.command {
            Command::Transcribe(args) => {
                assert_eq!(args.language, "auto");
                assert_eq!(args.summary_length, SummaryLength::Medium);
                assert!(!args.diarize);
                assert!(args.download.is_empty());
            }
            _ => panic!("expected transcribe"),
        }
    }

    #[test]
    fn test_download_formats_parse() {
        let cli = Cli::try_parse_from([
            "nurgavoice",
            "transcribe",
            "--file",
            "talk.mp3",
            "--download",
            "txt",
            "PDF",
        ])
        .unwrap();
        match cli.command {
            Command::Transcribe(args) => {
                assert_eq!(args.download, vec![ExportFormat::Txt, ExportFormat::Pdf])
            }
            _ => panic!("expected transcribe"),
        }
    }

    #[test]
    fn test_speaker_counts_require_diarize() {
        let result = Cli::try_parse_from([
            "nurgavoice",
            "transcribe",
            "--file",
            "talk.mp3",
            "--min-speakers",
            "2",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_flags_override_environment() {
        let cli = Cli::try_parse_from([
            "nurgavoice",
            "--api-url",
            "https://asr.example.org",
            "--api-key",
            "k-123",
            "health",
        ])
        .unwrap();
        let config = cli.client_config().unwrap();
        assert_eq!(config.api_base_url, "https://asr.example.org");
        assert_eq!(config.api_key, "k-123");
    }
}
