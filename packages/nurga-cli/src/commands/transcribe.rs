use crate::cli::TranscribeArgs;
use crate::commands;
use crate::exit_codes;
use crate::presenter::{self, Outcome};
use anyhow::Context;
use nurga_client::api::{is_supported_language, validate_media_file, UploadOptions};
use nurga_client::{ApiClient, ClientConfig, TaskChannel, TaskHandle};
use std::sync::Arc;

pub async fn execute(args: TranscribeArgs, config: ClientConfig) -> i32 {
    commands::finish(run(args, config).await)
}

async fn run(args: TranscribeArgs, config: ClientConfig) -> anyhow::Result<i32> {
    if !args.language.eq_ignore_ascii_case("auto") && !is_supported_language(&args.language) {
        eprintln!(
            "Error: Unsupported language '{}'. Run `nurgavoice languages` for the list.",
            args.language
        );
        return Ok(exit_codes::INPUT_ERROR);
    }
    if args.diarize && args.min_speakers > args.max_speakers {
        eprintln!(
            "Error: --min-speakers ({}) is greater than --max-speakers ({})",
            args.min_speakers, args.max_speakers
        );
        return Ok(exit_codes::INPUT_ERROR);
    }

    validate_media_file(&args.file, &config)?;

    let client = Arc::new(ApiClient::new(config).context("Failed to create HTTP client")?);

    let health = client
        .health()
        .await
        .with_context(|| format!("Server at {} is not reachable", client.config().api_base_url))?;
    if !health.is_healthy() {
        log::warn!("Server reports status '{}'", health.status);
    }

    let mut options = UploadOptions::default()
        .with_language(args.language.to_lowercase())
        .with_summary(!args.no_summary, args.summary_length);
    if args.diarize {
        options = options.with_diarization(args.min_speakers, args.max_speakers);
    }

    if !args.quiet {
        eprintln!("Uploading {}...", args.file.display());
    }
    let upload = client
        .upload(&args.file, &options)
        .await
        .context("Upload failed")?;
    if !args.quiet {
        eprintln!("Task {} started", upload.task_id);
    }

    let channel = TaskChannel::from_client(client.clone());
    let handle = TaskHandle::new(upload.task_id.clone(), client.config().api_key.clone());
    let outcome = presenter::follow(&channel, handle, args.quiet).await?;

    let code = commands::report(&outcome, args.json, args.output.as_deref())?;
    if let Outcome::Failed(_) | Outcome::Lost(_) = outcome {
        eprintln!("Upload the file again to retry.");
    }
    if code != exit_codes::SUCCESS {
        return Ok(code);
    }

    for format in &args.download {
        let path = client
            .download_to(&upload.task_id, *format, &args.output_dir)
            .await
            .with_context(|| format!("Failed to download the {} export", format))?;
        if !args.quiet {
            eprintln!("Saved {}", path.display());
        }
    }

    Ok(exit_codes::SUCCESS)
}
