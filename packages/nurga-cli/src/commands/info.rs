use crate::cli::InfoArgs;
use crate::commands;
use crate::exit_codes;
use crate::output;
use anyhow::Context;
use nurga_client::{ApiClient, ClientConfig};

pub async fn execute(args: InfoArgs, config: ClientConfig) -> i32 {
    commands::finish(run(args, config).await)
}

async fn run(args: InfoArgs, config: ClientConfig) -> anyhow::Result<i32> {
    let client = ApiClient::new(config)?;
    let info = client
        .api_info()
        .await
        .context("Failed to fetch server info")?;

    if args.json {
        let json = output::to_json(&info, false).map_err(anyhow::Error::msg)?;
        output::write_output(&json, None)?;
        return Ok(exit_codes::SUCCESS);
    }

    println!("nurgavoice CLI v{}", env!("CARGO_PKG_VERSION"));
    println!("Server: {}", client.config().api_base_url);
    println!();
    println!(
        "Whisper model: {}",
        info.whisper_model.as_deref().unwrap_or("unknown")
    );
    match (&info.llm_model_name, &info.llm_model_description) {
        (Some(name), Some(desc)) => println!("Summary model: {} ({})", name, desc),
        (Some(name), None) => println!("Summary model: {}", name),
        _ => println!("Summary model: unknown"),
    }
    if let Some(size) = info.max_file_size_mb {
        println!("Max file size: {} MB", size);
    }
    if !info.allowed_extensions.is_empty() {
        println!("Formats: {}", info.allowed_extensions.join(", "));
    }
    if !info.supported_languages.is_empty() {
        println!("Languages: {}", info.supported_languages.join(", "));
    }
    if info.diarization_enabled {
        println!(
            "Speaker diarization: enabled ({}-{} speakers)",
            info.diarization_min_speakers.unwrap_or(1),
            info.diarization_max_speakers.unwrap_or(10)
        );
    } else {
        println!("Speaker diarization: disabled");
    }

    Ok(exit_codes::SUCCESS)
}
