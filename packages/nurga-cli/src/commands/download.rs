use crate::cli::DownloadArgs;
use crate::commands;
use crate::exit_codes;
use anyhow::Context;
use nurga_client::{ApiClient, ClientConfig};

pub async fn execute(args: DownloadArgs, config: ClientConfig) -> i32 {
    commands::finish(run(args, config).await)
}

async fn run(args: DownloadArgs, config: ClientConfig) -> anyhow::Result<i32> {
    let client = ApiClient::new(config)?;
    let path = client
        .download_to(&args.task_id, args.format, &args.output_dir)
        .await
        .with_context(|| format!("Failed to download the {} export", args.format))?;

    println!("{}", path.display());
    Ok(exit_codes::SUCCESS)
}
