use crate::cli::StatusArgs;
use crate::commands;
use crate::exit_codes;
use crate::output;
use anyhow::Context;
use nurga_client::{ApiClient, ClientConfig};

pub async fn execute(args: StatusArgs, config: ClientConfig) -> i32 {
    commands::finish(run(args, config).await)
}

async fn run(args: StatusArgs, config: ClientConfig) -> anyhow::Result<i32> {
    let client = ApiClient::new(config)?;
    let status = client
        .status(&args.task_id)
        .await
        .with_context(|| format!("Failed to fetch status of task '{}'", args.task_id))?;

    let json = output::to_json(&status, args.compact).map_err(anyhow::Error::msg)?;
    output::write_output(&json, args.output.as_deref())?;
    Ok(exit_codes::SUCCESS)
}
