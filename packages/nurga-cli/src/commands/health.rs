use crate::cli::HealthArgs;
use crate::commands;
use crate::exit_codes;
use crate::output;
use anyhow::Context;
use nurga_client::{ApiClient, ClientConfig};

pub async fn execute(args: HealthArgs, config: ClientConfig) -> i32 {
    commands::finish(run(args, config).await)
}

async fn run(args: HealthArgs, config: ClientConfig) -> anyhow::Result<i32> {
    let client = ApiClient::new(config)?;
    let health = client.health().await.with_context(|| {
        format!("Server at {} is not reachable", client.config().api_base_url)
    })?;

    if args.json {
        let json = output::to_json(&health, false).map_err(anyhow::Error::msg)?;
        output::write_output(&json, None)?;
    } else {
        println!(
            "{}: {}",
            health.service.as_deref().unwrap_or("server"),
            health.status
        );
    }

    if health.is_healthy() {
        Ok(exit_codes::SUCCESS)
    } else {
        Ok(exit_codes::CONNECTION_ERROR)
    }
}
