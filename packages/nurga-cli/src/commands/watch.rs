use crate::cli::WatchArgs;
use crate::commands;
use crate::presenter;
use nurga_client::{ClientConfig, TaskChannel, TaskHandle};

pub async fn execute(args: WatchArgs, config: ClientConfig) -> i32 {
    commands::finish(run(args, config).await)
}

async fn run(args: WatchArgs, config: ClientConfig) -> anyhow::Result<i32> {
    let channel = TaskChannel::new(&config)?;
    let handle = TaskHandle::new(args.task_id.trim(), config.api_key.clone());

    if !args.quiet {
        eprintln!("Watching task {}...", handle.task_id());
    }
    let outcome = presenter::follow(&channel, handle, args.quiet).await?;
    commands::report(&outcome, args.json, args.output.as_deref())
}
