use clap::Parser;

mod cli;
mod commands;
mod exit_codes;
mod output;
mod presenter;

use cli::{Cli, Command};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp(None)
        .init();

    // Only commands that talk to the server need a valid configuration
    let config = cli.client_config();

    let exit_code = match (cli.command, config) {
        (Command::Languages(args), _) => commands::languages::execute(args),
        (_, Err(e)) => {
            eprintln!("Error: {}", e);
            exit_codes::INPUT_ERROR
        }
        (Command::Transcribe(args), Ok(config)) => commands::transcribe::execute(args, config).await,
        (Command::Watch(args), Ok(config)) => commands::watch::execute(args, config).await,
        (Command::Status(args), Ok(config)) => commands::status::execute(args, config).await,
        (Command::Download(args), Ok(config)) => commands::download::execute(args, config).await,
        (Command::Health(args), Ok(config)) => commands::health::execute(args, config).await,
        (Command::Info(args), Ok(config)) => commands::info::execute(args, config).await,
    };

    std::process::exit(exit_code);
}
