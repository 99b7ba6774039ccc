pub mod download;
pub mod health;
pub mod info;
pub mod languages;
pub mod status;
pub mod transcribe;
pub mod watch;

use crate::exit_codes;
use crate::output;
use crate::presenter::Outcome;
use nurga_client::api::TranscriptionResult;
use std::path::Path;

/// Turn a command body's result into an exit code, printing the error chain
pub fn finish(result: anyhow::Result<i32>) -> i32 {
    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            exit_codes::for_error(&e)
        }
    }
}

/// Print the end of a followed task and pick the exit code
pub fn report(outcome: &Outcome, json: bool, output_path: Option<&Path>) -> anyhow::Result<i32> {
    match outcome {
        Outcome::Succeeded(result) => {
            let text = if json {
                output::to_json(result, false).map_err(anyhow::Error::msg)?
            } else {
                let typed = TranscriptionResult::from_value(result)?;
                output::render_result(&typed)
            };
            output::write_output(&text, output_path)?;
            Ok(exit_codes::SUCCESS)
        }
        Outcome::Failed(reason) => {
            eprintln!("Transcription failed: {}", reason);
            Ok(exit_codes::TASK_FAILED)
        }
        Outcome::Lost(reason) => {
            eprintln!("Lost track of the task: {}", reason);
            Ok(exit_codes::CONNECTION_ERROR)
        }
        Outcome::Interrupted => {
            eprintln!("Interrupted");
            Ok(exit_codes::INTERRUPTED)
        }
    }
}
