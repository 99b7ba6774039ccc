// Terminal presenter: follows a Task Channel and draws progress on stderr
//
// Channel events are forwarded into a tokio mpsc channel (TaskChannel::open_stream)
// and consumed here, next to Ctrl-C. Interrupting closes the channel, so no
// event is printed after the user gave up.

use anyhow::Context;
use nurga_client::{ProgressEvent, TaskChannel, TaskHandle};
use serde_json::Value;
use std::io::{IsTerminal, Write};

const BAR_WIDTH: usize = 30;

/// How following a task ended
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Succeeded(Value),
    Failed(String),
    /// Both transports gave up before the job finished
    Lost(String),
    Interrupted,
}

pub async fn follow(channel: &TaskChannel, handle: TaskHandle, quiet: bool) -> anyhow::Result<Outcome> {
    let task_id = handle.task_id().to_string();
    let (channel_ref, mut events) = channel
        .open_stream(handle)
        .with_context(|| format!("Failed to follow task '{}'", task_id))?;

    let mut progress = ProgressLine::new(quiet);
    let interrupt = tokio::signal::ctrl_c();
    tokio::pin!(interrupt);

    let outcome = loop {
        tokio::select! {
            _ = &mut interrupt => {
                channel_ref.close();
                break Outcome::Interrupted;
            }
            event = events.recv() => match event {
                Some(ProgressEvent::Progress { percent, label }) => progress.update(percent, &label),
                Some(ProgressEvent::Success { result }) => {
                    progress.update(100, "Done");
                    break Outcome::Succeeded(result);
                }
                Some(ProgressEvent::Failure { reason }) => break Outcome::Failed(reason),
                Some(ProgressEvent::ChannelError { reason }) => break Outcome::Lost(reason),
                None => break Outcome::Lost("Task channel closed without a result".to_string()),
            },
        }
    };

    progress.finish();
    log::info!("Task {}: {}", task_id, outcome_name(&outcome));
    Ok(outcome)
}

fn outcome_name(outcome: &Outcome) -> &'static str {
    match outcome {
        Outcome::Succeeded(_) => "succeeded",
        Outcome::Failed(_) => "failed",
        Outcome::Lost(_) => "lost",
        Outcome::Interrupted => "interrupted",
    }
}

/// Redraws in place on a terminal, otherwise prints one line per change
struct ProgressLine {
    quiet: bool,
    in_place: bool,
    last: Option<(u8, String)>,
    drawn: bool,
}

impl ProgressLine {
    fn new(quiet: bool) -> Self {
        Self {
            quiet,
            in_place: std::io::stderr().is_terminal(),
            last: None,
            drawn: false,
        }
    }

    fn update(&mut self, percent: u8, label: &str) {
        if self.quiet {
            return;
        }
        if let Some((p, l)) = &self.last {
            if *p == percent && l == label {
                return;
            }
        }
        self.last = Some((percent, label.to_string()));

        let line = render_progress(percent, label);
        let mut stderr = std::io::stderr().lock();
        let written = if self.in_place {
            write!(stderr, "\r\x1b[2K{}", line).and_then(|_| stderr.flush())
        } else {
            writeln!(stderr, "{}", line)
        };
        if written.is_ok() {
            self.drawn = true;
        }
    }

    fn finish(&mut self) {
        if self.in_place && self.drawn {
            eprintln!();
        }
    }
}

fn render_progress(percent: u8, label: &str) -> String {
    let percent = percent.min(100);
    let filled = BAR_WIDTH * percent as usize / 100;
    format!(
        "[{}{}] {:>3}% {}",
        "#".repeat(filled),
        ".".repeat(BAR_WIDTH - filled),
        percent,
        label
    )
}
