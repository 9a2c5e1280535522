//! Interactive read-eval-print loop.
//!
//! Generic over the reader and writer so the binary drives it with
//! stdin/stdout and tests drive it with in-memory buffers.

use std::io::{BufRead, Write};

use thiserror::Error;

use crate::config::DISCLAIMER;
use crate::pipeline::explain::{ExplainablePipeline, PipelineError};

pub const BANNER: &str = "Explainable Amharic Symptom Chatbot (Prototype)";
pub const PROMPT: &str = "\nAmharic input (or 'exit'): ";

#[derive(Error, Debug)]
pub enum ShellError {
    #[error("Shell I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// `exit`, `quit` or `:q`, ignoring case and surrounding whitespace.
pub fn is_exit_command(line: &str) -> bool {
    let line = line.trim();
    ["exit", "quit", ":q"]
        .iter()
        .any(|cmd| line.eq_ignore_ascii_case(cmd))
}

/// Run the loop until end of input or an exit command.
///
/// Returns the number of inputs explained. A failed request is reported on
/// `writer` and the loop continues; only I/O failures end it early.
pub fn run_shell<R: BufRead, W: Write>(
    pipeline: &ExplainablePipeline,
    mut reader: R,
    mut writer: W,
) -> Result<usize, ShellError> {
    writeln!(writer, "{BANNER}")?;
    writeln!(writer, "{DISCLAIMER}")?;

    let mut explained = 0;
    let mut line = String::new();
    loop {
        write!(writer, "{PROMPT}")?;
        writer.flush()?;

        line.clear();
        if reader.read_line(&mut line)? == 0 {
            break;
        }

        let text = line.trim();
        if text.is_empty() {
            continue;
        }
        if is_exit_command(text) {
            break;
        }

        match explain_line(pipeline, text) {
            Ok(json) => {
                writeln!(writer, "{json}")?;
                explained += 1;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to explain input");
                writeln!(writer, "Error: {e}")?;
            }
        }
    }

    writeln!(writer)?;
    Ok(explained)
}

fn explain_line(pipeline: &ExplainablePipeline, text: &str) -> Result<String, PipelineError> {
    Ok(pipeline.run(text)?.to_pretty_json()?)
}
