use std::path::Path;

use serde::de::DeserializeOwned;
use tokio::fs::File;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{debug, warn};

use super::error::IoError;
use crate::engine::PipelineError;
use crate::step::Arg;
use crate::streaming::{Input, PipelineOptions};

/// Decode a JSON array into a finite input
pub fn read_json<T, R>(reader: R) -> Result<Input<T>, IoError>
where
    T: Arg + DeserializeOwned,
    R: std::io::Read,
{
    let records: Vec<T> = serde_json::from_reader(reader)?;
    debug!(records = records.len(), "Read JSON input");
    Ok(Input::Items(records))
}

/// Strip array punctuation from a line of a one-record-per-line document
fn record_text(line: &str) -> Option<&str> {
    let line = line.trim();
    let line = line.strip_suffix(',').unwrap_or(line).trim_end();
    match line {
        "" | "[" | "]" => None,
        record => Some(record),
    }
}

/// Decode one JSON record per line on a background task, feeding a queue input
///
/// Accepts JSON-lines as well as an array written one element per line.
/// Undecodable lines are reported and skipped. Must be called within a
/// tokio runtime.
pub fn json_lines_queue<T, R>(reader: R, options: &PipelineOptions) -> Input<T>
where
    T: Arg + DeserializeOwned,
    R: AsyncBufRead + Unpin + Send + 'static,
{
    let (sender, input) = Input::channel(options.channel_capacity());
    let options = options.clone();

    tokio::spawn(async move {
        let cancel = options.cancellation().clone();
        let mut lines = reader.lines();

        loop {
            let line = tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("JSON reader cancelled");
                    break;
                }
                line = lines.next_line() => line,
            };
            let line = match line {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(e) => {
                    warn!(error = %e, "Failed to read JSON input");
                    options.report(PipelineError::Input(IoError::from(e)));
                    break;
                }
            };
            let Some(text) = record_text(&line) else {
                continue;
            };
            let record = match serde_json::from_str::<T>(text) {
                Ok(record) => record,
                Err(e) => {
                    warn!(error = %e, "Failed to decode JSON record");
                    options.report(PipelineError::Input(IoError::from(e)));
                    continue;
                }
            };
            tokio::select! {
                _ = cancel.cancelled() => break,
                sent = sender.send(record) => {
                    if sent.is_err() {
                        debug!("JSON queue receiver dropped");
                        break;
                    }
                }
            }
        }
    });

    input
}

/// Open `path` and stream its JSON records into a queue input
pub async fn json_lines_queue_from_file<T>(
    path: impl AsRef<Path>,
    options: &PipelineOptions,
) -> Result<Input<T>, IoError>
where
    T: Arg + DeserializeOwned,
{
    let file = File::open(path.as_ref()).await?;
    Ok(json_lines_queue(BufReader::new(file), options))
}
