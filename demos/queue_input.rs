//! Example: Queue Input
//!
//! A producer task feeds JSON lines into a bounded queue while the pipeline
//! consumes them as an async stream. The aggregated result is emitted once the
//! producer closes the queue. Press Ctrl+C to cancel early.
//!
//! Usage:
//!   cargo run --example queue_input

use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;

use stepflow::prelude::*;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Reading {
    sensor: String,
    celsius: f64,
}

stepflow::custom_arg!(Reading);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(tracing::Level::WARN)
        .init();

    let errors = CollectErrors::new();
    let options = PipelineOptions::new()
        .with_name("readings")
        .with_channel_capacity(4)
        .with_error_handler(errors.clone());

    let cancellation = options.cancellation().clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancellation.cancel();
        }
    });

    // Producer: write JSON lines into a pipe, including one malformed line
    let (mut writer, reader) = tokio::io::duplex(256);
    tokio::spawn(async move {
        let sensors = ["north", "south", "east"];
        for i in 0..12 {
            let reading = Reading {
                sensor: sensors[i % sensors.len()].to_string(),
                celsius: 18.0 + i as f64 * 0.5,
            };
            let Ok(mut line) = serde_json::to_string(&reading) else {
                continue;
            };
            line.push('\n');
            if writer.write_all(line.as_bytes()).await.is_err() {
                return;
            }
            if i == 5 && writer.write_all(b"{not json}\n").await.is_err() {
                return;
            }
        }
    });

    let input = json_lines_queue::<Reading, _>(tokio::io::BufReader::new(reader), &options);
    let mut pipeline = Pipeline::try_new(
        input,
        Steps::new()
            .then(filter(|r: &Reading| r.celsius.is_finite()))
            .aggregate(group_by(|r: Reading| (r.sensor, r.celsius))),
    )?
    .with_options(options);

    let mut stream = std::pin::pin!(pipeline.stream());
    while let Some(value) = stream.next().await {
        let groups: indexmap::IndexMap<String, Vec<f64>> = value.get()?;
        for (sensor, readings) in groups {
            let mean = readings.iter().sum::<f64>() / readings.len() as f64;
            println!("{sensor}: {} readings, mean {mean:.2}", readings.len());
        }
    }

    for message in errors.messages() {
        eprintln!("skipped: {}", message);
    }
    Ok(())
}
