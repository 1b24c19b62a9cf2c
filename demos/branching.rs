//! Example: Branching Pipeline
//!
//! Routes numbers through one of two sub-pipelines depending on their sign,
//! merges the branches back and sums the result. Output order always follows
//! input order, whichever branch an item went through.
//!
//! Usage:
//!   cargo run --example branching -- 4 -3 10 -7 2

use std::env;

use stepflow::prelude::*;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(tracing::Level::INFO)
        .init();

    let numbers: Vec<i64> = env::args()
        .skip(1)
        .map(|arg| arg.parse())
        .collect::<Result<_, _>>()?;
    let numbers = if numbers.is_empty() {
        vec![4, -3, 10, -7, 2]
    } else {
        numbers
    };

    eprintln!("=== Branching Pipeline Example ===");
    eprintln!("Input: {:?}", numbers);

    let errors = CollectErrors::new();
    let describe = steps![
        split(|x: &i64| (*x < 0) as u8),
        with_branches(vec![
            // branch 0: non-negative values are doubled
            steps![map(|x: i64| x * 2), log("positive")],
            // branch 1: negative values are made positive
            steps![map(|x: i64| x.abs()), log("negative")],
        ]),
        merge(),
    ];

    let mut pipeline = Pipeline::try_new(numbers.clone(), describe)?
        .with_name("branching")
        .with_error_handler(errors.clone());
    for (index, value) in pipeline.iter_indexed() {
        println!("{:?} -> {:?}", index, value);
    }

    let totals = steps![
        split(|x: &i64| (*x < 0) as u8),
        with_branches(vec![
            steps![map(|x: i64| x * 2)],
            steps![map(|x: i64| x.abs())],
        ]),
        merge(),
        map(|value: Value| value.get::<i64>().unwrap_or_default()),
    ]
    .aggregate(sum::<i64>());

    let mut summed = Pipeline::try_new(numbers, totals)?.with_error_handler(errors.clone());
    println!("total: {:?}", summed.collect::<i64>());

    for message in errors.messages() {
        eprintln!("error: {}", message);
    }
    Ok(())
}
