use stepflow::prelude::*;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(tracing::Level::WARN)
        .init();

    let input_file = match parse_args(std::env::args().collect()) {
        Ok(path) => path,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(2);
        }
    };

    CliApp::new("stepflow")
        .run(|context| run_totals(context, input_file))
        .await
}

/// Parse and validate command-line arguments
fn parse_args(args: Vec<String>) -> Result<String, AppError> {
    if args.len() != 2 {
        return Err(AppError::InvalidArguments(
            "Usage: stepflow <rows.csv>".to_string(),
        ));
    }
    Ok(args[1].clone())
}

/// Group the file's `key,value` rows and print per-key count and total
async fn run_totals(mut context: RunContext, input_file: String) -> Result<(), AppError> {
    if !std::path::Path::new(&input_file).exists() {
        return Err(AppError::FileNotFound(input_file));
    }

    let options = PipelineOptions::new()
        .with_name("totals")
        .with_cancellation(context.cancellation.clone());
    let input = csv_queue_from_file::<Row>(&input_file, &options).await?;

    let totals = group_totals(input, options).await?;
    write_totals(&totals, &mut context.stdout).await
}
