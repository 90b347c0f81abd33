mod encoding;
mod fetcher;
mod logger;
mod model;
mod processor;
mod transformer;

use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use crate::fetcher::StatusFetcher;
use crate::logger::{Logger, Reporter, TracingReporter};
use crate::model::error::ProcessorError;
use crate::processor::AccountProcessor;
use crate::transformer::RowTransformer;

/// Get account status details from API based on input account CSV.
#[derive(Parser, Debug)]
#[command(version)]
struct Args {
    /// Input CSV of account records
    #[arg(short, long = "input", value_name = "IN_CSV")]
    input: PathBuf,

    /// Endpoint for account status API
    #[arg(long)]
    url: String,

    /// Destination for output CSV
    #[arg(short, long, value_name = "OUT_CSV", default_value = "output.csv")]
    output: PathBuf,

    /// Input CSV's character encoding (output CSV uses same encoding)
    #[arg(short, long, default_value = "utf-8")]
    encoding: String,

    /// Overwrite the output file if it already exists
    #[arg(long)]
    overwrite: bool,

    /// Also append timestamped log lines to this file
    #[arg(long, value_name = "LOG_FILE")]
    log_file: Option<PathBuf>,
}

fn main() {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(Args::parse()) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(args: Args) -> Result<(), ProcessorError> {
    let encoding = encoding::resolve(&args.encoding)?;

    let reporter: Arc<dyn Reporter> = match &args.log_file {
        Some(path) => Arc::new(Logger::new(path)?),
        None => Arc::new(TracingReporter),
    };

    let fetcher = StatusFetcher::new(&args.url, reporter.clone())?;
    let transformer = RowTransformer::new(fetcher, reporter.clone());
    let processor = AccountProcessor::new(transformer, reporter);

    processor.process_file(&args.input, &args.output, args.overwrite, encoding)?;

    Ok(())
}
