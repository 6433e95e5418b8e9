use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};

use swim_rankings::config::RankingConfig;
use swim_rankings::execution::{
    ExecutionEngine, ExecutionObserver, ExecutionOptions, FanOutExecutionObserver, FileExecutionObserver,
    StdErrExecutionObserver,
};
use swim_rankings::ingestion::{CompositeObserver, FileObserver, IngestionObserver, StdErrObserver};
use swim_rankings::output::{CsvSink, ReportSink, XlsxSink};
use swim_rankings::pipeline::{Pipeline, RunSummary};

#[derive(Parser, Debug)]
#[command(version, about = "Merge, summarize and project swimming ranking exports")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Merge the same age group exported by several regions into one workbook
    Combine(CommonArgs),
    /// Write a percentile summary for every results file
    Percentiles(CommonArgs),
    /// Project target times across age groups into Men/Women reports
    Project(CommonArgs),
}

#[derive(Args, Debug)]
struct CommonArgs {
    /// Directory holding the ranking exports
    #[arg(short, long)]
    input: PathBuf,

    /// Directory the reports are written to
    #[arg(short, long)]
    output: PathBuf,

    /// JSON file overriding the default settings
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Report file format
    #[arg(short, long, value_enum, default_value_t = Format::Xlsx)]
    format: Format,

    /// Worker threads (defaults to available parallelism)
    #[arg(short = 'j', long)]
    threads: Option<usize>,

    /// Only read input files whose name matches this glob
    #[arg(long)]
    pattern: Option<String>,

    /// Also append progress and read outcomes to this file
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Format {
    Xlsx,
    Csv,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let (command, args) = match &cli.command {
        Command::Combine(a) => ("combine", a),
        Command::Percentiles(a) => ("percentiles", a),
        Command::Project(a) => ("project", a),
    };

    if !args.input.is_dir() {
        return Err(anyhow!("input directory not found: {}", args.input.display()));
    }
    let pipeline = build_pipeline(args)?;

    let summary = match &cli.command {
        Command::Combine(_) => pipeline.combine(&args.input),
        Command::Percentiles(_) => pipeline.percentiles(&args.input),
        Command::Project(_) => pipeline.projections(&args.input),
    }
    .with_context(|| format!("{command} failed"))?;

    print_summary(command, &summary);
    if summary.is_clean() {
        Ok(())
    } else {
        Err(anyhow!("{} item(s) failed", summary.failed.len()))
    }
}

fn build_pipeline(args: &CommonArgs) -> Result<Pipeline> {
    let config = match &args.config {
        Some(path) => RankingConfig::from_json_path(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => RankingConfig::default(),
    };

    let mut exec_observers: Vec<Arc<dyn ExecutionObserver>> = vec![Arc::new(StdErrExecutionObserver)];
    let mut read_observers: Vec<Arc<dyn IngestionObserver>> = vec![Arc::new(StdErrObserver)];
    if let Some(log) = &args.log_file {
        exec_observers.push(Arc::new(FileExecutionObserver::new(log)));
        read_observers.push(Arc::new(FileObserver::new(log)));
    }

    let engine = ExecutionEngine::new(ExecutionOptions {
        num_threads: args.threads,
    })?
    .with_observer(Arc::new(FanOutExecutionObserver::new(exec_observers)));

    let sink: Arc<dyn ReportSink> = match args.format {
        Format::Xlsx => Arc::new(XlsxSink::new(&args.output)),
        Format::Csv => Arc::new(CsvSink::new(&args.output)),
    };

    let mut pipeline = Pipeline::new(config, engine, sink)?
        .with_ingestion_observer(Arc::new(CompositeObserver::new(read_observers)));
    if let Some(pattern) = &args.pattern {
        pipeline = pipeline.with_file_pattern(pattern.clone());
    }
    Ok(pipeline)
}

fn print_summary(command: &str, summary: &RunSummary) {
    println!("{command}: {} file(s) written", summary.written.len());
    for path in &summary.written {
        println!("  + {}", path.display());
    }
    for (item, reason) in &summary.skipped {
        println!("  - skipped {item}: {reason}");
    }
    for (item, error) in &summary.failed {
        println!("  ! failed {item}: {error}");
    }
}
