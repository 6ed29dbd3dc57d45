use clap::{Args, Parser, Subcommand};
use shardset::{LoadConfig, LoadOrigin, Loader, LoaderError, RecordLimit};
use std::collections::HashMap;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "shardset")]
#[command(about = "Load sharded gzip JSON datasets", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load every split and print a summary
    Load {
        #[command(flatten)]
        source: SourceArgs,
        /// Print the whole bundle as JSON instead of the summary
        #[arg(long)]
        json: bool,
    },
    /// Load, then print one record of one split
    Inspect {
        #[command(flatten)]
        source: SourceArgs,
        /// Split to read from
        #[arg(long)]
        split: String,
        /// Position within the split
        #[arg(long)]
        index: usize,
    },
}

#[derive(Args)]
struct SourceArgs {
    /// Directory holding train/, val/ and test/
    #[arg(long, conflicts_with = "splits")]
    root: Option<PathBuf>,
    /// Explicit split source, NAME=PATH (repeatable)
    #[arg(long = "split-path", value_name = "NAME=PATH", value_parser = parse_pair::<PathBuf>)]
    splits: Vec<(String, PathBuf)>,
    /// 0 = sequential, negative = all cores
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    workers: i32,
    /// Read/write dataset_cache.pkl.gz under --root
    #[arg(long)]
    cache: bool,
    /// Cap on records for every split
    #[arg(long, conflicts_with = "max_records_split")]
    max_records: Option<usize>,
    /// Cap on records for one split, NAME=N (repeatable)
    #[arg(long, value_name = "NAME=N", value_parser = parse_pair::<usize>)]
    max_records_split: Vec<(String, usize)>,
    #[arg(long, default_value = shardset::config::DEFAULT_DATASET_NAME)]
    dataset_name: String,
    #[arg(long)]
    no_progress: bool,
}

fn parse_pair<T: std::str::FromStr>(s: &str) -> Result<(String, T), String>
where
    T::Err: std::fmt::Display,
{
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got {}", s))?;
    let value = value.parse::<T>().map_err(|e| format!("bad value in {}: {}", s, e))?;
    Ok((name.to_string(), value))
}

impl SourceArgs {
    fn into_config(self) -> LoadConfig {
        let mut config = LoadConfig {
            path_to_splits: self.root,
            split_to_path: (!self.splits.is_empty()).then_some(self.splits),
            ..LoadConfig::default()
        };
        if let Some(n) = self.max_records {
            config = config.with_record_limit(RecordLimit::Uniform(n));
        } else if !self.max_records_split.is_empty() {
            let map: HashMap<String, usize> = self.max_records_split.into_iter().collect();
            config = config.with_record_limit(RecordLimit::PerSplit(map));
        }
        config
            .with_num_workers(self.workers)
            .with_cache(self.cache)
            .with_dataset_name(self.dataset_name)
            .with_progress(!self.no_progress)
    }
}

fn main() -> Result<(), LoaderError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Load { source, json } => {
            let report = Loader::new(source.into_config())?.load()?;
            if json {
                let out = serde_json::to_string_pretty(&report.bundle)
                    .map_err(|e| LoaderError::Config(e.to_string()))?;
                println!("{}", out);
                return Ok(());
            }
            let origin = match report.origin {
                LoadOrigin::Cache => "cache",
                LoadOrigin::Fresh => "source files",
            };
            println!("[shardset] Loaded {} split(s) from {}", report.bundle.len(), origin);
            for split in report.bundle.iter() {
                println!(
                    "[shardset]   {:<8} {:>10} records ({} absent)",
                    split.split(),
                    split.len(),
                    split.absent_count()
                );
            }
            if !report.warnings.is_empty() {
                println!("[shardset] {} warning(s) during load", report.warnings.len());
            }
        }
        Commands::Inspect { source, split, index } => {
            let report = Loader::new(source.into_config())?.load()?;
            let dataset = report
                .bundle
                .get(&split)
                .ok_or_else(|| LoaderError::Config(format!("split {} was not loaded", split)))?;
            let value = dataset
                .get(index)
                .ok_or_else(|| {
                    LoaderError::Config(format!("index {} out of range for split {} ({} records)", index, split, dataset.len()))
                })?
                .map_err(|e| LoaderError::Config(format!("record {} is not valid JSON: {}", index, e)))?;
            let pretty = serde_json::to_string_pretty(&value)
                .map_err(|e| LoaderError::Config(e.to_string()))?;
            println!("{}", pretty);
        }
    }
    Ok(())
}
