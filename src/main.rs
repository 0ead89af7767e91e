use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use docdedup::core::config::{DedupConfig, DedupConfigOverrides};
use docdedup::core::document::AnalyzeRequest;
use docdedup::core::hash::ChecksumService;
use docdedup::core::locale::Locale;
use docdedup::core::similarity::SimilarityMethod;
use docdedup::DedupService;
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

#[derive(Parser, Debug)]
#[command(name = "docdedup", version, about = "Detect duplicate document uploads")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Analyze one upload against its candidates
    Analyze {
        /// JSON file with `newFile` and `candidates`
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,
        /// Recompute `newFile.checksum` and `newFile.size` from this file
        #[arg(long, value_name = "FILE")]
        new_file_path: Option<PathBuf>,
        /// Pretty-print the output JSON
        #[arg(long)]
        pretty: bool,
        #[command(flatten)]
        engine: EngineArgs,
    },

    /// Analyze many uploads, one JSON request per line
    Batch {
        /// JSONL file of requests
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,
        #[command(flatten)]
        engine: EngineArgs,
    },

    /// Score the similarity of two text files
    Similarity {
        #[arg(long, value_name = "FILE")]
        left: PathBuf,
        #[arg(long, value_name = "FILE")]
        right: PathBuf,
        #[arg(long, value_enum, default_value_t = Method::Tfidf)]
        method: Method,
    },

    /// Print content checksums of a file or of every file under a directory
    Checksum {
        #[arg(short, long, value_name = "PATH")]
        path: PathBuf,
    },
}

#[derive(Args, Debug)]
struct EngineArgs {
    /// Config file (default: `<config dir>/docdedup/config.json` if present)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Probable-duplicate similarity threshold, between 0 and 1
    #[arg(long)]
    threshold: Option<f64>,
    /// Language of modal texts (fr, en)
    #[arg(long)]
    locale: Option<Locale>,
    /// Emit engine debug logs on stderr
    #[arg(long)]
    debug: bool,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum Method {
    Tfidf,
    Jaccard,
    Levenshtein,
}

impl From<Method> for SimilarityMethod {
    fn from(method: Method) -> Self {
        match method {
            Method::Tfidf => SimilarityMethod::TfIdf,
            Method::Jaccard => SimilarityMethod::Jaccard,
            Method::Levenshtein => SimilarityMethod::Levenshtein,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(debug_requested(&cli.command));

    match cli.command {
        Commands::Analyze {
            input,
            new_file_path,
            pretty,
            engine,
        } => {
            let service = DedupService::new(load_config(&engine)?);
            let mut request: AnalyzeRequest = read_json(&input)?;

            if let Some(path) = new_file_path {
                let checksum = ChecksumService::new()
                    .compute_checksum(&path)
                    .with_context(|| format!("Failed to hash {:?}", path))?;
                let size = fs::metadata(&path)
                    .with_context(|| format!("Failed to stat {:?}", path))?
                    .len();
                request.new_file.checksum = checksum;
                request.new_file.size = size;
            }

            let output = benchmark("analysis", || service.analyze(&request));
            info!(
                "{}: {:?} against {} candidate(s)",
                request.new_file.name,
                output.status,
                request.candidates.len()
            );

            let json = if pretty {
                serde_json::to_string_pretty(&output)?
            } else {
                serde_json::to_string(&output)?
            };
            println!("{}", json);
        }

        Commands::Batch { input, engine } => {
            let service = DedupService::new(load_config(&engine)?);
            let requests = read_requests(&input)?;

            let progress = ProgressBar::new(requests.len() as u64);
            progress.set_style(ProgressStyle::with_template(
                "{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}",
            )?);
            progress.set_message("Analyzing uploads…");

            let outputs = benchmark("batch analysis", || {
                service.analyze_batch_with(&requests, |_| progress.inc(1))
            });
            progress.finish_with_message("Analysis complete");

            let duplicates = outputs.iter().filter(|o| o.is_duplicate()).count();
            info!(
                "{} duplicate(s) among {} upload(s)",
                duplicates,
                outputs.len()
            );

            let stdout = io::stdout();
            let mut out = BufWriter::new(stdout.lock());
            for output in &outputs {
                writeln!(out, "{}", serde_json::to_string(output)?)?;
            }
            out.flush()?;
        }

        Commands::Similarity {
            left,
            right,
            method,
        } => {
            let left_text = fs::read_to_string(&left)
                .with_context(|| format!("Could not read {:?}", left))?;
            let right_text = fs::read_to_string(&right)
                .with_context(|| format!("Could not read {:?}", right))?;
            let score = SimilarityMethod::from(method).score(&left_text, &right_text);
            println!("{:.4}", score);
        }

        Commands::Checksum { path } => {
            let service = ChecksumService::new();
            if path.is_file() {
                let checksum = service
                    .compute_checksum(&path)
                    .with_context(|| format!("Failed to hash {:?}", path))?;
                println!("{}  {}", checksum, path.display());
                return Ok(());
            }

            let files = scan_directory(&path)?;
            let paths: Vec<&Path> = files.iter().map(PathBuf::as_path).collect();
            let results = benchmark("hashing all files", || {
                service.compute_checksums_batch(&paths)
            });
            for (file, result) in files.iter().zip(results) {
                match result {
                    Ok(checksum) => println!("{}  {}", checksum, file.display()),
                    Err(err) => warn!("Skipping {}: {}", file.display(), err),
                }
            }
        }
    }

    Ok(())
}

fn debug_requested(command: &Commands) -> bool {
    match command {
        Commands::Analyze { engine, .. } | Commands::Batch { engine, .. } => engine.debug,
        _ => false,
    }
}

/// Logs go to stderr so stdout stays machine-readable. `RUST_LOG` wins.
fn init_logging(debug: bool) {
    let default_filter = if debug { "docdedup=debug" } else { "docdedup=info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(io::stderr)
        .init();
}

/// Flags override the config file; anything unset falls back to defaults.
fn load_config(args: &EngineArgs) -> Result<DedupConfig> {
    let file = DedupConfig::find_overrides(args.config.as_deref())?;

    let flags = DedupConfigOverrides {
        text_similarity_threshold: args.threshold,
        locale: args.locale,
        enable_debug_logs: args.debug.then_some(true),
    };

    let config = DedupConfig::merged(file.or(flags));
    config.validate()?;
    Ok(config)
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let f = File::open(path).with_context(|| format!("Could not open {:?}", path))?;
    serde_json::from_reader(BufReader::new(f))
        .with_context(|| format!("Invalid JSON in {:?}", path))
}

/// Parse a JSONL file, skipping blank and malformed lines.
fn read_requests(path: &Path) -> Result<Vec<AnalyzeRequest>> {
    let f = File::open(path).with_context(|| format!("Could not open {:?}", path))?;
    let reader = BufReader::new(f);

    let mut requests = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = match line {
            Ok(line) => line,
            Err(err) => {
                warn!("Skipping unreadable line {}: {}", i + 1, err);
                continue;
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<AnalyzeRequest>(&line) {
            Ok(request) => requests.push(request),
            Err(err) => warn!("Skipping malformed request on line {}: {}", i + 1, err),
        }
    }
    Ok(requests)
}

/// Recursively walk `dir`, returning every regular file.
fn scan_directory(dir: &Path) -> Result<Vec<PathBuf>> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::with_template("{spinner:.green} {msg}")?);
    spinner.set_message("Scanning for files…");
    spinner.enable_steady_tick(Duration::from_millis(100));

    let mut files = Vec::new();
    for entry in WalkDir::new(dir).into_iter().filter_map(Result::ok) {
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
        spinner.tick();
    }
    spinner.finish_with_message(format!("Found {} file(s)", files.len()));
    Ok(files)
}

/// Run `f()`, log how long it took (with `label`), and return its result.
fn benchmark<T, F: FnOnce() -> T>(label: &str, f: F) -> T {
    let start = Instant::now();
    let result = f();
    info!("{} took {:.2?}", label, start.elapsed());
    result
}
