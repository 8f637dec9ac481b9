use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::Parser;
use indicatif::MultiProgress;
use tokio::io::AsyncWriteExt;

use pulse_core::{
    url_key, ClientConfig, ProgressError, ProgressInterceptor, ProgressNotifier, ProgressObserver,
    ProgressRegistry,
};

mod json_observer;
mod terminal_observer;
use json_observer::JsonLineObserver;
use terminal_observer::TerminalProgressObserver;

#[derive(Parser)]
#[command(name = "pulse", about = "Download URLs with per-URL progress reporting")]
struct Args {
    /// URLs to download
    #[arg(required = true)]
    urls: Vec<String>,

    /// Output directory
    #[arg(short, long, default_value = ".")]
    output: PathBuf,

    /// Report progress roughly every N percent (0 reports every read)
    #[arg(short, long, default_value = "1.0")]
    granularity: f32,

    /// Connect timeout in seconds (overrides PULSE_CONNECT_TIMEOUT_SECS)
    #[arg(long)]
    connect_timeout: Option<u64>,

    /// Read timeout in seconds (overrides PULSE_READ_TIMEOUT_SECS)
    #[arg(long)]
    read_timeout: Option<u64>,

    /// Print progress as JSON lines instead of progress bars
    #[arg(long)]
    json: bool,
}

enum Reporter {
    Terminal(MultiProgress),
    Json,
}

impl Reporter {
    fn observer_for(&self, url: &str, granularity: f32) -> Arc<dyn ProgressObserver> {
        match self {
            Reporter::Terminal(multi) => Arc::new(TerminalProgressObserver::new(
                multi,
                file_name_for(url),
                granularity,
            )),
            Reporter::Json => Arc::new(JsonLineObserver::new(url, granularity)),
        }
    }
}

fn build_config(args: &Args) -> Result<ClientConfig, ProgressError> {
    let mut config = ClientConfig::from_env()?;
    if let Some(secs) = args.connect_timeout {
        config = config.with_connect_timeout(Duration::from_secs(secs));
    }
    if let Some(secs) = args.read_timeout {
        config = config.with_read_timeout(Duration::from_secs(secs));
    }
    Ok(config)
}

/// Last non-empty path segment of `url`, or `download`.
fn file_name_for(url: &str) -> String {
    let without_scheme = url.split_once("://").map_or(url, |(_, rest)| rest);
    let path = without_scheme
        .split(['?', '#'])
        .next()
        .unwrap_or_default();
    path.split('/')
        .skip(1) // authority
        .filter(|segment| !segment.is_empty())
        .last()
        .map(|segment| segment.to_string())
        .unwrap_or_else(|| "download".to_string())
}

/// Drops URLs whose registry key repeats an earlier one; a key holds a single
/// registration. Unparseable URLs are kept and fail on their own.
fn unique_urls(urls: &[String]) -> Vec<&str> {
    let mut seen = std::collections::HashSet::new();
    urls.iter()
        .filter(|url| match url_key(url) {
            Ok(key) => {
                let fresh = seen.insert(key);
                if !fresh {
                    log::warn!("[pulse] skipping duplicate URL {}", url);
                }
                fresh
            }
            Err(_) => true,
        })
        .map(String::as_str)
        .collect()
}

async fn fetch_to_file(
    interceptor: &ProgressInterceptor,
    key: &str,
    output_dir: &Path,
) -> Result<PathBuf, ProgressError> {
    let response = interceptor.get(key).await?;
    if !response.status().is_success() {
        return Err(ProgressError::UnexpectedStatus {
            url: key.to_string(),
            status: response.status().as_u16(),
        });
    }

    let path = output_dir.join(file_name_for(key));
    let mut file = tokio::fs::File::create(&path).await?;
    let mut reader = response.into_async_read();
    let copied = tokio::io::copy(&mut reader, &mut file).await?;
    file.flush().await?;
    log::info!("[pulse] {} -> {} ({} bytes)", key, path.display(), copied);
    Ok(path)
}

async fn download_one(
    interceptor: &ProgressInterceptor,
    reporter: &Reporter,
    url: &str,
    output_dir: &Path,
    granularity: f32,
) -> Result<PathBuf, ProgressError> {
    let key = url_key(url)?;
    let registry = interceptor.registry();
    registry.expect(key.clone(), reporter.observer_for(&key, granularity));

    let result = fetch_to_file(interceptor, &key, output_dir).await;

    // Completed downloads are already forgotten; failed ones are not.
    registry.forget(&key);
    result
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    let config = match build_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let (handle, notifier) = ProgressNotifier::new();
    let notifier_handle = tokio::spawn(notifier.run());
    let registry = Arc::new(ProgressRegistry::new(handle));

    let interceptor = match ProgressInterceptor::from_config(&config, Arc::clone(&registry)) {
        Ok(interceptor) => interceptor,
        Err(e) => {
            eprintln!("Failed to build HTTP client: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let reporter = if args.json {
        Reporter::Json
    } else {
        Reporter::Terminal(MultiProgress::new())
    };

    if let Err(e) = tokio::fs::create_dir_all(&args.output).await {
        eprintln!("Cannot create {}: {}", args.output.display(), e);
        return ExitCode::FAILURE;
    }

    let urls = unique_urls(&args.urls);
    let start = Instant::now();
    let downloads = urls.iter().map(|url| {
        download_one(&interceptor, &reporter, url, &args.output, args.granularity)
    });
    let results = futures::future::join_all(downloads).await;

    // Dropping the last registry reference closes the notifier channel.
    drop(interceptor);
    drop(registry);
    let _ = notifier_handle.await;

    let mut failed = 0;
    for (url, result) in urls.iter().zip(results) {
        match result {
            Ok(path) => {
                if !args.json {
                    println!("{} -> {}", url, path.display());
                }
            }
            Err(e) => {
                failed += 1;
                log::error!("[pulse] {} failed: {}", url, e);
                eprintln!("Download failed: {}: {}", url, e);
            }
        }
    }

    if !args.json {
        println!(
            "{} of {} downloads completed in {:.2}s",
            urls.len() - failed,
            urls.len(),
            start.elapsed().as_secs_f64()
        );
    }

    if failed == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
