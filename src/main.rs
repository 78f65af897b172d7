//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `scrape_utils` library that handles:
//! - Command-line argument parsing
//! - Logger initialization
//! - User-facing output formatting
//!
//! All core functionality is implemented in the library crate.

use std::path::{Path, PathBuf};
use std::process;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use log::{info, warn};

use scrape_utils::config::{
    DEFAULT_ACTION_TIMEOUT_SECS, DEFAULT_FLUSH_PATH, DEFAULT_RANDOM_STRING_LENGTH,
    DEFAULT_USER_AGENT, DEFAULT_YAML_INDENT,
};
use scrape_utils::initialization::{init_client, init_logger_with};
use scrape_utils::utils::{
    calc_surrounding_coords, clean_paths, current_month_year, deslugify, extract_id,
    generate_random_string, local_timestamp, slugify, to_indented_yaml, utc_timestamp, IdKind,
};
use scrape_utils::{
    download_image, Config, DrainPolicy, ImageInfo, Lifecycle, LifecycleConfig, LogFormat, LogLevel,
    SaveDescriptor,
};

/// Command-line options.
///
/// # Examples
///
/// ```bash
/// # Slug for a place name
/// scrape_utils slug "Café de Flore"
///
/// # Six search centers around a point, 500m radius
/// scrape_utils coords --lat 48.85 --lon 2.33 --radius 500
///
/// # Download a list of images, flushing failures on exit
/// scrape_utils fetch-images urls.txt --out-dir ./images
/// ```
#[derive(Debug, Parser)]
#[command(
    name = "scrape_utils",
    about = "Helpers for scraping pipelines: slugs, geo rings, images and graceful shutdown."
)]
struct Cli {
    /// Log level: error|warn|info|debug|trace
    #[arg(long, global = true, value_enum, default_value_t = LogLevel::Info)]
    log_level: LogLevel,

    /// Log format: plain|json
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Plain)]
    log_format: LogFormat,

    /// Deadline for each save action during shutdown, in seconds
    #[arg(long, global = true, default_value_t = DEFAULT_ACTION_TIMEOUT_SECS)]
    shutdown_timeout_secs: u64,

    /// Where leftover pending items are written on normal exit
    #[arg(long, global = true, value_parser, default_value = DEFAULT_FLUSH_PATH)]
    unsaved_path: PathBuf,

    /// What the shutdown drain does after a failed save action
    #[arg(long, global = true, value_enum, default_value_t = DrainPolicy::FailFast)]
    drain_policy: DrainPolicy,

    /// HTTP User-Agent header value
    #[arg(long, global = true, default_value = DEFAULT_USER_AGENT)]
    user_agent: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the URL slug for a name
    Slug { name: String },

    /// Turn a slug back into space-separated words
    Deslug { slug: String },

    /// Print the six hexagonal neighbours of a search center as YAML
    Coords {
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        #[arg(long, allow_negative_numbers = true)]
        lon: f64,
        /// Search radius in meters
        #[arg(long)]
        radius: f64,
        #[arg(long, default_value_t = DEFAULT_YAML_INDENT)]
        indent: usize,
    },

    /// Print the current timestamp
    Timestamp {
        /// Use UTC instead of local time
        #[arg(long)]
        utc: bool,
        /// Print the month label (e.g. "January_2025") instead
        #[arg(long, conflicts_with = "utc")]
        month_year: bool,
    },

    /// Extract a review, photo or place ID from a resource name
    ExtractId {
        resource: String,
        #[arg(long, value_enum)]
        kind: IdKind,
    },

    /// Print a random token of ASCII letters, digits and `_`
    RandomString {
        #[arg(long, default_value_t = DEFAULT_RANDOM_STRING_LENGTH)]
        length: usize,
    },

    /// Convert a JSON file to YAML
    Yaml {
        #[arg(value_parser)]
        file: PathBuf,
        #[arg(long, default_value_t = DEFAULT_YAML_INDENT)]
        indent: usize,
    },

    /// Delete every path matching a glob pattern
    Clean { pattern: String },

    /// Download one image to STEM plus an extension from its Content-Type
    DownloadImage {
        url: String,
        #[arg(value_parser)]
        stem: PathBuf,
    },

    /// Download every image URL listed in a file (one per line)
    ///
    /// Writes a YAML manifest of the downloaded images. URLs still pending
    /// when the run ends are flushed to the unsaved path. On SIGINT/SIGTERM
    /// the manifest is written before exiting.
    FetchImages {
        #[arg(value_parser)]
        file: PathBuf,
        #[arg(long, value_parser, default_value = "./images")]
        out_dir: PathBuf,
    },
}

impl Cli {
    fn to_config(&self) -> Config {
        Config {
            log_level: self.log_level.clone(),
            log_format: self.log_format.clone(),
            user_agent: self.user_agent.clone(),
            lifecycle: LifecycleConfig {
                action_timeout: Duration::from_secs(self.shutdown_timeout_secs),
                flush_path: self.unsaved_path.clone(),
                drain_policy: self.drain_policy,
            },
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.to_config();
    config.validate().context("Invalid configuration")?;

    init_logger_with(config.log_level.clone().into(), config.log_format.clone())
        .context("Failed to initialize logger")?;

    if let Err(e) = run(cli.command, config).await {
        eprintln!("scrape_utils error: {:#}", e);
        process::exit(1);
    }
    Ok(())
}

async fn run(command: Command, config: Config) -> Result<()> {
    match command {
        Command::Slug { name } => println!("{}", slugify(&name)),
        Command::Deslug { slug } => println!("{}", deslugify(&slug)),
        Command::Coords {
            lat,
            lon,
            radius,
            indent,
        } => {
            let ring = calc_surrounding_coords(lat, lon, radius);
            print!("{}", to_indented_yaml(&ring, indent)?);
        }
        Command::Timestamp { utc, month_year } => {
            let stamp = if month_year {
                current_month_year()
            } else if utc {
                utc_timestamp()
            } else {
                local_timestamp()
            };
            println!("{}", stamp);
        }
        Command::ExtractId { resource, kind } => {
            let id = extract_id(&resource, kind)
                .ok_or_else(|| anyhow!("no {} id found in '{}'", kind, resource))?;
            println!("{}", id);
        }
        Command::RandomString { length } => println!("{}", generate_random_string(length)),
        Command::Yaml { file, indent } => {
            let raw = tokio::fs::read_to_string(&file)
                .await
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let value: serde_json::Value = serde_json::from_str(&raw)
                .with_context(|| format!("{} is not valid JSON", file.display()))?;
            print!("{}", to_indented_yaml(&value, indent)?);
        }
        Command::Clean { pattern } => {
            let removed = clean_paths(&pattern).await;
            println!("Removed {} path{}", removed, if removed == 1 { "" } else { "s" });
        }
        Command::DownloadImage { url, stem } => {
            let client = init_client(&config).context("Failed to initialize HTTP client")?;
            let image = download_image(&client, &url, &stem).await?;
            println!("{} ({}x{})", image.path.display(), image.width, image.height);
        }
        Command::FetchImages { file, out_dir } => fetch_images(&file, &out_dir, config).await?,
    }
    Ok(())
}

/// Downloads every URL in `file`, coordinating the manifest with shutdown.
async fn fetch_images(file: &Path, out_dir: &Path, config: Config) -> Result<()> {
    let urls = read_url_list(file).await?;
    tokio::fs::create_dir_all(out_dir)
        .await
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;

    let client = init_client(&config).context("Failed to initialize HTTP client")?;
    let pending = Arc::new(Mutex::new(urls.clone()));
    let manifest: Arc<Mutex<Vec<ImageInfo>>> = Arc::new(Mutex::new(Vec::new()));
    let manifest_path = out_dir.join("manifest.yaml");

    let lifecycle = Arc::new(Lifecycle::for_process(config.lifecycle.clone()));
    lifecycle.add(
        SaveDescriptor::new(
            "image-manifest",
            (manifest.clone(), manifest_path.clone()),
            |(manifest, path)| async move { write_manifest(&manifest, &path).await },
        )
        .with_pending_items(pending.clone()),
    )?;
    lifecycle.install_signal_handlers()?;

    info!("Fetching {} image(s) into {}", urls.len(), out_dir.display());
    for (index, url) in urls.iter().enumerate() {
        let stem = out_dir.join(image_stem(index, url));
        match download_image(&client, url, &stem).await {
            Ok(image) => {
                lock(&manifest)?.push(image);
                lock(&pending)?.retain(|u| u != url);
            }
            Err(e) => warn!("Failed to download {}: {}", url, e),
        }
    }

    write_manifest(&manifest, &manifest_path).await?;
    let done = lock(&manifest)?.len();
    println!(
        "Downloaded {} of {} image{} - manifest at {}",
        done,
        urls.len(),
        if urls.len() == 1 { "" } else { "s" },
        manifest_path.display()
    );

    lifecycle.finish().await;
    Ok(())
}

async fn read_url_list(file: &Path) -> Result<Vec<String>> {
    let raw = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;
    Ok(raw
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect())
}

/// File stem for the `index`-th URL: a zero-padded index plus the slugged
/// last path segment, so repeated names cannot collide.
fn image_stem(index: usize, url: &str) -> String {
    let name = url::Url::parse(url)
        .ok()
        .and_then(|parsed| {
            parsed
                .path_segments()
                .and_then(|mut segments| segments.next_back().map(str::to_string))
        })
        .map(|segment| {
            let stem = Path::new(&segment)
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            slugify(&stem)
        })
        .unwrap_or_default();

    if name.is_empty() {
        format!("{:04}-image", index)
    } else {
        format!("{:04}-{}", index, name)
    }
}

async fn write_manifest(manifest: &Mutex<Vec<ImageInfo>>, path: &Path) -> Result<()> {
    let images = lock(manifest)?.clone();
    let yaml = to_indented_yaml(&images, DEFAULT_YAML_INDENT)?;
    tokio::fs::write(path, yaml)
        .await
        .with_context(|| format!("Failed to write manifest {}", path.display()))?;
    info!("Wrote manifest with {} image(s) to {}", images.len(), path.display());
    Ok(())
}

fn lock<T>(mutex: &Mutex<T>) -> Result<std::sync::MutexGuard<'_, T>> {
    mutex.lock().map_err(|_| anyhow!("shared state poisoned"))
}
