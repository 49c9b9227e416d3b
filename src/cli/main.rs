use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use labelbatch::config::{self, ProviderSelection};
use labelbatch::{pipeline, provider};

#[derive(Parser, Debug)]
#[command(
    name = "labelbatch",
    version,
    about = "Label images with Google Cloud Vision or Microsoft Computer Vision"
)]
struct Cli {
    /// File glob patterns (e.g. "photos/*.jpg")
    #[arg(value_name = "PATTERN", required_unless_present = "init")]
    patterns: Vec<String>,

    /// Which API to use: google, microsoft or auto
    #[arg(long, value_name = "PROVIDER", default_value = "auto")]
    api: ProviderSelection,

    /// Path to config file (default: config.json next to binary)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Initialize a default config.json and exit
    #[arg(long)]
    init: bool,

    /// Verbose output, including raw service responses
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    // Handle --init
    if cli.init {
        let config = config::Config::default();
        let path = cli.config.as_deref();
        config.save(path)?;
        let save_path = match path {
            Some(p) => p.to_path_buf(),
            None => config::Config::config_path()?,
        };
        println!("Default config written to {}", save_path.display());
        return Ok(());
    }

    let mut config = config::Config::load(cli.config.as_deref())?;
    config.apply_env();

    let provider = cli.api.resolve(&config);
    let backend = provider::build_backend(provider, &config)?;
    log::debug!("Using {}", backend.name());

    let mut stdout = std::io::stdout().lock();
    let summary = pipeline::run(&cli.patterns, backend.as_ref(), &config.limits, &mut stdout).await?;

    log::debug!(
        "{} printed, {} failed",
        summary.printed,
        summary.failures.len()
    );

    Ok(())
}
