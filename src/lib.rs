//! # labelbatch
//!
//! Batch image labelling against Google Cloud Vision (label detection, many
//! images per request) or Microsoft Computer Vision (one image per request).
//!
//! ## Quick Start
//!
//! The pipeline module handles the whole expand → load → pack → send → rank
//! flow and writes one line per image:
//!
//! ```rust,no_run
//! use labelbatch::config::{Config, ProviderSelection};
//! use labelbatch::pipeline::run;
//! use labelbatch::provider::build_backend;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut config = Config::load(Some("config.json".as_ref()))?;
//!     config.apply_env();
//!
//!     let provider = ProviderSelection::Google.resolve(&config);
//!     let backend = build_backend(provider, &config)?;
//!
//!     let patterns = vec!["photos/*.jpg".to_string()];
//!     let mut stdout = std::io::stdout();
//!     let summary = run(&patterns, backend.as_ref(), &config.limits, &mut stdout).await?;
//!
//!     for failure in &summary.failures {
//!         eprintln!("{}: {}", failure.subject, failure.reason);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Lower-Level Usage
//!
//! ```rust,no_run
//! use labelbatch::batch::pack;
//! use labelbatch::config::Limits;
//! use labelbatch::loader::load;
//! use labelbatch::rank::{rank, render, Label};
//!
//! let limits = Limits::default();
//! let files = vec![load("a.jpg".as_ref(), &limits).unwrap(), load("b.jpg".as_ref(), &limits).unwrap()];
//! let batches = pack(files, limits.max_batch_bytes);
//! println!("{} batch(es)", batches.len());
//!
//! let labels = rank(vec![Label::new("cat", 0.9), Label::new("sofa", 0.1)]);
//! assert_eq!(render(&labels), "[sofa cat]");
//! ```
//!
//! ## Modules
//!
//! - [`config`]: Configuration, limits and provider selection
//! - [`discovery`]: Glob expansion
//! - [`loader`]: File loading and size/dimension checks
//! - [`batch`]: Packing files into size-bounded batches
//! - [`provider`]: Backend trait and the Google/Microsoft implementations
//! - [`rank`]: Confidence ranking and rendering
//! - [`pipeline`]: The run loop tying everything together
//! - [`error`]: Error types

pub mod batch;
pub mod config;
pub mod discovery;
pub mod error;
pub mod loader;
pub mod pipeline;
pub mod provider;
pub mod rank;

#[cfg(test)]
mod test_log;
