use std::io::Write;
use std::path::PathBuf;

use crate::batch::{Batch, Packer};
use crate::config::Limits;
use crate::discovery;
use crate::loader;
use crate::provider::{Annotation, Backend};
use crate::rank::AnnotationResult;

/// Something that went wrong for one pattern, file or batch.
#[derive(Debug, Clone, PartialEq)]
pub struct Failure {
    /// The pattern or file the failure applies to.
    pub subject: String,
    pub reason: String,
}

/// Totals for a finished run.
///
/// A run always finishes; everything that failed along the way is listed in
/// `failures` and was already reported on stderr.
#[derive(Debug, Default)]
pub struct RunSummary {
    /// Files with a result line written to the output.
    pub printed: usize,
    pub failures: Vec<Failure>,
}

impl RunSummary {
    fn fail(&mut self, subject: impl Into<String>, reason: impl Into<String>) {
        self.failures.push(Failure {
            subject: subject.into(),
            reason: reason.into(),
        });
    }

    /// Whether `path` was reported as failed.
    pub fn failed(&self, path: &std::path::Path) -> bool {
        let subject = path.display().to_string();
        self.failures.iter().any(|f| f.subject == subject)
    }
}

/// Expand every pattern, load and pack the matches, send them to `backend`
/// and write one line per annotated file to `out`.
///
/// Batches are dispatched as soon as they are sealed. Failures are logged
/// and recorded in the returned [`RunSummary`]; they never stop the run.
/// Only a failure to write to `out` is returned as an error.
///
/// # Example
///
/// ```rust,no_run
/// use labelbatch::config::{Config, ProviderSelection};
/// use labelbatch::pipeline::run;
/// use labelbatch::provider::build_backend;
///
/// # async fn example() -> anyhow::Result<()> {
/// let mut config = Config::load(None)?;
/// config.apply_env();
/// let backend = build_backend(ProviderSelection::Auto.resolve(&config), &config)?;
///
/// let patterns = vec!["photos/*.jpg".to_string()];
/// let summary = run(&patterns, backend.as_ref(), &config.limits, &mut std::io::stdout()).await?;
/// println!("{} printed, {} failed", summary.printed, summary.failures.len());
/// # Ok(())
/// # }
/// ```
pub async fn run<W: Write>(
    patterns: &[String],
    backend: &dyn Backend,
    limits: &Limits,
    out: &mut W,
) -> std::io::Result<RunSummary> {
    let mut summary = RunSummary::default();
    let mut packer = Packer::new(limits.max_batch_bytes);

    for pattern in patterns {
        let matches = match discovery::expand(pattern) {
            Ok(matches) => matches,
            Err(e) => {
                log::error!("{e}");
                summary.fail(pattern.as_str(), e.to_string());
                continue;
            }
        };
        if matches.is_empty() {
            log::warn!("No files match {pattern}");
        }

        for path in matches {
            let file = match loader::load(&path, limits) {
                Ok(file) => file,
                Err(e) => {
                    log::error!("Unable to load {}: {e}", path.display());
                    summary.fail(path.display().to_string(), e.to_string());
                    continue;
                }
            };

            if backend.supports_batching() {
                if let Some(batch) = packer.push(file) {
                    dispatch(&batch, backend, out, &mut summary).await?;
                }
            } else {
                dispatch(&Batch::single(file), backend, out, &mut summary).await?;
            }
        }
    }

    if let Some(batch) = packer.finish() {
        dispatch(&batch, backend, out, &mut summary).await?;
    }

    log::debug!(
        "Done: {} printed, {} failure(s)",
        summary.printed,
        summary.failures.len()
    );
    Ok(summary)
}

async fn dispatch<W: Write>(
    batch: &Batch,
    backend: &dyn Backend,
    out: &mut W,
    summary: &mut RunSummary,
) -> std::io::Result<()> {
    let paths = batch.paths();
    log::debug!(
        "Sending {} file(s), {} bytes to {}",
        batch.len(),
        batch.total_bytes(),
        backend.name()
    );

    let annotations = match backend.send(batch).await {
        Ok(annotations) if annotations.len() == paths.len() => annotations,
        Ok(annotations) => {
            let reason = format!(
                "{}: expected {} results, got {}",
                backend.name(),
                paths.len(),
                annotations.len()
            );
            fail_batch(&paths, &reason, summary);
            return Ok(());
        }
        Err(e) => {
            fail_batch(&paths, &e.to_string(), summary);
            return Ok(());
        }
    };

    for (path, annotation) in paths.into_iter().zip(annotations) {
        match annotation {
            Annotation::Labels(labels) => {
                writeln!(out, "{}", AnnotationResult::new(path, labels).summary_line())?;
                summary.printed += 1;
            }
            Annotation::Document(doc) => {
                match serde_json::to_string_pretty(&doc) {
                    Ok(pretty) => writeln!(out, "{}: {pretty}", path.display())?,
                    Err(_) => writeln!(out, "{}: {doc}", path.display())?,
                }
                summary.printed += 1;
            }
            Annotation::Failed(reason) => {
                log::error!("{} failed for {}: {reason}", backend.name(), path.display());
                summary.fail(path.display().to_string(), reason);
            }
        }
    }
    Ok(())
}

/// Report a whole-batch failure once and mark every file in it as failed.
fn fail_batch(paths: &[PathBuf], reason: &str, summary: &mut RunSummary) {
    let names: Vec<String> = paths.iter().map(|p| p.display().to_string()).collect();
    log::error!("Request for [{}] failed: {reason}", names.join(", "));
    for name in names {
        summary.fail(name, reason);
    }
}
