//! Error types for the labelbatch pipeline.
//!
//! Errors are grouped by the stage that raises them. Everything except
//! [`ConfigError`] is reported against a file, batch or pattern and the run
//! carries on with the next one.

use std::path::PathBuf;
use thiserror::Error;

/// A glob pattern that could not be compiled or walked.
#[derive(Error, Debug)]
#[error("Invalid file pattern {pattern}: {message}")]
pub struct PatternError {
    pub pattern: String,
    pub message: String,
}

/// Why a candidate file was rejected by the loader.
#[derive(Error, Debug)]
pub enum LoadError {
    /// The file could not be stat'ed (missing, permissions, ...).
    #[error("stat failed for {path}: {source}")]
    StatFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File is larger than the provider's recommended ceiling.
    #[error(
        "{path}: file size ({size_mb:.2} MB) is larger than recommended size of {max_mb:.0} MB"
    )]
    TooLarge {
        path: PathBuf,
        size_mb: f64,
        max_mb: f64,
    },

    #[error("read failed for {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Unrecognised or corrupt image data.
    #[error("failed to decode image {path}: {source}")]
    DecodeFailed {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error(
        "{path}: image size ({width}x{height}) is smaller than recommended minimum of {min_width}x{min_height}"
    )]
    TooSmall {
        path: PathBuf,
        width: u32,
        height: u32,
        min_width: u32,
        min_height: u32,
    },
}

impl LoadError {
    /// The file this error refers to.
    pub fn path(&self) -> &PathBuf {
        match self {
            Self::StatFailed { path, .. }
            | Self::TooLarge { path, .. }
            | Self::ReadFailed { path, .. }
            | Self::DecodeFailed { path, .. }
            | Self::TooSmall { path, .. } => path,
        }
    }
}

/// Failure of a single backend call. For a batch call it applies to every
/// file in the batch.
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("{provider}: unable to create request: {message}")]
    RequestConstructionFailed { provider: String, message: String },

    #[error("{provider}: request failed: {message}")]
    TransportFailed { provider: String, message: String },

    #[error("{provider}: unable to decode response: {message}")]
    ResponseDecodeFailed { provider: String, message: String },
}

impl BackendError {
    /// Classify a reqwest error by the stage it came from.
    pub(crate) fn from_reqwest(provider: &str, err: reqwest::Error) -> Self {
        let provider = provider.to_string();
        if err.is_builder() {
            Self::RequestConstructionFailed {
                provider,
                message: err.to_string(),
            }
        } else if err.is_decode() {
            Self::ResponseDecodeFailed {
                provider,
                message: err.to_string(),
            }
        } else {
            Self::TransportFailed {
                provider,
                message: err.to_string(),
            }
        }
    }
}

/// Startup errors. These abort the process before any file is touched.
#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Invalid --api ({0}), must be 'auto', 'google' or 'microsoft'")]
    InvalidProvider(String),

    #[error("{provider} selected but no credential configured: set {env_var}")]
    MissingCredential {
        provider: &'static str,
        env_var: &'static str,
    },
}
