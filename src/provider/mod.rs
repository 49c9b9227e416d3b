mod google;
mod microsoft;

pub use google::{GoogleCredential, GoogleVisionService};
pub use microsoft::MicrosoftVisionService;

use anyhow::{Context, Result};
use reqwest::Client;
use std::time::Duration;

use crate::batch::Batch;
use crate::config::{Config, GOOGLE_API_KEY_ENV, MICROSOFT_API_KEY_ENV, Provider};
use crate::error::{BackendError, ConfigError};
use crate::rank::Label;

/// What a provider returned for one file.
#[derive(Debug, Clone, PartialEq)]
pub enum Annotation {
    /// Label detections, in the order the service sent them.
    Labels(Vec<Label>),
    /// An unstructured analysis document, printed as-is.
    Document(serde_json::Value),
    /// The request succeeded but the service reported an error for this file.
    Failed(String),
}

/// A remote annotation service.
///
/// `send` returns one [`Annotation`] per file in `batch`, in the same order.
/// An `Err` applies to every file in the batch. Services that do not
/// support batching only ever receive single-file batches.
///
/// # Example
///
/// ```rust,no_run
/// use labelbatch::batch::Batch;
/// use labelbatch::config::Limits;
/// use labelbatch::loader::load;
/// use labelbatch::provider::{Backend, GoogleCredential, GoogleVisionService};
///
/// # async fn example() -> anyhow::Result<()> {
/// let service = GoogleVisionService::new(
///     "https://vision.googleapis.com/v1/images:annotate".into(),
///     GoogleCredential::ApiKey("AIza...".into()),
///     reqwest::Client::new(),
/// );
/// let file = load("photo.jpg".as_ref(), &Limits::default())?;
/// let annotations = service.send(&Batch::single(file)).await?;
/// println!("{annotations:?}");
/// # Ok(())
/// # }
/// ```
#[async_trait::async_trait]
pub trait Backend: Send + Sync {
    /// The display name of this service (e.g., "Google Cloud Vision").
    fn name(&self) -> &str;
    /// Whether several files may share one request.
    fn supports_batching(&self) -> bool;
    async fn send(&self, batch: &Batch) -> Result<Vec<Annotation>, BackendError>;
}

/// Build the backend for a resolved provider.
///
/// Fails with [`ConfigError::MissingCredential`] when the provider has no
/// credential configured.
pub fn build_backend(provider: Provider, config: &Config) -> Result<Box<dyn Backend>> {
    let client = http_client(config.request_timeout_secs)?;

    match provider {
        Provider::Google => {
            let google = &config.providers.google;
            let credential = if !google.api_key.is_empty() {
                GoogleCredential::ApiKey(google.api_key.clone())
            } else if !google.access_token.is_empty() {
                GoogleCredential::AccessToken(google.access_token.clone())
            } else {
                return Err(ConfigError::MissingCredential {
                    provider: "Google Cloud Vision",
                    env_var: GOOGLE_API_KEY_ENV,
                }
                .into());
            };
            Ok(Box::new(GoogleVisionService::new(
                google.endpoint.clone(),
                credential,
                client,
            )))
        }
        Provider::Microsoft => {
            let microsoft = &config.providers.microsoft;
            if microsoft.api_key.is_empty() {
                return Err(ConfigError::MissingCredential {
                    provider: "Microsoft Computer Vision",
                    env_var: MICROSOFT_API_KEY_ENV,
                }
                .into());
            }
            Ok(Box::new(MicrosoftVisionService::new(
                microsoft.endpoint.clone(),
                microsoft.api_key.clone(),
                microsoft.visual_features.clone(),
                client,
            )))
        }
    }
}

fn http_client(timeout_secs: Option<u64>) -> Result<Client> {
    let mut builder = Client::builder();
    if let Some(secs) = timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    builder.build().context("Failed to build HTTP client")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn google_without_credentials_is_fatal() {
        let config = Config::default();
        let err = build_backend(Provider::Google, &config).err().unwrap();
        assert_eq!(
            err.downcast_ref::<ConfigError>(),
            Some(&ConfigError::MissingCredential {
                provider: "Google Cloud Vision",
                env_var: GOOGLE_API_KEY_ENV,
            })
        );
    }

    #[test]
    fn microsoft_without_key_is_fatal() {
        let config = Config::default();
        let err = build_backend(Provider::Microsoft, &config).err().unwrap();
        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::MissingCredential { .. })
        ));
    }

    #[test]
    fn google_batches_microsoft_does_not() {
        let mut config = Config::default();
        config.providers.google.access_token = "token".to_string();
        config.providers.microsoft.api_key = "key".to_string();
        config.request_timeout_secs = Some(5);

        let google = build_backend(Provider::Google, &config).unwrap();
        assert_eq!(google.name(), "Google Cloud Vision");
        assert!(google.supports_batching());

        let microsoft = build_backend(Provider::Microsoft, &config).unwrap();
        assert_eq!(microsoft.name(), "Microsoft Computer Vision");
        assert!(!microsoft.supports_batching());
    }
}
