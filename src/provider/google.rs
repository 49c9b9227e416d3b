use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use super::{Annotation, Backend};
use crate::batch::Batch;
use crate::error::BackendError;
use crate::rank::Label;

const NAME: &str = "Google Cloud Vision";

/// How requests to Cloud Vision are authenticated.
#[derive(Debug, Clone)]
pub enum GoogleCredential {
    /// Sent as the `key` query parameter.
    ApiKey(String),
    /// Sent as `Authorization: Bearer`.
    AccessToken(String),
}

/// Cloud Vision `images:annotate`: every file in a batch goes out in one
/// request with a `LABEL_DETECTION` feature.
pub struct GoogleVisionService {
    endpoint: String,
    credential: GoogleCredential,
    client: Client,
}

impl GoogleVisionService {
    pub fn new(endpoint: String, credential: GoogleCredential, client: Client) -> Self {
        Self {
            endpoint,
            credential,
            client,
        }
    }
}

#[derive(Debug, Deserialize)]
struct BatchAnnotateResponse {
    #[serde(default)]
    responses: Vec<AnnotateImageResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnnotateImageResponse {
    #[serde(default)]
    label_annotations: Vec<EntityAnnotation>,
    error: Option<Status>,
}

#[derive(Debug, Deserialize)]
struct EntityAnnotation {
    #[serde(default)]
    description: String,
    score: Option<f32>,
    confidence: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct Status {
    #[serde(default)]
    code: i32,
    #[serde(default)]
    message: String,
}

fn build_request_body(batch: &Batch) -> serde_json::Value {
    let requests: Vec<serde_json::Value> = batch
        .files()
        .iter()
        .map(|file| {
            json!({
                "image": { "content": STANDARD.encode(&file.bytes) },
                "features": [{ "type": "LABEL_DETECTION" }]
            })
        })
        .collect();
    json!({ "requests": requests })
}

fn decode_error(message: impl Into<String>) -> BackendError {
    BackendError::ResponseDecodeFailed {
        provider: NAME.to_string(),
        message: message.into(),
    }
}

/// Decode a batch response into one annotation per requested file.
fn parse_response(text: &str, expected: usize) -> Result<Vec<Annotation>, BackendError> {
    let raw: serde_json::Value = serde_json::from_str(text)
        .map_err(|e| decode_error(format!("invalid JSON: {e}")))?;
    match serde_json::to_string_pretty(&raw) {
        Ok(pretty) => log::debug!("{pretty}"),
        Err(_) => log::debug!("{raw}"),
    }

    let response: BatchAnnotateResponse =
        serde_json::from_value(raw).map_err(|e| decode_error(e.to_string()))?;

    if response.responses.len() != expected {
        return Err(decode_error(format!(
            "expected {expected} responses, got {}",
            response.responses.len()
        )));
    }

    Ok(response
        .responses
        .into_iter()
        .map(|r| match r.error {
            Some(status) => Annotation::Failed(format!("{} (code {})", status.message, status.code)),
            None => Annotation::Labels(
                r.label_annotations
                    .into_iter()
                    .map(|a| {
                        let confidence = a.confidence.or(a.score).unwrap_or_default();
                        Label::new(a.description, confidence)
                    })
                    .collect(),
            ),
        })
        .collect())
}

#[async_trait::async_trait]
impl Backend for GoogleVisionService {
    fn name(&self) -> &str {
        NAME
    }

    fn supports_batching(&self) -> bool {
        true
    }

    async fn send(&self, batch: &Batch) -> Result<Vec<Annotation>, BackendError> {
        let body = build_request_body(batch);

        let request = self.client.post(&self.endpoint).json(&body);
        let request = match &self.credential {
            GoogleCredential::ApiKey(key) => request.query(&[("key", key)]),
            GoogleCredential::AccessToken(token) => request.bearer_auth(token),
        };

        let resp = request
            .send()
            .await
            .map_err(|e| BackendError::from_reqwest(NAME, e))?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| BackendError::from_reqwest(NAME, e))?;

        if !status.is_success() {
            return Err(BackendError::TransportFailed {
                provider: NAME.to_string(),
                message: format!("API error ({status}): {text}"),
            });
        }

        parse_response(&text, batch.len())
    }
}
