use reqwest::Client;
use reqwest::header::CONTENT_TYPE;

use super::{Annotation, Backend};
use crate::batch::Batch;
use crate::error::BackendError;

const NAME: &str = "Microsoft Computer Vision";
const SUBSCRIPTION_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";

/// Computer Vision `analyze`: one request per image, raw bytes as the body.
/// The response is kept as an untyped JSON document.
pub struct MicrosoftVisionService {
    endpoint: String,
    api_key: String,
    visual_features: Vec<String>,
    client: Client,
}

impl MicrosoftVisionService {
    pub fn new(
        endpoint: String,
        api_key: String,
        visual_features: Vec<String>,
        client: Client,
    ) -> Self {
        Self {
            endpoint,
            api_key,
            visual_features,
            client,
        }
    }

    fn url(&self) -> String {
        if self.visual_features.is_empty() {
            self.endpoint.clone()
        } else {
            format!(
                "{}?visualFeatures={}",
                self.endpoint,
                self.visual_features.join(",")
            )
        }
    }
}

fn parse_response(text: &str) -> Result<Annotation, BackendError> {
    serde_json::from_str(text)
        .map(Annotation::Document)
        .map_err(|e| BackendError::ResponseDecodeFailed {
            provider: NAME.to_string(),
            message: e.to_string(),
        })
}

#[async_trait::async_trait]
impl Backend for MicrosoftVisionService {
    fn name(&self) -> &str {
        NAME
    }

    fn supports_batching(&self) -> bool {
        false
    }

    async fn send(&self, batch: &Batch) -> Result<Vec<Annotation>, BackendError> {
        let [file] = batch.files() else {
            return Err(BackendError::RequestConstructionFailed {
                provider: NAME.to_string(),
                message: format!("expected exactly one image per request, got {}", batch.len()),
            });
        };

        let resp = self
            .client
            .post(self.url())
            .header(CONTENT_TYPE, "application/octet-stream")
            .header(SUBSCRIPTION_KEY_HEADER, &self.api_key)
            .body(file.bytes.clone())
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

        Ok(vec![parse_response(&text)?])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::pack;
    use crate::loader::LoadedFile;
    use std::path::PathBuf;

    fn service(endpoint: &str, key: &str) -> MicrosoftVisionService {
        MicrosoftVisionService::new(
            endpoint.to_string(),
            key.to_string(),
            vec!["Description".to_string(), "Tags".to_string()],
            Client::new(),
        )
    }

    fn file(name: &str) -> LoadedFile {
        LoadedFile {
            path: PathBuf::from(name),
            bytes: vec![1, 2, 3],
            width: 640,
            height: 480,
        }
    }

    #[test]
    fn url_lists_visual_features() {
        let svc = service("https://api.projectoxford.ai/vision/v1.0/analyze", "k");
        assert_eq!(
            svc.url(),
            "https://api.projectoxford.ai/vision/v1.0/analyze?visualFeatures=Description,Tags"
        );
    }

    #[test]
    fn document_kept_verbatim() {
        let annotation = parse_response(r#"{"tags": [{"name": "dog"}], "requestId": "x"}"#).unwrap();
        assert_eq!(
            annotation,
            Annotation::Document(serde_json::json!({"tags": [{"name": "dog"}], "requestId": "x"}))
        );
    }

    #[test]
    fn invalid_body_is_decode_failure() {
        let err = parse_response("not json").unwrap_err();
        assert!(matches!(err, BackendError::ResponseDecodeFailed { .. }));
    }

    #[tokio::test]
    async fn rejects_multi_file_batches() {
        let svc = service("http://127.0.0.1:9/analyze", "k");
        let batches = pack(vec![file("a.png"), file("b.png")], 1024);
        let err = svc.send(&batches[0]).await.unwrap_err();
        assert!(matches!(err, BackendError::RequestConstructionFailed { .. }));
    }

    #[tokio::test]
    async fn invalid_key_header_is_construction_failure() {
        let svc = service("http://127.0.0.1:9/analyze", "bad\nkey");
        let err = svc.send(&Batch::single(file("a.png"))).await.unwrap_err();
        assert!(matches!(err, BackendError::RequestConstructionFailed { .. }));
    }
}
