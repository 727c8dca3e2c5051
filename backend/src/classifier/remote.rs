use std::time::Duration;

use futures::FutureExt;
use futures::future::BoxFuture;
use reqwest::Client;
use serde_json::Value;
use shared::Prediction;
use url::Url;

use super::{ClassifierError, ImageModel, ModelLoader};
use crate::config::RemoteConfig;

/// Hosted image-classification endpoint (Hugging Face inference API shape).
pub struct RemoteModelLoader {
    endpoint: String,
    model_id: String,
    token: Option<String>,
    timeout: Duration,
}

impl RemoteModelLoader {
    pub fn from_config(config: &RemoteConfig) -> Self {
        Self {
            endpoint: config.endpoint.clone(),
            model_id: config.model_id.clone(),
            token: config.token.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    fn model_url(&self) -> Result<Url, ClassifierError> {
        let base = format!("{}/", self.endpoint.trim_end_matches('/'));
        Url::parse(&base)
            .and_then(|base| base.join(self.model_id.trim_start_matches('/')))
            .map_err(|e| ClassifierError::ModelLoad(format!("invalid model URL: {}", e)))
    }
}

impl ModelLoader for RemoteModelLoader {
    fn describe(&self) -> String {
        format!("remote model '{}' at {}", self.model_id, self.endpoint)
    }

    fn load(&self) -> BoxFuture<'_, Result<Box<dyn ImageModel>, ClassifierError>> {
        async move {
            let url = self.model_url()?;
            let client = Client::builder()
                .timeout(self.timeout)
                .build()
                .map_err(|e| ClassifierError::ModelLoad(e.to_string()))?;

            Ok(Box::new(RemoteModel {
                client,
                url,
                token: self.token.clone(),
            }) as Box<dyn ImageModel>)
        }
        .boxed()
    }
}

pub struct RemoteModel {
    client: Client,
    url: Url,
    token: Option<String>,
}

impl ImageModel for RemoteModel {
    fn predict<'a>(
        &'a self,
        image: &'a [u8],
    ) -> BoxFuture<'a, Result<Vec<Prediction>, ClassifierError>> {
        async move {
            let mut request = self
                .client
                .post(self.url.clone())
                .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
                .body(image.to_vec());
            if let Some(token) = &self.token {
                request = request.bearer_auth(token);
            }

            let response = request.send().await?;
            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                log::warn!("Inference service returned {}: {}", status, body);
                return Err(ClassifierError::Upstream {
                    status: status.as_u16(),
                    body,
                });
            }

            let body: Value = response.json().await?;
            parse_predictions(body)
        }
        .boxed()
    }
}

/// Accepts `[{label, score}, ...]` or a single-item batch `[[{label, score}, ...]]`.
pub fn parse_predictions(body: Value) -> Result<Vec<Prediction>, ClassifierError> {
    let items = match body {
        Value::Array(items) => items,
        other => {
            return Err(ClassifierError::MalformedOutput(format!(
                "expected an array, got {}",
                other
            )));
        }
    };

    let items = match <[Value; 1]>::try_from(items) {
        Ok([Value::Array(inner)]) => inner,
        Ok([single]) => vec![single],
        Err(items) => items,
    };

    if items.is_empty() {
        return Err(ClassifierError::EmptyOutput);
    }

    items
        .into_iter()
        .map(|item| {
            let label = item.get("label").and_then(Value::as_str);
            let score = item.get("score").and_then(Value::as_f64);
            match (label, score) {
                (Some(label), Some(score)) => Ok(Prediction::new(label, score as f32)),
                _ => Err(ClassifierError::MalformedOutput(format!(
                    "prediction without label/score: {}",
                    item
                ))),
            }
        })
        .collect()
}
