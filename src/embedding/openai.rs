//! OpenAI-compatible `/embeddings` client.

use std::time::Duration;

use reqwest::Client;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::EmbeddingProvider;
use super::error::{EmbeddingError, EmbeddingResult};
use crate::config::Config;

/// Embedding provider speaking the OpenAI `/embeddings` protocol.
///
/// Each call is a single request. Failures are returned as-is; there is no
/// retry.
#[derive(Debug, Clone)]
pub struct OpenAiProvider {
    client: Client,
    endpoint: String,
    model: String,
}

impl OpenAiProvider {
    pub fn new(
        api_key: &str,
        base_url: &str,
        model: impl Into<String>,
        timeout: Duration,
    ) -> EmbeddingResult<Self> {
        let model = model.into();
        if api_key.trim().is_empty() {
            return Err(EmbeddingError::InvalidConfig {
                reason: "missing API key".to_string(),
            });
        }
        if model.trim().is_empty() {
            return Err(EmbeddingError::InvalidConfig {
                reason: "missing embedding model name".to_string(),
            });
        }

        let mut headers = HeaderMap::new();
        let auth = HeaderValue::from_str(&format!("Bearer {}", api_key.trim())).map_err(|_| {
            EmbeddingError::InvalidConfig {
                reason: "API key is not a valid header value".to_string(),
            }
        })?;
        headers.insert(AUTHORIZATION, auth);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| EmbeddingError::InvalidConfig {
                reason: format!("failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            endpoint: format!("{}/embeddings", base_url.trim_end_matches('/')),
            model,
        })
    }

    /// Builds a provider from the embedding settings in `config`.
    pub fn from_config(config: &Config) -> EmbeddingResult<Self> {
        let api_key = config
            .require_api_key()
            .map_err(|e| EmbeddingError::InvalidConfig {
                reason: e.to_string(),
            })?;
        Self::new(
            api_key,
            &config.embedding_base_url,
            config.embedding_model.clone(),
            config.request_timeout,
        )
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl EmbeddingProvider for OpenAiProvider {
    fn model(&self) -> &str {
        &self.model
    }

    async fn embed(&self, inputs: &[String]) -> EmbeddingResult<Vec<Vec<f32>>> {
        if inputs.is_empty() {
            return Ok(Vec::new());
        }

        let request = EmbeddingRequest {
            model: &self.model,
            input: inputs,
        };
        let response = self.client.post(&self.endpoint).json(&request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            return Err(EmbeddingError::Provider {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.bytes().await?;
        let vectors = decode_response(&body, inputs.len())?;
        debug!(
            endpoint = %self.endpoint,
            inputs = inputs.len(),
            "Embedding request completed"
        );
        Ok(vectors)
    }
}

/// Parses a success body into vectors ordered by their `index`.
fn decode_response(body: &[u8], expected: usize) -> EmbeddingResult<Vec<Vec<f32>>> {
    let mut parsed: EmbeddingResponse =
        serde_json::from_slice(body).map_err(|e| EmbeddingError::MalformedResponse {
            reason: e.to_string(),
        })?;

    parsed.data.sort_by_key(|entry| entry.index);
    if parsed.data.len() != expected {
        return Err(EmbeddingError::MalformedResponse {
            reason: format!(
                "provider returned {} embeddings for {} inputs",
                parsed.data.len(),
                expected
            ),
        });
    }
    if let Some((pos, entry)) = parsed
        .data
        .iter()
        .enumerate()
        .find(|(pos, entry)| entry.index != *pos)
    {
        return Err(EmbeddingError::MalformedResponse {
            reason: format!("missing index {} (found {})", pos, entry.index),
        });
    }

    Ok(parsed.data.into_iter().map(|entry| entry.embedding).collect())
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    index: usize,
}
