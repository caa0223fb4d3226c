//! Embedding Client: the single point of entry for remote embedding calls.
//!
//! Speaks the OpenAI-compatible `/v1/embeddings` shape, which sentence-transformer
//! servers (text-embeddings-inference, infinity, vLLM) also expose.
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

const MAX_RETRIES: u32 = 3;
const REQUEST_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },

    #[error("Malformed embedding response: {0}")]
    Malformed(String),
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [&'a str],
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingDatum>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingDatum {
    index: usize,
    embedding: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

#[derive(Clone)]
pub struct EmbeddingClient {
    client: Client,
    api_url: String,
    api_key: Option<String>,
    model: String,
}

impl EmbeddingClient {
    pub fn new(
        api_url: String,
        api_key: Option<String>,
        model: String,
    ) -> Result<Self, EmbeddingError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            api_url,
            api_key,
            model,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Embeds every input, returning vectors in input order.
    /// Retries on 429, 5xx and transport errors with exponential backoff.
    pub async fn embed(&self, inputs: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let request_body = EmbeddingRequest {
            model: &self.model,
            input: inputs,
        };

        let mut last_error: Option<EmbeddingError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                // 500ms, 1s
                let delay = std::time::Duration::from_millis(500 * (1 << (attempt - 1)));
                warn!(
                    "Embedding call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let mut request = self.client.post(&self.api_url).json(&request_body);
            if let Some(key) = &self.api_key {
                request = request.bearer_auth(key);
            }

            let response = match request.send().await {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(EmbeddingError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("Embedding API returned {}: {}", status, body);
                last_error = Some(EmbeddingError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<ApiErrorEnvelope>(&body)
                    .map(|e| e.error.message)
                    .unwrap_or(body);
                return Err(EmbeddingError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let body = response.text().await?;
            let parsed: EmbeddingResponse = serde_json::from_str(&body)?;
            let vectors = into_ordered_vectors(parsed, inputs.len())?;

            debug!(
                "Embedding call succeeded: inputs={}, dims={}",
                vectors.len(),
                vectors.first().map(Vec::len).unwrap_or(0)
            );

            return Ok(vectors);
        }

        Err(last_error.unwrap_or(EmbeddingError::RateLimited {
            retries: MAX_RETRIES,
        }))
    }
}

/// Servers may return `data` out of order; `index` is authoritative.
fn into_ordered_vectors(
    response: EmbeddingResponse,
    expected: usize,
) -> Result<Vec<Vec<f32>>, EmbeddingError> {
    if response.data.len() != expected {
        return Err(EmbeddingError::Malformed(format!(
            "expected {expected} embeddings, got {}",
            response.data.len()
        )));
    }

    let mut slots: Vec<Option<Vec<f32>>> = vec![None; expected];
    for datum in response.data {
        let slot = slots.get_mut(datum.index).ok_or_else(|| {
            EmbeddingError::Malformed(format!("embedding index {} out of range", datum.index))
        })?;
        if slot.replace(datum.embedding).is_some() {
            return Err(EmbeddingError::Malformed(format!(
                "duplicate embedding index {}",
                datum.index
            )));
        }
    }

    // Length matched and no duplicates, so every slot is filled.
    Ok(slots.into_iter().flatten().collect())
}


#[cfg(test)]
mod tests {
    use super::*;

    fn parse(body: &str) -> EmbeddingResponse {
        serde_json::from_str(body).unwrap()
    }

    #[test]
    fn test_reorders_by_index() {
        let response = parse(
            r#"{"data": [
                {"index": 1, "embedding": [0.0, 1.0]},
                {"index": 0, "embedding": [1.0, 0.0]}
            ], "model": "all-MiniLM-L6-v2"}"#,
        );
        let vectors = into_ordered_vectors(response, 2).unwrap();
        assert_eq!(vectors, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
    }

    #[test]
    fn test_count_mismatch_is_malformed() {
        let response = parse(r#"{"data": [{"index": 0, "embedding": [1.0]}]}"#);
        let err = into_ordered_vectors(response, 2).unwrap_err();
        assert!(matches!(err, EmbeddingError::Malformed(_)));
    }

    #[test]
    fn test_duplicate_index_is_malformed() {
        let response = parse(
            r#"{"data": [
                {"index": 0, "embedding": [1.0]},
                {"index": 0, "embedding": [2.0]}
            ]}"#,
        );
        assert!(into_ordered_vectors(response, 2).is_err());
    }

    #[test]
    fn test_out_of_range_index_is_malformed() {
        let response = parse(r#"{"data": [{"index": 3, "embedding": [1.0]}]}"#);
        assert!(into_ordered_vectors(response, 1).is_err());
    }

    #[test]
    fn test_request_serializes_openai_shape() {
        let inputs = ["resume text", "job text"];
        let body = serde_json::to_value(EmbeddingRequest {
            model: "all-MiniLM-L6-v2",
            input: &inputs,
        })
        .unwrap();
        assert_eq!(body["model"], "all-MiniLM-L6-v2");
        assert_eq!(body["input"][1], "job text");
    }

    // Backoff sleeps run on the real clock: a paused clock would auto-advance
    // into the client's request timeout while the socket is idle.

    fn client(url: &str) -> EmbeddingClient {
        EmbeddingClient::new(
            url.to_string(),
            Some("test-key".to_string()),
            "all-MiniLM-L6-v2".to_string(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_retries_server_error_then_reorders() {
        let endpoint = stub::spawn(vec![
            (
                axum::http::StatusCode::SERVICE_UNAVAILABLE,
                serde_json::json!({"error": {"message": "warming up"}}),
            ),
            (
                axum::http::StatusCode::OK,
                serde_json::json!({"data": [
                    {"index": 1, "embedding": [0.0, 1.0]},
                    {"index": 0, "embedding": [1.0, 0.0]}
                ]}),
            ),
        ])
        .await;

        let vectors = client(&endpoint.url)
            .embed(&["resume", "job"])
            .await
            .unwrap();

        assert_eq!(vectors, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
        assert_eq!(endpoint.hits(), 2);
        assert_eq!(endpoint.last_auth().as_deref(), Some("Bearer test-key"));
    }

    #[tokio::test]
    async fn test_client_error_is_not_retried() {
        let endpoint = stub::spawn(vec![(
            axum::http::StatusCode::BAD_REQUEST,
            serde_json::json!({"error": {"message": "unknown model"}}),
        )])
        .await;

        let err = client(&endpoint.url).embed(&["resume"]).await.unwrap_err();

        assert_eq!(endpoint.hits(), 1);
        match err {
            EmbeddingError::Api { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "unknown model");
            }
            other => panic!("Expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let endpoint = stub::spawn(vec![(
            axum::http::StatusCode::TOO_MANY_REQUESTS,
            serde_json::json!({"error": {"message": "slow down"}}),
        )])
        .await;

        let err = client(&endpoint.url).embed(&["resume"]).await.unwrap_err();

        assert_eq!(endpoint.hits(), MAX_RETRIES as usize);
        assert!(matches!(err, EmbeddingError::Api { status: 429, .. }));
    }
}
