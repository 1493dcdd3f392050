//! Outbound client for the external MRI classification service.
//!
//! One-shot requests only: a prediction is a single multipart POST, a health
//! check a single GET. There are no retries: a malformed or error-carrying
//! response is surfaced to the caller and nothing is persisted.

use std::time::Duration;

use serde::Deserialize;

/// Raw prediction payload from the model service.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModelPrediction {
    pub prediction: Option<String>,
    pub confidence: Option<f64>,
    pub probabilities: Option<Vec<f64>>,
    pub error: Option<String>,
}

/// Health probe result, preserving non-JSON upstream bodies verbatim.
#[derive(Debug, Clone)]
pub enum UpstreamHealth {
    Json(serde_json::Value),
    Text(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ModelClientError {
    #[error("Unable to reach model at {base_url}: {reason}")]
    Connection { base_url: String, reason: String },

    #[error("Model service did not return valid JSON: {body}")]
    InvalidJson { body: String },

    #[error("Model API error: {0}")]
    ModelReported(String),

    #[error("Model health check failed: {status}: {body}")]
    HealthStatus { status: u16, body: String },
}

/// HTTP client for the model service at a configured base URL.
#[derive(Debug, Clone)]
pub struct ModelClient {
    base_url: String,
    client: reqwest::Client,
}

impl ModelClient {
    /// Create a client with an explicit request timeout. A hung model
    /// service fails the request instead of holding it open indefinitely.
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send one image to `POST {base}/predict` and parse the response.
    ///
    /// The body is read as text first so a non-JSON reply can be reported
    /// verbatim. An explicit `error` field in the parsed payload is a hard
    /// failure.
    pub async fn predict(
        &self,
        file_name: &str,
        image: Vec<u8>,
    ) -> Result<ModelPrediction, ModelClientError> {
        let part = reqwest::multipart::Part::bytes(image).file_name(file_name.to_string());
        let form = reqwest::multipart::Form::new().part("image", part);

        let response = self
            .client
            .post(format!("{}/predict", self.base_url))
            .multipart(form)
            .send()
            .await
            .map_err(|e| self.connection_error(e))?;

        let text = response
            .text()
            .await
            .map_err(|e| self.connection_error(e))?;
        tracing::debug!(body = %text, "model raw response");

        let parsed: ModelPrediction =
            serde_json::from_str(&text).map_err(|_| ModelClientError::InvalidJson { body: text })?;

        if let Some(message) = parsed.error {
            return Err(ModelClientError::ModelReported(message));
        }

        Ok(parsed)
    }

    /// Probe `GET {base}/health`, relaying the upstream body.
    pub async fn health(&self) -> Result<UpstreamHealth, ModelClientError> {
        let response = self
            .client
            .get(format!("{}/health", self.base_url))
            .send()
            .await
            .map_err(|e| self.connection_error(e))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| self.connection_error(e))?;

        if !status.is_success() {
            return Err(ModelClientError::HealthStatus {
                status: status.as_u16(),
                body: text,
            });
        }

        match serde_json::from_str::<serde_json::Value>(&text) {
            Ok(json) => Ok(UpstreamHealth::Json(json)),
            Err(_) => Ok(UpstreamHealth::Text(text)),
        }
    }

    fn connection_error(&self, err: reqwest::Error) -> ModelClientError {
        ModelClientError::Connection {
            base_url: self.base_url.clone(),
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::routing::{get, post};
    use axum::Router;

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let client = ModelClient::new("http://model:5000/", 5).unwrap();
        assert_eq!(client.base_url(), "http://model:5000");
    }

    #[test]
    fn prediction_parses_full_payload() {
        let parsed: ModelPrediction = serde_json::from_str(
            r#"{"prediction":"Healthy","confidence":0.91,"probabilities":[0.91,0.05,0.02,0.02]}"#,
        )
        .unwrap();
        assert_eq!(parsed.prediction.as_deref(), Some("Healthy"));
        assert_eq!(parsed.confidence, Some(0.91));
        assert_eq!(parsed.probabilities.unwrap().len(), 4);
        assert!(parsed.error.is_none());
    }

    #[test]
    fn prediction_tolerates_missing_fields() {
        let parsed: ModelPrediction = serde_json::from_str(r#"{"prediction":"Healthy"}"#).unwrap();
        assert!(parsed.confidence.is_none());
        assert!(parsed.probabilities.is_none());
    }

    async fn spawn_stub(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn predict_round_trip_against_stub() {
        let app = Router::new().route(
            "/predict",
            post(|| async {
                r#"{"prediction":"Healthy","confidence":0.91,"probabilities":[0.91,0.05,0.02,0.02]}"#
            }),
        );
        let base = spawn_stub(app).await;

        let client = ModelClient::new(&base, 5).unwrap();
        let result = client.predict("scan.png", vec![0u8; 16]).await.unwrap();
        assert_eq!(result.prediction.as_deref(), Some("Healthy"));
        assert_eq!(result.confidence, Some(0.91));
    }

    #[tokio::test]
    async fn predict_surfaces_model_reported_error() {
        let app = Router::new().route("/predict", post(|| async { r#"{"error":"bad image"}"# }));
        let base = spawn_stub(app).await;

        let client = ModelClient::new(&base, 5).unwrap();
        let err = client.predict("scan.png", vec![0u8; 16]).await.unwrap_err();
        assert!(matches!(err, ModelClientError::ModelReported(ref m) if m == "bad image"));
    }

    #[tokio::test]
    async fn predict_rejects_non_json_body() {
        let app = Router::new().route("/predict", post(|| async { "<html>oops</html>" }));
        let base = spawn_stub(app).await;

        let client = ModelClient::new(&base, 5).unwrap();
        let err = client.predict("scan.png", vec![0u8; 16]).await.unwrap_err();
        match err {
            ModelClientError::InvalidJson { body } => assert!(body.contains("oops")),
            other => panic!("expected InvalidJson, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn predict_fails_fast_when_unreachable() {
        // Reserved port that nothing listens on
        let client = ModelClient::new("http://127.0.0.1:9", 1).unwrap();
        let err = client.predict("scan.png", vec![0u8; 16]).await.unwrap_err();
        assert!(matches!(err, ModelClientError::Connection { .. }));
    }

    #[tokio::test]
    async fn health_relays_json_body() {
        let app = Router::new().route("/health", get(|| async { r#"{"status":"ok"}"# }));
        let base = spawn_stub(app).await;

        let client = ModelClient::new(&base, 5).unwrap();
        match client.health().await.unwrap() {
            UpstreamHealth::Json(value) => assert_eq!(value["status"], "ok"),
            other => panic!("expected JSON health, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn health_relays_plain_text_body() {
        let app = Router::new().route("/health", get(|| async { "alive" }));
        let base = spawn_stub(app).await;

        let client = ModelClient::new(&base, 5).unwrap();
        match client.health().await.unwrap() {
            UpstreamHealth::Text(text) => assert_eq!(text, "alive"),
            other => panic!("expected text health, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn health_non_success_status_is_an_error() {
        let app = Router::new().route(
            "/health",
            get(|| async { (axum::http::StatusCode::SERVICE_UNAVAILABLE, "down") }),
        );
        let base = spawn_stub(app).await;

        let client = ModelClient::new(&base, 5).unwrap();
        let err = client.health().await.unwrap_err();
        assert!(matches!(err, ModelClientError::HealthStatus { status: 503, .. }));
    }
}
