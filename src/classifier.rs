//! Food image classification seam.
//!
//! The classifier is an extension point only: guesses are returned to the
//! client as-is and nothing downstream (meal logging, nutrition lookup)
//! consumes them. A real model backend plugs in behind `FoodClassifier`.

use async_trait::async_trait;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Clone, Serialize)]
pub struct FoodGuess {
    pub label: String,
    pub confidence: f64,
}

#[async_trait]
pub trait FoodClassifier: Send + Sync {
    async fn classify(&self, image: Bytes) -> anyhow::Result<Vec<FoodGuess>>;
}

/// Default backend: accepts images and returns no guesses.
pub struct NoopClassifier;

#[async_trait]
impl FoodClassifier for NoopClassifier {
    async fn classify(&self, image: Bytes) -> anyhow::Result<Vec<FoodGuess>> {
        tracing::debug!(bytes = image.len(), "no classifier backend configured");
        Ok(Vec::new())
    }
}

#[derive(Debug, Deserialize)]
pub struct ClassifyRequest {
    pub image: serde_bytes::ByteBuf,
}

#[derive(Debug, Serialize)]
pub struct ClassifyResponse {
    pub guesses: Vec<FoodGuess>,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/classify", post(classify_image))
}

async fn classify_image(
    State(state): State<AppState>,
    Json(body): Json<ClassifyRequest>,
) -> Result<Json<ClassifyResponse>, ApiError> {
    if body.image.is_empty() {
        return Err(ApiError::InvalidInput("image must be non-empty".into()));
    }
    let guesses = state
        .classifier
        .classify(Bytes::from(body.image.into_vec()))
        .await?;
    Ok(Json(ClassifyResponse { guesses }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn noop_backend_returns_no_guesses() {
        let guesses = NoopClassifier
            .classify(Bytes::from_static(b"\xff\xd8\xff"))
            .await
            .unwrap();
        assert!(guesses.is_empty());
    }

    #[test]
    fn guess_serialization() {
        let resp = ClassifyResponse {
            guesses: vec![FoodGuess { label: "banana".into(), confidence: 0.92 }],
        };
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("banana"));
        assert!(json.contains("confidence"));
    }
}
