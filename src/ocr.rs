use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::OcrClientError;
use crate::models::OcrToken;

/// Word-level text recognition over an encoded page image.
#[async_trait]
pub trait OcrClient: Send + Sync {
    async fn extract_tokens(&self, image: &[u8]) -> Result<Vec<OcrToken>, OcrClientError>;
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TokenPayload {
    List(Vec<OcrToken>),
    Wrapped { tokens: Vec<OcrToken> },
}

/// Serves tokens recognized ahead of time, ignoring the image bytes.
#[derive(Debug, Clone, Default)]
pub struct JsonOcrClient {
    tokens: Vec<OcrToken>,
}

impl JsonOcrClient {
    #[must_use]
    pub const fn new(tokens: Vec<OcrToken>) -> Self {
        Self { tokens }
    }

    /// Accepts either a bare token array or `{"tokens": [...]}`.
    pub fn from_json(raw: &str) -> Result<Self, OcrClientError> {
        let payload: TokenPayload = serde_json::from_str(raw)
            .map_err(|error| OcrClientError::Malformed(error.to_string()))?;
        let tokens = match payload {
            TokenPayload::List(tokens) | TokenPayload::Wrapped { tokens } => tokens,
        };
        Ok(Self { tokens })
    }

    pub fn from_path(path: &Path) -> Result<Self, OcrClientError> {
        let raw = std::fs::read_to_string(path).map_err(|error| {
            OcrClientError::Request(format!("failed to read '{}': {error}", path.display()))
        })?;
        Self::from_json(&raw)
    }

    #[must_use]
    pub fn tokens(&self) -> &[OcrToken] {
        &self.tokens
    }
}

#[async_trait]
impl OcrClient for JsonOcrClient {
    async fn extract_tokens(&self, _image: &[u8]) -> Result<Vec<OcrToken>, OcrClientError> {
        Ok(self.tokens.clone())
    }
}
