use std::path::Path;

use async_trait::async_trait;

use crate::error::TrimAdvisorError;
use crate::models::TrimSuggestion;

/// A vision model that inspects a crop for fragments of neighbouring
/// problems and proposes margins to cut.
#[async_trait]
pub trait TrimAdvisor: Send + Sync {
    async fn analyze_crop(
        &self,
        image: &[u8],
        problem_number: &str,
    ) -> Result<TrimSuggestion, TrimAdvisorError>;
}

/// Pulls the suggestion object out of free-form model output. Code fences and
/// prose around the object are tolerated.
pub fn parse_trim_response(text: &str) -> Result<TrimSuggestion, TrimAdvisorError> {
    let start = text
        .find('{')
        .ok_or_else(|| TrimAdvisorError::Malformed("no JSON object in response".to_string()))?;
    let end = text
        .rfind('}')
        .filter(|end| *end > start)
        .ok_or_else(|| TrimAdvisorError::Malformed("unterminated JSON object".to_string()))?;

    serde_json::from_str(&text[start..=end])
        .map_err(|error| TrimAdvisorError::Malformed(error.to_string()))
}

/// Never suggests trimming.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTrimAdvisor;

#[async_trait]
impl TrimAdvisor for NoTrimAdvisor {
    async fn analyze_crop(
        &self,
        _image: &[u8],
        _problem_number: &str,
    ) -> Result<TrimSuggestion, TrimAdvisorError> {
        Ok(TrimSuggestion::default())
    }
}

/// Returns the same suggestion for every crop.
#[derive(Debug, Clone, Default)]
pub struct FixedTrimAdvisor {
    suggestion: TrimSuggestion,
}

impl FixedTrimAdvisor {
    #[must_use]
    pub const fn new(suggestion: TrimSuggestion) -> Self {
        Self { suggestion }
    }

    pub fn from_path(path: &Path) -> Result<Self, TrimAdvisorError> {
        let raw = std::fs::read_to_string(path).map_err(|error| {
            TrimAdvisorError::Request(format!("failed to read '{}': {error}", path.display()))
        })?;
        Ok(Self::new(parse_trim_response(&raw)?))
    }
}

#[async_trait]
impl TrimAdvisor for FixedTrimAdvisor {
    async fn analyze_crop(
        &self,
        _image: &[u8],
        _problem_number: &str,
    ) -> Result<TrimSuggestion, TrimAdvisorError> {
        Ok(self.suggestion.clone())
    }
}
