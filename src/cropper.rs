use std::sync::Arc;
use std::time::Instant;

use image::{DynamicImage, GenericImageView};
use tracing::{debug, info, warn};

use crate::advisor::TrimAdvisor;
use crate::anchors::{detect_anchors, filter_targets};
use crate::bounds::vertical_bounds;
use crate::config::CropConfig;
use crate::crop::{clamp_rect, crop_to, decode_image, encode_png, trimmed_region};
use crate::error::{CropError, OcrClientError};
use crate::layout::{detect_columns, horizontal_bounds};
use crate::models::{
    Column, CropCandidate, CropOutput, CropRect, CropResponse, OcrToken, ProblemAnchor,
    SelectedCrop, format_execution_time,
};
use crate::ocr::OcrClient;
use crate::scoring::{overlapping_tokens, score_crop, select_best};
use crate::store::CropStore;

/// Cuts exactly one exam problem out of a page photo.
///
/// The cropper holds no per-request state, so a single instance can serve
/// concurrent calls.
#[derive(Clone)]
pub struct ProblemCropper {
    ocr: Arc<dyn OcrClient>,
    advisor: Arc<dyn TrimAdvisor>,
    store: Arc<dyn CropStore>,
    config: CropConfig,
    targets: Vec<String>,
}

impl ProblemCropper {
    #[must_use]
    pub fn new(
        ocr: Arc<dyn OcrClient>,
        advisor: Arc<dyn TrimAdvisor>,
        store: Arc<dyn CropStore>,
    ) -> Self {
        Self {
            ocr,
            advisor,
            store,
            config: CropConfig::default(),
            targets: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: CropConfig) -> Self {
        self.config = config;
        self
    }

    /// Restricts candidates to the given problem numbers.
    #[must_use]
    pub fn with_targets<I, S>(mut self, targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.targets = targets.into_iter().map(Into::into).collect();
        self
    }

    async fn extract_tokens(&self, image: &[u8]) -> Result<Vec<OcrToken>, CropError> {
        let timeout = self.config.ocr_timeout();
        match tokio::time::timeout(timeout, self.ocr.extract_tokens(image)).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(OcrClientError::Timeout(self.config.ocr_timeout_ms).into()),
        }
    }

    fn build_candidate(
        &self,
        page: &DynamicImage,
        anchor: &ProblemAnchor,
        all_anchors: &[ProblemAnchor],
        tokens: &[OcrToken],
        columns: &[Column],
    ) -> Result<Option<CropCandidate>, CropError> {
        let horizontal = horizontal_bounds(anchor, columns, &self.config);
        let vertical = vertical_bounds(anchor, all_anchors, tokens, &self.config);

        let Some(rect) = clamp_rect(
            horizontal,
            (vertical.top, vertical.bottom),
            page.dimensions(),
            self.config.min_crop_side,
        ) else {
            debug!(
                problem = %anchor.problem_number,
                ?horizontal,
                top = vertical.top,
                bottom = vertical.bottom,
                "crop region too small after clamping"
            );
            return Ok(None);
        };

        let score = score_crop(
            rect,
            page.dimensions(),
            tokens,
            anchor.confidence,
            &self.config,
        );
        debug!(
            problem = %anchor.problem_number,
            method = ?vertical.method,
            position = score.position,
            aspect = score.aspect,
            density = score.density,
            final_score = score.final_score,
            "scored crop candidate"
        );

        Ok(Some(CropCandidate {
            problem_number: anchor.problem_number.clone(),
            coordinates: rect,
            anchor_confidence: anchor.confidence,
            bound_method: vertical.method,
            crop_image: encode_png(&crop_to(page, rect))?,
            ocr_tokens: overlapping_tokens(rect, tokens),
            quality_score: score.quality,
            final_score: score.final_score,
        }))
    }

    /// Asks the advisor whether neighbouring problems leak into the crop and
    /// cuts them off. Any advisor failure keeps the crop as is.
    async fn trim(
        &self,
        page: &DynamicImage,
        candidate: CropCandidate,
    ) -> Result<SelectedCrop, CropError> {
        let untrimmed = |candidate: CropCandidate| SelectedCrop {
            problem_number: candidate.problem_number,
            rect: candidate.coordinates,
            final_score: candidate.final_score,
            trimmed: false,
            png: candidate.crop_image,
        };

        let timeout = self.config.trim_timeout();
        let advice = tokio::time::timeout(
            timeout,
            self.advisor
                .analyze_crop(&candidate.crop_image, &candidate.problem_number),
        )
        .await;

        let suggestion = match advice {
            Ok(Ok(suggestion)) => suggestion,
            Ok(Err(error)) => {
                warn!(problem = %candidate.problem_number, %error, "trim advice unavailable");
                return Ok(untrimmed(candidate));
            }
            Err(_) => {
                warn!(
                    problem = %candidate.problem_number,
                    timeout_ms = self.config.trim_timeout_ms,
                    "trim advice timed out"
                );
                return Ok(untrimmed(candidate));
            }
        };

        let rect = candidate.coordinates;
        let Some(region) = trimmed_region(
            rect.width,
            rect.height,
            &suggestion,
            self.config.min_trimmed_side,
        ) else {
            debug!(
                problem = %candidate.problem_number,
                partial = suggestion.has_partial_problems,
                "keeping crop untrimmed"
            );
            return Ok(untrimmed(candidate));
        };

        let page_rect = CropRect {
            x: rect.x + region.x,
            y: rect.y + region.y,
            width: region.width,
            height: region.height,
        };
        info!(
            problem = %candidate.problem_number,
            reasoning = %suggestion.reasoning,
            ?page_rect,
            "trimmed neighbouring problem fragments"
        );

        Ok(SelectedCrop {
            problem_number: candidate.problem_number,
            rect: page_rect,
            final_score: candidate.final_score,
            trimmed: true,
            png: encode_png(&crop_to(page, page_rect))?,
        })
    }

    /// Runs OCR, anchor detection, scoring and trimming. Returns the chosen
    /// crop in memory without storing it.
    pub async fn crop_best(&self, image: &[u8]) -> Result<SelectedCrop, CropError> {
        let page = decode_image(image)?;
        let tokens = self.extract_tokens(image).await?;
        if tokens.is_empty() {
            return Err(CropError::NoOcrResult);
        }

        let all_anchors = detect_anchors(&tokens);
        let anchors = filter_targets(&all_anchors, &self.targets);
        if anchors.is_empty() {
            return Err(CropError::NoAnchorFound {
                tokens: tokens.len(),
            });
        }

        let columns = detect_columns(&tokens, &self.config);
        debug!(
            tokens = tokens.len(),
            anchors = anchors.len(),
            columns = columns.len(),
            "page layout detected"
        );

        let mut candidates = Vec::with_capacity(anchors.len());
        for anchor in &anchors {
            if let Some(candidate) =
                self.build_candidate(&page, anchor, &all_anchors, &tokens, &columns)?
            {
                candidates.push(candidate);
            }
        }

        let best = select_best(candidates).ok_or(CropError::NoValidCrop)?;
        self.trim(&page, best).await
    }

    /// Full pipeline: crops the best problem and persists it through the
    /// store.
    pub async fn detect_and_segment(&self, image: &[u8]) -> Result<CropOutput, CropError> {
        let started = Instant::now();
        let selected = self.crop_best(image).await?;

        let name = format!(
            "problem_{}_{}.png",
            selected.problem_number,
            chrono::Utc::now().timestamp_millis()
        );
        let file_path = self.store.put(&selected.png, &name).await?;

        let elapsed = started.elapsed();
        info!(
            problem = %selected.problem_number,
            %file_path,
            trimmed = selected.trimmed,
            elapsed_ms = elapsed.as_millis(),
            "problem crop stored"
        );

        Ok(CropOutput {
            file_path,
            problem_number: selected.problem_number,
            rect: selected.rect,
            final_score: selected.final_score,
            trimmed: selected.trimmed,
            elapsed,
        })
    }

    /// Caller-facing wrapper that never fails.
    pub async fn respond(&self, image: &[u8]) -> CropResponse {
        let started = Instant::now();
        match self.detect_and_segment(image).await {
            Ok(output) => CropResponse::Success {
                file_path: output.file_path,
                execution_time: format_execution_time(output.elapsed),
            },
            Err(error) => {
                warn!(code = error.code(), %error, "problem crop failed");
                CropResponse::Failure {
                    error: error.user_message(),
                    execution_time: format_execution_time(started.elapsed()),
                }
            }
        }
    }
}
