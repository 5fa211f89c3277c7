use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Axis-aligned pixel box, origin top-left.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct BBox {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl BBox {
    #[must_use]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[must_use]
    pub const fn right(&self) -> i32 {
        self.x.saturating_add(self.width)
    }

    #[must_use]
    pub const fn bottom(&self) -> i32 {
        self.y.saturating_add(self.height)
    }

    #[must_use]
    pub fn area(&self) -> i64 {
        i64::from(self.width.max(0)) * i64::from(self.height.max(0))
    }

    #[must_use]
    pub fn intersection_area(&self, other: &Self) -> i64 {
        let width = i64::from(self.right().min(other.right())) - i64::from(self.x.max(other.x));
        let height =
            i64::from(self.bottom().min(other.bottom())) - i64::from(self.y.max(other.y));
        if width <= 0 || height <= 0 {
            0
        } else {
            width * height
        }
    }
}

/// One recognized word with its page-space box.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OcrToken {
    pub text: String,
    pub bbox: BBox,
    #[serde(default)]
    pub confidence: f32,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ProblemAnchor {
    pub problem_number: String,
    pub position: BBox,
    pub confidence: f32,
}

/// A vertical text cluster in the page layout.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Column {
    pub column_id: usize,
    pub left_bound: i32,
    pub right_bound: i32,
    pub text_count: usize,
}

/// A crop region already clamped to the image.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CropRect {
    #[must_use]
    pub fn as_bbox(&self) -> BBox {
        BBox::new(
            i32::try_from(self.x).unwrap_or(i32::MAX),
            i32::try_from(self.y).unwrap_or(i32::MAX),
            i32::try_from(self.width).unwrap_or(i32::MAX),
            i32::try_from(self.height).unwrap_or(i32::MAX),
        )
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BoundMethod {
    NextProblem,
    TextDensity,
    SafetyFallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerticalBounds {
    pub top: i32,
    pub bottom: i32,
    pub method: BoundMethod,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CropCandidate {
    pub problem_number: String,
    pub coordinates: CropRect,
    pub anchor_confidence: f32,
    pub bound_method: BoundMethod,
    /// PNG-encoded sub-image.
    pub crop_image: Vec<u8>,
    /// Page tokens overlapping the crop.
    pub ocr_tokens: Vec<OcrToken>,
    pub quality_score: f64,
    pub final_score: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Margins {
    #[serde(default)]
    pub top: i32,
    #[serde(default)]
    pub bottom: i32,
    #[serde(default)]
    pub left: i32,
    #[serde(default)]
    pub right: i32,
}

/// What the vision model thinks about neighbouring problems bleeding into a
/// crop.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct TrimSuggestion {
    #[serde(default)]
    pub has_partial_problems: bool,
    #[serde(default)]
    pub removal_suggestion: Margins,
    #[serde(default)]
    pub confidence: f32,
    #[serde(default)]
    pub reasoning: String,
}

/// The selected, trimmed crop before persistence.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedCrop {
    pub problem_number: String,
    pub rect: CropRect,
    pub final_score: f64,
    pub trimmed: bool,
    pub png: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CropOutput {
    pub file_path: String,
    pub problem_number: String,
    pub rect: CropRect,
    pub final_score: f64,
    pub trimmed: bool,
    pub elapsed: Duration,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum CropResponse {
    Success {
        file_path: String,
        execution_time: String,
    },
    Failure {
        error: String,
        execution_time: String,
    },
}

#[must_use]
pub fn format_execution_time(elapsed: Duration) -> String {
    format!("{:.2}s", elapsed.as_secs_f64())
}
