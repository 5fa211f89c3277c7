//! Exam-content processing core.
//!
//! [`ProblemCropper`] isolates a single exam problem from a page image using
//! OCR token geometry. Table inference over free-form text lives in the
//! [`tables`] crate and is re-exported here.

mod advisor;
mod anchors;
mod bounds;
mod config;
mod crop;
mod cropper;
mod error;
mod layout;
mod models;
mod ocr;
mod scoring;
mod store;

pub use advisor::{FixedTrimAdvisor, NoTrimAdvisor, TrimAdvisor, parse_trim_response};
pub use anchors::{anchor_number, detect_anchors};
pub use bounds::vertical_bounds;
pub use config::CropConfig;
pub use cropper::ProblemCropper;
pub use error::{CropError, OcrClientError, StoreError, TrimAdvisorError};
pub use layout::{detect_columns, horizontal_bounds};
pub use models::{
    BBox, BoundMethod, Column, CropCandidate, CropOutput, CropRect, CropResponse, Margins,
    OcrToken, ProblemAnchor, SelectedCrop, TrimSuggestion, VerticalBounds, format_execution_time,
};
pub use ocr::{JsonOcrClient, OcrClient};
pub use scoring::{Score, overlapping_tokens, score_crop, select_best};
pub use store::{CropStore, DirectoryStore};
pub use text_table_infer as tables;
