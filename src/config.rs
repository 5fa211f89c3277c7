use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

/// Tuning knobs for the cropper. All distances are in pixels.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CropConfig {
    pub column_merge_threshold: i32,
    pub min_column_tokens: usize,
    pub column_left_padding: i32,
    pub column_right_padding: i32,
    pub fallback_left_padding: i32,
    pub fallback_right_extent: i32,
    pub top_padding: i32,
    pub next_problem_padding: i32,
    pub density_gap: i32,
    pub density_end_padding: i32,
    pub density_tail_padding: i32,
    pub safety_height: i32,
    pub min_crop_side: u32,
    pub edge_margin: u32,
    pub min_trimmed_side: u32,
    pub position_max: f64,
    pub edge_penalty: f64,
    pub aspect_max: f64,
    pub ideal_aspect: f64,
    pub aspect_range: (f64, f64),
    pub density_max: f64,
    pub quality_weight: f64,
    pub anchor_weight: f64,
    pub ocr_timeout_ms: u64,
    pub trim_timeout_ms: u64,
}

impl Default for CropConfig {
    fn default() -> Self {
        Self {
            column_merge_threshold: 100,
            min_column_tokens: 2,
            column_left_padding: 30,
            column_right_padding: 400,
            fallback_left_padding: 50,
            fallback_right_extent: 600,
            top_padding: 10,
            next_problem_padding: 20,
            density_gap: 80,
            density_end_padding: 20,
            density_tail_padding: 30,
            safety_height: 200,
            min_crop_side: 50,
            edge_margin: 10,
            min_trimmed_side: 100,
            position_max: 30.0,
            edge_penalty: 5.0,
            aspect_max: 40.0,
            ideal_aspect: 1.4,
            aspect_range: (0.8, 2.0),
            density_max: 30.0,
            quality_weight: 0.7,
            anchor_weight: 0.3,
            ocr_timeout_ms: 30_000,
            trim_timeout_ms: 20_000,
        }
    }
}

impl CropConfig {
    /// Loads a config file; fields missing from the JSON keep their defaults.
    pub fn from_json_file(path: &Path) -> std::io::Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        serde_json::from_str(&raw).map_err(std::io::Error::other)
    }

    #[must_use]
    pub const fn ocr_timeout(&self) -> Duration {
        Duration::from_millis(self.ocr_timeout_ms)
    }

    #[must_use]
    pub const fn trim_timeout(&self) -> Duration {
        Duration::from_millis(self.trim_timeout_ms)
    }
}
