use std::io::Cursor;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use edu_content_core::{
    BBox, CropStore, OcrClient, OcrClientError, OcrToken, StoreError, TrimAdvisor,
    TrimAdvisorError, TrimSuggestion,
};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};

pub const PAGE_WIDTH: u32 = 1200;
pub const PAGE_HEIGHT: u32 = 2000;

pub fn blank_png(width: u32, height: u32) -> Vec<u8> {
    let page = RgbImage::from_pixel(width, height, Rgb([255, 255, 255]));
    let mut buffer = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(page)
        .write_to(&mut buffer, ImageFormat::Png)
        .expect("blank page encodes");
    buffer.into_inner()
}

pub fn png_dimensions(bytes: &[u8]) -> (u32, u32) {
    let decoded = image::load_from_memory(bytes).expect("crop decodes");
    (decoded.width(), decoded.height())
}

pub fn token(text: &str, x: i32, y: i32, width: i32, height: i32) -> OcrToken {
    OcrToken {
        text: text.to_string(),
        bbox: BBox::new(x, y, width, height),
        confidence: 0.9,
    }
}

/// A single-column page with problems 12, 13 and 14. Problem 12 starts at
/// the top edge and problem 14 runs off the bottom.
pub fn three_problem_page() -> Vec<OcrToken> {
    let mut tokens = Vec::new();
    for (number, y) in [("12.", 5), ("13.", 600), ("14.", 1350)] {
        let mut anchor = token(number, 100, y, 30, 20);
        anchor.confidence = 0.95;
        tokens.push(anchor);
    }
    for y in (40..=1960).step_by(30) {
        for x in (140..=740).step_by(100) {
            tokens.push(token("word", x, y, 80, 20));
        }
    }
    tokens
}

pub struct SlowOcr(pub Duration);

#[async_trait]
impl OcrClient for SlowOcr {
    async fn extract_tokens(&self, _image: &[u8]) -> Result<Vec<OcrToken>, OcrClientError> {
        tokio::time::sleep(self.0).await;
        Ok(Vec::new())
    }
}

pub struct FailingAdvisor;

#[async_trait]
impl TrimAdvisor for FailingAdvisor {
    async fn analyze_crop(
        &self,
        _image: &[u8],
        _problem_number: &str,
    ) -> Result<TrimSuggestion, TrimAdvisorError> {
        Err(TrimAdvisorError::Request("vision model unavailable".to_string()))
    }
}

pub struct SlowAdvisor(pub Duration, pub TrimSuggestion);

#[async_trait]
impl TrimAdvisor for SlowAdvisor {
    async fn analyze_crop(
        &self,
        _image: &[u8],
        _problem_number: &str,
    ) -> Result<TrimSuggestion, TrimAdvisorError> {
        tokio::time::sleep(self.0).await;
        Ok(self.1.clone())
    }
}

/// Keeps stored crops in memory so tests can inspect names and bytes.
#[derive(Default)]
pub struct MemoryStore {
    pub items: Mutex<Vec<(String, Vec<u8>)>>,
}

#[async_trait]
impl CropStore for MemoryStore {
    async fn put(&self, bytes: &[u8], name: &str) -> Result<String, StoreError> {
        self.items
            .lock()
            .expect("store lock")
            .push((name.to_string(), bytes.to_vec()));
        Ok(format!("memory://{name}"))
    }
}

pub struct BrokenStore;

#[async_trait]
impl CropStore for BrokenStore {
    async fn put(&self, _bytes: &[u8], _name: &str) -> Result<String, StoreError> {
        Err(StoreError::Io(std::io::Error::other("disk full")))
    }
}
