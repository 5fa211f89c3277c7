use thiserror::Error;

const NO_PROBLEM_MESSAGE: &str = "please upload an image with exactly one visible problem";

#[derive(Debug, Error)]
pub enum OcrClientError {
    #[error("ocr request failed: {0}")]
    Request(String),
    #[error("ocr response was malformed: {0}")]
    Malformed(String),
    #[error("ocr timed out after {0} ms")]
    Timeout(u64),
}

#[derive(Debug, Error)]
pub enum TrimAdvisorError {
    #[error("trim advisor request failed: {0}")]
    Request(String),
    #[error("trim advisor response was malformed: {0}")]
    Malformed(String),
    #[error("trim advisor timed out after {0} ms")]
    Timeout(u64),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum CropError {
    #[error("failed to decode page image: {0}")]
    ImageDecode(#[source] image::ImageError),
    #[error(transparent)]
    OcrClient(#[from] OcrClientError),
    #[error("ocr returned no text")]
    NoOcrResult,
    #[error("no problem number found among {tokens} ocr tokens")]
    NoAnchorFound { tokens: usize },
    #[error("every crop candidate fell outside the image")]
    NoValidCrop,
    #[error("failed to encode crop: {0}")]
    ImageEncode(#[source] image::ImageError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl CropError {
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::ImageDecode(_) => "image_decode",
            Self::OcrClient(_) => "ocr_client",
            Self::NoOcrResult => "no_ocr_result",
            Self::NoAnchorFound { .. } => "no_anchor_found",
            Self::NoValidCrop => "no_valid_crop",
            Self::ImageEncode(_) => "image_encode",
            Self::Store(_) => "store",
        }
    }

    /// Empty OCR output and a page without problem numbers look the same to
    /// the uploader.
    #[must_use]
    pub const fn is_no_problem(&self) -> bool {
        matches!(self, Self::NoOcrResult | Self::NoAnchorFound { .. })
    }

    #[must_use]
    pub fn user_message(&self) -> String {
        if self.is_no_problem() {
            NO_PROBLEM_MESSAGE.to_string()
        } else {
            self.to_string()
        }
    }
}
