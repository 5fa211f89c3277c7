use std::io::Cursor;

use image::{DynamicImage, ImageFormat};

use crate::error::CropError;
use crate::models::{CropRect, TrimSuggestion};

pub fn decode_image(bytes: &[u8]) -> Result<DynamicImage, CropError> {
    image::load_from_memory(bytes).map_err(CropError::ImageDecode)
}

pub fn encode_png(image: &DynamicImage) -> Result<Vec<u8>, CropError> {
    let mut buffer = Cursor::new(Vec::new());
    image
        .write_to(&mut buffer, ImageFormat::Png)
        .map_err(CropError::ImageEncode)?;
    Ok(buffer.into_inner())
}

fn clamp_axis(value: i32, limit: u32) -> u32 {
    u32::try_from(value.max(0)).unwrap_or(0).min(limit)
}

/// Intersects the box `[left, right) x [top, bottom)` with the image.
/// `None` when the remaining region is thinner than `min_side` either way.
#[must_use]
pub fn clamp_rect(
    (left, right): (i32, i32),
    (top, bottom): (i32, i32),
    (image_width, image_height): (u32, u32),
    min_side: u32,
) -> Option<CropRect> {
    let x0 = clamp_axis(left, image_width);
    let x1 = clamp_axis(right, image_width);
    let y0 = clamp_axis(top, image_height);
    let y1 = clamp_axis(bottom, image_height);

    let width = x1.saturating_sub(x0);
    let height = y1.saturating_sub(y0);
    if width < min_side || height < min_side {
        return None;
    }

    Some(CropRect {
        x: x0,
        y: y0,
        width,
        height,
    })
}

#[must_use]
pub fn crop_to(image: &DynamicImage, rect: CropRect) -> DynamicImage {
    image.crop_imm(rect.x, rect.y, rect.width, rect.height)
}

fn clamp_margin(margin: i32, dimension: u32) -> u32 {
    u32::try_from(margin.max(0))
        .unwrap_or(0)
        .min(dimension / 3)
}

/// The part of a `width` x `height` crop left after removing the suggested
/// margins, relative to the crop. `None` when nothing should be cut or the
/// remainder would be smaller than `min_side`.
#[must_use]
pub fn trimmed_region(
    width: u32,
    height: u32,
    suggestion: &TrimSuggestion,
    min_side: u32,
) -> Option<CropRect> {
    if !suggestion.has_partial_problems {
        return None;
    }

    let margins = &suggestion.removal_suggestion;
    let top = clamp_margin(margins.top, height);
    let bottom = clamp_margin(margins.bottom, height);
    let left = clamp_margin(margins.left, width);
    let right = clamp_margin(margins.right, width);
    if top + bottom + left + right == 0 {
        return None;
    }

    let new_width = width.saturating_sub(left + right);
    let new_height = height.saturating_sub(top + bottom);
    if new_width < min_side || new_height < min_side {
        return None;
    }

    Some(CropRect {
        x: left,
        y: top,
        width: new_width,
        height: new_height,
    })
}
