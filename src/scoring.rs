use crate::config::CropConfig;
use crate::models::{CropCandidate, CropRect, OcrToken};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Score {
    pub position: f64,
    pub aspect: f64,
    pub density: f64,
    pub quality: f64,
    pub final_score: f64,
}

/// Full points, minus a penalty for each image edge the crop reaches.
#[must_use]
pub fn position_score(rect: CropRect, (width, height): (u32, u32), config: &CropConfig) -> f64 {
    let edge_margin = config.edge_margin;
    let touches = [
        rect.x <= edge_margin,
        rect.y <= edge_margin,
        rect.x.saturating_add(rect.width).saturating_add(edge_margin) >= width,
        rect.y.saturating_add(rect.height).saturating_add(edge_margin) >= height,
    ];
    let count = touches.iter().filter(|touch| **touch).count();
    config.position_max - config.edge_penalty * f64::from(u8::try_from(count).unwrap_or(u8::MAX))
}

/// Most points for landscape crops close to `ideal_aspect`.
#[must_use]
pub fn aspect_score(rect: CropRect, config: &CropConfig) -> f64 {
    if rect.height == 0 {
        return 0.0;
    }
    let ratio = f64::from(rect.width) / f64::from(rect.height);
    let (low, high) = config.aspect_range;
    if ratio < low || ratio > high {
        return 0.0;
    }
    config.aspect_max * (1.0 - (ratio - config.ideal_aspect).abs()).max(0.0)
}

fn coverage_points(coverage: f64) -> f64 {
    let lerp = |from: f64, to: f64, low: f64, high: f64| {
        from + (to - from) * ((coverage - low) / (high - low)).clamp(0.0, 1.0)
    };
    match coverage {
        c if c >= 0.15 => lerp(28.0, 30.0, 0.15, 0.30),
        c if c >= 0.10 => lerp(24.0, 28.0, 0.10, 0.15),
        c if c >= 0.05 => lerp(18.0, 24.0, 0.05, 0.10),
        c if c >= 0.02 => lerp(10.0, 18.0, 0.02, 0.05),
        _ => lerp(0.0, 10.0, 0.0, 0.02),
    }
}

/// Points for how much of the crop is covered by recognized text, capped at
/// `density_max`.
#[must_use]
pub fn density_score(rect: CropRect, tokens: &[OcrToken], config: &CropConfig) -> f64 {
    let region = rect.as_bbox();
    let area = region.area();
    if area == 0 {
        return 0.0;
    }

    let mut covered: i64 = 0;
    let mut confidence_sum = 0.0_f64;
    let mut overlapping = 0_u32;
    for token in tokens {
        let overlap = region.intersection_area(&token.bbox);
        if overlap > 0 {
            covered += overlap;
            confidence_sum += f64::from(token.confidence);
            overlapping += 1;
        }
    }

    #[allow(clippy::cast_precision_loss)]
    let coverage = (covered as f64 / area as f64).min(1.0);
    let average_confidence = if overlapping == 0 {
        0.0
    } else {
        confidence_sum / f64::from(overlapping)
    };

    let bonus = match overlapping {
        n if n >= 15 => 2.0,
        n if n >= 10 => 1.5,
        n if n >= 5 => 1.0,
        _ => 0.0,
    };

    (coverage_points(coverage) * (0.8 + 0.2 * average_confidence) + bonus).min(config.density_max)
}

/// Tokens whose boxes overlap the crop, in reading order of the input.
#[must_use]
pub fn overlapping_tokens(rect: CropRect, tokens: &[OcrToken]) -> Vec<OcrToken> {
    let region = rect.as_bbox();
    tokens
        .iter()
        .filter(|token| region.intersection_area(&token.bbox) > 0)
        .cloned()
        .collect()
}

/// Combines the three quality parts with the anchor's OCR confidence. Pure:
/// identical inputs give identical scores.
#[must_use]
pub fn score_crop(
    rect: CropRect,
    image_size: (u32, u32),
    tokens: &[OcrToken],
    anchor_confidence: f32,
    config: &CropConfig,
) -> Score {
    let position = position_score(rect, image_size, config);
    let aspect = aspect_score(rect, config);
    let density = density_score(rect, tokens, config);
    let quality = (position + aspect + density) / 100.0;
    let final_score =
        config.quality_weight * quality + config.anchor_weight * f64::from(anchor_confidence);

    Score {
        position,
        aspect,
        density,
        quality,
        final_score,
    }
}

/// Highest final score wins; the earliest candidate wins ties.
#[must_use]
pub fn select_best(candidates: Vec<CropCandidate>) -> Option<CropCandidate> {
    candidates.into_iter().reduce(|best, candidate| {
        if candidate.final_score > best.final_score {
            candidate
        } else {
            best
        }
    })
}
