use crate::anchors::next_anchor;
use crate::config::CropConfig;
use crate::models::{BoundMethod, OcrToken, ProblemAnchor, VerticalBounds};

/// Where the text below `anchor` runs out: the first vertical gap wider than
/// `density_gap`, else just past the last token. `None` when nothing lies
/// below the anchor.
fn density_end(anchor: &ProblemAnchor, tokens: &[OcrToken], config: &CropConfig) -> Option<i32> {
    let mut below: Vec<&OcrToken> = tokens
        .iter()
        .filter(|token| token.bbox.y > anchor.position.y)
        .collect();
    below.sort_by_key(|token| token.bbox.y);

    let mut edge: Option<i32> = None;
    for token in below {
        if let Some(current) = edge
            && token.bbox.y.saturating_sub(current) > config.density_gap
        {
            return Some(current.saturating_add(config.density_end_padding));
        }
        let bottom = token.bbox.bottom();
        edge = Some(edge.map_or(bottom, |current| current.max(bottom)));
    }

    edge.map(|last| last.saturating_add(config.density_tail_padding))
}

/// Top and bottom edge for an anchor's crop. The result always satisfies
/// `bottom > top`.
#[must_use]
pub fn vertical_bounds(
    anchor: &ProblemAnchor,
    all_anchors: &[ProblemAnchor],
    tokens: &[OcrToken],
    config: &CropConfig,
) -> VerticalBounds {
    let top = anchor.position.y.saturating_sub(config.top_padding);

    let bound = match next_anchor(all_anchors, &anchor.problem_number) {
        Some(next) if next.position.y > anchor.position.y => Some((
            next.position.y.saturating_sub(config.next_problem_padding),
            BoundMethod::NextProblem,
        )),
        _ => density_end(anchor, tokens, config).map(|bottom| (bottom, BoundMethod::TextDensity)),
    };

    match bound {
        Some((bottom, method)) if bottom > top => VerticalBounds { top, bottom, method },
        _ => VerticalBounds {
            top,
            bottom: anchor.position.y.saturating_add(config.safety_height),
            method: BoundMethod::SafetyFallback,
        },
    }
}
