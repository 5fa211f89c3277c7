use std::sync::LazyLock;

use regex::Regex;

use crate::models::{OcrToken, ProblemAnchor};

static ANCHOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9]+)\.$").expect("hardcoded anchor regex is valid"));

/// Returns the problem number when the token is exactly `<digits>.`.
#[must_use]
pub fn anchor_number(text: &str) -> Option<&str> {
    ANCHOR_RE
        .captures(text)
        .and_then(|captures| captures.get(1))
        .map(|number| number.as_str())
}

/// Finds every problem-number token, top to bottom. Equal `y` keeps OCR
/// order and duplicates are kept.
#[must_use]
pub fn detect_anchors(tokens: &[OcrToken]) -> Vec<ProblemAnchor> {
    let mut anchors: Vec<ProblemAnchor> = tokens
        .iter()
        .filter_map(|token| {
            anchor_number(&token.text).map(|number| ProblemAnchor {
                problem_number: number.to_string(),
                position: token.bbox,
                confidence: token.confidence,
            })
        })
        .collect();
    anchors.sort_by_key(|anchor| anchor.position.y);
    anchors
}

#[must_use]
pub fn filter_targets(anchors: &[ProblemAnchor], targets: &[String]) -> Vec<ProblemAnchor> {
    if targets.is_empty() {
        return anchors.to_vec();
    }
    anchors
        .iter()
        .filter(|anchor| targets.contains(&anchor.problem_number))
        .cloned()
        .collect()
}

/// The anchor numbered one above `number`, searched over the whole page.
#[must_use]
pub fn next_anchor<'a>(anchors: &'a [ProblemAnchor], number: &str) -> Option<&'a ProblemAnchor> {
    let next = number.parse::<u64>().ok()?.checked_add(1)?.to_string();
    anchors.iter().find(|anchor| anchor.problem_number == next)
}
