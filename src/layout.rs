use crate::config::CropConfig;
use crate::models::{Column, OcrToken, ProblemAnchor};

/// Groups token left edges into columns. Consecutive sorted `x` values at
/// most `column_merge_threshold` apart share a cluster.
#[must_use]
pub fn detect_columns(tokens: &[OcrToken], config: &CropConfig) -> Vec<Column> {
    let mut xs: Vec<i32> = tokens.iter().map(|token| token.bbox.x).collect();
    xs.sort_unstable();

    let mut clusters: Vec<Vec<i32>> = Vec::new();
    for x in xs {
        let joins_previous = clusters
            .last()
            .and_then(|cluster| cluster.last())
            .is_some_and(|last| x.saturating_sub(*last) <= config.column_merge_threshold);
        if joins_previous && let Some(cluster) = clusters.last_mut() {
            cluster.push(x);
        } else {
            clusters.push(vec![x]);
        }
    }

    clusters
        .into_iter()
        .filter(|cluster| cluster.len() >= config.min_column_tokens)
        .enumerate()
        .map(|(column_id, cluster)| {
            let min_x = cluster.first().copied().unwrap_or_default();
            let max_x = cluster.last().copied().unwrap_or_default();
            Column {
                column_id,
                left_bound: min_x.saturating_sub(config.column_left_padding),
                right_bound: max_x.saturating_add(config.column_right_padding),
                text_count: cluster.len(),
            }
        })
        .collect()
}

/// Left and right edge for an anchor's crop. Falls back to a fixed window
/// when no column contains the anchor.
#[must_use]
pub fn horizontal_bounds(
    anchor: &ProblemAnchor,
    columns: &[Column],
    config: &CropConfig,
) -> (i32, i32) {
    let x = anchor.position.x;
    columns
        .iter()
        .find(|column| column.left_bound <= x && x <= column.right_bound)
        .map_or(
            (
                x.saturating_sub(config.fallback_left_padding),
                x.saturating_add(config.fallback_right_extent),
            ),
            |column| (column.left_bound, column.right_bound),
        )
}
