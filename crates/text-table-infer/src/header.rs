use std::collections::HashSet;

use crate::model::ParsedRows;
use crate::table_parse::{is_placeholder, parse_number};
use crate::warning::{InferWarning, WarningCode};

fn is_numeric(value: &str) -> bool {
    parse_number(value).is_some()
}

const NULL_MARKERS: [&str; 5] = ["n/a", "na", "null", "none", "nan"];

/// Empty cells, dashes and spelled-out nulls stand for a missing value.
fn is_missing(value: &str) -> bool {
    let trimmed = value.trim();
    is_placeholder(trimmed)
        || NULL_MARKERS
            .iter()
            .any(|marker| trimmed.eq_ignore_ascii_case(marker))
}

fn is_text(value: &str) -> bool {
    !is_missing(value) && !is_numeric(value)
}

/// Detects a header split over two lines, as OCR output of wrapped header
/// cells tends to produce ("Sales" above "(units)"). The first data row is a
/// continuation when it has no numeric cell and holds real text in every
/// column that is numeric in all later rows.
pub(crate) fn is_header_continuation(rows: &[Vec<String>]) -> bool {
    let Some((candidate, below)) = rows.split_first() else {
        return false;
    };
    if below.is_empty() || candidate.iter().any(|cell| is_numeric(cell)) {
        return false;
    }

    let numeric_below = (0..candidate.len())
        .filter(|index| {
            below
                .iter()
                .all(|row| row.get(*index).is_some_and(|value| is_numeric(value)))
        })
        .collect::<Vec<_>>();

    !numeric_below.is_empty() && numeric_below.iter().all(|index| is_text(&candidate[*index]))
}

pub(crate) fn merge_continuation_header(
    parsed: &mut ParsedRows,
    warnings: &mut Vec<InferWarning>,
) -> bool {
    if !is_header_continuation(&parsed.rows) {
        return false;
    }

    let continuation = parsed.rows.remove(0);
    for (header, extra) in parsed.header.iter_mut().zip(continuation) {
        let extra = extra.trim();
        if extra.is_empty() {
            continue;
        }
        if header.trim().is_empty() {
            *header = extra.to_string();
        } else {
            *header = format!("{} {extra}", header.trim());
        }
    }

    warnings.push(
        InferWarning::new(
            WarningCode::HeaderMerged,
            "merged a header continuation line into the header",
        )
        .with_rows(1),
    );
    true
}

/// Fills empty names with `col_{n}` and suffixes repeats with `_{k}` so the
/// header can key a column.
pub(crate) fn unique_column_names(
    header: Vec<String>,
    warnings: &mut Vec<InferWarning>,
) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(header.len());

    for (index, name) in header.into_iter().enumerate() {
        let base = if name.trim().is_empty() {
            format!("col_{}", index + 1)
        } else {
            name.trim().to_string()
        };

        let mut candidate = base.clone();
        let mut suffix = 2;
        while seen.contains(&candidate) {
            candidate = format!("{base}_{suffix}");
            suffix += 1;
        }

        if candidate != name {
            warnings.push(
                InferWarning::new(
                    WarningCode::HeaderRenamed,
                    format!("renamed column header '{name}' to '{candidate}'"),
                )
                .with_column(index),
            );
        }
        seen.insert(candidate.clone());
        out.push(candidate);
    }

    out
}
