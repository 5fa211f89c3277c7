//! Reconstructs typed tables from semi-structured text: CSV, TSV, markdown
//! tables, whitespace-aligned grids and OCR/LLM renditions of them.
//!
//! Inference never fails on bad input. Text that does not encode a table
//! yields [`Inference::NotTabular`], which callers render as plain text.

mod column_type;
mod csv_out;
mod decompose;
mod error;
mod header;
mod model;
mod options;
mod sniff;
mod table_parse;
mod text_input;
mod warning;

use tracing::{debug, info};

use crate::column_type::classify_columns;
use crate::decompose::{DecompositionEmpty, decompose};
use crate::header::{merge_continuation_header, unique_column_names};
use crate::sniff::sniff;
use crate::table_parse::strip_code_fence;

pub use csv_out::{table_to_csv_string, write_table_csv};
pub use error::InferError;
pub use model::{
    Aggregation, AxisHint, ColumnType, Inference, InferenceReport, SourceFormat, Table, TableView,
};
pub use options::InferOptions;
pub use text_input::decode_text;
pub use warning::{InferWarning, WarningCode};

fn build_views(
    table: &Table,
    column_types: &[ColumnType],
    options: &InferOptions,
    warnings: &mut Vec<InferWarning>,
) -> Vec<TableView> {
    let original = || TableView {
        title: String::new(),
        table: table.clone(),
        column_types: column_types.to_vec(),
        aggregation: None,
    };

    if !options.decompose {
        return vec![original()];
    }

    match decompose(table, column_types, options) {
        Ok(views) => views,
        Err(DecompositionEmpty::NotApplicable) => vec![original()],
        Err(DecompositionEmpty::NoChartWorthyPair) => {
            warnings.push(InferWarning::new(
                WarningCode::DecompositionEmpty,
                "every aggregate collapsed to a single bucket; keeping the original table",
            ));
            vec![original()]
        }
    }
}

/// Sniffs the structure of `text` and returns the parsed table, its column
/// types and its chart-ready views.
#[must_use]
pub fn infer_table(text: &str, options: &InferOptions) -> Inference {
    let text = strip_code_fence(text);
    if text.is_empty() {
        return Inference::NotTabular;
    }

    let Some((format, mut parsed)) = sniff(text, options) else {
        debug!(chars = text.len(), "no format strategy matched");
        return Inference::NotTabular;
    };

    let mut warnings = Vec::new();
    if parsed.dropped_rows > 0 {
        warnings.push(
            InferWarning::new(WarningCode::RowsDropped, "dropped malformed rows")
                .with_rows(parsed.dropped_rows),
        );
    }
    if parsed.padded_rows > 0 {
        warnings.push(
            InferWarning::new(WarningCode::RowsPadded, "padded short rows to the header width")
                .with_rows(parsed.padded_rows),
        );
    }

    if options.merge_headers && matches!(format, SourceFormat::Markdown | SourceFormat::Whitespace)
    {
        merge_continuation_header(&mut parsed, &mut warnings);
    }

    let columns = unique_column_names(parsed.header, &mut warnings);
    let table = Table::new(columns, parsed.rows);
    let column_types = classify_columns(&table, options);
    let views = build_views(&table, &column_types, options, &mut warnings);

    info!(
        format = format.as_str(),
        columns = table.width(),
        rows = table.row_count(),
        views = views.len(),
        warnings = warnings.len(),
        "table inference completed"
    );

    Inference::Tabular(InferenceReport {
        format,
        table,
        column_types,
        views,
        warnings,
    })
}

/// Same as [`infer_table`] for raw uploaded bytes of unknown encoding.
#[must_use]
pub fn infer_table_from_bytes(bytes: &[u8], options: &InferOptions) -> Inference {
    infer_table(&decode_text(bytes), options)
}

/// Picks chart axes: the first temporal column (else the first categorical
/// one) along x, every numeric column along y.
#[must_use]
pub fn suggest_axes(column_types: &[ColumnType]) -> AxisHint {
    let x = column_types
        .iter()
        .position(|column_type| *column_type == ColumnType::Temporal)
        .or_else(|| {
            column_types
                .iter()
                .position(|column_type| *column_type == ColumnType::Categorical)
        });
    let y = column_types
        .iter()
        .enumerate()
        .filter(|(_, column_type)| **column_type == ColumnType::Numeric)
        .map(|(index, _)| index)
        .collect();

    AxisHint { x, y }
}
