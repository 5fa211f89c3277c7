use serde::{Deserialize, Serialize};

use crate::warning::InferWarning;

/// A parsed grid. Every row holds exactly `columns.len()` values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    #[must_use]
    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { columns, rows }
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Values of one column, top to bottom.
    pub fn column_values(&self, index: usize) -> impl Iterator<Item = &str> + '_ {
        self.rows
            .iter()
            .filter_map(move |row| row.get(index).map(String::as_str))
    }

    #[must_use]
    pub fn is_rectangular(&self) -> bool {
        self.rows.iter().all(|row| row.len() == self.columns.len())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Numeric,
    Categorical,
    Temporal,
    Mixed,
}

impl ColumnType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Numeric => "numeric",
            Self::Categorical => "categorical",
            Self::Temporal => "temporal",
            Self::Mixed => "mixed",
        }
    }

    #[must_use]
    pub const fn is_dimension(self) -> bool {
        matches!(self, Self::Categorical | Self::Temporal)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    Csv,
    Tsv,
    Markdown,
    Whitespace,
}

impl SourceFormat {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Tsv => "tsv",
            Self::Markdown => "markdown",
            Self::Whitespace => "whitespace",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggregation {
    Mean,
    Sum,
}

impl Aggregation {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Mean => "mean",
            Self::Sum => "sum",
        }
    }
}

/// A chart-ready table: either the parsed original or a derived
/// (dimension, measure) aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableView {
    pub title: String,
    pub table: Table,
    pub column_types: Vec<ColumnType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregation: Option<Aggregation>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InferenceReport {
    pub format: SourceFormat,
    pub table: Table,
    pub column_types: Vec<ColumnType>,
    pub views: Vec<TableView>,
    pub warnings: Vec<InferWarning>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Inference {
    Tabular(InferenceReport),
    NotTabular,
}

impl Inference {
    #[must_use]
    pub fn is_tabular(&self) -> bool {
        matches!(self, Self::Tabular(_))
    }

    #[must_use]
    pub fn report(&self) -> Option<&InferenceReport> {
        match self {
            Self::Tabular(report) => Some(report),
            Self::NotTabular => None,
        }
    }

    #[must_use]
    pub fn into_report(self) -> Option<InferenceReport> {
        match self {
            Self::Tabular(report) => Some(report),
            Self::NotTabular => None,
        }
    }
}

/// Header plus data rows as produced by a format strategy, before header
/// normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ParsedRows {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub dropped_rows: usize,
    pub padded_rows: usize,
}

/// Suggested chart axes for a set of column types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AxisHint {
    pub x: Option<usize>,
    pub y: Vec<usize>,
}
