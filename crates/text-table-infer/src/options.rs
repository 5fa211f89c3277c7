use std::ops::RangeInclusive;

/// Tunable thresholds for format sniffing, column classification and
/// decomposition. The defaults are the empirically tuned values.
#[derive(Debug, Clone, PartialEq)]
pub struct InferOptions {
    /// Longest header name the CSV strategy accepts in the first column.
    pub max_header_len: usize,
    /// TSV is only attempted with more tab characters than this.
    pub tsv_min_tabs: usize,
    /// Markdown is only attempted with more pipe characters than this.
    pub markdown_min_pipes: usize,
    /// Shortest run of lines that counts as a whitespace-aligned table.
    pub min_region_lines: usize,
    /// Largest field-count drift tolerated inside a whitespace table region.
    pub max_field_jump: usize,
    pub merge_headers: bool,

    pub temporal_sample_size: usize,
    pub temporal_pattern_ratio: f64,
    pub year_range_ratio: f64,
    pub year_range: RangeInclusive<i64>,
    pub numeric_parse_ratio: f64,
    pub code_max_unique: usize,
    pub code_unique_ratio: f64,
    pub categorical_unique_ratio: f64,
    pub categorical_max_unique: usize,

    pub decompose: bool,
    pub max_temporal_dimensions: usize,
    pub max_temporal_measures: usize,
    pub max_categorical_dimensions: usize,
    pub max_categorical_measures: usize,
    /// Aggregates with fewer buckets than this are not chart-worthy.
    pub min_buckets: usize,
}

impl Default for InferOptions {
    fn default() -> Self {
        Self {
            max_header_len: 50,
            tsv_min_tabs: 5,
            markdown_min_pipes: 3,
            min_region_lines: 3,
            max_field_jump: 2,
            merge_headers: true,
            temporal_sample_size: 10,
            temporal_pattern_ratio: 0.7,
            year_range_ratio: 0.8,
            year_range: 1900..=2100,
            numeric_parse_ratio: 0.5,
            code_max_unique: 10,
            code_unique_ratio: 0.3,
            categorical_unique_ratio: 0.5,
            categorical_max_unique: 20,
            decompose: true,
            max_temporal_dimensions: 1,
            max_temporal_measures: 3,
            max_categorical_dimensions: 2,
            max_categorical_measures: 2,
            min_buckets: 2,
        }
    }
}
