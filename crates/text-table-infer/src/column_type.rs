use std::collections::HashSet;
use std::str::FromStr;
use std::sync::LazyLock;

use chrono::{Datelike, Month, NaiveDate};
use regex::Regex;

use crate::model::{ColumnType, Table};
use crate::options::InferOptions;
use crate::table_parse::{is_placeholder, parse_number};

static TEMPORAL_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"^\d{4}년?$",
        r"^\d{4}-\d{2}$",
        r"^\d{4}/\d{2}$",
        r"^\d{1,2}월$",
        r"(?i)^(jan(uary)?|feb(ruary)?|mar(ch)?|apr(il)?|may|june?|july?|aug(ust)?|sep(t(ember)?)?|oct(ober)?|nov(ember)?|dec(ember)?)\.?$",
        r"^\d{4}-\d{2}-\d{2}$",
        r"^\d{1,2}/\d{1,2}/\d{4}$",
        r"^\d{1,2}/\d{1,2}$",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("hardcoded temporal regex is valid"))
    .collect()
});

fn matches_temporal_pattern(value: &str) -> bool {
    TEMPORAL_PATTERNS.iter().any(|pattern| pattern.is_match(value))
}

fn is_year_in_range(value: &str, options: &InferOptions) -> bool {
    value
        .parse::<i64>()
        .is_ok_and(|year| options.year_range.contains(&year))
}

#[allow(clippy::cast_precision_loss)]
fn is_temporal(values: &[&str], options: &InferOptions) -> bool {
    let sample = values
        .iter()
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
        .take(options.temporal_sample_size)
        .collect::<Vec<_>>();
    if sample.is_empty() {
        return false;
    }

    let total = sample.len() as f64;
    let pattern_hits = sample
        .iter()
        .filter(|value| matches_temporal_pattern(value))
        .count() as f64;
    let year_hits = sample
        .iter()
        .filter(|value| is_year_in_range(value, options))
        .count() as f64;

    pattern_hits / total > options.temporal_pattern_ratio
        || year_hits / total > options.year_range_ratio
}

#[allow(clippy::cast_precision_loss)]
pub(crate) fn classify_values(values: &[&str], options: &InferOptions) -> ColumnType {
    if is_temporal(values, options) {
        return ColumnType::Temporal;
    }

    let present = values
        .iter()
        .map(|value| value.trim())
        .filter(|value| !is_placeholder(value))
        .collect::<Vec<_>>();
    let unique = present.iter().collect::<HashSet<_>>().len();
    let unique_ratio = if present.is_empty() {
        0.0
    } else {
        unique as f64 / present.len() as f64
    };

    let numeric_hits = present
        .iter()
        .filter(|value| parse_number(value).is_some())
        .count();
    if !present.is_empty() && numeric_hits as f64 / present.len() as f64 > options.numeric_parse_ratio
    {
        // Small integer codes (quarters, grades) read better as categories.
        if unique <= options.code_max_unique && unique_ratio < options.code_unique_ratio {
            return ColumnType::Categorical;
        }
        return ColumnType::Numeric;
    }

    if unique_ratio < options.categorical_unique_ratio || unique <= options.categorical_max_unique {
        return ColumnType::Categorical;
    }

    ColumnType::Mixed
}

pub(crate) fn classify_columns(table: &Table, options: &InferOptions) -> Vec<ColumnType> {
    (0..table.width())
        .map(|index| {
            let values = table.column_values(index).collect::<Vec<_>>();
            classify_values(&values, options)
        })
        .collect()
}

/// A calendar key for chronological ordering: (year, month, day) with zero
/// for parts the value does not carry.
pub(crate) fn temporal_sort_key(value: &str) -> Option<(i32, u32, u32)> {
    let value = value.trim();

    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some((date.year(), date.month(), date.day()));
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%m/%d/%Y") {
        return Some((date.year(), date.month(), date.day()));
    }

    let year_text = value.strip_suffix('년').unwrap_or(value);
    if year_text.len() == 4
        && let Ok(year) = year_text.parse::<i32>()
    {
        return Some((year, 0, 0));
    }

    for separator in ['-', '/'] {
        if let Some((left, right)) = value.split_once(separator)
            && let (Ok(left), Ok(right)) = (left.parse::<u32>(), right.parse::<u32>())
        {
            if left >= 1000 && (1..=12).contains(&right) {
                let year = i32::try_from(left).ok()?;
                return Some((year, right, 0));
            }
            if separator == '/' && (1..=12).contains(&left) && (1..=31).contains(&right) {
                return Some((0, left, right));
            }
        }
    }

    if let Some(month) = value.strip_suffix('월')
        && let Ok(month) = month.parse::<u32>()
        && (1..=12).contains(&month)
    {
        return Some((0, month, 0));
    }

    Month::from_str(value.trim_end_matches('.'))
        .ok()
        .map(|month| (0, month.number_from_month(), 0))
}
