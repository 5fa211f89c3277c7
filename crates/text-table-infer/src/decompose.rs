use std::collections::HashMap;

use tracing::debug;

use crate::column_type::temporal_sort_key;
use crate::model::{Aggregation, ColumnType, Table, TableView};
use crate::options::InferOptions;
use crate::table_parse::{format_number, is_placeholder, parse_number};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DecompositionEmpty {
    /// The table lacks a numeric measure or a categorical/temporal dimension.
    NotApplicable,
    /// Every pairing collapsed below the bucket minimum.
    NoChartWorthyPair,
}

struct Bucket {
    key: String,
    total: f64,
    count: usize,
}

fn aggregate(
    table: &Table,
    column_types: &[ColumnType],
    dimension: usize,
    measure: usize,
    aggregation: Aggregation,
    options: &InferOptions,
) -> Option<TableView> {
    let mut buckets: Vec<Bucket> = Vec::new();
    let mut index_by_key: HashMap<&str, usize> = HashMap::new();

    for row in &table.rows {
        let key = row[dimension].trim();
        if is_placeholder(key) {
            continue;
        }
        let Some(value) = parse_number(&row[measure]) else {
            continue;
        };

        let slot = *index_by_key.entry(key).or_insert_with(|| {
            buckets.push(Bucket {
                key: key.to_string(),
                total: 0.0,
                count: 0,
            });
            buckets.len() - 1
        });
        buckets[slot].total += value;
        buckets[slot].count += 1;
    }

    if buckets.len() < options.min_buckets {
        debug!(
            dimension = %table.columns[dimension],
            measure = %table.columns[measure],
            buckets = buckets.len(),
            "discarding single-bucket aggregate"
        );
        return None;
    }

    if column_types[dimension] == ColumnType::Temporal {
        let keys = buckets
            .iter()
            .map(|bucket| temporal_sort_key(&bucket.key))
            .collect::<Option<Vec<_>>>();
        if let Some(keys) = keys {
            let mut keyed = keys.into_iter().zip(buckets).collect::<Vec<_>>();
            keyed.sort_by_key(|(key, _)| *key);
            buckets = keyed.into_iter().map(|(_, bucket)| bucket).collect();
        }
    }

    let rows = buckets
        .into_iter()
        .map(|bucket| {
            #[allow(clippy::cast_precision_loss)]
            let value = match aggregation {
                Aggregation::Mean => bucket.total / bucket.count as f64,
                Aggregation::Sum => bucket.total,
            };
            vec![bucket.key, format_number(value)]
        })
        .collect::<Vec<_>>();

    let dimension_name = table.columns[dimension].clone();
    let measure_name = table.columns[measure].clone();
    Some(TableView {
        title: format!("{measure_name} by {dimension_name}"),
        table: Table::new(vec![dimension_name, measure_name], rows),
        column_types: vec![column_types[dimension], ColumnType::Numeric],
        aggregation: Some(aggregation),
    })
}

fn indices_of(column_types: &[ColumnType], wanted: ColumnType) -> Vec<usize> {
    column_types
        .iter()
        .enumerate()
        .filter(|(_, column_type)| **column_type == wanted)
        .map(|(index, _)| index)
        .collect()
}

/// Splits a table into (dimension, measure) aggregates: time series averaged
/// per period and categories summed per group.
pub(crate) fn decompose(
    table: &Table,
    column_types: &[ColumnType],
    options: &InferOptions,
) -> Result<Vec<TableView>, DecompositionEmpty> {
    let numeric = indices_of(column_types, ColumnType::Numeric);
    let temporal = indices_of(column_types, ColumnType::Temporal);
    let categorical = indices_of(column_types, ColumnType::Categorical);
    if numeric.is_empty() || !column_types.iter().any(|column_type| column_type.is_dimension()) {
        return Err(DecompositionEmpty::NotApplicable);
    }

    let mut views = Vec::new();
    let temporal_used = temporal
        .iter()
        .copied()
        .take(options.max_temporal_dimensions)
        .collect::<Vec<_>>();

    for &dimension in &temporal_used {
        for &measure in numeric.iter().take(options.max_temporal_measures) {
            views.extend(aggregate(
                table,
                column_types,
                dimension,
                measure,
                Aggregation::Mean,
                options,
            ));
        }
    }

    for &dimension in categorical
        .iter()
        .filter(|index| !temporal_used.contains(*index))
        .take(options.max_categorical_dimensions)
    {
        for &measure in numeric.iter().take(options.max_categorical_measures) {
            views.extend(aggregate(
                table,
                column_types,
                dimension,
                measure,
                Aggregation::Sum,
                options,
            ));
        }
    }

    if views.is_empty() {
        return Err(DecompositionEmpty::NoChartWorthyPair);
    }

    Ok(views)
}
