use csv::ReaderBuilder;
use tracing::debug;

use crate::model::{ParsedRows, SourceFormat};
use crate::options::InferOptions;
use crate::table_parse::{fit_row, is_markdown_separator, split_line_into_cells, split_markdown_row};

const CSV_FILL: &str = "-";
const WHITESPACE_FILL: &str = "";

/// Why a strategy declined the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum FormatMiss {
    NotApplicable,
    TooFewColumns(usize),
    CorruptedHeader,
    NoDataRows,
    NoTableRegion,
}

type ParseFn = fn(&str, &InferOptions) -> Result<ParsedRows, FormatMiss>;

struct FormatStrategy {
    format: SourceFormat,
    parse: ParseFn,
}

/// Tried in order, most specific first.
const STRATEGIES: [FormatStrategy; 4] = [
    FormatStrategy {
        format: SourceFormat::Csv,
        parse: parse_csv,
    },
    FormatStrategy {
        format: SourceFormat::Tsv,
        parse: parse_tsv,
    },
    FormatStrategy {
        format: SourceFormat::Markdown,
        parse: parse_markdown,
    },
    FormatStrategy {
        format: SourceFormat::Whitespace,
        parse: parse_whitespace,
    },
];

pub(crate) fn sniff(text: &str, options: &InferOptions) -> Option<(SourceFormat, ParsedRows)> {
    STRATEGIES.iter().find_map(|strategy| {
        match (strategy.parse)(text, options) {
            Ok(parsed) => {
                debug!(
                    format = strategy.format.as_str(),
                    columns = parsed.header.len(),
                    rows = parsed.rows.len(),
                    "format strategy matched"
                );
                Some((strategy.format, parsed))
            }
            Err(miss) => {
                debug!(format = strategy.format.as_str(), ?miss, "format strategy declined");
                None
            }
        }
    })
}

fn non_empty_lines(text: &str) -> impl Iterator<Item = &str> {
    text.lines().filter(|line| !line.trim().is_empty())
}

fn parse_delimited(
    text: &str,
    delimiter: u8,
    options: &InferOptions,
) -> Result<ParsedRows, FormatMiss> {
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let header = reader
        .headers()
        .map_err(|_| FormatMiss::CorruptedHeader)?
        .iter()
        .map(|name| name.trim().to_string())
        .collect::<Vec<_>>();
    if header.len() < 2 {
        return Err(FormatMiss::TooFewColumns(header.len()));
    }

    let first = &header[0];
    if first.chars().count() > options.max_header_len || first.contains('|') {
        return Err(FormatMiss::CorruptedHeader);
    }

    let width = header.len();
    let mut rows = Vec::new();
    let mut dropped_rows = 0;
    let mut padded_rows = 0;
    for record in reader.records() {
        let Ok(record) = record else {
            dropped_rows += 1;
            continue;
        };
        // A whitespace-only line, not a row of empty cells.
        if record.len() == 1 && record[0].trim().is_empty() {
            continue;
        }
        if record.len() > width {
            dropped_rows += 1;
            continue;
        }

        let mut row = record.iter().map(str::to_string).collect::<Vec<_>>();
        if fit_row(&mut row, width, CSV_FILL) {
            padded_rows += 1;
        }
        rows.push(row);
    }

    if rows.is_empty() {
        return Err(FormatMiss::NoDataRows);
    }

    Ok(ParsedRows {
        header,
        rows,
        dropped_rows,
        padded_rows,
    })
}

fn parse_csv(text: &str, options: &InferOptions) -> Result<ParsedRows, FormatMiss> {
    let mut lines = non_empty_lines(text);
    let first = lines.next().ok_or(FormatMiss::NotApplicable)?;
    if lines.next().is_none() || !first.contains(',') {
        return Err(FormatMiss::NotApplicable);
    }

    parse_delimited(text, b',', options)
}

fn parse_tsv(text: &str, options: &InferOptions) -> Result<ParsedRows, FormatMiss> {
    if text.matches('\t').count() <= options.tsv_min_tabs {
        return Err(FormatMiss::NotApplicable);
    }

    parse_delimited(text, b'\t', options)
}

fn parse_markdown(text: &str, options: &InferOptions) -> Result<ParsedRows, FormatMiss> {
    if text.matches('|').count() <= options.markdown_min_pipes {
        return Err(FormatMiss::NotApplicable);
    }

    let mut lines = text
        .lines()
        .filter(|line| line.contains('|'))
        .filter(|line| !is_markdown_separator(line));

    let header = split_markdown_row(lines.next().ok_or(FormatMiss::NotApplicable)?);
    if header.len() < 2 {
        return Err(FormatMiss::TooFewColumns(header.len()));
    }

    let mut rows = Vec::new();
    let mut dropped_rows = 0;
    for line in lines {
        let row = split_markdown_row(line);
        if row.len() == header.len() {
            rows.push(row);
        } else {
            dropped_rows += 1;
        }
    }

    if rows.is_empty() {
        return Err(FormatMiss::NoDataRows);
    }

    Ok(ParsedRows {
        header,
        rows,
        dropped_rows,
        padded_rows: 0,
    })
}

/// Longest run of consecutive table-like lines, as `(start, len)`. Titles
/// and captions around the grid fall outside the run.
fn find_table_region(counts: &[usize], options: &InferOptions) -> Option<(usize, usize)> {
    let mut best: Option<(usize, usize)> = None;
    let mut run_start = 0;
    let mut run_len = 0;
    let mut established = 0;

    let close_run = |start: usize, len: usize, best: &mut Option<(usize, usize)>| {
        if len >= options.min_region_lines && best.is_none_or(|(_, best_len)| len > best_len) {
            *best = Some((start, len));
        }
    };

    for (index, &count) in counts.iter().enumerate() {
        if count < 2 {
            close_run(run_start, run_len, &mut best);
            run_len = 0;
            continue;
        }

        if run_len > 0 && count.abs_diff(established) <= options.max_field_jump {
            run_len += 1;
            continue;
        }

        close_run(run_start, run_len, &mut best);
        run_start = index;
        run_len = 1;
        established = count;
    }
    close_run(run_start, run_len, &mut best);

    best
}

fn parse_whitespace(text: &str, options: &InferOptions) -> Result<ParsedRows, FormatMiss> {
    let looks_aligned = non_empty_lines(text)
        .take(3)
        .any(|line| split_line_into_cells(line).len() >= 2);
    if !looks_aligned {
        return Err(FormatMiss::NotApplicable);
    }

    let split_lines = text.lines().map(split_line_into_cells).collect::<Vec<_>>();
    let counts = split_lines.iter().map(Vec::len).collect::<Vec<_>>();
    let (start, len) = find_table_region(&counts, options).ok_or(FormatMiss::NoTableRegion)?;

    let mut region = split_lines.into_iter().skip(start).take(len);
    let header = region.next().ok_or(FormatMiss::NoTableRegion)?;
    let width = header.len();

    let mut padded_rows = 0;
    let rows = region
        .map(|mut row| {
            if fit_row(&mut row, width, WHITESPACE_FILL) {
                padded_rows += 1;
            }
            row
        })
        .collect::<Vec<_>>();

    Ok(ParsedRows {
        header,
        rows,
        dropped_rows: 0,
        padded_rows,
    })
}
