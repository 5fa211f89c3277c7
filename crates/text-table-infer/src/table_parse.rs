use std::sync::LazyLock;

use regex::Regex;

static MARKDOWN_SEPARATOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*\|[\s\-:|]*\|\s*$").expect("hardcoded markdown separator regex is valid")
});

const DASH_PLACEHOLDERS: [&str; 3] = ["-", "–", "—"];
const CURRENCY_PREFIXES: [char; 5] = ['$', '₩', '€', '£', '¥'];

/// Splits on tabs and on runs of two or more whitespace characters.
pub(crate) fn split_line_into_cells(line: &str) -> Vec<String> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }

    let mut cells = Vec::new();
    let mut current = String::new();
    let mut whitespace_run = 0_usize;

    for ch in trimmed.chars() {
        if ch == '\t' {
            if !current.trim().is_empty() {
                cells.push(current.trim().to_string());
                current.clear();
            }
            whitespace_run = 0;
            continue;
        }

        if ch.is_whitespace() {
            whitespace_run += 1;
            if whitespace_run >= 2 {
                if !current.trim().is_empty() {
                    cells.push(current.trim().to_string());
                    current.clear();
                }
                continue;
            }
            current.push(' ');
            continue;
        }

        whitespace_run = 0;
        current.push(ch);
    }

    if !current.trim().is_empty() {
        cells.push(current.trim().to_string());
    }

    cells
}

pub(crate) fn is_markdown_separator(line: &str) -> bool {
    MARKDOWN_SEPARATOR_RE.is_match(line)
}

pub(crate) fn split_markdown_row(line: &str) -> Vec<String> {
    let trimmed = line.trim();
    let trimmed = trimmed.strip_prefix('|').unwrap_or(trimmed);
    let trimmed = trimmed.strip_suffix('|').unwrap_or(trimmed);
    trimmed.split('|').map(|cell| cell.trim().to_string()).collect()
}

/// Pads with `fill` or truncates to `width`. Returns true when padding was
/// needed.
pub(crate) fn fit_row(row: &mut Vec<String>, width: usize, fill: &str) -> bool {
    let padded = row.len() < width;
    row.resize(width, fill.to_string());
    padded
}

/// Removes a surrounding markdown code fence such as "```csv ... ```".
/// Drops whitespace-only lines around `text` while keeping spaces that belong
/// to the first or last line's cells.
fn trim_blank_lines(text: &str) -> &str {
    let Some(first) = text.find(|ch: char| !ch.is_whitespace()) else {
        return "";
    };
    let start = text[..first].rfind('\n').map_or(0, |newline| newline + 1);
    let last = text
        .rfind(|ch: char| !ch.is_whitespace())
        .unwrap_or(first);
    let end = text[last..]
        .find('\n')
        .map_or(text.len(), |newline| last + newline);
    text[start..end].trim_end_matches('\r')
}

pub(crate) fn strip_code_fence(text: &str) -> &str {
    let text = trim_blank_lines(text);
    let Some(rest) = text.trim_start().strip_prefix("```") else {
        return text;
    };
    let body = rest.split_once('\n').map_or("", |(_, body)| body);
    match body.trim_end().strip_suffix("```") {
        Some(inner) => trim_blank_lines(inner),
        None => trim_blank_lines(body),
    }
}

pub(crate) fn is_placeholder(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed.is_empty() || DASH_PLACEHOLDERS.contains(&trimmed)
}

/// Parses numbers as they appear in reports: "1,234", "12.5%", "$30",
/// "-4". Returns `None` for placeholders and text.
pub(crate) fn parse_number(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if is_placeholder(trimmed) {
        return None;
    }

    let unsigned = trimmed.trim_start_matches(CURRENCY_PREFIXES);
    let without_percent = unsigned.strip_suffix('%').unwrap_or(unsigned);
    let cleaned = without_percent.replace(',', "");
    if cleaned.is_empty() {
        return None;
    }

    cleaned
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|number| number.is_finite())
}

pub(crate) fn format_number(value: f64) -> String {
    if (value - value.round()).abs() < 1e-9 {
        return format!("{value:.0}");
    }

    let formatted = format!("{value:.2}");
    formatted
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}
