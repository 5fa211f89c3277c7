mod common;

use std::process::Command;

use pretty_assertions::assert_eq;
use tempfile::tempdir;
use text_table_infer::{
    Aggregation, ColumnType, Inference, InferOptions, SourceFormat, WarningCode, infer_table,
    infer_table_from_bytes,
};

fn tabular(text: &str) -> text_table_infer::InferenceReport {
    infer_table(text, &InferOptions::default())
        .into_report()
        .expect("text should be tabular")
}

#[test]
fn year_sales_csv_yields_one_mean_view() {
    let report = tabular("Year,Sales\n2020,100\n2021,150\n2022,90\n");

    assert_eq!(report.format, SourceFormat::Csv);
    assert_eq!(report.table.columns, vec!["Year", "Sales"]);
    assert_eq!(report.table.row_count(), 3);
    assert_eq!(
        report.column_types,
        vec![ColumnType::Temporal, ColumnType::Numeric]
    );

    assert_eq!(report.views.len(), 1);
    let view = &report.views[0];
    assert_eq!(view.aggregation, Some(Aggregation::Mean));
    assert_eq!(view.table.columns, vec!["Year", "Sales"]);
    assert_eq!(
        view.table.rows,
        vec![
            common::strings(&["2020", "100"]),
            common::strings(&["2021", "150"]),
            common::strings(&["2022", "90"]),
        ]
    );
}

#[test]
fn single_line_prose_is_not_tabular() {
    assert_eq!(
        infer_table("apple banana cherry", &InferOptions::default()),
        Inference::NotTabular
    );
    assert_eq!(infer_table("   ", &InferOptions::default()), Inference::NotTabular);
}

#[test]
fn markdown_separator_rows_never_reach_the_table() {
    let text = "| Subject | Score |\n| --- | --- |\n| Math | 90 |\n| --- | --- |\n| Art | 75 |\n";
    let report = tabular(text);

    assert_eq!(report.format, SourceFormat::Markdown);
    assert_eq!(report.table.columns, vec!["Subject", "Score"]);
    assert_eq!(
        report.table.rows,
        vec![
            common::strings(&["Math", "90"]),
            common::strings(&["Art", "75"]),
        ]
    );
    assert!(
        report
            .table
            .rows
            .iter()
            .flatten()
            .all(|cell| !cell.contains("---"))
    );
}

#[test]
fn well_formed_csv_round_trips() {
    let header = ["name", "city", "score", "grade"];
    let rows = vec![
        common::strings(&["Ann", "Seoul", "91", "A"]),
        common::strings(&["Bo", "Busan", "78", "C"]),
        common::strings(&["Cy", "Incheon", "", "B"]),
        common::strings(&["Di", "Daegu", "85.5", "B"]),
        common::strings(&["", "", "", ""]),
        common::strings(&[" Ed", "Ulsan ", " 70", "A "]),
    ];
    let text = common::to_csv_text(&header, &rows);

    let report = tabular(&text);
    assert_eq!(report.table.columns, header.to_vec());
    assert_eq!(report.table.rows, rows);
}

#[test]
fn every_row_matches_the_header_width() {
    let inputs = [
        "a,b,c\n1,2\n3,4,5\n",
        "| a | b |\n|---|---|\n| 1 | 2 |\n| 3 |\n| 4 | 5 |\n",
        "Name  Age  City\nAnn  30\nBob  25  Busan  extra\nCy  41  Jeju\n",
        "x\ty\tz\n1\t2\t3\n4\t5\n6\t7\t8\n",
    ];

    for text in inputs {
        let report = tabular(text);
        assert!(report.table.is_rectangular(), "ragged table from {text:?}");
        for view in &report.views {
            assert!(view.table.is_rectangular(), "ragged view from {text:?}");
        }
    }
}

#[test]
fn year_columns_stay_temporal() {
    let report = tabular("Year,Population\n1990,10\n2000,12\n2010,15\n2020,16\n");
    assert_eq!(report.column_types[0], ColumnType::Temporal);
}

#[test]
fn derived_views_have_at_least_two_rows() {
    let text = "Region,Quarter,Revenue,Units\n\
                North,1,10,3\nNorth,2,12,4\nSouth,1,7,2\nSouth,2,9,2\n\
                North,3,14,5\nSouth,3,8,3\nNorth,4,11,4\nSouth,4,6,1\n\
                North,1,10,3\nSouth,2,9,2\nNorth,2,12,4\nSouth,3,8,3\n\
                North,4,11,4\nSouth,1,7,2\n";
    let report = tabular(text);

    assert_eq!(report.column_types[1], ColumnType::Categorical);
    assert!(!report.views.is_empty());
    for view in &report.views {
        assert!(view.table.row_count() >= 2, "view {} too short", view.title);
        assert_eq!(view.aggregation, Some(Aggregation::Sum));
    }
}

#[test]
fn single_category_falls_back_to_original_table() {
    let report = tabular("Team,Score\nRed,1\nRed,2\nRed,3\n");
    assert_eq!(report.views.len(), 1);
    assert_eq!(report.views[0].aggregation, None);
    assert_eq!(report.views[0].table, report.table);
    assert!(
        report
            .warnings
            .iter()
            .any(|warning| warning.code == WarningCode::DecompositionEmpty)
    );
}

#[test]
fn fenced_llm_output_with_wrapped_header() {
    let text = "```\nProduct    Sales\nname       (units)\nPen        3\nBook       1\nRuler      4\n```";
    let report = tabular(text);

    assert_eq!(report.format, SourceFormat::Whitespace);
    assert_eq!(report.table.columns, vec!["Product name", "Sales (units)"]);
    assert_eq!(report.table.row_count(), 3);
}

#[test]
fn missing_value_in_first_row_stays_a_data_row() {
    let markdown = tabular("| Name | Score |\n| --- | --- |\n| Ann | - |\n| Bob | 80 |\n| Cy | 70 |\n");
    assert_eq!(markdown.table.columns, vec!["Name", "Score"]);
    assert_eq!(markdown.table.rows[0], common::strings(&["Ann", "-"]));
    assert_eq!(markdown.table.row_count(), 3);

    let aligned = tabular("Name   Dept    Salary\nAnn    Sales   n/a\nBob    HR      100\nCy     Ops     90\n");
    assert_eq!(aligned.format, SourceFormat::Whitespace);
    assert_eq!(aligned.table.columns, vec!["Name", "Dept", "Salary"]);
    assert_eq!(aligned.table.rows[0], common::strings(&["Ann", "Sales", "n/a"]));
    assert_eq!(aligned.table.row_count(), 3);
    assert!(
        aligned
            .warnings
            .iter()
            .all(|warning| warning.code != WarningCode::HeaderMerged)
    );
}

#[test]
fn euc_kr_bytes_are_decoded_before_sniffing() {
    let (bytes, _, had_errors) = encoding_rs::EUC_KR.encode("연도,매출\n2021,10\n2022,12\n");
    assert!(!had_errors);

    let report = infer_table_from_bytes(&bytes, &InferOptions::default())
        .into_report()
        .expect("decoded csv should be tabular");
    assert_eq!(report.table.columns, vec!["연도", "매출"]);
}

#[test]
fn cli_writes_views_for_tabular_input() {
    let dir = tempdir().expect("tempdir should be created");
    let input = dir.path().join("sales.csv");
    let output = dir.path().join("out");
    common::write_text_fixture(&input, b"Year,Sales\n2020,100\n2021,150\n")
        .expect("fixture should be written");

    let status = Command::new(env!("CARGO_BIN_EXE_text2table"))
        .args([
            "infer",
            "-i",
            &input.to_string_lossy(),
            "-o",
            &output.to_string_lossy(),
        ])
        .status()
        .expect("CLI should run");

    assert_eq!(status.code(), Some(0));
    let table = std::fs::read_to_string(output.join("table.csv")).expect("table.csv exists");
    assert_eq!(table, "Year,Sales\n2020,100\n2021,150\n");
    assert!(output.join("view_1.csv").exists());
}

#[test]
fn cli_exits_with_code_2_when_not_tabular() {
    let dir = tempdir().expect("tempdir should be created");
    let input = dir.path().join("prose.txt");
    common::write_text_fixture(&input, b"apple banana cherry")
        .expect("fixture should be written");

    let status = Command::new(env!("CARGO_BIN_EXE_text2table"))
        .args(["infer", "-i", &input.to_string_lossy()])
        .status()
        .expect("CLI should run");

    assert_eq!(status.code(), Some(2));
}
