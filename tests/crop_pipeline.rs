mod common;

use std::process::Command;
use std::sync::Arc;
use std::time::Duration;

use edu_content_core::{
    CropConfig, CropError, CropRect, CropResponse, DirectoryStore, FixedTrimAdvisor,
    JsonOcrClient, Margins, NoTrimAdvisor, OcrClientError, OcrToken, ProblemCropper, TrimAdvisor,
    TrimSuggestion,
};
use pretty_assertions::assert_eq;

use common::{
    BrokenStore, FailingAdvisor, MemoryStore, PAGE_HEIGHT, PAGE_WIDTH, SlowAdvisor, SlowOcr,
    blank_png, png_dimensions, three_problem_page, token,
};

fn cropper_with(tokens: Vec<OcrToken>, advisor: Arc<dyn TrimAdvisor>) -> ProblemCropper {
    ProblemCropper::new(
        Arc::new(JsonOcrClient::new(tokens)),
        advisor,
        Arc::new(MemoryStore::default()),
    )
}

fn bottom_trim(bottom: i32) -> TrimSuggestion {
    TrimSuggestion {
        has_partial_problems: true,
        removal_suggestion: Margins {
            bottom,
            ..Margins::default()
        },
        confidence: 0.85,
        reasoning: "next problem visible at the bottom".to_string(),
    }
}

const MIDDLE_PROBLEM: CropRect = CropRect {
    x: 70,
    y: 590,
    width: 1070,
    height: 740,
};

#[tokio::test]
async fn fully_framed_middle_problem_wins() {
    let cropper = cropper_with(three_problem_page(), Arc::new(NoTrimAdvisor));
    let page = blank_png(PAGE_WIDTH, PAGE_HEIGHT);

    let selected = cropper.crop_best(&page).await.expect("crop succeeds");

    assert_eq!(selected.problem_number, "13");
    assert_eq!(selected.rect, MIDDLE_PROBLEM);
    assert!(!selected.trimmed);
    assert_eq!(png_dimensions(&selected.png), (1070, 740));
}

#[tokio::test]
async fn target_filter_picks_requested_problem() {
    let page = blank_png(PAGE_WIDTH, PAGE_HEIGHT);

    let last = cropper_with(three_problem_page(), Arc::new(NoTrimAdvisor)).with_targets(["14"]);
    let selected = last.crop_best(&page).await.expect("crop succeeds");
    assert_eq!(selected.problem_number, "14");
    assert_eq!(
        selected.rect,
        CropRect {
            x: 70,
            y: 1340,
            width: 1070,
            height: 660
        }
    );

    let first = cropper_with(three_problem_page(), Arc::new(NoTrimAdvisor)).with_targets(["12"]);
    let selected = first.crop_best(&page).await.expect("crop succeeds");
    assert_eq!(selected.problem_number, "12");
    assert_eq!(selected.rect.y, 0);
    assert_eq!(selected.rect.height, 580);
}

#[tokio::test]
async fn empty_ocr_is_reported_as_no_problem() {
    let cropper = cropper_with(Vec::new(), Arc::new(NoTrimAdvisor));
    let page = blank_png(400, 400);

    let error = cropper.crop_best(&page).await.expect_err("no tokens");
    assert!(matches!(error, CropError::NoOcrResult));
    assert!(error.is_no_problem());

    match cropper.respond(&page).await {
        CropResponse::Failure {
            error,
            execution_time,
        } => {
            assert_eq!(error, "please upload an image with exactly one visible problem");
            assert!(execution_time.ends_with('s'));
        }
        other @ CropResponse::Success { .. } => panic!("expected failure, got {other:?}"),
    }
}

#[tokio::test]
async fn text_without_problem_numbers_has_no_anchor() {
    let tokens = vec![
        token("Find", 100, 100, 60, 20),
        token("12", 180, 100, 30, 20),
        token("x.", 220, 100, 30, 20),
    ];
    let cropper = cropper_with(tokens, Arc::new(NoTrimAdvisor));

    let error = cropper
        .crop_best(&blank_png(400, 400))
        .await
        .expect_err("no anchors");
    assert!(matches!(error, CropError::NoAnchorFound { tokens: 3 }));
    assert!(error.is_no_problem());
}

#[tokio::test]
async fn target_without_match_has_no_anchor() {
    let cropper =
        cropper_with(three_problem_page(), Arc::new(NoTrimAdvisor)).with_targets(["99"]);
    let error = cropper
        .crop_best(&blank_png(PAGE_WIDTH, PAGE_HEIGHT))
        .await
        .expect_err("target missing");
    assert!(matches!(error, CropError::NoAnchorFound { .. }));
}

#[tokio::test]
async fn undecodable_image_fails_before_ocr() {
    let cropper = ProblemCropper::new(
        Arc::new(SlowOcr(Duration::from_secs(60))),
        Arc::new(NoTrimAdvisor),
        Arc::new(MemoryStore::default()),
    );
    let error = cropper
        .crop_best(b"definitely not an image")
        .await
        .expect_err("bad bytes");
    assert!(matches!(error, CropError::ImageDecode(_)));
    assert_eq!(error.code(), "image_decode");
}

#[tokio::test]
async fn degenerate_page_has_no_valid_crop() {
    let cropper = cropper_with(vec![token("1.", 5, 5, 10, 10)], Arc::new(NoTrimAdvisor));
    let error = cropper
        .crop_best(&blank_png(40, 40))
        .await
        .expect_err("page too small");
    assert!(matches!(error, CropError::NoValidCrop));
}

#[tokio::test]
async fn slow_ocr_times_out() {
    let cropper = ProblemCropper::new(
        Arc::new(SlowOcr(Duration::from_secs(5))),
        Arc::new(NoTrimAdvisor),
        Arc::new(MemoryStore::default()),
    )
    .with_config(CropConfig {
        ocr_timeout_ms: 20,
        ..CropConfig::default()
    });

    let error = cropper
        .crop_best(&blank_png(200, 200))
        .await
        .expect_err("ocr too slow");
    assert!(matches!(
        error,
        CropError::OcrClient(OcrClientError::Timeout(20))
    ));
}

#[tokio::test]
async fn advisor_margins_trim_the_crop() {
    let cropper = cropper_with(
        three_problem_page(),
        Arc::new(FixedTrimAdvisor::new(bottom_trim(120))),
    );
    let selected = cropper
        .crop_best(&blank_png(PAGE_WIDTH, PAGE_HEIGHT))
        .await
        .expect("crop succeeds");

    assert!(selected.trimmed);
    assert_eq!(
        selected.rect,
        CropRect {
            height: 620,
            ..MIDDLE_PROBLEM
        }
    );
    assert_eq!(png_dimensions(&selected.png), (1070, 620));
}

#[tokio::test]
async fn oversized_margin_is_capped_at_a_third() {
    let cropper = cropper_with(
        three_problem_page(),
        Arc::new(FixedTrimAdvisor::new(bottom_trim(5000))),
    );
    let selected = cropper
        .crop_best(&blank_png(PAGE_WIDTH, PAGE_HEIGHT))
        .await
        .expect("crop succeeds");

    assert!(selected.trimmed);
    assert_eq!(selected.rect.height, 740 - 740 / 3);
}

#[tokio::test]
async fn advisor_failures_keep_the_untrimmed_crop() {
    let page = blank_png(PAGE_WIDTH, PAGE_HEIGHT);

    let failing = cropper_with(three_problem_page(), Arc::new(FailingAdvisor));
    let selected = failing.crop_best(&page).await.expect("crop succeeds");
    assert!(!selected.trimmed);
    assert_eq!(selected.rect, MIDDLE_PROBLEM);

    let slow = cropper_with(
        three_problem_page(),
        Arc::new(SlowAdvisor(Duration::from_secs(5), bottom_trim(120))),
    )
    .with_config(CropConfig {
        trim_timeout_ms: 20,
        ..CropConfig::default()
    });
    let selected = slow.crop_best(&page).await.expect("crop succeeds");
    assert!(!selected.trimmed);
    assert_eq!(selected.rect, MIDDLE_PROBLEM);
}

#[tokio::test]
async fn crops_stay_inside_the_page() {
    let page = blank_png(600, 800);
    for (x, y) in [(0, 0), (550, 10), (20, 780), (300, 400), (590, 790)] {
        let mut tokens = vec![token("5.", x, y, 20, 20)];
        tokens.push(token("body", x + 30, y + 30, 80, 20));
        let cropper = cropper_with(tokens, Arc::new(NoTrimAdvisor));

        match cropper.crop_best(&page).await {
            Ok(selected) => {
                let rect = selected.rect;
                assert!(rect.x + rect.width <= 600, "anchor at ({x}, {y}): {rect:?}");
                assert!(rect.y + rect.height <= 800, "anchor at ({x}, {y}): {rect:?}");
                assert!(rect.width >= 50 && rect.height >= 50);
            }
            Err(error) => assert!(matches!(error, CropError::NoValidCrop), "{error}"),
        }
    }
}

#[tokio::test]
async fn stored_crop_is_named_after_the_problem() {
    let dir = tempfile::tempdir().expect("tempdir");
    let cropper = ProblemCropper::new(
        Arc::new(JsonOcrClient::new(three_problem_page())),
        Arc::new(NoTrimAdvisor),
        Arc::new(DirectoryStore::new(dir.path())),
    );

    let output = cropper
        .detect_and_segment(&blank_png(PAGE_WIDTH, PAGE_HEIGHT))
        .await
        .expect("crop stored");

    assert_eq!(output.problem_number, "13");
    let name = std::path::Path::new(&output.file_path)
        .file_name()
        .and_then(|name| name.to_str())
        .expect("file name");
    assert!(name.starts_with("problem_13_"), "{name}");
    assert!(name.ends_with(".png"), "{name}");

    let stored = std::fs::read(&output.file_path).expect("crop written");
    assert_eq!(png_dimensions(&stored), (1070, 740));
}

#[tokio::test]
async fn store_failure_surfaces_as_error() {
    let cropper = ProblemCropper::new(
        Arc::new(JsonOcrClient::new(three_problem_page())),
        Arc::new(NoTrimAdvisor),
        Arc::new(BrokenStore),
    );
    let page = blank_png(PAGE_WIDTH, PAGE_HEIGHT);

    let error = cropper
        .detect_and_segment(&page)
        .await
        .expect_err("store is broken");
    assert_eq!(error.code(), "store");

    match cropper.respond(&page).await {
        CropResponse::Failure { error, .. } => assert!(error.contains("disk full"), "{error}"),
        other @ CropResponse::Success { .. } => panic!("expected failure, got {other:?}"),
    }
}

#[tokio::test]
async fn respond_reports_stored_path() {
    let store = Arc::new(MemoryStore::default());
    let cropper = ProblemCropper::new(
        Arc::new(JsonOcrClient::new(three_problem_page())),
        Arc::new(NoTrimAdvisor),
        store.clone(),
    );

    let response = cropper.respond(&blank_png(PAGE_WIDTH, PAGE_HEIGHT)).await;
    let CropResponse::Success {
        file_path,
        execution_time,
    } = response
    else {
        panic!("expected success");
    };
    assert!(file_path.starts_with("memory://problem_13_"));
    assert!(execution_time.ends_with('s'));

    let items = store.items.lock().expect("store lock");
    assert_eq!(items.len(), 1);
    assert_eq!(png_dimensions(&items[0].1), (1070, 740));
}

#[test]
fn cli_writes_crop_and_prints_response() {
    let dir = tempfile::tempdir().expect("tempdir");
    let image = dir.path().join("page.png");
    let ocr = dir.path().join("tokens.json");
    let out_dir = dir.path().join("crops");
    std::fs::write(&image, blank_png(PAGE_WIDTH, PAGE_HEIGHT)).expect("write page");
    std::fs::write(
        &ocr,
        serde_json::json!({ "tokens": three_problem_page() }).to_string(),
    )
    .expect("write tokens");

    let output = Command::new(env!("CARGO_BIN_EXE_crop-page"))
        .args([
            "--image",
            &image.to_string_lossy(),
            "--ocr",
            &ocr.to_string_lossy(),
            "--out-dir",
            &out_dir.to_string_lossy(),
        ])
        .output()
        .expect("CLI should run");

    assert_eq!(output.status.code(), Some(0));
    let response: CropResponse =
        serde_json::from_slice(&output.stdout).expect("stdout is a crop response");
    let CropResponse::Success { file_path, .. } = response else {
        panic!("expected success");
    };
    assert!(std::path::Path::new(&file_path).exists());
}

#[test]
fn cli_exits_with_two_when_no_problem_found() {
    let dir = tempfile::tempdir().expect("tempdir");
    let image = dir.path().join("page.png");
    let ocr = dir.path().join("tokens.json");
    std::fs::write(&image, blank_png(300, 300)).expect("write page");
    std::fs::write(&ocr, "[]").expect("write tokens");

    let status = Command::new(env!("CARGO_BIN_EXE_crop-page"))
        .args([
            "--image",
            &image.to_string_lossy(),
            "--ocr",
            &ocr.to_string_lossy(),
            "--out-dir",
            &dir.path().join("crops").to_string_lossy(),
        ])
        .output()
        .expect("CLI should run")
        .status;

    assert_eq!(status.code(), Some(2));
}
