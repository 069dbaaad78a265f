mod common;

use common::{test_config, write_questions, write_template, BlockFace, QUESTIONS_CSV};
use guesstimate_cards::core::{CardField, IntervalLabel, Pipeline, SkipReason, SkippedField};
use guesstimate_cards::{CardEngine, CardError, CardPipeline, LocalStorage};
use tempfile::TempDir;

fn scratch_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    write_template(dir.path(), "template.png");
    write_questions(dir.path(), "questions.csv", QUESTIONS_CSV);
    dir
}

#[tokio::test]
async fn test_end_to_end_renders_one_card_per_row() {
    let dir = scratch_dir();
    let storage = LocalStorage::new(dir.path());

    let pipeline = CardPipeline::open(storage, test_config(), BlockFace)
        .await
        .unwrap();
    let summary = CardEngine::new(pipeline).run().await.unwrap();

    assert_eq!(summary.cards.len(), 2);
    assert_eq!(summary.skipped_field_count(), 0);
    assert_eq!(summary.cards[0].path, "cards/0.png");
    assert_eq!(summary.cards[1].path, "cards/1.png");
    assert_eq!(summary.cards[0].category, "Geografi");
    assert_eq!(
        summary.cards[0].intervals.get(IntervalLabel::Lower2),
        "2000-2299"
    );
    assert_eq!(
        summary.cards[0].intervals.get(IntervalLabel::Center6),
        "2800-2900"
    );

    for name in ["0.png", "1.png"] {
        let bytes = std::fs::read(dir.path().join("cards").join(name)).unwrap();
        let card = image::load_from_memory(&bytes).unwrap().to_rgba8();
        assert_eq!(card.dimensions(), (300, 200));
        assert_ne!(card, common::template_image());
    }

    let report: serde_json::Value = serde_json::from_slice(
        &std::fs::read(dir.path().join("cards").join("cards.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(report["cards"].as_array().unwrap().len(), 2);
    assert_eq!(report["cards"][1]["intervals"]["6"], "1436-1445");
}

#[tokio::test]
async fn test_text_is_drawn_inside_the_category_box_only() {
    let dir = scratch_dir();
    let pipeline = CardPipeline::open(LocalStorage::new(dir.path()), test_config(), BlockFace)
        .await
        .unwrap();

    let questions = pipeline.extract().await.unwrap();
    let (card, skipped) = pipeline.render(&questions[0]).unwrap();
    assert!(skipped.is_empty());

    let template = common::template_image();
    let category = common::TEMPLATE_BOXES[0].1;
    let changed: Vec<(u32, u32)> = card
        .enumerate_pixels()
        .filter(|(x, y, px)| *px != template.get_pixel(*x, *y))
        .map(|(x, y, _)| (x, y))
        .collect();
    assert!(!changed.is_empty());
    assert!(changed.iter().any(|&(x, y)| {
        (category.x..category.x + category.width).contains(&(x as i32))
            && (category.y..category.y + category.height).contains(&(y as i32))
    }));

    // the unmatched dark box never receives text
    let dark = common::TEMPLATE_BOXES[9].1;
    assert!(!changed.iter().any(|&(x, y)| {
        (dark.x..dark.x + dark.width).contains(&(x as i32))
            && (dark.y..dark.y + dark.height).contains(&(y as i32))
    }));
}

#[tokio::test]
async fn test_repeated_runs_produce_identical_cards() {
    let dir = scratch_dir();

    let mut first = test_config();
    first.output.dir = "first".to_string();
    let mut second = test_config();
    second.output.dir = "second".to_string();

    for config in [first, second] {
        let pipeline = CardPipeline::open(LocalStorage::new(dir.path()), config, BlockFace)
            .await
            .unwrap();
        CardEngine::new(pipeline).run().await.unwrap();
    }

    for name in ["0.png", "1.png"] {
        let a = std::fs::read(dir.path().join("first").join(name)).unwrap();
        let b = std::fs::read(dir.path().join("second").join(name)).unwrap();
        assert_eq!(a, b, "{} differs between runs", name);
    }
}

#[tokio::test]
async fn test_missing_input_produces_no_cards() {
    let dir = TempDir::new().unwrap();
    write_template(dir.path(), "template.png");

    let pipeline = CardPipeline::open(LocalStorage::new(dir.path()), test_config(), BlockFace)
        .await
        .unwrap();
    let summary = CardEngine::new(pipeline).run().await.unwrap();

    assert!(summary.cards.is_empty());
    // neither cards nor a report, so the output directory is never created
    assert!(!dir.path().join("cards").exists());
}

#[tokio::test]
async fn test_missing_template_is_fatal() {
    let dir = TempDir::new().unwrap();
    write_questions(dir.path(), "questions.csv", QUESTIONS_CSV);

    let result = CardPipeline::open(LocalStorage::new(dir.path()), test_config(), BlockFace).await;

    match result {
        Err(CardError::TemplateLoadError { path, .. }) => assert_eq!(path, "template.png"),
        Err(other) => panic!("unexpected error: {}", other),
        Ok(_) => panic!("expected template failure"),
    }
}

#[tokio::test]
async fn test_undecodable_template_is_fatal() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("template.png"), b"not a png").unwrap();

    let result = CardPipeline::open(LocalStorage::new(dir.path()), test_config(), BlockFace).await;
    assert!(matches!(result, Err(CardError::TemplateLoadError { .. })));
}

#[tokio::test]
async fn test_missing_region_skips_only_that_field() {
    let dir = scratch_dir();
    let mut config = test_config();
    config.regions.remove("6");

    let pipeline = CardPipeline::open(LocalStorage::new(dir.path()), config, BlockFace)
        .await
        .unwrap();
    let summary = CardEngine::new(pipeline).run().await.unwrap();

    assert_eq!(summary.cards.len(), 2);
    for card in &summary.cards {
        assert_eq!(card.skipped.len(), 1);
        assert_eq!(card.skipped[0].field, CardField::Interval(IntervalLabel::Center6));
        assert_eq!(
            card.skipped[0].reason,
            SkipReason::MissingRegion {
                label: "6".to_string(),
                index: 0
            }
        );
    }
    assert!(dir.path().join("cards").join("1.png").exists());
}

#[tokio::test]
async fn test_missing_boundary_renders_sentinel_text() {
    let dir = scratch_dir();
    write_questions(
        dir.path(),
        "questions.csv",
        "Category,Prompt,LowerBound2\nSport,How many,10\n",
    );

    let pipeline = CardPipeline::open(LocalStorage::new(dir.path()), test_config(), BlockFace)
        .await
        .unwrap();
    let summary = CardEngine::new(pipeline).run().await.unwrap();

    assert_eq!(summary.cards.len(), 1);
    assert!(summary.cards[0]
        .intervals
        .get(IntervalLabel::Center6)
        .starts_with("ERROR"));
    assert!(dir.path().join("cards").join("0.png").exists());
}

#[tokio::test]
async fn test_card_size_resizes_output() {
    let dir = scratch_dir();
    let mut config = test_config();
    config.output.card_size_cm = Some([2.54, 1.27]);
    config.output.dpi = 100;
    config.output.report = None;

    let pipeline = CardPipeline::open(LocalStorage::new(dir.path()), config, BlockFace)
        .await
        .unwrap();
    CardEngine::new(pipeline).run().await.unwrap();

    let card = image::open(dir.path().join("cards").join("0.png")).unwrap();
    assert_eq!((card.width(), card.height()), (100, 50));
    assert!(!dir.path().join("cards").join("cards.json").exists());
}

#[tokio::test]
async fn test_prompt_too_long_to_fit_is_skipped_and_card_still_written() {
    let dir = scratch_dir();
    let prompt = vec!["word"; 400].join(" ");
    write_questions(
        dir.path(),
        "questions.csv",
        &format!(
            "Category,Prompt,LowerBound2,LowerBound3\nSport,{},1,2\n",
            prompt
        ),
    );

    let pipeline = CardPipeline::open(LocalStorage::new(dir.path()), test_config(), BlockFace)
        .await
        .unwrap();
    let summary = CardEngine::new(pipeline).run().await.unwrap();

    assert_eq!(summary.cards.len(), 1);
    assert!(summary.cards[0].skipped.contains(&SkippedField {
        field: CardField::Prompt,
        reason: SkipReason::NoFit,
    }));
    // the category still fits and is not reported
    assert!(!summary.cards[0]
        .skipped
        .iter()
        .any(|skip| skip.field == CardField::Category));
    assert!(dir.path().join("cards").join("0.png").exists());
}

#[tokio::test]
async fn test_padding_larger_than_box_is_skipped() {
    let dir = scratch_dir();
    let mut config = test_config();
    // the question box is 50 px high
    config.layout.question_padding = 30;

    let pipeline = CardPipeline::open(LocalStorage::new(dir.path()), config, BlockFace)
        .await
        .unwrap();
    let summary = CardEngine::new(pipeline).run().await.unwrap();

    assert_eq!(summary.cards.len(), 2);
    for card in &summary.cards {
        assert_eq!(
            card.skipped,
            vec![SkippedField {
                field: CardField::Prompt,
                reason: SkipReason::PaddingExceedsBox,
            }]
        );
    }
    assert!(dir.path().join("cards").join("0.png").exists());
    assert!(dir.path().join("cards").join("1.png").exists());
}
