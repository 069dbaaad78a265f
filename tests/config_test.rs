use guesstimate_cards::core::{BoxOrder, ConfigProvider, OutputFormat};
use guesstimate_cards::utils::validation::Validate;
use guesstimate_cards::{CardConfig, CardError};
use std::io::Write;
use tempfile::NamedTempFile;

#[test]
fn test_load_config_file() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[input]
path = "data/fragor.csv"

[template]
path = "templates/picture.png"
box_order = "top-to-bottom"

[output]
dir = "out"
format = "png"
report = ""

[font]
path = "fonts/DejaVuSans.ttf"
min_size = 8
color = [20, 20, 20]

[regions.category]
lower = [140, 160, 180]
upper = [170, 190, 200]

[regions.question]
lower = [80, 160, 180]
upper = [100, 190, 200]
"#
    )
    .unwrap();

    let config = CardConfig::from_file(file.path()).unwrap();
    assert!(config.validate().is_ok());
    assert_eq!(config.input_path(), "data/fragor.csv");
    assert_eq!(config.box_order(), BoxOrder::TopToBottom);
    assert_eq!(config.output_format(), OutputFormat::Png);
    assert_eq!(config.report_file(), None);
    assert_eq!(config.min_font_size(), 8);
    assert_eq!(config.text_color(), [20, 20, 20]);
    assert_eq!(config.card_size_px(), None);

    let labels: Vec<_> = config.region_specs().into_iter().map(|s| s.label).collect();
    assert_eq!(labels, vec!["category", "question"]);
}

#[test]
fn test_missing_config_file_is_io_error() {
    let result = CardConfig::from_file("/nonexistent/guesstimate.toml");
    assert!(matches!(result, Err(CardError::IoError(_))));
}

#[test]
fn test_unknown_box_order_is_rejected() {
    let result = CardConfig::from_toml_str("[template]\nbox_order = \"diagonal\"\n");
    assert!(matches!(result, Err(CardError::ConfigError { .. })));
}
