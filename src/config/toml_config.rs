use crate::adapters::raster::cm_to_pixels;
use crate::core::{BoxOrder, ColorRange, ConfigProvider, OutputFormat, Paddings, RegionSpec};
use crate::core::text_fit::FONT_SIZE_FLOOR;
use crate::utils::error::{CardError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CardConfig {
    pub input: InputConfig,
    pub template: TemplateConfig,
    pub output: OutputConfig,
    pub font: FontConfig,
    pub layout: LayoutConfig,
    pub regions: BTreeMap<String, ColorRange>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    pub path: String,
    pub delimiter: char,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateConfig {
    pub path: String,
    pub box_order: BoxOrder,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: String,
    pub format: String,
    /// Physical card size `[width, height]` in centimetres; cards keep the
    /// template size when unset.
    pub card_size_cm: Option<[f64; 2]>,
    pub dpi: u32,
    pub report: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontConfig {
    pub path: String,
    pub min_size: u32,
    pub color: [u8; 3],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub category_padding: i32,
    pub question_padding: i32,
    pub interval_padding: i32,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            path: "fragor.csv".to_string(),
            delimiter: ',',
        }
    }
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            path: "picture.png".to_string(),
            box_order: BoxOrder::default(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: "./cards".to_string(),
            format: "png".to_string(),
            card_size_cm: None,
            dpi: 300,
            report: Some("cards.json".to_string()),
        }
    }
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            path: "arial.ttf".to_string(),
            min_size: FONT_SIZE_FLOOR,
            color: [0, 0, 0],
        }
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        let paddings = Paddings::default();
        Self {
            category_padding: paddings.category,
            question_padding: paddings.question,
            interval_padding: paddings.interval,
        }
    }
}

/// Reference colours of the stock card template.
pub fn default_regions() -> BTreeMap<String, ColorRange> {
    [
        ("6", ColorRange::new([150, 200, 130], [180, 255, 160])),
        ("2", ColorRange::new([220, 110, 100], [255, 150, 130])),
        ("3", ColorRange::new([240, 180, 130], [255, 210, 150])),
        ("4", ColorRange::new([240, 230, 140], [255, 255, 170])),
        ("category", ColorRange::new([140, 160, 180], [170, 190, 200])),
        ("question", ColorRange::new([80, 160, 180], [100, 190, 200])),
    ]
    .into_iter()
    .map(|(label, range)| (label.to_string(), range))
    .collect()
}

impl Default for CardConfig {
    fn default() -> Self {
        Self {
            input: InputConfig::default(),
            template: TemplateConfig::default(),
            output: OutputConfig::default(),
            font: FontConfig::default(),
            layout: LayoutConfig::default(),
            regions: default_regions(),
        }
    }
}

impl CardConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(CardError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| CardError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unknown variables are left as written.
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| CardError::ConfigError {
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    fn parsed_format(&self) -> Result<OutputFormat> {
        match self.output.format.to_ascii_lowercase().as_str() {
            "png" => Ok(OutputFormat::Png),
            "jpg" | "jpeg" => Ok(OutputFormat::Jpeg),
            other => Err(CardError::InvalidConfigValueError {
                field: "output.format".to_string(),
                value: other.to_string(),
                reason: "Supported formats: png, jpeg".to_string(),
            }),
        }
    }
}

impl Validate for CardConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_path("input.path", &self.input.path)?;
        if !self.input.delimiter.is_ascii() {
            return Err(CardError::InvalidConfigValueError {
                field: "input.delimiter".to_string(),
                value: self.input.delimiter.to_string(),
                reason: "Delimiter must be a single ASCII character".to_string(),
            });
        }

        validation::validate_path("template.path", &self.template.path)?;
        validation::validate_file_extension(
            "template.path",
            &self.template.path,
            &["png", "jpg", "jpeg"],
        )?;

        validation::validate_path("output.dir", &self.output.dir)?;
        self.parsed_format()?;
        validation::validate_range("output.dpi", self.output.dpi, 1, 2400)?;
        if let Some([width, height]) = self.output.card_size_cm {
            validation::validate_range("output.card_size_cm[0]", width, 0.1, 100.0)?;
            validation::validate_range("output.card_size_cm[1]", height, 0.1, 100.0)?;
        }

        validation::validate_path("font.path", &self.font.path)?;
        validation::validate_file_extension("font.path", &self.font.path, &["ttf", "otf"])?;
        validation::validate_range("font.min_size", self.font.min_size, 1, 200)?;

        for (name, value) in [
            ("layout.category_padding", self.layout.category_padding),
            ("layout.question_padding", self.layout.question_padding),
            ("layout.interval_padding", self.layout.interval_padding),
        ] {
            validation::validate_range(name, value, 0, 1000)?;
        }

        if self.regions.is_empty() {
            return Err(CardError::MissingConfigError {
                field: "regions".to_string(),
            });
        }
        for (label, range) in &self.regions {
            validation::validate_color_range(&format!("regions.{}", label), range)?;
        }
        Ok(())
    }
}

impl ConfigProvider for CardConfig {
    fn input_path(&self) -> &str {
        &self.input.path
    }

    fn input_delimiter(&self) -> u8 {
        // validated as ASCII
        self.input.delimiter as u8
    }

    fn template_path(&self) -> &str {
        &self.template.path
    }

    fn output_dir(&self) -> &str {
        &self.output.dir
    }

    fn output_format(&self) -> OutputFormat {
        self.parsed_format().unwrap_or_default()
    }

    fn card_size_px(&self) -> Option<(u32, u32)> {
        self.output
            .card_size_cm
            .map(|[width, height]| cm_to_pixels(width, height, self.output.dpi))
    }

    fn report_file(&self) -> Option<&str> {
        self.output.report.as_deref().filter(|name| !name.is_empty())
    }

    fn region_specs(&self) -> Vec<RegionSpec> {
        self.regions
            .iter()
            .map(|(label, range)| RegionSpec {
                label: label.clone(),
                range: *range,
            })
            .collect()
    }

    fn box_order(&self) -> BoxOrder {
        self.template.box_order
    }

    fn paddings(&self) -> Paddings {
        Paddings {
            category: self.layout.category_padding,
            question: self.layout.question_padding,
            interval: self.layout.interval_padding,
        }
    }

    fn text_color(&self) -> [u8; 3] {
        self.font.color
    }

    fn min_font_size(&self) -> u32 {
        self.font.min_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = CardConfig::from_toml_str("").unwrap();
        assert_eq!(config, CardConfig::default());
        assert!(config.validate().is_ok());
        assert_eq!(config.regions.len(), 6);
        assert_eq!(config.paddings(), Paddings::default());
        assert_eq!(config.report_file(), Some("cards.json"));
    }

    #[test]
    fn test_partial_document_overrides_fields() {
        let config = CardConfig::from_toml_str(
            r#"
[input]
path = "questions.csv"
delimiter = ";"

[template]
path = "blank.png"
box_order = "bottom-to-top"

[output]
dir = "out"
format = "jpeg"
card_size_cm = [8.9, 5.7]

[layout]
question_padding = 14

[regions.question]
lower = [80, 160, 180]
upper = [100, 190, 200]
"#,
        )
        .unwrap();

        assert_eq!(config.input_delimiter(), b';');
        assert_eq!(config.box_order(), BoxOrder::BottomToTop);
        assert_eq!(config.output_format(), OutputFormat::Jpeg);
        assert_eq!(config.card_size_px(), Some((1051, 673)));
        assert_eq!(config.paddings().question, 14);
        assert_eq!(config.paddings().category, 3);
        // an explicit regions table replaces the stock one
        assert_eq!(config.region_specs().len(), 1);
        assert_eq!(config.min_font_size(), FONT_SIZE_FLOOR);
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("GUESSTIMATE_TEST_TEMPLATE", "from_env.png");
        let config = CardConfig::from_toml_str(
            r#"
[template]
path = "${GUESSTIMATE_TEST_TEMPLATE}"
"#,
        )
        .unwrap();
        assert_eq!(config.template_path(), "from_env.png");
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = CardConfig::default();
        config.output.format = "gif".to_string();
        assert!(config.validate().is_err());

        let mut config = CardConfig::default();
        config.font.path = "font.woff".to_string();
        assert!(config.validate().is_err());

        let mut config = CardConfig::default();
        config.regions.insert(
            "6".to_string(),
            ColorRange::new([200, 0, 0], [100, 255, 255]),
        );
        assert!(config.validate().is_err());

        let mut config = CardConfig::default();
        config.regions.clear();
        assert!(matches!(
            config.validate(),
            Err(CardError::MissingConfigError { .. })
        ));
    }

    #[test]
    fn test_malformed_toml_is_config_error() {
        assert!(matches!(
            CardConfig::from_toml_str("[input\npath ="),
            Err(CardError::ConfigError { .. })
        ));
    }
}
