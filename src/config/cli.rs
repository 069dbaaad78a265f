use crate::config::toml_config::CardConfig;
use crate::utils::error::Result;
use clap::Parser;
use std::path::Path;

#[derive(Debug, Clone, Parser)]
#[command(name = "guesstimate-cards")]
#[command(about = "Render guesstimate quiz cards from a question table and a card template")]
pub struct CliConfig {
    /// Path to TOML configuration file; built-in defaults are used when it does not exist
    #[arg(short, long, default_value = "guesstimate.toml")]
    pub config: String,

    /// Override the question table path
    #[arg(long)]
    pub input: Option<String>,

    /// Override the card template path
    #[arg(long)]
    pub template: Option<String>,

    /// Override the output directory
    #[arg(short, long)]
    pub output: Option<String>,

    /// Override the TrueType font path
    #[arg(long)]
    pub font: Option<String>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,

    /// Print the computed intervals for every question without rendering
    #[arg(long)]
    pub dry_run: bool,

    /// Print the regions detected on the template and exit
    #[arg(long)]
    pub inspect_template: bool,
}

impl CliConfig {
    /// Loads the configuration file (if present) and applies command-line overrides.
    pub fn resolve(&self) -> Result<CardConfig> {
        let mut config = if Path::new(&self.config).exists() {
            tracing::info!("📁 Loading configuration from: {}", self.config);
            CardConfig::from_file(&self.config)?
        } else {
            tracing::debug!("No configuration file at {}, using defaults", self.config);
            CardConfig::default()
        };

        if let Some(input) = &self.input {
            config.input.path = input.clone();
        }
        if let Some(template) = &self.template {
            config.template.path = template.clone();
        }
        if let Some(output) = &self.output {
            config.output.dir = output.clone();
        }
        if let Some(font) = &self.font {
            config.font.path = font.clone();
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_overrides_win_over_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[input]\npath = \"from_file.csv\"\n\n[output]\ndir = \"file_out\""
        )
        .unwrap();

        let cli = CliConfig::parse_from([
            "guesstimate-cards",
            "--config",
            file.path().to_str().unwrap(),
            "--output",
            "cli_out",
        ]);
        let config = cli.resolve().unwrap();

        assert_eq!(config.input.path, "from_file.csv");
        assert_eq!(config.output.dir, "cli_out");
    }

    #[test]
    fn test_missing_config_file_falls_back_to_defaults() {
        let cli = CliConfig::parse_from([
            "guesstimate-cards",
            "--config",
            "/nonexistent/guesstimate.toml",
            "--template",
            "blank.png",
            "--dry-run",
        ]);
        let config = cli.resolve().unwrap();

        assert!(cli.dry_run);
        assert_eq!(config.template.path, "blank.png");
        assert_eq!(config.input.path, CardConfig::default().input.path);
    }
}
