use thiserror::Error;

#[derive(Error, Debug)]
pub enum CardError {
    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Image error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Template '{path}' could not be loaded: {message}")]
    TemplateLoadError { path: String, message: String },

    #[error("Font error: {message}")]
    FontError { message: String },

    #[error("Render error: {message}")]
    RenderError { message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration value: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Input,
    Template,
    Font,
    Render,
    Output,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl CardError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            CardError::CsvError(_) => ErrorCategory::Input,
            CardError::IoError(_) | CardError::SerializationError(_) => ErrorCategory::Output,
            CardError::ImageError(_) | CardError::RenderError { .. } => ErrorCategory::Render,
            CardError::TemplateLoadError { .. } => ErrorCategory::Template,
            CardError::FontError { .. } => ErrorCategory::Font,
            CardError::ConfigError { .. }
            | CardError::MissingConfigError { .. }
            | CardError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            CardError::CsvError(_) => ErrorSeverity::Low,
            CardError::IoError(_) | CardError::SerializationError(_) => ErrorSeverity::Medium,
            CardError::ImageError(_) | CardError::RenderError { .. } => ErrorSeverity::High,
            CardError::ConfigError { .. }
            | CardError::MissingConfigError { .. }
            | CardError::InvalidConfigValueError { .. } => ErrorSeverity::High,
            CardError::TemplateLoadError { .. } | CardError::FontError { .. } => {
                ErrorSeverity::Critical
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            CardError::CsvError(e) => format!("The question file could not be parsed: {}", e),
            CardError::IoError(e) => format!("A file could not be read or written: {}", e),
            CardError::ImageError(e) => format!("An image could not be processed: {}", e),
            CardError::SerializationError(e) => format!("The run report could not be written: {}", e),
            CardError::TemplateLoadError { path, .. } => {
                format!("The card template '{}' could not be loaded", path)
            }
            CardError::FontError { message } => format!("The font could not be used: {}", message),
            CardError::RenderError { message } => format!("A card could not be rendered: {}", message),
            CardError::ConfigError { message } => format!("Invalid configuration: {}", message),
            CardError::MissingConfigError { field } => {
                format!("The configuration value '{}' is required", field)
            }
            CardError::InvalidConfigValueError {
                field,
                value,
                reason,
            } => format!("'{}' is not a valid value for {}: {}", value, field, reason),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Configuration => "Check the TOML file and command line arguments",
            ErrorCategory::Input => "Check that the question file is UTF-8 CSV with a header row",
            ErrorCategory::Template => "Check the template path and that the file is a PNG or JPEG image",
            ErrorCategory::Font => "Point font.path (or --font) at a readable .ttf/.otf file",
            ErrorCategory::Render => "Check the template dimensions and the configured card size",
            ErrorCategory::Output => "Check that the output directory exists and is writable",
        }
    }
}

pub type Result<T> = std::result::Result<T, CardError>;
