//! Error handling for theme rendering
//!
//! Rendering itself never fails: a variable with no value or a block nobody renders is
//! left alone and swept up later. Errors only come from the edges, where a theme, a data
//! file, a locale or a config file is read, or where a caller hands over an invalid
//! argument. Every error names the offending path, key or tag.

use std::path::PathBuf;

use thiserror::Error;

/// Error type for theme loading and rendering failures
#[derive(Debug, Error)]
pub enum ThemerError {
    /// The theme path does not exist
    #[error("Theme file does not exist: {}", .0.display())]
    ThemeNotFound(PathBuf),

    /// The theme path exists but could not be read as text
    #[error("Theme file is invalid: {}: {source}", path.display())]
    ThemeUnreadable {
        path: PathBuf,
        source: std::io::Error,
    },

    /// No search path holds the requested data file
    #[error("Data file not found: {0}")]
    DataNotFound(String),

    /// A data file was found but could not be read or parsed
    #[error("Data file is invalid: {}: {message}", path.display())]
    DataInvalid { path: PathBuf, message: String },

    /// No locale file exists for the requested language
    #[error("Language is not supported: {0}")]
    UnsupportedLanguage(String),

    /// Data was assigned without a key
    #[error("Themer does not allow pushing data to the data context without a key")]
    MissingKey,

    /// A time/date tag outside of the known table was requested
    #[error("Invalid time/date tag: {0}")]
    InvalidTimeTag(String),

    #[error("Failed to read config file at {}: {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {}: {source}", path.display())]
    ConfigParse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl ThemerError {
    /// Creates an error for a data file that failed to parse
    pub(crate) fn invalid_data(path: impl Into<PathBuf>, err: impl std::fmt::Display) -> Self {
        Self::DataInvalid {
            path: path.into(),
            message: err.to_string(),
        }
    }
}

/// Result type for theme operations
pub type Result<T> = std::result::Result<T, ThemerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_input() {
        assert_eq!(
            ThemerError::DataNotFound("some-fake-file.yml".to_string()).to_string(),
            "Data file not found: some-fake-file.yml"
        );
        assert_eq!(
            ThemerError::UnsupportedLanguage("xx".to_string()).to_string(),
            "Language is not supported: xx"
        );
        assert_eq!(
            ThemerError::ThemeNotFound(PathBuf::from("missing.html")).to_string(),
            "Theme file does not exist: missing.html"
        );
    }
}
