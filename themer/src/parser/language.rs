use crate::cursor::BlockCursor;
use crate::data::{Data, LANG_KEY, Value};
use crate::error::Result;
use crate::parser::Parser;

/// Default locale
pub const DEFAULT_LOCALE: &str = "en";

/// Renders `{lang:Key}` tags from the strings of one locale
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageParser {
    locale: String,
}

impl Default for LanguageParser {
    fn default() -> Self {
        Self::new(DEFAULT_LOCALE)
    }
}

impl LanguageParser {
    pub fn new(locale: impl Into<String>) -> Self {
        Self {
            locale: locale.into(),
        }
    }

    pub fn set_locale(&mut self, locale: impl Into<String>) {
        self.locale = locale.into();
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }
}

impl Parser for LanguageParser {
    fn preload(&self, data: &mut Data) -> Result<()> {
        data.load_lang(&self.locale)
    }

    fn render(&self, theme: &mut BlockCursor, data: &Data) -> Result<()> {
        let Some(strings) = data.get(LANG_KEY).and_then(Value::as_map) else {
            log::warn!("no language strings loaded for {}", self.locale);
            return Ok(());
        };
        for (key, value) in strings {
            if let Some(value) = value.as_text() {
                theme.render_variable(&format!("lang:{key}"), value, false);
            }
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "language"
    }
}
