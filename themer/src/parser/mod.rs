//! Render parsers
//!
//! A parser decides what the engine renders: which blocks to keep, which variables to
//! fill, which regions to repeat. Parsers are registered on a [`Theme`](crate::Theme) and
//! run in registration order, each one editing the text the previous one left behind.
//!
//! Any `Fn(&mut BlockCursor, &Data) -> Result<()>` closure is a parser:
//!
//! ```rust
//! use themer::{BlockCursor, Data, Result, Theme};
//!
//! let mut theme = Theme::from_text("{Title}\n");
//! theme
//!     .register_parser(|theme: &mut BlockCursor, _: &Data| -> Result<()> {
//!         theme.render_variable("Title", "Hello", true);
//!         Ok(())
//!     })
//!     .unwrap();
//! assert_eq!(theme.render().unwrap(), "Hello\n");
//! ```

mod language;
mod post;

pub use language::{DEFAULT_LOCALE, LanguageParser};
pub use post::PostParser;

use crate::cursor::BlockCursor;
use crate::data::Data;
use crate::error::Result;

/// A render pass over a theme
pub trait Parser {
    /// Loads whatever data this parser needs; runs once, at registration
    fn preload(&self, _data: &mut Data) -> Result<()> {
        Ok(())
    }

    /// Renders the theme
    fn render(&self, theme: &mut BlockCursor, data: &Data) -> Result<()>;

    /// Name used in log output
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

impl<F> Parser for F
where
    F: Fn(&mut BlockCursor, &Data) -> Result<()>,
{
    fn render(&self, theme: &mut BlockCursor, data: &Data) -> Result<()> {
        self(theme, data)
    }
}
