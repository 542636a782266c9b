//! The root cursor of a theme document
//!
//! A [`Theme`] owns the theme text, the [`Data`] context and the registered parsers.
//! Rendering runs every parser over the text in registration order, then strips any block
//! that no parser claimed so no `{block:...}` syntax reaches the output.

use std::fmt::{Debug, Display};
use std::fs;
use std::ops::{Deref, DerefMut};
use std::path::Path;

use crate::block;
use crate::cursor::BlockCursor;
use crate::data::Data;
use crate::error::{Result, ThemerError};
use crate::parser::Parser;
use crate::variable;

pub struct Theme {
    cursor: BlockCursor,
    data: Data,
    parsers: Vec<Box<dyn Parser>>,
}

impl Theme {
    /// Creates a theme from its text
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            cursor: BlockCursor::new(text),
            data: Data::new(),
            parsers: Vec::new(),
        }
    }

    /// Creates a theme from the contents of a file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ThemerError::ThemeNotFound(path.to_path_buf()));
        }
        let text = fs::read_to_string(path).map_err(|source| ThemerError::ThemeUnreadable {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("read theme {} ({} bytes)", path.display(), text.len());
        Ok(Self::from_text(text))
    }

    /// Replaces the data context
    pub fn with_data(mut self, data: Data) -> Self {
        self.data = data;
        self
    }

    pub fn data(&self) -> &Data {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut Data {
        &mut self.data
    }

    /// Preloads a parser's data, then queues it to render after those already registered.
    ///
    /// The same parser may be registered more than once; it then runs once per
    /// registration.
    pub fn register_parser(&mut self, parser: impl Parser + 'static) -> Result<()> {
        self.register_boxed(Box::new(parser))
    }

    /// Registers several parsers, in order
    pub fn register_parsers(&mut self, parsers: impl IntoIterator<Item = Box<dyn Parser>>) -> Result<()> {
        for parser in parsers {
            self.register_boxed(parser)?;
        }
        Ok(())
    }

    fn register_boxed(&mut self, parser: Box<dyn Parser>) -> Result<()> {
        parser.preload(&mut self.data)?;
        log::debug!("registered parser {}", parser.name());
        self.parsers.push(parser);
        Ok(())
    }

    /// Number of registrations
    pub fn parser_count(&self) -> usize {
        self.parsers.len()
    }

    /// Runs every parser, strips unclaimed blocks and returns the result.
    ///
    /// Each call renders over the text the previous successful call left behind. A
    /// failing parser leaves the theme as it was before the call.
    pub fn render(&mut self) -> Result<String> {
        let mut cursor = self.cursor.clone();
        for parser in &self.parsers {
            log::debug!("rendering with parser {}", parser.name());
            parser.render(&mut cursor, &self.data)?;
        }

        let cleaned = block::cleanup(cursor.current());
        cursor.set_current(cleaned);
        self.cursor = cursor;

        let leftover = variable::tags(self.cursor.current());
        if !leftover.is_empty() {
            log::debug!("variables left unrendered: {}", leftover.join(", "));
        }
        Ok(self.cursor.current().to_string())
    }
}

impl Deref for Theme {
    type Target = BlockCursor;

    fn deref(&self) -> &BlockCursor {
        &self.cursor
    }
}

impl DerefMut for Theme {
    fn deref_mut(&mut self) -> &mut BlockCursor {
        &mut self.cursor
    }
}

impl Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.cursor, f)
    }
}

impl Debug for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Theme")
            .field("cursor", &self.cursor)
            .field("data", &self.data)
            .field("parsers", &self.parsers.iter().map(|p| p.name()).collect::<Vec<_>>())
            .finish()
    }
}
