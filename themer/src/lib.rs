//! Block and variable tag rendering for Tumblr-style themes
//!
//! A theme is plain text with two kinds of tags:
//!
//! - blocks: `{block:Name}...{/block:Name}`, kept or dropped as a whole
//! - variables: `{Name}`, plus the `{PlaintextName}`, `{JSName}`, `{JSPlaintextName}` and
//!   `{URLEncodedName}` transforms
//!
//! Rendering is driven by [`Parser`]s registered on a [`Theme`]. Each parser edits the
//! theme through [`BlockCursor`] operations, using the shared [`Data`] context. Blocks no
//! parser claimed are stripped at the end of [`Theme::render`].
//!
//! # Example
//!
//! ```rust
//! use themer::{BlockCursor, Data, Result, Theme};
//!
//! let mut theme = Theme::from_text("{greeting}, {name}!\n{block:Extra}ignored{/block:Extra}");
//! theme
//!     .register_parser(|theme: &mut BlockCursor, _: &Data| -> Result<()> {
//!         theme.render_variable("greeting", "Hi", true);
//!         theme.render_variable("name", "Sam", true);
//!         Ok(())
//!     })
//!     .unwrap();
//! assert_eq!(theme.render().unwrap(), "Hi, Sam!\n");
//! ```
//!
//! # Module Structure
//!
//! - `block.rs`: block tag matching
//! - `variable.rs`: variable tags and their transforms
//! - `cursor.rs`: block and template cursors
//! - `theme.rs`: the root cursor and render pass
//! - `parser/`: the parser trait and the bundled language and post parsers
//! - `data.rs`: the data context
//! - `time.rs`: time/date tags
//! - `config.rs`: configuration
//! - `error.rs`: error types

pub mod block;
pub mod config;
pub mod cursor;
pub mod data;
pub mod error;
pub mod parser;
pub mod theme;
pub mod time;
pub mod variable;

pub use config::Config;
pub use cursor::{BlockCursor, TemplateCursor};
pub use data::{Data, Map, Value};
pub use error::{Result, ThemerError};
pub use parser::{LanguageParser, Parser, PostParser};
pub use theme::Theme;
pub use time::TimeTags;

pub use themer_macros::themer_directory as directory;
pub use themer_macros::themer_file as file;
pub use themer_macros::themer_str as str;
