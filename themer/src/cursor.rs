//! Block-scoped render contexts
//!
//! A [`BlockCursor`] holds one region of theme text twice: the text being edited and the
//! text it started from. Every render operation edits the current text in place. Nested
//! regions are rendered through child cursors created for each match; once a child is
//! done its text is spliced back over the exact region it came from.
//!
//! A [`TemplateCursor`] adds an accumulator so one block can be rendered any number of
//! times: render the variables for one row, call [`TemplateCursor::next`], repeat.
//!
//! # Examples
//!
//! ```rust
//! use themer::BlockCursor;
//!
//! let mut page = BlockCursor::new("<ul>{block:Items}<li>{Item}</li>{/block:Items}</ul>");
//! page.render_template("Items", |items| {
//!     for item in ["one", "two"] {
//!         items.render_variable("Item", item, true);
//!         items.next();
//!     }
//! });
//! assert_eq!(page.current(), "<ul><li>one</li><li>two</li></ul>");
//! ```

use std::fmt::Display;
use std::ops::{Deref, DerefMut};

use crate::block;
use crate::data::Map;
use crate::variable;

/// Current and original text of one block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockCursor {
    current: String,
    original: String,
}

impl BlockCursor {
    pub fn new(text: impl Into<String>) -> Self {
        let original = text.into();
        Self {
            current: original.clone(),
            original,
        }
    }

    /// The text as rendered so far
    pub fn current(&self) -> &str {
        &self.current
    }

    /// The text this cursor was created with
    pub fn original(&self) -> &str {
        &self.original
    }

    /// Overwrites the current text
    pub fn set_current(&mut self, text: impl Into<String>) {
        self.current = text.into();
    }

    /// Whether the current text still equals the original
    pub fn is_fresh(&self) -> bool {
        self.current == self.original
    }

    pub fn into_string(self) -> String {
        self.current
    }

    /// Renders one variable tag and its transforms
    pub fn render_variable(&mut self, key: &str, value: &str, transformable: bool) {
        self.current = variable::render(&self.current, key, value, transformable);
    }

    /// Renders every variable of a map, nested maps included
    pub fn render_variables(&mut self, data: &Map, transformable: bool) {
        self.current = variable::render_map(&self.current, data, transformable);
    }

    /// Unwraps every region of the named block, keeping its contents
    pub fn render_block(&mut self, tag: &str) {
        self.current = block::render(&self.current, tag);
    }

    /// Removes every region of the named block
    pub fn remove_block(&mut self, tag: &str) {
        self.current = block::remove(&self.current, tag);
    }

    /// Keeps the `If<Tag>` or `IfNot<Tag>` branch depending on `condition`
    pub fn render_if(&mut self, tag: &str, condition: bool) {
        self.current = block::render_if(&self.current, tag, condition);
    }

    /// Replaces every region of the named block with `render(body)`, left to right
    fn splice_blocks<F>(&mut self, tag: &str, mut render: F)
    where
        F: FnMut(&str) -> String,
    {
        let found = block::matches(&self.current, tag);
        if found.is_empty() {
            log::trace!("no {{block:{tag}}} in cursor");
            return;
        }
        let rendered = block::splice(&self.current, &found, |m| render(m.body));
        self.current = rendered;
    }

    /// Renders each region of the named block through a child cursor.
    ///
    /// The callback receives a cursor over the unwrapped body of one region; whatever it
    /// leaves in that cursor replaces the region.
    pub fn render_block_with<F>(&mut self, tag: &str, mut callback: F)
    where
        F: FnMut(&mut BlockCursor),
    {
        self.splice_blocks(tag, |body| {
            let mut child = BlockCursor::new(body);
            callback(&mut child);
            child.into_string()
        });
    }

    /// Repeats each region of the named block once per row.
    ///
    /// Every copy starts from the unwrapped body and gets one row's variables; the copies
    /// are joined in row order with nothing in between.
    pub fn render_each<'a, I>(&mut self, tag: &str, rows: I)
    where
        I: IntoIterator<Item = &'a Map>,
    {
        let rows: Vec<&Map> = rows.into_iter().collect();
        self.splice_blocks(tag, |body| {
            rows.iter()
                .map(|row| variable::render_map(body, row, true))
                .collect()
        });
    }

    /// Renders each region of the named block through a template cursor.
    ///
    /// The callback drives the iterations; the region is replaced by everything it
    /// committed with [`TemplateCursor::next`].
    pub fn render_template<F>(&mut self, tag: &str, mut callback: F)
    where
        F: FnMut(&mut TemplateCursor),
    {
        self.splice_blocks(tag, |body| {
            let mut template = TemplateCursor::new(body);
            callback(&mut template);
            template.into_template()
        });
    }

    /// Replaces every occurrence of `old` in the current text
    pub fn replace(&mut self, old: &str, new: &str) {
        if old.is_empty() {
            return;
        }
        self.current = self.current.replace(old, new);
    }
}

impl Display for BlockCursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.current)
    }
}

/// A block cursor that accumulates one rendering per iteration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateCursor {
    cursor: BlockCursor,
    template: String,
}

impl TemplateCursor {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            cursor: BlockCursor::new(text),
            template: String::new(),
        }
    }

    /// Commits the current rendering and resets to the original text
    pub fn next(&mut self) {
        let rendered = std::mem::replace(&mut self.cursor.current, self.cursor.original.clone());
        self.template.push_str(&rendered);
    }

    /// Everything committed so far
    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn into_template(self) -> String {
        self.template
    }
}

impl Deref for TemplateCursor {
    type Target = BlockCursor;

    fn deref(&self) -> &BlockCursor {
        &self.cursor
    }
}

impl DerefMut for TemplateCursor {
    fn deref_mut(&mut self) -> &mut BlockCursor {
        &mut self.cursor
    }
}
