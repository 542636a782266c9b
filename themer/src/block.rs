//! Block tag matching
//!
//! This module locates, unwraps and removes paired block regions in theme text.
//!
//! # Block Syntax
//!
//! - `{block:Name}...{/block:Name}` - a named region, kept or dropped as a whole
//!
//! Names start with a letter followed by letters and digits. Names are case-sensitive,
//! and the close tag must carry exactly the name of the open tag.
//!
//! # Matching Rules
//!
//! - Matching is lazy: the first close tag with the open tag's name ends the region, so
//!   two adjacent `{block:Foo}` regions stay two matches.
//! - Differently named blocks inside a region are opaque body text.
//! - An open tag without a close tag never matches. It stays in the text verbatim,
//!   cleanup included.
//! - Scanning resumes after the end of each match, so matches never overlap.
//!
//! # Examples
//!
//! ```rust
//! use themer::block;
//!
//! let text = "{block:Title}Hello{/block:Title}{block:Footer}Bye{/block:Footer}";
//! assert_eq!(block::render(text, "Title"), "Hello{block:Footer}Bye{/block:Footer}");
//! assert_eq!(block::cleanup(&block::render(text, "Title")), "Hello");
//! ```

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

/// Pattern for the open tag of any well-formed block
pub const MATCHER: &str = r"\{block:([A-Za-z][A-Za-z0-9]*)\}";

/// Literal prefix of every close tag
const CLOSE_PREFIX: &str = "{/block:";

static ANY_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(MATCHER).unwrap_or_else(|_| unreachable!()));

/// One matched block region within a text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockMatch<'a> {
    /// The block name as written in the open tag
    pub name: &'a str,
    /// The complete region including both tags
    pub raw: &'a str,
    /// The text between the open and close tags
    pub body: &'a str,
    /// Byte range of `raw` within the searched text
    pub span: Range<usize>,
}

/// Returns the open tag matcher for a block name.
///
/// An empty name yields the generic matcher that accepts any well-formed block. Any
/// other name is matched literally.
pub fn matcher(tag: &str) -> Regex {
    if tag.is_empty() {
        return ANY_BLOCK.clone();
    }
    Regex::new(&format!(r"\{{block:({})\}}", regex::escape(tag)))
        .unwrap_or_else(|_| unreachable!())
}

/// Finds the first close tag for `name` at or after `from`
fn find_close(text: &str, from: usize, name: &str) -> Option<Range<usize>> {
    let rest = &text[from..];
    let bytes = rest.as_bytes();
    for (pos, _) in rest.match_indices(CLOSE_PREFIX) {
        let start = pos + CLOSE_PREFIX.len();
        let end = start + name.len();
        if bytes.len() > end && bytes[end] == b'}' && &bytes[start..end] == name.as_bytes() {
            return Some(from + pos..from + end + 1);
        }
    }
    None
}

/// Matches every region of the named block, left to right
pub fn matches<'a>(text: &'a str, tag: &str) -> Vec<BlockMatch<'a>> {
    let open = matcher(tag);
    let mut found = Vec::new();
    let mut at = 0;

    while at <= text.len() {
        let Some(caps) = open.captures_at(text, at) else {
            break;
        };
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            break;
        };
        match find_close(text, whole.end(), name.as_str()) {
            Some(close) => {
                found.push(BlockMatch {
                    name: name.as_str(),
                    raw: &text[whole.start()..close.end],
                    body: &text[whole.end()..close.start],
                    span: whole.start()..close.end,
                });
                at = close.end;
            }
            // unterminated: retry just past this open tag
            None => at = whole.start() + 1,
        }
    }
    found
}

/// Rebuilds `text` with every matched region replaced by the output of `replace`
pub(crate) fn splice<'a, F>(text: &str, found: &[BlockMatch<'a>], mut replace: F) -> String
where
    F: FnMut(&BlockMatch<'a>) -> String,
{
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for m in found {
        out.push_str(&text[last..m.span.start]);
        out.push_str(&replace(m));
        last = m.span.end;
    }
    out.push_str(&text[last..]);
    out
}

/// Unwraps every region of the named block, keeping its contents
pub fn render(text: &str, tag: &str) -> String {
    let found = matches(text, tag);
    if found.is_empty() {
        log::trace!("no {{block:{tag}}} to render");
        return text.to_string();
    }
    splice(text, &found, |m| m.body.to_string())
}

/// Returns every complete region of the named block, left to right
pub fn find<'a>(text: &'a str, tag: &str) -> Vec<&'a str> {
    matches(text, tag).into_iter().map(|m| m.raw).collect()
}

/// Removes every region of the named block, tags and contents alike
pub fn remove(text: &str, tag: &str) -> String {
    let found = matches(text, tag);
    if found.is_empty() {
        return text.to_string();
    }
    splice(text, &found, |_| String::new())
}

/// Removes every remaining well-formed block region.
///
/// Passes repeat until nothing matches, so the result never contains a complete block
/// even where a removal joins the pieces of a new one.
pub fn cleanup(text: &str) -> String {
    let mut out = text.to_string();
    loop {
        let found = matches(&out, "");
        if found.is_empty() {
            return out;
        }
        log::trace!("cleaning up {} unrendered block(s)", found.len());
        out = splice(&out, &found, |_| String::new());
    }
}

/// Renders the `If<Tag>`/`IfNot<Tag>` pair, keeping one branch and dropping the other
pub fn render_if(text: &str, tag: &str, condition: bool) -> String {
    let tag = format_if_tag(tag);
    let (keep, drop) = if condition {
        (format!("If{tag}"), format!("IfNot{tag}"))
    } else {
        (format!("IfNot{tag}"), format!("If{tag}"))
    };
    render(&remove(text, &drop), &keep)
}

/// Formats a free-form label (such as a form field name) as an If block tag name
pub fn format_if_tag(tag: &str) -> String {
    tag.replace([' ', '_'], "")
}
