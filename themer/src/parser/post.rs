use chrono::Utc;

use crate::cursor::BlockCursor;
use crate::data::{Data, Map, Value};
use crate::error::Result;
use crate::parser::Parser;
use crate::time::{self, TimeTags};
use crate::variable;

/// Key of the post list in the data context
pub const POSTS_KEY: &str = "Posts";

/// Renders `{block:Posts}` once per post in the data context.
///
/// Within one post:
/// - `Post<N>` (1-based) and `Odd`/`Even` unwrap by position,
/// - the block named by `PostType` unwraps,
/// - every non-empty text field, `PostType` included, unwraps its own block and fills its
///   variable,
/// - list and map fields repeat their block once per row,
/// - `Time` fills the time/date tags when it is a formattable Unix timestamp,
/// - `Tags` unwraps `HasTags` and repeats `{block:Tags}` once per tag.
#[derive(Debug, Clone, Default)]
pub struct PostParser {
    time_tags: TimeTags,
}

impl PostParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unwraps the blocks selected by a post's position
    pub fn render_post_index(&self, block: &mut BlockCursor, index: usize) {
        block.render_block(&format!("Post{index}"));
        block.render_block(if index % 2 == 1 { "Odd" } else { "Even" });
    }

    /// Renders one post's fields
    pub fn render_post(&self, block: &mut BlockCursor, post: &Map, now: i64) {
        if let Some(post_type) = post.get("PostType").and_then(Value::as_text) {
            if !post_type.is_empty() {
                block.render_block(&type_block(post_type));
            }
        }

        for (key, value) in post {
            match (key.as_str(), value) {
                ("Tags", _) => (),
                (_, Value::List(rows)) => block.render_each(key, rows.iter().filter_map(Value::as_map)),
                (_, Value::Map(row)) => block.render_each(key, [row]),
                (_, Value::Text(text)) if !text.is_empty() => {
                    block.render_block(key);
                    block.render_variable(key, text, true);
                }
                _ => (),
            }
        }

        let timestamp = post.get("Time").and_then(Value::as_text).and_then(|t| t.parse::<i64>().ok());
        match timestamp {
            Some(timestamp) if time::is_formattable(timestamp) => {
                block.render_variables(&self.time_tags.tags(timestamp, now), true);
            }
            Some(timestamp) => log::debug!("skipping time tags for out of range timestamp {timestamp}"),
            None => (),
        }
    }

    /// Renders `{block:HasTags}` and one `{block:Tags}` copy per tag
    pub fn render_tags<'a, I>(&self, block: &mut BlockCursor, tags: I)
    where
        I: IntoIterator<Item = &'a str>,
    {
        let rows: Vec<Map> = tags.into_iter().map(tag_row).collect();
        if rows.is_empty() {
            return;
        }
        block.render_block("HasTags");
        block.render_each("Tags", &rows);
    }
}

/// Block name for a post type: `text` selects `{block:Text}`
fn type_block(post_type: &str) -> String {
    let mut chars = post_type.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Variables for one tag of a post
fn tag_row(tag: &str) -> Map {
    let safe = variable::encode_url(tag);
    let url = format!("/tagged/{safe}");
    let chrono = format!("{url}/chrono");
    Map::from([
        ("Tag".to_string(), Value::from(tag)),
        ("URLSafeTag".to_string(), Value::from(safe)),
        ("TagURL".to_string(), Value::from(url)),
        ("TagURLChrono".to_string(), Value::from(chrono)),
    ])
}

impl Parser for PostParser {
    fn render(&self, theme: &mut BlockCursor, data: &Data) -> Result<()> {
        let Some(posts) = data.get(POSTS_KEY).and_then(Value::as_list) else {
            log::debug!("no {POSTS_KEY} in data, skipping");
            return Ok(());
        };
        let now = Utc::now().timestamp();

        theme.render_template("Posts", |template| {
            for (i, post) in posts.iter().filter_map(Value::as_map).enumerate() {
                self.render_post_index(template, i + 1);
                self.render_post(template, post, now);
                let tags = post
                    .get("Tags")
                    .and_then(Value::as_list)
                    .unwrap_or_default()
                    .iter()
                    .filter_map(Value::as_text);
                self.render_tags(template, tags);
                template.next();
            }
        });
        Ok(())
    }

    fn name(&self) -> &str {
        "posts"
    }
}
