//! Variable tag rendering
//!
//! A variable tag is a single placeholder replaced by a value. Besides the bare form,
//! four transform prefixes render the same value in another representation:
//!
//! | Tag                 | Output                                   |
//! |---------------------|------------------------------------------|
//! | `{Name}`            | the value as-is                          |
//! | `{PlaintextName}`   | HTML-escaped value                       |
//! | `{JSName}`          | JSON string literal                      |
//! | `{JSPlaintextName}` | HTML-escaped, then JSON string literal   |
//! | `{URLEncodedName}`  | form-encoded value (space becomes `+`)   |
//!
//! The bare form is matched case-sensitively, the prefixed forms without regard to case.
//! A tag with no value is simply left in place.

use std::sync::LazyLock;

use regex::{NoExpand, Regex};

use crate::data::{Map, Value};

/// Pattern for any variable tag
pub const MATCHER: &str = r"\{([A-Za-z][A-Za-z0-9\-]*)\}";

static ANY_VARIABLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(MATCHER).unwrap_or_else(|_| unreachable!()));

/// Replaces every `{<prefix><name>}` tag, ignoring case
fn replace_prefixed(text: &str, prefix: &str, name: &str, replacement: &str) -> String {
    let pattern = format!(r"(?i)\{{{}{}\}}", regex::escape(prefix), regex::escape(name));
    match Regex::new(&pattern) {
        Ok(re) => re.replace_all(text, NoExpand(replacement)).into_owned(),
        Err(err) => {
            log::warn!("skipping {{{prefix}{name}}}: {err}");
            text.to_string()
        }
    }
}

/// HTML-escapes `&`, `"`, `<` and `>`
pub fn escape_html(value: &str) -> String {
    html_escape::encode_double_quoted_attribute(value).into_owned()
}

/// Encodes a value as a JSON string literal, quotes included
pub fn encode_json(value: &str) -> String {
    serde_json::Value::from(value).to_string()
}

/// Form-encodes a value, with spaces as `+`.
///
/// Only ASCII letters, digits, `-`, `_` and `.` pass through unencoded.
pub fn encode_url(value: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(value.as_bytes()).collect();
    encoded.replace('*', "%2A")
}

/// Replaces `{name}` with the value
pub fn render_simple(text: &str, name: &str, value: &str) -> String {
    text.replace(&format!("{{{name}}}"), value)
}

/// Replaces `{Plaintextname}` with the HTML-escaped value
pub fn render_plaintext(text: &str, name: &str, value: &str) -> String {
    replace_prefixed(text, "Plaintext", name, &escape_html(value))
}

/// Replaces `{JSname}` with the value as a JSON string
pub fn render_js(text: &str, name: &str, value: &str) -> String {
    replace_prefixed(text, "JS", name, &encode_json(value))
}

/// Replaces `{JSPlaintextname}` with the HTML-escaped value as a JSON string
pub fn render_js_plaintext(text: &str, name: &str, value: &str) -> String {
    replace_prefixed(text, "JSPlaintext", name, &encode_json(&escape_html(value)))
}

/// Replaces `{URLEncodedname}` with the form-encoded value
pub fn render_url_encoded(text: &str, name: &str, value: &str) -> String {
    replace_prefixed(text, "URLEncoded", name, &encode_url(value))
}

/// Renders a variable.
///
/// The bare tag is always replaced. When `transformable` is set, the Plaintext, JS,
/// JSPlaintext and URLEncoded forms follow, in that order.
pub fn render(text: &str, name: &str, value: &str, transformable: bool) -> String {
    let mut text = render_simple(text, name, value);
    if transformable {
        text = render_plaintext(&text, name, value);
        text = render_js(&text, name, value);
        text = render_js_plaintext(&text, name, value);
        text = render_url_encoded(&text, name, value);
    }
    text
}

/// Renders every entry of a map, in map order.
///
/// Nested maps are flattened onto the same text: their keys are tag names of their own,
/// not prefixed with the parent key. Lists are not variables and are skipped.
pub fn render_map(text: &str, data: &Map, transformable: bool) -> String {
    let mut text = text.to_string();
    for (key, value) in data {
        match value {
            Value::Text(value) => text = render(&text, key, value, transformable),
            Value::Map(nested) => text = render_map(&text, nested, transformable),
            Value::List(_) => (),
        }
    }
    text
}

/// Returns the names of the variable tags left in `text`, in order of appearance
pub fn tags(text: &str) -> Vec<&str> {
    ANY_VARIABLE
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
        .collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[test]
    fn renders_variables() {
        assert_eq!(render("{variable}", "variable", "Hello World!", true), "Hello World!");
        assert_eq!(render_simple("{v}", "v", "hi"), "hi");
    }

    #[test]
    fn bare_tags_are_case_sensitive() {
        assert_eq!(render_simple("{V}", "v", "hi"), "{V}");
    }

    #[rstest]
    #[case("<b>", "&lt;b&gt;")]
    #[case("© \"Braden & Schaeffer &copy;", "© &quot;Braden &amp; Schaeffer &amp;copy;")]
    fn renders_plaintext_tags(#[case] value: &str, #[case] expected: &str) {
        assert_eq!(render_plaintext("{Plaintextv}", "v", value), expected);
    }

    #[rstest]
    #[case("a\"b", r#""a\"b""#)]
    #[case("{Hello World!}", r#""{Hello World!}""#)]
    #[case("line\nbreak", r#""line\nbreak""#)]
    fn renders_js_tags(#[case] value: &str, #[case] expected: &str) {
        assert_eq!(render_js("{JSv}", "v", value), expected);
    }

    #[test]
    fn renders_js_plaintext_tags() {
        assert_eq!(
            render_js_plaintext("{JSPlaintextv}", "v", "<a href=\"x\">"),
            r#""&lt;a href=&quot;x&quot;&gt;""#
        );
    }

    #[test]
    fn renders_url_encoded_tags() {
        assert_eq!(
            render_url_encoded("{URLEncodedv}", "v", "a b&c/d"),
            "a+b%26c%2Fd"
        );
    }

    #[rstest]
    #[case("a*b", "a%2Ab")]
    #[case("*", "%2A")]
    #[case("-_.~", "-_.%7E")]
    #[case("é", "%C3%A9")]
    fn url_encodes_everything_but_unreserved_characters(#[case] value: &str, #[case] expected: &str) {
        assert_eq!(encode_url(value), expected);
    }

    #[test]
    fn transform_prefixes_ignore_case() {
        assert_eq!(render("{JSVariable}|{plaintextvariable}", "variable", "x", true), "\"x\"|x");
    }

    #[test]
    fn renders_multiple_variable_occurrences() {
        let value = r#"& Themer renders <themes> "quickly" 100%!}"#;
        let text = "-{variable}-{Plaintextvariable}-{JSVariable}-{JSPlaintextvariable}-{URLEncodedvariable}";
        let rendered = render(text, "variable", value, true);
        let expected = [
            value.to_string(),
            escape_html(value),
            encode_json(value),
            encode_json(&escape_html(value)),
            encode_url(value),
        ];
        assert_eq!(rendered, format!("-{}", expected.join("-")));
    }

    #[test]
    fn does_not_transform_non_transformable_variables() {
        let text = "{variable}\n{Plaintextvariable}\n{JSVariable}\n{JSPlaintextvariable}\n{URLEncodedvariable}";
        let expected = "Themer\n{Plaintextvariable}\n{JSVariable}\n{JSPlaintextvariable}\n{URLEncodedvariable}";
        assert_eq!(render(text, "variable", "Themer", false), expected);
    }

    #[test]
    fn replacement_text_is_not_expanded() {
        assert_eq!(render("{JSv}", "v", "$1 ${0}", true), r#""$1 ${0}""#);
    }

    #[test]
    fn missing_values_leave_tags_and_empty_values_render_empty() {
        assert_eq!(render("{a}{b}", "a", "", true), "{b}");
    }

    #[test]
    fn renders_nested_maps_without_prefixing() {
        let mut inner = Map::new();
        inner.insert("Inner".to_string(), Value::from("i"));
        let mut data = Map::new();
        data.insert("Outer".to_string(), Value::from("o"));
        data.insert("Group".to_string(), Value::Map(inner));
        data.insert("Rows".to_string(), Value::List(vec![]));

        assert_eq!(
            render_map("{Outer}{Inner}{Group}{Rows}", &data, true),
            "oi{Group}{Rows}"
        );
    }

    #[test]
    fn lists_remaining_variable_tags() {
        assert_eq!(tags("{a} {block:B} {lang:About} {c-d}"), vec!["a", "c-d"]);
    }
}
