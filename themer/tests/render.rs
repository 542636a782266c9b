use std::cell::Cell;
use std::fs;
use std::path::Path;

use pretty_assertions::assert_eq;
use rstest::rstest;
use tempfile::TempDir;
use themer::{BlockCursor, Config, Data, LanguageParser, PostParser, Result, Theme, ThemerError};

fn create_test_file(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn end_to_end_render() {
    // Given a theme with two variables and a block nobody claims
    let mut theme = Theme::from_text("{greeting}, {name}!\n{block:Extra}ignored{/block:Extra}");

    // When a parser fills the variables
    theme
        .register_parser(|theme: &mut BlockCursor, _: &Data| -> Result<()> {
            theme.render_variable("greeting", "Hi", true);
            theme.render_variable("name", "Sam", true);
            Ok(())
        })
        .unwrap();

    // Then the unclaimed block is stripped
    assert_eq!(theme.render().unwrap(), "Hi, Sam!\n");
}

#[test]
fn theme_from_path() {
    let dir = TempDir::new().unwrap();
    let path = create_test_file(&dir, "theme.html", "{block:A}one{/block:A}\n{block:B}two{/block:B}");

    let mut theme = Theme::from_path(&path).unwrap();
    theme.render_block("A");

    assert_eq!(theme.render().unwrap(), "one\n");
}

#[test]
fn theme_from_missing_path() {
    let dir = TempDir::new().unwrap();
    let err = Theme::from_path(dir.path().join("missing.html")).unwrap_err();

    assert!(matches!(err, ThemerError::ThemeNotFound(ref path) if path.ends_with("missing.html")));
    assert!(err.to_string().contains("missing.html"));
}

#[test]
fn text_is_never_read_as_a_path() {
    let theme = Theme::from_text("Cargo.toml");
    assert_eq!(theme.current(), "Cargo.toml");
    assert!(Path::new("Cargo.toml").exists());
}

#[test]
fn repeated_renders_build_on_each_other() {
    let mut theme = Theme::from_text("a");
    theme
        .register_parser(|theme: &mut BlockCursor, _: &Data| -> Result<()> {
            theme.replace("a", "aa");
            Ok(())
        })
        .unwrap();

    assert_eq!(theme.render().unwrap(), "aa");
    assert_eq!(theme.render().unwrap(), "aaaa");
    assert_eq!(theme.original(), "a");
}

#[test]
fn identical_blocks_render_independently() {
    // Given two regions with the same text
    let mut theme = Theme::from_text("{block:N}#{/block:N} {block:N}#{/block:N}");
    let counter = Cell::new(0);

    // When each region is rendered with a different value
    theme.render_block_with("N", |block| {
        counter.set(counter.get() + 1);
        block.replace("#", &counter.get().to_string());
    });

    // Then each region keeps its own rendering
    assert_eq!(theme.current(), "1 2");
}

#[rstest]
#[case(true, "A")]
#[case(false, "B")]
fn renders_if_pairs(#[case] condition: bool, #[case] expected: &str) {
    let mut theme = Theme::from_text("{block:IfX}A{/block:IfX}{block:IfNotX}B{/block:IfNotX}");
    theme.render_if("X", condition);
    assert_eq!(theme.render().unwrap(), expected);
}

#[test]
fn renders_each_row_in_order() {
    let mut theme = Theme::from_text("[{block:Names}{Name}{/block:Names}]");
    let rows: Vec<themer::Map> = ["A", "B", "C"]
        .into_iter()
        .map(|name| themer::Map::from([("Name".to_string(), themer::Value::from(name))]))
        .collect();

    theme.render_each("Names", &rows);

    assert_eq!(theme.render().unwrap(), "[ABC]");
}

#[test]
fn renders_a_configured_site() {
    // Given a config that preloads site data from its own directory, in French
    let dir = TempDir::new().unwrap();
    create_test_file(
        &dir,
        "site/site.yml",
        "Title: Mon blog\nPosts:\n  - PostType: text\n    Title: Bonjour\n    Time: 1325379661\n    Tags: [salut]\n",
    );
    let config_path = create_test_file(
        &dir,
        "themer.toml",
        "locale = \"fr\"\ndata_paths = [\"site\"]\npreload = [\"site.yml\"]\n",
    );
    let config = Config::load_from_path(&config_path).unwrap();

    // When a theme renders with the bundled parsers
    let theme_text = "<h1>{Title}</h1><a>{lang:About}</a>\n{block:Posts}{block:Text}<h2>{Title}</h2>{/block:Text}{block:Quote}q{/block:Quote}<p>{Year}</p>{block:HasTags}{block:Tags}<a href=\"{TagURL}\">{Tag}</a>{/block:Tags}{/block:HasTags}{/block:Posts}";
    let mut theme = Theme::from_text(theme_text).with_data(config.data().unwrap());
    theme.register_parser(LanguageParser::new(config.locale.as_str())).unwrap();
    theme.register_parser(PostParser::new()).unwrap();
    theme
        .register_parser(|theme: &mut BlockCursor, data: &Data| -> Result<()> {
            theme.render_variables(data.as_map(), true);
            Ok(())
        })
        .unwrap();

    // Then everything is filled in and unclaimed blocks are gone
    assert_eq!(
        theme.render().unwrap(),
        "<h1>Mon blog</h1><a>À propos</a>\n<h2>Bonjour</h2><p>2012</p><a href=\"/tagged/salut\">salut</a>"
    );
}

#[test]
fn unsupported_locale_aborts_registration() {
    let mut theme = Theme::from_text("{lang:About}").with_data(Data::bundled());
    let err = theme.register_parser(LanguageParser::new("xx")).unwrap_err();

    assert!(matches!(err, ThemerError::UnsupportedLanguage(ref locale) if locale == "xx"));
}
