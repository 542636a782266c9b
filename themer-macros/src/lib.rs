//! Compile-time theme embedding for `themer`
//!
//! Each macro expands to one module per theme holding the theme text, the names of the
//! blocks, variables and language strings it uses, and a `theme()` constructor.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use proc_macro::TokenStream;
use proc_macro2::Span;
use quote::quote;
use regex::Regex;
use syn::{LitStr, Token, parse::Parse, parse::ParseStream, parse_macro_input};
use walkdir::WalkDir;

/// File extensions treated as themes by `themer_directory!`
const THEME_EXTENSIONS: &[&str] = &["html", "htm", "tpl", "txt"];

static BLOCK_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{block:([A-Za-z][A-Za-z0-9]*)\}").unwrap_or_else(|_| unreachable!())
});

static VARIABLE_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{([A-Za-z][A-Za-z0-9\-]*)\}").unwrap_or_else(|_| unreachable!())
});

static LANG_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{lang:([^{}]+)\}").unwrap_or_else(|_| unreachable!()));

fn to_snake_case(s: &str) -> String {
    let mut result = String::new();
    for (i, c) in s.chars().enumerate() {
        if c.is_uppercase() {
            if i > 0 && !result.ends_with('_') {
                result.push('_');
            }
            for lc in c.to_lowercase() {
                result.push(lc);
            }
        } else if c.is_alphanumeric() {
            result.push(c);
        } else if !result.ends_with('_') {
            result.push('_');
        }
    }
    if result.starts_with(|c: char| c.is_ascii_digit()) {
        result.insert_str(0, "theme_");
    }
    result
}

/// Distinct, sorted first capture of every match
fn collect_names(re: &Regex, content: &str) -> Vec<String> {
    re.captures_iter(content)
        .map(|caps| caps[1].to_string())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

fn generate_code_for_content(
    name: &str,
    content: &str,
    path_for_include: Option<&str>,
    span: Span,
) -> syn::Result<proc_macro2::TokenStream> {
    let module_name_str = to_snake_case(name);
    let module_name = syn::parse_str::<syn::Ident>(&module_name_str)
        .map_err(|_| syn::Error::new(span, format!("`{name}` cannot be used as a module name")))?;

    let blocks = collect_names(&BLOCK_TAG, content);
    let variables = collect_names(&VARIABLE_TAG, content);
    let lang = collect_names(&LANG_TAG, content);

    // include_str! keeps the file tracked, so edits to it trigger a recompilation
    let text = match path_for_include {
        Some(path_str) => quote! { include_str!(#path_str) },
        None => quote! { #content },
    };

    Ok(quote! {
        pub mod #module_name {
            /// The theme text
            pub const TEXT: &str = #text;
            /// Block names used by the theme
            pub const BLOCKS: &[&str] = &[#(#blocks),*];
            /// Variable tag names used by the theme
            pub const VARIABLES: &[&str] = &[#(#variables),*];
            /// Language string keys used by the theme
            pub const LANG: &[&str] = &[#(#lang),*];

            pub fn theme() -> ::themer::Theme {
                ::themer::Theme::from_text(TEXT)
            }
        }
    })
}

fn generate_code_for_file(path: &Path, span: Span) -> syn::Result<proc_macro2::TokenStream> {
    let file_stem = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    let path_str = path.to_string_lossy();
    let content = fs::read_to_string(path)
        .map_err(|err| syn::Error::new(span, format!("Failed to read {path_str}: {err}")))?;
    generate_code_for_content(&file_stem, &content, Some(&path_str), span)
}

fn manifest_path(lit: &LitStr) -> syn::Result<std::path::PathBuf> {
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR")
        .map_err(|_| syn::Error::new(lit.span(), "CARGO_MANIFEST_DIR not set"))?;
    Ok(Path::new(&manifest_dir).join(lit.value()))
}

fn is_theme_file(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .is_some_and(|ext| THEME_EXTENSIONS.iter().any(|t| ext == *t))
}

struct StrInput {
    name: LitStr,
    content: LitStr,
}

impl Parse for StrInput {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let name: LitStr = input.parse()?;
        input.parse::<Token![,]>()?;
        let content: LitStr = input.parse()?;
        Ok(StrInput { name, content })
    }
}

#[proc_macro]
pub fn themer_directory(input: TokenStream) -> TokenStream {
    let dir_lit = parse_macro_input!(input as LitStr);
    let expanded = (|| -> syn::Result<proc_macro2::TokenStream> {
        let root_path = manifest_path(&dir_lit)?;
        if !root_path.is_dir() {
            return Err(syn::Error::new(
                dir_lit.span(),
                format!("Directory not found: {:?}", root_path),
            ));
        }

        let mut paths: Vec<_> = WalkDir::new(&root_path)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.into_path())
            .filter(|path| is_theme_file(path))
            .collect();
        paths.sort();

        let modules = paths
            .iter()
            .map(|path| generate_code_for_file(path, dir_lit.span()))
            .collect::<syn::Result<Vec<_>>>()?;
        Ok(quote! { #(#modules)* })
    })();

    expanded.unwrap_or_else(|err| err.to_compile_error()).into()
}

#[proc_macro]
pub fn themer_file(input: TokenStream) -> TokenStream {
    let file_lit = parse_macro_input!(input as LitStr);
    let expanded = manifest_path(&file_lit).and_then(|path| {
        if !path.is_file() {
            return Err(syn::Error::new(
                file_lit.span(),
                format!("File not found: {:?}", path),
            ));
        }
        generate_code_for_file(&path, file_lit.span())
    });

    expanded.unwrap_or_else(|err| err.to_compile_error()).into()
}

#[proc_macro]
pub fn themer_str(input: TokenStream) -> TokenStream {
    let StrInput { name, content } = parse_macro_input!(input as StrInput);
    generate_code_for_content(&name.value(), &content.value(), None, name.span())
        .unwrap_or_else(|err| err.to_compile_error())
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn module_names() {
        assert_eq!(to_snake_case("index"), "index");
        assert_eq!(to_snake_case("PostList"), "post_list");
        assert_eq!(to_snake_case("post-list"), "post_list");
        assert_eq!(to_snake_case("404"), "theme_404");
    }

    #[test]
    fn collects_distinct_sorted_names() {
        let content = "{block:Posts}{Title}{block:posts}{/block:posts}{Body}{Title}{lang:About}{/block:Posts}";
        assert_eq!(collect_names(&BLOCK_TAG, content), vec!["Posts", "posts"]);
        assert_eq!(collect_names(&VARIABLE_TAG, content), vec!["Body", "Title"]);
        assert_eq!(collect_names(&LANG_TAG, content), vec!["About"]);
    }
}
