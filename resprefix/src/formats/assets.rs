//! Web content bundled under `assets/` (HTML, CSS and JS).
//!
//! Assets are referenced by their path relative to `assets/`, so there is no
//! reference syntax to parse. Instead every known asset path is searched for
//! literally, longest first, and a match only counts when it is a whole path:
//! the byte before it and the byte after it must not continue a path.

use std::ops::Range;

use super::{Syntax, Token};
use crate::{error::Result, traits::ReferenceScanner, types::ResourceType};

fn is_path_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '/')
}

/// Accepts `logo.png`, `/logo.png`, `./logo.png` and `../../logo.png`, but
/// not `other/logo.png` or `my_logo.png`.
fn left_boundary_ok(text: &str, start: usize) -> bool {
    let mut head = &text[..start];
    while let Some(rest) = head.strip_suffix('/') {
        head = rest
            .strip_suffix("..")
            .or_else(|| rest.strip_suffix('.'))
            .unwrap_or(rest);
        if head.len() == rest.len() {
            break;
        }
    }
    head.chars().next_back().is_none_or(|c| !is_path_char(c))
}

fn right_boundary_ok(text: &str, end: usize) -> bool {
    text[end..].chars().next().is_none_or(|c| !is_path_char(c))
}

/// Scanner for asset text files, searching for a fixed set of asset paths.
#[derive(Debug, Clone, Default)]
pub struct Format {
    pub names: Vec<String>,
}

impl ReferenceScanner for Format {
    fn scan(&self, content: &str) -> Result<Vec<Token>> {
        Ok(find_references(content, self.names.iter().map(String::as_str)))
    }
}

/// Finds every whole occurrence of one of `names` in `content`.
///
/// Longer names are matched first and a matched range is never matched
/// again, so `images/logo.png` and `logo.png` cannot both claim one spot.
pub fn find_references<'a, I>(content: &str, names: I) -> Vec<Token>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut names: Vec<&str> = names.into_iter().filter(|n| !n.is_empty()).collect();
    names.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
    names.dedup();

    let mut claimed: Vec<Range<usize>> = Vec::new();
    let mut tokens = Vec::new();
    for name in names {
        let mut from = 0;
        while let Some(pos) = content[from..].find(name) {
            let start = from + pos;
            let end = start + name.len();
            from = end;

            let overlaps = claimed.iter().any(|r| start < r.end && r.start < end);
            if overlaps || !left_boundary_ok(content, start) || !right_boundary_ok(content, end) {
                continue;
            }
            claimed.push(start..end);
            tokens.push(Token {
                range: start..end,
                res_type: ResourceType::Asset,
                name: name.to_string(),
                syntax: Syntax::AssetPath,
            });
        }
    }
    tokens.sort_by_key(|t| t.range.start);
    tokens
}
