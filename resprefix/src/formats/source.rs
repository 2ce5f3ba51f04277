//! Java and Kotlin sources.
//!
//! A small lexer turns the file into identifiers, dots and "anything else",
//! skipping whitespace, comments, string literals (including Kotlin raw
//! strings) and char literals. The `${...}` expressions of Kotlin string
//! templates are lexed as code. A reference is the lexeme sequence
//! `R . <class> . <field>`, which also matches when the parts are split over
//! several lines.

use std::ops::Range;

use super::{Syntax, Token};
use crate::{error::Result, traits::ReferenceScanner, types::ResourceType};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Lexeme {
    Ident(Range<usize>),
    Dot,
    Other,
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b == b'$'
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$'
}

/// Index just past the next occurrence of `needle` at or after `from`.
fn skip_past(bytes: &[u8], from: usize, needle: &[u8]) -> usize {
    bytes
        .get(from..)
        .and_then(|rest| rest.windows(needle.len()).position(|w| w == needle))
        .map(|i| from + i + needle.len())
        .unwrap_or(bytes.len())
}

/// Index just past a literal whose opening quote is at `i - 1`.
fn skip_quoted(bytes: &[u8], mut i: usize, quote: u8) -> usize {
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'\n' => return i,
            b if b == quote => return i + 1,
            _ => i += 1,
        }
    }
    bytes.len()
}

/// What the lexer is inside of. Template code nests inside strings and
/// strings inside template code, so this is kept as a stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Code; `depth` counts open `{` of the current template expression.
    Code { depth: usize },
    /// A string literal; `raw` for `"""` strings.
    Str { raw: bool },
}

fn lex(text: &str) -> Vec<Lexeme> {
    let bytes = text.as_bytes();
    let mut lexemes = Vec::new();
    let mut modes = vec![Mode::Code { depth: 0 }];
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        let in_template = modes.len() > 1;
        let Some(mode) = modes.last_mut() else {
            break;
        };
        match *mode {
            Mode::Str { raw } => {
                if bytes[i..].starts_with(b"${") {
                    modes.push(Mode::Code { depth: 0 });
                    lexemes.push(Lexeme::Other);
                    i += 2;
                } else if raw && bytes[i..].starts_with(b"\"\"\"") {
                    modes.pop();
                    i += 3;
                } else if raw {
                    i += 1;
                } else if b == b'\\' {
                    i += 2;
                } else if b == b'"' || b == b'\n' {
                    modes.pop();
                    i += 1;
                } else {
                    i += 1;
                }
            }
            Mode::Code { ref mut depth } => {
                if b.is_ascii_whitespace() {
                    i += 1;
                } else if bytes[i..].starts_with(b"//") {
                    i = skip_past(bytes, i, b"\n");
                } else if bytes[i..].starts_with(b"/*") {
                    i = skip_past(bytes, i + 2, b"*/");
                } else if bytes[i..].starts_with(b"\"\"\"") {
                    lexemes.push(Lexeme::Other);
                    modes.push(Mode::Str { raw: true });
                    i += 3;
                } else if b == b'"' {
                    lexemes.push(Lexeme::Other);
                    modes.push(Mode::Str { raw: false });
                    i += 1;
                } else if b == b'\'' {
                    i = skip_quoted(bytes, i + 1, b);
                    lexemes.push(Lexeme::Other);
                } else if is_ident_start(b) {
                    let start = i;
                    while i < bytes.len() && is_ident_byte(bytes[i]) {
                        i += 1;
                    }
                    lexemes.push(Lexeme::Ident(start..i));
                } else if b == b'.' {
                    i += 1;
                    lexemes.push(Lexeme::Dot);
                } else if b == b'}' && *depth == 0 && in_template {
                    // End of `${...}`, back into the enclosing string.
                    modes.pop();
                    lexemes.push(Lexeme::Other);
                    i += 1;
                } else {
                    if b == b'{' {
                        *depth += 1;
                    } else if b == b'}' {
                        *depth = depth.saturating_sub(1);
                    }
                    lexemes.push(Lexeme::Other);
                    i += 1;
                }
            }
        }
    }
    lexemes
}

/// Scanner for Java and Kotlin files.
#[derive(Debug, Clone, Copy, Default)]
pub struct Format;

impl ReferenceScanner for Format {
    fn scan(&self, content: &str) -> Result<Vec<Token>> {
        Ok(find_references(content))
    }
}

/// Finds every `R.<class>.<field>` access to the app's own resources.
///
/// The token covers the field only; its name is the generated field name
/// (`Theme_App`, not `Theme.App`).
pub fn find_references(content: &str) -> Vec<Token> {
    let lexemes = lex(content);
    let ident = |i: usize| match lexemes.get(i) {
        Some(Lexeme::Ident(range)) => Some(range.clone()),
        _ => None,
    };
    let dot = |i: usize| matches!(lexemes.get(i), Some(Lexeme::Dot));

    let mut tokens = Vec::new();
    let mut i = 0;
    while i < lexemes.len() {
        let is_r = ident(i).is_some_and(|r| &content[r] == "R");
        if !is_r || !dot(i + 1) || !dot(i + 3) {
            i += 1;
            continue;
        }
        let (Some(class), Some(field)) = (ident(i + 2), ident(i + 4)) else {
            i += 1;
            continue;
        };
        let framework = i >= 2 && dot(i - 1) && ident(i - 2).is_some_and(|r| &content[r] == "android");
        let res_type = content[class].parse::<ResourceType>().ok();
        match res_type {
            Some(res_type) if !framework && res_type != ResourceType::Asset => {
                tokens.push(Token {
                    name: content[field.clone()].to_string(),
                    range: field,
                    res_type,
                    syntax: Syntax::FieldAccess,
                });
                i += 5;
            }
            _ => i += 1,
        }
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    fn fields(content: &str) -> Vec<(ResourceType, String)> {
        find_references(content)
            .into_iter()
            .map(|t| (t.res_type, t.name))
            .collect()
    }

    #[test]
    fn test_java_references() {
        let java = indoc! {r#"
            package com.fongmi.android.tv;

            import com.fongmi.android.tv.R;

            public class Setting {
                void init() {
                    setContentView(R.layout.activity_main);
                    icon.setImageResource(R.drawable.ic_home);
                    int[] attrs = R.styleable.CustomView;
                    String s = getString(android.R.string.ok);
                }
            }
        "#};
        assert_eq!(
            fields(java),
            vec![
                (ResourceType::Layout, "activity_main".to_string()),
                (ResourceType::Drawable, "ic_home".to_string()),
                (ResourceType::Styleable, "CustomView".to_string()),
            ]
        );
    }

    #[test]
    fn test_comments_and_strings_are_skipped() {
        let kotlin = indoc! {r#"
            // R.drawable.commented
            /* R.drawable.block
               R.drawable.block2 */
            val a = "R.drawable.quoted"
            val b = """
                R.drawable.raw
            """
            val c = 'R'
            val d = R.drawable.real
        "#};
        assert_eq!(fields(kotlin), vec![(ResourceType::Drawable, "real".to_string())]);
    }

    #[test]
    fn test_multiline_and_spaced_access() {
        let kotlin = "binding.root.setBackgroundResource(R\n    .drawable\n    .shape_focus)";
        let tokens = find_references(kotlin);
        assert_eq!(tokens.len(), 1);
        assert_eq!(&kotlin[tokens[0].range.clone()], "shape_focus");
    }

    #[test]
    fn test_qualified_app_r_matches() {
        assert_eq!(
            fields("com.fongmi.android.tv.R.string.app_name"),
            vec![(ResourceType::String, "app_name".to_string())]
        );
    }

    #[test]
    fn test_identifier_containing_r_is_not_r() {
        assert!(fields("BR.drawable.icon; myR.xml.icon; R.notatype.icon").is_empty());
    }

    #[test]
    fn test_escaped_quote_in_string() {
        let java = r#"String s = "say \"R.xml.icon\""; int x = R.xml.icon;"#;
        let tokens = find_references(java);
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].range.start, java.rfind("icon").unwrap());
    }

    #[test]
    fn test_kotlin_template_expressions_are_code() {
        let kotlin = "val s = \"${getString(R.string.title)}: $x\"\nval t = R.string.title";
        let tokens = find_references(kotlin);
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].range.start, kotlin.find("title").unwrap());
        assert_eq!(tokens[1].range.start, kotlin.rfind("title").unwrap());
    }

    #[test]
    fn test_nested_templates_and_braces() {
        let kotlin = indoc! {r#"
            val a = "${if (x) { getString(R.string.on) } else "${R.string.off}"} R.string.text"
            val b = """
                ${R.drawable.raw} R.drawable.literal
            """
            val c = R.string.after
        "#};
        assert_eq!(
            fields(kotlin),
            vec![
                (ResourceType::String, "on".to_string()),
                (ResourceType::String, "off".to_string()),
                (ResourceType::Drawable, "raw".to_string()),
                (ResourceType::String, "after".to_string()),
            ]
        );
    }

    #[test]
    fn test_unterminated_comment_consumes_rest() {
        assert!(fields("/* R.xml.icon").is_empty());
    }
}
