//! Reference syntaxes of every text format the rewriter understands.
//!
//! Each format module finds reference *tokens*: the whole identifier is read
//! before it is looked up, so a name that is a strict prefix of another name
//! can never be partially matched. The [`FileFormat`] enum picks the scanner
//! for a path.

pub mod assets;
pub mod markup;
pub mod source;

use std::{
    fmt::{Display, Formatter},
    ops::Range,
    path::Path,
};

use serde::Serialize;

use crate::types::ResourceType;

/// Text formats that can hold resource references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileFormat {
    /// Android XML (layouts, drawables, values, manifest).
    Markup,
    /// Java or Kotlin source.
    Source,
    /// HTML, CSS or JS under `assets/`.
    AssetText,
}

impl Display for FileFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FileFormat::Markup => write!(f, "markup"),
            FileFormat::Source => write!(f, "source"),
            FileFormat::AssetText => write!(f, "asset"),
        }
    }
}

/// Infers the format of `path` from its extension.
///
/// `source_extensions` and `asset_extensions` come from the config; `.xml`
/// is always markup.
///
/// ```rust
/// use resprefix::formats::{FileFormat, infer_format_from_extension};
/// let src = ["java".to_string(), "kt".to_string()];
/// let web = ["html".to_string()];
/// assert_eq!(infer_format_from_extension("a/Main.kt", &src, &web), Some(FileFormat::Source));
/// assert_eq!(infer_format_from_extension("res/layout/main.xml", &src, &web), Some(FileFormat::Markup));
/// assert_eq!(infer_format_from_extension("index.html", &src, &web), Some(FileFormat::AssetText));
/// assert_eq!(infer_format_from_extension("icon.png", &src, &web), None);
/// ```
pub fn infer_format_from_extension<P: AsRef<Path>>(
    path: P,
    source_extensions: &[String],
    asset_extensions: &[String],
) -> Option<FileFormat> {
    let ext = path.as_ref().extension().and_then(|s| s.to_str())?;
    if ext == "xml" {
        Some(FileFormat::Markup)
    } else if source_extensions.iter().any(|e| e == ext) {
        Some(FileFormat::Source)
    } else if asset_extensions.iter().any(|e| e == ext) {
        Some(FileFormat::AssetText)
    } else {
        None
    }
}

/// How a reference was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Syntax {
    /// `@drawable/icon`
    ResourceLink,
    /// `?attr/colorAccent` or `?colorAccent`
    ThemeAttribute,
    /// `parent="Theme.Base"` on a `<style>`
    StyleParent,
    /// `<item name="colorAccent">` inside a `<style>`
    StyleItem,
    /// `<attr name="cornerRadius"/>` reused inside a `<declare-styleable>`
    StyleableAttr,
    /// `app:cornerRadius="4dp"`
    AttributeName,
    /// `R.drawable.icon`
    FieldAccess,
    /// `images/logo.png`
    AssetPath,
}

impl Syntax {
    /// Whether the token is a generated field name rather than a resource name.
    pub fn is_field(self) -> bool {
        matches!(self, Syntax::FieldAccess)
    }
}

/// One reference token found in a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Byte range of the identifier only (not the `@drawable/` part).
    pub range: Range<usize>,
    pub res_type: ResourceType,
    pub name: String,
    pub syntax: Syntax,
}

/// A replacement of `range` in a file's content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    pub range: Range<usize>,
    pub replacement: String,
}

/// Result of rewriting one file's content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewrite {
    pub content: String,
    /// Tokens that were replaced, with their offsets in the original text.
    pub replaced: Vec<Token>,
}

impl Rewrite {
    pub fn is_changed(&self) -> bool {
        !self.replaced.is_empty()
    }
}

/// Applies non-overlapping edits, back to front so earlier offsets stay valid.
pub fn apply_edits(content: &str, edits: &[TextEdit]) -> String {
    let mut sorted: Vec<&TextEdit> = edits.iter().collect();
    sorted.sort_by(|a, b| b.range.start.cmp(&a.range.start));

    let mut out = content.to_string();
    let mut floor = usize::MAX;
    for edit in sorted {
        if edit.range.end > floor {
            continue;
        }
        out.replace_range(edit.range.clone(), &edit.replacement);
        floor = edit.range.start;
    }
    out
}

/// Characters of an Android resource name.
pub(crate) fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Reads a run of bytes accepted by `accept` starting at `start`.
pub(crate) fn take_while(text: &str, start: usize, accept: impl Fn(u8) -> bool) -> usize {
    let bytes = text.as_bytes();
    let mut end = start;
    while end < bytes.len() && accept(bytes[end]) {
        end += 1;
    }
    end
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edit(start: usize, end: usize, replacement: &str) -> TextEdit {
        TextEdit {
            range: start..end,
            replacement: replacement.to_string(),
        }
    }

    #[test]
    fn test_apply_edits_out_of_order() {
        let content = "@xml/icon and @xml/logo";
        let edits = vec![edit(5, 9, "vod_icon"), edit(19, 23, "vod_logo")];
        assert_eq!(
            apply_edits(content, &edits),
            "@xml/vod_icon and @xml/vod_logo"
        );
        let reversed: Vec<TextEdit> = edits.into_iter().rev().collect();
        assert_eq!(
            apply_edits(content, &reversed),
            "@xml/vod_icon and @xml/vod_logo"
        );
    }

    #[test]
    fn test_apply_edits_skips_overlaps() {
        let content = "abcdef";
        let edits = vec![edit(0, 4, "X"), edit(2, 6, "Y")];
        assert_eq!(apply_edits(content, &edits), "abY");
    }

    #[test]
    fn test_apply_no_edits_is_identity() {
        assert_eq!(apply_edits("unchanged", &[]), "unchanged");
    }

    #[test]
    fn test_take_while() {
        assert_eq!(take_while("icon_large\"", 0, is_name_byte), 10);
        assert_eq!(take_while("icon", 4, is_name_byte), 4);
    }
}
