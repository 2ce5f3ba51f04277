//! Traits for format-agnostic reference scanning in resprefix.

use crate::{
    error::Result,
    formats::{Rewrite, TextEdit, Token, apply_edits},
};

/// A text format whose resource references can be found and rewritten.
///
/// # Example
///
/// ```rust
/// use resprefix::traits::ReferenceScanner;
/// let content = r#"<ImageView android:src="@drawable/icon"/>"#;
/// let rewrite = resprefix::formats::markup::Format
///     .rewrite(content, &|token| Some(format!("vod_{}", token.name)))?;
/// assert_eq!(rewrite.content, r#"<ImageView android:src="@drawable/vod_icon"/>"#);
/// Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub trait ReferenceScanner {
    /// Finds every reference token in `content`, ordered by offset.
    fn scan(&self, content: &str) -> Result<Vec<Token>>;

    /// Replaces every token `resolve` maps to a new identifier.
    ///
    /// All tokens are found on the original text before anything is
    /// replaced, so a replacement is never scanned again.
    fn rewrite(
        &self,
        content: &str,
        resolve: &dyn Fn(&Token) -> Option<String>,
    ) -> Result<Rewrite> {
        let mut edits = Vec::new();
        let mut replaced = Vec::new();
        for token in self.scan(content)? {
            let Some(replacement) = resolve(&token) else {
                continue;
            };
            if replacement == token.name {
                continue;
            }
            edits.push(TextEdit {
                range: token.range.clone(),
                replacement,
            });
            replaced.push(token);
        }
        Ok(Rewrite {
            content: apply_edits(content, &edits),
            replaced,
        })
    }
}
