//! Android XML: layouts, drawables, menus, values files and the manifest.
//!
//! The document is walked with `quick-xml` to find the byte ranges of
//! attribute values and text nodes. Only those ranges are scanned, so
//! comments, CDATA sections and processing instructions are never touched.
//! Edits are applied to the original bytes, which keeps formatting intact.

use std::ops::Range;

use quick_xml::{Reader, errors::IllFormedError, events::Event};

use super::{Syntax, Token, is_name_byte, take_while};
use crate::{traits::ReferenceScanner, types::ResourceType};

const RES_AUTO: &str = "http://schemas.android.com/apk/res-auto";
const RES_PACKAGE: &str = "http://schemas.android.com/apk/res/";
const FRAMEWORK_PACKAGE: &str = "http://schemas.android.com/apk/res/android";

/// One attribute with the positions of its name and (unquoted) value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub name_range: Range<usize>,
    pub value: Range<usize>,
}

/// A start or empty element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    /// Name of the enclosing element, if any.
    pub parent: Option<String>,
    pub attributes: Vec<Attribute>,
    /// `<x/>` rather than `<x>`.
    pub empty: bool,
}

impl Element {
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// `<attr name="x"/>` in a `<declare-styleable>` without a format reuses
    /// an attr declared elsewhere instead of declaring one.
    pub fn is_attr_reuse(&self) -> bool {
        self.name == "attr"
            && self.empty
            && self.parent.as_deref() == Some("declare-styleable")
            && self.attribute("format").is_none()
    }
}

/// Positions of everything in an XML file that may hold a reference.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    pub elements: Vec<Element>,
    /// Raw text node ranges.
    pub text: Vec<Range<usize>>,
}

impl Document {
    pub fn parse(content: &str) -> Result<Self, quick_xml::Error> {
        let mut reader = Reader::from_str(content);
        let mut doc = Document::default();
        let mut stack: Vec<String> = Vec::new();
        let mut last = 0usize;

        loop {
            let event = reader.read_event()?;
            let pos = reader.buffer_position() as usize;
            match event {
                Event::Start(ref e) | Event::Empty(ref e) => {
                    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                    // The tag opens at the first `<` after the previous event.
                    let tag_start = content[last..pos].find('<').map_or(last, |i| last + i + 1);
                    let tag_end = pos.saturating_sub(1).max(tag_start);
                    doc.elements.push(Element {
                        name: name.clone(),
                        parent: stack.last().cloned(),
                        attributes: scan_attributes(content, tag_start..tag_end),
                        empty: matches!(event, Event::Empty(_)),
                    });
                    if matches!(event, Event::Start(_)) {
                        stack.push(name);
                    }
                }
                Event::End(_) => {
                    stack.pop();
                }
                Event::Text(_) => {
                    let end = content[last..]
                        .find('<')
                        .map(|i| last + i)
                        .unwrap_or(content.len());
                    if end > last {
                        doc.text.push(last..end);
                    }
                }
                Event::Eof => {
                    if let Some(open) = stack.pop() {
                        return Err(quick_xml::Error::IllFormed(IllFormedError::MissingEndTag(
                            open,
                        )));
                    }
                    break;
                }
                _ => {}
            }
            last = pos;
        }
        Ok(doc)
    }

    /// Prefixes bound to the app's own attribute namespace (usually `app`).
    fn app_namespaces(&self, content: &str) -> Vec<String> {
        self.elements
            .iter()
            .flat_map(|e| e.attributes.iter())
            .filter_map(|a| {
                let prefix = a.name.strip_prefix("xmlns:")?;
                let uri = &content[a.value.clone()];
                let is_app = uri == RES_AUTO
                    || (uri.starts_with(RES_PACKAGE) && uri != FRAMEWORK_PACKAGE);
                is_app.then(|| prefix.to_string())
            })
            .collect()
    }
}

/// Finds the attributes in the text between `<` and `>` of one tag.
fn scan_attributes(content: &str, tag: Range<usize>) -> Vec<Attribute> {
    let text = &content[..tag.end];
    let bytes = text.as_bytes();
    let is_space = |b: u8| b.is_ascii_whitespace();
    let mut attributes = Vec::new();

    // Skip the element name.
    let mut i = take_while(text, tag.start, |b| !is_space(b) && b != b'/');
    loop {
        i = take_while(text, i, is_space);
        if i >= bytes.len() || bytes[i] == b'/' {
            break;
        }
        let key_start = i;
        i = take_while(text, i, |b| !is_space(b) && b != b'=' && b != b'/');
        let key_end = i;
        i = take_while(text, i, is_space);
        if i >= bytes.len() || bytes[i] != b'=' || key_end == key_start {
            break;
        }
        i = take_while(text, i + 1, is_space);
        let Some(&quote) = bytes.get(i) else { break };
        if quote != b'"' && quote != b'\'' {
            break;
        }
        let value_start = i + 1;
        let Some(len) = text[value_start..].find(quote as char) else {
            break;
        };
        attributes.push(Attribute {
            name: text[key_start..key_end].to_string(),
            name_range: key_start..key_end,
            value: value_start..value_start + len,
        });
        i = value_start + len + 1;
    }
    attributes
}

/// Scanner for Android XML files.
#[derive(Debug, Clone, Copy, Default)]
pub struct Format;

impl ReferenceScanner for Format {
    fn scan(&self, content: &str) -> crate::error::Result<Vec<Token>> {
        Ok(find_references(content)?)
    }
}

/// Finds every resource reference in an XML document.
pub fn find_references(content: &str) -> Result<Vec<Token>, quick_xml::Error> {
    let doc = Document::parse(content)?;
    Ok(references_in(&doc, content))
}

/// Finds every resource reference in an already parsed document.
pub fn references_in(doc: &Document, content: &str) -> Vec<Token> {
    let app_namespaces = doc.app_namespaces(content);
    let mut tokens = Vec::new();

    for element in &doc.elements {
        for attr in &element.attributes {
            if let Some(local) = app_attribute(&attr.name, &app_namespaces) {
                let start = attr.name_range.end - local.len();
                tokens.push(Token {
                    range: start..attr.name_range.end,
                    res_type: ResourceType::Attr,
                    name: local.to_string(),
                    syntax: Syntax::AttributeName,
                });
            }

            if let Some(token) = bare_reference(element, attr, content) {
                tokens.push(token);
                continue;
            }
            scan_links(content, attr.value.clone(), true, &mut tokens);
        }
    }
    for span in &doc.text {
        scan_links(content, span.clone(), false, &mut tokens);
    }

    tokens.sort_by_key(|t| t.range.start);
    tokens
}

fn app_attribute<'a>(name: &'a str, app_namespaces: &[String]) -> Option<&'a str> {
    let (ns, local) = name.split_once(':')?;
    if local.is_empty() || !app_namespaces.iter().any(|p| p == ns) {
        return None;
    }
    Some(local)
}

/// Style parents, style items and reused styleable attrs name their target
/// without `@type/`.
fn bare_reference(element: &Element, attr: &Attribute, content: &str) -> Option<Token> {
    let (res_type, syntax) = match (element.name.as_str(), attr.name.as_str()) {
        ("style", "parent") => (ResourceType::Style, Syntax::StyleParent),
        ("item", "name") if element.parent.as_deref() == Some("style") => {
            (ResourceType::Attr, Syntax::StyleItem)
        }
        ("attr", "name") if element.is_attr_reuse() => (ResourceType::Attr, Syntax::StyleableAttr),
        _ => return None,
    };
    let raw = &content[attr.value.clone()];
    let name = raw.trim();
    if name.is_empty() || name.starts_with(['@', '?']) || name.contains(':') {
        return None;
    }
    let start = attr.value.start + (raw.len() - raw.trim_start().len());
    Some(Token {
        range: start..start + name.len(),
        res_type,
        name: name.to_string(),
        syntax,
    })
}

/// Scans `span` for `@type/name`, `?type/name` and (in attributes) `?name`.
fn scan_links(content: &str, span: Range<usize>, in_attribute: bool, tokens: &mut Vec<Token>) {
    let text = &content[..span.end];
    let bytes = text.as_bytes();
    let mut i = span.start;

    while i < span.end {
        let b = bytes[i];
        let at_boundary = i == span.start || !is_name_byte(bytes[i - 1]);
        if (b == b'@' || b == b'?') && at_boundary {
            if let Some(token) = read_link(text, i, in_attribute) {
                i = token.range.end;
                tokens.push(token);
                continue;
            }
        }
        i += 1;
    }
}

fn read_link(text: &str, at: usize, in_attribute: bool) -> Option<Token> {
    let bytes = text.as_bytes();
    let sigil = bytes[at];
    let type_end = take_while(text, at + 1, |b| b.is_ascii_lowercase());

    let (res_type, name_start, syntax) = if bytes.get(type_end) == Some(&b'/') {
        let res_type = text[at + 1..type_end].parse::<ResourceType>().ok()?;
        if res_type == ResourceType::Asset {
            return None;
        }
        let syntax = if sigil == b'@' {
            Syntax::ResourceLink
        } else {
            Syntax::ThemeAttribute
        };
        (res_type, type_end + 1, syntax)
    } else if sigil == b'?' && in_attribute {
        (ResourceType::Attr, at + 1, Syntax::ThemeAttribute)
    } else {
        return None;
    };

    let name_end = if res_type == ResourceType::Style {
        take_while(text, name_start, |b| is_name_byte(b) || b == b'.')
    } else {
        take_while(text, name_start, is_name_byte)
    };
    let name = text[name_start..name_end].trim_end_matches('.');
    if name.is_empty() || !name.as_bytes()[0].is_ascii_alphabetic() && name.as_bytes()[0] != b'_'
    {
        return None;
    }
    // `?android:attr/x` reads `android` as the name; the framework is not ours.
    if bytes.get(name_start + name.len()) == Some(&b':') {
        return None;
    }
    Some(Token {
        range: name_start..name_start + name.len(),
        res_type,
        name: name.to_string(),
        syntax,
    })
}
