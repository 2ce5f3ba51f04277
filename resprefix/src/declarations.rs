//! Prefixes the `name` of value declarations (`<string name="app_name">`).
//!
//! Value files are never renamed; the identifiers they declare are changed
//! in place instead. Each prefixed declaration adds an entry to the mapping,
//! so the reference phase rewrites `@string/app_name` as well.

use std::path::Path;

use tracing::{debug, info};

use crate::{
    context::RunContext,
    error::{Error, Issue},
    formats::{TextEdit, apply_edits, markup::Document},
    types::{ResourceKey, ResourceType, prefixed_name},
};

/// One prefixed declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub key: ResourceKey,
    pub new_name: String,
}

/// Finds the declarations of `content` that still lack `prefix`, together
/// with the edits that prefix them.
pub fn find_declarations(
    content: &str,
    tags: &[(String, ResourceType)],
    prefix: &str,
) -> Result<Vec<(Declaration, TextEdit)>, quick_xml::Error> {
    let doc = Document::parse(content)?;
    let mut found = Vec::new();

    for element in &doc.elements {
        let Some((_, res_type)) = tags.iter().find(|(tag, _)| *tag == element.name) else {
            continue;
        };
        if element.is_attr_reuse() {
            continue;
        }
        let Some(attr) = element.attribute("name") else {
            continue;
        };
        let raw = &content[attr.value.clone()];
        let name = raw.trim();
        if name.is_empty() || name.contains(':') || name.starts_with(prefix) {
            continue;
        }
        let start = attr.value.start + (raw.len() - raw.trim_start().len());
        let new_name = prefixed_name(*res_type, name, prefix);
        found.push((
            Declaration {
                key: ResourceKey::new(*res_type, name),
                new_name: new_name.clone(),
            },
            TextEdit {
                range: start..start + name.len(),
                replacement: new_name,
            },
        ));
    }
    Ok(found)
}

/// Prefixes the declarations of every file in `files` and records them in
/// the mapping. Returns the number of declarations prefixed.
pub fn rewrite_declarations(
    files: &[impl AsRef<Path>],
    tags: &[(String, ResourceType)],
    ctx: &mut RunContext,
) -> usize {
    let mut total = 0;
    for path in files {
        let path = path.as_ref();
        match rewrite_file(path, tags, ctx) {
            Ok(0) => debug!("No declarations to prefix in {:?}", path),
            Ok(count) => total += count,
            Err(e) => ctx.record(Issue::from_error(path, &e)),
        }
    }
    total
}

fn rewrite_file(
    path: &Path,
    tags: &[(String, ResourceType)],
    ctx: &mut RunContext,
) -> Result<usize, Error> {
    let content = ctx.read(path)?.into_owned();
    let found: Vec<_> = find_declarations(&content, tags, &ctx.prefix)
        .map_err(|e| Error::xml(path, e))?
        .into_iter()
        .filter(|(declaration, _)| !ctx.blocked.contains(&declaration.key))
        .collect();
    if found.is_empty() {
        return Ok(0);
    }

    let mut edits = Vec::with_capacity(found.len());
    for (declaration, edit) in found {
        // The same name declared twice (e.g. per locale) maps once.
        ctx.mapping
            .insert(declaration.key.clone(), declaration.new_name.clone());
        edits.push(edit);
    }
    let count = edits.len();
    if ctx.dry_run {
        info!("Would prefix {} declarations in: {:?}", count, path);
    } else {
        info!("Prefixing {} declarations in: {:?}", count, path);
    }
    ctx.stage(path, apply_edits(&content, &edits), count);
    Ok(count)
}
