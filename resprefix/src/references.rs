//! Rewrites references to renamed resources.
//!
//! This runs once the mapping is complete. Each file is scanned once on its
//! current content and every token is looked up whole, so replacement text
//! is never matched again and `icon` never touches `icon_large`.

use std::collections::HashMap;

use tracing::{debug, info};

use crate::{
    context::RunContext,
    error::{Error, Issue},
    formats::{FileFormat, Token, assets, markup, source},
    scanner::TextFile,
    traits::ReferenceScanner,
    types::{ReferenceSite, RenameMapping, ResourceType, field_name},
};

/// Looks up the new identifier for a token.
///
/// Markup tokens use resource names (`Theme.App`), code tokens use the
/// generated field names (`Theme_App`).
#[derive(Debug, Clone, Default)]
pub struct Resolver {
    names: HashMap<(ResourceType, String), String>,
    fields: HashMap<(ResourceType, String), String>,
}

impl Resolver {
    pub fn new(mapping: &RenameMapping) -> Self {
        let mut resolver = Resolver::default();
        for (key, new_name) in mapping.iter() {
            resolver
                .names
                .insert((key.res_type, key.name.clone()), new_name.to_string());
            resolver
                .fields
                .insert((key.res_type, key.field_name()), field_name(new_name));
        }
        resolver
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Asset paths that have a new name.
    pub fn asset_names(&self) -> Vec<String> {
        self.names
            .keys()
            .filter(|(t, _)| *t == ResourceType::Asset)
            .map(|(_, n)| n.clone())
            .collect()
    }

    pub fn resolve(&self, token: &Token) -> Option<String> {
        let key = (token.res_type, token.name.clone());
        if !token.syntax.is_field() {
            return self.names.get(&key).cloned();
        }
        if let Some(field) = self.fields.get(&key) {
            return Some(field.clone());
        }
        if token.res_type == ResourceType::Styleable {
            return self.resolve_styleable_attr(&token.name);
        }
        None
    }

    /// `R.styleable.CustomView_label` is the index of `label` in
    /// `CustomView`; both halves may have been renamed.
    fn resolve_styleable_attr(&self, field: &str) -> Option<String> {
        let (styleable, new_styleable) = field
            .match_indices('_')
            .filter_map(|(i, _)| {
                let head = &field[..i];
                let new = self.fields.get(&(ResourceType::Styleable, head.to_string()))?;
                Some((head, new))
            })
            .max_by_key(|(head, _)| head.len())?;
        let attr = &field[styleable.len() + 1..];
        let new_attr = self
            .fields
            .get(&(ResourceType::Attr, attr.to_string()))
            .map(String::as_str)
            .unwrap_or(attr);
        Some(format!("{}_{}", new_styleable, new_attr))
    }
}

/// Rewrites every reference in `files` that the mapping of `ctx` renames.
///
/// Returns the number of substitutions.
pub fn rewrite_references(files: &[TextFile], ctx: &mut RunContext) -> usize {
    let resolver = Resolver::new(&ctx.mapping);
    if resolver.is_empty() {
        debug!("Nothing renamed, skipping reference rewrite");
        return 0;
    }
    let asset_scanner = assets::Format {
        names: resolver.asset_names(),
    };

    let mut total = 0;
    for file in files {
        let scanner: &dyn ReferenceScanner = match file.format {
            FileFormat::Markup => &markup::Format,
            FileFormat::Source => &source::Format,
            FileFormat::AssetText if asset_scanner.names.is_empty() => continue,
            FileFormat::AssetText => &asset_scanner,
        };
        match rewrite_file(file, scanner, &resolver, ctx) {
            Ok(count) => total += count,
            Err(e) => ctx.record(Issue::from_error(&file.path, &e)),
        }
    }
    total
}

fn rewrite_file(
    file: &TextFile,
    scanner: &dyn ReferenceScanner,
    resolver: &Resolver,
    ctx: &mut RunContext,
) -> Result<usize, Error> {
    let content = ctx.read(&file.path)?.into_owned();
    let rewrite = scanner
        .rewrite(&content, &|token| resolver.resolve(token))
        .map_err(|e| e.at(&file.path))?;
    if !rewrite.is_changed() {
        return Ok(0);
    }

    let count = rewrite.replaced.len();
    if ctx.dry_run {
        info!("Would rewrite {} references in: {:?}", count, file.path);
    } else {
        info!("Rewriting {} references in: {:?}", count, file.path);
    }
    ctx.sites.extend(rewrite.replaced.into_iter().map(|token| ReferenceSite {
        path: file.path.clone(),
        offset: token.range.start,
        res_type: token.res_type,
        identifier: token.name,
    }));
    ctx.stage(&file.path, rewrite.content, count);
    Ok(count)
}
