//! Core types shared by every stage: resource namespaces, keys, files and the
//! old-to-new mapping collected during a run.

use std::{
    collections::BTreeMap,
    fmt::{Display, Formatter},
    path::{Path, PathBuf},
    str::FromStr,
};

use serde::{Serialize, Serializer};

use crate::error::Error;

/// An Android resource namespace, i.e. the `<type>` in `@<type>/<name>`.
///
/// `Asset` is not an Android namespace; it covers files under `assets/`,
/// which web content refers to by relative path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    Anim,
    Animator,
    Array,
    Attr,
    Bool,
    Color,
    Dimen,
    Drawable,
    Font,
    Integer,
    Interpolator,
    Layout,
    Menu,
    Mipmap,
    Plurals,
    Raw,
    String,
    Style,
    Styleable,
    Xml,
    Asset,
}

impl ResourceType {
    pub const ALL: [ResourceType; 21] = [
        ResourceType::Anim,
        ResourceType::Animator,
        ResourceType::Array,
        ResourceType::Attr,
        ResourceType::Bool,
        ResourceType::Color,
        ResourceType::Dimen,
        ResourceType::Drawable,
        ResourceType::Font,
        ResourceType::Integer,
        ResourceType::Interpolator,
        ResourceType::Layout,
        ResourceType::Menu,
        ResourceType::Mipmap,
        ResourceType::Plurals,
        ResourceType::Raw,
        ResourceType::String,
        ResourceType::Style,
        ResourceType::Styleable,
        ResourceType::Xml,
        ResourceType::Asset,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ResourceType::Anim => "anim",
            ResourceType::Animator => "animator",
            ResourceType::Array => "array",
            ResourceType::Attr => "attr",
            ResourceType::Bool => "bool",
            ResourceType::Color => "color",
            ResourceType::Dimen => "dimen",
            ResourceType::Drawable => "drawable",
            ResourceType::Font => "font",
            ResourceType::Integer => "integer",
            ResourceType::Interpolator => "interpolator",
            ResourceType::Layout => "layout",
            ResourceType::Menu => "menu",
            ResourceType::Mipmap => "mipmap",
            ResourceType::Plurals => "plurals",
            ResourceType::Raw => "raw",
            ResourceType::String => "string",
            ResourceType::Style => "style",
            ResourceType::Styleable => "styleable",
            ResourceType::Xml => "xml",
            ResourceType::Asset => "asset",
        }
    }

    /// Splits a resource directory name into its type and qualifier.
    ///
    /// ```rust
    /// use resprefix::types::ResourceType;
    /// assert_eq!(
    ///     ResourceType::from_dir_name("drawable-xhdpi"),
    ///     Some((ResourceType::Drawable, Some("xhdpi".to_string())))
    /// );
    /// assert_eq!(ResourceType::from_dir_name("layout"), Some((ResourceType::Layout, None)));
    /// assert_eq!(ResourceType::from_dir_name("values-zh-rCN"), None);
    /// ```
    pub fn from_dir_name(name: &str) -> Option<(ResourceType, Option<String>)> {
        let (base, qualifier) = match name.split_once('-') {
            Some((base, qualifier)) => (base, Some(qualifier.to_string())),
            None => (name, None),
        };
        let res_type = base.parse::<ResourceType>().ok()?;
        if res_type.is_file_based() {
            Some((res_type, qualifier))
        } else {
            None
        }
    }

    /// Maps a value declaration tag (`<string-array>`) to its namespace.
    pub fn from_declaration_tag(tag: &str) -> Option<ResourceType> {
        match tag {
            "string-array" | "integer-array" | "array" => Some(ResourceType::Array),
            "declare-styleable" => Some(ResourceType::Styleable),
            "string" | "color" | "style" | "attr" | "dimen" | "integer" | "bool" | "plurals" => {
                tag.parse().ok()
            }
            _ => None,
        }
    }

    /// Whether resources of this type are individual files under `res/`.
    pub fn is_file_based(self) -> bool {
        matches!(
            self,
            ResourceType::Anim
                | ResourceType::Animator
                | ResourceType::Color
                | ResourceType::Drawable
                | ResourceType::Font
                | ResourceType::Interpolator
                | ResourceType::Layout
                | ResourceType::Menu
                | ResourceType::Mipmap
                | ResourceType::Raw
                | ResourceType::Xml
        )
    }
}

impl Display for ResourceType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResourceType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| Error::invalid_config(format!("unknown resource type `{}`", s)))
    }
}

/// Identifies one resource: its namespace plus its name.
///
/// For file resources the name is the file name up to the first `.`
/// (`btn.9.png` is `drawable/btn`). For assets it is the path relative to
/// `assets/` (`images/logo.png`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ResourceKey {
    pub res_type: ResourceType,
    pub name: String,
}

impl ResourceKey {
    pub fn new(res_type: ResourceType, name: impl Into<String>) -> Self {
        ResourceKey {
            res_type,
            name: name.into(),
        }
    }

    /// The field name the Android build generates in `R.<type>`.
    pub fn field_name(&self) -> String {
        field_name(&self.name)
    }
}

impl Display for ResourceKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.res_type, self.name)
    }
}

impl Serialize for ResourceKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// `Theme.App.Dark` becomes `Theme_App_Dark` in generated code.
pub fn field_name(name: &str) -> String {
    name.replace('.', "_")
}

/// Resource name of a file: everything before the first `.`.
pub fn resource_name(file_name: &str) -> &str {
    file_name.split('.').next().unwrap_or(file_name)
}

/// A file that may be renamed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceFile {
    pub path: PathBuf,
    pub key: ResourceKey,
    /// Directory qualifier such as `hdpi` or `anydpi-v26`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qualifier: Option<String>,
}

impl ResourceFile {
    pub fn file_name(&self) -> &str {
        self.path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
    }

    /// Where the file lands once `prefix` is prepended to its file name.
    pub fn prefixed_path(&self, prefix: &str) -> PathBuf {
        let new_name = format!("{}{}", prefix, self.file_name());
        match self.path.parent() {
            Some(parent) => parent.join(new_name),
            None => PathBuf::from(new_name),
        }
    }

    /// The name this resource gets once prefixed.
    pub fn prefixed_name(&self, prefix: &str) -> String {
        prefixed_name(self.key.res_type, &self.key.name, prefix)
    }
}

/// Prefixes a resource name. Asset names are paths, so only their last
/// component gets the prefix.
pub fn prefixed_name(res_type: ResourceType, name: &str, prefix: &str) -> String {
    if res_type == ResourceType::Asset {
        if let Some((dir, file)) = name.rsplit_once('/') {
            return format!("{}/{}{}", dir, prefix, file);
        }
    }
    format!("{}{}", prefix, name)
}

/// One textual occurrence of a resource reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReferenceSite {
    pub path: PathBuf,
    /// Byte offset of the identifier in the file.
    pub offset: usize,
    pub res_type: ResourceType,
    pub identifier: String,
}

/// Old name to new name for every resource renamed in a run.
///
/// Keys are unique; iteration is ordered by type then name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenameMapping {
    entries: BTreeMap<ResourceKey, String>,
}

impl RenameMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a rename. Returns `false` if the key was already mapped, in
    /// which case the first mapping is kept.
    pub fn insert(&mut self, key: ResourceKey, new_name: impl Into<String>) -> bool {
        if self.entries.contains_key(&key) {
            return false;
        }
        self.entries.insert(key, new_name.into());
        true
    }

    pub fn get(&self, res_type: ResourceType, name: &str) -> Option<&str> {
        self.entries
            .get(&ResourceKey::new(res_type, name))
            .map(String::as_str)
    }

    pub fn contains(&self, key: &ResourceKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ResourceKey, &str)> {
        self.entries.iter().map(|(k, v)| (k, v.as_str()))
    }

    /// Entries of one namespace.
    pub fn of_type(&self, res_type: ResourceType) -> impl Iterator<Item = (&ResourceKey, &str)> {
        self.iter().filter(move |(k, _)| k.res_type == res_type)
    }
}

impl Serialize for RenameMapping {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.entries.iter().map(|(k, v)| (k.to_string(), v)))
    }
}

pub(crate) fn display_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
