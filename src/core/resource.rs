use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::classify::MatchStats;
use crate::core::types::{PackageId, ResourceId, ResourceKind, Side};

/// Open attribute map of a resource, with the keys this engine reads and
/// writes pulled out as typed fields. Anything else lands in `other`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceExtra {
    /// Symbols extracted upstream from a source file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_symbols: Option<Vec<String>>,

    /// Symbols extracted upstream from a binary or deployed file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub binary_symbols: Option<Vec<String>>,

    /// Symbol comparison stats keyed by the path of the resource compared against.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub symbols_match: BTreeMap<String, MatchStats>,

    #[serde(flatten)]
    pub other: BTreeMap<String, serde_json::Value>,
}

/// One file or directory on either side of the project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub id: ResourceId,
    pub side: Side,
    pub path: String,
    pub name: String,
    pub extension: String,
    pub kind: ResourceKind,
    pub sha1: Option<String>,
    pub md5: Option<String>,
    pub status: String,
    pub extra_data: ResourceExtra,
    pub packages: Vec<PackageId>,
}

impl Resource {
    pub fn new(path: impl Into<String>, side: Side, kind: ResourceKind) -> Self {
        let path = path.into().trim_matches('/').to_string();
        let name = path.rsplit('/').next().unwrap_or_default().to_string();
        let extension = match (kind, name.rfind('.')) {
            (ResourceKind::File, Some(idx)) if idx > 0 => name[idx..].to_string(),
            _ => String::new(),
        };

        Self {
            id: 0, // assigned by the store
            side,
            path,
            name,
            extension,
            kind,
            sha1: None,
            md5: None,
            status: String::new(),
            extra_data: ResourceExtra::default(),
            packages: Vec::new(),
        }
    }

    pub fn file(path: impl Into<String>, side: Side) -> Self {
        Self::new(path, side, ResourceKind::File)
    }

    pub fn directory(path: impl Into<String>, side: Side) -> Self {
        Self::new(path, side, ResourceKind::Directory)
    }

    pub fn with_sha1(mut self, sha1: impl Into<String>) -> Self {
        self.sha1 = Some(sha1.into());
        self
    }

    pub fn with_source_symbols<S: Into<String>>(mut self, symbols: impl IntoIterator<Item = S>) -> Self {
        self.extra_data.source_symbols = Some(symbols.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_binary_symbols<S: Into<String>>(mut self, symbols: impl IntoIterator<Item = S>) -> Self {
        self.extra_data.binary_symbols = Some(symbols.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_packages(mut self, packages: impl IntoIterator<Item = PackageId>) -> Self {
        self.packages = packages.into_iter().collect();
        self
    }

    pub fn is_file(&self) -> bool {
        self.kind == ResourceKind::File
    }

    /// Parent directory path, empty for top-level resources.
    pub fn parent_path(&self) -> &str {
        match self.path.rfind('/') {
            Some(idx) => &self.path[..idx],
            None => "",
        }
    }

    /// Segments of the parent directory path.
    pub fn dir_segments(&self) -> Vec<&str> {
        self.parent_path().split('/').filter(|s| !s.is_empty()).collect()
    }
}

/// A detected package. Only used here as a grouping key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Package {
    pub id: PackageId,
    pub purl: String,
}
