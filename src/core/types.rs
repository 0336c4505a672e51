use std::fmt;

use serde::{Deserialize, Serialize};

pub type ResourceId = u32;
pub type RelationId = u32;
pub type PackageId = u32;
pub type BatchId = u32;

/// Which codebase a resource belongs to.
///
/// `To` is the deployed/binary tree, `From` is the source/develop tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    To,
    From,
}

impl Side {
    pub fn opposite(self) -> Side {
        match self {
            Side::To => Side::From,
            Side::From => Side::To,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Side::To => "to",
            Side::From => "from",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    File,
    Directory,
}

/// Coarse strength of evidence behind a candidate match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl Confidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::High => "high",
            Confidence::Medium => "medium",
            Confidence::Low => "low",
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Binary formats that can be matched back to sources by symbols.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MapType {
    #[serde(rename = "rust_symbols")]
    RustSymbols,
    #[serde(rename = "elf_symbols")]
    ElfSymbols,
    #[serde(rename = "macho_symbols")]
    MachoSymbols,
    #[serde(rename = "winpe_symbols")]
    WinpeSymbols,
    #[serde(rename = "javascript")]
    Javascript,
}

impl MapType {
    pub const ALL: [MapType; 5] = [
        MapType::RustSymbols,
        MapType::ElfSymbols,
        MapType::MachoSymbols,
        MapType::WinpeSymbols,
        MapType::Javascript,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MapType::RustSymbols => "rust_symbols",
            MapType::ElfSymbols => "elf_symbols",
            MapType::MachoSymbols => "macho_symbols",
            MapType::WinpeSymbols => "winpe_symbols",
            MapType::Javascript => "javascript",
        }
    }

    pub fn parse(value: &str) -> Option<MapType> {
        MapType::ALL.into_iter().find(|m| m.as_str() == value)
    }

    /// Minified code loses identifiers, so it is compared by symbol
    /// frequency profile instead of raw overlap.
    pub fn uses_distribution(&self) -> bool {
        matches!(self, MapType::Javascript)
    }
}

impl fmt::Display for MapType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resource status values written by the matching engine.
pub mod status {
    pub const MAPPED_BY_SYMBOL: &str = "mapped-by-symbol";
    pub const REQUIRES_REVIEW: &str = "requires-review";
}
