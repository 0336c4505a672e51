//! Matching thresholds and conventions.
//!
//! A [`MatchConfig`] is passed explicitly to the classifier and to every
//! candidate generator. It can be written as a TOON document; any key left
//! out keeps its default.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::types::MapType;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid TOON config: {0}")]
    Parse(String),

    #[error("invalid config value for {field}: {reason}")]
    Invalid { field: String, reason: String },
}

/// Ratio thresholds for one binary format.
///
/// A comparison matches when a ratio is strictly greater than the applicable
/// threshold. `small_file` replaces `base` for files whose symbol count falls
/// under `small_file_cutoff`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SymbolThreshold {
    pub base: f64,
    #[serde(default)]
    pub small_file: Option<f64>,
    #[serde(default)]
    pub small_file_cutoff: usize,
}

impl SymbolThreshold {
    pub const fn flat(base: f64) -> Self {
        Self {
            base,
            small_file: None,
            small_file_cutoff: 0,
        }
    }

    pub const fn with_small_file(base: f64, small_file: f64, cutoff: usize) -> Self {
        Self {
            base,
            small_file: Some(small_file),
            small_file_cutoff: cutoff,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SymbolThresholds {
    /// Small-file rule applies below the cutoff (source symbol count).
    pub rust: SymbolThreshold,
    pub elf: SymbolThreshold,
    pub macho: SymbolThreshold,
    pub winpe: SymbolThreshold,
    /// Similarity thresholds; small-file rule applies at or below the
    /// cutoff (deployed symbol count).
    pub javascript: SymbolThreshold,
}

impl Default for SymbolThresholds {
    fn default() -> Self {
        Self {
            rust: SymbolThreshold::with_small_file(0.5, 0.4, 20),
            // native symbol tables are sparse and often stripped
            elf: SymbolThreshold::flat(0.05),
            macho: SymbolThreshold::flat(0.15),
            winpe: SymbolThreshold::flat(0.15),
            javascript: SymbolThreshold::with_small_file(0.7, 0.5, 30),
        }
    }
}

impl SymbolThresholds {
    pub fn for_map_type(&self, map_type: MapType) -> &SymbolThreshold {
        match map_type {
            MapType::RustSymbols => &self.rust,
            MapType::ElfSymbols => &self.elf,
            MapType::MachoSymbols => &self.macho,
            MapType::WinpeSymbols => &self.winpe,
            MapType::Javascript => &self.javascript,
        }
    }
}

/// Source file extensions considered as "from" candidates per map type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceExtensions {
    pub rust: Vec<String>,
    pub native: Vec<String>,
    pub javascript: Vec<String>,
}

impl Default for SourceExtensions {
    fn default() -> Self {
        let owned = |exts: &[&str]| exts.iter().map(|e| e.to_string()).collect();
        Self {
            rust: owned(&[".rs"]),
            native: owned(&[".c", ".cc", ".cpp", ".cxx", ".h", ".hh", ".hpp", ".m", ".mm"]),
            javascript: owned(&[".js", ".jsx", ".mjs", ".cjs", ".ts", ".tsx"]),
        }
    }
}

impl SourceExtensions {
    pub fn for_map_type(&self, map_type: MapType) -> &[String] {
        match map_type {
            MapType::RustSymbols => &self.rust,
            MapType::ElfSymbols | MapType::MachoSymbols | MapType::WinpeSymbols => &self.native,
            MapType::Javascript => &self.javascript,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    pub thresholds: SymbolThresholds,
    /// Minimum directory Jaccard similarity for the path heuristic.
    pub similarity_threshold: f64,
    /// Path segments whose resources never need review (e.g. `tests`).
    pub ignored_path_segments: Vec<String>,
    pub chunk_size: usize,
    /// Symbols at most this long count as minified.
    pub decomposed_min_length: usize,
    /// Below this share of long symbols a file is treated as decomposed.
    pub decomposed_ratio: f64,
    pub source_extensions: SourceExtensions,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            thresholds: SymbolThresholds::default(),
            similarity_threshold: 0.8,
            ignored_path_segments: vec!["tests".to_string()],
            chunk_size: 2000,
            decomposed_min_length: 3,
            decomposed_ratio: 0.5,
            source_extensions: SourceExtensions::default(),
        }
    }
}

impl MatchConfig {
    pub fn from_toon_str(input: &str) -> Result<Self, ConfigError> {
        let config: MatchConfig = toon_format::decode_default(input).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toon_str(&text)
    }

    pub fn to_toon(&self) -> Result<String, ConfigError> {
        toon_format::encode_default(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let ratio = |field: &str, value: f64| {
            if (0.0..=1.0).contains(&value) {
                Ok(())
            } else {
                Err(ConfigError::Invalid {
                    field: field.to_string(),
                    reason: format!("{value} is outside [0, 1]"),
                })
            }
        };

        for map_type in MapType::ALL {
            let t = self.thresholds.for_map_type(map_type);
            ratio(map_type.as_str(), t.base)?;
            if let Some(small) = t.small_file {
                ratio(map_type.as_str(), small)?;
            }
        }
        ratio("similarity_threshold", self.similarity_threshold)?;
        ratio("decomposed_ratio", self.decomposed_ratio)?;

        if self.chunk_size == 0 {
            return Err(ConfigError::Invalid {
                field: "chunk_size".to_string(),
                reason: "must be positive".to_string(),
            });
        }
        Ok(())
    }

    /// Whether `path` sits under a conventionally ignorable directory.
    pub fn is_ignored_path(&self, path: &str) -> bool {
        let mut segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        // the file name itself is not a directory segment
        segments.pop();
        segments
            .iter()
            .any(|segment| self.ignored_path_segments.iter().any(|ignored| ignored == segment))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_keep_format_ordering() {
        let t = SymbolThresholds::default();
        assert!(t.elf.base < t.macho.base);
        assert_eq!(t.macho.base, t.winpe.base);
        assert!(t.winpe.base < t.rust.base);
        assert_eq!(t.rust.small_file, Some(0.4));
        assert_eq!(t.rust.small_file_cutoff, 20);
        assert_eq!(t.javascript.small_file_cutoff, 30);
        assert!(MatchConfig::default().validate().is_ok());
    }

    #[test]
    fn ignored_paths_check_directory_segments_only() {
        let config = MatchConfig::default();
        assert!(config.is_ignored_path("src/tests/helpers.rs"));
        assert!(config.is_ignored_path("tests/it.rs"));
        assert!(!config.is_ignored_path("src/tests.rs"));
        assert!(!config.is_ignored_path("src/testsuite/a.rs"));
        assert!(!config.is_ignored_path("tests"));
    }

    #[test]
    fn validate_rejects_out_of_range_values() {
        let mut config = MatchConfig::default();
        config.thresholds.macho.base = 1.5;
        match config.validate() {
            Err(ConfigError::Invalid { field, .. }) => assert_eq!(field, "macho_symbols"),
            other => panic!("unexpected result: {:?}", other),
        }

        let mut config = MatchConfig::default();
        config.chunk_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_toon_document_keeps_defaults() {
        let config = MatchConfig::from_toon_str("similarity_threshold: 0.9\nchunk_size: 500\n").unwrap();
        assert_eq!(config.similarity_threshold, 0.9);
        assert_eq!(config.chunk_size, 500);
        assert_eq!(config.thresholds, SymbolThresholds::default());
        assert_eq!(config.ignored_path_segments, vec!["tests".to_string()]);
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toon");
        assert!(matches!(MatchConfig::load(&missing), Err(ConfigError::Io { .. })));

        let present = dir.path().join("match.toon");
        std::fs::write(&present, "chunk_size: 64\n").unwrap();
        assert_eq!(MatchConfig::load(&present).unwrap().chunk_size, 64);
    }
}
