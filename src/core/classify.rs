// symbol match classification
use serde::{Deserialize, Serialize};

use crate::config::MatchConfig;
use crate::core::stats::{self, Overlap};
use crate::core::types::MapType;

/// Why a comparison matched or not, stored on the source resource so
/// operators can audit near-misses.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchStats {
    pub map_type: Option<MapType>,
    pub is_matched: bool,
    pub common_symbols_ratio: f64,
    pub common_symbols_unique_ratio: f64,
    pub source_symbols_count: usize,
    pub common_symbols_count: usize,
    pub common_symbols: Vec<String>,
    pub unmatched_symbols: Vec<String>,
    /// Frequency-profile similarity, only computed for minified formats.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub similarity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_decomposed: Option<bool>,
}

impl MatchStats {
    fn from_overlap(map_type: MapType, overlap: Overlap) -> Self {
        Self {
            map_type: Some(map_type),
            is_matched: false,
            common_symbols_ratio: overlap.token_ratio,
            common_symbols_unique_ratio: overlap.unique_ratio,
            source_symbols_count: overlap.source_count,
            common_symbols_count: overlap.matched_count,
            common_symbols: overlap.matched,
            unmatched_symbols: overlap.unmatched,
            similarity: None,
            is_decomposed: None,
        }
    }
}

/// Verdict of one source/binary symbol comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolMatch {
    pub is_matched: bool,
    pub stats: MatchStats,
}

/// Decide whether `source_symbols` were compiled into `binary_symbols`.
///
/// Native and rust formats compare raw overlap: a match needs either the
/// token ratio or the unique ratio above the format threshold. Javascript
/// compares frequency profiles since minification destroys most names.
pub fn classify<S: AsRef<str>>(
    source_symbols: &[S],
    binary_symbols: &[S],
    map_type: MapType,
    config: &MatchConfig,
) -> SymbolMatch {
    let overlap = stats::set_overlap(source_symbols, binary_symbols);
    let mut verdict = MatchStats::from_overlap(map_type, overlap);
    let threshold = config.thresholds.for_map_type(map_type);

    let is_matched = if source_symbols.is_empty() {
        false
    } else if map_type.uses_distribution() {
        let similarity = stats::similarity(source_symbols, binary_symbols);
        let limit = match threshold.small_file {
            Some(small) if binary_symbols.len() <= threshold.small_file_cutoff => small,
            _ => threshold.base,
        };
        verdict.similarity = Some(similarity);
        verdict.is_decomposed = Some(is_decomposed(binary_symbols, config));
        similarity > limit
    } else {
        let limit = match threshold.small_file {
            Some(small) if verdict.source_symbols_count < threshold.small_file_cutoff => small,
            _ => threshold.base,
        };
        verdict.common_symbols_ratio > limit || verdict.common_symbols_unique_ratio > limit
    };

    verdict.is_matched = is_matched;
    SymbolMatch { is_matched, stats: verdict }
}

/// Heavily minified code keeps few symbols longer than a handful of chars.
///
/// Informational only; it does not gate matching.
pub fn is_decomposed<S: AsRef<str>>(symbols: &[S], config: &MatchConfig) -> bool {
    if symbols.is_empty() {
        return false;
    }
    let long = symbols
        .iter()
        .filter(|s| s.as_ref().chars().count() > config.decomposed_min_length)
        .count();
    (long as f64 / symbols.len() as f64) < config.decomposed_ratio
}

#[cfg(test)]
mod tests {
    use super::*;

    const OVERLAP_TYPES: [MapType; 4] = [
        MapType::RustSymbols,
        MapType::ElfSymbols,
        MapType::MachoSymbols,
        MapType::WinpeSymbols,
    ];

    fn symbols(prefix: &str, n: usize) -> Vec<String> {
        (0..n).map(|i| format!("{prefix}_{i}")).collect()
    }

    #[test]
    fn identical_symbols_match_for_every_overlap_format() {
        let config = MatchConfig::default();
        let s = vec!["alloc_vec", "parse_header", "parse_header", "main"];
        for map_type in OVERLAP_TYPES {
            let m = classify(&s, &s, map_type, &config);
            assert!(m.is_matched, "{map_type} should match identical symbols");
            assert_eq!(m.stats.common_symbols_ratio, 1.0);
            assert!(m.stats.unmatched_symbols.is_empty());
        }
    }

    #[test]
    fn disjoint_symbols_never_match() {
        let config = MatchConfig::default();
        let source = symbols("src", 12);
        let binary = symbols("bin", 12);
        for map_type in MapType::ALL {
            let m = classify(&source, &binary, map_type, &config);
            assert!(!m.is_matched, "{map_type} matched disjoint symbols");
            assert_eq!(m.stats.common_symbols_count, 0);
        }

        let js = classify(&source, &binary, MapType::Javascript, &config);
        assert!(js.stats.similarity.unwrap().abs() < 1e-9);
    }

    #[test]
    fn empty_source_is_a_quiet_non_match() {
        let config = MatchConfig::default();
        let empty: Vec<String> = vec![];
        let m = classify(&empty, &symbols("bin", 3), MapType::RustSymbols, &config);
        assert!(!m.is_matched);
        assert_eq!(m.stats.source_symbols_count, 0);
        assert_eq!(m.stats.common_symbols_ratio, 0.0);
    }

    #[test]
    fn rust_small_files_use_lenient_threshold() {
        let config = MatchConfig::default();

        // 10 source symbols: 4 matched sits exactly on the small-file threshold
        let mut small = symbols("s", 10);
        let binary: Vec<String> = small[..4].to_vec();
        let m = classify(&small, &binary, MapType::RustSymbols, &config);
        assert!(!m.is_matched);

        let binary: Vec<String> = small[..5].to_vec(); // 0.5 > 0.4
        assert!(classify(&small, &binary, MapType::RustSymbols, &config).is_matched);

        // a 45% ratio on a large file is under the base threshold
        small = symbols("l", 40);
        let binary: Vec<String> = small[..18].to_vec();
        let m = classify(&small, &binary, MapType::RustSymbols, &config);
        assert!((m.stats.common_symbols_ratio - 0.45).abs() < 1e-9);
        assert!(!m.is_matched);
    }

    #[test]
    fn unique_ratio_alone_can_match() {
        let config = MatchConfig::default();
        // three matched symbols drowned out by one repeated unmatched symbol
        let mut source = vec!["keep_a".to_string(), "keep_b".to_string(), "keep_c".to_string()];
        source.extend(std::iter::repeat_n("noise".to_string(), 30));
        let binary = vec!["keep_a".to_string(), "keep_b".to_string(), "keep_c".to_string()];

        let m = classify(&source, &binary, MapType::RustSymbols, &config);
        assert!(m.stats.common_symbols_ratio < 0.5);
        assert!((m.stats.common_symbols_unique_ratio - 0.75).abs() < 1e-9);
        assert!(m.is_matched);
    }

    #[test]
    fn elf_matches_on_sparse_overlap() {
        let config = MatchConfig::default();
        let source = symbols("fn", 100);
        let binary: Vec<String> = source[..6].to_vec();

        assert!(classify(&source, &binary, MapType::ElfSymbols, &config).is_matched);
        assert!(!classify(&source, &binary, MapType::MachoSymbols, &config).is_matched);
    }

    #[test]
    fn winpe_threshold_sits_between_elf_and_rust() {
        let config = MatchConfig::default();
        let source = symbols("fn", 100);

        // 15% is exactly on the threshold, 16% is over
        let binary: Vec<String> = source[..15].to_vec();
        assert!(!classify(&source, &binary, MapType::WinpeSymbols, &config).is_matched);
        assert!(classify(&source, &binary, MapType::ElfSymbols, &config).is_matched);

        let binary: Vec<String> = source[..16].to_vec();
        assert!(classify(&source, &binary, MapType::WinpeSymbols, &config).is_matched);
        assert!(!classify(&source, &binary, MapType::RustSymbols, &config).is_matched);
    }

    #[test]
    fn javascript_small_files_use_lenient_threshold() {
        let config = MatchConfig::default();

        // 80% shared plus 20% foreign on both sides gives similarity 1 - sqrt(0.2) ~ 0.553
        let source = symbols("handler", 10);
        let mut deployed: Vec<String> = source[..8].to_vec();
        deployed.extend(symbols("x", 2));
        let m = classify(&source, &deployed, MapType::Javascript, &config);
        let similarity = m.stats.similarity.unwrap();
        assert!(similarity > 0.5 && similarity < 0.7);
        assert!(m.is_matched);

        // same profile at 40 deployed symbols falls back to the base threshold
        let source = symbols("handler", 40);
        let mut deployed: Vec<String> = source[..32].to_vec();
        deployed.extend(symbols("x", 8));
        let m = classify(&source, &deployed, MapType::Javascript, &config);
        assert!((m.stats.similarity.unwrap() - similarity).abs() < 1e-9);
        assert!(!m.is_matched);
    }

    #[test]
    fn thresholds_come_from_config() {
        let mut config = MatchConfig::default();
        let source = symbols("fn", 100);
        let binary: Vec<String> = source[..6].to_vec();

        config.thresholds.elf.base = 0.1;
        assert!(!classify(&source, &binary, MapType::ElfSymbols, &config).is_matched);
    }

    #[test]
    fn javascript_uses_profile_similarity() {
        let config = MatchConfig::default();
        let source = symbols("handler", 40);
        let mut deployed = source.clone();
        deployed.truncate(38);
        deployed.extend(symbols("x", 2));

        let m = classify(&source, &deployed, MapType::Javascript, &config);
        let similarity = m.stats.similarity.unwrap();
        assert!(similarity > 0.7 && similarity < 1.0);
        assert!(m.is_matched);
        assert_eq!(m.stats.is_decomposed, Some(false));
    }

    #[test]
    fn decomposed_detects_minified_names() {
        let config = MatchConfig::default();
        assert!(is_decomposed(&["a", "b", "cd", "e", "render"], &config));
        assert!(!is_decomposed(&["render", "update", "a"], &config));
        assert!(!is_decomposed::<&str>(&[], &config));
    }
}
