// symbol set overlap and frequency-profile divergence
use std::collections::{BTreeSet, HashMap, HashSet};

/// Overlap of source symbols with binary symbols.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Overlap {
    /// Source symbols also present in the binary, sorted and unique.
    pub matched: Vec<String>,
    /// Source symbols missing from the binary, sorted and unique.
    pub unmatched: Vec<String>,
    /// Total source symbols, counting repeats.
    pub source_count: usize,
    pub source_unique_count: usize,
    /// Source occurrences of matched symbols, counting repeats.
    pub matched_count: usize,
    pub matched_unique_count: usize,
    /// `matched_count / source_count`
    pub token_ratio: f64,
    /// `matched_unique_count / source_unique_count`
    pub unique_ratio: f64,
}

/// Compare source symbols against binary symbols.
///
/// An empty source yields zero counts and zero ratios.
pub fn set_overlap<S: AsRef<str>>(source_symbols: &[S], binary_symbols: &[S]) -> Overlap {
    if source_symbols.is_empty() {
        return Overlap::default();
    }

    let binary: HashSet<&str> = binary_symbols.iter().map(|s| s.as_ref()).collect();

    let mut multiplicity: HashMap<&str, usize> = HashMap::new();
    for symbol in source_symbols {
        *multiplicity.entry(symbol.as_ref()).or_insert(0) += 1;
    }

    let unique: BTreeSet<&str> = multiplicity.keys().copied().collect();
    let (matched, unmatched): (Vec<&str>, Vec<&str>) = unique.iter().copied().partition(|s| binary.contains(s));

    let matched_count: usize = matched.iter().map(|s| multiplicity[s]).sum();
    let source_count = source_symbols.len();

    Overlap {
        source_count,
        source_unique_count: unique.len(),
        matched_count,
        matched_unique_count: matched.len(),
        token_ratio: matched_count as f64 / source_count as f64,
        unique_ratio: matched.len() as f64 / unique.len() as f64,
        matched: matched.into_iter().map(str::to_string).collect(),
        unmatched: unmatched.into_iter().map(str::to_string).collect(),
    }
}

/// Sorted union of the unique symbols of both sides.
pub fn universe<S: AsRef<str>>(left: &[S], right: &[S]) -> Vec<String> {
    left.iter()
        .chain(right.iter())
        .map(|s| s.as_ref())
        .collect::<BTreeSet<&str>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Relative frequency of each `universe` entry within `symbols`.
pub fn probability_distribution<S: AsRef<str>>(symbols: &[S], universe: &[String]) -> Vec<f64> {
    if symbols.is_empty() {
        return vec![0.0; universe.len()];
    }

    let mut counts: HashMap<&str, usize> = HashMap::new();
    for symbol in symbols {
        *counts.entry(symbol.as_ref()).or_insert(0) += 1;
    }

    let total = symbols.len() as f64;
    universe
        .iter()
        .map(|u| counts.get(u.as_str()).map_or(0.0, |&c| c as f64 / total))
        .collect()
}

/// Jensen-Shannon distance between two distributions of equal length.
///
/// Uses base-2 logarithms, so the result lies in `[0, 1]`: 0 for identical
/// distributions, 1 for disjoint ones. Terms are only taken where the
/// numerator is positive.
pub fn divergence(p: &[f64], q: &[f64]) -> f64 {
    debug_assert_eq!(p.len(), q.len(), "distributions must share a universe");

    let mut sum_p = 0.0;
    let mut sum_q = 0.0;
    for (&pi, &qi) in p.iter().zip(q) {
        let mi = (pi + qi) / 2.0;
        if pi > 0.0 {
            sum_p += pi * (pi / mi).log2();
        }
        if qi > 0.0 {
            sum_q += qi * (qi / mi).log2();
        }
    }

    // rounding can push tiny results below zero
    ((sum_p + sum_q) / 2.0).max(0.0).sqrt()
}

/// `1 - divergence` of the symbol frequency profiles.
pub fn similarity<S: AsRef<str>>(source_symbols: &[S], deployed_symbols: &[S]) -> f64 {
    let universe = universe(source_symbols, deployed_symbols);
    let p = probability_distribution(source_symbols, &universe);
    let q = probability_distribution(deployed_symbols, &universe);
    1.0 - divergence(&p, &q)
}
