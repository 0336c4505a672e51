// user-supplied path pattern propagation
use regex::Regex;

use crate::core::relation::Relation;
use crate::core::repository::{ResourceQuery, ResourceRepository};
use crate::core::types::Confidence;
use crate::logging::Logger;
use crate::mapping::generator::{Candidate, MatchKind, PropagationError};

/// Translate a glob into an anchored regex: `*` is any run, `?` any one char.
pub fn glob_to_regex(glob: &str) -> String {
    let mut out = String::with_capacity(glob.len() + 8);
    out.push('^');
    for ch in glob.chars() {
        match ch {
            '*' => out.push_str(".*"),
            '?' => out.push('.'),
            other => out.push_str(&regex::escape(other.encode_utf8(&mut [0; 4]))),
        }
    }
    out.push('$');
    out
}

/// Compile `pattern` as a regex, or as a glob when it is not a valid regex.
pub fn compile_pattern(pattern: &str) -> Result<Regex, regex::Error> {
    match Regex::new(pattern) {
        Ok(regex) => Ok(regex),
        Err(e) => {
            tracing::debug!(pattern, error = %e, "not a regex, reading as glob");
            Regex::new(&glob_to_regex(pattern))
        }
    }
}

pub fn pattern_candidates<R: ResourceRepository + ?Sized>(
    repo: &R,
    seed: Option<&Relation>,
    pattern: &str,
    logger: Logger<'_>,
) -> Result<Vec<Candidate>, PropagationError> {
    let regex = compile_pattern(pattern)?;

    let mut selection = ResourceQuery::to_files().unmapped().path_matching(regex);
    if let Some(seed) = seed {
        selection = selection.excluding([seed.to_resource]);
    }

    let mut candidates = Vec::new();
    for to_id in repo.query_all(&selection) {
        let name = repo.resource(to_id)?.name.clone();
        for from_id in repo.query_all(&ResourceQuery::from_files().named(name)) {
            candidates.push(Candidate::new(to_id, from_id, MatchKind::Name, Confidence::Medium));
        }
    }

    if candidates.is_empty() {
        logger.log(&format!("No pattern mappings for {pattern:?}"));
    }
    Ok(candidates)
}
