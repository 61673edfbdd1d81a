// ipsift - core/delimiter.rs
//
// Delimiter inference: pick the field separator of an unstructured line
// corpus by scoring candidates on consistency x cardinality.

use crate::core::model::DelimiterCandidate;
use crate::util::constants;

/// Split `line` on `delimiter`, trim each field and drop empty fields.
pub fn split_fields<'a>(line: &'a str, delimiter: &str) -> Vec<&'a str> {
    line.split(delimiter)
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .collect()
}

/// Score one separator against every line.
///
/// The field count of the first line containing the separator is the
/// reference. The first line that disagrees disqualifies the candidate and
/// scanning stops there.
pub fn score_candidate<S: AsRef<str>>(lines: &[S], delimiter: &'static str) -> DelimiterCandidate {
    let mut candidate = DelimiterCandidate {
        delimiter,
        consistent: true,
        field_count: None,
        occurrences: 0,
    };

    for line in lines {
        let line = line.as_ref();
        if !line.contains(delimiter) {
            continue;
        }
        let count = split_fields(line, delimiter).len();
        match candidate.field_count {
            None => candidate.field_count = Some(count),
            Some(expected) if expected != count => {
                candidate.consistent = false;
                break;
            }
            Some(_) => {}
        }
        candidate.occurrences += 1;
    }

    candidate
}

/// Pick the best separator from `candidates` for `lines`.
///
/// Returns `None` when no candidate is eligible; that is the signal to fall
/// back to record extraction rather than an error. Ties go to the candidate
/// listed first.
pub fn infer_delimiter_from<S: AsRef<str>>(
    lines: &[S],
    candidates: &[&'static str],
) -> Option<DelimiterCandidate> {
    let mut best: Option<(usize, DelimiterCandidate)> = None;

    for &delimiter in candidates {
        let candidate = score_candidate(lines, delimiter);
        tracing::trace!(
            delimiter = ?delimiter,
            consistent = candidate.consistent,
            field_count = ?candidate.field_count,
            occurrences = candidate.occurrences,
            "Delimiter candidate scored"
        );
        if let Some(score) = candidate.score() {
            if best.as_ref().map_or(true, |(s, _)| score > *s) {
                best = Some((score, candidate));
            }
        }
    }

    match &best {
        Some((score, c)) => tracing::debug!(
            delimiter = ?c.delimiter,
            field_count = ?c.field_count,
            score,
            "Delimiter selected"
        ),
        None => tracing::debug!(lines = lines.len(), "No consistent delimiter found"),
    }

    best.map(|(_, c)| c)
}

/// Pick the best separator from the default candidate set.
pub fn infer_delimiter<S: AsRef<str>>(lines: &[S]) -> Option<DelimiterCandidate> {
    infer_delimiter_from(lines, constants::DELIMITER_CANDIDATES)
}
