// ipsift - core/dedup.rs
//
// Dedup/sort pipeline. A `RecordSet` is created per run and threaded through
// the extraction calls explicitly; nothing is shared between runs.

use crate::core::model::SortKey;
use std::cmp::Ordering;
use std::collections::HashSet;

/// Insertion-ordered set of extracted records.
#[derive(Debug, Default)]
pub struct RecordSet {
    seen: HashSet<String>,
    records: Vec<String>,
}

impl RecordSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `record` unless its exact string was already seen. Empty
    /// records are refused. Returns whether the record was added.
    pub fn insert(&mut self, record: String) -> bool {
        if record.is_empty() || self.seen.contains(&record) {
            return false;
        }
        self.seen.insert(record.clone());
        self.records.push(record);
        true
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in first-seen order.
    pub fn as_slice(&self) -> &[String] {
        &self.records
    }

    /// Consume the set and return its records in byte-wise lexicographic order.
    pub fn into_sorted(self) -> Vec<String> {
        let mut records = self.records;
        records.sort();
        records
    }
}

impl Extend<String> for RecordSet {
    fn extend<T: IntoIterator<Item = String>>(&mut self, iter: T) {
        for record in iter {
            self.insert(record);
        }
    }
}

/// Deduplicate (first occurrence wins) and sort byte-wise.
pub fn dedup_and_sort<I>(records: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut set = RecordSet::new();
    set.extend(records);
    set.into_sorted()
}

/// A record paired with the column value it should be ordered by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyedRecord {
    pub output: String,
    pub key: SortKey,
}

/// Order keyed records by their sort key, ties broken by output string.
///
/// When any two keys cannot be compared (integers mixed with text) the
/// whole sequence is ordered by output string instead. With `dedupe` set,
/// only the first occurrence of each output string is kept.
pub fn dedup_and_sort_keyed<I>(records: I, dedupe: bool) -> Vec<String>
where
    I: IntoIterator<Item = KeyedRecord>,
{
    let mut seen: HashSet<String> = HashSet::new();
    let mut kept: Vec<KeyedRecord> = Vec::new();
    for record in records {
        if record.output.is_empty() {
            continue;
        }
        if dedupe && !seen.insert(record.output.clone()) {
            continue;
        }
        kept.push(record);
    }

    let comparable = match kept.first() {
        Some(first) => kept.iter().all(|r| first.key.partial_cmp(&r.key).is_some()),
        None => true,
    };

    if comparable {
        kept.sort_by(|a, b| {
            a.key
                .partial_cmp(&b.key)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.output.cmp(&b.output))
        });
    } else {
        tracing::warn!("Sort column mixes numbers and text; ordering by output instead");
        kept.sort_by(|a, b| a.output.cmp(&b.output));
    }

    kept.into_iter().map(|r| r.output).collect()
}
