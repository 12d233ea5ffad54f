use std::collections::HashMap;

use log::debug;

use crate::normalize::normalize_key;
use crate::reference::ReferenceEntry;

/// Normalized key → every reference entry with that key, in file order.
///
/// Buckets keep all candidates so the resolvers can disambiguate later;
/// only an exact repeat of an identifier within a bucket is dropped.
#[derive(Debug, Default, Clone)]
pub struct NormalizedIndex {
    buckets: HashMap<String, Vec<ReferenceEntry>>,
    entries: usize,
}

impl NormalizedIndex {
    pub fn build<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = ReferenceEntry>,
    {
        Self::build_filtered(entries, |_| true)
    }

    /// Like [`build`](Self::build), but only keys accepted by `keep` are stored.
    pub fn build_filtered<I, F>(entries: I, mut keep: F) -> Self
    where
        I: IntoIterator<Item = ReferenceEntry>,
        F: FnMut(&str) -> bool,
    {
        let mut index = NormalizedIndex::default();
        for entry in entries {
            let key = normalize_key(&entry.name);
            if key.is_empty() || !keep(key.as_str()) {
                continue;
            }
            index.insert(key, entry);
        }
        index
    }

    fn insert(&mut self, key: String, entry: ReferenceEntry) {
        let bucket = self.buckets.entry(key).or_default();
        if bucket.iter().any(|e| e.id == entry.id) {
            debug!("duplicate identifier {} for {:?}, keeping the first", entry.id, entry.name);
            return;
        }
        bucket.push(entry);
        self.entries += 1;
    }

    /// Candidates for an already-normalized key.
    pub fn candidates(&self, key: &str) -> &[ReferenceEntry] {
        self.buckets.get(key).map(Vec::as_slice).unwrap_or_default()
    }

    /// Candidates for a raw name or title.
    pub fn lookup(&self, raw: &str) -> &[ReferenceEntry] {
        self.candidates(&normalize_key(raw))
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Number of entries across all buckets.
    pub fn entry_count(&self) -> usize {
        self.entries
    }
}

impl FromIterator<ReferenceEntry> for NormalizedIndex {
    fn from_iter<T: IntoIterator<Item = ReferenceEntry>>(iter: T) -> Self {
        Self::build(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, name: &str, year: Option<i32>) -> ReferenceEntry {
        ReferenceEntry::new(id, name, year)
    }

    #[test]
    fn test_colliding_keys_keep_all_candidates() {
        let index = NormalizedIndex::build(vec![
            entry("nm1", "Ravi", None),
            entry("nm2", "RAVI", None),
            entry("nm3", "Lata Mangeshkar", None),
        ]);
        let ids: Vec<_> = index.lookup("ravi").iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["nm1", "nm2"]);
        assert_eq!(index.len(), 2);
        assert_eq!(index.entry_count(), 3);
    }

    #[test]
    fn test_titles_across_years() {
        let index: NormalizedIndex = vec![
            entry("tt1", "Devdas", Some(1955)),
            entry("tt2", "Devdas", Some(2002)),
        ]
        .into_iter()
        .collect();
        let years: Vec<_> = index.candidates("devdas").iter().map(|e| e.year).collect();
        assert_eq!(years, vec![Some(1955), Some(2002)]);
    }

    #[test]
    fn test_repeated_identifier_dropped() {
        let index = NormalizedIndex::build(vec![
            entry("tt1", "Sholay", Some(1975)),
            entry("tt1", "SHOLAY", Some(1975)),
        ]);
        assert_eq!(index.candidates("sholay").len(), 1);
        assert_eq!(index.candidates("sholay")[0].name, "Sholay");
    }

    #[test]
    fn test_filtered_build() {
        let index = NormalizedIndex::build_filtered(
            vec![entry("nm1", "Lata Mangeshkar", None), entry("nm2", "Asha Bhosle", None)],
            |key| key == "asha bhosle",
        );
        assert!(index.lookup("Lata Mangeshkar").is_empty());
        assert_eq!(index.lookup("asha  BHOSLE")[0].id, "nm2");
    }

    #[test]
    fn test_blank_names_not_indexed() {
        let index = NormalizedIndex::build(vec![entry("nm1", "...", None)]);
        assert!(index.is_empty());
        assert!(index.lookup("").is_empty());
    }
}
