use std::collections::BTreeSet;

use crate::index::NormalizedIndex;
use crate::normalize::normalize_key;
use crate::resolve::{AmbiguityPolicy, MatchResult, Resolution, ResolvedRow};
use crate::song::SongRecord;

/// Every distinct normalized person key mentioned by `songs`.
pub fn person_keys(songs: &[SongRecord]) -> BTreeSet<String> {
    songs
        .iter()
        .flat_map(|song| song.people.iter())
        .map(|name| normalize_key(name))
        .filter(|key| !key.is_empty())
        .collect()
}

/// Matches people mentions against a `name.basics` index.
pub struct PersonResolver<'a> {
    index: &'a NormalizedIndex,
    policy: AmbiguityPolicy,
}

impl<'a> PersonResolver<'a> {
    pub fn new(index: &'a NormalizedIndex, policy: AmbiguityPolicy) -> Self {
        PersonResolver { index, policy }
    }

    pub fn resolve_name(&self, raw: &str) -> MatchResult {
        self.policy.choose(self.index.lookup(raw))
    }

    /// One row per distinct resolved name, sorted by normalized key.
    pub fn resolve(&self, songs: &[SongRecord]) -> Resolution {
        let mut resolution = Resolution::default();

        for key in person_keys(songs) {
            resolution.mentions += 1;
            match self.policy.choose(self.index.candidates(&key)) {
                MatchResult::Resolved { display, id } => {
                    resolution.rows.push(ResolvedRow { display, id })
                }
                MatchResult::Unresolved(reason) => resolution.record_miss(reason),
            }
        }

        resolution
    }
}
