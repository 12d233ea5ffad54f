use std::collections::BTreeSet;

use log::debug;

use crate::index::NormalizedIndex;
use crate::normalize::normalize_key;
use crate::resolve::{AmbiguityPolicy, MatchResult, Resolution, ResolvedRow, Unresolved};
use crate::song::SongRecord;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FilmPolicy {
    /// Applied when several candidates share the title (and year, if given).
    pub ambiguity: AmbiguityPolicy,
    /// Whether a song without a year may resolve to one of several same-title
    /// candidates. Off by default.
    pub yearless_fallback: bool,
}

/// Every distinct `(normalized title, year)` pair mentioned by `songs`.
///
/// The set orders a missing year before any year.
pub fn film_mentions(songs: &[SongRecord]) -> BTreeSet<(String, Option<i32>)> {
    songs
        .iter()
        .filter_map(|song| {
            let key = normalize_key(song.film.as_deref()?);
            (!key.is_empty()).then_some((key, song.year))
        })
        .collect()
}

/// Matches film titles against a `title.basics` index, using the year to
/// pick between same-title candidates.
pub struct FilmResolver<'a> {
    index: &'a NormalizedIndex,
    policy: FilmPolicy,
}

impl<'a> FilmResolver<'a> {
    pub fn new(index: &'a NormalizedIndex, policy: FilmPolicy) -> Self {
        FilmResolver { index, policy }
    }

    pub fn resolve_film(&self, title: &str, year: Option<i32>) -> MatchResult {
        self.resolve_key(&normalize_key(title), year)
    }

    fn resolve_key(&self, key: &str, year: Option<i32>) -> MatchResult {
        let candidates = self.index.candidates(key);
        if candidates.is_empty() {
            return MatchResult::Unresolved(Unresolved::NoCandidate);
        }

        match year {
            Some(year) => {
                let mut same_year = candidates.iter().filter(|e| e.year == Some(year)).peekable();
                if same_year.peek().is_none() {
                    return MatchResult::Unresolved(Unresolved::NoYearMatch);
                }
                self.policy.ambiguity.choose(same_year)
            }
            None if candidates.len() == 1 || self.policy.yearless_fallback => {
                self.policy.ambiguity.choose(candidates)
            }
            None => MatchResult::Unresolved(Unresolved::Ambiguous(candidates.len())),
        }
    }

    /// One row per distinct resolved title, sorted by normalized key.
    ///
    /// When the same title is mentioned with several years, the first
    /// mention (in year order) that resolves supplies the row.
    pub fn resolve(&self, songs: &[SongRecord]) -> Resolution {
        let mut resolution = Resolution::default();
        let mut emitted: Option<String> = None;

        for (key, year) in film_mentions(songs) {
            resolution.mentions += 1;
            match self.resolve_key(&key, year) {
                MatchResult::Resolved { display, id } => {
                    if emitted.as_deref() == Some(key.as_str()) {
                        debug!("{display} ({year:?}) -> {id} dropped, title already mapped");
                        continue;
                    }
                    resolution.rows.push(ResolvedRow { display, id });
                    emitted = Some(key);
                }
                MatchResult::Unresolved(reason) => resolution.record_miss(reason),
            }
        }

        resolution
    }
}
