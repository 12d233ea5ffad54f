//! Outcomes and tie-break policy shared by the person and film resolvers.

use log::{info, warn};

use crate::reference::ReferenceEntry;

/// What to do when more than one reference entry survives disambiguation.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum AmbiguityPolicy {
    /// Take the candidate that came first in the reference file.
    #[default]
    FirstEncountered,
    /// Leave the mention unresolved.
    Skip,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unresolved {
    /// Nothing in the index has this key.
    NoCandidate,
    /// The key exists but no candidate has the requested year.
    NoYearMatch,
    /// This many candidates remained and the policy refused to pick.
    Ambiguous(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchResult {
    Resolved { display: String, id: String },
    Unresolved(Unresolved),
}

impl MatchResult {
    pub fn is_resolved(&self) -> bool {
        matches!(self, MatchResult::Resolved { .. })
    }
}

impl AmbiguityPolicy {
    /// Pick one of `candidates`, which must already be in reference-file order.
    pub fn choose<'a, I>(self, candidates: I) -> MatchResult
    where
        I: IntoIterator<Item = &'a ReferenceEntry>,
    {
        let mut candidates = candidates.into_iter();
        let Some(first) = candidates.next() else {
            return MatchResult::Unresolved(Unresolved::NoCandidate);
        };
        let others = candidates.count();

        if others > 0 && self == AmbiguityPolicy::Skip {
            return MatchResult::Unresolved(Unresolved::Ambiguous(others + 1));
        }
        MatchResult::Resolved {
            display: first.name.clone(),
            id: first.id.clone(),
        }
    }
}

/// One output row: display name or title and its identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRow {
    pub display: String,
    pub id: String,
}

/// The result of one resolver run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Resolved rows, ordered by normalized key.
    pub rows: Vec<ResolvedRow>,
    /// Unique mentions looked up.
    pub mentions: usize,
    pub no_candidate: usize,
    pub no_year_match: usize,
    pub ambiguous: usize,
}

impl Resolution {
    pub(crate) fn record_miss(&mut self, reason: Unresolved) {
        match reason {
            Unresolved::NoCandidate => self.no_candidate += 1,
            Unresolved::NoYearMatch => self.no_year_match += 1,
            Unresolved::Ambiguous(_) => self.ambiguous += 1,
        }
    }

    pub fn unresolved(&self) -> usize {
        self.no_candidate + self.no_year_match + self.ambiguous
    }

    pub fn log_summary(&self, what: &str) {
        info!("Found IDs for {} of {} unique {what}.", self.rows.len(), self.mentions);
        if self.unresolved() > 0 {
            warn!(
                "Could not resolve {} {what}: {} without candidates, {} without a year match, {} ambiguous.",
                self.unresolved(),
                self.no_candidate,
                self.no_year_match,
                self.ambiguous
            );
        }
    }
}
