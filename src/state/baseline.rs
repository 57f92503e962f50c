//! Harvest baseline computed once from the job store
//!
//! The baseline answers the two questions the harvest asks about every new
//! listing: has this identifier been stored before, and is this posting
//! older than what the store already covers.
use chrono::{Duration, NaiveDateTime};
use std::collections::HashSet;

/// Identifiers already present in the job store
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KnownIds {
    ids: HashSet<String>,
}

impl KnownIds {
    /// Creates an empty identifier set
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the identifier is already stored
    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Records an identifier, returning false if it was already known
    pub fn insert(&mut self, id: impl Into<String>) -> bool {
        self.ids.insert(id.into())
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for KnownIds {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// Starting point of a harvest
#[derive(Debug, Clone)]
pub struct Baseline {
    /// Identifiers already stored
    pub known_ids: KnownIds,

    /// Newest `posted_on` in the store, if any row had a readable date
    pub newest_posted: Option<NaiveDateTime>,

    /// Slack subtracted from the newest date to absorb day-boundary skew
    pub slack: Duration,
}

impl Baseline {
    /// Creates a baseline from stored identifiers and the newest stored date
    pub fn new(known_ids: KnownIds, newest_posted: Option<NaiveDateTime>, slack_days: u32) -> Self {
        Self {
            known_ids,
            newest_posted,
            slack: Duration::days(i64::from(slack_days)),
        }
    }

    /// The cut-off date: the newest stored date minus the slack
    pub fn last_known_newest(&self) -> Option<NaiveDateTime> {
        self.newest_posted.map(|newest| newest - self.slack)
    }

    /// Returns true if a posting at this date is already covered by the store
    ///
    /// A posting dated at or before the cut-off is stale. Without a cut-off
    /// nothing is stale.
    pub fn is_stale(&self, posted_on: NaiveDateTime) -> bool {
        self.last_known_newest()
            .map(|cutoff| posted_on <= cutoff)
            .unwrap_or(false)
    }
}
