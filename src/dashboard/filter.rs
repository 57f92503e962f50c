//! Row filtering
//!
//! Every criterion left empty matches all rows. Criteria combine with AND;
//! the values inside one multi-select criterion combine with OR.

use crate::dashboard::JobRow;
use crate::favorites::FavoriteSet;
use crate::record::CareerStage;
use chrono::{Duration, NaiveDate, NaiveDateTime};
use std::fmt;
use std::str::FromStr;

/// Application deadline windows offered by the advanced filters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeadlineWindow {
    /// Deadline within the next 30 days
    WithinMonth,
    /// Deadline within the next 90 days
    WithinQuarter,
    /// No deadline given
    NoDeadline,
}

impl DeadlineWindow {
    fn matches(&self, deadline: Option<NaiveDateTime>, now: NaiveDateTime) -> bool {
        let within = |days: i64| {
            deadline
                .map(|deadline| deadline >= now && deadline <= now + Duration::days(days))
                .unwrap_or(false)
        };

        match self {
            Self::WithinMonth => within(30),
            Self::WithinQuarter => within(90),
            Self::NoDeadline => deadline.is_none(),
        }
    }
}

impl FromStr for DeadlineWindow {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "within-month" | "month" => Ok(Self::WithinMonth),
            "within-quarter" | "quarter" => Ok(Self::WithinQuarter),
            "none" | "no-deadline" => Ok(Self::NoDeadline),
            other => Err(format!(
                "unknown deadline window '{}', expected within-month, within-quarter or none",
                other
            )),
        }
    }
}

impl fmt::Display for DeadlineWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::WithinMonth => "within-month",
            Self::WithinQuarter => "within-quarter",
            Self::NoDeadline => "none",
        })
    }
}

/// Selected dashboard filters
#[derive(Debug, Clone, Default)]
pub struct JobFilter {
    /// Countries, matched exactly
    pub countries: Vec<String>,

    /// Career stages, any of which must appear in the profile
    pub profiles: Vec<CareerStage>,

    /// Main fields, matched case-insensitively against the split field
    pub fields: Vec<String>,

    /// Sub-fields, matched case-insensitively against the split field
    pub sub_fields: Vec<String>,

    /// Keep only favourite rows
    pub favorites_only: bool,

    /// Case-insensitive substring of the title or description
    pub search_term: Option<String>,

    /// Funding programmes, matched exactly
    pub funding_programs: Vec<String>,

    pub deadline_window: Option<DeadlineWindow>,

    /// Inclusive lower bound on the posting date
    pub posted_from: Option<NaiveDate>,

    /// Inclusive upper bound on the posting date
    pub posted_to: Option<NaiveDate>,
}

impl JobFilter {
    /// Returns true if no criterion is set
    pub fn is_empty(&self) -> bool {
        self.countries.is_empty()
            && self.profiles.is_empty()
            && self.fields.is_empty()
            && self.sub_fields.is_empty()
            && !self.favorites_only
            && self.search_term.as_deref().map_or(true, str::is_empty)
            && self.funding_programs.is_empty()
            && self.deadline_window.is_none()
            && self.posted_from.is_none()
            && self.posted_to.is_none()
    }

    /// Returns the rows that pass every criterion, in input order
    ///
    /// # Arguments
    ///
    /// * `rows` - The loaded dashboard rows
    /// * `favorites` - Current favourites, used by `favorites_only`
    /// * `now` - Reference time for the deadline window
    pub fn apply<'a>(
        &self,
        rows: &'a [JobRow],
        favorites: &FavoriteSet,
        now: NaiveDateTime,
    ) -> Vec<&'a JobRow> {
        let fields = lowercase_all(&self.fields);
        let sub_fields = lowercase_all(&self.sub_fields);
        let search = self
            .search_term
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty())
            .map(str::to_lowercase);

        let filtered: Vec<&JobRow> = rows
            .iter()
            .filter(|row| {
                self.countries.is_empty()
                    || row
                        .record
                        .country
                        .as_ref()
                        .map_or(false, |country| self.countries.contains(country))
            })
            .filter(|row| {
                self.profiles.is_empty()
                    || self.profiles.iter().any(|stage| row.has_stage(*stage))
            })
            .filter(|row| fields.is_empty() || any_member(&row.fields.main, &fields))
            .filter(|row| sub_fields.is_empty() || any_member(&row.fields.sub, &sub_fields))
            .filter(|row| !self.favorites_only || favorites.contains(row.id()))
            .filter(|row| {
                search.as_deref().map_or(true, |term| {
                    contains_lower(&row.record.title, term)
                        || contains_lower(&row.record.description, term)
                })
            })
            .filter(|row| {
                self.funding_programs.is_empty()
                    || row
                        .record
                        .funding_program
                        .as_ref()
                        .map_or(false, |program| self.funding_programs.contains(program))
            })
            .filter(|row| {
                self.deadline_window
                    .map_or(true, |window| window.matches(row.record.application_deadline, now))
            })
            .filter(|row| {
                let posted = row.record.posted_on.date();
                self.posted_from.map_or(true, |from| posted >= from)
                    && self.posted_to.map_or(true, |to| posted <= to)
            })
            .collect();

        tracing::debug!("Filter kept {} of {} rows", filtered.len(), rows.len());
        filtered
    }
}

fn lowercase_all(values: &[String]) -> Vec<String> {
    values.iter().map(|value| value.trim().to_lowercase()).collect()
}

fn any_member<'a, I>(categories: I, wanted: &[String]) -> bool
where
    I: IntoIterator<Item = &'a String>,
{
    categories
        .into_iter()
        .any(|category| wanted.contains(&category.to_lowercase()))
}

fn contains_lower(text: &Option<String>, term: &str) -> bool {
    text.as_deref()
        .map_or(false, |text| text.to_lowercase().contains(term))
}
