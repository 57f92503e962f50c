//! Job record types
//!
//! This module defines the data harvested from one listing entry and the
//! derived views the dashboard works with:
//! - `JobRecord`: one stored job posting
//! - `CareerStage`: the fixed R1-R4 researcher profile codes
//! - `FieldSplit`: the two-level research field taxonomy
//! - Lenient date parsing for the free-text dates the listing renders

mod dates;
mod taxonomy;

pub use dates::{
    format_deadline, format_posted_on, parse_deadline, parse_fuzzy_datetime, DateParseError,
};
pub use taxonomy::{split_field, FieldSplit, TAXONOMY_SEPARATOR};

use chrono::NaiveDateTime;
use std::fmt;
use std::str::FromStr;

/// One job posting as stored in the job store
///
/// `id` is the last path segment of the posting's detail link and is unique
/// within the store. Every other free-text attribute is optional: a field the
/// listing did not render is `None`, never an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRecord {
    pub id: String,
    pub job_type: Option<String>,
    pub country: Option<String>,
    pub university: Option<String>,
    pub posted_on: NaiveDateTime,
    pub title: Option<String>,
    pub link: Option<String>,
    pub description: Option<String>,
    pub department: Option<String>,
    pub location: Option<String>,
    /// Raw `;`-delimited taxonomy string, see [`split_field`]
    pub field: Option<String>,
    /// Raw `;`-delimited researcher profiles, see [`CareerStage`]
    pub profile: Option<String>,
    pub funding_program: Option<String>,
    pub application_deadline: Option<NaiveDateTime>,
}

impl JobRecord {
    /// Creates a record with only its key and posting date set
    pub fn new(id: impl Into<String>, posted_on: NaiveDateTime) -> Self {
        Self {
            id: id.into(),
            job_type: None,
            country: None,
            university: None,
            posted_on,
            title: None,
            link: None,
            description: None,
            department: None,
            location: None,
            field: None,
            profile: None,
            funding_program: None,
            application_deadline: None,
        }
    }

    /// Returns true if the application deadline has passed
    ///
    /// Records without a deadline never expire.
    pub fn is_expired(&self, now: NaiveDateTime) -> bool {
        self.application_deadline
            .map(|deadline| deadline < now)
            .unwrap_or(false)
    }

    /// Career stages mentioned in the profile text
    pub fn career_stages(&self) -> Vec<CareerStage> {
        let profile = self.profile.as_deref().unwrap_or("");
        CareerStage::ALL
            .into_iter()
            .filter(|stage| stage.matches(profile))
            .collect()
    }

    /// Splits the raw field string into main and sub categories
    pub fn field_split(&self) -> FieldSplit {
        self.field.as_deref().map(split_field).unwrap_or_default()
    }
}

/// Researcher career stage codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CareerStage {
    /// First Stage Researcher
    R1,
    /// Recognised Researcher
    R2,
    /// Established Researcher
    R3,
    /// Leading Researcher
    R4,
}

impl CareerStage {
    /// All stages, in seniority order
    pub const ALL: [CareerStage; 4] = [Self::R1, Self::R2, Self::R3, Self::R4];

    /// The short code used in profile text
    pub fn code(&self) -> &'static str {
        match self {
            Self::R1 => "R1",
            Self::R2 => "R2",
            Self::R3 => "R3",
            Self::R4 => "R4",
        }
    }

    /// Returns true if the profile text mentions this stage (case-insensitive)
    pub fn matches(&self, profile: &str) -> bool {
        profile.to_ascii_uppercase().contains(self.code())
    }
}

impl fmt::Display for CareerStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for CareerStage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "R1" => Ok(Self::R1),
            "R2" => Ok(Self::R2),
            "R3" => Ok(Self::R3),
            "R4" => Ok(Self::R4),
            other => Err(format!("unknown career stage '{}', expected R1-R4", other)),
        }
    }
}
