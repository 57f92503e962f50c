//! Summary metrics shown above the job table

use crate::dashboard::JobRow;
use chrono::{Duration, NaiveDateTime};
use std::collections::HashSet;

/// Dashboard headline metrics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DashboardStats {
    /// Number of rows
    pub total_jobs: usize,

    /// Distinct non-empty countries
    pub countries: usize,

    /// Distinct non-empty universities
    pub universities: usize,

    /// Rows posted within the last seven days
    pub new_this_week: usize,
}

impl DashboardStats {
    /// Computes the metrics over any slice of rows
    pub fn compute<'a, I>(rows: I, now: NaiveDateTime) -> Self
    where
        I: IntoIterator<Item = &'a JobRow>,
    {
        let week_ago = now - Duration::days(7);
        let mut countries = HashSet::new();
        let mut universities = HashSet::new();
        let mut stats = Self::default();

        for row in rows {
            stats.total_jobs += 1;
            if let Some(country) = &row.record.country {
                countries.insert(country.as_str());
            }
            if let Some(university) = &row.record.university {
                universities.insert(university.as_str());
            }
            if row.record.posted_on >= week_ago {
                stats.new_this_week += 1;
            }
        }

        stats.countries = countries.len();
        stats.universities = universities.len();
        stats
    }

    /// Prints the metrics to stdout
    pub fn print(&self, favorites: usize) {
        println!("=== Euraxess-Harvest Dashboard ===\n");
        println!("Total jobs:     {}", self.total_jobs);
        println!("Countries:      {}", self.countries);
        println!("Universities:   {}", self.universities);
        println!("New this week:  {}", self.new_this_week);
        println!("Favorites:      {}", favorites);
    }
}
