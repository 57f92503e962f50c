//! Filter option lists derived from the loaded rows

use crate::dashboard::JobRow;
use crate::record::CareerStage;
use std::collections::BTreeSet;

/// Choices offered by each dashboard filter
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterOptions {
    pub countries: Vec<String>,
    pub profiles: Vec<CareerStage>,
    pub fields: Vec<String>,
    pub sub_fields: Vec<String>,
    pub funding_programs: Vec<String>,
}

impl FilterOptions {
    /// Collects the distinct values present in the rows
    ///
    /// Lists are sorted case-insensitively. Profiles are always the four
    /// fixed career stages.
    pub fn from_rows(rows: &[JobRow]) -> Self {
        let mut countries = BTreeSet::new();
        let mut fields = BTreeSet::new();
        let mut sub_fields = BTreeSet::new();
        let mut funding_programs = BTreeSet::new();

        for row in rows {
            if let Some(country) = &row.record.country {
                countries.insert(country.clone());
            }
            if let Some(program) = &row.record.funding_program {
                funding_programs.insert(program.clone());
            }
            fields.extend(row.fields.main.iter().cloned());
            sub_fields.extend(row.fields.sub.iter().cloned());
        }

        Self {
            countries: sorted(countries),
            profiles: CareerStage::ALL.to_vec(),
            fields: sorted(fields),
            sub_fields: sorted(sub_fields),
            funding_programs: sorted(funding_programs),
        }
    }
}

fn sorted(values: BTreeSet<String>) -> Vec<String> {
    let mut values: Vec<String> = values.into_iter().collect();
    values.sort_by_key(|value| value.to_lowercase());
    values
}

/// Narrows an option list to entries containing the search text
///
/// Matching is case-insensitive. An empty search keeps every option.
pub fn narrow<'a>(options: &'a [String], search: &str) -> Vec<&'a str> {
    let search = search.trim().to_lowercase();
    options
        .iter()
        .map(String::as_str)
        .filter(|option| search.is_empty() || option.to_lowercase().contains(&search))
        .collect()
}
