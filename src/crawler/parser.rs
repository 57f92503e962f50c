//! Listing page parser
//!
//! This module turns one page of search results into raw listing entries:
//! - The total page count from the pagination control (first page only)
//! - One `RawListing` per job posting, with whitespace normalised
//!
//! Selectors follow the listing's positional layout. A field the layout does
//! not render for a posting is `None`, never an error.

use crate::record::{parse_deadline, parse_fuzzy_datetime, JobRecord};
use crate::HarvestError;
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Listing entries under the results container
const ENTRY_SELECTOR: &str = "#oe-list-container > div:nth-of-type(3) > div > ul > li";

/// Fifth pagination item, which holds the last page number
const LAST_PAGE_SELECTOR: &str =
    "#oe-list-container > div:nth-of-type(3) > div > nav > ul > li:nth-of-type(5) > a";

const TYPE_SELECTOR: &str = "div > div:nth-of-type(1) > ul > li:nth-of-type(1) > span";
const COUNTRY_SELECTOR: &str = "div > div:nth-of-type(1) > ul > li:nth-of-type(2) > span";
const UNIVERSITY_SELECTOR: &str = "article > div > ul:nth-of-type(1) > li:nth-of-type(1) > a";
const POSTED_ON_SELECTOR: &str = "article > div > ul:nth-of-type(1) > li:nth-of-type(2)";
const TITLE_SELECTOR: &str = "h3 a span";
const LINK_SELECTOR: &str = "h3 a[href]";
const DESCRIPTION_SELECTOR: &str = "div.ecl-content-block__description p";
const DEPARTMENT_SELECTOR: &str = "div[class*='id-Department'] div:nth-of-type(2)";
const LOCATION_SELECTOR: &str = "div[class*='id-Work-Locations'] div:nth-of-type(2)";
const FIELD_SELECTOR: &str = "div[class*='id-Research-Field'] > div:nth-of-type(2)";
const PROFILE_SELECTOR: &str = "div[class*='id-Researcher-Profile'] a";
const FUNDING_SELECTOR: &str = "div[class*='id-Funding-Programme'] a";
const DEADLINE_SELECTOR: &str = "div[class*='id-Application-Deadline'] time";

/// One page of search results
#[derive(Debug, Clone, Default)]
pub struct ListingPage {
    /// Last page number shown by the pagination control, if any
    pub total_pages: Option<u32>,

    /// Listing entries in page order
    pub entries: Vec<RawListing>,
}

/// Raw field values of one listing entry
///
/// Dates are kept as the listing renders them until the entry is converted
/// with [`RawListing::into_record`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawListing {
    pub id: String,
    pub link: String,
    pub job_type: Option<String>,
    pub country: Option<String>,
    pub university: Option<String>,
    pub posted_on: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub department: Option<String>,
    pub location: Option<String>,
    pub field: Option<String>,
    pub profile: Option<String>,
    pub funding_program: Option<String>,
    pub application_deadline: Option<String>,
}

impl RawListing {
    /// Converts the entry into a job record
    ///
    /// The posting date is required: a missing or unparseable date is an
    /// error for the whole harvest, since the incremental stop depends on it.
    /// An unparseable deadline only drops the deadline.
    pub fn into_record(self) -> Result<JobRecord, HarvestError> {
        let raw_posted = self
            .posted_on
            .ok_or_else(|| HarvestError::MissingPostedOn {
                id: self.id.clone(),
            })?;

        let posted_on =
            parse_fuzzy_datetime(&raw_posted).map_err(|source| HarvestError::DateParse {
                id: self.id.clone(),
                source,
            })?;

        let application_deadline = self.application_deadline.as_deref().and_then(|raw| {
            let parsed = parse_deadline(raw);
            if parsed.is_none() {
                tracing::warn!("Job {}: ignoring unparseable deadline '{}'", self.id, raw);
            }
            parsed
        });

        Ok(JobRecord {
            id: self.id,
            job_type: self.job_type,
            country: self.country,
            university: self.university,
            posted_on,
            title: self.title,
            link: Some(self.link),
            description: self.description,
            department: self.department,
            location: self.location,
            field: self.field,
            profile: self.profile,
            funding_program: self.funding_program,
            application_deadline,
        })
    }
}

/// Parses one page of search results
///
/// # Arguments
///
/// * `html` - The page body
/// * `page_url` - The URL the page was fetched from, for resolving links
///
/// # Returns
///
/// The page's entries in order and, when the pagination control is
/// present, the last page number. Entries without a detail link are
/// skipped since they carry no identifier.
///
/// # Example
///
/// ```
/// use euraxess_harvest::crawler::parse_listing_page;
/// use url::Url;
///
/// let page_url = Url::parse("https://example.com/jobs/search?page=0").unwrap();
/// let page = parse_listing_page("<html><body></body></html>", &page_url);
/// assert!(page.entries.is_empty());
/// assert_eq!(page.total_pages, None);
/// ```
pub fn parse_listing_page(html: &str, page_url: &Url) -> ListingPage {
    let document = Html::parse_document(html);

    let total_pages = select_text(document.root_element(), LAST_PAGE_SELECTOR)
        .and_then(|text| text.parse::<u32>().ok());

    let mut entries = Vec::new();

    if let Ok(entry_selector) = Selector::parse(ENTRY_SELECTOR) {
        for (position, item) in document.select(&entry_selector).enumerate() {
            match extract_entry(item, page_url) {
                Some(entry) => entries.push(entry),
                None => tracing::warn!(
                    "Skipping listing entry {} on {}: no detail link",
                    position,
                    page_url
                ),
            }
        }
    }

    ListingPage {
        total_pages,
        entries,
    }
}

/// Extracts one listing entry, or `None` if it has no usable detail link
fn extract_entry(item: ElementRef, page_url: &Url) -> Option<RawListing> {
    let href = select_first(item, LINK_SELECTOR)?.value().attr("href")?;
    let link = resolve_link(href, page_url)?;
    let id = detail_id(&link)?;

    Some(RawListing {
        id,
        link: link.to_string(),
        job_type: select_text(item, TYPE_SELECTOR),
        country: select_text(item, COUNTRY_SELECTOR),
        university: select_text(item, UNIVERSITY_SELECTOR),
        posted_on: select_text(item, POSTED_ON_SELECTOR),
        title: select_text(item, TITLE_SELECTOR),
        description: select_text(item, DESCRIPTION_SELECTOR),
        department: select_text(item, DEPARTMENT_SELECTOR),
        location: select_text(item, LOCATION_SELECTOR),
        field: select_first(item, FIELD_SELECTOR).and_then(|el| join_text_nodes(el.text())),
        profile: select_joined(item, PROFILE_SELECTOR),
        funding_program: select_text(item, FUNDING_SELECTOR),
        application_deadline: select_text(item, DEADLINE_SELECTOR),
    })
}

fn select_first<'a>(scope: ElementRef<'a>, css: &str) -> Option<ElementRef<'a>> {
    let selector = Selector::parse(css).ok()?;
    let found = scope.select(&selector).next();
    found
}

/// Normalised text of the first match
fn select_text(scope: ElementRef, css: &str) -> Option<String> {
    select_first(scope, css).and_then(|el| clean_text(&el.text().collect::<String>()))
}

/// Normalised text of every match, joined with `;`
fn select_joined(scope: ElementRef, css: &str) -> Option<String> {
    let selector = Selector::parse(css).ok()?;
    let texts = scope
        .select(&selector)
        .filter_map(|el| clean_text(&el.text().collect::<String>()));
    join_text_nodes(texts)
}

fn join_text_nodes<I, S>(texts: I) -> Option<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let parts: Vec<String> = texts
        .into_iter()
        .filter_map(|text| clean_text(text.as_ref()))
        .collect();

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(";"))
    }
}

/// Collapses runs of whitespace and line breaks; empty text becomes `None`
fn clean_text(text: &str) -> Option<String> {
    let cleaned = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}

/// Resolves a detail link against the page URL
///
/// Returns None for empty, fragment-only, or non-HTTP(S) links.
fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute_url) if matches!(absolute_url.scheme(), "http" | "https") => Some(absolute_url),
        _ => None,
    }
}

/// The posting identifier: the last non-empty path segment of the detail link
fn detail_id(link: &Url) -> Option<String> {
    link.path_segments()?
        .filter(|segment| !segment.is_empty())
        .last()
        .map(str::to_string)
}
