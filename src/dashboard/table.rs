//! Plain-text job table and pagination

use crate::dashboard::JobRow;
use crate::favorites::FavoriteSet;
use crate::record::format_deadline;

/// Rows rendered in one table at most
pub const MAX_DISPLAY_ROWS: usize = 1000;

const FAVORITE_MARK: &str = "*";

/// Column headers and the maximum width of each column's cells
const COLUMNS: [(&str, usize); 7] = [
    ("Fav", 3),
    ("ID", 12),
    ("Country", 16),
    ("University", 32),
    ("Title", 56),
    ("Deadline", 16),
    ("Posted", 10),
];

/// One page of a longer result list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<'a, T> {
    pub items: &'a [T],
    /// 1-based page number actually shown
    pub page: usize,
    pub total_pages: usize,
    pub total_items: usize,
}

/// Cuts one page out of a list
///
/// Pages are numbered from 1. A page number outside `1..=total_pages` is
/// clamped, and a page size of 0 is treated as 1. An empty list has a single
/// empty page.
pub fn paginate<T>(items: &[T], page_size: usize, page: usize) -> Page<'_, T> {
    let page_size = page_size.max(1);
    let total_pages = items.len().div_ceil(page_size).max(1);
    let page = page.clamp(1, total_pages);

    let start = (page - 1) * page_size;
    let end = (start + page_size).min(items.len());

    Page {
        items: &items[start.min(end)..end],
        page,
        total_pages,
        total_items: items.len(),
    }
}

/// Renders rows as an aligned text table with a favourite column first
///
/// Cells wider than their column are truncated with `...`; the link is
/// printed in full on the line below each row. At most
/// [`MAX_DISPLAY_ROWS`] rows are rendered.
pub fn render_table(rows: &[&JobRow], favorites: &FavoriteSet) -> String {
    let shown = if rows.len() > MAX_DISPLAY_ROWS {
        tracing::warn!(
            "Showing the first {} of {} jobs, narrow the filters to see the rest",
            MAX_DISPLAY_ROWS,
            rows.len()
        );
        &rows[..MAX_DISPLAY_ROWS]
    } else {
        rows
    };

    let cells: Vec<[String; 7]> = shown.iter().map(|row| row_cells(row, favorites)).collect();

    let mut widths = COLUMNS.map(|(header, _)| header.chars().count());
    for row in &cells {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count().min(COLUMNS[i].1));
        }
    }

    let mut out = String::new();
    let headers = COLUMNS.map(|(header, _)| header.to_string());
    push_line(&mut out, &headers, &widths);
    let rule: Vec<String> = widths.iter().map(|width| "-".repeat(*width)).collect();
    out.push_str(&rule.join("-+-"));
    out.push('\n');

    for (row, line) in shown.iter().zip(&cells) {
        push_line(&mut out, line, &widths);
        if let Some(link) = &row.record.link {
            out.push_str(&format!("    {}\n", link));
        }
    }

    if shown.len() < rows.len() {
        out.push_str(&format!(
            "\n... {} more jobs not shown\n",
            rows.len() - shown.len()
        ));
    }

    out
}

fn row_cells(row: &JobRow, favorites: &FavoriteSet) -> [String; 7] {
    let record = &row.record;
    let text = |value: &Option<String>| value.clone().unwrap_or_default();
    [
        if favorites.contains(&record.id) {
            FAVORITE_MARK.to_string()
        } else {
            String::new()
        },
        record.id.clone(),
        text(&record.country),
        text(&record.university),
        text(&record.title),
        record
            .application_deadline
            .as_ref()
            .map(format_deadline)
            .unwrap_or_default(),
        record.posted_on.date().to_string(),
    ]
}

fn push_line(out: &mut String, cells: &[String; 7], widths: &[usize; 7]) {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", truncate(cell, *width), width = *width))
        .collect();
    out.push_str(padded.join(" | ").trim_end());
    out.push('\n');
}

/// Truncates to at most `max` characters, never splitting a character
pub(crate) fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    if max <= 3 {
        return text.chars().take(max).collect();
    }
    let mut cut: String = text.chars().take(max - 3).collect();
    cut.push_str("...");
    cut
}
