//! Markdown export of the filtered job table
//!
//! The export carries the same columns as the on-screen table, with titles
//! linked to the posting and the derived field columns added.

use crate::dashboard::{DashboardError, JobRow};
use crate::favorites::FavoriteSet;
use crate::record::format_deadline;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes the rows as a markdown table
///
/// # Arguments
///
/// * `rows` - The rows to export, in display order
/// * `favorites` - Current favourites, shown in the first column
/// * `output_path` - Path where the markdown file should be written
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote the export
/// * `Err(DashboardError)` - Failed to write the file
pub fn export_markdown(
    rows: &[&JobRow],
    favorites: &FavoriteSet,
    output_path: &Path,
) -> Result<(), DashboardError> {
    let markdown = format_markdown_table(rows, favorites);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    tracing::info!("Exported {} jobs to {}", rows.len(), output_path.display());
    Ok(())
}

/// Formats rows as a markdown document
pub fn format_markdown_table(rows: &[&JobRow], favorites: &FavoriteSet) -> String {
    let mut md = String::new();

    md.push_str("# Research Jobs\n\n");
    md.push_str(&format!("{} jobs\n\n", rows.len()));

    md.push_str("| Fav | Country | University | Title | Field | Sub-field | Profile | Deadline | Posted |\n");
    md.push_str("|-----|---------|------------|-------|-------|-----------|---------|----------|--------|\n");

    for row in rows {
        let record = &row.record;
        let title = escape(record.title.as_deref().unwrap_or(&record.id));
        let title = match &record.link {
            Some(link) => format!("[{}]({})", title, link),
            None => title,
        };
        let stages: Vec<&str> = row.stages.iter().map(|stage| stage.code()).collect();

        md.push_str(&format!(
            "| {} | {} | {} | {} | {} | {} | {} | {} | {} |\n",
            if favorites.contains(&record.id) { "★" } else { "" },
            escape(record.country.as_deref().unwrap_or("")),
            escape(record.university.as_deref().unwrap_or("")),
            title,
            escape(&row.fields.main_joined()),
            escape(&row.fields.sub_joined()),
            stages.join(", "),
            record
                .application_deadline
                .as_ref()
                .map(format_deadline)
                .unwrap_or_default(),
            record.posted_on.date(),
        ));
    }

    md
}

/// Keeps cell text from breaking the table layout
fn escape(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::test_support::{at, RowBuilder};
    use tempfile::TempDir;

    #[test]
    fn test_format_markdown_table() {
        let mut row = RowBuilder::new("7")
            .country("Belgium")
            .university("KU Leuven")
            .title("PhD | Materials")
            .field("Chemistry;»;Materials chemistry")
            .profile("R1")
            .posted(at(2025, 7, 2))
            .build();
        row.record.link = Some("https://example.org/jobs/7".to_string());
        let favorites: FavoriteSet = ["7"].into_iter().collect();

        let md = format_markdown_table(&[&row], &favorites);

        assert!(md.starts_with("# Research Jobs\n\n1 jobs\n"));
        assert!(md.contains(
            "| ★ | Belgium | KU Leuven | [PhD \\| Materials](https://example.org/jobs/7) | Chemistry | Materials chemistry | R1 |  | 2025-07-02 |"
        ));
    }

    #[test]
    fn test_export_writes_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("jobs.md");
        let row = RowBuilder::new("8").build();

        export_markdown(&[&row], &FavoriteSet::new(), &path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("| 8 |"));
    }
}
