//! Integration tests for the dashboard over a store file on disk

use chrono::{NaiveDate, NaiveDateTime};
use euraxess_harvest::dashboard::{
    export_markdown, load_dashboard_data, paginate, DashboardStats, FilterOptions, JobFilter,
};
use euraxess_harvest::favorites::FavoritesFile;
use euraxess_harvest::storage::CsvStore;
use euraxess_harvest::CareerStage;
use std::fs;
use tempfile::TempDir;

/// A store written with the raw site text for dates, as older harvests left it
const LEGACY_STORE: &str = "\
id,type,country,university,posted_on,title,link,description,department,location,field,profile,funding_program,application_deadline
301,Job offer,Germany,TU Example,Posted on: 14 July 2025,PhD in Optics,https://example.org/jobs/301,Lasers,Physics dept,Jena,Physics;»;Optics,First Stage Researcher (R1),,15 Aug 2025 - 23:59 (Europe/Brussels)
302,Job offer,France,Université Exemple,Posted on: 2 July 2025,Postdoc in AI,https://example.org/jobs/302,Learning,CS,Paris,Computer science;»;Artificial intelligence;Mathematics,Recognised Researcher (r2),MSCA,1 Oct 2025 - 12:00 (Europe/Brussels)
303,Job offer,Spain,Universidad Ejemplo,Posted on: 1 June 2025,Closed call,https://example.org/jobs/303,,,,Biology,Leading Researcher (R4),,30 June 2025 - 23:59 (Europe/Brussels)
304,Job offer,Spain,,Posted on: 12 July 2025,Open call,https://example.org/jobs/304,,,,Biology,Established Researcher (R3);Recognised Researcher (R2),,
";

fn now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 7, 15)
        .unwrap()
        .and_hms_opt(9, 0, 0)
        .unwrap()
}

fn write_store(dir: &TempDir) -> CsvStore {
    let path = dir.path().join("jobs.csv");
    fs::write(&path, LEGACY_STORE).unwrap();
    CsvStore::new(path)
}

#[test]
fn test_legacy_store_loads_without_expired_rows() {
    let dir = TempDir::new().unwrap();
    let store = write_store(&dir);

    let rows = load_dashboard_data(&store, now()).unwrap();
    let ids: Vec<&str> = rows.iter().map(|row| row.id()).collect();
    assert_eq!(ids, vec!["301", "302", "304"]);

    let optics = &rows[0];
    assert_eq!(optics.fields.main_joined(), "Physics");
    assert_eq!(optics.fields.sub_joined(), "Optics");
    assert_eq!(
        optics.record.application_deadline.map(|d| d.to_string()),
        Some("2025-08-15 23:59:00".to_string())
    );
}

#[test]
fn test_filter_options_and_profile_filter() {
    let dir = TempDir::new().unwrap();
    let rows = load_dashboard_data(&write_store(&dir), now()).unwrap();

    let options = FilterOptions::from_rows(&rows);
    assert_eq!(options.countries, vec!["France", "Germany", "Spain"]);
    assert_eq!(
        options.fields,
        vec!["Biology", "Computer science", "Mathematics", "Physics"]
    );
    assert_eq!(options.sub_fields, vec!["Artificial intelligence", "Optics"]);

    let filter = JobFilter {
        profiles: vec![CareerStage::R2],
        ..Default::default()
    };
    let kept = filter.apply(&rows, &Default::default(), now());
    let ids: Vec<&str> = kept.iter().map(|row| row.id()).collect();
    assert_eq!(ids, vec!["302", "304"]);
}

#[test]
fn test_favorites_overlay_on_filtered_rows() {
    let dir = TempDir::new().unwrap();
    let rows = load_dashboard_data(&write_store(&dir), now()).unwrap();
    let favorites_file = FavoritesFile::new(dir.path().join("favorites.json"));

    favorites_file.toggle("304").unwrap();
    favorites_file.toggle("999").unwrap();
    let favorites = favorites_file.load().unwrap();

    let filter = JobFilter {
        favorites_only: true,
        ..Default::default()
    };
    let kept = filter.apply(&rows, &favorites, now());
    assert_eq!(kept.len(), 1);
    assert_eq!(kept[0].id(), "304");

    let stats = DashboardStats::compute(kept.iter().copied(), now());
    assert_eq!(stats.total_jobs, 1);
    assert_eq!(stats.universities, 0);
}

#[test]
fn test_stats_and_export() {
    let dir = TempDir::new().unwrap();
    let rows = load_dashboard_data(&write_store(&dir), now()).unwrap();

    let stats = DashboardStats::compute(&rows, now());
    assert_eq!(stats.total_jobs, 3);
    assert_eq!(stats.countries, 3);
    assert_eq!(stats.universities, 2);
    assert_eq!(stats.new_this_week, 2);

    let all = JobFilter::default().apply(&rows, &Default::default(), now());
    let page = paginate(&all, 2, 2);
    assert_eq!(page.total_pages, 2);
    assert_eq!(page.items.len(), 1);

    let export_path = dir.path().join("jobs.md");
    export_markdown(&all, &Default::default(), &export_path).unwrap();
    let markdown = fs::read_to_string(&export_path).unwrap();
    assert!(markdown.contains("[PhD in Optics](https://example.org/jobs/301)"));
    assert!(!markdown.contains("Closed call"));
}
