//! Integration tests for the harvester
//!
//! These tests use wiremock to serve listing pages and run the full
//! harvest cycle end-to-end against a temporary CSV store.

use euraxess_harvest::config::{Config, CrawlerConfig, OutputConfig, UserAgentConfig};
use euraxess_harvest::crawler::run_harvest;
use euraxess_harvest::state::KnownIds;
use euraxess_harvest::storage::{CsvStore, RecordSink};
use euraxess_harvest::{HarvestError, JobRecord, StopReason};
use std::collections::HashSet;
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration pointing at the mock server
fn create_test_config(base_url: &str, store_path: &Path) -> Config {
    Config {
        crawler: CrawlerConfig {
            base_url: base_url.to_string(),
            listing_path: "/jobs/search".to_string(),
            min_delay_ms: 0, // No pacing in tests
            max_delay_ms: 0,
            slack_days: 1,
            request_timeout_secs: 5,
        },
        user_agent: UserAgentConfig {
            crawler_name: "TestHarvester".to_string(),
            crawler_version: "1.0.0".to_string(),
            contact_url: "https://example.com/contact".to_string(),
            contact_email: "test@example.com".to_string(),
        },
        output: OutputConfig {
            store_path: store_path.display().to_string(),
            favorites_path: "./favorites.json".to_string(),
        },
    }
}

/// One listing entry with the given id and posting date text
fn entry(id: &str, posted: &str) -> String {
    format!(
        r#"<li>
          <div><div><ul><li><span>Job offer</span></li><li><span>Germany</span></li></ul></div></div>
          <article>
            <h3><a href="/jobs/{id}"><span>Position {id}</span></a></h3>
            <div>
              <ul><li><a>Example University</a></li><li>Posted on: {posted}</li></ul>
              <div class="ecl-description-list id-Research-Field"><div>Field</div><div><a>Physics</a></div></div>
            </div>
          </article>
        </li>"#
    )
}

/// A listing page; `last_page` fills the fifth pagination item
fn listing(entries: &[String], last_page: Option<u32>) -> String {
    let nav = last_page
        .map(|n| {
            format!(
                "<nav><ul><li><a>1</a></li><li><a>2</a></li><li><a>3</a></li><li><a>…</a></li><li><a>{}</a></li></ul></nav>",
                n
            )
        })
        .unwrap_or_default();
    format!(
        r#"<html><body><div id="oe-list-container"><div></div><div></div><div><div><ul>{}</ul>{}</div></div></div></body></html>"#,
        entries.concat(),
        nav
    )
}

async fn mount_page(server: &MockServer, page: u32, body: String) {
    Mock::given(method("GET"))
        .and(path("/jobs/search"))
        .and(query_param("page", page.to_string()))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

async fn mount_unreachable_page(server: &MockServer, page: u32) {
    Mock::given(method("GET"))
        .and(path("/jobs/search"))
        .and(query_param("page", page.to_string()))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(server)
        .await;
}

/// Seeds the store with records posted on the given dates
fn seed_store(store_path: &Path, records: &[(&str, &str)]) {
    let store = CsvStore::new(store_path);
    let mut writer = store.open_writer(KnownIds::new()).unwrap();
    for (id, posted) in records {
        let posted_on = euraxess_harvest::record::parse_fuzzy_datetime(posted).unwrap();
        writer.append(&JobRecord::new(*id, posted_on)).unwrap();
    }
    writer.flush().unwrap();
}

fn stored_ids(store_path: &Path) -> Vec<String> {
    CsvStore::new(store_path)
        .load_records()
        .unwrap()
        .into_iter()
        .map(|record| record.id)
        .collect()
}

#[tokio::test]
async fn test_full_harvest_reaches_final_page() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let store_path = dir.path().join("output").join("jobs.csv");

    mount_page(
        &mock_server,
        0,
        listing(
            &[entry("103", "15 July 2025"), entry("102", "14 July 2025")],
            Some(1),
        ),
    )
    .await;
    mount_page(
        &mock_server,
        1,
        listing(&[entry("101", "12 July 2025")], Some(1)),
    )
    .await;
    mount_unreachable_page(&mock_server, 2).await;

    let config = create_test_config(&mock_server.uri(), &store_path);
    let report = run_harvest(&config).await.unwrap();

    assert_eq!(report.stop, StopReason::ReachedFinalPage);
    assert_eq!(report.pages_fetched, 2);
    assert_eq!(report.total_pages, 1);
    assert_eq!(report.appended, 3);
    assert_eq!(report.stopped_at, None);

    assert_eq!(stored_ids(&store_path), vec!["103", "102", "101"]);

    let records = CsvStore::new(&store_path).load_records().unwrap();
    assert_eq!(records[0].country.as_deref(), Some("Germany"));
    assert_eq!(records[0].title.as_deref(), Some("Position 103"));
    assert_eq!(records[0].field.as_deref(), Some("Physics"));
    assert_eq!(
        records[0].link,
        Some(format!("{}/jobs/103", mock_server.uri()))
    );
}

#[tokio::test]
async fn test_rerun_appends_nothing() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let store_path = dir.path().join("jobs.csv");

    mount_page(
        &mock_server,
        0,
        listing(
            &[entry("202", "15 July 2025"), entry("201", "15 July 2025")],
            Some(0),
        ),
    )
    .await;

    let config = create_test_config(&mock_server.uri(), &store_path);

    let first = run_harvest(&config).await.unwrap();
    assert_eq!(first.appended, 2);

    let second = run_harvest(&config).await.unwrap();
    assert_eq!(second.appended, 0);
    assert_eq!(second.stop, StopReason::DuplicateFound);
    assert_eq!(second.stopped_at.as_deref(), Some("202"));

    assert_eq!(stored_ids(&store_path), vec!["202", "201"]);
}

#[tokio::test]
async fn test_incremental_stop_before_stale_posting() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let store_path = dir.path().join("jobs.csv");
    seed_store(&store_path, &[("old", "10 July 2025")]);

    // Cut-off is 9 July: the third entry is not newer and ends the walk
    mount_page(
        &mock_server,
        0,
        listing(
            &[
                entry("n1", "15 July 2025"),
                entry("n2", "12 July 2025"),
                entry("stale", "9 July 2025"),
                entry("never", "8 July 2025"),
            ],
            Some(3),
        ),
    )
    .await;
    mount_unreachable_page(&mock_server, 1).await;

    let config = create_test_config(&mock_server.uri(), &store_path);
    let report = run_harvest(&config).await.unwrap();

    assert_eq!(report.stop, StopReason::IncrementalStop);
    assert_eq!(report.stopped_at.as_deref(), Some("stale"));
    assert_eq!(report.appended, 2);
    assert_eq!(report.pages_fetched, 1);

    assert_eq!(stored_ids(&store_path), vec!["old", "n1", "n2"]);
}

#[tokio::test]
async fn test_slack_keeps_same_day_postings() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let store_path = dir.path().join("jobs.csv");
    seed_store(&store_path, &[("old", "10 July 2025")]);

    // Posted on the newest stored day: newer than the cut-off, so kept
    mount_page(
        &mock_server,
        0,
        listing(&[entry("same-day", "10 July 2025")], None),
    )
    .await;

    let config = create_test_config(&mock_server.uri(), &store_path);
    let report = run_harvest(&config).await.unwrap();

    assert_eq!(report.stop, StopReason::ReachedFinalPage);
    assert_eq!(report.appended, 1);
    assert_eq!(stored_ids(&store_path), vec!["old", "same-day"]);
}

#[tokio::test]
async fn test_duplicate_stops_harvest() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let store_path = dir.path().join("jobs.csv");
    seed_store(&store_path, &[("known", "1 July 2025")]);

    mount_page(
        &mock_server,
        0,
        listing(
            &[
                entry("fresh", "15 July 2025"),
                entry("known", "14 July 2025"),
                entry("after", "13 July 2025"),
            ],
            Some(5),
        ),
    )
    .await;
    mount_unreachable_page(&mock_server, 1).await;

    let config = create_test_config(&mock_server.uri(), &store_path);
    let report = run_harvest(&config).await.unwrap();

    assert_eq!(report.stop, StopReason::DuplicateFound);
    assert_eq!(report.stopped_at.as_deref(), Some("known"));
    assert_eq!(report.appended, 1);
    assert_eq!(stored_ids(&store_path), vec!["known", "fresh"]);
}

#[tokio::test]
async fn test_repeat_within_run_is_duplicate() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let store_path = dir.path().join("jobs.csv");

    // A posting that moved onto the next page while walking
    mount_page(
        &mock_server,
        0,
        listing(
            &[entry("a", "15 July 2025"), entry("b", "14 July 2025")],
            Some(1),
        ),
    )
    .await;
    mount_page(
        &mock_server,
        1,
        listing(
            &[entry("b", "14 July 2025"), entry("c", "13 July 2025")],
            Some(1),
        ),
    )
    .await;

    let config = create_test_config(&mock_server.uri(), &store_path);
    let report = run_harvest(&config).await.unwrap();

    assert_eq!(report.stop, StopReason::DuplicateFound);
    assert_eq!(report.pages_fetched, 2);

    let ids = stored_ids(&store_path);
    let distinct: HashSet<&String> = ids.iter().collect();
    assert_eq!(ids.len(), distinct.len());
    assert_eq!(ids, vec!["a", "b"]);
}

#[tokio::test]
async fn test_http_error_is_fatal() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let store_path = dir.path().join("jobs.csv");

    Mock::given(method("GET"))
        .and(path("/jobs/search"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), &store_path);
    let result = run_harvest(&config).await;

    match result {
        Err(HarvestError::FetchFailed { url, status_code }) => {
            assert_eq!(status_code, 503);
            assert!(url.ends_with("/jobs/search?page=0"));
        }
        other => panic!("expected FetchFailed, got {:?}", other),
    }

    assert!(stored_ids(&store_path).is_empty());
}

#[tokio::test]
async fn test_failure_keeps_earlier_pages() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let store_path = dir.path().join("jobs.csv");

    mount_page(
        &mock_server,
        0,
        listing(&[entry("kept", "15 July 2025")], Some(2)),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/jobs/search"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), &store_path);
    let result = run_harvest(&config).await;

    assert!(matches!(
        result,
        Err(HarvestError::FetchFailed {
            status_code: 500,
            ..
        })
    ));
    assert_eq!(stored_ids(&store_path), vec!["kept"]);
}

#[tokio::test]
async fn test_unparseable_posting_date_is_fatal() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let store_path = dir.path().join("jobs.csv");

    mount_page(
        &mock_server,
        0,
        listing(
            &[entry("ok", "15 July 2025"), entry("broken", "sometime soon")],
            None,
        ),
    )
    .await;

    let config = create_test_config(&mock_server.uri(), &store_path);
    let result = run_harvest(&config).await;

    match result {
        Err(HarvestError::DateParse { id, .. }) => assert_eq!(id, "broken"),
        other => panic!("expected DateParse, got {:?}", other),
    }
    assert_eq!(stored_ids(&store_path), vec!["ok"]);
}
