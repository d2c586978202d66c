use std::path::Path;

use events_jsonld::error::AppError;
use events_jsonld::models::{Config, MonthIndex, NormalizedEvent};
use events_jsonld::pipeline;
use events_jsonld::storage::LocalStorage;
use events_jsonld::utils::http;
use mockito::{Matcher, Mock, Server, ServerGuard};
use serde_json::{Value, json};
use tempfile::TempDir;

const PACKAGE: &str = "festivals-events";

fn test_config(base_url: &str, storage_dir: &Path) -> Config {
    let mut config = Config::default();
    config.source.catalog_base_url = base_url.to_string();
    config.fetch.batch_size = 2;
    config.output.storage_dir = storage_dir.to_path_buf();
    config
}

fn raw_event(name: &str, start: &str) -> Value {
    json!({
        "calEvent": {
            "eventName": name,
            "freeEvent": " YES ",
            "categoryString": "Festivals, Music",
            "dates": [{"startDateTime": start}],
            "locations": [{
                "locationName": "Nathan Phillips Square",
                "address": "100 Queen St W, Toronto, ON M5H 2N2",
                "coords": {"lat": 43.6525, "lng": -79.3835}
            }]
        }
    })
}

async fn mock_package(server: &mut ServerGuard, datastore_only: bool) -> Mock {
    let base = server.url();
    let body = json!({
        "success": true,
        "result": {"resources": [
            {"url": format!("{base}/datastore/dump/abc"), "datastore_active": true},
            {
                "url": format!("{base}/download/events.json?format=json"),
                "datastore_active": datastore_only
            }
        ]}
    });

    server
        .mock("GET", "/api/3/action/package_show")
        .match_query(Matcher::UrlEncoded("id".into(), PACKAGE.into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body.to_string())
        .create_async()
        .await
}

async fn mock_page(server: &mut ServerGuard, offset: usize, records: Value) -> Mock {
    server
        .mock("GET", "/download/events.json")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("format".into(), "json".into()),
            Matcher::UrlEncoded("limit".into(), "2".into()),
            Matcher::UrlEncoded("offset".into(), offset.to_string()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(records.to_string())
        .create_async()
        .await
}

fn read_month(dir: &Path, key: &str) -> Vec<NormalizedEvent> {
    let text = std::fs::read_to_string(dir.join("events").join(format!("{key}.jsonld"))).unwrap();
    serde_json::from_str(&text).unwrap()
}

#[tokio::test]
async fn monthly_run_partitions_events_and_skips_bad_records() {
    let mut server = Server::new_async().await;
    let tmp = TempDir::new().unwrap();
    let config = test_config(&server.url(), tmp.path());

    let _package = mock_package(&mut server, false).await;
    let _page0 = mock_page(
        &mut server,
        0,
        json!([raw_event("Canada Day", "2025-07-01T16:00:00.000Z"), {"notAnEvent": true}]),
    )
    .await;
    let _page1 = mock_page(
        &mut server,
        2,
        json!([
            raw_event("Caribbean Carnival", "2025-08-02T14:00:00.000Z"),
            raw_event("Jazz Festival", "2025-07-20T18:00:00.000Z")
        ]),
    )
    .await;
    let _page2 = mock_page(&mut server, 4, json!([])).await;

    let client = http::create_client(&config.source).unwrap();
    let storage = LocalStorage::new(tmp.path());
    let (summary, stats) = pipeline::run_monthly(&config, &client, &storage).await.unwrap();

    assert_eq!(stats.fetched, 4);
    assert_eq!(stats.transform_failures, 1);
    assert_eq!(summary.events_written, 3);
    assert_eq!(summary.skipped_dates, 0);
    assert_eq!(
        summary.months,
        vec![("2025-07".to_string(), 2), ("2025-08".to_string(), 1)]
    );

    let july = read_month(tmp.path(), "2025-07");
    let names: Vec<_> = july.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["Canada Day", "Jazz Festival"]);
    assert!(july[0].is_accessible_for_free);
    assert_eq!(july[0].keywords, vec!["Festivals", "Music"]);
    assert_eq!(
        july[0].location.address.as_ref().unwrap().postal_code.as_deref(),
        Some("M5H 2N2")
    );

    let index: MonthIndex = storage.read_json("events/index.json").await.unwrap().unwrap();
    assert_eq!(index.available, vec!["2025-07", "2025-08"]);
    assert_eq!(index.latest, "2025-08");
    assert_eq!(index.latest, *index.available.iter().max().unwrap());
}

#[tokio::test]
async fn rerun_produces_identical_files() {
    let mut server = Server::new_async().await;
    let tmp = TempDir::new().unwrap();
    let config = test_config(&server.url(), tmp.path());

    let _package = mock_package(&mut server, false).await;
    let _page0 = mock_page(
        &mut server,
        0,
        json!([raw_event("A", "2025-05-01T10:00:00Z"), raw_event("B", "2025-06-01T10:00:00Z")]),
    )
    .await;
    let _page1 = mock_page(&mut server, 2, json!([raw_event("C", "2025-05-09T10:00:00Z")])).await;

    let client = http::create_client(&config.source).unwrap();
    let storage = LocalStorage::new(tmp.path());
    let month_path = tmp.path().join("events/2025-05.jsonld");

    pipeline::run_monthly(&config, &client, &storage).await.unwrap();
    let first = std::fs::read(&month_path).unwrap();
    let first_index = std::fs::read(tmp.path().join("events/index.json")).unwrap();

    pipeline::run_monthly(&config, &client, &storage).await.unwrap();
    assert_eq!(std::fs::read(&month_path).unwrap(), first);
    assert_eq!(
        std::fs::read(tmp.path().join("events/index.json")).unwrap(),
        first_index
    );
}

#[tokio::test]
async fn short_page_ends_pagination() {
    let mut server = Server::new_async().await;
    let tmp = TempDir::new().unwrap();
    let config = test_config(&server.url(), tmp.path());

    let _package = mock_package(&mut server, false).await;
    let page0 = mock_page(&mut server, 0, json!([raw_event("Only", "2025-09-01T10:00:00Z")])).await;
    let page1 = server
        .mock("GET", "/download/events.json")
        .match_query(Matcher::UrlEncoded("offset".into(), "2".into()))
        .with_status(200)
        .with_body("[]")
        .expect(0)
        .create_async()
        .await;

    let client = http::create_client(&config.source).unwrap();
    let storage = LocalStorage::new(tmp.path());
    let (summary, _) = pipeline::run_monthly(&config, &client, &storage).await.unwrap();

    assert_eq!(summary.events_written, 1);
    page0.assert_async().await;
    page1.assert_async().await;
}

#[tokio::test]
async fn page_cap_is_fatal_and_leaves_no_month_files() {
    let mut server = Server::new_async().await;
    let tmp = TempDir::new().unwrap();
    let mut config = test_config(&server.url(), tmp.path());
    config.fetch.max_pages = 2;

    let _package = mock_package(&mut server, false).await;
    let _pages = server
        .mock("GET", "/download/events.json")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(
            json!([
                raw_event("Loop", "2025-10-01T10:00:00Z"),
                raw_event("Loop", "2025-10-02T10:00:00Z")
            ])
            .to_string(),
        )
        .create_async()
        .await;

    let client = http::create_client(&config.source).unwrap();
    let storage = LocalStorage::new(tmp.path());
    let err = pipeline::run_monthly(&config, &client, &storage)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::PageCapExceeded { max_pages: 2, .. }));
    assert!(!tmp.path().join("events/2025-10.jsonld").exists());
    assert!(!tmp.path().join("events/index.json").exists());

    let partial = std::fs::read_to_string(tmp.path().join("events/2025-10.jsonld.partial")).unwrap();
    let parsed: Vec<Value> = serde_json::from_str(&partial).unwrap();
    assert_eq!(parsed.len(), 4);
}

#[tokio::test]
async fn data_ending_exactly_at_page_cap_is_not_an_error() {
    let mut server = Server::new_async().await;
    let tmp = TempDir::new().unwrap();
    let mut config = test_config(&server.url(), tmp.path());
    config.fetch.max_pages = 1;

    let _package = mock_package(&mut server, false).await;
    let _page0 = mock_page(
        &mut server,
        0,
        json!([raw_event("A", "2025-10-01T10:00:00Z"), raw_event("B", "2025-10-02T10:00:00Z")]),
    )
    .await;
    let page1 = mock_page(&mut server, 2, json!([])).await;

    let client = http::create_client(&config.source).unwrap();
    let storage = LocalStorage::new(tmp.path());
    let (summary, stats) = pipeline::run_monthly(&config, &client, &storage).await.unwrap();

    assert_eq!(stats.fetched, 2);
    assert_eq!(summary.events_written, 2);
    assert!(tmp.path().join("events/2025-10.jsonld").exists());
    page1.assert_async().await;
}

#[tokio::test]
async fn missing_downloadable_resource_is_fatal() {
    let mut server = Server::new_async().await;
    let tmp = TempDir::new().unwrap();
    let config = test_config(&server.url(), tmp.path());

    let _package = mock_package(&mut server, true).await;

    let client = http::create_client(&config.source).unwrap();
    let storage = LocalStorage::new(tmp.path());
    let err = pipeline::run_monthly(&config, &client, &storage)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::ResourceNotFound { ref package } if package == PACKAGE));
}

#[tokio::test]
async fn upstream_error_status_is_fatal() {
    let mut server = Server::new_async().await;
    let tmp = TempDir::new().unwrap();
    let config = test_config(&server.url(), tmp.path());

    let _package = mock_package(&mut server, false).await;
    let _page0 = server
        .mock("GET", "/download/events.json")
        .match_query(Matcher::Any)
        .with_status(503)
        .create_async()
        .await;

    let client = http::create_client(&config.source).unwrap();
    let storage = LocalStorage::new(tmp.path());
    let err = pipeline::run_monthly(&config, &client, &storage)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Fetch { status: 503, .. }));
}

#[tokio::test]
async fn snapshot_writes_single_file() {
    let mut server = Server::new_async().await;
    let tmp = TempDir::new().unwrap();
    let config = test_config(&server.url(), tmp.path());

    let _package = mock_package(&mut server, false).await;
    let _page0 = mock_page(
        &mut server,
        0,
        json!([raw_event("A", "2025-05-01T10:00:00Z"), "garbage"]),
    )
    .await;
    let _page1 = mock_page(&mut server, 2, json!([])).await;

    let client = http::create_client(&config.source).unwrap();
    let storage = LocalStorage::new(tmp.path());
    let (events, stats) = pipeline::run_snapshot(&config, &client, &storage).await.unwrap();

    assert_eq!(events.len(), 1);
    assert_eq!(stats.transform_failures, 1);

    let written: Vec<NormalizedEvent> = storage.read_json("events.jsonld").await.unwrap().unwrap();
    assert_eq!(written, events);
}
