use malinaw_lib::hrep_api::Client;
use malinaw_lib::types::Significance;
use malinaw_lib::{
    fetch_listing_row_ids, load_checkpoint, load_failed_row_ids, BillFilter, Db,
    HttpModalFetcher, Pipeline, PipelineConfig,
};
use wiremock::matchers::{body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn load_fixture(name: &str) -> String {
    std::fs::read_to_string(format!("tests/fixtures/{}", name)).unwrap()
}

/// Matches the multipart part carrying `row_id` exactly.
fn row_id_part(row_id: &str) -> wiremock::matchers::BodyContainsMatcher {
    body_string_contains(format!("\r\n\r\n{}\r\n", row_id))
}

async fn mount_modal(server: &MockServer, row_id: &str, response: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path("/legisdocs/fetch_history.php"))
        .and(row_id_part(row_id))
        .respond_with(response)
        .expect(1)
        .mount(server)
        .await;
}

fn ids(ids: &[&str]) -> Vec<String> {
    ids.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn scrape_run_over_http_records_failures_and_skips_duplicates() {
    let server = MockServer::start().await;
    mount_modal(
        &server,
        "58230",
        ResponseTemplate::new(200).set_body_string(load_fixture("history_modal.html")),
    )
    .await;
    mount_modal(
        &server,
        "58231",
        ResponseTemplate::new(200).set_body_string(load_fixture("history_modal_national.html")),
    )
    .await;
    mount_modal(
        &server,
        "58232",
        ResponseTemplate::new(503).set_body_string("Service Unavailable"),
    )
    .await;
    mount_modal(
        &server,
        "58233",
        ResponseTemplate::new(200).set_body_string(load_fixture("history_modal_dup.html")),
    )
    .await;
    mount_modal(
        &server,
        "58234",
        ResponseTemplate::new(200).set_body_string("<p>No record found.</p>"),
    )
    .await;

    let dir = tempfile::tempdir().unwrap();
    let mut db = Db::open_in_memory().unwrap();
    db.init().unwrap();

    let fetcher = HttpModalFetcher::new(Client::with_base_url(&server.uri()).unwrap());
    let config = PipelineConfig::default();
    let outcome = Pipeline::new(fetcher, dir.path())
        .with_config(&config)
        .with_store(&mut db)
        .run(&ids(&["58230", "58231", "58232", "58233", "58234"]))
        .await
        .unwrap();

    assert_eq!(outcome.summary.attempted, 5);
    assert_eq!(outcome.summary.succeeded, 2);
    assert_eq!(outcome.summary.duplicates, 1);
    assert_eq!(outcome.summary.failed, 2);

    let first = &outcome.bills[0];
    assert_eq!(first.bill_num, "HB00123");
    assert_eq!(first.short_title.as_deref(), Some("Palo General Hospital Act"));
    assert_eq!(first.significance, Significance::Local);
    assert_eq!(
        first.committee_referrals,
        vec![
            "Referred to the Committee on Health on 2022-08-01",
            "Pending with the Committee on Health since 2022-08-01",
        ]
    );

    let second = &outcome.bills[1];
    assert_eq!(second.bill_num, "HB00456");
    assert_eq!(second.date_filed, "2022-07-04");
    assert_eq!(second.r#abstract, None);
    assert_eq!(
        second.committee_referrals,
        vec![
            "Referred to the Committee on Health on 2022-08-02",
            "Approved by the Committee on 2022-11-15",
        ]
    );

    let checkpoint = load_checkpoint(&outcome.checkpoint_path).unwrap();
    assert_eq!(checkpoint, outcome.bills);
    assert_eq!(
        load_failed_row_ids(&outcome.errors_path).unwrap(),
        vec!["58232", "58234"]
    );
    let error_file: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&outcome.errors_path).unwrap()).unwrap();
    assert_eq!(error_file, serde_json::json!(["58232", "58234"]));
    assert!(outcome.failures[0].error.contains("503"));
    assert!(outcome.failures[1]
        .error
        .contains("expected at least 1 rows in history modal, found 0"));

    assert_eq!(db.bill_count().unwrap(), 2);
    let stored = db.get_bill(19, "HB00456").unwrap().unwrap();
    assert_eq!(stored.bill, outcome.bills[1]);
    assert!(stored.source_url.ends_with("/basic_19/HB00456.pdf"));

    let national = db
        .query_bills(&BillFilter {
            significance: Some(Significance::National),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(national.len(), 1);
    assert_eq!(national[0].bill_num, "HB00456");
}

#[tokio::test]
async fn rerun_against_populated_store_keeps_bills_in_results() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/legisdocs/fetch_history.php"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(load_fixture("history_modal.html")),
        )
        .expect(2)
        .mount(&server)
        .await;

    let mut db = Db::open_in_memory().unwrap();
    db.init().unwrap();

    for expected_already_stored in [0, 1] {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = HttpModalFetcher::new(Client::with_base_url(&server.uri()).unwrap());
        let outcome = Pipeline::new(fetcher, dir.path())
            .with_store(&mut db)
            .run(&ids(&["58230"]))
            .await
            .unwrap();
        assert_eq!(outcome.summary.failed, 0);
        assert_eq!(outcome.summary.already_stored, expected_already_stored);
        assert_eq!(load_checkpoint(&outcome.checkpoint_path).unwrap().len(), 1);
        assert!(load_failed_row_ids(&outcome.errors_path).unwrap().is_empty());
    }

    assert_eq!(db.bill_count().unwrap(), 1);
}

#[tokio::test]
async fn row_ids_from_live_listing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/legisdocs/"))
        .and(query_param("v", "bills"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(load_fixture("listing.html")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = Client::with_base_url(&server.uri()).unwrap();
    let row_ids = fetch_listing_row_ids(&client).await.unwrap();
    assert_eq!(row_ids, vec!["58230", "58231"]);
}

#[tokio::test]
async fn live_listing_error_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/legisdocs/"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let client = Client::with_base_url(&server.uri()).unwrap();
    let err = fetch_listing_row_ids(&client).await.unwrap_err();
    assert!(matches!(
        err,
        malinaw_lib::hrep_api::Error::HttpStatus { status: 502, .. }
    ));
}

#[tokio::test]
async fn minimum_row_count_is_enforced() {
    let server = MockServer::start().await;
    mount_modal(
        &server,
        "7",
        ResponseTemplate::new(200).set_body_string(load_fixture("history_modal_dup.html")),
    )
    .await;

    let dir = tempfile::tempdir().unwrap();
    let fetcher =
        HttpModalFetcher::new(Client::with_base_url(&server.uri()).unwrap()).with_min_rows(7);
    let outcome = Pipeline::new(fetcher, dir.path())
        .run(&ids(&["7"]))
        .await
        .unwrap();

    assert!(outcome.bills.is_empty());
    assert_eq!(
        outcome.failures[0].error,
        "Fetch error: expected at least 7 rows in history modal, found 6"
    );
}
