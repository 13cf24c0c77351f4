use hrep_api::Client;
use wiremock::matchers::{body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn load_fixture(name: &str) -> String {
    std::fs::read_to_string(format!("tests/fixtures/{}", name)).unwrap()
}

#[tokio::test]
async fn fetch_history_posts_row_id_form_field() {
    let mock_server = MockServer::start().await;
    let body = load_fixture("history_modal.html");

    Mock::given(method("POST"))
        .and(path("/legisdocs/fetch_history.php"))
        .and(body_string_contains("name=\"rowid\""))
        .and(body_string_contains("58230"))
        .respond_with(ResponseTemplate::new(200).set_body_string(&body))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = Client::with_base_url(&mock_server.uri()).unwrap();
    let html = client.fetch_history("58230").await.unwrap();
    assert!(html.contains("HB00123"));
}

#[tokio::test]
async fn fetch_history_rows_flattens_table() {
    let mock_server = MockServer::start().await;
    let body = load_fixture("history_modal.html");

    Mock::given(method("POST"))
        .and(path("/legisdocs/fetch_history.php"))
        .respond_with(ResponseTemplate::new(200).set_body_string(&body))
        .mount(&mock_server)
        .await;

    let client = Client::with_base_url(&mock_server.uri()).unwrap();
    let rows = client.fetch_history_rows("58230").await.unwrap();
    assert_eq!(rows.len(), 11);
    assert!(rows[0].is_emphasized());
    assert_eq!(rows[6].raw_text(), Some("SIGNIFICANCE: LOCAL"));
}

#[tokio::test]
async fn fetch_history_server_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/legisdocs/fetch_history.php"))
        .respond_with(ResponseTemplate::new(503).set_body_string("Service Unavailable"))
        .mount(&mock_server)
        .await;

    let client = Client::with_base_url(&mock_server.uri()).unwrap();
    let result = client.fetch_history("58230").await;
    match result {
        Err(hrep_api::Error::HttpStatus { status, body }) => {
            assert_eq!(status, 503);
            assert_eq!(body, "Service Unavailable");
        }
        other => panic!("expected HttpStatus error, got {:?}", other.map(|_| ())),
    }
}

#[tokio::test]
async fn fetch_history_unreachable_host() {
    // Nothing listens on port 9 on localhost.
    let client = Client::with_base_url("http://127.0.0.1:9").unwrap();
    let result = client.fetch_history("1").await;
    assert!(matches!(result, Err(hrep_api::Error::RequestFailed(_))));
}

#[tokio::test]
async fn fetch_listing_success() {
    let mock_server = MockServer::start().await;
    let body = load_fixture("listing.html");

    Mock::given(method("GET"))
        .and(path("/legisdocs/"))
        .and(query_param("v", "bills"))
        .respond_with(ResponseTemplate::new(200).set_body_string(&body))
        .mount(&mock_server)
        .await;

    let client = Client::with_base_url(&mock_server.uri()).unwrap();
    let html = client.fetch_listing().await.unwrap();
    assert_eq!(hrep_api::extract_row_ids(&html), vec!["58230", "58231"]);
}

#[test]
fn invalid_base_url_is_rejected() {
    assert!(matches!(
        Client::with_base_url("not a url"),
        Err(hrep_api::Error::InvalidUrl(_))
    ));
}
