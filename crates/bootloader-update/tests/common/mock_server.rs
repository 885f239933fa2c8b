//! Mock server helpers for update service testing

use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::constants::*;

/// Respond to any update check with `status` and `body`
pub async fn mock_check_response(server: &MockServer, status: u16, body: &str) {
    Mock::given(method("GET"))
        .and(path(CHECK_PATH))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .mount(server)
        .await;
}

/// Report that no newer version exists
pub async fn mock_up_to_date(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path(CHECK_PATH))
        .respond_with(ResponseTemplate::new(404))
        .mount(server)
        .await;
}

/// Serve `body` only for the given version query, 404 otherwise
pub async fn mock_update_for_version(
    server: &MockServer,
    major: &str,
    minor: &str,
    bugfix: &str,
    body: &str,
) {
    Mock::given(method("GET"))
        .and(path(CHECK_PATH))
        .and(query_param("major", major))
        .and(query_param("minor", minor))
        .and(query_param("bugfix", bugfix))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .with_priority(1)
        .mount(server)
        .await;

    mock_up_to_date(server).await;
}

/// Fail the test on drop if the update service is contacted at all
pub async fn mock_no_requests(server: &MockServer) {
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(server)
        .await;
}

/// Base URL of the mocked update check endpoint
pub fn check_url(server: &MockServer) -> String {
    format!("{}{}", server.uri(), CHECK_PATH)
}
