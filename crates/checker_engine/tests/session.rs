use checker_core::Category;
use checker_engine::{
    grid_rows, Credentials, HttpPortalSession, PortalEndpoints, PortalSession, SessionError,
    SessionSettings,
};
use pretty_assertions::assert_eq;
use url::Url;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const LOGGED_IN_PAGE: &str = "<html><body><h1>Student Portal</h1></body></html>";

const LOGIN_PAGE: &str = r#"<html><body>
<form action="/login" method="post">
<input type="text" id="userid" name="userid">
<input type="password" id="pwd" name="pwd">
</form>
</body></html>"#;

const MESSAGES_PAGE: &str = r##"<html><body>
<table class="PSLEVEL1GRID">
<tr><th>Select</th><th>From</th><th>a</th><th>b</th><th>Expires</th><th>Subject</th></tr>
<tr id="trMESSAGES$0_row1">
  <td> </td><td><span>Registrar</span></td><td></td><td></td>
  <td>06/01/2024</td><td><a href="#">Enrollment Confirmed</a></td>
</tr>
<tr id="trMESSAGES$0_row2">
  <td> </td><td>Housing</td><td></td><td></td>
  <td>07/01/2024</td><td>Room Assignment</td>
</tr>
</table>
</body></html>"##;

const CHARGES_PAGE: &str = r#"<html><body>
<table class="PSLEVEL1GRID">
<tr><th>Due Date</th><th>Charge</th></tr>
<tr id="trCHARGES$0_row1"><td>05/15/2024</td><td>150.00</td></tr>
</table>
<table class="PSLEVEL2GRID">
<tr id="trOTHER$0_row1"><td>not</td><td>this one</td></tr>
</table>
</body></html>"#;

fn credentials() -> Credentials {
    Credentials {
        portal_username: "slug".to_string(),
        portal_password: "banana".to_string(),
        email_address: "slug@example.com".to_string(),
        email_password: "hunter2".to_string(),
    }
}

fn session_for(server: &MockServer) -> HttpPortalSession {
    let base = Url::parse(&server.uri()).unwrap();
    HttpPortalSession::new(
        PortalEndpoints::new(base),
        SessionSettings::default(),
        &credentials(),
    )
    .unwrap()
}

async fn mount_login(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/login"))
        .and(body_string_contains("userid=slug"))
        .and(body_string_contains("pwd=banana"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(LOGGED_IN_PAGE, "text/html"))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn logs_in_once_and_returns_data_rows_for_both_categories() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    Mock::given(method("GET"))
        .and(path("/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(MESSAGES_PAGE, "text/html"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/charges"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(CHARGES_PAGE, "text/html"))
        .mount(&server)
        .await;

    let mut session = session_for(&server);

    let messages = session.table_rows(Category::Messages).await.unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0][1], "Registrar");
    assert_eq!(messages[0][4], "06/01/2024");
    assert_eq!(messages[0][5], "Enrollment Confirmed");
    assert_eq!(messages[1][5], "Room Assignment");

    // Second category reuses the logged-in session; the login mock's
    // expect(1) verifies no second POST happened.
    let charges = session.table_rows(Category::Charges).await.unwrap();
    assert_eq!(charges, vec![vec!["05/15/2024".to_string(), "150.00".to_string()]]);
}

#[tokio::test]
async fn rejected_login_surfaces_before_any_table_fetch() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(LOGIN_PAGE, "text/html"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/messages"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut session = session_for(&server);
    let err = session.table_rows(Category::Messages).await.unwrap_err();
    assert!(matches!(err, SessionError::LoginRejected));
}

#[tokio::test]
async fn http_failure_on_a_category_page_maps_to_status_error() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    Mock::given(method("GET"))
        .and(path("/charges"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let mut session = session_for(&server);
    let err = session.table_rows(Category::Charges).await.unwrap_err();
    assert!(matches!(err, SessionError::HttpStatus(500)));
}

#[tokio::test]
async fn oversized_page_is_rejected() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    Mock::given(method("GET"))
        .and(path("/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(MESSAGES_PAGE, "text/html"))
        .mount(&server)
        .await;

    let base = Url::parse(&server.uri()).unwrap();
    let settings = SessionSettings {
        max_bytes: 32,
        ..SessionSettings::default()
    };
    let mut session =
        HttpPortalSession::new(PortalEndpoints::new(base), settings, &credentials()).unwrap();
    let err = session.table_rows(Category::Messages).await.unwrap_err();
    assert!(matches!(err, SessionError::TooLarge { max_bytes: 32, .. }));
}

#[tokio::test]
async fn non_utf8_pages_are_decoded_before_scraping() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    // "café" in ISO-8859-1.
    let body: Vec<u8> = b"<html><body><table class=\"PSLEVEL1GRID\">\
<tr id=\"row1\"><td>05/15/2024</td><td>caf\xe9</td></tr>\
</table></body></html>"
        .to_vec();
    Mock::given(method("GET"))
        .and(path("/charges"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/html; charset=ISO-8859-1"))
        .mount(&server)
        .await;

    let mut session = session_for(&server);
    let charges = session.table_rows(Category::Charges).await.unwrap();
    assert_eq!(charges[0][1], "café");
}

#[test]
fn grid_rows_keeps_only_rows_with_row_ids() {
    let rows = grid_rows(MESSAGES_PAGE);
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].len(), 6);
}

#[test]
fn grid_rows_ignores_other_tables() {
    let rows = grid_rows(CHARGES_PAGE);
    assert_eq!(rows, vec![vec!["05/15/2024".to_string(), "150.00".to_string()]]);
}

#[test]
fn grid_rows_on_a_page_without_the_grid_is_empty() {
    assert!(grid_rows(LOGGED_IN_PAGE).is_empty());
}
