//! Zip code lookup behaviour observed through the app

use std::time::Duration;

use signup_engine::{App, FieldName, LOOKUP_NOT_FOUND_MESSAGE};
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common::{app_for, fill, mount_cep, mount_cep_body, tick_for, tick_until};

fn blur_with(app: &mut App, zipcode: &str) {
    fill(app, FieldName::Zipcode, zipcode);
    app.set_focus(FieldName::Address);
}

#[tokio::test]
async fn leaving_zipcode_fills_city_and_state() {
    let server = MockServer::start().await;
    mount_cep(&server, "01310-100", "São Paulo", "SP", Duration::ZERO).await;
    let mut app = app_for(&server);

    blur_with(&mut app, "01310100");
    assert!(app.is_loading_zipcode());
    tick_until(&mut app, |app| !app.is_loading_zipcode()).await;

    assert_eq!(app.values().city, "São Paulo");
    assert_eq!(app.values().state, "SP");
    assert_eq!(app.error(FieldName::Zipcode), None);
}

#[tokio::test]
async fn slower_earlier_lookup_never_overwrites_later_one() {
    let server = MockServer::start().await;
    mount_cep(&server, "11111-111", "First", "AA", Duration::from_millis(600)).await;
    mount_cep(&server, "22222-222", "Second", "BB", Duration::ZERO).await;
    let mut app = app_for(&server);

    blur_with(&mut app, "11111111");
    blur_with(&mut app, "22222222");
    tick_until(&mut app, |app| !app.is_loading_zipcode()).await;
    assert_eq!(app.values().city, "Second");
    assert_eq!(app.values().state, "BB");

    // Outlive the first response's delay; it must stay invisible.
    tick_for(&mut app, Duration::from_millis(800)).await;
    assert_eq!(app.values().city, "Second");
    assert_eq!(app.values().state, "BB");
}

#[tokio::test]
async fn empty_zipcode_issues_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let mut app = app_for(&server);

    app.set_focus(FieldName::Zipcode);
    app.set_focus(FieldName::Address);
    assert!(!app.is_loading_zipcode());
    tick_for(&mut app, Duration::from_millis(50)).await;
    assert_eq!(app.values().city, "");
}

#[tokio::test]
async fn lookup_without_city_and_state_leaves_them_empty() {
    let server = MockServer::start().await;
    mount_cep_body(&server, "01310-100", serde_json::json!({"cep": "01310100"})).await;
    let mut app = app_for(&server);

    blur_with(&mut app, "01310100");
    tick_until(&mut app, |app| !app.is_loading_zipcode()).await;

    assert_eq!(app.values().city, "");
    assert_eq!(app.values().state, "");
    assert_eq!(app.error(FieldName::Zipcode), None);
}

#[tokio::test]
async fn unknown_zipcode_shows_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "name": "CepPromiseError",
            "message": "Todos os serviços de CEP retornaram erro.",
        })))
        .mount(&server)
        .await;
    let mut app = app_for(&server);

    blur_with(&mut app, "99999999");
    tick_until(&mut app, |app| !app.is_loading_zipcode()).await;

    assert_eq!(app.error(FieldName::Zipcode), Some(LOOKUP_NOT_FOUND_MESSAGE));
    assert_eq!(app.values().city, "");
}
