//! Registration submit flow observed through the app

use std::time::Duration;

use signup_engine::{Banner, FieldName};
use wiremock::MockServer;

use crate::common::{app_for, fill, fill_valid, mount_cep, mount_register, tick_until};

#[tokio::test]
async fn successful_registration_resets_the_form() {
    let server = MockServer::start().await;
    mount_cep(&server, "01310-100", "São Paulo", "SP", Duration::ZERO).await;
    mount_register(
        &server,
        201,
        serde_json::json!({"message": "User registered"}),
        1,
    )
    .await;
    let mut app = app_for(&server);

    fill_valid(&mut app, "01310100");
    tick_until(&mut app, |app| !app.is_loading_zipcode()).await;
    assert_eq!(app.values().city, "São Paulo");

    app.submit();
    assert!(app.is_submitting());
    tick_until(&mut app, |app| !app.is_submitting()).await;

    assert_eq!(app.banner(), Some(Banner::Success));
    assert!(app.values().is_pristine());
    assert!(app.form().errors().is_empty());
    assert_eq!(app.focus(), FieldName::Name);
    assert_eq!(app.scroll_offset_from_top(), Some(0));
}

#[tokio::test]
async fn server_field_errors_land_on_their_fields() {
    let server = MockServer::start().await;
    mount_cep(&server, "01310-100", "São Paulo", "SP", Duration::ZERO).await;
    mount_register(
        &server,
        422,
        serde_json::json!({
            "message": "The email has already been taken.",
            "errors": {"email": ["The email has already been taken."]}
        }),
        1,
    )
    .await;
    let mut app = app_for(&server);

    fill_valid(&mut app, "01310100");
    tick_until(&mut app, |app| !app.is_loading_zipcode()).await;
    app.submit();
    tick_until(&mut app, |app| !app.is_submitting()).await;

    assert_eq!(app.banner(), Some(Banner::Failure));
    assert_eq!(
        app.error(FieldName::Email),
        Some("The email has already been taken.")
    );
    assert_eq!(app.values().name, "Maria");

    // Editing the field after a submit re-runs local rules only.
    fill(&mut app, FieldName::Email, "other@example.com");
    assert_eq!(app.error(FieldName::Email), None);
}

#[tokio::test]
async fn mismatched_passwords_never_reach_the_server() {
    let server = MockServer::start().await;
    mount_cep(&server, "01310-100", "São Paulo", "SP", Duration::ZERO).await;
    mount_register(&server, 201, serde_json::json!({}), 0).await;
    let mut app = app_for(&server);

    fill_valid(&mut app, "01310100");
    fill(&mut app, FieldName::PasswordConfirmation, "hunter3hunter3");
    tick_until(&mut app, |app| !app.is_loading_zipcode()).await;

    app.submit();
    assert!(!app.is_submitting());
    assert_eq!(app.banner(), Some(Banner::Failure));
    assert_eq!(
        app.error(FieldName::PasswordConfirmation),
        Some("Passwords do not match.")
    );

    fill(&mut app, FieldName::PasswordConfirmation, "hunter2hunter2");
    assert_eq!(app.error(FieldName::PasswordConfirmation), None);
}

#[tokio::test]
async fn server_outage_keeps_values_and_shows_failure() {
    let server = MockServer::start().await;
    mount_cep(&server, "01310-100", "São Paulo", "SP", Duration::ZERO).await;
    mount_register(&server, 503, serde_json::json!({"message": "down"}), 1).await;
    let mut app = app_for(&server);

    fill_valid(&mut app, "01310100");
    tick_until(&mut app, |app| !app.is_loading_zipcode()).await;
    app.submit();
    tick_until(&mut app, |app| !app.is_submitting()).await;

    assert_eq!(app.banner(), Some(Banner::Failure));
    assert!(app.form().errors().is_empty());
    assert_eq!(app.values().email, "maria@example.com");
}
