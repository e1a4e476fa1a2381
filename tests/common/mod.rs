//! Shared test utilities and fixtures
//!
//! Mock postal and registration endpoints plus helpers that drive an [`App`]
//! the way the frame loop does.

#![allow(dead_code)]

use std::time::Duration;

use tokio::time::sleep;

use signup_engine::{App, FieldName, PostalClient, RegistrationClient};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const REGISTER_PATH: &str = "/api/register-user/register";

/// Build an app whose postal and registration clients both point at `server`.
pub fn app_for(server: &MockServer) -> App {
    let timeout = Duration::from_secs(5);
    let postal = PostalClient::new(&server.uri(), timeout).expect("postal client");
    let registration =
        RegistrationClient::new(&format!("{}{REGISTER_PATH}", server.uri()), timeout)
            .expect("registration client");
    App::with_clients(postal, registration)
}

/// Mount a zip code lookup answering with `city` and `state` after `delay`.
pub async fn mount_cep(
    server: &MockServer,
    zipcode: &str,
    city: &str,
    state: &str,
    delay: Duration,
) {
    Mock::given(method("GET"))
        .and(path(format!("/api/cep/v2/{zipcode}")))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({
                    "cep": zipcode,
                    "state": state,
                    "city": city,
                    "neighborhood": "Bela Vista",
                    "street": "Avenida Paulista",
                    "service": "open-cep"
                }))
                .set_delay(delay),
        )
        .mount(server)
        .await;
}

/// Mount a zip code lookup answering with an arbitrary JSON body.
pub async fn mount_cep_body(server: &MockServer, zipcode: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(format!("/api/cep/v2/{zipcode}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// Mount a registration endpoint answering with `status` and `body`,
/// expecting exactly `calls` requests.
pub async fn mount_register(
    server: &MockServer,
    status: u16,
    body: serde_json::Value,
    calls: u64,
) {
    Mock::given(method("POST"))
        .and(path(REGISTER_PATH))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .expect(calls)
        .mount(server)
        .await;
}

/// Focus `field` and type `text` into it.
pub fn fill(app: &mut App, field: FieldName, text: &str) {
    app.set_focus(field);
    app.clear_field();
    app.insert_text(text);
}

/// Fill every user-editable field with valid data. City and state are left
/// to the zip code lookup.
pub fn fill_valid(app: &mut App, zipcode: &str) {
    fill(app, FieldName::Name, "Maria");
    fill(app, FieldName::LastName, "Souza");
    fill(app, FieldName::Phone, "11987654321");
    fill(app, FieldName::Cpf, "12345678900");
    fill(app, FieldName::Zipcode, zipcode);
    fill(app, FieldName::Address, "Avenida Paulista");
    fill(app, FieldName::AddressNumber, "1578");
    fill(app, FieldName::Email, "maria@example.com");
    fill(app, FieldName::Password, "hunter2hunter2");
    fill(app, FieldName::PasswordConfirmation, "hunter2hunter2");
    app.set_focus(FieldName::Terms);
    if !app.values().terms {
        app.toggle_terms();
    }
}

/// Tick the app every 10ms until `done` holds. Panics after five seconds.
pub async fn tick_until(app: &mut App, mut done: impl FnMut(&App) -> bool) {
    for _ in 0..500 {
        app.tick();
        if done(app) {
            return;
        }
        sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not reached within 5s");
}

/// Tick the app for `duration` without waiting on any condition.
pub async fn tick_for(app: &mut App, duration: Duration) {
    let steps = duration.as_millis() / 10;
    for _ in 0..steps {
        app.tick();
        sleep(Duration::from_millis(10)).await;
    }
    app.tick();
}
