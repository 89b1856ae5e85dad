use axum::Json;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use serde_json::json;

use super::*;
use crate::session::{MemoryBackend, Role};
use crate::test_support::{SeenAuth, config_for, dead_gateway, spawn_gateway};

fn app_over(base_url: &str, backend: MemoryBackend) -> App {
    let store = Arc::new(SessionStore::open(backend));
    App::new(&config_for(base_url), store).unwrap()
}

fn gateway(login_role: &'static str, seen: SeenAuth) -> axum::Router {
    let book_seen = seen.clone();
    axum::Router::new()
        .route(
            "/api/auth/login",
            post(move |Json(body): Json<Value>| async move {
                if body["password"] == "secret1" {
                    (
                        StatusCode::OK,
                        Json(json!({ "token": "T", "role": login_role, "message": "ok" })),
                    )
                } else {
                    (
                        StatusCode::UNAUTHORIZED,
                        Json(json!({ "error": "Invalid credentials" })),
                    )
                }
            }),
        )
        .route(
            "/api/cars",
            get(|| async { Json(json!([])) }).post(move |headers: HeaderMap| {
                let seen = seen.clone();
                async move {
                    seen.record(&headers);
                    (
                        StatusCode::CREATED,
                        Json(json!({ "_id": "n1", "name": "Innova", "type": "SUV", "price": 2500 })),
                    )
                }
            }),
        )
        .route(
            "/api/cars/book",
            post(move |headers: HeaderMap, Json(body): Json<Value>| {
                let seen = book_seen.clone();
                async move {
                    seen.record(&headers);
                    Json(json!({ "message": "Booking confirmed", "carId": body["carId"] }))
                }
            }),
        )
}

// =============================================================================
// Login / logout scenarios
// =============================================================================

#[tokio::test]
async fn admin_login_unlocks_dashboard_and_redirects_login() {
    let backend = MemoryBackend::default();
    let base = spawn_gateway(gateway("admin", SeenAuth::default())).await;
    let app = app_over(&base, backend.clone());

    let landing = app.login("a@b.com", "secret1").await.unwrap();
    assert_eq!(landing.landed, Route::Dashboard);
    assert_eq!(app.session(), Some(Session::new("T", Role::Admin).unwrap()));
    assert_eq!(app.state(), AuthState::AuthenticatedAdmin);

    assert_eq!(app.navigate("/dashboard").landed, Route::Dashboard);
    let nav = app.navigate("/login");
    assert_eq!(nav.landed, Route::Dashboard);
    assert!(nav.redirected);

    // Reload sees the same session.
    let reloaded = app_over(&base, backend);
    assert_eq!(reloaded.state(), AuthState::AuthenticatedAdmin);
}

#[tokio::test]
async fn user_login_lands_on_catalog_and_is_denied_dashboard() {
    let base = spawn_gateway(gateway("user", SeenAuth::default())).await;
    let app = app_over(&base, MemoryBackend::default());

    let landing = app.login("a@b.com", "secret1").await.unwrap();
    assert_eq!(landing.landed, Route::Cars);

    let nav = app.navigate("/dashboard");
    assert_eq!(nav.landed, Route::Login);
    assert!(nav.redirected);
}

#[tokio::test]
async fn rejected_credentials_stay_anonymous() {
    let base = spawn_gateway(gateway("user", SeenAuth::default())).await;
    let app = app_over(&base, MemoryBackend::default());

    let err = app.login("a@b.com", "wrong12").await.unwrap_err();
    assert!(matches!(err, ClientError::Authentication(_)));
    assert_eq!(app.state(), AuthState::Anonymous);
}

#[tokio::test]
async fn unreachable_gateway_login_stays_anonymous() {
    let base = dead_gateway().await;
    let app = app_over(&base, MemoryBackend::default());

    let err = app.login("a@b.com", "secret1").await.unwrap_err();
    assert!(matches!(err, ClientError::Network(_)));
    assert_eq!(app.state(), AuthState::Anonymous);
}

#[tokio::test]
async fn invalid_login_input_sends_nothing() {
    let base = dead_gateway().await;
    let app = app_over(&base, MemoryBackend::default());

    let err = app.login("not-an-email", "secret1").await.unwrap_err();
    assert!(matches!(err, ClientError::Validation(_)));
}

#[tokio::test]
async fn logout_clears_session_and_revokes_views() {
    let backend = MemoryBackend::default();
    let base = spawn_gateway(gateway("admin", SeenAuth::default())).await;
    let app = app_over(&base, backend.clone());
    app.login("a@b.com", "secret1").await.unwrap();

    let landing = app.logout().unwrap();
    assert_eq!(landing.landed, Route::Login);
    assert_eq!(app.state(), AuthState::Anonymous);
    assert_eq!(app.navigate("/dashboard").landed, Route::Login);

    let reloaded = app_over(&base, backend);
    assert!(reloaded.session().is_none());
}

#[tokio::test]
async fn logout_twice_is_fine() {
    let base = dead_gateway().await;
    let app = app_over(&base, MemoryBackend::default());
    app.logout().unwrap();
    app.logout().unwrap();
}

// =============================================================================
// View actions
// =============================================================================

#[tokio::test]
async fn anonymous_booking_redirects_without_request() {
    let seen = SeenAuth::default();
    let base = spawn_gateway(gateway("user", seen.clone())).await;
    let app = app_over(&base, MemoryBackend::default());

    let err = app.book("c1", "2026-01-01", "2026-01-02").await.unwrap_err();
    match err {
        ClientError::Redirected { from, to } => {
            assert_eq!(from, "/book");
            assert_eq!(to, Route::Login);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(!ClientError::Redirected { from: String::new(), to: Route::Login }.is_failure());
    assert!(seen.all().is_empty());
}

#[tokio::test]
async fn user_booking_sends_bearer_and_confirms() {
    let seen = SeenAuth::default();
    let base = spawn_gateway(gateway("user", seen.clone())).await;
    let app = app_over(&base, MemoryBackend::default());
    app.login("a@b.com", "secret1").await.unwrap();

    let confirmation = app.book("c1", "2026-01-01", "2026-01-02").await.unwrap();
    assert_eq!(confirmation["carId"], "c1");
    assert_eq!(seen.all(), vec![Some("Bearer T".to_owned())]);
}

#[tokio::test]
async fn admin_booking_is_unavailable() {
    let seen = SeenAuth::default();
    let base = spawn_gateway(gateway("admin", seen.clone())).await;
    let app = app_over(&base, MemoryBackend::default());
    app.login("a@b.com", "secret1").await.unwrap();

    let err = app.book("c1", "2026-01-01", "2026-01-02").await.unwrap_err();
    assert!(matches!(err, ClientError::ActionUnavailable(_)));
    assert!(seen.all().is_empty());
}

#[tokio::test]
async fn user_cannot_add_car() {
    let seen = SeenAuth::default();
    let base = spawn_gateway(gateway("user", seen.clone())).await;
    let app = app_over(&base, MemoryBackend::default());
    app.login("a@b.com", "secret1").await.unwrap();

    let err = app.add_car("Innova", "SUV", "2500").await.unwrap_err();
    assert!(matches!(err, ClientError::Redirected { to: Route::Login, .. }));
    assert!(seen.all().is_empty());
}

#[tokio::test]
async fn admin_adds_car() {
    let seen = SeenAuth::default();
    let base = spawn_gateway(gateway("admin", seen.clone())).await;
    let app = app_over(&base, MemoryBackend::default());
    app.login("a@b.com", "secret1").await.unwrap();

    let car = app.add_car("Innova", "SUV", "2500").await.unwrap();
    assert_eq!(car.id, "n1");
    assert_eq!(seen.all(), vec![Some("Bearer T".to_owned())]);
}

#[tokio::test]
async fn admin_add_car_validates_price() {
    let base = spawn_gateway(gateway("admin", SeenAuth::default())).await;
    let app = app_over(&base, MemoryBackend::default());
    app.login("a@b.com", "secret1").await.unwrap();

    let err = app.add_car("Innova", "SUV", "50").await.unwrap_err();
    assert!(matches!(err, ClientError::Validation(_)));
}

#[tokio::test]
async fn catalog_is_public() {
    let base = spawn_gateway(gateway("user", SeenAuth::default())).await;
    let app = app_over(&base, MemoryBackend::default());
    assert!(app.list_cars().await.unwrap().is_empty());
}
