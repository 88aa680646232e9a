//! MDC Web Server
//!
//! Axum server exposing the console over REST, a raw key-value endpoint,
//! a WebSocket sync bridge, and the internal notify hook.

pub mod routes;
pub mod state;
pub mod websocket;

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use mdc_core::Origin;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        // Key-value
        .route(
            "/storage",
            get(routes::storage::get_value).post(routes::storage::set_value),
        )
        // Crews
        .route(
            "/crews",
            get(routes::crews::list_crews).post(routes::crews::create_crew),
        )
        .route(
            "/crews/{id}",
            put(routes::crews::update_crew).delete(routes::crews::delete_crew),
        )
        // Calls
        .route(
            "/calls",
            get(routes::calls::list_calls).post(routes::calls::create_call),
        )
        .route("/calls/{id}/assign", post(routes::calls::assign_crew))
        .route("/calls/{id}/status", put(routes::calls::update_status))
        // Signal 100
        .route(
            "/signal100",
            get(routes::signal100::get_signal100)
                .post(routes::signal100::activate)
                .delete(routes::signal100::reset),
        )
        // Presence
        .route(
            "/online-users",
            get(routes::online_users::list_online_users).post(routes::online_users::heartbeat),
        )
        .route(
            "/online-users/{id}",
            delete(routes::online_users::remove_online_user),
        )
        .with_state(state.clone());

    Router::new()
        .nest("/api", api_routes)
        .route("/ws", get(websocket::ws_handler))
        .route("/internal/notify", post(routes::internal::notify))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Run the web server until it fails.
pub async fn run_server(origin: Origin, host: &str, port: u16) -> anyhow::Result<()> {
    let state = AppState::new(origin)?;
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(format!("{}:{}", host, port)).await?;
    tracing::info!("Web server listening on http://{}:{}", host, port);

    axum::serve(listener, app).await?;
    Ok(())
}
