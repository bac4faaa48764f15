use axum::{
    Router,
    routing::{get, patch, post},
};
use tower_http::trace::TraceLayer;

use datn_core::health::{healthz, readyz};
use datn_core::middleware::{propagate_request_id_layer, request_id_layer};

use crate::handlers::{
    google::google_login,
    rating::{create_rating, list_ratings, respond_rating},
    session::{account, login, logout, refresh},
    signup::{forgot, register, resend, reset, verify},
};
use crate::state::AppState;

fn auth_routes() -> Router<AppState> {
    Router::new()
        // Session
        .route("/login", post(login))
        .route("/account", get(account))
        .route("/refresh", get(refresh))
        .route("/logout", post(logout))
        // External identity
        .route("/google", post(google_login))
        // Registration & recovery
        .route("/register", post(register))
        .route("/resend", post(resend))
        .route("/verify", post(verify))
        .route("/forgot", post(forgot))
        .route("/reset", post(reset))
}

fn rating_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_rating).get(list_ratings))
        .route("/{id}", patch(respond_rating))
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .nest("/api/v1/auth", auth_routes())
        .nest("/api/v1/ratings", rating_routes())
        .layer(propagate_request_id_layer())
        .layer(TraceLayer::new_for_http())
        .layer(request_id_layer())
        .with_state(state)
}
