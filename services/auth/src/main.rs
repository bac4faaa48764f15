use sea_orm::Database;
use tracing::info;

use datn_auth::config::AuthConfig;
use datn_auth::infra::google::GoogleIdentityClient;
use datn_auth::router::build_router;
use datn_auth::state::AppState;
use datn_auth::usecase::token::TokenIssuer;
use datn_core::tracing::init_tracing;

#[tokio::main]
async fn main() {
    init_tracing();

    let config = AuthConfig::from_env();

    let db = Database::connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    let issuer = TokenIssuer::new(
        &config.jwt_secret,
        config.access_token_ttl_secs,
        config.refresh_token_ttl_secs,
    );

    let google = GoogleIdentityClient::new(&config.google_userinfo_url, config.google_timeout)
        .expect("failed to build google client");

    let state = AppState { db, issuer, google };

    let router = build_router(state);
    let addr = format!("0.0.0.0:{}", config.auth_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");

    info!("auth service listening on {addr}");
    axum::serve(listener, router).await.expect("server error");
}
