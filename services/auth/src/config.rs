use std::time::Duration;

/// Default access-token lifetime: 30 minutes.
pub const DEFAULT_ACCESS_TOKEN_TTL_SECS: u64 = 1800;

/// Default refresh-token lifetime and cookie Max-Age: 7 days.
pub const DEFAULT_REFRESH_TOKEN_TTL_SECS: u64 = 604_800;

pub const DEFAULT_GOOGLE_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v3/userinfo";

/// Auth service configuration loaded from environment variables.
#[derive(Debug)]
pub struct AuthConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// HMAC secret for signing JWT access and refresh tokens.
    pub jwt_secret: String,
    /// TCP port to listen on (default 8080). Env var: `AUTH_PORT`.
    pub auth_port: u16,
    /// Env var: `ACCESS_TOKEN_TTL_SECS`.
    pub access_token_ttl_secs: u64,
    /// Env var: `REFRESH_TOKEN_TTL_SECS`.
    pub refresh_token_ttl_secs: u64,
    /// Google OAuth2 userinfo endpoint. Env var: `GOOGLE_USERINFO_URL`.
    pub google_userinfo_url: String,
    /// Timeout for the userinfo call (default 10s). Env var: `GOOGLE_TIMEOUT_SECS`.
    pub google_timeout: Duration,
}

/// `default` when `raw` is absent; panics naming `name` when it is present but
/// does not parse.
fn parse_var<T: std::str::FromStr>(name: &str, raw: Option<&str>, default: T) -> T {
    match raw {
        None => default,
        Some(v) => v
            .trim()
            .parse()
            .unwrap_or_else(|_| panic!("{name} must be a valid number, got {v:?}")),
    }
}

fn parse_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    parse_var(name, std::env::var(name).ok().as_deref(), default)
}

impl AuthConfig {
    pub fn from_env() -> Self {
        let jwt_secret = std::env::var("JWT_SECRET").expect("JWT_SECRET");
        assert!(!jwt_secret.is_empty(), "JWT_SECRET must not be empty");

        let access_token_ttl_secs =
            parse_or("ACCESS_TOKEN_TTL_SECS", DEFAULT_ACCESS_TOKEN_TTL_SECS);
        let refresh_token_ttl_secs =
            parse_or("REFRESH_TOKEN_TTL_SECS", DEFAULT_REFRESH_TOKEN_TTL_SECS);
        assert!(
            access_token_ttl_secs < refresh_token_ttl_secs,
            "ACCESS_TOKEN_TTL_SECS must be shorter than REFRESH_TOKEN_TTL_SECS"
        );

        Self {
            database_url: std::env::var("DATABASE_URL").expect("DATABASE_URL"),
            jwt_secret,
            auth_port: parse_or("AUTH_PORT", 8080),
            access_token_ttl_secs,
            refresh_token_ttl_secs,
            google_userinfo_url: std::env::var("GOOGLE_USERINFO_URL")
                .unwrap_or_else(|_| DEFAULT_GOOGLE_USERINFO_URL.to_owned()),
            google_timeout: Duration::from_secs(parse_or("GOOGLE_TIMEOUT_SECS", 10)),
        }
    }
}
