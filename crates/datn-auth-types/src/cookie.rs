//! Cookie builders for the refresh token.
//!
//! The access token travels in the response body and the `Authorization`
//! header; only the refresh token is kept in a cookie.

use axum_extra::extract::cookie::{Cookie, CookieJar};
use time::Duration;

/// Cookie name for the refresh token.
pub const REFRESH_TOKEN_COOKIE: &str = "refresh_token";

fn refresh_cookie(value: String, max_age: Duration) -> Cookie<'static> {
    Cookie::build((REFRESH_TOKEN_COOKIE, value))
        .path("/")
        .max_age(max_age)
        .http_only(true)
        .secure(true)
        .build()
}

/// Set the refresh-token cookie on the jar.
///
/// ```
/// use axum_extra::extract::cookie::CookieJar;
/// use datn_auth_types::cookie::{set_refresh_token_cookie, REFRESH_TOKEN_COOKIE};
///
/// let jar = CookieJar::new();
/// let jar = set_refresh_token_cookie(jar, "refresh_value".to_string(), 604800);
/// let cookie = jar.get(REFRESH_TOKEN_COOKIE).unwrap();
/// assert_eq!(cookie.value(), "refresh_value");
/// assert_eq!(cookie.path(), Some("/"));
/// assert_eq!(cookie.max_age(), Some(time::Duration::seconds(604800)));
/// assert!(cookie.http_only().unwrap_or(false));
/// assert!(cookie.secure().unwrap_or(false));
/// ```
pub fn set_refresh_token_cookie(jar: CookieJar, value: String, max_age_secs: u64) -> CookieJar {
    let max_age = Duration::seconds(i64::try_from(max_age_secs).unwrap_or(i64::MAX));
    jar.add(refresh_cookie(value, max_age))
}

/// Expire the refresh-token cookie (`Max-Age=0`, empty value).
///
/// ```
/// use axum_extra::extract::cookie::CookieJar;
/// use datn_auth_types::cookie::{
///     clear_refresh_token_cookie, set_refresh_token_cookie, REFRESH_TOKEN_COOKIE,
/// };
///
/// let jar = set_refresh_token_cookie(CookieJar::new(), "r".to_string(), 60);
/// let jar = clear_refresh_token_cookie(jar);
/// let cookie = jar.get(REFRESH_TOKEN_COOKIE).unwrap();
/// assert_eq!(cookie.value(), "");
/// assert_eq!(cookie.max_age(), Some(time::Duration::ZERO));
/// ```
pub fn clear_refresh_token_cookie(jar: CookieJar) -> CookieJar {
    jar.add(refresh_cookie(String::new(), Duration::ZERO))
}

/// Read the refresh token from the request cookies. Empty values count as absent.
pub fn refresh_token_from(jar: &CookieJar) -> Option<String> {
    jar.get(REFRESH_TOKEN_COOKIE)
        .map(|c| c.value().to_owned())
        .filter(|v| !v.is_empty())
}
