//! Refresh-token cookie handling.

use axum::http::header;
use url::form_urlencoded;

/// Cookie name for the refresh token.
pub const REFRESH_COOKIE_NAME: &str = "Refresh-token";

/// Extract a cookie value from the Cookie header.
pub fn get_cookie<'a>(headers: &'a axum::http::HeaderMap, name: &str) -> Option<&'a str> {
    let cookie_header = headers.get(header::COOKIE)?.to_str().ok()?;
    for part in cookie_header.split(';') {
        let part = part.trim();
        if let Some((key, value)) = part.split_once('=') {
            if key.trim() == name {
                return Some(value.trim());
            }
        }
    }
    None
}

/// Percent-encode a cookie value, spaces as `%20` rather than `+`.
pub fn encode_cookie_value(value: &str) -> String {
    form_urlencoded::byte_serialize(value.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

/// Reverse of [`encode_cookie_value`].
pub fn decode_cookie_value(value: &str) -> String {
    form_urlencoded::parse(value.as_bytes())
        .next()
        .map(|(decoded, _)| decoded.into_owned())
        .unwrap_or_default()
}

/// `Set-Cookie` value delivering a refresh token.
pub fn refresh_cookie(token: &str, max_age: u64) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; Secure; SameSite=None; Max-Age={}",
        REFRESH_COOKIE_NAME,
        encode_cookie_value(token),
        max_age
    )
}

/// `Set-Cookie` value removing the refresh token.
pub fn clear_refresh_cookie() -> String {
    format!(
        "{}=; Path=/; HttpOnly; Secure; SameSite=None; Max-Age=0",
        REFRESH_COOKIE_NAME
    )
}

/// Read and decode the refresh token cookie.
pub fn get_refresh_token(headers: &axum::http::HeaderMap) -> Option<String> {
    let raw = get_cookie(headers, REFRESH_COOKIE_NAME)?;
    let token = decode_cookie_value(raw);
    if token.is_empty() { None } else { Some(token) }
}
