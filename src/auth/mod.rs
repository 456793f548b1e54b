pub mod handlers;
pub mod session;

use axum::http::header;
use axum::http::request::Parts;

/// Build the Set-Cookie value carrying a freshly issued session token.
/// SameSite=Lax so top-level navigations into the dashboard keep the cookie.
pub fn session_cookie(name: &str, token: &str, max_age_hours: i64, secure: bool) -> String {
    let max_age_secs = max_age_hours.max(0) * 3600;
    let mut cookie = format!(
        "{name}={token}; HttpOnly; SameSite=Lax; Path=/; Max-Age={max_age_secs}"
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Overwrite the session cookie with an empty value and zero max-age.
pub fn clear_session_cookie(name: &str, secure: bool) -> String {
    let mut cookie = format!("{name}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0");
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

pub fn get_cookie_value<'a>(parts: &'a Parts, name: &str) -> Option<&'a str> {
    parts
        .headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|s| s.split(';'))
        .map(|s| s.trim())
        .find_map(|cookie| {
            let mut split = cookie.splitn(2, '=');
            let key = split.next()?.trim();
            let val = split.next()?.trim();
            if key == name {
                Some(val)
            } else {
                None
            }
        })
}
