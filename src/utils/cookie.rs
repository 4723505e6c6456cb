// src/utils/cookie.rs

use axum_extra::extract::cookie::{Cookie, SameSite};

/// A cookie scoped to the whole site, hidden from scripts.
pub fn site_cookie(
    name: &'static str,
    value: String,
    max_age: Option<time::Duration>,
) -> Cookie<'static> {
    let mut builder = Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax);
    if let Some(max_age) = max_age {
        builder = builder.max_age(max_age);
    }
    builder.build()
}

/// A cookie that makes the browser drop `name`.
pub fn removal(name: &'static str) -> Cookie<'static> {
    let mut cookie = site_cookie(name, String::new(), None);
    cookie.make_removal();
    cookie
}
