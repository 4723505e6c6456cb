// src/utils/flash.rs

use std::convert::Infallible;

use axum::{
    Json,
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde::Serialize;
use url::form_urlencoded;

use crate::utils::cookie;

pub const FLASH_COOKIE: &str = "flash";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Success,
    Info,
    Error,
}

impl FlashLevel {
    fn as_str(self) -> &'static str {
        match self {
            FlashLevel::Success => "success",
            FlashLevel::Info => "info",
            FlashLevel::Error => "error",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value {
            "success" => Some(FlashLevel::Success),
            "info" => Some(FlashLevel::Info),
            "error" => Some(FlashLevel::Error),
            _ => None,
        }
    }
}

/// A one-shot status message carried across a redirect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Flash {
    pub level: FlashLevel,
    pub message: String,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Self { level: FlashLevel::Success, message: message.into() }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self { level: FlashLevel::Info, message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { level: FlashLevel::Error, message: message.into() }
    }

    pub fn cookie_value(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .append_pair("level", self.level.as_str())
            .append_pair("message", &self.message)
            .finish()
    }

    pub fn from_cookie_value(value: &str) -> Option<Self> {
        let mut level = None;
        let mut message = None;
        for (key, val) in form_urlencoded::parse(value.as_bytes()) {
            match key.as_ref() {
                "level" => level = FlashLevel::parse(&val),
                "message" => message = Some(val.into_owned()),
                _ => {}
            }
        }
        Some(Self { level: level?, message: message? })
    }

    pub fn to_cookie(&self) -> Cookie<'static> {
        cookie::site_cookie(FLASH_COOKIE, self.cookie_value(), None)
    }

    /// 303 redirect carrying this message to the next page.
    pub fn redirect(self, to: &str) -> Response {
        (CookieJar::new().add(self.to_cookie()), Redirect::to(to)).into_response()
    }
}

/// The flash message left by the previous response, if any.
#[derive(Debug, Default)]
pub struct IncomingFlash(pub Option<Flash>);

impl<S> FromRequestParts<S> for IncomingFlash
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let flash = CookieJar::from_headers(&parts.headers)
            .get(FLASH_COOKIE)
            .and_then(|cookie| Flash::from_cookie_value(cookie.value()));
        Ok(IncomingFlash(flash))
    }
}

/// A rendered page: the pending flash message plus the view data.
/// Consumes the flash cookie when one was shown.
#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub flash: Option<Flash>,
    pub data: T,
}

impl<T> Page<T> {
    pub fn new(flash: IncomingFlash, data: T) -> Self {
        Self { flash: flash.0, data }
    }
}

impl<T: Serialize> IntoResponse for Page<T> {
    fn into_response(self) -> Response {
        let mut jar = CookieJar::new();
        if self.flash.is_some() {
            jar = jar.add(cookie::removal(FLASH_COOKIE));
        }
        (jar, Json(&self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cookie_value_survives_reserved_characters() {
        let flash = Flash::error("Access denied! a=b; c&d");
        let decoded = Flash::from_cookie_value(&flash.cookie_value()).unwrap();
        assert_eq!(decoded, flash);
        assert!(!flash.cookie_value().contains(';'));
    }

    #[test]
    fn redirect_sets_flash_cookie() {
        let response = Flash::info("Request already sent!").redirect("/college/search-faculty");
        assert_eq!(response.status(), axum::http::StatusCode::SEE_OTHER);

        let set_cookie = response
            .headers()
            .get(axum::http::header::SET_COOKIE)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| Cookie::parse(value.to_owned()).ok())
            .unwrap();
        assert_eq!(set_cookie.name(), FLASH_COOKIE);
        assert_eq!(
            Flash::from_cookie_value(set_cookie.value()),
            Some(Flash::info("Request already sent!"))
        );
    }

    #[test]
    fn malformed_cookie_is_ignored() {
        assert_eq!(Flash::from_cookie_value("level=loud&message=hi"), None);
        assert_eq!(Flash::from_cookie_value("message=hi"), None);
    }
}
