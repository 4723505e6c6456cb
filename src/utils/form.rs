// src/utils/form.rs

use std::{fmt::Display, str::FromStr};

use axum::{
    Form,
    extract::{FromRequest, Request},
};
use serde::{
    Deserialize, Deserializer,
    de::{self, DeserializeOwned, IntoDeserializer, value::StringDeserializer},
};
use validator::Validate;

use crate::error::AppError;

/// Form extractor that runs `Validate` and turns any failure into a
/// redirect back to the form with an error flash.
pub struct ValidForm<T>(pub T);

impl<T, S> FromRequest<S> for ValidForm<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let back = req.uri().path().to_string();

        let Form(value) = Form::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::invalid(rejection.body_text(), back.clone()))?;

        value
            .validate()
            .map_err(|errors| AppError::invalid(errors.to_string(), back))?;

        Ok(ValidForm(value))
    }
}

/// Browsers submit untouched inputs as empty strings; treat those as absent.
pub fn blank_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.map(|s| s.trim().to_string()) {
        None => Ok(None),
        Some(s) if s.is_empty() => Ok(None),
        Some(s) => {
            let inner: StringDeserializer<de::value::Error> = s.into_deserializer();
            T::deserialize(inner).map(Some).map_err(de::Error::custom)
        }
    }
}

/// Required text with surrounding whitespace dropped, so that length
/// rules see what will be stored.
pub fn trimmed<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(raw.trim().to_string())
}

/// Like [`blank_as_none`] for values parsed from text, such as numbers.
pub fn blank_as_none_parsed<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s.parse::<T>().map(Some).map_err(de::Error::custom),
    }
}
