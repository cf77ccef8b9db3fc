//! Per-request credentials and zone context.
//!
//! The token is held as a [`SecretString`] so it never shows up in `Debug`
//! output or logs. It is passed explicitly into every core call.
use secrecy::SecretString;

use crate::error::AppError;
use crate::validation::validate_identifier;

/// Build a credential from a raw request value, failing fast when it is absent.
pub fn credential(api_key: Option<String>) -> Result<SecretString, AppError> {
    match api_key {
        Some(key) if !key.is_empty() => Ok(SecretString::from(key)),
        _ => Err(AppError::MissingParameter("apiKey")),
    }
}

/// Check a required upstream identifier: present, non-empty, path-safe.
pub fn identifier(what: &'static str, value: Option<String>) -> Result<String, AppError> {
    let value = value
        .filter(|v| !v.is_empty())
        .ok_or(AppError::MissingParameter(what))?;
    validate_identifier(what, &value).map_err(|e| AppError::BadRequest(e.to_string()))?;
    Ok(value)
}

/// A token bound to one zone: the context of every record operation.
#[derive(Debug)]
pub struct Session {
    token: SecretString,
    zone_id: String,
}

impl Session {
    pub fn new(api_key: Option<String>, zone_id: Option<String>) -> Result<Self, AppError> {
        let token = credential(api_key)?;
        let zone_id = identifier("zoneId", zone_id)?;
        Ok(Self { token, zone_id })
    }

    pub fn token(&self) -> &SecretString {
        &self.token
    }

    pub fn zone_id(&self) -> &str {
        &self.zone_id
    }
}
