use regex::Regex;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} is empty")]
    Empty(&'static str),
    #[error("{0} too long (max 64 characters)")]
    TooLong(&'static str),
    #[error("{0} contains invalid characters (only A-Z, a-z, 0-9, '_' and '-' allowed)")]
    InvalidCharacters(&'static str),
}

lazy_static::lazy_static! {
    /// Upstream identifiers are hex strings in practice; we accept a slightly wider set
    /// but never anything that could change the shape of the request path.
    static ref IDENTIFIER_RE: Regex = Regex::new(r"^[A-Za-z0-9_-]+$").unwrap();
}

/// Check that an upstream identifier (zone or record id) is safe to place in a URL path.
pub fn validate_identifier(what: &'static str, id: &str) -> Result<(), ValidationError> {
    if id.is_empty() {
        return Err(ValidationError::Empty(what));
    }
    if id.len() > 64 {
        return Err(ValidationError::TooLong(what));
    }
    if !IDENTIFIER_RE.is_match(id) {
        return Err(ValidationError::InvalidCharacters(what));
    }
    Ok(())
}
