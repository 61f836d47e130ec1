//! Parsing "name + phone number" utterances for new accounts.

use std::sync::LazyLock;

use alice_grocer_core::{PhoneNumber, PhoneNumberError};
use regex::Regex;

/// A name made of letters (with inner spaces or hyphens), then a phone number.
static ENROLLMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?P<name>\p{L}[\p{L}\s-]*?)[\s,:]+(?P<phone>\+?[\d\s()-]+)\s*$")
        .expect("Invalid regex")
});

/// Why an enrollment utterance was rejected.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum EnrollmentError {
    #[error("expected a name followed by a phone number")]
    Shape,
    #[error("invalid phone number: {0}")]
    Phone(#[from] PhoneNumberError),
}

/// A new account as dictated by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enrollment {
    pub name: String,
    pub phone: PhoneNumber,
}

impl Enrollment {
    /// Parse utterances like "Маша 8 999 000 11 22".
    ///
    /// # Errors
    ///
    /// Returns an error if no name/number pair is found or the number is invalid.
    pub fn parse(utterance: &str) -> Result<Self, EnrollmentError> {
        let caps = ENROLLMENT_RE
            .captures(utterance)
            .ok_or(EnrollmentError::Shape)?;

        let name = caps
            .name("name")
            .map(|m| m.as_str().trim())
            .filter(|n| !n.is_empty())
            .ok_or(EnrollmentError::Shape)?;
        let phone = caps.name("phone").ok_or(EnrollmentError::Shape)?;

        Ok(Self {
            name: name.to_string(),
            phone: PhoneNumber::parse(phone.as_str())?,
        })
    }
}
