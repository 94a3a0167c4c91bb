//! Shared types used across the Lookout application.
//!
//! This module defines common newtypes that provide type safety
//! and clear domain modeling.

use crate::error::LookoutError;
use chrono::{DateTime, SecondsFormat, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// A syntactically valid email address.
///
/// Construction goes through [`EmailAddress::parse`], so holding one means the
/// address already passed the submission pattern check.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Parse and validate an email address.
    ///
    /// Surrounding whitespace and a single pair of surrounding double quotes
    /// are stripped.
    ///
    /// # Errors
    /// Returns `LookoutError::Validation` if the input is empty or does not
    /// look like `local@domain.tld`.
    pub fn parse(input: &str) -> Result<Self, LookoutError> {
        static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
        let regex = EMAIL_REGEX.get_or_init(|| {
            Regex::new(r#"^"?([-a-zA-Z0-9.`?{}_+]+@\w+(?:[.-]\w+)*\.\w+)"?$"#)
                .expect("valid regex")
        });

        let input = input.trim();
        if input.is_empty() {
            return Err(LookoutError::Validation("email is required".to_string()));
        }

        regex
            .captures(input)
            .and_then(|caps| caps.get(1))
            .map(|m| Self(m.as_str().to_string()))
            .ok_or_else(|| LookoutError::Validation(format!("invalid email address: '{input}'")))
    }

    /// Get the inner string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The part before the `@`.
    #[must_use]
    pub fn local_part(&self) -> &str {
        self.0.split_once('@').map_or("", |(local, _)| local)
    }

    /// The part after the `@`.
    #[must_use]
    pub fn domain(&self) -> &str {
        self.0.split_once('@').map_or("", |(_, domain)| domain)
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = LookoutError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<EmailAddress> for String {
    fn from(email: EmailAddress) -> Self {
        email.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Newtype for search job identifiers.
///
/// Job IDs are UUID v4 strings, safe to use as storage keys and in URLs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct JobId(String);

impl JobId {
    /// Parse a `JobId` from a string.
    ///
    /// # Errors
    /// Returns error if the ID is not a valid UUID v4.
    pub fn new(id: impl Into<String>) -> Result<Self, LookoutError> {
        let id = id.into();
        Self::validate(&id)?;
        Ok(Self(id))
    }

    /// Create a new random `JobId` using UUID v4.
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Get the inner string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(id: &str) -> Result<(), LookoutError> {
        static UUID_REGEX: OnceLock<Regex> = OnceLock::new();
        let regex = UUID_REGEX.get_or_init(|| {
            Regex::new(r"^[0-9a-f]{8}-[0-9a-f]{4}-4[0-9a-f]{3}-[89ab][0-9a-f]{3}-[0-9a-f]{12}$")
                .expect("valid regex")
        });

        if regex.is_match(id) {
            Ok(())
        } else {
            Err(LookoutError::Validation(format!(
                "invalid job ID: must be a valid UUID v4, got '{id}'"
            )))
        }
    }
}

impl TryFrom<String> for JobId {
    type Error = LookoutError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<JobId> for String {
    fn from(id: JobId) -> Self {
        id.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Newtype for site definition identifiers.
///
/// Site IDs must be lowercase alphanumeric with hyphens, 2-50 characters.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SiteId(String);

impl SiteId {
    /// Create a new `SiteId` from a string.
    ///
    /// # Errors
    /// Returns error if the ID doesn't match the required format.
    pub fn new(id: impl Into<String>) -> Result<Self, LookoutError> {
        let id = id.into();
        Self::validate(&id)?;
        Ok(Self(id))
    }

    /// Get the inner string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(id: &str) -> Result<(), LookoutError> {
        static SITE_REGEX: OnceLock<Regex> = OnceLock::new();
        let regex = SITE_REGEX
            .get_or_init(|| Regex::new(r"^[a-z0-9][a-z0-9-]{0,48}[a-z0-9]$").expect("valid regex"));

        if id.len() < 2 || id.len() > 50 {
            return Err(LookoutError::Validation(format!(
                "invalid site ID: must be 2-50 characters, got {} characters",
                id.len()
            )));
        }

        if regex.is_match(id) {
            Ok(())
        } else {
            Err(LookoutError::Validation(format!(
                "invalid site ID: must be lowercase alphanumeric with hyphens, got '{id}'"
            )))
        }
    }
}

impl TryFrom<String> for SiteId {
    type Error = LookoutError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SiteId> for String {
    fn from(id: SiteId) -> Self {
        id.0
    }
}

impl fmt::Display for SiteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Wrapper around `chrono::DateTime<Utc>` for consistent timestamp handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Create a timestamp representing the current moment.
    #[must_use]
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Create a timestamp from a `DateTime<Utc>`.
    #[must_use]
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Get the inner `DateTime<Utc>`.
    #[must_use]
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Parse a timestamp from an RFC3339 string.
    pub fn from_rfc3339(s: &str) -> Result<Self, LookoutError> {
        DateTime::parse_from_rfc3339(s)
            .map(|dt| Self(dt.with_timezone(&Utc)))
            .map_err(|e| LookoutError::Validation(format!("invalid timestamp: {e}")))
    }

    /// Format as RFC3339 string.
    ///
    /// Always uses microsecond precision and a `Z` suffix, so formatted
    /// timestamps sort lexically in chronological order.
    #[must_use]
    pub fn to_rfc3339(&self) -> String {
        self.0.to_rfc3339_opts(SecondsFormat::Micros, true)
    }

    /// Get seconds since Unix epoch.
    #[must_use]
    pub fn timestamp(&self) -> i64 {
        self.0.timestamp()
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::now()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_rfc3339())
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }
}

impl From<Timestamp> for DateTime<Utc> {
    fn from(ts: Timestamp) -> Self {
        ts.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_valid() {
        let valid = vec![
            "test@example.com",
            "first.last@mail.example.co.uk",
            "user+tag@example.org",
            "under_score@my-domain.io",
        ];

        for input in valid {
            assert!(EmailAddress::parse(input).is_ok(), "Failed for: {input}");
        }
    }

    #[test]
    fn test_email_invalid() {
        let invalid = vec![
            "not-an-email",
            "@example.com",
            "user@",
            "user@localhost",
            "user name@example.com",
            "user@@example.com",
        ];

        for input in invalid {
            assert!(EmailAddress::parse(input).is_err(), "Should fail for: {input}");
        }
    }

    #[test]
    fn test_email_empty_is_rejected() {
        let err = EmailAddress::parse("   ").unwrap_err();
        assert_eq!(err.to_string(), "validation error: email is required");
    }

    #[test]
    fn test_email_strips_quotes_and_whitespace() {
        let email = EmailAddress::parse("  \"test@example.com\" ").expect("valid email");
        assert_eq!(email.as_str(), "test@example.com");
        assert_eq!(email.local_part(), "test");
        assert_eq!(email.domain(), "example.com");
    }

    #[test]
    fn test_email_serde_validates() {
        let json = serde_json::to_string(&EmailAddress::parse("a@b.io").unwrap()).unwrap();
        assert_eq!(json, "\"a@b.io\"");

        let parsed: Result<EmailAddress, _> = serde_json::from_str("\"nope\"");
        assert!(parsed.is_err());
    }

    #[test]
    fn test_job_id_generate_is_valid_and_unique() {
        let id1 = JobId::generate();
        let id2 = JobId::generate();
        assert_ne!(id1, id2);
        assert!(JobId::new(id1.as_str()).is_ok());
    }

    #[test]
    fn test_job_id_invalid() {
        let invalid_ids = vec![
            "not-a-uuid",
            "550e8400-e29b-51d4-a716-446655440000",
            "../../etc/passwd",
            "",
        ];

        for id in invalid_ids {
            assert!(JobId::new(id).is_err(), "Should fail for: {id}");
        }
    }

    #[test]
    fn test_job_id_serde_validates() {
        let id = JobId::generate();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(serde_json::from_str::<JobId>(&json).unwrap(), id);

        let parsed: Result<JobId, _> = serde_json::from_str("\"../../etc/passwd\"");
        assert!(parsed.is_err());
    }

    #[test]
    fn test_site_id_valid_and_invalid() {
        for id in ["gravatar", "x2", "some-site-9"] {
            assert!(SiteId::new(id).is_ok(), "Failed for: {id}");
        }

        let too_long = "a".repeat(51);
        for id in ["a", "Gravatar", "some_site", "-site", "site-", too_long.as_str()] {
            assert!(SiteId::new(id).is_err(), "Should fail for: {id}");
        }
    }

    #[test]
    fn test_timestamp_rfc3339_roundtrip_and_ordering() {
        let ts1 = Timestamp::now();
        let parsed = Timestamp::from_rfc3339(&ts1.to_rfc3339()).expect("parse RFC3339 timestamp");
        assert_eq!(ts1.timestamp(), parsed.timestamp());

        std::thread::sleep(std::time::Duration::from_millis(5));
        let ts2 = Timestamp::now();
        assert!(ts2 > ts1);
        assert!(ts2.to_rfc3339() > ts1.to_rfc3339());
        assert!(ts1.to_rfc3339().ends_with('Z'));
    }
}
