//! Probe outcomes and the classified result set built from them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// How a site check determines whether an account exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckMethod {
    /// Account registration flow ("email already taken")
    Register,
    /// Login flow
    Login,
    /// Password recovery flow
    #[serde(rename = "password recovery")]
    PasswordRecovery,
    /// Anything else (public profile lookups, APIs)
    #[default]
    Other,
}

impl CheckMethod {
    /// Get the wire/display name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Register => "register",
            Self::Login => "login",
            Self::PasswordRecovery => "password recovery",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for CheckMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of the site a probe unit checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteInfo {
    /// Short site name, used as the sort key for outcomes
    pub name: String,
    /// Site domain (e.g. "gravatar.com")
    pub domain: String,
    /// Check method
    pub method: CheckMethod,
    /// Whether the site is known to rate-limit aggressively
    #[serde(default)]
    pub frequent_rate_limit: bool,
}

impl SiteInfo {
    /// Create site info with the default method.
    #[must_use]
    pub fn new(name: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            domain: domain.into(),
            method: CheckMethod::Other,
            frequent_rate_limit: false,
        }
    }

    /// Set the check method.
    #[must_use]
    pub fn with_method(mut self, method: CheckMethod) -> Self {
        self.method = method;
        self
    }
}

/// Raw result of one probe unit against one email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeOutcome {
    /// Site name
    pub name: String,
    /// Site domain
    pub domain: String,
    /// Check method used
    pub method: CheckMethod,
    /// Whether the site is known to rate-limit aggressively
    #[serde(default)]
    pub frequent_rate_limit: bool,
    /// Account exists
    pub exists: bool,
    /// The site rate-limited the check
    #[serde(rename = "rateLimit")]
    pub rate_limit: bool,
    /// The check itself failed (network, timeout, unexpected response)
    pub error: bool,
    /// Partially obfuscated recovery email, when the site leaks one
    pub emailrecovery: Option<String>,
    /// Partially obfuscated phone number, when the site leaks one
    #[serde(rename = "phoneNumber")]
    pub phone_number: Option<String>,
    /// Any other attributes the site reveals
    pub others: Option<BTreeMap<String, String>>,
}

impl ProbeOutcome {
    fn blank(site: &SiteInfo) -> Self {
        Self {
            name: site.name.clone(),
            domain: site.domain.clone(),
            method: site.method,
            frequent_rate_limit: site.frequent_rate_limit,
            exists: false,
            rate_limit: false,
            error: false,
            emailrecovery: None,
            phone_number: None,
            others: None,
        }
    }

    /// The account exists on the site.
    #[must_use]
    pub fn found(site: &SiteInfo) -> Self {
        Self {
            exists: true,
            ..Self::blank(site)
        }
    }

    /// The site answered and the account does not exist.
    #[must_use]
    pub fn not_found(site: &SiteInfo) -> Self {
        Self::blank(site)
    }

    /// The site refused to answer because of rate limiting.
    #[must_use]
    pub fn rate_limited(site: &SiteInfo) -> Self {
        Self {
            rate_limit: true,
            ..Self::blank(site)
        }
    }

    /// The check failed.
    #[must_use]
    pub fn failed(site: &SiteInfo) -> Self {
        Self {
            error: true,
            ..Self::blank(site)
        }
    }

    /// Bucket this outcome belongs to.
    ///
    /// Priority is error, then rate limit, then existence.
    #[must_use]
    pub fn bucket(&self) -> OutcomeBucket {
        if self.error {
            OutcomeBucket::Error
        } else if self.rate_limit {
            OutcomeBucket::RateLimited
        } else if self.exists {
            OutcomeBucket::Found
        } else {
            OutcomeBucket::NotFound
        }
    }
}

/// Classification assigned to a single probe's result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeBucket {
    /// Account exists
    Found,
    /// Account does not exist
    NotFound,
    /// Site rate-limited the check
    RateLimited,
    /// Check failed
    Error,
}

impl OutcomeBucket {
    /// Human-readable reason attached to non-conclusive buckets.
    #[must_use]
    pub fn reason(&self) -> Option<&'static str> {
        match self {
            Self::Error => Some("Error occurred during check"),
            Self::RateLimited => Some("Rate limited"),
            Self::Found | Self::NotFound => None,
        }
    }
}

/// One site entry inside a classified bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileEntry {
    /// Site name
    pub site: String,
    /// Site domain
    pub domain: String,
    /// Check method used
    pub method: CheckMethod,
    /// Recovery email leaked by the site
    pub emailrecovery: Option<String>,
    /// Phone number leaked by the site
    #[serde(rename = "phoneNumber")]
    pub phone_number: Option<String>,
    /// Other attributes leaked by the site
    pub others: Option<BTreeMap<String, String>>,
    /// Bucket the entry was placed in
    pub status: OutcomeBucket,
    /// Reason for error/rate-limited entries
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl From<ProbeOutcome> for ProfileEntry {
    fn from(outcome: ProbeOutcome) -> Self {
        let status = outcome.bucket();
        Self {
            site: outcome.name,
            domain: outcome.domain,
            method: outcome.method,
            emailrecovery: outcome.emailrecovery,
            phone_number: outcome.phone_number,
            others: outcome.others,
            status,
            reason: status.reason().map(str::to_string),
        }
    }
}

/// Final, partitioned results of one search job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedResultSet {
    /// Email that was searched
    pub email: String,
    /// Sites where an account exists
    #[serde(rename = "found_profiles")]
    pub found: Vec<ProfileEntry>,
    /// Sites where no account exists
    #[serde(rename = "not_found_profiles")]
    pub not_found: Vec<ProfileEntry>,
    /// Sites that rate-limited the check
    #[serde(rename = "rate_limited_profiles")]
    pub rate_limited: Vec<ProfileEntry>,
    /// Sites whose check failed
    #[serde(rename = "error_profiles")]
    pub error: Vec<ProfileEntry>,
    /// Number of sites in the catalogue for this search
    pub total_sites: usize,
    /// `found.len()`
    pub found_count: usize,
    /// `not_found.len()`
    pub not_found_count: usize,
    /// `rate_limited.len()`
    pub rate_limited_count: usize,
    /// `error.len()`
    pub error_count: usize,
    /// When classification finished (RFC3339)
    pub search_time: String,
}

impl ClassifiedResultSet {
    /// Total entries across all four buckets.
    #[must_use]
    pub fn classified_total(&self) -> usize {
        self.found.len() + self.not_found.len() + self.rate_limited.len() + self.error.len()
    }
}
