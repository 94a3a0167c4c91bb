//! Site definition types and response evaluation rules.
//!
//! A site definition describes one account-existence check: the HTTP request
//! to send for an email and how to read the answer. Definitions are loaded
//! from TOML files.

use crate::error::{Result, SiteError};
use lookout_core::{CheckMethod, SiteId, SiteInfo};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Placeholders that may appear in request templates.
pub const PLACEHOLDERS: &[&str] = &[
    "email",
    "email_urlencoded",
    "email_sha256",
    "local_part",
    "email_domain",
];

/// Complete site definition loaded from TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteDefinition {
    /// Core site metadata
    pub site: SiteMetadata,

    /// Request to send
    pub request: RequestTemplate,

    /// How to interpret the response
    #[serde(default)]
    pub response: ResponseRules,

    /// Extra attributes to pull out of JSON responses for existing accounts
    #[serde(default)]
    pub extract: ExtractRules,
}

impl SiteDefinition {
    /// Get the site ID.
    #[must_use]
    pub fn id(&self) -> &SiteId {
        &self.site.id
    }

    /// Get the site name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.site.name
    }

    /// Identity carried into every outcome of this site.
    #[must_use]
    pub fn site_info(&self) -> SiteInfo {
        SiteInfo {
            name: self.site.name.clone(),
            domain: self.site.domain.clone(),
            method: self.site.method,
            frequent_rate_limit: self.site.frequent_rate_limit,
        }
    }

    /// Validate the site definition for completeness and correctness.
    pub fn validate(&self) -> Result<()> {
        if self.site.name.trim().is_empty() {
            return Err(self.invalid("site name cannot be empty"));
        }

        if self.site.domain.trim().is_empty() {
            return Err(self.invalid("site domain cannot be empty"));
        }

        let url = &self.request.url;
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(self.invalid(format!("request URL must be http(s), got '{url}'")));
        }

        let templates = std::iter::once(url)
            .chain(self.request.headers.values())
            .chain(self.request.form.values());
        for template in templates {
            if let Some(unknown) = unknown_placeholder(template) {
                return Err(self.invalid(format!("unknown placeholder {{{unknown}}}")));
            }
        }

        let statuses = self
            .response
            .exists_status
            .iter()
            .chain(&self.response.not_found_status)
            .chain(&self.response.rate_limit_status);
        for status in statuses {
            if !(100..=599).contains(status) {
                return Err(self.invalid(format!("HTTP status {status} is out of range")));
            }
        }

        let pointers = self
            .response
            .exists_json_pointer
            .iter()
            .chain(&self.extract.emailrecovery)
            .chain(&self.extract.phone_number)
            .chain(self.extract.others.values());
        for pointer in pointers {
            if !pointer.is_empty() && !pointer.starts_with('/') {
                return Err(self.invalid(format!(
                    "JSON pointer must be empty or start with '/', got '{pointer}'"
                )));
            }
        }

        Ok(())
    }

    fn invalid(&self, reason: impl Into<String>) -> SiteError {
        SiteError::ValidationError {
            site_id: self.site.id.to_string(),
            reason: reason.into(),
        }
    }
}

/// First `{name}` token in `template` that is not a known placeholder.
fn unknown_placeholder(template: &str) -> Option<&str> {
    template
        .split('{')
        .skip(1)
        .filter_map(|chunk| chunk.split_once('}').map(|(name, _)| name))
        .find(|name| !PLACEHOLDERS.contains(name))
}

/// Core site metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteMetadata {
    /// Unique site identifier (e.g., "gravatar")
    pub id: SiteId,

    /// Short site name shown in results
    pub name: String,

    /// Site domain (e.g., "gravatar.com")
    pub domain: String,

    /// How the check detects an account
    #[serde(default)]
    pub method: CheckMethod,

    /// Whether the site is known to rate-limit aggressively
    #[serde(default)]
    pub frequent_rate_limit: bool,
}

/// HTTP method for a site request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    /// GET request
    #[default]
    Get,
    /// POST request with a form body
    Post,
}

/// Request template with placeholders for the searched email.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestTemplate {
    /// HTTP method
    #[serde(default)]
    pub method: HttpMethod,

    /// URL template
    pub url: String,

    /// Extra request headers (values may contain placeholders)
    #[serde(default)]
    pub headers: BTreeMap<String, String>,

    /// Form fields sent as `application/x-www-form-urlencoded` on POST
    #[serde(default)]
    pub form: BTreeMap<String, String>,
}

/// How to turn an HTTP response into a verdict.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseRules {
    /// Statuses meaning "the account exists" (unless a marker or pointer says otherwise)
    #[serde(default = "default_exists_status")]
    pub exists_status: Vec<u16>,

    /// Statuses meaning "no such account"
    #[serde(default = "default_not_found_status")]
    pub not_found_status: Vec<u16>,

    /// Statuses meaning "rate limited"
    #[serde(default = "default_rate_limit_status")]
    pub rate_limit_status: Vec<u16>,

    /// JSON pointer that must resolve to a non-empty value for the account to exist
    pub exists_json_pointer: Option<String>,

    /// Body substring meaning "the account exists"
    pub exists_marker: Option<String>,

    /// Body substring meaning "no such account"
    pub not_found_marker: Option<String>,

    /// Body substring meaning "rate limited"
    pub rate_limit_marker: Option<String>,
}

fn default_exists_status() -> Vec<u16> {
    vec![200]
}

fn default_not_found_status() -> Vec<u16> {
    vec![404]
}

fn default_rate_limit_status() -> Vec<u16> {
    vec![429]
}

impl Default for ResponseRules {
    fn default() -> Self {
        Self {
            exists_status: default_exists_status(),
            not_found_status: default_not_found_status(),
            rate_limit_status: default_rate_limit_status(),
            exists_json_pointer: None,
            exists_marker: None,
            not_found_marker: None,
            rate_limit_marker: None,
        }
    }
}

/// What a response says about the account.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    /// Account exists; carries the parsed body when it was JSON
    Exists(Option<Value>),
    /// No such account
    NotFound,
    /// Site refused to answer
    RateLimited,
    /// Response did not match any rule
    Unexpected(String),
}

impl ResponseRules {
    /// Evaluate a response.
    ///
    /// Rules are applied in order: rate limiting, explicit not-found
    /// signals, the JSON pointer, the exists marker, and finally the status
    /// lists.
    #[must_use]
    pub fn evaluate(&self, status: u16, body: &str) -> Verdict {
        let contains = |marker: &Option<String>| marker.as_deref().is_some_and(|m| body.contains(m));

        if self.rate_limit_status.contains(&status) || contains(&self.rate_limit_marker) {
            return Verdict::RateLimited;
        }

        if self.not_found_status.contains(&status) || contains(&self.not_found_marker) {
            return Verdict::NotFound;
        }

        if !self.exists_status.contains(&status) {
            return Verdict::Unexpected(format!("unexpected HTTP status {status}"));
        }

        let json = serde_json::from_str::<Value>(body).ok();

        if let Some(pointer) = &self.exists_json_pointer {
            let Some(document) = json else {
                return Verdict::Unexpected("response body is not JSON".to_string());
            };
            return if document.pointer(pointer).is_some_and(is_present) {
                Verdict::Exists(Some(document))
            } else {
                Verdict::NotFound
            };
        }

        if self.exists_marker.is_some() && !contains(&self.exists_marker) {
            return Verdict::NotFound;
        }

        Verdict::Exists(json)
    }
}

/// Whether a JSON value counts as "something is there".
fn is_present(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(false) => false,
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
        Value::Bool(true) | Value::Number(_) => true,
    }
}

/// JSON pointers for attributes leaked by a site.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractRules {
    /// Pointer to a recovery email
    pub emailrecovery: Option<String>,

    /// Pointer to a phone number
    pub phone_number: Option<String>,

    /// Label -> pointer for anything else worth reporting
    #[serde(default)]
    pub others: BTreeMap<String, String>,
}

impl ExtractRules {
    /// Resolve a pointer to a display string.
    #[must_use]
    pub fn lookup(document: &Value, pointer: &str) -> Option<String> {
        match document.pointer(pointer)? {
            Value::Null => None,
            Value::String(s) if s.is_empty() => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Collect the `others` attributes present in `document`.
    #[must_use]
    pub fn collect_others(&self, document: &Value) -> Option<BTreeMap<String, String>> {
        let others: BTreeMap<String, String> = self
            .others
            .iter()
            .filter_map(|(label, pointer)| {
                Self::lookup(document, pointer).map(|value| (label.clone(), value))
            })
            .collect();

        (!others.is_empty()).then_some(others)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(toml_str: &str) -> SiteDefinition {
        toml::from_str(toml_str).expect("parse site definition")
    }

    const MINIMAL: &str = r#"
[site]
id = "example"
name = "example"
domain = "example.com"
method = "register"

[request]
url = "https://example.com/api/check?email={email_urlencoded}"
"#;

    #[test]
    fn test_minimal_definition_defaults() {
        let def = parse(MINIMAL);
        assert_eq!(def.id().as_str(), "example");
        assert_eq!(def.request.method, HttpMethod::Get);
        assert_eq!(def.response.exists_status, vec![200]);
        assert_eq!(def.response.not_found_status, vec![404]);
        assert_eq!(def.response.rate_limit_status, vec![429]);
        assert!(def.validate().is_ok());

        let info = def.site_info();
        assert_eq!(info.domain, "example.com");
        assert_eq!(info.method, CheckMethod::Register);
    }

    #[test]
    fn test_invalid_site_id_rejected_at_parse() {
        let result: std::result::Result<SiteDefinition, _> =
            toml::from_str(&MINIMAL.replace("id = \"example\"", "id = \"Bad_Id\""));
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_rejects_unknown_placeholder() {
        let def = parse(&MINIMAL.replace("{email_urlencoded}", "{phone}"));
        let err = def.validate().unwrap_err();
        assert!(err.to_string().contains("unknown placeholder {phone}"));
    }

    #[test]
    fn test_validate_rejects_non_http_url() {
        let def = parse(&MINIMAL.replace("https://example.com", "ftp://example.com"));
        assert!(matches!(
            def.validate(),
            Err(SiteError::ValidationError { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_bad_pointer() {
        let mut def = parse(MINIMAL);
        def.response.exists_json_pointer = Some("users".to_string());
        assert!(def.validate().is_err());
    }

    #[test]
    fn test_evaluate_status_lists() {
        let rules = ResponseRules::default();
        assert_eq!(rules.evaluate(200, "<html>"), Verdict::Exists(None));
        assert_eq!(rules.evaluate(404, ""), Verdict::NotFound);
        assert_eq!(rules.evaluate(429, ""), Verdict::RateLimited);
        assert!(matches!(rules.evaluate(500, ""), Verdict::Unexpected(_)));
    }

    #[test]
    fn test_evaluate_json_pointer() {
        let rules = ResponseRules {
            exists_json_pointer: Some("/users/0".to_string()),
            ..ResponseRules::default()
        };

        let body = json!({"users": [{"username": "jdoe"}]}).to_string();
        assert!(matches!(rules.evaluate(200, &body), Verdict::Exists(Some(_))));

        let body = json!({"users": []}).to_string();
        assert_eq!(rules.evaluate(200, &body), Verdict::NotFound);

        assert!(matches!(
            rules.evaluate(200, "not json"),
            Verdict::Unexpected(_)
        ));
    }

    #[test]
    fn test_evaluate_markers() {
        let rules = ResponseRules {
            exists_marker: Some("already registered".to_string()),
            rate_limit_marker: Some("slow down".to_string()),
            ..ResponseRules::default()
        };

        assert_eq!(
            rules.evaluate(200, "this email is already registered"),
            Verdict::Exists(None)
        );
        assert_eq!(rules.evaluate(200, "welcome aboard"), Verdict::NotFound);
        assert_eq!(rules.evaluate(200, "please slow down"), Verdict::RateLimited);
    }

    #[test]
    fn test_extract_rules() {
        let document = json!({
            "entry": [{"preferredUsername": "jdoe", "id": 42, "bio": ""}],
            "recovery": "j***@gmail.com"
        });

        assert_eq!(
            ExtractRules::lookup(&document, "/recovery").as_deref(),
            Some("j***@gmail.com")
        );
        assert_eq!(
            ExtractRules::lookup(&document, "/entry/0/id").as_deref(),
            Some("42")
        );
        assert!(ExtractRules::lookup(&document, "/entry/0/bio").is_none());
        assert!(ExtractRules::lookup(&document, "/missing").is_none());

        let mut rules = ExtractRules::default();
        rules
            .others
            .insert("username".to_string(), "/entry/0/preferredUsername".to_string());
        rules
            .others
            .insert("bio".to_string(), "/entry/0/bio".to_string());

        let others = rules.collect_others(&document).expect("some attributes");
        assert_eq!(others.len(), 1);
        assert_eq!(others["username"], "jdoe");

        assert!(ExtractRules::default().collect_others(&document).is_none());
    }
}
