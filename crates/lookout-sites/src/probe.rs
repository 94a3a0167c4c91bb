//! Probe units: one independently executable existence check per site.

use crate::definition::{ExtractRules, HttpMethod, SiteDefinition, Verdict};
use crate::error::{Result, SiteError};
use async_trait::async_trait;
use lookout_core::{EmailAddress, ProbeOutcome, SiteInfo};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// A single site check.
///
/// Implementations never return errors: any failure is reported as an
/// outcome with `error` set. The engine still guards against panics and
/// enforces the per-probe timeout.
#[async_trait]
pub trait ProbeUnit: Send + Sync {
    /// Site this unit checks.
    fn site(&self) -> &SiteInfo;

    /// Check whether `email` has an account on the site.
    async fn probe(&self, email: &EmailAddress, client: &reqwest::Client) -> ProbeOutcome;
}

/// Probe unit driven by a declarative [`SiteDefinition`].
#[derive(Debug, Clone)]
pub struct HttpProbe {
    definition: SiteDefinition,
    site: SiteInfo,
}

impl HttpProbe {
    /// Wrap a definition.
    #[must_use]
    pub fn new(definition: SiteDefinition) -> Self {
        let site = definition.site_info();
        Self { definition, site }
    }

    /// Underlying definition.
    #[must_use]
    pub fn definition(&self) -> &SiteDefinition {
        &self.definition
    }

    async fn send(&self, email: &EmailAddress, client: &reqwest::Client) -> Result<(u16, String)> {
        let request = &self.definition.request;
        let url = render(&request.url, email);

        let mut builder = match request.method {
            HttpMethod::Get => client.get(&url),
            HttpMethod::Post => client.post(&url),
        };

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), render(value, email));
        }

        if request.method == HttpMethod::Post && !request.form.is_empty() {
            let form: BTreeMap<&str, String> = request
                .form
                .iter()
                .map(|(name, value)| (name.as_str(), render(value, email)))
                .collect();
            builder = builder.form(&form);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        debug!(site = %self.site.name, status, "probe response received");

        Ok((status, body))
    }

    fn found(&self, document: Option<&Value>) -> ProbeOutcome {
        let mut outcome = ProbeOutcome::found(&self.site);

        if let Some(document) = document {
            let extract = &self.definition.extract;
            outcome.emailrecovery = extract
                .emailrecovery
                .as_deref()
                .and_then(|p| ExtractRules::lookup(document, p));
            outcome.phone_number = extract
                .phone_number
                .as_deref()
                .and_then(|p| ExtractRules::lookup(document, p));
            outcome.others = extract.collect_others(document);
        }

        outcome
    }
}

#[async_trait]
impl ProbeUnit for HttpProbe {
    fn site(&self) -> &SiteInfo {
        &self.site
    }

    async fn probe(&self, email: &EmailAddress, client: &reqwest::Client) -> ProbeOutcome {
        let (status, body) = match self.send(email, client).await {
            Ok(response) => response,
            Err(e) => {
                warn!(site = %self.site.name, error = %e, "probe request failed");
                return ProbeOutcome::failed(&self.site);
            }
        };

        match self.definition.response.evaluate(status, &body) {
            Verdict::Exists(document) => self.found(document.as_ref()),
            Verdict::NotFound => ProbeOutcome::not_found(&self.site),
            Verdict::RateLimited => ProbeOutcome::rate_limited(&self.site),
            Verdict::Unexpected(reason) => {
                let e = SiteError::UnexpectedResponse {
                    site: self.site.name.clone(),
                    reason,
                };
                warn!(error = %e, "probe could not interpret response");
                ProbeOutcome::failed(&self.site)
            }
        }
    }
}

/// Substitute email placeholders into a request template.
///
/// `{email_sha256}` hashes the lowercased address, the form avatar services
/// key on.
#[must_use]
pub fn render(template: &str, email: &EmailAddress) -> String {
    if !template.contains('{') {
        return template.to_string();
    }

    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];

        let value = tail
            .find('}')
            .and_then(|end| placeholder_value(&tail[1..end], email).map(|v| (v, end)));

        match value {
            Some((value, end)) => {
                out.push_str(&value);
                rest = &tail[end + 1..];
            }
            None => {
                out.push('{');
                rest = &tail[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

fn placeholder_value(name: &str, email: &EmailAddress) -> Option<String> {
    let value = match name {
        "email" => email.as_str().to_string(),
        "email_urlencoded" => urlencoding::encode(email.as_str()).into_owned(),
        "email_sha256" => hex::encode(Sha256::digest(email.as_str().to_lowercase().as_bytes())),
        "local_part" => email.local_part().to_string(),
        "email_domain" => email.domain().to_string(),
        _ => return None,
    };
    Some(value)
}
