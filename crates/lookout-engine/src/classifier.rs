//! Partitioning of probe outcomes into result buckets.

use lookout_core::{
    ClassifiedResultSet, EmailAddress, OutcomeBucket, ProbeOutcome, ProfileEntry, Timestamp,
};

/// Classify outcomes, stamping the result with the current time.
#[must_use]
pub fn classify(
    email: &EmailAddress,
    outcomes: Vec<ProbeOutcome>,
    total_sites: usize,
) -> ClassifiedResultSet {
    classify_at(email, outcomes, total_sites, Timestamp::now())
}

/// Classify outcomes with an explicit search time.
///
/// Every outcome lands in exactly one bucket (error, then rate limit, then
/// existence). Input order is kept within each bucket.
#[must_use]
pub fn classify_at(
    email: &EmailAddress,
    outcomes: Vec<ProbeOutcome>,
    total_sites: usize,
    search_time: Timestamp,
) -> ClassifiedResultSet {
    let mut found = Vec::new();
    let mut not_found = Vec::new();
    let mut rate_limited = Vec::new();
    let mut error = Vec::new();

    for outcome in outcomes {
        let entry = ProfileEntry::from(outcome);
        match entry.status {
            OutcomeBucket::Found => found.push(entry),
            OutcomeBucket::NotFound => not_found.push(entry),
            OutcomeBucket::RateLimited => rate_limited.push(entry),
            OutcomeBucket::Error => error.push(entry),
        }
    }

    ClassifiedResultSet {
        email: email.to_string(),
        found_count: found.len(),
        not_found_count: not_found.len(),
        rate_limited_count: rate_limited.len(),
        error_count: error.len(),
        found,
        not_found,
        rate_limited,
        error,
        total_sites,
        search_time: search_time.to_rfc3339(),
    }
}
