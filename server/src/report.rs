//! Plain-text report for completed searches.

use lookout_core::{Job, ProfileEntry, Timestamp};
use std::fmt::Write;

/// Render the downloadable report. `None` unless the job completed.
#[must_use]
pub fn render_report(job: &Job) -> Option<String> {
    let results = job.completed_results()?;
    let mut out = String::new();

    let search_date = Timestamp::from_rfc3339(&results.search_time).map_or_else(
        |_| results.search_time.clone(),
        |ts| ts.as_datetime().format("%Y-%m-%d %H:%M:%S UTC").to_string(),
    );

    out.push_str("Lookout Email Search Report\n");
    out.push_str("===========================\n\n");

    out.push_str("Summary\n-------\n");
    let rows = [
        ("Search Date", search_date),
        ("Email", results.email.clone()),
        ("Total Sites Checked", results.total_sites.to_string()),
        ("Accounts Found", results.found_count.to_string()),
        ("Not Found", results.not_found_count.to_string()),
        ("Rate Limited", results.rate_limited_count.to_string()),
        ("Errors", results.error_count.to_string()),
    ];
    for (label, value) in rows {
        let _ = writeln!(out, "{label:<20} {value}");
    }

    out.push_str("\nFound Accounts\n--------------\n");
    if results.found.is_empty() {
        out.push_str("No accounts found for this email address.\n");
    } else {
        for entry in &results.found {
            write_entry(&mut out, entry);
        }
    }

    Some(out)
}

fn write_entry(out: &mut String, entry: &ProfileEntry) {
    let _ = writeln!(out, "\n{} ({})", entry.site, entry.domain);
    let _ = writeln!(out, "  Method: {}", entry.method);

    if let Some(recovery) = &entry.emailrecovery {
        let _ = writeln!(out, "  Recovery Email: {recovery}");
    }
    if let Some(phone) = &entry.phone_number {
        let _ = writeln!(out, "  Phone Number: {phone}");
    }
    for (label, value) in entry.others.iter().flatten() {
        let _ = writeln!(out, "  {label}: {value}");
    }
}

/// Attachment file name for a report.
#[must_use]
pub fn report_filename(job: &Job) -> String {
    let email: String = job
        .email
        .as_str()
        .replace('@', "_at_")
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();

    format!("lookout_report_{email}.txt")
}

#[cfg(test)]
mod tests {
    use super::*;
    use lookout_core::{ClassifiedResultSet, EmailAddress, ProbeOutcome, SiteInfo};
    use std::collections::BTreeMap;

    fn job() -> Job {
        Job::new(EmailAddress::parse("jane+x@example.com").expect("valid email"))
    }

    fn results(found: Vec<ProfileEntry>) -> ClassifiedResultSet {
        ClassifiedResultSet {
            email: "jane+x@example.com".to_string(),
            found_count: found.len(),
            found,
            not_found: Vec::new(),
            rate_limited: Vec::new(),
            error: Vec::new(),
            total_sites: 4,
            not_found_count: 2,
            rate_limited_count: 1,
            error_count: 0,
            search_time: "2026-03-04T05:06:07.000000Z".to_string(),
        }
    }

    #[test]
    fn test_running_job_has_no_report() {
        assert!(render_report(&job()).is_none());
    }

    #[test]
    fn test_report_lists_found_accounts() {
        let mut outcome = ProbeOutcome::found(&SiteInfo::new("gravatar", "gravatar.com"));
        outcome.phone_number = Some("+1 ***-***-**12".to_string());
        outcome.others = Some(BTreeMap::from([(
            "username".to_string(),
            "jane".to_string(),
        )]));

        let mut job = job();
        job.complete(results(vec![ProfileEntry::from(outcome)]))
            .expect("complete");

        let report = render_report(&job).expect("report");
        assert!(report.contains("Search Date          2026-03-04 05:06:07 UTC"));
        assert!(report.contains("Total Sites Checked  4"));
        assert!(report.contains("gravatar (gravatar.com)"));
        assert!(report.contains("  Phone Number: +1 ***-***-**12"));
        assert!(report.contains("  username: jane"));
        assert!(!report.contains("No accounts found"));
    }

    #[test]
    fn test_report_without_accounts() {
        let mut job = job();
        job.complete(results(Vec::new())).expect("complete");

        let report = render_report(&job).expect("report");
        assert!(report.contains("No accounts found for this email address."));
    }

    #[test]
    fn test_report_filename_is_header_safe() {
        assert_eq!(
            report_filename(&job()),
            "lookout_report_jane_x_at_example.com.txt"
        );
    }
}
