use std::cmp::Ordering;

use url::Url;

use crate::models::compute_hash;

/// Derive a stable job id from a locator.
///
/// Takes the last non-empty URL path segment, cut at the first `&`.
/// Example: `"https://www.guru.com/jobs/logo-design/1987654&SearchUrl=..."` → `"1987654"`.
/// Locators that are not URLs fall back to a 16-char SHA-256 prefix.
pub fn derive_job_id(locator: &str) -> String {
    Url::parse(locator)
        .ok()
        .and_then(|url| {
            url.path_segments()?
                .rev()
                .find(|s| !s.is_empty())
                .map(|s| s.split('&').next().unwrap_or_default().to_string())
        })
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| compute_hash(locator)[..16].to_string())
}

/// Order ids that are plain integers (Freelancer project ids grow over time).
///
/// `None` if either id is not numeric.
pub fn compare_numeric_ids(a: &str, b: &str) -> Option<Ordering> {
    let a: u64 = a.trim().parse().ok()?;
    let b: u64 = b.trim().parse().ok()?;
    Some(a.cmp(&b))
}

/// Format an amount as whole US dollars with thousands separators: `1500.0` → `"$1,500"`.
pub fn usd_format(amount: f64) -> String {
    let rounded = amount.round();
    let sign = if rounded < 0.0 { "-" } else { "" };
    let digits = format!("{:.0}", rounded.abs());

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{sign}${grouped}")
}
