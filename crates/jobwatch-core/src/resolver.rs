//! New-job detection against the watermark.
//!
//! Listings are assumed to be a contiguous, reverse-chronological feed. The
//! watermark marks the newest job already delivered; everything listed above
//! it is new.

use std::cmp::Ordering;

use crate::error::AppError;
use crate::models::{JobDetail, JobSummary};
use crate::traits::SourceAdapter;

/// Compute the ordered (newest first) subset of `visible` that is newer than `watermark`.
///
/// - No watermark (or an empty one): cold start, every visible job is new.
/// - Otherwise collect until the first summary whose id equals the watermark
///   or whose locator contains it; that summary and everything after it are
///   excluded.
/// - Watermark not found in the listing (reordered feed, or it scrolled off
///   the page): every visible job is new. Duplicates are preferred over loss.
pub fn diff_new(visible: &[JobSummary], watermark: Option<&str>) -> Vec<JobSummary> {
    let Some(watermark) = watermark.filter(|w| !w.is_empty()) else {
        return visible.to_vec();
    };

    match visible
        .iter()
        .position(|s| s.id == watermark || s.locator.contains(watermark))
    {
        Some(pos) => visible[..pos].to_vec(),
        None => {
            if !visible.is_empty() {
                tracing::warn!(
                    %watermark,
                    visible = visible.len(),
                    "Watermark not in current listing, treating all visible jobs as new"
                );
            }
            visible.to_vec()
        }
    }
}

/// Drop summaries the source knows to be no newer than `watermark`.
///
/// Covers the fail-open branch of [`diff_new`] on sources with ordered ids:
/// when the watermark job left the listing, everything older than it is
/// still excluded. Ids `compare` cannot order are kept.
pub fn newer_than<C>(new: Vec<JobSummary>, watermark: Option<&str>, compare: C) -> Vec<JobSummary>
where
    C: Fn(&str, &str) -> Option<Ordering>,
{
    let Some(watermark) = watermark.filter(|w| !w.is_empty()) else {
        return new;
    };
    new.into_iter()
        .filter(|s| !matches!(compare(&s.id, watermark), Some(Ordering::Less | Ordering::Equal)))
        .collect()
}

/// Fetch details for `summaries` one at a time, preserving their order.
///
/// The first failure aborts the rest of the batch and is returned as-is.
pub async fn fetch_details<A: SourceAdapter>(
    adapter: &A,
    session: &mut A::Session,
    summaries: &[JobSummary],
) -> Result<Vec<JobDetail>, AppError> {
    let mut details = Vec::with_capacity(summaries.len());
    for summary in summaries {
        tracing::debug!(job_id = %summary.id, locator = %summary.locator, "Fetching job detail");
        details.push(adapter.fetch_job_detail(session, summary).await?);
    }
    Ok(details)
}
