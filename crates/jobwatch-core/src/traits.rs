use std::cmp::Ordering;
use std::future::Future;

use crate::error::AppError;
use crate::filters::FilterSet;
use crate::models::{Category, JobDetail, JobSummary, Keyword, NewCategory, Watermark};
use crate::platform::Platform;

/// A job marketplace: lists visible jobs and resolves their details.
///
/// Every call runs inside a session the caller owns. The caller opens it
/// before listing and hands it back to [`close_session`](Self::close_session)
/// on every exit path, including failures.
pub trait SourceAdapter: Send + Sync + Clone {
    /// Authenticated browser page, token-bound client state, ...
    type Session: Send;

    fn platform(&self) -> Platform;

    /// Order two job ids by recency, when the source's ids carry that.
    ///
    /// `None` means the ids say nothing about age (Guru slugs, hashes); the
    /// listing position is then the only ordering signal.
    fn compare_ids(&self, _a: &str, _b: &str) -> Option<Ordering> {
        None
    }

    /// Log in (and answer any security challenge).
    ///
    /// On failure the adapter releases whatever it acquired itself.
    fn open_session(&self) -> impl Future<Output = Result<Self::Session, AppError>> + Send;

    /// Jobs currently visible on the listing surface, restricted to the
    /// selected categories, newest first.
    fn list_visible_jobs(
        &self,
        session: &mut Self::Session,
        filter: &FilterSet,
    ) -> impl Future<Output = Result<Vec<JobSummary>, AppError>> + Send;

    /// Full detail for one listed job. Fails with [`AppError::DetailFetchFailed`].
    fn fetch_job_detail(
        &self,
        session: &mut Self::Session,
        summary: &JobSummary,
    ) -> impl Future<Output = Result<JobDetail, AppError>> + Send;

    /// Every category the source currently offers.
    fn fetch_categories(
        &self,
        session: &mut Self::Session,
    ) -> impl Future<Output = Result<Vec<NewCategory>, AppError>> + Send;

    /// Log out and free the session.
    fn close_session(
        &self,
        session: Self::Session,
    ) -> impl Future<Output = Result<(), AppError>> + Send;
}

/// Persists the last delivered job per platform.
pub trait WatermarkStore: Send + Sync + Clone {
    fn get(
        &self,
        platform: Platform,
    ) -> impl Future<Output = Result<Option<Watermark>, AppError>> + Send;

    /// Upsert the watermark for a platform.
    fn advance(
        &self,
        platform: Platform,
        job_id: &str,
    ) -> impl Future<Output = Result<(), AppError>> + Send;

    /// Forget the watermark; the next cycle treats every visible job as new.
    fn clear(&self, platform: Platform) -> impl Future<Output = Result<(), AppError>> + Send;
}

/// Persists per-platform category selections and keywords.
pub trait FilterStore: Send + Sync + Clone {
    fn list_categories(
        &self,
        platform: Platform,
    ) -> impl Future<Output = Result<Vec<Category>, AppError>> + Send;

    /// Toggle `selected` on the category with this key. [`AppError::NotFound`] on a miss.
    fn flip_selection(
        &self,
        platform: Platform,
        external_key: &str,
    ) -> impl Future<Output = Result<Category, AppError>> + Send;

    /// Replace the stored categories, reconciled with [`crate::filters::reconcile_categories`].
    fn replace_all(
        &self,
        platform: Platform,
        categories: Vec<NewCategory>,
    ) -> impl Future<Output = Result<(), AppError>> + Send;

    fn list_keywords(
        &self,
        platform: Platform,
    ) -> impl Future<Output = Result<Vec<Keyword>, AppError>> + Send;

    /// Replace the keyword set: absent values are removed, new ones added.
    fn set_keywords(
        &self,
        platform: Platform,
        values: &[String],
    ) -> impl Future<Output = Result<(), AppError>> + Send;

    /// Current selection for one polling cycle.
    fn filter_set(
        &self,
        platform: Platform,
    ) -> impl Future<Output = Result<FilterSet, AppError>> + Send {
        async move {
            let categories = self.list_categories(platform).await?;
            let keywords = self.list_keywords(platform).await?;
            Ok(FilterSet::new(
                platform,
                categories,
                keywords.into_iter().map(|k| k.value).collect(),
            ))
        }
    }
}

/// Outbound channel for new jobs.
pub trait Notifier: Send + Sync + Clone {
    /// Deliver one job. Returns only once the channel accepted it.
    fn notify(
        &self,
        platform: Platform,
        job: &JobDetail,
    ) -> impl Future<Output = Result<(), AppError>> + Send;
}

/// A previously posted chat message that can be edited in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageRef {
    pub channel: String,
    pub ts: String,
}

/// Chat-side rendering of the filter configuration.
pub trait ChatSurface: Send + Sync + Clone {
    fn send_categories(
        &self,
        platform: Platform,
        categories: &[Category],
    ) -> impl Future<Output = Result<(), AppError>> + Send;

    fn update_categories(
        &self,
        platform: Platform,
        message: &MessageRef,
        categories: &[Category],
    ) -> impl Future<Output = Result<(), AppError>> + Send;

    fn open_keywords_dialog(
        &self,
        platform: Platform,
        trigger_id: &str,
        keywords: &[Keyword],
    ) -> impl Future<Output = Result<(), AppError>> + Send;

    /// Tell the user a command did not work.
    fn send_error(&self, platform: Platform) -> impl Future<Output = Result<(), AppError>> + Send;
}
