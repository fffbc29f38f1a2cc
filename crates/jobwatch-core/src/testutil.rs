//! Test utilities: mock implementations of all core traits.
//!
//! Handwritten mocks for dependency injection in unit tests.
//! All mocks use `Arc<Mutex<_>>` for interior mutability, allowing
//! test assertions on recorded calls.

use std::cmp::Ordering;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use chrono::Utc;

use crate::error::AppError;
use crate::filters::{FilterSet, normalize_keywords, reconcile_categories};
use crate::models::{
    BudgetInfo, Category, EmployerInfo, JobDetail, JobSummary, Keyword, NewCategory, Watermark,
};
use crate::platform::Platform;
use crate::poller::{PollEvent, PollReporter};
use crate::traits::{
    ChatSurface, FilterStore, MessageRef, Notifier, SourceAdapter, WatermarkStore,
};
use crate::util::compare_numeric_ids;

// ---------------------------------------------------------------------------
// MockSource
// ---------------------------------------------------------------------------

/// Mock source adapter with a fixed listing and a map of fetchable details.
///
/// Queued listing errors are returned first; after that every listing call
/// returns the configured listing. A detail id with no configured detail
/// fails with `DetailFetchFailed`.
#[derive(Clone)]
pub struct MockSource {
    platform: Platform,
    listing: Arc<Mutex<Vec<JobSummary>>>,
    listing_errors: Arc<Mutex<VecDeque<AppError>>>,
    details: Arc<Mutex<HashMap<String, JobDetail>>>,
    categories: Arc<Mutex<Vec<NewCategory>>>,
    open_error: Arc<Mutex<Option<AppError>>>,
    pub detail_requests: Arc<Mutex<Vec<String>>>,
    opens: Arc<Mutex<u32>>,
    closes: Arc<Mutex<u32>>,
    numeric_ids: bool,
}

impl MockSource {
    pub fn new(platform: Platform) -> Self {
        Self {
            platform,
            listing: Arc::new(Mutex::new(Vec::new())),
            listing_errors: Arc::new(Mutex::new(VecDeque::new())),
            details: Arc::new(Mutex::new(HashMap::new())),
            categories: Arc::new(Mutex::new(Vec::new())),
            open_error: Arc::new(Mutex::new(None)),
            detail_requests: Arc::new(Mutex::new(Vec::new())),
            opens: Arc::new(Mutex::new(0)),
            closes: Arc::new(Mutex::new(0)),
            numeric_ids: false,
        }
    }

    /// Treat ids as ordered integers, the way the Freelancer source does.
    pub fn with_numeric_ids(mut self) -> Self {
        self.numeric_ids = true;
        self
    }

    /// Listing returned by every call, newest first.
    pub fn with_listing(self, ids: &[&str]) -> Self {
        *self.listing.lock().unwrap() = ids.iter().map(|id| make_summary(id)).collect();
        self
    }

    /// Queue an error for the next listing call.
    pub fn with_listing_error(self, error: AppError) -> Self {
        self.listing_errors.lock().unwrap().push_back(error);
        self
    }

    pub fn with_detail(self, detail: JobDetail) -> Self {
        self.details
            .lock()
            .unwrap()
            .insert(detail.id.clone(), detail);
        self
    }

    pub fn with_categories(self, categories: Vec<NewCategory>) -> Self {
        *self.categories.lock().unwrap() = categories;
        self
    }

    /// Make the next `open_session` fail.
    pub fn with_open_error(self, error: AppError) -> Self {
        *self.open_error.lock().unwrap() = Some(error);
        self
    }

    pub fn opens(&self) -> u32 {
        *self.opens.lock().unwrap()
    }

    pub fn closes(&self) -> u32 {
        *self.closes.lock().unwrap()
    }
}

impl SourceAdapter for MockSource {
    /// Sequence number of the opened session.
    type Session = u32;

    fn platform(&self) -> Platform {
        self.platform
    }

    fn compare_ids(&self, a: &str, b: &str) -> Option<Ordering> {
        if self.numeric_ids {
            compare_numeric_ids(a, b)
        } else {
            None
        }
    }

    async fn open_session(&self) -> Result<u32, AppError> {
        if let Some(e) = self.open_error.lock().unwrap().take() {
            return Err(e);
        }
        let mut opens = self.opens.lock().unwrap();
        *opens += 1;
        Ok(*opens)
    }

    async fn list_visible_jobs(
        &self,
        _session: &mut u32,
        _filter: &FilterSet,
    ) -> Result<Vec<JobSummary>, AppError> {
        if let Some(e) = self.listing_errors.lock().unwrap().pop_front() {
            return Err(e);
        }
        Ok(self.listing.lock().unwrap().clone())
    }

    async fn fetch_job_detail(
        &self,
        _session: &mut u32,
        summary: &JobSummary,
    ) -> Result<JobDetail, AppError> {
        self.detail_requests
            .lock()
            .unwrap()
            .push(summary.id.clone());
        self.details
            .lock()
            .unwrap()
            .get(&summary.id)
            .cloned()
            .ok_or_else(|| AppError::DetailFetchFailed {
                locator: summary.locator.clone(),
                reason: "no such job".into(),
            })
    }

    async fn fetch_categories(&self, _session: &mut u32) -> Result<Vec<NewCategory>, AppError> {
        Ok(self.categories.lock().unwrap().clone())
    }

    async fn close_session(&self, _session: u32) -> Result<(), AppError> {
        *self.closes.lock().unwrap() += 1;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// MockWatermarkStore
// ---------------------------------------------------------------------------

/// In-memory watermark store that counts advances.
#[derive(Clone, Default)]
pub struct MockWatermarkStore {
    marks: Arc<Mutex<HashMap<Platform, String>>>,
    advances: Arc<Mutex<u32>>,
}

impl MockWatermarkStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_watermark(self, platform: Platform, job_id: &str) -> Self {
        self.marks
            .lock()
            .unwrap()
            .insert(platform, job_id.to_string());
        self
    }

    pub fn current(&self, platform: Platform) -> Option<String> {
        self.marks.lock().unwrap().get(&platform).cloned()
    }

    pub fn advances(&self) -> u32 {
        *self.advances.lock().unwrap()
    }
}

impl WatermarkStore for MockWatermarkStore {
    async fn get(&self, platform: Platform) -> Result<Option<Watermark>, AppError> {
        Ok(self.current(platform).map(|last_job_id| Watermark {
            platform,
            last_job_id,
            updated_at: Utc::now(),
        }))
    }

    async fn advance(&self, platform: Platform, job_id: &str) -> Result<(), AppError> {
        *self.advances.lock().unwrap() += 1;
        self.marks
            .lock()
            .unwrap()
            .insert(platform, job_id.to_string());
        Ok(())
    }

    async fn clear(&self, platform: Platform) -> Result<(), AppError> {
        self.marks.lock().unwrap().remove(&platform);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// MockFilterStore
// ---------------------------------------------------------------------------

/// In-memory filter store applying the same reconciliation rules as Postgres.
#[derive(Clone, Default)]
pub struct MockFilterStore {
    categories: Arc<Mutex<Vec<Category>>>,
    keywords: Arc<Mutex<Vec<Keyword>>>,
    error: Arc<Mutex<Option<AppError>>>,
}

impl MockFilterStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_category(self, category: Category) -> Self {
        self.categories.lock().unwrap().push(category);
        self
    }

    pub fn with_keywords(self, platform: Platform, values: &[&str]) -> Self {
        self.keywords
            .lock()
            .unwrap()
            .extend(values.iter().map(|v| Keyword {
                platform,
                value: v.to_string(),
            }));
        self
    }

    /// Make the next store call fail.
    pub fn with_error(self, error: AppError) -> Self {
        *self.error.lock().unwrap() = Some(error);
        self
    }

    fn take_error(&self) -> Result<(), AppError> {
        match self.error.lock().unwrap().take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl FilterStore for MockFilterStore {
    async fn list_categories(&self, platform: Platform) -> Result<Vec<Category>, AppError> {
        self.take_error()?;
        Ok(self
            .categories
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.platform == platform)
            .cloned()
            .collect())
    }

    async fn flip_selection(
        &self,
        platform: Platform,
        external_key: &str,
    ) -> Result<Category, AppError> {
        self.take_error()?;
        let mut categories = self.categories.lock().unwrap();
        let category = categories
            .iter_mut()
            .find(|c| c.platform == platform && c.external_key == external_key)
            .ok_or_else(|| AppError::NotFound(format!("category {external_key}")))?;
        category.selected = !category.selected;
        Ok(category.clone())
    }

    async fn replace_all(
        &self,
        platform: Platform,
        categories: Vec<NewCategory>,
    ) -> Result<(), AppError> {
        self.take_error()?;
        let mut stored = self.categories.lock().unwrap();
        let reconciled = reconcile_categories(platform, &stored, categories);
        stored.retain(|c| c.platform != platform);
        stored.extend(reconciled);
        Ok(())
    }

    async fn list_keywords(&self, platform: Platform) -> Result<Vec<Keyword>, AppError> {
        self.take_error()?;
        Ok(self
            .keywords
            .lock()
            .unwrap()
            .iter()
            .filter(|k| k.platform == platform)
            .cloned()
            .collect())
    }

    async fn set_keywords(&self, platform: Platform, values: &[String]) -> Result<(), AppError> {
        self.take_error()?;
        let mut stored = self.keywords.lock().unwrap();
        stored.retain(|k| k.platform != platform);
        stored.extend(
            normalize_keywords(values)
                .into_iter()
                .map(|value| Keyword { platform, value }),
        );
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// MockNotifier
// ---------------------------------------------------------------------------

/// Mock notifier recording delivered job ids, optionally failing on one id.
#[derive(Clone, Default)]
pub struct MockNotifier {
    delivered: Arc<Mutex<Vec<String>>>,
    fail_on: Arc<Mutex<Option<String>>>,
}

impl MockNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject the job with this id until [`recover`](Self::recover) is called.
    pub fn fail_on(self, job_id: &str) -> Self {
        *self.fail_on.lock().unwrap() = Some(job_id.to_string());
        self
    }

    pub fn recover(&self) {
        self.fail_on.lock().unwrap().take();
    }

    pub fn delivered_ids(&self) -> Vec<String> {
        self.delivered.lock().unwrap().clone()
    }
}

impl Notifier for MockNotifier {
    async fn notify(&self, _platform: Platform, job: &JobDetail) -> Result<(), AppError> {
        if self.fail_on.lock().unwrap().as_deref() == Some(job.id.as_str()) {
            return Err(AppError::NotificationFailed(format!("rejected {}", job.id)));
        }
        self.delivered.lock().unwrap().push(job.id.clone());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// MockChat
// ---------------------------------------------------------------------------

/// A recorded chat surface call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCall {
    Categories {
        platform: Platform,
        selected: Vec<String>,
    },
    Updated {
        platform: Platform,
        message: MessageRef,
        selected: Vec<String>,
    },
    KeywordsDialog {
        platform: Platform,
        trigger_id: String,
        keywords: Vec<String>,
    },
    Error {
        platform: Platform,
    },
}

/// Mock chat surface recording every call.
#[derive(Clone, Default)]
pub struct MockChat {
    pub calls: Arc<Mutex<Vec<ChatCall>>>,
}

impl MockChat {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<ChatCall> {
        self.calls.lock().unwrap().clone()
    }
}

fn selected_keys(categories: &[Category]) -> Vec<String> {
    categories
        .iter()
        .filter(|c| c.selected)
        .map(|c| c.external_key.clone())
        .collect()
}

impl ChatSurface for MockChat {
    async fn send_categories(
        &self,
        platform: Platform,
        categories: &[Category],
    ) -> Result<(), AppError> {
        self.calls.lock().unwrap().push(ChatCall::Categories {
            platform,
            selected: selected_keys(categories),
        });
        Ok(())
    }

    async fn update_categories(
        &self,
        platform: Platform,
        message: &MessageRef,
        categories: &[Category],
    ) -> Result<(), AppError> {
        self.calls.lock().unwrap().push(ChatCall::Updated {
            platform,
            message: message.clone(),
            selected: selected_keys(categories),
        });
        Ok(())
    }

    async fn open_keywords_dialog(
        &self,
        platform: Platform,
        trigger_id: &str,
        keywords: &[Keyword],
    ) -> Result<(), AppError> {
        self.calls.lock().unwrap().push(ChatCall::KeywordsDialog {
            platform,
            trigger_id: trigger_id.to_string(),
            keywords: keywords.iter().map(|k| k.value.clone()).collect(),
        });
        Ok(())
    }

    async fn send_error(&self, platform: Platform) -> Result<(), AppError> {
        self.calls
            .lock()
            .unwrap()
            .push(ChatCall::Error { platform });
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// MockReporter
// ---------------------------------------------------------------------------

/// Mock poll reporter that records event labels.
#[derive(Default)]
pub struct MockReporter {
    pub events: Arc<Mutex<Vec<String>>>,
}

impl MockReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn labels(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }
}

impl PollReporter for MockReporter {
    fn report(&self, event: PollEvent<'_>) {
        let label = match &event {
            PollEvent::Started { .. } => "Started",
            PollEvent::CycleStarted { .. } => "CycleStarted",
            PollEvent::NoSelection { .. } => "NoSelection",
            PollEvent::Listed { .. } => "Listed",
            PollEvent::NewJobs { .. } => "NewJobs",
            PollEvent::JobDelivered { .. } => "JobDelivered",
            PollEvent::JobSuppressed { .. } => "JobSuppressed",
            PollEvent::WatermarkAdvanced { .. } => "WatermarkAdvanced",
            PollEvent::CycleCompleted { .. } => "CycleCompleted",
            PollEvent::CycleFailed { .. } => "CycleFailed",
            PollEvent::ShuttingDown { .. } => "ShuttingDown",
            PollEvent::Stopped { .. } => "Stopped",
        };
        self.events.lock().unwrap().push(label.to_string());
    }
}

// ---------------------------------------------------------------------------
// Test helpers
// ---------------------------------------------------------------------------

/// Summary whose locator embeds the id, like a Guru job URL.
pub fn make_summary(id: &str) -> JobSummary {
    JobSummary::new(id, format!("https://www.guru.com/jobs/test-job/{id}"))
}

pub fn make_detail(id: &str) -> JobDetail {
    JobDetail {
        id: id.to_string(),
        url: format!("https://www.guru.com/jobs/test-job/{id}"),
        title: format!("Job {id}"),
        description: format!("Description for {id}"),
        budget: BudgetInfo::Fixed {
            amount: "$500".to_string(),
            kind: "Fixed Price".to_string(),
        },
        skills: vec!["Testing".to_string()],
        employer: EmployerInfo {
            name: "Acme".to_string(),
            country: Some("Italy".to_string()),
            ..EmployerInfo::default()
        },
    }
}

/// Category whose name doubles as its external key.
pub fn make_category(platform: Platform, name: &str, selected: bool) -> Category {
    Category {
        platform,
        name: name.to_string(),
        external_key: name.to_string(),
        selected,
    }
}
