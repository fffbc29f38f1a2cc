//! freelancer.com through its REST API.
//!
//! Freelancer filters projects by skill ("job" in API terms), not by
//! category, so listing resolves the selected categories to their skills
//! first and then asks for active projects carrying any of those skills.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::time::Duration;

use jobwatch_core::error::AppError;
use jobwatch_core::filters::FilterSet;
use jobwatch_core::models::{BudgetInfo, EmployerInfo, JobDetail, JobSummary, NewCategory};
use jobwatch_core::platform::Platform;
use jobwatch_core::traits::SourceAdapter;
use jobwatch_core::util::{compare_numeric_ids, usd_format};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;

const DEFAULT_API_URL: &str = "https://www.freelancer.com/api";
const PROJECT_URL_PREFIX: &str = "https://www.freelancer.com/projects/";
const LISTING_LIMIT: u32 = 50;

/// Freelancer API access.
#[derive(Debug, Clone)]
pub struct FreelancerConfig {
    pub token: String,
    pub api_url: String,
    pub timeout: Duration,
}

impl FreelancerConfig {
    /// Read configuration from environment variables.
    ///
    /// - `FREELANCER_TOKEN` (required)
    /// - `FREELANCER_API_URL` (optional, defaults to `https://www.freelancer.com/api`)
    pub fn from_env() -> Result<Self, AppError> {
        let token = std::env::var("FREELANCER_TOKEN")
            .map_err(|_| AppError::ConfigError("FREELANCER_TOKEN must be set".into()))?;
        let api_url =
            std::env::var("FREELANCER_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());

        Ok(Self {
            token,
            api_url: api_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(30),
        })
    }
}

#[derive(Clone)]
pub struct FreelancerAdapter {
    client: Client,
    config: FreelancerConfig,
}

/// Authenticated API identity, checked once per session.
#[derive(Debug, Clone)]
pub struct FreelancerSession {
    pub user_id: i64,
    pub username: String,
}

impl FreelancerAdapter {
    pub fn new(config: FreelancerConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .user_agent("jobwatch/0.1")
            .timeout(config.timeout)
            .build()
            .map_err(|e| AppError::ConfigError(format!("HTTP client error: {e}")))?;
        Ok(Self { client, config })
    }

    fn get(&self, route: &str) -> RequestBuilder {
        self.client
            .get(format!("{}{route}", self.config.api_url))
            .header("freelancer-oauth-v1", &self.config.token)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, AppError> {
        let timeout_secs = self.config.timeout.as_secs();
        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                AppError::Timeout(timeout_secs)
            } else {
                AppError::SourceUnavailable(format!("Freelancer request failed: {e}"))
            }
        })?;

        let status = response.status();
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(AppError::AuthFailed(format!(
                    "Freelancer rejected the token (HTTP {})",
                    status.as_u16()
                )));
            }
            StatusCode::TOO_MANY_REQUESTS => return Err(AppError::RateLimitExceeded),
            s if !s.is_success() => {
                let body = response.text().await.unwrap_or_default();
                return Err(AppError::SourceUnavailable(format!(
                    "Freelancer HTTP {}: {body}",
                    s.as_u16()
                )));
            }
            _ => {}
        }

        let envelope: Envelope<T> = response.json().await.map_err(|e| {
            AppError::SourceUnavailable(format!("Failed to parse Freelancer response: {e}"))
        })?;
        envelope.into_result()
    }

    async fn fetch_projects(
        &self,
        filters: &[(&str, String)],
    ) -> Result<ProjectsResult, AppError> {
        let mut query: Vec<(&str, String)> = vec![
            ("full_description", "true".into()),
            ("job_details", "true".into()),
            ("user_details", "true".into()),
            ("user_employer_reputation", "true".into()),
        ];
        query.extend(filters.iter().cloned());
        self.send(self.get("/projects/0.1/projects/").query(&query))
            .await
    }
}

impl SourceAdapter for FreelancerAdapter {
    type Session = FreelancerSession;

    fn platform(&self) -> Platform {
        Platform::Freelancer
    }

    /// Project ids are allocated in increasing order.
    fn compare_ids(&self, a: &str, b: &str) -> Option<Ordering> {
        compare_numeric_ids(a, b)
    }

    async fn open_session(&self) -> Result<FreelancerSession, AppError> {
        let me: SelfUser = self.send(self.get("/users/0.1/self/")).await?;
        tracing::debug!(user_id = me.id, username = %me.username, "Freelancer token accepted");
        Ok(FreelancerSession {
            user_id: me.id,
            username: me.username,
        })
    }

    async fn list_visible_jobs(
        &self,
        _session: &mut FreelancerSession,
        filter: &FilterSet,
    ) -> Result<Vec<JobSummary>, AppError> {
        let categories: Vec<(&str, String)> = filter
            .selected_keys()
            .into_iter()
            .map(|key| ("categories[]", key.to_string()))
            .collect();
        if categories.is_empty() {
            return Ok(Vec::new());
        }

        let skills: Vec<Skill> = self
            .send(self.get("/projects/0.1/jobs/").query(&categories))
            .await?;
        if skills.is_empty() {
            tracing::warn!("Selected Freelancer categories have no skills");
            return Ok(Vec::new());
        }

        let result: ProjectsResult = self
            .send(
                self.get("/projects/0.1/projects/active/")
                    .query(&listing_query(&skills)),
            )
            .await?;

        Ok(summaries(&result.projects))
    }

    async fn fetch_job_detail(
        &self,
        _session: &mut FreelancerSession,
        summary: &JobSummary,
    ) -> Result<JobDetail, AppError> {
        let failed = |reason: String| AppError::DetailFetchFailed {
            locator: summary.locator.clone(),
            reason,
        };

        let result = self
            .fetch_projects(&[("projects[]", summary.id.clone())])
            .await
            .map_err(|e| failed(e.to_string()))?;
        let project = result
            .projects
            .iter()
            .find(|p| p.id.to_string() == summary.id)
            .ok_or_else(|| failed("project not returned by the API".into()))?;

        Ok(to_detail(project, &result.users))
    }

    async fn fetch_categories(
        &self,
        _session: &mut FreelancerSession,
    ) -> Result<Vec<NewCategory>, AppError> {
        let result: CategoriesResult = self.send(self.get("/projects/0.1/categories/")).await?;
        Ok(result
            .categories
            .into_iter()
            .map(|c| NewCategory::new(c.name, c.id.to_string()))
            .collect())
    }

    async fn close_session(&self, _session: FreelancerSession) -> Result<(), AppError> {
        Ok(())
    }
}

// ---- Freelancer API types ----

#[derive(Deserialize)]
struct Envelope<T> {
    status: String,
    result: Option<T>,
    message: Option<String>,
}

impl<T> Envelope<T> {
    fn into_result(self) -> Result<T, AppError> {
        match (self.status.as_str(), self.result) {
            ("success", Some(result)) => Ok(result),
            _ => Err(AppError::SourceUnavailable(format!(
                "Freelancer API error: {}",
                self.message.unwrap_or(self.status)
            ))),
        }
    }
}

#[derive(Deserialize)]
struct SelfUser {
    id: i64,
    username: String,
}

#[derive(Deserialize)]
struct Skill {
    id: i64,
}

#[derive(Deserialize)]
struct CategoriesResult {
    categories: Vec<ApiCategory>,
}

#[derive(Deserialize)]
struct ApiCategory {
    id: i64,
    name: String,
}

#[derive(Debug, Deserialize)]
struct ProjectsResult {
    #[serde(default)]
    projects: Vec<Project>,
    #[serde(default)]
    users: HashMap<String, ApiUser>,
}

#[derive(Debug, Deserialize)]
struct Project {
    id: i64,
    title: String,
    seo_url: String,
    owner_id: i64,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    preview_description: Option<String>,
    #[serde(rename = "type")]
    kind: String,
    budget: Budget,
    #[serde(default)]
    jobs: Vec<ProjectSkill>,
    #[serde(default)]
    hourly_project_info: Option<HourlyInfo>,
}

#[derive(Debug, Deserialize)]
struct Budget {
    minimum: Option<f64>,
    maximum: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ProjectSkill {
    name: String,
}

#[derive(Debug, Deserialize)]
struct HourlyInfo {
    commitment: Option<Commitment>,
    duration_enum: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Commitment {
    hours: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct ApiUser {
    username: String,
    #[serde(default)]
    location: Option<Location>,
    #[serde(default)]
    employer_reputation: Option<Reputation>,
}

#[derive(Debug, Deserialize)]
struct Location {
    country: Option<Country>,
}

#[derive(Debug, Deserialize)]
struct Country {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Reputation {
    entire_history: Option<History>,
}

#[derive(Debug, Deserialize)]
struct History {
    overall: Option<f64>,
    complete: Option<i64>,
    reviews: Option<i64>,
}

// ---- Mapping ----

fn project_url(seo_url: &str) -> String {
    format!("{PROJECT_URL_PREFIX}{seo_url}")
}

/// Newest first: project ids grow monotonically.
fn listing_query(skills: &[Skill]) -> Vec<(&'static str, String)> {
    let mut query = vec![("limit", LISTING_LIMIT.to_string())];
    query.extend(skills.iter().map(|s| ("jobs[]", s.id.to_string())));
    query
}

fn summaries(projects: &[Project]) -> Vec<JobSummary> {
    let mut sorted: Vec<&Project> = projects.iter().collect();
    sorted.sort_by(|a, b| b.id.cmp(&a.id));
    sorted
        .into_iter()
        .map(|p| JobSummary::new(p.id.to_string(), project_url(&p.seo_url)))
        .collect()
}

fn amount_range(budget: &Budget) -> String {
    match (budget.minimum, budget.maximum) {
        (Some(min), Some(max)) if max > min => format!("{} - {}", usd_format(min), usd_format(max)),
        (Some(min), _) => usd_format(min),
        (None, Some(max)) => format!("up to {}", usd_format(max)),
        (None, None) => "Not specified".to_string(),
    }
}

fn to_budget(project: &Project) -> BudgetInfo {
    if project.kind == "hourly" {
        let info = project.hourly_project_info.as_ref();
        BudgetInfo::Hourly {
            rate: format!("{}/hr", amount_range(&project.budget)),
            hours: info
                .and_then(|i| i.commitment.as_ref())
                .and_then(|c| c.hours)
                .map(|h| h.to_string()),
            days: info.and_then(|i| i.duration_enum.clone()),
        }
    } else {
        BudgetInfo::Fixed {
            amount: amount_range(&project.budget),
            kind: "Fixed Price".to_string(),
        }
    }
}

fn to_employer(user: Option<&ApiUser>) -> EmployerInfo {
    let Some(user) = user else {
        return EmployerInfo::default();
    };
    let history = user
        .employer_reputation
        .as_ref()
        .and_then(|r| r.entire_history.as_ref());

    EmployerInfo {
        name: user.username.clone(),
        country: user
            .location
            .as_ref()
            .and_then(|l| l.country.as_ref())
            .and_then(|c| c.name.clone()),
        feedback: history.and_then(|h| {
            h.overall
                .map(|o| format!("{o:.1}/5 ({} reviews)", h.reviews.unwrap_or(0)))
        }),
        paid: None,
        paid_jobs: history.and_then(|h| h.complete).map(|c| c.to_string()),
    }
}

fn to_detail(project: &Project, users: &HashMap<String, ApiUser>) -> JobDetail {
    JobDetail {
        id: project.id.to_string(),
        url: project_url(&project.seo_url),
        title: project.title.clone(),
        description: project
            .description
            .clone()
            .or_else(|| project.preview_description.clone())
            .unwrap_or_default(),
        budget: to_budget(project),
        skills: project.jobs.iter().map(|j| j.name.clone()).collect(),
        employer: to_employer(users.get(&project.owner_id.to_string())),
    }
}
