use std::cmp::Ordering;
use std::collections::HashMap;

use jobwatch_core::error::AppError;
use jobwatch_core::filters::FilterSet;
use jobwatch_core::models::{JobDetail, JobSummary, NewCategory};
use jobwatch_core::platform::Platform;
use jobwatch_core::traits::SourceAdapter;

#[cfg(feature = "browser")]
use crate::browser::ChromiumDriver;
use crate::freelancer::{FreelancerAdapter, FreelancerConfig, FreelancerSession};
#[cfg(feature = "browser")]
use crate::guru::{GuruAdapter, GuruCredentials};

/// Every source jobwatch can poll, behind one concrete type.
#[derive(Clone)]
pub enum Source {
    #[cfg(feature = "browser")]
    Guru(GuruAdapter<ChromiumDriver>),
    Freelancer(FreelancerAdapter),
}

pub enum SourceSession {
    #[cfg(feature = "browser")]
    Guru(chromiumoxide::Page),
    Freelancer(FreelancerSession),
}

fn session_mismatch(platform: Platform) -> AppError {
    AppError::ConfigError(format!("session does not belong to the {platform} source"))
}

impl SourceAdapter for Source {
    type Session = SourceSession;

    fn platform(&self) -> Platform {
        match self {
            #[cfg(feature = "browser")]
            Source::Guru(a) => a.platform(),
            Source::Freelancer(a) => a.platform(),
        }
    }

    fn compare_ids(&self, a: &str, b: &str) -> Option<Ordering> {
        match self {
            #[cfg(feature = "browser")]
            Source::Guru(g) => g.compare_ids(a, b),
            Source::Freelancer(f) => f.compare_ids(a, b),
        }
    }

    async fn open_session(&self) -> Result<SourceSession, AppError> {
        match self {
            #[cfg(feature = "browser")]
            Source::Guru(a) => a.open_session().await.map(SourceSession::Guru),
            Source::Freelancer(a) => a.open_session().await.map(SourceSession::Freelancer),
        }
    }

    async fn list_visible_jobs(
        &self,
        session: &mut SourceSession,
        filter: &FilterSet,
    ) -> Result<Vec<JobSummary>, AppError> {
        match (self, session) {
            #[cfg(feature = "browser")]
            (Source::Guru(a), SourceSession::Guru(s)) => a.list_visible_jobs(s, filter).await,
            (Source::Freelancer(a), SourceSession::Freelancer(s)) => {
                a.list_visible_jobs(s, filter).await
            }
            #[allow(unreachable_patterns)]
            _ => Err(session_mismatch(self.platform())),
        }
    }

    async fn fetch_job_detail(
        &self,
        session: &mut SourceSession,
        summary: &JobSummary,
    ) -> Result<JobDetail, AppError> {
        match (self, session) {
            #[cfg(feature = "browser")]
            (Source::Guru(a), SourceSession::Guru(s)) => a.fetch_job_detail(s, summary).await,
            (Source::Freelancer(a), SourceSession::Freelancer(s)) => {
                a.fetch_job_detail(s, summary).await
            }
            #[allow(unreachable_patterns)]
            _ => Err(session_mismatch(self.platform())),
        }
    }

    async fn fetch_categories(
        &self,
        session: &mut SourceSession,
    ) -> Result<Vec<NewCategory>, AppError> {
        match (self, session) {
            #[cfg(feature = "browser")]
            (Source::Guru(a), SourceSession::Guru(s)) => a.fetch_categories(s).await,
            (Source::Freelancer(a), SourceSession::Freelancer(s)) => a.fetch_categories(s).await,
            #[allow(unreachable_patterns)]
            _ => Err(session_mismatch(self.platform())),
        }
    }

    async fn close_session(&self, session: SourceSession) -> Result<(), AppError> {
        match (self, session) {
            #[cfg(feature = "browser")]
            (Source::Guru(a), SourceSession::Guru(s)) => a.close_session(s).await,
            (Source::Freelancer(a), SourceSession::Freelancer(s)) => a.close_session(s).await,
            #[allow(unreachable_patterns)]
            _ => Err(session_mismatch(self.platform())),
        }
    }
}

/// Sources resolved once at startup, keyed by platform.
#[derive(Clone, Default)]
pub struct SourceRegistry {
    sources: HashMap<Platform, Source>,
}

impl SourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, source: Source) {
        self.sources.insert(source.platform(), source);
    }

    /// Build a source for each platform from its environment configuration.
    pub async fn from_env(platforms: &[Platform]) -> Result<Self, AppError> {
        let mut registry = Self::new();
        for &platform in platforms {
            let source = match platform {
                Platform::Guru => guru_from_env().await?,
                Platform::Freelancer => {
                    Source::Freelancer(FreelancerAdapter::new(FreelancerConfig::from_env()?)?)
                }
            };
            tracing::info!(%platform, "Source configured");
            registry.insert(source);
        }
        Ok(registry)
    }

    /// [`AppError::ConfigError`] when the platform was not configured at startup.
    pub fn get(&self, platform: Platform) -> Result<&Source, AppError> {
        self.sources.get(&platform).ok_or_else(|| {
            AppError::ConfigError(format!("{platform} is not enabled in JOBWATCH_PLATFORMS"))
        })
    }

    pub fn platforms(&self) -> Vec<Platform> {
        let mut platforms: Vec<Platform> = self.sources.keys().copied().collect();
        platforms.sort();
        platforms
    }
}

#[cfg(feature = "browser")]
async fn guru_from_env() -> Result<Source, AppError> {
    let credentials = GuruCredentials::from_env()?;
    let driver = ChromiumDriver::launch().await?;
    Ok(Source::Guru(GuruAdapter::new(driver, credentials)))
}

#[cfg(not(feature = "browser"))]
async fn guru_from_env() -> Result<Source, AppError> {
    Err(AppError::ConfigError(
        "Guru needs a browser: rebuild with the `browser` feature".into(),
    ))
}
