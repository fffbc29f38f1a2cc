//! guru.com, scraped through a logged-in browser session.
//!
//! Guru has no public API, so the adapter drives a real page: log in, answer
//! the security question when one is asked, then read the job board and the
//! individual job pages. HTML parsing is kept in pure functions so it can be
//! tested against static markup.

use jobwatch_core::error::AppError;
use jobwatch_core::filters::FilterSet;
use jobwatch_core::models::{BudgetInfo, EmployerInfo, JobDetail, JobSummary, NewCategory};
use jobwatch_core::platform::Platform;
use jobwatch_core::traits::SourceAdapter;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::browser::PageDriver;

pub const GURU_BASE_URL: &str = "https://www.guru.com";

mod selectors {
    pub const USERNAME: &str =
        "input#ctl00_ContentPlaceHolder1_ucLogin_txtUserName_txtUserName_TextBox";
    pub const PASSWORD: &str =
        "input#ctl00_ContentPlaceHolder1_ucLogin_txtPassword_txtPassword_TextBox";
    pub const SIGN_IN: &str =
        "input#ctl00_ContentPlaceHolder1_btnLoginAccount_btnLoginAccount_Button";
    pub const SECURITY_ANSWER: &str =
        "input#ctl00_ContentPlaceHolder1_ucSqAnswer_txtAns1_txtAns1_TextBox";
    pub const SECURITY_CONTINUE: &str =
        "input#ctl00_ContentPlaceHolder1_ucSqAnswer_btnSave_btnSave_Button";

    pub const JOB_ITEM: &str = "li.serviceItem";
    pub const JOB_CATEGORY_LINK: &str = "ul.skills a";
    pub const JOB_LINK: &str = "h2.servTitle > a";
    pub const CATEGORY_LINK: &str = "a[href*='/d/jobs/c/']";

    pub const TITLE: &str = "h1#ctl00_guB_hTitleAndAddtoWatchSec";
    pub const DESCRIPTION: &str = ".section_desc.jobDetail-section";
    pub const BUDGET_TYPE: &str = "div.budget > ul > li:first-child";
    pub const BUDGET_AMOUNT: &str = "div.budget > ul > li:nth-child(2)";
    pub const SKILLS: &str = "ul#ctl00_guB_ucProjectDetail_ulSkills > li";
    pub const EMPLOYER_NAME: &str = "h3.identityName";
    pub const EMPLOYER_COUNTRY: &str = "p#ctl00_guB_divEmpLoc";
    pub const EMPLOYER_FEEDBACK: &str = "table.module_table tr:nth-child(2) > td.right";
    pub const EMPLOYER_PAID: &str = "section#empStats > table tr td:nth-child(2)";
    pub const EMPLOYER_PAID_JOBS: &str = "section#empStats > table tr:nth-child(4) td:nth-child(2)";
}

/// Guru login credentials.
#[derive(Debug, Clone)]
pub struct GuruCredentials {
    pub username: String,
    pub password: String,
    /// Candidate answers for the security question, tried in order.
    pub security_answers: Vec<String>,
}

impl GuruCredentials {
    /// Read credentials from environment variables.
    ///
    /// - `GURU_USERNAME` (required)
    /// - `GURU_PASSWORD` (required)
    /// - `GURU_SECURITY_ANSWERS` (optional, comma-separated)
    pub fn from_env() -> Result<Self, AppError> {
        let username = std::env::var("GURU_USERNAME")
            .map_err(|_| AppError::ConfigError("GURU_USERNAME must be set".into()))?;
        let password = std::env::var("GURU_PASSWORD")
            .map_err(|_| AppError::ConfigError("GURU_PASSWORD must be set".into()))?;
        let security_answers = std::env::var("GURU_SECURITY_ANSWERS")
            .map(|raw| parse_security_answers(&raw))
            .unwrap_or_default();

        Ok(Self {
            username,
            password,
            security_answers,
        })
    }
}

fn parse_security_answers(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .map(String::from)
        .collect()
}

#[derive(Clone)]
pub struct GuruAdapter<D: PageDriver> {
    driver: D,
    credentials: GuruCredentials,
}

impl<D: PageDriver> GuruAdapter<D> {
    pub fn new(driver: D, credentials: GuruCredentials) -> Self {
        Self {
            driver,
            credentials,
        }
    }

    async fn login(&self, page: &mut D::Page) -> Result<(), AppError> {
        self.driver
            .goto(page, &format!("{GURU_BASE_URL}/login.aspx"))
            .await?;
        self.driver
            .fill(page, selectors::USERNAME, &self.credentials.username)
            .await?;
        self.driver
            .fill(page, selectors::PASSWORD, &self.credentials.password)
            .await?;
        self.driver.click_and_wait(page, selectors::SIGN_IN).await?;

        if requires_security_answer(&self.driver.current_url(page).await?) {
            self.answer_security_question(page).await?;
        }

        if is_login_page(&self.driver.current_url(page).await?) {
            return Err(AppError::AuthFailed(
                "Guru rejected the username or password".into(),
            ));
        }

        tracing::info!(username = %self.credentials.username, "Logged in to Guru");
        Ok(())
    }

    async fn answer_security_question(&self, page: &mut D::Page) -> Result<(), AppError> {
        let answers = &self.credentials.security_answers;
        if answers.is_empty() {
            return Err(AppError::AuthRequired(
                "Guru asked a security question but GURU_SECURITY_ANSWERS is empty".into(),
            ));
        }

        for (i, answer) in answers.iter().enumerate() {
            self.driver
                .fill(page, selectors::SECURITY_ANSWER, answer)
                .await?;
            self.driver
                .click_and_wait(page, selectors::SECURITY_CONTINUE)
                .await?;
            if !requires_security_answer(&self.driver.current_url(page).await?) {
                tracing::debug!(attempt = i + 1, "Security question answered");
                return Ok(());
            }
        }

        Err(AppError::AuthFailed(format!(
            "none of the {} configured security answers was accepted",
            answers.len()
        )))
    }

    async fn load(&self, page: &mut D::Page, url: &str) -> Result<String, AppError> {
        self.driver.goto(page, url).await?;
        if is_login_page(&self.driver.current_url(page).await?) {
            return Err(AppError::AuthRequired(
                "Guru redirected to the login page".into(),
            ));
        }
        self.driver.html(page).await
    }
}

impl<D: PageDriver> SourceAdapter for GuruAdapter<D> {
    type Session = D::Page;

    fn platform(&self) -> Platform {
        Platform::Guru
    }

    async fn open_session(&self) -> Result<D::Page, AppError> {
        let mut page = self.driver.open_page().await?;
        match self.login(&mut page).await {
            Ok(()) => Ok(page),
            Err(e) => {
                if let Err(close_err) = self.driver.close_page(page).await {
                    tracing::warn!(error = %close_err, "Failed to close page after login failure");
                }
                Err(e)
            }
        }
    }

    async fn list_visible_jobs(
        &self,
        page: &mut D::Page,
        filter: &FilterSet,
    ) -> Result<Vec<JobSummary>, AppError> {
        let url = format!("{GURU_BASE_URL}/d/jobs/");
        let html = self.load(page, &url).await?;
        parse_job_listing(&html, filter)
    }

    async fn fetch_job_detail(
        &self,
        page: &mut D::Page,
        summary: &JobSummary,
    ) -> Result<JobDetail, AppError> {
        let html = self
            .load(page, &summary.locator)
            .await
            .map_err(|e| match e {
                AppError::AuthRequired(_) => e,
                other => AppError::DetailFetchFailed {
                    locator: summary.locator.clone(),
                    reason: other.to_string(),
                },
            })?;
        parse_job_detail(&html, summary)
    }

    async fn fetch_categories(&self, page: &mut D::Page) -> Result<Vec<NewCategory>, AppError> {
        let html = self.load(page, &format!("{GURU_BASE_URL}/d/jobs/")).await?;
        parse_categories(&html)
    }

    async fn close_session(&self, mut page: D::Page) -> Result<(), AppError> {
        if let Err(e) = self
            .driver
            .goto(&mut page, &format!("{GURU_BASE_URL}/logout.aspx"))
            .await
        {
            tracing::debug!(error = %e, "Guru logout failed");
        }
        self.driver.close_page(page).await
    }
}

fn requires_security_answer(url: &str) -> bool {
    url.contains("SecurityQuestions")
}

fn is_login_page(url: &str) -> bool {
    url.to_lowercase().contains("login.aspx")
}

fn selector(css: &str) -> Result<Selector, AppError> {
    Selector::parse(css)
        .map_err(|e| AppError::SourceUnavailable(format!("Invalid selector '{css}': {e}")))
}

/// Visible text of an element, one trimmed line per text line.
fn inner_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .collect::<String>()
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn first_text(document: &Html, css: &str) -> Result<Option<String>, AppError> {
    Ok(document
        .select(&selector(css)?)
        .next()
        .map(inner_text)
        .filter(|t| !t.is_empty()))
}

/// Category slug from a job-board category link: the segment after `/c/`.
///
/// `https://www.guru.com/d/jobs/c/programming-development/` → `programming-development`
pub fn category_slug(href: &str) -> Option<String> {
    let url = Url::parse(GURU_BASE_URL).ok()?.join(href).ok()?;
    let mut segments = url.path_segments()?;
    segments.find(|s| *s == "c")?;
    segments
        .next()
        .filter(|s| !s.is_empty())
        .map(String::from)
}

/// Jobs on the job board that belong to a selected category, newest first.
pub fn parse_job_listing(html: &str, filter: &FilterSet) -> Result<Vec<JobSummary>, AppError> {
    let document = Html::parse_document(html);
    let base = Url::parse(GURU_BASE_URL)
        .map_err(|e| AppError::ConfigError(format!("Invalid Guru base URL: {e}")))?;
    let item_sel = selector(selectors::JOB_ITEM)?;
    let category_sel = selector(selectors::JOB_CATEGORY_LINK)?;
    let link_sel = selector(selectors::JOB_LINK)?;

    let mut jobs = Vec::new();
    for item in document.select(&item_sel) {
        let Some(slug) = item
            .select(&category_sel)
            .next()
            .and_then(|a| a.value().attr("href"))
            .and_then(category_slug)
        else {
            continue;
        };
        if !filter.is_selected(&slug) {
            continue;
        }

        let Some(link) = item
            .select(&link_sel)
            .next()
            .and_then(|a| a.value().attr("href"))
            .and_then(|href| base.join(href).ok())
        else {
            tracing::debug!(%slug, "Job item without a title link, skipping");
            continue;
        };
        jobs.push(JobSummary::from_locator(link.as_str()));
    }
    Ok(jobs)
}

/// Parse a job page. Title, description and budget are mandatory.
pub fn parse_job_detail(html: &str, summary: &JobSummary) -> Result<JobDetail, AppError> {
    let document = Html::parse_document(html);
    let missing = |what: &str| AppError::DetailFetchFailed {
        locator: summary.locator.clone(),
        reason: format!("{what} not found on job page"),
    };

    let title = first_text(&document, selectors::TITLE)?.ok_or_else(|| missing("title"))?;
    let description =
        first_text(&document, selectors::DESCRIPTION)?.ok_or_else(|| missing("description"))?;
    let budget_type =
        first_text(&document, selectors::BUDGET_TYPE)?.ok_or_else(|| missing("budget type"))?;
    let budget_amount = first_text(&document, selectors::BUDGET_AMOUNT)?
        .ok_or_else(|| missing("budget amount"))?;

    let budget = if budget_type.to_lowercase().contains("hour") {
        BudgetInfo::Hourly {
            days: None,
            hours: None,
            rate: budget_amount,
        }
    } else {
        BudgetInfo::Fixed {
            amount: budget_amount,
            kind: budget_type,
        }
    };

    let skills = document
        .select(&selector(selectors::SKILLS)?)
        .map(inner_text)
        .filter(|s| !s.is_empty())
        .collect();

    let employer = EmployerInfo {
        name: first_text(&document, selectors::EMPLOYER_NAME)?.unwrap_or_default(),
        country: first_text(&document, selectors::EMPLOYER_COUNTRY)?,
        feedback: first_text(&document, selectors::EMPLOYER_FEEDBACK)?,
        paid: first_text(&document, selectors::EMPLOYER_PAID)?,
        paid_jobs: first_text(&document, selectors::EMPLOYER_PAID_JOBS)?,
    };

    Ok(JobDetail {
        id: summary.id.clone(),
        url: summary.locator.clone(),
        title,
        description,
        budget,
        skills,
        employer,
    })
}

/// Category links of the job board, keyed by slug.
pub fn parse_categories(html: &str) -> Result<Vec<NewCategory>, AppError> {
    let document = Html::parse_document(html);
    Ok(document
        .select(&selector(selectors::CATEGORY_LINK)?)
        .filter_map(|a| {
            let slug = category_slug(a.value().attr("href")?)?;
            let name = inner_text(a);
            (!name.is_empty()).then(|| NewCategory::new(name, slug))
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use jobwatch_core::testutil::make_category;

    use super::*;

    const LISTING_HTML: &str = r#"
        <html><body>
          <aside>
            <a href="/d/jobs/c/programming-development/">Programming &amp; Development</a>
            <a href="/d/jobs/c/design-art/">Design &amp; Art</a>
            <a href="/d/freelancers/">Find freelancers</a>
          </aside>
          <ul>
            <li class="serviceItem">
              <h2 class="servTitle"><a href="/jobs/rust-api/1987654&SearchUrl=abc">Rust API</a></h2>
              <ul class="skills"><li><a href="/d/jobs/c/programming-development/">Programming</a></li></ul>
            </li>
            <li class="serviceItem">
              <h2 class="servTitle"><a href="/jobs/logo/1987653">Logo</a></h2>
              <ul class="skills"><li><a href="/d/jobs/c/design-art/">Design</a></li></ul>
            </li>
            <li class="serviceItem">
              <h2 class="servTitle"><a href="/jobs/web-shop/1987650">Web shop</a></h2>
              <ul class="skills"><li><a href="/d/jobs/c/programming-development/">Programming</a></li></ul>
            </li>
          </ul>
        </body></html>
    "#;

    const DETAIL_HTML: &str = r#"
        <html><body>
          <h1 id="ctl00_guB_hTitleAndAddtoWatchSec">Rust API</h1>
          <div class="section_desc jobDetail-section">
            Build a REST API.
            Must know tokio.
          </div>
          <div class="budget"><ul><li>Fixed Price</li><li>$1,500</li></ul></div>
          <ul id="ctl00_guB_ucProjectDetail_ulSkills"><li>Rust</li><li>PostgreSQL</li></ul>
          <h3 class="identityName">Acme Corp</h3>
          <p id="ctl00_guB_divEmpLoc">Italy</p>
        </body></html>
    "#;

    fn programming_only() -> FilterSet {
        FilterSet::new(
            Platform::Guru,
            vec![make_category(Platform::Guru, "programming-development", true)],
            vec![],
        )
    }

    #[test]
    fn listing_keeps_selected_categories_in_order() {
        let jobs = parse_job_listing(LISTING_HTML, &programming_only()).unwrap();

        assert_eq!(
            jobs.iter().map(|j| j.id.as_str()).collect::<Vec<_>>(),
            vec!["1987654", "1987650"]
        );
        assert_eq!(
            jobs[0].locator,
            "https://www.guru.com/jobs/rust-api/1987654&SearchUrl=abc"
        );
    }

    #[test]
    fn listing_with_nothing_selected_is_empty() {
        let filter = FilterSet::new(Platform::Guru, vec![], vec![]);
        assert!(parse_job_listing(LISTING_HTML, &filter).unwrap().is_empty());
    }

    #[test]
    fn detail_page_is_parsed() {
        let summary = JobSummary::from_locator("https://www.guru.com/jobs/rust-api/1987654");
        let detail = parse_job_detail(DETAIL_HTML, &summary).unwrap();

        assert_eq!(detail.id, "1987654");
        assert_eq!(detail.title, "Rust API");
        assert_eq!(detail.description, "Build a REST API.\nMust know tokio.");
        assert_eq!(detail.budget.summary(), "Fixed Price: $1,500");
        assert_eq!(detail.skills, vec!["Rust", "PostgreSQL"]);
        assert_eq!(detail.employer.name, "Acme Corp");
        assert_eq!(detail.employer.country.as_deref(), Some("Italy"));
        assert_eq!(detail.employer.paid, None);
    }

    #[test]
    fn hourly_budget_is_recognised() {
        let html = DETAIL_HTML
            .replace("Fixed Price", "Hourly Rate")
            .replace("$1,500", "$20-30/hr");
        let summary = JobSummary::from_locator("https://www.guru.com/jobs/rust-api/1987654");

        let detail = parse_job_detail(&html, &summary).unwrap();

        assert!(matches!(detail.budget, BudgetInfo::Hourly { ref rate, .. } if rate == "$20-30/hr"));
    }

    #[test]
    fn detail_page_without_title_fails() {
        let html = DETAIL_HTML.replace("ctl00_guB_hTitleAndAddtoWatchSec", "other");
        let summary = JobSummary::from_locator("https://www.guru.com/jobs/rust-api/1987654");

        let err = parse_job_detail(&html, &summary).unwrap_err();

        assert!(matches!(err, AppError::DetailFetchFailed { ref reason, .. } if reason.contains("title")));
    }

    #[test]
    fn categories_are_read_from_board_links() {
        let categories = parse_categories(LISTING_HTML).unwrap();
        assert_eq!(
            categories[0],
            NewCategory::new("Programming & Development", "programming-development")
        );
        assert!(categories.iter().any(|c| c.external_key == "design-art"));
        assert!(!categories.iter().any(|c| c.name == "Find freelancers"));
    }

    #[test]
    fn category_slug_extraction() {
        assert_eq!(
            category_slug("https://www.guru.com/d/jobs/c/writing-translation/sc/editing/"),
            Some("writing-translation".to_string())
        );
        assert_eq!(category_slug("/d/jobs/c/sales-marketing/"), Some("sales-marketing".into()));
        assert_eq!(category_slug("/d/jobs/"), None);
    }

    #[test]
    fn security_answers_split_on_commas() {
        assert_eq!(parse_security_answers(" rex, Milan ,,"), vec!["rex", "Milan"]);
    }

    // -----------------------------------------------------------------------
    // Scripted driver: each click lands on the next scripted URL.
    // -----------------------------------------------------------------------

    #[derive(Clone, Default)]
    struct ScriptedDriver {
        landings: Arc<Mutex<Vec<String>>>,
        current: Arc<Mutex<String>>,
        pages: Arc<Mutex<HashMap<String, String>>>,
        fills: Arc<Mutex<Vec<(String, String)>>>,
        closed: Arc<Mutex<u32>>,
    }

    impl ScriptedDriver {
        fn landing_on(urls: &[&str]) -> Self {
            let driver = Self::default();
            *driver.landings.lock().unwrap() = urls.iter().map(|u| u.to_string()).collect();
            driver
        }

        fn with_page(self, url: &str, html: &str) -> Self {
            self.pages
                .lock()
                .unwrap()
                .insert(url.to_string(), html.to_string());
            self
        }

        fn filled_answers(&self) -> Vec<String> {
            self.fills
                .lock()
                .unwrap()
                .iter()
                .filter(|(sel, _)| sel == selectors::SECURITY_ANSWER)
                .map(|(_, v)| v.clone())
                .collect()
        }

        fn closed(&self) -> u32 {
            *self.closed.lock().unwrap()
        }
    }

    impl PageDriver for ScriptedDriver {
        type Page = ();

        async fn open_page(&self) -> Result<(), AppError> {
            Ok(())
        }

        async fn goto(&self, _page: &mut (), url: &str) -> Result<(), AppError> {
            *self.current.lock().unwrap() = url.to_string();
            Ok(())
        }

        async fn fill(&self, _page: &mut (), selector: &str, value: &str) -> Result<(), AppError> {
            self.fills
                .lock()
                .unwrap()
                .push((selector.to_string(), value.to_string()));
            Ok(())
        }

        async fn click_and_wait(&self, _page: &mut (), _selector: &str) -> Result<(), AppError> {
            let mut landings = self.landings.lock().unwrap();
            if !landings.is_empty() {
                *self.current.lock().unwrap() = landings.remove(0);
            }
            Ok(())
        }

        async fn current_url(&self, _page: &mut ()) -> Result<String, AppError> {
            Ok(self.current.lock().unwrap().clone())
        }

        async fn html(&self, _page: &mut ()) -> Result<String, AppError> {
            let current = self.current.lock().unwrap().clone();
            Ok(self
                .pages
                .lock()
                .unwrap()
                .get(&current)
                .cloned()
                .unwrap_or_default())
        }

        async fn close_page(&self, _page: ()) -> Result<(), AppError> {
            *self.closed.lock().unwrap() += 1;
            Ok(())
        }
    }

    const DASHBOARD: &str = "https://www.guru.com/pro/Dashboard.aspx";
    const CHALLENGE: &str = "https://www.guru.com/SecurityQuestions.aspx";

    fn credentials(answers: &[&str]) -> GuruCredentials {
        GuruCredentials {
            username: "user".into(),
            password: "secret".into(),
            security_answers: answers.iter().map(|a| a.to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn login_without_challenge() {
        let driver = ScriptedDriver::landing_on(&[DASHBOARD]);
        let adapter = GuruAdapter::new(driver.clone(), credentials(&[]));

        adapter.open_session().await.unwrap();

        assert!(driver.filled_answers().is_empty());
        assert_eq!(driver.closed(), 0);
    }

    #[tokio::test]
    async fn challenge_tries_answers_until_accepted() {
        let driver = ScriptedDriver::landing_on(&[CHALLENGE, CHALLENGE, DASHBOARD]);
        let adapter = GuruAdapter::new(driver.clone(), credentials(&["wrong", "right", "unused"]));

        adapter.open_session().await.unwrap();

        assert_eq!(driver.filled_answers(), vec!["wrong", "right"]);
    }

    #[tokio::test]
    async fn exhausted_answers_fail_and_close_page() {
        let driver = ScriptedDriver::landing_on(&[CHALLENGE, CHALLENGE, CHALLENGE]);
        let adapter = GuruAdapter::new(driver.clone(), credentials(&["a", "b"]));

        let err = adapter.open_session().await.unwrap_err();

        assert!(matches!(err, AppError::AuthFailed(_)));
        assert_eq!(driver.closed(), 1);
    }

    #[tokio::test]
    async fn challenge_without_answers_requires_auth() {
        let driver = ScriptedDriver::landing_on(&[CHALLENGE]);
        let adapter = GuruAdapter::new(driver.clone(), credentials(&[]));

        let err = adapter.open_session().await.unwrap_err();

        assert!(matches!(err, AppError::AuthRequired(_)));
        assert_eq!(driver.closed(), 1);
    }

    #[tokio::test]
    async fn rejected_password_fails() {
        let driver = ScriptedDriver::landing_on(&["https://www.guru.com/login.aspx?err=1"]);
        let adapter = GuruAdapter::new(driver, credentials(&[]));

        let err = adapter.open_session().await.unwrap_err();

        assert!(matches!(err, AppError::AuthFailed(_)));
    }

    #[tokio::test]
    async fn session_lists_and_fetches_details() {
        let driver = ScriptedDriver::landing_on(&[DASHBOARD])
            .with_page("https://www.guru.com/d/jobs/", LISTING_HTML)
            .with_page(
                "https://www.guru.com/jobs/rust-api/1987654&SearchUrl=abc",
                DETAIL_HTML,
            );
        let adapter = GuruAdapter::new(driver.clone(), credentials(&[]));
        let mut session = adapter.open_session().await.unwrap();

        let jobs = adapter
            .list_visible_jobs(&mut session, &programming_only())
            .await
            .unwrap();
        let detail = adapter.fetch_job_detail(&mut session, &jobs[0]).await.unwrap();
        adapter.close_session(session).await.unwrap();

        assert_eq!(jobs.len(), 2);
        assert_eq!(detail.title, "Rust API");
        assert_eq!(driver.closed(), 1);
    }

    #[tokio::test]
    async fn missing_detail_page_is_detail_failure() {
        let driver = ScriptedDriver::landing_on(&[DASHBOARD]);
        let adapter = GuruAdapter::new(driver, credentials(&[]));
        let mut session = adapter.open_session().await.unwrap();
        let summary = JobSummary::from_locator("https://www.guru.com/jobs/gone/1");

        let err = adapter
            .fetch_job_detail(&mut session, &summary)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::DetailFetchFailed { .. }));
    }
}
