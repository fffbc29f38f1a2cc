use std::future::Future;

use jobwatch_core::error::AppError;

/// Minimal browser automation surface needed to drive a logged-in scrape.
///
/// A page is an owned tab. Callers pass it to every call and hand it back to
/// [`close_page`](Self::close_page) when done.
pub trait PageDriver: Send + Sync + Clone {
    type Page: Send;

    fn open_page(&self) -> impl Future<Output = Result<Self::Page, AppError>> + Send;

    /// Navigate and wait for the document to load.
    fn goto(
        &self,
        page: &mut Self::Page,
        url: &str,
    ) -> impl Future<Output = Result<(), AppError>> + Send;

    /// Type `value` into the input matching `selector`.
    fn fill(
        &self,
        page: &mut Self::Page,
        selector: &str,
        value: &str,
    ) -> impl Future<Output = Result<(), AppError>> + Send;

    /// Click the element matching `selector` and wait for the resulting navigation.
    fn click_and_wait(
        &self,
        page: &mut Self::Page,
        selector: &str,
    ) -> impl Future<Output = Result<(), AppError>> + Send;

    fn current_url(
        &self,
        page: &mut Self::Page,
    ) -> impl Future<Output = Result<String, AppError>> + Send;

    /// Rendered DOM of the current document.
    fn html(&self, page: &mut Self::Page)
    -> impl Future<Output = Result<String, AppError>> + Send;

    fn close_page(&self, page: Self::Page) -> impl Future<Output = Result<(), AppError>> + Send;
}

#[cfg(feature = "browser")]
pub use chromium::ChromiumDriver;

#[cfg(feature = "browser")]
mod chromium {
    use std::future::Future;
    use std::path::PathBuf;
    use std::sync::Arc;
    use std::time::Duration;

    use chromiumoxide::{Browser, BrowserConfig, Page};
    use futures::StreamExt;
    use jobwatch_core::error::AppError;

    use super::PageDriver;

    /// Headless Chromium over the Chrome DevTools Protocol.
    ///
    /// One Chromium process is shared by all clones; every session gets its
    /// own tab.
    #[derive(Clone)]
    pub struct ChromiumDriver {
        browser: Arc<Browser>,
        timeout: Duration,
    }

    impl ChromiumDriver {
        /// Launch with a 30 s per-step timeout.
        pub async fn launch() -> Result<Self, AppError> {
            Self::with_timeout(Duration::from_secs(30)).await
        }

        pub async fn with_timeout(timeout: Duration) -> Result<Self, AppError> {
            let mut builder = BrowserConfig::builder().no_sandbox().disable_default_args();

            if let Some(bin) = find_chrome_binary() {
                tracing::info!("Using Chrome binary: {}", bin.display());
                builder = builder.chrome_executable(bin);
            }

            let config = builder
                .arg("--headless=new")
                .arg("--disable-gpu")
                .arg("--disable-dev-shm-usage")
                .arg("--disable-extensions")
                .arg("--no-first-run")
                .build()
                .map_err(|e| AppError::ConfigError(format!("Browser config error: {e}")))?;

            let (browser, mut handler) = Browser::launch(config).await.map_err(|e| {
                AppError::SourceUnavailable(format!("Failed to launch browser: {e}"))
            })?;

            // The CDP handler must be polled for the connection to make progress.
            tokio::spawn(async move {
                while let Some(event) = handler.next().await {
                    if event.is_err() {
                        tracing::warn!("Browser CDP handler error: {event:?}");
                        break;
                    }
                }
            });

            Ok(Self {
                browser: Arc::new(browser),
                timeout,
            })
        }

        async fn step<T, Fut>(&self, what: &str, fut: Fut) -> Result<T, AppError>
        where
            Fut: Future<Output = Result<T, chromiumoxide::error::CdpError>>,
        {
            match tokio::time::timeout(self.timeout, fut).await {
                Ok(Ok(value)) => Ok(value),
                Ok(Err(e)) => Err(AppError::SourceUnavailable(format!("{what}: {e}"))),
                Err(_) => Err(AppError::Timeout(self.timeout.as_secs())),
            }
        }
    }

    /// `CHROME_BIN` first, then well-known install paths. `None` lets
    /// chromiumoxide run its own lookup.
    fn find_chrome_binary() -> Option<PathBuf> {
        if let Ok(p) = std::env::var("CHROME_BIN") {
            let path = PathBuf::from(&p);
            if path.exists() {
                return Some(path);
            }
        }

        [
            // snap's /snap/bin/chromium wrapper drops headless flags
            "/snap/chromium/current/usr/lib/chromium-browser/chrome",
            "/usr/bin/google-chrome-stable",
            "/usr/bin/google-chrome",
            "/usr/bin/chromium",
            "/usr/bin/chromium-browser",
        ]
        .iter()
        .map(PathBuf::from)
        .find(|p| p.exists())
    }

    impl PageDriver for ChromiumDriver {
        type Page = Page;

        async fn open_page(&self) -> Result<Page, AppError> {
            self.step("Failed to open tab", self.browser.new_page("about:blank"))
                .await
        }

        async fn goto(&self, page: &mut Page, url: &str) -> Result<(), AppError> {
            self.step(&format!("Failed to navigate to {url}"), async {
                page.goto(url).await?.wait_for_navigation().await?;
                Ok(())
            })
            .await
        }

        async fn fill(&self, page: &mut Page, selector: &str, value: &str) -> Result<(), AppError> {
            self.step(&format!("Failed to fill {selector}"), async {
                let element = page.find_element(selector).await?;
                element.click().await?.type_str(value).await?;
                Ok(())
            })
            .await
        }

        async fn click_and_wait(&self, page: &mut Page, selector: &str) -> Result<(), AppError> {
            self.step(&format!("Failed to submit via {selector}"), async {
                page.find_element(selector).await?.click().await?;
                page.wait_for_navigation().await?;
                Ok(())
            })
            .await
        }

        async fn current_url(&self, page: &mut Page) -> Result<String, AppError> {
            let url = self.step("Failed to read page URL", page.url()).await?;
            Ok(url.unwrap_or_default())
        }

        async fn html(&self, page: &mut Page) -> Result<String, AppError> {
            self.step("Failed to read page content", page.content())
                .await
        }

        async fn close_page(&self, page: Page) -> Result<(), AppError> {
            self.step("Failed to close tab", page.close()).await
        }
    }
}
