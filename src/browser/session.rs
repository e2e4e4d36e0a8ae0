use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tokio::process::{Child, Command};
use tokio::sync::{MappedMutexGuard, Mutex, MutexGuard};

use crate::browser::selectors::{self, Locator};
use crate::browser::webdriver::{self, ElementRef, WebDriver};
use crate::browser::{normalize_profile_url, search_url, split_skills, Browser, SearchHit};
use crate::config::BrowserConfig;
use crate::error::{AppError, Result};
use crate::profile::{
    ProfileRecord, COMPANY_NOT_FOUND, DESIGNATION_NOT_FOUND, HEADLINE_NOT_FOUND, NAME_NOT_FOUND,
};

const DRIVER_STARTUP_POLL: Duration = Duration::from_millis(250);

/// The one browser handle of a run.
///
/// The WebDriver session (and the driver process, when `driver_path` is
/// configured) is acquired on first use and reused for every page visit.
/// `close` releases both; after that the session refuses further work.
pub struct BrowserSession {
    config: BrowserConfig,
    client: Client,
    state: Mutex<SessionState>,
}

#[derive(Default)]
struct SessionState {
    driver: Option<WebDriver>,
    process: Option<Child>,
    closed: bool,
}

impl BrowserSession {
    pub fn new(config: BrowserConfig) -> Self {
        Self {
            config,
            client: Client::new(),
            state: Mutex::new(SessionState::default()),
        }
    }

    /// Release the WebDriver session and driver process. Safe to call more than once.
    pub async fn close(&self) {
        let mut state = self.state.lock().await;
        if state.closed {
            return;
        }
        state.closed = true;

        if let Some(driver) = state.driver.take() {
            if let Err(e) = driver.quit().await {
                tracing::warn!(error = %e, "Failed to close WebDriver session");
            }
        }

        if let Some(mut process) = state.process.take() {
            if let Err(e) = process.kill().await {
                tracing::warn!(error = %e, "Failed to stop chromedriver");
            }
        }

        tracing::info!("Browser session released");
    }

    async fn driver(&self) -> Result<MappedMutexGuard<'_, WebDriver>> {
        let mut state = self.state.lock().await;
        if state.closed {
            return Err(AppError::Browser("browser session already closed".to_string()));
        }

        if state.driver.is_none() {
            if state.process.is_none() {
                state.process = self.spawn_driver().await?;
            }
            let driver = WebDriver::attach(
                self.client.clone(),
                &self.config.driver_url,
                &self.config.debug_endpoint,
            )
            .await
            .map_err(|e| {
                AppError::Browser(format!(
                    "could not attach to Chrome at {} (start it with --remote-debugging-port and log in to LinkedIn): {e}",
                    self.config.debug_endpoint
                ))
            })?;
            state.driver = Some(driver);
        }

        MutexGuard::try_map(state, |s| s.driver.as_mut())
            .map_err(|_| AppError::Browser("browser session unavailable".to_string()))
    }

    async fn spawn_driver(&self) -> Result<Option<Child>> {
        let Some(path) = &self.config.driver_path else {
            return Ok(None);
        };

        let port = reqwest::Url::parse(&self.config.driver_url)
            .ok()
            .and_then(|u| u.port_or_known_default())
            .ok_or_else(|| {
                AppError::Config(format!("invalid driver_url: {}", self.config.driver_url))
            })?;

        tracing::info!(driver = %path.display(), port, "Starting chromedriver");

        let child = Command::new(path)
            .arg(format!("--port={port}"))
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                AppError::Browser(format!("failed to start {}: {e}", path.display()))
            })?;

        let deadline = tokio::time::Instant::now() + self.config.page_load_wait();
        while !webdriver::is_ready(&self.client, &self.config.driver_url).await {
            if tokio::time::Instant::now() >= deadline {
                return Err(AppError::Browser(format!(
                    "chromedriver did not become ready at {}",
                    self.config.driver_url
                )));
            }
            tokio::time::sleep(DRIVER_STARTUP_POLL).await;
        }

        Ok(Some(child))
    }
}

impl Drop for BrowserSession {
    /// Best-effort release when `close` was never reached, e.g. on a panic.
    ///
    /// A spawned chromedriver is reaped by `kill_on_drop`; an attached session
    /// is ended on the current runtime if one is still running.
    fn drop(&mut self) {
        let state = self.state.get_mut();
        if state.closed {
            return;
        }
        state.closed = true;

        let Some(driver) = state.driver.take() else {
            return;
        };
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                tracing::warn!(session = %driver.session_id(), "Browser session dropped without close, releasing");
                handle.spawn(async move {
                    if let Err(e) = driver.quit().await {
                        tracing::warn!(error = %e, "Failed to close WebDriver session");
                    }
                });
            }
            Err(_) => {
                tracing::warn!(session = %driver.session_id(), "Browser session dropped outside a runtime, not released");
            }
        }
    }
}

#[async_trait]
impl Browser for BrowserSession {
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>> {
        let driver = self.driver().await?;

        tracing::info!(query, "Searching LinkedIn");
        driver.navigate(&search_url(query)).await?;
        tokio::time::sleep(self.config.search_load_delay()).await;

        let links = driver
            .wait_for_all(&selectors::PROFILE_LINKS, self.config.page_load_wait())
            .await?;

        let mut seen = HashSet::new();
        let mut hits = Vec::new();
        for link in links {
            if hits.len() >= self.config.max_search_results {
                break;
            }

            let Some(href) = driver.attribute(&link, "href").await? else {
                continue;
            };
            let Some(url) = normalize_profile_url(&href) else {
                continue;
            };
            if !seen.insert(url.clone()) {
                continue;
            }

            let name = driver
                .text(&link)
                .await
                .ok()
                .and_then(|t| t.lines().next().map(|l| l.trim().to_string()))
                .filter(|t| !t.is_empty());

            let title = card_text(&driver, &link, &selectors::CARD_TITLE).await;
            let summary = card_text(&driver, &link, &selectors::CARD_SUMMARY).await;

            hits.push(SearchHit {
                url,
                name,
                title,
                summary,
            });
        }

        tracing::info!(count = hits.len(), "Search finished");
        Ok(hits)
    }

    async fn fetch_details(&self, url: &str) -> Result<ProfileRecord> {
        let driver = self.driver().await?;

        tracing::info!(profile = %url, "Opening profile");
        driver.navigate(url).await?;
        tokio::time::sleep(self.config.profile_load_delay()).await;

        let wait = self.config.page_load_wait();
        let name = field_text(&driver, &selectors::NAME, wait, NAME_NOT_FOUND).await;
        let headline = field_text(&driver, &selectors::HEADLINE, wait, HEADLINE_NOT_FOUND).await;
        let designation =
            field_text(&driver, &selectors::DESIGNATION, wait, DESIGNATION_NOT_FOUND).await;
        let company = field_text(&driver, &selectors::COMPANY, wait, COMPANY_NOT_FOUND).await;

        // The page is loaded by now; optional sections are not waited for.
        let experience = optional_text(&driver, &selectors::EXPERIENCE, Duration::ZERO)
            .await
            .unwrap_or_default();
        let skills = optional_text(&driver, &selectors::SKILLS, Duration::ZERO)
            .await
            .map(|text| split_skills(&text))
            .unwrap_or_default();

        tracing::debug!(
            profile = %url,
            name = %name,
            headline = %headline,
            company = %company,
            designation = %designation,
            skills = skills.len(),
            "Extracted profile"
        );

        Ok(ProfileRecord::unresolved(url)
            .with_name(name)
            .with_headline(headline)
            .with_designation(designation)
            .with_company(company)
            .with_summary(experience)
            .with_skills(skills))
    }
}

/// Text of the first element matching `locator`, or `sentinel` if it never shows up.
async fn field_text(driver: &WebDriver, locator: &Locator, wait: Duration, sentinel: &str) -> String {
    optional_text(driver, locator, wait)
        .await
        .unwrap_or_else(|| sentinel.to_string())
}

/// Trimmed, non-empty text of the first element matching `locator`.
async fn optional_text(driver: &WebDriver, locator: &Locator, wait: Duration) -> Option<String> {
    let text = match driver.wait_for_first(locator, wait).await {
        Ok(Some(element)) => driver.text(&element).await,
        Ok(None) => return None,
        Err(e) => Err(e),
    };

    match text {
        Ok(t) => Some(t.trim().to_string()).filter(|t| !t.is_empty()),
        Err(e) => {
            tracing::debug!(selector = locator.value(), error = %e, "Field lookup failed");
            None
        }
    }
}

/// Text of the result-card element at `locator`, looked up relative to a result link.
async fn card_text(driver: &WebDriver, link: &ElementRef, locator: &Locator) -> Option<String> {
    let element = match driver.find_elements_from(link, locator).await {
        Ok(found) => found.into_iter().next()?,
        Err(e) => {
            tracing::debug!(selector = locator.value(), error = %e, "Card lookup failed");
            return None;
        }
    };

    driver
        .text(&element)
        .await
        .ok()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}
