pub mod selectors;
pub mod session;
pub mod webdriver;

use async_trait::async_trait;

use crate::error::Result;
use crate::profile::ProfileRecord;

pub use session::BrowserSession;

/// A candidate found on the people-search results page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub url: String,
    /// Link text from the results card, when it had any.
    pub name: Option<String>,
    /// Card subtitle, usually the member's current title.
    pub title: Option<String>,
    /// Secondary card line, usually location or a short summary.
    pub summary: Option<String>,
}

impl SearchHit {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            name: None,
            title: None,
            summary: None,
        }
    }
}

/// The two browser operations the outreach core depends on.
#[async_trait]
pub trait Browser: Send + Sync {
    /// Search members matching `query`, best matches first.
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>>;

    /// Visit a profile page and extract its details.
    async fn fetch_details(&self, url: &str) -> Result<ProfileRecord>;
}

/// People-search URL for a free-text query.
pub fn search_url(query: &str) -> String {
    format!(
        "https://www.linkedin.com/search/results/people/?keywords={}&origin=GLOBAL_SEARCH_HEADER",
        urlencoding::encode(query.trim())
    )
}

/// Canonical profile URL for a result link, or `None` if the link is not a member profile.
pub fn normalize_profile_url(href: &str) -> Option<String> {
    let href = href.trim();
    if !href.contains("/in/") {
        return None;
    }

    let end = href.find(['?', '#']).unwrap_or(href.len());
    let url = &href[..end];
    if url.ends_with("/in/") {
        return None;
    }
    Some(url.to_string())
}

/// Split a skills section's text into skills, one per line.
///
/// Blank lines and fragments of two characters or fewer (section chrome,
/// endorsement counts) are dropped.
pub fn split_skills(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| line.chars().count() > 2)
        .map(str::to_string)
        .collect()
}
