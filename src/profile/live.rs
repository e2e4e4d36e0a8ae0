use std::sync::Arc;

use async_trait::async_trait;

use crate::browser::Browser;
use crate::error::{AppError, Result};
use crate::browser::SearchHit;
use crate::profile::{ProfileRecord, ProfileSource, HEADLINE_NOT_FOUND, NAME_NOT_FOUND};

/// Profiles gathered live: one search, then a detail visit per candidate.
pub struct LiveSource {
    browser: Arc<dyn Browser>,
    query: String,
}

impl LiveSource {
    pub fn new(browser: Arc<dyn Browser>, query: impl Into<String>) -> Self {
        Self {
            browser,
            query: query.into(),
        }
    }
}

#[async_trait]
impl ProfileSource for LiveSource {
    fn describe(&self) -> String {
        format!("live search for {:?}", self.query)
    }

    async fn load(&self) -> Result<Vec<ProfileRecord>> {
        let hits = self.browser.search(&self.query).await?;
        if hits.is_empty() {
            return Err(AppError::ProfilesNotFound(format!(
                "no profile links found for {:?}",
                self.query
            )));
        }

        let mut profiles = Vec::with_capacity(hits.len());
        for hit in hits {
            match self.browser.fetch_details(&hit.url).await {
                Ok(profile) => profiles.push(fill_from_card(profile, hit)),
                Err(e) => {
                    tracing::warn!(profile = %hit.url, error = %e, "Failed to fetch profile details, dropping");
                }
            }
        }

        if profiles.is_empty() {
            return Err(AppError::ProfilesNotFound(
                "every profile detail fetch failed".to_string(),
            ));
        }

        Ok(profiles)
    }
}

/// Fill fields the profile page did not yield from the search result card.
fn fill_from_card(mut profile: ProfileRecord, hit: SearchHit) -> ProfileRecord {
    if profile.name == NAME_NOT_FOUND {
        if let Some(name) = hit.name {
            profile.name = name;
        }
    }
    if profile.headline == HEADLINE_NOT_FOUND {
        if let Some(title) = hit.title {
            profile.headline = title;
        }
    }
    if profile.summary.is_empty() {
        if let Some(summary) = hit.summary {
            profile.summary = summary;
        }
    }
    profile
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StubBrowser {
        hits: Vec<SearchHit>,
    }

    #[async_trait]
    impl Browser for StubBrowser {
        async fn search(&self, _query: &str) -> Result<Vec<SearchHit>> {
            Ok(self.hits.clone())
        }

        async fn fetch_details(&self, url: &str) -> Result<ProfileRecord> {
            if url.ends_with("/broken") {
                return Err(AppError::Browser("page crashed".to_string()));
            }
            Ok(ProfileRecord::unresolved(url).with_headline("Engineer"))
        }
    }

    fn hit(url: &str, name: Option<&str>) -> SearchHit {
        SearchHit {
            name: name.map(str::to_string),
            ..SearchHit::new(url)
        }
    }

    #[tokio::test]
    async fn test_enriches_hits_and_drops_failures() {
        let browser = StubBrowser {
            hits: vec![
                hit("https://x/in/a", Some("Alice")),
                hit("https://x/in/broken", Some("Bob")),
                hit("https://x/in/c", None),
            ],
        };
        let source = LiveSource::new(Arc::new(browser), "rust");

        let profiles = source.load().await.unwrap();
        assert_eq!(profiles.len(), 2);
        assert_eq!(profiles[0].name, "Alice");
        assert_eq!(profiles[0].headline, "Engineer");
        assert_eq!(profiles[1].url, "https://x/in/c");
        assert_eq!(profiles[1].name, NAME_NOT_FOUND);
    }

    #[test]
    fn test_card_fields_fill_only_missing_details() {
        let card = SearchHit {
            name: Some("Card Name".to_string()),
            title: Some("CTO at Acme".to_string()),
            summary: Some("Lahore".to_string()),
            ..SearchHit::new("https://x/in/a")
        };

        let bare = fill_from_card(ProfileRecord::unresolved("https://x/in/a"), card.clone());
        assert_eq!(bare.name, "Card Name");
        assert_eq!(bare.headline, "CTO at Acme");
        assert_eq!(bare.summary, "Lahore");

        let detailed = ProfileRecord::unresolved("https://x/in/a")
            .with_name("Page Name")
            .with_headline("Founder")
            .with_summary("Built three startups");
        let kept = fill_from_card(detailed, card);
        assert_eq!(kept.name, "Page Name");
        assert_eq!(kept.headline, "Founder");
        assert_eq!(kept.summary, "Built three startups");
    }

    #[tokio::test]
    async fn test_no_hits_is_not_found() {
        let source = LiveSource::new(Arc::new(StubBrowser { hits: vec![] }), "nobody");
        let err = source.load().await.unwrap_err();
        assert!(matches!(err, AppError::ProfilesNotFound(_)));
    }
}
