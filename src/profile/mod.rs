pub mod file;
pub mod live;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

pub use file::JsonFileSource;
pub use live::LiveSource;

pub const NAME_NOT_FOUND: &str = "Name not found";
pub const HEADLINE_NOT_FOUND: &str = "Headline not found";
pub const COMPANY_NOT_FOUND: &str = "Company not found";
pub const DESIGNATION_NOT_FOUND: &str = "Designation not found";

/// One discovered LinkedIn member.
///
/// `url` is the identity and is never empty once a source has produced the
/// record. Every other text field carries a "not found" sentinel instead of
/// being absent when extraction failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileRecord {
    #[serde(rename = "profile_url")]
    pub url: String,
    #[serde(default = "name_not_found")]
    pub name: String,
    #[serde(default = "headline_not_found")]
    pub headline: String,
    #[serde(default = "company_not_found")]
    pub company: String,
    #[serde(default = "designation_not_found")]
    pub designation: String,
    /// Experience or search-card summary, when the source had one.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub summary: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skills: Vec<String>,
}

fn name_not_found() -> String {
    NAME_NOT_FOUND.to_string()
}

fn headline_not_found() -> String {
    HEADLINE_NOT_FOUND.to_string()
}

fn company_not_found() -> String {
    COMPANY_NOT_FOUND.to_string()
}

fn designation_not_found() -> String {
    DESIGNATION_NOT_FOUND.to_string()
}

impl ProfileRecord {
    /// A record for `url` with every extracted field set to its sentinel.
    pub fn unresolved(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            name: name_not_found(),
            headline: headline_not_found(),
            company: company_not_found(),
            designation: designation_not_found(),
            summary: String::new(),
            skills: Vec::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_headline(mut self, headline: impl Into<String>) -> Self {
        self.headline = headline.into();
        self
    }

    pub fn with_company(mut self, company: impl Into<String>) -> Self {
        self.company = company.into();
        self
    }

    pub fn with_designation(mut self, designation: impl Into<String>) -> Self {
        self.designation = designation.into();
        self
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }

    pub fn with_skills(mut self, skills: Vec<String>) -> Self {
        self.skills = skills;
        self
    }

    /// Short label for prompts and logs, e.g. `Jane Doe (Staff Engineer)`.
    pub fn display_name(&self) -> String {
        format!("{} ({})", self.name, self.headline)
    }
}

/// Produces the full, ordered batch of profiles for one workflow run.
#[async_trait]
pub trait ProfileSource: Send + Sync {
    /// Short description used in logs, e.g. the file path or the search query.
    fn describe(&self) -> String;

    async fn load(&self) -> Result<Vec<ProfileRecord>>;
}
