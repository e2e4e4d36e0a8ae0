use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Serialize;

use crate::error::{AppError, Result};
use crate::profile::{ProfileRecord, ProfileSource};

/// Profiles persisted by a previous scrape, as a JSON array.
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write `profiles` as an indented UTF-8 array, replacing any previous snapshot.
    pub async fn save(&self, profiles: &[ProfileRecord]) -> Result<()> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        profiles.serialize(&mut serializer)?;
        buf.push(b'\n');

        tokio::fs::write(&self.path, buf).await?;

        tracing::info!(
            path = %self.path.display(),
            count = profiles.len(),
            "Saved profiles"
        );
        Ok(())
    }
}

#[async_trait]
impl ProfileSource for JsonFileSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    async fn load(&self) -> Result<Vec<ProfileRecord>> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(AppError::ProfilesNotFound(format!(
                    "{} not found, run the scraper first",
                    self.path.display()
                )));
            }
            Err(e) => return Err(e.into()),
        };

        parse_profiles(&raw)
            .map_err(|e| AppError::MalformedProfiles(format!("{}: {e}", self.path.display())))
    }
}

fn parse_profiles(raw: &str) -> std::result::Result<Vec<ProfileRecord>, String> {
    let profiles: Vec<ProfileRecord> =
        serde_json::from_str(raw).map_err(|e| format!("invalid JSON: {e}"))?;

    if profiles.is_empty() {
        return Err("no profiles in file".to_string());
    }

    if let Some(index) = profiles.iter().position(|p| p.url.trim().is_empty()) {
        return Err(format!("profile at index {index} has an empty profile_url"));
    }

    Ok(profiles)
}
