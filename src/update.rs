use std::cmp::Ordering;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use reqwest::header::ACCEPT;
use serde::{Deserialize, Serialize};

pub const RELEASES_ENDPOINT: &str = "https://api.github.com/repos/iandiv/AppGroup/releases/latest";
pub const CURRENT_VERSION: &str = env!("CARGO_PKG_VERSION");
const API_VERSION: &str = "2022-11-28";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Result of an update check. Failures are reported in `error` rather than
/// returned, so callers can show them as plain information.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UpdateInfo {
    pub current_version: String,
    pub latest_version: Option<String>,
    pub update_available: bool,
    pub release_url: Option<String>,
    pub error: Option<String>,
}

impl UpdateInfo {
    pub fn from_release(current: &str, latest: &str, release_url: Option<String>) -> Self {
        Self {
            current_version: current.to_string(),
            latest_version: Some(latest.to_string()),
            update_available: is_newer(latest, current),
            release_url,
            error: None,
        }
    }

    pub fn failed(current: &str, error: impl Into<String>) -> Self {
        Self {
            current_version: current.to_string(),
            error: Some(error.into()),
            ..Default::default()
        }
    }
}

#[derive(Debug, Deserialize)]
struct Release {
    tag_name: String,
    #[serde(default)]
    html_url: Option<String>,
}

/// Extract the tag and page URL from a `releases/latest` response body.
pub fn parse_release(body: &str) -> Result<(String, Option<String>)> {
    let release: Release = serde_json::from_str(body).context("unexpected release payload")?;
    Ok((release.tag_name, release.html_url))
}

fn version_parts(version: &str) -> Vec<u64> {
    let trimmed = version.trim();
    let trimmed = trimmed
        .strip_prefix('v')
        .or_else(|| trimmed.strip_prefix('V'))
        .unwrap_or(trimmed);
    trimmed
        .split('.')
        .map(|part| {
            let digits: String = part.chars().take_while(|c| c.is_ascii_digit()).collect();
            digits.parse().unwrap_or(0)
        })
        .collect()
}

/// Compare dotted version strings numerically. A leading `v` is ignored,
/// missing components count as zero and non-numeric suffixes are dropped.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let (a, b) = (version_parts(a), version_parts(b));
    let len = a.len().max(b.len());
    for i in 0..len {
        let ord = a.get(i).copied().unwrap_or(0).cmp(&b.get(i).copied().unwrap_or(0));
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}

pub fn is_newer(candidate: &str, current: &str) -> bool {
    compare_versions(candidate, current) == Ordering::Greater
}

pub struct UpdateChecker {
    client: Client,
    endpoint: String,
    current_version: String,
}

impl UpdateChecker {
    pub fn new() -> Result<Self> {
        Self::with_endpoint(RELEASES_ENDPOINT, CURRENT_VERSION)
    }

    pub fn with_endpoint(endpoint: &str, current_version: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("app-group/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
            current_version: current_version.to_string(),
        })
    }

    /// Query the latest release. Never fails; errors end up in
    /// [`UpdateInfo::error`].
    pub fn check_latest(&self) -> UpdateInfo {
        match self.fetch() {
            Ok((latest, url)) => {
                let info = UpdateInfo::from_release(&self.current_version, &latest, url);
                tracing::info!(
                    current = %info.current_version,
                    latest = %latest,
                    update_available = info.update_available,
                    "update check finished"
                );
                info
            }
            Err(err) => {
                tracing::warn!(endpoint = %self.endpoint, "update check failed: {err:#}");
                UpdateInfo::failed(&self.current_version, format!("{err:#}"))
            }
        }
    }

    fn fetch(&self) -> Result<(String, Option<String>)> {
        let resp = self
            .client
            .get(&self.endpoint)
            .header(ACCEPT, "application/vnd.github+json")
            .header("X-GitHub-Api-Version", API_VERSION)
            .send()
            .context("request failed")?;
        let status = resp.status();
        if !status.is_success() {
            anyhow::bail!("server responded with {status}");
        }
        let body = resp.text().context("unable to read response")?;
        parse_release(&body)
    }
}
