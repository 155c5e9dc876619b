use std::path::{Path, PathBuf};

pub const USAGE_FILE: &str = "usage.txt";

/// Launch counts at which the support prompt is shown. After the last one
/// the prompt repeats every [`PROMPT_INTERVAL`] launches.
pub const PROMPT_THRESHOLDS: [u64; 3] = [5, 25, 100];
pub const PROMPT_INTERVAL: u64 = 100;

/// Number of primary launches, stored as a single decimal number in a
/// plaintext file.
#[derive(Debug, Clone)]
pub struct UsageCounter {
    path: PathBuf,
    count: u64,
}

impl UsageCounter {
    /// Read the counter at `path`. A missing or unparsable file counts as zero.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let count = std::fs::read_to_string(&path)
            .ok()
            .and_then(|content| content.trim().parse::<u64>().ok())
            .unwrap_or(0);
        Self { path, count }
    }

    pub fn default_location() -> Self {
        Self::load(crate::paths::app_data_dir().join(USAGE_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    /// Increment the counter and persist it.
    pub fn record_launch(&mut self) -> anyhow::Result<u64> {
        self.count = self.count.saturating_add(1);
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, self.count.to_string())?;
        Ok(self.count)
    }

    /// Whether the current count hits a support-prompt threshold.
    pub fn prompt_due(&self) -> bool {
        let last = PROMPT_THRESHOLDS[PROMPT_THRESHOLDS.len() - 1];
        PROMPT_THRESHOLDS.contains(&self.count)
            || (self.count > last && self.count % PROMPT_INTERVAL == 0)
    }
}
