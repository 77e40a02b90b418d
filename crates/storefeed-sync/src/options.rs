use std::time::Duration;

use storefeed_core::AppConfig;

/// Pagination and pacing knobs for one sync cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOptions {
    pub page_size: u32,
    /// Stop before requesting a page whose starting offset reaches this value.
    pub max_offset: Option<u64>,
    /// Stop after this many pages.
    pub max_pages: Option<u32>,
    /// Pause between consecutive page requests.
    pub inter_page_delay: Duration,
    /// Deadline for a single page request; exceeding it aborts the cycle.
    pub page_timeout: Option<Duration>,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            page_size: 50,
            max_offset: Some(6_000),
            max_pages: None,
            inter_page_delay: Duration::from_millis(250),
            page_timeout: Some(Duration::from_secs(30)),
        }
    }
}

impl SyncOptions {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            page_size: config.sync_page_size.max(1),
            max_offset: Some(config.sync_max_offset).filter(|o| *o > 0),
            max_pages: None,
            inter_page_delay: Duration::from_millis(config.sync_inter_page_delay_ms),
            page_timeout: Some(Duration::from_secs(config.sync_page_timeout_secs))
                .filter(|t| !t.is_zero()),
        }
    }

    /// `true` once `page_num` (1-based) lies beyond a configured ceiling.
    #[must_use]
    pub fn is_past_ceiling(&self, page_num: u32) -> bool {
        if self.max_pages.is_some_and(|max| page_num > max) {
            return true;
        }
        let offset = u64::from(page_num.saturating_sub(1)) * u64::from(self.page_size);
        self.max_offset.is_some_and(|max| offset >= max)
    }
}
