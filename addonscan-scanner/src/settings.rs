//! Scanner tuning.

use addonscan_fetch::RetryStrategy;

/// Tuning knobs for one scan run.
#[derive(Debug, Clone)]
pub struct ScannerSettings {
    /// Parses allowed to run at once.
    pub workers: usize,
    /// Results requested per discovery page.
    pub per_page: u32,
    /// Last discovery page requested per strategy.
    pub max_pages: u32,
    /// Retry policy for each discovery page.
    pub retry: RetryStrategy,
    /// Releases requested per page.
    pub release_page_size: u32,
    /// Last release page requested.
    pub max_release_pages: u32,
}

impl Default for ScannerSettings {
    fn default() -> Self {
        Self {
            workers: 8,
            per_page: 100,
            max_pages: 10,
            retry: RetryStrategy::default(),
            release_page_size: 100,
            max_release_pages: 20,
        }
    }
}

impl ScannerSettings {
    /// Sets the worker budget. Zero is treated as one.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Sets the discovery page size.
    pub fn with_per_page(mut self, per_page: u32) -> Self {
        self.per_page = per_page.max(1);
        self
    }

    /// Sets the discovery page cap.
    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// Sets the discovery retry policy.
    pub fn with_retry(mut self, retry: RetryStrategy) -> Self {
        self.retry = retry;
        self
    }

    /// Sets the release pagination.
    pub fn with_release_pages(mut self, page_size: u32, max_pages: u32) -> Self {
        self.release_page_size = page_size.max(1);
        self.max_release_pages = max_pages;
        self
    }
}
