use crate::models::BrandConfig;
use anyhow::Result;
use async_trait::async_trait;

/// Fetches one listing page of HTML for a brand.
/// Abstracted so the pagination loop can be driven by a fake in tests.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch the HTML of the given 1-based listing page.
    async fn fetch_page(&self, brand: &BrandConfig, page: u32) -> Result<String>;
}

/// Injected time source. Normalization must not read the ambient clock
/// directly so the default-year fallback stays deterministic in tests.
pub trait Clock: Send + Sync {
    fn current_year(&self) -> i32;
}

/// Wall-clock implementation used in production.
pub struct SystemClock;

impl Clock for SystemClock {
    fn current_year(&self) -> i32 {
        use chrono::Datelike;
        chrono::Utc::now().year()
    }
}

/// Fixed-year clock for tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub i32);

impl Clock for FixedClock {
    fn current_year(&self) -> i32 {
        self.0
    }
}
