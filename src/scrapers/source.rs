use crate::models::{BrandConfig, NormalizedVehicle};
use crate::scrapers::extract::extract_records;
use crate::scrapers::normalize::normalize;
use crate::scrapers::traits::{Clock, PageFetcher};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info, warn};

/// JSON key preceding the embedded listing array in the source site's pages.
pub const LISTING_MARKER: &str = "\"vehicles\"";

/// Fetches listing pages from the source site over plain HTTP GET.
pub struct HttpPageFetcher {
    client: Client,
    base_url: String,
}

impl HttpPageFetcher {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36")
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client, base_url: base_url.trim_end_matches('/').to_string() })
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch_page(&self, brand: &BrandConfig, page: u32) -> Result<String> {
        let url = format!("{}/fahrzeuge/{}?page={}", self.base_url, brand.slug, page);
        debug!("Fetching URL: {}", url);

        let response = self.client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Failed to fetch listing page {}", page))?;

        if !response.status().is_success() {
            anyhow::bail!("Listing page {} returned status {}", page, response.status());
        }

        let html = response.text().await.context("Failed to read response body")?;
        debug!("Downloaded {} bytes of HTML", html.len());
        Ok(html)
    }
}

/// Result of one brand's pagination run. `halted` carries the fetch error
/// that stopped the run early, if any; already-collected vehicles are kept
/// either way.
#[derive(Debug, Default)]
pub struct ScrapeOutcome {
    pub vehicles: Vec<NormalizedVehicle>,
    /// Image URLs seen in the raw payloads, for optional best-effort download.
    pub image_urls: Vec<String>,
    pub halted: Option<String>,
}

/// Walks a brand's listing pages sequentially, normalizing as it goes.
///
/// An empty page means the end of the listings and stops the loop; a fetch
/// failure aborts the remaining pages for this brand (the page sequence
/// cannot be trusted after an unexplained break) but returns everything
/// collected so far. A fixed delay separates successive page fetches to
/// respect the source site's implicit rate limits.
pub async fn scrape_brand(
    fetcher: &dyn PageFetcher,
    brand: &BrandConfig,
    max_pages: u32,
    page_delay: Duration,
    clock: &dyn Clock,
) -> ScrapeOutcome {
    info!("Scraping {} listings, up to {} pages", brand.display_name, max_pages);
    let mut outcome = ScrapeOutcome::default();

    for page in 1..=max_pages {
        let html = match fetcher.fetch_page(brand, page).await {
            Ok(html) => html,
            Err(e) => {
                warn!("{} page {} failed, aborting remaining pages: {:#}", brand.key, page, e);
                outcome.halted = Some(format!("{} page {}: {}", brand.key, page, e));
                break;
            }
        };

        let records = extract_records(&html, LISTING_MARKER);
        if records.is_empty() {
            info!("{} page {} is empty, end of listings", brand.key, page);
            break;
        }

        debug!("{} page {}: {} raw records", brand.key, page, records.len());
        for record in &records {
            outcome
                .image_urls
                .extend(crate::images::collect_image_urls(record.images.as_ref()));
            outcome.vehicles.push(normalize(record, clock));
        }

        if page < max_pages && !page_delay.is_zero() {
            tokio::time::sleep(page_delay).await;
        }
    }

    info!("Scraped {} vehicles for {}", outcome.vehicles.len(), brand.display_name);
    outcome
}
