use crate::cms::VehicleStore;
use crate::images::ImageDownloader;
use crate::models::{BrandConfig, ImportStats, NormalizedVehicle, BRANDS};
use crate::scrapers::source::scrape_brand;
use crate::scrapers::traits::{Clock, PageFetcher};
use std::time::Duration;
use tracing::{info, warn};

/// Longest error message kept in a stats detail line.
const MAX_ERROR_DETAIL_LEN: usize = 200;

/// Pacing and bounds for one import run.
#[derive(Debug, Clone, Copy)]
pub struct ImportSettings {
    pub max_pages: u32,
    /// Pause between successive listing-page fetches.
    pub page_delay: Duration,
    /// Pause between successive CMS writes.
    pub record_delay: Duration,
    /// Pause between brands in a multi-brand run.
    pub brand_pause: Duration,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            max_pages: 10,
            page_delay: Duration::from_secs(2),
            record_delay: Duration::from_millis(300),
            brand_pause: Duration::from_secs(5),
        }
    }
}

/// Reconciles normalized vehicles into the CMS, one at a time.
///
/// Each record is matched by its external reference: a hit becomes a
/// wholesale update, a miss a create. Exactly one counter moves per record.
/// A failed record is counted and detailed, and the loop continues: the
/// batch is at-least-once, idempotent per external reference, and not
/// atomic as a whole.
pub async fn reconcile(
    store: &dyn VehicleStore,
    vehicles: &[NormalizedVehicle],
    record_delay: Duration,
) -> ImportStats {
    let mut stats = ImportStats::default();

    for vehicle in vehicles {
        stats.total += 1;

        // A zero source id cannot make a usable idempotency key.
        if vehicle.external_id == "0" {
            warn!("Skipping vehicle without a source id: {}", vehicle.title);
            stats.skipped += 1;
            continue;
        }

        match upsert(store, vehicle).await {
            Ok(Outcome::Created) => stats.created += 1,
            Ok(Outcome::Updated) => stats.updated += 1,
            Err(e) => {
                warn!("Failed to import {}: {:#}", vehicle.external_reference, e);
                stats.errors += 1;
                stats
                    .error_details
                    .push(format!("{}: {}", vehicle.title, truncate(&format!("{e:#}"))));
            }
        }

        if !record_delay.is_zero() {
            tokio::time::sleep(record_delay).await;
        }
    }

    stats
}

enum Outcome {
    Created,
    Updated,
}

async fn upsert(store: &dyn VehicleStore, vehicle: &NormalizedVehicle) -> anyhow::Result<Outcome> {
    match store.find_by_external_reference(&vehicle.external_reference).await? {
        Some(doc_id) => {
            store.update(&doc_id, vehicle).await?;
            Ok(Outcome::Updated)
        }
        None => {
            store.create(vehicle).await?;
            Ok(Outcome::Created)
        }
    }
}

/// Scrapes one brand and reconciles the result into the CMS.
///
/// A halted pagination run still imports the vehicles collected before the
/// break; the halt reason is recorded in the stats details. When an image
/// downloader is supplied, the listing images are fetched best-effort
/// before reconciliation.
pub async fn import_brand(
    fetcher: &dyn PageFetcher,
    store: &dyn VehicleStore,
    clock: &dyn Clock,
    brand: &BrandConfig,
    settings: &ImportSettings,
    images: Option<&dyn ImageDownloader>,
) -> ImportStats {
    let outcome = scrape_brand(fetcher, brand, settings.max_pages, settings.page_delay, clock).await;

    if let Some(downloader) = images {
        let fetched = crate::images::download_all(downloader, &outcome.image_urls).await;
        info!("Fetched {}/{} listing images for {}", fetched, outcome.image_urls.len(), brand.key);
    }

    let mut stats = reconcile(store, &outcome.vehicles, settings.record_delay).await;
    if let Some(reason) = outcome.halted {
        stats.error_details.push(format!("pagination halted: {}", reason));
    }

    info!(
        "{} import done: {} total, {} created, {} updated, {} errors",
        brand.display_name, stats.total, stats.created, stats.updated, stats.errors
    );
    stats
}

/// Runs the full sequential multi-brand import. One brand's halt never
/// aborts the others.
pub async fn import_all_brands(
    fetcher: &dyn PageFetcher,
    store: &dyn VehicleStore,
    clock: &dyn Clock,
    settings: &ImportSettings,
    images: Option<&dyn ImageDownloader>,
) -> ImportStats {
    let mut stats = ImportStats::default();

    for (i, brand) in BRANDS.iter().enumerate() {
        stats.merge(import_brand(fetcher, store, clock, brand, settings, images).await);
        if i + 1 < BRANDS.len() && !settings.brand_pause.is_zero() {
            tokio::time::sleep(settings.brand_pause).await;
        }
    }

    stats
}

fn truncate(msg: &str) -> String {
    if msg.chars().count() <= MAX_ERROR_DETAIL_LEN {
        msg.to_string()
    } else {
        msg.chars().take(MAX_ERROR_DETAIL_LEN).collect()
    }
}
