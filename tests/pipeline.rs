//! End-to-end pipeline tests: canned listing pages go through extraction,
//! normalization, and reconciliation against an in-memory store.

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Mutex;
use std::time::Duration;
use vehicle_importer::cms::VehicleStore;
use vehicle_importer::import::{import_brand, reconcile, ImportSettings};
use vehicle_importer::models::{find_brand, BrandConfig, NormalizedVehicle};
use vehicle_importer::scrapers::{extract_records, normalize, scrape_brand, FixedClock, PageFetcher, LISTING_MARKER};

/// Serves a fixed sequence of page bodies.
struct PagedSite {
    pages: Vec<String>,
}

#[async_trait]
impl PageFetcher for PagedSite {
    async fn fetch_page(&self, _brand: &BrandConfig, page: u32) -> Result<String> {
        self.pages
            .get(page as usize - 1)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("page {} should never be requested", page))
    }
}

/// In-memory CMS double keyed by external reference.
#[derive(Default)]
struct MemoryStore {
    docs: Mutex<Vec<(String, NormalizedVehicle)>>,
}

#[async_trait]
impl VehicleStore for MemoryStore {
    async fn find_by_external_reference(&self, external_reference: &str) -> Result<Option<String>> {
        Ok(self
            .docs
            .lock()
            .unwrap()
            .iter()
            .position(|(r, _)| r == external_reference)
            .map(|i| format!("doc-{i}")))
    }

    async fn create(&self, vehicle: &NormalizedVehicle) -> Result<()> {
        self.docs
            .lock()
            .unwrap()
            .push((vehicle.external_reference.clone(), vehicle.clone()));
        Ok(())
    }

    async fn update(&self, doc_id: &str, vehicle: &NormalizedVehicle) -> Result<()> {
        let index: usize = doc_id.trim_start_matches("doc-").parse()?;
        self.docs.lock().unwrap()[index].1 = vehicle.clone();
        Ok(())
    }
}

fn listing_page(records: &str) -> String {
    format!(
        "<html><head><script>window.__LISTING__ = {{\"total\": 3, \"vehicles\": {records}}};</script></head><body>[stray] brackets</body></html>"
    )
}

const BMW_X5: &str = r#"[{
    "id": 42,
    "make": 13,
    "model": 7,
    "model_version_input": "X5 3.0d",
    "total_price": 45000,
    "first_registration_date": 2020,
    "mileage": 60000,
    "transmission_type": 1,
    "body_type": 2,
    "hp": 265,
    "description": "Sonderausstattung:<br><li>Panoramadach</li><li>Head-Up Display</li><li>Panoramadach</li><li>Metallic-Lackierung Saphirschwarz</li>M Sportpaket<br>",
    "images": [{"url": "http://img.test/42-1.jpg"}]
}]"#;

#[test]
fn reference_record_normalizes_as_specified() {
    let html = listing_page(BMW_X5);
    let records = extract_records(&html, LISTING_MARKER);
    assert_eq!(records.len(), 1);

    let v = normalize(&records[0], &FixedClock(2026));
    assert_eq!(v.external_reference, "IMP-42");
    assert_eq!(v.brand, "bmw");
    assert_eq!(v.title, "Bmw X5 3.0d");
    assert_eq!(v.category, "suv");
    assert_eq!(v.transmission, "automatic");
    assert_eq!(v.power.as_deref(), Some("265 ch"));
    assert_eq!(v.fuel, "essence");

    // Description parsing folded in: deduped features, package, paint color.
    assert_eq!(v.features, vec!["Panoramadach", "Head-Up Display"]);
    assert_eq!(v.packages, vec!["M Sportpaket"]);
    let specs = v.specifications.unwrap();
    assert_eq!(specs.exterior_color.as_deref(), Some("Metallic-Lackierung Saphirschwarz"));
}

#[tokio::test]
async fn pagination_stops_at_first_empty_page() {
    let site = PagedSite {
        pages: vec![
            listing_page(r#"[{"id": 1, "make": 13, "model": 1, "total_price": 100}, {"id": 2, "make": 13, "model": 1, "total_price": 200}]"#),
            listing_page(r#"[{"id": 3, "make": 13, "model": 1, "total_price": 300}]"#),
            listing_page("[]"),
            // Requesting pages beyond the empty one would error the fetcher.
        ],
    };
    let brand = find_brand("bmw").unwrap();
    let outcome = scrape_brand(&site, brand, 5, Duration::ZERO, &FixedClock(2026)).await;

    assert!(outcome.halted.is_none());
    let refs: Vec<&str> = outcome.vehicles.iter().map(|v| v.external_reference.as_str()).collect();
    assert_eq!(refs, vec!["IMP-1", "IMP-2", "IMP-3"]);
}

#[tokio::test]
async fn rerunning_an_import_is_idempotent_per_record() {
    let store = MemoryStore::default();
    let html = listing_page(BMW_X5);
    let vehicles: Vec<NormalizedVehicle> = extract_records(&html, LISTING_MARKER)
        .iter()
        .map(|r| normalize(r, &FixedClock(2026)))
        .collect();

    let first = reconcile(&store, &vehicles, Duration::ZERO).await;
    assert_eq!(first.created, 1);
    assert_eq!(first.updated, 0);

    let second = reconcile(&store, &vehicles, Duration::ZERO).await;
    assert_eq!(second.created, 0);
    assert_eq!(second.updated, 1);

    // Still exactly one document in the store.
    assert_eq!(store.docs.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn import_brand_reports_halt_but_keeps_partial_work() {
    struct FailsOnPageTwo;

    #[async_trait]
    impl PageFetcher for FailsOnPageTwo {
        async fn fetch_page(&self, _brand: &BrandConfig, page: u32) -> Result<String> {
            match page {
                1 => Ok(listing_page(r#"[{"id": 9, "make": 9, "model": 4, "total_price": 500}]"#)),
                _ => anyhow::bail!("tls handshake failed"),
            }
        }
    }

    let store = MemoryStore::default();
    let brand = find_brand("audi").unwrap();
    let settings = ImportSettings {
        max_pages: 4,
        page_delay: Duration::ZERO,
        record_delay: Duration::ZERO,
        brand_pause: Duration::ZERO,
    };

    let stats = import_brand(&FailsOnPageTwo, &store, &FixedClock(2026), brand, &settings, None).await;

    // Page 1's record still landed in the CMS.
    assert_eq!(stats.created, 1);
    assert_eq!(stats.errors, 0);
    assert!(stats.error_details.iter().any(|d| d.contains("pagination halted")));
    assert_eq!(store.docs.lock().unwrap().len(), 1);
}
