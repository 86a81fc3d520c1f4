pub mod equipment;
pub mod extract;
pub mod mappers;
pub mod normalize;
pub mod source;
pub mod traits;

pub use equipment::{parse_equipment, EquipmentKeywords};
pub use extract::{extract_embedded_array, extract_records, find_balanced_array};
pub use normalize::normalize;
pub use source::{scrape_brand, HttpPageFetcher, ScrapeOutcome, LISTING_MARKER};
pub use traits::{Clock, FixedClock, PageFetcher, SystemClock};
