//! Vehicle-listing import pipeline: scrapes a car-listing site, normalizes
//! the embedded listing payloads into a canonical vehicle schema, and
//! reconciles them into a headless CMS.

pub mod cms;
pub mod config;
pub mod images;
pub mod import;
pub mod models;
pub mod scrapers;
pub mod server;
