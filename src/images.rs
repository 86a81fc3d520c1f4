use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

/// Fetches one image by URL. Abstracted for tests.
#[async_trait]
pub trait ImageDownloader: Send + Sync {
    async fn download(&self, url: &str) -> Result<Vec<u8>>;
}

/// Plain HTTP image fetcher.
pub struct HttpImageDownloader {
    client: Client,
}

impl HttpImageDownloader {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to create image HTTP client")?;
        Ok(Self { client })
    }
}

#[async_trait]
impl ImageDownloader for HttpImageDownloader {
    async fn download(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Failed to fetch image {}", url))?
            .error_for_status()
            .context("Image fetch returned an error status")?;
        Ok(response.bytes().await.context("Failed to read image body")?.to_vec())
    }
}

/// Downloads every URL, best-effort: a failed image is logged and skipped,
/// never fatal to the import. Returns the number fetched successfully.
pub async fn download_all(downloader: &dyn ImageDownloader, urls: &[String]) -> usize {
    let mut fetched = 0;
    for url in urls {
        match downloader.download(url).await {
            Ok(bytes) => {
                debug!("Fetched image {} ({} bytes)", url, bytes.len());
                fetched += 1;
            }
            Err(e) => warn!("Skipping image {}: {:#}", url, e),
        }
    }
    fetched
}

/// Pulls image URLs out of a raw record's `images` value. The source shape
/// varies per listing (bare strings, objects with a `url` field), so this
/// accepts anything and takes what it recognizes.
pub fn collect_image_urls(images: Option<&serde_json::Value>) -> Vec<String> {
    let Some(serde_json::Value::Array(items)) = images else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| match item {
            serde_json::Value::String(url) => Some(url.clone()),
            serde_json::Value::Object(map) => {
                map.get("url").and_then(|u| u.as_str()).map(str::to_string)
            }
            _ => None,
        })
        .filter(|url| url.starts_with("http"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct FlakyDownloader;

    #[async_trait]
    impl ImageDownloader for FlakyDownloader {
        async fn download(&self, url: &str) -> Result<Vec<u8>> {
            if url.contains("bad") {
                anyhow::bail!("404");
            }
            Ok(vec![0xFF, 0xD8])
        }
    }

    #[tokio::test]
    async fn failed_images_are_skipped_not_fatal() {
        let urls = vec![
            "http://img.test/a.jpg".to_string(),
            "http://img.test/bad.jpg".to_string(),
            "http://img.test/c.jpg".to_string(),
        ];
        assert_eq!(download_all(&FlakyDownloader, &urls).await, 2);
    }

    #[test]
    fn collects_urls_from_mixed_shapes() {
        let images = json!([
            "http://img.test/a.jpg",
            {"url": "http://img.test/b.jpg", "order": 2},
            {"path": "no-url-field"},
            42,
            "not-a-url"
        ]);
        assert_eq!(
            collect_image_urls(Some(&images)),
            vec!["http://img.test/a.jpg", "http://img.test/b.jpg"]
        );
    }

    #[test]
    fn non_array_shapes_yield_nothing() {
        assert!(collect_image_urls(None).is_empty());
        assert!(collect_image_urls(Some(&json!({"count": 3}))).is_empty());
    }
}
