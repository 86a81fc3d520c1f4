use crate::models::NormalizedVehicle;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Persistence operations the reconciler needs from the CMS.
/// Abstracted so tests can run against an in-memory fake.
#[async_trait]
pub trait VehicleStore: Send + Sync {
    /// Returns the CMS document id for a vehicle with this external
    /// reference, if one exists.
    async fn find_by_external_reference(&self, external_reference: &str)
        -> Result<Option<String>>;

    async fn create(&self, vehicle: &NormalizedVehicle) -> Result<()>;

    async fn update(&self, doc_id: &str, vehicle: &NormalizedVehicle) -> Result<()>;
}

/// REST client for the CMS's vehicle collection.
///
/// The CMS exposes a Payload-style collection API: list queries take
/// bracketed `where` filters and answer with a `docs` array; create is a
/// POST on the collection, update a PATCH on the document.
pub struct CmsClient {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct ListResponse {
    #[serde(default)]
    docs: Vec<DocRef>,
}

#[derive(Debug, Deserialize)]
struct DocRef {
    id: String,
}

impl CmsClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to create CMS HTTP client")?;

        Ok(Self { client, base_url: base_url.trim_end_matches('/').to_string() })
    }

    fn collection_url(&self) -> String {
        format!("{}/api/vehicles", self.base_url)
    }
}

#[async_trait]
impl VehicleStore for CmsClient {
    async fn find_by_external_reference(
        &self,
        external_reference: &str,
    ) -> Result<Option<String>> {
        let response = self.client
            .get(self.collection_url())
            .query(&[
                ("where[externalReference][equals]", external_reference),
                ("limit", "1"),
            ])
            .send()
            .await
            .context("CMS lookup request failed")?
            .error_for_status()
            .context("CMS lookup returned an error status")?;

        let list: ListResponse = response.json().await.context("CMS lookup body was not JSON")?;
        Ok(list.docs.into_iter().next().map(|d| d.id))
    }

    async fn create(&self, vehicle: &NormalizedVehicle) -> Result<()> {
        debug!("Creating CMS vehicle {}", vehicle.external_reference);
        self.client
            .post(self.collection_url())
            .json(vehicle)
            .send()
            .await
            .context("CMS create request failed")?
            .error_for_status()
            .context("CMS create returned an error status")?;
        Ok(())
    }

    async fn update(&self, doc_id: &str, vehicle: &NormalizedVehicle) -> Result<()> {
        debug!("Updating CMS vehicle {} ({})", vehicle.external_reference, doc_id);
        self.client
            .patch(format!("{}/{}", self.collection_url(), doc_id))
            .json(vehicle)
            .send()
            .await
            .context("CMS update request failed")?
            .error_for_status()
            .context("CMS update returned an error status")?;
        Ok(())
    }
}
