//! Premises endpoints.

use futures_util::future::join_all;
use reqwest::header::ACCEPT;
use tracing::{debug, instrument, warn};

use crate::Result;
use crate::client::endpoints;
use crate::client::{ApiClient, ApiRequest};
use crate::error::InvalidInputError;
use crate::qr;
use crate::types::{
    ListEnvelope, NewPremise, Premise, PremiseId, PremiseUpdate, QrCodeLink, VisitorFilter,
    VisitorStatus, require,
};

/// Premises management.
#[derive(Debug, Clone, Copy)]
pub struct PremisesApi<'a> {
    client: &'a ApiClient,
}

impl<'a> PremisesApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// All premises visible to the signed-in user.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<Premise>> {
        let list: ListEnvelope<Premise> = self
            .client
            .request(ApiRequest::get(endpoints::PREMISES))
            .await?;
        let premises = list.into_vec();
        debug!(count = premises.len(), "Listed premises");
        Ok(premises)
    }

    /// All premises, each with the number of visitors currently signed in.
    ///
    /// A premise whose count cannot be fetched is reported with zero.
    #[instrument(skip(self))]
    pub async fn list_with_occupancy(&self) -> Result<Vec<Premise>> {
        let premises = self.list().await?;

        let counts = join_all(premises.iter().map(|p| self.current_visitors(&p.id))).await;

        Ok(premises
            .into_iter()
            .zip(counts)
            .map(|(mut premise, count)| {
                let count = count.unwrap_or_else(|e| {
                    warn!(premise = %premise.id, error = %e, "Failed to count visitors");
                    0
                });
                premise.current_visitors = Some(count);
                premise
            })
            .collect())
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: &PremiseId) -> Result<Premise> {
        self.client
            .request(ApiRequest::get(endpoints::premise(id)))
            .await
    }

    #[instrument(skip(self, premise), fields(name = %premise.name))]
    pub async fn create(&self, premise: &NewPremise) -> Result<Premise> {
        require("name", &premise.name)?;
        self.client
            .request(ApiRequest::post(endpoints::PREMISES).json(premise)?)
            .await
    }

    /// Change the given fields of a premise.
    #[instrument(skip(self, update))]
    pub async fn update(&self, id: &PremiseId, update: &PremiseUpdate) -> Result<Premise> {
        if update.is_empty() {
            return Err(InvalidInputError::Other {
                message: "nothing to update".to_string(),
            }
            .into());
        }
        self.client
            .request(ApiRequest::put(endpoints::premise(id)).json(update)?)
            .await
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: &PremiseId) -> Result<()> {
        self.client
            .send(ApiRequest::delete(endpoints::premise(id)))
            .await?;
        Ok(())
    }

    /// The QR code link as stored by the server.
    #[instrument(skip(self))]
    pub async fn qr_code(&self, id: &PremiseId) -> Result<QrCodeLink> {
        self.client
            .request(ApiRequest::get(endpoints::premise_qr_code(id)))
            .await
    }

    /// The QR code image URL, absolute and with a fresh cache buster.
    pub async fn qr_image_url(&self, id: &PremiseId) -> Result<String> {
        let link = self.qr_code(id).await?;
        Ok(qr::normalize_qr_url(
            &link.qr_code_url,
            &self.client.base_url().origin(),
            qr::cache_buster(),
        ))
    }

    /// Download the QR code image.
    #[instrument(skip(self))]
    pub async fn download_qr_code(&self, id: &PremiseId) -> Result<Vec<u8>> {
        let request = ApiRequest::get(endpoints::premise_qr_download(id))
            .header(ACCEPT, "image/png, image/jpeg")?;
        let response = self.client.send(request).await?;
        debug!(bytes = response.body.len(), "Downloaded QR code");
        Ok(response.into_bytes())
    }

    /// Number of visitors currently signed in at a premise.
    pub async fn current_visitors(&self, id: &PremiseId) -> Result<usize> {
        let filter = VisitorFilter {
            status: Some(VisitorStatus::SignedIn),
            premise: Some(id.clone()),
        };
        Ok(self.client.visitors().list(&filter).await?.len())
    }
}
