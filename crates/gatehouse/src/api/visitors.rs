//! Visitor endpoints, including the public kiosk sign-in and sign-out.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, instrument};

use crate::Result;
use crate::client::endpoints;
use crate::client::{ApiClient, ApiRequest, FormField};
use crate::types::{
    ListEnvelope, Visitor, VisitorFilter, VisitorId, VisitorSignIn, VisitorSignOut,
};

#[derive(Debug, Serialize)]
struct ApproveBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    sign_in_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
struct RejectBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    rejected_at: Option<DateTime<Utc>>,
}

/// Visitor records.
#[derive(Debug, Clone, Copy)]
pub struct VisitorsApi<'a> {
    client: &'a ApiClient,
}

impl<'a> VisitorsApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    #[instrument(skip(self))]
    pub async fn list(&self, filter: &VisitorFilter) -> Result<Vec<Visitor>> {
        let request = ApiRequest::get(endpoints::VISITORS).query_pairs(filter.to_query());
        let list: ListEnvelope<Visitor> = self.client.request(request).await?;
        Ok(list.into_vec())
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: VisitorId) -> Result<Visitor> {
        self.client
            .request(ApiRequest::get(endpoints::visitor(id)))
            .await
    }

    /// Submit the kiosk sign-in form. Works without a staff session.
    #[instrument(skip(self, form), fields(premise = %form.premise))]
    pub async fn sign_in(&self, form: &VisitorSignIn) -> Result<Visitor> {
        form.validate()?;

        let mut fields: Vec<FormField> = form
            .text_fields()
            .into_iter()
            .map(|(name, value)| FormField::Text {
                name: name.to_string(),
                value,
            })
            .collect();

        if let Some(ref photo) = form.id_photo {
            fields.push(FormField::File {
                name: "id_photo".to_string(),
                file_name: photo.file_name.clone(),
                content_type: photo.content_type.clone(),
                bytes: photo.bytes.clone(),
            });
        }

        let visitor: Visitor = self
            .client
            .request(ApiRequest::post(endpoints::VISITOR_SIGNIN).multipart(fields))
            .await?;
        info!(visitor = visitor.id, "Visitor signed in");
        Ok(visitor)
    }

    /// Kiosk sign-out. The server identifies the visitor by address.
    #[instrument(skip(self, request), fields(premise = %request.premise))]
    pub async fn sign_out(&self, request: &VisitorSignOut) -> Result<Visitor> {
        self.client
            .request(ApiRequest::post(endpoints::VISITOR_SIGNOUT).json(request)?)
            .await
    }

    #[instrument(skip(self))]
    pub async fn approve(
        &self,
        id: VisitorId,
        sign_in_time: Option<DateTime<Utc>>,
    ) -> Result<Visitor> {
        let body = ApproveBody { sign_in_time };
        self.client
            .request(ApiRequest::post(endpoints::visitor_approve(id)).json(&body)?)
            .await
    }

    #[instrument(skip(self))]
    pub async fn reject(&self, id: VisitorId, rejected_at: Option<DateTime<Utc>>) -> Result<Visitor> {
        let body = RejectBody { rejected_at };
        self.client
            .request(ApiRequest::post(endpoints::visitor_reject(id)).json(&body)?)
            .await
    }
}
