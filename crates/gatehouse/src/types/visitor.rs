//! Visitors and the kiosk sign-in/out forms.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::InvalidInputError;

use super::PremiseId;

/// Identifier of a visitor record.
pub type VisitorId = u64;

/// Where a visit stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisitorStatus {
    Pending,
    SignedIn,
    Rejected,
    SignedOut,
}

impl VisitorStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VisitorStatus::Pending => "pending",
            VisitorStatus::SignedIn => "signed_in",
            VisitorStatus::Rejected => "rejected",
            VisitorStatus::SignedOut => "signed_out",
        }
    }
}

impl fmt::Display for VisitorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VisitorStatus {
    type Err = InvalidInputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(VisitorStatus::Pending),
            "signed_in" => Ok(VisitorStatus::SignedIn),
            "rejected" => Ok(VisitorStatus::Rejected),
            "signed_out" => Ok(VisitorStatus::SignedOut),
            other => Err(InvalidInputError::Field {
                field: "status",
                reason: format!(
                    "'{other}' is not one of pending, signed_in, rejected, signed_out"
                ),
            }),
        }
    }
}

/// A visitor record as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Visitor {
    pub id: VisitorId,
    pub first_name: String,
    pub second_name: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub person_visiting: String,
    #[serde(default)]
    pub room_number: String,
    #[serde(default)]
    pub reason: String,
    pub premise: PremiseId,
    /// URL of the uploaded ID photo.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_photo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<VisitorStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sign_in_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sign_out_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejected_at: Option<DateTime<Utc>>,
}

impl Visitor {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.second_name)
    }
}

/// Filters for listing visitors.
#[derive(Debug, Clone, Default)]
pub struct VisitorFilter {
    pub status: Option<VisitorStatus>,
    pub premise: Option<PremiseId>,
}

impl VisitorFilter {
    pub(crate) fn to_query(&self) -> Vec<(String, String)> {
        let mut query = Vec::new();
        if let Some(status) = self.status {
            query.push(("status".to_string(), status.as_str().to_string()));
        }
        if let Some(ref premise) = self.premise {
            query.push(("premise".to_string(), premise.to_string()));
        }
        query
    }
}

/// An ID photo attached to a kiosk sign-in.
#[derive(Clone)]
pub struct IdPhoto {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl fmt::Debug for IdPhoto {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdPhoto")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// The kiosk sign-in form.
#[derive(Debug, Clone)]
pub struct VisitorSignIn {
    pub premise: PremiseId,
    pub first_name: String,
    pub second_name: String,
    pub phone_number: String,
    pub person_visiting: String,
    pub room_number: String,
    pub reason: String,
    pub id_photo: Option<IdPhoto>,
}

impl VisitorSignIn {
    /// Check the fields the kiosk requires before submitting.
    pub fn validate(&self) -> Result<(), InvalidInputError> {
        require("premise", self.premise.as_str())?;
        require("first_name", &self.first_name)?;
        require("second_name", &self.second_name)?;
        require("phone_number", &self.phone_number)?;
        require("reason", &self.reason)?;
        Ok(())
    }

    /// Text fields in submission order; empty optional fields are omitted.
    pub(crate) fn text_fields(&self) -> Vec<(&'static str, String)> {
        [
            ("premise", self.premise.to_string()),
            ("first_name", self.first_name.clone()),
            ("second_name", self.second_name.clone()),
            ("phone_number", self.phone_number.clone()),
            ("person_visiting", self.person_visiting.clone()),
            ("room_number", self.room_number.clone()),
            ("reason", self.reason.clone()),
        ]
        .into_iter()
        .filter(|(_, value)| !value.trim().is_empty())
        .collect()
    }
}

/// The kiosk sign-out request.
#[derive(Debug, Clone, Serialize)]
pub struct VisitorSignOut {
    pub premise: PremiseId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sign_out_time: Option<DateTime<Utc>>,
}

pub(crate) fn require(field: &'static str, value: &str) -> Result<(), InvalidInputError> {
    if value.trim().is_empty() {
        Err(InvalidInputError::MissingField { field })
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn form() -> VisitorSignIn {
        VisitorSignIn {
            premise: PremiseId::from(3),
            first_name: "Ada".into(),
            second_name: "Lovelace".into(),
            phone_number: "+44 20 7946 0000".into(),
            person_visiting: "".into(),
            room_number: "".into(),
            reason: "Interview".into(),
            id_photo: None,
        }
    }

    #[test]
    fn complete_form_validates() {
        assert!(form().validate().is_ok());
    }

    #[test]
    fn blank_reason_is_rejected() {
        let mut f = form();
        f.reason = "   ".into();
        let err = f.validate().unwrap_err();
        assert!(matches!(err, InvalidInputError::MissingField { field: "reason" }));
    }

    #[test]
    fn text_fields_skip_empty_optionals() {
        let names: Vec<_> = form().text_fields().into_iter().map(|(k, _)| k).collect();
        assert_eq!(
            names,
            ["premise", "first_name", "second_name", "phone_number", "reason"]
        );
    }

    #[test]
    fn status_round_trips_through_str() {
        for status in [
            VisitorStatus::Pending,
            VisitorStatus::SignedIn,
            VisitorStatus::Rejected,
            VisitorStatus::SignedOut,
        ] {
            assert_eq!(status.as_str().parse::<VisitorStatus>().unwrap(), status);
        }
        assert!("checked_in".parse::<VisitorStatus>().is_err());
    }

    #[test]
    fn filter_builds_query() {
        let filter = VisitorFilter {
            status: Some(VisitorStatus::SignedIn),
            premise: Some(PremiseId::from(9)),
        };
        assert_eq!(
            filter.to_query(),
            vec![
                ("status".to_string(), "signed_in".to_string()),
                ("premise".to_string(), "9".to_string()),
            ]
        );
    }

    #[test]
    fn visitor_parses_api_payload() {
        let visitor: Visitor = serde_json::from_value(json!({
            "id": 12,
            "first_name": "Ada",
            "second_name": "Lovelace",
            "phone_number": "555",
            "person_visiting": "Charles",
            "room_number": "4B",
            "reason": "Meeting",
            "premise": 3,
            "status": "signed_in",
            "sign_in_time": "2024-05-01T09:30:00Z"
        }))
        .unwrap();
        assert_eq!(visitor.status, Some(VisitorStatus::SignedIn));
        assert_eq!(visitor.premise.as_str(), "3");
        assert_eq!(visitor.full_name(), "Ada Lovelace");
        assert!(visitor.sign_in_time.is_some());
    }
}
