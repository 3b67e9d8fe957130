//! Premises and their QR links.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, de};

use crate::error::InvalidInputError;

/// Identifier of a premise.
///
/// The API is inconsistent about sending ids as numbers or strings; both are
/// accepted and kept in string form. Ids are interpolated into URL paths, so
/// only unreserved URL characters are allowed and `.`/`..` are rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct PremiseId(String);

impl PremiseId {
    pub fn new(id: impl Into<String>) -> Result<Self, InvalidInputError> {
        let id = id.into();
        if id.is_empty() {
            return Err(InvalidInputError::MissingField { field: "premise" });
        }
        let unreserved =
            |c: char| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '~');
        if id == "." || id == ".." || !id.chars().all(unreserved) {
            return Err(InvalidInputError::Field {
                field: "premise",
                reason: format!("'{id}' is not a valid premise id"),
            });
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<u64> for PremiseId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl FromStr for PremiseId {
    type Err = InvalidInputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Display for PremiseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for PremiseId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Ok(PremiseId::from(n)),
            Raw::Text(s) => PremiseId::new(s).map_err(de::Error::custom),
        }
    }
}

/// A physical site visitors sign in to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Premise {
    pub id: PremiseId,
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qr_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qr_code_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qr_code_url: Option<String>,
    /// Visitors currently signed in; filled by
    /// [`PremisesApi::list_with_occupancy`](crate::api::PremisesApi::list_with_occupancy).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_visitors: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_person: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Request body for creating a premise.
#[derive(Debug, Clone, Serialize)]
pub struct NewPremise {
    pub name: String,
    pub address: String,
}

/// Partial update of a premise. Unset fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PremiseUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl PremiseUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.address.is_none()
    }
}

/// Response from the QR code endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QrCodeLink {
    pub qr_code_url: String,
}
