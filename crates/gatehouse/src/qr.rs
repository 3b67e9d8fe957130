//! QR code links for the visitor kiosk.

use chrono::Utc;
use url::Url;

use crate::error::{Error, InvalidInputError};
use crate::types::PremiseId;

/// Make a QR image URL absolute and defeat caching.
///
/// Relative URLs (leading `/`) are resolved against the backend origin; a
/// `t=<cache_bust>` parameter is appended so a regenerated image is refetched.
pub fn normalize_qr_url(raw: &str, backend_origin: &str, cache_bust: i64) -> String {
    let absolute = if raw.starts_with('/') {
        format!("{}{}", backend_origin.trim_end_matches('/'), raw)
    } else {
        raw.to_string()
    };
    let separator = if absolute.contains('?') { '&' } else { '?' };
    format!("{absolute}{separator}t={cache_bust}")
}

/// Current time in milliseconds, for [`normalize_qr_url`].
pub fn cache_buster() -> i64 {
    Utc::now().timestamp_millis()
}

/// The kiosk sign-in page a premise's QR code points at.
pub fn visitor_sign_in_url(
    frontend_base: &str,
    premise_id: &PremiseId,
    premise_name: &str,
) -> Result<String, Error> {
    let page = format!("{}/visitor/signin", frontend_base.trim_end_matches('/'));
    let mut url = Url::parse(&page).map_err(|e| InvalidInputError::Field {
        field: "frontend_url",
        reason: e.to_string(),
    })?;
    url.query_pairs_mut()
        .append_pair("premise_id", premise_id.as_str())
        .append_pair("premiseName", premise_name);
    Ok(url.into())
}

/// File name for a downloaded QR image.
pub fn download_file_name(premise_id: &PremiseId) -> String {
    format!("visitor-signin-qrcode-{premise_id}.png")
}
