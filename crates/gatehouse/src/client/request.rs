//! Outbound request descriptors.

use reqwest::Method;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::multipart::{Form, Part};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{Error, InvalidInputError};

/// A request the client is about to issue.
///
/// Descriptors are plain data so the client can dispatch the same request a
/// second time after a token refresh. The retry marker is private: callers
/// always hand the client a fresh descriptor, and only the client produces the
/// retry copy through [`ApiRequest::into_retry`].
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    path: String,
    headers: HeaderMap,
    query: Vec<(String, String)>,
    body: RequestBody,
    retry_attempted: bool,
}

/// Request payload.
#[derive(Debug, Clone, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(serde_json::Value),
    Multipart(Vec<FormField>),
}

/// One field of a multipart form.
#[derive(Clone)]
pub enum FormField {
    Text {
        name: String,
        value: String,
    },
    File {
        name: String,
        file_name: String,
        content_type: Option<String>,
        bytes: Vec<u8>,
    },
}

impl std::fmt::Debug for FormField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FormField::Text { name, value } => f
                .debug_struct("Text")
                .field("name", name)
                .field("value", value)
                .finish(),
            FormField::File {
                name,
                file_name,
                bytes,
                ..
            } => f
                .debug_struct("File")
                .field("name", name)
                .field("file_name", file_name)
                .field("len", &bytes.len())
                .finish(),
        }
    }
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: HeaderMap::new(),
            query: Vec::new(),
            body: RequestBody::Empty,
            retry_attempted: false,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Attach a JSON body.
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, Error> {
        self.body = RequestBody::Json(serde_json::to_value(body)?);
        Ok(self)
    }

    /// Attach a multipart form body.
    pub fn multipart(mut self, fields: Vec<FormField>) -> Self {
        self.body = RequestBody::Multipart(fields);
        self
    }

    /// Add a query parameter.
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Add several query parameters.
    pub fn query_pairs(mut self, pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        self.query.extend(pairs);
        self
    }

    /// Set a header.
    pub fn header(mut self, name: HeaderName, value: &str) -> Result<Self, Error> {
        let value = HeaderValue::from_str(value).map_err(|e| InvalidInputError::Other {
            message: format!("invalid value for header {name}: {e}"),
        })?;
        self.headers.insert(name, value);
        Ok(self)
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn query_params(&self) -> &[(String, String)] {
        &self.query
    }

    pub fn body(&self) -> &RequestBody {
        &self.body
    }

    /// Whether this descriptor is already the post-refresh retry.
    pub fn retry_attempted(&self) -> bool {
        self.retry_attempted
    }

    /// The one retry copy of this request.
    pub(crate) fn into_retry(self) -> Self {
        Self {
            retry_attempted: true,
            ..self
        }
    }

    /// Attach the body to a request builder.
    pub(crate) fn apply_body(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<reqwest::RequestBuilder, Error> {
        match &self.body {
            RequestBody::Empty => Ok(builder),
            RequestBody::Json(value) => Ok(builder.json(value)),
            RequestBody::Multipart(fields) => Ok(builder.multipart(build_form(fields)?)),
        }
    }
}

// Forms are rebuilt per dispatch because reqwest consumes them.
fn build_form(fields: &[FormField]) -> Result<Form, Error> {
    let mut form = Form::new();
    for field in fields {
        form = match field {
            FormField::Text { name, value } => form.text(name.clone(), value.clone()),
            FormField::File {
                name,
                file_name,
                content_type,
                bytes,
            } => {
                let mut part = Part::bytes(bytes.clone()).file_name(file_name.clone());
                if let Some(mime) = content_type {
                    part = part.mime_str(mime).map_err(|e| InvalidInputError::Field {
                        field: "content_type",
                        reason: e.to_string(),
                    })?;
                }
                form.part(name.clone(), part)
            }
        };
    }
    Ok(form)
}

/// A successful response.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl ApiResponse {
    /// Decode the body as JSON. An empty body decodes as `null`.
    pub fn json<R: DeserializeOwned>(&self) -> Result<R, Error> {
        if self.body.iter().all(u8::is_ascii_whitespace) {
            return Ok(serde_json::from_value(serde_json::Value::Null)?);
        }
        Ok(serde_json::from_slice(&self.body)?)
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.body
    }
}

#[cfg(test)]
mod tests {
    use reqwest::header::ACCEPT;
    use serde_json::json;

    use super::*;

    #[test]
    fn fresh_request_is_not_a_retry() {
        let request = ApiRequest::get("/visitors/");
        assert!(!request.retry_attempted());
        assert!(request.into_retry().retry_attempted());
    }

    #[test]
    fn retry_keeps_everything_else() {
        let request = ApiRequest::post("/auth/premises/")
            .json(&json!({ "name": "Dock" }))
            .unwrap()
            .query("a", "1")
            .header(ACCEPT, "application/json")
            .unwrap();
        let retry = request.clone().into_retry();
        assert_eq!(retry.method(), request.method());
        assert_eq!(retry.path(), request.path());
        assert_eq!(retry.query_params(), request.query_params());
        assert_eq!(retry.headers(), request.headers());
        assert!(matches!(retry.body(), RequestBody::Json(v) if v["name"] == "Dock"));
    }

    #[test]
    fn header_rejects_control_characters() {
        assert!(ApiRequest::get("/").header(ACCEPT, "bad\nvalue").is_err());
    }

    #[test]
    fn empty_body_decodes_as_unit() {
        let response = ApiResponse {
            status: 204,
            content_type: None,
            body: Vec::new(),
        };
        let () = response.json().unwrap();
    }

    #[test]
    fn file_field_debug_hides_bytes() {
        let field = FormField::File {
            name: "id_photo".into(),
            file_name: "id.png".into(),
            content_type: Some("image/png".into()),
            bytes: vec![0x89, 0x50, 0x4e, 0x47],
        };
        let debug = format!("{:?}", field);
        assert!(debug.contains("len: 4"));
        assert!(!debug.contains("137"));
    }
}
