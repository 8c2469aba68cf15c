//! Request builders for the trigger endpoint.

use axum::{
    body::Body,
    http::{Method, Request},
};
use bytes::Bytes;
use serde_json::Value;

/// Builder for `POST /trigger` requests.
pub struct TriggerRequestBuilder {
    headers: Vec<(String, String)>,
    body: Bytes,
}

impl TriggerRequestBuilder {
    /// Creates a request with no headers and an empty body.
    pub fn new() -> Self {
        Self { headers: Vec::new(), body: Bytes::new() }
    }

    /// Creates a request with a JSON body and content type.
    pub fn json(value: &Value) -> Self {
        Self::new().header("content-type", "application/json").body(value.to_string())
    }

    /// Creates a request with JSON content type and the body sent as given.
    pub fn json_text(body: impl Into<Bytes>) -> Self {
        Self::new().header("content-type", "application/json").body(body)
    }

    /// Appends a header. Repeating a name sends it several times.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Sets the raw body.
    #[must_use]
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Builds the request.
    ///
    /// # Panics
    ///
    /// Panics if a header name or value is not valid HTTP.
    pub fn build(self) -> Request<Body> {
        let mut builder = Request::builder().method(Method::POST).uri("/trigger");
        for (name, value) in self.headers {
            builder = builder.header(name, value);
        }
        builder.body(Body::from(self.body)).expect("valid trigger request")
    }
}

impl Default for TriggerRequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds a `GET` request with an empty body.
///
/// # Panics
///
/// Panics if `uri` is not a valid request target.
pub fn get(uri: &str) -> Request<Body> {
    Request::builder().method(Method::GET).uri(uri).body(Body::empty()).expect("valid GET request")
}
