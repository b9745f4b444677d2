//! HTTP response type.

use std::collections::HashMap;

/// An HTTP response, as returned by route handlers.
#[derive(Debug, Clone)]
pub struct Response {
    /// HTTP status code.
    pub status: u16,
    /// Response headers.
    pub headers: HashMap<String, String>,
    /// Response body.
    pub body: Vec<u8>,
}

impl Response {
    /// Creates a new response with the given status.
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body: Vec::new(),
        }
    }

    /// Creates a 200 OK response.
    pub fn ok() -> Self {
        Self::new(200)
    }

    /// Creates a response with JSON content.
    pub fn json<T: serde::Serialize>(data: &T) -> Self {
        match serde_json::to_vec(data) {
            Ok(body) => Self::ok()
                .header("Content-Type", "application/json")
                .body(body),
            Err(_) => Self::internal_server_error(),
        }
    }

    /// Creates a response with plain text content.
    pub fn text(body: impl Into<String>) -> Self {
        let body: String = body.into();
        Self::ok()
            .header("Content-Type", "text/plain; charset=utf-8")
            .body(body)
    }

    /// Creates a 301 redirect response.
    pub fn redirect_permanent(url: impl Into<String>) -> Self {
        Self::new(301).header("Location", url)
    }

    /// Creates a 404 Not Found response.
    pub fn not_found() -> Self {
        Self::new(404).body("Not Found")
    }

    /// Creates a 500 Internal Server Error response.
    pub fn internal_server_error() -> Self {
        Self::new(500).body("Internal Server Error")
    }

    /// Sets a header.
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Sets the status code.
    #[must_use]
    pub fn status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    /// Sets the body.
    #[must_use]
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Returns the body as a string.
    pub fn body_string(&self) -> Option<String> {
        String::from_utf8(self.body.clone()).ok()
    }
}

impl Default for Response {
    fn default() -> Self {
        Self::ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_json() {
        let res = Response::json(&serde_json::json!({"name": "test"}));
        assert_eq!(res.status, 200);
        assert_eq!(
            res.headers.get("Content-Type"),
            Some(&"application/json".to_string())
        );
        assert_eq!(res.body_string(), Some(r#"{"name":"test"}"#.to_string()));
    }

    #[test]
    fn test_response_redirect_permanent() {
        let res = Response::redirect_permanent("/products/");
        assert_eq!(res.status, 301);
        assert_eq!(res.headers.get("Location"), Some(&"/products/".to_string()));
    }

    #[test]
    fn test_response_builder() {
        let res = Response::text("created").status(201).header("X-Custom", "value");
        assert_eq!(res.status, 201);
        assert_eq!(res.headers.get("X-Custom"), Some(&"value".to_string()));
        assert_eq!(res.body_string(), Some("created".to_string()));
    }
}
