//! HTTP request type.

use std::collections::HashMap;
use std::fmt;

/// HTTP request methods.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Method {
    /// GET method
    Get,
    /// POST method
    Post,
    /// PUT method
    Put,
    /// PATCH method
    Patch,
    /// DELETE method
    Delete,
    /// HEAD method
    Head,
    /// OPTIONS method
    Options,
    /// CONNECT method
    Connect,
    /// TRACE method
    Trace,
    /// Any other method, upper-cased.
    Other(String),
}

impl Method {
    /// Parses a method from a string, ignoring case.
    pub fn parse(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "GET" => Self::Get,
            "POST" => Self::Post,
            "PUT" => Self::Put,
            "PATCH" => Self::Patch,
            "DELETE" => Self::Delete,
            "HEAD" => Self::Head,
            "OPTIONS" => Self::Options,
            "CONNECT" => Self::Connect,
            "TRACE" => Self::Trace,
            other => Self::Other(other.to_string()),
        }
    }

    /// Returns the method as a string.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
            Self::Connect => "CONNECT",
            Self::Trace => "TRACE",
            Self::Other(method) => method,
        }
    }
}

impl From<&str> for Method {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Variables extracted from the host and path of a matched route.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteVars {
    vars: HashMap<String, String>,
}

impl RouteVars {
    /// Creates new empty route variables.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a variable.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(key.into(), value.into());
    }

    /// Gets a variable value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// Gets a variable value or returns an error.
    pub fn require(&self, key: &str) -> Result<&str, String> {
        self.get(key)
            .ok_or_else(|| format!("Missing route variable: {key}"))
    }

    /// Parses a variable as a specific type.
    pub fn parse<T: std::str::FromStr>(&self, key: &str) -> Option<T> {
        self.get(key).and_then(|v| v.parse().ok())
    }

    /// Moves every variable of `other` into `self`, replacing clashes.
    pub fn extend(&mut self, other: Self) {
        self.vars.extend(other.vars);
    }

    /// Returns the number of variables.
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    /// Returns true if there are no variables.
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Returns an iterator over the variables.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RouteVars {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut vars = Self::new();
        for (k, v) in iter {
            vars.insert(k, v);
        }
        vars
    }
}

/// An HTTP request, as seen by the router.
#[derive(Debug, Clone)]
pub struct Request {
    /// HTTP method.
    pub method: Method,
    /// URL scheme, lower-cased. Empty for origin-form targets.
    pub scheme: String,
    /// Target host, including the port if any. Empty for origin-form targets.
    pub host: String,
    /// Request path.
    pub path: String,
    /// Query string parameters.
    pub query: HashMap<String, Vec<String>>,
    /// Request headers, keyed by canonical header name.
    pub headers: HashMap<String, Vec<String>>,
    /// Request body.
    pub body: Vec<u8>,
    /// Route variables set by the router when dispatching.
    pub vars: RouteVars,
}

impl Request {
    /// Creates a new request.
    ///
    /// `target` is either absolute (`https://www.domain.com/products/?page=1`)
    /// or origin-form (`/products/?page=1`).
    pub fn new(method: impl Into<Method>, target: &str) -> Self {
        let absolute = target.split_once("://").filter(|(scheme, _)| {
            !scheme.is_empty()
                && scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        });
        let (scheme, rest) = match absolute {
            Some((scheme, rest)) => (scheme.to_lowercase(), rest),
            None => (String::new(), target),
        };
        let rest = rest.split_once('#').map_or(rest, |(before, _)| before);
        let (rest, query) = rest.split_once('?').unwrap_or((rest, ""));
        let (host, path) = if scheme.is_empty() {
            ("", rest)
        } else {
            rest.find('/')
                .map_or((rest, "/"), |slash| rest.split_at(slash))
        };

        Self {
            method: method.into(),
            scheme,
            host: host.to_string(),
            path: path.to_string(),
            query: Self::parse_query_string(query),
            headers: HashMap::new(),
            body: Vec::new(),
            vars: RouteVars::new(),
        }
    }

    /// Creates a GET request.
    pub fn get(target: &str) -> Self {
        Self::new(Method::Get, target)
    }

    /// Creates a POST request.
    pub fn post(target: &str) -> Self {
        Self::new(Method::Post, target)
    }

    /// Adds a header value.
    #[must_use]
    pub fn header(mut self, key: &str, value: impl Into<String>) -> Self {
        self.headers
            .entry(canonical_header_key(key))
            .or_default()
            .push(value.into());
        self
    }

    /// Sets the body.
    #[must_use]
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Adds a query parameter value.
    #[must_use]
    pub fn query_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.entry(key.into()).or_default().push(value.into());
        self
    }

    /// Gets the first value of a header, ignoring the case of `key`.
    pub fn get_header(&self, key: &str) -> Option<&str> {
        self.header_values(key).first().map(String::as_str)
    }

    /// Gets all values of a header, ignoring the case of `key`.
    pub fn header_values(&self, key: &str) -> &[String] {
        self.headers
            .get(&canonical_header_key(key))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Gets the first value of a query parameter.
    pub fn get_query(&self, key: &str) -> Option<&str> {
        self.query_values(key).first().map(String::as_str)
    }

    /// Gets all values of a query parameter.
    pub fn query_values(&self, key: &str) -> &[String] {
        self.query.get(key).map(Vec::as_slice).unwrap_or_default()
    }

    /// Returns the route variables of the matched route.
    pub fn vars(&self) -> &RouteVars {
        &self.vars
    }

    /// Returns the body as a string.
    pub fn body_string(&self) -> Option<String> {
        String::from_utf8(self.body.clone()).ok()
    }

    /// Parses the body as JSON.
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }

    /// Parses query parameters from a query string.
    pub fn parse_query_string(query: &str) -> HashMap<String, Vec<String>> {
        let mut params: HashMap<String, Vec<String>> = HashMap::new();
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            params
                .entry(key.into_owned())
                .or_default()
                .push(value.into_owned());
        }
        params
    }
}

/// Returns the canonical form of a header name.
///
/// The first letter and any letter following a hyphen are upper-cased, the
/// rest lower-cased: `x-requested-with` becomes `X-Requested-With`.
pub fn canonical_header_key(key: &str) -> String {
    let mut upper = true;
    key.chars()
        .map(|c| {
            let out = if upper {
                c.to_ascii_uppercase()
            } else {
                c.to_ascii_lowercase()
            };
            upper = c == '-';
            out
        })
        .collect()
}
