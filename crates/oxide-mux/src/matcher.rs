//! Request matchers.
//!
//! Host and path templates are handled by [`Route`](crate::Route) directly
//! because they also produce variables. Everything else a route checks is a
//! [`Matcher`].

use std::collections::HashMap;

use crate::error::{Result, RouterError};
use crate::request::{canonical_header_key, Method, Request};

/// A condition a request must satisfy for a route to match.
///
/// Any `Fn(&Request) -> bool` closure is a matcher:
///
/// ```
/// use oxide_mux::{Matcher, Request};
///
/// let has_body = |req: &Request| !req.body.is_empty();
/// assert!(!has_body.matches(&Request::get("/")));
/// ```
pub trait Matcher: Send + Sync {
    /// Returns true if the request satisfies this matcher.
    fn matches(&self, request: &Request) -> bool;
}

impl<F> Matcher for F
where
    F: Fn(&Request) -> bool + Send + Sync,
{
    fn matches(&self, request: &Request) -> bool {
        self(request)
    }
}

/// Matches the request method against a set of methods.
#[derive(Debug, Clone)]
pub struct MethodMatcher {
    methods: Vec<Method>,
}

impl MethodMatcher {
    /// Creates a matcher for one or more methods, case-insensitively.
    pub fn new<I, S>(methods: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let methods: Vec<Method> = methods
            .into_iter()
            .map(|m| Method::parse(m.as_ref()))
            .collect();
        if methods.is_empty() {
            return Err(RouterError::EmptyMethods);
        }
        Ok(Self { methods })
    }

    /// Returns the accepted methods.
    pub fn methods(&self) -> &[Method] {
        &self.methods
    }
}

impl Matcher for MethodMatcher {
    fn matches(&self, request: &Request) -> bool {
        self.methods.contains(&request.method)
    }
}

/// Matches the URL scheme against a set of schemes.
#[derive(Debug, Clone)]
pub struct SchemeMatcher {
    schemes: Vec<String>,
}

impl SchemeMatcher {
    /// Creates a matcher for one or more schemes, case-insensitively.
    pub fn new<I, S>(schemes: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let schemes: Vec<String> = schemes
            .into_iter()
            .map(|s| s.as_ref().to_lowercase())
            .collect();
        if schemes.is_empty() {
            return Err(RouterError::EmptySchemes);
        }
        Ok(Self { schemes })
    }

    /// Returns the accepted schemes.
    pub fn schemes(&self) -> &[String] {
        &self.schemes
    }
}

impl Matcher for SchemeMatcher {
    fn matches(&self, request: &Request) -> bool {
        self.schemes.iter().any(|s| *s == request.scheme)
    }
}

/// Matches request headers.
///
/// Every configured header must be present. A configured value that is empty
/// only requires presence; otherwise one of the header values must equal it.
#[derive(Debug, Clone)]
pub struct HeaderMatcher {
    headers: HashMap<String, String>,
}

impl HeaderMatcher {
    /// Creates a matcher from a `[key, value, key, value, ...]` list.
    pub fn from_pairs(pairs: &[&str]) -> Result<Self> {
        let headers = map_from_pairs(pairs, RouterError::OddHeaders)?;
        if headers.is_empty() {
            return Err(RouterError::EmptyHeaders);
        }
        let headers = headers
            .into_iter()
            .map(|(k, v)| (canonical_header_key(&k), v))
            .collect();
        Ok(Self { headers })
    }
}

impl Matcher for HeaderMatcher {
    fn matches(&self, request: &Request) -> bool {
        match_map(&self.headers, &request.headers)
    }
}

/// Matches URL query values.
///
/// Same rules as [`HeaderMatcher`], with keys compared verbatim.
#[derive(Debug, Clone)]
pub struct QueryMatcher {
    queries: HashMap<String, String>,
}

impl QueryMatcher {
    /// Creates a matcher from a `[key, value, key, value, ...]` list.
    pub fn from_pairs(pairs: &[&str]) -> Result<Self> {
        let queries = map_from_pairs(pairs, RouterError::OddQueries)?;
        if queries.is_empty() {
            return Err(RouterError::EmptyQueries);
        }
        Ok(Self { queries })
    }
}

impl Matcher for QueryMatcher {
    fn matches(&self, request: &Request) -> bool {
        match_map(&self.queries, &request.query)
    }
}

/// Converts a flat `[key, value, ...]` list into a map.
pub(crate) fn map_from_pairs(
    pairs: &[&str],
    odd: fn(usize) -> RouterError,
) -> Result<HashMap<String, String>> {
    if pairs.len() % 2 != 0 {
        return Err(odd(pairs.len()));
    }
    Ok(pairs
        .chunks_exact(2)
        .map(|pair| (pair[0].to_string(), pair[1].to_string()))
        .collect())
}

/// Returns true if every expected key exists in `actual` and, for non-empty
/// expected values, one of its values is equal.
fn match_map(expected: &HashMap<String, String>, actual: &HashMap<String, Vec<String>>) -> bool {
    expected.iter().all(|(key, value)| {
        actual
            .get(key)
            .is_some_and(|values| value.is_empty() || values.iter().any(|v| v == value))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_matcher() {
        let m = MethodMatcher::new(["get", "Post"]).unwrap();
        assert_eq!(m.methods(), [Method::Get, Method::Post]);
        assert!(m.matches(&Request::get("/")));
        assert!(m.matches(&Request::post("/")));
        assert!(!m.matches(&Request::new("PUT", "/")));

        let purge = MethodMatcher::new(["purge"]).unwrap();
        assert!(purge.matches(&Request::new("PURGE", "/")));
    }

    #[test]
    fn test_method_matcher_empty() {
        let err = MethodMatcher::new(Vec::<&str>::new()).unwrap_err();
        assert_eq!(err, RouterError::EmptyMethods);
    }

    #[test]
    fn test_scheme_matcher() {
        let m = SchemeMatcher::new(["HTTPS"]).unwrap();
        assert_eq!(m.schemes(), ["https"]);
        assert!(m.matches(&Request::get("https://domain.com/")));
        assert!(!m.matches(&Request::get("http://domain.com/")));
        assert!(!m.matches(&Request::get("/")));

        let err = SchemeMatcher::new(Vec::<String>::new()).unwrap_err();
        assert_eq!(err, RouterError::EmptySchemes);
    }

    #[test]
    fn test_header_matcher() {
        let m = HeaderMatcher::from_pairs(&["x-requested-with", "XMLHttpRequest"]).unwrap();
        let req = Request::get("/").header("X-Requested-With", "XMLHttpRequest");
        assert!(m.matches(&req));

        let req = Request::get("/").header("X-Requested-With", "fetch");
        assert!(!m.matches(&req));
        assert!(!m.matches(&Request::get("/")));
    }

    #[test]
    fn test_header_matcher_presence_only() {
        let m = HeaderMatcher::from_pairs(&["X-Foo", ""]).unwrap();
        assert!(m.matches(&Request::get("/").header("x-foo", "anything")));
        assert!(m.matches(&Request::get("/").header("X-Foo", "")));
        assert!(!m.matches(&Request::get("/").header("X-Bar", "1")));
    }

    #[test]
    fn test_header_matcher_multiple_values_and_keys() {
        let m = HeaderMatcher::from_pairs(&["Accept", "text/html", "X-Foo", ""]).unwrap();
        let req = Request::get("/")
            .header("Accept", "application/json")
            .header("Accept", "text/html")
            .header("X-Foo", "1");
        assert!(m.matches(&req));

        let req = Request::get("/").header("Accept", "text/html");
        assert!(!m.matches(&req));
    }

    #[test]
    fn test_header_matcher_invalid_pairs() {
        assert_eq!(
            HeaderMatcher::from_pairs(&[]).unwrap_err(),
            RouterError::EmptyHeaders
        );
        assert_eq!(
            HeaderMatcher::from_pairs(&["a", "b", "c"]).unwrap_err(),
            RouterError::OddHeaders(3)
        );
    }

    #[test]
    fn test_query_matcher() {
        let m = QueryMatcher::from_pairs(&["foo", "bar", "baz", ""]).unwrap();
        assert!(m.matches(&Request::get("/?foo=bar&baz=ding")));
        assert!(m.matches(&Request::get("/?foo=nope&foo=bar&baz")));
        assert!(!m.matches(&Request::get("/?foo=bar")));
        assert!(!m.matches(&Request::get("/?Foo=bar&baz=1")));

        let built = Request::get("/").query_param("foo", "bar").query_param("baz", "");
        assert!(m.matches(&built));
        assert!(!m.matches(&Request::get("/").query_param("foo", "bar")));

        assert_eq!(
            QueryMatcher::from_pairs(&["foo"]).unwrap_err(),
            RouterError::OddQueries(1)
        );
        assert_eq!(
            QueryMatcher::from_pairs(&[]).unwrap_err(),
            RouterError::EmptyQueries
        );
    }

    #[test]
    fn test_closure_matcher() {
        let m = |req: &Request| req.get_header("Authorization").is_some();
        assert!(m.matches(&Request::get("/").header("authorization", "Bearer x")));
        assert!(!m.matches(&Request::get("/")));
    }
}
