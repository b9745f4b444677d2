#![allow(dead_code)]

use oxide_mux::{Request, RouteVars, Router};

pub fn resolve_name(router: &Router, request: &Request) -> Option<String> {
    router
        .resolve(request)
        .map(|m| m.route.get_name().unwrap_or_default().to_string())
}

pub fn resolve_vars(router: &Router, request: &Request) -> RouteVars {
    router
        .resolve(request)
        .unwrap_or_else(|| panic!("Expected a match for {} {}{}", request.method, request.host, request.path))
        .vars
}

pub fn vars(pairs: &[(&str, &str)]) -> RouteVars {
    pairs.iter().copied().collect()
}
