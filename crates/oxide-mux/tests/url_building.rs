//! Tests for reverse URL building.

mod common;
use common::*;

use oxide_mux::{Request, Router, RouterError};

#[test]
fn named_article_route() {
    let mut router = Router::new();
    router
        .path("/articles/{category}/{id:[0-9]+}")
        .unwrap()
        .name("article")
        .unwrap();

    assert_eq!(
        router
            .url_for("article", &[("category", "technology"), ("id", "42")])
            .unwrap(),
        "/articles/technology/42"
    );

    let err = router
        .url_for("article", &[("category", "technology")])
        .unwrap_err();
    assert_eq!(err, RouterError::MissingRouteVariable("id".into()));
    assert!(!err.is_configuration());
}

#[test]
fn invalid_variable_names_the_culprit() {
    let mut router = Router::new();
    router
        .path("/articles/{category}/{id:[0-9]+}")
        .unwrap()
        .name("article")
        .unwrap();

    let err = router
        .url_for("article", &[("category", "technology"), ("id", "forty-two")])
        .unwrap_err();
    assert!(matches!(
        err,
        RouterError::InvalidRouteVariable { ref name, ref value, .. }
            if name == "id" && value == "forty-two"
    ));
}

#[test]
fn host_and_path_url() {
    let mut router = Router::new();
    router
        .host("{subdomain}.domain.com")
        .unwrap()
        .path("/articles/{category}/{id:[0-9]+}")
        .unwrap()
        .name("article")
        .unwrap();

    let pairs = [("subdomain", "news"), ("category", "technology"), ("id", "42")];
    let route = router.named("article").unwrap();
    assert_eq!(
        route.url(&pairs).unwrap(),
        "http://news.domain.com/articles/technology/42"
    );
    assert_eq!(route.url_host(&pairs).unwrap(), "http://news.domain.com");
    assert_eq!(route.url_path(&pairs).unwrap(), "/articles/technology/42");
}

#[test]
fn literal_template_builds_itself() {
    let mut router = Router::new();
    router.path("/about/team").unwrap().name("team").unwrap();
    assert_eq!(router.url_for("team", &[]).unwrap(), "/about/team");
}

#[test]
fn built_url_matches_its_route() {
    let mut router = Router::new();
    router
        .host("{subdomain:[a-z]+}.domain.com")
        .unwrap()
        .path("/shop/{section}/{id:[0-9]{1,6}}")
        .unwrap()
        .name("item")
        .unwrap();

    let bindings = [("subdomain", "store"), ("section", "books"), ("id", "123456")];
    let url = router.url_for("item", &bindings).unwrap();
    assert_eq!(url, "http://store.domain.com/shop/books/123456");

    let req = Request::get(&url);
    assert_eq!(resolve_name(&router, &req).as_deref(), Some("item"));
    assert_eq!(resolve_vars(&router, &req), vars(&bindings));
}

#[test]
fn missing_templates() {
    let mut router = Router::new();
    router.path("/only-path").unwrap().name("path").unwrap();
    router.host("only.host").unwrap().name("host").unwrap();

    let path_route = router.named("path").unwrap();
    assert_eq!(path_route.url_host(&[]).unwrap_err(), RouterError::MissingHost);

    let host_route = router.named("host").unwrap();
    assert_eq!(host_route.url_path(&[]).unwrap_err(), RouterError::MissingPath);
    assert_eq!(host_route.url(&[]).unwrap(), "http://only.host");
}
