//! # oxide-mux
//!
//! A request router that matches on host, path, method, scheme, headers,
//! query values or any custom condition, and builds URLs back from routes.
//!
//! This crate provides:
//! - Host and path templates with `{name}` and `{name:pattern}` variables
//! - Method, scheme, header, query and custom matchers
//! - Sub-routers for hierarchical matching
//! - Named routes for reverse URL building
//! - A dispatcher calling async handlers with the matched variables
//!
//! ## Quick Start
//!
//! ```ignore
//! use oxide_mux::{Router, Request, Response};
//!
//! async fn article_handler(req: Request) -> Response {
//!     let id = req.vars().get("id").unwrap_or("unknown");
//!     Response::text(format!("Article {id}"))
//! }
//!
//! let mut router = Router::new();
//! router
//!     .route("/articles/{category}/{id:[0-9]+}", article_handler)?
//!     .methods(["GET"])?
//!     .name("article")?;
//!
//! let response = router.handle(Request::get("/articles/tech/42")).await;
//! ```
//!
//! ## Route Templates
//!
//! Variables in a host template default to `[^.]+` and stop at the next dot;
//! variables in a path template default to `[^/]+` and stop at the next
//! slash. A pattern after a colon overrides the default:
//!
//! ```ignore
//! router.host("{subdomain}.domain.com")?;
//! router.path("/products/{key}")?;
//! router.path_prefix("/static/{version:v[0-9]+}")?;
//! ```
//!
//! ## Sub-routers
//!
//! Routes of a sub-router are only tried when the parent route matched:
//!
//! ```ignore
//! let sub = router.host("www.domain.com")?.subrouter();
//! sub.route("/products/", products_handler)?;
//! sub.route("/products/{key}", product_handler)?;
//! ```
//!
//! ## Building URLs
//!
//! ```ignore
//! let url = router.url_for("article", &[("category", "technology"), ("id", "42")])?;
//! assert_eq!(url, "/articles/technology/42");
//! ```

mod error;
mod matcher;
mod path;
mod request;
mod response;
mod route;
mod router;
mod template;

pub use error::{Result, RouterError};
pub use matcher::{HeaderMatcher, Matcher, MethodMatcher, QueryMatcher, SchemeMatcher};
pub use path::clean_path;
pub use request::{canonical_header_key, Method, Request, RouteVars};
pub use response::Response;
pub use route::{Handler, Route, RouteMatch};
pub use router::Router;
pub use template::{RouteTemplate, DEFAULT_HOST_PATTERN, DEFAULT_PATH_PATTERN};

pub use futures::future::BoxFuture;
