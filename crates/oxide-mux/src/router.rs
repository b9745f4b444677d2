//! Main router implementation.

use std::fmt;
use std::future::Future;
use std::sync::{Arc, PoisonError};

use futures::future::BoxFuture;
use tracing::debug;

use crate::error::{Result, RouterError};
use crate::matcher::Matcher;
use crate::path::clean_path;
use crate::request::{Method, Request};
use crate::response::Response;
use crate::route::{NameTable, Route, RouteMatch};

/// An ordered set of routes.
///
/// Routes are tried in registration order and the first match wins. A route
/// can hold a nested router (see [`Route::subrouter`]); every router of a
/// tree shares the name table of the root, so route names are unique across
/// the tree.
pub struct Router {
    /// Registered routes, in matching order.
    routes: Vec<Route>,
    /// Named routes of the whole tree.
    names: NameTable,
    /// Route indices from the root router to the route owning this router.
    position: Vec<usize>,
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl Router {
    /// Creates a new empty root router.
    pub fn new() -> Self {
        Self::nested(Vec::new(), NameTable::default())
    }

    pub(crate) fn nested(position: Vec<usize>, names: NameTable) -> Self {
        Self {
            routes: Vec::new(),
            names,
            position,
        }
    }

    /// Registers an empty route and returns it for configuration.
    ///
    /// The route is part of the router from now on: if a later builder call
    /// on it fails, the route stays registered with the steps that succeeded.
    pub fn new_route(&mut self) -> &mut Route {
        let route = self.detached_route();
        self.push(route)
    }

    /// Creates a route positioned at the end of this router, not yet registered.
    fn detached_route(&self) -> Route {
        let mut position = self.position.clone();
        position.push(self.routes.len());
        Route::new(position, Arc::clone(&self.names))
    }

    fn push(&mut self, route: Route) -> &mut Route {
        let index = self.routes.len();
        self.routes.push(route);
        &mut self.routes[index]
    }

    /// Configures a new route and registers it only if `configure` succeeds,
    /// so a failed factory call leaves the router unchanged.
    fn try_route<C>(&mut self, configure: C) -> Result<&mut Route>
    where
        C: FnOnce(&mut Route) -> Result<&mut Route>,
    {
        let mut route = self.detached_route();
        configure(&mut route)?;
        Ok(self.push(route))
    }

    /// Registers a new route with a path and a handler.
    pub fn route<F, Fut>(&mut self, path: &str, handler: F) -> Result<&mut Route>
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        Ok(self.path(path)?.handler(handler))
    }

    /// Registers a new GET route.
    pub fn get<F, Fut>(&mut self, path: &str, handler: F) -> Result<&mut Route>
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        self.method_route(Method::Get, path, handler)
    }

    /// Registers a new POST route.
    pub fn post<F, Fut>(&mut self, path: &str, handler: F) -> Result<&mut Route>
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        self.method_route(Method::Post, path, handler)
    }

    /// Registers a new PUT route.
    pub fn put<F, Fut>(&mut self, path: &str, handler: F) -> Result<&mut Route>
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        self.method_route(Method::Put, path, handler)
    }

    /// Registers a new PATCH route.
    pub fn patch<F, Fut>(&mut self, path: &str, handler: F) -> Result<&mut Route>
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        self.method_route(Method::Patch, path, handler)
    }

    /// Registers a new DELETE route.
    pub fn delete<F, Fut>(&mut self, path: &str, handler: F) -> Result<&mut Route>
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        self.method_route(Method::Delete, path, handler)
    }

    fn method_route<F, Fut>(&mut self, method: Method, path: &str, handler: F) -> Result<&mut Route>
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        let route = self.try_route(|r| r.path(path)?.methods([method.as_str()]))?;
        Ok(route.handler(handler))
    }

    /// Registers a new route and sets its name.
    pub fn name(&mut self, name: impl Into<String>) -> Result<&mut Route> {
        self.try_route(|r| r.name(name))
    }

    /// Registers a new route with a host template.
    pub fn host(&mut self, template: &str) -> Result<&mut Route> {
        self.try_route(|r| r.host(template))
    }

    /// Registers a new route with a path template.
    pub fn path(&mut self, template: &str) -> Result<&mut Route> {
        self.try_route(|r| r.path(template))
    }

    /// Registers a new route with a path prefix template.
    pub fn path_prefix(&mut self, template: &str) -> Result<&mut Route> {
        self.try_route(|r| r.path_prefix(template))
    }

    /// Registers a new route with a methods matcher.
    pub fn methods<I, S>(&mut self, methods: I) -> Result<&mut Route>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.try_route(|r| r.methods(methods))
    }

    /// Registers a new route with a schemes matcher.
    pub fn schemes<I, S>(&mut self, schemes: I) -> Result<&mut Route>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.try_route(|r| r.schemes(schemes))
    }

    /// Registers a new route with a headers matcher.
    pub fn headers(&mut self, pairs: &[&str]) -> Result<&mut Route> {
        self.try_route(|r| r.headers(pairs))
    }

    /// Registers a new route with a queries matcher.
    pub fn queries(&mut self, pairs: &[&str]) -> Result<&mut Route> {
        self.try_route(|r| r.queries(pairs))
    }

    /// Registers a new route with a custom matcher.
    pub fn matcher(&mut self, matcher: impl Matcher + 'static) -> &mut Route {
        self.new_route().matcher(matcher)
    }

    /// Returns the registered routes, in matching order.
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Resolves the request to the first matching route.
    pub fn resolve(&self, request: &Request) -> Option<RouteMatch<'_>> {
        self.routes.iter().find_map(|route| route.match_request(request))
    }

    /// Returns the route registered under `name` in this router or below it.
    pub fn named(&self, name: &str) -> Option<&Route> {
        let position = self
            .names
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)?
            .clone();
        let (last, parents) = position.strip_prefix(self.position.as_slice())?.split_last()?;

        let mut router = self;
        for &index in parents {
            router = router.routes.get(index)?.get_subrouter()?;
        }
        router.routes.get(*last)
    }

    /// Builds a URL for a named route.
    ///
    /// # Example
    ///
    /// ```
    /// use oxide_mux::Router;
    ///
    /// let mut router = Router::new();
    /// router.path("/articles/{category}/{id:[0-9]+}")?.name("article")?;
    ///
    /// let url = router.url_for("article", &[("category", "technology"), ("id", "42")])?;
    /// assert_eq!(url, "/articles/technology/42");
    /// # Ok::<(), oxide_mux::RouterError>(())
    /// ```
    pub fn url_for(&self, name: &str, pairs: &[(&str, &str)]) -> Result<String> {
        self.named(name)
            .ok_or_else(|| RouterError::RouteNotFound(name.to_string()))?
            .url(pairs)
    }

    /// Handles an incoming request.
    ///
    /// Paths that are not in canonical form are redirected permanently to
    /// their clean form. Otherwise the handler of the matched route is called
    /// with the route variables stored in [`Request::vars`].
    pub fn handle<'a>(&'a self, mut request: Request) -> BoxFuture<'a, Response> {
        Box::pin(async move {
            let clean = clean_path(&request.path);
            if clean != request.path {
                debug!(path = %request.path, location = %clean, "redirecting to clean path");
                return Response::redirect_permanent(clean);
            }

            let Some(matched) = self.resolve(&request) else {
                debug!(method = %request.method, host = %request.host, path = %request.path, "no route matched");
                return Response::not_found();
            };
            let Some(handler) = matched.route.get_handler().cloned() else {
                debug!(route = ?matched.route.get_name(), path = %request.path, "matched route has no handler");
                return Response::not_found();
            };

            request.vars = matched.vars;
            handler(request).await
        })
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("routes", &self.routes)
            .field("position", &self.position)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn hello_handler(_req: Request) -> Response {
        Response::text("Hello, World!")
    }

    async fn article_handler(req: Request) -> Response {
        let category = req.vars.get("category").unwrap_or("unknown");
        let id = req.vars.get("id").unwrap_or("unknown");
        Response::text(format!("{category}/{id}"))
    }

    #[test]
    fn test_first_registered_wins() {
        let mut router = Router::new();
        router.path("/users/{id}").unwrap().name("first").unwrap();
        router.path("/users/{name}").unwrap().name("second").unwrap();

        let matched = router.resolve(&Request::get("/users/7")).unwrap();
        assert_eq!(matched.route.get_name(), Some("first"));
        assert_eq!(matched.vars.get("id"), Some("7"));
    }

    #[test]
    fn test_no_match() {
        let mut router = Router::new();
        router.path("/users").unwrap();
        assert!(router.resolve(&Request::get("/posts")).is_none());
        assert!(Router::new().resolve(&Request::get("/")).is_none());
    }

    #[test]
    fn test_failed_factory_registers_nothing() {
        let mut router = Router::new();
        router.path("/a").unwrap().name("a").unwrap();

        assert!(router.path("no-slash").is_err());
        assert_eq!(
            router.name("a").unwrap_err(),
            RouterError::DuplicateRouteName("a".into())
        );
        assert!(router.headers(&["odd"]).is_err());
        assert!(router.get("/{unbalanced", hello_handler).is_err());
        assert_eq!(router.routes().len(), 1);

        router.path("/b").unwrap().name("b").unwrap();
        assert_eq!(router.routes().len(), 2);
        let matched = router.resolve(&Request::get("/b")).unwrap();
        assert_eq!(matched.route.get_name(), Some("b"));
        assert!(router.resolve(&Request::get("/anything")).is_none());
        assert_eq!(router.url_for("b", &[]).unwrap(), "/b");
    }

    #[test]
    fn test_method_routes() {
        let mut router = Router::new();
        router.get("/items", hello_handler).unwrap().name("list").unwrap();
        router.post("/items", hello_handler).unwrap().name("create").unwrap();

        let get = router.resolve(&Request::get("/items")).unwrap();
        assert_eq!(get.route.get_name(), Some("list"));
        let post = router.resolve(&Request::post("/items")).unwrap();
        assert_eq!(post.route.get_name(), Some("create"));
        assert!(router.resolve(&Request::new("DELETE", "/items")).is_none());
    }

    #[test]
    fn test_subrouter_names_are_global() {
        let mut router = Router::new();
        router.path("/").unwrap().name("home").unwrap();
        let sub = router.host("www.domain.com").unwrap().subrouter();
        assert_eq!(
            sub.path("/x").unwrap().name("home").unwrap_err(),
            RouterError::DuplicateRouteName("home".into())
        );
        sub.path("/products/").unwrap().name("products").unwrap();

        let route = router.named("products").unwrap();
        assert_eq!(route.path_template().unwrap().template(), "/products/");
        assert!(router.named("missing").is_none());
    }

    #[test]
    fn test_named_from_subrouter() {
        let mut router = Router::new();
        router.path("/").unwrap().name("home").unwrap();
        let sub = router.path_prefix("/api").unwrap().subrouter();
        sub.path("/api/users").unwrap().name("users").unwrap();

        let sub = router.routes()[1].get_subrouter().unwrap();
        assert!(sub.named("users").is_some());
        assert!(sub.named("home").is_none());
    }

    #[test]
    fn test_url_for() {
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
        assert_eq!(
            router.url_for("article", &[("category", "technology")]).unwrap_err(),
            RouterError::MissingRouteVariable("id".into())
        );
        assert_eq!(
            router.url_for("nope", &[]).unwrap_err(),
            RouterError::RouteNotFound("nope".into())
        );
    }

    #[tokio::test]
    async fn test_handle() {
        let mut router = Router::new();
        router.route("/", hello_handler).unwrap();
        router
            .route("/articles/{category}/{id:[0-9]+}", article_handler)
            .unwrap();

        let res = router.handle(Request::get("/")).await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body_string(), Some("Hello, World!".to_string()));

        let res = router.handle(Request::get("/articles/tech/42")).await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body_string(), Some("tech/42".to_string()));
    }

    #[tokio::test]
    async fn test_handle_not_found() {
        let mut router = Router::new();
        router.route("/", hello_handler).unwrap();
        router.path("/no-handler").unwrap();

        assert_eq!(router.handle(Request::get("/nonexistent")).await.status, 404);
        assert_eq!(router.handle(Request::get("/no-handler")).await.status, 404);
    }

    #[tokio::test]
    async fn test_handle_redirects_unclean_path() {
        let router = Router::new();
        let res = router.handle(Request::get("/a//b/../c/")).await;
        assert_eq!(res.status, 301);
        assert_eq!(res.headers.get("Location"), Some(&"/a/c/".to_string()));
    }
}
