//! A single routing rule.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::{Arc, PoisonError, RwLock};

use futures::future::BoxFuture;
use tracing::trace;

use crate::error::{Result, RouterError};
use crate::matcher::{HeaderMatcher, Matcher, MethodMatcher, QueryMatcher, SchemeMatcher};
use crate::request::{Request, RouteVars};
use crate::response::Response;
use crate::router::Router;
use crate::template::{RouteTemplate, DEFAULT_HOST_PATTERN, DEFAULT_PATH_PATTERN};

/// A boxed async handler function.
pub type Handler = Arc<dyn Fn(Request) -> BoxFuture<'static, Response> + Send + Sync>;

/// Route names of a router tree, mapped to the route indices leading to them
/// from the root router.
pub(crate) type NameTable = Arc<RwLock<HashMap<String, Vec<usize>>>>;

/// A route resolved for a request, with the variables extracted on the way.
#[derive(Debug)]
pub struct RouteMatch<'a> {
    /// The most specific matching route.
    pub route: &'a Route,
    /// Host and path variables of every route crossed to reach `route`.
    pub vars: RouteVars,
}

/// A single route: templates, matchers and a handler or a nested router.
///
/// Routes are created by [`Router::new_route`] and its shortcuts and are
/// configured in place:
///
/// ```
/// use oxide_mux::Router;
///
/// let mut router = Router::new();
/// router
///     .new_route()
///     .host("{subdomain}.domain.com")?
///     .path("/articles/{category}/{id:[0-9]+}")?
///     .methods(["GET"])?
///     .name("article")?;
///
/// let url = router.url_for(
///     "article",
///     &[("subdomain", "news"), ("category", "technology"), ("id", "42")],
/// )?;
/// assert_eq!(url, "http://news.domain.com/articles/technology/42");
/// # Ok::<(), oxide_mux::RouterError>(())
/// ```
pub struct Route {
    /// Route name, for URL building.
    name: Option<String>,
    /// Request handler.
    handler: Option<Handler>,
    /// Matchers, evaluated in registration order.
    matchers: Vec<Box<dyn Matcher>>,
    /// Host template, matched before anything else.
    host_template: Option<RouteTemplate>,
    /// Path template, matched right after the host.
    path_template: Option<RouteTemplate>,
    /// Nested router, consulted after every matcher passed.
    subrouter: Option<Router>,
    /// Route indices from the root router to this route.
    position: Vec<usize>,
    /// Name table shared by the whole router tree.
    names: NameTable,
}

impl Route {
    pub(crate) fn new(position: Vec<usize>, names: NameTable) -> Self {
        Self {
            name: None,
            handler: None,
            matchers: Vec::new(),
            host_template: None,
            path_template: None,
            subrouter: None,
            position,
            names,
        }
    }

    /// Sets the handler for this route.
    pub fn handler<F, Fut>(&mut self, handler: F) -> &mut Self
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        self.handler = Some(Arc::new(
            move |req: Request| -> BoxFuture<'static, Response> { Box::pin(handler(req)) },
        ));
        self
    }

    /// Sets the route name, used to build URLs.
    ///
    /// Names are unique across the whole router tree, sub-routers included.
    pub fn name(&mut self, name: impl Into<String>) -> Result<&mut Self> {
        let name = name.into();
        {
            let mut names = self.names.write().unwrap_or_else(PoisonError::into_inner);
            if names.contains_key(&name) {
                return Err(RouterError::DuplicateRouteName(name));
            }
            names.insert(name.clone(), self.position.clone());
        }
        trace!(name = %name, position = ?self.position, "registered route name");
        self.name = Some(name);
        Ok(self)
    }

    /// Matches the request against a host template.
    ///
    /// Variables without a pattern match anything up to the next dot:
    /// `{subdomain}.domain.com`, `{subdomain:[a-z]+}.domain.com`.
    pub fn host(&mut self, template: &str) -> Result<&mut Self> {
        if template.is_empty() {
            return Err(RouterError::EmptyHost(template.to_string()));
        }
        let reserved = var_names(self.path_template.as_ref());
        self.host_template = Some(RouteTemplate::new(
            template,
            DEFAULT_HOST_PATTERN,
            false,
            &reserved,
        )?);
        Ok(self)
    }

    /// Matches the request against a path template.
    ///
    /// Variables without a pattern match anything up to the next slash:
    /// `/products/{key}`, `/articles/{category}/{id:[0-9]+}`.
    pub fn path(&mut self, template: &str) -> Result<&mut Self> {
        if !template.starts_with('/') {
            return Err(RouterError::InvalidPath(template.to_string()));
        }
        self.set_path(template, false)
    }

    /// Matches the request against a path prefix template.
    ///
    /// Anything after the prefix is ignored.
    pub fn path_prefix(&mut self, template: &str) -> Result<&mut Self> {
        if !template.starts_with('/') {
            return Err(RouterError::InvalidPathPrefix(template.to_string()));
        }
        self.set_path(template, true)
    }

    fn set_path(&mut self, template: &str, prefix: bool) -> Result<&mut Self> {
        let reserved = var_names(self.host_template.as_ref());
        self.path_template = Some(RouteTemplate::new(
            template,
            DEFAULT_PATH_PATTERN,
            prefix,
            &reserved,
        )?);
        Ok(self)
    }

    /// Matches the request against one or more HTTP methods.
    pub fn methods<I, S>(&mut self, methods: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Ok(self.matcher(MethodMatcher::new(methods)?))
    }

    /// Matches the request against one or more URL schemes.
    pub fn schemes<I, S>(&mut self, schemes: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Ok(self.matcher(SchemeMatcher::new(schemes)?))
    }

    /// Matches the request against header values.
    ///
    /// Takes `key, value` pairs; an empty value only requires the header to
    /// be present: `headers(&["Content-Type", "application/json", "X-Foo", ""])`.
    pub fn headers(&mut self, pairs: &[&str]) -> Result<&mut Self> {
        Ok(self.matcher(HeaderMatcher::from_pairs(pairs)?))
    }

    /// Matches the request against URL query values.
    ///
    /// Takes `key, value` pairs, like [`Route::headers`].
    pub fn queries(&mut self, pairs: &[&str]) -> Result<&mut Self> {
        Ok(self.matcher(QueryMatcher::from_pairs(pairs)?))
    }

    /// Adds a custom matcher.
    pub fn matcher(&mut self, matcher: impl Matcher + 'static) -> &mut Self {
        self.matchers.push(Box::new(matcher));
        self
    }

    /// Returns the nested router of this route, creating it on first use.
    ///
    /// Routes of the nested router are only tried once everything else on
    /// this route matched:
    ///
    /// ```
    /// use oxide_mux::{Request, Router};
    ///
    /// let mut router = Router::new();
    /// let products = router.host("www.domain.com")?.subrouter();
    /// products.path("/products/")?.name("products")?;
    ///
    /// let matched = router.resolve(&Request::get("http://www.domain.com/products/"));
    /// assert_eq!(matched.unwrap().route.get_name(), Some("products"));
    /// # Ok::<(), oxide_mux::RouterError>(())
    /// ```
    pub fn subrouter(&mut self) -> &mut Router {
        self.subrouter.get_or_insert_with(|| {
            trace!(position = ?self.position, "attached sub-router");
            Router::nested(self.position.clone(), Arc::clone(&self.names))
        })
    }

    /// Returns the route name, if any.
    pub fn get_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns the handler, if any.
    pub fn get_handler(&self) -> Option<&Handler> {
        self.handler.as_ref()
    }

    /// Returns the compiled host template, if any.
    pub fn host_template(&self) -> Option<&RouteTemplate> {
        self.host_template.as_ref()
    }

    /// Returns the compiled path template, if any.
    pub fn path_template(&self) -> Option<&RouteTemplate> {
        self.path_template.as_ref()
    }

    /// Returns the nested router, if any.
    pub fn get_subrouter(&self) -> Option<&Router> {
        self.subrouter.as_ref()
    }

    /// Matches this route against the request.
    ///
    /// Host and path are checked first, then the matchers in registration
    /// order, then the nested router. The first failure rejects the route.
    pub fn match_request(&self, request: &Request) -> Option<RouteMatch<'_>> {
        let host = match &self.host_template {
            Some(tpl) => Some((tpl, tpl.captures(&request.host)?)),
            None => None,
        };
        let path = match &self.path_template {
            Some(tpl) => Some((tpl, tpl.captures(&request.path)?)),
            None => None,
        };
        if !self.matchers.iter().all(|m| m.matches(request)) {
            return None;
        }

        let mut vars = RouteVars::new();
        for (tpl, caps) in host.iter().chain(path.iter()) {
            tpl.extract(caps, &mut vars);
        }

        let mut route = self;
        if let Some(router) = &self.subrouter {
            let inner = router.resolve(request)?;
            route = inner.route;
            vars.extend(inner.vars);
        }

        Some(RouteMatch { route, vars })
    }

    /// Builds a URL for this route.
    ///
    /// Every variable of the host and path templates must be supplied and
    /// match its pattern. Routes with a host template get an `http` scheme.
    pub fn url(&self, pairs: &[(&str, &str)]) -> Result<String> {
        let values = to_map(pairs);
        let mut url = String::new();
        if let Some(tpl) = &self.host_template {
            url.push_str("http://");
            url.push_str(&tpl.build(&values)?);
        }
        if let Some(tpl) = &self.path_template {
            url.push_str(&tpl.build(&values)?);
        }
        Ok(url)
    }

    /// Builds the scheme and host part of the URL for this route.
    pub fn url_host(&self, pairs: &[(&str, &str)]) -> Result<String> {
        let tpl = self.host_template.as_ref().ok_or(RouterError::MissingHost)?;
        Ok(format!("http://{}", tpl.build(&to_map(pairs))?))
    }

    /// Builds the path part of the URL for this route.
    pub fn url_path(&self, pairs: &[(&str, &str)]) -> Result<String> {
        let tpl = self.path_template.as_ref().ok_or(RouterError::MissingPath)?;
        tpl.build(&to_map(pairs))
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("name", &self.name)
            .field("host", &self.host_template.as_ref().map(RouteTemplate::template))
            .field("path", &self.path_template.as_ref().map(RouteTemplate::template))
            .field("matchers", &self.matchers.len())
            .field("handler", &self.handler.is_some())
            .field("subrouter", &self.subrouter)
            .finish()
    }
}

fn var_names(template: Option<&RouteTemplate>) -> Vec<String> {
    template.map(|t| t.var_names().to_vec()).unwrap_or_default()
}

fn to_map<'a>(pairs: &[(&'a str, &'a str)]) -> HashMap<&'a str, &'a str> {
    pairs.iter().copied().collect()
}
