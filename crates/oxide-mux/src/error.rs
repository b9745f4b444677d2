//! Error types for routing.

use thiserror::Error;

/// Router-specific errors.
///
/// Everything except the URL building variants is raised while the route
/// table is being configured, so a misconfigured table fails before it serves
/// a single request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouterError {
    /// A route template has unbalanced curly braces.
    #[error("unbalanced curly braces in route template: {0:?}")]
    UnbalancedBraces(String),

    /// A `{...}` segment has an empty name or an empty pattern.
    #[error("missing name or pattern in route template: {0:?}")]
    BadTemplatePart(String),

    /// A variable pattern is not a valid regular expression.
    #[error("invalid pattern in route template {template:?}: {message}")]
    InvalidPattern { template: String, message: String },

    /// A route name was registered twice in the same router tree.
    #[error("duplicated route name: {0:?}")]
    DuplicateRouteName(String),

    /// A variable name appears twice in the host and path of one route.
    #[error("duplicated route variable name: {0:?}")]
    DuplicateVariable(String),

    /// `host()` was given an empty template.
    #[error("host() requires a non-empty string, got {0:?}")]
    EmptyHost(String),

    /// `path()` was given an empty template or one without a leading slash.
    #[error("path() requires a non-empty string that starts with a slash, got {0:?}")]
    InvalidPath(String),

    /// `path_prefix()` was given an empty template or one without a leading slash.
    #[error("path_prefix() requires a non-empty string that starts with a slash, got {0:?}")]
    InvalidPathPrefix(String),

    /// `headers()` was called without any pair.
    #[error("headers() requires at least a pair of parameters")]
    EmptyHeaders,

    /// `headers()` was called with an odd number of parameters.
    #[error("headers() requires an even number of parameters, got {0}")]
    OddHeaders(usize),

    /// `queries()` was called without any pair.
    #[error("queries() requires at least a pair of parameters")]
    EmptyQueries,

    /// `queries()` was called with an odd number of parameters.
    #[error("queries() requires an even number of parameters, got {0}")]
    OddQueries(usize),

    /// `methods()` was called without any method.
    #[error("methods() requires at least one parameter")]
    EmptyMethods,

    /// `schemes()` was called without any scheme.
    #[error("schemes() requires at least one parameter")]
    EmptySchemes,

    /// A variable required by the template was not supplied.
    #[error("missing route variable: {0:?}")]
    MissingRouteVariable(String),

    /// A supplied variable value does not match its pattern.
    #[error("route variable {name:?} doesn't match: got {value:?}, expected {pattern:?}")]
    InvalidRouteVariable {
        name: String,
        value: String,
        pattern: String,
    },

    /// Host URL requested for a route without a host template.
    #[error("route doesn't have a host")]
    MissingHost,

    /// Path URL requested for a route without a path template.
    #[error("route doesn't have a path")]
    MissingPath,

    /// Route name not found.
    #[error("route not found: {0}")]
    RouteNotFound(String),
}

impl RouterError {
    /// Returns true for errors raised while configuring routes.
    ///
    /// The remaining kinds come from URL building and can be fixed by
    /// retrying with different variables.
    pub fn is_configuration(&self) -> bool {
        !matches!(
            self,
            Self::MissingRouteVariable(_)
                | Self::InvalidRouteVariable { .. }
                | Self::MissingHost
                | Self::MissingPath
                | Self::RouteNotFound(_)
        )
    }
}

/// Result type alias for router operations.
pub type Result<T> = std::result::Result<T, RouterError>;
