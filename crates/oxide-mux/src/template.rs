//! Route template compilation.
//!
//! A route template is literal text interspersed with variables:
//!
//! - `{name}` matches the default pattern of the template kind
//!   ([`DEFAULT_HOST_PATTERN`] or [`DEFAULT_PATH_PATTERN`]).
//! - `{name:pattern}` matches the given regular expression.
//!
//! Compiling a template yields a regular expression for matching, a reverse
//! template for building URLs, and one validator per variable so that URL
//! building can name the variable that does not fit.

use std::collections::HashMap;
use std::fmt;

use regex::{Captures, Regex};

use crate::error::{Result, RouterError};
use crate::request::RouteVars;

/// Default variable pattern for host templates: stops at the next dot.
pub const DEFAULT_HOST_PATTERN: &str = "[^.]+";

/// Default variable pattern for path templates: stops at the next slash.
pub const DEFAULT_PATH_PATTERN: &str = "[^/]+";

/// A piece of the reverse template.
#[derive(Debug, Clone)]
enum Segment {
    /// Literal text, copied as is.
    Literal(String),
    /// Placeholder filled with the value of the n-th variable.
    Variable(usize),
}

/// A compiled route template.
#[derive(Debug, Clone)]
pub struct RouteTemplate {
    /// The original template string.
    template: String,
    /// Expanded regex, anchored at the start and, unless `prefix`, at the end.
    regex: Regex,
    /// Reverse template used to build URLs.
    reverse: Vec<Segment>,
    /// Variable names, in template order.
    var_names: Vec<String>,
    /// Variable validators (`^(?:pattern)$`), parallel to `var_names`.
    var_patterns: Vec<Regex>,
    /// Capture group index of each variable in `regex`.
    groups: Vec<usize>,
    /// Whether the template only matches a prefix.
    prefix: bool,
}

impl RouteTemplate {
    /// Compiles a route template.
    ///
    /// Variables without a pattern use `default_pattern`. Names listed in
    /// `reserved` are already taken by another template of the same route and
    /// are rejected, as are names repeated within `template` itself.
    ///
    /// # Example
    ///
    /// ```
    /// use oxide_mux::{RouteTemplate, DEFAULT_PATH_PATTERN};
    ///
    /// let tpl = RouteTemplate::new(
    ///     "/articles/{category}/{id:[0-9]+}",
    ///     DEFAULT_PATH_PATTERN,
    ///     false,
    ///     &[],
    /// )
    /// .unwrap();
    /// let vars = tpl.match_vars("/articles/tech/42").unwrap();
    /// assert_eq!(vars.get("category"), Some("tech"));
    /// assert_eq!(vars.get("id"), Some("42"));
    /// assert!(tpl.match_vars("/articles/tech/abc").is_none());
    /// ```
    pub fn new(
        template: &str,
        default_pattern: &str,
        prefix: bool,
        reserved: &[String],
    ) -> Result<Self> {
        let bounds = variable_bounds(template)?;
        let mut pattern = String::from("^");
        let mut reverse = Vec::with_capacity(bounds.len() * 2 + 1);
        let mut var_names: Vec<String> = Vec::with_capacity(bounds.len());
        let mut var_patterns = Vec::with_capacity(bounds.len());
        let mut end = 0;

        for (index, &(start, stop)) in bounds.iter().enumerate() {
            let raw = &template[end..start];
            end = stop;

            let part = &template[start + 1..stop - 1];
            let (name, patt) = part.split_once(':').unwrap_or((part, default_pattern));
            if name.is_empty() || patt.is_empty() {
                return Err(RouterError::BadTemplatePart(
                    template[start..stop].to_string(),
                ));
            }
            if reserved.iter().chain(&var_names).any(|n| n == name) {
                return Err(RouterError::DuplicateVariable(name.to_string()));
            }

            pattern.push_str(&regex::escape(raw));
            pattern.push_str(&format!("(?P<{}>{patt})", group_name(index)));

            if !raw.is_empty() {
                reverse.push(Segment::Literal(raw.to_string()));
            }
            reverse.push(Segment::Variable(index));

            var_names.push(name.to_string());
            var_patterns.push(compile(template, &format!("^(?:{patt})$"))?);
        }

        let raw = &template[end..];
        pattern.push_str(&regex::escape(raw));
        if !raw.is_empty() {
            reverse.push(Segment::Literal(raw.to_string()));
        }
        if !prefix {
            pattern.push('$');
        }

        let regex = compile(template, &pattern)?;
        let groups = (0..var_names.len())
            .map(|index| {
                let wanted = group_name(index);
                regex
                    .capture_names()
                    .position(|n| n == Some(wanted.as_str()))
                    .ok_or_else(|| RouterError::InvalidPattern {
                        template: template.to_string(),
                        message: format!("capture group for variable {index} is missing"),
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            template: template.to_string(),
            regex,
            reverse,
            var_names,
            var_patterns,
            groups,
            prefix,
        })
    }

    /// Returns the original template string.
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Returns the expanded regular expression.
    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    /// Returns the variable names in template order.
    pub fn var_names(&self) -> &[String] {
        &self.var_names
    }

    /// Returns the per-variable validators, parallel to [`Self::var_names`].
    pub fn var_patterns(&self) -> &[Regex] {
        &self.var_patterns
    }

    /// Returns true if this template only matches a prefix.
    pub fn is_prefix(&self) -> bool {
        self.prefix
    }

    /// Applies the template regex to `text`.
    pub fn captures<'t>(&self, text: &'t str) -> Option<Captures<'t>> {
        self.regex.captures(text)
    }

    /// Copies the variables of a successful match into `vars`.
    pub(crate) fn extract(&self, caps: &Captures<'_>, vars: &mut RouteVars) {
        for (name, &group) in self.var_names.iter().zip(&self.groups) {
            if let Some(value) = caps.get(group) {
                vars.insert(name.clone(), value.as_str());
            }
        }
    }

    /// Matches `text` and returns the extracted variables.
    pub fn match_vars(&self, text: &str) -> Option<RouteVars> {
        let caps = self.captures(text)?;
        let mut vars = RouteVars::new();
        self.extract(&caps, &mut vars);
        Some(vars)
    }

    /// Builds a URL part by filling the reverse template.
    ///
    /// Every variable of the template must be present in `values`. The result
    /// is checked against the full regex first; only when that fails is each
    /// value checked against its own pattern to report the culprit.
    pub fn build(&self, values: &HashMap<&str, &str>) -> Result<String> {
        let ordered = self
            .var_names
            .iter()
            .map(|name| {
                values
                    .get(name.as_str())
                    .copied()
                    .ok_or_else(|| RouterError::MissingRouteVariable(name.clone()))
            })
            .collect::<Result<Vec<&str>>>()?;

        let mut url = String::new();
        for segment in &self.reverse {
            match segment {
                Segment::Literal(text) => url.push_str(text),
                Segment::Variable(index) => url.push_str(ordered[*index]),
            }
        }

        if !self.regex.is_match(&url) {
            for ((name, validator), value) in self
                .var_names
                .iter()
                .zip(&self.var_patterns)
                .zip(&ordered)
            {
                if !validator.is_match(value) {
                    return Err(RouterError::InvalidRouteVariable {
                        name: name.clone(),
                        value: (*value).to_string(),
                        pattern: validator.as_str().to_string(),
                    });
                }
            }
        }

        Ok(url)
    }
}

impl fmt::Display for RouteTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.template)
    }
}

/// Name of the capture group holding the n-th variable.
///
/// Patterns may declare their own named groups, so the prefix keeps clear of
/// ordinary identifiers like `v1`.
fn group_name(index: usize) -> String {
    format!("__mux_v{index}")
}

fn compile(template: &str, pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| RouterError::InvalidPattern {
        template: template.to_string(),
        message: e.to_string(),
    })
}

/// Returns the byte bounds `(start, end)` of each top-level `{...}` segment.
fn variable_bounds(template: &str) -> Result<Vec<(usize, usize)>> {
    let mut level = 0usize;
    let mut start = 0;
    let mut bounds = Vec::new();

    for (i, byte) in template.bytes().enumerate() {
        match byte {
            b'{' => {
                level += 1;
                if level == 1 {
                    start = i;
                }
            }
            b'}' => {
                level = level
                    .checked_sub(1)
                    .ok_or_else(|| RouterError::UnbalancedBraces(template.to_string()))?;
                if level == 0 {
                    bounds.push((start, i + 1));
                }
            }
            _ => {}
        }
    }

    if level != 0 {
        return Err(RouterError::UnbalancedBraces(template.to_string()));
    }
    Ok(bounds)
}
