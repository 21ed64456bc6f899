//! Route predicates for the unconditional JSON record.
//!
//! # Design Decisions
//! - Predicates see the request URL (path and query) as a string
//! - Path prefix matching is case-sensitive
//! - Any closure `Fn(&str) -> bool` is a filter
//! - No regex to guarantee O(n) matching

/// Decides whether a URL gets an unconditional JSON record.
pub trait RouteFilter: Send + Sync {
    /// Returns true if the URL matches this condition.
    fn matches(&self, url: &str) -> bool;
}

impl<F> RouteFilter for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn matches(&self, url: &str) -> bool {
        self(url)
    }
}

/// Matches URLs starting with any of the configured prefixes.
#[derive(Debug, Clone)]
pub struct PathPrefixFilter {
    prefixes: Vec<String>,
}

impl PathPrefixFilter {
    /// Create a new path prefix filter. Empty prefixes are dropped,
    /// so an empty list matches nothing.
    pub fn new<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            prefixes: prefixes
                .into_iter()
                .map(Into::into)
                .filter(|p: &String| !p.is_empty())
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.prefixes.is_empty()
    }
}

impl RouteFilter for PathPrefixFilter {
    fn matches(&self, url: &str) -> bool {
        self.prefixes.iter().any(|p| url.starts_with(p.as_str()))
    }
}
