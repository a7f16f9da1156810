//! Route derivation for deployed apps.
//!
//! The worker package reads its own route back out of `ENDPOINT_TO_HIT`,
//! so the format here must stay exactly `http://{name}.{domain}`.

use std::fmt;

/// Base URL of a deployed app. Built once, never recomputed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppRoute(String);

impl AppRoute {
    /// Derive the route for `name` on `domain`.
    pub fn new(name: &str, domain: &str) -> Self {
        Self(format!("http://{name}.{domain}"))
    }

    /// The bare route, with no trailing slash.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Append a path to the route.
    ///
    /// An empty path yields the bare route. A non-empty path without a
    /// leading `/` gets one inserted.
    pub fn with_path(&self, path: &str) -> String {
        if path.is_empty() {
            self.0.clone()
        } else if path.starts_with('/') {
            format!("{}{path}", self.0)
        } else {
            format!("{}/{path}", self.0)
        }
    }
}

impl fmt::Display for AppRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn route_matches_pattern() {
        let route = AppRoute::new("foo", "example.com");
        assert_eq!(route.as_str(), "http://foo.example.com");
        assert_eq!(route.to_string(), "http://foo.example.com");
    }

    #[test]
    fn route_is_deterministic() {
        assert_eq!(
            AppRoute::new("cedar-target-1", "bosh-lite.com"),
            AppRoute::new("cedar-target-1", "bosh-lite.com"),
        );
    }

    #[test]
    fn empty_path_has_no_trailing_slash() {
        let route = AppRoute::new("app", "domain");
        assert_eq!(route.with_path(""), "http://app.domain");
    }

    #[test]
    fn path_is_appended() {
        let route = AppRoute::new("app", "domain");
        assert_eq!(route.with_path("/stress"), "http://app.domain/stress");
        assert_eq!(route.with_path("stress"), "http://app.domain/stress");
        assert_eq!(route.with_path("/"), "http://app.domain/");
    }
}
