//! Route model - the URL contract shared by grids and panels.
//!
//! A route is a path plus the two query parameters the app round-trips
//! through every navigation: `page` (1-based page number) and `focus`
//! (entity id for the peek panel). Parameters at their absent value are
//! omitted from the serialized form, never written as empty strings.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub const PAGE_PARAM: &str = "page";
pub const FOCUS_PARAM: &str = "focus";

/// Build a query string from key/value pairs, skipping empty values and
/// percent-encoding both sides.
pub fn build_query(pairs: &[(String, String)]) -> String {
    pairs
        .iter()
        .filter(|(_, value)| !value.is_empty())
        .map(|(key, value)| {
            format!(
                "{}={}",
                urlencoding::encode(key),
                urlencoding::encode(value)
            )
        })
        .collect::<Vec<_>>()
        .join("&")
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Route {
    pub path: String,
    pub page: Option<u32>,
    pub focus: Option<String>,
}

impl Route {
    pub fn list(base: &str) -> Self {
        Self {
            path: base.to_string(),
            page: None,
            focus: None,
        }
    }

    pub fn detail(base: &str, id: &str) -> Self {
        Self {
            path: format!("{base}/{id}"),
            page: None,
            focus: None,
        }
    }

    pub fn with_page(mut self, page: Option<u32>) -> Self {
        self.page = page;
        self
    }

    pub fn with_focus(mut self, id: &str) -> Self {
        self.focus = Some(id.to_string());
        self
    }

    /// The detail id when this route is `{base}/{id}`.
    pub fn detail_id(&self, base: &str) -> Option<&str> {
        let rest = self.path.strip_prefix(base)?.strip_prefix('/')?;
        (!rest.is_empty() && !rest.contains('/')).then_some(rest)
    }

    pub fn is_detail_of(&self, base: &str) -> bool {
        self.detail_id(base).is_some()
    }

    /// Query-string part of the serialized route; empty when no
    /// parameter is set.
    pub fn query_string(&self) -> String {
        let mut pairs = Vec::new();
        if let Some(page) = self.page {
            pairs.push((PAGE_PARAM.to_string(), page.to_string()));
        }
        if let Some(focus) = &self.focus {
            pairs.push((FOCUS_PARAM.to_string(), focus.clone()));
        }
        build_query(&pairs)
    }

    /// List-view parameters only (`focus` is panel state, not part of
    /// the list view a "back to list" link should restore).
    pub fn list_params(&self) -> String {
        let mut pairs = Vec::new();
        if let Some(page) = self.page {
            pairs.push((PAGE_PARAM.to_string(), page.to_string()));
        }
        build_query(&pairs)
    }

    pub fn href(&self) -> String {
        let query = self.query_string();
        if query.is_empty() {
            self.path.clone()
        } else {
            format!("{}?{}", self.path, query)
        }
    }

    pub fn parse(href: &str) -> Self {
        let (path, query) = match href.split_once('?') {
            Some((path, query)) => (path, query),
            None => (href, ""),
        };
        let mut route = Route::list(path);
        for pair in query.split('&').filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            let value = urlencoding::decode(value)
                .map(|v| v.into_owned())
                .unwrap_or_else(|_| value.to_string());
            match key {
                PAGE_PARAM => route.page = value.parse().ok(),
                FOCUS_PARAM if !value.is_empty() => route.focus = Some(value),
                _ => {}
            }
        }
        route
    }
}

/// Current URL plus the in-flight client navigation target, the two
/// ambient inputs the panel mode derivation reads.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct NavState {
    current: Route,
    pending: Option<Route>,
}

impl NavState {
    pub fn new(start: Route) -> Self {
        Self {
            current: start,
            pending: None,
        }
    }

    pub fn current(&self) -> &Route {
        &self.current
    }

    pub fn pending(&self) -> Option<&Route> {
        self.pending.as_ref()
    }

    pub fn is_navigating(&self) -> bool {
        self.pending.is_some()
    }

    /// Start a client-side navigation. A later `settle` promotes the
    /// target; starting another navigation replaces the target.
    pub fn begin(&mut self, to: Route) {
        if to == self.current {
            self.pending = None;
        } else {
            self.pending = Some(to);
        }
    }

    pub fn settle(&mut self) {
        if let Some(to) = self.pending.take() {
            self.current = to;
        }
    }

    /// Abandon the in-flight navigation and stay on the current route.
    pub fn abort(&mut self) {
        self.pending = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_href_omits_absent_params() {
        assert_eq!(Route::list("/pokemon").href(), "/pokemon");
        assert_eq!(
            Route::list("/pokemon").with_page(Some(2)).href(),
            "/pokemon?page=2"
        );
        assert_eq!(
            Route::list("/pokemon").with_page(Some(2)).with_focus("25").href(),
            "/pokemon?page=2&focus=25"
        );
        assert_eq!(Route::detail("/pokemon", "25").href(), "/pokemon/25");
    }

    #[test]
    fn test_parse_round_trip() {
        for href in ["/moves", "/moves?page=3", "/items?page=2&focus=17", "/articles/9"] {
            assert_eq!(Route::parse(href).href(), href);
        }
    }

    #[test]
    fn test_parse_ignores_unknown_and_empty_params() {
        let route = Route::parse("/pokemon?sort=name&focus=&page=4");
        assert_eq!(route.page, Some(4));
        assert_eq!(route.focus, None);
    }

    #[test]
    fn test_detail_id() {
        let detail = Route::detail("/pokemon", "25");
        assert_eq!(detail.detail_id("/pokemon"), Some("25"));
        assert!(detail.is_detail_of("/pokemon"));
        assert!(!detail.is_detail_of("/moves"));
        assert!(!Route::list("/pokemon").is_detail_of("/pokemon"));
        // Deeper paths are not detail routes of this base.
        let nested = Route::parse("/pokemon/25/edit");
        assert_eq!(nested.detail_id("/pokemon"), None);
    }

    #[test]
    fn test_build_query_encodes_and_skips_empty() {
        let pairs = vec![
            ("name".to_string(), "mr. mime".to_string()),
            ("empty".to_string(), String::new()),
            ("limit".to_string(), "100".to_string()),
        ];
        assert_eq!(build_query(&pairs), "name=mr.%20mime&limit=100");
    }

    #[test]
    fn test_nav_begin_settle_abort() {
        let mut nav = NavState::new(Route::list("/pokemon"));
        assert!(!nav.is_navigating());

        nav.begin(Route::detail("/pokemon", "25"));
        assert!(nav.is_navigating());
        assert_eq!(nav.current().path, "/pokemon");

        nav.settle();
        assert!(!nav.is_navigating());
        assert_eq!(nav.current().path, "/pokemon/25");

        nav.begin(Route::list("/pokemon"));
        nav.abort();
        assert_eq!(nav.current().path, "/pokemon/25");
        assert!(!nav.is_navigating());
    }

    #[test]
    fn test_nav_to_same_route_is_noop() {
        let mut nav = NavState::new(Route::list("/pokemon"));
        nav.begin(Route::list("/pokemon"));
        assert!(!nav.is_navigating());
    }
}
