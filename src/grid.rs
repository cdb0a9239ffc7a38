//! Paginated, searchable grid container - one instance per entity
//! endpoint.
//!
//! The container holds one page of records plus an optional set of
//! backend search results. The displayed items are derived: search
//! results while a non-empty search is active, the page cache
//! otherwise. Search is planned here and executed by the effect layer
//! through a debounced task; every scheduled search carries a
//! monotonic token so a slow early response can never overwrite a
//! newer one.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::route;

pub const DEFAULT_PAGE_SIZE: u32 = 24;
pub const DEFAULT_SEARCH_DEBOUNCE_MS: u64 = 300;
pub const SEARCH_RESULT_LIMIT: u32 = 100;

/// Fixed per-endpoint settings, merged into every request the grid
/// issues.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct GridConfig {
    pub api_endpoint: String,
    pub page_size: u32,
    pub query_params: Vec<(String, String)>,
    pub search_param: String,
    pub search_debounce_ms: u64,
}

impl GridConfig {
    pub fn new(api_endpoint: impl Into<String>) -> Self {
        Self {
            api_endpoint: api_endpoint.into(),
            page_size: DEFAULT_PAGE_SIZE,
            query_params: Vec::new(),
            search_param: "name".to_string(),
            search_debounce_ms: DEFAULT_SEARCH_DEBOUNCE_MS,
        }
    }

    pub fn with_query_param(mut self, key: &str, value: &str) -> Self {
        self.query_params.push((key.to_string(), value.to_string()));
        self
    }

    pub fn with_search_param(mut self, param: &str) -> Self {
        self.search_param = param.to_string();
        self
    }

    /// Query string for one page of the unsearched listing.
    pub fn page_query(&self, page: u32) -> String {
        let offset = page.saturating_sub(1).saturating_mul(self.page_size);
        let mut pairs = self.query_params.clone();
        pairs.push(("limit".to_string(), self.page_size.to_string()));
        pairs.push(("offset".to_string(), offset.to_string()));
        route::build_query(&pairs)
    }

    /// Query string for a backend search: static params, the search
    /// field, and a flat result limit.
    pub fn search_query(&self, query: &str) -> String {
        let mut pairs = self.query_params.clone();
        pairs.push((self.search_param.clone(), query.to_string()));
        pairs.push(("limit".to_string(), SEARCH_RESULT_LIMIT.to_string()));
        route::build_query(&pairs)
    }
}

/// What the effect layer should do after a `search` call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SearchPlan {
    /// Schedule a debounced backend search carrying this fence token.
    Fetch { query: String, seq: u64 },
    /// Cancel any pending debounced search; the clear itself was
    /// applied synchronously.
    Cancel,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct GridData<T> {
    page_items: Vec<T>,
    search_results: Option<Vec<T>>,
    pub is_loading: bool,
    is_searching: bool,
    search_query: String,
    current_page: u32,
    total_count: u64,
    list_params: String,
    search_seq: u64,
    config: GridConfig,
}

impl<T> GridData<T> {
    pub fn new(initial_items: Vec<T>, total_count: u64, current_page: u32, config: GridConfig) -> Self {
        Self {
            page_items: initial_items,
            search_results: None,
            is_loading: false,
            is_searching: false,
            search_query: String::new(),
            current_page,
            total_count,
            list_params: String::new(),
            search_seq: 0,
            config,
        }
    }

    /// Displayed items: search results while a non-empty search has
    /// resolved, the loaded page otherwise.
    pub fn items(&self) -> &[T] {
        match &self.search_results {
            Some(results) if !self.search_query.is_empty() => results,
            _ => &self.page_items,
        }
    }

    pub fn is_searching(&self) -> bool {
        self.is_searching
    }

    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn total_pages(&self) -> u32 {
        let size = self.config.page_size.max(1) as u64;
        self.total_count.div_ceil(size) as u32
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn set_page_size(&mut self, page_size: u32) {
        self.config.page_size = page_size.max(1);
    }

    /// Pure cursor update; the page reload travels through navigation
    /// and lands in `set_items`.
    pub fn set_page(&mut self, page: u32) {
        self.current_page = page;
    }

    pub fn set_total(&mut self, total: u64) {
        self.total_count = total;
    }

    /// Replace the loaded page, unless a search is active - a stale
    /// page response must not clobber visible search results.
    pub fn set_items(&mut self, items: Vec<T>) {
        if self.search_query.is_empty() {
            self.page_items = items;
        }
    }

    /// Record the query and plan the follow-up. An empty query clears
    /// synchronously; anything else bumps the fence token and asks for
    /// a debounced fetch.
    pub fn search(&mut self, query: &str) -> SearchPlan {
        self.search_query = query.to_string();
        self.search_seq += 1;

        if query.trim().is_empty() {
            self.search_results = None;
            self.is_searching = false;
            return SearchPlan::Cancel;
        }

        self.is_searching = true;
        SearchPlan::Fetch {
            query: query.to_string(),
            seq: self.search_seq,
        }
    }

    pub fn clear_search(&mut self) -> SearchPlan {
        self.search_query.clear();
        self.search_results = None;
        self.is_searching = false;
        self.search_seq += 1;
        SearchPlan::Cancel
    }

    /// Apply a resolved search. Returns false for responses that lost
    /// the fence (superseded or cleared in the meantime).
    pub fn apply_search_results(&mut self, seq: u64, items: Vec<T>) -> bool {
        if seq != self.search_seq || self.search_query.is_empty() {
            return false;
        }
        self.search_results = Some(items);
        self.is_searching = false;
        true
    }

    /// Settle the searching flag without results (the error path).
    /// Prior items stay untouched.
    pub fn finish_search(&mut self, seq: u64) -> bool {
        if seq != self.search_seq || !self.is_searching {
            return false;
        }
        self.is_searching = false;
        true
    }

    /// Snapshot of the last list-view query string, so a "back to
    /// list" link reproduces the exact view.
    pub fn remember_list_params(&mut self, params: &str) {
        self.list_params = params.to_string();
    }

    pub fn list_params(&self) -> &str {
        &self.list_params
    }

    pub fn return_href(&self, base: &str) -> String {
        if self.list_params.is_empty() {
            base.to_string()
        } else {
            format!("{}?{}", base, self.list_params)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn grid_of(count: usize, total: u64) -> GridData<u32> {
        let items = (1..=count as u32).collect();
        GridData::new(items, total, 1, GridConfig::new("/pokemon"))
    }

    #[test]
    fn test_total_pages_ceiling() {
        // 100 records at the default page size of 24 -> 5 pages.
        assert_eq!(grid_of(24, 100).total_pages(), 5);
        assert_eq!(grid_of(24, 96).total_pages(), 4);
        assert_eq!(grid_of(0, 0).total_pages(), 0);
    }

    #[test]
    fn test_set_page_is_pure_cursor() {
        let mut grid = grid_of(24, 100);
        let before: Vec<u32> = grid.items().to_vec();
        grid.set_page(3);
        assert_eq!(grid.current_page(), 3);
        assert_eq!(grid.items(), before);
        grid.set_page(99);
        assert_eq!(grid.current_page(), 99);
    }

    #[test]
    fn test_search_plans_fetch_with_rising_seq() {
        let mut grid = grid_of(3, 3);
        let first = grid.search("pika");
        let second = grid.search("pikachu");
        match (first, second) {
            (SearchPlan::Fetch { seq: a, .. }, SearchPlan::Fetch { query, seq: b }) => {
                assert_eq!(query, "pikachu");
                assert!(b > a);
            }
            other => panic!("expected two fetch plans, got {other:?}"),
        }
        assert!(grid.is_searching());
    }

    #[test]
    fn test_empty_query_clears_synchronously() {
        let mut grid = grid_of(3, 3);
        grid.search("pika");
        grid.apply_search_results(grid.search_seq, vec![99]);
        assert_eq!(grid.items(), &[99]);

        let plan = grid.search("");
        assert_eq!(plan, SearchPlan::Cancel);
        assert!(!grid.is_searching());
        // Pre-search page set restored.
        assert_eq!(grid.items(), &[1, 2, 3]);
    }

    #[test]
    fn test_whitespace_query_counts_as_empty() {
        let mut grid = grid_of(2, 2);
        assert_eq!(grid.search("   "), SearchPlan::Cancel);
        assert!(!grid.is_searching());
        assert_eq!(grid.search_query(), "   ");
    }

    #[test]
    fn test_set_items_guarded_while_searching() {
        let mut grid = grid_of(3, 3);
        grid.search("pika");
        grid.apply_search_results(grid.search_seq, vec![25]);

        grid.set_items(vec![7, 8, 9]);
        assert_eq!(grid.items(), &[25], "page load must not clobber search results");

        grid.clear_search();
        grid.set_items(vec![7, 8, 9]);
        assert_eq!(grid.items(), &[7, 8, 9]);
    }

    #[test]
    fn test_stale_search_response_is_fenced_out() {
        let mut grid = grid_of(3, 3);
        let SearchPlan::Fetch { seq: old_seq, .. } = grid.search("pika") else {
            panic!("expected fetch plan");
        };
        let SearchPlan::Fetch { seq: new_seq, .. } = grid.search("pikachu") else {
            panic!("expected fetch plan");
        };

        // The slow earlier request resolves after the newer one.
        assert!(grid.apply_search_results(new_seq, vec![25]));
        assert!(!grid.apply_search_results(old_seq, vec![1]));
        assert_eq!(grid.items(), &[25]);
    }

    #[test]
    fn test_response_after_clear_is_discarded() {
        let mut grid = grid_of(3, 3);
        let SearchPlan::Fetch { seq, .. } = grid.search("pika") else {
            panic!("expected fetch plan");
        };
        grid.clear_search();
        assert!(!grid.apply_search_results(seq, vec![25]));
        assert_eq!(grid.items(), &[1, 2, 3]);
        assert!(!grid.is_searching());
    }

    #[test]
    fn test_finish_search_settles_error_path() {
        let mut grid = grid_of(3, 3);
        let SearchPlan::Fetch { seq, .. } = grid.search("pika") else {
            panic!("expected fetch plan");
        };
        assert!(grid.finish_search(seq));
        assert!(!grid.is_searching());
        // Items untouched by the failure.
        assert_eq!(grid.items(), &[1, 2, 3]);
        // Stale settle is ignored.
        assert!(!grid.finish_search(seq));
    }

    #[test]
    fn test_query_strings_merge_static_params() {
        let config = GridConfig::new("/pokemon")
            .with_query_param("includeTypes", "true")
            .with_search_param("name");
        assert_eq!(
            config.page_query(3),
            "includeTypes=true&limit=24&offset=48"
        );
        assert_eq!(
            config.search_query("mew"),
            "includeTypes=true&name=mew&limit=100"
        );
    }

    #[test]
    fn test_return_href_reproduces_list_view() {
        let mut grid = grid_of(1, 1);
        assert_eq!(grid.return_href("/moves"), "/moves");
        grid.remember_list_params("page=3");
        assert_eq!(grid.return_href("/moves"), "/moves?page=3");
    }
}
