//! Side effects declared by the reducer and executed in main's
//! effect handler.

use crate::route::Route;
use crate::state::Section;

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Fetch one listing page. `query` is the prebuilt query string.
    FetchPage {
        section: Section,
        page: u32,
        query: String,
    },
    /// Debounced backend search. `seq` fences the response against
    /// later searches.
    SearchRecords {
        section: Section,
        query: String,
        seq: u64,
        debounce_ms: u64,
    },
    /// Drop any pending debounced search for this section.
    CancelSearch { section: Section },
    /// Fetch the record behind a detail route the user navigated to.
    FetchDetail { route: Route },
    /// Warm the cache for a detail route the user is likely to open.
    PreloadDetail { route: Route },
}
