//! Actions with automatic category inference.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::route::Route;
use crate::state::{CardRecord, Section};

#[derive(tui_dispatch::Action, Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[action(infer_categories)]
pub enum Action {
    // ===== Page category =====
    /// Jump to the next listing page
    PageNext,

    /// Jump to the previous listing page
    PagePrev,

    /// Result: one listing page arrived
    PageDidLoad {
        section: Section,
        page: u32,
        total: u64,
        items: Vec<CardRecord>,
    },

    /// Result: listing page fetch failed
    PageDidError { section: Section, error: String },

    // ===== Search category =====
    /// Open the search input
    SearchOpen,

    /// Close the search input, keeping the active query
    SearchCommit,

    /// Close the search input and clear the query
    SearchCancel,

    /// Query text changed (every keystroke)
    SearchInput(String),

    /// Result: backend search resolved
    SearchDidLoad {
        section: Section,
        seq: u64,
        items: Vec<CardRecord>,
    },

    /// Result: backend search failed
    SearchDidError {
        section: Section,
        seq: u64,
        error: String,
    },

    // ===== Panel category =====
    /// Open the side panel for the record under the cursor
    PanelOpenPeek,

    /// Grow the peeking panel into the full detail view
    PanelExpand,

    /// Shrink the full view back to a peek on the same record
    PanelCollapse,

    /// Close the panel and return to the bare listing
    PanelClose,

    // ===== Detail category =====
    /// Result: detail record arrived for a route
    DetailDidLoad { route: Route, record: CardRecord },

    /// Result: detail fetch failed
    DetailDidError { route: Route, error: String },

    /// Result: a speculative preload resolved
    PreloadDidLoad { route: Route, record: CardRecord },

    /// Result: a speculative preload failed (silently dropped)
    PreloadDidError { route: Route, error: String },

    // ===== Section category =====
    /// Switch to the next record kind
    SectionNext,

    /// Switch to the previous record kind
    SectionPrev,

    // ===== Cursor category =====
    /// Move the grid cursor by a signed delta
    CursorMove(i16),

    // ===== Ui category =====
    /// Terminal was resized
    UiTerminalResize(u16, u16),

    // ===== Uncategorized (global) =====
    /// Load the initial view for the start route
    Init,

    /// Periodic tick driving the panel slide-in
    Tick,

    /// Exit the application
    Quit,
}
