//! Detail-panel state machine: closed / peek / full.
//!
//! The mode is never stored. It is derived from the current route, the
//! in-flight navigation target and nothing else, so it can not drift
//! out of sync with the URL. The struct only owns a one-slot item
//! cache (so the panel keeps showing something while a detail fetch is
//! in flight) and the full record a detail route supplied.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::route::{NavState, Route};

/// Terminal widths below this treat a peek request as a full open,
/// like the original's mobile breakpoint.
pub const NARROW_COLS: u16 = 90;

/// Slide-in length for a fresh panel open, in ticks.
pub const PANEL_ANIM_TICKS: u16 = 6;

/// Stable identifier, stringified the way it appears in a route.
pub trait Ident {
    fn ident(&self) -> String;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum PanelMode {
    Closed,
    Peek,
    Full,
}

/// A navigation the panel wants performed, plus an optional
/// cache-warming preload and whether the transition should animate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NavCommand {
    pub to: Route,
    pub preload: Option<Route>,
    pub animate: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PanelState<T> {
    base_path: String,
    cached: Option<T>,
    full_item: Option<T>,
}

impl<T: Ident + Clone> PanelState<T> {
    pub fn new(base_path: &str) -> Self {
        Self {
            base_path: base_path.to_string(),
            cached: None,
            full_item: None,
        }
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    pub fn is_detail_route(&self, nav: &NavState) -> bool {
        nav.current().is_detail_of(&self.base_path)
    }

    pub fn is_navigating(&self, nav: &NavState) -> bool {
        nav.pending()
            .is_some_and(|to| to.is_detail_of(&self.base_path))
    }

    fn is_navigating_away(&self, nav: &NavState) -> bool {
        nav.pending()
            .is_some_and(|to| to.path == self.base_path && to.focus.is_none())
    }

    pub fn focus_id<'a>(&self, nav: &'a NavState) -> Option<&'a str> {
        nav.current().focus.as_deref()
    }

    fn navigating_id<'a>(&self, nav: &'a NavState) -> Option<&'a str> {
        nav.pending()?.detail_id(&self.base_path)
    }

    /// Pure derivation. Precedence: a navigation back to the bare
    /// listing closes the panel before it lands; the detail route (or
    /// a navigation toward it) wins over a lingering focus parameter.
    pub fn mode(&self, nav: &NavState) -> PanelMode {
        if self.is_navigating_away(nav) {
            PanelMode::Closed
        } else if self.is_detail_route(nav) || self.is_navigating(nav) {
            PanelMode::Full
        } else if self.focus_id(nav).is_some() {
            PanelMode::Peek
        } else {
            PanelMode::Closed
        }
    }

    pub fn active_item(&self) -> Option<&T> {
        self.cached.as_ref()
    }

    pub fn active_id(&self) -> Option<String> {
        self.cached.as_ref().map(Ident::ident)
    }

    pub fn full_item(&self) -> Option<&T> {
        self.full_item.as_ref()
    }

    pub fn set_full_item(&mut self, item: Option<T>) {
        self.full_item = item;
    }

    /// Recompute the active item from the latest navigation snapshot
    /// and item list. The navigation target resolves first so the
    /// destination entity shows immediately during a transition; any
    /// non-null resolution overwrites the one-slot cache.
    pub fn refresh(&mut self, nav: &NavState, items: &[T]) {
        if let Some(item) = self.resolve(nav, items) {
            self.cached = Some(item);
        }
    }

    fn resolve(&self, nav: &NavState, items: &[T]) -> Option<T> {
        if let Some(id) = self.navigating_id(nav) {
            if let Some(item) = find_by_id(items, id) {
                return Some(item.clone());
            }
        }
        if self.is_detail_route(nav) {
            let from_list = nav
                .current()
                .detail_id(&self.base_path)
                .and_then(|id| find_by_id(items, id));
            return from_list.cloned().or_else(|| self.full_item.clone());
        }
        self.focus_id(nav).and_then(|id| find_by_id(items, id)).cloned()
    }

    /// Cache the item and navigate: straight to the detail route on
    /// narrow screens, otherwise set the focus parameter and warm the
    /// detail route for a likely `expand`. The `page` parameter rides
    /// along either way.
    pub fn open_peek(&mut self, item: T, nav: &NavState, narrow: bool) -> NavCommand {
        let id = item.ident();
        self.cached = Some(item);
        let page = nav.current().page;

        if narrow {
            let to = Route::detail(&self.base_path, &id).with_page(page);
            return self.command(nav, to, None);
        }

        let to = Route::list(&self.base_path).with_page(page).with_focus(&id);
        let preload = Route::detail(&self.base_path, &id);
        self.command(nav, to, Some(preload))
    }

    /// Peek to full. No resolvable id means no-op.
    pub fn expand(&self, nav: &NavState) -> Option<NavCommand> {
        let id = self
            .focus_id(nav)
            .map(str::to_string)
            .or_else(|| self.active_id())?;
        let to = Route::detail(&self.base_path, &id).with_page(nav.current().page);
        Some(self.command(nav, to, None))
    }

    /// Full back to peek on the same entity, never straight to closed.
    pub fn collapse(&self, nav: &NavState) -> Option<NavCommand> {
        let id = nav
            .current()
            .detail_id(&self.base_path)
            .map(str::to_string)
            .or_else(|| self.active_id())?;
        let to = Route::list(&self.base_path)
            .with_page(nav.current().page)
            .with_focus(&id);
        Some(self.command(nav, to, None))
    }

    /// Drop the cached item and return to the bare listing, keeping
    /// only the `page` parameter.
    pub fn close(&mut self, nav: &NavState) -> NavCommand {
        self.cached = None;
        self.full_item = None;
        let to = Route::list(&self.base_path).with_page(nav.current().page);
        self.command(nav, to, None)
    }

    fn command(&self, nav: &NavState, to: Route, preload: Option<Route>) -> NavCommand {
        let animate = !continues(nav.current(), &to, &self.base_path);
        NavCommand { to, preload, animate }
    }
}

/// Whether a navigation continues an already-open panel on the same
/// logical entity (detail back to the list peeking that id, or the
/// list into a detail route), in which case the open/close transition
/// is skipped.
pub fn continues(from: &Route, to: &Route, base: &str) -> bool {
    if let Some(from_id) = from.detail_id(base) {
        if to.focus.as_deref() == Some(from_id) {
            return true;
        }
    }
    to.is_detail_of(base) && from.path == base
}

fn find_by_id<'a, T: Ident>(items: &'a [T], id: &str) -> Option<&'a T> {
    items.iter().find(|item| item.ident() == id)
}
