//! Reducer - pure function: (state, action) -> DispatchResult

use tui_dispatch::DispatchResult;

use crate::action::Action;
use crate::effect::Effect;
use crate::grid::SearchPlan;
use crate::panel::{NavCommand, PanelMode, PANEL_ANIM_TICKS};
use crate::route::Route;
use crate::state::{AppState, Section, SectionView};

pub fn reducer(state: &mut AppState, action: Action) -> DispatchResult<Effect> {
    match action {
        // ===== Page actions =====
        Action::PageNext => step_page(state, 1),
        Action::PagePrev => step_page(state, -1),

        Action::PageDidLoad {
            section,
            page,
            total,
            items,
        } => {
            let view = &mut state.views[section.index()];
            view.grid.set_total(total);

            // The backend may know fewer pages than the requested
            // cursor; land on the last real page instead.
            let pages = view.grid.total_pages();
            if pages > 0 && page > pages {
                view.grid.set_page(pages);
                let query = view.grid.config().page_query(pages);
                if state.section == section {
                    let to = Route::list(section.base_path()).with_page(page_param(pages));
                    state.nav.begin(to);
                    state.nav.settle();
                }
                return DispatchResult::changed_with(Effect::FetchPage {
                    section,
                    page: pages,
                    query,
                });
            }

            view.grid.set_items(items);
            view.grid.is_loading = false;
            view.clamp_cursor();
            if state.nav.current().path == section.base_path() {
                let params = state.nav.current().list_params();
                view.grid.remember_list_params(&params);
            }
            let SectionView { grid, panel, .. } = view;
            panel.refresh(&state.nav, grid.items());
            state.status = None;
            DispatchResult::changed()
        }

        Action::PageDidError { section, error } => {
            let view = state.view_mut(section);
            view.grid.is_loading = false;
            state.status = Some(format!("{}: {error}", section.label()));
            DispatchResult::changed()
        }

        // ===== Search actions =====
        Action::SearchOpen => {
            if state.search_open {
                return DispatchResult::unchanged();
            }
            state.search_open = true;
            DispatchResult::changed()
        }

        Action::SearchCommit => {
            state.search_open = false;
            DispatchResult::changed()
        }

        Action::SearchCancel => {
            state.search_open = false;
            let section = state.section;
            let view = state.current_view_mut();
            view.grid.clear_search();
            view.clamp_cursor();
            DispatchResult::changed_with(Effect::CancelSearch { section })
        }

        Action::SearchInput(query) => {
            let section = state.section;
            let view = state.current_view_mut();
            let plan = view.grid.search(&query);
            view.clamp_cursor();
            let effect = match plan {
                SearchPlan::Fetch { query, seq } => Effect::SearchRecords {
                    section,
                    query: view.grid.config().search_query(&query),
                    seq,
                    debounce_ms: view.grid.config().search_debounce_ms,
                },
                SearchPlan::Cancel => Effect::CancelSearch { section },
            };
            DispatchResult::changed_with(effect)
        }

        Action::SearchDidLoad {
            section,
            seq,
            items,
        } => {
            let view = &mut state.views[section.index()];
            if !view.grid.apply_search_results(seq, items) {
                return DispatchResult::unchanged();
            }
            view.cursor = 0;
            let SectionView { grid, panel, .. } = view;
            panel.refresh(&state.nav, grid.items());
            DispatchResult::changed()
        }

        // Search failures leave the previous items on screen; only the
        // searching flag settles.
        Action::SearchDidError { section, seq, .. } => {
            let view = state.view_mut(section);
            if view.grid.finish_search(seq) {
                DispatchResult::changed()
            } else {
                DispatchResult::unchanged()
            }
        }

        // ===== Panel actions =====
        Action::PanelOpenPeek => {
            let narrow = state.is_narrow();
            let view = &mut state.views[state.section.index()];
            let Some(item) = view.selected().cloned() else {
                return DispatchResult::unchanged();
            };
            let cmd = view.panel.open_peek(item, &state.nav, narrow);
            apply_nav(state, cmd)
        }

        Action::PanelExpand => {
            let view = state.current_view();
            match view.panel.expand(&state.nav) {
                Some(cmd) => apply_nav(state, cmd),
                None => DispatchResult::unchanged(),
            }
        }

        Action::PanelCollapse => {
            let view = state.current_view();
            match view.panel.collapse(&state.nav) {
                Some(cmd) => apply_nav(state, cmd),
                None => DispatchResult::unchanged(),
            }
        }

        Action::PanelClose => {
            let cmd = {
                let nav = state.nav.clone();
                state.current_view_mut().panel.close(&nav)
            };
            apply_nav(state, cmd)
        }

        // ===== Detail actions =====
        Action::DetailDidLoad { route, record } => {
            state.preloaded.insert(route.path.clone(), record.clone());
            let Some(section) = Section::of_path(&route.path) else {
                return DispatchResult::changed();
            };
            let pending_here = state
                .nav
                .pending()
                .is_some_and(|to| to.path == route.path);
            let current_here = state.nav.current().path == route.path;

            if pending_here {
                state.nav.settle();
            } else if !current_here {
                // Arrived for a route we already left.
                return DispatchResult::changed();
            }
            let view = &mut state.views[section.index()];
            let SectionView { grid, panel, .. } = view;
            panel.set_full_item(Some(record));
            panel.refresh(&state.nav, grid.items());
            DispatchResult::changed()
        }

        Action::DetailDidError { route, error } => {
            let pending_here = state
                .nav
                .pending()
                .is_some_and(|to| to.path == route.path);
            if !pending_here {
                return DispatchResult::unchanged();
            }
            state.nav.abort();
            state.panel_anim_ticks = 0;
            state.status = Some(error);
            DispatchResult::changed()
        }

        Action::PreloadDidLoad { route, record } => {
            state.preloaded.insert(route.path, record);
            DispatchResult::changed()
        }

        // Preloads are speculative; a failure costs one later fetch.
        Action::PreloadDidError { .. } => DispatchResult::unchanged(),

        // ===== Section actions =====
        Action::SectionNext => switch_section(state, state.section.next()),
        Action::SectionPrev => switch_section(state, state.section.prev()),

        // ===== Cursor actions =====
        Action::CursorMove(delta) => {
            let view = state.current_view_mut();
            let len = view.grid.items().len();
            if len == 0 {
                return DispatchResult::unchanged();
            }
            let target = (view.cursor as i32 + delta as i32).clamp(0, len as i32 - 1) as usize;
            if target == view.cursor {
                return DispatchResult::unchanged();
            }
            view.cursor = target;
            DispatchResult::changed()
        }

        // ===== Ui actions =====
        Action::UiTerminalResize(width, height) => {
            state.terminal_size = (width, height);
            DispatchResult::changed()
        }

        // ===== Global actions =====
        Action::Init => {
            let route = state.nav.current().clone();
            let section = state.section;
            let mut effects = Vec::new();

            let view = state.view_mut(section);
            if let Some(page) = route.page {
                view.grid.set_page(page.max(1));
            }
            let page = view.grid.current_page();
            view.grid.is_loading = true;
            view.grid.remember_list_params(&route.list_params());
            effects.push(Effect::FetchPage {
                section,
                page,
                query: view.grid.config().page_query(page),
            });

            // Deep link straight onto a detail route.
            if route.is_detail_of(section.base_path()) {
                effects.push(Effect::FetchDetail { route });
            }

            DispatchResult::changed_with_many(effects)
        }

        Action::Tick => {
            if state.panel_anim_ticks > 0 {
                state.panel_anim_ticks -= 1;
                DispatchResult::changed()
            } else {
                DispatchResult::unchanged()
            }
        }

        Action::Quit => DispatchResult::unchanged(),
    }
}

fn page_param(page: u32) -> Option<u32> {
    (page > 1).then_some(page)
}

fn step_page(state: &mut AppState, delta: i32) -> DispatchResult<Effect> {
    let section = state.section;
    let view = state.current_view_mut();
    let max = view.grid.total_pages().max(1);
    let target = (view.grid.current_page() as i32 + delta).clamp(1, max as i32) as u32;
    if target == view.grid.current_page() {
        return DispatchResult::unchanged();
    }

    view.grid.set_page(target);
    view.grid.is_loading = true;
    let query = view.grid.config().page_query(target);

    // Page links carry no focus, so an open peek closes here.
    let to = Route::list(section.base_path()).with_page(page_param(target));
    state.nav.begin(to);
    state.nav.settle();
    let params = state.nav.current().list_params();
    state.views[section.index()]
        .grid
        .remember_list_params(&params);
    state.panel_anim_ticks = 0;

    DispatchResult::changed_with(Effect::FetchPage {
        section,
        page: target,
        query,
    })
}

fn switch_section(state: &mut AppState, to: Section) -> DispatchResult<Effect> {
    state.section = to;
    state.search_open = false;
    state.panel_anim_ticks = 0;

    let page = state.view(to).grid.current_page();
    let route = Route::list(to.base_path()).with_page(page_param(page));
    state.nav.begin(route);
    state.nav.settle();
    let params = state.nav.current().list_params();
    let view = &mut state.views[to.index()];
    view.grid.remember_list_params(&params);

    if view.grid.items().is_empty() && !view.grid.is_loading {
        view.grid.is_loading = true;
        let query = view.grid.config().page_query(page);
        return DispatchResult::changed_with(Effect::FetchPage {
            section: to,
            page,
            query,
        });
    }
    DispatchResult::changed()
}

/// Perform a navigation the panel asked for. Query-only targets settle
/// immediately; detail targets stay pending until their record arrives
/// (or is already cached), which is what keeps the panel full during
/// the transition.
fn apply_nav(state: &mut AppState, cmd: NavCommand) -> DispatchResult<Effect> {
    let section = state.section;
    let mut effects = Vec::new();

    let is_detail = cmd.to.is_detail_of(section.base_path());
    state.nav.begin(cmd.to.clone());

    if is_detail {
        if let Some(record) = state.preloaded.get(&cmd.to.path).cloned() {
            let view = &mut state.views[section.index()];
            view.panel.set_full_item(Some(record));
            state.nav.settle();
        } else if state.nav.is_navigating() {
            effects.push(Effect::FetchDetail {
                route: cmd.to.clone(),
            });
        }
    } else {
        state.nav.settle();
        let params = state.nav.current().list_params();
        let view = &mut state.views[section.index()];
        view.panel.set_full_item(None);
        view.grid.remember_list_params(&params);
    }

    if let Some(preload) = cmd.preload {
        if !state.preloaded.contains_key(&preload.path) {
            effects.push(Effect::PreloadDetail { route: preload });
        }
    }

    let view = &mut state.views[section.index()];
    let SectionView { grid, panel, .. } = view;
    panel.refresh(&state.nav, grid.items());

    let open = panel.mode(&state.nav) != PanelMode::Closed;
    state.panel_anim_ticks = if cmd.animate && open { PANEL_ANIM_TICKS } else { 0 };

    DispatchResult::changed_with_many(effects)
}
