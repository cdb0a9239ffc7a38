//! Integrated flows through the EffectStoreTestHarness: dispatch,
//! effect assertions and simulated async completions.

use dexgrid::{
    action::Action,
    effect::Effect,
    panel::PanelMode,
    reducer::reducer,
    route::Route,
    state::{AppState, CardRecord, MoveSummary, PokemonSummary, Section},
};
use tui_dispatch::testing::*;

fn pokemon(id: u32, name: &str) -> CardRecord {
    CardRecord::Pokemon(PokemonSummary {
        id,
        slug: name.to_lowercase(),
        name: name.to_string(),
        generation: Some(1),
        types: Vec::new(),
        description: None,
    })
}

fn attack(id: u32, name: &str) -> CardRecord {
    CardRecord::Move(MoveSummary {
        id,
        slug: name.to_lowercase(),
        name: name.to_string(),
        move_type: Some("normal".to_string()),
        power: Some(40),
        accuracy: Some(100),
        pp: Some(35),
        description: None,
    })
}

fn loaded_harness() -> EffectStoreTestHarness<AppState, Action, Effect> {
    let mut harness = EffectStoreTestHarness::new(AppState::default(), reducer);
    harness.dispatch_collect(Action::Init);
    harness.drain_effects();
    harness.dispatch_collect(Action::PageDidLoad {
        section: Section::Pokemon,
        page: 1,
        total: 100,
        items: vec![pokemon(25, "Pikachu"), pokemon(26, "Raichu")],
    });
    harness
}

#[test]
fn test_page_fetch_flow() {
    let mut harness = EffectStoreTestHarness::new(AppState::default(), reducer);

    harness.dispatch_collect(Action::Init);
    harness.assert_state(|s| s.current_view().grid.is_loading);

    let effects = harness.drain_effects();
    effects.effects_count(1);
    effects.effects_first_matches(|e| matches!(e, Effect::FetchPage { page: 1, .. }));

    harness.complete_action(Action::PageDidLoad {
        section: Section::Pokemon,
        page: 1,
        total: 48,
        items: vec![pokemon(25, "Pikachu")],
    });
    let (changed, total) = harness.process_emitted();
    assert_eq!(total, 1);
    assert_eq!(changed, 1);

    harness.assert_state(|s| !s.current_view().grid.is_loading);
    harness.assert_state(|s| s.current_view().grid.total_pages() == 2);
}

#[test]
fn test_debounced_search_fencing() {
    let mut harness = loaded_harness();
    harness.drain_effects();

    // Two keystrokes back to back.
    harness.dispatch_collect(Action::SearchInput("r".to_string()));
    harness.dispatch_collect(Action::SearchInput("ra".to_string()));

    let effects = harness.drain_effects();
    effects.effects_count(2);
    effects.effects_all_match(|e| matches!(e, Effect::SearchRecords { .. }));

    // The slow response for the first keystroke lands after the
    // second one resolved; it must be ignored.
    harness.complete_action(Action::SearchDidLoad {
        section: Section::Pokemon,
        seq: 2,
        items: vec![pokemon(26, "Raichu")],
    });
    harness.complete_action(Action::SearchDidLoad {
        section: Section::Pokemon,
        seq: 1,
        items: vec![pokemon(19, "Rattata")],
    });
    let (changed, total) = harness.process_emitted();
    assert_eq!(total, 2);
    assert_eq!(changed, 1, "stale response must not change state");

    harness.assert_state(|s| s.current_view().grid.items().len() == 1);
    harness.assert_state(|s| s.current_view().grid.items()[0].name() == "Raichu");
}

#[test]
fn test_clearing_query_cancels_pending_search() {
    let mut harness = loaded_harness();
    harness.drain_effects();

    harness.dispatch_collect(Action::SearchInput("pika".to_string()));
    harness.drain_effects();
    harness.dispatch_collect(Action::SearchInput(String::new()));

    let effects = harness.drain_effects();
    effects.effects_first_matches(|e| {
        matches!(e, Effect::CancelSearch { section: Section::Pokemon })
    });

    // A response for the cancelled search arriving anyway is dropped.
    harness.complete_action(Action::SearchDidLoad {
        section: Section::Pokemon,
        seq: 1,
        items: vec![pokemon(1, "Bulbasaur")],
    });
    harness.process_emitted();
    harness.assert_state(|s| s.current_view().grid.items().len() == 2);
    harness.assert_state(|s| !s.current_view().grid.is_searching());
}

#[test]
fn test_peek_expand_collapse_close_flow() {
    let mut harness = loaded_harness();
    harness.drain_effects();

    harness.dispatch_collect(Action::PanelOpenPeek);
    harness.assert_state(|s| s.mode() == PanelMode::Peek);
    let effects = harness.drain_effects();
    effects.effects_first_matches(
        |e| matches!(e, Effect::PreloadDetail { route } if route.path == "/pokemon/25"),
    );

    // Preload resolves, so expanding needs no further fetch.
    harness.complete_action(Action::PreloadDidLoad {
        route: Route::detail("/pokemon", "25"),
        record: pokemon(25, "Pikachu"),
    });
    harness.process_emitted();

    harness.dispatch_collect(Action::PanelExpand);
    harness.assert_state(|s| s.mode() == PanelMode::Full);
    harness.assert_state(|s| !s.nav.is_navigating());
    harness.drain_effects().effects_empty();

    harness.dispatch_collect(Action::PanelCollapse);
    harness.assert_state(|s| s.mode() == PanelMode::Peek);
    harness.assert_state(|s| s.nav.current().href() == "/pokemon?focus=25");

    harness.dispatch_collect(Action::PanelClose);
    harness.assert_state(|s| s.mode() == PanelMode::Closed);
    harness.assert_state(|s| s.current_view().panel.active_item().is_none());
}

#[test]
fn test_narrow_terminal_opens_detail_directly() {
    let mut harness = loaded_harness();
    harness.drain_effects();

    harness.dispatch_collect(Action::UiTerminalResize(80, 24));
    harness.dispatch_collect(Action::PanelOpenPeek);

    harness.assert_state(|s| s.mode() == PanelMode::Full);
    harness.assert_state(|s| s.nav.is_navigating());
    let effects = harness.drain_effects();
    effects.effects_first_matches(
        |e| matches!(e, Effect::FetchDetail { route } if route.path == "/pokemon/25"),
    );

    harness.complete_action(Action::DetailDidLoad {
        route: Route::detail("/pokemon", "25"),
        record: pokemon(25, "Pikachu"),
    });
    harness.process_emitted();
    harness.assert_state(|s| !s.nav.is_navigating());
    harness.assert_state(|s| s.nav.current().href() == "/pokemon/25");
}

#[test]
fn test_failed_detail_fetch_stays_on_list() {
    let mut harness = loaded_harness();
    harness.drain_effects();

    harness.dispatch_collect(Action::PanelOpenPeek);
    harness.dispatch_collect(Action::PanelExpand);
    harness.drain_effects();

    harness.complete_action(Action::DetailDidError {
        route: Route::detail("/pokemon", "25"),
        error: "server error".to_string(),
    });
    harness.process_emitted();

    harness.assert_state(|s| s.mode() == PanelMode::Peek);
    harness.assert_state(|s| s.nav.current().href() == "/pokemon?focus=25");
    harness.assert_state(|s| s.status.is_some());
}

#[test]
fn test_section_switch_fetches_then_caches() {
    let mut harness = loaded_harness();
    harness.drain_effects();

    harness.dispatch_collect(Action::SectionNext);
    let effects = harness.drain_effects();
    effects.effects_first_matches(
        |e| matches!(e, Effect::FetchPage { section: Section::Moves, .. }),
    );

    harness.complete_action(Action::PageDidLoad {
        section: Section::Moves,
        page: 1,
        total: 1,
        items: vec![attack(1, "Pound")],
    });
    harness.process_emitted();

    harness.dispatch_collect(Action::SectionPrev);
    harness.dispatch_collect(Action::SectionNext);
    harness.drain_effects().effects_empty();
    harness.assert_state(|s| s.current_view().grid.items()[0].name() == "Pound");
}

#[test]
fn test_deep_link_detail_route() {
    let start = Route::parse("/pokemon/150?page=4");
    let mut harness =
        EffectStoreTestHarness::new(AppState::new(Section::Pokemon, start), reducer);

    harness.dispatch_collect(Action::Init);
    harness.assert_state(|s| s.mode() == PanelMode::Full);
    let effects = harness.drain_effects();
    effects.effects_count(2);
    effects.effects_first_matches(|e| matches!(e, Effect::FetchPage { page: 4, .. }));

    harness.complete_action(Action::DetailDidLoad {
        route: Route::parse("/pokemon/150?page=4"),
        record: pokemon(150, "Mewtwo"),
    });
    harness.process_emitted();
    harness.assert_state(|s| s.current_view().panel.full_item().is_some());
    harness.assert_state(|s| s.current_view().panel.active_id().as_deref() == Some("150"));
}
