use std::collections::HashMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tui_dispatch_debug::debug::{ron_string, DebugSection, DebugState};

use crate::grid::{GridConfig, GridData};
use crate::panel::{Ident, PanelMode, PanelState, NARROW_COLS};
use crate::route::{NavState, Route};

/// The five browsable record kinds, one grid/panel pair each.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum Section {
    Pokemon,
    Moves,
    Abilities,
    Items,
    Articles,
}

impl Section {
    pub const ALL: [Section; 5] = [
        Section::Pokemon,
        Section::Moves,
        Section::Abilities,
        Section::Items,
        Section::Articles,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Section::Pokemon => "Pokemon",
            Section::Moves => "Moves",
            Section::Abilities => "Abilities",
            Section::Items => "Items",
            Section::Articles => "Articles",
        }
    }

    pub fn base_path(&self) -> &'static str {
        match self {
            Section::Pokemon => "/pokemon",
            Section::Moves => "/moves",
            Section::Abilities => "/abilities",
            Section::Items => "/items",
            Section::Articles => "/articles",
        }
    }

    /// Section owning a route path, list or detail.
    pub fn of_path(path: &str) -> Option<Section> {
        Section::ALL.into_iter().find(|section| {
            let base = section.base_path();
            path == base || path.strip_prefix(base).is_some_and(|rest| rest.starts_with('/'))
        })
    }

    pub fn index(&self) -> usize {
        Section::ALL.iter().position(|s| s == self).unwrap_or(0)
    }

    pub fn next(&self) -> Section {
        Section::ALL[(self.index() + 1) % Section::ALL.len()]
    }

    pub fn prev(&self) -> Section {
        Section::ALL[(self.index() + Section::ALL.len() - 1) % Section::ALL.len()]
    }

    /// Per-endpoint request settings. The pokemon listing asks the
    /// backend to embed types and abilities; articles search full
    /// text via `q` instead of matching on `name`.
    pub fn grid_config(&self) -> GridConfig {
        match self {
            Section::Pokemon => GridConfig::new(self.base_path())
                .with_query_param("includeTypes", "true")
                .with_query_param("includeAbilities", "true"),
            Section::Articles => GridConfig::new(self.base_path()).with_search_param("q"),
            _ => GridConfig::new(self.base_path()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PokemonSummary {
    pub id: u32,
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub generation: Option<u8>,
    #[serde(default)]
    pub types: Vec<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MoveSummary {
    pub id: u32,
    pub slug: String,
    pub name: String,
    #[serde(default, rename = "type")]
    pub move_type: Option<String>,
    #[serde(default)]
    pub power: Option<u16>,
    #[serde(default)]
    pub accuracy: Option<u16>,
    #[serde(default)]
    pub pp: Option<u16>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AbilitySummary {
    pub id: u32,
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub short_description: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ItemSummary {
    pub id: u32,
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub cost: Option<u32>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ArticleSummary {
    pub id: u32,
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub published: bool,
}

/// One record of any section, so grids, panels and the preload cache
/// stay monomorphic across the five endpoints. Tagged so state
/// snapshots round-trip unambiguously.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind")]
pub enum CardRecord {
    Pokemon(PokemonSummary),
    Move(MoveSummary),
    Ability(AbilitySummary),
    Item(ItemSummary),
    Article(ArticleSummary),
}

impl CardRecord {
    pub fn name(&self) -> &str {
        match self {
            CardRecord::Pokemon(p) => &p.name,
            CardRecord::Move(m) => &m.name,
            CardRecord::Ability(a) => &a.name,
            CardRecord::Item(i) => &i.name,
            CardRecord::Article(a) => &a.title,
        }
    }

    pub fn description(&self) -> Option<&str> {
        match self {
            CardRecord::Pokemon(p) => p.description.as_deref(),
            CardRecord::Move(m) => m.description.as_deref(),
            CardRecord::Ability(a) => a.short_description.as_deref().or(a.description.as_deref()),
            CardRecord::Item(i) => i.description.as_deref(),
            CardRecord::Article(a) => a.subtitle.as_deref(),
        }
    }
}

impl Ident for CardRecord {
    fn ident(&self) -> String {
        match self {
            CardRecord::Pokemon(p) => p.id.to_string(),
            CardRecord::Move(m) => m.id.to_string(),
            CardRecord::Ability(a) => a.id.to_string(),
            CardRecord::Item(i) => i.id.to_string(),
            CardRecord::Article(a) => a.id.to_string(),
        }
    }
}

/// Grid, panel and cursor for one section. Each keeps its own state so
/// switching sections and coming back restores the exact view.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SectionView {
    pub section: Section,
    pub grid: GridData<CardRecord>,
    pub panel: PanelState<CardRecord>,
    pub cursor: usize,
}

impl SectionView {
    pub fn new(section: Section) -> Self {
        Self {
            section,
            grid: GridData::new(Vec::new(), 0, 1, section.grid_config()),
            panel: PanelState::new(section.base_path()),
            cursor: 0,
        }
    }

    pub fn clamp_cursor(&mut self) {
        let len = self.grid.items().len();
        if len == 0 {
            self.cursor = 0;
        } else if self.cursor >= len {
            self.cursor = len - 1;
        }
    }

    pub fn selected(&self) -> Option<&CardRecord> {
        self.grid.items().get(self.cursor)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AppState {
    pub terminal_size: (u16, u16),
    pub section: Section,
    pub nav: NavState,
    pub views: Vec<SectionView>,
    /// Detail records fetched ahead of (or during) navigation, keyed
    /// by detail href.
    pub preloaded: HashMap<String, CardRecord>,
    pub search_open: bool,
    /// Remaining slide-in ticks for a freshly opened panel.
    pub panel_anim_ticks: u16,
    pub status: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Section::Pokemon, Route::list(Section::Pokemon.base_path()))
    }
}

impl AppState {
    pub fn new(section: Section, start_route: Route) -> Self {
        Self {
            terminal_size: (120, 40),
            section,
            nav: NavState::new(start_route),
            views: Section::ALL.map(SectionView::new).to_vec(),
            preloaded: HashMap::new(),
            search_open: false,
            panel_anim_ticks: 0,
            status: None,
        }
    }

    pub fn view(&self, section: Section) -> &SectionView {
        &self.views[section.index()]
    }

    pub fn view_mut(&mut self, section: Section) -> &mut SectionView {
        &mut self.views[section.index()]
    }

    pub fn current_view(&self) -> &SectionView {
        self.view(self.section)
    }

    pub fn current_view_mut(&mut self) -> &mut SectionView {
        let section = self.section;
        self.view_mut(section)
    }

    pub fn mode(&self) -> PanelMode {
        let view = self.current_view();
        view.panel.mode(&self.nav)
    }

    pub fn is_narrow(&self) -> bool {
        self.terminal_size.0 < NARROW_COLS
    }
}

impl DebugState for AppState {
    fn debug_sections(&self) -> Vec<DebugSection> {
        let view = self.current_view();
        vec![
            DebugSection::new("Route")
                .entry("current", ron_string(&self.nav.current().href()))
                .entry("pending", ron_string(&self.nav.pending().map(Route::href)))
                .entry("section", ron_string(&self.section.label()))
                .entry("mode", ron_string(&self.mode())),
            DebugSection::new("Grid")
                .entry("items", ron_string(&view.grid.items().len()))
                .entry("page", ron_string(&view.grid.current_page()))
                .entry("pages", ron_string(&view.grid.total_pages()))
                .entry("cursor", ron_string(&view.cursor))
                .entry("loading", ron_string(&view.grid.is_loading))
                .entry("searching", ron_string(&view.grid.is_searching()))
                .entry("query", ron_string(&view.grid.search_query())),
            DebugSection::new("Panel")
                .entry("active", ron_string(&view.panel.active_id()))
                .entry("full_item", ron_string(&view.panel.full_item().is_some()))
                .entry("preloaded", ron_string(&self.preloaded.len()))
                .entry("anim_ticks", ron_string(&self.panel_anim_ticks))
                .entry("search_open", ron_string(&self.search_open))
                .entry("status", ron_string(&self.status)),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_section_of_path() {
        assert_eq!(Section::of_path("/pokemon"), Some(Section::Pokemon));
        assert_eq!(Section::of_path("/pokemon/25"), Some(Section::Pokemon));
        assert_eq!(Section::of_path("/articles/9"), Some(Section::Articles));
        assert_eq!(Section::of_path("/pokemonx"), None);
        assert_eq!(Section::of_path("/"), None);
    }

    #[test]
    fn test_section_cycle() {
        assert_eq!(Section::Pokemon.next(), Section::Moves);
        assert_eq!(Section::Pokemon.prev(), Section::Articles);
        assert_eq!(Section::Articles.next(), Section::Pokemon);
    }

    #[test]
    fn test_grid_config_per_section() {
        let pokemon = Section::Pokemon.grid_config();
        assert!(pokemon
            .query_params
            .contains(&("includeTypes".to_string(), "true".to_string())));
        assert_eq!(Section::Articles.grid_config().search_param, "q");
        assert_eq!(Section::Moves.grid_config().search_param, "name");
    }

    #[test]
    fn test_summary_deserializes_camel_case() {
        let json = r#"{
            "id": 25,
            "slug": "pikachu",
            "name": "Pikachu",
            "generation": 1,
            "types": ["electric"],
            "description": "Mouse Pokemon"
        }"#;
        let summary: PokemonSummary = serde_json::from_str(json).unwrap();
        assert_eq!(summary.types, vec!["electric"]);

        let sparse: PokemonSummary =
            serde_json::from_str(r#"{"id":1,"slug":"bulbasaur","name":"Bulbasaur"}"#).unwrap();
        assert_eq!(sparse.generation, None);
        assert!(sparse.types.is_empty());
    }

    #[test]
    fn test_article_updated_at_field_name() {
        let json = r#"{"id":1,"slug":"intro","title":"Intro","updatedAt":"2024-05-01","published":true}"#;
        let article: ArticleSummary = serde_json::from_str(json).unwrap();
        assert_eq!(article.updated_at.as_deref(), Some("2024-05-01"));
    }

    #[test]
    fn test_clamp_cursor() {
        let mut view = SectionView::new(Section::Items);
        view.cursor = 5;
        view.clamp_cursor();
        assert_eq!(view.cursor, 0);

        view.grid.set_items(vec![
            CardRecord::Item(ItemSummary {
                id: 1,
                slug: "potion".to_string(),
                name: "Potion".to_string(),
                category: None,
                cost: Some(200),
                description: None,
            }),
            CardRecord::Item(ItemSummary {
                id: 2,
                slug: "ether".to_string(),
                name: "Ether".to_string(),
                category: None,
                cost: None,
                description: None,
            }),
        ]);
        view.cursor = 5;
        view.clamp_cursor();
        assert_eq!(view.cursor, 1);
    }

    #[test]
    fn test_views_keyed_by_section() {
        let state = AppState::default();
        assert_eq!(state.views.len(), Section::ALL.len());
        for section in Section::ALL {
            assert_eq!(state.view(section).section, section);
        }
    }
}
