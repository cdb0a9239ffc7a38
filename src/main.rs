//! dexgrid - browse an encyclopedia backend from the terminal.

use std::io;
use std::time::Duration;

use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tui_dispatch::{
    EffectContext, EffectStoreLike, EffectStoreWithMiddleware, EventOutcome, RenderContext, TaskKey,
};
use tui_dispatch_debug::debug::DebugLayer;
use tui_dispatch_debug::{
    DebugCliArgs, DebugRunOutput, DebugSession, DebugSessionError, ReplayItem,
};

use dexgrid::action::Action;
use dexgrid::api;
use dexgrid::effect::Effect;
use dexgrid::reducer::reducer;
use dexgrid::route::Route;
use dexgrid::state::{AppState, Section};
use dexgrid::ui;

const TICK_MS: u64 = 40;

#[derive(Parser, Debug)]
#[command(name = "dexgrid")]
#[command(about = "Terminal browser for a game-data encyclopedia API")]
struct Args {
    /// Base URL of the backend API
    #[arg(long, default_value = "http://localhost:8080/api")]
    api_base: String,

    /// Start route, e.g. /pokemon, /moves?page=3 or /pokemon/25
    #[arg(long, default_value = "/pokemon")]
    route: String,

    /// Records per listing page
    #[arg(long, default_value = "24", value_parser = clap::value_parser!(u32).range(1..))]
    page_size: u32,

    #[command(flatten)]
    debug: DebugCliArgs,
}

#[tokio::main]
async fn main() -> io::Result<()> {
    let Args {
        api_base,
        route,
        page_size,
        debug: debug_args,
    } = Args::parse();

    let start = Route::parse(&route);
    let Some(section) = Section::of_path(&start.path) else {
        eprintln!("Error: unknown route '{route}'.");
        eprintln!(
            "Known sections: {}",
            Section::ALL
                .iter()
                .map(|s| s.base_path())
                .collect::<Vec<_>>()
                .join(", ")
        );
        std::process::exit(1);
    };

    let debug = DebugSession::new(debug_args);
    debug.save_state_schema::<AppState>().map_err(debug_error)?;
    debug.save_actions_schema::<Action>().map_err(debug_error)?;

    let state = debug
        .load_state_or_else_async(move || async move {
            let mut state = AppState::new(section, start);
            for view in &mut state.views {
                view.grid.set_page_size(page_size);
            }
            Ok::<AppState, io::Error>(state)
        })
        .await
        .map_err(debug_error)?;
    let replay_actions = debug.load_replay_items().map_err(debug_error)?;
    let (middleware, recorder) = debug.middleware_with_recorder();
    let store = EffectStoreWithMiddleware::new(state, reducer, middleware);

    let use_alt_screen = debug.use_alt_screen();
    let mut stdout = io::stdout();
    if use_alt_screen {
        enable_raw_mode()?;
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    }
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &debug, store, api_base, replay_actions).await;

    if use_alt_screen {
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;
    }

    let run_output = result?;
    run_output.write_render_output()?;
    debug.save_actions(recorder.as_ref()).map_err(debug_error)?;
    Ok(())
}

fn debug_error(error: DebugSessionError) -> io::Error {
    io::Error::other(format!("debug session error: {error}"))
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    debug: &DebugSession,
    store: impl EffectStoreLike<AppState, Action, Effect>,
    api_base: String,
    replay_actions: Vec<ReplayItem<Action>>,
) -> io::Result<DebugRunOutput<AppState>> {
    debug
        .run_effect_app(
            terminal,
            store,
            DebugLayer::simple(),
            replay_actions,
            Some(Action::Init),
            Some(Action::Quit),
            |runtime| {
                if debug.render_once() {
                    return;
                }
                runtime
                    .subscriptions()
                    .interval("tick", Duration::from_millis(TICK_MS), || Action::Tick);
            },
            |frame, area, state, render_ctx: RenderContext| {
                ui::render(frame, area, state, render_ctx);
            },
            |event, state| -> EventOutcome<Action> { ui::handle_event(event, state) },
            |action| matches!(action, Action::Quit),
            move |effect, ctx| handle_effect(&api_base, effect, ctx),
        )
        .await
}

fn handle_effect(api_base: &str, effect: Effect, ctx: &mut EffectContext<Action>) {
    match effect {
        Effect::FetchPage {
            section,
            page,
            query,
        } => {
            let api_base = api_base.to_string();
            let key = format!("page_{}", section.label());
            ctx.tasks().spawn(TaskKey::new(key), async move {
                match api::fetch_records(&api_base, section, &query).await {
                    Ok((items, total)) => Action::PageDidLoad {
                        section,
                        page,
                        total,
                        items,
                    },
                    Err(error) => Action::PageDidError { section, error },
                }
            });
        }
        Effect::SearchRecords {
            section,
            query,
            seq,
            debounce_ms,
        } => {
            let api_base = api_base.to_string();
            let key = TaskKey::new(format!("search_{}", section.label()));
            ctx.tasks()
                .debounce(key, Duration::from_millis(debounce_ms), async move {
                    match api::fetch_records(&api_base, section, &query).await {
                        Ok((items, _)) => Action::SearchDidLoad {
                            section,
                            seq,
                            items,
                        },
                        Err(error) => Action::SearchDidError {
                            section,
                            seq,
                            error,
                        },
                    }
                });
        }
        Effect::CancelSearch { section } => {
            let key = format!("search_{}", section.label());
            ctx.tasks().cancel(&TaskKey::new(key));
        }
        Effect::FetchDetail { route } => {
            let api_base = api_base.to_string();
            let key = format!("detail_{}", route.path);
            ctx.tasks().spawn(TaskKey::new(key), async move {
                match api::fetch_record(&api_base, &route).await {
                    Ok(record) => Action::DetailDidLoad { route, record },
                    Err(error) => Action::DetailDidError { route, error },
                }
            });
        }
        Effect::PreloadDetail { route } => {
            let api_base = api_base.to_string();
            let key = format!("preload_{}", route.path);
            ctx.tasks().spawn(TaskKey::new(key), async move {
                match api::fetch_record(&api_base, &route).await {
                    Ok(record) => Action::PreloadDidLoad { route, record },
                    Err(error) => Action::PreloadDidError { route, error },
                }
            });
        }
    }
}
