use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs, Wrap},
    Frame,
};
use tui_dispatch::{Component, EventKind, EventOutcome, RenderContext};
use tui_dispatch_components::style::BorderStyle;
use tui_dispatch_components::{
    highlight_substring, BaseStyle, Padding, StatusBar, StatusBarHint, StatusBarItem,
    StatusBarProps, StatusBarSection, StatusBarStyle,
};

use crate::action::Action;
use crate::panel::{PanelMode, PANEL_ANIM_TICKS};
use crate::state::{AppState, CardRecord, Section};

const BG_BASE: Color = Color::Rgb(14, 18, 26);
const BG_PANEL: Color = Color::Rgb(22, 30, 44);
const BG_HIGHLIGHT: Color = Color::Rgb(32, 82, 104);
const TEXT_MAIN: Color = Color::Rgb(230, 238, 242);
const TEXT_DIM: Color = Color::Rgb(168, 184, 198);
const ACCENT_TEAL: Color = Color::Rgb(86, 204, 188);
const ACCENT_GOLD: Color = Color::Rgb(226, 182, 96);
const BORDER_DIM: Color = Color::Rgb(62, 78, 96);

/// Widest the peek panel gets, as a percentage of the body.
const PEEK_WIDTH_PCT: u16 = 45;

pub fn render(frame: &mut Frame, area: Rect, state: &AppState, _ctx: RenderContext) {
    render_app(frame, area, state);
}

pub fn render_app(frame: &mut Frame, area: Rect, state: &AppState) {
    frame.render_widget(Block::default().style(Style::default().bg(BG_BASE)), area);

    let mut constraints = vec![Constraint::Length(3)];
    if state.search_open {
        constraints.push(Constraint::Length(3));
    }
    constraints.push(Constraint::Min(0));
    constraints.push(Constraint::Length(3));
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    render_header(frame, rows[0], state);
    let mut next = 1;
    if state.search_open {
        render_search_bar(frame, rows[next], state);
        next += 1;
    }
    render_body(frame, rows[next], state);
    render_footer(frame, rows[next + 1], state);
}

fn render_header(frame: &mut Frame, area: Rect, state: &AppState) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(36)])
        .split(area);

    let labels: Vec<Line> = Section::ALL
        .iter()
        .map(|section| Line::from(section.label()))
        .collect();
    let tabs = Tabs::new(labels)
        .select(state.section.index())
        .style(Style::default().fg(TEXT_DIM))
        .highlight_style(
            Style::default()
                .fg(ACCENT_TEAL)
                .add_modifier(Modifier::BOLD),
        )
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(BORDER_DIM)),
        );
    frame.render_widget(tabs, cols[0]);

    let href = Paragraph::new(state.nav.current().href())
        .alignment(Alignment::Right)
        .style(Style::default().fg(TEXT_DIM))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(BORDER_DIM)),
        );
    frame.render_widget(href, cols[1]);
}

fn render_search_bar(frame: &mut Frame, area: Rect, state: &AppState) {
    let view = state.current_view();
    let mut spans = vec![
        Span::styled("/ ", Style::default().fg(ACCENT_TEAL)),
        Span::styled(
            view.grid.search_query().to_string(),
            Style::default().fg(TEXT_MAIN),
        ),
        Span::styled("_", Style::default().fg(ACCENT_TEAL)),
    ];
    if view.grid.is_searching() {
        spans.push(Span::styled(
            "  searching...",
            Style::default().fg(ACCENT_GOLD),
        ));
    }
    let bar = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(ACCENT_TEAL))
            .title(" Search "),
    );
    frame.render_widget(bar, area);
}

fn render_body(frame: &mut Frame, area: Rect, state: &AppState) {
    match state.mode() {
        PanelMode::Closed => render_grid(frame, area, state),
        PanelMode::Full => render_detail(frame, area, state),
        PanelMode::Peek => {
            let panel_width = peek_width(area.width, state.panel_anim_ticks);
            let cols = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Min(0), Constraint::Length(panel_width)])
                .split(area);
            render_grid(frame, cols[0], state);
            if panel_width > 0 {
                render_peek(frame, cols[1], state);
            }
        }
    }
}

/// Panel slides in over its animation ticks; zero ticks left means
/// fully open.
fn peek_width(body_width: u16, anim_ticks: u16) -> u16 {
    let full = body_width as u32 * PEEK_WIDTH_PCT as u32 / 100;
    let done = PANEL_ANIM_TICKS.saturating_sub(anim_ticks.min(PANEL_ANIM_TICKS)) as u32;
    (full * done / PANEL_ANIM_TICKS as u32) as u16
}

fn render_grid(frame: &mut Frame, area: Rect, state: &AppState) {
    let view = state.current_view();
    let title = if view.grid.search_query().is_empty() {
        format!(
            " {} - page {}/{} ",
            view.section.label(),
            view.grid.current_page(),
            view.grid.total_pages().max(1)
        )
    } else {
        format!(
            " {} - {} result(s) ",
            view.section.label(),
            view.grid.items().len()
        )
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(BORDER_DIM))
        .title(title)
        .title_style(Style::default().fg(TEXT_MAIN));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if view.grid.is_loading {
        let loading = Paragraph::new("Loading...")
            .alignment(Alignment::Center)
            .style(Style::default().fg(ACCENT_GOLD));
        frame.render_widget(loading, inner);
        return;
    }
    if view.grid.items().is_empty() {
        let empty = Paragraph::new("No records")
            .alignment(Alignment::Center)
            .style(Style::default().fg(TEXT_DIM));
        frame.render_widget(empty, inner);
        return;
    }

    let query = view.grid.search_query();
    let base = Style::default().fg(TEXT_MAIN);
    let highlight = Style::default()
        .fg(ACCENT_GOLD)
        .add_modifier(Modifier::BOLD);

    let visible = inner.height as usize;
    let offset = view.cursor.saturating_sub(visible.saturating_sub(1));
    let lines: Vec<Line> = view
        .grid
        .items()
        .iter()
        .enumerate()
        .skip(offset)
        .take(visible)
        .map(|(idx, record)| {
            let mut line = if query.is_empty() {
                Line::from(Span::styled(record.name().to_string(), base))
            } else {
                highlight_substring(record.name(), query, base, highlight)
            };
            if let Some(desc) = record.description() {
                line.push_span(Span::styled(
                    format!("  {desc}"),
                    Style::default().fg(TEXT_DIM),
                ));
            }
            if idx == view.cursor {
                line = line.style(Style::default().bg(BG_HIGHLIGHT));
            }
            line
        })
        .collect();
    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_peek(frame: &mut Frame, area: Rect, state: &AppState) {
    let view = state.current_view();
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(ACCENT_TEAL))
        .style(Style::default().bg(BG_PANEL))
        .title(" Preview ");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let Some(record) = view.panel.active_item() else {
        return;
    };
    let mut lines = record_lines(record);
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Enter: expand  Esc: close",
        Style::default().fg(TEXT_DIM),
    )));
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);
}

fn render_detail(frame: &mut Frame, area: Rect, state: &AppState) {
    let view = state.current_view();
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(ACCENT_TEAL))
        .style(Style::default().bg(BG_PANEL))
        .title(format!(" {} ", view.section.label()));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let record = view.panel.full_item().or(view.panel.active_item());
    let Some(record) = record else {
        let loading = Paragraph::new("Loading...")
            .alignment(Alignment::Center)
            .style(Style::default().fg(ACCENT_GOLD));
        frame.render_widget(loading, inner);
        return;
    };

    let mut lines = record_lines(record);
    if state.nav.is_navigating() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Loading full record...",
            Style::default().fg(ACCENT_GOLD),
        )));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        format!("Esc: back to {}", view.grid.return_href(view.section.base_path())),
        Style::default().fg(TEXT_DIM),
    )));
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);
}

fn field(label: &str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{label}: "), Style::default().fg(TEXT_DIM)),
        Span::styled(value, Style::default().fg(TEXT_MAIN)),
    ])
}

fn opt_field(label: &str, value: Option<String>) -> Option<Line<'static>> {
    value.map(|v| field(label, v))
}

fn record_lines(record: &CardRecord) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from(Span::styled(
        record.name().to_string(),
        Style::default()
            .fg(ACCENT_TEAL)
            .add_modifier(Modifier::BOLD),
    ))];
    lines.push(Line::from(""));
    match record {
        CardRecord::Pokemon(p) => {
            lines.push(field("No", format!("{:04}", p.id)));
            if !p.types.is_empty() {
                lines.push(field("Types", p.types.join(", ")));
            }
            lines.extend(opt_field("Generation", p.generation.map(|g| g.to_string())));
            lines.extend(opt_field("About", p.description.clone()));
        }
        CardRecord::Move(m) => {
            lines.extend(opt_field("Type", m.move_type.clone()));
            lines.extend(opt_field("Power", m.power.map(|v| v.to_string())));
            lines.extend(opt_field("Accuracy", m.accuracy.map(|v| v.to_string())));
            lines.extend(opt_field("PP", m.pp.map(|v| v.to_string())));
            lines.extend(opt_field("About", m.description.clone()));
        }
        CardRecord::Ability(a) => {
            lines.extend(opt_field("Summary", a.short_description.clone()));
            lines.extend(opt_field("About", a.description.clone()));
        }
        CardRecord::Item(i) => {
            lines.extend(opt_field("Category", i.category.clone()));
            lines.extend(opt_field("Cost", i.cost.map(|v| v.to_string())));
            lines.extend(opt_field("About", i.description.clone()));
        }
        CardRecord::Article(a) => {
            lines.extend(opt_field("Subtitle", a.subtitle.clone()));
            lines.extend(opt_field("By", a.author.clone()));
            lines.extend(opt_field("Updated", a.updated_at.clone()));
            if !a.published {
                lines.push(field("Status", "draft".to_string()));
            }
        }
    }
    lines
}

fn render_footer(frame: &mut Frame, area: Rect, state: &AppState) {
    let status = state.status.clone().unwrap_or_else(|| {
        let view = state.current_view();
        if view.grid.is_loading {
            "Loading...".to_string()
        } else if view.grid.is_searching() {
            "Searching...".to_string()
        } else {
            String::new()
        }
    });
    let (left_hints, center_hints) = status_hints(state);
    let status_span = Span::styled(status, Style::default().fg(ACCENT_GOLD));
    let status_items = [StatusBarItem::span(status_span)];

    let style = StatusBarStyle {
        base: BaseStyle {
            border: Some(BorderStyle {
                borders: Borders::ALL,
                style: Style::default().fg(BORDER_DIM),
                focused_style: Some(Style::default().fg(ACCENT_TEAL)),
            }),
            padding: Padding::xy(1, 0),
            bg: Some(BG_PANEL),
            fg: Some(TEXT_MAIN),
        },
        text: Style::default().fg(TEXT_DIM),
        hint_key: Style::default()
            .fg(ACCENT_TEAL)
            .add_modifier(Modifier::BOLD),
        hint_label: Style::default().fg(TEXT_DIM),
        separator: Style::default().fg(TEXT_DIM),
    };

    let mut status_bar = StatusBar::new();
    let props = StatusBarProps {
        left: StatusBarSection::hints(&left_hints).with_separator("  "),
        center: StatusBarSection::hints(&center_hints).with_separator("  "),
        right: StatusBarSection::items(&status_items).with_separator("  "),
        style,
        is_focused: false,
    };
    Component::<Action>::render(&mut status_bar, frame, area, props);
}

fn status_hints(state: &AppState) -> (Vec<StatusBarHint<'static>>, Vec<StatusBarHint<'static>>) {
    if state.search_open {
        let left = vec![
            StatusBarHint::new("Enter", "Keep"),
            StatusBarHint::new("Esc", "Clear"),
        ];
        return (left, vec![StatusBarHint::new("q", "Quit")]);
    }

    let left = match state.mode() {
        PanelMode::Closed => vec![
            StatusBarHint::new("j/k", "Move"),
            StatusBarHint::new("Enter", "Open"),
            StatusBarHint::new("n/p", "Page"),
            StatusBarHint::new("/", "Search"),
        ],
        PanelMode::Peek => vec![
            StatusBarHint::new("Enter", "Expand"),
            StatusBarHint::new("Esc", "Close"),
            StatusBarHint::new("j/k", "Move"),
        ],
        PanelMode::Full => vec![StatusBarHint::new("Esc", "Back")],
    };
    let center = vec![
        StatusBarHint::new("Tab", "Section"),
        StatusBarHint::new("r", "Reload"),
        StatusBarHint::new("q", "Quit"),
    ];
    (left, center)
}

pub fn handle_event(event: &EventKind, state: &AppState) -> EventOutcome<Action> {
    match event {
        EventKind::Resize(width, height) => {
            EventOutcome::action(Action::UiTerminalResize(*width, *height)).with_render()
        }
        EventKind::Key(key) => handle_key(*key, state),
        _ => EventOutcome::ignored(),
    }
}

fn handle_key(key: KeyEvent, state: &AppState) -> EventOutcome<Action> {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return EventOutcome::action(Action::Quit);
    }

    if state.search_open {
        return handle_search_key(key, state);
    }

    match state.mode() {
        PanelMode::Full => match key.code {
            KeyCode::Esc | KeyCode::Backspace | KeyCode::Char('h') => {
                EventOutcome::action(Action::PanelCollapse).with_render()
            }
            KeyCode::Char('q') => EventOutcome::action(Action::Quit),
            _ => EventOutcome::ignored(),
        },
        PanelMode::Peek => match key.code {
            KeyCode::Enter | KeyCode::Char('l') => {
                EventOutcome::action(Action::PanelExpand).with_render()
            }
            KeyCode::Esc => EventOutcome::action(Action::PanelClose).with_render(),
            KeyCode::Down | KeyCode::Char('j') => {
                EventOutcome::action(Action::CursorMove(1)).with_render()
            }
            KeyCode::Up | KeyCode::Char('k') => {
                EventOutcome::action(Action::CursorMove(-1)).with_render()
            }
            KeyCode::Char('q') => EventOutcome::action(Action::Quit),
            _ => EventOutcome::ignored(),
        },
        PanelMode::Closed => match key.code {
            KeyCode::Down | KeyCode::Char('j') => {
                EventOutcome::action(Action::CursorMove(1)).with_render()
            }
            KeyCode::Up | KeyCode::Char('k') => {
                EventOutcome::action(Action::CursorMove(-1)).with_render()
            }
            KeyCode::Enter => EventOutcome::action(Action::PanelOpenPeek).with_render(),
            KeyCode::Right | KeyCode::Char('n') => {
                EventOutcome::action(Action::PageNext).with_render()
            }
            KeyCode::Left | KeyCode::Char('p') => {
                EventOutcome::action(Action::PagePrev).with_render()
            }
            KeyCode::Tab => EventOutcome::action(Action::SectionNext).with_render(),
            KeyCode::BackTab => EventOutcome::action(Action::SectionPrev).with_render(),
            KeyCode::Char('/') => EventOutcome::action(Action::SearchOpen).with_render(),
            KeyCode::Char('r') => EventOutcome::action(Action::Init).with_render(),
            KeyCode::Char('q') => EventOutcome::action(Action::Quit),
            _ => EventOutcome::ignored(),
        },
    }
}

fn handle_search_key(key: KeyEvent, state: &AppState) -> EventOutcome<Action> {
    let query = state.current_view().grid.search_query();
    match key.code {
        KeyCode::Esc => EventOutcome::action(Action::SearchCancel).with_render(),
        KeyCode::Enter => EventOutcome::action(Action::SearchCommit).with_render(),
        KeyCode::Backspace => {
            let mut next = query.to_string();
            next.pop();
            EventOutcome::action(Action::SearchInput(next)).with_render()
        }
        KeyCode::Char(c) => {
            let mut next = query.to_string();
            next.push(c);
            EventOutcome::action(Action::SearchInput(next)).with_render()
        }
        _ => EventOutcome::ignored(),
    }
}
