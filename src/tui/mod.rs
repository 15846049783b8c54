//! Ratatui-based terminal UI.
//!
//! A sidebar lists the registered pages and the controls the current page
//! reads (store, year). Every change runs one render cycle through the
//! `Navigator` and redraws the page's charts.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
};
use tracing::{debug, info};

use crate::app::pipeline::Session;
use crate::domain::{DatasetStats, FilterSelection, PageView, STORE_CONTROL_MAX, YearChoice, year_options};
use crate::error::AppError;
use crate::pages::{APP_NAME, Control};

mod plotters_chart;

use plotters_chart::{DashChart, TREND_COLOR, series_color};

const SIDEBAR_WIDTH: u16 = 34;
const STORE_PAGE_STEP: u32 = 5;

/// Start the TUI on `page` (or the first registered page).
pub fn run(session: Session, page: Option<String>, selection: FilterSelection) -> Result<(), AppError> {
    // Validate before touching the terminal so errors print normally.
    let mut app = App::new(session, page.as_deref(), selection)?;

    let _guard = TerminalGuard::new()?;
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal =
        Terminal::new(backend).map_err(|e| AppError::terminal(format!("Failed to initialize terminal: {e}")))?;

    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::terminal(format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::terminal(format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

struct App {
    session: Session,
    pages: Vec<String>,
    page_idx: usize,
    selection: FilterSelection,
    years: Vec<YearChoice>,
    /// Computed once at startup.
    stats: DatasetStats,
    /// Index into the current page's `controls()`.
    focused: usize,
    view: Option<PageView>,
    status: String,
}

impl App {
    fn new(session: Session, page: Option<&str>, selection: FilterSelection) -> Result<Self, AppError> {
        let pages: Vec<String> = session.page_names().into_iter().map(str::to_string).collect();
        if pages.is_empty() {
            return Err(AppError::config("No pages registered."));
        }
        let page_idx = match page {
            Some(name) => {
                // Surfaces UnknownPage with the list of valid names.
                session.navigator.registry().get(name)?;
                pages.iter().position(|p| p == name).unwrap_or(0)
            }
            None => 0,
        };

        let years = year_options(session.dataset());
        let stats = session.dataset().stats();
        let mut app = Self {
            session,
            pages,
            page_idx,
            selection,
            years,
            stats,
            focused: 0,
            view: None,
            status: String::new(),
        };
        app.render_page()?;
        app.status = format!("Loaded {} rows from {}", app.session.dataset().len(), app.session.source);
        Ok(app)
    }

    fn current_page(&self) -> &str {
        &self.pages[self.page_idx]
    }

    fn controls(&self) -> &'static [Control] {
        self.session
            .navigator
            .registry()
            .get(self.current_page())
            .map(|p| p.controls())
            .unwrap_or(&[])
    }

    /// One render cycle for the current page and selection.
    fn render_page(&mut self) -> Result<(), AppError> {
        let name = self.pages[self.page_idx].clone();
        let view = self.session.render(&name, &self.selection)?;
        debug!(page = %name, rows = view.rows_in_view, "page rendered");
        self.view = Some(view);
        Ok(())
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::terminal(format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::terminal(format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::terminal(format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code)? {
                        info!("quit");
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Returns `Ok(true)` when the user asked to quit.
    fn handle_key(&mut self, code: KeyCode) -> Result<bool, AppError> {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return Ok(true),
            KeyCode::Tab => self.switch_page(1)?,
            KeyCode::BackTab => self.switch_page(-1)?,
            KeyCode::Char(c @ '1'..='9') => {
                let idx = c as usize - '1' as usize;
                if idx < self.pages.len() && idx != self.page_idx {
                    self.page_idx = idx;
                    self.focused = 0;
                    self.render_page()?;
                    self.status = format!("page: {}", self.current_page());
                }
            }
            KeyCode::Up => self.focused = self.focused.saturating_sub(1),
            KeyCode::Down => {
                if self.focused + 1 < self.controls().len() {
                    self.focused += 1;
                }
            }
            KeyCode::Left => self.adjust(-1)?,
            KeyCode::Right => self.adjust(1)?,
            KeyCode::PageDown => self.adjust_store(-(STORE_PAGE_STEP as i64))?,
            KeyCode::PageUp => self.adjust_store(STORE_PAGE_STEP as i64)?,
            KeyCode::Char('x') => {
                self.selection.store.mode = self.selection.store.mode.toggle();
                self.render_page()?;
                self.status = format!("store match: {}", self.selection.store.mode.display_name());
            }
            _ => {}
        }
        Ok(false)
    }

    fn switch_page(&mut self, delta: isize) -> Result<(), AppError> {
        let n = self.pages.len() as isize;
        self.page_idx = (self.page_idx as isize + delta).rem_euclid(n) as usize;
        self.focused = 0;
        self.render_page()?;
        self.status = format!("page: {}", self.current_page());
        Ok(())
    }

    fn adjust(&mut self, delta: i64) -> Result<(), AppError> {
        match self.controls().get(self.focused) {
            Some(Control::Store) => self.adjust_store(delta),
            Some(Control::Year) => self.adjust_year(delta),
            None => Ok(()),
        }
    }

    fn adjust_store(&mut self, delta: i64) -> Result<(), AppError> {
        if !self.controls().contains(&Control::Store) {
            return Ok(());
        }
        let next = (i64::from(self.selection.store.value) + delta).clamp(0, i64::from(STORE_CONTROL_MAX));
        let next = next as u32;
        if next != self.selection.store.value {
            self.selection.store.value = next;
            self.render_page()?;
        }
        self.status = format!(
            "{} {}",
            self.selection.store.mode.display_name(),
            self.selection.store.value
        );
        Ok(())
    }

    fn adjust_year(&mut self, delta: i64) -> Result<(), AppError> {
        if self.years.is_empty() {
            return Ok(());
        }
        let n = self.years.len() as i64;
        let cur = self
            .years
            .iter()
            .position(|y| *y == self.selection.year)
            .unwrap_or(0) as i64;
        self.selection.year = self.years[(cur + delta).rem_euclid(n) as usize];
        self.render_page()?;
        self.status = format!("year: {}", self.selection.year);
        Ok(())
    }

    fn draw(&self, frame: &mut ratatui::Frame<'_>) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(0), Constraint::Length(3)])
            .split(frame.area());

        self.draw_header(frame, chunks[0]);

        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(0)])
            .split(chunks[1]);
        self.draw_sidebar(frame, body[0]);
        self.draw_page(frame, body[1]);

        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let stats = &self.stats;
        let rows_in_view = self.view.as_ref().map(|v| v.rows_in_view).unwrap_or(0);
        let dates = match (stats.date_min, stats.date_max) {
            (Some(a), Some(b)) => format!("{a} → {b}"),
            _ => "-".to_string(),
        };

        let lines = vec![
            Line::from(vec![
                Span::styled(APP_NAME, Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
                Span::raw(format!(" | {}", self.current_page())),
            ]),
            Line::from(Span::styled(
                format!(
                    "source: {} | rows: {} | in view: {rows_in_view} | stores: {} | depts: {} | dates: {dates}",
                    self.session.source,
                    stats.n_rows,
                    stats.n_stores,
                    stats.n_depts,
                ),
                Style::default().fg(Color::Gray),
            )),
        ];

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_sidebar(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(self.pages.len() as u16 + 2), Constraint::Min(0)])
            .split(area);

        let items: Vec<ListItem> = self
            .pages
            .iter()
            .enumerate()
            .map(|(i, name)| ListItem::new(format!("{} {name}", i + 1)))
            .collect();
        let nav = List::new(items)
            .block(Block::default().title("Navigation").borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::Cyan))
            .highlight_symbol("» ");
        let mut nav_state = ListState::default();
        nav_state.select(Some(self.page_idx));
        frame.render_stateful_widget(nav, chunks[0], &mut nav_state);

        let items: Vec<ListItem> = self
            .controls()
            .iter()
            .map(|c| match c {
                Control::Store => ListItem::new(format!(
                    "Store: {} {}",
                    self.selection.store.mode.display_name(),
                    self.selection.store.value
                )),
                Control::Year => ListItem::new(format!("Year: {}", self.selection.year)),
            })
            .collect();
        let controls = List::new(items)
            .block(Block::default().title("Filters").borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");
        let mut state = ListState::default();
        state.select(Some(self.focused));
        frame.render_stateful_widget(controls, chunks[1], &mut state);
    }

    fn draw_page(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let Some(view) = &self.view else {
            let msg = Paragraph::new("Rendering...").style(Style::default().fg(Color::Yellow));
            frame.render_widget(msg, area);
            return;
        };

        let mut constraints = vec![Constraint::Length(view.lines.len() as u16 + 2)];
        let n_charts = view.charts.len().max(1) as u32;
        constraints.extend(view.charts.iter().map(|_| Constraint::Ratio(1, n_charts)));
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(area);

        let intro = Paragraph::new(Text::from(
            view.lines.iter().map(|l| Line::from(l.as_str())).collect::<Vec<_>>(),
        ))
        .block(Block::default().title(view.title.as_str()).borders(Borders::ALL));
        frame.render_widget(intro, chunks[0]);

        for (chart, rect) in view.charts.iter().zip(chunks.iter().skip(1)) {
            let block = Block::default().title(chart.title.as_str()).borders(Borders::ALL);
            let inner = block.inner(*rect);
            frame.render_widget(block, *rect);
            frame.render_widget(Clear, inner);

            let needs_legend = chart.series.len() > 1 || chart.trend.is_some();
            let (plot_rect, legend_rect) = if needs_legend && inner.height > 3 {
                let parts = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([Constraint::Min(0), Constraint::Length(1)])
                    .split(inner);
                (parts[0], Some(parts[1]))
            } else {
                (inner, None)
            };

            frame.render_widget(DashChart { chart }, plot_rect);
            if let Some(rect) = legend_rect {
                frame.render_widget(Paragraph::new(legend_line(chart)), rect);
            }
        }
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "Tab/1-9 page  ↑/↓ select  ←/→ adjust  PgUp/PgDn store ±5  x match mode  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

fn legend_line(chart: &crate::domain::ChartSpec) -> Line<'_> {
    let mut spans = Vec::new();
    for (idx, s) in chart.series.iter().enumerate() {
        spans.push(Span::styled("■ ", Style::default().fg(series_color(idx))));
        spans.push(Span::raw(format!("{}  ", s.name)));
    }
    if chart.trend.is_some() {
        let c = TREND_COLOR;
        spans.push(Span::styled("■ ", Style::default().fg(Color::Rgb(c.0, c.1, c.2))));
        spans.push(Span::raw("Trendline"));
    }
    Line::from(spans)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::cli::SourceArgs;
    use crate::error::ErrorKind;
    use crate::pages::{overview, sales};

    fn demo_session() -> Session {
        Session::open(&SourceArgs {
            data: PathBuf::from("unused.csv"),
            pick: false,
            demo: true,
            seed: 11,
        })
        .unwrap()
    }

    #[test]
    fn opens_on_requested_page() {
        let app = App::new(demo_session(), Some(overview::NAME), FilterSelection::default()).unwrap();
        assert_eq!(app.current_page(), overview::NAME);
        assert_eq!(app.controls(), &[Control::Store, Control::Year]);
        assert!(app.view.is_some());
    }

    #[test]
    fn unknown_start_page_is_rejected() {
        let err = App::new(demo_session(), Some("Nope"), FilterSelection::default())
            .err()
            .unwrap();
        assert_eq!(err.kind(), ErrorKind::UnknownPage);
    }

    #[test]
    fn keys_move_store_within_control_range() {
        let mut app = App::new(demo_session(), Some(sales::NAME), FilterSelection::default()).unwrap();
        app.handle_key(KeyCode::Left).unwrap();
        assert_eq!(app.selection.store.value, 0);

        app.handle_key(KeyCode::Right).unwrap();
        app.handle_key(KeyCode::PageUp).unwrap();
        assert_eq!(app.selection.store.value, 6);

        for _ in 0..20 {
            app.handle_key(KeyCode::PageUp).unwrap();
        }
        assert_eq!(app.selection.store.value, STORE_CONTROL_MAX);
        // Demo data has stores 1..=45, so only store 45 remains.
        let view = app.view.as_ref().unwrap();
        assert!(view.rows_in_view > 0);
    }

    #[test]
    fn year_control_cycles_through_options() {
        let mut app = App::new(demo_session(), Some(overview::NAME), FilterSelection::default()).unwrap();
        let all_rows = app.view.as_ref().unwrap().rows_in_view;

        app.handle_key(KeyCode::Down).unwrap();
        app.handle_key(KeyCode::Right).unwrap();
        assert_eq!(app.selection.year, YearChoice::Year(2010));
        assert!(app.view.as_ref().unwrap().rows_in_view < all_rows);

        app.handle_key(KeyCode::Left).unwrap();
        assert_eq!(app.selection.year, YearChoice::AllYears);
        app.handle_key(KeyCode::Left).unwrap();
        assert_eq!(app.selection.year, *app.years.last().unwrap());
    }

    #[test]
    fn tab_wraps_pages_and_resets_focus() {
        let mut app = App::new(demo_session(), None, FilterSelection::default()).unwrap();
        assert_eq!(app.current_page(), sales::NAME);
        app.handle_key(KeyCode::Tab).unwrap();
        assert_eq!(app.current_page(), overview::NAME);
        app.handle_key(KeyCode::Down).unwrap();
        assert_eq!(app.focused, 1);
        app.handle_key(KeyCode::Tab).unwrap();
        assert_eq!(app.current_page(), sales::NAME);
        assert_eq!(app.focused, 0);
        assert!(app.handle_key(KeyCode::Char('q')).unwrap());
    }

    #[test]
    fn header_stats_are_computed_once_at_startup() {
        let mut app = App::new(demo_session(), None, FilterSelection::default()).unwrap();
        let expected = app.session.dataset().stats();
        assert_eq!(app.stats, expected);
        assert_eq!(app.stats.n_stores, 45);

        app.handle_key(KeyCode::Tab).unwrap();
        app.handle_key(KeyCode::PageUp).unwrap();
        assert_eq!(app.stats, expected);
    }

    #[test]
    fn match_mode_toggles() {
        let mut app = App::new(demo_session(), None, FilterSelection::default()).unwrap();
        app.handle_key(KeyCode::Char('x')).unwrap();
        assert_eq!(app.selection.store.mode, crate::domain::StoreMatch::Exact);
        // Exact store 0 matches nothing in the demo data.
        assert_eq!(app.view.as_ref().unwrap().rows_in_view, 0);
    }
}
