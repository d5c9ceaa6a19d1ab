//! Interactive metadata grid.
//!
//! Mouse-driven: press starts a selection, dragging extends it, and
//! dragging the bottom-right handle cell spreads it. Releasing a spread
//! builds the fill actions, runs the first one immediately, and opens a
//! small menu with the alternatives. Escape clears everything, q quits.

pub mod data;

use std::io::{self, stdout, Stdout};
use std::time::{Duration, Instant};

use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, MouseButton,
        MouseEvent, MouseEventKind,
    },
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout, Rect as UiRect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame, Terminal,
};

use metagrid_engine::apply::{apply_action, RowStore};
use metagrid_engine::fill::{build_fill_actions, FillAction};
use metagrid_engine::selection::{GridTarget, SelectionTracker};

use crate::util;
use data::GridData;

/// Store used for `--file` grids: accepts every write locally without
/// touching the network.
pub struct LocalStore;

impl RowStore for LocalStore {
    fn save_row(
        &self,
        row: &metagrid_engine::row::EntityRow,
    ) -> Result<metagrid_engine::row::EntityRow, metagrid_engine::apply::StoreError> {
        Ok(row.clone())
    }
}

struct Notice {
    text: String,
    is_error: bool,
    expires: Instant,
}

struct GridApp {
    data: GridData,
    store: Box<dyn RowStore>,
    tracker: SelectionTracker,
    /// Candidate actions from the last completed spread (first one
    /// already executed); offered in the follow-up menu.
    actions: Vec<FillAction>,
    show_menu: bool,
    notice: Option<Notice>,
    notification_secs: u64,
    hovered: Option<(usize, usize)>,
    scroll_row: usize,
    scroll_col: usize,
    should_quit: bool,
    row_num_width: usize,
    /// Grid area and visible columns captured at draw time, used to map
    /// pointer coordinates back to cells.
    grid_area: UiRect,
    visible_cols: Vec<usize>,
}

impl GridApp {
    fn new(data: GridData, store: Box<dyn RowStore>, notification_secs: u64) -> Self {
        let row_num_width = digits(data.num_rows()).max(3) + 1;
        Self {
            data,
            store,
            tracker: SelectionTracker::new(),
            actions: Vec::new(),
            show_menu: false,
            notice: None,
            notification_secs,
            hovered: None,
            scroll_row: 0,
            scroll_col: 0,
            should_quit: false,
            row_num_width,
            grid_area: UiRect::default(),
            visible_cols: Vec::new(),
        }
    }

    // ── Notifications ───────────────────────────────────────────────

    fn notify(&mut self, text: String, is_error: bool) {
        self.notice = Some(Notice {
            text,
            is_error,
            expires: Instant::now() + Duration::from_secs(self.notification_secs),
        });
    }

    fn expire_notice(&mut self) {
        if let Some(notice) = &self.notice {
            if Instant::now() >= notice.expires {
                self.notice = None;
            }
        }
    }

    // ── Input ───────────────────────────────────────────────────────

    fn handle_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Esc => {
                self.tracker.reset();
                self.actions.clear();
                self.show_menu = false;
            }
            KeyCode::Char(c @ '1'..='3') if self.show_menu => {
                let index = (c as usize) - ('1' as usize);
                if index < self.actions.len() {
                    // picking an alternate restores pre-action state
                    // before running it
                    self.run_action(index, true);
                }
            }
            KeyCode::Up => self.scroll_row = self.scroll_row.saturating_sub(1),
            KeyCode::Down => {
                if self.scroll_row + 1 < self.data.num_rows() {
                    self.scroll_row += 1;
                }
            }
            KeyCode::Left => self.scroll_col = self.scroll_col.saturating_sub(1),
            KeyCode::Right => {
                if self.scroll_col + 1 < self.data.num_cols() {
                    self.scroll_col += 1;
                }
            }
            KeyCode::PageUp => self.scroll_row = self.scroll_row.saturating_sub(20),
            KeyCode::PageDown => {
                if self.data.num_rows() > 0 {
                    self.scroll_row = (self.scroll_row + 20).min(self.data.num_rows() - 1);
                }
            }
            _ => {}
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if let Some((row, column)) = self.cell_at(mouse.column, mouse.row) {
                    let target = self.target_for(row, column);
                    let selectable = matches!(target, GridTarget::FillHandle { .. })
                        || self.data.columns.get(column).is_some_and(|c| c.selectable);
                    if selectable {
                        self.tracker.begin(target);
                    }
                }
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                if let Some((row, column)) = self.cell_at(mouse.column, mouse.row) {
                    self.tracker.update(row, column);
                }
            }
            MouseEventKind::Up(MouseButton::Left) => self.finish_drag(),
            MouseEventKind::Moved => self.hovered = self.cell_at(mouse.column, mouse.row),
            MouseEventKind::ScrollUp => self.scroll_row = self.scroll_row.saturating_sub(3),
            MouseEventKind::ScrollDown => {
                if self.data.num_rows() > 0 {
                    self.scroll_row = (self.scroll_row + 3).min(self.data.num_rows() - 1);
                }
            }
            _ => {}
        }
    }

    /// Typed event payload for a pointer press: the bottom-right corner
    /// of the highlighted rectangle acts as the fill handle; everything
    /// else is a plain cell. Unselectable columns produce no target.
    fn target_for(&self, row: usize, column: usize) -> GridTarget {
        let handle_rect = self.tracker.spread_rect().or(self.tracker.selection());
        if handle_rect.is_some_and(|r| r.is_handle_corner(column, row)) {
            GridTarget::FillHandle { row, column }
        } else {
            GridTarget::Cell { row, column }
        }
    }

    fn finish_drag(&mut self) {
        let Some(outcome) = self.tracker.finish() else {
            return;
        };

        let bound = outcome.source.union(&outcome.target);
        let backup: Vec<_> = bound
            .rows()
            .filter_map(|r| self.data.rows.get(r).cloned())
            .collect();

        let actions = build_fill_actions(
            &self.data.rows,
            &self.data.columns,
            &outcome.source,
            &outcome.target,
            &backup,
        )
        .unwrap_or_default();

        if actions.is_empty() {
            return;
        }

        self.actions = actions;
        self.show_menu = true;
        // the first action runs without waiting for a menu choice
        self.run_action(0, false);
    }

    /// Actions on this grid are serialized: the blocking store call
    /// runs to completion before the loop reads the next event, so an
    /// Undo can never overlap an in-flight batch.
    fn run_action(&mut self, index: usize, revert_first: bool) {
        let action = self.actions[index].clone();
        let outcome = apply_action(
            self.store.as_ref(),
            &action,
            &mut self.data.rows,
            revert_first,
        );
        self.data.refresh_widths();

        match outcome.error_summary() {
            Some(summary) => self.notify(summary, true),
            None => self.notify(
                format!("{}: {} row(s) saved", action.title, outcome.applied.len()),
                false,
            ),
        }
    }

    // ── Hit testing ─────────────────────────────────────────────────

    /// Map pointer coordinates to a data cell, if any. The first grid
    /// line is the header; data rows follow.
    fn cell_at(&self, x: u16, y: u16) -> Option<(usize, usize)> {
        let area = self.grid_area;
        if y <= area.y || y >= area.y + area.height {
            return None;
        }
        let row = self.scroll_row + (y - area.y - 1) as usize;
        if row >= self.data.num_rows() {
            return None;
        }

        let mut cursor = area.x as usize + self.row_num_width;
        for &col in &self.visible_cols {
            let width = self.data.col_widths.get(col).copied().unwrap_or(4) + 1;
            if (x as usize) >= cursor && (x as usize) < cursor + width {
                return Some((row, col));
            }
            cursor += width;
        }
        None
    }

    fn visible_columns(&self, available: usize) -> Vec<usize> {
        let mut cols = Vec::new();
        let mut used = 0usize;
        for c in self.scroll_col..self.data.num_cols() {
            let w = self.data.col_widths.get(c).copied().unwrap_or(4) + 1;
            if used + w > available && !cols.is_empty() {
                break;
            }
            used += w;
            cols.push(c);
        }
        cols
    }

    // ── Rendering ───────────────────────────────────────────────────

    fn draw(&mut self, frame: &mut Frame) {
        let area = frame.area();
        let chunks = Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(area);

        self.grid_area = chunks[1];
        self.visible_cols =
            self.visible_columns((chunks[1].width as usize).saturating_sub(self.row_num_width + 1));

        self.draw_title(frame, chunks[0]);
        self.draw_grid(frame, chunks[1]);
        self.draw_status(frame, chunks[2]);

        if self.show_menu && !self.actions.is_empty() {
            self.draw_menu(frame, area);
        }
    }

    fn draw_title(&self, frame: &mut Frame, area: UiRect) {
        let title = format!(
            " metagrid — {} rows × {} columns ",
            self.data.num_rows(),
            self.data.num_cols()
        );
        frame.render_widget(
            Paragraph::new(title).style(Style::default().fg(Color::Black).bg(Color::White)),
            area,
        );
    }

    fn draw_grid(&self, frame: &mut Frame, area: UiRect) {
        let mut lines = Vec::with_capacity(area.height as usize);

        // header row
        let mut header = vec![Span::raw(" ".repeat(self.row_num_width))];
        for &col in &self.visible_cols {
            let width = self.data.col_widths[col];
            header.push(Span::raw(" "));
            header.push(Span::styled(
                util::pad_right(&self.data.columns[col].key, width),
                Style::default().add_modifier(Modifier::BOLD),
            ));
        }
        lines.push(Line::from(header));

        let visible_rows = (area.height as usize).saturating_sub(1);
        for screen_row in 0..visible_rows {
            let row = self.scroll_row + screen_row;
            if row >= self.data.num_rows() {
                break;
            }
            lines.push(self.grid_line(row));
        }

        frame.render_widget(Paragraph::new(lines), area);
    }

    fn grid_line(&self, row: usize) -> Line<'static> {
        let mut spans = vec![Span::styled(
            format!("{:>width$}", row + 1, width = self.row_num_width),
            Style::default().fg(Color::DarkGray),
        )];

        let selection = self.tracker.selection();
        for &col in &self.visible_cols {
            let width = self.data.col_widths[col];

            // separators double as the selection's vertical borders
            let on_border = selection.is_some_and(|s| {
                s.is_left_edge(col, row) || (col > 0 && s.is_right_edge(col - 1, row))
            });
            spans.push(if on_border {
                Span::styled("▏", Style::default().fg(Color::Cyan))
            } else {
                Span::raw(" ")
            });

            spans.push(Span::styled(
                util::pad_right(&self.data.cell_text(row, col), width),
                self.cell_style(row, col),
            ));
        }
        Line::from(spans)
    }

    fn cell_style(&self, row: usize, col: usize) -> Style {
        let selection = self.tracker.selection();
        let spread = self.tracker.spread_rect();
        let mut style = Style::default();

        if self.hovered == Some((row, col)) {
            style = style.bg(Color::Rgb(50, 50, 60));
        }
        if let Some(spread) = spread {
            if spread.contains(col, row) {
                style = style.bg(Color::Blue).fg(Color::White);
            }
        }
        if let Some(sel) = selection {
            if sel.contains(col, row) {
                style = style.bg(Color::DarkGray).fg(Color::White);
                if sel.is_top_edge(col, row) || sel.is_bottom_edge(col, row) {
                    style = style.add_modifier(Modifier::UNDERLINED);
                }
            }
        }

        let handle_rect = spread.or(selection);
        if handle_rect.is_some_and(|r| r.is_handle_corner(col, row)) {
            style = Style::default().bg(Color::Yellow).fg(Color::Black);
        }
        style
    }

    fn draw_status(&self, frame: &mut Frame, area: UiRect) {
        let (text, style) = match &self.notice {
            Some(notice) if notice.is_error => (
                notice.text.clone(),
                Style::default().fg(Color::White).bg(Color::Red),
            ),
            Some(notice) => (
                notice.text.clone(),
                Style::default().fg(Color::Black).bg(Color::Green),
            ),
            None => (
                " drag: select · drag corner: fill · 1-3: action · Esc: clear · q: quit".into(),
                Style::default().fg(Color::Gray),
            ),
        };
        frame.render_widget(Paragraph::new(text).style(style), area);
    }

    fn draw_menu(&self, frame: &mut Frame, area: UiRect) {
        let width = (self
            .actions
            .iter()
            .map(|a| a.title.len())
            .max()
            .unwrap_or(8)
            + 8)
        .min(area.width as usize) as u16;
        let height = self.actions.len() as u16 + 2;
        let popup = UiRect {
            x: area.width.saturating_sub(width) / 2,
            y: area.height.saturating_sub(height) / 2,
            width,
            height,
        };

        let lines: Vec<Line> = self
            .actions
            .iter()
            .enumerate()
            .map(|(i, action)| {
                Line::from(vec![
                    Span::styled(
                        format!(" {} ", i + 1),
                        Style::default().fg(Color::Yellow),
                    ),
                    Span::raw(action.title.clone()),
                ])
            })
            .collect();

        frame.render_widget(Clear, popup);
        frame.render_widget(
            Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(" actions ")),
            popup,
        );
    }

    // ── Event loop ──────────────────────────────────────────────────

    fn event_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> io::Result<()> {
        while !self.should_quit {
            self.expire_notice();
            terminal.draw(|frame| self.draw(frame))?;
            if event::poll(Duration::from_millis(100))? {
                match event::read()? {
                    Event::Key(key) => self.handle_key(key),
                    Event::Mouse(mouse) => self.handle_mouse(mouse),
                    _ => {}
                }
            }
        }
        Ok(())
    }
}

/// Run the interactive grid until the user quits.
pub fn run(data: GridData, store: Box<dyn RowStore>, notification_secs: u64) -> io::Result<()> {
    let mut app = GridApp::new(data, store, notification_secs);

    terminal::enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    stdout().execute(EnableMouseCapture)?;

    let backend = CrosstermBackend::new(stdout());
    let mut terminal = Terminal::new(backend)?;
    let result = app.event_loop(&mut terminal);

    terminal::disable_raw_mode()?;
    stdout().execute(DisableMouseCapture)?;
    stdout().execute(LeaveAlternateScreen)?;

    result
}

fn digits(n: usize) -> usize {
    if n == 0 {
        1
    } else {
        (n as f64).log10().floor() as usize + 1
    }
}
