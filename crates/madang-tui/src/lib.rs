// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use madang_app::{
    Debouncer, ListCommand, ListController, ListKind, ListPayload, ListQuery, ListRecord,
    ListView, LoadOutcome, PAGE_SIZES, PageItem, PaginationView, PendingLoad, TableBody,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table};
use std::collections::BTreeMap;
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::{Duration, Instant};

const IDLE_POLL: Duration = Duration::from_millis(120);
const STATUS_TTL: Duration = Duration::from_secs(4);
const LOADING_MARK: &str = "loading…";

/// What a row action asks the screen to do next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowAction {
    Status(String),
    Switch(ListKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenExit {
    Quit,
    Switch(ListKind),
}

#[derive(Debug)]
pub enum InternalEvent<R> {
    ClearStatus {
        token: u64,
    },
    ListLoaded {
        seq: u64,
        result: Result<ListPayload<R>>,
    },
}

/// Data access behind a list screen.
pub trait ListRuntime<R> {
    fn load_list(&mut self, query: &ListQuery) -> Result<ListPayload<R>>;

    /// Fetches `query` and reports back on `tx` tagged with `seq`. The
    /// default fetches inline before returning.
    fn spawn_list_fetch(
        &mut self,
        seq: u64,
        query: ListQuery,
        tx: Sender<InternalEvent<R>>,
    ) -> Result<()> {
        let result = self.load_list(&query);
        tx.send(InternalEvent::ListLoaded { seq, result })
            .map_err(|_| anyhow!("list event channel closed"))?;
        Ok(())
    }

    fn activate_row(&mut self, _kind: ListKind, _record_id: i64) -> Result<Option<RowAction>> {
        Ok(None)
    }

    /// Places an order for the selected row. Only screens that sell
    /// something answer with an action.
    fn order_row(&mut self, _kind: ListKind, _record_id: i64) -> Result<Option<RowAction>> {
        Ok(None)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RowKey {
    Activate,
    Order,
}

struct Screen<R> {
    controller: ListController<R>,
    debouncer: Debouncer<Vec<(String, String)>>,
    drafts: BTreeMap<&'static str, String>,
    selected_col: usize,
    selected_row: usize,
    filter_cursor: usize,
    editing: bool,
    status: String,
    status_token: u64,
}

impl<R: ListRecord> Screen<R> {
    fn new(controller: ListController<R>, quiet: Duration) -> Self {
        let drafts = controller
            .state()
            .filters
            .iter()
            .map(|(key, value)| (*key, value.clone()))
            .collect();
        Self {
            controller,
            debouncer: Debouncer::new(quiet),
            drafts,
            selected_col: 0,
            selected_row: 0,
            filter_cursor: 0,
            editing: false,
            status: String::new(),
            status_token: 0,
        }
    }

    fn kind(&self) -> ListKind {
        self.controller.kind()
    }

    fn draft_fields(&self) -> Vec<(String, String)> {
        self.kind()
            .filters()
            .iter()
            .map(|field| {
                let value = self.drafts.get(field.key).cloned().unwrap_or_default();
                (field.key.to_owned(), value)
            })
            .collect()
    }

    fn active_filter_key(&self) -> Option<&'static str> {
        self.kind()
            .filters()
            .get(self.filter_cursor)
            .map(|field| field.key)
    }

    fn selected_record_id(&self, view: &ListView) -> Option<i64> {
        match &view.body {
            TableBody::Rows(rows) => rows.get(self.selected_row).map(|row| row.id),
            TableBody::Empty { .. } | TableBody::Error { .. } => None,
        }
    }
}

pub fn run_app<R, T>(
    runtime: &mut T,
    controller: ListController<R>,
    quiet: Duration,
) -> Result<ScreenExit>
where
    R: ListRecord + Send + 'static,
    T: ListRuntime<R>,
{
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let mut screen = Screen::new(controller, quiet);
    tracing::info!(kind = screen.kind().as_str(), "opening screen");
    let (internal_tx, internal_rx) = mpsc::channel();
    let initial = screen.controller.reload();
    issue(&mut screen, runtime, &internal_tx, initial);

    let mut result = Ok(ScreenExit::Quit);
    loop {
        process_internal_events(&mut screen, &internal_tx, &internal_rx);
        flush_debounced_filters(&mut screen, runtime, &internal_tx, Instant::now());

        if let Err(error) = terminal.draw(|frame| render(frame, &screen)) {
            result = Err(error).context("draw frame");
            break;
        }

        let timeout = poll_timeout(screen.debouncer.deadline(), Instant::now());
        let has_event = match event::poll(timeout).context("poll event") {
            Ok(has_event) => has_event,
            Err(error) => {
                result = Err(error);
                break;
            }
        };
        if !has_event {
            continue;
        }
        match event::read().context("read event") {
            Ok(Event::Key(key)) => {
                if let Some(exit) =
                    handle_key_event(&mut screen, runtime, &internal_tx, key, Instant::now())
                {
                    result = Ok(exit);
                    break;
                }
            }
            Ok(_) => {}
            Err(error) => {
                result = Err(error);
                break;
            }
        }
    }

    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    result
}

/// Sleeps no longer than the pending filter deadline.
fn poll_timeout(deadline: Option<Instant>, now: Instant) -> Duration {
    match deadline {
        Some(deadline) => deadline.saturating_duration_since(now).min(IDLE_POLL),
        None => IDLE_POLL,
    }
}

fn issue<R, T>(
    screen: &mut Screen<R>,
    runtime: &mut T,
    internal_tx: &Sender<InternalEvent<R>>,
    pending: PendingLoad,
) where
    R: ListRecord + Send + 'static,
    T: ListRuntime<R>,
{
    let seq = pending.seq;
    if let Err(error) = runtime.spawn_list_fetch(seq, pending.query, internal_tx.clone()) {
        apply_outcome(screen, internal_tx, seq, Err(error));
    }
}

fn process_internal_events<R: ListRecord + Send + 'static>(
    screen: &mut Screen<R>,
    tx: &Sender<InternalEvent<R>>,
    rx: &Receiver<InternalEvent<R>>,
) {
    while let Ok(event) = rx.try_recv() {
        match event {
            InternalEvent::ClearStatus { token } if token == screen.status_token => {
                screen.status.clear();
            }
            InternalEvent::ClearStatus { .. } => {}
            InternalEvent::ListLoaded { seq, result } => {
                apply_outcome(screen, tx, seq, result);
            }
        }
    }
}

fn apply_outcome<R: ListRecord + Send + 'static>(
    screen: &mut Screen<R>,
    tx: &Sender<InternalEvent<R>>,
    seq: u64,
    result: Result<ListPayload<R>>,
) {
    match screen.controller.complete(seq, result) {
        LoadOutcome::Applied { rows } => {
            screen.selected_row = screen.selected_row.min(rows.saturating_sub(1));
        }
        LoadOutcome::Failed(message) => {
            emit_status(screen, tx, format!("load failed: {message} (r to retry)"));
        }
        LoadOutcome::Stale => {}
    }
}

fn flush_debounced_filters<R, T>(
    screen: &mut Screen<R>,
    runtime: &mut T,
    internal_tx: &Sender<InternalEvent<R>>,
    now: Instant,
) where
    R: ListRecord + Send + 'static,
    T: ListRuntime<R>,
{
    let Some(fields) = screen.debouncer.poll(now) else {
        return;
    };
    tracing::debug!(
        kind = screen.kind().as_str(),
        quiet_ms = screen.debouncer.quiet_period().as_millis() as u64,
        "quiet period elapsed; applying filters"
    );
    if let Some(pending) = screen.controller.dispatch(ListCommand::SetFilter(fields)) {
        issue(screen, runtime, internal_tx, pending);
    }
}

fn schedule_status_clear<R: Send + 'static>(internal_tx: &Sender<InternalEvent<R>>, token: u64) {
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(STATUS_TTL);
        let _ = sender.send(InternalEvent::ClearStatus { token });
    });
}

fn emit_status<R: Send + 'static>(
    screen: &mut Screen<R>,
    internal_tx: &Sender<InternalEvent<R>>,
    message: impl Into<String>,
) {
    screen.status = message.into();
    screen.status_token = screen.status_token.saturating_add(1);
    schedule_status_clear(internal_tx, screen.status_token);
}

fn handle_key_event<R, T>(
    screen: &mut Screen<R>,
    runtime: &mut T,
    internal_tx: &Sender<InternalEvent<R>>,
    key: KeyEvent,
    now: Instant,
) -> Option<ScreenExit>
where
    R: ListRecord + Send + 'static,
    T: ListRuntime<R>,
{
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Some(ScreenExit::Quit);
    }

    if screen.editing {
        handle_filter_key(screen, runtime, internal_tx, key, now);
        return None;
    }

    let column_count = screen.kind().columns().len();
    let pending = match key.code {
        KeyCode::Char('q') | KeyCode::Esc => return Some(ScreenExit::Quit),
        KeyCode::Left => {
            screen.selected_col = screen.selected_col.saturating_sub(1);
            None
        }
        KeyCode::Right => {
            screen.selected_col = (screen.selected_col + 1).min(column_count.saturating_sub(1));
            None
        }
        KeyCode::Up => {
            screen.selected_row = screen.selected_row.saturating_sub(1);
            None
        }
        KeyCode::Down => {
            let rows = screen.controller.records().len();
            screen.selected_row = (screen.selected_row + 1).min(rows.saturating_sub(1));
            None
        }
        KeyCode::Char('s') | KeyCode::Enter => {
            let column = screen
                .kind()
                .columns()
                .get(screen.selected_col)
                .map(|spec| spec.key)
                .unwrap_or_default();
            screen.controller.set_sort(column)
        }
        KeyCode::Char('/') => {
            if screen.kind().filters().is_empty() {
                emit_status(screen, internal_tx, "no filters on this screen");
            } else {
                screen.editing = true;
            }
            None
        }
        KeyCode::Tab => {
            cycle_filter(screen);
            None
        }
        KeyCode::Char('n') => screen.controller.next_page(),
        KeyCode::Char('p') => screen.controller.prev_page(),
        KeyCode::Char('g') => screen.controller.go_to_page(1),
        KeyCode::Char('G') => screen.controller.last_page(),
        KeyCode::Char(digit @ '1'..='9') => {
            let index = digit as usize - '1' as usize;
            let targets = screen.controller.view().pagination.targets();
            targets
                .get(index)
                .and_then(|target| screen.controller.go_to_page(*target))
        }
        KeyCode::Char('+') => {
            let size = cycle_page_size(screen.controller.state().page_size, true);
            screen.controller.set_page_size(size)
        }
        KeyCode::Char('-') => {
            let size = cycle_page_size(screen.controller.state().page_size, false);
            screen.controller.set_page_size(size)
        }
        KeyCode::Char('r') => Some(screen.controller.reload()),
        KeyCode::Char('x') => {
            if !screen.controller.state().has_active_filters() && screen.drafts.is_empty() {
                emit_status(screen, internal_tx, "no filters to clear");
                return None;
            }
            screen.debouncer.cancel();
            screen.drafts.clear();
            Some(screen.controller.clear_filters())
        }
        KeyCode::Char('l') => {
            return activate_selected_row(screen, runtime, internal_tx, RowKey::Activate);
        }
        KeyCode::Char('o') => {
            return activate_selected_row(screen, runtime, internal_tx, RowKey::Order);
        }
        _ => None,
    };

    if let Some(pending) = pending {
        issue(screen, runtime, internal_tx, pending);
    }
    None
}

fn handle_filter_key<R, T>(
    screen: &mut Screen<R>,
    runtime: &mut T,
    internal_tx: &Sender<InternalEvent<R>>,
    key: KeyEvent,
    now: Instant,
) where
    R: ListRecord + Send + 'static,
    T: ListRuntime<R>,
{
    let Some(field) = screen.active_filter_key() else {
        screen.editing = false;
        return;
    };
    match key.code {
        KeyCode::Esc => {
            screen.editing = false;
        }
        KeyCode::Enter => {
            screen.editing = false;
            screen.debouncer.cancel();
            let fields = screen.draft_fields();
            if let Some(pending) = screen.controller.dispatch(ListCommand::SetFilter(fields)) {
                issue(screen, runtime, internal_tx, pending);
            }
        }
        KeyCode::Tab => cycle_filter(screen),
        KeyCode::Backspace => {
            screen.drafts.entry(field).or_default().pop();
            queue_filter_change(screen, runtime, internal_tx, now);
        }
        KeyCode::Char(ch) => {
            screen.drafts.entry(field).or_default().push(ch);
            queue_filter_change(screen, runtime, internal_tx, now);
        }
        _ => {}
    }
}

fn queue_filter_change<R, T>(
    screen: &mut Screen<R>,
    runtime: &mut T,
    internal_tx: &Sender<InternalEvent<R>>,
    now: Instant,
) where
    R: ListRecord + Send + 'static,
    T: ListRuntime<R>,
{
    let fields = screen.draft_fields();
    if screen.kind().debounced_filters() {
        screen.debouncer.push(now, fields);
    } else if let Some(pending) = screen.controller.dispatch(ListCommand::SetFilter(fields)) {
        issue(screen, runtime, internal_tx, pending);
    }
}

fn cycle_filter<R: ListRecord>(screen: &mut Screen<R>) {
    let count = screen.kind().filters().len();
    if count > 0 {
        screen.filter_cursor = (screen.filter_cursor + 1) % count;
    }
}

fn cycle_page_size(current: u32, forward: bool) -> u32 {
    let index = PAGE_SIZES
        .iter()
        .position(|size| *size == current)
        .unwrap_or(0);
    let count = PAGE_SIZES.len();
    let next = if forward {
        (index + 1) % count
    } else {
        (index + count - 1) % count
    };
    PAGE_SIZES[next]
}

fn activate_selected_row<R, T>(
    screen: &mut Screen<R>,
    runtime: &mut T,
    internal_tx: &Sender<InternalEvent<R>>,
    key: RowKey,
) -> Option<ScreenExit>
where
    R: ListRecord + Send + 'static,
    T: ListRuntime<R>,
{
    let view = screen.controller.view();
    let Some(record_id) = screen.selected_record_id(&view) else {
        emit_status(screen, internal_tx, "no row selected");
        return None;
    };
    let result = match key {
        RowKey::Activate => runtime.activate_row(screen.kind(), record_id),
        RowKey::Order => runtime.order_row(screen.kind(), record_id),
    };
    match result {
        Ok(Some(RowAction::Switch(kind))) => Some(ScreenExit::Switch(kind)),
        Ok(Some(RowAction::Status(message))) => {
            emit_status(screen, internal_tx, message);
            None
        }
        Ok(None) => {
            emit_status(screen, internal_tx, "no action for this screen");
            None
        }
        Err(error) => {
            emit_status(screen, internal_tx, format!("{error:#}"));
            None
        }
    }
}

fn render<R: ListRecord>(frame: &mut ratatui::Frame<'_>, screen: &Screen<R>) {
    let view = screen.controller.view();
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(3),
        ])
        .split(frame.area());

    let header = Paragraph::new(title_text(&view)).block(
        Block::default()
            .title("madang")
            .borders(Borders::ALL)
            .style(Style::default().fg(Color::Cyan)),
    );
    frame.render_widget(header, layout[0]);

    render_table(frame, layout[1], screen, &view);

    let filters = Paragraph::new(filter_text(
        &view,
        &screen.drafts,
        screen.filter_cursor,
        screen.editing,
    ))
    .style(Style::default().fg(Color::Gray));
    frame.render_widget(filters, layout[2]);

    let pagination = Paragraph::new(pagination_text(&view.pagination, view.page_size))
        .alignment(Alignment::Center);
    frame.render_widget(pagination, layout[3]);

    let status = Paragraph::new(status_text(screen))
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status, layout[4]);
}

fn render_table<R>(frame: &mut ratatui::Frame<'_>, area: Rect, screen: &Screen<R>, view: &ListView) {
    let block = Block::default()
        .title(view.kind.title())
        .borders(Borders::ALL);

    let rows = match &view.body {
        TableBody::Rows(rows) => rows,
        TableBody::Empty { message, .. } => {
            let empty = Paragraph::new(message.as_str())
                .alignment(Alignment::Center)
                .style(Style::default().fg(Color::DarkGray))
                .block(block);
            frame.render_widget(empty, area);
            return;
        }
        TableBody::Error { message, .. } => {
            let error = Paragraph::new(format!("{message} (r to retry)"))
                .alignment(Alignment::Center)
                .style(Style::default().fg(Color::Red))
                .block(block);
            frame.render_widget(error, area);
            return;
        }
    };

    let header_cells = view.columns.iter().enumerate().map(|(index, column)| {
        let mut style = Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD);
        if index == screen.selected_col {
            style = style.fg(Color::Cyan).add_modifier(Modifier::UNDERLINED);
        }
        Cell::from(column.title()).style(style)
    });
    let header = Row::new(header_cells);

    let body = rows.iter().enumerate().map(|(row_index, row)| {
        let style = if row_index == screen.selected_row {
            Style::default().bg(Color::DarkGray)
        } else {
            Style::default()
        };
        Row::new(row.cells.iter().cloned().map(Cell::from)).style(style)
    });

    let widths = vec![Constraint::Min(6); view.columns.len().max(1)];
    let table = Table::new(body, widths)
        .header(header)
        .column_spacing(1)
        .block(block);
    frame.render_widget(table, area);
}

fn title_text(view: &ListView) -> String {
    if view.loading {
        format!("{}  {LOADING_MARK}", view.kind.title())
    } else {
        view.kind.title().to_owned()
    }
}

fn filter_text(
    view: &ListView,
    drafts: &BTreeMap<&'static str, String>,
    cursor: usize,
    editing: bool,
) -> String {
    if view.filters.is_empty() {
        return String::new();
    }
    let parts: Vec<String> = view
        .filters
        .iter()
        .enumerate()
        .map(|(index, filter)| {
            let value = drafts
                .get(filter.field.key)
                .map_or(filter.value.as_str(), String::as_str);
            if index == cursor && editing {
                format!("[{}: {value}_]", filter.field.label)
            } else if index == cursor {
                format!("[{}: {value}]", filter.field.label)
            } else {
                format!("{}: {value}", filter.field.label)
            }
        })
        .collect();
    format!("/ {}", parts.join("  "))
}

fn pagination_text(pagination: &PaginationView, page_size: u32) -> String {
    let nav = |symbol: &'static str, enabled: bool| if enabled { symbol } else { " " };
    let strip: Vec<String> = pagination
        .items
        .iter()
        .map(|item| match item {
            PageItem::Page {
                number,
                current: true,
            } => format!("[{number}]"),
            PageItem::Page { number, .. } => number.to_string(),
            PageItem::Ellipsis => "…".to_owned(),
        })
        .collect();
    format!(
        "{} {} {} {} {}   {} | {} | {page_size}/page",
        nav("«", pagination.first.enabled),
        nav("‹", pagination.prev.enabled),
        strip.join(" "),
        nav("›", pagination.next.enabled),
        nav("»", pagination.last.enabled),
        pagination.page_info(),
        pagination.items_info(),
    )
}

fn status_text<R>(screen: &Screen<R>) -> String {
    if !screen.status.is_empty() {
        return screen.status.clone();
    }
    if screen.editing {
        return "type to filter  tab next field  enter apply  esc done".to_owned();
    }
    "←/→ column  s sort  / filter  n/p page  +/- size  r reload  x clear  l select  o order  q quit"
        .to_owned()
}

#[cfg(test)]
mod tests {
    use super::{
        InternalEvent, ListRuntime, RowAction, Screen, ScreenExit, cycle_page_size,
        filter_text, handle_key_event, issue, pagination_text, poll_timeout,
        process_internal_events, flush_debounced_filters, status_text,
    };
    use anyhow::Result;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use madang_app::{
        Book, ListController, ListKind, ListPayload, ListQuery, ListSource, PaginationView,
        SortDirection, TableBody,
    };
    use madang_testkit::{BookstoreFaker, FakeSource, madang_books};
    use std::collections::BTreeMap;
    use std::sync::mpsc::{self, Receiver, Sender};
    use std::time::{Duration, Instant};

    struct TestRuntime {
        source: FakeSource<Book>,
        activated: Vec<i64>,
        ordered: Vec<i64>,
        next_action: Option<RowAction>,
    }

    impl TestRuntime {
        fn new(books: Vec<Book>) -> Self {
            Self {
                source: FakeSource::new(books),
                activated: Vec::new(),
                ordered: Vec::new(),
                next_action: None,
            }
        }

        fn requests(&self) -> &[ListQuery] {
            self.source.requests()
        }
    }

    impl ListRuntime<Book> for TestRuntime {
        fn load_list(&mut self, query: &ListQuery) -> Result<ListPayload<Book>> {
            self.source.fetch_list(query)
        }

        fn activate_row(&mut self, _kind: ListKind, record_id: i64) -> Result<Option<RowAction>> {
            self.activated.push(record_id);
            Ok(self.next_action.take())
        }

        fn order_row(&mut self, kind: ListKind, record_id: i64) -> Result<Option<RowAction>> {
            if kind != ListKind::Books {
                return Ok(None);
            }
            self.ordered.push(record_id);
            Ok(Some(RowAction::Status(format!("ordered book {record_id}"))))
        }
    }

    struct Harness {
        screen: Screen<Book>,
        runtime: TestRuntime,
        tx: Sender<InternalEvent<Book>>,
        rx: Receiver<InternalEvent<Book>>,
        now: Instant,
    }

    impl Harness {
        fn new(books: Vec<Book>) -> Self {
            let (tx, rx) = mpsc::channel();
            let mut harness = Self {
                screen: Screen::new(
                    ListController::new(ListKind::Books, 10),
                    Duration::from_millis(500),
                ),
                runtime: TestRuntime::new(books),
                tx,
                rx,
                now: Instant::now(),
            };
            let initial = harness.screen.controller.reload();
            issue(&mut harness.screen, &mut harness.runtime, &harness.tx, initial);
            harness.settle();
            harness
        }

        fn settle(&mut self) {
            process_internal_events(&mut self.screen, &self.tx, &self.rx);
        }

        fn press(&mut self, code: KeyCode) -> Option<ScreenExit> {
            let key = KeyEvent::new(code, KeyModifiers::NONE);
            let exit = handle_key_event(&mut self.screen, &mut self.runtime, &self.tx, key, self.now);
            self.settle();
            exit
        }

        fn advance(&mut self, by: Duration) {
            self.now += by;
            flush_debounced_filters(&mut self.screen, &mut self.runtime, &self.tx, self.now);
            self.settle();
        }

        fn page(&self) -> u32 {
            self.screen.controller.state().page
        }
    }

    #[test]
    fn initial_load_fills_the_table() {
        let harness = Harness::new(BookstoreFaker::new(1).books(47));
        let view = harness.screen.controller.view();
        assert_eq!(view.body.row_count(), 10);
        assert_eq!(view.pagination.page_info(), "page 1 of 5");
        assert_eq!(harness.runtime.requests().len(), 1);
    }

    #[test]
    fn page_keys_walk_the_list() {
        let mut harness = Harness::new(BookstoreFaker::new(1).books(47));
        harness.press(KeyCode::Char('p'));
        assert_eq!(harness.runtime.requests().len(), 1);

        harness.press(KeyCode::Char('n'));
        assert_eq!(harness.page(), 2);
        harness.press(KeyCode::Char('G'));
        assert_eq!(harness.page(), 5);
        assert_eq!(harness.screen.controller.records().len(), 7);
        harness.press(KeyCode::Char('n'));
        assert_eq!(harness.runtime.requests().len(), 3);
        harness.press(KeyCode::Char('g'));
        assert_eq!(harness.page(), 1);
    }

    #[test]
    fn digit_jumps_to_visible_page_button() {
        let mut harness = Harness::new(BookstoreFaker::new(1).books(47));
        harness.press(KeyCode::Char('3'));
        assert_eq!(harness.page(), 3);
        assert_eq!(harness.runtime.requests()[1].get("page"), Some("3"));

        harness.press(KeyCode::Char('9'));
        assert_eq!(harness.runtime.requests().len(), 2);
    }

    #[test]
    fn sort_key_uses_selected_column() {
        let mut harness = Harness::new(madang_books());
        harness.press(KeyCode::Right);
        harness.press(KeyCode::Char('s'));
        let state = harness.screen.controller.state();
        assert_eq!(state.sort_column, "bookname");
        assert_eq!(state.sort_direction, SortDirection::Asc);

        harness.press(KeyCode::Enter);
        assert_eq!(
            harness.screen.controller.state().sort_direction,
            SortDirection::Desc
        );
        let view = harness.screen.controller.view();
        assert_eq!(view.columns[1].title(), "title ▼");
    }

    #[test]
    fn typing_a_filter_fires_once_after_quiet_period() {
        let mut harness = Harness::new(madang_books());
        harness.press(KeyCode::Char('/'));
        assert!(harness.screen.editing);

        harness.press(KeyCode::Char('축'));
        harness.advance(Duration::from_millis(100));
        harness.press(KeyCode::Char('구'));
        harness.advance(Duration::from_millis(499));
        assert_eq!(harness.runtime.requests().len(), 1);

        harness.advance(Duration::from_millis(1));
        assert_eq!(harness.runtime.requests().len(), 2);
        assert_eq!(harness.runtime.requests()[1].get("title"), Some("축구"));
        assert_eq!(harness.screen.controller.records().len(), 3);
        assert_eq!(harness.page(), 1);
    }

    #[test]
    fn enter_applies_filter_immediately_and_esc_leaves_editing() {
        let mut harness = Harness::new(madang_books());
        harness.press(KeyCode::Char('/'));
        harness.press(KeyCode::Tab);
        for ch in "굿스포츠".chars() {
            harness.press(KeyCode::Char(ch));
        }
        harness.press(KeyCode::Enter);
        assert!(!harness.screen.editing);
        assert!(!harness.screen.debouncer.is_pending());
        assert_eq!(harness.runtime.requests().len(), 2);
        assert_eq!(
            harness.runtime.requests()[1].get("publisher"),
            Some("굿스포츠")
        );

        harness.press(KeyCode::Char('/'));
        assert_eq!(harness.press(KeyCode::Esc), None);
        assert!(!harness.screen.editing);
        assert_eq!(harness.press(KeyCode::Esc), Some(ScreenExit::Quit));
    }

    #[test]
    fn clear_drops_drafts_and_pending_input() {
        let mut harness = Harness::new(madang_books());
        harness.press(KeyCode::Char('/'));
        harness.press(KeyCode::Char('야'));
        harness.press(KeyCode::Esc);
        harness.press(KeyCode::Char('x'));
        assert!(harness.screen.drafts.is_empty());
        assert!(!harness.screen.debouncer.is_pending());

        harness.advance(Duration::from_secs(1));
        assert_eq!(harness.runtime.requests().len(), 2);
        assert_eq!(harness.runtime.requests()[1].get("title"), None);
    }

    #[test]
    fn only_latest_response_is_applied() {
        let mut harness = Harness::new(BookstoreFaker::new(1).books(47));
        let first = harness.screen.controller.go_to_page(2).expect("page 2");
        let second = harness.screen.controller.go_to_page(3).expect("page 3");
        issue(&mut harness.screen, &mut harness.runtime, &harness.tx, first);
        issue(&mut harness.screen, &mut harness.runtime, &harness.tx, second);
        harness.settle();

        let view = harness.screen.controller.view();
        assert_eq!(view.pagination.page, 3);
        assert!(!view.loading);
    }

    #[test]
    fn failure_shows_error_row_and_retry_recovers() {
        let mut harness = Harness::new(madang_books());
        harness.runtime.source.fail_next("connection refused");
        harness.press(KeyCode::Char('r'));
        assert!(matches!(
            harness.screen.controller.view().body,
            TableBody::Error { .. }
        ));
        assert!(status_text(&harness.screen).contains("connection refused"));

        harness.press(KeyCode::Char('r'));
        assert_eq!(harness.screen.controller.view().body.row_count(), 10);
    }

    #[test]
    fn page_keys_follow_the_widget_after_a_failed_page_change() {
        let mut harness = Harness::new(BookstoreFaker::new(1).books(47));
        harness.runtime.source.fail_next("connection refused");
        harness.press(KeyCode::Char('3'));
        assert_eq!(harness.page(), 3);
        assert_eq!(harness.runtime.requests().len(), 2);

        let pagination = harness.screen.controller.view().pagination;
        assert_eq!(pagination.page_info(), "page 3 of 5");
        assert!(pagination.prev.enabled);

        harness.press(KeyCode::Char('3'));
        assert_eq!(harness.runtime.requests().len(), 2);

        harness.press(KeyCode::Char('p'));
        assert_eq!(harness.page(), 2);
        assert_eq!(harness.runtime.requests().len(), 3);
        assert_eq!(harness.screen.controller.view().body.row_count(), 10);
    }

    #[test]
    fn clear_without_filters_only_reports() {
        let mut harness = Harness::new(madang_books());
        harness.press(KeyCode::Char('x'));
        assert_eq!(harness.runtime.requests().len(), 1);
        assert_eq!(harness.screen.status, "no filters to clear");
    }

    #[test]
    fn page_size_keys_cycle() {
        assert_eq!(cycle_page_size(10, true), 20);
        assert_eq!(cycle_page_size(50, true), 10);
        assert_eq!(cycle_page_size(10, false), 50);

        let mut harness = Harness::new(BookstoreFaker::new(1).books(47));
        harness.press(KeyCode::Char('+'));
        assert_eq!(harness.screen.controller.state().page_size, 20);
        assert_eq!(harness.screen.controller.state().total_pages, 3);
    }

    #[test]
    fn row_action_can_switch_screens() {
        let mut harness = Harness::new(madang_books());
        harness.press(KeyCode::Down);
        harness.runtime.next_action = Some(RowAction::Switch(ListKind::Orders));
        assert_eq!(
            harness.press(KeyCode::Char('l')),
            Some(ScreenExit::Switch(ListKind::Orders))
        );
        assert_eq!(harness.runtime.activated, vec![2]);

        harness.press(KeyCode::Char('l'));
        assert_eq!(harness.screen.status, "no action for this screen");
    }

    #[test]
    fn order_key_orders_the_selected_row() {
        let mut harness = Harness::new(madang_books());
        harness.press(KeyCode::Down);
        harness.press(KeyCode::Down);
        assert_eq!(harness.press(KeyCode::Char('o')), None);
        assert_eq!(harness.runtime.ordered, vec![3]);
        assert_eq!(harness.screen.status, "ordered book 3");
        assert!(harness.runtime.activated.is_empty());
    }

    #[test]
    fn poll_timeout_is_bounded_by_deadline() {
        let now = Instant::now();
        assert_eq!(poll_timeout(None, now), Duration::from_millis(120));
        assert_eq!(
            poll_timeout(Some(now + Duration::from_millis(30)), now),
            Duration::from_millis(30)
        );
        assert_eq!(poll_timeout(Some(now), now + Duration::from_secs(1)), Duration::ZERO);
    }

    #[test]
    fn pagination_line_marks_current_page() {
        let text = pagination_text(&PaginationView::new(7, 20, 195), 10);
        assert!(text.contains("1 … 5 6 [7] 8 9 … 20"), "{text}");
        assert!(text.contains("page 7 of 20 | 195 total | 10/page"), "{text}");

        let first = pagination_text(&PaginationView::new(1, 1, 0), 20);
        assert!(first.starts_with("    [1]"), "{first}");
    }

    #[test]
    fn filter_line_prefers_drafts() {
        let harness = Harness::new(madang_books());
        let view = harness.screen.controller.view();
        let mut drafts = BTreeMap::new();
        drafts.insert("title", "역사".to_owned());
        assert_eq!(
            filter_text(&view, &drafts, 0, true),
            "/ [title: 역사_]  publisher:   min price:   max price: "
        );
    }
}
