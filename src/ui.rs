use anyhow::Result;
use budget_tracker::expense::Category;
use budget_tracker::filter::FilterField;
use budget_tracker::store::PersistentStore;
use budget_tracker::tracker::{
    cycle_category, format_amount, Action, Tracker, ALL_CATEGORIES, CATEGORY_PLACEHOLDER,
    CHART_TITLE,
};
use budget_tracker::validation::DraftField;
use budget_tracker::aggregate::grand_total;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState},
    Frame, Terminal,
};
use std::io;
use tracing::error;

/// Widget that receives key input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Amount,
    Category,
    Date,
    AddButton,
    FilterCategory,
    StartDate,
    EndDate,
    ExpenseTable,
}

impl Focus {
    const ORDER: [Focus; 8] = [
        Focus::Amount,
        Focus::Category,
        Focus::Date,
        Focus::AddButton,
        Focus::FilterCategory,
        Focus::StartDate,
        Focus::EndDate,
        Focus::ExpenseTable,
    ];

    fn position(&self) -> usize {
        Self::ORDER.iter().position(|f| f == self).unwrap_or(0)
    }

    pub fn next(&self) -> Self {
        Self::ORDER[(self.position() + 1) % Self::ORDER.len()]
    }

    pub fn previous(&self) -> Self {
        Self::ORDER[(self.position() + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }

    /// Part of the entry form (Enter submits from here).
    pub fn in_form(&self) -> bool {
        matches!(
            self,
            Focus::Amount | Focus::Category | Focus::Date | Focus::AddButton
        )
    }

    fn draft_field(&self) -> Option<DraftField> {
        match self {
            Focus::Amount => Some(DraftField::Amount),
            Focus::Date => Some(DraftField::Date),
            _ => None,
        }
    }

    fn filter_field(&self) -> Option<FilterField> {
        match self {
            Focus::StartDate => Some(FilterField::StartDate),
            Focus::EndDate => Some(FilterField::EndDate),
            _ => None,
        }
    }
}

pub struct App<S: PersistentStore> {
    pub tracker: Tracker<S>,
    pub focus: Focus,
    pub table_state: TableState,
}

impl<S: PersistentStore> App<S> {
    pub fn new(tracker: Tracker<S>) -> Self {
        let mut app = Self {
            tracker,
            focus: Focus::Amount,
            table_state: TableState::default(),
        };
        app.sync_selection();
        app
    }

    fn dispatch(&mut self, action: Action) {
        self.tracker.apply(action);
        self.sync_selection();
    }

    /// Keep the table selection inside the visible rows.
    fn sync_selection(&mut self) {
        let len = self.tracker.visible_expenses().len();
        if len == 0 {
            self.table_state.select(None);
            return;
        }

        let i = match self.table_state.selected() {
            Some(i) if i < len => i,
            Some(_) => len - 1,
            None => 0,
        };
        self.table_state.select(Some(i));
    }

    /// Route one key press. Returns `false` when the app should quit.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        // Exact match: AltGr arrives as Ctrl+Alt on Windows and must still type
        if key.modifiers == KeyModifiers::CONTROL {
            match key.code {
                KeyCode::Char('c') => return false,
                KeyCode::Char('l') if self.tracker.notice().is_none() => {
                    self.dispatch(Action::ClearFilters)
                }
                _ => {}
            }
            return true;
        }

        // The notice blocks everything until acknowledged
        if self.tracker.notice().is_some() {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
                self.dispatch(Action::DismissNotice);
            }
            return true;
        }

        match key.code {
            KeyCode::Esc => return false,
            KeyCode::BackTab => self.focus = self.focus.previous(),
            KeyCode::Tab => {
                if key.modifiers.contains(KeyModifiers::SHIFT) {
                    self.focus = self.focus.previous();
                } else {
                    self.focus = self.focus.next();
                }
            }
            KeyCode::Enter if self.focus.in_form() => self.dispatch(Action::Submit),
            KeyCode::Char(c) => self.type_char(c),
            KeyCode::Backspace => self.delete_char(),
            KeyCode::Left => self.cycle_selector(false),
            KeyCode::Right => self.cycle_selector(true),
            KeyCode::Down if self.focus == Focus::ExpenseTable => self.next(),
            KeyCode::Up if self.focus == Focus::ExpenseTable => self.previous(),
            KeyCode::Down => self.cycle_selector(true),
            KeyCode::Up => self.cycle_selector(false),
            KeyCode::PageDown => self.page_down(),
            KeyCode::PageUp => self.page_up(),
            KeyCode::Home if self.focus == Focus::ExpenseTable => {
                self.table_state.select(Some(0));
                self.sync_selection();
            }
            KeyCode::End if self.focus == Focus::ExpenseTable => {
                let len = self.tracker.visible_expenses().len();
                if len > 0 {
                    self.table_state.select(Some(len - 1));
                }
            }
            _ => {}
        }

        true
    }

    fn type_char(&mut self, c: char) {
        if let Some(field) = self.focus.draft_field() {
            let mut value = self.tracker.draft().field(field).to_string();
            value.push(c);
            self.dispatch(Action::EditDraft(field, value));
        } else if let Some(field) = self.focus.filter_field() {
            let mut value = self.tracker.filters().field(field).to_string();
            value.push(c);
            self.dispatch(Action::EditFilter(field, value));
        } else if self.focus == Focus::ExpenseTable {
            match c {
                'j' => self.next(),
                'k' => self.previous(),
                _ => {}
            }
        }
    }

    fn delete_char(&mut self) {
        if let Some(field) = self.focus.draft_field() {
            let mut value = self.tracker.draft().field(field).to_string();
            value.pop();
            self.dispatch(Action::EditDraft(field, value));
        } else if let Some(field) = self.focus.filter_field() {
            let mut value = self.tracker.filters().field(field).to_string();
            value.pop();
            self.dispatch(Action::EditFilter(field, value));
        }
    }

    fn cycle_selector(&mut self, forward: bool) {
        match self.focus {
            Focus::Category => {
                let current = self.tracker.draft().category.parse::<Category>().ok();
                let value = cycle_category(current, forward)
                    .map(|c| c.as_str().to_string())
                    .unwrap_or_default();
                self.dispatch(Action::EditDraft(DraftField::Category, value));
            }
            Focus::FilterCategory => {
                let current = self.tracker.filters().category;
                self.dispatch(Action::SetFilterCategory(cycle_category(current, forward)));
            }
            _ => {}
        }
    }

    pub fn next(&mut self) {
        let len = self.tracker.visible_expenses().len();
        if len == 0 {
            return;
        }
        let i = match self.table_state.selected() {
            Some(i) => {
                if i >= len - 1 {
                    0
                } else {
                    i + 1
                }
            }
            None => 0,
        };
        self.table_state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let len = self.tracker.visible_expenses().len();
        if len == 0 {
            return;
        }
        let i = match self.table_state.selected() {
            Some(i) => {
                if i == 0 {
                    len - 1
                } else {
                    i - 1
                }
            }
            None => 0,
        };
        self.table_state.select(Some(i));
    }

    pub fn page_down(&mut self) {
        let len = self.tracker.visible_expenses().len();
        if len == 0 {
            return;
        }
        let i = match self.table_state.selected() {
            Some(i) => (i + 20).min(len - 1),
            None => 0,
        };
        self.table_state.select(Some(i));
    }

    pub fn page_up(&mut self) {
        let i = match self.table_state.selected() {
            Some(i) => i.saturating_sub(20),
            None => 0,
        };
        self.table_state.select(Some(i));
        self.sync_selection();
    }
}

pub fn run_ui<S: PersistentStore>(app: &mut App<S>) -> Result<()> {
    // Leave raw mode before the panic message is printed
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        default_hook(info);
    }));

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app
    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = &res {
        error!(error = %err, "UI loop failed");
    }

    res.map_err(Into::into)
}

fn run_app<B: ratatui::backend::Backend, S: PersistentStore>(
    terminal: &mut Terminal<B>,
    app: &mut App<S>,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            // Windows reports releases too
            if key.kind != KeyEventKind::Press {
                continue;
            }
            if !app.handle_key(key) {
                return Ok(());
            }
        }
    }
}

fn ui<S: PersistentStore>(f: &mut Frame, app: &mut App<S>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Length(3), // Add Expense form
            Constraint::Length(3), // Filter panel
            Constraint::Min(0),    // Table + chart
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0], app);
    render_form(f, chunks[1], app);
    render_filters(f, chunks[2], app);

    let content_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(55), // Expenses table
            Constraint::Percentage(45), // Chart
        ])
        .split(chunks[3]);

    render_table(f, content_chunks[0], app);
    render_chart(f, content_chunks[1], app);
    render_status_bar(f, chunks[4], app);

    if let Some(notice) = app.tracker.notice() {
        render_notice(f, notice);
    }
}

fn field_style(focused: bool, valid: bool) -> Style {
    let base = if valid {
        Style::default().fg(Color::White)
    } else {
        Style::default().fg(Color::Red)
    };

    if focused {
        base.fg(if valid { Color::Yellow } else { Color::Red })
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
    } else {
        base
    }
}

fn label(text: &str) -> Span<'_> {
    Span::styled(text, Style::default().fg(Color::Cyan))
}

fn text_input(value: &str, placeholder: &str, focused: bool, valid: bool) -> Span<'static> {
    let shown = if value.is_empty() && !focused {
        placeholder.to_string()
    } else if focused {
        format!("{}_", value)
    } else {
        value.to_string()
    };

    let style = if value.is_empty() && !focused {
        Style::default().fg(Color::DarkGray)
    } else {
        field_style(focused, valid)
    };

    Span::styled(format!("[ {} ]", shown), style)
}

fn selector(value: &str, focused: bool) -> Span<'static> {
    Span::styled(format!("< {} >", value), field_style(focused, true))
}

fn render_header<S: PersistentStore>(f: &mut Frame, area: Rect, app: &App<S>) {
    let total = grand_total(app.tracker.category_totals());

    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            "Personal Budget Tracker",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  |  "),
        Span::styled(
            format!("Expenses: {}", app.tracker.repository().len()),
            Style::default().fg(Color::White),
        ),
        Span::raw("  |  "),
        Span::styled(
            format!("Total: {}", format_amount(total)),
            Style::default().fg(Color::Red),
        ),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    );

    f.render_widget(header, area);
}

fn render_form<S: PersistentStore>(f: &mut Frame, area: Rect, app: &App<S>) {
    let draft = app.tracker.draft();
    let category = if draft.category.is_empty() {
        CATEGORY_PLACEHOLDER
    } else {
        draft.category.as_str()
    };

    let add_style = if app.focus == Focus::AddButton {
        Style::default()
            .fg(Color::Black)
            .bg(Color::Green)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Green)
    };

    let line = Line::from(vec![
        label(" Amount: "),
        text_input(&draft.amount, "0.00", app.focus == Focus::Amount, true),
        label("  Category: "),
        selector(category, app.focus == Focus::Category),
        label("  Date: "),
        text_input(&draft.date, "YYYY-MM-DD", app.focus == Focus::Date, true),
        Span::raw("  "),
        Span::styled("[ Add ]", add_style),
    ]);

    let form = Paragraph::new(line).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(focus_border(app.focus.in_form()))
            .title(" Add Expense "),
    );

    f.render_widget(form, area);
}

fn render_filters<S: PersistentStore>(f: &mut Frame, area: Rect, app: &App<S>) {
    let filters = app.tracker.filters();
    let category = filters
        .category
        .map(|c| c.as_str())
        .unwrap_or(ALL_CATEGORIES);

    let line = Line::from(vec![
        label(" Category: "),
        selector(category, app.focus == Focus::FilterCategory),
        label("  From: "),
        text_input(
            &filters.start_date,
            "YYYY-MM-DD",
            app.focus == Focus::StartDate,
            filters.is_valid(FilterField::StartDate),
        ),
        label("  To: "),
        text_input(
            &filters.end_date,
            "YYYY-MM-DD",
            app.focus == Focus::EndDate,
            filters.is_valid(FilterField::EndDate),
        ),
    ]);

    let focused = matches!(
        app.focus,
        Focus::FilterCategory | Focus::StartDate | Focus::EndDate
    );

    let panel = Paragraph::new(line).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(focus_border(focused))
            .title(" Filter Expenses "),
    );

    f.render_widget(panel, area);
}

fn focus_border(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::White)
    }
}

fn render_table<S: PersistentStore>(f: &mut Frame, area: Rect, app: &mut App<S>) {
    let header_cells = ["Amount", "Category", "Date"].iter().map(|h| {
        Cell::from(*h).style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
    });

    let header = Row::new(header_cells)
        .style(Style::default().bg(Color::DarkGray))
        .height(1);

    let rows = app.tracker.table_rows().into_iter().map(|[amount, category, date]| {
        let cells = vec![
            Cell::from(amount).style(Style::default().fg(Color::Red)),
            Cell::from(category),
            Cell::from(date),
        ];

        Row::new(cells).height(1)
    });

    let title = if app.tracker.filters().criteria().is_empty() {
        " Expenses ".to_string()
    } else {
        format!(
            " Expenses ({} of {}) ",
            app.tracker.visible_expenses().len(),
            app.tracker.repository().len()
        )
    };

    let table = Table::new(
        rows,
        [
            Constraint::Length(14),
            Constraint::Length(15),
            Constraint::Length(12),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(focus_border(app.focus == Focus::ExpenseTable))
            .title(title),
    )
    .highlight_style(
        Style::default()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD),
    )
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.table_state);
}

/// Bar length on a fixed 0..=1000 scale relative to the largest total.
///
/// ratatui multiplies raw bar values by the bar length, so passing amounts
/// straight through overflows `u64` for large totals.
fn bar_value(total: f64, max: f64) -> u64 {
    if max <= 0.0 || !total.is_finite() {
        return 0;
    }

    ((total / max).clamp(0.0, 1.0) * 1000.0).round() as u64
}

fn render_chart<S: PersistentStore>(f: &mut Frame, area: Rect, app: &App<S>) {
    let totals = app.tracker.category_totals();
    let max = totals.iter().map(|t| t.total).fold(0.0_f64, f64::max);

    let bars: Vec<Bar> = totals
        .iter()
        .map(|t| {
            Bar::default()
                .value(bar_value(t.total, max))
                .label(Line::from(t.category.as_str()))
                .text_value(format_amount(t.total))
        })
        .collect();

    let chart = BarChart::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::White))
                .title(format!(" {} ", CHART_TITLE)),
        )
        .direction(Direction::Horizontal)
        .data(BarGroup::default().bars(&bars))
        .bar_width(1)
        .bar_gap(1)
        .bar_style(Style::default().fg(Color::Cyan))
        .value_style(
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .label_style(Style::default().fg(Color::White));

    f.render_widget(chart, area);
}

fn render_status_bar<S: PersistentStore>(f: &mut Frame, area: Rect, app: &App<S>) {
    let selected = app.table_state.selected().map(|i| i + 1).unwrap_or(0);
    let total = app.tracker.visible_expenses().len();

    let mut status_spans = vec![Span::styled(
        format!(" Row: {}/{} ", selected, total),
        Style::default().fg(Color::Cyan),
    )];

    if !app.tracker.filters().criteria().is_empty() {
        status_spans.push(Span::raw(" | "));
        status_spans.push(Span::styled("Filtered", Style::default().fg(Color::Green)));
        status_spans.push(Span::raw(" ("));
        status_spans.push(Span::styled("Ctrl-L", Style::default().fg(Color::Yellow)));
        status_spans.push(Span::raw(" clear)"));
    }

    status_spans.push(Span::raw(" | "));
    status_spans.push(Span::styled("Tab", Style::default().fg(Color::Yellow)));
    status_spans.push(Span::raw(" Focus | "));
    status_spans.push(Span::styled("←/→", Style::default().fg(Color::Yellow)));
    status_spans.push(Span::raw(" Select | "));
    status_spans.push(Span::styled("Enter", Style::default().fg(Color::Yellow)));
    status_spans.push(Span::raw(" Add | "));
    status_spans.push(Span::styled("↑/↓", Style::default().fg(Color::Yellow)));
    status_spans.push(Span::raw(" Nav | "));
    status_spans.push(Span::styled("Esc", Style::default().fg(Color::Red)));
    status_spans.push(Span::raw(" Quit"));

    let status_bar = Paragraph::new(Line::from(status_spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );

    f.render_widget(status_bar, area);
}

fn render_notice(f: &mut Frame, notice: &str) {
    let area = centered_rect(40, 7, f.size());

    let content = vec![
        Line::from(""),
        Line::from(Span::styled(
            notice.to_string(),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Press Enter to continue",
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        )),
    ];

    let popup = Paragraph::new(content)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red))
                .title(" Notice "),
        );

    f.render_widget(Clear, area);
    f.render_widget(popup, area);
}

/// Fixed-size rect centered in `area`, shrunk to fit if needed.
fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);

    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
