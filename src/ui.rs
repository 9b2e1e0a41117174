use crate::expense::Expense;
use crate::store::summarize_by_category;
use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame, Terminal,
};
use std::io;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Expenses,
    Categories,
}

impl Page {
    pub fn next(&self) -> Self {
        match self {
            Page::Expenses => Page::Categories,
            Page::Categories => Page::Expenses,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Page::Expenses => "Expenses",
            Page::Categories => "By Category",
        }
    }
}

/// Read-only browser over a snapshot of the store
pub struct App {
    pub expenses: Vec<Expense>,
    /// Positions in `expenses` that pass the current search
    pub visible: Vec<usize>,
    pub state: TableState,
    pub category_state: TableState,
    pub current_page: Page,
    pub show_detail: bool,
    pub search: String,
    pub editing_search: bool,
}

impl App {
    pub fn new(expenses: Vec<Expense>) -> Self {
        let visible = (0..expenses.len()).collect();
        let mut app = Self {
            expenses,
            visible,
            state: TableState::default(),
            category_state: TableState::default(),
            current_page: Page::Expenses,
            show_detail: false,
            search: String::new(),
            editing_search: false,
        };
        app.reset_selection();
        app.category_state.select(Some(0));
        app
    }

    fn reset_selection(&mut self) {
        if self.visible.is_empty() {
            self.state.select(None);
        } else {
            self.state.select(Some(0));
        }
    }

    /// Re-run the search over all expenses
    pub fn apply_search(&mut self) {
        self.visible = self
            .expenses
            .iter()
            .enumerate()
            .filter(|(_, e)| e.matches(&self.search))
            .map(|(i, _)| i)
            .collect();
        self.reset_selection();
    }

    pub fn push_search_char(&mut self, c: char) {
        self.search.push(c);
        self.apply_search();
    }

    pub fn pop_search_char(&mut self) {
        self.search.pop();
        self.apply_search();
    }

    pub fn clear_search(&mut self) {
        self.search.clear();
        self.apply_search();
    }

    /// Selected expense with its 1-based number in the full listing
    pub fn selected_expense(&self) -> Option<(usize, &Expense)> {
        self.state
            .selected()
            .and_then(|i| self.visible.get(i))
            .map(|&pos| (pos + 1, &self.expenses[pos]))
    }

    pub fn visible_total(&self) -> f64 {
        self.visible.iter().map(|&i| self.expenses[i].amount).sum()
    }

    /// (category, count, total), first-seen order
    pub fn category_summary(&self) -> Vec<(String, usize, f64)> {
        summarize_by_category(&self.expenses)
    }

    pub fn next(&mut self) {
        let len = self.visible.len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) if i >= len - 1 => 0,
            Some(i) => i + 1,
            None => 0,
        };
        self.state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let len = self.visible.len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.state.select(Some(i));
    }

    pub fn page_down(&mut self) {
        let len = self.visible.len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) => (i + 20).min(len - 1),
            None => 0,
        };
        self.state.select(Some(i));
    }

    pub fn page_up(&mut self) {
        let i = self.state.selected().map(|i| i.saturating_sub(20)).unwrap_or(0);
        self.state.select(Some(i));
    }

    /// Handle one key press. Returns false when the browser should close.
    pub fn handle_key(&mut self, code: KeyCode) -> bool {
        if self.editing_search {
            match code {
                KeyCode::Enter | KeyCode::Esc => self.editing_search = false,
                KeyCode::Backspace => self.pop_search_char(),
                KeyCode::Char(c) => self.push_search_char(c),
                _ => {}
            }
            return true;
        }

        match code {
            KeyCode::Char('q') | KeyCode::Esc => return false,
            KeyCode::Enter => self.show_detail = !self.show_detail,
            KeyCode::Tab => self.current_page = self.current_page.next(),
            KeyCode::Char('/') => {
                self.current_page = Page::Expenses;
                self.editing_search = true;
            }
            KeyCode::Char('c') => self.clear_search(),
            KeyCode::Down | KeyCode::Char('j') => self.next(),
            KeyCode::Up | KeyCode::Char('k') => self.previous(),
            KeyCode::PageDown => self.page_down(),
            KeyCode::PageUp => self.page_up(),
            KeyCode::Home => self.reset_selection(),
            KeyCode::End => {
                if !self.visible.is_empty() {
                    self.state.select(Some(self.visible.len() - 1));
                }
            }
            _ => {}
        }
        true
    }
}

pub fn run_ui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res?;
    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press && !app.handle_key(key.code) {
                return Ok(());
            }
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header with navigation
            Constraint::Min(0),    // Content area
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0], app);

    match app.current_page {
        Page::Expenses if app.show_detail => {
            let content_chunks = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
                .split(chunks[1]);

            render_table(f, content_chunks[0], app);
            render_detail_panel(f, content_chunks[1], app);
        }
        Page::Expenses => render_table(f, chunks[1], app),
        Page::Categories => render_categories(f, chunks[1], app),
    }

    render_status_bar(f, chunks[2], app);
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let mut tab_spans = vec![];
    for (i, page) in [Page::Expenses, Page::Categories].iter().enumerate() {
        if i > 0 {
            tab_spans.push(Span::raw(" │ "));
        }

        let style = if *page == app.current_page {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        tab_spans.push(Span::styled(page.title().to_string(), style));
    }

    tab_spans.push(Span::raw("  |  "));
    tab_spans.push(Span::styled(
        format!("{} expenses", app.expenses.len()),
        Style::default().fg(Color::White),
    ));
    tab_spans.push(Span::raw("  |  "));
    tab_spans.push(Span::styled(
        format!("💰 ${:.2}", app.visible_total()),
        Style::default().fg(Color::Green),
    ));

    let header = Paragraph::new(vec![Line::from(tab_spans)])
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Cyan)));

    f.render_widget(header, area);
}

fn header_row(titles: &[&'static str]) -> Row<'static> {
    let cells = titles.iter().map(|h| {
        Cell::from(*h).style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
    });
    Row::new(cells).style(Style::default().bg(Color::DarkGray)).height(1)
}

fn render_table(f: &mut Frame, area: Rect, app: &mut App) {
    let rows: Vec<Row> = app
        .visible
        .iter()
        .map(|&pos| {
            let expense = &app.expenses[pos];
            Row::new(vec![
                Cell::from(format!("{}", pos + 1)),
                Cell::from(expense.date.clone()),
                Cell::from(truncate(&expense.description, 30)),
                Cell::from(format!("{:.2}", expense.amount)).style(Style::default().fg(Color::Red)),
                Cell::from(truncate(&expense.category, 20)),
            ])
            .height(1)
        })
        .collect();

    let title = if app.search.is_empty() {
        " Expenses ".to_string()
    } else {
        format!(" Expenses matching '{}' ", app.search)
    };

    let table = Table::new(
        rows,
        [
            Constraint::Length(5),
            Constraint::Length(12),
            Constraint::Length(32),
            Constraint::Length(12),
            Constraint::Length(22),
        ],
    )
    .header(header_row(&["#", "Date", "Description", "Amount", "Category"]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(title),
    )
    .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.state);
}

fn render_categories(f: &mut Frame, area: Rect, app: &mut App) {
    let summary = app.category_summary();
    let grand_total: f64 = summary.iter().map(|(_, _, total)| total).sum();

    let rows: Vec<Row> = summary
        .iter()
        .map(|(category, count, total)| {
            let share = if grand_total != 0.0 { total / grand_total * 100.0 } else { 0.0 };
            Row::new(vec![
                Cell::from(category.clone()),
                Cell::from(format!("{}", count)),
                Cell::from(format!("{:.2}", total)).style(Style::default().fg(Color::Red)),
                Cell::from(format!("{:.1}%", share)),
            ])
            .height(1)
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(25),
            Constraint::Length(10),
            Constraint::Length(15),
            Constraint::Length(10),
        ],
    )
    .header(header_row(&["Category", "Count", "Total", "Share"]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Total Spent by Category "),
    )
    .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.category_state);
}

fn render_detail_panel(f: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Expense Detail ");

    let Some((number, expense)) = app.selected_expense() else {
        f.render_widget(Paragraph::new("No expense selected").block(block), area);
        return;
    };

    let label = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
    let content = vec![
        Line::from(""),
        Line::from(vec![Span::styled("  Number: ", label), Span::raw(format!("#{}", number))]),
        Line::from(""),
        Line::from(vec![Span::styled("  Date: ", label), Span::raw(expense.date.clone())]),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Amount: ", label),
            Span::styled(format!("${:.2}", expense.amount), Style::default().fg(Color::Red)),
        ]),
        Line::from(""),
        Line::from(vec![Span::styled("  Category: ", label), Span::raw(expense.category.clone())]),
        Line::from(""),
        Line::from("  ─────────────────────────────────────"),
        Line::from(""),
        Line::from(vec![Span::raw("  "), Span::raw(wrap_text(&expense.description, 35))]),
        Line::from(""),
        Line::from(vec![Span::styled(
            "  Press Enter to close",
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )]),
    ];

    f.render_widget(Paragraph::new(content).block(block), area);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let selected = app.state.selected().map(|i| i + 1).unwrap_or(0);

    let mut status_spans = vec![Span::styled(
        format!(" Row: {}/{} ", selected, app.visible.len()),
        Style::default().fg(Color::Cyan),
    )];

    if app.editing_search {
        status_spans.push(Span::raw(" | Search: "));
        status_spans.push(Span::styled(format!("{}_", app.search), Style::default().fg(Color::Green)));
        status_spans.push(Span::raw(" (Enter done)"));
    } else {
        if !app.search.is_empty() {
            status_spans.push(Span::raw(" | "));
            status_spans.push(Span::styled(
                format!("Search: {}", app.search),
                Style::default().fg(Color::Green),
            ));
            status_spans.push(Span::raw(" ("));
            status_spans.push(Span::styled("c", Style::default().fg(Color::Yellow)));
            status_spans.push(Span::raw(" clear)"));
        }

        for (key, action) in [("/", " Search | "), ("Enter", " Details | "), ("Tab", " Page | "), ("↑/↓", " Nav | ")] {
            status_spans.push(Span::styled(key, Style::default().fg(Color::Yellow)));
            status_spans.push(Span::raw(action));
        }
        status_spans.push(Span::styled("q", Style::default().fg(Color::Red)));
        status_spans.push(Span::raw(" Quit"));
    }

    let status_bar = Paragraph::new(vec![Line::from(status_spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );

    f.render_widget(status_bar, area);
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{}...", head)
    }
}

fn wrap_text(text: &str, width: usize) -> String {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if !current.is_empty() && current.chars().count() + word.chars().count() + 1 > width {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }

    lines.join("\n  ")
}
