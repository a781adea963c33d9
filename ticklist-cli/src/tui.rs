use anyhow::Result;
use chrono::Utc;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Tabs, Wrap},
    Frame, Terminal,
};
use std::collections::VecDeque;
use std::io::{self, Stdout};
use std::time::{Duration, Instant};
use ticklist_core::{
    parse_date_input, parse_time_input, App, Command, DueKind, FileStore, Filter, ListView,
    NewTask, Notifier, Outcome, ReminderNotice, TaskError, TaskId, REMINDER_LABEL,
};

/// Overdue labels depend on the clock, so redraw at least this often.
const CLOCK_REDRAW: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Field {
    #[default]
    Text,
    Date,
    Time,
    Reminder,
}

impl Field {
    fn next(self) -> Self {
        match self {
            Field::Text => Field::Date,
            Field::Date => Field::Time,
            Field::Time => Field::Reminder,
            Field::Reminder => Field::Text,
        }
    }

    fn prev(self) -> Self {
        match self {
            Field::Text => Field::Reminder,
            Field::Date => Field::Text,
            Field::Time => Field::Date,
            Field::Reminder => Field::Time,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct AddForm {
    text: String,
    date: String,
    time: String,
    reminder: bool,
    field: Field,
}

impl AddForm {
    fn input_mut(&mut self) -> Option<&mut String> {
        match self.field {
            Field::Text => Some(&mut self.text),
            Field::Date => Some(&mut self.date),
            Field::Time => Some(&mut self.time),
            Field::Reminder => None,
        }
    }

    fn to_new_task(&self) -> Result<NewTask> {
        Ok(NewTask {
            text: self.text.clone(),
            due_date: parse_date_input(&self.date)?,
            due_time: parse_time_input(&self.time)?,
            reminder: self.reminder,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Mode {
    Browse,
    Adding(AddForm),
    Editing { id: TaskId, input: String },
}

struct Ui {
    mode: Mode,
    selected: usize,
    /// Blocking notices (validation errors, reminders), oldest first.
    modals: VecDeque<String>,
    quit: bool,
    dirty: bool,
}

impl Ui {
    fn new() -> Self {
        Self {
            mode: Mode::Browse,
            selected: 0,
            modals: VecDeque::new(),
            quit: false,
            dirty: true,
        }
    }

    fn selected_id(&self, view: &ListView) -> Option<TaskId> {
        view.rows.get(self.selected).map(|r| r.id)
    }

    fn clamp_selection(&mut self, rows: usize) {
        self.selected = self.selected.min(rows.saturating_sub(1));
    }

    /// Translate a key press into at most one task command.
    fn handle_key(&mut self, key: KeyEvent, view: &ListView) -> Option<Command> {
        self.dirty = true;

        if !self.modals.is_empty() {
            self.modals.pop_front();
            return None;
        }

        if self.mode == Mode::Browse {
            return self.handle_browse_key(key.code, view);
        }

        match &mut self.mode {
            Mode::Browse => None,
            Mode::Adding(form) => match key.code {
                KeyCode::Esc => {
                    self.mode = Mode::Browse;
                    None
                }
                KeyCode::Tab | KeyCode::Down => {
                    form.field = form.field.next();
                    None
                }
                KeyCode::BackTab | KeyCode::Up => {
                    form.field = form.field.prev();
                    None
                }
                KeyCode::Enter => match form.to_new_task() {
                    Ok(input) => Some(Command::Add(input)),
                    Err(e) => {
                        self.modals.push_back(e.to_string());
                        None
                    }
                },
                KeyCode::Char(' ') if form.field == Field::Reminder => {
                    form.reminder = !form.reminder;
                    None
                }
                KeyCode::Char(c) => {
                    if let Some(input) = form.input_mut() {
                        input.push(c);
                    }
                    None
                }
                KeyCode::Backspace => {
                    if let Some(input) = form.input_mut() {
                        input.pop();
                    }
                    None
                }
                _ => None,
            },
            Mode::Editing { id, input } => match key.code {
                // Esc cancels the prompt: nothing is dispatched.
                KeyCode::Esc => {
                    self.mode = Mode::Browse;
                    None
                }
                KeyCode::Enter => {
                    let cmd = Command::Edit {
                        id: *id,
                        text: std::mem::take(input),
                    };
                    self.mode = Mode::Browse;
                    Some(cmd)
                }
                KeyCode::Char(c) => {
                    input.push(c);
                    None
                }
                KeyCode::Backspace => {
                    input.pop();
                    None
                }
                _ => None,
            },
        }
    }

    fn handle_browse_key(&mut self, code: KeyCode, view: &ListView) -> Option<Command> {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.quit = true;
                None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.selected + 1 < view.rows.len() {
                    self.selected += 1;
                }
                None
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected = self.selected.saturating_sub(1);
                None
            }
            KeyCode::Char('a') => {
                self.mode = Mode::Adding(AddForm::default());
                None
            }
            KeyCode::Char(' ') | KeyCode::Char('x') => self.selected_id(view).map(Command::Toggle),
            KeyCode::Char('e') => {
                let row = view.rows.get(self.selected)?;
                self.mode = Mode::Editing {
                    id: row.id,
                    input: row.text.clone(),
                };
                None
            }
            KeyCode::Char('d') | KeyCode::Delete => self.selected_id(view).map(Command::Delete),
            KeyCode::Char('c') => Some(Command::ClearCompleted),
            KeyCode::Char('1') => Some(Command::SetFilter(Filter::All)),
            KeyCode::Char('2') => Some(Command::SetFilter(Filter::Active)),
            KeyCode::Char('3') => Some(Command::SetFilter(Filter::Completed)),
            _ => None,
        }
    }

    /// React to the result of a dispatched command.
    fn apply(&mut self, result: Result<Outcome, TaskError>) {
        match result {
            Ok(Outcome::Added(_)) => self.mode = Mode::Browse,
            Ok(Outcome::FilterChanged(_)) => self.selected = 0,
            Ok(_) => {}
            Err(e) => self.modals.push_back(e.to_string()),
        }
        self.dirty = true;
    }
}

/// Queues reminder notices as blocking modals.
struct ModalNotifier<'a>(&'a mut VecDeque<String>);

impl Notifier for ModalNotifier<'_> {
    fn notify(&mut self, notice: &ReminderNotice) -> Result<()> {
        self.0.push_back(notice.title.clone());
        Ok(())
    }
}

pub fn run_tui(app: &mut App<FileStore>, reminders_enabled: bool) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = event_loop(&mut terminal, app, reminders_enabled);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut App<FileStore>,
    reminders_enabled: bool,
) -> Result<()> {
    let mut ui = Ui::new();
    let mut last_pass: Option<Instant> = None;
    let mut last_draw = Instant::now();

    loop {
        if reminders_enabled && app.reminders().due_for_pass(last_pass, Instant::now()) {
            let mut notifier = ModalNotifier(&mut ui.modals);
            if let Err(e) = app.run_reminders(Utc::now(), &mut notifier) {
                ui.modals.push_back(e.to_string());
            }
            last_pass = Some(Instant::now());
        }

        let app_changed = app.take_redraw();
        if app_changed || ui.dirty || last_draw.elapsed() >= CLOCK_REDRAW {
            let view = app.view(Utc::now());
            ui.clamp_selection(view.rows.len());
            terminal.draw(|f| draw(f, &view, &ui))?;
            ui.dirty = false;
            last_draw = Instant::now();
        }

        if ui.quit {
            break;
        }

        if event::poll(Duration::from_millis(50))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    let view = app.view(Utc::now());
                    if let Some(cmd) = ui.handle_key(key, &view) {
                        let result = app.dispatch(cmd);
                        ui.apply(result);
                    }
                }
                Event::Resize(_, _) => app.request_redraw(),
                _ => {}
            }
        }
    }

    Ok(())
}

fn draw(f: &mut Frame, view: &ListView, ui: &Ui) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(3),
        ])
        .split(f.area());

    let selected_tab = Filter::ALL
        .iter()
        .position(|x| *x == view.filter)
        .unwrap_or(0);
    let tabs = Tabs::new(vec!["1 All", "2 Active", "3 Completed"])
        .select(selected_tab)
        .style(Style::default().fg(Color::Gray))
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
        .block(Block::default().borders(Borders::ALL).title("ticklist"));
    f.render_widget(tabs, chunks[0]);

    let items: Vec<ListItem> = view.rows.iter().map(row_item).collect();
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title("tasks"))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut state = ListState::default();
    if !view.rows.is_empty() {
        state.select(Some(ui.selected));
    }
    f.render_stateful_widget(list, chunks[1], &mut state);

    let footer = Paragraph::new(Line::from(vec![
        Span::styled(view.footer(), Style::default().fg(Color::Cyan)),
        Span::styled(
            "   a add  space toggle  e edit  d delete  c clear completed  1/2/3 filter  q quit",
            Style::default().fg(Color::Gray),
        ),
    ]))
    .block(Block::default().borders(Borders::ALL));
    f.render_widget(footer, chunks[2]);

    match &ui.mode {
        Mode::Browse => {}
        Mode::Adding(form) => draw_add_form(f, form),
        Mode::Editing { input, .. } => {
            let area = centered(f.area(), 60, 3);
            f.render_widget(Clear, area);
            f.render_widget(
                Paragraph::new(input.as_str())
                    .block(Block::default().borders(Borders::ALL).title("Edit task (Enter save, Esc cancel)")),
                area,
            );
        }
    }

    if let Some(msg) = ui.modals.front() {
        let area = centered(f.area(), 50, 5);
        f.render_widget(Clear, area);
        f.render_widget(
            Paragraph::new(Text::from(vec![
                Line::from(Span::styled(
                    msg.as_str(),
                    Style::default().add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(
                    "press any key",
                    Style::default().fg(Color::Gray),
                )),
            ]))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Yellow))),
            area,
        );
    }
}

fn row_item(row: &ticklist_core::TaskRow) -> ListItem<'static> {
    let check = if row.completed { "[x] " } else { "[ ] " };
    let text_style = if row.completed {
        Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::CROSSED_OUT)
    } else {
        Style::default()
    };

    let mut spans = vec![
        Span::raw(check),
        Span::styled(row.text.clone(), text_style),
    ];
    if let Some(due) = &row.due {
        let color = match due.kind {
            DueKind::Overdue => Color::Red,
            DueKind::Due => Color::Cyan,
        };
        spans.push(Span::raw("  "));
        spans.push(Span::styled(due.text(), Style::default().fg(color)));
    }
    if row.reminder_on {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(REMINDER_LABEL, Style::default().fg(Color::Yellow)));
    }
    ListItem::new(Line::from(spans))
}

fn draw_add_form(f: &mut Frame, form: &AddForm) {
    let area = centered(f.area(), 60, 8);
    f.render_widget(Clear, area);

    let field_line = |label: &str, value: String, field: Field| {
        let style = if form.field == field {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        Line::from(vec![
            Span::styled(format!("{label:<9}"), style),
            Span::raw(value),
        ])
    };

    let lines = vec![
        field_line("Task", form.text.clone(), Field::Text),
        field_line("Date", format!("{}  (YYYY-MM-DD)", form.date), Field::Date),
        field_line("Time", format!("{}  (HH:MM)", form.time), Field::Time),
        field_line(
            "Remind",
            if form.reminder { "[x]" } else { "[ ]" }.to_string(),
            Field::Reminder,
        ),
        Line::from(Span::styled(
            "Tab next field, Space toggles reminder, Enter add, Esc cancel",
            Style::default().fg(Color::Gray),
        )),
    ];

    f.render_widget(
        Paragraph::new(Text::from(lines))
            .block(Block::default().borders(Borders::ALL).title("Add task")),
        area,
    );
}

/// A `width`-percent wide, `height`-rows tall rect in the middle of `area`.
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let w = (u32::from(area.width) * u32::from(width.min(100)) / 100) as u16;
    let h = height.min(area.height);
    Rect {
        x: area.x + (area.width - w) / 2,
        y: area.y + (area.height - h) / 2,
        width: w,
        height: h,
    }
}
