use crate::config::Config;
use crate::editor::{EditorMode, EditorSession, FieldValue, FormField, TaskEditor};
use crate::model::{Priority, Status, Task, TaskId};
use crate::reorder::{self, append_slot, DragLocation, DropOutcome, DropResult};
use crate::store::ColumnStore;
use anyhow::Result;
use chrono::{DateTime, Utc};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::{Alignment, Color, Modifier, Rect, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Terminal;
use std::io::{stdout, Stdout};
use std::time::Duration;
use tracing::info;

const CARD_HEIGHT: usize = 5;

pub fn run(config: Config) -> Result<()> {
    let mut terminal = setup_terminal()?;
    let mut app = App::new(config);
    let result = app.event_loop(&mut terminal);
    teardown_terminal(&mut terminal)?;
    result
}

struct App {
    store: ColumnStore,
    editor: TaskEditor,
    config: Config,
    selected_column: Status,
    selected_task: usize,
    scroll_offsets: [usize; 3],
    status: String,
    mode: Mode,
}

enum Mode {
    Normal,
    Dragging(DragState),
    ConfirmDelete { task_id: TaskId },
}

/// A task picked up with space. `target` is the slot it would land in,
/// counted with the carried task already taken out of its column.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct DragState {
    origin: DragLocation,
    target: DragLocation,
}

impl App {
    fn new(config: Config) -> Self {
        App {
            store: ColumnStore::new(),
            editor: TaskEditor::new(config.edit_placement),
            config,
            selected_column: Status::Todo,
            selected_task: 0,
            scroll_offsets: [0; 3],
            status: "Press n to create a task".into(),
            mode: Mode::Normal,
        }
    }

    fn event_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
        let tick = Duration::from_millis(self.config.tick_rate_ms.max(10));
        loop {
            terminal.draw(|f| self.draw(f))?;
            if event::poll(tick)? {
                if let Event::Key(key) = event::read()? {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key) {
                        break;
                    }
                }
            }
        }
        info!(revision = self.store.revision(), "leaving tui");
        Ok(())
    }

    /// Returns true when the user asked to quit.
    fn handle_key(&mut self, key: KeyEvent) -> bool {
        if self.editor.is_open() {
            self.handle_form_key(key);
            return false;
        }
        match self.mode {
            Mode::Normal => self.handle_normal_key(key),
            Mode::Dragging(drag) => {
                self.handle_drag_key(drag, key);
                false
            }
            Mode::ConfirmDelete { .. } => {
                self.handle_confirm_key(key);
                false
            }
        }
    }

    fn handle_normal_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char('q') => return true,
            KeyCode::Char('n') => {
                self.editor.open_create();
                self.status =
                    "Creating task (Tab/Shift-Tab move, Ctrl+Enter save, Esc cancel)".into();
            }
            KeyCode::Char('e') => match self.current_task().cloned() {
                Some(task) => {
                    self.editor.open_edit(&task);
                    self.status = format!("Editing {}", task.id);
                }
                None => self.status = "No task selected to edit".into(),
            },
            KeyCode::Char('d') => self.request_delete(),
            KeyCode::Char(' ') => self.start_drag(),
            KeyCode::Left | KeyCode::Char('h') => self.prev_column(),
            KeyCode::Right | KeyCode::Char('l') => self.next_column(),
            KeyCode::Up | KeyCode::Char('k') => self.prev_task(),
            KeyCode::Down | KeyCode::Char('j') => self.next_task(),
            KeyCode::Char('m') | KeyCode::Char('>') => {
                self.send_selected(self.selected_column.next())
            }
            KeyCode::Char('b') | KeyCode::Char('<') => {
                self.send_selected(self.selected_column.prev())
            }
            KeyCode::Char('K') => self.nudge_selected(-1),
            KeyCode::Char('J') => self.nudge_selected(1),
            _ => {}
        }
        false
    }

    fn handle_drag_key(&mut self, mut drag: DragState, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.mode = Mode::Normal;
                self.apply_drop(DropResult::cancelled(drag.origin));
                return;
            }
            KeyCode::Enter | KeyCode::Char(' ') => {
                self.mode = Mode::Normal;
                self.apply_drop(DropResult::to(drag.origin, drag.target));
                return;
            }
            KeyCode::Left | KeyCode::Char('h') => {
                if let Some(column) = drag.target.column.prev() {
                    drag.target = self.clamped_target(drag.origin, column, drag.target.index);
                }
            }
            KeyCode::Right | KeyCode::Char('l') => {
                if let Some(column) = drag.target.column.next() {
                    drag.target = self.clamped_target(drag.origin, column, drag.target.index);
                }
            }
            KeyCode::Up | KeyCode::Char('k') => {
                drag.target.index = drag.target.index.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                drag.target =
                    self.clamped_target(drag.origin, drag.target.column, drag.target.index + 1);
            }
            _ => {}
        }
        self.status = format!(
            "Drop into {} at #{} (Enter drops, Esc cancels)",
            drag.target.column.label(),
            drag.target.index + 1
        );
        self.mode = Mode::Dragging(drag);
    }

    fn handle_confirm_key(&mut self, key: KeyEvent) {
        let task_id = match &self.mode {
            Mode::ConfirmDelete { task_id } => task_id.clone(),
            _ => return,
        };
        match key.code {
            KeyCode::Char('y') | KeyCode::Enter => {
                self.mode = Mode::Normal;
                self.delete_task(&task_id);
            }
            KeyCode::Char('n') | KeyCode::Esc => {
                self.mode = Mode::Normal;
                self.status = "Delete canceled".into();
            }
            _ => {}
        }
    }

    fn handle_form_key(&mut self, key: KeyEvent) {
        let Some(form) = self.editor.form_mut() else {
            return;
        };
        match key.code {
            KeyCode::Esc => {
                self.editor.cancel();
                self.status = "Canceled".into();
            }
            KeyCode::Tab => form.next_field(),
            KeyCode::BackTab => form.prev_field(),
            KeyCode::Left => {
                if form.field == FormField::Priority {
                    form.priority = form.priority.prev();
                } else if let Some(text) = form.active_text_mut() {
                    text.move_left();
                }
            }
            KeyCode::Right => {
                if form.field == FormField::Priority {
                    form.priority = form.priority.next();
                } else if let Some(text) = form.active_text_mut() {
                    text.move_right();
                }
            }
            KeyCode::Up => {
                if let Some(text) = form.active_text_mut() {
                    text.move_up();
                }
            }
            KeyCode::Down => {
                if let Some(text) = form.active_text_mut() {
                    text.move_down();
                }
            }
            KeyCode::Enter => {
                let control = key.modifiers.contains(KeyModifiers::CONTROL);
                if form.field == FormField::Description && !control {
                    form.description.insert_char('\n');
                } else {
                    self.submit_form();
                }
            }
            KeyCode::Backspace => {
                if let Some(text) = form.active_text_mut() {
                    text.backspace();
                }
            }
            KeyCode::Char(c) => {
                if key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
                {
                    return;
                }
                if form.field == FormField::Priority {
                    if c == ' ' {
                        form.priority = form.priority.next();
                    }
                } else if let Some(text) = form.active_text_mut() {
                    text.insert_char(c);
                }
            }
            _ => {}
        }
    }

    fn submit_form(&mut self) {
        match self.editor.submit(self.store.snapshot()) {
            Ok(submission) => {
                let id = submission.task.id.clone();
                let title = submission.task.title.clone();
                self.store.insert(submission.task, submission.placement);
                if let Some((column, idx)) = self.store.snapshot().locate(&id) {
                    self.select(column, idx);
                }
                info!(task_id = %id, "task saved");
                self.status = format!("Saved \"{}\"", title);
            }
            Err(err) => self.status = format!("Could not save: {}", err),
        }
    }

    fn request_delete(&mut self) {
        let Some((task_id, title)) = self.current_task().map(|t| (t.id.clone(), t.title.clone()))
        else {
            self.status = "No task selected to delete".into();
            return;
        };
        if self.config.confirm_delete {
            self.status = format!("Delete \"{}\"? (y to confirm, n/Esc to cancel)", title);
            self.mode = Mode::ConfirmDelete { task_id };
        } else {
            self.delete_task(&task_id);
        }
    }

    fn delete_task(&mut self, task_id: &TaskId) {
        let title = self
            .store
            .snapshot()
            .task(task_id)
            .map(|t| t.title.clone())
            .unwrap_or_else(|| task_id.to_string());
        if self.store.remove(task_id) {
            info!(task_id = %task_id, "task deleted");
            self.status = format!("Deleted \"{}\"", title);
        } else {
            self.status = format!("\"{}\" is already gone", title);
        }
        self.clamp_selection();
    }

    fn start_drag(&mut self) {
        let Some(title) = self.current_task().map(|t| t.title.clone()) else {
            self.status = "No task selected to move".into();
            return;
        };
        self.status = format!(
            "Carrying \"{}\" (arrows pick a slot, Enter drops, Esc cancels)",
            title
        );
        let origin = self.selected_location();
        self.mode = Mode::Dragging(DragState {
            origin,
            target: origin,
        });
    }

    /// Sends the selected task to the bottom of `column`.
    fn send_selected(&mut self, column: Option<Status>) {
        if self.current_task().is_none() {
            self.status = "No task selected to move".into();
            return;
        }
        let Some(column) = column else {
            return;
        };
        let source = self.selected_location();
        let slot = append_slot(self.store.snapshot(), source, column);
        let target = DragLocation::new(column, slot);
        self.apply_drop(DropResult::to(source, target));
    }

    fn nudge_selected(&mut self, delta: isize) {
        if self.current_task().is_none() {
            self.status = "No task selected to move".into();
            return;
        }
        let source = self.selected_location();
        let limit = append_slot(self.store.snapshot(), source, source.column);
        let Some(index) = source
            .index
            .checked_add_signed(delta)
            .filter(|idx| *idx <= limit)
        else {
            return;
        };
        self.apply_drop(DropResult::to(
            source,
            DragLocation::new(source.column, index),
        ));
    }

    fn apply_drop(&mut self, drop: DropResult) {
        match reorder::on_drag_end(&mut self.store, &drop) {
            Ok(DropOutcome::Cancelled) => self.status = "Drag cancelled".into(),
            Ok(DropOutcome::Unchanged) => self.status = "Task left in place".into(),
            Ok(DropOutcome::Reordered { column, to, .. }) => {
                self.select(column, to);
                self.status = format!("Reordered within {}", column.label());
            }
            Ok(DropOutcome::Moved { to, .. }) => {
                self.select(to.column, to.index);
                self.status = format!("Moved to {}", to.column.label());
            }
            Err(err) => self.status = format!("Move rejected: {}", err),
        }
    }

    fn clamped_target(&self, origin: DragLocation, column: Status, index: usize) -> DragLocation {
        let limit = append_slot(self.store.snapshot(), origin, column);
        DragLocation::new(column, index.min(limit))
    }

    fn selected_location(&self) -> DragLocation {
        DragLocation::new(self.selected_column, self.selected_task)
    }

    fn current_task(&self) -> Option<&Task> {
        self.store
            .snapshot()
            .task_at(self.selected_column, self.selected_task)
    }

    fn select(&mut self, column: Status, idx: usize) {
        self.selected_column = column;
        self.selected_task = idx;
    }

    fn clamp_selection(&mut self) {
        let len = self.store.snapshot().column(self.selected_column).len();
        self.selected_task = self.selected_task.min(len.saturating_sub(1));
    }

    fn prev_column(&mut self) {
        if let Some(column) = self.selected_column.prev() {
            self.select(column, 0);
        }
    }

    fn next_column(&mut self) {
        if let Some(column) = self.selected_column.next() {
            self.select(column, 0);
        }
    }

    fn prev_task(&mut self) {
        self.selected_task = self.selected_task.saturating_sub(1);
    }

    fn next_task(&mut self) {
        let len = self.store.snapshot().column(self.selected_column).len();
        if self.selected_task + 1 < len {
            self.selected_task += 1;
        }
    }

    fn drag_state(&self) -> Option<DragState> {
        match self.mode {
            Mode::Dragging(drag) => Some(drag),
            _ => None,
        }
    }

    fn draw(&mut self, f: &mut ratatui::Frame<'_>) {
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(8),
                Constraint::Length(4),
            ])
            .split(f.size());

        self.draw_header(f, layout[0]);
        self.draw_board(f, layout[1]);
        self.draw_footer(f, layout[2]);

        if let Some(session) = self.editor.session() {
            draw_form(f, session);
        } else if let Mode::ConfirmDelete { task_id } = &self.mode {
            self.draw_confirm(f, task_id);
        }
    }

    fn draw_header(&self, f: &mut ratatui::Frame<'_>, area: Rect) {
        let board = self.store.snapshot();
        let mode = match self.mode {
            Mode::Normal if self.editor.is_open() => "editing",
            Mode::Normal => "browse",
            Mode::Dragging(_) => "dragging",
            Mode::ConfirmDelete { .. } => "confirm",
        };
        let title = Line::from(vec![
            Span::styled(
                "taskboard ",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("{} tasks", board.task_count()),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw("  •  "),
            Span::styled(
                format!("revision {}", self.store.revision()),
                Style::default().fg(Color::DarkGray),
            ),
            Span::raw("  •  "),
            Span::styled(mode, Style::default().fg(Color::Magenta)),
        ]);
        let block = Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Style::default().fg(Color::DarkGray));
        let paragraph = Paragraph::new(title)
            .alignment(Alignment::Center)
            .block(block);
        f.render_widget(paragraph, area);
    }

    fn draw_board(&mut self, f: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Ratio(1, 3),
                Constraint::Ratio(1, 3),
                Constraint::Ratio(1, 3),
            ])
            .split(area);
        let drag = self.drag_state();

        for status in Status::ALL {
            let idx = status.index();
            let column = self.store.snapshot().column(status);
            let accent = color_for_index(idx);
            let card_width = chunks[idx].width.saturating_sub(2);

            let mut items = column
                .tasks
                .iter()
                .enumerate()
                .map(|(t_idx, task)| {
                    let carried = drag.map_or(false, |d| d.origin == DragLocation::new(status, t_idx));
                    let selected =
                        drag.is_none() && status == self.selected_column && t_idx == self.selected_task;
                    task_card(task, card_width, selected, carried)
                })
                .collect::<Vec<_>>();

            let mut highlighted = if drag.is_none() && status == self.selected_column {
                Some(self.selected_task)
            } else {
                None
            };
            if let Some(d) = drag.filter(|d| d.target.column == status) {
                let slot = placeholder_row(d);
                items.insert(slot.min(items.len()), drop_placeholder(card_width));
                highlighted = Some(slot);
            }

            let mut state = ListState::default();
            let viewport = (chunks[idx].height.saturating_sub(2) as usize / CARD_HEIGHT).max(1);
            let offset = match highlighted {
                Some(sel) if !items.is_empty() => {
                    let sel = sel.min(items.len() - 1);
                    state.select(Some(sel));
                    adjust_offset(sel, self.scroll_offsets[idx], viewport, 0, items.len())
                }
                _ => self.scroll_offsets[idx].min(items.len().saturating_sub(1)),
            };
            self.scroll_offsets[idx] = offset;
            *state.offset_mut() = offset;

            let focused = status == self.selected_column;
            let block = Block::default()
                .title(Span::styled(
                    format!("{} ({})", column.name(), column.len()),
                    Style::default()
                        .fg(accent)
                        .add_modifier(if focused {
                            Modifier::BOLD | Modifier::UNDERLINED
                        } else {
                            Modifier::BOLD
                        }),
                ))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(accent))
                .style(Style::default().bg(Color::Rgb(16, 18, 24)));

            if items.is_empty() {
                let empty = Paragraph::new(Span::styled(
                    "No tasks",
                    Style::default().fg(Color::DarkGray),
                ))
                .alignment(Alignment::Center)
                .block(block);
                f.render_widget(empty, chunks[idx]);
            } else {
                f.render_stateful_widget(List::new(items).block(block), chunks[idx], &mut state);
            }
        }
    }

    fn draw_footer(&self, f: &mut ratatui::Frame<'_>, area: Rect) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(2), Constraint::Length(2)])
            .split(area);

        let help_bar = Paragraph::new(self.footer_help_line())
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .borders(Borders::TOP)
                    .border_style(Style::default().fg(Color::DarkGray)),
            );
        f.render_widget(help_bar, rows[0]);

        let bottom = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(rows[1]);

        let status = Paragraph::new(self.status.clone())
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::TOP)
                    .border_style(Style::default().fg(Color::DarkGray)),
            );
        f.render_widget(status, bottom[0]);

        let detail = match self.current_task() {
            Some(task) => selected_task_detail(task, Utc::now()),
            None => Line::from("No task selected"),
        };
        let detail = Paragraph::new(detail).wrap(Wrap { trim: true }).block(
            Block::default()
                .borders(Borders::TOP)
                .border_style(Style::default().fg(Color::DarkGray))
                .title("Selected"),
        );
        f.render_widget(detail, bottom[1]);
    }

    fn footer_help_line(&self) -> Line<'static> {
        let key = |k: &'static str, color: Color| Span::styled(k, Style::default().fg(color));
        let spans = match self.mode {
            Mode::Dragging(_) => vec![
                key("←↑↓→ / h j k l", Color::LightCyan),
                Span::raw(" pick slot  "),
                key("Enter/space", Color::LightGreen),
                Span::raw(" drop  "),
                key("Esc", Color::LightRed),
                Span::raw(" cancel"),
            ],
            _ => vec![
                key("←↑↓→ / h j k l", Color::LightCyan),
                Span::raw(" select  "),
                key("space", Color::LightGreen),
                Span::raw(" drag  "),
                key("m/b", Color::LightGreen),
                Span::raw(" next/prev column  "),
                key("J/K", Color::LightGreen),
                Span::raw(" reorder  "),
                key("n", Color::LightMagenta),
                Span::raw(" new  "),
                key("e", Color::LightYellow),
                Span::raw(" edit  "),
                key("d", Color::LightRed),
                Span::raw(" delete  "),
                key("q", Color::LightRed),
                Span::raw(" quit"),
            ],
        };
        Line::from(spans)
    }

    fn draw_confirm(&self, f: &mut ratatui::Frame<'_>, task_id: &TaskId) {
        let area = centered_rect(50, 30, f.size());
        let title = self
            .store
            .snapshot()
            .task(task_id)
            .map(|t| t.title.clone())
            .unwrap_or_else(|| task_id.to_string());
        let body = vec![
            Line::from(Span::styled(
                format!("Delete \"{}\"?", title),
                Style::default()
                    .fg(Color::LightRed)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from("Press y to confirm, n or Esc to cancel"),
        ];
        let dialog = Paragraph::new(body).alignment(Alignment::Center).block(
            Block::default()
                .title(Span::styled(
                    "Confirm Delete",
                    Style::default()
                        .fg(Color::LightRed)
                        .add_modifier(Modifier::BOLD),
                ))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::LightRed)),
        );
        f.render_widget(Clear, area);
        f.render_widget(dialog, area);
    }
}

fn draw_form(f: &mut ratatui::Frame<'_>, session: &EditorSession) {
    let title = match session.mode {
        EditorMode::Create => "New Task",
        EditorMode::Edit(_) => "Edit Task",
    };
    let form = &session.form;
    let area = centered_rect(70, 60, f.size());
    let mut lines = Vec::new();
    lines.extend(field_lines(
        "Title",
        &form.title,
        form.field == FormField::Title,
    ));
    lines.extend(field_lines(
        "Description",
        &form.description,
        form.field == FormField::Description,
    ));
    let picker_active = form.field == FormField::Priority;
    lines.push(Line::from(vec![
        Span::styled(
            "Priority: ",
            Style::default()
                .fg(Color::Gray)
                .add_modifier(Modifier::BOLD | Modifier::DIM),
        ),
        Span::styled(
            if picker_active {
                format!("◀ {} ▶", form.priority.label())
            } else {
                form.priority.label().to_string()
            },
            Style::default().fg(priority_color(form.priority)),
        ),
    ]));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Ctrl+Enter to save • Esc to cancel • Tab/Shift-Tab to move • Enter adds newline in Description • ←/→ or space change priority",
        Style::default().fg(Color::Gray),
    )));
    let dialog = Paragraph::new(lines)
        .block(
            Block::default()
                .title(Span::styled(
                    title,
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                ))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .wrap(Wrap { trim: true });

    f.render_widget(Clear, area);
    f.render_widget(dialog, area);
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

fn teardown_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

/// Row at which the drop marker is drawn. The carried card is still on
/// screen, so slots below it in its own column shift down by one.
fn placeholder_row(drag: DragState) -> usize {
    if drag.target.column == drag.origin.column && drag.target.index >= drag.origin.index {
        drag.target.index + 1
    } else {
        drag.target.index
    }
}

fn color_for_index(idx: usize) -> Color {
    let palette = [Color::Cyan, Color::LightYellow, Color::LightGreen];
    palette[idx % palette.len()]
}

fn priority_color(priority: Priority) -> Color {
    match priority {
        Priority::Low => Color::LightBlue,
        Priority::Medium => Color::LightYellow,
        Priority::High => Color::LightRed,
    }
}

fn adjust_offset(
    selected: usize,
    current_offset: usize,
    viewport: usize,
    scrolloff: usize,
    len: usize,
) -> usize {
    if viewport == 0 || len == 0 {
        return 0;
    }
    let max_offset = len.saturating_sub(viewport);
    let margin = scrolloff.min(viewport.saturating_sub(1));
    let mut offset = current_offset.min(max_offset);
    if selected < offset.saturating_add(margin) {
        offset = selected.saturating_sub(margin);
    } else {
        let upper = offset
            .saturating_add(viewport.saturating_sub(1))
            .saturating_sub(margin);
        if selected > upper {
            offset = selected.saturating_add(margin + 1).saturating_sub(viewport);
        }
    }
    offset.min(max_offset)
}

fn truncate_text(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    if max <= 3 {
        return text.chars().take(max).collect();
    }
    let mut out: String = text.chars().take(max - 3).collect();
    out.push_str("...");
    out
}

fn format_age(since: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - since).num_seconds().max(0);
    if secs < 60 {
        format!("{}s ago", secs)
    } else if secs < 3600 {
        format!("{}m ago", secs / 60)
    } else if secs < 86_400 {
        format!("{}h ago", secs / 3600)
    } else {
        format!("{}d ago", secs / 86_400)
    }
}

fn task_card(task: &Task, width: u16, selected: bool, carried: bool) -> ListItem<'static> {
    let inner_width = width.saturating_sub(4).max(10) as usize;
    let border_char = if selected { "=" } else { "-" };
    let top = format!("+{}+", border_char.repeat(inner_width + 2));
    let title = truncate_text(&task.title, inner_width);
    let meta = truncate_text(
        &format!("{} • {}", task.priority.label(), task.id),
        inner_width,
    );
    let summary = truncate_text(task.description.lines().next().unwrap_or(""), inner_width);
    let lines = vec![
        Line::raw(top.clone()),
        Line::raw(format!("| {:width$} |", title, width = inner_width)),
        Line::from(vec![
            Span::raw("| "),
            Span::styled(
                format!("{:width$}", meta, width = inner_width),
                Style::default().fg(priority_color(task.priority)),
            ),
            Span::raw(" |"),
        ]),
        Line::raw(format!("| {:width$} |", summary, width = inner_width)),
        Line::raw(top),
    ];
    let style = if carried {
        Style::default()
            .bg(Color::Rgb(22, 24, 30))
            .fg(Color::DarkGray)
            .add_modifier(Modifier::DIM | Modifier::CROSSED_OUT)
    } else if selected {
        Style::default()
            .bg(Color::Rgb(252, 214, 112))
            .fg(Color::Black)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().bg(Color::Rgb(22, 24, 30)).fg(Color::Gray)
    };
    ListItem::new(lines).style(style)
}

fn drop_placeholder(width: u16) -> ListItem<'static> {
    let inner_width = width.saturating_sub(4).max(10) as usize;
    ListItem::new(Line::raw(format!(
        "▶ {:^width$}",
        "drop here",
        width = inner_width
    )))
    .style(
        Style::default()
            .fg(Color::Black)
            .bg(Color::LightCyan)
            .add_modifier(Modifier::BOLD),
    )
}

fn field_lines(label: &str, field: &FieldValue, active: bool) -> Vec<Line<'static>> {
    let label_style = Style::default()
        .fg(Color::Gray)
        .add_modifier(Modifier::BOLD | Modifier::DIM);
    let value_style = Style::default().fg(if active { Color::Cyan } else { Color::White });
    let prefix = format!("{}: ", label);
    let spacer = " ".repeat(prefix.chars().count());
    let text = if active {
        field.with_caret()
    } else {
        field.value.clone()
    };
    text.split('\n')
        .enumerate()
        .map(|(idx, line)| {
            Line::from(vec![
                Span::styled(
                    if idx == 0 {
                        prefix.clone()
                    } else {
                        spacer.clone()
                    },
                    label_style,
                ),
                Span::styled(line.to_string(), value_style),
            ])
        })
        .collect()
}

fn selected_task_detail(task: &Task, now: DateTime<Utc>) -> Line<'static> {
    let mut spans = vec![
        Span::styled(
            task.title.clone(),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(
            task.priority.label(),
            Style::default().fg(priority_color(task.priority)),
        ),
        Span::raw("  "),
        Span::styled(task.status.label(), Style::default().fg(Color::LightCyan)),
        Span::raw("  "),
        Span::styled(
            format!("updated {}", format_age(task.updated_at, now)),
            Style::default().fg(Color::DarkGray),
        ),
    ];
    if !task.description.trim().is_empty() {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            task.description.replace('\n', " "),
            Style::default().fg(Color::Gray).add_modifier(Modifier::DIM),
        ));
    }
    Line::from(spans)
}
