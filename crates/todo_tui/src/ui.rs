//! Rendering of the task list snapshot.
//!
//! Reads only `TaskListView` plus app focus/selection; never calls the store.

use crate::app::{App, Focus};
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};
use ratatui::Frame;
use todo_core::{TaskItemView, TaskStore};

const HELP_LIST: &str = "i add  space toggle  e edit  d delete  K/J move  r reload  q quit";
const HELP_INPUT: &str = "enter add  esc back to list  ctrl-c quit";
const HELP_EDIT: &str = "enter save  esc cancel  del delete";

pub fn draw<S: TaskStore>(frame: &mut Frame, app: &App<S>) {
    let view = app.list().view();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(frame.area());

    let header = Paragraph::new(Line::from(Span::styled(
        "Todos",
        Style::default().add_modifier(Modifier::BOLD),
    )))
    .alignment(Alignment::Center);
    frame.render_widget(header, chunks[0]);

    draw_input(frame, chunks[1], &view.input, app.focus() == Focus::Input);

    let editing = view.items.iter().any(|item| item.editing);
    let items: Vec<ListItem> = view.items.iter().map(task_line).collect();
    let title = format!(" {} left ", app.list().pending_count());
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut state = ListState::default();
    if app.focus() == Focus::List {
        state.select(app.selected());
    }
    frame.render_stateful_widget(list, chunks[2], &mut state);

    draw_status(frame, chunks[3], app, editing);
}

fn draw_input(frame: &mut Frame, area: Rect, input: &str, focused: bool) {
    let border_style = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    let text = if input.is_empty() && !focused {
        Span::styled("Enter task here...", Style::default().fg(Color::DarkGray))
    } else {
        Span::raw(input)
    };
    let paragraph = Paragraph::new(Line::from(text)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(" New task "),
    );
    frame.render_widget(paragraph, area);

    if focused {
        let x = area.x + 1 + input.chars().count() as u16;
        frame.set_cursor_position((x.min(area.right().saturating_sub(2)), area.y + 1));
    }
}

fn task_line(item: &TaskItemView) -> ListItem<'static> {
    let checkbox = if item.done { "[x] " } else { "[ ] " };
    let line = match &item.draft {
        Some(draft) => Line::from(vec![
            Span::raw(checkbox),
            Span::styled(
                format!("{draft}_"),
                Style::default().fg(Color::Yellow),
            ),
        ]),
        None if item.done => Line::from(vec![
            Span::raw(checkbox),
            Span::styled(
                item.text.clone(),
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::CROSSED_OUT),
            ),
        ]),
        None => Line::from(vec![Span::raw(checkbox), Span::raw(item.text.clone())]),
    };
    ListItem::new(line)
}

fn draw_status<S: TaskStore>(frame: &mut Frame, area: Rect, app: &App<S>, editing: bool) {
    let line = match app.notice() {
        Some(notice) => Line::from(Span::styled(
            notice.to_string(),
            Style::default().fg(Color::Red),
        )),
        None => {
            let help = match app.focus() {
                Focus::Input => HELP_INPUT,
                Focus::List if editing => HELP_EDIT,
                Focus::List => HELP_LIST,
            };
            Line::from(Span::styled(help, Style::default().fg(Color::DarkGray)))
        }
    };
    frame.render_widget(Paragraph::new(line), area);
}
