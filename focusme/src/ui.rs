use crate::app::{App, AppMode};
use focusme_core::{KeyValueStore, Mode, TimerState, Window};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, BorderType, Borders, Clear, Gauge, Paragraph},
    Frame,
};

pub fn draw<S: KeyValueStore>(f: &mut Frame, app: &App<S>) {
    let area = f.area();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(9),
            Constraint::Min(8),
            Constraint::Length(1),
        ])
        .split(area);

    draw_header(f, chunks[0], app);

    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(chunks[1]);
    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(6), Constraint::Length(3)])
        .split(top[0]);
    draw_timer(f, left[0], app);
    draw_today(f, left[1], app);
    draw_todos(f, top[1], app);

    draw_history(f, chunks[2], app);
    draw_status_bar(f, chunks[3], app);

    match app.mode {
        AppMode::AddingTodo => draw_input_overlay(f, "New Task", app),
        AppMode::EditingFocus => draw_input_overlay(f, "Focus (minutes)", app),
        AppMode::EditingBreak => draw_input_overlay(f, "Break (minutes)", app),
        AppMode::ConfirmBreak => draw_confirm_overlay(f, app),
        AppMode::ShowHelp => draw_help_overlay(f, app),
        AppMode::Normal => {}
    }
}

fn panel<'a>(title: String, app_color: ratatui::style::Color, title_color: ratatui::style::Color) -> Block<'a> {
    Block::default()
        .title(Span::styled(title, Style::default().fg(title_color)))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(app_color))
}

fn draw_header<S: KeyValueStore>(f: &mut Frame, area: Rect, app: &App<S>) {
    let theme = &app.config.theme;
    let icons = &app.config.icons;
    let text = Line::from(vec![
        Span::raw(icons.header_left.clone()),
        Span::styled(
            "FOCUS ME",
            Style::default().fg(theme.blue).add_modifier(Modifier::BOLD),
        ),
        Span::raw(icons.header_right.clone()),
    ]);
    f.render_widget(
        Paragraph::new(text).alignment(Alignment::Center).block(
            Block::default()
                .borders(Borders::BOTTOM)
                .border_style(Style::default().fg(theme.black)),
        ),
        area,
    );
}

fn draw_timer<S: KeyValueStore>(f: &mut Frame, area: Rect, app: &App<S>) {
    let theme = &app.config.theme;
    let icons = &app.config.icons;
    let session = app.tracker.session();
    let state = app.tracker.timer_state();
    let durations = app.tracker.durations();

    let (state_icon, accent) = match state {
        TimerState::Focusing => (&icons.focus, theme.red),
        TimerState::OnBreak | TimerState::BreakReady => (&icons.rest, theme.green),
        TimerState::Paused(_) => (&icons.pause, theme.yellow),
        TimerState::Idle => (&icons.idle, theme.gray),
    };
    let mode_name = match session.mode {
        Mode::Focus => "Focus",
        Mode::Break => "Break",
    };

    let block = panel(format!(" {} Timer ", icons.timer), accent, theme.gray);
    let inner_area = block.inner(area);
    f.render_widget(block, area);
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(inner_area);

    f.render_widget(
        Paragraph::new(session.clock())
            .style(
                Style::default()
                    .fg(theme.foreground)
                    .add_modifier(Modifier::BOLD),
            )
            .alignment(Alignment::Center),
        rows[0],
    );
    f.render_widget(
        Gauge::default()
            .gauge_style(Style::default().fg(accent).bg(theme.black))
            .percent((session.progress() * 100.0).clamp(0.0, 100.0) as u16)
            .label(""),
        rows[1],
    );
    f.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled(format!("{} ", state_icon), Style::default().fg(accent)),
            Span::raw(format!("{} {} {}", mode_name, icons.separator, state.label())),
        ]))
        .alignment(Alignment::Center),
        rows[2],
    );
    let lock = if state == TimerState::Idle { "" } else { " (locked)" };
    f.render_widget(
        Paragraph::new(format!(
            "focus {}m {} break {}m{}",
            durations.focus_minutes, icons.separator, durations.break_minutes, lock
        ))
        .style(Style::default().fg(theme.gray))
        .alignment(Alignment::Center),
        rows[3],
    );
}

fn draw_today<S: KeyValueStore>(f: &mut Frame, area: Rect, app: &App<S>) {
    let theme = &app.config.theme;
    let icons = &app.config.icons;
    let today = app.tracker.today();
    let block = panel(format!(" {} Today ", icons.today), theme.green, theme.gray);
    let inner_area = block.inner(area);
    f.render_widget(block, area);
    f.render_widget(
        Paragraph::new(format!(
            "{} pomodoros {} {} tasks {} {} min",
            today.pomodoros_completed,
            icons.separator,
            today.tasks_completed,
            icons.separator,
            today.focus_minutes
        ))
        .style(Style::default().fg(theme.foreground))
        .alignment(Alignment::Center),
        inner_area,
    );
}

fn draw_todos<S: KeyValueStore>(f: &mut Frame, area: Rect, app: &App<S>) {
    let theme = &app.config.theme;
    let icons = &app.config.icons;
    let block = panel(format!(" {} Tasks ", icons.todo_list), theme.green, theme.gray);
    let inner_area = block.inner(area);
    f.render_widget(block, area);

    let todos = app.tracker.todos();
    if todos.is_empty() {
        f.render_widget(
            Paragraph::new("No tasks yet. Press 'a' to add one.")
                .style(Style::default().fg(theme.gray))
                .alignment(Alignment::Center),
            inner_area,
        );
        return;
    }

    // Keep the selection visible when the list is taller than the panel.
    let height = inner_area.height as usize;
    let offset = if height > 0 && app.selected_todo >= height {
        app.selected_todo + 1 - height
    } else {
        0
    };
    let lines: Vec<Line> = todos
        .iter()
        .enumerate()
        .skip(offset)
        .take(height)
        .map(|(i, todo)| {
            let selected = i == app.selected_todo;
            let marker = if selected {
                Span::styled(icons.select.clone(), Style::default().fg(theme.selection))
            } else {
                Span::raw(" ")
            };
            let check = if todo.completed { &icons.done } else { &icons.pending };
            let text_style = if todo.completed {
                Style::default()
                    .fg(theme.gray)
                    .add_modifier(Modifier::CROSSED_OUT)
            } else {
                Style::default().fg(theme.foreground)
            };
            let line = Line::from(vec![
                marker,
                Span::raw(format!(" {} ", check)),
                Span::styled(todo.text.clone(), text_style),
            ]);
            if selected {
                line.style(Style::default().bg(theme.black))
            } else {
                line
            }
        })
        .collect();
    f.render_widget(Paragraph::new(lines), inner_area);
}

fn draw_history<S: KeyValueStore>(f: &mut Frame, area: Rect, app: &App<S>) {
    let theme = &app.config.theme;
    let icons = &app.config.icons;
    let series = app.series();

    let tabs: Vec<Span> = Window::ALL
        .iter()
        .map(|w| {
            if *w == app.window {
                Span::styled(
                    format!(" {} ", w),
                    Style::default().fg(theme.background).bg(theme.blue),
                )
            } else {
                Span::styled(format!(" {} ", w), Style::default().fg(theme.gray))
            }
        })
        .collect();
    let mut title = vec![Span::styled(
        format!(" {} History ", icons.history),
        Style::default().fg(theme.gray),
    )];
    title.extend(tabs);

    let block = Block::default()
        .title(Line::from(title))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.green));
    let inner_area = block.inner(area);
    f.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(inner_area);

    if series.buckets.is_empty() {
        f.render_widget(
            Paragraph::new("No history yet")
                .style(Style::default().fg(theme.gray))
                .alignment(Alignment::Center),
            rows[0],
        );
    } else {
        let bars: Vec<Bar> = series
            .buckets
            .iter()
            .map(|bucket| {
                Bar::default()
                    .value(u64::from(bucket.pomodoros))
                    .label(Line::from(bucket.label.clone()))
                    .style(Style::default().fg(theme.red))
                    .value_style(Style::default().fg(theme.background).bg(theme.red))
            })
            .collect();
        let count = bars.len().max(1) as u16;
        let bar_width = ((rows[0].width / count).saturating_sub(1)).clamp(1, 9);
        f.render_widget(
            BarChart::default()
                .data(BarGroup::default().bars(&bars))
                .bar_width(bar_width)
                .bar_gap(1),
            rows[0],
        );
    }

    let summary = &series.summary;
    f.render_widget(
        Paragraph::new(format!(
            "total {} pomodoros {sep} {} tasks {sep} {} min {sep} avg {} pomodoros, {} min per day",
            summary.total_pomodoros,
            summary.total_tasks,
            summary.total_minutes,
            summary.avg_pomodoros,
            summary.avg_minutes,
            sep = icons.separator,
        ))
        .style(Style::default().fg(theme.cyan))
        .alignment(Alignment::Center),
        rows[1],
    );
}

fn draw_status_bar<S: KeyValueStore>(f: &mut Frame, area: Rect, app: &App<S>) {
    let theme = &app.config.theme;
    let (mode_text, mode_color) = match app.mode {
        AppMode::Normal => ("NORMAL", theme.green),
        AppMode::AddingTodo => ("INSERT", theme.yellow),
        AppMode::EditingFocus | AppMode::EditingBreak => ("TIME", theme.blue),
        AppMode::ConfirmBreak => ("BREAK", theme.magenta),
        AppMode::ShowHelp => ("HELP", theme.magenta),
    };
    let help = match (&app.message, app.mode) {
        (Some(message), AppMode::Normal) => message.as_str(),
        (None, AppMode::Normal) => {
            "space:start/pause │ r:reset │ f/b:durations │ a:add │ x:done │ d:del │ w:window │ ?:help │ q:quit"
        }
        (_, AppMode::ConfirmBreak) => "y:start break │ n:skip",
        _ => "enter:confirm │ esc:cancel",
    };
    f.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled(
                format!(" {} ", mode_text),
                Style::default()
                    .bg(mode_color)
                    .fg(theme.background)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(" "),
            Span::raw(help),
        ]))
        .block(Block::default().style(Style::default().bg(theme.black).fg(theme.gray))),
        area,
    );
}

fn draw_input_overlay<S: KeyValueStore>(f: &mut Frame, title: &str, app: &App<S>) {
    let area = centered_rect(60, 20, f.area());
    f.render_widget(Clear, area);
    let block = Block::default()
        .title(format!(" {} ", title))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.config.theme.yellow))
        .border_type(BorderType::Double)
        .style(Style::default().bg(app.config.theme.background));
    let inner_area = block.inner(area);
    f.render_widget(block, area);
    f.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled("▸ ", Style::default().fg(app.config.theme.foreground)),
            Span::styled(
                app.input_buffer.as_str(),
                Style::default().fg(app.config.theme.foreground),
            ),
            Span::styled(
                app.config.icons.input_cursor.as_str(),
                Style::default()
                    .fg(app.config.theme.foreground)
                    .add_modifier(Modifier::SLOW_BLINK),
            ),
        ])),
        inner_area,
    );
}

fn draw_confirm_overlay<S: KeyValueStore>(f: &mut Frame, app: &App<S>) {
    let theme = &app.config.theme;
    let area = centered_rect(50, 20, f.area());
    f.render_widget(Clear, area);
    let block = Block::default()
        .title(" Focus complete ")
        .borders(Borders::ALL)
        .border_type(BorderType::Double)
        .border_style(Style::default().fg(theme.magenta))
        .style(Style::default().bg(theme.background));
    let inner_area = block.inner(area);
    f.render_widget(block, area);
    f.render_widget(
        Paragraph::new(vec![
            Line::from(focusme_core::tracker::BREAK_PROMPT),
            Line::from(Span::styled(
                format!("[y] start {}m break   [n] skip", app.tracker.durations().break_minutes),
                Style::default().fg(theme.gray),
            )),
        ])
        .style(Style::default().fg(theme.foreground))
        .alignment(Alignment::Center),
        inner_area,
    );
}

fn draw_help_overlay<S: KeyValueStore>(f: &mut Frame, app: &App<S>) {
    let theme = &app.config.theme;
    let area = centered_rect(60, 70, f.area());
    f.render_widget(Clear, area);

    let shortcuts = [
        (
            "Timer",
            vec![
                ("space", "Start / pause / resume"),
                ("r", "Reset to idle"),
                ("f", "Set focus minutes"),
                ("b", "Set break minutes"),
            ],
        ),
        (
            "Tasks",
            vec![
                ("a", "Add task"),
                ("x", "Toggle complete"),
                ("d", "Delete task"),
                ("j/↓ k/↑", "Move selection"),
            ],
        ),
        (
            "General",
            vec![("w", "Cycle history window"), ("?", "Toggle help"), ("q", "Quit")],
        ),
    ];

    let mut lines = Vec::new();
    for (section, keys) in shortcuts.iter() {
        lines.push(Line::from(Span::styled(
            *section,
            Style::default().fg(theme.blue).add_modifier(Modifier::BOLD),
        )));
        for (key, action) in keys {
            lines.push(Line::from(vec![
                Span::styled(format!("  {:<10}", key), Style::default().fg(theme.selection)),
                Span::raw(*action),
            ]));
        }
        lines.push(Line::from(""));
    }

    f.render_widget(
        Paragraph::new(lines).block(
            Block::default()
                .title(" Help ")
                .borders(Borders::ALL)
                .border_type(BorderType::Double)
                .border_style(Style::default().fg(theme.magenta))
                .style(Style::default().bg(theme.background)),
        ),
        area,
    );
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
