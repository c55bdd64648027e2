use crate::tui::app::{App, Focus};
use crate::tui::modal::Modal;
use chrono::{DateTime, Utc};
use geminictl_types::{ProjectStatus, short_session_id};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Clear, List, ListItem, ListState, Paragraph, Wrap};

pub fn render(frame: &mut Frame, app: &App) {
    let [body, footer] =
        Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(frame.area());
    let [sidebar, main] =
        Layout::horizontal([Constraint::Percentage(45), Constraint::Percentage(55)]).areas(body);

    render_projects(frame, sidebar, app);
    render_sessions(frame, main, app);
    render_footer(frame, footer, app);

    if let Some(modal) = &app.modal {
        render_modal(frame, modal);
    }
}

fn pane_block(title: &str, focused: bool) -> Block<'_> {
    let border_style = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    Block::bordered().title(title).border_style(border_style)
}

fn render_projects(frame: &mut Frame, area: Rect, app: &App) {
    let block = pane_block("Projects", app.focus == Focus::Projects);

    if app.projects.is_empty() {
        let message = format!(
            "No projects found in {}",
            app.storage_root().display()
        );
        frame.render_widget(Paragraph::new(message).block(block), area);
        return;
    }

    let items: Vec<ListItem> = app
        .projects
        .iter()
        .map(|project| {
            let (suffix, style) = match project.status {
                ProjectStatus::Scanning => (" [scanning]", Style::default().fg(Color::DarkGray)),
                ProjectStatus::Valid => ("", Style::default()),
                ProjectStatus::Orphaned => (
                    " [orphan]",
                    Style::default()
                        .fg(Color::Red)
                        .add_modifier(Modifier::ITALIC),
                ),
                ProjectStatus::Unlocated => (" [unlocated]", Style::default().fg(Color::Yellow)),
            };
            ListItem::new(Line::from(vec![
                Span::styled(project.display_path().to_string(), style),
                Span::styled(suffix, style),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_symbol("> ")
        .highlight_style(Style::default().add_modifier(Modifier::BOLD));

    let mut state = ListState::default().with_selected(Some(app.project_cursor));
    frame.render_stateful_widget(list, area, &mut state);
}

fn render_sessions(frame: &mut Frame, area: Rect, app: &App) {
    let block = pane_block("Sessions", app.focus == Focus::Sessions);

    let Some(project) = app.selected_project() else {
        frame.render_widget(Paragraph::new("").block(block), area);
        return;
    };

    if project.sessions.is_empty() {
        frame.render_widget(Paragraph::new("No sessions found.").block(block), area);
        return;
    }

    let items: Vec<ListItem> = project
        .sessions
        .iter()
        .map(|session| {
            ListItem::new(Line::from(vec![
                Span::styled(
                    short_session_id(&session.id).to_string(),
                    Style::default().fg(Color::Magenta),
                ),
                Span::raw(format!(
                    " | {} messages | last: {}",
                    session.message_count,
                    format_relative_time(session.last_update)
                )),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_symbol("> ")
        .highlight_style(Style::default().add_modifier(Modifier::BOLD));

    let mut state = ListState::default().with_selected(Some(app.session_cursor));
    frame.render_stateful_widget(list, area, &mut state);
}

fn render_footer(frame: &mut Frame, area: Rect, app: &App) {
    let mut hints =
        "q quit · tab focus · d delete · m move · o open · i inspect".to_string();
    if app.resolving() {
        hints.push_str(" · resolving paths…");
    }
    frame.render_widget(
        Paragraph::new(hints).style(Style::default().fg(Color::DarkGray)),
        area,
    );
}

fn render_modal(frame: &mut Frame, modal: &Modal) {
    let area = centered_rect(frame.area(), 60, modal_height(modal));
    frame.render_widget(Clear, area);

    match modal {
        Modal::Confirm { title, prompt } => {
            let body = format!("{}\n\n(y/n)", prompt);
            frame.render_widget(
                Paragraph::new(body)
                    .wrap(Wrap { trim: false })
                    .block(modal_block(title)),
                area,
            );
        }
        Modal::TextInput { title, value } => {
            let body = format!("{}▏", value);
            frame.render_widget(Paragraph::new(body).block(modal_block(title)), area);
        }
        Modal::ListSelect {
            title,
            options,
            cursor,
        } => {
            if options.is_empty() {
                frame.render_widget(
                    Paragraph::new("No options available.").block(modal_block(title)),
                    area,
                );
                return;
            }
            let items: Vec<ListItem> = options
                .iter()
                .map(|option| ListItem::new(option.label.clone()))
                .collect();
            let list = List::new(items)
                .block(modal_block(title))
                .highlight_symbol("> ")
                .highlight_style(Style::default().add_modifier(Modifier::BOLD));
            let mut state = ListState::default().with_selected(Some(*cursor));
            frame.render_stateful_widget(list, area, &mut state);
        }
        Modal::Inspect { title, lines } => {
            let body = lines.join("\n");
            frame.render_widget(
                Paragraph::new(body)
                    .wrap(Wrap { trim: false })
                    .block(modal_block(title)),
                area,
            );
        }
        Modal::ShowError { message } => {
            frame.render_widget(
                Paragraph::new(message.clone())
                    .wrap(Wrap { trim: false })
                    .style(Style::default().fg(Color::Red))
                    .block(modal_block("Error")),
                area,
            );
        }
    }
}

fn modal_block(title: &str) -> Block<'_> {
    Block::bordered()
        .title(title)
        .border_style(Style::default().fg(Color::Cyan))
}

fn modal_height(modal: &Modal) -> u16 {
    match modal {
        Modal::Confirm { .. } => 5,
        Modal::TextInput { .. } => 3,
        Modal::ListSelect { options, .. } => (options.len() as u16).clamp(1, 12) + 2,
        Modal::Inspect { lines, .. } => (lines.len() as u16).min(12) + 2,
        Modal::ShowError { .. } => 5,
    }
}

fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width.saturating_sub(width)) / 2,
        y: area.y + (area.height.saturating_sub(height)) / 2,
        width,
        height,
    }
}

fn format_relative_time(t: DateTime<Utc>) -> String {
    let elapsed = Utc::now().signed_duration_since(t);
    if elapsed.num_minutes() < 1 {
        "just now".to_string()
    } else if elapsed.num_hours() < 1 {
        format!("{}m ago", elapsed.num_minutes())
    } else if elapsed.num_hours() < 24 {
        format!("{}h ago", elapsed.num_hours())
    } else {
        t.format("%Y-%m-%d").to_string()
    }
}
