use crate::tui::app::{App, AppCommand};
use crate::tui::ui;
use anyhow::Result;
use crossterm::event::{self, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use std::io;
use std::path::Path;
use std::process::Command;
use std::time::Duration;

/// Run the interactive controller until the user quits.
pub fn run(mut app: App) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn event_loop(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|frame| ui::render(frame, app))?;

        // Handle events with timeout so resolver messages keep flowing even
        // when the keyboard is idle.
        if event::poll(Duration::from_millis(100))?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            match app.handle_key(key) {
                Some(AppCommand::Quit) => return Ok(()),
                Some(AppCommand::OpenSession { path, session_id }) => {
                    open_session(terminal, app, &path, &session_id)?;
                }
                None => {}
            }
        }

        app.poll_resolver();
    }
}

/// Hand the terminal to the assistant for the duration of the session, then
/// take it back and reload whatever the session changed on disk.
fn open_session(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    path: &Path,
    session_id: &str,
) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;

    let status = Command::new("gemini")
        .arg("--resume")
        .arg(session_id)
        .current_dir(path)
        .status();

    enable_raw_mode()?;
    execute!(terminal.backend_mut(), EnterAlternateScreen)?;
    terminal.clear()?;

    match status {
        Ok(_) => app.refresh(),
        Err(err) => app.show_error(format!("Failed to launch gemini: {}", err)),
    }
    Ok(())
}
