mod app_logic;
mod app_state;
mod event_handler;
mod ui_renderer;

pub use app_state::{ViewTab, YankRequest};

use anyhow::{Context, Result};
use app_logic::TuiApp;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ctxyank::{FileSource, Preferences, Session};
use ratatui::prelude::{CrosstermBackend, Terminal};
use std::io::{self, Stdout};
use std::path::PathBuf;
use std::time::Duration;

type Term = Terminal<CrosstermBackend<Stdout>>;

/// Runs the interactive selection until the user yanks or quits.
/// Returns `None` when the user quit without yanking.
pub fn run_tui<S: FileSource>(
    session: &mut Session<S>,
    preferences: Preferences,
    preferences_path: Option<PathBuf>,
    quiet_period: Duration,
) -> Result<Option<YankRequest>> {
    let mut app = TuiApp::new(session, preferences, preferences_path, quiet_period);

    let mut terminal = enter_terminal().context("setting up the terminal")?;
    let outcome = event_loop(&mut terminal, &mut app);
    // Leave the alternate screen even when the loop failed.
    leave_terminal(&mut terminal)?;
    outcome?;

    Ok(app.request)
}

fn event_loop<S: FileSource>(terminal: &mut Term, app: &mut TuiApp<'_, S>) -> Result<()> {
    while !app.quit {
        terminal.draw(|frame| ui_renderer::ui_frame(frame, app))?;
        event_handler::handle_events(app)?;
    }
    Ok(())
}

fn enter_terminal() -> Result<Term> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    Ok(Terminal::new(CrosstermBackend::new(stdout))?)
}

fn leave_terminal(terminal: &mut Term) -> Result<()> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    Ok(())
}
