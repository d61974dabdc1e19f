use super::app_logic::TuiApp;
use super::app_state::AppMode;
use anyhow::Result;
use crossterm::event::{self, Event, KeyEventKind};
use ctxyank::FileSource;
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

pub(super) fn handle_events<S: FileSource>(app: &mut TuiApp<'_, S>) -> Result<()> {
    if event::poll(POLL_INTERVAL)? {
        if let Event::Key(key_event) = event::read()? {
            if key_event.kind == KeyEventKind::Press {
                match app.mode {
                    AppMode::Normal => app.handle_normal_mode_input(key_event),
                    AppMode::OpenFolder => app.handle_open_folder_input(key_event),
                }
            }
        }
    }
    app.on_tick(Instant::now());
    Ok(())
}
