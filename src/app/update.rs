//! Event loop: tick, draw, poll input.
use anyhow::Result;
use crossterm::event::{self, Event, KeyEventKind};
use ratatui::Terminal;
use ratatui::backend::Backend;
use std::time::Duration;

use crate::app::AppState;
use crate::ui;

/// Poll interval; also bounds how long a finished request waits to be applied.
const POLL: Duration = Duration::from_millis(100);

pub fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut AppState) -> Result<()> {
    loop {
        app.tick();
        terminal.draw(|f| ui::render(f, app))?;
        if app.should_quit {
            tracing::info!("quit requested");
            break;
        }

        if event::poll(POLL)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => app.handle_key(key),
                _ => {}
            }
        }
    }
    Ok(())
}
