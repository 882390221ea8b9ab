use std::io::{self, Write};
use std::panic;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    cursor::Show,
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use super::app::App;
use super::models::InputMode;
use super::rendering::ui;

/// Leaves the alternate screen and raw mode when dropped, including while
/// unwinding.
struct TerminalGuard<W: Write> {
    out: W,
    raw_mode: bool,
}

impl<W: Write> TerminalGuard<W> {
    fn enter(out: W) -> Result<Self> {
        enable_raw_mode().context("Failed to enable raw mode")?;
        let mut guard = Self { out, raw_mode: true };
        execute!(guard.out, EnterAlternateScreen, EnableMouseCapture)
            .context("Failed to enter the alternate screen")?;
        Ok(guard)
    }
}

impl<W: Write> Drop for TerminalGuard<W> {
    fn drop(&mut self) {
        if self.raw_mode {
            let _ = disable_raw_mode();
        }
        let _ = execute!(self.out, LeaveAlternateScreen, DisableMouseCapture, Show);
    }
}

/// Restores the terminal before the default hook prints the panic message.
fn install_panic_hook() {
    let previous = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture, Show);
        previous(info);
    }));
}

pub fn run_tui(app: &mut App) -> Result<()> {
    install_panic_hook();
    let _guard = TerminalGuard::enter(io::stdout())?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;

    run_app(&mut terminal, app).context("Terminal UI failed")
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    while !app.should_quit {
        app.clear_status_message_if_expired();

        terminal.draw(|f| ui(f, app))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    handle_key(app, key);
                }
            }
        }
    }
    Ok(())
}

pub fn handle_key(app: &mut App, key: KeyEvent) {
    match app.input_mode {
        InputMode::Normal => handle_normal_key(app, key),
        InputMode::AddPath | InputMode::OutputDir => handle_text_key(app, key),
        InputMode::ConfirmRename => match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => app.confirm_rename(true),
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => app.confirm_rename(false),
            _ => {}
        },
    }
}

fn handle_normal_key(app: &mut App, key: KeyEvent) {
    let shift = key.modifiers.contains(KeyModifiers::SHIFT);

    if app.show_help {
        if matches!(key.code, KeyCode::Char('h') | KeyCode::Char('q') | KeyCode::Esc) {
            app.toggle_help();
        }
        return;
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.should_quit = true,
        KeyCode::Char('h') | KeyCode::Char('?') => app.toggle_help(),
        KeyCode::Up if shift => app.move_selected_up(),
        KeyCode::Down if shift => app.move_selected_down(),
        KeyCode::Char('K') => app.move_selected_up(),
        KeyCode::Char('J') => app.move_selected_down(),
        KeyCode::Down | KeyCode::Char('j') => app.next(),
        KeyCode::Up | KeyCode::Char('k') => app.previous(),
        KeyCode::Char('a') => app.begin_input(InputMode::AddPath),
        KeyCode::Char('o') => app.begin_input(InputMode::OutputDir),
        KeyCode::Char('d') | KeyCode::Delete => app.remove_selected(),
        KeyCode::Char('c') => app.clear_files(),
        KeyCode::Char('+') | KeyCode::Char('=') | KeyCode::Right => app.increment_start(),
        KeyCode::Char('-') | KeyCode::Left => app.decrement_start(),
        KeyCode::Char('r') | KeyCode::Enter => app.request_rename(),
        _ => {}
    }
}

fn handle_text_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => app.submit_input(),
        KeyCode::Esc => app.cancel_input(),
        KeyCode::Backspace => {
            app.input.pop();
        }
        KeyCode::Char(c) => app.input.push(c),
        _ => {}
    }
}
