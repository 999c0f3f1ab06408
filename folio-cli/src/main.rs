//! Folio CLI - Terminal rich-text editor

mod io;
mod ui;

use std::fs::OpenOptions;
use std::io::stdout;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use tracing_subscriber::EnvFilter;

use folio_core::{App, Document, ElementType, KeyChord, Mode, Motion};

#[derive(Parser, Debug)]
#[command(name = "folio", version, about = "Terminal rich-text editor")]
struct Args {
    /// File to open: a JSON document or value, or plain text
    file: Option<String>,

    /// Write the document as HTML to PATH and exit
    #[arg(long, value_name = "PATH")]
    export_html: Option<PathBuf>,

    /// Write the document export JSON to PATH and exit
    #[arg(long, value_name = "PATH")]
    export_json: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose)?;

    let config = io::load_config().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "using default config");
        Default::default()
    });
    let mut app = App::with_config(config);

    let loaded = match &args.file {
        Some(path) => io::load_file(path).map(|doc| (doc, path.clone())),
        None => Ok((Document::sample(), String::new())),
    };

    if args.export_html.is_some() || args.export_json.is_some() {
        let (doc, _) = loaded?;
        app.load_document(doc)?;
        return export_headless(&app, &args);
    }

    match loaded {
        Ok((doc, path)) => {
            app.load_document(doc)?;
            if path.is_empty() {
                app.set_status("No file loaded. Pass a file path as argument.");
            } else {
                app.set_status(&format!("Loaded {}", path));
            }
        }
        Err(e) => {
            app.load_document(Document::sample())?;
            app.set_status(&format!("Error: {}", e));
        }
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Main loop
    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(e) = res {
        tracing::error!(error = %e, "editor loop failed");
        eprintln!("Error: {}", e);
    }

    Ok(())
}

/// Log to ~/.folio/folio.log; the terminal belongs to the editor
fn init_logging(verbose: bool) -> Result<()> {
    let log_path = io::folio_dir()?.join("folio.log");
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open {}", log_path.display()))?;

    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn export_headless(app: &App, args: &Args) -> Result<()> {
    let doc = app.document.as_ref().context("No document loaded")?;
    if let Some(path) = &args.export_html {
        let written = io::export_html(doc, path)?;
        println!("Wrote {}", written.display());
    }
    if let Some(path) = &args.export_json {
        let written = io::export_document(doc, Some(path))?;
        println!("Wrote {}", written.display());
    }
    Ok(())
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    while app.running {
        terminal.draw(|f| ui::draw(f, app))?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            // Clear status on any key
            app.clear_status();

            match app.mode {
                Mode::Normal => handle_edit_mode(app, key),
                Mode::Help => {
                    app.mode = Mode::Normal;
                }
            }
        }
    }
    Ok(())
}

fn handle_edit_mode(app: &mut App, key: KeyEvent) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let shift = key.modifiers.contains(KeyModifiers::SHIFT);
    let alt = key.modifiers.contains(KeyModifiers::ALT);

    match key.code {
        KeyCode::F(1) => app.toggle_help(),

        // Application chords
        KeyCode::Char('q') if ctrl => app.running = false,
        KeyCode::Char('s') if ctrl => {
            if let Some(doc) = &app.document {
                match io::export_document(doc, None) {
                    Ok(path) => app.set_status(&format!("Exported to {}", path.display())),
                    Err(e) => app.set_status(&format!("Export failed: {}", e)),
                }
            }
        }
        KeyCode::Char('a') if ctrl => app.select_all(),
        KeyCode::Char('l') if ctrl => app.toggle_block(ElementType::BulletedList),
        KeyCode::Char('o') if ctrl => app.toggle_block(ElementType::NumberedList),

        // Terminals send Ctrl+` as Ctrl+Space
        KeyCode::Char(' ') if ctrl => {
            app.handle_chord(KeyChord::ctrl('`'));
        }
        KeyCode::Char(c) if ctrl => {
            let mut chord = KeyChord::ctrl(c);
            chord.shift = shift || c.is_ascii_uppercase();
            chord.alt = alt;
            app.handle_chord(chord);
        }

        // Navigation
        KeyCode::Left if ctrl => app.move_cursor(Motion::WordBack, shift),
        KeyCode::Right if ctrl => app.move_cursor(Motion::WordForward, shift),
        KeyCode::Home if ctrl => app.move_cursor(Motion::Top, shift),
        KeyCode::End if ctrl => app.move_cursor(Motion::Bottom, shift),
        KeyCode::Left => app.move_cursor(Motion::Left, shift),
        KeyCode::Right => app.move_cursor(Motion::Right, shift),
        KeyCode::Up => app.move_cursor(Motion::Up, shift),
        KeyCode::Down => app.move_cursor(Motion::Down, shift),
        KeyCode::Home => app.move_cursor(Motion::LineStart, shift),
        KeyCode::End => app.move_cursor(Motion::LineEnd, shift),

        // Editing
        KeyCode::Enter => app.insert_break(),
        KeyCode::Backspace => app.backspace(),
        KeyCode::Delete => app.delete(),
        KeyCode::Char(c) if !alt => app.insert_char(c),

        _ => {}
    }
}
