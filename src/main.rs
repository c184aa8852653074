mod app;
mod chime;
mod domain;
mod engine;
mod input;
mod persistence;
mod report;
mod ui;

use anyhow::Result;
use app::AppState;
use chime::{CompletionChime, SilentChime, SystemChime};
use clap::{Parser, Subcommand};
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use engine::{DebugEdge, Engine};
use persistence::{
    data_file, ensure_daybook_dir, export_file, get_daybook_dir, init_local_daybook,
    load_settings, save_settings, settings_file, JsonStore, Settings,
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "daybook")]
#[command(about = "A terminal-based daily task manager with automatic carryover", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a local .daybook directory in the current directory
    Init,
    /// Export every day and task to a delimited text file
    Export {
        /// Output file path. Defaults to export-YYYY-MM-DD.csv in the daybook directory.
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Print the deduplicated task statistics
    Stats,
    /// Create an ephemeral day adjacent to the loaded range (purged at next startup)
    DebugDay {
        /// Attach before the earliest day instead of after the latest
        #[arg(long)]
        before: bool,
        /// Carry incomplete tasks over from the adjacent day
        #[arg(long)]
        carryover: bool,
    },
}

/// Run the startup sequence against the on-disk store
fn load_engine(chime: Box<dyn CompletionChime>) -> Result<Engine> {
    let settings = load_settings(settings_file()?)?;
    let store = JsonStore::new(data_file()?);
    Engine::bootstrap(Box::new(store), chime, settings)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Init) => {
            let daybook_dir = init_local_daybook()?;
            save_settings(daybook_dir.join("settings.json"), &Settings::default())?;
            println!("Initialized daybook directory: {}", daybook_dir.display());
            println!();
            println!("Daybook will now use this local directory for task storage.");
            println!("Run 'daybook' to start planning your day.");
            Ok(())
        }
        Some(Commands::Export { output }) => {
            let engine = load_engine(Box::new(SilentChime))?;
            let blob = report::export_all(engine.days(), engine.arena());

            let path = match output {
                Some(p) => PathBuf::from(p),
                None => export_file(engine.today())?,
            };
            std::fs::write(&path, blob)?;
            println!("Exported {} days to {}", engine.days().len(), path.display());
            Ok(())
        }
        Some(Commands::Stats) => {
            let engine = load_engine(Box::new(SilentChime))?;
            let stats = engine.stats();
            println!("Task groups:      {}", stats.total_groups);
            println!("  completed:      {}", stats.completed_groups);
            println!("  pending:        {}", stats.pending_groups);
            println!("Avg completion:   {:.1} minutes", stats.average_completion_minutes);
            println!("Avg daily rate:   {:.1}%", stats.average_daily_completion_rate);
            println!("Today:            {:.1}%", stats.today_completion_rate);
            Ok(())
        }
        Some(Commands::DebugDay { before, carryover }) => {
            let mut engine = load_engine(Box::new(SilentChime))?;
            let edge = if before {
                DebugEdge::BeforeEarliest
            } else {
                DebugEdge::AfterLatest
            };
            match engine.create_debug_day(edge, carryover)? {
                Some(date) => println!("Created ephemeral day {}", date),
                None => println!("No day created"),
            }
            Ok(())
        }
        None => run_tui(),
    }
}

fn run_tui() -> Result<()> {
    ensure_daybook_dir()?;

    // Show which directory we're using
    let daybook_dir = get_daybook_dir()?;
    eprintln!("Using daybook directory: {}", daybook_dir.display());

    let engine = load_engine(Box::new(SystemChime))?;
    let mut app = AppState::new(engine);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run app
    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    // Print any errors
    if let Err(err) = result {
        eprintln!("Error: {}", err);
    }

    Ok(())
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut AppState) -> Result<()> {
    let tick_rate = Duration::from_millis(250);

    loop {
        // Render
        terminal.draw(|f| ui::render(f, app))?;

        // Handle events with a poll timeout so the clock-driven pieces of
        // the UI stay fresh
        if event::poll(tick_rate)? {
            if let Event::Key(key) = event::read()? {
                // Only process key press events (ignore key release)
                if key.kind == KeyEventKind::Press {
                    let should_quit = input::handle_key(app, key)?;
                    if should_quit {
                        return Ok(());
                    }
                }
            }
        }
    }
}
