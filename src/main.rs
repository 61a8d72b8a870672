use quickview::app::App;
use quickview::cli::Args;
use quickview::domain::FileTarget;
use quickview::logging;
use quickview::registry::Registry;

use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{
    io,
    time::{Duration, Instant},
};
use tracing::{error, info};

/// Input poll timeout, which also bounds animation latency
const TICK: Duration = Duration::from_millis(50);

fn main() -> io::Result<()> {
    // Parse command line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    let _log_guard = match logging::init(args.log_file.as_deref()) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Warning: Failed to open log file: {}", e);
            None
        }
    };

    let target = match FileTarget::new(&args.file) {
        Ok(target) => target,
        Err(e) => {
            eprintln!("Error: {}: {}", args.file.display(), e);
            std::process::exit(1);
        }
    };
    info!(path = %target.path.display(), extension = %target.extension, "opening file");

    let registry = match Registry::builtin() {
        Ok(registry) => registry,
        Err(e) => {
            error!(error = %e, "invalid renderer registry");
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let config = args.viewer_config();
    let mut app = App::open(target, &registry, &config);

    // Run the app
    run_app(&mut app)
}

/// Runs the viewer until the user quits, restoring the terminal afterwards
fn run_app(app: &mut App) -> io::Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    app.load();
    let result = run_loop(&mut terminal, app);
    app.shutdown();

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(e) = &result {
        error!(error = %e, "terminal loop failed");
    }
    result
}

/// Main application loop
fn run_loop<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    loop {
        app.tick(Instant::now());
        terminal.draw(|frame| app.draw(frame))?;

        if event::poll(TICK)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && app.handle_key(key) {
                    break;
                }
            }
        }
    }

    Ok(())
}
