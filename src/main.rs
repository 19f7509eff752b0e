mod app;
mod canvas;
mod config;
mod event;
mod games;
mod host;
mod logging;
mod scheduler;
mod selector;
mod ui;

use std::io;
use std::panic;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use app::App;
use config::Config;
use event::{Event, EventHandler};
use games::GameKind;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file (TOML)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Turn debugging information on
    #[arg(short, long)]
    debug: bool,

    /// Seed the random number generators
    #[arg(long, value_name = "N")]
    seed: Option<u64>,

    /// Start a game right away: snake, breakout or 2048
    #[arg(short, long, value_name = "GAME")]
    game: Option<GameKind>,
}

type Tui = Terminal<CrosstermBackend<io::Stdout>>;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("cannot load config from {}", path.display()))?,
        None => Config::default(),
    };
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }

    logging::setup(&config.log.file, cli.debug)?;
    log::info!("minicade {} starting", env!("CARGO_PKG_VERSION"));

    let mut terminal = setup_terminal().context("cannot set up the terminal")?;
    let result = run(&mut terminal, config, cli.game);
    restore_terminal(&mut terminal).context("cannot restore the terminal")?;

    if let Err(e) = &result {
        log::error!("{e:#}");
    }
    log::info!("minicade exiting");
    result
}

fn setup_terminal() -> io::Result<Tui> {
    // Leave the alternate screen before the panic message is printed.
    let hook = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        hook(info);
    }));

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Tui) -> io::Result<()> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()
}

fn run(terminal: &mut Tui, config: Config, game: Option<GameKind>) -> Result<()> {
    let event_handler = EventHandler::new(config.timing.frame());
    let mut app = App::new(config);
    if let Some(kind) = game {
        app.selector.start(kind);
    }

    let mut last_tick = Instant::now();
    loop {
        terminal.draw(|frame| ui::render(frame, &mut app))?;

        match event_handler.next()? {
            Event::Tick => {
                let now = Instant::now();
                app.on_tick(now - last_tick);
                last_tick = now;
            }
            Event::Key(key) => app.on_key(key),
            Event::Mouse(mouse) => app.on_mouse(mouse),
        }

        if app.should_quit {
            break;
        }
    }

    app.selector.stop();
    Ok(())
}
