pub mod config;
pub mod game;
pub mod keymap;
pub mod runtime;
pub mod score;
pub mod target;
pub mod ui;
pub mod util;

use crate::config::{Config, ConfigStore, FileConfigStore};
use crate::game::Game;
use crate::runtime::{CrosstermEventSource, FixedTicker, GameEvent, Runner};
use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Frame, Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    time::{Duration, Instant},
};

const TICK_RATE_MS: u64 = 100;

/// minimal reaction-time trainer tui
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A colored circle appears somewhere on the playfield; press the arrow key matching its color before the idle clock runs out. Finish the rounds and get your average reaction time and score."
)]
pub struct Cli {
    /// number of rounds in a session
    #[clap(short = 'm', long)]
    matches: Option<usize>,

    /// idle timeout per round, in milliseconds
    #[clap(short = 't', long)]
    idle_timeout_ms: Option<u64>,

    /// seed for the target generator (deterministic sessions)
    #[clap(long)]
    seed: Option<u64>,
}

impl Cli {
    /// Overlay the flags that were given onto the stored configuration
    fn apply(&self, mut config: Config) -> Config {
        if let Some(matches) = self.matches {
            config.max_matches = matches;
        }
        if let Some(timeout) = self.idle_timeout_ms {
            config.idle_timeout_ms = timeout;
        }
        config
    }
}

#[derive(Debug)]
pub struct App {
    pub cli: Cli,
    pub game: Game,
}

impl App {
    pub fn new(cli: Cli, config: Config) -> Self {
        let game = match cli.seed {
            Some(seed) => Game::with_seed(config, seed),
            None => Game::new(config),
        };
        Self { cli, game }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let config = cli.apply(FileConfigStore::new().load());

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(cli, config);
    let res = run_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}

fn run_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(Duration::from_millis(TICK_RATE_MS)),
    );

    terminal.draw(|f| ui(app, f))?;

    loop {
        match runner.step() {
            GameEvent::Tick => {
                let was_running = app.game.is_running();
                app.game.on_tick(Instant::now());

                // Redraw on ticks only while a session is live (or just
                // ended on this tick); the idle screen is static.
                if was_running {
                    terminal.draw(|f| ui(app, f))?;
                }
            }
            GameEvent::Resize => {
                terminal.draw(|f| ui(app, f))?;
            }
            GameEvent::Key(key) => {
                match key.code {
                    KeyCode::Esc => break,
                    KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => break,
                    KeyCode::Enter if !app.game.is_running() => app.game.start(Instant::now()),
                    KeyCode::Char('r') => app.game.reset(),
                    // Everything else is an answer attempt; while running,
                    // unmapped keys score as misses.
                    code => app.game.on_key(keymap::classify(code), Instant::now()),
                }
                terminal.draw(|f| ui(app, f))?;
            }
        }
    }

    Ok(())
}

fn ui(app: &App, f: &mut Frame) {
    f.render_widget(app, f.area());
}
