use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    path::PathBuf,
    time::Duration,
};
use tracing::info;

use typo::{
    app::{App, AppAction},
    app_dirs::AppDirs,
    config::{Config, FileConfigStore},
    corpus::Corpus,
    high_score::{FileSlot, HighScoreStore, ScoreSlot},
    logging,
    runtime::{AppEvent, CrosstermEventSource, EventSource, FixedTicker, Runner, Ticker},
    trial::{Clock, Trial},
};

/// minimal typing speed trainer with live wpm, accuracy and a personal best
#[derive(Parser, Debug, Clone)]
#[clap(version, about)]
pub struct Cli {
    /// number of words per trial (defaults to the config file, then 25)
    #[clap(short = 'w', long, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
    number_of_words: Option<usize>,

    /// forget the stored personal best before starting
    #[clap(long)]
    reset_high_score: bool,

    /// write logs here instead of the state directory
    #[clap(long)]
    log_file: Option<PathBuf>,

    /// more log detail (-v info, -vv debug, -vvv trace)
    #[clap(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    verbosity: u8,
}

impl Cli {
    /// CLI flags win over the config file
    fn apply_to(&self, mut config: Config) -> Config {
        if let Some(words) = self.number_of_words {
            config.number_of_words = words;
        }
        config
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let log_path = cli
        .log_file
        .clone()
        .or_else(AppDirs::log_path)
        .unwrap_or_else(|| PathBuf::from("typo.log"));
    if let Err(e) = logging::init_logging(cli.verbosity, &log_path) {
        eprintln!("typo: logging disabled: {e}");
    }

    let config = cli.apply_to(FileConfigStore::new().load_or_init());
    let corpus = Corpus::load(&config.corpus)?;
    info!(corpus = %corpus.name, words = config.number_of_words, "starting");

    let mut store = HighScoreStore::open(FileSlot::new());
    if cli.reset_high_score {
        store.clear();
    }
    let trial = Trial::with_system_clock(corpus, config.number_of_words);
    let mut app = App::new(trial, store);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(Duration::from_millis(config.tick_rate_ms)),
    );
    let result = run_tui(&mut terminal, &mut app, &runner);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_tui<B, C, S, E, T>(
    terminal: &mut Terminal<B>,
    app: &mut App<C, S>,
    runner: &Runner<E, T>,
) -> Result<(), Box<dyn Error>>
where
    B: Backend,
    C: Clock,
    S: ScoreSlot,
    E: EventSource,
    T: Ticker,
{
    let size = terminal.size()?;
    app.set_viewport(size.width, size.height);

    loop {
        terminal.draw(|f| f.render_widget(&*app, f.area()))?;

        match runner.step() {
            // Ticks only refresh live wpm and animate confetti
            AppEvent::Tick => app.on_tick(),
            AppEvent::Resize => {
                let size = terminal.size()?;
                app.set_viewport(size.width, size.height);
            }
            AppEvent::Key(key) => {
                if app.on_key(key) == AppAction::Quit {
                    break;
                }
            }
        }
    }

    Ok(())
}
