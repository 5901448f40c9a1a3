use clap::{error::ErrorKind, CommandFactory, Parser, ValueEnum};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use directories::ProjectDirs;
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Frame, Terminal,
};
use std::{
    error::Error,
    fs::{self, OpenOptions},
    io::{self, stdin},
    path::PathBuf,
    sync::Mutex,
    time::Duration,
};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use typing_test::{
    app::{App, Control},
    config::{Config, ConfigStore, FileConfigStore},
    corpus::{build_generator, CorpusConfig, CorpusKind},
    history::History,
    runtime::{CrosstermEventSource, EventSource, FixedTicker, Runner, Ticker},
    ui::SessionScreen,
};

const LOG_ENV: &str = "TYPING_TEST_LOG";

/// timed typing test with per-word scoring
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A timed typing test. Words are scored at every space; the round ends when the timer runs out."
)]
pub struct Cli {
    /// number of seconds per round
    #[clap(short = 's', long)]
    secs: Option<u32>,

    /// number of words to generate per paragraph
    #[clap(short = 'w', long)]
    words: Option<usize>,

    /// where paragraph text comes from
    #[clap(short = 'c', long, value_enum)]
    corpus: Option<CorpusKind>,

    /// word list to draw from in words mode
    #[clap(short = 'l', long)]
    language: Option<String>,

    /// custom prompt to use instead of generated text
    #[clap(short = 'p', long)]
    prompt: Option<String>,

    /// write diagnostics to this file (level from TYPING_TEST_LOG, default warn)
    #[clap(long)]
    log_file: Option<PathBuf>,

    /// do not append finished rounds to the history file
    #[clap(long)]
    no_history: bool,
}

impl Cli {
    /// Command line flags win over the stored config
    fn merge(&self, mut cfg: Config) -> Config {
        if let Some(secs) = self.secs {
            cfg.round_secs = secs;
        }
        if let Some(words) = self.words {
            cfg.word_count = words;
        }
        if let Some(corpus) = self.corpus {
            cfg.corpus = corpus.to_string().to_lowercase();
        }
        if let Some(ref language) = self.language {
            cfg.language = language.clone();
        }
        if self.no_history {
            cfg.record_history = false;
        }
        cfg
    }

    fn to_corpus_config(&self, cfg: &Config) -> CorpusConfig {
        let kind = CorpusKind::from_str(&cfg.corpus, true).unwrap_or_else(|_| {
            warn!(corpus = %cfg.corpus, "unknown corpus, using words");
            CorpusKind::Words
        });
        CorpusConfig {
            kind,
            language: cfg.language.clone(),
            word_count: cfg.word_count,
            custom_prompt: self.prompt.clone(),
        }
    }
}

fn default_log_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "typing-test").map(|pd| pd.data_local_dir().join("typing-test.log"))
}

fn init_logging(path: Option<PathBuf>) -> Result<(), Box<dyn Error>> {
    let Some(path) = path.or_else(default_log_path) else {
        return Ok(());
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(&path)?;

    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    init_logging(cli.log_file.clone())?;

    let store = FileConfigStore::new();
    let loaded = store.load();
    let cfg = cli.merge(loaded.clone());
    debug!(?cfg, "effective config");
    // flags given once stick for later runs
    if let Err(err) = store.update(&loaded, &cfg) {
        warn!(%err, "could not save config");
    }

    let generator = build_generator(&cli.to_corpus_config(&cfg))?;
    let history = if cfg.record_history {
        History::open_default()
            .map_err(|err| warn!(%err, "round history disabled"))
            .ok()
    } else {
        None
    };
    let mut app = App::new(generator, cfg.round_secs, history);

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut runner = Runner::new(CrosstermEventSource::new(), FixedTicker::every_second());
    let result = start_tui(
        &mut terminal,
        &mut app,
        &mut runner,
        Duration::from_millis(cfg.tick_ms.max(1)),
    );

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn start_tui<B: Backend, E: EventSource, T: Ticker>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runner: &mut Runner<E, T>,
    poll: Duration,
) -> Result<(), Box<dyn Error>> {
    terminal.draw(|f| ui(app, f))?;

    loop {
        let Some(event) = runner.step(poll) else {
            continue;
        };

        if app.handle(event, runner) == Control::Quit {
            break;
        }

        terminal.draw(|f| ui(app, f))?;
    }

    runner.disarm_timer();
    Ok(())
}

fn ui(app: &App, f: &mut Frame) {
    let view = app.session.view();
    let best = if app.session.has_ended() {
        app.previous_best_wpm()
    } else {
        app.best_wpm()
    };
    f.render_widget(SessionScreen::new(&view).best_wpm(best), f.area());
}
