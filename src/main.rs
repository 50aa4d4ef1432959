use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use quizline::{
    app::{App, Control},
    app_dirs::AppDirs,
    catalog::{InMemoryCatalog, ListQuery, QuizFilter, SortBy},
    config::{Config, FileConfigStore},
    format::{format_average, format_due},
    logging,
    runtime::{CrosstermEventSource, FixedTicker, QuizEvent, QuizEventSource, Runner, Step, Ticker},
    ui::screen::current_screen,
    users::{InMemoryDirectory, Viewer},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Frame, Terminal,
};
use std::{
    error::Error,
    io::{self, stdin, Write},
    path::PathBuf,
    time::Duration,
};

/// Redraw cadence while waiting for input
const FRAME_RATE_MS: u64 = 250;

/// timed quiz taker with question navigation and graded results
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Take timed multiple-choice quizzes in the terminal: navigate between questions, submit early or let the timer do it, and review your graded result."
)]
pub struct Cli {
    /// open this quiz id directly instead of the overview
    #[clap(short = 'q', long)]
    quiz: Option<String>,

    /// print the quiz overview and exit (no terminal UI)
    #[clap(long)]
    list: bool,

    /// which quizzes to show
    #[clap(short = 'f', long, value_enum)]
    filter: Option<QuizFilter>,

    /// case-insensitive search on title or course
    #[clap(short = 's', long)]
    search: Option<String>,

    /// ordering of the overview
    #[clap(short = 'o', long, value_enum)]
    sort: Option<SortBy>,

    /// JSON file with an array of quizzes, replaces the bundled catalog
    #[clap(short = 'c', long)]
    catalog: Option<PathBuf>,

    /// email of the user taking quizzes
    #[clap(short = 'u', long)]
    user: Option<String>,

    /// seconds left when the time warning appears
    #[clap(long)]
    warning_secs: Option<u32>,
}

impl Cli {
    /// Merge flags over the stored configuration
    fn apply(&self, mut config: Config) -> Config {
        if let Some(filter) = self.filter {
            config.filter = filter;
        }
        if let Some(sort) = self.sort {
            config.sort_by = sort;
        }
        if let Some(path) = &self.catalog {
            config.catalog_path = Some(path.clone());
        }
        if let Some(user) = &self.user {
            config.user_email = Some(user.clone());
        }
        if let Some(secs) = self.warning_secs {
            config.warning_secs = secs;
        }
        config
    }

    fn list_query(&self, config: &Config) -> ListQuery {
        ListQuery {
            filter: config.filter,
            search: self.search.clone().unwrap_or_default(),
            sort_by: config.sort_by,
        }
    }
}

fn load_catalog(config: &Config) -> Result<InMemoryCatalog, Box<dyn Error>> {
    let catalog = match &config.catalog_path {
        Some(path) => InMemoryCatalog::from_path(path)?,
        None => InMemoryCatalog::bundled()?,
    };
    Ok(catalog)
}

fn build_app(cli: &Cli, config: &Config) -> Result<App, Box<dyn Error>> {
    let catalog = load_catalog(config)?;
    let directory = InMemoryDirectory::default();
    let viewer = Viewer::resolve(&directory, config.user_email.as_deref());

    Ok(App::new(catalog, viewer, config.warning_secs).with_query(cli.list_query(config)))
}

fn print_list<W: Write>(app: &App, out: &mut W) -> io::Result<()> {
    writeln!(
        out,
        "{:<4} {:<32} {:<34} {:<24} {}",
        "ID", "TITLE", "COURSE", "DUE", "STATUS"
    )?;
    for quiz in app.visible_quizzes() {
        let due = quiz.due_date.map(format_due).unwrap_or_else(|| "-".into());
        let status = match quiz.score {
            Some(score) if quiz.is_completed() => format!("completed ({score}%)"),
            _ => quiz.status.to_string(),
        };
        writeln!(
            out,
            "{:<4} {:<32} {:<34} {:<24} {}",
            quiz.id, quiz.title, quiz.course, due, status
        )?;
    }

    let stats = app.stats();
    writeln!(
        out,
        "\n{} quizzes, {} completed, {} upcoming, average score {}",
        stats.total,
        stats.completed,
        stats.upcoming,
        format_average(stats.average_score)
    )
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let store = FileConfigStore::new();
    let loaded = store.try_load();
    let config = cli.apply(loaded.as_ref().cloned().unwrap_or_default());
    let _log_guard = logging::init(&AppDirs::log_dir(), &config.log_level);
    if let Err(err) = &loaded {
        tracing::warn!(path = %store.path().display(), %err, "ignoring unreadable config");
    }

    let mut app = build_app(&cli, &config)?;
    tracing::info!(user = %app.viewer.user.email, role = %app.viewer.role(), "starting");

    if cli.list {
        return Ok(print_list(&app, &mut io::stdout().lock())?);
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let events = CrosstermEventSource::new();
    app = app.with_ticks(events.sender());
    if let Some(id) = &cli.quiz {
        app.open(id);
    }

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let runner = Runner::new(events, FixedTicker::new(Duration::from_millis(FRAME_RATE_MS)));
    let outcome = start_tui(&mut terminal, &mut app, &runner);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    outcome
}

fn start_tui<B: Backend, E: QuizEventSource, T: Ticker>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runner: &Runner<E, T>,
) -> Result<(), Box<dyn Error>> {
    loop {
        terminal.draw(|f| ui(app, f))?;

        match runner.step() {
            Step::Event(QuizEvent::Tick) => app.on_tick(),
            Step::Event(QuizEvent::Key(key)) => {
                if app.on_key(key) == Control::Quit {
                    break;
                }
            }
            Step::Event(QuizEvent::Resize) | Step::Idle => {}
        }
    }

    app.discard();
    tracing::info!("exiting");
    Ok(())
}

fn ui(app: &App, f: &mut Frame) {
    current_screen(&app.state).render(app, f);
}
