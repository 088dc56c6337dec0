use std::{
    error::Error,
    fs::{self, OpenOptions},
    io::{self, stdin},
    path::PathBuf,
    process::ExitCode,
    sync::Mutex,
};

use abatrack::{
    app::{self, App},
    app_dirs::AppDirs,
    config::{Backend, ConfigStore, FileConfigStore, Overrides, Settings},
    report,
    runtime::{CrosstermEventSource, Runner, TICK_RATE},
    store::{CsvWorkbook, GoogleSheets, SheetClient},
};
use clap::{error::ErrorKind, CommandFactory, Parser, Subcommand};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Terminal data collection for ABA therapy sessions: session details, cold probes, trial-by-trial scoring, task analysis and behavior duration, saved to one spreadsheet per learner."
)]
pub struct Cli {
    /// where learner sheets live
    #[clap(short = 'b', long, value_enum, global = true)]
    backend: Option<Backend>,

    /// service-account key file for the google backend
    #[clap(short = 'c', long, global = true)]
    credentials: Option<PathBuf>,

    /// directory of <Learner>_Data.csv files for the csv backend
    #[clap(short = 'd', long, global = true)]
    data_dir: Option<PathBuf>,

    /// learner to start with (defaults to the last one used)
    #[clap(short = 'l', long, global = true)]
    learner: Option<String>,

    /// debug-level logging
    #[clap(short = 'v', long, global = true)]
    verbose: bool,

    #[clap(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
enum Command {
    /// Print the notes for the learner's latest session and exit
    Report,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            backend: self.backend,
            credentials_path: self.credentials.clone(),
            data_dir: self.data_dir.clone(),
            learner: self.learner.clone(),
        }
    }
}

fn init_logging(verbose: bool) {
    let Some(path) = AppDirs::log_path() else {
        return;
    };
    if let Some(parent) = path.parent() {
        if fs::create_dir_all(parent).is_err() {
            return;
        }
    }
    let Ok(file) = OpenOptions::new().create(true).append(true).open(&path) else {
        return;
    };

    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init();
}

fn connect(settings: &Settings) -> Box<dyn SheetClient> {
    match settings.backend {
        Backend::Google => Box::new(GoogleSheets::from_key_file(&settings.credentials_path)),
        Backend::Csv => Box::new(CsvWorkbook::new(&settings.data_dir)),
    }
}

fn print_report(client: &dyn SheetClient, learner: Option<&str>) -> ExitCode {
    let Some(learner) = learner else {
        eprintln!("error: pass --learner NAME to choose whose report to print");
        return ExitCode::FAILURE;
    };
    match report::generate(client, learner) {
        Ok(report) => {
            println!("{}", report.notes);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(%learner, error = %e, "report failed");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn main() -> Result<ExitCode, Box<dyn Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config_store = FileConfigStore::new();
    let mut config = config_store.load();
    let settings = config.resolve(cli.overrides());
    info!(backend = %settings.backend, "starting");
    let client = connect(&settings);

    if cli.command == Some(Command::Report) {
        return Ok(print_report(client.as_ref(), settings.learner.as_deref()));
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(client, settings.learner.as_deref());
    let runner = Runner::new(CrosstermEventSource::new(), TICK_RATE);
    let outcome = app::run(&mut terminal, &mut app, &runner);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    outcome?;

    let learner = app.learner();
    if !learner.is_empty() && config.last_learner.as_deref() != Some(learner) {
        config.last_learner = Some(learner.to_string());
        if let Err(e) = config_store.save(&config) {
            error!(error = %e, "could not save config");
        }
    }

    Ok(ExitCode::SUCCESS)
}
