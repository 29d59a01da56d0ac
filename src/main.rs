use clap::{Parser, Subcommand};
use eyre::Result;
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use taskboard::{Config, NotesSink, Session};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "taskboard")]
#[command(about = "TaskBoard - Track per-framework AI/ML tasks, notes and CSV exports")]
#[command(version = env!("GIT_DESCRIBE"))]
struct Cli {
    /// Path to a YAML config file (default: <config dir>/taskboard/taskboard.yml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// File that project notes are appended to
    #[arg(long)]
    notes_path: Option<PathBuf>,

    /// Directory CSV exports are written into
    #[arg(long)]
    export_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive session reading commands from stdin (default)
    Session,

    /// Append a note to the project notes file and exit
    Note {
        /// Note text (words are joined with spaces)
        text: Vec<String>,
    },

    /// Print the default framework catalog
    Frameworks,
}

fn main() -> Result<()> {
    // Setup tracing on stderr so session output stays on stdout
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(path) = cli.notes_path {
        config.notes_path = path;
    }
    if let Some(dir) = cli.export_dir {
        config.export_dir = dir;
    }

    match cli.command.unwrap_or(Commands::Session) {
        Commands::Session => {
            let stdin = io::stdin();
            let interactive = stdin.is_terminal();
            if !io::stdout().is_terminal() {
                colored::control::set_override(false);
            }
            let mut session = Session::new(config);
            session.run(stdin.lock(), &mut io::stdout(), interactive)?;
        }
        Commands::Note { text } => {
            let sink = NotesSink::new(&config.notes_path);
            sink.append(&text.join(" "))?;
            println!("Notes saved to {}", sink.path().display());
        }
        Commands::Frameworks => {
            for framework in config.catalog() {
                println!("{}", framework);
            }
        }
    }

    Ok(())
}
