use clap::{Parser as ClapParser, Subcommand};
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use tick_lang::cli::{self, CheckOptions, CliError};
use tracing_subscriber::EnvFilter;

#[derive(ClapParser)]
#[command(name = "tick")]
#[command(about = "TICKscript front end - parse, classify, format and load tasks")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a TICKscript and print its DBRPs and task type
    Check {
        /// Script file (reads from stdin if not provided)
        file: Option<PathBuf>,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print a TICKscript in canonical layout
    Fmt {
        /// Script file (reads from stdin if not provided)
        file: Option<PathBuf>,
    },

    /// Dry-run the task loader over a load directory
    Load {
        /// Directory containing tasks/ and handlers/ (templates/ is optional)
        #[arg(short, long)]
        dir: PathBuf,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Check { file, json } => read_source(file).and_then(|source| {
            let output = cli::execute_check(&CheckOptions { source, json })?;
            println!("{}", output);
            Ok(())
        }),
        Commands::Fmt { file } => read_source(file).and_then(|source| {
            print!("{}", cli::execute_format(&source)?);
            Ok(())
        }),
        Commands::Load { dir } => run_load(dir),
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn read_source(file: Option<PathBuf>) -> Result<String, CliError> {
    match file {
        Some(path) => Ok(fs::read_to_string(path)?),
        None if !atty::is(atty::Stream::Stdin) => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Ok(buffer)
        }
        None => Err(CliError::NoInput),
    }
}

fn run_load(dir: PathBuf) -> Result<(), CliError> {
    let outcome = cli::execute_load(&dir)?;

    for call in &outcome.calls {
        println!("{}", call);
    }
    for (path, err) in &outcome.report.failed {
        eprintln!("{}: {}", path.display(), err);
    }

    if !outcome.report.is_success() {
        std::process::exit(1);
    }
    Ok(())
}
