//! scriptsheet CLI - interactive spreadsheet prompt

use anyhow::{bail, Context, Result};
use clap::Parser;
use scriptsheet::prelude::*;
use scriptsheet::{render_table, HELP};
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

const PROMPT: &str = "scriptsheet > ";

#[derive(Parser)]
#[command(name = "scriptsheet")]
#[command(author, version, about = "A small reactive spreadsheet in your terminal")]
struct Cli {
    /// Number of rows
    #[arg(long, default_value_t = GridOptions::default().rows)]
    rows: u32,

    /// Number of columns
    #[arg(long, default_value_t = GridOptions::default().cols)]
    cols: u16,

    /// Run commands from a file instead of the prompt
    #[arg(short, long, conflicts_with = "command")]
    script: Option<PathBuf>,

    /// Run a single command line (repeatable), then print the grid
    #[arg(short, long)]
    command: Vec<String>,

    /// Raise log verbosity (-v warnings, -vv edits, -vvv every recomputation)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let options = GridOptions {
        rows: cli.rows,
        cols: cli.cols,
    };
    let mut session = Session::new(options)
        .with_context(|| format!("Cannot create a {}x{} grid", cli.rows, cli.cols))?;
    info!(rows = cli.rows, cols = cli.cols, "session started");

    if let Some(path) = &cli.script {
        run_script(&mut session, path)
    } else if !cli.command.is_empty() {
        run_commands(&mut session, &cli.command)
    } else {
        repl(&mut session)
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "error",
        1 => "warn",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn repl(session: &mut Session) -> Result<()> {
    println!("> Welcome to scriptsheet !");
    println!("> Here are some helpful commands to get you started :");
    print!("{}", HELP);
    println!();
    print!("{}", render_table(&session.grid().snapshot()));

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut line = String::new();

    loop {
        print!("{}", PROMPT);
        stdout.flush().context("Failed to write prompt")?;

        line.clear();
        let read = stdin
            .lock()
            .read_line(&mut line)
            .context("Failed to read from stdin")?;
        if read == 0 {
            println!();
            return Ok(());
        }

        match session.execute(&line) {
            Ok(Outcome::Quit) => return Ok(()),
            Ok(outcome) => show(&outcome),
            Err(e) => eprintln!("error: {}", e),
        }
    }
}

fn run_script(session: &mut Session, path: &Path) -> Result<()> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read script '{}'", path.display()))?;

    let mut failed = 0;
    for (number, line) in text.lines().enumerate() {
        match session.execute(line) {
            Ok(Outcome::Quit) => break,
            // Scripts only print what they ask for
            Ok(Outcome::Assigned { .. }) => {}
            Ok(outcome) => show(&outcome),
            Err(e) => {
                failed += 1;
                eprintln!("{}:{}: {}", path.display(), number + 1, e);
            }
        }
    }

    print!("{}", render_table(&session.grid().snapshot()));
    if failed > 0 {
        bail!("{} line(s) in '{}' failed", failed, path.display());
    }
    Ok(())
}

fn run_commands(session: &mut Session, commands: &[String]) -> Result<()> {
    for command in commands {
        match session
            .execute(command)
            .with_context(|| format!("Command failed: {}", command))?
        {
            Outcome::Quit => break,
            Outcome::Assigned { .. } => {}
            outcome => show(&outcome),
        }
    }

    print!("{}", render_table(&session.grid().snapshot()));
    Ok(())
}

fn show(outcome: &Outcome) {
    match outcome {
        // ANSI: clear screen, cursor home
        Outcome::Clear => print!("\x1B[2J\x1B[1;1H"),
        other => {
            if let Some(text) = other.text() {
                print!("{}", text);
            }
        }
    }
}
