//! SIL command-line driver

use clap::{Parser, Subcommand};
use sil::Interpreter;
use sil::error::{SilError, report_error};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "sil", version, about = "SIL - a small scripting language")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run a SIL source file
    Run {
        /// Source file to run
        file: PathBuf,
        /// Print the parse tree before running
        #[arg(long)]
        parse_tree: bool,
        /// Print the parse tree as JSON (with --parse-tree)
        #[arg(long, requires = "parse_tree")]
        json: bool,
    },
    /// Run code given on the command line
    Eval {
        /// Code to run
        code: String,
        /// Print the parse tree before running
        #[arg(long)]
        parse_tree: bool,
    },
    /// Parse a source file and print its tree (debug)
    Parse {
        /// Source file to parse
        file: PathBuf,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Start the interactive REPL
    Repl,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tree {
    None,
    Text,
    Json,
}

/// Install a log subscriber when `SIL_LOG` or `RUST_LOG` asks for one
fn init_tracing() {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = std::env::var("SIL_LOG")
        .ok()
        .map(EnvFilter::new)
        .or_else(|| std::env::var("RUST_LOG").is_ok().then(EnvFilter::from_default_env));
    if let Some(filter) = filter {
        tracing_subscriber::registry()
            .with(fmt::layer().with_target(true).with_level(true).with_writer(std::io::stderr))
            .with(filter)
            .init();
    }
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    let ok = match cli.command {
        Some(Command::Run {
            file,
            parse_tree,
            json,
        }) => {
            let tree = match (parse_tree, json) {
                (false, _) => Tree::None,
                (true, false) => Tree::Text,
                (true, true) => Tree::Json,
            };
            run_file(&file, tree, true)
        }
        Some(Command::Eval { code, parse_tree }) => {
            let tree = if parse_tree { Tree::Text } else { Tree::None };
            run_source("<eval>", &code, tree, true)
        }
        Some(Command::Parse { file, json }) => {
            let tree = if json { Tree::Json } else { Tree::Text };
            run_file(&file, tree, false)
        }
        Some(Command::Repl) | None => match sil::repl::Repl::new().and_then(|mut r| r.run()) {
            Ok(()) => true,
            Err(e) => {
                eprintln!("REPL error: {e}");
                false
            }
        },
    };

    if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE }
}

fn run_file(path: &Path, tree: Tree, execute: bool) -> bool {
    let filename = path.display().to_string();
    match std::fs::read_to_string(path) {
        Ok(source) => run_source(&filename, &source, tree, execute),
        Err(e) => {
            eprintln!("Error: cannot read {filename}: {e}");
            false
        }
    }
}

fn run_source(filename: &str, source: &str, tree: Tree, execute: bool) -> bool {
    let mut interp = Interpreter::new();
    match drive(&mut interp, source, tree, execute) {
        Ok(()) => true,
        Err(err) => {
            report_error(filename, source, &err);
            false
        }
    }
}

fn drive(interp: &mut Interpreter, source: &str, tree: Tree, execute: bool) -> Result<(), SilError> {
    let root = interp.parse(source)?;
    match tree {
        Tree::None => {}
        Tree::Text => print!("{}", interp.statement_tree(&root)?),
        Tree::Json => {
            let tree = interp.parse_tree(&root)?;
            let text = serde_json::to_string_pretty(&tree)
                .map_err(|e| SilError::io_error(e.to_string()))?;
            println!("{text}");
        }
    }
    if execute {
        interp.run(&root)?;
    }
    Ok(())
}
