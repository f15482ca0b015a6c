//! REPL (Read-Eval-Print Loop) for SIL

use crate::error::report_error;
use crate::interp::Interpreter;
use rustyline::error::ReadlineError;
use rustyline::{DefaultEditor, Result as RlResult};
use std::path::PathBuf;

const PROMPT: &str = "> ";
const HISTORY_FILE: &str = ".sil_history";
const SOURCE_NAME: &str = "<repl>";

/// What a line of input asks for
#[derive(Debug, PartialEq, Eq)]
enum Input<'a> {
    Quit,
    Help,
    Clear,
    Tree(&'a str),
    Unknown(&'a str),
    Code(&'a str),
}

fn classify(line: &str) -> Input<'_> {
    match line {
        "quit" | ":quit" | ":q" | ":exit" => Input::Quit,
        ":help" | ":h" | ":?" => Input::Help,
        ":clear" => Input::Clear,
        _ => match line.strip_prefix(":tree") {
            Some(code) => Input::Tree(code.trim_start()),
            None if line.starts_with(':') => Input::Unknown(line),
            None => Input::Code(line),
        },
    }
}

/// REPL state
pub struct Repl {
    editor: DefaultEditor,
    interpreter: Interpreter,
    history_path: Option<PathBuf>,
}

impl Repl {
    /// Create a new REPL
    pub fn new() -> RlResult<Self> {
        let editor = DefaultEditor::new()?;
        let history_path = dirs_home().map(|h| h.join(HISTORY_FILE));

        let mut repl = Repl {
            editor,
            interpreter: Interpreter::new(),
            history_path,
        };

        if let Some(ref path) = repl.history_path {
            let _ = repl.editor.load_history(path);
        }

        Ok(repl)
    }

    /// Run the REPL
    pub fn run(&mut self) -> RlResult<()> {
        println!("SIL REPL v{}", env!("CARGO_PKG_VERSION"));
        println!("Type :help for help, :quit to exit.\n");

        loop {
            match self.editor.readline(PROMPT) {
                Ok(line) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    let _ = self.editor.add_history_entry(line);

                    match classify(line) {
                        Input::Quit => {
                            println!("Goodbye!");
                            break;
                        }
                        Input::Help => print_help(),
                        Input::Clear => print!("\x1B[2J\x1B[1;1H"),
                        Input::Tree(code) => self.print_tree(code),
                        Input::Unknown(cmd) => {
                            println!("Unknown command: {cmd}");
                            println!("Type :help for help.");
                        }
                        Input::Code(code) => self.eval_input(code),
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!("Goodbye!");
                    break;
                }
                Err(err) => {
                    eprintln!("Error: {err}");
                    break;
                }
            }
        }

        if let Some(ref path) = self.history_path {
            let _ = self.editor.save_history(path);
        }

        Ok(())
    }

    /// Lines run in the global scope so declarations persist between them
    fn eval_input(&mut self, input: &str) {
        if let Err(err) = self.interpreter.run_str_toplevel(input) {
            report_error(SOURCE_NAME, input, &err);
        }
    }

    fn print_tree(&mut self, input: &str) {
        let tree = self
            .interpreter
            .parse(input)
            .and_then(|root| Ok(self.interpreter.statement_tree(&root)?));
        match tree {
            Ok(tree) => print!("{tree}"),
            Err(err) => report_error(SOURCE_NAME, input, &err),
        }
    }
}

fn print_help() {
    println!("SIL REPL Commands:");
    println!("  :help, :h, :?   Show this help");
    println!("  :quit, :q       Exit the REPL (also: quit, :exit)");
    println!("  :clear          Clear the screen");
    println!("  :tree <code>    Print the parse tree of <code>");
    println!();
    println!("Examples:");
    println!("  decas x :: int");
    println!("  x = 1 + 2 * 3");
    println!("  println \"x is \" x");
}

fn dirs_home() -> Option<PathBuf> {
    #[cfg(windows)]
    {
        std::env::var("USERPROFILE").ok().map(PathBuf::from)
    }
    #[cfg(not(windows))]
    {
        std::env::var("HOME").ok().map(PathBuf::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quit_commands() {
        for cmd in ["quit", ":quit", ":q", ":exit"] {
            assert_eq!(classify(cmd), Input::Quit);
        }
    }

    #[test]
    fn test_tree_command() {
        assert_eq!(classify(":tree x = 1"), Input::Tree("x = 1"));
    }

    #[test]
    fn test_code_and_unknown() {
        assert_eq!(classify("println 1"), Input::Code("println 1"));
        assert_eq!(classify(":bogus"), Input::Unknown(":bogus"));
    }
}
