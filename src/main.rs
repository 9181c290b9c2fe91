//! Mica command line: run a script file, or start a REPL when no file is
//! given. A script's top-level `return` value, if any, prints to stdout.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::Editor;

use mica::lexer::{Lexer, TokenKind};
use mica::{builtins, Interpreter};

#[derive(Parser)]
#[command(name = "mica", version, about = "Interpreter for the Mica scripting language")]
struct Args {
    /// Script file to run; omit for an interactive session.
    path: Option<PathBuf>,
}

fn main() -> ExitCode {
    let args = Args::parse();
    let mut interp = Interpreter::new();
    builtins::install(&mut interp);

    match args.path {
        Some(path) => run_file(&mut interp, &path),
        None => repl(&mut interp),
    }
}

fn run_file(interp: &mut Interpreter, path: &Path) -> ExitCode {
    let src = match fs::read_to_string(path) {
        Ok(src) => src,
        Err(e) => {
            eprintln!("unable to read {}: {}", path.display(), e);
            return ExitCode::FAILURE;
        }
    };
    match interp.eval(&src) {
        Ok(Some(value)) => {
            println!("{value}");
            ExitCode::SUCCESS
        }
        Ok(None) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn repl(interp: &mut Interpreter) -> ExitCode {
    println!("[ repl mode on ]\nfor quitting repl mode use \";q\" command");
    let mut rl = match Editor::<(), DefaultHistory>::new() {
        Ok(rl) => rl,
        Err(e) => {
            eprintln!("repl error: {e}");
            return ExitCode::FAILURE;
        }
    };
    let history_path = repl_history_path();
    if let Some(ref path) = history_path {
        let _ = rl.load_history(path);
    }

    let mut buffer = String::new();
    loop {
        let prompt = if buffer.is_empty() { "> " } else { "... " };
        let line = match rl.readline(prompt) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => {
                if buffer.is_empty() {
                    break;
                }
                buffer.clear();
                continue;
            }
            Err(ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("repl error: {e}");
                break;
            }
        };
        let line = line.trim_end();

        if buffer.is_empty() && line.is_empty() {
            continue;
        }
        if buffer.is_empty() && line.starts_with(";q") {
            println!("Quitting repl mode");
            break;
        }
        let _ = rl.add_history_entry(line);
        if !buffer.is_empty() {
            buffer.push('\n');
        }
        buffer.push_str(line);
        if needs_more_input(&buffer) {
            continue;
        }

        match interp.eval(&buffer) {
            Ok(Some(value)) => println!("{value}"),
            Ok(None) => {}
            Err(e) => eprintln!("{e}"),
        }
        buffer.clear();
    }

    if let Some(ref path) = history_path {
        let _ = rl.save_history(path);
    }
    ExitCode::SUCCESS
}

fn repl_history_path() -> Option<String> {
    let home = std::env::var("HOME").ok()?;
    Some(format!("{home}/.mica_history"))
}

/// A buffer needs more lines while any `fun`/`if`/`while` block or bracket
/// pair is still open. Counting tokens rather than characters keeps
/// keywords and brackets inside string literals from miscounting.
fn needs_more_input(src: &str) -> bool {
    let mut lexer = Lexer::new(src);
    let mut blocks = 0i32;
    let mut brackets = 0i32;
    loop {
        let token = match lexer.next() {
            Ok(token) => token,
            // Usually an unterminated string literal; submit the buffer
            // and let evaluation report it.
            Err(_) => return false,
        };
        match token.kind {
            TokenKind::Eof => break,
            TokenKind::Fun | TokenKind::If | TokenKind::While => blocks += 1,
            TokenKind::End => blocks -= 1,
            TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace => brackets += 1,
            TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace => brackets -= 1,
            _ => {}
        }
    }
    blocks > 0 || brackets > 0
}
