mod ast;
mod config;
mod env;
mod error;
mod interpreter;
mod parser;
mod scanner;
mod token;
mod value;

use clap::Parser as ClapParser;
use error::ErrorReporter;
use interpreter::Interpreter;
use parser::Parser as LoxParser;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use scanner::Scanner;
use std::path::PathBuf;
use std::process::ExitCode;

/// A tree-walking interpreter for the Lox scripting language.
#[derive(ClapParser, Debug)]
#[command(name = "lox")]
#[command(version = config::VERSION)]
#[command(about = "A tree-walking interpreter for the Lox scripting language")]
struct CliArgs {
    /// Script file to execute. Starts a REPL when omitted.
    #[arg(value_name = "FILE")]
    script: Option<PathBuf>,

    /// Anything past the script path is a usage error, not more scripts.
    #[arg(trailing_var_arg = true, hide = true)]
    extra: Vec<String>,
}

fn main() -> ExitCode {
    let args = CliArgs::parse();

    if !args.extra.is_empty() {
        println!("{}", config::USAGE);
        return ExitCode::from(64);
    }

    match args.script {
        Some(path) => run_file(&path),
        None => run_prompt(),
    }
}

fn run_file(path: &PathBuf) -> ExitCode {
    let source = match std::fs::read_to_string(path) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Cannot read script file {}: {e}", path.display());
            return ExitCode::from(64);
        }
    };

    let reporter = ErrorReporter::new();
    let statements = parse(&source, &reporter);

    if reporter.had_error() {
        return ExitCode::from(65);
    }

    let mut interpreter = Interpreter::new();
    interpreter.interpret(&statements, &reporter);

    if reporter.had_runtime_error() {
        return ExitCode::from(70);
    }

    ExitCode::SUCCESS
}

fn run_prompt() -> ExitCode {
    let mut editor = match DefaultEditor::new() {
        Ok(editor) => editor,
        Err(e) => {
            eprintln!("Failed to initialize REPL: {e}");
            return ExitCode::FAILURE;
        }
    };
    let _ = editor.load_history(config::HISTORY_FILE);

    let reporter = ErrorReporter::new();
    let mut interpreter = Interpreter::new();

    loop {
        match editor.readline(config::PROMPT) {
            Ok(line) => {
                let _ = editor.add_history_entry(line.as_str());
                reporter.reset_error();
                let statements = parse(&line, &reporter);
                if !reporter.had_error() {
                    interpreter.interpret(&statements, &reporter);
                }
            }
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("Error: {e}");
                break;
            }
        }
    }

    let _ = editor.save_history(config::HISTORY_FILE);
    ExitCode::SUCCESS
}

fn parse(source: &str, reporter: &ErrorReporter) -> Vec<ast::Stmt> {
    let tokens = Scanner::new(source, reporter).scan_tokens();
    LoxParser::new(tokens, reporter).parse()
}
