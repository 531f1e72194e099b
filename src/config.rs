// ABOUTME: Constants shared by the CLI/REPL driver

pub const VERSION: &str = "1.0.0";
pub const USAGE: &str = "Usage: lox [script]";
pub const PROMPT: &str = "> ";
pub const HISTORY_FILE: &str = ".lox_history";
