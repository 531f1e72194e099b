// ABOUTME: End-to-end tests driving the compiled binary against real Lox source files

use std::io::Write;
use std::process::{Command, Output};

fn lox_binary() -> Command {
    Command::new(env!("CARGO_BIN_EXE_lox"))
}

fn run_source(source: &str) -> Output {
    let file = tempfile();
    file.as_file().write_all(source.as_bytes()).unwrap();
    lox_binary().arg(file.path()).output().expect("failed to run lox binary")
}

/// A minimal drop-cleaned temp file, avoiding a dependency on the `tempfile` crate.
struct TempFile {
    path: std::path::PathBuf,
    file: std::fs::File,
}

impl TempFile {
    fn as_file(&self) -> &std::fs::File {
        &self.file
    }

    fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl Drop for TempFile {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

fn tempfile() -> TempFile {
    use std::sync::atomic::{AtomicU32, Ordering};
    static COUNTER: AtomicU32 = AtomicU32::new(0);

    let mut path = std::env::temp_dir();
    let unique = COUNTER.fetch_add(1, Ordering::Relaxed);
    path.push(format!("lox-test-{}-{unique}.lox", std::process::id()));
    let file = std::fs::File::create(&path).expect("failed to create temp script file");
    TempFile { path, file }
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

#[test]
fn test_print_arithmetic() {
    let output = run_source("print 1 + 2;");
    assert_eq!(stdout(&output).trim(), "3");
    assert_eq!(output.status.code(), Some(0));
}

#[test]
fn test_string_plus_number_stringifies() {
    let output = run_source(r#"var a = "hi"; print a + 1;"#);
    assert_eq!(stdout(&output).trim(), "hi1");
}

#[test]
fn test_block_scoping_shadows_then_restores() {
    let output = run_source(r#"var a = 0; { var a = 1; print a; } print a;"#);
    let out = stdout(&output);
    let lines: Vec<_> = out.lines().collect();
    assert_eq!(lines, vec!["1", "0"]);
}

#[test]
fn test_closure_counter_keeps_state_across_calls() {
    let source = r#"
        fun make() {
            var i = 0;
            fun inc() {
                i = i + 1;
                return i;
            }
            return inc;
        }
        var c = make();
        print c();
        print c();
    "#;
    let output = run_source(source);
    let out = stdout(&output);
    let lines: Vec<_> = out.lines().collect();
    assert_eq!(lines, vec!["1", "2"]);
}

#[test]
fn test_break_stops_for_loop_early() {
    let source = r#"
        for (var i = 0; i < 3; i = i + 1) {
            if (i == 2) break;
            print i;
        }
    "#;
    let output = run_source(source);
    let out = stdout(&output);
    let lines: Vec<_> = out.lines().collect();
    assert_eq!(lines, vec!["0", "1"]);
}

#[test]
fn test_division_by_zero_exits_70() {
    let output = run_source("print 1 / 0;");
    assert_eq!(output.status.code(), Some(70));
}

#[test]
fn test_uninitialized_variable_is_nil() {
    let output = run_source("var a; print a;");
    assert_eq!(stdout(&output).trim(), "nil");
}

#[test]
fn test_equality_across_variants_is_false() {
    let output = run_source(r#"print "a" == 1;"#);
    assert_eq!(stdout(&output).trim(), "false");
}

#[test]
fn test_syntax_error_exits_65() {
    let output = run_source("1 +;");
    assert_eq!(output.status.code(), Some(65));
}

#[test]
fn test_missing_script_file_does_not_panic() {
    let output = lox_binary().arg("/nonexistent/path/does-not-exist.lox").output().unwrap();
    assert!(!output.status.success());
    assert_eq!(output.status.code(), Some(64));
    assert!(!stdout(&output).is_empty() || !String::from_utf8_lossy(&output.stderr).is_empty());
}

#[test]
fn test_too_many_arguments_prints_usage_and_exits_64() {
    let output = lox_binary().arg("one.lox").arg("two.lox").output().unwrap();
    assert_eq!(output.status.code(), Some(64));
    assert_eq!(stdout(&output).trim(), "Usage: lox [script]");
}

#[test]
fn test_clock_arity_mismatch_is_runtime_error() {
    let output = run_source("print clock(1);");
    assert_eq!(output.status.code(), Some(70));
}

#[test]
fn test_bare_return_yields_nil() {
    let source = r#"
        fun f() { return; }
        print f();
    "#;
    let output = run_source(source);
    assert_eq!(stdout(&output).trim(), "nil");
}
