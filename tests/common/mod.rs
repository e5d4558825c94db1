#![allow(dead_code)]
use clvm_puzzle::Program;
use once_cell::sync::Lazy;
use std::env;
use std::path::PathBuf;
use std::sync::Once;

static LOGGER_INIT: Once = Once::new();

/// route `log` output through the test harness, once per binary
pub fn init_test_logging() {
    LOGGER_INIT.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

pub fn parse(source: &str) -> Program {
    Program::parse(source).unwrap_or_else(|e| panic!("{source}: {e}"))
}

/// recursive factorial, called with its own code as the first argument
const FACTORIAL_BODY: &str = "(a (i (= 5 (q . 1)) (q . (q . 1)) (q . (* 5 (a 2 (c 2 (c (- 5 (q . 1)) ())))))) 1)";

/// `(n)` -> n!
pub static FACTORIAL: Lazy<Program> =
    Lazy::new(|| parse("(a 2 (c 2 (c 5 ())))").curry(&[parse(FACTORIAL_BODY)]));

/// a spread of shapes: atoms of every printing style, dotted and proper lists
pub static SAMPLE_TREES: Lazy<Vec<Program>> = Lazy::new(|| {
    vec![
        Program::nil(),
        Program::from_int(0x7f),
        Program::from_int(0x80),
        Program::from_int(-1),
        Program::atom(vec![0x00]),
        Program::atom(vec![0xff; 3]),
        Program::from_text("hello world"),
        Program::from_text("it's"),
        Program::atom(vec![0x42; 0x40]),
        parse("(1 2 3)"),
        parse("(1 . 2)"),
        parse("((1 . 2) (3 4 . 5) ())"),
        parse("(a (q . \"curried\") (c (q . 0xdeadbeef) 1))"),
        FACTORIAL.clone(),
    ]
});

/// a path in the temp dir, unique to this test process
pub fn temp_path(name: &str) -> PathBuf {
    env::temp_dir().join(format!("clvm-puzzle-{}-{name}", std::process::id()))
}
