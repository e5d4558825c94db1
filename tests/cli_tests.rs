mod common;

use std::fs;

use clap::Parser;
use clvm_puzzle::cli::{execute, Cli};
use clvm_puzzle::{load_hex_file, read_program_arg, CliError, Program};
use common::{init_test_logging, parse, temp_path, FACTORIAL};

fn write_temp(name: &str, contents: &str) -> std::path::PathBuf {
    let path = temp_path(name);
    fs::write(&path, contents).unwrap();
    path
}

fn cli(args: &[&str]) -> Result<String, CliError> {
    let argv = std::iter::once("clvm-puzzle").chain(args.iter().copied());
    execute(Cli::try_parse_from(argv).unwrap())
}

#[test]
fn test_load_hex_file() {
    init_test_logging();
    let path = write_temp("single.hex", "\n  ff01ff0280\n\n");
    assert_eq!(load_hex_file(&path).unwrap(), parse("(1 2)"));
    fs::remove_file(path).unwrap();
}

#[test]
fn test_load_hex_file_rejects_line_counts() {
    for (name, contents) in [("empty.hex", "\n \n"), ("two.hex", "80\n80\n")] {
        let path = write_temp(name, contents);
        assert!(
            matches!(load_hex_file(&path), Err(CliError::Input(_))),
            "{contents:?}"
        );
        fs::remove_file(path).unwrap();
    }
}

#[test]
fn test_load_hex_file_errors() {
    assert!(matches!(
        load_hex_file(temp_path("missing.hex")),
        Err(CliError::Io(_))
    ));

    let path = write_temp("bad.hex", "ff01\n");
    assert!(matches!(load_hex_file(&path), Err(CliError::Clvm(_))));
    fs::remove_file(path).unwrap();
}

#[test]
fn test_program_arguments() {
    assert_eq!(read_program_arg("(q . 1)", false).unwrap(), parse("(q . 1)"));
    assert_eq!(read_program_arg("ff0101", true).unwrap(), parse("(q . 1)"));
    assert!(read_program_arg("(q . 1", false).is_err());
}

#[test]
fn test_brun_from_file() {
    let path = write_temp("factorial.hex", &FACTORIAL.serialize_hex().unwrap());
    let arg = format!("@{}", path.display());
    assert_eq!(cli(&["brun", &arg, "(5)"]).unwrap(), "120");
    assert_eq!(
        cli(&["treehash", &arg]).unwrap(),
        FACTORIAL.tree_hash_hex()
    );
    fs::remove_file(path).unwrap();
}

#[test]
fn test_brun_hex_input() {
    let program = parse("(+ 2 5)").serialize_hex().unwrap();
    let env = Program::list([Program::from_int(3), Program::from_int(4)])
        .serialize_hex()
        .unwrap();
    assert_eq!(cli(&["brun", "--hex", &program, &env]).unwrap(), "7");
}

#[test]
fn test_errors_surface_through_cli() {
    let err = cli(&["brun", "(f 1)", "5"]).unwrap_err();
    assert!(err.to_string().starts_with("CLVM error: "), "{err}");

    let err = cli(&["opd", "ff01"]).unwrap_err();
    assert!(matches!(err, CliError::Clvm(_)));
}
