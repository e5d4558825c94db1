mod common;

use clvm_puzzle::{ClvmError, Program, RunConfig};
use clvm_puzzle_core::{run_program, ListOptions, OperatorTable};
use common::{init_test_logging, parse, FACTORIAL};

fn run(program: &Program, args: &str, config: &RunConfig) -> Result<(u64, Program), ClvmError> {
    let output = program.run(&parse(args), config)?;
    Ok((output.cost, output.program))
}

#[test]
fn test_factorial() {
    init_test_logging();
    let (cost, value) = run(&FACTORIAL, "(5)", &RunConfig::default()).unwrap();
    assert_eq!(value, Program::from_int(120));
    assert!(cost > 0);

    let (_, value) = run(&FACTORIAL, "(20)", &RunConfig::default()).unwrap();
    assert_eq!(value.to_int().unwrap(), 2_432_902_008_176_640_000);
}

#[test]
fn test_budget_is_exact() {
    init_test_logging();
    let (cost, value) = run(&FACTORIAL, "(6)", &RunConfig::default()).unwrap();
    assert_eq!(value, Program::from_int(720));

    let (at_limit, _) = run(&FACTORIAL, "(6)", &RunConfig::with_max_cost(cost)).unwrap();
    assert_eq!(at_limit, cost);

    match run(&FACTORIAL, "(6)", &RunConfig::with_max_cost(cost - 1)) {
        Err(ClvmError::CostExceeded { cost: spent, max_cost, .. }) => {
            assert_eq!(max_cost, cost - 1);
            assert!(spent > max_cost);
        }
        other => panic!("expected budget failure, got {other:?}"),
    }
}

#[test]
fn test_budget_error_reports_position() {
    let program = parse("(c (q . 1)\n   (f (q . (2 3))))");
    let err = program
        .run(&Program::nil(), &RunConfig::with_max_cost(30))
        .unwrap_err();
    assert!(matches!(err, ClvmError::CostExceeded { .. }));
    assert!(err.position().is_some());
    assert!(err.to_string().contains(" at "), "{err}");
}

#[test]
fn test_curry_is_partial_application() {
    let code = parse("(c 2 (c 5 (c 11 ())))");
    let curried = code.curry(&[Program::from_int(1), Program::from_int(2)]);

    let (_, via_curry) = run(&curried, "(3)", &RunConfig::default()).unwrap();
    let (_, direct) = run(&code, "(1 2 3)", &RunConfig::default()).unwrap();
    assert_eq!(via_curry, direct);
    assert_eq!(via_curry, parse("(1 2 3)"));

    // no extra arguments at all
    let single = parse("(+ 2 (q . 1))").curry(&[Program::from_int(41)]);
    let (_, value) = run(&single, "()", &RunConfig::default()).unwrap();
    assert_eq!(value, Program::from_int(42));
}

#[test]
fn test_result_decodes_as_list() {
    let program = parse("(c (q . 1) (c (q . 2) (c (q . 3) ())))");
    let (_, value) = run(&program, "()", &RunConfig::default()).unwrap();
    let items = value.to_int_list(&ListOptions::new().size(3)).unwrap();
    assert_eq!(items, vec![1, 2, 3]);
    assert!(matches!(
        value.to_int_list(&ListOptions::new().min_size(4).suffix(" in output")),
        Err(ClvmError::Argument { .. })
    ));
}

#[test]
fn test_errors_name_offending_value() {
    let err = run(&parse("(f (q . 7))"), "()", &RunConfig::default()).unwrap_err();
    assert!(matches!(err, ClvmError::Eval { .. }));
    assert!(err.to_string().contains('7'), "{err}");

    let err = run(&parse("(99 (q . 1))"), "()", &RunConfig::default()).unwrap_err();
    assert!(matches!(err, ClvmError::UnknownOperator { .. }));
    assert!(err.to_string().contains("99"), "{err}");
}

#[test]
fn test_extended_table() {
    let mut table = OperatorTable::core();
    table.insert(99, |args: &Program, _: &RunConfig| -> clvm_puzzle_core::Result<(u64, Program)> {
        let doubled = args.first()?.to_int()? * 2;
        Ok((5, Program::from_int(doubled)))
    });
    let program = parse("(99 (+ (q . 20) (q . 1)))");
    let output = run_program(&program, &Program::nil(), &table, &RunConfig::default()).unwrap();
    assert_eq!(output.program, Program::from_int(42));
}

#[test]
fn test_independent_runs_in_parallel() {
    let handles: Vec<_> = (1..=4)
        .map(|n| {
            std::thread::spawn(move || {
                let args = Program::list([Program::from_int(n)]);
                FACTORIAL.run(&args, &RunConfig::default()).unwrap().program
            })
        })
        .collect();
    let results: Vec<i64> = handles
        .into_iter()
        .map(|handle| handle.join().unwrap().to_int().unwrap())
        .collect();
    assert_eq!(results, vec![1, 2, 6, 24]);
}
