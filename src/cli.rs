use clap::{Parser, Subcommand};
use clvm_puzzle_core::{PrintOptions, Program, RunConfig};
use log::debug;

use crate::{read_program_arg, CliError};

#[derive(Parser, Debug)]
#[command(name = "clvm-puzzle")]
#[command(about = "Run, assemble, disassemble, hash and curry puzzle programs")]
#[command(version = "0.1.0")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Evaluate a program against an environment
    Brun {
        /// Program text, hex with --hex, or @file holding hex
        program: String,
        /// Environment, same forms as the program (defaults to nil)
        env: Option<String>,
        /// Abort once the cost passes this budget
        #[arg(long, env = "CLVM_MAX_COST")]
        max_cost: Option<u64>,
        /// Reject operator atoms that are not minimally encoded
        #[arg(long)]
        strict: bool,
        /// Print the cost of the run before the result
        #[arg(short, long)]
        cost: bool,
        /// Read program and environment as serialized hex
        #[arg(long)]
        hex: bool,
        /// Print operators as numbers instead of mnemonics
        #[arg(long)]
        no_keywords: bool,
    },
    /// Serialize program text to hex
    Opc {
        text: String,
        /// Print the tree hash instead of the serialization
        #[arg(long)]
        tree_hash: bool,
    },
    /// Print serialized hex as program text
    Opd {
        hex: String,
        #[arg(long)]
        no_keywords: bool,
    },
    /// Print the tree hash of a program
    Treehash {
        program: String,
        #[arg(long)]
        hex: bool,
    },
    /// Bind leading arguments into a program
    Curry {
        program: String,
        /// Argument to bind, repeat for more
        #[arg(short = 'a', long = "arg")]
        args: Vec<String>,
        #[arg(long)]
        hex: bool,
    },
    /// Split a curried program into its code and arguments
    Uncurry {
        program: String,
        #[arg(long)]
        hex: bool,
    },
}

fn print_options(no_keywords: bool) -> PrintOptions {
    PrintOptions {
        show_keywords: !no_keywords,
    }
}

pub fn run_cli() -> Result<(), CliError> {
    let output = execute(Cli::parse())?;
    println!("{output}");
    Ok(())
}

/// run one command and return what it prints
pub fn execute(cli: Cli) -> Result<String, CliError> {
    debug!("executing {:?}", cli.command);
    match cli.command {
        Commands::Brun {
            program,
            env,
            max_cost,
            strict,
            cost,
            hex,
            no_keywords,
        } => {
            let config = RunConfig { max_cost, strict };
            run_brun(&program, env.as_deref(), &config, cost, hex, no_keywords)
        }
        Commands::Opc { text, tree_hash } => {
            let program = Program::parse(&text)?;
            if tree_hash {
                Ok(program.tree_hash_hex())
            } else {
                Ok(program.serialize_hex()?)
            }
        }
        Commands::Opd { hex, no_keywords } => {
            let program = Program::deserialize_hex(&hex)?;
            Ok(program.to_text_with(&print_options(no_keywords)))
        }
        Commands::Treehash { program, hex } => {
            Ok(read_program_arg(&program, hex)?.tree_hash_hex())
        }
        Commands::Curry { program, args, hex } => run_curry(&program, &args, hex),
        Commands::Uncurry { program, hex } => run_uncurry(&program, hex),
    }
}

fn run_brun(
    program: &str,
    env: Option<&str>,
    config: &RunConfig,
    show_cost: bool,
    hex: bool,
    no_keywords: bool,
) -> Result<String, CliError> {
    let program = read_program_arg(program, hex)?;
    let env = match env {
        Some(env) => read_program_arg(env, hex)?,
        None => Program::nil(),
    };

    let output = program.run(&env, config)?;
    let result = output.program.to_text_with(&print_options(no_keywords));
    if show_cost {
        Ok(format!("cost = {}\n{result}", output.cost))
    } else {
        Ok(result)
    }
}

fn run_curry(program: &str, args: &[String], hex: bool) -> Result<String, CliError> {
    let code = read_program_arg(program, hex)?;
    let args = args
        .iter()
        .map(|arg| read_program_arg(arg, hex))
        .collect::<Result<Vec<_>, _>>()?;

    let curried = code.curry(&args);
    Ok(format!("{curried}\n{}", curried.tree_hash_hex()))
}

fn run_uncurry(program: &str, hex: bool) -> Result<String, CliError> {
    let program = read_program_arg(program, hex)?;
    let (code, args) = program
        .uncurry()
        .ok_or_else(|| CliError::Input(format!("not a curried program: {program}")))?;
    Ok(format!("{code}\n{}", Program::list(args)))
}
