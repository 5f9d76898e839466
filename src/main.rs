use clap::Parser as ClapParser;
use keychain::Value;
use keychain::cli::{self, CheckOptions, CheckResult, CliError};
use std::io::{self, BufRead};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(ClapParser)]
#[command(name = "keychain")]
#[command(about = "Keychain - evaluate key chain expressions against JSON documents")]
#[command(version)]
struct Cli {
    /// Expressions to evaluate (read line by line from stdin if not provided)
    expressions: Vec<String>,

    /// JSON document used as the root object
    #[arg(short, long)]
    input: Option<String>,

    /// Only validate syntax, don't evaluate
    #[arg(long)]
    check: bool,

    /// Print results as JSON
    #[arg(long)]
    json: bool,
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr).with_target(true))
        .with(filter)
        .init();
}

fn main() {
    init_logging();
    let cli = Cli::parse();

    let root = match cli::parse_input(cli.input.as_deref()) {
        Ok(root) => root,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    let expressions = if !cli.expressions.is_empty() {
        cli.expressions.clone()
    } else if !atty::is(atty::Stream::Stdin) {
        match read_lines() {
            Ok(lines) => lines,
            Err(e) => {
                eprintln!("{}", e);
                std::process::exit(1);
            }
        }
    } else {
        Vec::new()
    };

    let mut failed = false;
    for expression in expressions {
        if let Err(e) = run_check(&cli, expression, &root) {
            eprintln!("{}", e);
            failed = true;
        }
    }

    if failed {
        std::process::exit(1);
    }
}

fn read_lines() -> Result<Vec<String>, CliError> {
    let mut lines = Vec::new();
    for line in io::stdin().lock().lines() {
        let line = line.map_err(CliError::Stdin)?;
        if !line.trim().is_empty() {
            lines.push(line);
        }
    }
    Ok(lines)
}

fn run_check(cli: &Cli, expression: String, root: &Value) -> Result<(), CliError> {
    let options = CheckOptions {
        expression,
        syntax_only: cli.check,
    };

    match cli::execute_check(&options, root)? {
        CheckResult::SyntaxValid => println!("Syntax is valid"),
        CheckResult::Success(value) if cli.json => {
            let json = serde_json::to_string(&cli::value_to_json(&value)).map_err(CliError::Output)?;
            println!("{}", json);
        }
        CheckResult::Success(value) => println!("{}", value),
    }
    Ok(())
}
