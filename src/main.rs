use std::fs;
use std::io::{IsTerminal, Read};
use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;

use anyhow::Context;
use clap::{CommandFactory, Parser};
use serde_json::Value;

use actionset::{ActionExpander, ExpandError, InvalidHandling, StaticCatalog};

/// Expand or invert wildcard action patterns against an action catalog.
///
/// Patterns are given as arguments, or read newline-separated from stdin.
/// A JSON policy document on stdin gets every statement's Action/NotAction
/// expanded in place.
#[derive(Parser)]
#[clap(author, version, about)]
struct Cli {
    /// Action patterns to expand (`service:action`, `*` and `?` wildcards)
    #[clap(value_name = "PATTERN")]
    patterns: Vec<String>,

    /// Print every known action except those matching the patterns
    #[clap(short, long)]
    invert: bool,

    /// Catalog file: a JSON object mapping service keys to action lists
    /// (falls back to the ACTIONSET_CATALOG environment variable)
    #[clap(long, value_name = "FILE")]
    catalog: Option<PathBuf>,

    /// How to treat patterns that cannot be resolved
    #[clap(
        long,
        value_name = "POLICY",
        default_value = "raise-error",
        value_parser = parse_handling
    )]
    invalid_handling: InvalidHandling,
}

fn parse_handling(text: &str) -> Result<InvalidHandling, String> {
    InvalidHandling::from_str(text).map_err(|_| "expected raise-error, keep, or remove".to_string())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(code) => code,
        Err(err) => report(&err),
    }
}

fn report(err: &anyhow::Error) -> ExitCode {
    if let Some(expand_err) = err.downcast_ref::<ExpandError>() {
        eprintln!("Error: {expand_err}");
        ExitCode::from(1)
    } else {
        eprintln!("An unexpected error occurred: {err:#}");
        ExitCode::from(2)
    }
}

fn run(cli: &Cli) -> anyhow::Result<ExitCode> {
    let Some(catalog_path) = cli
        .catalog
        .clone()
        .or_else(|| std::env::var_os("ACTIONSET_CATALOG").map(PathBuf::from))
    else {
        eprintln!("Error: no catalog given; pass --catalog or set ACTIONSET_CATALOG");
        eprintln!("{}", Cli::command().render_usage());
        return Ok(ExitCode::from(1));
    };

    let text = fs::read_to_string(&catalog_path)
        .with_context(|| format!("failed to read catalog file '{}'", catalog_path.display()))?;
    let catalog = StaticCatalog::from_json_str(&text)
        .with_context(|| format!("failed to parse catalog file '{}'", catalog_path.display()))?;
    let expander = ActionExpander::with_catalog(catalog);

    if !cli.patterns.is_empty() {
        return expand_patterns(&expander, cli.patterns.clone(), cli);
    }

    if std::io::stdin().is_terminal() {
        eprintln!("{}", Cli::command().render_usage());
        return Ok(ExitCode::from(1));
    }

    let mut input = String::new();
    std::io::stdin()
        .read_to_string(&mut input)
        .context("failed to read stdin")?;

    if input.trim_start().starts_with('{') {
        return rewrite_policy(&expander, &input, cli);
    }

    let patterns: Vec<String> = input
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect();
    expand_patterns(&expander, patterns, cli)
}

fn expand_patterns(
    expander: &ActionExpander,
    patterns: Vec<String>,
    cli: &Cli,
) -> anyhow::Result<ExitCode> {
    let actions = if cli.invert {
        expander.invert(patterns, cli.invalid_handling)?
    } else {
        expander.expand(patterns, cli.invalid_handling)?
    };

    for action in &actions {
        println!("{action}");
    }
    Ok(ExitCode::SUCCESS)
}

fn rewrite_policy(
    expander: &ActionExpander,
    input: &str,
    cli: &Cli,
) -> anyhow::Result<ExitCode> {
    if cli.invert {
        eprintln!("Error: --invert cannot be used when processing a JSON policy");
        return Ok(ExitCode::from(1));
    }

    let document: Value = serde_json::from_str(input).map_err(ExpandError::from)?;
    let rewritten =
        expander.expand_policy_actions(&document, InvalidHandling::Remove, InvalidHandling::Keep)?;

    println!("{}", serde_json::to_string_pretty(&rewritten)?);
    Ok(ExitCode::SUCCESS)
}
