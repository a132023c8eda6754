use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use clap_stdin::FileOrStdin;
use log::info;

use jtac::{
    codegen::parse_tac, compile, config::Limits, interpreter::Interpreter, parser::render, report,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Emit {
    Tokens,
    Ast,
    Syntax,
    Semantic,
    Tac,
    Run,
    All,
}

/// Checks a Java subset, lowers it to three-address code and runs it.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Source file, or `-` to read from stdin
    input: FileOrStdin,

    /// Reports to print
    #[arg(long, value_enum, default_value = "all")]
    emit: Vec<Emit>,

    /// Treat the input as a three-address code listing and execute it
    #[arg(long)]
    tac: bool,

    #[arg(long, default_value_t = Limits::DEFAULT_STEPS)]
    max_parse_steps: usize,

    #[arg(long, default_value_t = Limits::DEFAULT_STEPS)]
    max_semantic_steps: usize,

    #[arg(long, default_value_t = Limits::DEFAULT_STEPS)]
    max_instructions: usize,
}

fn section(title: &str) {
    println!("\n== {} ==", title);
}

fn main() -> Result<ExitCode> {
    env_logger::init();
    let args = Args::parse();
    let limits = Limits {
        parser_steps: args.max_parse_steps,
        semantic_steps: args.max_semantic_steps,
        interpreter_steps: args.max_instructions,
    };
    let source = args.input.contents().context("Reading the input")?;

    if args.tac {
        let code = parse_tac(&source).context("Parsing the TAC listing")?;
        info!("loaded {} instructions", code.len());
        let trace = Interpreter::new(&code, limits.interpreter_steps).execute();
        section("Execution");
        println!("{}", report::execution_report(&trace));
        return Ok(if trace.success {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        });
    }

    let wants = |emit: Emit| args.emit.contains(&Emit::All) || args.emit.contains(&emit);
    let compilation = compile(&source, &limits);

    if wants(Emit::Tokens) {
        section("Tokens");
        println!("{}", report::token_table(&compilation.tokens));
    }
    if !compilation.lex_errors.is_empty() {
        section("Lexical errors");
        println!("{}", report::lexical_report(&compilation.lex_errors));
        return Ok(ExitCode::FAILURE);
    }

    if let Some(parse) = &compilation.parse {
        if wants(Emit::Ast) {
            section("AST");
            println!("{}", render(&parse.translation_unit));
        }
        if wants(Emit::Syntax) {
            section("Syntax");
            println!("{}", report::syntax_report(&parse.errors));
        }
    }
    if let Some(semantic) = &compilation.semantic {
        if wants(Emit::Semantic) {
            section("Semantics");
            println!("{}", report::semantic_report(semantic));
        }
    }
    if wants(Emit::Tac) {
        section("Three-address code");
        if compilation.tac_is_advisory() {
            println!("(generated from a partially recovered program)");
        }
        println!("{}", report::tac_listing(&compilation.tac));
    }

    let mut success = compilation.is_ok();
    if wants(Emit::Run) {
        section("Execution");
        if success {
            let trace = compilation.execute(&limits);
            println!("{}", report::execution_report(&trace));
            success = trace.success;
        } else {
            println!("Execution skipped: the program has errors.");
        }
    }

    Ok(if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
