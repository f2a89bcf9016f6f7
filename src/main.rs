//! Rill Compiler CLI
//!
//! The `rillc` command is the main entry point for the Rill compiler.

use clap::{Parser, Subcommand};
use rill::ir;
use rill::{lexer, parser};
use std::fs;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "rillc")]
#[command(version = rill::VERSION)]
#[command(about = "The Rill Compiler", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a Rill source file
    Build {
        /// Input file to compile
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Write the IR to a file instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Emit tokens (for debugging)
        #[arg(long)]
        emit_tokens: bool,

        /// Emit AST (for debugging)
        #[arg(long)]
        emit_ast: bool,

        /// Emit IR
        #[arg(long)]
        emit_ir: bool,
    },

    /// Check a file for errors without compiling
    Check {
        /// Input file to check
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Tokenize a file and print tokens
    Tokenize {
        /// Input file to tokenize
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Parse a file and print AST
    Parse {
        /// Input file to parse
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Compile a file and run its `main` in the IR evaluator
    Run {
        /// Input file to run
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },
}

fn read_source(input: &PathBuf) -> miette::Result<String> {
    fs::read_to_string(input)
        .map_err(|e| miette::miette!("Failed to read {}: {}", input.display(), e))
}

fn module_name(input: &PathBuf) -> String {
    input
        .file_stem()
        .unwrap_or_default()
        .to_string_lossy()
        .into_owned()
}

/// Point at the offending source text alongside the message
fn report(source: &str, span: rill::Span, message: impl std::fmt::Display) -> miette::Report {
    let line = source[..span.start.min(source.len())]
        .bytes()
        .filter(|b| *b == b'\n')
        .count()
        + 1;
    let snippet = span.text(source);
    if snippet.is_empty() {
        miette::miette!("line {}: {}", line, message)
    } else {
        miette::miette!("line {}: {} (at `{}`)", line, message, snippet)
    }
}

fn compile_file(input: &PathBuf, source: &str) -> miette::Result<ir::Module> {
    rill::compile(source, &module_name(input)).map_err(|e| report(source, e.span(), &e))
}

fn main() -> miette::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Build {
            input,
            output,
            emit_tokens,
            emit_ast,
            emit_ir,
        } => {
            let source = read_source(&input)?;

            println!("Compiling {}...", input.display());

            if emit_tokens {
                println!("\n=== Tokens ===");
                for token in lexer::lex(&source) {
                    println!(
                        "{:?} @ {} = {:?}",
                        token.kind,
                        token.span,
                        token.text(&source)
                    );
                }
            }

            if emit_ast {
                let ast = parser::parse(&source).map_err(|e| report(&source, e.span(), &e))?;
                println!("\n=== AST ===");
                println!("{:#?}", ast);
            }

            let module = compile_file(&input, &source)?;

            if emit_ir {
                println!("\n=== Rill IR ===");
                println!("{}", module);
            }

            if let Some(out_path) = output {
                fs::write(&out_path, format!("{}", module))
                    .map_err(|e| miette::miette!("Failed to write {}: {}", out_path.display(), e))?;
                println!("IR written to {}", out_path.display());
            }

            println!("Compilation successful!");
            Ok(())
        }

        Commands::Check { input } => {
            let source = read_source(&input)?;

            println!("Checking {}...", input.display());
            let module = compile_file(&input, &source)?;
            println!("No errors found! ({} function(s))", module.functions.len());
            Ok(())
        }

        Commands::Tokenize { input } => {
            let source = read_source(&input)?;

            for token in lexer::lex(&source) {
                println!(
                    "{:>4}..{:<4} {:20} {:?}",
                    token.span.start,
                    token.span.end,
                    format!("{:?}", token.kind),
                    token.text(&source)
                );
            }

            Ok(())
        }

        Commands::Parse { input } => {
            let source = read_source(&input)?;

            let ast = parser::parse(&source).map_err(|e| report(&source, e.span(), &e))?;
            println!("{:#?}", ast);

            Ok(())
        }

        Commands::Run { input } => {
            let source = read_source(&input)?;

            let module = compile_file(&input, &source)?;
            let result = ir::run_main(&module)
                .map_err(|e| miette::miette!("Runtime error: {}", e))?;

            match result {
                ir::Value::Void => {}
                value => println!("{}", value),
            }
            Ok(())
        }
    }
}
