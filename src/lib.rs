//! Rill Compiler
//!
//! Compiler front-end for the Rill programming language: a small
//! procedural language with `int`, `double`, and `void` functions,
//! C-style statements, and a counting `for` loop.
//!
//! # Architecture
//!
//! ```text
//! Source Code (.rl)
//!       │
//!       ▼
//! ┌─────────────┐
//! │    Lexer    │  → Tokens
//! └─────────────┘
//!       │
//!       ▼
//! ┌─────────────┐
//! │   Parser    │  → AST
//! └─────────────┘
//!       │
//!       ▼
//! ┌─────────────┐
//! │  IR Lowering│  → Rill IR
//! └─────────────┘
//! ```
//!
//! Semantic checks (name resolution, arity, numeric coercions) run
//! during lowering, so a program that lowers successfully is also
//! well-formed.

pub mod ast;
pub mod ir;
pub mod lexer;
pub mod parser;
pub mod span;
pub mod token;

// Re-exports for convenience
pub use lexer::Lexer;
pub use span::Span;
pub use token::{Token, TokenKind};

use thiserror::Error;

/// Compiler version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// File extension for Rill source files
pub const FILE_EXTENSION: &str = "rl";

/// Any error a compilation can produce
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompileError {
    #[error("syntax error: {0}")]
    Parse(#[from] parser::ParseError),

    #[error("semantic error: {0}")]
    Lower(#[from] ir::LowerError),
}

impl CompileError {
    /// Source location of the error
    pub fn span(&self) -> Span {
        match self {
            CompileError::Parse(e) => e.span(),
            CompileError::Lower(e) => e.span(),
        }
    }
}

/// Compile source text into an IR module.
///
/// Each call starts from a clean slate: no functions or state survive
/// from previous compilations.
pub fn compile(source: &str, module_name: &str) -> Result<ir::Module, CompileError> {
    let program = parser::parse(source)?;
    let module = ir::lower(&program, module_name)?;
    Ok(module)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_pipeline() {
        let module = compile("int square(int x) { return x * x; }", "m").unwrap();
        assert!(module.function("square").is_some());
    }

    #[test]
    fn test_syntax_error_reported_with_span() {
        let err = compile("int f( { }", "m").unwrap_err();
        assert!(matches!(err, CompileError::Parse(_)));
        assert!(err.span().start > 0);
    }

    #[test]
    fn test_compilations_are_independent() {
        // Definitions from one call do not leak into the next
        compile("int f() { return 1; }", "m").unwrap();
        let err = compile("int g() { return f(); }", "m").unwrap_err();
        assert!(matches!(err, CompileError::Lower(_)));
    }
}
