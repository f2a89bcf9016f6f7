//! Rill Intermediate Representation
//!
//! A small block-structured IR for the Rill compiler. This IR is
//! designed to be:
//! - Easy to generate from the AST
//! - Easy to lower to a native backend later
//! - Simple enough to execute directly (see [`eval`])

// Note: instr must come before types to avoid circular deps
mod instr;
mod types;
mod builder;
mod lower;
mod eval;

// Re-export in logical order
pub use instr::*;
pub use types::*;
pub use builder::*;
pub use lower::*;
pub use eval::*;
