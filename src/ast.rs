//! Abstract Syntax Tree (AST) for Rill
//!
//! The AST represents the structure of a Rill program after parsing.
//! Nodes are closed enums with exclusive ownership of their children:
//! the tree is strictly acyclic, built once by the parser, walked once
//! by the code generator, and then discarded.

use crate::span::Span;
use std::fmt;

/// A complete Rill program (one translation unit)
#[derive(Debug, Clone)]
pub struct Program {
    pub items: Vec<Item>,
    pub span: Span,
}

/// Top-level items in a Rill program
#[derive(Debug, Clone)]
pub enum Item {
    /// Function definition: `int add(int a, int b) { ... }`
    Function(FnDef),

    /// Top-level statement; the code generator collects these into an
    /// implicit `main`
    Stmt(Stmt),
}

impl Item {
    pub fn span(&self) -> Span {
        match self {
            Item::Function(f) => f.span,
            Item::Stmt(s) => s.span,
        }
    }
}

/// Function definition: a prototype plus a body block
#[derive(Debug, Clone)]
pub struct FnDef {
    pub proto: Prototype,
    pub body: Block,
    pub span: Span,
}

/// Function prototype: return type, name, and ordered parameters
#[derive(Debug, Clone)]
pub struct Prototype {
    pub return_type: TypeName,
    pub name: Ident,
    pub params: Vec<Param>,
    pub span: Span,
}

/// Function parameter: `int a`
#[derive(Debug, Clone)]
pub struct Param {
    pub ty: TypeName,
    pub name: Ident,
    pub span: Span,
}

/// The surface type names of the language
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeName {
    Int,
    Double,
    Void,
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeName::Int => write!(f, "int"),
            TypeName::Double => write!(f, "double"),
            TypeName::Void => write!(f, "void"),
        }
    }
}

/// Block of statements, executed in order
#[derive(Debug, Clone)]
pub struct Block {
    pub stmts: Vec<Stmt>,
    pub span: Span,
}

/// Statement
#[derive(Debug, Clone)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

/// Kind of statement
#[derive(Debug, Clone)]
pub enum StmtKind {
    /// Expression statement: `expr;`
    Expr(Expr),

    /// Variable declaration: `int x;`, `double y = 1.5;`
    Declare {
        ty: TypeName,
        name: Ident,
        init: Option<Expr>,
    },

    /// Nested block: `{ ... }` (shares the enclosing scope)
    Block(Block),

    /// Conditional: `if (cond) { ... } else { ... }`
    If {
        condition: Expr,
        then_branch: Block,
        else_branch: Option<Box<Stmt>>,
    },

    /// Counting loop: `for i = start, end, step { ... }`
    ///
    /// The parser materializes a default step of `1`, so all four
    /// children are always populated.
    For {
        var: Ident,
        start: Expr,
        end: Expr,
        step: Expr,
        body: Block,
    },

    /// While loop: `while (cond) { ... }`
    While { condition: Expr, body: Block },

    /// Break out of the innermost loop
    Break,

    /// Continue with the next iteration of the innermost loop
    Continue,

    /// Return: `return;`, `return expr;`
    Return(Option<Expr>),
}

/// Expression
#[derive(Debug, Clone)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

/// Kind of expression
#[derive(Debug, Clone)]
pub enum ExprKind {
    /// Numeric literal: `42`, `3.14`
    Number(Number),

    /// Variable reference: `x`
    Variable(Ident),

    /// Assignment to an existing variable: `x = value`
    Assign { name: Ident, value: Box<Expr> },

    /// Binary operation: `a + b`
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    /// Unary operation: `-x`, `!flag`
    Unary { op: UnaryOp, operand: Box<Expr> },

    /// Function call: `foo(x, y)`
    Call { callee: Ident, args: Vec<Expr> },
}

/// A numeric literal value, integer- or double-valued
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i64),
    Float(f64),
}

/// Identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

impl Ident {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }
}

/// Binary operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Rem,

    // Comparison
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl BinaryOp {
    /// Comparison operators produce a boolean-like value
    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            BinaryOp::Eq
                | BinaryOp::Ne
                | BinaryOp::Lt
                | BinaryOp::Le
                | BinaryOp::Gt
                | BinaryOp::Ge
        )
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
        };
        write!(f, "{}", s)
    }
}

/// Unary operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnaryOp::Neg => write!(f, "-"),
            UnaryOp::Not => write!(f, "!"),
        }
    }
}
