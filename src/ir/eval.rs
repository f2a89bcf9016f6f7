//! IR Evaluator
//!
//! A small reference interpreter for Rill IR. It executes a module
//! directly: registers live in a per-call map, `alloca` slots live in a
//! flat memory arena, and calls recurse through `run`. The CLI uses it
//! for `rillc run`, and tests use it to check that emitted IR computes
//! what the source program says.

use std::collections::HashMap;

use thiserror::Error;

use super::instr::{CmpOp, InstrKind, Terminator};
use super::types::{BasicBlock, Constant, Function, Module, VReg};

/// A runtime value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Bool(bool),
    /// Address of an alloca slot
    Ptr(usize),
    /// Result of a void call
    Void,
}

impl Value {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Bool(v) => write!(f, "{}", v),
            Value::Ptr(addr) => write!(f, "<slot {}>", addr),
            Value::Void => write!(f, "void"),
        }
    }
}

/// Errors raised while executing IR
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    #[error("no function named `{0}` in module")]
    NoSuchFunction(String),

    #[error("`{name}` expects {expected} argument(s), got {found}")]
    WrongArgumentCount {
        name: String,
        expected: usize,
        found: usize,
    },

    #[error("division by zero")]
    DivisionByZero,

    #[error("malformed IR: {0}")]
    MalformedIr(String),
}

type EvalResult<T> = Result<T, EvalError>;

/// Executes functions of an IR module
pub struct Evaluator<'m> {
    module: &'m Module,
    /// Alloca slots, shared across the whole call tree
    memory: Vec<Value>,
}

impl<'m> Evaluator<'m> {
    pub fn new(module: &'m Module) -> Self {
        Self {
            module,
            memory: Vec::new(),
        }
    }

    /// Run a function by name with the given arguments
    pub fn run(&mut self, name: &str, args: &[Value]) -> EvalResult<Value> {
        let func = self
            .module
            .function(name)
            .ok_or_else(|| EvalError::NoSuchFunction(name.to_string()))?;
        if func.params.len() != args.len() {
            return Err(EvalError::WrongArgumentCount {
                name: name.to_string(),
                expected: func.params.len(),
                found: args.len(),
            });
        }

        let mut regs: HashMap<VReg, Value> = HashMap::new();
        for ((vreg, _), value) in func.params.iter().zip(args) {
            regs.insert(*vreg, *value);
        }

        let mut block = func
            .entry_block()
            .ok_or_else(|| EvalError::MalformedIr(format!("`{}` has no entry block", name)))?;

        loop {
            for instr in &block.instructions {
                let value = self.exec_instr(&instr.kind, &regs)?;
                if let Some(result) = instr.result {
                    regs.insert(result, value);
                }
            }

            match block.terminator.as_ref().ok_or_else(|| {
                EvalError::MalformedIr(format!("{} in `{}` has no terminator", block.id, name))
            })? {
                Terminator::Ret(None) => return Ok(Value::Void),
                Terminator::Ret(Some(v)) => return self.reg(&regs, *v),
                Terminator::Br(target) => {
                    block = self.block_of(func, block, *target)?;
                }
                Terminator::CondBr {
                    cond,
                    then_block,
                    else_block,
                } => {
                    let target = match self.reg(&regs, *cond)? {
                        Value::Bool(true) => *then_block,
                        Value::Bool(false) => *else_block,
                        other => {
                            return Err(EvalError::MalformedIr(format!(
                                "branch on non-bool value {}",
                                other
                            )))
                        }
                    };
                    block = self.block_of(func, block, target)?;
                }
            }
        }
    }

    fn block_of<'f>(
        &self,
        func: &'f Function,
        from: &BasicBlock,
        target: super::types::BlockId,
    ) -> EvalResult<&'f BasicBlock> {
        func.block(target).ok_or_else(|| {
            EvalError::MalformedIr(format!("{} branches to missing {}", from.id, target))
        })
    }

    fn reg(&self, regs: &HashMap<VReg, Value>, vreg: VReg) -> EvalResult<Value> {
        regs.get(&vreg)
            .copied()
            .ok_or_else(|| EvalError::MalformedIr(format!("use of undefined register {}", vreg)))
    }

    fn int(&self, regs: &HashMap<VReg, Value>, vreg: VReg) -> EvalResult<i64> {
        match self.reg(regs, vreg)? {
            Value::Int(v) => Ok(v),
            other => Err(EvalError::MalformedIr(format!(
                "{} holds {} where an integer was expected",
                vreg, other
            ))),
        }
    }

    fn float(&self, regs: &HashMap<VReg, Value>, vreg: VReg) -> EvalResult<f64> {
        match self.reg(regs, vreg)? {
            Value::Float(v) => Ok(v),
            other => Err(EvalError::MalformedIr(format!(
                "{} holds {} where a float was expected",
                vreg, other
            ))),
        }
    }

    fn ptr(&self, regs: &HashMap<VReg, Value>, vreg: VReg) -> EvalResult<usize> {
        match self.reg(regs, vreg)? {
            Value::Ptr(addr) => Ok(addr),
            other => Err(EvalError::MalformedIr(format!(
                "{} holds {} where a slot was expected",
                vreg, other
            ))),
        }
    }

    fn exec_instr(
        &mut self,
        kind: &InstrKind,
        regs: &HashMap<VReg, Value>,
    ) -> EvalResult<Value> {
        match kind {
            InstrKind::Const(Constant::Int(v)) => Ok(Value::Int(*v)),
            InstrKind::Const(Constant::Float(v)) => Ok(Value::Float(*v)),
            InstrKind::Const(Constant::Bool(v)) => Ok(Value::Bool(*v)),

            InstrKind::Add(a, b) => Ok(Value::Int(
                self.int(regs, *a)?.wrapping_add(self.int(regs, *b)?),
            )),
            InstrKind::Sub(a, b) => Ok(Value::Int(
                self.int(regs, *a)?.wrapping_sub(self.int(regs, *b)?),
            )),
            InstrKind::Mul(a, b) => Ok(Value::Int(
                self.int(regs, *a)?.wrapping_mul(self.int(regs, *b)?),
            )),
            InstrKind::SDiv(a, b) => {
                let rhs = self.int(regs, *b)?;
                if rhs == 0 {
                    return Err(EvalError::DivisionByZero);
                }
                Ok(Value::Int(self.int(regs, *a)?.wrapping_div(rhs)))
            }
            InstrKind::SRem(a, b) => {
                let rhs = self.int(regs, *b)?;
                if rhs == 0 {
                    return Err(EvalError::DivisionByZero);
                }
                Ok(Value::Int(self.int(regs, *a)?.wrapping_rem(rhs)))
            }
            InstrKind::Neg(v) => Ok(Value::Int(self.int(regs, *v)?.wrapping_neg())),

            InstrKind::FAdd(a, b) => Ok(Value::Float(self.float(regs, *a)? + self.float(regs, *b)?)),
            InstrKind::FSub(a, b) => Ok(Value::Float(self.float(regs, *a)? - self.float(regs, *b)?)),
            InstrKind::FMul(a, b) => Ok(Value::Float(self.float(regs, *a)? * self.float(regs, *b)?)),
            InstrKind::FDiv(a, b) => Ok(Value::Float(self.float(regs, *a)? / self.float(regs, *b)?)),
            InstrKind::FNeg(v) => Ok(Value::Float(-self.float(regs, *v)?)),

            InstrKind::ICmp(op, a, b) => {
                let (a, b) = (self.int(regs, *a)?, self.int(regs, *b)?);
                Ok(Value::Bool(match op {
                    CmpOp::Eq => a == b,
                    CmpOp::Ne => a != b,
                    CmpOp::Slt => a < b,
                    CmpOp::Sle => a <= b,
                    CmpOp::Sgt => a > b,
                    CmpOp::Sge => a >= b,
                }))
            }
            InstrKind::FCmp(op, a, b) => {
                let (a, b) = (self.float(regs, *a)?, self.float(regs, *b)?);
                Ok(Value::Bool(match op {
                    CmpOp::Eq => a == b,
                    CmpOp::Ne => a != b,
                    CmpOp::Slt => a < b,
                    CmpOp::Sle => a <= b,
                    CmpOp::Sgt => a > b,
                    CmpOp::Sge => a >= b,
                }))
            }

            InstrKind::SIToFP(v, _) => Ok(Value::Float(self.int(regs, *v)? as f64)),
            InstrKind::FPToSI(v, _) => Ok(Value::Int(self.float(regs, *v)? as i64)),
            InstrKind::ZExt(v, _) => match self.reg(regs, *v)? {
                Value::Bool(b) => Ok(Value::Int(b as i64)),
                Value::Int(i) => Ok(Value::Int(i)),
                other => Err(EvalError::MalformedIr(format!("zext on {}", other))),
            },

            InstrKind::Alloca(ty) => {
                let addr = self.memory.len();
                let initial = if ty.is_float() {
                    Value::Float(0.0)
                } else {
                    Value::Int(0)
                };
                self.memory.push(initial);
                Ok(Value::Ptr(addr))
            }
            InstrKind::Load(ptr) => {
                let addr = self.ptr(regs, *ptr)?;
                Ok(self.memory[addr])
            }
            InstrKind::Store(ptr, value) => {
                let addr = self.ptr(regs, *ptr)?;
                self.memory[addr] = self.reg(regs, *value)?;
                Ok(Value::Void)
            }

            InstrKind::Call { func, args } => {
                let arg_values: Vec<Value> = args
                    .iter()
                    .map(|a| self.reg(regs, *a))
                    .collect::<EvalResult<_>>()?;
                self.run(func, &arg_values)
            }
        }
    }
}

/// Run a module's `main` function
pub fn run_main(module: &Module) -> EvalResult<Value> {
    Evaluator::new(module).run("main", &[])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::lower;
    use crate::parser::parse;

    fn eval(source: &str, func: &str, args: &[Value]) -> Value {
        let program = parse(source).expect("program should parse");
        let module = lower(&program, "test").expect("program should lower");
        Evaluator::new(&module)
            .run(func, args)
            .expect("program should run")
    }

    #[test]
    fn test_arithmetic() {
        assert_eq!(
            eval("int f() { return 2 + 3 * 4; }", "f", &[]),
            Value::Int(14)
        );
    }

    #[test]
    fn test_parameters_and_recursion() {
        let source = "int fib(int n) { if (n < 2) { return n; } return fib(n - 1) + fib(n - 2); }";
        assert_eq!(eval(source, "fib", &[Value::Int(10)]), Value::Int(55));
    }

    #[test]
    fn test_for_loop_runs_upper_bound_exclusive() {
        // start 0, end 5, step 1 runs the body five times
        let source = "int f() { int n = 0; for i = 0, 5 { n = n + 1; } return n; }";
        assert_eq!(eval(source, "f", &[]), Value::Int(5));
    }

    #[test]
    fn test_for_loop_custom_step() {
        let source = "int f() { int n = 0; for i = 0, 10, 3 { n = n + i; } return n; }";
        // i takes 0, 3, 6, 9
        assert_eq!(eval(source, "f", &[]), Value::Int(18));
    }

    #[test]
    fn test_false_condition_skips_then_branch() {
        let source = "int f() { int x = 7; if (0) { x = 1; } return x; }";
        assert_eq!(eval(source, "f", &[]), Value::Int(7));
    }

    #[test]
    fn test_else_branch_taken() {
        let source = "int f(int x) { if (x > 0) { return 1; } else { return 2; } }";
        assert_eq!(eval(source, "f", &[Value::Int(-5)]), Value::Int(2));
    }

    #[test]
    fn test_while_with_break() {
        let source =
            "int f() { int n = 0; while (1) { n = n + 1; if (n == 4) { break; } } return n; }";
        assert_eq!(eval(source, "f", &[]), Value::Int(4));
    }

    #[test]
    fn test_continue_skips_rest_of_body() {
        let source = "int f() { int n = 0; for i = 0, 6 { if (i % 2 == 1) { continue; } n = n + 1; } return n; }";
        assert_eq!(eval(source, "f", &[]), Value::Int(3));
    }

    #[test]
    fn test_mixed_arithmetic_result() {
        let source = "double f(int a) { return a + 0.5; }";
        assert_eq!(eval(source, "f", &[Value::Int(2)]), Value::Float(2.5));
    }

    #[test]
    fn test_division_by_zero() {
        let program = parse("int f() { return 1 / 0; }").unwrap();
        let module = lower(&program, "test").unwrap();
        let err = Evaluator::new(&module).run("f", &[]).unwrap_err();
        assert_eq!(err, EvalError::DivisionByZero);
    }

    #[test]
    fn test_top_level_statements_run_as_main() {
        let program = parse("int x = 3; x = x * x;").unwrap();
        let module = lower(&program, "test").unwrap();
        // Implicit main returns zero
        assert_eq!(run_main(&module).unwrap(), Value::Int(0));
    }

    #[test]
    fn test_missing_function() {
        let program = parse("int f() { return 0; }").unwrap();
        let module = lower(&program, "test").unwrap();
        let err = Evaluator::new(&module).run("g", &[]).unwrap_err();
        assert!(matches!(err, EvalError::NoSuchFunction(_)));
    }
}
