//! AST to IR Lowering
//!
//! Converts the AST into Rill IR. This pass is also where the semantic
//! checks live: name resolution, call arity, numeric coercions, and
//! loop-context validation all happen while walking the tree. Every
//! variable gets a stack slot (`alloca`), reads go through `load` and
//! writes through `store`, so no SSA construction is needed.

use std::collections::HashMap;

use thiserror::Error;

use crate::ast::{
    BinaryOp, Block, Expr, ExprKind, FnDef, Item, Number, Program, Stmt, StmtKind, TypeName,
    UnaryOp,
};
use crate::span::Span;

use super::builder::IrBuilder;
use super::instr::CmpOp;
use super::types::{BlockId, IrType, Module, VReg};

/// Errors produced during lowering
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LowerError {
    #[error("unknown variable `{name}`")]
    UnknownIdentifier { name: String, span: Span },

    #[error("call to unknown function `{name}`")]
    UnknownFunction { name: String, span: Span },

    #[error("`{name}` expects {expected} argument(s), found {found}")]
    ArityMismatch {
        name: String,
        expected: usize,
        found: usize,
        span: Span,
    },

    #[error("variable `{name}` is already declared in this scope")]
    DuplicateDeclaration { name: String, span: Span },

    #[error("function `{name}` is already defined")]
    DuplicateFunction { name: String, span: Span },

    #[error("type mismatch: {message}")]
    TypeMismatch { message: String, span: Span },

    #[error("`break` outside of a loop")]
    BreakOutsideLoop { span: Span },

    #[error("`continue` outside of a loop")]
    ContinueOutsideLoop { span: Span },
}

impl LowerError {
    pub fn span(&self) -> Span {
        match self {
            LowerError::UnknownIdentifier { span, .. } => *span,
            LowerError::UnknownFunction { span, .. } => *span,
            LowerError::ArityMismatch { span, .. } => *span,
            LowerError::DuplicateDeclaration { span, .. } => *span,
            LowerError::DuplicateFunction { span, .. } => *span,
            LowerError::TypeMismatch { span, .. } => *span,
            LowerError::BreakOutsideLoop { span } => *span,
            LowerError::ContinueOutsideLoop { span } => *span,
        }
    }

    fn type_mismatch(message: impl Into<String>, span: Span) -> Self {
        LowerError::TypeMismatch {
            message: message.into(),
            span,
        }
    }
}

type LowerResult<T> = Result<T, LowerError>;

/// A registered function signature
#[derive(Debug, Clone)]
struct Signature {
    params: Vec<IrType>,
    ret: IrType,
}

/// A named stack slot
#[derive(Debug, Clone)]
struct LocalSlot {
    slot: VReg,
    ty: IrType,
}

/// Context for the current loop (used for break/continue)
#[derive(Debug, Clone, Copy)]
struct LoopContext {
    /// Block to jump to on `break`
    exit_block: BlockId,
    /// Block to jump to on `continue`
    continue_block: BlockId,
}

/// Lowers AST to IR
pub struct Lowerer {
    builder: IrBuilder,
    /// Scope stack: innermost scope last
    scopes: Vec<HashMap<String, LocalSlot>>,
    /// Registered function signatures, filled before any body is lowered
    signatures: HashMap<String, Signature>,
    /// Stack of loop contexts for break/continue
    loop_stack: Vec<LoopContext>,
    /// Return type of the function currently being lowered
    ret_type: IrType,
}

impl Lowerer {
    pub fn new(module_name: impl Into<String>) -> Self {
        Self {
            builder: IrBuilder::new(module_name),
            scopes: Vec::new(),
            signatures: HashMap::new(),
            loop_stack: Vec::new(),
            ret_type: IrType::Void,
        }
    }

    /// Lower a whole program to a module
    pub fn lower_program(mut self, program: &Program) -> LowerResult<Module> {
        // Registration pass: every function is callable from every body,
        // regardless of definition order.
        let mut top_level: Vec<&Stmt> = Vec::new();
        for item in &program.items {
            match item {
                Item::Function(f) => self.register_fn(f)?,
                Item::Stmt(s) => top_level.push(s),
            }
        }

        if !top_level.is_empty() {
            // Loose statements become the body of an implicit `main`.
            if self.signatures.contains_key("main") {
                return Err(LowerError::DuplicateFunction {
                    name: "main".to_string(),
                    span: top_level[0].span,
                });
            }
            self.signatures.insert(
                "main".to_string(),
                Signature {
                    params: Vec::new(),
                    ret: IrType::I64,
                },
            );
        }

        for item in &program.items {
            if let Item::Function(f) = item {
                self.lower_fn(f)?;
            }
        }

        if !top_level.is_empty() {
            self.lower_implicit_main(&top_level)?;
        }

        Ok(self.builder.finish())
    }

    fn register_fn(&mut self, f: &FnDef) -> LowerResult<()> {
        let name = &f.proto.name.name;
        if self.signatures.contains_key(name) {
            return Err(LowerError::DuplicateFunction {
                name: name.clone(),
                span: f.proto.name.span,
            });
        }
        let sig = Signature {
            params: f.proto.params.iter().map(|p| ir_type(p.ty)).collect(),
            ret: ir_type(f.proto.return_type),
        };
        self.signatures.insert(name.clone(), sig);
        Ok(())
    }

    // ============ Function Lowering ============

    fn lower_fn(&mut self, f: &FnDef) -> LowerResult<()> {
        let param_types: Vec<IrType> = f.proto.params.iter().map(|p| ir_type(p.ty)).collect();
        self.ret_type = ir_type(f.proto.return_type);

        let param_vregs = self.builder.start_function(
            f.proto.name.name.clone(),
            param_types.clone(),
            self.ret_type.clone(),
        );

        // Parameters become ordinary mutable slots
        self.enter_scope();
        for ((param, vreg), ty) in f.proto.params.iter().zip(param_vregs).zip(param_types) {
            let slot = self.builder.alloca(ty.clone());
            self.builder.store(slot, vreg);
            self.declare(&param.name.name, slot, ty, param.name.span)?;
        }

        for stmt in &f.body.stmts {
            self.lower_stmt(stmt)?;
        }
        self.exit_scope();

        self.seal_with_implicit_return();
        self.builder.finish_function();
        Ok(())
    }

    /// Build the implicit `main` from the program's loose statements
    fn lower_implicit_main(&mut self, stmts: &[&Stmt]) -> LowerResult<()> {
        self.ret_type = IrType::I64;
        self.builder
            .start_function("main", Vec::new(), IrType::I64);

        self.enter_scope();
        for stmt in stmts {
            self.lower_stmt(stmt)?;
        }
        self.exit_scope();

        self.seal_with_implicit_return();
        self.builder.finish_function();
        Ok(())
    }

    /// Functions that fall off the end return a zero of their return type
    fn seal_with_implicit_return(&mut self) {
        if self.builder.is_terminated() {
            return;
        }
        match self.ret_type {
            IrType::Void => self.builder.ret(None),
            IrType::F64 => {
                let zero = self.builder.const_float(0.0);
                self.builder.ret(Some(zero));
            }
            _ => {
                let zero = self.builder.const_int(0);
                self.builder.ret(Some(zero));
            }
        }
    }

    // ============ Scopes ============

    fn enter_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    fn exit_scope(&mut self) {
        self.scopes.pop();
    }

    fn declare(&mut self, name: &str, slot: VReg, ty: IrType, span: Span) -> LowerResult<()> {
        let scope = self.scopes.last_mut().expect("scope stack is never empty");
        if scope.contains_key(name) {
            return Err(LowerError::DuplicateDeclaration {
                name: name.to_string(),
                span,
            });
        }
        scope.insert(name.to_string(), LocalSlot { slot, ty });
        Ok(())
    }

    /// Innermost declaration wins, so shadowing across scopes works
    fn lookup(&self, name: &str) -> Option<&LocalSlot> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }

    // ============ Statement Lowering ============

    fn lower_stmt(&mut self, stmt: &Stmt) -> LowerResult<()> {
        match &stmt.kind {
            StmtKind::Expr(expr) => {
                // A bare call to a void function is the one place a void
                // value is allowed.
                if let ExprKind::Call { callee, args } = &expr.kind {
                    self.lower_call(expr.span, &callee.name, args)?;
                } else {
                    self.lower_expr(expr)?;
                }
                Ok(())
            }
            StmtKind::Declare { ty, name, init } => self.lower_declare(*ty, name, init.as_ref()),
            StmtKind::Block(block) => {
                // A bare block shares the enclosing scope
                for stmt in &block.stmts {
                    self.lower_stmt(stmt)?;
                }
                Ok(())
            }
            StmtKind::If {
                condition,
                then_branch,
                else_branch,
            } => self.lower_if(condition, then_branch, else_branch.as_deref()),
            StmtKind::While { condition, body } => self.lower_while(condition, body),
            StmtKind::For {
                var,
                start,
                end,
                step,
                body,
            } => self.lower_for(var, start, end, step, body),
            StmtKind::Break => {
                let ctx = self
                    .loop_stack
                    .last()
                    .copied()
                    .ok_or(LowerError::BreakOutsideLoop { span: stmt.span })?;
                self.builder.br(ctx.exit_block);
                Ok(())
            }
            StmtKind::Continue => {
                let ctx = self
                    .loop_stack
                    .last()
                    .copied()
                    .ok_or(LowerError::ContinueOutsideLoop { span: stmt.span })?;
                self.builder.br(ctx.continue_block);
                Ok(())
            }
            StmtKind::Return(value) => self.lower_return(value.as_ref(), stmt.span),
        }
    }

    fn lower_declare(
        &mut self,
        ty: TypeName,
        name: &crate::ast::Ident,
        init: Option<&Expr>,
    ) -> LowerResult<()> {
        if ty == TypeName::Void {
            return Err(LowerError::type_mismatch(
                format!("variable `{}` cannot have type void", name.name),
                name.span,
            ));
        }
        let slot_ty = ir_type(ty);

        let value = match init {
            Some(expr) => {
                let (v, v_ty) = self.lower_expr(expr)?;
                self.coerce(v, &v_ty, &slot_ty, expr.span)?
            }
            None => match slot_ty {
                IrType::F64 => self.builder.const_float(0.0),
                _ => self.builder.const_int(0),
            },
        };

        let slot = self.builder.alloca(slot_ty.clone());
        self.builder.store(slot, value);
        self.declare(&name.name, slot, slot_ty, name.span)
    }

    fn lower_if(
        &mut self,
        condition: &Expr,
        then_branch: &Block,
        else_branch: Option<&Stmt>,
    ) -> LowerResult<()> {
        let (cond, cond_ty) = self.lower_expr(condition)?;
        let flag = self.truthy(cond, &cond_ty, condition.span)?;

        let then_block = self.builder.create_block();
        let merge_block = self.builder.create_block();
        let else_block = if else_branch.is_some() {
            self.builder.create_block()
        } else {
            // No else: a false condition falls straight through
            merge_block
        };

        self.builder.cond_br(flag, then_block, else_block);

        self.builder.start_block_labeled(then_block, "if.then");
        for stmt in &then_branch.stmts {
            self.lower_stmt(stmt)?;
        }
        self.builder.br(merge_block);

        if let Some(else_stmt) = else_branch {
            self.builder.start_block_labeled(else_block, "if.else");
            self.lower_stmt(else_stmt)?;
            self.builder.br(merge_block);
        }

        self.builder.start_block_labeled(merge_block, "if.end");
        Ok(())
    }

    fn lower_while(&mut self, condition: &Expr, body: &Block) -> LowerResult<()> {
        let cond_block = self.builder.create_block();
        let body_block = self.builder.create_block();
        let exit_block = self.builder.create_block();

        self.builder.br(cond_block);

        self.builder.start_block_labeled(cond_block, "while.cond");
        let (cond, cond_ty) = self.lower_expr(condition)?;
        let flag = self.truthy(cond, &cond_ty, condition.span)?;
        self.builder.cond_br(flag, body_block, exit_block);

        self.builder.start_block_labeled(body_block, "while.body");
        self.loop_stack.push(LoopContext {
            exit_block,
            continue_block: cond_block,
        });
        for stmt in &body.stmts {
            self.lower_stmt(stmt)?;
        }
        self.loop_stack.pop();
        self.builder.br(cond_block);

        self.builder.start_block_labeled(exit_block, "while.end");
        Ok(())
    }

    /// `for i = start, end, step { .. }` counts from start while `i < end`,
    /// adding step after each iteration. End and step are re-evaluated
    /// every time around, matching their position in the loop body.
    fn lower_for(
        &mut self,
        var: &crate::ast::Ident,
        start: &Expr,
        end: &Expr,
        step: &Expr,
        body: &Block,
    ) -> LowerResult<()> {
        let (start_val, start_ty) = self.lower_expr(start)?;
        let var_ty = match &start_ty {
            IrType::Bool => IrType::I64,
            ty => (*ty).clone(),
        };
        let start_val = self.coerce(start_val, &start_ty, &var_ty, start.span)?;

        let slot = self.builder.alloca(var_ty.clone());
        self.builder.store(slot, start_val);

        let cond_block = self.builder.create_block();
        let body_block = self.builder.create_block();
        let step_block = self.builder.create_block();
        let exit_block = self.builder.create_block();

        self.builder.br(cond_block);

        // Condition: var < end
        self.builder.start_block_labeled(cond_block, "for.cond");
        let current = self.builder.load(slot);
        let (end_val, end_ty) = self.lower_expr(end)?;
        let (lhs, rhs, unified) =
            self.unify_numeric(current, &var_ty, end_val, &end_ty, end.span)?;
        let flag = match unified {
            IrType::F64 => self.builder.fcmp(CmpOp::Slt, lhs, rhs),
            _ => self.builder.icmp(CmpOp::Slt, lhs, rhs),
        };
        self.builder.cond_br(flag, body_block, exit_block);

        // Body, with the loop variable in its own scope
        self.builder.start_block_labeled(body_block, "for.body");
        self.enter_scope();
        self.declare(&var.name, slot, var_ty.clone(), var.span)?;
        self.loop_stack.push(LoopContext {
            exit_block,
            continue_block: step_block,
        });
        for stmt in &body.stmts {
            self.lower_stmt(stmt)?;
        }
        self.loop_stack.pop();
        self.exit_scope();
        self.builder.br(step_block);

        // Increment: var = var + step
        self.builder.start_block_labeled(step_block, "for.step");
        let current = self.builder.load(slot);
        let (step_val, step_ty) = self.lower_expr(step)?;
        let step_val = self.coerce(step_val, &step_ty, &var_ty, step.span)?;
        let next = match var_ty {
            IrType::F64 => self.builder.fadd(current, step_val),
            _ => self.builder.add(current, step_val),
        };
        self.builder.store(slot, next);
        self.builder.br(cond_block);

        self.builder.start_block_labeled(exit_block, "for.end");
        Ok(())
    }

    fn lower_return(&mut self, value: Option<&Expr>, span: Span) -> LowerResult<()> {
        match (value, self.ret_type.clone()) {
            (None, IrType::Void) => {
                self.builder.ret(None);
                Ok(())
            }
            (None, ty) => Err(LowerError::type_mismatch(
                format!("function returns {} but `return` has no value", ty),
                span,
            )),
            (Some(expr), IrType::Void) => Err(LowerError::type_mismatch(
                "void function cannot return a value",
                expr.span,
            )),
            (Some(expr), ret_ty) => {
                let (v, v_ty) = self.lower_expr(expr)?;
                let v = self.coerce(v, &v_ty, &ret_ty, expr.span)?;
                self.builder.ret(Some(v));
                Ok(())
            }
        }
    }

    // ============ Expression Lowering ============

    fn lower_expr(&mut self, expr: &Expr) -> LowerResult<(VReg, IrType)> {
        match &expr.kind {
            ExprKind::Number(Number::Int(v)) => Ok((self.builder.const_int(*v), IrType::I64)),
            ExprKind::Number(Number::Float(v)) => Ok((self.builder.const_float(*v), IrType::F64)),
            ExprKind::Variable(ident) => {
                let local = self
                    .lookup(&ident.name)
                    .ok_or_else(|| LowerError::UnknownIdentifier {
                        name: ident.name.clone(),
                        span: ident.span,
                    })?
                    .clone();
                let value = self.builder.load(local.slot);
                Ok((value, local.ty))
            }
            ExprKind::Assign { name, value } => {
                let (v, v_ty) = self.lower_expr(value)?;
                let local = self
                    .lookup(&name.name)
                    .ok_or_else(|| LowerError::UnknownIdentifier {
                        name: name.name.clone(),
                        span: name.span,
                    })?
                    .clone();
                let v = self.coerce(v, &v_ty, &local.ty, value.span)?;
                self.builder.store(local.slot, v);
                // Assignment yields the stored value
                Ok((v, local.ty))
            }
            ExprKind::Binary { op, left, right } => self.lower_binary(*op, left, right, expr.span),
            ExprKind::Unary { op, operand } => self.lower_unary(*op, operand, expr.span),
            ExprKind::Call { callee, args } => {
                let (value, ty) = self.lower_call(expr.span, &callee.name, args)?;
                match value {
                    Some(v) => Ok((v, ty)),
                    None => Err(LowerError::type_mismatch(
                        format!("void function `{}` used as a value", callee.name),
                        expr.span,
                    )),
                }
            }
        }
    }

    fn lower_binary(
        &mut self,
        op: BinaryOp,
        left: &Expr,
        right: &Expr,
        span: Span,
    ) -> LowerResult<(VReg, IrType)> {
        let (lhs, lhs_ty) = self.lower_expr(left)?;
        let (rhs, rhs_ty) = self.lower_expr(right)?;
        let (lhs, rhs, ty) = self.unify_numeric(lhs, &lhs_ty, rhs, &rhs_ty, span)?;

        if op.is_comparison() {
            let cmp = cmp_op(op);
            let result = match ty {
                IrType::F64 => self.builder.fcmp(cmp, lhs, rhs),
                _ => self.builder.icmp(cmp, lhs, rhs),
            };
            return Ok((result, IrType::Bool));
        }

        let result = match (op, &ty) {
            (BinaryOp::Add, IrType::F64) => self.builder.fadd(lhs, rhs),
            (BinaryOp::Sub, IrType::F64) => self.builder.fsub(lhs, rhs),
            (BinaryOp::Mul, IrType::F64) => self.builder.fmul(lhs, rhs),
            (BinaryOp::Div, IrType::F64) => self.builder.fdiv(lhs, rhs),
            (BinaryOp::Rem, IrType::F64) => {
                return Err(LowerError::type_mismatch(
                    "`%` is only defined for integers",
                    span,
                ))
            }
            (BinaryOp::Add, _) => self.builder.add(lhs, rhs),
            (BinaryOp::Sub, _) => self.builder.sub(lhs, rhs),
            (BinaryOp::Mul, _) => self.builder.mul(lhs, rhs),
            (BinaryOp::Div, _) => self.builder.sdiv(lhs, rhs),
            (BinaryOp::Rem, _) => self.builder.srem(lhs, rhs),
            _ => unreachable!("comparisons handled above"),
        };
        Ok((result, ty))
    }

    fn lower_unary(
        &mut self,
        op: UnaryOp,
        operand: &Expr,
        span: Span,
    ) -> LowerResult<(VReg, IrType)> {
        let (value, ty) = self.lower_expr(operand)?;
        match op {
            UnaryOp::Neg => match ty {
                IrType::F64 => Ok((self.builder.fneg(value), IrType::F64)),
                IrType::I64 => Ok((self.builder.neg(value), IrType::I64)),
                IrType::Bool => {
                    let wide = self.builder.zext(value, IrType::I64);
                    Ok((self.builder.neg(wide), IrType::I64))
                }
                other => Err(LowerError::type_mismatch(
                    format!("cannot negate a value of type {}", other),
                    span,
                )),
            },
            UnaryOp::Not => {
                // !x is x == 0
                let flag = match ty {
                    IrType::Bool => {
                        let wide = self.builder.zext(value, IrType::I64);
                        let zero = self.builder.const_int(0);
                        self.builder.icmp(CmpOp::Eq, wide, zero)
                    }
                    IrType::I64 => {
                        let zero = self.builder.const_int(0);
                        self.builder.icmp(CmpOp::Eq, value, zero)
                    }
                    IrType::F64 => {
                        let zero = self.builder.const_float(0.0);
                        self.builder.fcmp(CmpOp::Eq, value, zero)
                    }
                    other => {
                        return Err(LowerError::type_mismatch(
                            format!("cannot apply `!` to a value of type {}", other),
                            span,
                        ))
                    }
                };
                Ok((flag, IrType::Bool))
            }
        }
    }

    fn lower_call(
        &mut self,
        span: Span,
        name: &str,
        args: &[Expr],
    ) -> LowerResult<(Option<VReg>, IrType)> {
        let sig = self
            .signatures
            .get(name)
            .ok_or_else(|| LowerError::UnknownFunction {
                name: name.to_string(),
                span,
            })?
            .clone();

        // Arity is checked before any argument is lowered, so a bad call
        // site emits no argument code at all.
        if sig.params.len() != args.len() {
            return Err(LowerError::ArityMismatch {
                name: name.to_string(),
                expected: sig.params.len(),
                found: args.len(),
                span,
            });
        }

        let mut arg_vregs = Vec::with_capacity(args.len());
        for (arg, param_ty) in args.iter().zip(&sig.params) {
            let (v, v_ty) = self.lower_expr(arg)?;
            arg_vregs.push(self.coerce(v, &v_ty, param_ty, arg.span)?);
        }

        if sig.ret == IrType::Void {
            self.builder.call_void(name, arg_vregs);
            Ok((None, IrType::Void))
        } else {
            let result = self.builder.call(name, arg_vregs);
            Ok((Some(result), sig.ret))
        }
    }

    // ============ Coercions ============

    /// Convert a value to the requested numeric type
    fn coerce(&mut self, v: VReg, from: &IrType, to: &IrType, span: Span) -> LowerResult<VReg> {
        if from == to {
            return Ok(v);
        }
        match (from, to) {
            (IrType::I64, IrType::F64) => Ok(self.builder.sitofp(v, IrType::F64)),
            (IrType::F64, IrType::I64) => Ok(self.builder.fptosi(v, IrType::I64)),
            (IrType::Bool, IrType::I64) => Ok(self.builder.zext(v, IrType::I64)),
            (IrType::Bool, IrType::F64) => {
                let wide = self.builder.zext(v, IrType::I64);
                Ok(self.builder.sitofp(wide, IrType::F64))
            }
            _ => Err(LowerError::type_mismatch(
                format!("cannot convert {} to {}", from, to),
                span,
            )),
        }
    }

    /// Bring two numeric operands to a common type. Mixed int/double
    /// arithmetic promotes the integer side to double.
    fn unify_numeric(
        &mut self,
        lhs: VReg,
        lhs_ty: &IrType,
        rhs: VReg,
        rhs_ty: &IrType,
        span: Span,
    ) -> LowerResult<(VReg, VReg, IrType)> {
        let target = match (lhs_ty, rhs_ty) {
            (IrType::F64, _) | (_, IrType::F64) => IrType::F64,
            _ => IrType::I64,
        };
        let lhs = self.coerce(lhs, lhs_ty, &target, span)?;
        let rhs = self.coerce(rhs, rhs_ty, &target, span)?;
        Ok((lhs, rhs, target))
    }

    /// Convert a value to a branch flag: non-zero is true
    fn truthy(&mut self, v: VReg, ty: &IrType, span: Span) -> LowerResult<VReg> {
        match ty {
            IrType::Bool => Ok(v),
            IrType::I64 => {
                let zero = self.builder.const_int(0);
                Ok(self.builder.icmp(CmpOp::Ne, v, zero))
            }
            IrType::F64 => {
                let zero = self.builder.const_float(0.0);
                Ok(self.builder.fcmp(CmpOp::Ne, v, zero))
            }
            other => Err(LowerError::type_mismatch(
                format!("cannot branch on a value of type {}", other),
                span,
            )),
        }
    }
}

fn ir_type(ty: TypeName) -> IrType {
    match ty {
        TypeName::Int => IrType::I64,
        TypeName::Double => IrType::F64,
        TypeName::Void => IrType::Void,
    }
}

fn cmp_op(op: BinaryOp) -> CmpOp {
    match op {
        BinaryOp::Eq => CmpOp::Eq,
        BinaryOp::Ne => CmpOp::Ne,
        BinaryOp::Lt => CmpOp::Slt,
        BinaryOp::Le => CmpOp::Sle,
        BinaryOp::Gt => CmpOp::Sgt,
        BinaryOp::Ge => CmpOp::Sge,
        _ => unreachable!("not a comparison operator"),
    }
}

/// Lower a parsed program into an IR module
pub fn lower(program: &Program, module_name: impl Into<String>) -> LowerResult<Module> {
    Lowerer::new(module_name).lower_program(program)
}
