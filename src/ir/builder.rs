//! IR Builder
//!
//! Helper for constructing IR instructions and basic blocks. This is the
//! only interface code generation uses to emit IR: callers obtain fresh
//! registers and block labels, append instructions at an insertion point,
//! and seal blocks with terminators.

use super::instr::{CmpOp, Instruction, InstrKind, Terminator};
use super::types::{BasicBlock, BlockId, Constant, Function, IrType, Module, VReg};

/// Builder for constructing IR
pub struct IrBuilder {
    /// Next virtual register ID
    next_vreg: u32,
    /// Next block ID
    next_block: u32,
    /// Current module being built
    module: Module,
    /// Current function being built
    current_fn: Option<Function>,
    /// Current block being built
    current_block: Option<BasicBlock>,
}

impl IrBuilder {
    /// Create a new IR builder
    pub fn new(module_name: impl Into<String>) -> Self {
        Self {
            next_vreg: 0,
            next_block: 0,
            module: Module::new(module_name),
            current_fn: None,
            current_block: None,
        }
    }

    /// Finish building and return the module
    pub fn finish(mut self) -> Module {
        self.finish_function();
        self.module
    }

    /// Create a fresh virtual register
    pub fn fresh_vreg(&mut self) -> VReg {
        let vreg = VReg(self.next_vreg);
        self.next_vreg += 1;
        vreg
    }

    /// Create a fresh block ID
    pub fn fresh_block(&mut self) -> BlockId {
        let id = BlockId(self.next_block);
        self.next_block += 1;
        id
    }

    // ============ Function Building ============

    /// Start building a new function; returns the parameter vregs
    pub fn start_function(
        &mut self,
        name: impl Into<String>,
        params: Vec<IrType>,
        ret_type: IrType,
    ) -> Vec<VReg> {
        self.finish_function();

        let param_vregs: Vec<(VReg, IrType)> = params
            .into_iter()
            .map(|ty| (self.fresh_vreg(), ty))
            .collect();
        let vregs: Vec<VReg> = param_vregs.iter().map(|(v, _)| *v).collect();

        self.current_fn = Some(Function::new(name, param_vregs, ret_type));

        // Entry block
        let entry = self.fresh_block();
        self.current_block = Some(BasicBlock::new(entry).with_label("entry"));

        vregs
    }

    /// Finish the current function
    pub fn finish_function(&mut self) {
        if let Some(block) = self.current_block.take() {
            if let Some(ref mut func) = self.current_fn {
                func.blocks.push(block);
            }
        }
        if let Some(func) = self.current_fn.take() {
            self.module.functions.push(func);
        }
    }

    // ============ Block Building ============

    /// Create a new block and return its ID
    pub fn create_block(&mut self) -> BlockId {
        self.fresh_block()
    }

    /// Start building a block (finishes current block first)
    pub fn start_block(&mut self, id: BlockId) {
        if let Some(block) = self.current_block.take() {
            if let Some(ref mut func) = self.current_fn {
                func.blocks.push(block);
            }
        }
        self.current_block = Some(BasicBlock::new(id));
    }

    /// Start building a block with a readable label
    pub fn start_block_labeled(&mut self, id: BlockId, label: impl Into<String>) {
        self.start_block(id);
        if let Some(ref mut block) = self.current_block {
            block.label = Some(label.into());
        }
    }

    /// Get the current block ID
    pub fn current_block_id(&self) -> Option<BlockId> {
        self.current_block.as_ref().map(|b| b.id)
    }

    /// Has the current block already been sealed with a terminator?
    pub fn is_terminated(&self) -> bool {
        self.current_block
            .as_ref()
            .map(|b| b.terminator.is_some())
            .unwrap_or(true)
    }

    // ============ Instruction Emission ============

    fn emit(&mut self, result: Option<VReg>, kind: InstrKind) -> Option<VReg> {
        if let Some(ref mut block) = self.current_block {
            // Nothing may follow a terminator
            if block.terminator.is_none() {
                block.instructions.push(Instruction::new(result, kind));
            }
        }
        result
    }

    fn emit_with_result(&mut self, kind: InstrKind) -> VReg {
        let result = self.fresh_vreg();
        self.emit(Some(result), kind);
        result
    }

    // ============ Constants ============

    /// Emit an integer constant (i64)
    pub fn const_int(&mut self, value: i64) -> VReg {
        self.emit_with_result(InstrKind::Const(Constant::Int(value)))
    }

    /// Emit a float constant
    pub fn const_float(&mut self, value: f64) -> VReg {
        self.emit_with_result(InstrKind::Const(Constant::Float(value)))
    }

    /// Emit a boolean constant
    pub fn const_bool(&mut self, value: bool) -> VReg {
        self.emit_with_result(InstrKind::Const(Constant::Bool(value)))
    }

    // ============ Arithmetic ============

    pub fn add(&mut self, a: VReg, b: VReg) -> VReg {
        self.emit_with_result(InstrKind::Add(a, b))
    }

    pub fn sub(&mut self, a: VReg, b: VReg) -> VReg {
        self.emit_with_result(InstrKind::Sub(a, b))
    }

    pub fn mul(&mut self, a: VReg, b: VReg) -> VReg {
        self.emit_with_result(InstrKind::Mul(a, b))
    }

    pub fn sdiv(&mut self, a: VReg, b: VReg) -> VReg {
        self.emit_with_result(InstrKind::SDiv(a, b))
    }

    pub fn srem(&mut self, a: VReg, b: VReg) -> VReg {
        self.emit_with_result(InstrKind::SRem(a, b))
    }

    pub fn neg(&mut self, v: VReg) -> VReg {
        self.emit_with_result(InstrKind::Neg(v))
    }

    pub fn fadd(&mut self, a: VReg, b: VReg) -> VReg {
        self.emit_with_result(InstrKind::FAdd(a, b))
    }

    pub fn fsub(&mut self, a: VReg, b: VReg) -> VReg {
        self.emit_with_result(InstrKind::FSub(a, b))
    }

    pub fn fmul(&mut self, a: VReg, b: VReg) -> VReg {
        self.emit_with_result(InstrKind::FMul(a, b))
    }

    pub fn fdiv(&mut self, a: VReg, b: VReg) -> VReg {
        self.emit_with_result(InstrKind::FDiv(a, b))
    }

    pub fn fneg(&mut self, v: VReg) -> VReg {
        self.emit_with_result(InstrKind::FNeg(v))
    }

    // ============ Comparison ============

    pub fn icmp(&mut self, op: CmpOp, a: VReg, b: VReg) -> VReg {
        self.emit_with_result(InstrKind::ICmp(op, a, b))
    }

    pub fn fcmp(&mut self, op: CmpOp, a: VReg, b: VReg) -> VReg {
        self.emit_with_result(InstrKind::FCmp(op, a, b))
    }

    // ============ Conversions ============

    /// Signed integer to floating point
    pub fn sitofp(&mut self, v: VReg, ty: IrType) -> VReg {
        self.emit_with_result(InstrKind::SIToFP(v, ty))
    }

    /// Floating point to signed integer
    pub fn fptosi(&mut self, v: VReg, ty: IrType) -> VReg {
        self.emit_with_result(InstrKind::FPToSI(v, ty))
    }

    /// Zero extend (bool to integer)
    pub fn zext(&mut self, v: VReg, ty: IrType) -> VReg {
        self.emit_with_result(InstrKind::ZExt(v, ty))
    }

    // ============ Memory ============

    pub fn alloca(&mut self, ty: IrType) -> VReg {
        self.emit_with_result(InstrKind::Alloca(ty))
    }

    pub fn load(&mut self, ptr: VReg) -> VReg {
        self.emit_with_result(InstrKind::Load(ptr))
    }

    pub fn store(&mut self, ptr: VReg, value: VReg) {
        self.emit(None, InstrKind::Store(ptr, value));
    }

    // ============ Calls ============

    pub fn call(&mut self, func: impl Into<String>, args: Vec<VReg>) -> VReg {
        self.emit_with_result(InstrKind::Call {
            func: func.into(),
            args,
        })
    }

    pub fn call_void(&mut self, func: impl Into<String>, args: Vec<VReg>) {
        self.emit(
            None,
            InstrKind::Call {
                func: func.into(),
                args,
            },
        );
    }

    // ============ Terminators ============

    pub fn ret(&mut self, value: Option<VReg>) {
        if let Some(ref mut block) = self.current_block {
            if block.terminator.is_none() {
                block.terminator = Some(Terminator::Ret(value));
            }
        }
    }

    pub fn br(&mut self, target: BlockId) {
        if let Some(ref mut block) = self.current_block {
            if block.terminator.is_none() {
                block.terminator = Some(Terminator::Br(target));
            }
        }
    }

    pub fn cond_br(&mut self, cond: VReg, then_block: BlockId, else_block: BlockId) {
        if let Some(ref mut block) = self.current_block {
            if block.terminator.is_none() {
                block.terminator = Some(Terminator::CondBr {
                    cond,
                    then_block,
                    else_block,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_vregs_are_distinct() {
        let mut builder = IrBuilder::new("test");
        let a = builder.fresh_vreg();
        let b = builder.fresh_vreg();
        assert_ne!(a, b);
    }

    #[test]
    fn test_function_has_entry_block() {
        let mut builder = IrBuilder::new("test");
        let params = builder.start_function("f", vec![IrType::I64], IrType::I64);
        assert_eq!(params.len(), 1);
        builder.ret(Some(params[0]));

        let module = builder.finish();
        let func = module.function("f").expect("f should exist");
        assert_eq!(func.blocks.len(), 1);
        assert!(matches!(
            func.entry_block().unwrap().terminator,
            Some(Terminator::Ret(Some(_)))
        ));
    }

    #[test]
    fn test_no_instructions_after_terminator() {
        let mut builder = IrBuilder::new("test");
        builder.start_function("f", vec![], IrType::I64);
        let v = builder.const_int(1);
        builder.ret(Some(v));
        // Emission after sealing is dropped
        builder.const_int(2);
        assert!(builder.is_terminated());

        let module = builder.finish();
        let func = module.function("f").unwrap();
        assert_eq!(func.entry_block().unwrap().instructions.len(), 1);
    }

    #[test]
    fn test_blocks_kept_in_creation_order() {
        let mut builder = IrBuilder::new("test");
        builder.start_function("f", vec![], IrType::Void);
        let next = builder.create_block();
        builder.br(next);
        builder.start_block(next);
        builder.ret(None);

        let module = builder.finish();
        let func = module.function("f").unwrap();
        assert_eq!(func.blocks.len(), 2);
        assert_eq!(func.blocks[1].id, next);
    }
}
