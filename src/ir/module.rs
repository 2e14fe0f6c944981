
use std::fmt::Write as _;

use rustc_hash::FxHashMap;

use crate::symbol::nstring::NString;

use super::inst::Instruction;
use super::value::ValueRef;

/// A named, ordered instruction sequence with explicit successor and
/// predecessor edges. The last instruction must be the only terminator.
pub struct BasicBlock {
  name: NString,
  insts: Vec<ValueRef>,
  successors: Vec<NString>,
  predecessors: Vec<NString>,
}

impl BasicBlock {
  pub fn new(name: impl Into<NString>) -> Self {
    BasicBlock {
      name: name.into(),
      insts: Vec::new(),
      successors: Vec::new(),
      predecessors: Vec::new(),
    }
  }

  /// Appends an instruction value. Panics on non-instruction values since
  /// blocks hold instructions only.
  pub fn push(&mut self, inst: ValueRef) {
    assert!(inst.as_inst().is_some(), "basic blocks hold instructions only");
    self.insts.push(inst);
  }

  pub fn add_successor(&mut self, name: impl Into<NString>) {
    self.successors.push(name.into());
  }

  pub fn add_predecessor(&mut self, name: impl Into<NString>) {
    self.predecessors.push(name.into());
  }

  pub fn name(&self) -> NString {
    self.name
  }

  pub fn instructions(&self) -> &[ValueRef] {
    &self.insts
  }

  pub fn successors(&self) -> &[NString] {
    &self.successors
  }

  pub fn predecessors(&self) -> &[NString] {
    &self.predecessors
  }

  pub fn terminator(&self) -> Option<&Instruction> {
    self.insts.last().and_then(|v| v.as_inst()).filter(|i| i.opcode().is_terminator())
  }

  pub fn len(&self) -> usize {
    self.insts.len()
  }

  pub fn is_empty(&self) -> bool {
    self.insts.is_empty()
  }
}

/// A named, ordered list of blocks with a designated entry.
pub struct Function {
  name: NString,
  blocks: Vec<BasicBlock>,
  block_map: FxHashMap<NString, usize>,
  entry: Option<NString>,
}

impl Function {
  pub fn new(name: impl Into<NString>) -> Self {
    Function {
      name: name.into(),
      blocks: Vec::new(),
      block_map: FxHashMap::default(),
      entry: None,
    }
  }

  pub fn add_block(&mut self, block: BasicBlock) {
    if self.entry.is_none() {
      self.entry = Some(block.name());
    }
    self.block_map.insert(block.name(), self.blocks.len());
    self.blocks.push(block);
  }

  pub fn set_entry(&mut self, name: impl Into<NString>) {
    self.entry = Some(name.into());
  }

  pub fn name(&self) -> NString {
    self.name
  }

  pub fn entry(&self) -> Option<NString> {
    self.entry
  }

  pub fn entry_block(&self) -> Option<&BasicBlock> {
    self.entry.and_then(|name| self.block(name))
  }

  pub fn block(&self, name: impl Into<NString>) -> Option<&BasicBlock> {
    self.block_map.get(&name.into()).map(|i| &self.blocks[*i])
  }

  pub fn blocks(&self) -> &[BasicBlock] {
    &self.blocks
  }

  fn block_names_unique(&self) -> bool {
    self.block_map.len() == self.blocks.len()
  }
}

/// Owner of all IR objects for one translation unit. Destruction is
/// recursive through ownership; nothing leaks.
pub struct Module {
  name: NString,
  functions: Vec<Function>,
  func_map: FxHashMap<NString, usize>,
}

impl Module {
  pub fn new(name: impl Into<NString>) -> Self {
    Module { name: name.into(), functions: Vec::new(), func_map: FxHashMap::default() }
  }

  pub fn add_function(&mut self, function: Function) {
    self.func_map.insert(function.name(), self.functions.len());
    self.functions.push(function);
  }

  pub fn function(&self, name: impl Into<NString>) -> Option<&Function> {
    self.func_map.get(&name.into()).map(|i| &self.functions[*i])
  }

  pub fn functions(&self) -> &[Function] {
    &self.functions
  }

  pub fn name(&self) -> NString {
    self.name
  }

  /// Checks the structural invariants without mutating anything: at least
  /// one function, every function non-empty with an entry block that is a
  /// member, block names non-empty and unique within their function.
  pub fn validate(&self) -> bool {
    if self.functions.is_empty() {
      return false;
    }

    for func in &self.functions {
      if func.blocks.is_empty() {
        return false;
      }

      match func.entry {
        Some(entry) if func.block(entry).is_some() => {}
        _ => return false,
      }

      if !func.block_names_unique() {
        return false;
      }

      for bb in &func.blocks {
        if bb.name().is_empty() {
          return false;
        }
      }
    }

    true
  }

  /// Textual listing for debugging.
  pub fn dump(&self) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "module: {}", self.name);
    let _ = writeln!(out, "functions: {}", self.functions.len());

    for func in &self.functions {
      let _ = writeln!(out, "\n  function: {}", func.name());
      for bb in func.blocks() {
        let _ = writeln!(out, "    block: {}", bb.name());
        for inst_val in bb.instructions() {
          let inst = inst_val.as_inst().unwrap();
          let _ = write!(out, "      {inst:?}");
          if inst.loc().is_valid() {
            let _ = write!(out, "  ; {:?}", inst.loc());
          }
          let _ = writeln!(out);
        }
        if !bb.successors().is_empty() {
          let succs: Vec<_> = bb.successors().iter().map(|s| s.as_str()).collect();
          let _ = writeln!(out, "      successors: {}", succs.join(", "));
        }
      }
    }

    out
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::ir::inst::{Instruction, Opcode};
  use crate::ir::value::{SourceLocation, Value};

  fn ret_block(name: &str) -> BasicBlock {
    let mut bb = BasicBlock::new(name);
    bb.push(Value::inst(Instruction::new(Opcode::Ret, SourceLocation::invalid())));
    bb
  }

  #[test]
  fn validate_accepts_minimal_module() {
    let mut func = Function::new("f");
    func.add_block(ret_block("entry"));
    let mut module = Module::new("m");
    module.add_function(func);
    assert!(module.validate());
  }

  #[test]
  fn validate_rejects_empty_module() {
    assert!(!Module::new("m").validate());
  }

  #[test]
  fn validate_rejects_function_without_blocks() {
    let mut module = Module::new("m");
    module.add_function(Function::new("f"));
    assert!(!module.validate());
  }

  #[test]
  fn validate_rejects_dangling_entry() {
    let mut func = Function::new("f");
    func.add_block(ret_block("entry"));
    func.set_entry("nope");
    let mut module = Module::new("m");
    module.add_function(func);
    assert!(!module.validate());
  }

  #[test]
  fn validate_rejects_unnamed_block() {
    let mut func = Function::new("f");
    func.add_block(ret_block(""));
    let mut module = Module::new("m");
    module.add_function(func);
    assert!(!module.validate());
  }

  #[test]
  fn first_block_becomes_entry() {
    let mut func = Function::new("f");
    func.add_block(ret_block("a"));
    func.add_block(ret_block("b"));
    assert_eq!(func.entry(), Some(NString::from("a")));
  }

  #[test]
  fn terminator_is_last_instruction() {
    let bb = ret_block("entry");
    assert_eq!(bb.terminator().unwrap().opcode(), Opcode::Ret);
  }

  #[test]
  fn dump_mentions_blocks_and_locations() {
    let mut bb = BasicBlock::new("entry");
    let mut inst = Instruction::new(Opcode::Ret, SourceLocation::new("a.c", 3, 1));
    inst.add_operand(Value::int(0));
    bb.push(Value::inst(inst));
    let mut func = Function::new("f");
    func.add_block(bb);
    let mut module = Module::new("m");
    module.add_function(func);

    let text = module.dump();
    assert!(text.contains("block: entry"));
    assert!(text.contains("ret 0"));
    assert!(text.contains("a.c:3:1"));
  }
}
