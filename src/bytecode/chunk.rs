//! Bytecode chunk: the ordered instruction list of one compiled program.

use std::fmt;

use crate::bytecode::instruction::Instruction;

/// A compiled program with the source line of each instruction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Chunk {
    /// The instructions, in execution order.
    pub code: Vec<Instruction>,
    /// Source line of each instruction (0 when unknown).
    pub lines: Vec<usize>,
}

impl Chunk {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a chunk from instructions without line information.
    pub fn from_instructions(code: Vec<Instruction>) -> Self {
        let lines = vec![0; code.len()];
        Self { code, lines }
    }

    /// Append an instruction to the chunk.
    pub fn write(&mut self, instruction: Instruction, line: usize) {
        self.code.push(instruction);
        self.lines.push(line);
    }

    pub fn len(&self) -> usize {
        self.code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Instruction> {
        self.code.iter()
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.code
    }

    /// Get the line number at a given offset.
    pub fn get_line(&self, offset: usize) -> usize {
        self.lines.get(offset).copied().unwrap_or(0)
    }
}

/// Wire text: one instruction per line.
impl fmt::Display for Chunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for instruction in &self.code {
            writeln!(f, "{}", instruction)?;
        }
        Ok(())
    }
}
