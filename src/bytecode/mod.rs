//! Bytecode module: instruction set, code generator and virtual machine.
//!
//! # Architecture
//!
//! - `instruction`: opcodes, type suffixes and the textual wire format
//! - `value`: tagged runtime values
//! - `chunk`: the instruction list of one compiled program
//! - `compiler`: lowers a checked syntax tree into a chunk
//! - `vm`: label resolution and typed execution
//! - `disassembler`: wire text parsing and debug listings

pub mod chunk;
pub mod compiler;
pub mod disassembler;
pub mod instruction;
pub mod value;
pub mod vm;

#[cfg(test)]
mod tests;

pub use chunk::Chunk;
pub use compiler::{CompileResult, Compiler};
pub use disassembler::{assemble, disassemble, print_disassembly};
pub use instruction::{Instruction, Kind, OpCode};
pub use value::Value;
pub use vm::{VMResult, VmConfig, VM};
