//! stacklang: a typed stack-machine backend for a small imperative language.
//!
//! This is the library root that exports all modules.
//!
//! # Pipeline
//!
//! - **Type checking** builds the symbol table and rejects ill-typed trees
//! - **Code generation** lowers the checked tree into a [`bytecode::Chunk`]
//! - **Wire text** serializes a chunk one instruction per line and parses it back
//! - **Execution** runs an instruction list on the stack machine

#![allow(clippy::result_large_err)]

pub mod ast;
pub mod bytecode;
pub mod error;
pub mod span;
pub mod types;

use std::io::{BufRead, Write};

use bytecode::{Chunk, VmConfig};
use error::{StackLangError, TypeError, TypeErrors};
use types::{TypeEnvironment, TypeOracle};

/// Options for the run entry points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Write a disassembly listing to the output before running.
    pub disassemble: bool,
    /// Virtual machine tunables.
    pub vm: VmConfig,
}

/// Type check a program, returning its symbol table.
pub fn type_check(program: &ast::Program) -> Result<TypeEnvironment, Vec<TypeError>> {
    let mut checker = types::TypeChecker::new();
    checker.check(program)?;
    Ok(checker.into_environment())
}

/// Type check and compile a program.
pub fn compile(program: &ast::Program) -> Result<Chunk, StackLangError> {
    let env = type_check(program).map_err(TypeErrors)?;
    Ok(compile_with(program, &env)?)
}

/// Compile a program against an already built type oracle.
pub fn compile_with<O: TypeOracle + ?Sized>(
    program: &ast::Program,
    oracle: &O,
) -> Result<Chunk, error::CompileError> {
    bytecode::Compiler::new(oracle).compile(program)
}

/// Check, compile and run a program.
pub fn run_program<R: BufRead, W: Write>(
    program: &ast::Program,
    input: R,
    output: W,
    options: RunOptions,
) -> Result<(), StackLangError> {
    let chunk = compile(program)?;
    run_chunk(&chunk, input, output, options)
}

/// Parse instruction text and run it.
pub fn run_text<R: BufRead, W: Write>(
    text: &str,
    input: R,
    output: W,
    options: RunOptions,
) -> Result<(), StackLangError> {
    let chunk = bytecode::assemble(text)?;
    run_chunk(&chunk, input, output, options)
}

/// Run a compiled chunk.
pub fn run_chunk<R: BufRead, W: Write>(
    chunk: &Chunk,
    input: R,
    mut output: W,
    options: RunOptions,
) -> Result<(), StackLangError> {
    // Optionally print disassembly
    if options.disassemble {
        write!(output, "{}", disassemble(chunk))?;
        writeln!(output, "---")?;
    }

    let mut vm = bytecode::VM::with_config(input, output, options.vm);
    vm.run_chunk(chunk)?;
    Ok(())
}

/// Disassemble a compiled chunk to a string.
pub fn disassemble(chunk: &Chunk) -> String {
    bytecode::disassemble(chunk, "program")
}
