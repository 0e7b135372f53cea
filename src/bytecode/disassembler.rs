//! Instruction text in both directions: parsing wire text into a chunk and
//! an annotated listing for debugging.

use std::collections::HashMap;
use std::fmt;

use crate::bytecode::chunk::Chunk;
use crate::bytecode::instruction::{Instruction, OpCode};
use crate::error::AssembleError;

/// Parse wire text, one instruction per line.
///
/// Blank lines and lines starting with `#` are skipped. The chunk records
/// the 1-based text line of every instruction.
pub fn assemble(text: &str) -> Result<Chunk, AssembleError> {
    let mut chunk = Chunk::new();
    for (index, raw) in text.lines().enumerate() {
        let line = index + 1;
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let instruction = Instruction::parse(trimmed).map_err(|e| e.with_line(line))?;
        chunk.write(instruction, line);
    }
    tracing::debug!(instructions = chunk.len(), "assembled program text");
    Ok(chunk)
}

/// Disassemble a chunk into a human-readable listing.
pub fn disassemble(chunk: &Chunk, name: &str) -> String {
    Listing { chunk, name }.to_string()
}

/// Print the listing of a chunk to stdout.
pub fn print_disassembly(chunk: &Chunk, name: &str) {
    print!("{}", disassemble(chunk, name));
}

struct Listing<'a> {
    chunk: &'a Chunk,
    name: &'a str,
}

impl fmt::Display for Listing<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "== {} ==", self.name)?;

        let labels: HashMap<&str, usize> = self
            .chunk
            .iter()
            .enumerate()
            .filter(|(_, i)| i.opcode == OpCode::Label)
            .filter_map(|(offset, i)| i.operand.as_deref().map(|name| (name, offset)))
            .collect();

        for (offset, instruction) in self.chunk.iter().enumerate() {
            write!(f, "{:04} ", offset)?;

            // Print line number (or | if same as previous)
            let line = self.chunk.get_line(offset);
            if offset > 0 && line == self.chunk.get_line(offset - 1) {
                write!(f, "   | ")?;
            } else {
                write!(f, "{:4} ", line)?;
            }

            match instruction.opcode {
                OpCode::Jmp | OpCode::Fjmp => {
                    let target = instruction
                        .operand
                        .as_deref()
                        .and_then(|label| labels.get(label));
                    let text = instruction.to_string();
                    match target {
                        Some(target) => writeln!(f, "{:<20} -> {:04}", text, target)?,
                        None => writeln!(f, "{:<20} -> ????", text)?,
                    }
                }
                _ => writeln!(f, "{}", instruction)?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bytecode::instruction::Kind;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_assemble_skips_blanks_and_comments() {
        let chunk = assemble("# counter\n\npush i 1\n  save i n  \n").unwrap();
        assert_eq!(
            chunk.code,
            vec![Instruction::push(Kind::Int, "1"), Instruction::save(Kind::Int, "n")]
        );
        assert_eq!(chunk.lines, vec![3, 4]);
    }

    #[test]
    fn test_assemble_reports_line() {
        let err = assemble("push i 1\n\nfrobnicate\n").unwrap_err();
        assert_eq!(
            err,
            AssembleError::UnknownOpcode {
                line: 3,
                opcode: "frobnicate".to_string()
            }
        );
    }

    #[test]
    fn test_text_roundtrip() {
        let text = "push s \"a \\\"quoted\\\" word\"\nsave s w\nlabel L0\nload s w\nprint 1\n";
        let chunk = assemble(text).unwrap();
        assert_eq!(chunk.to_string(), text);
    }

    #[test]
    fn test_listing_resolves_jumps() {
        let chunk = assemble("label L0\npush b false\nfjmp L0\njmp L9\n").unwrap();
        let listing = disassemble(&chunk, "loop");
        let lines: Vec<&str> = listing.lines().collect();
        assert_eq!(lines[0], "== loop ==");
        assert_eq!(lines[1], "0000    1 label L0");
        assert!(lines[3].ends_with("-> 0000"));
        assert!(lines[4].ends_with("-> ????"));
    }
}
