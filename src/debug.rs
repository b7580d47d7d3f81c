//! Human-readable rendering of bytecode.

use std::fmt;

use crate::chunk::Chunk;
use crate::opcode::OpCode;

/// A whole chunk, one instruction per line under a `== name ==` header.
pub struct Disassembly<'c> {
	chunk: &'c Chunk,
	name: &'c str,
}

impl<'c> Disassembly<'c> {
	pub fn new(chunk: &'c Chunk, name: &'c str) -> Self {
		Disassembly { chunk, name }
	}
}

impl fmt::Display for Disassembly<'_> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		writeln!(f, "== {} ==", self.name)?;
		let mut offset = 0;
		while offset < self.chunk.len() {
			let instruction = Instruction::new(self.chunk, offset);
			writeln!(f, "{instruction}")?;
			offset = instruction.next_offset();
		}
		Ok(())
	}
}

/// The instruction starting at `offset`.
pub struct Instruction<'c> {
	chunk: &'c Chunk,
	offset: usize,
}

impl<'c> Instruction<'c> {
	pub fn new(chunk: &'c Chunk, offset: usize) -> Self {
		Instruction { chunk, offset }
	}

	pub fn opcode(&self) -> Option<OpCode> {
		self.chunk.byte(self.offset).and_then(|byte| OpCode::try_from(byte).ok())
	}

	/// Offset of the instruction after this one.
	pub fn next_offset(&self) -> usize {
		self.offset + 1 + self.opcode().map_or(0, OpCode::operand_len)
	}

	fn operand(&self, n: usize) -> Option<u8> {
		self.chunk.byte(self.offset + 1 + n)
	}

	fn write_constant(&self, f: &mut fmt::Formatter<'_>, index: u8) -> fmt::Result {
		match self.chunk.constant(index as usize) {
			Some(value) => write!(f, "'{value}'"),
			None => f.write_str("<no such constant>"),
		}
	}
}

impl fmt::Display for Instruction<'_> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let offset = self.offset;
		write!(f, "{offset:04} ")?;

		let line = self.chunk.line(offset);
		if offset > 0 && line == self.chunk.line(offset - 1) {
			f.write_str("   | ")?;
		} else {
			match line {
				Some(line) => write!(f, "{line:4} ")?,
				None => f.write_str("   ? ")?,
			}
		}

		let Some(byte) = self.chunk.byte(offset) else {
			return f.write_str("<past end of chunk>");
		};
		let Ok(op) = OpCode::try_from(byte) else {
			return write!(f, "Unknown opcode {byte}");
		};
		let name = op.name();

		if op.operand_len() > 0 && self.operand(op.operand_len() - 1).is_none() {
			return write!(f, "{name:<16} <truncated>");
		}

		match op {
			OpCode::Constant
			| OpCode::GetGlobal
			| OpCode::DefineGlobal
			| OpCode::SetGlobal
			| OpCode::GetProperty
			| OpCode::SetProperty
			| OpCode::Closure
			| OpCode::Class
			| OpCode::Method => {
				let index = self.operand(0).unwrap_or_default();
				write!(f, "{name:<16} {index:4} ")?;
				self.write_constant(f, index)
			}
			OpCode::GetLocal
			| OpCode::SetLocal
			| OpCode::GetUpvalue
			| OpCode::SetUpvalue
			| OpCode::Call => {
				let slot = self.operand(0).unwrap_or_default();
				write!(f, "{name:<16} {slot:4}")
			}
			OpCode::Jump | OpCode::JumpIfFalse | OpCode::Loop => {
				let high = self.operand(0).unwrap_or_default();
				let low = self.operand(1).unwrap_or_default();
				let jump = i64::from(u16::from_be_bytes([high, low]));
				let sign = if op == OpCode::Loop { -1 } else { 1 };
				let target = offset as i64 + 3 + sign * jump;
				write!(f, "{name:<16} {offset:4} -> {target}")
			}
			OpCode::Invoke => {
				let index = self.operand(0).unwrap_or_default();
				let args = self.operand(1).unwrap_or_default();
				write!(f, "{name:<16} ({args} args) {index:4} ")?;
				self.write_constant(f, index)
			}
			_ => f.write_str(name),
		}
	}
}
