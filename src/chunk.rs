use thiserror::Error;

use crate::array::DynArray;
use crate::debug::Disassembly;
use crate::gc::{Trace, Tracer};
use crate::memory::AllocError;
use crate::opcode::OpCode;
use crate::value::Value;

/// A `constant` operand is one byte wide.
pub const MAX_CONSTANTS: usize = u8::MAX as usize + 1;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChunkError {
	#[error(transparent)]
	Alloc(#[from] AllocError),
	#[error("constant index {0} does not fit in a one-byte operand")]
	TooManyConstants(usize),
}

/// An append-only unit of bytecode.
///
/// `code` and `lines` always have the same length: `lines[i]` is the source line
/// of the instruction that `code[i]` belongs to. Constant indices handed out by
/// [`Chunk::add_constant`] stay valid for the chunk's lifetime.
#[derive(Debug, Default)]
pub struct Chunk {
	code: DynArray<u8>,
	lines: DynArray<u32>,
	constants: DynArray<Value>,
}

impl Chunk {
	pub fn new() -> Self {
		Default::default()
	}

	/// Appends one byte. Nothing checks that it is a sensible opcode or operand.
	pub fn write(&mut self, byte: u8, line: u32) -> Result<(), AllocError> {
		self.reserve_code(1)?;
		self.code.push(byte)?;
		self.lines.push(line)
	}

	/// Grows `code` and `lines` before either is touched, so a failure leaves
	/// them in lockstep.
	fn reserve_code(&mut self, bytes: usize) -> Result<(), AllocError> {
		self.code.reserve(bytes)?;
		self.lines.reserve(bytes)
	}

	pub fn write_op(&mut self, op: OpCode, line: u32) -> Result<(), AllocError> {
		self.write(op.into(), line)
	}

	/// Adds `value` to the pool and returns its index. Equal values are not merged.
	pub fn add_constant(&mut self, value: Value) -> Result<usize, AllocError> {
		let index = self.constants.len();
		self.constants.push(value)?;
		Ok(index)
	}

	/// Adds `value` to the pool and emits `constant <index>`.
	///
	/// Either all of it lands or none of it does.
	pub fn write_constant(&mut self, value: Value, line: u32) -> Result<u8, ChunkError> {
		let index = self.constants.len();
		if index >= MAX_CONSTANTS {
			return Err(ChunkError::TooManyConstants(index));
		}
		self.constants.reserve(1)?;
		self.reserve_code(2)?;

		self.add_constant(value)?;
		self.write_op(OpCode::Constant, line)?;
		self.write(index as u8, line)?;
		Ok(index as u8)
	}

	/// Releases all storage. The chunk is empty afterwards.
	pub fn free(&mut self) {
		self.code.free();
		self.lines.free();
		self.constants.free();
	}

	pub fn len(&self) -> usize {
		self.code.len()
	}

	pub fn is_empty(&self) -> bool {
		self.code.is_empty()
	}

	pub fn code(&self) -> &[u8] {
		self.code.as_slice()
	}

	pub fn lines(&self) -> &[u32] {
		self.lines.as_slice()
	}

	pub fn constants(&self) -> &[Value] {
		self.constants.as_slice()
	}

	pub fn byte(&self, offset: usize) -> Option<u8> {
		self.code.get(offset)
	}

	pub fn line(&self, offset: usize) -> Option<u32> {
		self.lines.get(offset)
	}

	pub fn constant(&self, index: usize) -> Option<Value> {
		self.constants.get(index)
	}

	pub fn disassemble<'c>(&'c self, name: &'c str) -> Disassembly<'c> {
		Disassembly::new(self, name)
	}
}

/// Constants are roots while a compiler is still filling the chunk.
impl Trace for Chunk {
	fn trace<T: Tracer>(&self, tracer: &mut T) {
		for value in self.constants.iter() {
			value.trace(tracer);
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn new_chunk_is_empty() {
		let chunk = Chunk::new();
		assert!(chunk.is_empty());
		assert_eq!(chunk.code(), &[] as &[u8]);
		assert_eq!(chunk.lines(), &[] as &[u32]);
		assert_eq!(chunk.constants(), &[] as &[Value]);
	}

	#[test]
	fn code_and_lines_stay_in_lockstep() {
		let mut chunk = Chunk::new();
		for i in 0..40u8 {
			chunk.write(i, u32::from(i) / 3).unwrap();
			assert_eq!(chunk.code().len(), chunk.lines().len());
		}
		assert_eq!(chunk.len(), 40);
		assert_eq!(chunk.byte(39), Some(39));
		assert_eq!(chunk.line(39), Some(13));
		assert_eq!(chunk.line(40), None);
	}

	#[test]
	fn equal_constants_get_distinct_indices() {
		let mut chunk = Chunk::new();
		let first = chunk.add_constant(Value(1.5)).unwrap();
		let second = chunk.add_constant(Value(1.5)).unwrap();
		assert_eq!((first, second), (0, 1));
		assert_eq!(chunk.constant(first), chunk.constant(second));
	}

	#[test]
	fn write_constant_emits_opcode_and_index() {
		let mut chunk = Chunk::new();
		chunk.write_constant(Value(1.2), 7).unwrap();
		let index = chunk.write_constant(Value(3.4), 8).unwrap();
		assert_eq!(index, 1);
		assert_eq!(chunk.code(), &[OpCode::Constant as u8, 0, OpCode::Constant as u8, 1]);
		assert_eq!(chunk.lines(), &[7, 7, 8, 8]);
		assert_eq!(chunk.constant(1), Some(Value(3.4)));
	}

	#[test]
	fn write_constant_across_a_growth_boundary() {
		let mut chunk = Chunk::new();
		for _ in 0..7 {
			chunk.write_op(OpCode::Negate, 1).unwrap();
		}
		chunk.add_constant(Value(0.5)).unwrap();

		let index = chunk.write_constant(Value(4.0), 2).unwrap();
		assert_eq!(index, 1);
		assert_eq!(chunk.len(), 9);
		assert_eq!(chunk.code().len(), chunk.lines().len());
		assert_eq!(&chunk.code()[7..], &[OpCode::Constant as u8, 1]);
		assert_eq!(&chunk.lines()[6..], &[1, 2, 2]);
		assert_eq!(chunk.constants(), &[Value(0.5), Value(4.0)]);
	}

	#[test]
	fn write_constant_refuses_a_257th_constant() {
		let mut chunk = Chunk::new();
		for i in 0..MAX_CONSTANTS {
			chunk.add_constant(Value(i as f64)).unwrap();
		}
		assert_eq!(
			chunk.write_constant(Value(0.0), 1),
			Err(ChunkError::TooManyConstants(256))
		);
		assert_eq!(chunk.constants().len(), MAX_CONSTANTS);
		assert!(chunk.is_empty());
	}

	#[test]
	fn free_empties_the_chunk() {
		let mut chunk = Chunk::new();
		chunk.write_constant(Value(2.0), 1).unwrap();
		chunk.write_op(OpCode::Return, 1).unwrap();
		chunk.free();
		assert!(chunk.is_empty());
		assert!(chunk.lines().is_empty());
		assert!(chunk.constants().is_empty());
	}
}
