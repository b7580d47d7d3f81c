use std::io;

use thiserror::Error;

use crate::chunk::{Chunk, ChunkError};
use crate::memory::AllocError;
use crate::opcode::OpCode;
use crate::stack::StackError;

/// Why a compiler refused to produce a chunk.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
	#[error("[line {line}] Error: {message}")]
	Syntax { line: u32, message: String },
	#[error(transparent)]
	Chunk(#[from] ChunkError),
}

impl From<AllocError> for CompileError {
	fn from(e: AllocError) -> Self {
		CompileError::Chunk(ChunkError::Alloc(e))
	}
}

/// A fault raised while running a chunk.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}\n[line {line}] in script")]
pub struct VMError {
	pub kind: VMErrorKind,
	/// Offset of the instruction that faulted.
	pub offset: usize,
	pub line: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VMErrorKind {
	#[error("instruction pointer ran past the end of the chunk")]
	OutOfBoundsIP,
	#[error("constant index {0} is out of range")]
	OutOfBoundsConst(u8),
	#[error("unknown opcode {0}")]
	UnknownOpcode(u8),
	#[error("{} is not supported by this engine", .0.name())]
	Unimplemented(OpCode),
	#[error("stack overflow")]
	StackOverflow,
	#[error("stack underflow")]
	StackUnderflow,
	#[error("failed to write output: {0}")]
	Output(io::ErrorKind),
}

impl From<StackError> for VMErrorKind {
	fn from(e: StackError) -> Self {
		match e {
			StackError::Overflow => VMErrorKind::StackOverflow,
			StackError::Underflow => VMErrorKind::StackUnderflow,
		}
	}
}

impl VMError {
	/// Blames the instruction at `offset`. Offsets past the end take the last line.
	pub fn at(chunk: &Chunk, offset: usize, kind: impl Into<VMErrorKind>) -> Self {
		let line = chunk
			.line(offset)
			.or_else(|| chunk.lines().last().copied())
			.unwrap_or(0);
		VMError {
			kind: kind.into(),
			offset,
			line,
		}
	}
}
