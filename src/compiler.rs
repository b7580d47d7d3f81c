use crate::chunk::Chunk;
use crate::error::CompileError;

/// Turns source text into a chunk. The VM trusts whatever chunk comes back.
pub trait Compiler {
	fn compile(&mut self, source: &str) -> Result<Chunk, CompileError>;
}

impl<F> Compiler for F
where
	F: FnMut(&str) -> Result<Chunk, CompileError>,
{
	fn compile(&mut self, source: &str) -> Result<Chunk, CompileError> {
		self(source)
	}
}
