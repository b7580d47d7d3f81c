use std::io::{self, Write};

use cfg_if::cfg_if;
use log::{debug, error, warn};

use crate::chunk::Chunk;
use crate::compiler::Compiler;
use crate::debug::Instruction;
use crate::error::{VMError, VMErrorKind};
use crate::gc::{Collector, Trace, Tracer};
use crate::opcode::OpCode;
use crate::stack::{Stack, StackError};
use crate::value::Value;

cfg_if! {
	if #[cfg(feature = "trace-execution")] {
		const TRACE_BY_DEFAULT: bool = true;
	} else {
		const TRACE_BY_DEFAULT: bool = false;
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VmConfig {
	/// Print the stack and the next instruction before each dispatch.
	pub trace: bool,
}

impl Default for VmConfig {
	fn default() -> Self {
		VmConfig {
			trace: TRACE_BY_DEFAULT,
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterpretResult {
	Ok,
	CompileError,
	RuntimeError,
}

impl InterpretResult {
	/// Conventional process exit status (sysexits `EX_DATAERR` / `EX_SOFTWARE`).
	pub fn exit_code(self) -> i32 {
		match self {
			InterpretResult::Ok => 0,
			InterpretResult::CompileError => 65,
			InterpretResult::RuntimeError => 70,
		}
	}
}

/// A stack machine. Each value is an independent session; nothing is shared.
///
/// `return` and trace mode write to `out`, which is stdout unless the VM was
/// built with [`VM::with_output`].
pub struct VM<W = io::Stdout> {
	ip: usize,
	stack: Stack,
	config: VmConfig,
	out: W,
}

impl VM {
	pub fn new() -> Self {
		Self::with_config(VmConfig::default())
	}

	pub fn with_config(config: VmConfig) -> Self {
		VM::with_output(config, io::stdout())
	}
}

impl Default for VM {
	fn default() -> Self {
		Self::new()
	}
}

impl<W: Write> VM<W> {
	pub fn with_output(config: VmConfig, out: W) -> Self {
		VM {
			ip: 0,
			stack: Stack::new(),
			config,
			out,
		}
	}

	pub fn config(&self) -> VmConfig {
		self.config
	}

	pub fn set_trace(&mut self, trace: bool) {
		self.config.trace = trace;
	}

	pub fn output(&self) -> &W {
		&self.out
	}

	pub fn into_output(self) -> W {
		self.out
	}

	/// Values left on the stack, bottom first.
	pub fn stack(&self) -> &[Value] {
		self.stack.as_slice()
	}

	pub fn push(&mut self, value: Value) -> Result<(), StackError> {
		self.stack.push(value)
	}

	pub fn pop(&mut self) -> Result<Value, StackError> {
		self.stack.pop()
	}

	/// Drops whatever the last session left behind.
	pub fn free(&mut self) {
		self.reset_stack();
		self.ip = 0;
	}

	fn reset_stack(&mut self) {
		self.stack.reset();
	}

	/// Compiles `source` and runs it. A chunk that failed to compile is never run.
	pub fn interpret<C>(&mut self, compiler: &mut C, source: &str) -> InterpretResult
	where
		C: Compiler + ?Sized,
	{
		debug!("Compiling {} bytes of source", source.len());
		match compiler.compile(source) {
			Ok(chunk) => self.interpret_chunk(&chunk),
			Err(e) => {
				error!("{e}");
				InterpretResult::CompileError
			}
		}
	}

	pub fn interpret_chunk(&mut self, chunk: &Chunk) -> InterpretResult {
		match self.run_chunk(chunk) {
			Ok(_) => InterpretResult::Ok,
			Err(e) => {
				error!("{e}");
				InterpretResult::RuntimeError
			}
		}
	}

	/// Runs `chunk` from its first byte and returns the value it returned.
	pub fn run_chunk(&mut self, chunk: &Chunk) -> Result<Value, VMError> {
		debug!(
			"Running chunk: {} bytes, {} constants",
			chunk.len(),
			chunk.constants().len()
		);
		self.reset_stack();
		self.ip = 0;
		let value = self.run(chunk)?;
		debug!("Chunk returned {value}");
		Ok(value)
	}

	fn run(&mut self, chunk: &Chunk) -> Result<Value, VMError> {
		loop {
			let offset = self.ip;

			if self.config.trace {
				if let Err(e) = self.trace_instruction(chunk, offset) {
					warn!("Failed to write trace output: {e}");
				}
			}

			let byte = self.read_byte(chunk, offset)?;
			let op = OpCode::try_from(byte)
				.map_err(|byte| VMError::at(chunk, offset, VMErrorKind::UnknownOpcode(byte)))?;

			match op {
				OpCode::Constant => {
					let constant = self.read_constant(chunk, offset)?;
					self.push_at(chunk, offset, constant)?;
				}
				OpCode::Add => self.binary_op(chunk, offset, |a, b| a + b)?,
				OpCode::Subtract => self.binary_op(chunk, offset, |a, b| a - b)?,
				OpCode::Multiply => self.binary_op(chunk, offset, |a, b| a * b)?,
				OpCode::Divide => self.binary_op(chunk, offset, |a, b| a / b)?,
				OpCode::Negate => {
					let value = self.pop_at(chunk, offset)?;
					self.push_at(chunk, offset, -value)?;
				}
				OpCode::Return => {
					let value = self.pop_at(chunk, offset)?;
					writeln!(self.out, "{value}")
						.map_err(|e| VMError::at(chunk, offset, VMErrorKind::Output(e.kind())))?;
					return Ok(value);
				}
				op => return Err(VMError::at(chunk, offset, VMErrorKind::Unimplemented(op))),
			}
		}
	}

	/// Fetches the byte under `ip` and advances. Faults blame `instruction`.
	#[inline]
	fn read_byte(&mut self, chunk: &Chunk, instruction: usize) -> Result<u8, VMError> {
		let byte = chunk
			.byte(self.ip)
			.ok_or_else(|| VMError::at(chunk, instruction, VMErrorKind::OutOfBoundsIP))?;
		self.ip += 1;
		Ok(byte)
	}

	#[inline]
	fn read_constant(&mut self, chunk: &Chunk, instruction: usize) -> Result<Value, VMError> {
		let index = self.read_byte(chunk, instruction)?;
		chunk
			.constant(index as usize)
			.ok_or_else(|| VMError::at(chunk, instruction, VMErrorKind::OutOfBoundsConst(index)))
	}

	#[inline]
	fn push_at(&mut self, chunk: &Chunk, instruction: usize, value: Value) -> Result<(), VMError> {
		self.stack
			.push(value)
			.map_err(|e| VMError::at(chunk, instruction, e))
	}

	#[inline]
	fn pop_at(&mut self, chunk: &Chunk, instruction: usize) -> Result<Value, VMError> {
		self.stack.pop().map_err(|e| VMError::at(chunk, instruction, e))
	}

	/// Pops `b`, then `a`, and pushes `op(a, b)`.
	#[inline]
	fn binary_op<F>(&mut self, chunk: &Chunk, instruction: usize, op: F) -> Result<(), VMError>
	where
		F: FnOnce(Value, Value) -> Value,
	{
		let b = self.pop_at(chunk, instruction)?;
		let a = self.pop_at(chunk, instruction)?;
		self.push_at(chunk, instruction, op(a, b))
	}

	fn trace_instruction(&mut self, chunk: &Chunk, offset: usize) -> io::Result<()> {
		write!(self.out, "          ")?;
		for value in self.stack.as_slice() {
			write!(self.out, "[ {value} ]")?;
		}
		writeln!(self.out)?;
		writeln!(self.out, "{}", Instruction::new(chunk, offset))
	}

	/// Hands the VM's roots to `collector` for one pass.
	pub fn collect_garbage<C: Collector>(&self, collector: &mut C) {
		debug!("-- gc begin");
		collector.collect_garbage(self);
		debug!("-- gc end");
	}
}

/// Only the operand stack holds values for now.
impl<W> Trace for VM<W> {
	fn trace<T: Tracer>(&self, tracer: &mut T) {
		self.stack.trace(tracer);
	}
}
