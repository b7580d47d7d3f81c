use thiserror::Error;

use crate::gc::{Trace, Tracer};
use crate::value::Value;

/// Maximum number of values on the operand stack.
pub const STACK_MAX: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StackError {
	#[error("stack overflow")]
	Overflow,
	#[error("pop from an empty stack")]
	Underflow,
}

/// Fixed-capacity LIFO of values, allocated once.
pub struct Stack {
	slots: Box<[Value; STACK_MAX]>,
	top: usize,
}

impl Stack {
	pub fn new() -> Self {
		Stack {
			slots: Box::new([Value::default(); STACK_MAX]),
			top: 0,
		}
	}

	#[inline]
	pub fn push(&mut self, value: Value) -> Result<(), StackError> {
		let slot = self.slots.get_mut(self.top).ok_or(StackError::Overflow)?;
		*slot = value;
		self.top += 1;
		Ok(())
	}

	#[inline]
	pub fn pop(&mut self) -> Result<Value, StackError> {
		self.top = self.top.checked_sub(1).ok_or(StackError::Underflow)?;
		Ok(self.slots[self.top])
	}

	pub fn reset(&mut self) {
		self.top = 0;
	}

	pub fn len(&self) -> usize {
		self.top
	}

	pub fn is_empty(&self) -> bool {
		self.top == 0
	}

	/// Live values, bottom first.
	pub fn as_slice(&self) -> &[Value] {
		&self.slots[..self.top]
	}
}

impl Default for Stack {
	fn default() -> Self {
		Self::new()
	}
}

impl std::fmt::Debug for Stack {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_list().entries(self.as_slice()).finish()
	}
}

impl Trace for Stack {
	fn trace<T: Tracer>(&self, tracer: &mut T) {
		self.as_slice().trace(tracer);
	}
}
