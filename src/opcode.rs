//! The instruction set.
//!
//! Tags are numbered in declaration order starting at zero and form the wire
//! format a compiler targets. Only part of the set is executable here; the rest
//! is decoded and disassembled so that bytecode for a larger engine stays readable.

/// One-byte operation tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum OpCode {
	/// Push a constant. Operand: u8 pool index.
	Constant,
	Nil,
	True,
	False,
	Pop,
	/// Operand: u8 stack slot.
	GetLocal,
	/// Operand: u8 stack slot.
	SetLocal,
	/// Operand: u8 name constant.
	GetGlobal,
	/// Operand: u8 name constant.
	DefineGlobal,
	/// Operand: u8 name constant.
	SetGlobal,
	/// Operand: u8 upvalue index.
	GetUpvalue,
	/// Operand: u8 upvalue index.
	SetUpvalue,
	/// Operand: u8 name constant.
	GetProperty,
	/// Operand: u8 name constant.
	SetProperty,
	Equal,
	Greater,
	Less,
	/// Pop `b`, pop `a`, push `a + b`.
	Add,
	/// Pop `b`, pop `a`, push `a - b`.
	Subtract,
	/// Pop `b`, pop `a`, push `a * b`.
	Multiply,
	/// Pop `b`, pop `a`, push `a / b`.
	Divide,
	Not,
	/// Pop `v`, push `-v`.
	Negate,
	Print,
	/// Operand: u16 forward offset, big-endian.
	Jump,
	/// Operand: u16 forward offset, big-endian.
	JumpIfFalse,
	/// Operand: u16 backward offset, big-endian.
	Loop,
	/// Operand: u8 argument count.
	Call,
	/// Operands: u8 name constant, u8 argument count.
	Invoke,
	/// Operand: u8 function constant, followed by upvalue pairs.
	Closure,
	CloseUpvalue,
	/// Pop the result and stop.
	Return,
	/// Operand: u8 name constant.
	Class,
	/// Operand: u8 name constant.
	Method,
}

impl OpCode {
	/// Every tag, indexed by its byte.
	pub const ALL: [OpCode; 34] = [
		OpCode::Constant,
		OpCode::Nil,
		OpCode::True,
		OpCode::False,
		OpCode::Pop,
		OpCode::GetLocal,
		OpCode::SetLocal,
		OpCode::GetGlobal,
		OpCode::DefineGlobal,
		OpCode::SetGlobal,
		OpCode::GetUpvalue,
		OpCode::SetUpvalue,
		OpCode::GetProperty,
		OpCode::SetProperty,
		OpCode::Equal,
		OpCode::Greater,
		OpCode::Less,
		OpCode::Add,
		OpCode::Subtract,
		OpCode::Multiply,
		OpCode::Divide,
		OpCode::Not,
		OpCode::Negate,
		OpCode::Print,
		OpCode::Jump,
		OpCode::JumpIfFalse,
		OpCode::Loop,
		OpCode::Call,
		OpCode::Invoke,
		OpCode::Closure,
		OpCode::CloseUpvalue,
		OpCode::Return,
		OpCode::Class,
		OpCode::Method,
	];

	pub fn name(self) -> &'static str {
		match self {
			OpCode::Constant => "OP_CONSTANT",
			OpCode::Nil => "OP_NIL",
			OpCode::True => "OP_TRUE",
			OpCode::False => "OP_FALSE",
			OpCode::Pop => "OP_POP",
			OpCode::GetLocal => "OP_GET_LOCAL",
			OpCode::SetLocal => "OP_SET_LOCAL",
			OpCode::GetGlobal => "OP_GET_GLOBAL",
			OpCode::DefineGlobal => "OP_DEFINE_GLOBAL",
			OpCode::SetGlobal => "OP_SET_GLOBAL",
			OpCode::GetUpvalue => "OP_GET_UPVALUE",
			OpCode::SetUpvalue => "OP_SET_UPVALUE",
			OpCode::GetProperty => "OP_GET_PROPERTY",
			OpCode::SetProperty => "OP_SET_PROPERTY",
			OpCode::Equal => "OP_EQUAL",
			OpCode::Greater => "OP_GREATER",
			OpCode::Less => "OP_LESS",
			OpCode::Add => "OP_ADD",
			OpCode::Subtract => "OP_SUBTRACT",
			OpCode::Multiply => "OP_MULTIPLY",
			OpCode::Divide => "OP_DIVIDE",
			OpCode::Not => "OP_NOT",
			OpCode::Negate => "OP_NEGATE",
			OpCode::Print => "OP_PRINT",
			OpCode::Jump => "OP_JUMP",
			OpCode::JumpIfFalse => "OP_JUMP_IF_FALSE",
			OpCode::Loop => "OP_LOOP",
			OpCode::Call => "OP_CALL",
			OpCode::Invoke => "OP_INVOKE",
			OpCode::Closure => "OP_CLOSURE",
			OpCode::CloseUpvalue => "OP_CLOSE_UPVALUE",
			OpCode::Return => "OP_RETURN",
			OpCode::Class => "OP_CLASS",
			OpCode::Method => "OP_METHOD",
		}
	}

	/// Number of operand bytes that follow the tag.
	///
	/// For `Closure` this only counts the function constant; the upvalue pairs
	/// depend on the function and are not decoded here.
	pub fn operand_len(self) -> usize {
		match self {
			OpCode::Constant
			| OpCode::GetLocal
			| OpCode::SetLocal
			| OpCode::GetGlobal
			| OpCode::DefineGlobal
			| OpCode::SetGlobal
			| OpCode::GetUpvalue
			| OpCode::SetUpvalue
			| OpCode::GetProperty
			| OpCode::SetProperty
			| OpCode::Call
			| OpCode::Closure
			| OpCode::Class
			| OpCode::Method => 1,
			OpCode::Jump | OpCode::JumpIfFalse | OpCode::Loop | OpCode::Invoke => 2,
			_ => 0,
		}
	}
}

impl TryFrom<u8> for OpCode {
	type Error = u8;

	fn try_from(byte: u8) -> Result<Self, Self::Error> {
		OpCode::ALL.get(byte as usize).copied().ok_or(byte)
	}
}

impl From<OpCode> for u8 {
	fn from(op: OpCode) -> u8 {
		op as u8
	}
}
