//! Execution core of a stack-based bytecode VM for Lox.
//!
//! A compiler (anything implementing [`Compiler`]) produces a [`Chunk`]; a [`VM`]
//! runs it until `return` or a fault.

pub mod array;
pub mod chunk;
pub mod compiler;
pub mod debug;
pub mod error;
pub mod gc;
pub mod memory;
pub mod opcode;
pub mod stack;
pub mod value;
pub mod vm;

pub use chunk::{Chunk, ChunkError};
pub use compiler::Compiler;
pub use error::{CompileError, VMError, VMErrorKind};
pub use memory::AllocError;
pub use opcode::OpCode;
pub use stack::STACK_MAX;
pub use value::Value;
pub use vm::{InterpretResult, VmConfig, VM};
