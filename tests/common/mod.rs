#![allow(dead_code)]

use std::sync::Once;

use log::LevelFilter;
use lox_vm::{Chunk, CompileError, OpCode, Value, VmConfig, VM};
use simple_logger::SimpleLogger;

static LOGGER: Once = Once::new();

pub fn init_logger() {
    LOGGER.call_once(|| {
        SimpleLogger::new()
            .with_level(LevelFilter::Debug)
            .init()
            .unwrap();
    });
}

pub fn vm(trace: bool) -> VM<Vec<u8>> {
    init_logger();
    VM::with_output(VmConfig { trace }, Vec::new())
}

pub fn output(vm: VM<Vec<u8>>) -> String {
    String::from_utf8(vm.into_output()).unwrap()
}

/// Builds a chunk from a constant pool and raw bytes, all on `line`.
pub fn assemble(constants: &[f64], code: &[u8], line: u32) -> Chunk {
    let mut chunk = Chunk::new();
    for &c in constants {
        chunk.add_constant(Value(c)).unwrap();
    }
    for &byte in code {
        chunk.write(byte, line).unwrap();
    }
    chunk
}

/// Stand-in compiler for postfix arithmetic: numbers, `+ - * /` and `neg`,
/// one source line per input line. A trailing `return` is always emitted.
pub fn rpn(source: &str) -> Result<Chunk, CompileError> {
    let mut chunk = Chunk::new();
    let mut last_line = 1;
    for (i, text) in source.lines().enumerate() {
        let line = i as u32 + 1;
        last_line = line;
        for token in text.split_whitespace() {
            let op = match token {
                "+" => OpCode::Add,
                "-" => OpCode::Subtract,
                "*" => OpCode::Multiply,
                "/" => OpCode::Divide,
                "neg" => OpCode::Negate,
                number => {
                    let n: f64 = number.parse().map_err(|_| CompileError::Syntax {
                        line,
                        message: format!("Unexpected token '{number}'."),
                    })?;
                    chunk.write_constant(Value(n), line)?;
                    continue;
                }
            };
            chunk.write_op(op, line)?;
        }
    }
    chunk.write_op(OpCode::Return, last_line)?;
    Ok(chunk)
}
