use thiserror::Error;

use crate::opcode::Opcode;

#[derive(Error, Debug, PartialEq, Clone)]
pub enum ProcessError {
    #[error("Invalid opcode state '{0}'.")]
    Opcode(#[from] OpcodeError),
    #[error("Invalid stack state '{0}'.")]
    Stack(#[from] StackError),
    #[error("Invalid memory access '{0}'.")]
    Memory(#[from] MemoryError),
    #[error("The rom is {size} bytes large, but only {capacity} bytes are available.")]
    RomTooLarge { size: usize, capacity: usize },
    #[error("There is no key {0:#X} on the keypad.")]
    InvalidKey(usize),
    #[error("The keyboard has {expected} keys, but {len} were given.")]
    InvalidKeyboardLen { len: usize, expected: usize },
}

#[derive(Error, Debug, PartialEq, Clone, Copy)]
pub enum OpcodeError {
    #[error("An unsupported opcode was used {0:#06X}.")]
    Unimplemented(Opcode),
}

#[derive(Error, Debug, PartialEq, Clone, Copy)]
pub enum StackError {
    #[error("Stack is full!")]
    Overflow,
    #[error("Stack is empty!")]
    Underflow,
}

#[derive(Error, Debug, PartialEq, Clone, Copy)]
pub enum MemoryError {
    #[error("Address {address:#06X} is outside of the memory with len {len}")]
    OutOfRange { address: usize, len: usize },
}
