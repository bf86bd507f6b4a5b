//! A CHIP-8 virtual machine core.
//!
//! The [`Machine`](chip8::Machine) owns the complete emulated state and is driven by the caller
//! through [`step`](chip8::Machine::step) and [`tick_timers`](chip8::Machine::tick_timers). The
//! [`runner`] module contains an optional driver pacing both on background workers.
pub mod chip8;
pub mod definitions;
pub mod devices;
pub mod opcode;
pub mod resources;
pub mod runner;
pub mod timer;
mod error;

// reexporting for convinience
pub use error::*;
