//! The pretty print implementation of the [`Machine`](super::Machine) state.
//! This implementation was split up into this file for smaller file sizes and higher
//! cohesion.

use super::Machine;
use std::fmt;

/// The amount of bytes shown in a single memory row.
const HEX_PRINT_STEP: usize = 16;

/// The amount of registers shown in a single line.
const REGISTER_PRINT_STEP: usize = 4;

const INDENT_FILLAMENT: char = '\t';

/// Shown instead of rows that only contain zeros.
const ZERO_FILLER: &str = "...";

impl fmt::Display for Machine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Program Counter: {:#06X}", self.program_counter)?;
        writeln!(f, "Opcode: {:#06X}", self.opcode)?;
        writeln!(f, "Index Register: {:#06X}", self.index_register)?;
        writeln!(
            f,
            "Delay Timer: {} Sound Timer: {}",
            self.delay_timer.get_value(),
            self.sound_timer.get_value()
        )?;

        writeln!(f, "Registers:")?;
        for (line, chunk) in self.registers.chunks(REGISTER_PRINT_STEP).enumerate() {
            write!(f, "{}", INDENT_FILLAMENT)?;
            for (i, value) in chunk.iter().enumerate() {
                write!(f, "V{:X}: {:#04X} ", line * REGISTER_PRINT_STEP + i, value)?;
            }
            writeln!(f)?;
        }

        writeln!(f, "Stack:")?;
        for (i, pointer) in self.stack.iter().enumerate() {
            writeln!(f, "{}{:2}: {:#06X}", INDENT_FILLAMENT, i, pointer)?;
        }

        writeln!(f, "Memory:")?;
        memory_print::formatter(f, &self.memory)
    }
}

/// Handles the memory dump
mod memory_print {
    use super::{HEX_PRINT_STEP, INDENT_FILLAMENT, ZERO_FILLER};
    use std::fmt;

    /// Will print the memory in rows, at least two rows of zeros are collapsed into a single
    /// filler line.
    pub(super) fn formatter(f: &mut fmt::Formatter<'_>, memory: &[u8]) -> fmt::Result {
        let rows: Vec<_> = memory.chunks(HEX_PRINT_STEP).collect();
        let mut i = 0;
        while i < rows.len() {
            let zeros = rows[i..]
                .iter()
                .take_while(|row| row.iter().all(|&cell| cell == 0))
                .count();

            if zeros >= 2 {
                writeln!(f, "{}{}", INDENT_FILLAMENT, ZERO_FILLER)?;
                i += zeros;
                continue;
            }

            let from = i * HEX_PRINT_STEP;
            let to = from + rows[i].len() - 1;
            write!(f, "{}{:#06X} - {:#06X} :", INDENT_FILLAMENT, from, to)?;
            for cell in rows[i] {
                write!(f, " {:02X}", cell)?;
            }
            writeln!(f)?;
            i += 1;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_print_fresh_machine() {
        let mut chip = Machine::new();
        chip.load_program(&[0x60, 0x05]).unwrap();
        let text = format!("{}", chip);

        assert!(text.contains("Program Counter: 0x0200"));
        assert!(text.contains("VF: 0x00"));
        // the font set
        assert!(text.contains("0x0000 - 0x000F : F0 90 90 90 F0 20 60 20"));
        // the program
        assert!(text.contains("0x0200 - 0x020F : 60 05 00"));
        assert!(text.contains(ZERO_FILLER));
    }

    #[test]
    fn test_print_stack() {
        let mut chip = Machine::new();
        chip.push_stack(0x0234).unwrap();
        let text = format!("{}", chip);
        assert!(text.contains(" 0: 0x0234"));
    }

    #[test]
    fn test_single_zero_row_is_printed() {
        let mut memory = [0u8; 3 * HEX_PRINT_STEP];
        memory[0] = 1;
        memory[2 * HEX_PRINT_STEP] = 2;

        struct Dump<'a>(&'a [u8]);
        impl fmt::Display for Dump<'_> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                memory_print::formatter(f, self.0)
            }
        }

        let text = format!("{}", Dump(&memory));
        assert_eq!(text.lines().count(), 3);
        assert!(!text.contains(ZERO_FILLER));
    }
}
