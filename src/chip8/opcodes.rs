use crate::{
    definitions::{cpu, display},
    opcode::{
        Address, Arithmetic, ArithmeticOp, ChipOpcodes, KeyOp, KeySkip, Misc, MiscOp, Operation,
        ProgramCounterStep, RegisterConst, RegisterPair, Sprite, System,
    },
    ProcessError,
};

use super::Machine;

/// The width of a sprite row in pixels
const BYTE: usize = 8;

impl ChipOpcodes for Machine {
    fn system(&mut self, opcode: &System) -> Result<(ProgramCounterStep, Operation), ProcessError> {
        match opcode {
            System::Clear => {
                // 00E0
                // clear display
                self.display = [[false; display::WIDTH]; display::HEIGHT];
                self.redraw = true;
                Ok((ProgramCounterStep::Next, Operation::Draw))
            }
            System::Return => {
                // 00EE
                // Return from sub routine => pop from stack and continue after the call
                let pc = self.pop_stack()?;
                log::debug!("return to {:#06X}", pc);
                let next = pc as usize + ProgramCounterStep::Next.step();
                Ok((ProgramCounterStep::Jump(next), Operation::None))
            }
        }
    }

    fn jump(&self, opcode: &Address) -> Result<ProgramCounterStep, ProcessError> {
        // 1NNN
        // Jumps to address NNN.
        Ok(ProgramCounterStep::Jump(opcode.nnn))
    }

    fn call(&mut self, opcode: &Address) -> Result<ProgramCounterStep, ProcessError> {
        // 2NNN
        // Calls subroutine at NNN, the address of the call itself is stored
        self.push_stack(self.program_counter)?;
        log::debug!(
            "call {:#06X} from {:#06X}",
            opcode.nnn,
            self.program_counter
        );
        Ok(ProgramCounterStep::Jump(opcode.nnn))
    }

    fn skip_equal(&self, opcode: &RegisterConst) -> Result<ProgramCounterStep, ProcessError> {
        // 3XNN
        let RegisterConst { x, nn } = *opcode;
        Ok(ProgramCounterStep::cond(self.registers[x] == nn))
    }

    fn skip_not_equal(&self, opcode: &RegisterConst) -> Result<ProgramCounterStep, ProcessError> {
        // 4XNN
        let RegisterConst { x, nn } = *opcode;
        Ok(ProgramCounterStep::cond(self.registers[x] != nn))
    }

    fn skip_registers_equal(
        &self,
        opcode: &RegisterPair,
    ) -> Result<ProgramCounterStep, ProcessError> {
        // 5XY0
        let RegisterPair { x, y } = *opcode;
        Ok(ProgramCounterStep::cond(
            self.registers[x] == self.registers[y],
        ))
    }

    fn load(&mut self, opcode: &RegisterConst) -> Result<ProgramCounterStep, ProcessError> {
        // 6XNN
        // Sets VX to NN.
        let RegisterConst { x, nn } = *opcode;
        self.registers[x] = nn;
        Ok(ProgramCounterStep::Next)
    }

    fn add(&mut self, opcode: &RegisterConst) -> Result<ProgramCounterStep, ProcessError> {
        // 7XNN
        // Adds NN to VX. let VX overflow, but ignore carry
        let RegisterConst { x, nn } = *opcode;
        self.registers[x] = self.registers[x].wrapping_add(nn);
        Ok(ProgramCounterStep::Next)
    }

    fn arithmetic(&mut self, opcode: &Arithmetic) -> Result<ProgramCounterStep, ProcessError> {
        let Arithmetic { ops, x, y } = *opcode;
        let vx = self.registers[x];
        let vy = self.registers[y];

        // the flag is calculated from the operands before the write, and written last
        let (res, flag) = match ops {
            ArithmeticOp::Assign => (vy, None),
            ArithmeticOp::Or => (vx | vy, None),
            ArithmeticOp::And => (vx & vy, None),
            ArithmeticOp::Xor => (vx ^ vy, None),
            ArithmeticOp::Add => {
                let (res, carry) = vx.overflowing_add(vy);
                (res, Some(u8::from(carry)))
            }
            // VF is the "no borrow" flag
            ArithmeticOp::Sub => (vx.wrapping_sub(vy), Some(u8::from(vy <= vx))),
            ArithmeticOp::ShiftRight => (vx >> 1, Some(vx & 1)),
            ArithmeticOp::SubReverse => (vy.wrapping_sub(vx), Some(u8::from(vx <= vy))),
            ArithmeticOp::ShiftLeft => (vx << 1, Some(vx >> 7)),
        };

        self.registers[x] = res;
        if let Some(flag) = flag {
            self.registers[cpu::register::LAST] = flag;
        }
        Ok(ProgramCounterStep::Next)
    }

    fn skip_registers_not_equal(
        &self,
        opcode: &RegisterPair,
    ) -> Result<ProgramCounterStep, ProcessError> {
        // 9XY0
        let RegisterPair { x, y } = *opcode;
        Ok(ProgramCounterStep::cond(
            self.registers[x] != self.registers[y],
        ))
    }

    fn set_index(&mut self, opcode: &Address) -> Result<ProgramCounterStep, ProcessError> {
        // ANNN
        self.index_register = opcode.nnn as u16;
        Ok(ProgramCounterStep::Next)
    }

    fn jump_offset(&self, opcode: &Address) -> Result<ProgramCounterStep, ProcessError> {
        // BNNN
        // NNN + V0 can point past the end of the memory
        let v0 = self.registers[0] as usize;
        let pointer = self.check_address(opcode.nnn + v0)?;
        Ok(ProgramCounterStep::Jump(pointer))
    }

    fn random(&mut self, opcode: &RegisterConst) -> Result<ProgramCounterStep, ProcessError> {
        // CXNN
        let RegisterConst { x, nn } = *opcode;
        // using a fill bytes call here, as the trait RngCore does not
        // support random u8.
        let mut rand: [u8; 1] = [0];
        self.rng.fill_bytes(&mut rand);
        self.registers[x] = nn & rand[0];
        Ok(ProgramCounterStep::Next)
    }

    fn draw(&mut self, opcode: &Sprite) -> Result<(ProgramCounterStep, Operation), ProcessError> {
        // DXYN
        // Both the start and every single pixel wrap around the edges of the screen.
        // see https://tobiasvl.github.io/blog/write-a-chip-8-emulator/
        let Sprite { x, y, n } = *opcode;

        let rows = self.memory_range(self.index_register as usize, n)?;
        let coorx = self.registers[x] as usize % display::WIDTH;
        let coory = self.registers[y] as usize % display::HEIGHT;

        let mut collision = false;

        for (i, row) in self.memory[rows].iter().enumerate() {
            let py = (coory + i) % display::HEIGHT;

            for j in 0..BYTE {
                let mask = 0x80 >> j;
                if row & mask == 0 {
                    continue;
                }

                let px = (coorx + j) % display::WIDTH;
                let pixel = &mut self.display[py][px];
                // an on pixel turned off is a collision
                collision |= *pixel;
                *pixel = !*pixel;
            }
        }

        self.registers[cpu::register::LAST] = u8::from(collision);
        self.redraw = true;

        Ok((ProgramCounterStep::Next, Operation::Draw))
    }

    fn key(&self, opcode: &KeySkip) -> Result<ProgramCounterStep, ProcessError> {
        let pressed = self.keyboard.is_pressed(self.registers[opcode.x]);
        let step = match opcode.ops {
            // EX9E
            KeyOp::Pressed => ProgramCounterStep::cond(pressed),
            // EXA1
            KeyOp::NotPressed => ProgramCounterStep::cond(!pressed),
        };
        Ok(step)
    }

    fn misc(&mut self, opcode: &Misc) -> Result<(ProgramCounterStep, Operation), ProcessError> {
        let x = opcode.x;
        let mut op = Operation::None;
        let mut pcs = ProgramCounterStep::Next;
        match opcode.ops {
            MiscOp::GetDelayTimer => {
                // FX07
                self.registers[x] = self.delay_timer.get_value();
            }
            MiscOp::AwaitKeyPress => {
                // FX0A
                // Without a key nothing happens and the same instruction runs again next step.
                match self.keyboard.first_pressed() {
                    Some(key) => self.registers[x] = key as u8,
                    None => {
                        op = Operation::Wait;
                        pcs = ProgramCounterStep::None;
                    }
                }
            }
            MiscOp::SetDelayTimer => {
                // FX15
                self.delay_timer.set_value(self.registers[x]);
            }
            MiscOp::SetSoundTimer => {
                // FX18
                self.sound_timer.set_value(self.registers[x]);
            }
            MiscOp::AddVxToI => {
                // FX1E
                // VF is set to 1 when there is a range overflow (I+VX>0xFFF), and to 0 when
                // there isn't.
                let vx = self.registers[x];
                let res = usize::from(self.index_register) + usize::from(vx);
                self.index_register = self.index_register.wrapping_add(u16::from(vx));
                self.registers[cpu::register::LAST] = u8::from(res > 0xFFF);
            }
            MiscOp::SetIToSprite => {
                // FX29
                let val = self.registers[x] as usize;
                if val > 0xF {
                    log::warn!(
                        "There is no font glyph for {:#X} in register V{:X}.",
                        val,
                        x
                    );
                }
                self.index_register =
                    (display::fontset::LOCATION + display::fontset::GLYPH_SIZE * val) as u16;
            }
            MiscOp::StoreBCD => {
                // FX33
                let range = self.memory_range(self.index_register as usize, 3)?;
                let r = self.registers[x];
                // 246u8 => [2, 4, 6]
                self.memory[range].copy_from_slice(&[r / 100, r / 10 % 10, r % 10]);
            }
            MiscOp::StoreV0ToVx => {
                // FX55
                let range = self.memory_range(self.index_register as usize, x + 1)?;
                self.memory[range].copy_from_slice(&self.registers[..=x]);
            }
            MiscOp::FillV0ToVx => {
                // FX65
                let range = self.memory_range(self.index_register as usize, x + 1)?;
                self.registers[..=x].copy_from_slice(&self.memory[range]);
            }
        }
        Ok((pcs, op))
    }
}
