use std::{convert::TryFrom, ops::Range};

use {
    crate::{
        definitions::{cpu, display, memory},
        devices::{Framebuffer, Keyboard},
        opcode::{self, Instruction, Opcode, ProgramCounter, ProgramCounterStep},
        resources::Rom,
        timer::Timer,
        MemoryError, ProcessError, StackError,
    },
    rand::RngCore,
    tinyvec::ArrayVec,
};

/// The Machine struct represents the current state
/// of the system, it contains all the structures
/// needed for emulating an instance of the
/// Chip8 CPU.
pub struct Machine {
    /// all two bytes long and stored big-endian, only valid during a step
    pub(super) opcode: Opcode,
    /// - `0x000-0x1FF` - Chip 8 interpreter (contains font set in emu)
    /// - `0x000-0x050` - Used for the built in `4x5` pixel font set (`0-F`)
    /// - `0x200-0xFFF` - Program ROM and work RAM
    pub(super) memory: Vec<u8>,
    /// `8-bit` data registers named `V0` to `VF`. The `VF` register doubles as a flag for some
    /// instructions; thus, it should be avoided. In an addition operation, `VF` is the carry flag,
    /// while in subtraction, it is the "no borrow" flag. In the draw instruction `VF` is set upon
    /// pixel collision.
    pub(super) registers: [u8; cpu::register::SIZE],
    /// The index for the register, this is a special register entry
    /// called index `I`
    pub(super) index_register: u16,
    /// The program counter is a CPU register in the computer processor which has the address of the
    /// next instruction to be executed from memory.
    pub(super) program_counter: u16,
    /// The stack is only used to store return addresses when subroutines are called. The original
    /// [RCA 1802](https://de.wikipedia.org/wiki/RCA1802) version allocated `48` bytes for up to
    /// `12` levels of nesting; modern implementations usually have more.
    /// (here we are using `16`)
    pub(super) stack: ArrayVec<[u16; cpu::stack::SIZE]>,
    /// Delay timer: This timer is intended to be used for timing the events of games. Its value
    /// can be set and read.
    /// Counts down at 60 hertz, until it reaches 0.
    pub(super) delay_timer: Timer,
    /// Sound timer: This timer is used for sound effects. When its value is nonzero, a beeping
    /// sound is made.
    /// Counts down at 60 hertz, until it reaches 0.
    pub(super) sound_timer: Timer,
    /// The graphics of the Chip 8 are black and white and the screen has a total of `2048` pixels
    /// `(64 x 32)`.
    pub(super) display: Framebuffer,
    /// Set whenever the display changed, until the driver acknowledges it.
    pub(super) redraw: bool,
    pub(super) keyboard: Keyboard,
    /// This stores the random number generator, used by the chipset.
    /// It is stored into the chipset, so as to enable simple mocking
    /// of the given type.
    pub(super) rng: Box<dyn RngCore + Send>,
}

impl Default for Machine {
    fn default() -> Self {
        Self::new()
    }
}

impl Machine {
    /// will create a new, freshly reset machine
    pub fn new() -> Self {
        Self::with_rng(Box::new(rand::rngs::OsRng))
    }

    /// will create a new machine drawing its random numbers from the given generator
    pub fn with_rng(rng: Box<dyn RngCore + Send>) -> Self {
        let mut machine = Self {
            opcode: 0,
            memory: vec![0; memory::SIZE],
            registers: [0; cpu::register::SIZE],
            index_register: 0,
            program_counter: cpu::PROGRAM_COUNTER as u16,
            stack: ArrayVec::new(),
            delay_timer: Timer::default(),
            sound_timer: Timer::default(),
            display: [[false; display::WIDTH]; display::HEIGHT],
            redraw: false,
            keyboard: Keyboard::new(),
            rng,
        };
        machine.reset();
        machine
    }

    /// Will bring the machine back into its power on state.
    pub fn reset(&mut self) {
        self.memory.iter_mut().for_each(|cell| *cell = 0);

        // load fonts
        self.memory[display::fontset::LOCATION
            ..(display::fontset::LOCATION + display::fontset::FONTSET.len())]
            .copy_from_slice(&display::fontset::FONTSET);

        self.opcode = 0;
        self.registers = [0; cpu::register::SIZE];
        self.index_register = 0;
        self.program_counter = cpu::PROGRAM_COUNTER as u16;
        self.stack.clear();
        self.delay_timer = Timer::default();
        self.sound_timer = Timer::default();
        self.display = [[false; display::WIDTH]; display::HEIGHT];
        self.redraw = false;
        self.keyboard.reset();
        log::debug!("machine reset");
    }

    /// Will reset the machine and copy the program into memory at the program start.
    ///
    /// A program larger then the available space is rejected, the machine stays reset.
    pub fn load_program(&mut self, program: &[u8]) -> Result<(), ProcessError> {
        self.reset();

        if program.len() > cpu::PROGRAM_CAPACITY {
            return Err(ProcessError::RomTooLarge {
                size: program.len(),
                capacity: cpu::PROGRAM_CAPACITY,
            });
        }

        // write the rom data into memory
        self.memory[cpu::PROGRAM_COUNTER..(cpu::PROGRAM_COUNTER + program.len())]
            .copy_from_slice(program);
        log::debug!("loaded program with {} bytes", program.len());
        Ok(())
    }

    /// Will load the given rom, see [`load_program`](Machine::load_program).
    pub fn load_rom(&mut self, rom: &Rom) -> Result<(), ProcessError> {
        log::debug!("loading rom '{}'", rom.get_name());
        self.load_program(rom.get_data())
    }

    /// will get the next opcode from memory
    pub(super) fn fetch_opcode(&self) -> Result<Opcode, MemoryError> {
        // will build the opcode given from the pointer
        opcode::build_opcode(&self.memory, self.program_counter as usize)
    }

    /// will advance the program by a single fetch, decode and execute cycle
    ///
    /// A failed step leaves the machine untouched, the program counter still points to the
    /// offending instruction.
    pub fn step(&mut self) -> Result<opcode::Operation, ProcessError> {
        // import here as to not bloat the namespace
        use crate::opcode::ChipOpcodes;
        // get next opcode
        let opcode = self.fetch_opcode()?;
        let instruction = Instruction::try_from(opcode)?;
        log::trace!(
            "{:#06X}: {:#06X} {:?}",
            self.program_counter,
            opcode,
            instruction
        );
        // run the opcode, only a successful step is remembered
        let operation = self.calc(&instruction)?;
        self.opcode = opcode;
        Ok(operation)
    }

    /// Will count both timers down by one, has to be called at 60 hertz.
    pub fn tick_timers(&mut self) {
        self.delay_timer.tick();
        self.sound_timer.tick();
    }

    /// Will write keyboard data into interncal keyboard representation.
    pub fn set_keyboard(&mut self, keys: &[bool]) -> Result<(), ProcessError> {
        self.keyboard.set_mult(keys)
    }

    /// Will mark the given key as pressed
    pub fn set_key_down(&mut self, key: usize) -> Result<(), ProcessError> {
        self.keyboard.set_key(key, true)
    }

    /// Will mark the given key as released
    pub fn set_key_up(&mut self, key: usize) -> Result<(), ProcessError> {
        self.keyboard.set_key(key, false)
    }

    /// Will get the current state of the keyboard
    pub fn get_keyboard(&self) -> &[bool] {
        self.keyboard.get_keys()
    }

    /// will return the sound timer
    pub fn sound_timer(&self) -> u8 {
        self.sound_timer.get_value()
    }

    /// A tone should be playing as long as the sound timer runs.
    pub fn sound_active(&self) -> bool {
        self.sound_timer.is_active()
    }

    /// will return the delay timer
    pub fn delay_timer(&self) -> u8 {
        self.delay_timer.get_value()
    }

    /// Will return the current display configuration
    pub fn get_display(&self) -> &Framebuffer {
        &self.display
    }

    pub fn redraw_pending(&self) -> bool {
        self.redraw
    }

    /// Will clear the redraw flag, after the display was presented.
    pub fn acknowledge_redraw(&mut self) {
        self.redraw = false;
    }

    pub fn registers(&self) -> &[u8] {
        &self.registers
    }

    pub fn index_register(&self) -> u16 {
        self.index_register
    }

    pub fn program_counter(&self) -> u16 {
        self.program_counter
    }

    /// The return addresses, the last entry is the top of the stack.
    pub fn stack(&self) -> &[u16] {
        &self.stack
    }

    pub fn stack_pointer(&self) -> usize {
        self.stack.len()
    }

    pub fn memory(&self) -> &[u8] {
        &self.memory
    }

    /// The opcode executed by the last successful step.
    pub fn current_opcode(&self) -> Opcode {
        self.opcode
    }

    /// Will push the given pointer to the stack
    pub(super) fn push_stack(&mut self, pointer: u16) -> Result<(), StackError> {
        if self.stack.len() == self.stack.capacity() {
            Err(StackError::Overflow)
        } else {
            // push to stack
            self.stack.push(pointer);
            Ok(())
        }
    }

    /// Will pop from the stack
    pub(super) fn pop_stack(&mut self) -> Result<u16, StackError> {
        self.stack.pop().ok_or(StackError::Underflow)
    }

    /// Will return the memory range `start..start + len` if it lies completely inside the memory.
    pub(super) fn memory_range(
        &self,
        start: usize,
        len: usize,
    ) -> Result<Range<usize>, MemoryError> {
        let end = start.saturating_add(len);
        // an empty range has to start inside of the memory as well
        if start > self.memory.len() || end > self.memory.len() {
            Err(MemoryError::OutOfRange {
                address: start.max(end.saturating_sub(1)),
                len: self.memory.len(),
            })
        } else {
            Ok(start..end)
        }
    }

    /// Will check that the address points into the memory.
    pub(super) fn check_address(&self, address: usize) -> Result<usize, MemoryError> {
        self.memory_range(address, 1).map(|range| range.start)
    }
}

impl ProgramCounter for Machine {
    fn advance(&mut self, step: ProgramCounterStep) {
        let pointer = if let ProgramCounterStep::Jump(_) = step {
            step.step()
        } else {
            self.program_counter as usize + step.step()
        };
        debug_assert!(pointer <= u16::MAX as usize);
        self.program_counter = pointer as u16;
    }
}
