//! Opcode abstractions, decoding and the contract used to execute them.
use std::convert::TryFrom;

use crate::{definitions::memory, MemoryError, OpcodeError, ProcessError};

/// the base mask used for generating all the other sub masks
pub(crate) const OPCODE_MASK_FFFF: u16 = u16::MAX;

/// the mask for the first twelve bits
pub(crate) const OPCODE_MASK_FFF0: u16 = OPCODE_MASK_FFFF << 4;

/// the mask for the first eight bits
pub(crate) const OPCODE_MASK_FF00: u16 = OPCODE_MASK_FFFF << 8;

/// the mask for the first four bits
pub(crate) const OPCODE_MASK_F000: u16 = OPCODE_MASK_FFFF << 12;

/// the mask for the last four bits
pub(crate) const OPCODE_MASK_000F: u16 = OPCODE_MASK_FFFF ^ OPCODE_MASK_FFF0;

/// the mask for the last eight bits
pub(crate) const OPCODE_MASK_00FF: u16 = OPCODE_MASK_FFFF ^ OPCODE_MASK_FF00;

/// the mask for the last twelve bits
pub(crate) const OPCODE_MASK_0FFF: u16 = OPCODE_MASK_FFFF ^ OPCODE_MASK_F000;

/// the size of a single byte
const BYTE_SIZE: u16 = 0x8;

/// a wrapper type for u16 to make it clear what is meant to be used
pub type Opcode = u16;

/// will build an opcode from data and the given point
/// # Arguments
///
/// - `data` - A slice of u8 data entries used to generate the opcodes
/// - `pointer` - Where in the data the opcode shall be extracted, so `pointer` and `pointer + 1` make
/// the opcode up
///
/// # Example
/// ```rust
/// # use chip::opcode::*;
/// # use chip::MemoryError;
///  const OPCODES: [Opcode; 2] = [0x00EE, 0x1EDA];
///  const SPLIT_OPCODE: [u8; 4] = [0x00, 0xEE, 0x1E, 0xDA];
///  for (i, val) in OPCODES.iter().enumerate() {
///      let opcode = build_opcode(&SPLIT_OPCODE, i * 2).expect("This will work.");
///      assert_eq!(opcode, *val);
///  }
/// # let pointer = 3;
/// # let err = MemoryError::OutOfRange { address: pointer + 1, len: SPLIT_OPCODE.len() };
/// # assert_eq!(Err(err), build_opcode(&SPLIT_OPCODE, pointer));
/// ```
pub fn build_opcode(data: &[u8], pointer: usize) -> Result<Opcode, MemoryError> {
    // controlling that there is no illegal access here
    match data.get(pointer..=pointer.saturating_add(1)) {
        Some(&[high, low]) => Ok(Opcode::from_be_bytes([high, low])),
        _ => Err(MemoryError::OutOfRange {
            address: pointer.saturating_add(1),
            len: data.len(),
        }),
    }
}

/// These are special traits used to filter out information
/// from opcodes
pub trait OpcodeTrait {
    /// this is an opcode extractor that will return the
    /// opcode number form any opcode
    /// - `T` is the opcode type
    fn t(&self) -> usize;

    /// this is an opcode extractor for the opcode type `TNNN`
    /// - `T` is the opcode type
    /// - `NNN` is an address
    fn nnn(&self) -> usize;

    /// this is an opcode extractor for the opcode type `TXNN`
    /// - `T` is the opcode type
    /// - `X` is a register index
    /// - `NN` is a constant
    fn xnn(&self) -> (usize, u8);

    /// this is an opcode extractor for the opcode type `TXYN`
    /// - `T` is the opcode type
    /// - `X` is a register index
    /// - `Y` is a register index
    /// - `N` is a constant or opcode subtype
    fn xyn(&self) -> (usize, usize, usize);

    /// this is an opcode extractor for the opcode type `TXYT`
    /// - `T` is the opcode type
    /// - `X` is a register index
    /// - `Y` is a register index
    fn xy(&self) -> (usize, usize);

    /// this is an opcode extractor for the opcode type `TXTT`
    /// - `T` is the opcode type
    /// - `X` is a register index
    fn x(&self) -> usize;
}

impl OpcodeTrait for Opcode {
    /// # Example
    /// ```rust
    /// # use chip::opcode::*;
    /// const BASE_OPCODE: Opcode = 0x1EDA;
    /// assert_eq!(BASE_OPCODE.t(), 0x1000);
    /// ```
    fn t(&self) -> usize {
        (self & OPCODE_MASK_F000) as usize
    }

    /// # Example
    /// ```rust
    /// # use chip::opcode::*;
    ///  const BASE_OPCODE: Opcode = 0x1EDA;
    ///  assert_eq!(BASE_OPCODE.nnn(), 0xEDA)
    /// ```
    fn nnn(&self) -> usize {
        (self & OPCODE_MASK_0FFF) as usize
    }

    /// # Example
    /// ```rust
    /// # use chip::opcode::*;
    /// const BASE_OPCODE: Opcode = 0x1EDA;
    /// assert_eq!(BASE_OPCODE.xnn(), (0xE, 0xDA));
    /// ```
    fn xnn(&self) -> (usize, u8) {
        let x = self.x();
        let nn = (self & OPCODE_MASK_00FF) as u8;
        (x, nn)
    }

    /// ```rust
    /// # use chip::opcode::*;
    ///  const BASE_OPCODE: Opcode = 0x1EDA;
    ///  assert_eq!(BASE_OPCODE.xyn(), (0xE, 0xD, 0xA));
    /// ```
    fn xyn(&self) -> (usize, usize, usize) {
        let (x, y) = self.xy();
        let n = (self & OPCODE_MASK_000F) as usize;
        (x, y, n)
    }

    /// ```rust
    /// # use chip::opcode::*;
    ///  const BASE_OPCODE: Opcode = 0x1EDA;
    ///  assert_eq!(BASE_OPCODE.xy(), (0xE, 0xD));
    /// ```
    fn xy(&self) -> (usize, usize) {
        let x = self.x();
        const MASK: u16 = OPCODE_MASK_00FF ^ OPCODE_MASK_000F;
        const NIBBLE: u16 = BYTE_SIZE / 2;
        let y = ((self & MASK) >> NIBBLE) as usize;
        (x, y)
    }

    /// # Example
    /// ```rust
    /// # use chip::opcode::*;
    ///  const BASE_OPCODE: Opcode = 0x1EDA;
    ///  assert_eq!(BASE_OPCODE.x(), 0xE);
    /// ```
    fn x(&self) -> usize {
        ((self & OPCODE_MASK_0FFF & OPCODE_MASK_FF00) >> BYTE_SIZE) as usize
    }
}

#[derive(Debug, PartialEq, Clone, Copy)]
/// Represents the program steps that the chip
/// can take.
pub enum ProgramCounterStep {
    /// Will not change the program counter
    None,
    /// Will move the program counter to the next instruction
    Next,
    /// Will skip over the next instruction
    Skip,
    /// Will simply move the program counter to the given location.
    Jump(usize),
}

impl ProgramCounterStep {
    /// Will return a Skip if the condition is true.
    ///
    /// # Example
    /// ```rust
    /// # use chip::opcode::ProgramCounterStep;
    /// assert_eq!(ProgramCounterStep::Next, ProgramCounterStep::cond(false));
    /// assert_eq!(ProgramCounterStep::Skip, ProgramCounterStep::cond(true));
    /// ```
    #[inline]
    pub fn cond(cond: bool) -> Self {
        if cond {
            ProgramCounterStep::Skip
        } else {
            ProgramCounterStep::Next
        }
    }

    /// Maps the [`ProgramCounterStep`](ProgramCounterStep) to the corresponding movement distanz,
    /// or the absolute target in the case of a jump.
    #[inline]
    pub fn step(&self) -> usize {
        match *self {
            ProgramCounterStep::Next => memory::opcodes::SIZE,
            ProgramCounterStep::Skip => 2 * memory::opcodes::SIZE,
            ProgramCounterStep::None => 0,
            ProgramCounterStep::Jump(pointer) => pointer,
        }
    }
}

/// Extracts the operands of an instruction group, `None` if the
/// opcode is not a member of the group.
trait Decode: Sized {
    fn decode(opcode: Opcode) -> Option<Self>;
}

/// Generates the lookup from a raw sub opcode to its enum variant.
macro_rules! implFromCode {
    ($type_name:ty : $type_from:ty : $( $key:literal => $val:expr ),+ $(,)? ) => {
        impl $type_name {
            fn from_code(code: $type_from) -> Option<Self> {
                match code {
                    $(
                        $key => Some($val),
                    )+
                    _ => None,
                }
            }
        }
    };
}

macro_rules! implDecodeNNN {
    ($type_name:ident) => {
        impl Decode for $type_name {
            fn decode(opcode: Opcode) -> Option<Self> {
                Some($type_name { nnn: opcode.nnn() })
            }
        }
    };
}

macro_rules! implDecodeXNN {
    ($type_name:ident) => {
        impl Decode for $type_name {
            fn decode(opcode: Opcode) -> Option<Self> {
                let (x, nn) = opcode.xnn();
                Some($type_name { x, nn })
            }
        }
    };
}

macro_rules! implDecodeXY0 {
    ($type_name:ident) => {
        impl Decode for $type_name {
            fn decode(opcode: Opcode) -> Option<Self> {
                match opcode.xyn() {
                    (x, y, 0) => Some($type_name { x, y }),
                    _ => None,
                }
            }
        }
    };
}

macro_rules! implDecodeXYN {
    ($type_name:ident) => {
        impl Decode for $type_name {
            fn decode(opcode: Opcode) -> Option<Self> {
                let (x, y, n) = opcode.xyn();
                Some($type_name { x, y, n })
            }
        }
    };
}

macro_rules! implDecodeXYNE {
    ($type_name:ident : $ops:ident) => {
        impl Decode for $type_name {
            fn decode(opcode: Opcode) -> Option<Self> {
                let (x, y, n) = opcode.xyn();
                let ops = $ops::from_code(n)?;
                Some($type_name { ops, x, y })
            }
        }
    };
}

macro_rules! implDecodeXNNE {
    ($type_name:ident : $ops:ident) => {
        impl Decode for $type_name {
            fn decode(opcode: Opcode) -> Option<Self> {
                let (x, nn) = opcode.xnn();
                let ops = $ops::from_code(nn)?;
                Some($type_name { ops, x })
            }
        }
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum System {
    /// Clears the display
    Clear,
    /// Returns from the subroutine
    Return,
}

implFromCode!(System : Opcode :
    // 00E0
    // clear display
    0x00E0 => System::Clear,
    // 00EE
    // Return from sub routine => pop from stack
    0x00EE => System::Return,
);

impl Decode for System {
    fn decode(opcode: Opcode) -> Option<Self> {
        System::from_code(opcode)
    }
}

/// Operand of the `TNNN` instructions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Address {
    pub nnn: usize,
}

implDecodeNNN!(Address);

/// Operands of the `TXNN` instructions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterConst {
    pub x: usize,
    pub nn: u8,
}

implDecodeXNN!(RegisterConst);

/// Operands of the `TXY0` instructions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterPair {
    pub x: usize,
    pub y: usize,
}

implDecodeXY0!(RegisterPair);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithmeticOp {
    Assign,
    Or,
    And,
    Xor,
    Add,
    Sub,
    ShiftRight,
    SubReverse,
    ShiftLeft,
}

implFromCode!(ArithmeticOp : usize :
    // 8XY0
    // Sets VX to the value of VY.
    0x0 => ArithmeticOp::Assign,
    // 8XY1
    // Sets VX to VX or VY. (Bitwise OR operation)
    0x1 => ArithmeticOp::Or,
    // 8XY2
    // Sets VX to VX and VY. (Bitwise AND operation)
    0x2 => ArithmeticOp::And,
    // 8XY3
    // Sets VX to VX xor VY.
    0x3 => ArithmeticOp::Xor,
    // 8XY4
    // Adds VY to VX. VF is set to 1 when there's a carry, and to 0 when there isn't.
    0x4 => ArithmeticOp::Add,
    // 8XY5
    // VY is subtracted from VX. VF is set to 0 when there's a borrow, and 1 when there
    // isn't.
    0x5 => ArithmeticOp::Sub,
    // 8XY6
    // Stores the least significant bit of VX in VF and then shifts VX to the right
    // by 1.
    0x6 => ArithmeticOp::ShiftRight,
    // 8XY7
    // Sets VX to VY minus VX. VF is set to 0 when there's a borrow, and 1 when there
    // isn't.
    0x7 => ArithmeticOp::SubReverse,
    // 8XYE
    // Stores the most significant bit of VX in VF and then shifts VX to the left by 1.
    0xE => ArithmeticOp::ShiftLeft,
);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Arithmetic {
    pub ops: ArithmeticOp,
    pub x: usize,
    pub y: usize,
}

implDecodeXYNE!(Arithmetic : ArithmeticOp);

/// Operands of the `DXYN` instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sprite {
    pub x: usize,
    pub y: usize,
    pub n: usize,
}

implDecodeXYN!(Sprite);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOp {
    Pressed,
    NotPressed,
}

implFromCode!(KeyOp : u8 :
    // EX9E
    // Skips the next instruction if the key stored in VX is pressed. (Usually the next
    // instruction is a jump to skip a code block)
    0x9E => KeyOp::Pressed,
    // EXA1
    // Skips the next instruction if the key stored in VX isn't pressed. (Usually the
    // next instruction is a jump to skip a code block)
    0xA1 => KeyOp::NotPressed,
);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeySkip {
    pub ops: KeyOp,
    pub x: usize,
}

implDecodeXNNE!(KeySkip : KeyOp);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MiscOp {
    GetDelayTimer,
    AwaitKeyPress,
    SetDelayTimer,
    SetSoundTimer,
    AddVxToI,
    SetIToSprite,
    StoreBCD,
    StoreV0ToVx,
    FillV0ToVx,
}

implFromCode!(MiscOp : u8 :
    // FX07
    // Sets VX to the value of the delay timer.
    0x07 => MiscOp::GetDelayTimer,
    // FX0A
    // A key press is awaited, and then stored in VX.
    0x0A => MiscOp::AwaitKeyPress,
    // FX15
    // Sets the delay timer to VX.
    0x15 => MiscOp::SetDelayTimer,
    // FX18
    // Sets the sound timer to VX.
    0x18 => MiscOp::SetSoundTimer,
    // FX1E
    // Adds VX to I. VF is set to 1 when there is a range overflow (I+VX>0xFFF), and to
    // 0 when there isn't.
    0x1E => MiscOp::AddVxToI,
    // FX29
    // Sets I to the location of the sprite for the character in VX.
    0x29 => MiscOp::SetIToSprite,
    // FX33
    // Stores the binary-coded decimal representation of VX at I, I+1 and I+2.
    0x33 => MiscOp::StoreBCD,
    // FX55
    // Stores V0 to VX (including VX) in memory starting at address I.
    0x55 => MiscOp::StoreV0ToVx,
    // FX65
    // Fills V0 to VX (including VX) with values from memory starting at address I.
    0x65 => MiscOp::FillV0ToVx,
);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Misc {
    pub ops: MiscOp,
    pub x: usize,
}

implDecodeXNNE!(Misc : MiscOp);

/// A fully decoded instruction with its operands extracted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    /// `00E0`, `00EE`
    System(System),
    /// `1NNN`
    Jump(Address),
    /// `2NNN`
    Call(Address),
    /// `3XNN`
    SkipEqual(RegisterConst),
    /// `4XNN`
    SkipNotEqual(RegisterConst),
    /// `5XY0`
    SkipRegistersEqual(RegisterPair),
    /// `6XNN`
    Load(RegisterConst),
    /// `7XNN`
    Add(RegisterConst),
    /// `8XYT`
    Arithmetic(Arithmetic),
    /// `9XY0`
    SkipRegistersNotEqual(RegisterPair),
    /// `ANNN`
    SetIndex(Address),
    /// `BNNN`
    JumpOffset(Address),
    /// `CXNN`
    Random(RegisterConst),
    /// `DXYN`
    Draw(Sprite),
    /// `EXTT`
    Key(KeySkip),
    /// `FXTT`
    Misc(Misc),
}

#[inline]
fn decode<T: Decode>(value: Opcode) -> Option<T> {
    T::decode(value)
}

impl TryFrom<Opcode> for Instruction {
    type Error = OpcodeError;

    fn try_from(value: Opcode) -> Result<Self, Self::Error> {
        // Shifting t here so that match can use a lookup table instead of 'if else' blocks
        const SHIFT: usize = 4 * 3;
        let t = value.t() >> SHIFT;
        let res = match t {
            0x0 => decode(value).map(Instruction::System),
            0x1 => decode(value).map(Instruction::Jump),
            0x2 => decode(value).map(Instruction::Call),
            0x3 => decode(value).map(Instruction::SkipEqual),
            0x4 => decode(value).map(Instruction::SkipNotEqual),
            0x5 => decode(value).map(Instruction::SkipRegistersEqual),
            0x6 => decode(value).map(Instruction::Load),
            0x7 => decode(value).map(Instruction::Add),
            0x8 => decode(value).map(Instruction::Arithmetic),
            0x9 => decode(value).map(Instruction::SkipRegistersNotEqual),
            0xA => decode(value).map(Instruction::SetIndex),
            0xB => decode(value).map(Instruction::JumpOffset),
            0xC => decode(value).map(Instruction::Random),
            0xD => decode(value).map(Instruction::Draw),
            0xE => decode(value).map(Instruction::Key),
            0xF => decode(value).map(Instruction::Misc),
            _ => None,
        };
        res.ok_or(OpcodeError::Unimplemented(value))
    }
}

/// Represents a step of the program counter
/// this requires the enum ProgramCounterStep
/// to work.
pub trait ProgramCounter {
    /// will move the program counter forward by a step.
    fn advance(&mut self, step: ProgramCounterStep);
}

#[derive(Debug, PartialEq, Clone, Copy)]
/// Represents the outcome of a single step, reported up to the driver.
pub enum Operation {
    /// If no action has to be taken.
    None,
    /// The machine waits for a key press, the program counter did not move.
    Wait,
    /// The framebuffer changed and should be presented.
    Draw,
}

/// These are the traits that have to be full filled for a working opcode
/// table.
///
/// This trait requires the implementation of the [`ProgramCounter`](ProgramCounter) trait, as
/// every instruction decides how the program counter moves afterwards.
///
/// Every handler has to validate before it mutates, a returned error must leave the state as it
/// was.
pub trait ChipOpcodes: ProgramCounter {
    /// will execute a single decoded instruction
    fn calc(&mut self, instruction: &Instruction) -> Result<Operation, ProcessError> {
        let mut operation = Operation::None;
        let step_op = |(step, op)| {
            operation = op;
            step
        };

        let step = match instruction {
            Instruction::System(op) => self.system(op).map(step_op),
            Instruction::Jump(op) => self.jump(op),
            Instruction::Call(op) => self.call(op),
            Instruction::SkipEqual(op) => self.skip_equal(op),
            Instruction::SkipNotEqual(op) => self.skip_not_equal(op),
            Instruction::SkipRegistersEqual(op) => self.skip_registers_equal(op),
            Instruction::Load(op) => self.load(op),
            Instruction::Add(op) => self.add(op),
            Instruction::Arithmetic(op) => self.arithmetic(op),
            Instruction::SkipRegistersNotEqual(op) => self.skip_registers_not_equal(op),
            Instruction::SetIndex(op) => self.set_index(op),
            Instruction::JumpOffset(op) => self.jump_offset(op),
            Instruction::Random(op) => self.random(op),
            Instruction::Draw(op) => self.draw(op).map(step_op),
            Instruction::Key(op) => self.key(op),
            Instruction::Misc(op) => self.misc(op).map(step_op),
        }?;

        self.advance(step);
        Ok(operation)
    }

    /// - `00E0` - Display  - `disp_clear()`        - Clears the screen.
    /// - `00EE` - Flow     - `return;`             - Returns from a subroutine.
    fn system(&mut self, opcode: &System) -> Result<(ProgramCounterStep, Operation), ProcessError>;

    /// - `1NNN` - Flow     - `goto NNN;`           - Jumps to address `NNN`.
    fn jump(&self, opcode: &Address) -> Result<ProgramCounterStep, ProcessError>;

    /// - `2NNN` - Flow     - `*(0xNNN)()`          - Calls subroutine at `NNN`.
    fn call(&mut self, opcode: &Address) -> Result<ProgramCounterStep, ProcessError>;

    /// - `3XNN` - Cond     - `if(Vx==NN)`          - Skips the next instruction if `VX` equals `NN`.
    fn skip_equal(&self, opcode: &RegisterConst) -> Result<ProgramCounterStep, ProcessError>;

    /// - `4XNN` - Cond     - `if(Vx!=NN)`          - Skips the next instruction if `VX` doesn't equal `NN`.
    fn skip_not_equal(&self, opcode: &RegisterConst) -> Result<ProgramCounterStep, ProcessError>;

    /// - `5XY0` - Cond     - `if(Vx==Vy)`          - Skips the next instruction if `VX` equals `VY`.
    fn skip_registers_equal(
        &self,
        opcode: &RegisterPair,
    ) -> Result<ProgramCounterStep, ProcessError>;

    /// - `6XNN` - Const    - `Vx = NN`             - Sets `VX` to `NN`.
    fn load(&mut self, opcode: &RegisterConst) -> Result<ProgramCounterStep, ProcessError>;

    /// - `7XNN` - Const    - `Vx += NN`            - Adds `NN` to `VX`. (Carry flag is not changed)
    fn add(&mut self, opcode: &RegisterConst) -> Result<ProgramCounterStep, ProcessError>;

    /// A mutiuse opcode base for type `8XYT` (T is a sub opcode)
    ///
    /// - `8XY0` - Assign   - `Vx=Vy`               - Sets `VX` to the value of `VY`.
    /// - `8XY1` - BitOp    - `Vx=Vx|Vy`            - Sets `VX` to `VX` or `VY`.
    /// - `8XY2` - BitOp    - `Vx=Vx&Vy`            - Sets `VX` to `VX` and `VY`.
    /// - `8XY3` - BitOp    - `Vx=Vx^Vy`            - Sets `VX` to `VX` xor `VY`.
    /// - `8XY4` - Math     - `Vx += Vy`            - Adds `VY` to `VX`. `VF` is set to `1` when there's a carry, and to `0` when there isn't.
    /// - `8XY5` - Math     - `Vx -= Vy`            - `VY` is subtracted from `VX`. `VF` is set to `0` when there's a borrow, and `1` when there isn't.
    /// - `8XY6` - BitOp    - `Vx>>=1`              - Stores the least significant bit of `VX` in `VF` and then shifts `VX` to the right by `1`.
    /// - `8XY7` - Math     - `Vx=Vy-Vx`            - Sets `VX` to `VY` minus `VX`. `VF` is set to `0` when there's a borrow, and `1` when there isn't.
    /// - `8XYE` - BitOp    - `Vx<<=1`              - Stores the most significant bit of `VX` in `VF` and then shifts `VX` to the left by `1`.
    fn arithmetic(&mut self, opcode: &Arithmetic) -> Result<ProgramCounterStep, ProcessError>;

    /// - `9XY0` - Cond     - `if(Vx!=Vy)`          - Skips the next instruction if `VX` doesn't equal `VY`.
    fn skip_registers_not_equal(
        &self,
        opcode: &RegisterPair,
    ) -> Result<ProgramCounterStep, ProcessError>;

    /// - `ANNN` - MEM      - `I = NNN`             - Sets `I` to the address `NNN`.
    fn set_index(&mut self, opcode: &Address) -> Result<ProgramCounterStep, ProcessError>;

    /// - `BNNN` - Flow     - `PC=V0+NNN`           - Jumps to the address `NNN` plus `V0`.
    fn jump_offset(&self, opcode: &Address) -> Result<ProgramCounterStep, ProcessError>;

    /// - `CXNN` - Rand     - `Vx=rand()&NN`        - Sets `VX` to a random byte masked with `NN`.
    fn random(&mut self, opcode: &RegisterConst) -> Result<ProgramCounterStep, ProcessError>;

    /// - `DXYN` - Disp     - `draw(Vx,Vy,N)`       - Draws a sprite at coordinate `(VX, VY)` that has a width of `8` pixels and a height of `N` pixels, read from memory location `I`. `VF` is set to `1` if any screen pixels are flipped from set to unset, and to `0` if that doesn't happen.
    fn draw(&mut self, opcode: &Sprite) -> Result<(ProgramCounterStep, Operation), ProcessError>;

    /// A multiuse opcode base for type `EXTT` (T is a sub opcode)
    ///
    /// - `EX9E` - KeyOp    - `if(key()==Vx)`       - Skips the next instruction if the key stored in `VX` is pressed.
    /// - `EXA1` - KeyOp    - `if(key()!=Vx)`       - Skips the next instruction if the key stored in `VX` isn't pressed.
    fn key(&self, opcode: &KeySkip) -> Result<ProgramCounterStep, ProcessError>;

    /// A multiuse opcode base for type `FXTT` (T is a sub opcode)
    ///
    /// - `FX07` - Timer    - `Vx = get_delay()`    - Sets `VX` to the value of the delay timer.
    /// - `FX0A` - KeyOp    - `Vx = get_key()`      - A key press is awaited, and then stored in `VX`. Without a pressed key the step does nothing and has to be repeated.
    /// - `FX15` - Timer    - `delay_timer(Vx)`     - Sets the delay timer to `VX`.
    /// - `FX18` - Sound    - `sound_timer(Vx)`     - Sets the sound timer to `VX`.
    /// - `FX1E` - MEM      - `I +=Vx`              - Adds `VX` to `I`. `VF` is set to `1` when the result leaves the address range.
    /// - `FX29` - MEM      - `I=sprite_addr[Vx]`   - Sets `I` to the location of the font glyph for the character in `VX`.
    /// - `FX33` - BCD      - `246 => 2, 4, 6`      - Stores the [binary-coded decimal](https://en.wikipedia.org/wiki/Binary-coded_decimal) representation of `VX` at `I`, `I+1` and `I+2`.
    /// - `FX55` - MEM      - `reg_dump(Vx,&I)`     - Stores `V0` to `VX` (including `VX`) in memory starting at address `I`. `I` itself is left unmodified.
    /// - `FX65` - MEM      - `reg_load(Vx,&I)`     - Fills `V0` to `VX` (including `VX`) with values from memory starting at address `I`. `I` itself is left unmodified.
    fn misc(&mut self, opcode: &Misc) -> Result<(ProgramCounterStep, Operation), ProcessError>;
}

#[cfg(test)]
mod tests {
    use std::convert::TryInto;

    use super::*;

    #[test]
    fn test_tryfrom_opcode_simple() {
        let value: Opcode = 0x00E0;
        let conv: Result<Instruction, _> = value.try_into();
        assert_eq!(conv, Ok(Instruction::System(System::Clear)));
    }

    #[test]
    fn test_tryfrom_opcode_simple_fail() {
        let value: Opcode = 0x00E1;
        let conv: Result<Instruction, _> = value.try_into();
        assert_eq!(conv, Err(OpcodeError::Unimplemented(value)));
    }

    #[test]
    fn test_machine_code_routine_is_unimplemented() {
        // 0NNN calls into RCA 1802 machine code, which can not be emulated
        let value: Opcode = 0x0123;
        let conv: Result<Instruction, _> = value.try_into();
        assert!(conv.is_err());
    }

    #[test]
    fn test_build_opcode_bounds() {
        let data = [0x12, 0x34, 0x56];
        assert_eq!(build_opcode(&data, 1), Ok(0x3456));
        assert_eq!(
            build_opcode(&data, 2),
            Err(MemoryError::OutOfRange { address: 3, len: 3 })
        );
        assert!(build_opcode(&data, usize::MAX).is_err());
    }

    #[test]
    fn test_tryfrom_opcode_multiple() {
        let arithmetic = |ops| Ok(Instruction::Arithmetic(Arithmetic { ops, x: 0x1, y: 0x2 }));
        let misc = |ops| Ok(Instruction::Misc(Misc { ops, x: 0x0 }));
        let tests: Vec<(Opcode, Result<Instruction, ()>)> = vec![
            // System
            (0x00E0, Ok(Instruction::System(System::Clear))),
            (0x00EE, Ok(Instruction::System(System::Return))),
            (0x00E1, Err(())),
            (0x0000, Err(())),
            // Jump
            (0x1919, Ok(Instruction::Jump(Address { nnn: 0x919 }))),
            // Call
            (0x2222, Ok(Instruction::Call(Address { nnn: 0x222 }))),
            // Skips
            (
                0x3123,
                Ok(Instruction::SkipEqual(RegisterConst { x: 0x1, nn: 0x23 })),
            ),
            (
                0x4123,
                Ok(Instruction::SkipNotEqual(RegisterConst { x: 0x1, nn: 0x23 })),
            ),
            (
                0x5120,
                Ok(Instruction::SkipRegistersEqual(RegisterPair { x: 0x1, y: 0x2 })),
            ),
            (0x5121, Err(())),
            // Constants
            (
                0x6123,
                Ok(Instruction::Load(RegisterConst { x: 0x1, nn: 0x23 })),
            ),
            (
                0x7123,
                Ok(Instruction::Add(RegisterConst { x: 0x1, nn: 0x23 })),
            ),
            // Arithmetic
            (0x8120, arithmetic(ArithmeticOp::Assign)),
            (0x8121, arithmetic(ArithmeticOp::Or)),
            (0x8122, arithmetic(ArithmeticOp::And)),
            (0x8123, arithmetic(ArithmeticOp::Xor)),
            (0x8124, arithmetic(ArithmeticOp::Add)),
            (0x8125, arithmetic(ArithmeticOp::Sub)),
            (0x8126, arithmetic(ArithmeticOp::ShiftRight)),
            (0x8127, arithmetic(ArithmeticOp::SubReverse)),
            (0x812E, arithmetic(ArithmeticOp::ShiftLeft)),
            (0x8128, Err(())),
            (0x812F, Err(())),
            // Nine
            (
                0x9120,
                Ok(Instruction::SkipRegistersNotEqual(RegisterPair {
                    x: 0x1,
                    y: 0x2,
                })),
            ),
            (0x9121, Err(())),
            // Index and flow
            (0xA222, Ok(Instruction::SetIndex(Address { nnn: 0x222 }))),
            (0xB222, Ok(Instruction::JumpOffset(Address { nnn: 0x222 }))),
            (
                0xC123,
                Ok(Instruction::Random(RegisterConst { x: 0x1, nn: 0x23 })),
            ),
            (
                0xD123,
                Ok(Instruction::Draw(Sprite {
                    x: 0x1,
                    y: 0x2,
                    n: 0x3,
                })),
            ),
            // Keys
            (
                0xE19E,
                Ok(Instruction::Key(KeySkip {
                    x: 0x1,
                    ops: KeyOp::Pressed,
                })),
            ),
            (
                0xE1A1,
                Ok(Instruction::Key(KeySkip {
                    x: 0x1,
                    ops: KeyOp::NotPressed,
                })),
            ),
            (0xE111, Err(())),
            // Misc
            (0xF007, misc(MiscOp::GetDelayTimer)),
            (0xF00A, misc(MiscOp::AwaitKeyPress)),
            (0xF015, misc(MiscOp::SetDelayTimer)),
            (0xF018, misc(MiscOp::SetSoundTimer)),
            (0xF01E, misc(MiscOp::AddVxToI)),
            (0xF029, misc(MiscOp::SetIToSprite)),
            (0xF033, misc(MiscOp::StoreBCD)),
            (0xF055, misc(MiscOp::StoreV0ToVx)),
            (0xF065, misc(MiscOp::FillV0ToVx)),
            (0xF0AA, Err(())),
        ];
        for (value, res) in tests {
            let conv: Result<Instruction, _> = value.try_into();
            assert_eq!(
                conv,
                res.map_err(|_| OpcodeError::Unimplemented(value)),
                "decoding {:#06X}",
                value
            );
        }
    }

    #[test]
    fn test_step_distance() {
        assert_eq!(ProgramCounterStep::None.step(), 0);
        assert_eq!(ProgramCounterStep::Next.step(), memory::opcodes::SIZE);
        assert_eq!(ProgramCounterStep::Skip.step(), 2 * memory::opcodes::SIZE);
        assert_eq!(ProgramCounterStep::Jump(0x345).step(), 0x345);
    }
}
