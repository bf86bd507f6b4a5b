use crate::{
    definitions::{display, keyboard},
    ProcessError,
};

/// The pixels of the display, indexed by `[y][x]`.
pub type Framebuffer = [[bool; display::WIDTH]; display::HEIGHT];

#[cfg_attr(test, mockall::automock)]
/// The trait responsible for presenting the framebuffer
pub trait DisplayCommands {
    /// Will display all from the pixels
    fn display(&mut self, pixels: &Framebuffer);
}

/// Will represent the internal keyboard latch.
///
/// Input is done with a hex keyboard that has 16 keys ranging `0-F`. The `8`, `4`, `6`, and
/// `2` keys are typically used for directional input. Three opcodes are used to detect input.
/// One skips an instruction if a specific key is pressed, while another does the same if a
/// specific key is not pressed. The third waits for a key press, and then stores it in one of
/// the data registers.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct Keyboard {
    keys: [bool; keyboard::SIZE],
}

impl Keyboard {
    pub fn new() -> Self {
        Keyboard::default()
    }

    pub(crate) fn reset(&mut self) {
        self.keys = [false; keyboard::SIZE];
    }

    /// Will set the value of the given key
    pub fn set_key(&mut self, key: usize, to: bool) -> Result<(), ProcessError> {
        let entry = self
            .keys
            .get_mut(key)
            .ok_or(ProcessError::InvalidKey(key))?;
        *entry = to;
        Ok(())
    }

    /// Will overwrite the complete keyboard state
    pub fn set_mult(&mut self, keys: &[bool]) -> Result<(), ProcessError> {
        if keys.len() != self.keys.len() {
            return Err(ProcessError::InvalidKeyboardLen {
                len: keys.len(),
                expected: self.keys.len(),
            });
        }
        self.keys.copy_from_slice(keys);
        Ok(())
    }

    /// Only the low nibble selects a key, as there are only 16 of them.
    pub fn is_pressed(&self, key: u8) -> bool {
        self.keys[usize::from(key & 0xF)]
    }

    /// Will return the lowest pressed key
    pub fn first_pressed(&self) -> Option<usize> {
        self.keys.iter().position(|&pressed| pressed)
    }

    pub fn get_keys(&self) -> &[bool] {
        &self.keys
    }
}
