use std::{sync::Arc, time::Duration};

use parking_lot::Mutex;

use crate::{
    chip8::Machine,
    definitions::{cpu, timer},
    devices::DisplayCommands,
    opcode::Operation,
    timer::TimedWorker,
    ProcessError,
};

/// The pace at which the machine is driven.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Speed {
    /// the time between two steps
    pub cpu: Duration,
    /// the time between two timer ticks
    pub timers: Duration,
}

impl Default for Speed {
    fn default() -> Self {
        Self {
            cpu: Duration::from_millis(cpu::INTERVAL),
            timers: Duration::from_micros(timer::INTERVAL),
        }
    }
}

/// Drives a shared machine on two workers, one stepping the cpu and one ticking the timers.
/// Both are stopped once the runner is dropped.
pub struct Runner<W: TimedWorker> {
    cpu: W,
    timers: W,
    error: Arc<Mutex<Option<ProcessError>>>,
}

impl<W: TimedWorker> Runner<W> {
    /// The error that halted the cpu, if any.
    pub fn error(&self) -> Option<ProcessError> {
        self.error.lock().clone()
    }

    pub fn is_alive(&self) -> bool {
        self.cpu.is_alive() && self.timers.is_alive()
    }

    /// Will stop both workers, the machine keeps its state.
    pub fn stop(&mut self) {
        self.cpu.stop();
        self.timers.stop();
    }
}

impl<W: TimedWorker> Drop for Runner<W> {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Will start running the given machine.
///
/// The display is called every time a step changed the framebuffer. The first failing step is
/// logged and stored, after that the cpu does no further steps while the timers keep running.
pub fn run<D, W>(machine: Arc<Mutex<Machine>>, mut display: D, speed: Speed) -> Runner<W>
where
    D: DisplayCommands + Send + 'static,
    W: TimedWorker,
{
    let error = Arc::new(Mutex::new(None));

    let cpu_machine = machine.clone();
    let cpu_error = error.clone();
    let step = move || {
        if cpu_error.lock().is_some() {
            return;
        }

        let mut chip = cpu_machine.lock();
        match chip.step() {
            Ok(Operation::Draw) => {
                /* draw the screen */
                display.display(chip.get_display());
                chip.acknowledge_redraw();
            }
            // a waiting machine simply repeats the instruction
            Ok(Operation::None) | Ok(Operation::Wait) => {}
            Err(err) => {
                log::error!(
                    "Halting at {:#06X} after: {}",
                    chip.program_counter(),
                    err
                );
                *cpu_error.lock() = Some(err);
            }
        }
    };

    let tick = move || machine.lock().tick_timers();

    let mut cpu = W::new();
    cpu.start(step, speed.cpu);

    let mut timers = W::new();
    timers.start(tick, speed.timers);

    Runner { cpu, timers, error }
}
