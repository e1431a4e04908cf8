//! # Mock dummy structure for doc examples
//!
//! [ExampleSPIBus] emulates the parts of the MCP2515 the driver uses. Transmitted frames
//! are looped back into receive buffer 0.
use core::cell::Cell;
use core::convert::Infallible;
use embedded_hal::blocking::spi::Transfer;
use embedded_hal::digital::v2::OutputPin;
use embedded_time::clock::Error;
use embedded_time::duration::{Duration, Fraction};
use embedded_time::fixed_point::FixedPoint;
use embedded_time::timer::param::{Armed, OneShot};
use embedded_time::{Clock, Instant, Timer};

const CANSTAT: usize = 0x0E;
const CANCTRL: usize = 0x0F;
const CANINTF: usize = 0x2C;

/// Instruction waiting for its data phase
#[derive(Copy, Clone, Debug)]
enum Pending {
    Read(u8),
    Write(u8),
    ReadRx0,
    ReadRx1,
}

#[derive(Debug)]
pub struct ExampleSPIBus {
    registers: [u8; 128],
    rx_buffer: [u8; 13],
    pending: Option<Pending>,
}

impl Default for ExampleSPIBus {
    fn default() -> Self {
        let mut registers = [0u8; 128];
        registers[CANSTAT] = 0x80;
        registers[CANCTRL] = 0x87;

        Self {
            registers,
            rx_buffer: [0u8; 13],
            pending: None,
        }
    }
}

impl ExampleSPIBus {
    fn instruction(&mut self, words: &mut [u8]) {
        match words[0] {
            0xC0 => *self = Self::default(),
            0x02 => self.pending = Some(Pending::Write(words[1])),
            0x03 => self.pending = Some(Pending::Read(words[1])),
            0x05 => {
                let register = &mut self.registers[words[1] as usize % 128];
                *register = (*register & !words[2]) | (words[3] & words[2]);
                self.follow_mode_request();
            }
            0x90 => self.pending = Some(Pending::ReadRx0),
            0x94 => self.pending = Some(Pending::ReadRx1),
            0xA0 => words[1] = self.registers[CANINTF] & 0x03,
            0x81 => {
                // Loopback of transmit buffer 0
                self.rx_buffer.copy_from_slice(&self.registers[0x31..0x3E]);
                self.registers[CANINTF] |= 0x01;
            }
            _ => {}
        }
    }

    fn data_phase(&mut self, pending: Pending, words: &mut [u8]) {
        match pending {
            Pending::Read(address) => {
                for (offset, word) in words.iter_mut().enumerate() {
                    *word = self.registers[(address as usize + offset) % 128];
                }
            }
            Pending::Write(address) => {
                for (offset, word) in words.iter().enumerate() {
                    self.registers[(address as usize + offset) % 128] = *word;
                }
                self.follow_mode_request();
            }
            Pending::ReadRx0 => {
                words.copy_from_slice(&self.rx_buffer[..words.len()]);
                self.registers[CANINTF] &= !0x01;
            }
            Pending::ReadRx1 => words.fill(0),
        }
    }

    fn follow_mode_request(&mut self) {
        self.registers[CANSTAT] = (self.registers[CANSTAT] & 0x1F) | (self.registers[CANCTRL] & 0xE0);
    }
}

impl Transfer<u8> for ExampleSPIBus {
    type Error = Infallible;

    fn transfer<'w>(&mut self, words: &'w mut [u8]) -> Result<&'w [u8], Self::Error> {
        match self.pending.take() {
            Some(pending) => self.data_phase(pending, words),
            None => self.instruction(words),
        }

        Ok(words)
    }
}

#[derive(Debug, Default)]
pub struct ExampleCSPin {}

impl OutputPin for ExampleCSPin {
    type Error = Infallible;

    fn set_low(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Microsecond clock advancing 100 us on every read
#[derive(Debug, Default)]
pub struct ExampleClock {
    ticks: Cell<u64>,
}

impl Clock for ExampleClock {
    type T = u64;
    const SCALING_FACTOR: Fraction = Fraction::new(1, 1_000_000);

    fn try_now(&self) -> Result<Instant<Self>, Error> {
        let now = self.ticks.get();
        self.ticks.set(now + 100);

        Ok(Instant::new(now))
    }

    fn new_timer<Dur: Duration + FixedPoint>(&self, duration: Dur) -> Timer<'_, OneShot, Armed, Self, Dur> {
        Timer::new(self, duration)
    }
}
