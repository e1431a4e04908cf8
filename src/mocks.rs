use crate::bus::{RxChannel, Transport};
use crate::codec::BUFFER_LENGTH;
use alloc::vec::Vec;
use core::cell::Cell;
use embedded_hal::blocking::spi::Transfer;
use embedded_hal::digital::v2::{InputPin, OutputPin};
use embedded_time::clock::Error;
use embedded_time::duration::Duration;
use embedded_time::fixed_point::FixedPoint;
use embedded_time::fraction::Fraction;
use embedded_time::timer::param::{Armed, OneShot};
use embedded_time::{Clock, Instant, Timer};
use mockall::mock;

/// Microsecond clock advancing by a fixed step on every read
#[derive(Debug, PartialEq, Eq)]
pub struct TestClock {
    pub now: Cell<u64>,
    pub step: u64,
    /// Every read fails while set
    pub failing: bool,
}

impl TestClock {
    pub fn new(start: u64, step: u64) -> Self {
        Self {
            now: Cell::new(start),
            step,
            failing: false,
        }
    }
}

impl Default for TestClock {
    fn default() -> Self {
        Self::new(0, 100)
    }
}

impl Clock for TestClock {
    type T = u64;
    const SCALING_FACTOR: Fraction = Fraction::new(1, 1_000_000);

    fn try_now(&self) -> Result<Instant<Self>, Error> {
        if self.failing {
            return Err(Error::Unspecified);
        }

        let now = self.now.get();
        self.now.set(now + self.step);

        Ok(Instant::new(now))
    }

    fn new_timer<Dur>(&self, duration: Dur) -> Timer<'_, OneShot, Armed, Self, Dur>
    where
        Dur: Duration + FixedPoint,
    {
        Timer::new(self, duration)
    }
}

mock! {
    pub SPIBus {}

    impl Transfer<u8> for SPIBus{
        type Error = u32;

        fn transfer<'w>(&mut self, words: &'w mut [u8]) -> Result<&'static [u8], u32>;
    }
}

mock! {
    pub Pin {}

    impl OutputPin for Pin {
        type Error = u32;

        fn set_low(&mut self) -> Result<(), u32>;
        fn set_high(&mut self) -> Result<(), u32>;
    }
}

mock! {
    pub InterruptPin {}

    impl InputPin for InterruptPin {
        type Error = u32;

        fn is_high(&self) -> Result<bool, u32>;
        fn is_low(&self) -> Result<bool, u32>;
    }
}

/// Transport call recorded by [SimulatedChip]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BusOp {
    Reset,
    Read(u8, usize),
    Write(u8, Vec<u8>),
    Modify(u8, u8, u8),
    ReadStatus,
    ReadRxBuffer(RxChannel),
    RequestToSend(u8),
}

const CANSTAT: usize = 0x0E;
const CANCTRL: usize = 0x0F;

/// In-memory MCP2515 register file implementing [Transport]
#[derive(Debug)]
pub struct SimulatedChip {
    pub registers: [u8; 128],
    /// Every transport call in order
    pub log: Vec<BusOp>,
    /// Value returned by READ STATUS, receive full bits are cleared by buffer reads
    pub status: u8,
    pub rx_buffers: [[u8; BUFFER_LENGTH]; 2],
    /// Chip absent: all registers read as zero
    pub dead: bool,
    /// CANSTAT does not follow mode requests
    pub mode_stuck: bool,
    /// Error returned by the next transport call
    pub fail_next: Option<u32>,
}

impl Default for SimulatedChip {
    fn default() -> Self {
        Self {
            registers: [0u8; 128],
            log: Vec::new(),
            status: 0,
            rx_buffers: [[0u8; BUFFER_LENGTH]; 2],
            dead: false,
            mode_stuck: false,
            fail_next: None,
        }
    }
}

impl SimulatedChip {
    /// Makes a frame available in the given receive buffer
    pub fn receive(&mut self, channel: RxChannel, buffer: [u8; BUFFER_LENGTH]) {
        match channel {
            RxChannel::Rx0 => {
                self.rx_buffers[0] = buffer;
                self.status |= 0x01;
            }
            RxChannel::Rx1 => {
                self.rx_buffers[1] = buffer;
                self.status |= 0x02;
            }
        }
    }

    /// Recorded calls excluding the mode confirmation reads
    pub fn log_without_reads(&self) -> Vec<BusOp> {
        self.log
            .iter()
            .filter(|op| !matches!(op, BusOp::Read(..)))
            .cloned()
            .collect()
    }

    fn check_failure(&mut self) -> Result<(), u32> {
        match self.fail_next.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn follow_mode_request(&mut self) {
        if !self.mode_stuck && !self.dead {
            self.registers[CANSTAT] = (self.registers[CANSTAT] & 0x1F) | (self.registers[CANCTRL] & 0xE0);
        }
    }
}

impl Transport for SimulatedChip {
    type Error = u32;

    fn reset(&mut self) -> Result<(), u32> {
        self.check_failure()?;
        self.log.push(BusOp::Reset);

        self.registers = [0u8; 128];
        if !self.dead {
            self.registers[CANSTAT] = 0x80;
            self.registers[CANCTRL] = 0x87;
        }
        Ok(())
    }

    fn read_registers(&mut self, address: u8, data: &mut [u8]) -> Result<(), u32> {
        self.check_failure()?;
        self.log.push(BusOp::Read(address, data.len()));

        for (offset, byte) in data.iter_mut().enumerate() {
            *byte = self.registers[(address as usize + offset) % 128];
        }
        Ok(())
    }

    fn write_registers(&mut self, address: u8, data: &[u8]) -> Result<(), u32> {
        self.check_failure()?;
        self.log.push(BusOp::Write(address, data.to_vec()));

        for (offset, byte) in data.iter().enumerate() {
            self.registers[(address as usize + offset) % 128] = *byte;
        }
        self.follow_mode_request();
        Ok(())
    }

    fn modify_bits(&mut self, address: u8, mask: u8, value: u8) -> Result<(), u32> {
        self.check_failure()?;
        self.log.push(BusOp::Modify(address, mask, value));

        let register = &mut self.registers[address as usize % 128];
        *register = (*register & !mask) | (value & mask);
        self.follow_mode_request();
        Ok(())
    }

    fn read_status(&mut self) -> Result<u8, u32> {
        self.check_failure()?;
        self.log.push(BusOp::ReadStatus);

        Ok(self.status)
    }

    fn read_rx_buffer(&mut self, channel: RxChannel) -> Result<[u8; BUFFER_LENGTH], u32> {
        self.check_failure()?;
        self.log.push(BusOp::ReadRxBuffer(channel));

        match channel {
            RxChannel::Rx0 => {
                self.status &= !0x01;
                Ok(self.rx_buffers[0])
            }
            RxChannel::Rx1 => {
                self.status &= !0x02;
                Ok(self.rx_buffers[1])
            }
        }
    }

    fn request_to_send(&mut self, channels: u8) -> Result<(), u32> {
        self.check_failure()?;
        self.log.push(BusOp::RequestToSend(channels));

        for index in 0..3u8 {
            if channels & (1 << index) != 0 {
                self.registers[0x30 + 0x10 * index as usize] |= 0x08;
            }
        }
        Ok(())
    }
}
