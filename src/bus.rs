//!# SPI transport
//! [Transport] is the set of primitive MCP2515 instructions the controller is built on.
//! Every method is one complete bus transaction. [SpiTransport] implements it on top of a
//! blocking SPI bus and a chip-select pin, asserting CS for the duration of each instruction.
//!
//! ```
//!# use mcp2515::bus::{SpiTransport, Transport};
//!# use mcp2515::example::{ExampleCSPin, ExampleSPIBus};
//!#
//! let mut transport = SpiTransport::new(ExampleSPIBus::default(), ExampleCSPin {});
//! transport.reset().unwrap();
//!
//! // CANSTAT reports configuration mode after reset
//! assert_eq!(0x80, transport.read_register(0x0E).unwrap());
//! ```
use crate::codec::BUFFER_LENGTH;
use core::fmt::Debug;
use embedded_hal::blocking::spi::Transfer;
use embedded_hal::digital::v2::OutputPin;

/// Bytes moved per SPI transfer during data phases
const CHUNK_SIZE: usize = 16;

/// SPI instruction set
#[derive(Copy, Clone)]
#[repr(u8)]
enum Instruction {
    Write = 0x02,
    Read = 0x03,
    BitModify = 0x05,
    RequestToSend = 0x80,
    ReadRx0 = 0x90,
    ReadRx1 = 0x94,
    ReadStatus = 0xA0,
    Reset = 0xC0,
}

/// Primitive chip operations, each one exclusive bus transaction
pub trait Transport {
    type Error: Debug;

    /// Software reset: configuration mode, registers at power-on defaults
    fn reset(&mut self) -> Result<(), Self::Error>;

    /// Reads `data.len()` registers starting at `address`
    fn read_registers(&mut self, address: u8, data: &mut [u8]) -> Result<(), Self::Error>;

    /// Writes registers sequentially starting at `address`
    fn write_registers(&mut self, address: u8, data: &[u8]) -> Result<(), Self::Error>;

    /// Sets the bits selected by `mask` to the corresponding bits of `value`
    fn modify_bits(&mut self, address: u8, mask: u8, value: u8) -> Result<(), Self::Error>;

    /// Quick status byte (receive buffer full flags, transmit requests)
    fn read_status(&mut self) -> Result<u8, Self::Error>;

    /// Reads the 13 byte receive buffer. The chip clears the buffer full flag afterwards.
    fn read_rx_buffer(&mut self, channel: RxChannel) -> Result<[u8; BUFFER_LENGTH], Self::Error>;

    /// Requests transmission for the transmit buffers selected by the lower 3 bits
    fn request_to_send(&mut self, channels: u8) -> Result<(), Self::Error>;

    /// Reads a single register byte
    fn read_register(&mut self, address: u8) -> Result<u8, Self::Error> {
        let mut data = [0u8; 1];
        self.read_registers(address, &mut data)?;
        Ok(data[0])
    }
}

/// Hardware transmit buffers
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum TxChannel {
    #[default]
    Tx0 = 0,
    Tx1 = 1,
    Tx2 = 2,
}

impl TxChannel {
    pub const ALL: [Self; 3] = [Self::Tx0, Self::Tx1, Self::Tx2];

    /// Address of TXBnCTRL
    pub(crate) fn control_register(&self) -> u8 {
        0x30 + 0x10 * (*self as u8)
    }

    /// Address of TXBnSIDH, start of the 13 byte buffer
    pub(crate) fn buffer_register(&self) -> u8 {
        self.control_register() + 1
    }

    /// Bit of this buffer in the request-to-send mask
    pub(crate) fn mask(&self) -> u8 {
        1 << (*self as u8)
    }
}

impl TryFrom<u8> for TxChannel {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Tx0),
            1 => Ok(Self::Tx1),
            2 => Ok(Self::Tx2),
            other => Err(other),
        }
    }
}

/// Hardware receive buffers
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RxChannel {
    Rx0,
    Rx1,
}

impl RxChannel {
    /// Order in which full buffers are drained
    pub const ALL: [Self; 2] = [Self::Rx0, Self::Rx1];

    fn instruction(&self) -> Instruction {
        match self {
            Self::Rx0 => Instruction::ReadRx0,
            Self::Rx1 => Instruction::ReadRx1,
        }
    }
}

/// Errors of the SPI transport
#[derive(Debug, PartialEq, Eq)]
pub enum BusError<B, CS> {
    /// SPI transfer failed
    TransferError(B),
    /// Chip-select pin could not be driven
    CSError(CS),
}

/// [Transport] over a blocking SPI bus with a dedicated chip-select pin
pub struct SpiTransport<B, CS> {
    bus: B,

    /// Active low chip-select
    pin_cs: CS,
}

impl<B: Transfer<u8>, CS: OutputPin> SpiTransport<B, CS> {
    pub fn new(bus: B, pin_cs: CS) -> Self {
        Self { bus, pin_cs }
    }

    /// Returns bus and pin
    pub fn release(self) -> (B, CS) {
        (self.bus, self.pin_cs)
    }

    /// Runs the given transfers while CS is asserted. CS is released on transfer errors too.
    fn transaction<R>(
        &mut self,
        transfers: impl FnOnce(&mut B) -> Result<R, B::Error>,
    ) -> Result<R, BusError<B::Error, CS::Error>> {
        self.pin_cs.set_low().map_err(BusError::CSError)?;
        let result = transfers(&mut self.bus);
        self.pin_cs.set_high().map_err(BusError::CSError)?;

        result.map_err(BusError::TransferError)
    }
}

impl<B, CS> Transport for SpiTransport<B, CS>
where
    B: Transfer<u8>,
    B::Error: Debug,
    CS: OutputPin,
    CS::Error: Debug,
{
    type Error = BusError<B::Error, CS::Error>;

    fn reset(&mut self) -> Result<(), Self::Error> {
        self.transaction(|bus| {
            bus.transfer(&mut [Instruction::Reset as u8])?;
            Ok(())
        })
    }

    fn read_registers(&mut self, address: u8, data: &mut [u8]) -> Result<(), Self::Error> {
        self.transaction(|bus| {
            bus.transfer(&mut [Instruction::Read as u8, address])?;
            read_chunks(bus, data)
        })
    }

    fn write_registers(&mut self, address: u8, data: &[u8]) -> Result<(), Self::Error> {
        self.transaction(|bus| {
            bus.transfer(&mut [Instruction::Write as u8, address])?;
            write_chunks(bus, data)
        })
    }

    fn modify_bits(&mut self, address: u8, mask: u8, value: u8) -> Result<(), Self::Error> {
        self.transaction(|bus| {
            bus.transfer(&mut [Instruction::BitModify as u8, address, mask, value])?;
            Ok(())
        })
    }

    fn read_status(&mut self) -> Result<u8, Self::Error> {
        self.transaction(|bus| {
            let mut words = [Instruction::ReadStatus as u8, 0x0];
            let received = bus.transfer(&mut words)?;
            Ok(received[1])
        })
    }

    fn read_rx_buffer(&mut self, channel: RxChannel) -> Result<[u8; BUFFER_LENGTH], Self::Error> {
        let mut buffer = [0u8; BUFFER_LENGTH];

        self.transaction(|bus| {
            bus.transfer(&mut [channel.instruction() as u8])?;
            read_chunks(bus, &mut buffer)
        })?;

        Ok(buffer)
    }

    fn request_to_send(&mut self, channels: u8) -> Result<(), Self::Error> {
        self.transaction(|bus| {
            bus.transfer(&mut [Instruction::RequestToSend as u8 | (channels & 0x07)])?;
            Ok(())
        })
    }
}

/// Clocks out dummy bytes and copies the received bytes into `data`
fn read_chunks<B: Transfer<u8>>(bus: &mut B, data: &mut [u8]) -> Result<(), B::Error> {
    let mut scratch = [0u8; CHUNK_SIZE];

    for chunk in data.chunks_mut(CHUNK_SIZE) {
        let words = &mut scratch[..chunk.len()];
        words.fill(0);

        let received = bus.transfer(words)?;
        chunk.copy_from_slice(&received[..chunk.len()]);
    }

    Ok(())
}

/// Clocks out `data`, received bytes are discarded
fn write_chunks<B: Transfer<u8>>(bus: &mut B, data: &[u8]) -> Result<(), B::Error> {
    let mut scratch = [0u8; CHUNK_SIZE];

    for chunk in data.chunks(CHUNK_SIZE) {
        let words = &mut scratch[..chunk.len()];
        words.copy_from_slice(chunk);

        bus.transfer(words)?;
    }

    Ok(())
}
