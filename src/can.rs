//!# CAN Controller device
//!
//!```
//!# use mcp2515::bus::SpiTransport;
//!# use mcp2515::can::Controller;
//!# use mcp2515::config::Configuration;
//!# use mcp2515::example::*;
//!#
//! let transport = SpiTransport::new(ExampleSPIBus::default(), ExampleCSPin {});
//!
//! // Resets the chip and verifies it responds
//! let mut can_controller = Controller::new(transport, ExampleClock::default()).unwrap();
//!
//! // 500 kbps with 8 MHz crystal, no filter, normal mode
//! can_controller.start(&Configuration::default()).unwrap();
//! ```

use crate::bus::{RxChannel, Transport, TxChannel};
use crate::codec;
use crate::config::Configuration;
use crate::filter::RxFilter;
use crate::frame::{CanFrame, FrameError};
use crate::interrupt::{InterruptFlag, NoInterruptPin};
use crate::queue::{RawRxRecord, ReceiveQueue, ReceivedFrame};
use crate::registers::{
    CanCtrl, CanInte, QuickStatus, Rxb0Ctrl, MASK_REQOP, MASK_RXB0CTRL_FILTER, MASK_RXM, MASK_RX_INTERRUPTS,
    MASK_TXREQ, REGISTER_CANCTRL, REGISTER_CANINTE, REGISTER_CANSTAT, REGISTER_CNF3, REGISTER_RXB0CTRL,
    REGISTER_RXB1CTRL, REGISTER_RXF0, REGISTER_RXF1, REGISTER_RXF2, REGISTER_RXF3, REGISTER_RXF4, REGISTER_RXF5,
    REGISTER_RXM0, REGISTER_RXM1,
};
use crate::status::ControllerMode;
use crate::timing::UnsupportedConfig;
use core::fmt::Debug;
use embedded_hal::digital::v2::InputPin;
use embedded_time::duration::Milliseconds;
use embedded_time::Clock;
use log::{debug, trace, warn};

/// Max. time for the chip to confirm a requested operation mode
const MODE_TIMEOUT: Milliseconds<u32> = Milliseconds(2);

/// Time given to the chip after a software reset before it is accessed
const RESET_SETTLE_TIME: Milliseconds<u32> = Milliseconds(5);

/// Filter value written to the unused filters of receive buffer 1
const CLOSED_FILTER: [u8; 4] = [0xFF; 4];

/// Possible CAN errors during Configuration/Transmission/Reception
#[derive(Debug, PartialEq)]
pub enum CanError<E: Debug> {
    /// Transport error
    BusErr(E),
    /// Chip did not respond after reset (CANSTAT read as zero)
    HardwareFault,
    /// Crystal and bit rate combination not supported
    UnsupportedConfig(UnsupportedConfig),
    /// Interrupt subscription without configured interrupt pin
    MissingInterruptPin,
    /// Frame rejected before transmission
    InvalidFrame(FrameError),
    /// Operation not allowed in the current mode
    Inactive(ControllerMode),
    /// Device did not enter the requested mode within timeout of 2 ms
    ModeTimeout(ControllerMode),
    /// Internal clock error
    ClockError,
    /// Interrupt pin level could not be read
    InterruptPinErr,
}

impl<E: Debug> From<FrameError> for CanError<E> {
    fn from(value: FrameError) -> Self {
        CanError::InvalidFrame(value)
    }
}

impl<E: Debug> From<UnsupportedConfig> for CanError<E> {
    fn from(value: UnsupportedConfig) -> Self {
        CanError::UnsupportedConfig(value)
    }
}

impl<E: Debug> From<embedded_time::clock::Error> for CanError<E> {
    fn from(_error: embedded_time::clock::Error) -> Self {
        CanError::ClockError
    }
}

impl<E: Debug> embedded_can::Error for CanError<E> {
    fn kind(&self) -> embedded_can::ErrorKind {
        embedded_can::ErrorKind::Other
    }
}

/// Main MCP2515 CAN controller device
pub struct Controller<T, CLK, INT = NoInterruptPin> {
    /// Bus access to the chip
    transport: T,

    /// Monotonic clock for timeouts and receive timestamps
    clock: CLK,

    /// Optional INT line of the chip (active low)
    interrupt_pin: Option<INT>,

    /// Flag raised by the interrupt handler after subscription
    pending: Option<&'static InterruptFlag>,

    /// Last mode entered through the controller
    mode: ControllerMode,

    /// Received records not yet returned to the caller
    rx_queue: ReceiveQueue,
}

impl<T, CLK> Controller<T, CLK, NoInterruptPin>
where
    T: Transport,
    CLK: Clock<T = u64>,
{
    /// Resets the chip and verifies that it responds. Reception must be polled.
    pub fn new(transport: T, clock: CLK) -> Result<Self, CanError<T::Error>> {
        Self::init(transport, clock, None)
    }
}

impl<T, CLK, INT> Controller<T, CLK, INT>
where
    T: Transport,
    CLK: Clock<T = u64>,
    INT: InputPin,
{
    /// Resets the chip and verifies that it responds. The interrupt pin enables [Self::subscribe].
    pub fn with_interrupt(transport: T, clock: CLK, interrupt_pin: INT) -> Result<Self, CanError<T::Error>> {
        Self::init(transport, clock, Some(interrupt_pin))
    }

    fn init(transport: T, clock: CLK, interrupt_pin: Option<INT>) -> Result<Self, CanError<T::Error>> {
        let mut controller = Self {
            transport,
            clock,
            interrupt_pin,
            pending: None,
            mode: ControllerMode::Configuration,
            rx_queue: ReceiveQueue::new(),
        };

        controller.reset()?;

        let canstat = controller.transport.read_register(REGISTER_CANSTAT).map_err(CanError::BusErr)?;
        if canstat == 0 {
            debug!("CANSTAT read as zero after reset, chip not responding");
            return Err(CanError::HardwareFault);
        }

        Ok(controller)
    }

    /// Configures bit timing, filters and enters normal or listen-only mode
    pub fn start(&mut self, config: &Configuration) -> Result<(), CanError<T::Error>> {
        let timing = config.timing()?;

        self.reset()?;
        self.enable_mode(ControllerMode::Configuration)?;

        self.transport
            .write_registers(REGISTER_CNF3, timing.as_bytes())
            .map_err(CanError::BusErr)?;

        self.configure_filters(config.filter.as_ref())?;

        if self.pending.is_some() {
            self.enable_rx_interrupts()?;
        }

        let mode = if config.listen_only {
            ControllerMode::ListenOnly
        } else {
            ControllerMode::Normal
        };
        self.enable_mode(mode)?;

        debug!(
            "Controller started: {} kbps, {} MHz crystal, filter: {}, mode: {mode:?}",
            config.bitrate,
            config.crystal.mhz(),
            config.filter.is_some()
        );
        Ok(())
    }

    /// Puts the chip to sleep, transmission and reception cease
    pub fn stop(&mut self) -> Result<(), CanError<T::Error>> {
        self.request_mode(ControllerMode::Sleep)?;
        self.mode = ControllerMode::Sleep;

        Ok(())
    }

    /// Transmits the frame via the given buffer. A frame still pending in that buffer is cancelled.
    pub fn send(&mut self, frame: &CanFrame, channel: TxChannel) -> Result<(), CanError<T::Error>> {
        if !self.mode.is_active() {
            return Err(CanError::Inactive(self.mode));
        }

        let buffer = codec::encode(frame)?;

        self.transport
            .modify_bits(channel.control_register(), MASK_TXREQ, 0x0)
            .map_err(CanError::BusErr)?;

        self.transport
            .write_registers(channel.buffer_register(), &buffer)
            .map_err(CanError::BusErr)?;

        self.transport.request_to_send(channel.mask()).map_err(CanError::BusErr)?;

        trace!("Frame {frame} loaded into {channel:?}");
        Ok(())
    }

    /// Transmits the frame via transmit buffer 0
    pub fn transmit(&mut self, frame: &CanFrame) -> Result<(), CanError<T::Error>> {
        self.send(frame, TxChannel::default())
    }

    /// Moves full receive buffers into the receive queue, buffer 0 first.
    ///
    /// Must be called frequently: once both hardware buffers are full, the chip drops new frames.
    /// Returns true if one of the two upper status bits was set (advisory only).
    pub fn check_receive(&mut self) -> Result<bool, CanError<T::Error>> {
        let status = QuickStatus::from(self.transport.read_status().map_err(CanError::BusErr)?);

        for channel in RxChannel::ALL {
            let full = match channel {
                RxChannel::Rx0 => status.rx0if(),
                RxChannel::Rx1 => status.rx1if(),
            };

            if !full {
                continue;
            }

            // Reading the buffer clears its full flag on the chip
            let timestamp = self.timestamp()?;
            let buffer = self.transport.read_rx_buffer(channel).map_err(CanError::BusErr)?;
            let record = RawRxRecord::new(buffer, timestamp);

            trace!("Queued record from {channel:?} at {} ms", record.timestamp_ms());
            self.rx_queue.push(record);
        }

        let advisory = status.upper_status_advisory();
        if advisory {
            warn!("Status advisory bits set: {:#04X}", u8::from(status));
        }

        Ok(advisory)
    }

    /// Returns the oldest received frame, or None if nothing was received
    pub fn receive(&mut self) -> Result<Option<CanFrame>, CanError<T::Error>> {
        Ok(self.receive_record()?.map(|received| received.frame))
    }

    /// Returns the oldest received frame with its arrival time.
    ///
    /// The chip is only polled in normal and listen-only mode, otherwise already queued frames are returned.
    pub fn receive_record(&mut self) -> Result<Option<ReceivedFrame>, CanError<T::Error>> {
        if self.mode.is_active() {
            self.check_receive()?;
        }

        Ok(self.rx_queue.pop().map(|record| record.decode()))
    }

    /// Registers the flag raised by the interrupt handler and enables receive interrupts.
    /// The handler itself must only call [InterruptFlag::signal].
    pub fn subscribe(&mut self, flag: &'static InterruptFlag) -> Result<(), CanError<T::Error>> {
        if self.interrupt_pin.is_none() {
            return Err(CanError::MissingInterruptPin);
        }

        self.enable_rx_interrupts()?;
        self.pending = Some(flag);

        Ok(())
    }

    /// Drains the receive buffers from normal context.
    ///
    /// Without subscription the chip is always polled, as receive interrupts are disabled.
    /// Otherwise only if the interrupt flag was raised or the INT line is asserted.
    /// Returns true if frames are waiting in the queue.
    pub fn poll(&mut self) -> Result<bool, CanError<T::Error>> {
        if !self.mode.is_active() {
            return Ok(!self.rx_queue.is_empty());
        }

        let drain = match self.pending {
            None => true,
            Some(flag) => flag.take() || self.interrupt_asserted()?,
        };

        if drain {
            self.check_receive()?;
        }

        Ok(!self.rx_queue.is_empty())
    }

    /// Mode last entered through the controller
    pub fn mode(&self) -> ControllerMode {
        self.mode
    }

    /// Reads the current operation mode from CANSTAT.
    /// None if the chip reports a mode the driver does not use.
    pub fn read_mode(&mut self) -> Result<Option<ControllerMode>, CanError<T::Error>> {
        let canstat = self.transport.read_register(REGISTER_CANSTAT).map_err(CanError::BusErr)?;

        Ok(ControllerMode::from_register(canstat))
    }

    /// Number of received frames waiting in the queue
    pub fn pending(&self) -> usize {
        self.rx_queue.len()
    }

    /// Returns transport, clock and interrupt pin
    pub fn release(self) -> (T, CLK, Option<INT>) {
        (self.transport, self.clock, self.interrupt_pin)
    }

    /// Software reset and settle time. The chip returns to configuration mode.
    fn reset(&mut self) -> Result<(), CanError<T::Error>> {
        self.transport.reset().map_err(CanError::BusErr)?;
        self.mode = ControllerMode::Configuration;

        let target = self
            .clock
            .try_now()?
            .checked_add(RESET_SETTLE_TIME)
            .ok_or(CanError::ClockError)?;

        while self.clock.try_now()? < target {}

        Ok(())
    }

    /// Writes the REQOP bits of CANCTRL
    fn request_mode(&mut self, mode: ControllerMode) -> Result<(), CanError<T::Error>> {
        let canctrl = CanCtrl::new().with_reqop(mode as u8);

        self.transport
            .modify_bits(REGISTER_CANCTRL, MASK_REQOP, u8::from(canctrl))
            .map_err(CanError::BusErr)
    }

    /// Requests the given mode and waits max. 2 ms for CANSTAT to confirm it
    fn enable_mode(&mut self, mode: ControllerMode) -> Result<(), CanError<T::Error>> {
        self.request_mode(mode)?;

        let target = self
            .clock
            .try_now()?
            .checked_add(MODE_TIMEOUT)
            .ok_or(CanError::ClockError)?;

        loop {
            let current_mode = self.read_mode()?;

            if current_mode == Some(mode) {
                self.mode = mode;
                return Ok(());
            }

            if self.clock.try_now()? > target {
                debug!("Device did not enter requested mode within timeout. Requested mode: {mode:?}, current mode: {current_mode:?}");
                return Err(CanError::ModeTimeout(mode));
            }
        }
    }

    /// Receive buffer 0 uses the given filter (or accepts everything), buffer 1 is closed
    fn configure_filters(&mut self, filter: Option<&RxFilter>) -> Result<(), CanError<T::Error>> {
        match filter {
            None => {
                let rxb0ctrl = Rxb0Ctrl::new().with_rxm(0b11).with_bukt(true);
                self.transport
                    .modify_bits(REGISTER_RXB0CTRL, MASK_RXB0CTRL_FILTER, u8::from(rxb0ctrl))
                    .map_err(CanError::BusErr)?;
            }
            Some(filter) => {
                let rxb0ctrl = Rxb0Ctrl::new().with_rxm(0b00).with_bukt(true);
                self.transport
                    .modify_bits(REGISTER_RXB0CTRL, MASK_RXB0CTRL_FILTER, u8::from(rxb0ctrl))
                    .map_err(CanError::BusErr)?;

                for (register, value) in [
                    (REGISTER_RXF0, &filter.filter0),
                    (REGISTER_RXF1, &filter.filter1),
                    (REGISTER_RXM0, &filter.mask),
                ] {
                    self.transport.write_registers(register, value).map_err(CanError::BusErr)?;
                }
            }
        }

        self.transport
            .modify_bits(REGISTER_RXB1CTRL, MASK_RXM, 0x0)
            .map_err(CanError::BusErr)?;

        for register in [REGISTER_RXF2, REGISTER_RXF3, REGISTER_RXF4, REGISTER_RXF5, REGISTER_RXM1] {
            self.transport
                .write_registers(register, &CLOSED_FILTER)
                .map_err(CanError::BusErr)?;
        }

        Ok(())
    }

    /// Sets RX0IE and RX1IE so the INT line follows the receive buffer full flags
    fn enable_rx_interrupts(&mut self) -> Result<(), CanError<T::Error>> {
        let caninte = CanInte::new().with_rx0ie(true).with_rx1ie(true);

        self.transport
            .modify_bits(REGISTER_CANINTE, MASK_RX_INTERRUPTS, u8::from(caninte))
            .map_err(CanError::BusErr)
    }

    /// True if the active low INT line is asserted
    fn interrupt_asserted(&self) -> Result<bool, CanError<T::Error>> {
        match &self.interrupt_pin {
            Some(pin) => pin.is_low().map_err(|_| CanError::InterruptPinErr),
            None => Ok(false),
        }
    }

    /// Milliseconds since clock start
    fn timestamp(&self) -> Result<u64, CanError<T::Error>> {
        let since_start = self.clock.try_now()?.duration_since_epoch();
        let millis = Milliseconds::<u64>::try_from(since_start).map_err(|_| CanError::ClockError)?;

        Ok(millis.0)
    }

    #[cfg(test)]
    pub(crate) fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    #[cfg(test)]
    pub(crate) fn clock_mut(&mut self) -> &mut CLK {
        &mut self.clock
    }
}

impl<T, CLK, INT> embedded_can::nb::Can for Controller<T, CLK, INT>
where
    T: Transport,
    CLK: Clock<T = u64>,
    INT: InputPin,
{
    type Frame = CanFrame;
    type Error = CanError<T::Error>;

    fn transmit(&mut self, frame: &Self::Frame) -> nb::Result<Option<Self::Frame>, Self::Error> {
        Controller::transmit(self, frame)?;
        Ok(None)
    }

    fn receive(&mut self) -> nb::Result<Self::Frame, Self::Error> {
        match Controller::receive(self)? {
            Some(frame) => Ok(frame),
            None => Err(nb::Error::WouldBlock),
        }
    }
}
