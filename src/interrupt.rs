//!# Interrupt signaling
//! The MCP2515 pulls its INT line low while a receive buffer is full. Handling is split in
//! two phases: the interrupt handler only calls [InterruptFlag::signal], the application
//! calls [crate::can::Controller::poll] from normal context, which performs all bus
//! transactions and owns the receive queue.
//!
//! ```
//!# use mcp2515::interrupt::InterruptFlag;
//!#
//! static CAN_PENDING: InterruptFlag = InterruptFlag::new();
//!
//! // Inside the GPIO falling edge handler
//! CAN_PENDING.signal();
//!
//! assert!(CAN_PENDING.take());
//! assert!(!CAN_PENDING.take());
//! ```
use core::convert::Infallible;
use core::sync::atomic::{AtomicBool, Ordering};
use embedded_hal::digital::v2::InputPin;

/// Pending flag shared between the interrupt handler and the polling path
#[derive(Debug, Default)]
pub struct InterruptFlag {
    pending: AtomicBool,
}

impl InterruptFlag {
    pub const fn new() -> Self {
        Self {
            pending: AtomicBool::new(false),
        }
    }

    /// Marks work as pending. Safe to call from interrupt context.
    pub fn signal(&self) {
        self.pending.store(true, Ordering::Release);
    }

    /// Returns and clears the pending state
    pub fn take(&self) -> bool {
        // load/store instead of swap, targets like thumbv6m lack atomic read-modify-write
        if !self.pending.load(Ordering::Acquire) {
            return false;
        }

        self.pending.store(false, Ordering::Release);
        true
    }

    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }
}

/// Placeholder pin type for controllers without an interrupt line
#[derive(Debug)]
pub enum NoInterruptPin {}

impl InputPin for NoInterruptPin {
    type Error = Infallible;

    fn is_high(&self) -> Result<bool, Self::Error> {
        match *self {}
    }

    fn is_low(&self) -> Result<bool, Self::Error> {
        match *self {}
    }
}
