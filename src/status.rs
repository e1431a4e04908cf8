use crate::registers::CanStat;
use serde::{Deserialize, Serialize};

/// Operation modes the controller drives the chip through
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControllerMode {
    /// Module is in configuration mode, entered on reset
    Configuration = 0b100,
    /// Module is in normal operation mode
    Normal = 0b000,
    /// Module is in listen-only mode, never acknowledges or transmits
    ListenOnly = 0b011,
    /// Module is in sleep mode
    Sleep = 0b001,
}

impl ControllerMode {
    /// Maps the OPMOD bits of CANSTAT to a mode.
    /// Returns None for modes the driver never requests (loopback, undefined encodings).
    pub(crate) fn from_register(register: u8) -> Option<Self> {
        match CanStat::from(register).opmod() {
            0b100 => Some(Self::Configuration),
            0b000 => Some(Self::Normal),
            0b011 => Some(Self::ListenOnly),
            0b001 => Some(Self::Sleep),
            _ => None,
        }
    }

    /// True if frames may be queued for transmission and the receive buffers are polled
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Normal | Self::ListenOnly)
    }
}
