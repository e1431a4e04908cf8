//!# CAN frame
//! Value type passed to [crate::can::Controller::send] and returned by
//! [crate::can::Controller::receive]. Frames can be built from the public fields or through
//! the [embedded_can::Frame] constructors, which validate identifier and length.
//!
//! ```
//!# use mcp2515::frame::CanFrame;
//!# use embedded_can::{Frame, ExtendedId, StandardId};
//!#
//! let frame = CanFrame::new(StandardId::new(0x123).unwrap(), &[0x1, 0x2, 0x3]).unwrap();
//! assert_eq!(3, frame.dlc());
//!
//! let remote = CanFrame::new_remote(ExtendedId::new(0x14C92A2B).unwrap(), 8).unwrap();
//! assert!(remote.is_remote_frame());
//!
//! // More than 8 data bytes is not a CAN 2.0 frame
//! assert!(CanFrame::new(StandardId::new(0x1).unwrap(), &[0u8; 9]).is_none());
//! ```
use core::fmt;
use embedded_can::{ExtendedId, Frame, Id, StandardId};

pub const STANDARD_ID_MAX: u32 = 0x7FF;

pub const EXTENDED_ID_MAX: u32 = 0x1FFF_FFFF;

pub const MAX_PAYLOAD: usize = 8;

/// Reasons a frame can not be written to a transmit buffer
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FrameError {
    /// Data length code above 8
    InvalidDlc(u8),
    /// Identifier does not fit the 11 or 29 bit range of the frame kind
    InvalidId(u32),
}

/// CAN 2.0 frame
#[derive(Copy, Clone, Debug, Default)]
pub struct CanFrame {
    /// Raw identifier, 11 bits for standard and 29 bits for extended frames
    pub id: u32,
    pub extended: bool,
    /// Remote transmission request
    pub remote: bool,
    /// Data length code (0..=8)
    pub dlc: u8,
    /// Payload, bytes beyond `dlc` are ignored
    pub data: [u8; 8],
}

impl CanFrame {
    /// Checks identifier range and data length code
    pub fn validate(&self) -> Result<(), FrameError> {
        if self.dlc as usize > MAX_PAYLOAD {
            return Err(FrameError::InvalidDlc(self.dlc));
        }

        let max_id = if self.extended { EXTENDED_ID_MAX } else { STANDARD_ID_MAX };
        if self.id > max_id {
            return Err(FrameError::InvalidId(self.id));
        }

        Ok(())
    }

    /// Valid payload bytes, empty for remote frames
    pub fn payload(&self) -> &[u8] {
        if self.remote {
            return &[];
        }

        &self.data[..(self.dlc as usize).min(MAX_PAYLOAD)]
    }
}

impl PartialEq for CanFrame {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.extended == other.extended
            && self.remote == other.remote
            && self.dlc == other.dlc
            && self.payload() == other.payload()
    }
}

impl Eq for CanFrame {}

impl Frame for CanFrame {
    fn new(id: impl Into<Id>, data: &[u8]) -> Option<Self> {
        if data.len() > MAX_PAYLOAD {
            return None;
        }

        let mut frame = Self::from_id(id.into());
        frame.dlc = data.len() as u8;
        frame.data[..data.len()].copy_from_slice(data);
        Some(frame)
    }

    fn new_remote(id: impl Into<Id>, dlc: usize) -> Option<Self> {
        if dlc > MAX_PAYLOAD {
            return None;
        }

        let mut frame = Self::from_id(id.into());
        frame.remote = true;
        frame.dlc = dlc as u8;
        Some(frame)
    }

    fn is_extended(&self) -> bool {
        self.extended
    }

    fn is_remote_frame(&self) -> bool {
        self.remote
    }

    fn id(&self) -> Id {
        if self.extended {
            Id::Extended(ExtendedId::new(self.id & EXTENDED_ID_MAX).unwrap_or(ExtendedId::MAX))
        } else {
            Id::Standard(StandardId::new((self.id & STANDARD_ID_MAX) as u16).unwrap_or(StandardId::MAX))
        }
    }

    fn dlc(&self) -> usize {
        self.dlc as usize
    }

    fn data(&self) -> &[u8] {
        self.payload()
    }
}

impl CanFrame {
    fn from_id(id: Id) -> Self {
        match id {
            Id::Standard(sid) => Self {
                id: sid.as_raw() as u32,
                ..Default::default()
            },
            Id::Extended(eid) => Self {
                id: eid.as_raw(),
                extended: true,
                ..Default::default()
            },
        }
    }
}

/// One line summary: identifier, length and payload in hex
impl fmt::Display for CanFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#X}  [{}] ", self.id, self.dlc)?;

        if self.remote {
            return write!(f, " remote");
        }

        for byte in self.payload() {
            write!(f, " {byte:02X}")?;
        }
        Ok(())
    }
}
