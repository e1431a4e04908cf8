//!# Receive filter
//! The [RxFilter] object configures the acceptance filters of receive buffer 0
//! (RXF0, RXF1 and mask RXM0). A frame is accepted if the identifier bits selected by the
//! mask match one of the two filters. Receive buffer 1 is closed by the controller.
//!
//! ```
//!# use mcp2515::filter::RxFilter;
//!# use embedded_can::{Id, StandardId};
//!
//! // Accept exactly 0x123 and 0x124
//! let filter = RxFilter::new(
//!     Id::Standard(StandardId::new(0x123).unwrap()),
//!     Id::Standard(StandardId::new(0x124).unwrap()),
//!     Id::Standard(StandardId::MAX),
//! );
//! ```
use crate::codec::encode_id;
use embedded_can::Id;
use serde::{Deserialize, Serialize};

/// Register values for filter 0, filter 1 and mask 0
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RxFilter {
    /// RXF0SIDH..RXF0EID0
    pub(crate) filter0: [u8; 4],
    /// RXF1SIDH..RXF1EID0
    pub(crate) filter1: [u8; 4],
    /// RXM0SIDH..RXM0EID0
    pub(crate) mask: [u8; 4],
}

impl RxFilter {
    /// Creates a filter from two identifiers and the mask selecting the relevant bits
    pub fn new(filter0: Id, filter1: Id, mask: Id) -> Self {
        Self {
            filter0: Self::register_value(filter0),
            filter1: Self::register_value(filter1),
            mask: Self::register_value(mask),
        }
    }

    /// Filter accepting only the given identifier
    pub fn exact(identifier: Id) -> Self {
        let mask = match identifier {
            Id::Standard(_) => Id::Standard(embedded_can::StandardId::MAX),
            Id::Extended(_) => Id::Extended(embedded_can::ExtendedId::MAX),
        };

        Self::new(identifier, identifier, mask)
    }

    /// Creates a filter from raw register values (SIDH, SIDL, EID8, EID0)
    pub fn from_registers(filter0: [u8; 4], filter1: [u8; 4], mask: [u8; 4]) -> Self {
        Self { filter0, filter1, mask }
    }

    fn register_value(identifier: Id) -> [u8; 4] {
        match identifier {
            Id::Standard(sid) => encode_id(sid.as_raw() as u32, false),
            Id::Extended(eid) => encode_id(eid.as_raw(), true),
        }
    }
}
