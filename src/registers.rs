#![allow(unused_braces)]
use modular_bitfield_msb::prelude::*;

/// Mask register group 0 (RXM0SIDH..RXM0EID0)
pub(crate) const REGISTER_RXM0: u8 = 0x20;

/// Mask register group 1 (RXM1SIDH..RXM1EID0)
pub(crate) const REGISTER_RXM1: u8 = 0x24;

/// Filter register groups RXF0..RXF5
pub(crate) const REGISTER_RXF0: u8 = 0x00;
pub(crate) const REGISTER_RXF1: u8 = 0x04;
pub(crate) const REGISTER_RXF2: u8 = 0x08;
pub(crate) const REGISTER_RXF3: u8 = 0x10;
pub(crate) const REGISTER_RXF4: u8 = 0x14;
pub(crate) const REGISTER_RXF5: u8 = 0x18;

pub(crate) const REGISTER_CANSTAT: u8 = 0x0E;

pub(crate) const REGISTER_CANCTRL: u8 = 0x0F;

/// First byte of the bit timing triplet (CNF3, CNF2, CNF1)
pub(crate) const REGISTER_CNF3: u8 = 0x28;

pub(crate) const REGISTER_CANINTE: u8 = 0x2B;

pub(crate) const REGISTER_RXB0CTRL: u8 = 0x60;

pub(crate) const REGISTER_RXB1CTRL: u8 = 0x70;

/// REQOP bits of CANCTRL
pub(crate) const MASK_REQOP: u8 = 0b1110_0000;

/// RXM and BUKT bits of RXB0CTRL
pub(crate) const MASK_RXB0CTRL_FILTER: u8 = 0b0110_0100;

/// RXM bits of RXB0CTRL/RXB1CTRL
pub(crate) const MASK_RXM: u8 = 0b0110_0000;

/// TXREQ bit of TXBnCTRL
pub(crate) const MASK_TXREQ: u8 = 0b0000_1000;

/// RX0IE and RX1IE bits of CANINTE
pub(crate) const MASK_RX_INTERRUPTS: u8 = 0b0000_0011;

#[bitfield]
#[derive(Default)]
#[repr(u8)]
/// CAN control register
pub struct CanCtrl {
    /// Request operation mode bits
    pub reqop: B3,
    /// Abort all pending transmissions bit
    pub abat: bool,
    /// One-shot mode bit
    pub osm: bool,
    /// CLKOUT pin enable bit
    pub clken: bool,
    /// CLKOUT pin prescaler bits
    pub clkpre: B2,
}

#[bitfield]
#[derive(Default)]
#[repr(u8)]
/// CAN status register
pub struct CanStat {
    /// Operation mode bits
    pub opmod: B3,
    #[skip]
    __: B1,
    /// Interrupt flag code bits
    pub icod: B3,
    #[skip]
    __: B1,
}

#[bitfield]
#[derive(Default)]
#[repr(u8)]
/// Receive buffer 0 control register
pub struct Rxb0Ctrl {
    #[skip]
    __: B1,
    /// Receive buffer operating mode bits
    pub rxm: B2,
    #[skip]
    __: B1,
    /// Received remote transfer request bit
    pub rxrtr: bool,
    /// Rollover enable bit
    pub bukt: bool,
    /// Read-only copy of BUKT
    pub bukt1: bool,
    /// Filter hit bit
    pub filhit0: bool,
}

#[bitfield]
#[derive(Default)]
#[repr(u8)]
/// Transmit buffer control register
pub struct TxbCtrl {
    #[skip]
    __: B1,
    /// Message aborted flag bit
    pub abtf: bool,
    /// Message lost arbitration bit
    pub mloa: bool,
    /// Transmission error detected bit
    pub txerr: bool,
    /// Message transmit request bit
    pub txreq: bool,
    #[skip]
    __: B1,
    /// Transmit buffer priority bits
    pub txp: B2,
}

#[bitfield]
#[derive(Default)]
#[repr(u8)]
/// CAN interrupt enable register
pub struct CanInte {
    pub merre: bool,
    pub wakie: bool,
    pub errie: bool,
    pub tx2ie: bool,
    pub tx1ie: bool,
    pub tx0ie: bool,
    pub rx1ie: bool,
    pub rx0ie: bool,
}

#[bitfield]
#[derive(Default)]
#[repr(u8)]
/// Byte returned by the READ STATUS instruction
pub struct QuickStatus {
    pub tx2if: bool,
    pub txb2req: bool,
    pub tx1if: bool,
    pub txb1req: bool,
    pub tx0if: bool,
    pub txb0req: bool,
    /// Receive buffer 1 full
    pub rx1if: bool,
    /// Receive buffer 0 full
    pub rx0if: bool,
}

impl QuickStatus {
    /// Returns true if TX2IF or TXB2REQ (bits 7..6) is set
    pub fn upper_status_advisory(&self) -> bool {
        self.tx2if() || self.txb2req()
    }
}
