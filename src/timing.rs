//!# Bit timing
//! CNF3/CNF2/CNF1 register values for the supported crystal and bit rate combinations.
//! Values are fixed per crystal; there is no computation of prescalers or segments.
//!
//! ```
//!# use mcp2515::timing::{BitTimingConfig, Crystal};
//!#
//! let timing = Crystal::MHz16.timing(500).unwrap();
//! assert_eq!(&[0x86, 0xF0, 0x00], timing.as_bytes());
//!
//! // Unlisted combinations are rejected up front
//! assert!(BitTimingConfig::lookup(16, 999).is_err());
//! ```
use serde::{Deserialize, Serialize};

/// Bit rate (kbps) to CNF3, CNF2, CNF1 for a 16 MHz crystal
const TIMINGS_16MHZ: [(u16, [u8; 3]); 14] = [
    (1000, [0x82, 0xD0, 0x00]),
    (500, [0x86, 0xF0, 0x00]),
    (250, [0x85, 0xF1, 0x41]),
    (200, [0x87, 0xFA, 0x01]),
    (125, [0x86, 0xF0, 0x03]),
    (100, [0x87, 0xFA, 0x03]),
    (95, [0x07, 0xAD, 0x03]),
    (80, [0x87, 0xFF, 0x03]),
    (50, [0x87, 0xFA, 0x07]),
    (40, [0x87, 0xFF, 0x07]),
    (33, [0x07, 0xBE, 0x09]),
    (20, [0x87, 0xFF, 0x0F]),
    (10, [0x87, 0xFF, 0x1F]),
    (5, [0x87, 0xFF, 0x3F]),
];

/// Bit rate (kbps) to CNF3, CNF2, CNF1 for an 8 MHz crystal
const TIMINGS_8MHZ: [(u16, [u8; 3]); 11] = [
    (500, [0x01, 0x91, 0x00]),
    (250, [0x03, 0xAC, 0x00]),
    (200, [0x04, 0xB6, 0x00]),
    (125, [0x03, 0xAC, 0x01]),
    (100, [0x04, 0xB6, 0x01]),
    (80, [0x02, 0x92, 0x04]),
    (50, [0x04, 0xB6, 0x03]),
    (40, [0x04, 0xB6, 0x04]),
    (20, [0x04, 0xB6, 0x09]),
    (10, [0x04, 0xB6, 0x13]),
    (5, [0x04, 0xB6, 0x27]),
];

/// Crystal oscillator mounted next to the MCP2515
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Crystal {
    MHz8,
    MHz16,
}

impl Default for Crystal {
    fn default() -> Self {
        Self::MHz8
    }
}

impl Crystal {
    /// Maps a frequency in MHz to a supported crystal
    pub fn from_mhz(mhz: u8) -> Option<Self> {
        match mhz {
            8 => Some(Self::MHz8),
            16 => Some(Self::MHz16),
            _ => None,
        }
    }

    pub fn mhz(&self) -> u8 {
        match self {
            Self::MHz8 => 8,
            Self::MHz16 => 16,
        }
    }

    /// Returns the timing register values for the given bit rate in kbps
    pub fn timing(&self, bitrate_kbps: u16) -> Result<BitTimingConfig, UnsupportedConfig> {
        self.table()
            .iter()
            .find(|(kbps, _)| *kbps == bitrate_kbps)
            .map(|(_, registers)| BitTimingConfig(*registers))
            .ok_or(UnsupportedConfig {
                crystal_mhz: self.mhz(),
                bitrate_kbps,
            })
    }

    /// Bit rates in kbps supported with this crystal, fastest first
    pub fn supported_bitrates(&self) -> impl Iterator<Item = u16> + 'static {
        self.table().iter().map(|(kbps, _)| *kbps)
    }

    fn table(&self) -> &'static [(u16, [u8; 3])] {
        match self {
            Self::MHz8 => &TIMINGS_8MHZ,
            Self::MHz16 => &TIMINGS_16MHZ,
        }
    }
}

/// Raw CNF3, CNF2, CNF1 values written in one sequential register write
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BitTimingConfig([u8; 3]);

impl BitTimingConfig {
    /// Looks up the timing for a crystal frequency in MHz (8 or 16) and a bit rate in kbps
    pub fn lookup(crystal_mhz: u8, bitrate_kbps: u16) -> Result<Self, UnsupportedConfig> {
        Crystal::from_mhz(crystal_mhz)
            .ok_or(UnsupportedConfig {
                crystal_mhz,
                bitrate_kbps,
            })?
            .timing(bitrate_kbps)
    }

    /// Register values in CNF3, CNF2, CNF1 order
    pub fn as_bytes(&self) -> &[u8; 3] {
        &self.0
    }
}

/// Crystal and bit rate combination not covered by the timing tables
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct UnsupportedConfig {
    pub crystal_mhz: u8,
    pub bitrate_kbps: u16,
}
