use crate::filter::RxFilter;
use crate::timing::{BitTimingConfig, Crystal, UnsupportedConfig};
use serde::{Deserialize, Serialize};

/// Settings applied by [crate::can::Controller::start]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Configuration {
    /// CAN bit rate in kbps
    pub bitrate: u16,

    /// Crystal oscillator of the board
    pub crystal: Crystal,

    /// Acceptance filter for receive buffer 0, None accepts every frame
    pub filter: Option<RxFilter>,

    /// Enter listen-only instead of normal mode
    pub listen_only: bool,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            bitrate: 500,
            crystal: Crystal::MHz8,
            filter: None,
            listen_only: false,
        }
    }
}

impl Configuration {
    /// Creates a configuration, rejecting unsupported crystal/bit rate combinations immediately
    pub fn new(
        bitrate: u16,
        crystal_mhz: u8,
        filter: Option<RxFilter>,
        listen_only: bool,
    ) -> Result<Self, UnsupportedConfig> {
        let crystal = Crystal::from_mhz(crystal_mhz).ok_or(UnsupportedConfig {
            crystal_mhz,
            bitrate_kbps: bitrate,
        })?;
        crystal.timing(bitrate)?;

        Ok(Self {
            bitrate,
            crystal,
            filter,
            listen_only,
        })
    }

    /// Timing register values of this configuration
    pub(crate) fn timing(&self) -> Result<BitTimingConfig, UnsupportedConfig> {
        self.crystal.timing(self.bitrate)
    }
}
