//!# Buffer codec
//! Converts between [CanFrame] and the 13 byte layout shared by the transmit buffers
//! (TXBnSIDH..TXBnD7) and the receive buffers (RXBnSIDH..RXBnD7).
//!
//! | Byte | Standard frame          | Extended frame                      |
//! |------|-------------------------|-------------------------------------|
//! | 0    | id\[10:3\]              | id\[28:21\]                         |
//! | 1    | id\[2:0\], remote (0x10)| id\[20:18\], EXIDE (0x08), id\[17:16\] |
//! | 2    | -                       | id\[15:8\]                          |
//! | 3    | -                       | id\[7:0\]                           |
//! | 4    | DLC                     | remote (0x40), DLC                  |
//! | 5-12 | data                    | data                                |
use crate::frame::{CanFrame, FrameError, MAX_PAYLOAD};

/// Size of a transmit/receive buffer starting at the SIDH register
pub const BUFFER_LENGTH: usize = 13;

/// Extended identifier flag in SIDL
const EXIDE: u8 = 0x08;

/// Remote flag of standard frames in SIDL
const STANDARD_REMOTE: u8 = 0x10;

/// Remote flag of extended frames in DLC
const EXTENDED_REMOTE: u8 = 0x40;

const DLC_MASK: u8 = 0x0F;

const DATA_OFFSET: usize = 5;

/// Encodes the frame into buffer layout. Invalid frames are rejected, never truncated.
pub fn encode(frame: &CanFrame) -> Result<[u8; BUFFER_LENGTH], FrameError> {
    frame.validate()?;

    let mut buffer = [0u8; BUFFER_LENGTH];
    buffer[..4].copy_from_slice(&encode_id(frame.id, frame.extended));

    if frame.remote {
        if frame.extended {
            buffer[4] |= EXTENDED_REMOTE;
        } else {
            buffer[1] |= STANDARD_REMOTE;
        }
    }

    buffer[4] |= frame.dlc & DLC_MASK;

    let payload = frame.payload();
    buffer[DATA_OFFSET..DATA_OFFSET + payload.len()].copy_from_slice(payload);

    Ok(buffer)
}

/// Decodes a raw buffer. DLC values above 8 are clamped, the chip never stores more data.
pub fn decode(buffer: &[u8; BUFFER_LENGTH]) -> CanFrame {
    let extended = buffer[1] & EXIDE != 0;
    let standard_id = ((buffer[0] as u32) << 3) | ((buffer[1] as u32) >> 5);

    let (id, remote) = if extended {
        let id = (standard_id << 18)
            | (((buffer[1] & 0x03) as u32) << 16)
            | ((buffer[2] as u32) << 8)
            | buffer[3] as u32;
        (id, buffer[4] & EXTENDED_REMOTE != 0)
    } else {
        (standard_id, buffer[1] & STANDARD_REMOTE != 0)
    };

    let dlc = (buffer[4] & DLC_MASK).min(MAX_PAYLOAD as u8);

    let mut frame = CanFrame {
        id,
        extended,
        remote,
        dlc,
        data: [0u8; 8],
    };

    if !remote {
        let length = dlc as usize;
        frame.data[..length].copy_from_slice(&buffer[DATA_OFFSET..DATA_OFFSET + length]);
    }

    frame
}

/// Encodes an identifier into SIDH, SIDL, EID8, EID0.
/// Same layout is used by the filter and mask registers.
pub(crate) fn encode_id(id: u32, extended: bool) -> [u8; 4] {
    if extended {
        [
            ((id >> 21) & 0xFF) as u8,
            (((id >> 13) & 0xE0) as u8) | EXIDE | (((id >> 16) & 0x03) as u8),
            ((id >> 8) & 0xFF) as u8,
            (id & 0xFF) as u8,
        ]
    } else {
        [((id >> 3) & 0xFF) as u8, ((id << 5) & 0xE0) as u8, 0x0, 0x0]
    }
}
