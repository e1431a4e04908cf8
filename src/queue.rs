//!# Receive queue
//! Software FIFO between the two hardware receive buffers and the caller. Records keep
//! the raw buffer bytes and are only decoded when dequeued.
use crate::codec::{self, BUFFER_LENGTH};
use crate::frame::CanFrame;
use alloc::collections::VecDeque;
use byteorder::{BigEndian, ByteOrder};

/// Raw buffer plus 8 byte timestamp suffix
pub const RECORD_LENGTH: usize = BUFFER_LENGTH + 8;

/// Receive buffer content and arrival time, in buffer layout followed by
/// the big endian timestamp in milliseconds
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RawRxRecord {
    bytes: [u8; RECORD_LENGTH],
}

impl RawRxRecord {
    pub fn new(buffer: [u8; BUFFER_LENGTH], timestamp_ms: u64) -> Self {
        let mut bytes = [0u8; RECORD_LENGTH];
        bytes[..BUFFER_LENGTH].copy_from_slice(&buffer);
        BigEndian::write_u64(&mut bytes[BUFFER_LENGTH..], timestamp_ms);

        Self { bytes }
    }

    /// Raw receive buffer bytes (RXBnSIDH..RXBnD7)
    pub fn buffer(&self) -> [u8; BUFFER_LENGTH] {
        let mut buffer = [0u8; BUFFER_LENGTH];
        buffer.copy_from_slice(&self.bytes[..BUFFER_LENGTH]);
        buffer
    }

    /// Milliseconds since clock start at which the buffer was read
    pub fn timestamp_ms(&self) -> u64 {
        BigEndian::read_u64(&self.bytes[BUFFER_LENGTH..])
    }

    pub fn as_bytes(&self) -> &[u8; RECORD_LENGTH] {
        &self.bytes
    }

    /// Decodes the buffer into a frame with its arrival time
    pub fn decode(&self) -> ReceivedFrame {
        ReceivedFrame {
            frame: codec::decode(&self.buffer()),
            timestamp_ms: self.timestamp_ms(),
        }
    }
}

/// Decoded frame and the time it was read from the chip
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ReceivedFrame {
    pub frame: CanFrame,
    pub timestamp_ms: u64,
}

/// FIFO of received records, in arrival order across both receive buffers
#[derive(Debug, Default)]
pub struct ReceiveQueue {
    records: VecDeque<RawRxRecord>,
}

impl ReceiveQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: RawRxRecord) {
        self.records.push_back(record);
    }

    /// Removes the oldest record
    pub fn pop(&mut self) -> Option<RawRxRecord> {
        self.records.pop_front()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}
