#![cfg_attr(not(test), no_std)]
#![cfg_attr(feature = "strict", deny(warnings))]
#![allow(dead_code)]
#![allow(clippy::identity_op)]

//! # Library for MCP2515 CAN controller
//!
//! Crate currently offer the following features:
//! * CAN2.0 standard and extended frames, data and remote
//! * Fixed bit timing tables for 8 MHz and 16 MHz crystals
//! * Receive queue with arrival timestamps, drained by polling or interrupt signaling
//! * no_std support
//!
//!## CAN Tx/Rx example
//!
//!```
//!use mcp2515::example::{ExampleClock,ExampleCSPin,ExampleSPIBus};
//!use mcp2515::bus::{SpiTransport,TxChannel};
//!use mcp2515::can::Controller;
//!use mcp2515::config::Configuration;
//!use mcp2515::frame::CanFrame;
//!use embedded_can::{Frame,StandardId};
//!
//!let transport = SpiTransport::new(ExampleSPIBus::default(), ExampleCSPin {});
//!let clock = ExampleClock::default();
//!
//!let mut controller = Controller::new(transport, clock).unwrap();
//! // configure CAN controller: 500 kbps, 16 MHz crystal, accept all frames, normal mode
//!controller
//!    .start(&Configuration::new(500, 16, None, false).unwrap())
//!    .unwrap();
//!
//! // Create message frame
//!let can_id = StandardId::new(0x55).unwrap();
//!let frame = CanFrame::new(can_id, &[1, 2, 3, 4, 5, 6, 7, 8]).unwrap();
//!
//!// Transmit CAN message
//!controller.send(&frame, TxChannel::Tx0).unwrap();
//!
//!// Receive CAN message (the example bus loops frames back)
//!let received = controller.receive().unwrap().unwrap();
//!assert_eq!(frame, received);
//!assert_eq!([1, 2, 3, 4, 5, 6, 7, 8], received.data());
//!```

extern crate alloc;

pub mod bus;
pub mod can;
pub mod codec;
pub mod config;
pub mod filter;
pub mod frame;
pub mod interrupt;
pub mod queue;
pub mod status;
pub mod timing;

pub mod example;
#[cfg(test)]
pub(crate) mod mocks;
mod registers;
