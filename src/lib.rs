//! HRCC Slider library
//!
//! Client side of a firmware device that turns `{name, hrcc_value}` JSON
//! frames into 14-bit MIDI CC output.

pub mod cli;
pub mod config;
pub mod connection;
pub mod control;
pub mod error;
pub mod message;
pub mod midi;
pub mod page;

pub use connection::{ConnectionHandle, ConnectionManager, ConnectionState};
pub use control::{Control, ControlBank, HrccValue};
pub use error::HrccError;
pub use message::ControlMessage;
