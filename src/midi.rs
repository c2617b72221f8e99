//! MIDI utilities for high-resolution CC
//!
//! A 14-bit controller value travels as two 7-bit Control Change messages:
//! the MSB on controller `n` (0-31) and the LSB on controller `n + 32`.

use std::fmt;

use crate::control::HrccValue;

/// Offset between a controller's MSB and its LSB partner
pub const LSB_OFFSET: u8 = 32;

/// MIDI Control Change: channel (0-15), cc (0-127), value (0-127)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlChange {
    pub channel: u8,
    pub cc: u8,
    pub value: u8,
}

impl ControlChange {
    /// Encode the message to MIDI bytes
    pub fn encode(&self) -> [u8; 3] {
        [0xB0 | (self.channel & 0x0F), self.cc & 0x7F, self.value & 0x7F]
    }
}

impl fmt::Display for ControlChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CC ch:{} cc:{} v:{}", self.channel + 1, self.cc, self.value)
    }
}

/// The MSB/LSB pair a receiver emits for a 14-bit value
///
/// `channel` is 1-16 as written in config; `cc` is the MSB controller (0-31).
pub fn hrcc_pair(channel: u8, cc: u8, value: HrccValue) -> [ControlChange; 2] {
    let ch = channel.saturating_sub(1) & 0x0F;
    let (msb, lsb) = value.to_cc_pair();
    [
        ControlChange { channel: ch, cc, value: msb },
        ControlChange { channel: ch, cc: cc.saturating_add(LSB_OFFSET) & 0x7F, value: lsb },
    ]
}

/// Format MIDI bytes as hex string for debugging
pub fn format_hex(data: &[u8]) -> String {
    data.iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}
