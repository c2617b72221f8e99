//! Control model
//!
//! Named controls holding a 14-bit high-resolution CC value, with the live
//! readout a slider shows next to it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{HrccError, Result};
use crate::message::ControlMessage;

/// Largest 14-bit value
pub const HRCC_MAX: u16 = 16383;

/// Center of the 14-bit range, used as the default slider position
pub const HRCC_CENTER: u16 = 8192;

/// A validated 14-bit controller value (0-16383)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u16")]
pub struct HrccValue(u16);

impl HrccValue {
    pub const MIN: HrccValue = HrccValue(0);
    pub const MAX: HrccValue = HrccValue(HRCC_MAX);
    pub const CENTER: HrccValue = HrccValue(HRCC_CENTER);

    /// Build a value, rejecting anything outside 0-16383
    pub fn new(value: i64) -> Result<Self> {
        if (0..=HRCC_MAX as i64).contains(&value) {
            Ok(Self(value as u16))
        } else {
            Err(HrccError::ValueOutOfRange(value))
        }
    }

    pub fn get(self) -> u16 {
        self.0
    }

    /// Split into the (MSB, LSB) 7-bit halves of a high-resolution CC pair
    pub fn to_cc_pair(self) -> (u8, u8) {
        (((self.0 >> 7) & 0x7F) as u8, (self.0 & 0x7F) as u8)
    }
}

impl TryFrom<i64> for HrccValue {
    type Error = HrccError;

    fn try_from(value: i64) -> Result<Self> {
        Self::new(value)
    }
}

impl From<HrccValue> for u16 {
    fn from(value: HrccValue) -> Self {
        value.0
    }
}

impl FromStr for HrccValue {
    type Err = HrccError;

    /// Decimal integers only; "8192.5" or "1e3" are rejected instead of truncated
    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let parsed: i64 = trimmed
            .parse()
            .map_err(|_| HrccError::InvalidValue(trimmed.to_string()))?;
        Self::new(parsed)
    }
}

impl fmt::Display for HrccValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A named slider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Control {
    name: String,
    label: String,
    value: HrccValue,
    readout: String,
}

impl Control {
    pub fn new(name: impl Into<String>, label: impl Into<String>, value: HrccValue) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(HrccError::EmptyName);
        }
        let label = label.into();
        let readout = value.to_string();
        Ok(Self {
            name,
            label,
            value,
            readout,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn value(&self) -> HrccValue {
        self.value
    }

    /// Text shown next to the slider
    pub fn readout(&self) -> &str {
        &self.readout
    }

    /// Move the slider: value and readout change together, then the message is built
    pub fn set(&mut self, value: HrccValue) -> ControlMessage {
        self.value = value;
        self.readout = value.to_string();
        ControlMessage::new(self.name.clone(), value)
    }
}

impl fmt::Display for Control {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.label, self.readout)
    }
}

/// The set of controls on the panel, in declaration order
#[derive(Debug, Clone, Default)]
pub struct ControlBank {
    controls: Vec<Control>,
}

impl ControlBank {
    pub fn new(controls: Vec<Control>) -> Self {
        Self { controls }
    }

    pub fn get(&self, name: &str) -> Option<&Control> {
        self.controls.iter().find(|c| c.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Control> {
        self.controls.iter()
    }

    /// Apply user input to a control and return the message to submit
    pub fn set(&mut self, name: &str, value: HrccValue) -> Result<ControlMessage> {
        let control = self
            .controls
            .iter_mut()
            .find(|c| c.name == name)
            .ok_or_else(|| HrccError::UnknownControl(name.to_string()))?;

        let message = control.set(value);
        debug!("{} -> {}", control.name, control.readout);
        Ok(message)
    }
}
