//! Wire message sent to the device
//!
//! One UTF-8 text frame per value change:
//! `{"name":"<control-id>","hrcc_value":<0..16383>}`

use serde::{Deserialize, Serialize};

use crate::control::HrccValue;

/// A control value change, built at the moment the slider moves
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlMessage {
    pub name: String,
    pub hrcc_value: HrccValue,
}

impl ControlMessage {
    pub fn new(name: impl Into<String>, hrcc_value: HrccValue) -> Self {
        Self {
            name: name.into(),
            hrcc_value,
        }
    }

    /// Serialize to the compact JSON text frame
    pub fn to_frame(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Parse a frame as the device would receive it
    pub fn from_frame(frame: &str) -> serde_json::Result<Self> {
        serde_json::from_str(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_format() {
        let msg = ControlMessage::new("volume", HrccValue::new(100).unwrap());
        assert_eq!(msg.to_frame().unwrap(), r#"{"name":"volume","hrcc_value":100}"#);
    }

    #[test]
    fn test_boundaries_serialize_as_integers() {
        let low = ControlMessage::new("modulation", HrccValue::MIN);
        let high = ControlMessage::new("modulation", HrccValue::MAX);
        assert_eq!(low.to_frame().unwrap(), r#"{"name":"modulation","hrcc_value":0}"#);
        assert_eq!(high.to_frame().unwrap(), r#"{"name":"modulation","hrcc_value":16383}"#);
    }

    #[test]
    fn test_name_is_escaped() {
        let msg = ControlMessage::new("a\"b", HrccValue::CENTER);
        assert_eq!(msg.to_frame().unwrap(), r#"{"name":"a\"b","hrcc_value":8192}"#);
        assert_eq!(ControlMessage::from_frame(&msg.to_frame().unwrap()).unwrap(), msg);
    }

    #[test]
    fn test_frame_keeps_key_order_for_every_value() {
        for value in [0, 100, 8192, 16383] {
            let msg = ControlMessage::new("a\"volume", HrccValue::new(value).unwrap());
            let frame = msg.to_frame().unwrap();

            assert!(frame.starts_with(r#"{"name":"a\"volume","hrcc_value":"#));
            let parsed: serde_json::Value = serde_json::from_str(&frame).unwrap();
            assert_eq!(parsed["hrcc_value"], serde_json::json!(value));
            assert!(parsed["hrcc_value"].is_u64());
        }
    }

    #[test]
    fn test_from_frame() {
        let msg = ControlMessage::from_frame(r#"{"name":"volume","hrcc_value":16383}"#).unwrap();
        assert_eq!(msg, ControlMessage::new("volume", HrccValue::MAX));
    }

    #[test]
    fn test_from_frame_rejects_bad_values() {
        assert!(ControlMessage::from_frame(r#"{"name":"volume","hrcc_value":16384}"#).is_err());
        assert!(ControlMessage::from_frame(r#"{"name":"volume","hrcc_value":-5}"#).is_err());
        assert!(ControlMessage::from_frame(r#"{"name":"volume","hrcc_value":12.5}"#).is_err());
    }
}
