//! Configuration management for HRCC Slider
//!
//! Handles loading, parsing, and validation of the YAML configuration file.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tokio::fs;
use tracing::info;

use crate::connection::{ws_url, DEFAULT_WS_PORT};
use crate::control::{Control, ControlBank, HrccValue, HRCC_CENTER, HRCC_MAX};

/// Root configuration structure
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub device: DeviceConfig,
    #[serde(default = "default_controls")]
    pub controls: Vec<ControlConfig>,
}

/// Where the device's WebSocket server listens
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct DeviceConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

/// One slider
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ControlConfig {
    /// Identifier sent as `name` on the wire
    pub name: String,
    /// Readout label; defaults to the capitalised name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default = "default_value")]
    pub default: u16,
    /// MIDI CC the device maps this control to (MSB; LSB is cc + 32)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cc: Option<u8>,
    /// MIDI channel 1-16
    #[serde(default = "default_channel")]
    pub channel: u8,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            device: DeviceConfig::default(),
            controls: default_controls(),
        }
    }
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ControlConfig {
    pub fn new(name: &str, cc: Option<u8>) -> Self {
        Self {
            name: name.to_string(),
            label: None,
            default: default_value(),
            cc,
            channel: default_channel(),
        }
    }

    /// Label shown in the readout
    pub fn display_label(&self) -> String {
        match &self.label {
            Some(label) => label.clone(),
            None => capitalize(&self.name),
        }
    }
}

impl AppConfig {
    /// Load configuration from file with validation
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: AppConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse YAML config: {}", path.display()))?;

        // Validate the loaded configuration
        config.validate()?;

        Ok(config)
    }

    /// Load the file if it exists, otherwise fall back to the built-in panel
    pub async fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if fs::try_exists(path).await.unwrap_or(false) {
            Self::load(path).await
        } else {
            info!(
                "Config file {} not found, using defaults",
                path.display()
            );
            Ok(Self::default())
        }
    }

    /// Save configuration to file
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let yaml = serde_yaml::to_string(self).context("Failed to serialize config to YAML")?;

        fs::write(path, yaml)
            .await
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Validate configuration for correctness and consistency
    pub fn validate(&self) -> Result<()> {
        if self.device.host.trim().is_empty() {
            anyhow::bail!("device.host cannot be empty");
        }
        if self.device.port == 0 {
            anyhow::bail!("device.port cannot be 0");
        }

        if self.controls.is_empty() {
            anyhow::bail!("At least one control must be defined");
        }

        let mut names = HashSet::new();
        for (idx, control) in self.controls.iter().enumerate() {
            if control.name.trim().is_empty() {
                anyhow::bail!("Control {} name cannot be empty", idx);
            }
            if !names.insert(control.name.as_str()) {
                anyhow::bail!("Duplicate control name '{}'", control.name);
            }
            if control.default > HRCC_MAX {
                anyhow::bail!(
                    "Control '{}' default {} is out of range (must be 0-{})",
                    control.name,
                    control.default,
                    HRCC_MAX
                );
            }
            // LSB lives at cc + 32, so the MSB must be in the 0-31 block
            if let Some(cc) = control.cc {
                if cc > 31 {
                    anyhow::bail!(
                        "Control '{}' has invalid CC number {} (must be 0-31)",
                        control.name,
                        cc
                    );
                }
            }
            if control.channel == 0 || control.channel > 16 {
                anyhow::bail!(
                    "Control '{}' has invalid MIDI channel {} (must be 1-16)",
                    control.name,
                    control.channel
                );
            }
        }

        Ok(())
    }

    pub fn ws_url(&self) -> String {
        ws_url(&self.device.host, self.device.port)
    }

    /// Build the control bank with every control at its default value
    pub fn control_bank(&self) -> Result<ControlBank> {
        let controls = self
            .controls
            .iter()
            .map(|c| -> Result<Control> {
                let value = HrccValue::new(c.default as i64)?;
                Ok(Control::new(c.name.clone(), c.display_label(), value)?)
            })
            .collect::<Result<Vec<_>>>()
            .context("Invalid control configuration")?;

        Ok(ControlBank::new(controls))
    }

    pub fn control(&self, name: &str) -> Option<&ControlConfig> {
        self.controls.iter().find(|c| c.name == name)
    }
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

// Default value functions
fn default_host() -> String { "192.168.4.1".to_string() }
fn default_port() -> u16 { DEFAULT_WS_PORT }
fn default_value() -> u16 { HRCC_CENTER }
fn default_channel() -> u8 { 1 }

/// Modulation wheel (CC 1) and channel volume (CC 7)
fn default_controls() -> Vec<ControlConfig> {
    vec![
        ControlConfig::new("modulation", Some(1)),
        ControlConfig::new("volume", Some(7)),
    ]
}
