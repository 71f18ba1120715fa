use cpal::traits::{DeviceTrait, HostTrait};
use cpal::{Device, Host};
use vani_core::PlaybackError;

pub struct DeviceManager {
    host: Host,
}

impl DeviceManager {
    pub fn new() -> Self {
        Self {
            host: cpal::default_host(),
        }
    }

    pub fn get_output_device(&self, name: &str) -> Result<Device, PlaybackError> {
        if name == "default" {
            return self.host.default_output_device().ok_or_else(|| {
                PlaybackError::Device("no default output device".to_string())
            });
        }

        let devices = self
            .host
            .output_devices()
            .map_err(|e| PlaybackError::Device(e.to_string()))?;
        for device in devices {
            if matches!(device.name().as_deref(), Ok(n) if n == name) {
                return Ok(device);
            }
        }
        Err(PlaybackError::Device(format!(
            "output device not found: {}",
            name
        )))
    }

    pub fn get_input_device(&self, name: &str) -> Result<Device, PlaybackError> {
        if name == "default" {
            return self.host.default_input_device().ok_or_else(|| {
                PlaybackError::Device("no default input device".to_string())
            });
        }

        let devices = self
            .host
            .input_devices()
            .map_err(|e| PlaybackError::Device(e.to_string()))?;
        for device in devices {
            if matches!(device.name().as_deref(), Ok(n) if n == name) {
                return Ok(device);
            }
        }
        Err(PlaybackError::Device(format!(
            "input device not found: {}",
            name
        )))
    }
}

impl Default for DeviceManager {
    fn default() -> Self {
        Self::new()
    }
}
