use std::sync::{Arc, Mutex};
use std::time::Duration;

use cpal::traits::{DeviceTrait, StreamTrait};
use cpal::{SampleRate, StreamConfig};
use vani_core::PlaybackError;

use crate::codec::AudioClip;
use crate::device::DeviceManager;

/// Capture a fixed duration of microphone audio, blocking the calling
/// thread for that duration. Used by the voice-query control; call from a
/// blocking task, not the async runtime.
pub fn record_for(
    device_name: &str,
    duration: Duration,
    sample_rate: u32,
    channels: u16,
) -> Result<AudioClip, PlaybackError> {
    let manager = DeviceManager::new();
    let device = manager.get_input_device(device_name)?;

    let config = StreamConfig {
        channels,
        sample_rate: SampleRate(sample_rate),
        buffer_size: cpal::BufferSize::Default,
    };

    let expected = (sample_rate as usize) * (channels as usize) * duration.as_secs() as usize;
    let captured = Arc::new(Mutex::new(Vec::<f32>::with_capacity(expected)));
    let captured_ref = Arc::clone(&captured);

    let err_callback = |err: cpal::StreamError| {
        tracing::error!("capture stream error: {}", err);
    };

    let stream = device
        .build_input_stream(
            &config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                if let Ok(mut buf) = captured_ref.lock() {
                    buf.extend_from_slice(data);
                }
            },
            err_callback,
            None,
        )
        .map_err(|e| PlaybackError::Stream(e.to_string()))?;

    stream
        .play()
        .map_err(|e| PlaybackError::Stream(e.to_string()))?;

    std::thread::sleep(duration);
    drop(stream);

    let samples = Arc::try_unwrap(captured)
        .map(|m| m.into_inner().unwrap_or_default())
        .unwrap_or_else(|arc| arc.lock().map(|b| b.clone()).unwrap_or_default());

    Ok(AudioClip {
        samples,
        sample_rate,
        channels,
    })
}
