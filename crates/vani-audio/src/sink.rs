use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc, Mutex};
use std::thread;

use cpal::traits::{DeviceTrait, StreamTrait};
use cpal::{SampleRate, Stream, StreamConfig};
use ringbuf::traits::{Consumer, Producer, Split};
use ringbuf::HeapRb;
use vani_core::PlaybackError;

use crate::codec::AudioClip;
use crate::device::DeviceManager;

enum SinkMsg {
    Clip(AudioClip),
    Shutdown,
}

/// The shared audio output.
///
/// Clips are handed to a dedicated thread because `cpal::Stream` is not
/// `Send`; starting a new clip replaces whatever was playing. Playback
/// errors are logged and swallowed, they never reach the UI.
pub struct PlaybackSink {
    tx: mpsc::Sender<SinkMsg>,
    enabled: Arc<AtomicBool>,
    thread: Option<thread::JoinHandle<()>>,
}

impl PlaybackSink {
    /// Spawn the playback thread. The output device is resolved lazily on
    /// the first clip so a missing device degrades to silence, not startup
    /// failure.
    pub fn spawn(device_name: &str, enabled: bool) -> Self {
        let (tx, rx) = mpsc::channel::<SinkMsg>();
        let enabled_flag = Arc::new(AtomicBool::new(enabled));
        let device_name = device_name.to_string();

        let handle = thread::spawn(move || {
            let manager = DeviceManager::new();
            let mut current: Option<Stream> = None;

            while let Ok(msg) = rx.recv() {
                match msg {
                    SinkMsg::Clip(clip) => match start_clip(&manager, &device_name, clip) {
                        Ok(stream) => {
                            // Dropping the previous stream stops it.
                            current = Some(stream);
                        }
                        Err(e) => {
                            tracing::warn!("playback failed: {}", e);
                        }
                    },
                    SinkMsg::Shutdown => break,
                }
            }

            drop(current);
        });

        Self {
            tx,
            enabled: enabled_flag,
            thread: Some(handle),
        }
    }

    /// Queue a clip for playback. A disabled sink drops the clip silently.
    pub fn play(&self, clip: AudioClip) -> Result<(), PlaybackError> {
        if !self.is_enabled() {
            tracing::debug!("playback disabled, dropping clip");
            return Ok(());
        }
        self.tx
            .send(SinkMsg::Clip(clip))
            .map_err(|_| PlaybackError::Stream("playback thread gone".to_string()))
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    pub fn set_enabled(&self, v: bool) {
        self.enabled.store(v, Ordering::Relaxed);
    }

    pub fn shutdown(&mut self) {
        let _ = self.tx.send(SinkMsg::Shutdown);
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for PlaybackSink {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn start_clip(
    manager: &DeviceManager,
    device_name: &str,
    clip: AudioClip,
) -> Result<Stream, PlaybackError> {
    let device = manager.get_output_device(device_name)?;

    let config = StreamConfig {
        channels: clip.channels.max(1),
        sample_rate: SampleRate(clip.sample_rate),
        buffer_size: cpal::BufferSize::Default,
    };

    let rb = HeapRb::<f32>::new(clip.samples.len().max(1));
    let (mut producer, consumer) = rb.split();
    producer.push_slice(&clip.samples);
    let consumer = Arc::new(Mutex::new(consumer));

    let err_callback = |err: cpal::StreamError| {
        tracing::error!("output stream error: {}", err);
    };

    let stream = device
        .build_output_stream(
            &config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                if let Ok(mut cons) = consumer.lock() {
                    for sample in data.iter_mut() {
                        *sample = cons.try_pop().unwrap_or(0.0);
                    }
                } else {
                    data.fill(0.0);
                }
            },
            err_callback,
            None,
        )
        .map_err(|e| PlaybackError::Stream(e.to_string()))?;

    stream
        .play()
        .map_err(|e| PlaybackError::Stream(e.to_string()))?;

    Ok(stream)
}
