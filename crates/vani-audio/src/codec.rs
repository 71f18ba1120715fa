use std::io::Cursor;

use vani_core::PlaybackError;

/// A decoded clip ready for the output stream.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioClip {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub channels: u16,
}

impl AudioClip {
    pub fn duration_secs(&self) -> f32 {
        if self.sample_rate == 0 || self.channels == 0 {
            return 0.0;
        }
        self.samples.len() as f32 / (self.sample_rate as f32 * self.channels as f32)
    }
}

/// Decode WAV bytes into f32 samples. Accepts 16-bit PCM and 32-bit float.
pub fn decode_wav(bytes: &[u8]) -> Result<AudioClip, PlaybackError> {
    let reader = hound::WavReader::new(Cursor::new(bytes))
        .map_err(|e| PlaybackError::Decode(e.to_string()))?;
    let spec = reader.spec();

    let samples: Vec<f32> = match (spec.sample_format, spec.bits_per_sample) {
        (hound::SampleFormat::Int, 16) => reader
            .into_samples::<i16>()
            .map(|s| s.map(|v| v as f32 / i16::MAX as f32))
            .collect::<Result<_, _>>()
            .map_err(|e| PlaybackError::Decode(e.to_string()))?,
        (hound::SampleFormat::Float, 32) => reader
            .into_samples::<f32>()
            .collect::<Result<_, _>>()
            .map_err(|e| PlaybackError::Decode(e.to_string()))?,
        (format, bits) => {
            return Err(PlaybackError::Decode(format!(
                "unsupported sample format: {:?} {}-bit",
                format, bits
            )));
        }
    };

    Ok(AudioClip {
        samples,
        sample_rate: spec.sample_rate,
        channels: spec.channels,
    })
}

/// Encode f32 samples as a 16-bit PCM WAV byte buffer.
pub fn encode_wav(clip: &AudioClip) -> Result<Vec<u8>, PlaybackError> {
    let spec = hound::WavSpec {
        channels: clip.channels,
        sample_rate: clip.sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec)
            .map_err(|e| PlaybackError::Decode(e.to_string()))?;
        for &sample in &clip.samples {
            let v = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
            writer
                .write_sample(v)
                .map_err(|e| PlaybackError::Decode(e.to_string()))?;
        }
        writer
            .finalize()
            .map_err(|e| PlaybackError::Decode(e.to_string()))?;
    }
    Ok(cursor.into_inner())
}
