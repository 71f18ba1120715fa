pub mod capture;
pub mod codec;
pub mod device;
pub mod sink;

pub use capture::record_for;
pub use codec::{decode_wav, encode_wav, AudioClip};
pub use device::DeviceManager;
pub use sink::PlaybackSink;
