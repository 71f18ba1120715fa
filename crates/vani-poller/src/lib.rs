pub mod controller;
pub mod traits;

mod sources;

pub use controller::PollController;
pub use traits::{AudioOut, SpeechSource, StatusSource};
