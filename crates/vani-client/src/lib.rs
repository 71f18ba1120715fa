pub mod api;

pub use api::DecoderClient;
