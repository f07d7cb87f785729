//! The data that moves through the pipeline, and the decoders that make it.

pub mod decode;
pub mod format;
pub mod record;
pub mod value;
