//! Video probing (probe-only: no transcoding).

mod processor;

pub use processor::VideoProbe;
