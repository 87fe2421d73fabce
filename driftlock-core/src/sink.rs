//! Abstract output sink: where recovered soft-symbol bytes go.

use crate::errors::SinkError;

/// A byte-stream sink. The driver writes interleaved signed-8-bit I/Q pairs
/// in bursts of at most `SYM_CHUNKSIZE` bytes; no framing, no header.
pub trait OutputSink: Send {
    fn write(&mut self, bytes: &[u8]) -> Result<(), SinkError>;
    fn flush(&mut self) -> Result<(), SinkError>;
}

/// In-memory sink, used by tests and available to any embedder that wants
/// to collect output without touching the filesystem.
#[derive(Default)]
pub struct VecSink {
    pub bytes: Vec<u8>,
}

impl OutputSink for VecSink {
    fn write(&mut self, bytes: &[u8]) -> Result<(), SinkError> {
        self.bytes.extend_from_slice(bytes);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        Ok(())
    }
}
