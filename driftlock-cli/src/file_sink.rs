//! Buffered raw byte file sink for recovered soft symbols.

use driftlock_core::errors::SinkError;
use driftlock_core::sink::OutputSink;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

pub struct FileSink {
    writer: BufWriter<File>,
}

impl FileSink {
    pub fn create(path: &Path) -> Result<Self, SinkError> {
        let file = File::create(path)
            .map_err(|e| SinkError::WriteFailed(format!("failed to create {}: {e}", path.display())))?;
        Ok(Self {
            writer: BufWriter::new(file),
        })
    }
}

impl OutputSink for FileSink {
    fn write(&mut self, bytes: &[u8]) -> Result<(), SinkError> {
        self.writer
            .write_all(bytes)
            .map_err(|e| SinkError::WriteFailed(e.to_string()))
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        self.writer.flush().map_err(|e| SinkError::WriteFailed(e.to_string()))
    }
}
