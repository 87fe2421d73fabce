//! WAV-backed complex sample source.
//!
//! Reads a stereo (I, Q) or mono WAV file as the raw baseband source the
//! core demodulator consumes. Mono files are treated as already-baseband
//! real signals with `Q = 0`.

use driftlock_core::errors::SourceError;
use driftlock_core::source::SampleSource;
use hound::{SampleFormat, WavReader};
use num_complex::Complex32;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

pub struct WavSource {
    reader: WavReader<BufReader<File>>,
    samplerate: u32,
    channels: u16,
    sample_format: SampleFormat,
    bits: u16,
    total_frames: u64,
    frames_done: u64,
    buf: Vec<Complex32>,
}

impl WavSource {
    pub fn open(path: &Path) -> Result<Self, SourceError> {
        let reader = WavReader::open(path)
            .map_err(|e| SourceError::Fault(format!("failed to open {}: {e}", path.display())))?;
        let spec = reader.spec();
        let total_frames = reader.duration() as u64;

        Ok(Self {
            reader,
            samplerate: spec.sample_rate,
            channels: spec.channels,
            sample_format: spec.sample_format,
            bits: spec.bits_per_sample,
            total_frames,
            frames_done: 0,
            buf: Vec::new(),
        })
    }

    fn next_frame(&mut self) -> Result<Option<Complex32>, SourceError> {
        let read_one = |v: f32| v;

        let raw: Vec<f32> = if self.channels >= 2 {
            let mut samples = Vec::with_capacity(2);
            for _ in 0..2 {
                match self.read_normalized_sample()? {
                    Some(v) => samples.push(read_one(v)),
                    None => return Ok(None),
                }
            }
            // Drain any extra channels beyond I/Q.
            for _ in 2..self.channels {
                let _ = self.read_normalized_sample()?;
            }
            samples
        } else {
            match self.read_normalized_sample()? {
                Some(v) => vec![v, 0.0],
                None => return Ok(None),
            }
        };

        Ok(Some(Complex32::new(raw[0], raw[1])))
    }

    fn read_normalized_sample(&mut self) -> Result<Option<f32>, SourceError> {
        match self.sample_format {
            SampleFormat::Float => match self.reader.samples::<f32>().next() {
                Some(Ok(v)) => Ok(Some(v)),
                Some(Err(e)) => Err(SourceError::Fault(e.to_string())),
                None => Ok(None),
            },
            SampleFormat::Int => {
                let max = (1i64 << (self.bits - 1)) as f32;
                match self.reader.samples::<i32>().next() {
                    Some(Ok(v)) => Ok(Some(v as f32 / max)),
                    Some(Err(e)) => Err(SourceError::Fault(e.to_string())),
                    None => Ok(None),
                }
            }
        }
    }
}

impl SampleSource for WavSource {
    fn samplerate(&self) -> u32 {
        self.samplerate
    }

    fn bytes_per_sample(&self) -> usize {
        std::mem::size_of::<Complex32>()
    }

    fn read(&mut self, count: usize) -> Result<usize, SourceError> {
        self.buf.clear();
        for _ in 0..count {
            match self.next_frame()? {
                Some(c) => {
                    self.buf.push(c);
                    self.frames_done += 1;
                }
                None => break,
            }
        }
        Ok(self.buf.len())
    }

    fn data(&self) -> &[Complex32] {
        &self.buf
    }

    fn close(&mut self) {}

    fn size(&self) -> u64 {
        self.total_frames
    }

    fn done(&self) -> u64 {
        self.frames_done
    }
}
