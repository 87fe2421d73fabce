//! Abstract sample source: the shape shared by the raw backend and the
//! interpolator that wraps it.

use crate::errors::SourceError;
use num_complex::Complex32;

/// A block-oriented complex-sample source. `read` may reallocate the
/// internal buffer; callers must treat `data()` as invalidated after the
/// next `read` call.
pub trait SampleSource {
    fn samplerate(&self) -> u32;
    fn bytes_per_sample(&self) -> usize;

    /// Fill the internal buffer with up to `count` fresh samples and return
    /// the number actually produced. `0` means end-of-stream.
    fn read(&mut self, count: usize) -> Result<usize, SourceError>;

    /// The most recently produced block, `data()[0..produced)`.
    fn data(&self) -> &[Complex32];

    fn close(&mut self);

    /// Total size of the underlying stream, in samples, if known.
    fn size(&self) -> u64;

    /// Samples consumed so far.
    fn done(&self) -> u64;
}

/// A simple in-memory source, mainly for tests and integration scenarios.
pub struct VecSource {
    samplerate: u32,
    samples: Vec<Complex32>,
    pos: usize,
    buf: Vec<Complex32>,
}

impl VecSource {
    pub fn new(samplerate: u32, samples: Vec<Complex32>) -> Self {
        Self {
            samplerate,
            samples,
            pos: 0,
            buf: Vec::new(),
        }
    }
}

impl SampleSource for VecSource {
    fn samplerate(&self) -> u32 {
        self.samplerate
    }

    fn bytes_per_sample(&self) -> usize {
        std::mem::size_of::<Complex32>()
    }

    fn read(&mut self, count: usize) -> Result<usize, SourceError> {
        let remaining = self.samples.len() - self.pos;
        let produced = remaining.min(count);
        self.buf.clear();
        self.buf.extend_from_slice(&self.samples[self.pos..self.pos + produced]);
        self.pos += produced;
        Ok(produced)
    }

    fn data(&self) -> &[Complex32] {
        &self.buf
    }

    fn close(&mut self) {}

    fn size(&self) -> u64 {
        self.samples.len() as u64
    }

    fn done(&self) -> u64 {
        self.pos as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_returns_zero_at_eof() {
        let mut s = VecSource::new(48_000, vec![Complex32::new(1.0, 0.0); 10]);
        assert_eq!(s.read(10).unwrap(), 10);
        assert_eq!(s.read(10).unwrap(), 0);
    }

    #[test]
    fn produced_never_exceeds_requested() {
        let mut s = VecSource::new(48_000, vec![Complex32::new(1.0, 0.0); 5]);
        let n = s.read(100).unwrap();
        assert_eq!(n, 5);
        assert!(n <= 100);
    }
}
