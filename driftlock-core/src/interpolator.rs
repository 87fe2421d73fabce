//! Upsamples a backend source by integer factor `l` and shapes it with the
//! root-raised-cosine matched filter.

use crate::errors::SourceError;
use crate::filter::Filter;
use crate::rrc::rrc;
use crate::source::SampleSource;
use num_complex::Complex32;

/// Wraps a backend `SampleSource` at rate `fs` and exposes a `SampleSource`
/// at rate `l * fs`. The RRC is applied to the zero-stuffed stream; its
/// warm-up transient of `order * l` samples is the caller's responsibility
/// to discard.
pub struct Interpolator<S: SampleSource> {
    backend: S,
    l: usize,
    rrc_filter: Filter,
    backend_buf: Vec<Complex32>,
    backend_produced: usize,
    out_buf: Vec<Complex32>,
    scale: f32,
}

impl<S: SampleSource> Interpolator<S> {
    pub fn new(backend: S, l: usize, order: usize, alpha: f64) -> Self {
        Self {
            backend,
            l,
            rrc_filter: rrc(order, l, alpha),
            backend_buf: Vec::new(),
            backend_produced: 0,
            out_buf: Vec::new(),
            scale: 1.0 / std::f32::consts::SQRT_2,
        }
    }
}

impl<S: SampleSource> Interpolator<S> {
    /// The wrapped backend's own sample rate (`samplerate() / l`).
    pub fn backend_samplerate(&self) -> u32 {
        self.backend.samplerate()
    }
}

impl<S: SampleSource> SampleSource for Interpolator<S> {
    fn samplerate(&self) -> u32 {
        self.backend.samplerate() * self.l as u32
    }

    fn bytes_per_sample(&self) -> usize {
        self.backend.bytes_per_sample()
    }

    fn read(&mut self, count: usize) -> Result<usize, SourceError> {
        let needed_in = count.div_ceil(self.l).max(1);
        let got = self.backend.read(needed_in)?;
        self.backend_buf.clear();
        self.backend_buf.extend_from_slice(&self.backend.data()[..got]);
        self.backend_produced = got;

        if got == 0 {
            self.out_buf.clear();
            return Ok(0);
        }

        let n = got * self.l;
        self.out_buf.clear();
        self.out_buf.reserve(n);
        for i in 0..n {
            let src_idx = i / self.l;
            let x = if i % self.l == 0 {
                self.backend_buf[src_idx]
            } else {
                Complex32::new(0.0, 0.0)
            };
            let y = self.rrc_filter.advance(x) * self.scale;
            self.out_buf.push(y);
        }

        Ok(self.out_buf.len())
    }

    fn data(&self) -> &[Complex32] {
        &self.out_buf
    }

    fn close(&mut self) {
        self.backend.close();
    }

    fn size(&self) -> u64 {
        self.backend.size() * self.l as u64
    }

    fn done(&self) -> u64 {
        self.backend.done() * self.l as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::VecSource;

    #[test]
    fn rate_is_l_times_backend_rate() {
        let backend = VecSource::new(48_000, vec![Complex32::new(1.0, 0.0); 100]);
        let interp = Interpolator::new(backend, 4, 8, 0.5);
        assert_eq!(interp.samplerate(), 192_000);
    }

    #[test]
    fn eof_propagates_as_zero() {
        let backend = VecSource::new(48_000, vec![Complex32::new(1.0, 0.0); 4]);
        let mut interp = Interpolator::new(backend, 2, 4, 0.5);
        let total = interp.read(1000).unwrap();
        assert!(total > 0);
        let next = interp.read(1000).unwrap();
        assert_eq!(next, 0);
    }

    #[test]
    fn backend_consumption_is_bounded() {
        let backend = VecSource::new(48_000, vec![Complex32::new(1.0, 0.0); 1000]);
        let mut interp = Interpolator::new(backend, 4, 8, 0.5);
        let n = 37;
        interp.read(n).unwrap();
        let consumed = interp.backend.done();
        assert!(consumed as usize <= n.div_ceil(4) + 2);
    }

    #[test]
    fn zero_input_stays_zero_after_warmup() {
        let backend = VecSource::new(48_000, vec![Complex32::new(0.0, 0.0); 2000]);
        let mut interp = Interpolator::new(backend, 2, 16, 0.5);
        interp.read(16 * 2 + 10).unwrap(); // skip warm-up
        let n = interp.read(200).unwrap();
        assert!(n > 0);
        for &s in interp.data() {
            assert_eq!(s, Complex32::new(0.0, 0.0));
        }
    }
}
