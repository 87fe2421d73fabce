//! Generic FIR/IIR filter engine with a tap delay line.
//!
//! Used both as the root-raised-cosine matched filter and as a building
//! block wherever the pipeline needs a single-sample-at-a-time kernel.

use num_complex::Complex32;

/// A feed-forward (FIR) or feed-forward/feedback (IIR) filter with its own
/// delay line. `advance` is the only mutating operation; everything else is
/// immutable coefficient data copied in at construction time.
#[derive(Clone, Debug)]
pub struct Filter {
    fwd: Vec<Complex32>,
    back: Vec<Complex32>,
    mem: Vec<Complex32>,
}

impl Filter {
    /// Build a pure feed-forward (FIR) filter from its taps.
    pub fn fir(taps: &[Complex32]) -> Self {
        Self {
            fwd: taps.to_vec(),
            back: Vec::new(),
            mem: vec![Complex32::new(0.0, 0.0); taps.len()],
        }
    }

    /// Build a feed-forward/feedback (IIR) filter. `back[0]` is conventionally
    /// unused (fixed at unity); only `back[1..]` taps feed the subtraction.
    pub fn iir(feedforward: &[Complex32], feedback: &[Complex32]) -> Self {
        Self {
            fwd: feedforward.to_vec(),
            back: feedback.to_vec(),
            mem: vec![Complex32::new(0.0, 0.0); feedforward.len()],
        }
    }

    /// Number of feed-forward taps (also the delay-line length).
    pub fn len(&self) -> usize {
        self.fwd.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fwd.is_empty()
    }

    /// Independent copy with a zeroed delay line — clones never share history.
    pub fn reset_clone(&self) -> Self {
        Self {
            fwd: self.fwd.clone(),
            back: self.back.clone(),
            mem: vec![Complex32::new(0.0, 0.0); self.mem.len()],
        }
    }

    /// Push one sample through the filter and return the filtered output.
    pub fn advance(&mut self, x: Complex32) -> Complex32 {
        let mut x_prime = x;
        for (i, &b) in self.back.iter().enumerate().skip(1) {
            if i < self.mem.len() {
                x_prime -= self.mem[i] * b;
            }
        }

        for i in (1..self.mem.len()).rev() {
            self.mem[i] = self.mem[i - 1];
        }
        if !self.mem.is_empty() {
            self.mem[0] = x_prime;
        }

        self.fwd
            .iter()
            .zip(self.mem.iter())
            .map(|(&c, &m)| c * m)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(re: f32) -> Complex32 {
        Complex32::new(re, 0.0)
    }

    #[test]
    fn fir_identity_tap_passes_through() {
        let mut f = Filter::fir(&[c(1.0)]);
        assert_eq!(f.advance(c(3.0)), c(3.0));
        assert_eq!(f.advance(c(-2.0)), c(-2.0));
    }

    #[test]
    fn fir_delay_line_fills_up_to_tap_count() {
        let mut f = Filter::fir(&[c(1.0), c(0.0), c(0.0)]);
        f.advance(c(1.0));
        f.advance(c(1.0));
        let y = f.advance(c(1.0));
        // only the first tap is non-zero, so output always equals newest input
        assert_eq!(y, c(1.0));
    }

    #[test]
    fn reset_clone_has_zeroed_memory() {
        let mut f = Filter::fir(&[c(1.0), c(1.0)]);
        f.advance(c(5.0));
        let cloned = f.reset_clone();
        let mut cloned = cloned;
        // fresh memory means the first output only reflects the new input
        assert_eq!(cloned.advance(c(1.0)), c(1.0));
    }

    #[test]
    fn linearity_holds_across_separate_instances() {
        let taps = [c(0.5), c(0.3), c(0.1)];
        let mut fx = Filter::fir(&taps);
        let mut fy = Filter::fir(&taps);
        let mut fxy = Filter::fir(&taps);

        let xs = [c(1.0), c(-0.5), c(0.25), c(2.0)];
        let ys = [c(0.2), c(0.4), c(-1.0), c(0.1)];
        let a = c(2.0);
        let b = c(-3.0);

        for (&x, &y) in xs.iter().zip(ys.iter()) {
            let out_x = fx.advance(x);
            let out_y = fy.advance(y);
            let combined = fxy.advance(a * x + b * y);
            let lhs = a * out_x + b * out_y;
            assert!((combined - lhs).norm() < 1e-4);
        }
    }

    #[test]
    fn iir_skips_feedback_when_fir() {
        let mut f = Filter::fir(&[c(1.0), c(1.0)]);
        let y1 = f.advance(c(1.0));
        let y2 = f.advance(c(1.0));
        assert_eq!(y1, c(1.0));
        assert_eq!(y2, c(2.0));
    }
}
