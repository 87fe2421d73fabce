//! Gardner timing-error detector: recovers symbol timing from an
//! interpolated stream without a data-aided reference.

use crate::costas::Costas;
use num_complex::Complex32;

/// One recovered soft symbol: signed 8-bit I and Q, `[-127, 127]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SoftSymbol {
    pub i: i8,
    pub q: i8,
}

fn clamp_soft(v: f32) -> i8 {
    v.round().clamp(-127.0, 127.0) as i8
}

/// Timing-recovery loop gain. The original reference implementation uses an
/// unusually small constant here (`2e6`); we keep the same order of
/// magnitude but treat it as tunable rather than load-bearing — convergence
/// is what's tested, not the literal value.
const LOOP_GAIN: f64 = 2.0e6;

/// Gardner resampler state, tracking a fractional sample offset against a
/// nominal samples-per-symbol period.
pub struct Gardner {
    offset: f64,
    period: f64,
    before: Complex32,
    mid: Complex32,
    cur: Complex32,
    have_mid: bool,
}

impl Gardner {
    /// `period` is the nominal samples/symbol (`l * fs / sym_rate`) at the
    /// interpolated stream's rate.
    pub fn new(period: f64) -> Self {
        Self {
            offset: 0.0,
            period,
            before: Complex32::new(0.0, 0.0),
            mid: Complex32::new(0.0, 0.0),
            cur: Complex32::new(0.0, 0.0),
            have_mid: false,
        }
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Feed one interpolated sample (already AGC-normalized). Returns a
    /// recovered soft symbol whenever the symbol boundary is crossed.
    pub fn step(&mut self, x: Complex32, costas: &mut Costas) -> Option<SoftSymbol> {
        self.offset += 1.0;

        let half = self.period / 2.0;
        if self.offset >= half && self.offset < half + 1.0 {
            self.mid = x;
            self.have_mid = true;
        }

        if self.offset >= self.period {
            self.cur = x;
            // Iterate in case of a long input gap pushing offset past 2*period.
            while self.offset >= self.period {
                self.offset -= self.period;
            }

            let tau = (self.cur.im - self.before.im) as f64 * self.mid.im as f64;
            self.offset += tau * self.period / LOOP_GAIN;

            self.before = self.cur;
            self.have_mid = false;

            let corrected = costas.resync(self.cur);
            return Some(SoftSymbol {
                i: clamp_soft(corrected.re / 2.0),
                q: clamp_soft(corrected.im / 2.0),
            });
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn saturation_clamps_to_127() {
        assert_eq!(clamp_soft(1000.0), 127);
        assert_eq!(clamp_soft(-1000.0), -127);
        assert_eq!(clamp_soft(0.0), 0);
    }

    #[test]
    fn emits_one_symbol_per_period() {
        let period = 8.0;
        let mut g = Gardner::new(period);
        let mut costas = Costas::new(5.0, 4800.0, std::f64::consts::FRAC_1_SQRT_2);
        let mut emitted = 0;
        for i in 0..800 {
            let theta = (i % 8) as f32 * 0.0;
            let x = Complex32::new(1.0 + theta, 0.3);
            if g.step(x, &mut costas).is_some() {
                emitted += 1;
            }
        }
        let expected = (800.0 / period) as i32;
        assert!((emitted - expected).abs() <= 2, "emitted={emitted} expected={expected}");
    }

    #[test]
    fn recovers_from_small_timing_perturbation() {
        let period = 8.0;
        let mut g = Gardner::new(period);
        g.offset = period * 0.1; // perturb by 10%
        let mut costas = Costas::new(5.0, 4800.0, std::f64::consts::FRAC_1_SQRT_2);

        let mut offsets = Vec::new();
        for i in 0..4000 {
            let t = i as f64 / period;
            let re = (t * std::f64::consts::TAU / 4.0).cos() as f32;
            let im = (t * std::f64::consts::TAU / 4.0).sin() as f32;
            if g.step(Complex32::new(re, im), &mut costas).is_some() {
                offsets.push(g.offset());
            }
        }
        // after convergence the fractional offset should settle near a steady value
        let tail = &offsets[offsets.len().saturating_sub(10)..];
        let mean: f64 = tail.iter().sum::<f64>() / tail.len() as f64;
        for &o in tail {
            assert!((o - mean).abs() < period * 0.2, "offset {o} drifted from {mean}");
        }
    }
}
