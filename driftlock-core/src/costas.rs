//! QPSK Costas loop: decision-directed carrier phase/frequency tracker.

use num_complex::Complex32;
use std::f64::consts::{PI, TAU};

/// Carrier tracker state. `freq` is exposed to callers in Hz via
/// [`Costas::freq_hz`]; internally it is radians/symbol.
#[derive(Clone, Debug)]
pub struct Costas {
    phase: f64,
    freq: f64,
    kp: f64,
    ki: f64,
    sym_rate: f64,
    /// Slow moving average of `|error|`, used for the lock/unlock hysteresis.
    avg_err: f64,
    locked: bool,
    lock_threshold: f64,
    unlock_threshold: f64,
}

impl Costas {
    /// `bw_hz` is the loop's normalized bandwidth in Hz, `sym_rate` the
    /// symbol rate in Hz, `damping` the loop damping factor (critical ~
    /// 1/sqrt(2)).
    pub fn new(bw_hz: f64, sym_rate: f64, damping: f64) -> Self {
        let beta = TAU * bw_hz / sym_rate;
        let denom = 1.0 + 2.0 * damping * beta + beta * beta;
        let kp = (4.0 * damping * beta) / denom;
        let ki = (4.0 * beta * beta) / denom;

        Self {
            phase: 0.0,
            freq: 0.0,
            kp,
            ki,
            sym_rate,
            avg_err: 1.0,
            locked: false,
            lock_threshold: 0.02,
            unlock_threshold: 0.08,
        }
    }

    /// Rotate `x` by the current phase estimate, update the loop, and
    /// return the corrected symbol.
    pub fn resync(&mut self, x: Complex32) -> Complex32 {
        let rot = Complex32::from_polar(1.0, -self.phase as f32);
        let y = x * rot;

        let raw_error = (y.re.signum() * y.im - y.im.signum() * y.re) as f64;

        // The sign-based error term above scales linearly with |y|, but
        // kp/ki and the lock thresholds are tuned for a unit-amplitude
        // constellation. Normalize by the instantaneous envelope so loop
        // behavior is invariant to the AGC's configured target amplitude.
        let mag = ((y.re * y.re + y.im * y.im) as f64).sqrt();
        let error = if mag > 1e-3 { raw_error / mag } else { 0.0 };

        self.freq += self.ki * error;
        let phase_step = self.freq + self.kp * error;
        self.phase = wrap_phase(self.phase + phase_step);

        // A near-zero symbol carries no phase information; the normalized
        // error above is forced to 0 for it, which would otherwise read as
        // a perfect lock. Treat it as worst-case error instead.
        let sample_err = if mag > 1e-3 { error.abs() } else { 1.0 };
        self.avg_err = 0.995 * self.avg_err + 0.005 * sample_err;
        if self.locked {
            if self.avg_err > self.unlock_threshold {
                self.locked = false;
            }
        } else if self.avg_err < self.lock_threshold {
            self.locked = true;
        }

        y
    }

    pub fn locked(&self) -> bool {
        self.locked
    }

    /// Frequency estimate in Hz, derived from the internal rad/symbol state.
    pub fn freq_hz(&self) -> f64 {
        self.freq * self.sym_rate / TAU
    }
}

fn wrap_phase(mut p: f64) -> f64 {
    while p >= PI {
        p -= TAU;
    }
    while p < -PI {
        p += TAU;
    }
    p
}
