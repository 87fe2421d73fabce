//! Automatic gain control: normalizes instantaneous magnitude toward a target.

use num_complex::Complex32;

/// First-order AGC loop. `gain` is always strictly positive.
#[derive(Clone, Debug)]
pub struct Agc {
    gain: f32,
    target: f32,
    /// Smoothing pole, close to 1 for a slow, stable loop.
    pole: f32,
}

impl Agc {
    pub fn new(target: f32) -> Self {
        Self {
            gain: 1.0,
            target,
            pole: 0.999,
        }
    }

    pub fn gain(&self) -> f32 {
        self.gain
    }

    /// Scale `x` by the current gain and update the gain estimate.
    pub fn apply(&mut self, x: Complex32) -> Complex32 {
        let y = x * self.gain;

        let mag = x.norm();
        if mag > 1e-12 {
            let instantaneous = self.target / mag;
            self.gain = self.pole * self.gain + (1.0 - self.pole) * instantaneous;
        }
        if self.gain <= 0.0 || !self.gain.is_finite() {
            self.gain = 1.0;
        }

        y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gain_stays_positive() {
        let mut agc = Agc::new(1.0);
        for i in 0..1000 {
            let x = Complex32::new((i as f32 * 0.01).sin() * 5.0, 0.0);
            agc.apply(x);
            assert!(agc.gain() > 0.0);
        }
    }

    #[test]
    fn converges_to_target_over_amplitude_for_stationary_signal() {
        let target = 2.0;
        let mut agc = Agc::new(target);
        let amplitude = 8.0_f32;
        let mut last_out_mag = 0.0;
        for i in 0..20_000 {
            let theta = i as f32 * 0.3;
            let x = Complex32::new(amplitude * theta.cos(), amplitude * theta.sin());
            last_out_mag = agc.apply(x).norm();
        }
        assert!((last_out_mag - target).abs() / target < 0.05);
    }

    #[test]
    fn output_magnitude_bounded_after_warmup() {
        let target = 1.0;
        let mut agc = Agc::new(target);
        let amplitude = 3.0_f32;
        for i in 0..5000 {
            let theta = i as f32 * 0.1;
            agc.apply(Complex32::new(amplitude * theta.cos(), amplitude * theta.sin()));
        }
        let r = 4.0;
        for i in 5000..5100 {
            let theta = i as f32 * 0.1;
            let y = agc.apply(Complex32::new(amplitude * theta.cos(), amplitude * theta.sin()));
            assert!(y.norm() < target * r);
            assert!(y.norm() > target / r);
        }
    }
}
