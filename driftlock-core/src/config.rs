//! Configuration for the demodulator pipeline.

use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};

/// Input block size read from the source per worker iteration.
pub const CHUNKSIZE: usize = 4096;

/// Output flush threshold, in bytes. Must be even (one byte per I/Q half).
pub const SYM_CHUNKSIZE: usize = 4096;

/// All numeric parameters needed to build a `Demod` pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DemodConfig {
    /// Interpolation factor, typically 2-8.
    pub l: usize,
    /// RRC half-length in symbols.
    pub rrc_order: usize,
    /// RRC roll-off, `(0, 1]`.
    pub alpha: f64,
    /// Costas loop bandwidth, in Hz.
    pub pll_bw_hz: f64,
    /// Symbol rate, in symbols/second.
    pub sym_rate: f64,
    /// AGC target magnitude.
    pub agc_target: f32,
}

impl Default for DemodConfig {
    fn default() -> Self {
        Self {
            l: 4,
            rrc_order: 32,
            alpha: 0.5,
            pll_bw_hz: 50.0,
            sym_rate: 4800.0,
            agc_target: 200.0,
        }
    }
}

impl DemodConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.l == 0 {
            return Err(ConfigError::InvalidL(self.l));
        }
        if self.rrc_order == 0 {
            return Err(ConfigError::InvalidOrder(self.rrc_order));
        }
        if !(self.alpha > 0.0 && self.alpha <= 1.0) {
            return Err(ConfigError::InvalidAlpha(self.alpha));
        }
        if self.sym_rate <= 0.0 {
            return Err(ConfigError::InvalidSymRate(self.sym_rate));
        }
        Ok(())
    }
}
